//! SAC binary waveform codec.
//!
//! A SAC record is a 632-byte header followed by `NPTS` IEEE 32-bit floats,
//! in either byte order. The header holds 70 float slots, 35 integer slots,
//! 5 logical slots, and a 192-byte character block (23 fields of 8 bytes,
//! except KEVNM which is 16). Undefined slots carry the -12345 sentinels.

use byteorder::{BigEndian, ByteOrder as ByteOrderExt, LittleEndian};
use tracing::debug;

use crate::time::Time;
use crate::{Result, SffError};

/// Total header length in bytes.
pub const HEADER_SIZE: usize = 632;

const FLOAT_BLOCK: usize = 0;
const INT_BLOCK: usize = 280;
const LOGICAL_BLOCK: usize = 420;
const CHAR_BLOCK: usize = 440;

const UNDEFINED_FLOAT: f64 = -12345.0;
const UNDEFINED_INT: i32 = -12345;
const UNDEFINED_CHARS: &[u8; 6] = b"-12345";

/// Byte order of a serialized record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Big,
    Little,
}

/// Floating-point header slots, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Float {
    Delta, Depmin, Depmax, Scale, Odelta,
    B, E, O, A, Internal1,
    T0, T1, T2, T3, T4, T5, T6, T7, T8, T9,
    F,
    Resp0, Resp1, Resp2, Resp3, Resp4, Resp5, Resp6, Resp7, Resp8, Resp9,
    Stla, Stlo, Stel, Stdp,
    Evla, Evlo, Evel, Evdp,
    Mag,
    User0, User1, User2, User3, User4, User5, User6, User7, User8, User9,
    Dist, Az, Baz, Gcarc,
    Internal2, Internal3,
    Depmen, Cmpaz, Cmpinc,
    Xminimum, Xmaximum, Yminimum, Ymaximum,
    Unused0, Unused1, Unused2, Unused3, Unused4, Unused5, Unused6,
}

/// Integer header slots, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Integer {
    Nzyear, Nzjday, Nzhour, Nzmin, Nzsec, Nzmsec,
    Nvhdr, Norid, Nevid, Npts,
    Internal1, Nwfid, Nxsize, Nysize, Unused0,
    Iftype, Idep, Iztype, Unused1, Iinst,
    Istreg, Ievreg, Ievtyp, Iqual, Isynth,
    Imagtyp, Imagsrc,
    Unused2, Unused3, Unused4, Unused5, Unused6, Unused7, Unused8, Unused9,
}

/// Logical header slots. Stored as 32-bit integers on disk so the
/// undefined state survives round trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Logical {
    Leven, Lpspol, Lovrok, Lcalda, Unused,
}

/// Character header slots. All fields are 8 bytes except KEVNM (16).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Character {
    Kstnm, Kevnm, Khole, Ko, Ka,
    Kt0, Kt1, Kt2, Kt3, Kt4, Kt5, Kt6, Kt7, Kt8, Kt9,
    Kf, Kuser0, Kuser1, Kuser2,
    Kcmpnm, Knetwk, Kdatrd, Kinst,
}

impl Character {
    /// Offset and length of this field within the character block.
    fn span(self) -> (usize, usize) {
        match self {
            Character::Kstnm => (0, 8),
            Character::Kevnm => (8, 16),
            other => (24 + (other as usize - 2) * 8, 8),
        }
    }
}

/// A SAC header with every slot addressable by its typed key.
///
/// Getters return the -12345 sentinels verbatim for undefined slots and
/// never fail. The character block is kept as raw bytes so that decoding
/// and re-encoding a foreign file reproduces it byte for byte, whatever
/// padding convention it used; the accessors trim and pad.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    floats: [f64; 70],
    ints: [i32; 35],
    logicals: [i32; 5],
    chars: [u8; 192],
}

impl Header {
    /// A header with every slot undefined.
    pub fn new() -> Self {
        let mut chars = [0u8; 192];
        let mut offset = 0;
        for key in 0..23 {
            chars[offset..offset + 6].copy_from_slice(UNDEFINED_CHARS);
            offset += if key == 1 { 16 } else { 8 };
        }
        Self {
            floats: [UNDEFINED_FLOAT; 70],
            ints: [UNDEFINED_INT; 35],
            logicals: [UNDEFINED_INT; 5],
            chars,
        }
    }

    /// Decode a header from the leading 632 bytes of a record.
    ///
    /// Rejects inputs shorter than the header, a non-positive sampling
    /// period, and a negative sample count.
    pub fn from_bytes(data: &[u8], order: ByteOrder) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(SffError::TruncatedFile {
                expected: HEADER_SIZE,
                actual: data.len(),
            });
        }
        let header = match order {
            ByteOrder::Big => Self::unpack::<BigEndian>(data),
            ByteOrder::Little => Self::unpack::<LittleEndian>(data),
        };
        if header.floats[Float::Delta as usize] <= 0.0 {
            return Err(SffError::InvalidField(
                "sampling period must be positive".into(),
            ));
        }
        if header.ints[Integer::Npts as usize] < 0 {
            return Err(SffError::InvalidField(
                "sample count must be non-negative".into(),
            ));
        }
        Ok(header)
    }

    fn unpack<E: ByteOrderExt>(data: &[u8]) -> Self {
        let mut header = Self::new();
        for (i, slot) in header.floats.iter_mut().enumerate() {
            *slot = f64::from(E::read_f32(&data[FLOAT_BLOCK + i * 4..]));
        }
        for (i, slot) in header.ints.iter_mut().enumerate() {
            *slot = E::read_i32(&data[INT_BLOCK + i * 4..]);
        }
        for (i, slot) in header.logicals.iter_mut().enumerate() {
            *slot = E::read_i32(&data[LOGICAL_BLOCK + i * 4..]);
        }
        header.chars.copy_from_slice(&data[CHAR_BLOCK..HEADER_SIZE]);
        header
    }

    /// Serialize to exactly 632 bytes.
    pub fn to_bytes(&self, order: ByteOrder) -> Vec<u8> {
        let mut out = vec![0u8; HEADER_SIZE];
        match order {
            ByteOrder::Big => self.pack::<BigEndian>(&mut out),
            ByteOrder::Little => self.pack::<LittleEndian>(&mut out),
        }
        out
    }

    fn pack<E: ByteOrderExt>(&self, out: &mut [u8]) {
        for (i, &slot) in self.floats.iter().enumerate() {
            E::write_f32(&mut out[FLOAT_BLOCK + i * 4..], slot as f32);
        }
        for (i, &slot) in self.ints.iter().enumerate() {
            E::write_i32(&mut out[INT_BLOCK + i * 4..], slot);
        }
        for (i, &slot) in self.logicals.iter().enumerate() {
            E::write_i32(&mut out[LOGICAL_BLOCK + i * 4..], slot);
        }
        out[CHAR_BLOCK..HEADER_SIZE].copy_from_slice(&self.chars);
    }

    pub fn float(&self, key: Float) -> f64 {
        self.floats[key as usize]
    }

    pub fn set_float(&mut self, key: Float, value: f64) {
        self.floats[key as usize] = value;
    }

    pub fn integer(&self, key: Integer) -> i32 {
        self.ints[key as usize]
    }

    pub fn set_integer(&mut self, key: Integer, value: i32) {
        self.ints[key as usize] = value;
    }

    /// Logical slots are tri-state: 1, 0, or the -12345 sentinel.
    pub fn logical(&self, key: Logical) -> i32 {
        self.logicals[key as usize]
    }

    pub fn set_logical(&mut self, key: Logical, value: bool) {
        self.logicals[key as usize] = i32::from(value);
    }

    /// The field's text with trailing blanks and NULs trimmed.
    pub fn character(&self, key: Character) -> String {
        let (offset, len) = key.span();
        let raw = &self.chars[offset..offset + len];
        let end = raw
            .iter()
            .rposition(|&b| b != b' ' && b != 0)
            .map_or(0, |p| p + 1);
        String::from_utf8_lossy(&raw[..end]).into_owned()
    }

    /// Store ASCII text, truncated to the field width and NUL-padded.
    pub fn set_character(&mut self, key: Character, value: &str) {
        let (offset, len) = key.span();
        let bytes = value.as_bytes();
        let n = bytes.len().min(len);
        self.chars[offset..offset + n].copy_from_slice(&bytes[..n]);
        for b in &mut self.chars[offset + n..offset + len] {
            *b = 0;
        }
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::new()
    }
}

/// A SAC waveform: header plus samples, widened to `f64` in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    header: Header,
    data: Vec<f64>,
    byte_order: ByteOrder,
}

impl Waveform {
    pub fn new() -> Self {
        Self {
            header: Header::new(),
            data: Vec::new(),
            byte_order: ByteOrder::Little,
        }
    }

    /// Decode a full record, detecting the byte order from the NPTS slot:
    /// the order whose `632 + 4 * npts` matches the input length wins. If
    /// neither order matches the record cannot be decoded.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(SffError::TruncatedFile {
                expected: HEADER_SIZE,
                actual: data.len(),
            });
        }
        let order = detect_byte_order(data)?;
        let header = Header::from_bytes(data, order)?;
        let npts = header.integer(Integer::Npts) as usize;
        let mut samples = Vec::with_capacity(npts);
        for i in 0..npts {
            let offset = HEADER_SIZE + i * 4;
            let value = match order {
                ByteOrder::Big => BigEndian::read_f32(&data[offset..]),
                ByteOrder::Little => LittleEndian::read_f32(&data[offset..]),
            };
            samples.push(f64::from(value));
        }
        debug!(npts, byte_order = ?order, "decoded SAC record");
        Ok(Self {
            header,
            data: samples,
            byte_order: order,
        })
    }

    /// Serialize the record. NPTS is forced to the sample count, so any
    /// record produced by [`Waveform::from_bytes`] re-encodes to the exact
    /// input bytes when the same byte order is requested.
    pub fn to_bytes(&self, order: ByteOrder) -> Result<Vec<u8>> {
        if self.header.float(Float::Delta) <= 0.0 {
            return Err(SffError::InvalidField(
                "sampling period must be set before encoding".into(),
            ));
        }
        let mut header = self.header.clone();
        header.set_integer(Integer::Npts, self.data.len() as i32);
        let mut out = header.to_bytes(order);
        out.resize(HEADER_SIZE + self.data.len() * 4, 0);
        for (i, &sample) in self.data.iter().enumerate() {
            let slot = &mut out[HEADER_SIZE + i * 4..];
            match order {
                ByteOrder::Big => BigEndian::write_f32(slot, sample as f32),
                ByteOrder::Little => LittleEndian::write_f32(slot, sample as f32),
            }
        }
        Ok(out)
    }

    /// Byte order detected on decode (`Little` for a fresh waveform).
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Replace the samples and keep NPTS in sync.
    pub fn set_data(&mut self, data: Vec<f64>) {
        self.header.set_integer(Integer::Npts, data.len() as i32);
        self.data = data;
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn number_of_samples(&self) -> usize {
        self.data.len()
    }

    pub fn sampling_period(&self) -> Result<f64> {
        let delta = self.header.float(Float::Delta);
        if delta <= 0.0 {
            return Err(SffError::InvalidField("sampling period not set".into()));
        }
        Ok(delta)
    }

    pub fn sampling_rate(&self) -> Result<f64> {
        Ok(1.0 / self.sampling_period()?)
    }

    pub fn set_sampling_period(&mut self, delta: f64) -> Result<()> {
        if delta <= 0.0 {
            return Err(SffError::InvalidField(format!(
                "sampling period {delta} must be positive"
            )));
        }
        self.header.set_float(Float::Delta, delta);
        Ok(())
    }

    /// Trace start time from the NZ reference fields plus the B offset.
    pub fn start_time(&self) -> Result<Time> {
        let year = self.header.integer(Integer::Nzyear);
        let jday = self.header.integer(Integer::Nzjday);
        let hour = self.header.integer(Integer::Nzhour);
        let minute = self.header.integer(Integer::Nzmin);
        let second = self.header.integer(Integer::Nzsec);
        let msec = self.header.integer(Integer::Nzmsec);
        let b = self.header.float(Float::B);
        if [year, jday, hour, minute, second, msec].contains(&UNDEFINED_INT)
            || b == UNDEFINED_FLOAT
        {
            return Err(SffError::InvalidField("start time not set".into()));
        }
        let mut time = Time::new();
        time.set_year(year)?;
        time.set_day_of_year(jday)?;
        time.set_hour(hour)?;
        time.set_minute(minute)?;
        time.set_second(second)?;
        time.set_microsecond(msec * 1000)?;
        if b != 0.0 {
            time = time + b;
        }
        Ok(time)
    }

    /// Write the NZ reference fields and zero the B offset.
    pub fn set_start_time(&mut self, time: &Time) {
        self.header.set_integer(Integer::Nzyear, time.year());
        self.header.set_integer(Integer::Nzjday, time.day_of_year());
        self.header.set_integer(Integer::Nzhour, time.hour());
        self.header.set_integer(Integer::Nzmin, time.minute());
        self.header.set_integer(Integer::Nzsec, time.second());
        let msec = (f64::from(time.microsecond()) * 1e-3 + 0.5) as i32;
        self.header.set_integer(Integer::Nzmsec, msec);
        self.header.set_float(Float::B, 0.0);
    }

    pub fn end_time(&self) -> Result<Time> {
        let start = self.start_time()?;
        let delta = self.sampling_period()?;
        let n = self.data.len().saturating_sub(1);
        Ok(start + n as f64 * delta)
    }

    pub fn float(&self, key: Float) -> f64 {
        self.header.float(key)
    }

    pub fn set_float(&mut self, key: Float, value: f64) {
        self.header.set_float(key, value);
    }

    pub fn integer(&self, key: Integer) -> i32 {
        self.header.integer(key)
    }

    /// NPTS tracks the sample vector and IFTYPE is fixed by the codec, so
    /// neither is settable here.
    pub fn set_integer(&mut self, key: Integer, value: i32) -> Result<()> {
        if key == Integer::Npts || key == Integer::Iftype {
            return Err(SffError::InvalidField(format!(
                "{key:?} cannot be set through the generic setter"
            )));
        }
        self.header.set_integer(key, value);
        Ok(())
    }

    pub fn logical(&self, key: Logical) -> i32 {
        self.header.logical(key)
    }

    pub fn set_logical(&mut self, key: Logical, value: bool) {
        self.header.set_logical(key, value);
    }

    pub fn character(&self, key: Character) -> String {
        self.header.character(key)
    }

    pub fn set_character(&mut self, key: Character, value: &str) {
        self.header.set_character(key, value);
    }
}

impl Default for Waveform {
    fn default() -> Self {
        Self::new()
    }
}

/// The byte order whose NPTS slot is consistent with the record length
/// wins. When no order matches but one declares a plausible sample count
/// needing more bytes than were given, the record is truncated rather
/// than byte-swapped.
fn detect_byte_order(data: &[u8]) -> Result<ByteOrder> {
    let mut shortfall: Option<usize> = None;
    for order in [ByteOrder::Big, ByteOrder::Little] {
        let npts = match order {
            ByteOrder::Big => BigEndian::read_i32(&data[INT_BLOCK + 36..]),
            ByteOrder::Little => LittleEndian::read_i32(&data[INT_BLOCK + 36..]),
        };
        if npts < 0 {
            continue;
        }
        let expected = HEADER_SIZE + npts as usize * 4;
        if expected == data.len() {
            return Ok(order);
        }
        if expected > data.len() {
            shortfall = Some(shortfall.map_or(expected, |e| e.min(expected)));
        }
    }
    if let Some(expected) = shortfall {
        return Err(SffError::TruncatedFile {
            expected,
            actual: data.len(),
        });
    }
    Err(SffError::UnsupportedByteOrder)
}
