//! Silixa SEG-Y distributed acoustic sensing codec.
//!
//! Silixa interrogators write classic SEG-Y rev 1 volumes: a 3200-byte
//! EBCDIC textual header, a 400-byte big-endian binary file header, and a
//! run of fixed-length traces, each a 240-byte header followed by IEEE
//! 32-bit float samples (data format code 5). Everything on disk is big
//! endian. Header images are kept raw so unmodeled vendor bytes survive a
//! decode/encode cycle.

use byteorder::{BigEndian, ByteOrder as ByteOrderExt};
use tracing::debug;

use crate::time::Time;
use crate::{Result, SffError};

/// Textual header length in bytes.
pub const TEXTUAL_HEADER_SIZE: usize = 3200;
/// Binary file header length in bytes.
pub const BINARY_HEADER_SIZE: usize = 400;
/// Trace header length in bytes.
pub const TRACE_HEADER_SIZE: usize = 240;
/// Combined file-header length preceding the first trace.
pub const FILE_HEADER_SIZE: usize = TEXTUAL_HEADER_SIZE + BINARY_HEADER_SIZE;

/// IEEE float sample encoding, the only one Silixa units emit.
const DATA_FORMAT_IEEE_FLOAT: i16 = 5;
/// Time basis code for UTC.
const TIME_BASIS_UTC: i16 = 4;

// IBM-1047 to US-ASCII, bijective.
const EBCDIC_TO_ASCII: [u8; 256] = [
    0x00, 0x01, 0x02, 0x03, 0x85, 0x09, 0x86, 0x7f,
    0x87, 0x8d, 0x8e, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f,
    0x10, 0x11, 0x12, 0x13, 0x8f, 0x0a, 0x08, 0x97,
    0x18, 0x19, 0x9c, 0x9d, 0x1c, 0x1d, 0x1e, 0x1f,
    0x80, 0x81, 0x82, 0x83, 0x84, 0x92, 0x17, 0x1b,
    0x88, 0x89, 0x8a, 0x8b, 0x8c, 0x05, 0x06, 0x07,
    0x90, 0x91, 0x16, 0x93, 0x94, 0x95, 0x96, 0x04,
    0x98, 0x99, 0x9a, 0x9b, 0x14, 0x15, 0x9e, 0x1a,
    0x20, 0xa0, 0xe2, 0xe4, 0xe0, 0xe1, 0xe3, 0xe5,
    0xe7, 0xf1, 0xa2, 0x2e, 0x3c, 0x28, 0x2b, 0x7c,
    0x26, 0xe9, 0xea, 0xeb, 0xe8, 0xed, 0xee, 0xef,
    0xec, 0xdf, 0x21, 0x24, 0x2a, 0x29, 0x3b, 0x5e,
    0x2d, 0x2f, 0xc2, 0xc4, 0xc0, 0xc1, 0xc3, 0xc5,
    0xc7, 0xd1, 0xa6, 0x2c, 0x25, 0x5f, 0x3e, 0x3f,
    0xf8, 0xc9, 0xca, 0xcb, 0xc8, 0xcd, 0xce, 0xcf,
    0xcc, 0x60, 0x3a, 0x23, 0x40, 0x27, 0x3d, 0x22,
    0xd8, 0x61, 0x62, 0x63, 0x64, 0x65, 0x66, 0x67,
    0x68, 0x69, 0xab, 0xbb, 0xf0, 0xfd, 0xfe, 0xb1,
    0xb0, 0x6a, 0x6b, 0x6c, 0x6d, 0x6e, 0x6f, 0x70,
    0x71, 0x72, 0xaa, 0xba, 0xe6, 0xb8, 0xc6, 0xa4,
    0xb5, 0x7e, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78,
    0x79, 0x7a, 0xa1, 0xbf, 0xd0, 0x5b, 0xde, 0xae,
    0xac, 0xa3, 0xa5, 0xb7, 0xa9, 0xa7, 0xb6, 0xbc,
    0xbd, 0xbe, 0xdd, 0xa8, 0xaf, 0x5d, 0xb4, 0xd7,
    0x7b, 0x41, 0x42, 0x43, 0x44, 0x45, 0x46, 0x47,
    0x48, 0x49, 0xad, 0xf4, 0xf6, 0xf2, 0xf3, 0xf5,
    0x7d, 0x4a, 0x4b, 0x4c, 0x4d, 0x4e, 0x4f, 0x50,
    0x51, 0x52, 0xb9, 0xfb, 0xfc, 0xf9, 0xfa, 0xff,
    0x5c, 0xf7, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58,
    0x59, 0x5a, 0xb2, 0xd4, 0xd6, 0xd2, 0xd3, 0xd5,
    0x30, 0x31, 0x32, 0x33, 0x34, 0x35, 0x36, 0x37,
    0x38, 0x39, 0xb3, 0xdb, 0xdc, 0xd9, 0xda, 0x9f,
];

const ASCII_TO_EBCDIC: [u8; 256] = invert(&EBCDIC_TO_ASCII);

const fn invert(table: &[u8; 256]) -> [u8; 256] {
    let mut out = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        out[table[i] as usize] = i as u8;
        i += 1;
    }
    out
}

/// The 400-byte binary file header, kept as its raw big-endian image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryFileHeader {
    raw: [u8; BINARY_HEADER_SIZE],
}

impl BinaryFileHeader {
    /// A blank header with the IEEE float data format code already set.
    pub fn new() -> Self {
        let mut header = Self {
            raw: [0u8; BINARY_HEADER_SIZE],
        };
        BigEndian::write_i16(&mut header.raw[24..], DATA_FORMAT_IEEE_FLOAT);
        header
    }

    /// Decode and validate the data format code.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < BINARY_HEADER_SIZE {
            return Err(SffError::TruncatedFile {
                expected: BINARY_HEADER_SIZE,
                actual: data.len(),
            });
        }
        let mut raw = [0u8; BINARY_HEADER_SIZE];
        raw.copy_from_slice(&data[..BINARY_HEADER_SIZE]);
        let format = BigEndian::read_i16(&raw[24..]);
        if format != DATA_FORMAT_IEEE_FLOAT {
            return Err(SffError::UnsupportedFormatVersion(format));
        }
        Ok(Self { raw })
    }

    pub fn to_bytes(&self) -> [u8; BINARY_HEADER_SIZE] {
        self.raw
    }

    /// Traces per ensemble, i.e. the channel count of the fiber shot.
    pub fn number_of_traces(&self) -> i32 {
        i32::from(BigEndian::read_i16(&self.raw[12..]))
    }

    pub fn set_number_of_traces(&mut self, traces: i32) -> Result<()> {
        if traces < 0 || traces > i32::from(i16::MAX) {
            return Err(SffError::InvalidField(format!(
                "trace count {traces} does not fit the header field"
            )));
        }
        BigEndian::write_i16(&mut self.raw[12..], traces as i16);
        Ok(())
    }

    /// Sampling interval in microseconds.
    pub fn sampling_interval(&self) -> i32 {
        i32::from(BigEndian::read_i16(&self.raw[16..]))
    }

    pub fn set_sampling_interval(&mut self, micros: i32) -> Result<()> {
        if micros <= 0 || micros > i32::from(i16::MAX) {
            return Err(SffError::InvalidField(format!(
                "sampling interval {micros} us is out of range"
            )));
        }
        BigEndian::write_i16(&mut self.raw[16..], micros as i16);
        Ok(())
    }

    pub fn sampling_rate(&self) -> Result<f64> {
        let micros = self.sampling_interval();
        if micros <= 0 {
            return Err(SffError::InvalidField("sampling interval not set".into()));
        }
        Ok(1e6 / f64::from(micros))
    }

    /// Sampling period in seconds.
    pub fn sampling_period(&self) -> Result<f64> {
        let micros = self.sampling_interval();
        if micros <= 0 {
            return Err(SffError::InvalidField("sampling interval not set".into()));
        }
        Ok(f64::from(micros) * 1e-6)
    }

    /// Samples per trace. The 32-bit extension field is authoritative;
    /// legacy readers only see the clamped 16-bit field.
    pub fn number_of_samples(&self) -> i32 {
        let extended = BigEndian::read_i32(&self.raw[62..]);
        if extended > 0 {
            extended
        } else {
            i32::from(BigEndian::read_i16(&self.raw[20..]))
        }
    }

    pub fn set_number_of_samples(&mut self, samples: i32) -> Result<()> {
        if samples < 0 {
            return Err(SffError::InvalidField(format!(
                "sample count {samples} must be non-negative"
            )));
        }
        BigEndian::write_i32(&mut self.raw[62..], samples);
        let legacy = samples.min(i32::from(i16::MAX)) as i16;
        BigEndian::write_i16(&mut self.raw[20..], legacy);
        Ok(())
    }

    pub fn data_format(&self) -> i16 {
        BigEndian::read_i16(&self.raw[24..])
    }
}

impl Default for BinaryFileHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// The 240-byte trace header, kept as its raw big-endian image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceHeader {
    raw: [u8; TRACE_HEADER_SIZE],
}

impl TraceHeader {
    /// A blank header marked as UTC-timed.
    pub fn new() -> Self {
        let mut header = Self {
            raw: [0u8; TRACE_HEADER_SIZE],
        };
        BigEndian::write_i16(&mut header.raw[166..], TIME_BASIS_UTC);
        header
    }

    /// Decode and validate the time basis code.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < TRACE_HEADER_SIZE {
            return Err(SffError::TruncatedFile {
                expected: TRACE_HEADER_SIZE,
                actual: data.len(),
            });
        }
        let mut raw = [0u8; TRACE_HEADER_SIZE];
        raw.copy_from_slice(&data[..TRACE_HEADER_SIZE]);
        let basis = BigEndian::read_i16(&raw[166..]);
        if basis != TIME_BASIS_UTC {
            return Err(SffError::InvalidField(format!(
                "time basis code {basis} is not UTC"
            )));
        }
        Ok(Self { raw })
    }

    pub fn to_bytes(&self) -> [u8; TRACE_HEADER_SIZE] {
        self.raw
    }

    /// Trace sequence number within the file, one-based.
    pub fn trace_number(&self) -> i32 {
        BigEndian::read_i32(&self.raw[0..])
    }

    pub fn set_trace_number(&mut self, number: i32) {
        BigEndian::write_i32(&mut self.raw[0..], number);
    }

    pub fn receiver_depth(&self) -> i32 {
        BigEndian::read_i32(&self.raw[40..])
    }

    pub fn set_receiver_depth(&mut self, depth: i32) {
        BigEndian::write_i32(&mut self.raw[40..], depth);
    }

    pub fn source_depth(&self) -> i32 {
        BigEndian::read_i32(&self.raw[48..])
    }

    pub fn set_source_depth(&mut self, depth: i32) {
        BigEndian::write_i32(&mut self.raw[48..], depth);
    }

    /// Scalar applied to elevations and depths, SEG-Y sign convention.
    pub fn elevation_scalar(&self) -> i16 {
        BigEndian::read_i16(&self.raw[68..])
    }

    pub fn set_elevation_scalar(&mut self, scalar: i16) {
        BigEndian::write_i16(&mut self.raw[68..], scalar);
    }

    /// Scalar applied to the coordinate fields, SEG-Y sign convention.
    pub fn coordinate_scalar(&self) -> i16 {
        BigEndian::read_i16(&self.raw[70..])
    }

    pub fn set_coordinate_scalar(&mut self, scalar: i16) {
        BigEndian::write_i16(&mut self.raw[70..], scalar);
    }

    pub fn source_easting(&self) -> i32 {
        BigEndian::read_i32(&self.raw[72..])
    }

    pub fn set_source_easting(&mut self, value: i32) {
        BigEndian::write_i32(&mut self.raw[72..], value);
    }

    pub fn source_northing(&self) -> i32 {
        BigEndian::read_i32(&self.raw[76..])
    }

    pub fn set_source_northing(&mut self, value: i32) {
        BigEndian::write_i32(&mut self.raw[76..], value);
    }

    pub fn receiver_easting(&self) -> i32 {
        BigEndian::read_i32(&self.raw[80..])
    }

    pub fn set_receiver_easting(&mut self, value: i32) {
        BigEndian::write_i32(&mut self.raw[80..], value);
    }

    pub fn receiver_northing(&self) -> i32 {
        BigEndian::read_i32(&self.raw[84..])
    }

    pub fn set_receiver_northing(&mut self, value: i32) {
        BigEndian::write_i32(&mut self.raw[84..], value);
    }

    /// Coordinate units code (1 = length, 2 = arc seconds, ...).
    pub fn coordinate_units(&self) -> i16 {
        BigEndian::read_i16(&self.raw[88..])
    }

    pub fn set_coordinate_units(&mut self, code: i16) {
        BigEndian::write_i16(&mut self.raw[88..], code);
    }

    /// Samples in this trace; the 32-bit extension is authoritative.
    pub fn number_of_samples(&self) -> i32 {
        let extended = BigEndian::read_i32(&self.raw[232..]);
        if extended > 0 {
            extended
        } else {
            i32::from(BigEndian::read_i16(&self.raw[114..]))
        }
    }

    pub fn set_number_of_samples(&mut self, samples: i32) -> Result<()> {
        if samples < 0 {
            return Err(SffError::InvalidField(format!(
                "sample count {samples} must be non-negative"
            )));
        }
        BigEndian::write_i32(&mut self.raw[232..], samples);
        let legacy = samples.min(i32::from(i16::MAX)) as i16;
        BigEndian::write_i16(&mut self.raw[114..], legacy);
        Ok(())
    }

    /// Sampling interval in microseconds.
    pub fn sampling_interval(&self) -> i32 {
        i32::from(BigEndian::read_i16(&self.raw[116..]))
    }

    pub fn set_sampling_interval(&mut self, micros: i32) -> Result<()> {
        if micros <= 0 || micros > i32::from(i16::MAX) {
            return Err(SffError::InvalidField(format!(
                "sampling interval {micros} us is out of range"
            )));
        }
        BigEndian::write_i16(&mut self.raw[116..], micros as i16);
        Ok(())
    }

    pub fn sampling_rate(&self) -> Result<f64> {
        let micros = self.sampling_interval();
        if micros <= 0 {
            return Err(SffError::InvalidField("sampling interval not set".into()));
        }
        Ok(1e6 / f64::from(micros))
    }

    /// Sampling period in seconds.
    pub fn sampling_period(&self) -> Result<f64> {
        let micros = self.sampling_interval();
        if micros <= 0 {
            return Err(SffError::InvalidField("sampling interval not set".into()));
        }
        Ok(f64::from(micros) * 1e-6)
    }

    pub fn is_correlated(&self) -> bool {
        BigEndian::read_i16(&self.raw[124..]) == 2
    }

    pub fn set_correlated(&mut self, correlated: bool) {
        let code = if correlated { 2 } else { 1 };
        BigEndian::write_i16(&mut self.raw[124..], code);
    }

    /// Distance along the fiber to this channel, in the unit the
    /// interrogator was configured with.
    pub fn distance_along_fiber(&self) -> i32 {
        BigEndian::read_i32(&self.raw[236..])
    }

    pub fn set_distance_along_fiber(&mut self, distance: i32) {
        BigEndian::write_i32(&mut self.raw[236..], distance);
    }

    /// Trace start time from the year/day-of-year fields. An unset or
    /// garbage timestamp yields the epoch origin rather than an error.
    pub fn start_time(&self) -> Time {
        self.try_start_time().unwrap_or_default()
    }

    fn try_start_time(&self) -> Result<Time> {
        let mut time = Time::new();
        time.set_year(i32::from(BigEndian::read_i16(&self.raw[156..])))?;
        time.set_day_of_year(i32::from(BigEndian::read_i16(&self.raw[158..])))?;
        time.set_hour(i32::from(BigEndian::read_i16(&self.raw[160..])))?;
        time.set_minute(i32::from(BigEndian::read_i16(&self.raw[162..])))?;
        time.set_second(i32::from(BigEndian::read_i16(&self.raw[164..])))?;
        Ok(time)
    }

    /// Write the start time fields to whole-second precision and mark the
    /// trace as UTC-timed.
    pub fn set_start_time(&mut self, time: &Time) {
        BigEndian::write_i16(&mut self.raw[156..], time.year() as i16);
        BigEndian::write_i16(&mut self.raw[158..], time.day_of_year() as i16);
        BigEndian::write_i16(&mut self.raw[160..], time.hour() as i16);
        BigEndian::write_i16(&mut self.raw[162..], time.minute() as i16);
        BigEndian::write_i16(&mut self.raw[164..], time.second() as i16);
        BigEndian::write_i16(&mut self.raw[166..], TIME_BASIS_UTC);
    }
}

impl Default for TraceHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// One DAS channel: header plus float samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub header: TraceHeader,
    pub data: Vec<f32>,
}

impl Trace {
    pub fn new() -> Self {
        Self {
            header: TraceHeader::new(),
            data: Vec::new(),
        }
    }

    /// Replace the samples and keep the header counts in sync.
    pub fn set_data(&mut self, data: Vec<f32>) -> Result<()> {
        self.header.set_number_of_samples(data.len() as i32)?;
        self.data = data;
        Ok(())
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn number_of_samples(&self) -> usize {
        self.data.len()
    }

    pub fn trace_number(&self) -> i32 {
        self.header.trace_number()
    }

    pub fn is_correlated(&self) -> bool {
        self.header.is_correlated()
    }

    pub fn distance_along_fiber(&self) -> i32 {
        self.header.distance_along_fiber()
    }

    pub fn start_time(&self) -> Time {
        self.header.start_time()
    }

    pub fn sampling_period(&self) -> Result<f64> {
        self.header.sampling_period()
    }

    pub fn sampling_rate(&self) -> Result<f64> {
        self.header.sampling_rate()
    }
}

impl Default for Trace {
    fn default() -> Self {
        Self::new()
    }
}

/// A full SEG-Y volume: textual header, binary file header, and every
/// trace the interrogator wrote for the shot.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceGroup {
    textual_header: String,
    pub binary_file_header: BinaryFileHeader,
    traces: Vec<Trace>,
}

impl TraceGroup {
    pub fn new() -> Self {
        Self {
            textual_header: String::new(),
            binary_file_header: BinaryFileHeader::new(),
            traces: Vec::new(),
        }
    }

    /// Decode a whole volume.
    ///
    /// The size must match the header-declared geometry exactly:
    /// `3600 + traces * (240 + 4 * samples)` bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < FILE_HEADER_SIZE {
            return Err(SffError::TruncatedFile {
                expected: FILE_HEADER_SIZE,
                actual: data.len(),
            });
        }
        let textual_header = ebcdic_to_ascii(&data[..TEXTUAL_HEADER_SIZE]);
        let binary_file_header = BinaryFileHeader::from_bytes(&data[TEXTUAL_HEADER_SIZE..])?;
        let declared_traces = binary_file_header.number_of_traces();
        let declared_samples = binary_file_header.number_of_samples();
        if declared_traces < 0 || declared_samples < 0 {
            return Err(SffError::InvalidField(format!(
                "negative geometry: {declared_traces} traces of {declared_samples} samples"
            )));
        }
        let n_traces = declared_traces as usize;
        let n_samples = declared_samples as usize;
        let expected = 4usize
            .checked_mul(n_samples)
            .and_then(|bytes| bytes.checked_add(TRACE_HEADER_SIZE))
            .and_then(|trace| trace.checked_mul(n_traces))
            .and_then(|body| body.checked_add(FILE_HEADER_SIZE))
            .ok_or_else(|| {
                SffError::InvalidField(format!(
                    "declared geometry of {declared_traces} traces of {declared_samples} samples overflows"
                ))
            })?;
        if data.len() != expected {
            return Err(SffError::TruncatedFile {
                expected,
                actual: data.len(),
            });
        }
        let trace_size = TRACE_HEADER_SIZE + 4 * n_samples;
        let mut traces = Vec::with_capacity(n_traces);
        for i in 0..n_traces {
            let offset = FILE_HEADER_SIZE + i * trace_size;
            let header = TraceHeader::from_bytes(&data[offset..])?;
            let mut samples = Vec::with_capacity(n_samples);
            let data_offset = offset + TRACE_HEADER_SIZE;
            for j in 0..n_samples {
                samples.push(BigEndian::read_f32(&data[data_offset + j * 4..]));
            }
            traces.push(Trace {
                header,
                data: samples,
            });
        }
        debug!(
            traces = n_traces,
            samples = n_samples,
            "decoded SEG-Y trace group"
        );
        Ok(Self {
            textual_header,
            binary_file_header,
            traces,
        })
    }

    /// Serialize the volume. The file-header trace and sample counts are
    /// forced to the geometry actually held.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let n_samples = self
            .traces
            .first()
            .map_or(self.binary_file_header.number_of_samples() as usize, |t| {
                t.data.len()
            });
        for trace in &self.traces {
            if trace.data.len() != n_samples {
                return Err(SffError::InvalidField(format!(
                    "trace {} has {} samples, expected {}",
                    trace.header.trace_number(),
                    trace.data.len(),
                    n_samples
                )));
            }
        }
        let mut file_header = self.binary_file_header.clone();
        file_header.set_number_of_traces(self.traces.len() as i32)?;
        file_header.set_number_of_samples(n_samples as i32)?;

        let trace_size = TRACE_HEADER_SIZE + 4 * n_samples;
        let mut out = Vec::with_capacity(FILE_HEADER_SIZE + self.traces.len() * trace_size);
        out.extend_from_slice(&ascii_to_ebcdic(&self.textual_header));
        out.extend_from_slice(&file_header.to_bytes());
        for trace in &self.traces {
            out.extend_from_slice(&trace.header.to_bytes());
            let start = out.len();
            out.resize(start + 4 * n_samples, 0);
            for (j, &sample) in trace.data.iter().enumerate() {
                BigEndian::write_f32(&mut out[start + j * 4..], sample);
            }
        }
        Ok(out)
    }

    /// Textual header, already translated to ASCII.
    pub fn textual_header(&self) -> &str {
        &self.textual_header
    }

    /// Store ASCII text; it is truncated to 3200 bytes and blank-padded
    /// when the volume is written.
    pub fn set_textual_header(&mut self, text: &str) {
        self.textual_header = text.chars().take(TEXTUAL_HEADER_SIZE).collect();
    }

    pub fn number_of_traces(&self) -> usize {
        self.traces.len()
    }

    /// Samples per trace as declared by the binary file header.
    pub fn samples_per_trace(&self) -> i32 {
        self.binary_file_header.number_of_samples()
    }

    pub fn sampling_period(&self) -> Result<f64> {
        self.binary_file_header.sampling_period()
    }

    pub fn sampling_rate(&self) -> Result<f64> {
        self.binary_file_header.sampling_rate()
    }

    pub fn get_trace(&self, index: usize) -> Result<&Trace> {
        self.traces.get(index).ok_or(SffError::IndexOutOfRange {
            index,
            count: self.traces.len(),
        })
    }

    pub fn traces(&self) -> &[Trace] {
        &self.traces
    }

    pub fn add_trace(&mut self, trace: Trace) {
        self.traces.push(trace);
    }
}

impl Default for TraceGroup {
    fn default() -> Self {
        Self::new()
    }
}

fn ebcdic_to_ascii(data: &[u8]) -> String {
    data.iter()
        .map(|&b| char::from(EBCDIC_TO_ASCII[b as usize]))
        .collect()
}

fn ascii_to_ebcdic(text: &str) -> [u8; TEXTUAL_HEADER_SIZE] {
    // Non-ASCII input degrades to blanks; the textual header is ASCII by
    // construction when it came from a decode.
    let mut out = [ASCII_TO_EBCDIC[b' ' as usize]; TEXTUAL_HEADER_SIZE];
    for (slot, c) in out.iter_mut().zip(text.chars()) {
        let byte = if c.is_ascii() { c as u8 } else { b' ' };
        *slot = ASCII_TO_EBCDIC[byte as usize];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_group() -> TraceGroup {
        let mut group = TraceGroup::new();
        group.set_textual_header("C 1 CLIENT FORGE DAS TEST");
        group
            .binary_file_header
            .set_sampling_interval(500)
            .unwrap();

        let mut start = Time::new();
        start.set_year(2019).unwrap();
        start.set_day_of_year(117).unwrap();
        start.set_hour(0).unwrap();
        start.set_minute(0).unwrap();
        start.set_second(8).unwrap();

        for i in 0..2 {
            let mut trace = Trace::new();
            trace.header.set_trace_number(i + 1);
            trace.header.set_sampling_interval(500).unwrap();
            trace.header.set_start_time(&start);
            trace.header.set_correlated(true);
            trace.header.set_distance_along_fiber(10 * (i + 1));
            trace
                .set_data((0..16).map(|j| (i * 16 + j) as f32 * 0.5).collect())
                .unwrap();
            group.add_trace(trace);
        }
        group
    }

    #[test]
    fn test_group_round_trip() {
        let group = sample_group();
        let bytes = group.to_bytes().unwrap();
        assert_eq!(bytes.len(), FILE_HEADER_SIZE + 2 * (TRACE_HEADER_SIZE + 64));

        let decoded = TraceGroup::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.number_of_traces(), 2);
        assert_eq!(decoded.binary_file_header.number_of_traces(), 2);
        assert_eq!(decoded.samples_per_trace(), 16);
        assert!((decoded.sampling_rate().unwrap() - 2000.0).abs() < 1e-9);
        assert!((decoded.sampling_period().unwrap() - 500e-6).abs() < 1e-12);
        assert!(decoded.textual_header().starts_with("C 1 CLIENT FORGE DAS TEST"));

        let trace = decoded.get_trace(0).unwrap();
        assert_eq!(trace.trace_number(), 1);
        assert!(trace.is_correlated());
        assert_eq!(trace.distance_along_fiber(), 10);
        assert!((trace.sampling_rate().unwrap() - 2000.0).abs() < 1e-9);
        assert!((trace.sampling_period().unwrap() - 500e-6).abs() < 1e-12);
        let start = trace.start_time();
        assert_eq!(start.year(), 2019);
        assert_eq!(start.day_of_year(), 117);
        assert_eq!(start.hour(), 0);
        assert_eq!(start.minute(), 0);
        assert_eq!(start.second(), 8);
        assert_eq!(trace.data()[3], 1.5);

        // Re-encode is byte-identical.
        assert_eq!(decoded.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_unsupported_data_format() {
        let mut bytes = sample_group().to_bytes().unwrap();
        // Overwrite the data format code in the binary file header.
        bytes[TEXTUAL_HEADER_SIZE + 24] = 0;
        bytes[TEXTUAL_HEADER_SIZE + 25] = 1;
        assert!(matches!(
            TraceGroup::from_bytes(&bytes),
            Err(SffError::UnsupportedFormatVersion(1))
        ));
    }

    #[test]
    fn test_size_mismatch() {
        let bytes = sample_group().to_bytes().unwrap();
        match TraceGroup::from_bytes(&bytes[..bytes.len() - 4]) {
            Err(SffError::TruncatedFile { expected, actual }) => {
                assert_eq!(expected, bytes.len());
                assert_eq!(actual, bytes.len() - 4);
            }
            other => panic!("expected TruncatedFile, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_trace_count_is_rejected() {
        let mut bytes = sample_group().to_bytes().unwrap();
        bytes.truncate(FILE_HEADER_SIZE);
        BigEndian::write_i16(&mut bytes[TEXTUAL_HEADER_SIZE + 12..], -1);
        assert!(matches!(
            TraceGroup::from_bytes(&bytes),
            Err(SffError::InvalidField(_))
        ));
    }

    #[test]
    fn test_negative_sample_count_is_rejected() {
        let mut bytes = sample_group().to_bytes().unwrap();
        bytes.truncate(FILE_HEADER_SIZE);
        // Clear the 32-bit extension so the negative legacy count rules.
        BigEndian::write_i32(&mut bytes[TEXTUAL_HEADER_SIZE + 62..], 0);
        BigEndian::write_i16(&mut bytes[TEXTUAL_HEADER_SIZE + 20..], -1);
        assert!(matches!(
            TraceGroup::from_bytes(&bytes),
            Err(SffError::InvalidField(_))
        ));
    }

    #[test]
    fn test_short_file_header() {
        assert!(matches!(
            TraceGroup::from_bytes(&[0u8; 100]),
            Err(SffError::TruncatedFile { .. })
        ));
    }

    #[test]
    fn test_trace_index_out_of_range() {
        let group = sample_group();
        match group.get_trace(7) {
            Err(SffError::IndexOutOfRange { index, count }) => {
                assert_eq!(index, 7);
                assert_eq!(count, 2);
            }
            other => panic!("expected IndexOutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_time_basis() {
        let mut header = TraceHeader::new().to_bytes();
        BigEndian::write_i16(&mut header[166..], 1);
        assert!(matches!(
            TraceHeader::from_bytes(&header),
            Err(SffError::InvalidField(_))
        ));
    }

    #[test]
    fn test_unset_start_time_is_epoch_origin() {
        let header = TraceHeader::new();
        assert_eq!(header.start_time(), Time::default());
    }

    #[test]
    fn test_ebcdic_ascii_is_bijective() {
        let mut seen = [false; 256];
        for b in 0u16..256 {
            let a = EBCDIC_TO_ASCII[b as usize];
            assert!(!seen[a as usize]);
            seen[a as usize] = true;
            assert_eq!(ASCII_TO_EBCDIC[a as usize], b as u8);
        }
    }

    #[test]
    fn test_textual_header_translation() {
        let text = "C 1 HELLO segy 123";
        let packed = ascii_to_ebcdic(text);
        let unpacked = ebcdic_to_ascii(&packed);
        assert!(unpacked.starts_with(text));
        assert!(unpacked[text.len()..].bytes().all(|b| b == b' '));
    }
}
