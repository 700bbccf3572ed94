//! HypoInverse-2000 archive text codec.
//!
//! An archive is line-oriented: an event summary line followed by one
//! station archive line per phase pick. Values live in fixed column
//! windows with implied decimal points, so a window is parsed as one
//! signed integer and scaled by the number of fractional digits. Blank
//! windows mean the field is absent; a present field is `Some`.

use tracing::warn;

use crate::time::Time;
use crate::{Result, SffError};

/// Station archive lines are exactly this many columns.
pub const STATION_LINE_WIDTH: usize = 113;
/// Event summary lines carry at least this many columns; trailing vendor
/// extensions are accepted and ignored.
pub const EVENT_LINE_WIDTH: usize = 164;

/// Unit of an amplitude measurement, column-coded on the station line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmplitudeUnits {
    PeakToPeak,
    ZeroToPeak,
    DigitalCounts,
}

impl AmplitudeUnits {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(AmplitudeUnits::PeakToPeak),
            1 => Some(AmplitudeUnits::ZeroToPeak),
            2 => Some(AmplitudeUnits::DigitalCounts),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            AmplitudeUnits::PeakToPeak => 0,
            AmplitudeUnits::ZeroToPeak => 1,
            AmplitudeUnits::DigitalCounts => 2,
        }
    }
}

fn check_line(line: &str, kind: &str, width: usize, exact: bool) -> Result<()> {
    if !line.is_ascii() {
        return Err(SffError::MalformedLine(format!(
            "{kind} line contains non-ASCII bytes"
        )));
    }
    if (exact && line.len() != width) || (!exact && line.len() < width) {
        return Err(SffError::MalformedLine(format!(
            "{kind} line must span {width} columns, got {}",
            line.len()
        )));
    }
    Ok(())
}

/// A blank window is absent; anything else must parse as a signed integer.
fn int_field(line: &str, a: usize, b: usize) -> Result<Option<i64>> {
    let window = line[a..b].trim();
    if window.is_empty() {
        return Ok(None);
    }
    window.parse::<i64>().map(Some).map_err(|_| {
        SffError::MalformedLine(format!(
            "columns {a}..{b}: {window:?} is not an integer"
        ))
    })
}

fn uint_field(line: &str, a: usize, b: usize) -> Result<Option<u64>> {
    let window = line[a..b].trim();
    if window.is_empty() {
        return Ok(None);
    }
    window.parse::<u64>().map(Some).map_err(|_| {
        SffError::MalformedLine(format!(
            "columns {a}..{b}: {window:?} is not an unsigned integer"
        ))
    })
}

/// Implied-decimal field: the window holds `whole` integral digits and
/// the rest are fractional.
fn real_field(line: &str, a: usize, b: usize, whole: usize) -> Result<Option<f64>> {
    let scale = 10f64.powi((b - a - whole) as i32);
    Ok(int_field(line, a, b)?.map(|v| v as f64 / scale))
}

fn char_field(line: &str, at: usize) -> Option<char> {
    line[at..at + 1].chars().next().filter(|&c| c != ' ')
}

fn string_field(line: &str, a: usize, b: usize) -> Option<String> {
    let window = line[a..b].trim_end();
    if window.is_empty() {
        None
    } else {
        Some(window.to_string())
    }
}

/// Right-justified integer; a value wider than the window keeps its
/// leading digits.
fn put_int(buf: &mut [u8], a: usize, b: usize, value: i64, zero_pad: bool) {
    let width = b - a;
    let text = if zero_pad {
        format!("{value:0width$}")
    } else {
        format!("{value:width$}")
    };
    let bytes = text.as_bytes();
    let n = bytes.len().min(width);
    buf[a..a + n].copy_from_slice(&bytes[..n]);
}

fn put_real(buf: &mut [u8], a: usize, b: usize, whole: usize, value: f64, zero_pad: bool) {
    let scale = 10f64.powi((b - a - whole) as i32);
    put_int(buf, a, b, (value * scale).round() as i64, zero_pad);
}

fn put_str(buf: &mut [u8], a: usize, b: usize, value: &str) {
    let bytes = value.as_bytes();
    let n = bytes.len().min(b - a);
    buf[a..a + n].copy_from_slice(&bytes[..n]);
}

fn put_char(buf: &mut [u8], at: usize, value: char) {
    if value.is_ascii() {
        buf[at] = value as u8;
    }
}

fn buffer_to_string(buf: Vec<u8>) -> String {
    buf.into_iter().map(char::from).collect()
}

/// One phase pick on one channel.
///
/// Every field is optional; `pack` leaves absent fields blank except the
/// weight codes, which HypoInverse expects to always be filled (4 for P,
/// 0 for S, matching what the UUSS pickers emit).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationArchiveLine {
    pub station: Option<String>,
    pub network: Option<String>,
    pub channel: Option<String>,
    pub location_code: Option<String>,
    pub p_remark: Option<String>,
    pub s_remark: Option<String>,
    pub first_motion: Option<char>,
    pub p_pick_time: Option<Time>,
    pub s_pick_time: Option<Time>,
    pub p_weight_code: Option<i32>,
    pub s_weight_code: Option<i32>,
    pub p_residual: Option<f64>,
    pub s_residual: Option<f64>,
    pub p_weight_used: Option<f64>,
    pub s_weight_used: Option<f64>,
    pub p_delay_time: Option<f64>,
    pub s_delay_time: Option<f64>,
    pub epicentral_distance: Option<f64>,
    pub takeoff_angle: Option<f64>,
    pub azimuth: Option<f64>,
    pub amplitude: Option<f64>,
    pub amplitude_units: Option<AmplitudeUnits>,
    pub period_of_amplitude_measurement: Option<f64>,
    pub coda_duration: Option<f64>,
    pub duration_magnitude: Option<f64>,
    pub amplitude_magnitude: Option<f64>,
    pub duration_magnitude_weight_code: Option<i32>,
    pub amplitude_magnitude_weight_code: Option<i32>,
    pub p_importance: Option<f64>,
    pub s_importance: Option<f64>,
    pub data_source_code: Option<char>,
    pub duration_magnitude_label: Option<char>,
    pub amplitude_magnitude_label: Option<char>,
}

impl StationArchiveLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blank every field so the record can be reused.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Parse one station archive line.
    pub fn unpack(line: &str) -> Result<Self> {
        check_line(line, "station archive", STATION_LINE_WIDTH, true)?;
        let mut result = Self::new();
        result.station = string_field(line, 0, 5);
        result.network = string_field(line, 5, 7);
        result.channel = string_field(line, 9, 12);
        result.location_code = string_field(line, 111, 113);
        result.p_remark = string_field(line, 13, 15);
        result.s_remark = string_field(line, 46, 48);
        result.first_motion = char_field(line, 15);

        // Both picks share the date-through-minute windows; the decimal
        // seconds windows carry the offset of each phase.
        let year = int_field(line, 17, 21)?;
        let month = int_field(line, 21, 23)?;
        let day = int_field(line, 23, 25)?;
        let hour = int_field(line, 25, 27)?;
        let minute = int_field(line, 27, 29)?;
        let p_seconds = real_field(line, 29, 34, 3)?;
        let s_seconds = real_field(line, 41, 46, 3)?;
        let base = match (year, month, day, hour, minute) {
            (Some(y), Some(mo), Some(d), Some(h), Some(mi)) => {
                let mut time = Time::new();
                time.set_year(y as i32)?;
                time.set_month(mo as i32)?;
                time.set_day_of_month(d as i32)?;
                time.set_hour(h as i32)?;
                time.set_minute(mi as i32)?;
                Some(time)
            }
            _ => None,
        };
        if let (Some(base), Some(seconds)) = (base, p_seconds) {
            result.p_pick_time = Some(base + seconds);
        }
        if let (Some(base), Some(seconds)) = (base, s_seconds) {
            result.s_pick_time = Some(base + seconds);
        }
        if result.p_remark.is_some() && result.p_pick_time.is_none() {
            warn!(line, "P remark present but the P pick time is unreadable");
        }
        if result.s_remark.is_some() && result.s_pick_time.is_none() {
            warn!(line, "S remark present but the S pick time is unreadable");
        }

        // Pickers fill the weight codes even when the matching pick is
        // absent, so tie them to the pick.
        result.p_weight_code = int_field(line, 16, 17)?
            .filter(|&w| w >= 0 && result.p_pick_time.is_some())
            .map(|w| w as i32);
        result.s_weight_code = int_field(line, 49, 50)?
            .filter(|&w| w >= 0 && result.s_pick_time.is_some())
            .map(|w| w as i32);

        result.p_residual = real_field(line, 34, 38, 2)?;
        result.s_residual = real_field(line, 50, 54, 2)?;
        result.p_weight_used = real_field(line, 38, 41, 1)?.filter(|&w| w >= 0.0);
        result.s_weight_used = real_field(line, 63, 66, 1)?.filter(|&w| w >= 0.0);
        result.p_delay_time = real_field(line, 66, 70, 2)?;
        result.s_delay_time = real_field(line, 70, 74, 2)?;
        result.epicentral_distance = real_field(line, 74, 78, 3)?.filter(|&d| d >= 0.0);
        result.takeoff_angle = int_field(line, 78, 81)?
            .filter(|&a| (0..=180).contains(&a))
            .map(|a| a as f64);
        result.azimuth = int_field(line, 91, 94)?
            .filter(|&a| (0..=360).contains(&a))
            .map(|a| a as f64);
        result.amplitude = real_field(line, 54, 61, 5)?.filter(|&a| a >= 0.0);
        result.amplitude_units =
            int_field(line, 61, 63)?.and_then(AmplitudeUnits::from_code);
        result.period_of_amplitude_measurement =
            real_field(line, 83, 86, 1)?.filter(|&p| p > 0.0);
        result.coda_duration = int_field(line, 87, 91)?
            .filter(|&d| d > 0)
            .map(|d| d as f64);
        result.duration_magnitude = real_field(line, 94, 97, 1)?;
        result.amplitude_magnitude = real_field(line, 97, 100, 1)?;
        result.duration_magnitude_weight_code = int_field(line, 82, 83)?
            .filter(|&w| w >= 0)
            .map(|w| w as i32);
        result.amplitude_magnitude_weight_code = int_field(line, 81, 82)?
            .filter(|&w| w >= 0)
            .map(|w| w as i32);
        result.p_importance = real_field(line, 100, 104, 1)?.filter(|&i| i >= 0.0);
        result.s_importance = real_field(line, 104, 108, 1)?.filter(|&i| i >= 0.0);
        result.data_source_code = char_field(line, 108);
        result.duration_magnitude_label = char_field(line, 109);
        result.amplitude_magnitude_label = char_field(line, 110);
        Ok(result)
    }

    /// Render the line, exactly 113 columns.
    pub fn pack(&self) -> String {
        let mut buf = vec![b' '; STATION_LINE_WIDTH];
        if let Some(s) = &self.station {
            put_str(&mut buf, 0, 5, s);
        }
        if let Some(s) = &self.network {
            put_str(&mut buf, 5, 7, s);
        }
        if let Some(s) = &self.channel {
            put_str(&mut buf, 9, 12, s);
        }
        if let Some(s) = &self.location_code {
            put_str(&mut buf, 111, 113, s);
        }
        if let Some(remark) = &self.p_remark {
            put_str(&mut buf, 13, 15, &pad_remark(remark));
        }
        if let Some(remark) = &self.s_remark {
            put_str(&mut buf, 46, 48, &pad_remark(remark));
        }
        if let Some(motion) = self.first_motion {
            put_char(&mut buf, 15, motion);
        }
        put_int(&mut buf, 16, 17, self.p_weight_code.unwrap_or(4).into(), true);
        put_int(&mut buf, 49, 50, self.s_weight_code.unwrap_or(0).into(), true);
        if let Some(pick) = self.p_pick_time.or(self.s_pick_time) {
            put_int(&mut buf, 17, 21, pick.year().into(), true);
            put_int(&mut buf, 21, 23, pick.month().into(), true);
            put_int(&mut buf, 23, 25, pick.day_of_month().into(), true);
            put_int(&mut buf, 25, 27, pick.hour().into(), true);
            put_int(&mut buf, 27, 29, pick.minute().into(), true);
        }
        if let Some(pick) = self.p_pick_time {
            put_int(&mut buf, 30, 32, pick.second().into(), false);
            put_int(&mut buf, 32, 34, (pick.microsecond() / 10000).into(), true);
        }
        if let Some(pick) = self.s_pick_time {
            put_int(&mut buf, 42, 44, pick.second().into(), false);
            put_int(&mut buf, 44, 46, (pick.microsecond() / 10000).into(), true);
        }
        if let Some(v) = self.p_residual {
            put_real(&mut buf, 34, 38, 2, v, false);
        }
        if let Some(v) = self.s_residual {
            put_real(&mut buf, 50, 54, 2, v, false);
        }
        if let Some(v) = self.p_weight_used {
            put_real(&mut buf, 38, 41, 1, v, false);
        }
        if let Some(v) = self.s_weight_used {
            put_real(&mut buf, 63, 66, 1, v, false);
        }
        if let Some(v) = self.p_delay_time {
            put_real(&mut buf, 66, 70, 2, v, false);
        }
        if let Some(v) = self.s_delay_time {
            put_real(&mut buf, 70, 74, 2, v, false);
        }
        if let Some(v) = self.epicentral_distance {
            put_real(&mut buf, 74, 78, 3, v, false);
        }
        if let Some(v) = self.takeoff_angle {
            put_int(&mut buf, 78, 81, v.round() as i64, false);
        }
        if let Some(v) = self.azimuth {
            put_int(&mut buf, 91, 94, v.round() as i64, false);
        }
        if let Some(v) = self.amplitude {
            put_real(&mut buf, 54, 61, 5, v, false);
        }
        if let Some(units) = self.amplitude_units {
            put_int(&mut buf, 61, 63, units.code(), false);
        }
        if let Some(v) = self.period_of_amplitude_measurement {
            put_real(&mut buf, 83, 86, 1, v, false);
        }
        if let Some(v) = self.coda_duration {
            put_int(&mut buf, 87, 91, v.round() as i64, false);
        }
        if let Some(v) = self.duration_magnitude {
            put_real(&mut buf, 94, 97, 1, v, false);
        }
        if let Some(v) = self.amplitude_magnitude {
            put_real(&mut buf, 97, 100, 1, v, false);
        }
        if let Some(w) = self.duration_magnitude_weight_code {
            put_int(&mut buf, 82, 83, w.into(), true);
        }
        if let Some(w) = self.amplitude_magnitude_weight_code {
            put_int(&mut buf, 81, 82, w.into(), true);
        }
        if let Some(v) = self.p_importance {
            put_real(&mut buf, 100, 104, 1, v, false);
        }
        if let Some(v) = self.s_importance {
            put_real(&mut buf, 104, 108, 1, v, false);
        }
        if let Some(c) = self.data_source_code {
            put_char(&mut buf, 108, c);
        }
        if let Some(c) = self.duration_magnitude_label {
            put_char(&mut buf, 109, c);
        }
        if let Some(c) = self.amplitude_magnitude_label {
            put_char(&mut buf, 110, c);
        }
        buffer_to_string(buf)
    }
}

/// Remarks are two columns; a single-letter remark keeps its column.
fn pad_remark(remark: &str) -> String {
    if remark.len() == 1 {
        format!("{remark} ")
    } else {
        remark.to_string()
    }
}

/// The hypocenter summary heading an event's block of picks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventSummaryLine {
    pub origin_time: Option<Time>,
    /// Degrees, positive north, in [-90, 90].
    pub latitude: Option<f64>,
    /// Degrees east, wrapped into [0, 360).
    pub longitude: Option<f64>,
    /// Kilometers below the geoid.
    pub depth: Option<f64>,
    pub number_of_weighted_residuals: Option<i32>,
    pub azimuthal_gap: Option<f64>,
    pub distance_to_closest_station: Option<f64>,
    pub residual_travel_time_rms: Option<f64>,
    pub number_of_s_weighted_residuals: Option<i32>,
    pub number_of_first_motions: Option<i32>,
    pub event_identifier: Option<u64>,
    pub preferred_magnitude: Option<f64>,
    pub preferred_magnitude_label: Option<char>,
}

impl EventSummaryLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blank every field so the record can be reused.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Parse one event summary line.
    pub fn unpack(line: &str) -> Result<Self> {
        check_line(line, "event summary", EVENT_LINE_WIDTH, false)?;
        let mut result = Self::new();

        let year = int_field(line, 0, 4)?;
        let month = int_field(line, 4, 6)?;
        let day = int_field(line, 6, 8)?;
        let hour = int_field(line, 8, 10)?;
        let minute = int_field(line, 10, 12)?;
        let second = int_field(line, 12, 14)?;
        let centisecond = int_field(line, 14, 16)?;
        if let (Some(y), Some(mo), Some(d), Some(h), Some(mi), Some(s), Some(cs)) =
            (year, month, day, hour, minute, second, centisecond)
        {
            let mut time = Time::new();
            time.set_year(y as i32)?;
            time.set_month(mo as i32)?;
            time.set_day_of_month(d as i32)?;
            time.set_hour(h as i32)?;
            time.set_minute(mi as i32)?;
            time.set_second(s as i32)?;
            time.set_microsecond(cs as i32 * 10000)?;
            result.origin_time = Some(time);
        }

        let lat_degrees = int_field(line, 16, 18)?;
        let south = char_field(line, 18) == Some('S');
        let lat_minutes = real_field(line, 19, 23, 2)?;
        if let (Some(degrees), Some(minutes)) = (lat_degrees, lat_minutes) {
            let mut latitude = degrees as f64 + minutes / 60.0;
            if south {
                latitude = -latitude;
            }
            if (-90.0..=90.0).contains(&latitude) {
                result.latitude = Some(latitude);
            } else {
                warn!(latitude, "latitude out of range, dropping it");
            }
        }

        let lon_degrees = int_field(line, 23, 26)?;
        let east = char_field(line, 26) == Some('E');
        let lon_minutes = real_field(line, 27, 31, 2)?;
        if let (Some(degrees), Some(minutes)) = (lon_degrees, lon_minutes) {
            let mut longitude = -(degrees as f64 + minutes / 60.0);
            if east {
                longitude = -longitude;
            }
            result.longitude = Some(wrap_longitude(longitude));
        }

        result.depth = real_field(line, 31, 36, 3)?;
        result.number_of_weighted_residuals = int_field(line, 39, 42)?
            .filter(|&n| n >= 0)
            .map(|n| n as i32);
        result.azimuthal_gap = int_field(line, 42, 45)?
            .filter(|&g| (0..360).contains(&g))
            .map(|g| g as f64);
        result.distance_to_closest_station = int_field(line, 45, 48)?
            .filter(|&d| d >= 0)
            .map(|d| d as f64);
        result.residual_travel_time_rms = real_field(line, 48, 52, 2)?.filter(|&r| r >= 0.0);
        result.number_of_s_weighted_residuals = int_field(line, 82, 85)?
            .filter(|&n| n >= 0)
            .map(|n| n as i32);
        result.number_of_first_motions = int_field(line, 93, 96)?
            .filter(|&n| n >= 0)
            .map(|n| n as i32);
        result.event_identifier = uint_field(line, 136, 146)?;
        result.preferred_magnitude_label = char_field(line, 146);
        result.preferred_magnitude = real_field(line, 147, 150, 1)?;
        Ok(result)
    }

    /// Render the line, exactly 164 columns. Vendor columns past the
    /// modeled fields come out blank.
    pub fn pack(&self) -> String {
        let mut buf = vec![b' '; EVENT_LINE_WIDTH];
        if let Some(origin) = self.origin_time {
            put_int(&mut buf, 0, 4, origin.year().into(), true);
            put_int(&mut buf, 4, 6, origin.month().into(), true);
            put_int(&mut buf, 6, 8, origin.day_of_month().into(), true);
            put_int(&mut buf, 8, 10, origin.hour().into(), true);
            put_int(&mut buf, 10, 12, origin.minute().into(), true);
            put_int(&mut buf, 12, 14, origin.second().into(), true);
            put_int(&mut buf, 14, 16, (origin.microsecond() / 10000).into(), true);
        }
        if let Some(latitude) = self.latitude {
            let whole = latitude.trunc();
            put_int(&mut buf, 16, 18, whole.abs() as i64, false);
            if latitude < 0.0 {
                put_char(&mut buf, 18, 'S');
            }
            let minutes = (latitude.abs() - whole.abs()) * 60.0;
            put_int(&mut buf, 19, 23, (minutes * 100.0).round() as i64, false);
        }
        if let Some(longitude) = self.longitude {
            let mut lon = longitude;
            if lon > 180.0 {
                lon -= 360.0;
            }
            let whole = lon.trunc();
            put_int(&mut buf, 23, 26, whole.abs() as i64, false);
            if whole > 0.0 {
                put_char(&mut buf, 26, 'E');
            }
            let minutes = (lon.abs() - whole.abs()) * 60.0;
            put_int(&mut buf, 27, 31, (minutes * 100.0).round() as i64, false);
        }
        if let Some(v) = self.depth {
            put_real(&mut buf, 31, 36, 3, v, false);
        }
        if let Some(n) = self.number_of_weighted_residuals {
            put_int(&mut buf, 39, 42, n.into(), false);
        }
        if let Some(v) = self.azimuthal_gap {
            put_int(&mut buf, 42, 45, v.round() as i64, false);
        }
        if let Some(v) = self.distance_to_closest_station {
            put_int(&mut buf, 45, 48, v.round() as i64, false);
        }
        if let Some(v) = self.residual_travel_time_rms {
            put_real(&mut buf, 48, 52, 2, v, false);
        }
        if let Some(n) = self.number_of_s_weighted_residuals {
            put_int(&mut buf, 82, 85, n.into(), false);
        }
        if let Some(n) = self.number_of_first_motions {
            put_int(&mut buf, 93, 96, n.into(), false);
        }
        if let Some(id) = self.event_identifier {
            put_int(&mut buf, 136, 146, id as i64, false);
        }
        if let Some(c) = self.preferred_magnitude_label {
            put_char(&mut buf, 146, c);
        }
        if let Some(v) = self.preferred_magnitude {
            put_real(&mut buf, 147, 150, 1, v, false);
        }
        buffer_to_string(buf)
    }
}

fn wrap_longitude(mut longitude: f64) -> f64 {
    while longitude < 0.0 {
        longitude += 360.0;
    }
    while longitude >= 360.0 {
        longitude -= 360.0;
    }
    longitude
}

#[cfg(test)]
mod tests {
    use super::*;

    const P_LINE: &str = "RBU  UU  EHZ IPU0202003181320 2596 -14198        0                   0     218110 0      84 85227    300     D 02";
    const S_LINE: &str = "NOQ  UU  HHN    4202003181320             2689ES 2 -15   1424 0 24       0 1341210  14     199   251       0J L01";
    const E_LINE: &str = "202003181320217640 4594112  399  771    24 83  4  1633184  88154 5  44298     33    1  44  87  4     100    47       D 24 L237 20         60363637L237  20        5FUUP1";

    fn assert_near(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() < tol, "{a} != {b}");
    }

    #[test]
    fn test_unpack_p_station_line() {
        let pick = StationArchiveLine::unpack(P_LINE).unwrap();
        assert_eq!(pick.station.as_deref(), Some("RBU"));
        assert_eq!(pick.network.as_deref(), Some("UU"));
        assert_eq!(pick.channel.as_deref(), Some("EHZ"));
        assert_eq!(pick.location_code.as_deref(), Some("02"));
        assert_eq!(pick.p_remark.as_deref(), Some("IP"));
        assert_eq!(pick.first_motion, Some('U'));
        assert_eq!(pick.p_weight_code, Some(0));

        let time = pick.p_pick_time.unwrap();
        assert_eq!(time.year(), 2020);
        assert_eq!(time.month(), 3);
        assert_eq!(time.day_of_month(), 18);
        assert_eq!(time.hour(), 13);
        assert_eq!(time.minute(), 20);
        assert_eq!(time.second(), 25);
        assert_eq!(time.microsecond(), 960_000);

        assert_near(pick.p_residual.unwrap(), -0.14, 1e-8);
        assert_near(pick.p_weight_used.unwrap(), 1.98, 1e-8);
        assert_near(pick.p_delay_time.unwrap(), 0.0, 1e-8);
        assert_near(pick.epicentral_distance.unwrap(), 21.8, 1e-8);
        assert_near(pick.takeoff_angle.unwrap(), 110.0, 1e-8);
        assert_near(pick.azimuth.unwrap(), 85.0, 1e-8);
        assert_near(pick.coda_duration.unwrap(), 84.0, 1e-8);
        assert_near(pick.duration_magnitude.unwrap(), 2.27, 1e-8);
        assert_eq!(pick.duration_magnitude_weight_code, Some(0));
        assert_eq!(pick.duration_magnitude_label, Some('D'));
        assert_near(pick.p_importance.unwrap(), 0.3, 1e-8);

        assert!(pick.s_pick_time.is_none());
        assert!(pick.s_remark.is_none());
        assert!(pick.s_weight_code.is_none());
        assert!(pick.amplitude.is_none());
        assert!(pick.amplitude_units.is_none());
        assert!(pick.amplitude_magnitude.is_none());
        assert!(pick.amplitude_magnitude_weight_code.is_none());
        assert!(pick.period_of_amplitude_measurement.is_none());
        assert!(pick.data_source_code.is_none());
    }

    #[test]
    fn test_unpack_s_station_line() {
        let pick = StationArchiveLine::unpack(S_LINE).unwrap();
        assert_eq!(pick.station.as_deref(), Some("NOQ"));
        assert_eq!(pick.network.as_deref(), Some("UU"));
        assert_eq!(pick.channel.as_deref(), Some("HHN"));
        assert_eq!(pick.location_code.as_deref(), Some("01"));
        assert_eq!(pick.s_remark.as_deref(), Some("ES"));
        assert_eq!(pick.s_weight_code, Some(2));

        let time = pick.s_pick_time.unwrap();
        assert_eq!(time.hour(), 13);
        assert_eq!(time.minute(), 20);
        assert_eq!(time.second(), 26);
        assert_eq!(time.microsecond(), 890_000);

        assert_near(pick.s_residual.unwrap(), -0.15, 1e-8);
        assert_near(pick.s_weight_used.unwrap(), 0.24, 1e-8);
        assert_near(pick.s_delay_time.unwrap(), 0.0, 1e-8);
        assert_near(pick.epicentral_distance.unwrap(), 13.4, 1e-8);
        assert_near(pick.takeoff_angle.unwrap(), 121.0, 1e-8);
        assert_near(pick.azimuth.unwrap(), 199.0, 1e-8);
        assert_near(pick.amplitude.unwrap(), 14.24, 1e-8);
        assert_eq!(pick.amplitude_units, Some(AmplitudeUnits::PeakToPeak));
        assert_near(pick.amplitude_magnitude.unwrap(), 2.51, 1e-8);
        assert_eq!(pick.amplitude_magnitude_weight_code, Some(0));
        assert_eq!(pick.amplitude_magnitude_label, Some('L'));
        assert_near(pick.period_of_amplitude_measurement.unwrap(), 0.14, 1e-8);
        assert_near(pick.s_importance.unwrap(), 0.0, 1e-8);
        assert_eq!(pick.data_source_code, Some('J'));

        // No P phase on this line even though a weight code column is
        // filled.
        assert!(pick.p_pick_time.is_none());
        assert!(pick.p_weight_code.is_none());
        assert!(pick.p_remark.is_none());
        assert!(pick.first_motion.is_none());
        assert!(pick.coda_duration.is_none());
        assert!(pick.duration_magnitude.is_none());
        assert!(pick.duration_magnitude_weight_code.is_none());
    }

    #[test]
    fn test_station_line_round_trips() {
        for line in [P_LINE, S_LINE] {
            let pick = StationArchiveLine::unpack(line).unwrap();
            assert_eq!(pick.pack(), line);
        }
    }

    #[test]
    fn test_unpack_event_summary_line() {
        let summary = EventSummaryLine::unpack(E_LINE).unwrap();

        let origin = summary.origin_time.unwrap();
        assert_eq!(origin.year(), 2020);
        assert_eq!(origin.month(), 3);
        assert_eq!(origin.day_of_month(), 18);
        assert_eq!(origin.hour(), 13);
        assert_eq!(origin.minute(), 20);
        assert_eq!(origin.second(), 21);
        assert_eq!(origin.microsecond(), 760_000);

        assert_near(summary.latitude.unwrap(), 40.7657, 1e-4);
        let mut longitude = summary.longitude.unwrap();
        if longitude > 180.0 {
            longitude -= 360.0;
        }
        assert_near(longitude, -112.0665, 1e-4);
        assert_near(summary.depth.unwrap(), 7.71, 1e-8);
        assert_eq!(summary.number_of_weighted_residuals, Some(24));
        assert_near(summary.azimuthal_gap.unwrap(), 83.0, 1e-8);
        assert_near(summary.distance_to_closest_station.unwrap(), 4.0, 1e-8);
        assert_near(summary.residual_travel_time_rms.unwrap(), 0.16, 1e-8);
        assert_eq!(summary.number_of_s_weighted_residuals, Some(1));
        assert_eq!(summary.number_of_first_motions, Some(4));
        assert_eq!(summary.event_identifier, Some(60363637));
        assert_eq!(summary.preferred_magnitude_label, Some('L'));
        assert_near(summary.preferred_magnitude.unwrap(), 2.37, 1e-8);
    }

    #[test]
    fn test_event_summary_pack_is_idempotent() {
        let summary = EventSummaryLine::unpack(E_LINE).unwrap();
        let packed = summary.pack();
        assert_eq!(packed.len(), EVENT_LINE_WIDTH);
        // Modeled windows reproduce the source line exactly.
        assert_eq!(&packed[0..36], &E_LINE[0..36]);
        assert_eq!(&packed[39..52], &E_LINE[39..52]);
        assert_eq!(&packed[82..85], &E_LINE[82..85]);
        assert_eq!(&packed[93..96], &E_LINE[93..96]);
        assert_eq!(&packed[136..150], &E_LINE[136..150]);

        let reparsed = EventSummaryLine::unpack(&packed).unwrap();
        assert_eq!(reparsed.pack(), packed);
        assert_eq!(reparsed, summary);
    }

    #[test]
    fn test_station_line_length_is_enforced() {
        assert!(matches!(
            StationArchiveLine::unpack("too short"),
            Err(SffError::MalformedLine(_))
        ));
        let long = format!("{P_LINE} ");
        assert!(StationArchiveLine::unpack(&long).is_err());
    }

    #[test]
    fn test_event_line_length_is_enforced() {
        assert!(matches!(
            EventSummaryLine::unpack(&E_LINE[..100]),
            Err(SffError::MalformedLine(_))
        ));
    }

    #[test]
    fn test_garbage_window_is_rejected() {
        let mut corrupt = P_LINE.to_string();
        corrupt.replace_range(74..78, " a18");
        assert!(matches!(
            StationArchiveLine::unpack(&corrupt),
            Err(SffError::MalformedLine(_))
        ));
    }

    #[test]
    fn test_clear_blanks_records_for_reuse() {
        let mut pick = StationArchiveLine::unpack(P_LINE).unwrap();
        pick.clear();
        assert_eq!(pick, StationArchiveLine::new());
        assert!(pick.station.is_none());
        assert!(pick.p_pick_time.is_none());

        let mut summary = EventSummaryLine::unpack(E_LINE).unwrap();
        summary.clear();
        assert_eq!(summary, EventSummaryLine::new());
        assert!(summary.origin_time.is_none());
        assert_eq!(summary.pack(), " ".repeat(EVENT_LINE_WIDTH));
    }

    #[test]
    fn test_pack_defaults_fill_weight_codes() {
        let packed = StationArchiveLine::new().pack();
        assert_eq!(packed.len(), STATION_LINE_WIDTH);
        assert_eq!(&packed[16..17], "4");
        assert_eq!(&packed[49..50], "0");
    }

    #[test]
    fn test_amplitude_units_codes() {
        assert_eq!(
            AmplitudeUnits::from_code(2),
            Some(AmplitudeUnits::DigitalCounts)
        );
        assert_eq!(AmplitudeUnits::from_code(3), None);
        assert_eq!(AmplitudeUnits::ZeroToPeak.code(), 1);
    }
}
