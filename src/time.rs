//! Microsecond-precision UTC timestamps with calendar/epoch duality.
//!
//! [`Time`] keeps a calendar view (year, month, day, ...) and the POSIX
//! epoch in seconds as an `f64` in sync at all times. Arithmetic works on
//! the epoch and re-derives the calendar, so adding 86400.1 seconds rolls
//! days, months, and years correctly.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};

use crate::{Result, SffError};

/// A UTC time with microsecond resolution.
///
/// Day-of-year and month/day-of-month are equivalent views of the same
/// date; setting either view re-derives the other and the epoch. All
/// setters validate eagerly, so the getters never fail.
#[derive(Debug, Clone, Copy)]
pub struct Time {
    epoch: f64,
    year: i32,
    month: i32,
    day_of_month: i32,
    day_of_year: i32,
    hour: i32,
    minute: i32,
    second: i32,
    microsecond: i32,
    /// Which date view was set last and is authoritative on re-derivation.
    use_day_of_year: bool,
}

impl Time {
    /// 1970-01-01T00:00:00.000000, epoch 0.
    pub fn new() -> Self {
        Self {
            epoch: 0.0,
            year: 1970,
            month: 1,
            day_of_month: 1,
            day_of_year: 1,
            hour: 0,
            minute: 0,
            second: 0,
            microsecond: 0,
            use_day_of_year: false,
        }
    }

    /// Build a time from a POSIX epoch in seconds.
    pub fn from_epoch(epoch: f64) -> Self {
        let mut time = Self::new();
        time.set_epoch(epoch);
        time
    }

    /// Reset to the default epoch.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Set the POSIX epoch and re-derive every calendar field.
    ///
    /// The fractional part is rounded to the nearest microsecond. Negative
    /// epochs split on day boundaries so subfields stay non-negative.
    pub fn set_epoch(&mut self, epoch: f64) {
        let floor = epoch.floor();
        let mut seconds = floor as i64;
        let mut micros = ((epoch - floor) * 1e6).round() as i64;
        if micros >= 1_000_000 {
            seconds += 1;
            micros -= 1_000_000;
        }
        let days = seconds.div_euclid(86_400);
        let second_of_day = seconds.rem_euclid(86_400) as i32;
        let (year, month, day) = civil_from_days(days);
        self.year = year;
        self.month = month;
        self.day_of_month = day;
        self.day_of_year = day_of_year(year, month, day);
        self.hour = second_of_day / 3600;
        self.minute = second_of_day % 3600 / 60;
        self.second = second_of_day % 60;
        self.microsecond = micros as i32;
        self.use_day_of_year = false;
        self.epoch = epoch;
    }

    pub fn set_year(&mut self, year: i32) -> Result<()> {
        if year < 1900 {
            return Err(SffError::InvalidField(format!(
                "year {year} must be at least 1900"
            )));
        }
        self.apply(|t| t.year = year)
    }

    pub fn set_month(&mut self, month: i32) -> Result<()> {
        if !(1..=12).contains(&month) {
            return Err(SffError::InvalidField(format!(
                "month {month} must be in [1,12]"
            )));
        }
        self.apply(|t| {
            t.month = month;
            t.use_day_of_year = false;
        })
    }

    pub fn set_day_of_month(&mut self, day: i32) -> Result<()> {
        if !(1..=31).contains(&day) {
            return Err(SffError::InvalidField(format!(
                "day of month {day} must be in [1,31]"
            )));
        }
        self.apply(|t| {
            t.day_of_month = day;
            t.use_day_of_year = false;
        })
    }

    pub fn set_day_of_year(&mut self, day: i32) -> Result<()> {
        if !(1..=366).contains(&day) {
            return Err(SffError::InvalidField(format!(
                "day of year {day} must be in [1,366]"
            )));
        }
        self.apply(|t| {
            t.day_of_year = day;
            t.use_day_of_year = true;
        })
    }

    pub fn set_hour(&mut self, hour: i32) -> Result<()> {
        if !(0..=23).contains(&hour) {
            return Err(SffError::InvalidField(format!(
                "hour {hour} must be in [0,23]"
            )));
        }
        self.apply(|t| t.hour = hour)
    }

    pub fn set_minute(&mut self, minute: i32) -> Result<()> {
        if !(0..=59).contains(&minute) {
            return Err(SffError::InvalidField(format!(
                "minute {minute} must be in [0,59]"
            )));
        }
        self.apply(|t| t.minute = minute)
    }

    pub fn set_second(&mut self, second: i32) -> Result<()> {
        if !(0..=59).contains(&second) {
            return Err(SffError::InvalidField(format!(
                "second {second} must be in [0,59]"
            )));
        }
        self.apply(|t| t.second = second)
    }

    pub fn set_microsecond(&mut self, microsecond: i32) -> Result<()> {
        if !(0..=999_999).contains(&microsecond) {
            return Err(SffError::InvalidField(format!(
                "microsecond {microsecond} must be in [0,999999]"
            )));
        }
        self.apply(|t| t.microsecond = microsecond)
    }

    /// Apply a calendar mutation, committing only if the result names a
    /// real date. A failed setter leaves the value unchanged.
    fn apply(&mut self, mutate: impl FnOnce(&mut Self)) -> Result<()> {
        let mut next = *self;
        mutate(&mut next);
        next.rederive()?;
        *self = next;
        Ok(())
    }

    pub fn epoch(&self) -> f64 {
        self.epoch
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> i32 {
        self.month
    }

    pub fn day_of_month(&self) -> i32 {
        self.day_of_month
    }

    pub fn day_of_year(&self) -> i32 {
        self.day_of_year
    }

    pub fn hour(&self) -> i32 {
        self.hour
    }

    pub fn minute(&self) -> i32 {
        self.minute
    }

    pub fn second(&self) -> i32 {
        self.second
    }

    pub fn microsecond(&self) -> i32 {
        self.microsecond
    }

    /// Recompute the non-authoritative date view and the epoch from the
    /// calendar fields, rejecting combinations that name no real date.
    fn rederive(&mut self) -> Result<()> {
        if self.use_day_of_year {
            let limit = days_in_year(self.year);
            if self.day_of_year > limit {
                return Err(SffError::InvalidField(format!(
                    "day of year {} out of range for {}",
                    self.day_of_year, self.year
                )));
            }
            let mut month = 1;
            let mut day = self.day_of_year;
            while day > days_in_month(self.year, month) {
                day -= days_in_month(self.year, month);
                month += 1;
            }
            self.month = month;
            self.day_of_month = day;
        } else {
            if self.day_of_month > days_in_month(self.year, self.month) {
                return Err(SffError::InvalidField(format!(
                    "day {} out of range for {:04}-{:02}",
                    self.day_of_month, self.year, self.month
                )));
            }
            self.day_of_year = day_of_year(self.year, self.month, self.day_of_month);
        }
        let days = days_from_civil(self.year, self.month, self.day_of_month);
        self.epoch = days as f64 * 86_400.0
            + f64::from(self.hour * 3600 + self.minute * 60 + self.second)
            + f64::from(self.microsecond) * 1e-6;
        Ok(())
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Time {
    fn eq(&self, other: &Self) -> bool {
        self.year == other.year
            && self.day_of_year == other.day_of_year
            && self.hour == other.hour
            && self.minute == other.minute
            && self.second == other.second
            && self.microsecond == other.microsecond
    }
}

impl PartialOrd for Time {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            return Some(Ordering::Equal);
        }
        self.epoch.partial_cmp(&other.epoch)
    }
}

impl Add<f64> for Time {
    type Output = Time;

    /// Add seconds to the epoch and re-derive the calendar.
    fn add(self, seconds: f64) -> Time {
        Time::from_epoch(self.epoch + seconds)
    }
}

impl Sub<f64> for Time {
    type Output = Time;

    fn sub(self, seconds: f64) -> Time {
        Time::from_epoch(self.epoch - seconds)
    }
}

impl Add<Time> for Time {
    type Output = Time;

    fn add(self, other: Time) -> Time {
        Time::from_epoch(self.epoch + other.epoch)
    }
}

impl Sub<Time> for Time {
    type Output = Time;

    fn sub(self, other: Time) -> Time {
        Time::from_epoch(self.epoch - other.epoch)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:06}",
            self.year, self.month, self.day_of_month, self.hour, self.minute, self.second,
            self.microsecond
        )
    }
}

fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

fn days_in_year(year: i32) -> i32 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

fn days_in_month(year: i32, month: i32) -> i32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        _ => 28,
    }
}

fn day_of_year(year: i32, month: i32, day: i32) -> i32 {
    (1..month).map(|m| days_in_month(year, m)).sum::<i32>() + day
}

/// Days since 1970-01-01 for a proleptic-Gregorian civil date.
fn days_from_civil(year: i32, month: i32, day: i32) -> i64 {
    let y = i64::from(if month <= 2 { year - 1 } else { year });
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let doy = (153 * i64::from((month + 9) % 12) + 2) / 5 + i64::from(day) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Inverse of [`days_from_civil`].
fn civil_from_days(days: i64) -> (i32, i32, i32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as i32;
    let month = if mp < 10 { mp + 3 } else { mp - 9 } as i32;
    let year = (if month <= 2 { y + 1 } else { y }) as i32;
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unix_epoch() {
        let time = Time::new();
        assert_eq!(time.year(), 1970);
        assert_eq!(time.month(), 1);
        assert_eq!(time.day_of_month(), 1);
        assert_eq!(time.day_of_year(), 1);
        assert_eq!(time.hour(), 0);
        assert_eq!(time.minute(), 0);
        assert_eq!(time.second(), 0);
        assert_eq!(time.microsecond(), 0);
        assert_eq!(time.epoch(), 0.0);
    }

    #[test]
    fn test_epoch_to_calendar() {
        let time = Time::from_epoch(1408117832.844);
        assert_eq!(time.year(), 2014);
        assert_eq!(time.month(), 8);
        assert_eq!(time.day_of_year(), 227);
        assert_eq!(time.day_of_month(), 15);
        assert_eq!(time.hour(), 15);
        assert_eq!(time.minute(), 50);
        assert_eq!(time.second(), 32);
        assert_eq!(time.microsecond(), 844_000);
    }

    #[test]
    fn test_calendar_to_epoch_month_day_view() {
        let mut time = Time::new();
        time.set_year(2016).unwrap();
        time.set_month(4).unwrap();
        time.set_day_of_month(11).unwrap();
        time.set_hour(19).unwrap();
        time.set_minute(13).unwrap();
        time.set_second(45).unwrap();
        time.set_microsecond(255_000).unwrap();
        assert!((time.epoch() - 1460402025.255).abs() < 1e-4);
        assert_eq!(time.day_of_year(), 102);
    }

    #[test]
    fn test_calendar_to_epoch_day_of_year_view() {
        let mut time = Time::new();
        time.set_year(2016).unwrap();
        time.set_day_of_year(102).unwrap();
        time.set_hour(19).unwrap();
        time.set_minute(13).unwrap();
        time.set_second(45).unwrap();
        time.set_microsecond(255_000).unwrap();
        assert!((time.epoch() - 1460402025.255).abs() < 1e-4);
        assert_eq!(time.month(), 4);
        assert_eq!(time.day_of_month(), 11);
    }

    #[test]
    fn test_both_views_agree() {
        let mut time = Time::new();
        time.set_year(2020).unwrap();
        time.set_month(1).unwrap();
        time.set_day_of_month(9).unwrap();
        time.set_minute(12).unwrap();
        time.set_second(8).unwrap();
        time.set_microsecond(800_000).unwrap();
        assert!((time.epoch() - 1578528728.8).abs() < 1e-4);
    }

    #[test]
    fn test_add_fractional_day() {
        let start = Time::from_epoch(1578528728.8);
        let later = start + 86400.1;
        assert_eq!(later.year(), 2020);
        assert_eq!(later.month(), 1);
        assert_eq!(later.day_of_month(), 10);
        assert_eq!(later.microsecond(), 900_000);
        let earlier = later - 43200.0;
        assert_eq!(earlier.day_of_month(), 9);
        assert_eq!(earlier.hour(), 12);
        assert_eq!(earlier.microsecond(), 900_000);
    }

    #[test]
    fn test_add_time_values() {
        let mut time = Time::new();
        time.set_year(2020).unwrap();
        time.set_month(1).unwrap();
        time.set_day_of_month(8).unwrap();
        time.set_hour(19).unwrap();
        time.set_minute(50).unwrap();
        time.set_second(45).unwrap();
        time.set_microsecond(372_000).unwrap();
        let day = Time::from_epoch(86400.0);
        let shifted = time + day + day;
        assert!((shifted.epoch() - (1578513045.372 + 2.0 * 86400.0)).abs() < 1e-4);
        let back = shifted - day;
        assert!((back.epoch() - (1578513045.372 + 86400.0)).abs() < 1e-4);
    }

    #[test]
    fn test_comparisons() {
        let t1 = Time::from_epoch(1460402025.255);
        let t2 = Time::from_epoch(1460402425.255);
        assert!(t1 < t2);
        assert!(t2 > t1);
        assert_eq!(t1, t1);
        assert_ne!(t1, t2);
    }

    #[test]
    fn test_display() {
        let time = Time::from_epoch(1460402025.255);
        assert_eq!(format!("{time}"), "2016-04-11T19:13:45.255000");
    }

    #[test]
    fn test_clear() {
        let mut time = Time::from_epoch(1408117832.844);
        time.clear();
        assert_eq!(time, Time::new());
    }

    #[test]
    fn test_rejects_out_of_range_fields() {
        let mut time = Time::new();
        assert!(time.set_year(1800).is_err());
        assert!(time.set_month(13).is_err());
        assert!(time.set_hour(24).is_err());
        assert!(time.set_minute(60).is_err());
        assert!(time.set_second(61).is_err());
        assert!(time.set_microsecond(1_000_000).is_err());
    }

    #[test]
    fn test_rejects_impossible_dates() {
        let mut time = Time::new();
        time.set_year(2021).unwrap();
        time.set_month(2).unwrap();
        assert!(time.set_day_of_month(30).is_err());
        time.set_day_of_month(28).unwrap();
        // 2021 is not a leap year
        assert!(time.set_day_of_year(366).is_err());
        time.set_year(2020).unwrap();
        time.set_day_of_year(366).unwrap();
        assert_eq!(time.month(), 12);
        assert_eq!(time.day_of_month(), 31);
    }

    #[test]
    fn test_negative_epoch_keeps_subfields_positive() {
        let time = Time::from_epoch(-0.5);
        assert_eq!(time.year(), 1969);
        assert_eq!(time.month(), 12);
        assert_eq!(time.day_of_month(), 31);
        assert_eq!(time.hour(), 23);
        assert_eq!(time.minute(), 59);
        assert_eq!(time.second(), 59);
        assert_eq!(time.microsecond(), 500_000);
    }
}
