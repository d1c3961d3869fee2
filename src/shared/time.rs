use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Sub, SubAssign},
};

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta};

/// Layout the dashboard parses: `DD/MM/YYYY HH:mm:ss`.
pub const DMY_HMS_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// An instant on the trip's clock, kept in the UTC offset it was given in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time(DateTime<FixedOffset>);

impl From<DateTime<FixedOffset>> for Time {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self(value)
    }
}

impl Add<Duration> for Time {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        Self(self.0 + TimeDelta::seconds(rhs.0 as i64))
    }
}

impl AddAssign<Duration> for Time {
    fn add_assign(&mut self, rhs: Duration) {
        *self = *self + rhs
    }
}

impl Display for Time {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.to_rfc3339())
    }
}

impl Time {
    /// Parses an ISO-8601 timestamp. Timestamps without an offset are taken as UTC.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Ok(time) = DateTime::parse_from_rfc3339(value) {
            return Some(Self(time));
        }
        let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
            .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
            .ok()?;
        Some(Self(naive.and_utc().fixed_offset()))
    }

    pub fn as_datetime(&self) -> DateTime<FixedOffset> {
        self.0
    }

    pub fn to_dmy_hms_string(&self) -> String {
        self.0.format(DMY_HMS_FORMAT).to_string()
    }

    /// Time elapsed since `earlier`, `None` when `earlier` is in the future.
    pub fn duration_since(&self, earlier: &Self) -> Option<Duration> {
        let seconds = (self.0 - earlier.0).num_seconds();
        u32::try_from(seconds).ok().map(Duration)
    }
}

#[test]
fn parse_format_utc() {
    let time = Time::parse("2025-03-14T08:30:00.000Z").unwrap();
    assert_eq!(time.to_dmy_hms_string(), "14/03/2025 08:30:00");
}

#[test]
fn parse_format_keeps_offset() {
    let time = Time::parse("2025-03-14T08:30:15-05:00").unwrap();
    assert_eq!(time.to_dmy_hms_string(), "14/03/2025 08:30:15");
}

#[test]
fn parse_naive_as_utc() {
    let time = Time::parse("2025-12-31T23:00:00").unwrap();
    let later = time + Duration::from_hours(2);
    assert_eq!(later.to_dmy_hms_string(), "01/01/2026 01:00:00");
}

#[test]
fn parse_without_seconds() {
    let time = Time::parse("2025-03-14T08:30").unwrap();
    assert_eq!(time.to_dmy_hms_string(), "14/03/2025 08:30:00");
}

#[test]
fn invalid_time_test_1() {
    assert!(Time::parse("14/03/2025 08:30:00").is_none())
}

#[test]
fn invalid_time_test_2() {
    assert!(Time::parse("").is_none())
}

#[test]
fn duration_since_test() {
    let start = Time::parse("2025-03-14T08:00:00Z").unwrap();
    let end = start + Duration::from_minutes(90);
    assert_eq!(end.duration_since(&start), Some(Duration::from_minutes(90)));
    assert_eq!(start.duration_since(&end), None);
}

/// A span of time with one second resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration(u32);

impl From<u32> for Duration {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl Duration {
    pub const ZERO: Duration = Duration(0);

    pub const fn from_seconds(secs: u32) -> Self {
        Self(secs)
    }

    /// Rounds to the nearest second, negative and non finite values become zero.
    pub fn from_seconds_f64(secs: f64) -> Self {
        if secs.is_finite() && secs > 0.0 {
            Self(secs.round().min(u32::MAX as f64) as u32)
        } else {
            Self(0)
        }
    }

    pub const fn from_minutes(minutes: u32) -> Self {
        Self(minutes * 60)
    }

    pub const fn from_hours(hours: u32) -> Self {
        Self(hours * 60 * 60)
    }

    pub fn from_hours_f64(hours: f64) -> Self {
        Self::from_seconds_f64(hours * 3600.0)
    }

    pub const fn as_seconds(&self) -> u32 {
        self.0
    }

    pub fn as_minutes(&self) -> f64 {
        self.0 as f64 / 60.0
    }

    pub fn as_hours(&self) -> f64 {
        self.0 as f64 / 3600.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    pub const fn checked_sub(self, rhs: Self) -> Option<Self> {
        match self.0.checked_sub(rhs.0) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }
}

impl Display for Duration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let h = self.0 / 3600;
        let m = (self.0 % 3600) / 60;
        let s = self.0 % 60;
        f.write_fmt(format_args!("{:02}:{:02}:{:02}", h, m, s))
    }
}

impl Sub for Duration {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Duration {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0
    }
}

impl Add for Duration {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Duration {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0
    }
}

impl Sum for Duration {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, duration| acc + duration)
    }
}

#[test]
fn duration_display_test() {
    assert_eq!(Duration::from_seconds(3690).to_string(), "01:01:30");
    assert_eq!(Duration::from_hours(34).to_string(), "34:00:00");
}

#[test]
fn duration_from_f64_test() {
    assert_eq!(Duration::from_seconds_f64(59.6).as_seconds(), 60);
    assert_eq!(Duration::from_seconds_f64(-3.0), Duration::ZERO);
    assert_eq!(Duration::from_seconds_f64(f64::NAN), Duration::ZERO);
    assert_eq!(Duration::from_hours_f64(1.5), Duration::from_minutes(90));
}
