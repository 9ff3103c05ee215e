use std::fmt;
use std::ops::{Add, Sub};

/// Timecode layouts used by the supported subtitle formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFormat {
    /// `HH:MM:SS,mmm`
    Srt,
    /// `HH:MM:SS.mmm`
    Vtt,
    /// `H:MM:SS.cc`
    Ass,
}

/// A point on the subtitle timeline, in milliseconds since the start.
///
/// Values may be negative once an offset has been applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time(i64);

impl Time {
    pub const ZERO: Time = Time(0);

    pub fn from_millis(millis: i64) -> Self {
        Time(millis)
    }

    pub fn from_hms(hours: i64, minutes: i64, seconds: i64, millis: i64) -> Self {
        Time(
            hours
                .saturating_mul(3_600_000)
                .saturating_add(minutes.saturating_mul(60_000))
                .saturating_add(seconds.saturating_mul(1_000))
                .saturating_add(millis),
        )
    }

    pub fn millis(self) -> i64 {
        self.0
    }

    pub fn format(self, format: TimeFormat) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let total = self.0.unsigned_abs();
        let hours = total / 3_600_000;
        let minutes = (total % 3_600_000) / 60_000;
        let seconds = (total % 60_000) / 1_000;
        let millis = total % 1_000;
        match format {
            TimeFormat::Srt => format!(
                "{}{:02}:{:02}:{:02},{:03}",
                sign, hours, minutes, seconds, millis
            ),
            TimeFormat::Vtt => format!(
                "{}{:02}:{:02}:{:02}.{:03}",
                sign, hours, minutes, seconds, millis
            ),
            TimeFormat::Ass => format!(
                "{}{}:{:02}:{:02}.{:02}",
                sign,
                hours,
                minutes,
                seconds,
                millis / 10
            ),
        }
    }
}

impl Add<i64> for Time {
    type Output = Time;

    fn add(self, rhs: i64) -> Time {
        Time(self.0.saturating_add(rhs))
    }
}

impl Sub for Time {
    type Output = i64;

    fn sub(self, rhs: Time) -> i64 {
        self.0.saturating_sub(rhs.0)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.format(TimeFormat::Vtt))
    }
}
