/// Game clock: elapsed game seconds since the epoch.
use serde::{Deserialize, Serialize};

pub const SECONDS_PER_MINUTE: u64 = 60;
pub const SECONDS_PER_HOUR: u64 = 3600;
pub const SECONDS_PER_DAY: u64 = 86_400;

pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Monotonic game time. Only the time simulation advances it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameClock(u64);

impl GameClock {
    pub fn at(seconds: u64) -> Self {
        Self(seconds)
    }

    pub fn now(&self) -> u64 {
        self.0
    }

    /// Whole hours since the epoch.
    pub fn total_hours(&self) -> u64 {
        self.0 / SECONDS_PER_HOUR
    }

    pub fn day(&self) -> u64 {
        self.0 / SECONDS_PER_DAY
    }

    /// Hour of day, 0–23.
    pub fn hour(&self) -> u32 {
        ((self.0 % SECONDS_PER_DAY) / SECONDS_PER_HOUR) as u32
    }

    pub fn minute(&self) -> u32 {
        ((self.0 % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE) as u32
    }

    /// Day of week, 0 = Sunday, given the weekday of day zero.
    pub fn weekday(&self, epoch_weekday: u32) -> u32 {
        ((self.day() + u64::from(epoch_weekday % 7)) % 7) as u32
    }

    /// `HH:MM`.
    pub fn time_of_day(&self) -> String {
        format!("{:02}:{:02}", self.hour(), self.minute())
    }

    pub(crate) fn advance(&mut self, seconds: u64) {
        self.0 = self.0.saturating_add(seconds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_fields() {
        let c = GameClock::at(SECONDS_PER_DAY * 2 + 13 * SECONDS_PER_HOUR + 5 * 60 + 59);
        assert_eq!(c.day(), 2);
        assert_eq!(c.hour(), 13);
        assert_eq!(c.minute(), 5);
        assert_eq!(c.time_of_day(), "13:05");
    }

    #[test]
    fn weekday_wraps() {
        let monday_epoch = 1;
        assert_eq!(GameClock::at(0).weekday(monday_epoch), 1);
        assert_eq!(GameClock::at(SECONDS_PER_DAY * 6).weekday(monday_epoch), 0);
        assert_eq!(GameClock::at(0).weekday(7), 0);
        assert_eq!(WEEKDAY_NAMES[GameClock::at(SECONDS_PER_DAY).weekday(0) as usize], "Monday");
    }

    #[test]
    fn advance_never_decreases() {
        let mut c = GameClock::at(10);
        c.advance(0);
        assert_eq!(c.now(), 10);
        c.advance(50);
        assert_eq!(c.now(), 60);
    }
}
