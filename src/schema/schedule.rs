use serde::{Deserialize, Serialize};

/// One rule of an actor's weekly time-table.
///
/// Hours are half-open `[start, end)` on a 0–24 clock. `start > end` wraps
/// past midnight, so `22 → 2` covers 22:00–01:59. An empty `days` list means
/// every day; 0 and 7 both mean Sunday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub start: u32,
    pub end: u32,
    pub location: String,
    #[serde(default)]
    pub days: Vec<u32>,
}

impl ScheduleEntry {
    pub fn new(start: u32, end: u32, location: &str) -> Self {
        Self {
            start,
            end,
            location: location.to_string(),
            days: Vec::new(),
        }
    }

    pub fn on_days(mut self, days: &[u32]) -> Self {
        self.days = days.to_vec();
        self
    }

    pub fn wraps(&self) -> bool {
        self.start > self.end
    }

    pub fn applies_on(&self, weekday: u32) -> bool {
        self.days.is_empty() || self.days.iter().any(|d| d % 7 == weekday % 7)
    }

    pub fn covers_hour(&self, hour: u32) -> bool {
        if self.wraps() {
            hour >= self.start || hour < self.end
        } else {
            self.start <= hour && hour < self.end
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overnight_wrap() {
        let e = ScheduleEntry::new(22, 2, "tavern");
        assert!(e.wraps());
        assert!(e.covers_hour(22));
        assert!(e.covers_hour(23));
        assert!(e.covers_hour(0));
        assert!(e.covers_hour(1));
        assert!(!e.covers_hour(2));
        assert!(!e.covers_hour(10));
    }

    #[test]
    fn half_open_range() {
        let e = ScheduleEntry::new(9, 17, "forge");
        assert!(e.covers_hour(9));
        assert!(e.covers_hour(16));
        assert!(!e.covers_hour(17));
        assert!(!e.covers_hour(8));
    }

    #[test]
    fn sunday_is_zero_or_seven() {
        let e = ScheduleEntry::new(9, 12, "chapel").on_days(&[7]);
        assert!(e.applies_on(0));
        assert!(!e.applies_on(1));
        let e = ScheduleEntry::new(9, 12, "chapel").on_days(&[0]);
        assert!(e.applies_on(0));
        assert!(ScheduleEntry::new(0, 24, "x").applies_on(3));
    }
}
