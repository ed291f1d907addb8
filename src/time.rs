// Time-related operations.
use serde::{Deserialize, Serialize};
use time::{Date, Duration};

use crate::types::Day;

// The calendar unit between consecutive game slots. One cadence applies to the whole league.
#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    #[default]
    Day,
    Week,
}

impl Cadence {
    // Get the length of one slot in days.
    pub fn days_per_slot(&self) -> i64 {
        match self {
            Cadence::Day => 1,
            Cadence::Week => 7,
        }
    }
}

// Get the calendar date of a day index, counting from the date of day 0.
pub fn date_of_day(start: Date, cadence: Cadence, day: Day) -> Option<Date> {
    start.checked_add(Duration::days(day as i64 * cadence.days_per_slot()))
}

// Get the amount of calendar days the given number of slots spans.
pub fn span_in_days(cadence: Cadence, slots: Day) -> i64 {
    slots as i64 * cadence.days_per_slot()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_date_of_day() {
        let start = date!(2025 - 10 - 07);
        assert_eq!(date_of_day(start, Cadence::Day, 0), Some(start));
        assert_eq!(date_of_day(start, Cadence::Day, 30), Some(date!(2025 - 11 - 06)));
        assert_eq!(date_of_day(start, Cadence::Week, 2), Some(date!(2025 - 10 - 21)));
    }

    #[test]
    fn test_span_in_days() {
        assert_eq!(span_in_days(Cadence::Week, 18), 126);
        assert_eq!(span_in_days(Cadence::Day, 18), 18);
    }
}
