use crate::domain::model::{ExecutionMode, Mode};
use chrono::{DateTime, Datelike, Utc};

/// Resolve the requested mode against the calendar. Pure so it can be
/// tested with fixed dates instead of the wall clock.
///
/// Monthly runs are scheduled on the 2nd of the month; `Auto` picks that
/// rule up, the force variants bypass it.
pub fn resolve_mode(now: DateTime<Utc>, requested: ExecutionMode) -> Mode {
    match requested {
        ExecutionMode::ForceRegular => Mode::Regular,
        ExecutionMode::ForceMonthly => Mode::Monthly,
        ExecutionMode::Auto => {
            if now.day() == 2 {
                Mode::Monthly
            } else {
                Mode::Regular
            }
        }
    }
}

/// Year and zero-padded month of the calendar month preceding `now`, used
/// as the date partition of the upload path.
pub fn previous_month(now: DateTime<Utc>) -> (i32, String) {
    let (year, month) = if now.month() == 1 {
        (now.year() - 1, 12)
    } else {
        (now.year(), now.month() - 1)
    };
    (year, format!("{:02}", month))
}
