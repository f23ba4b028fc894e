//! Fixed US-Eastern civil time rule.
//!
//! Daylight time runs from the second Sunday of March at 02:00 until the
//! first Sunday of November at 02:00. The transition checks compare the RTC's
//! UTC day and hour directly against those boundaries, and the shifted day is
//! never carried into the month or year. Both are display-only approximations.

use chrono::Weekday;

use crate::types::{CivilTimestamp, LocalTimestamp};

pub const STANDARD_OFFSET_HOURS: i32 = -5;
pub const DAYLIGHT_OFFSET_HOURS: i32 = -4;
pub const TRANSITION_HOUR: u32 = 2;

/// Day of month of the `n`-th `weekday` in the month, from Zeller's
/// congruence on the 1st.
pub fn nth_weekday_of_month(year: i32, month: u32, weekday: Weekday, n: u32) -> u32 {
    let (m, y) = if month < 3 {
        (month as i32 + 12, year - 1)
    } else {
        (month as i32, year)
    };

    let k = y.rem_euclid(100);
    let j = y.div_euclid(100);
    // 0 = Saturday
    let h = (1 + (13 * (m + 1)) / 5 + k + k / 4 + j / 4 - 2 * j).rem_euclid(7);

    // 1 = Sunday
    let first_weekday = (h + 6) % 7 + 1;
    let target = weekday.number_from_sunday() as i32;
    let offset = (target - first_weekday + 7) % 7;

    (1 + offset) as u32 + n.saturating_sub(1) * 7
}

pub fn is_daylight_active(year: i32, month: u32, day: u32, hour: u32) -> bool {
    match month {
        4..=10 => true,
        3 => {
            let start = nth_weekday_of_month(year, 3, Weekday::Sun, 2);
            day > start || (day == start && hour >= TRANSITION_HOUR)
        }
        11 => {
            let end = nth_weekday_of_month(year, 11, Weekday::Sun, 1);
            day < end || (day == end && hour < TRANSITION_HOUR)
        }
        _ => false,
    }
}

/// Shifts a UTC hour into local time, moving the day by one when the hour
/// wraps. Returns `(hour, day)`.
pub fn offset_hour_and_day(hour: u32, day: u32, month: u32, year: i32) -> (u32, u32) {
    let offset = if is_daylight_active(year, month, day, hour) {
        DAYLIGHT_OFFSET_HOURS
    } else {
        STANDARD_OFFSET_HOURS
    };

    let shifted = hour as i32 + offset;
    if shifted < 0 {
        ((shifted + 24) as u32, day.saturating_sub(1))
    } else if shifted >= 24 {
        ((shifted - 24) as u32, day + 1)
    } else {
        (shifted as u32, day)
    }
}

pub fn apply_offset(utc: &CivilTimestamp) -> LocalTimestamp {
    let (hour, day) = offset_hour_and_day(utc.hour, utc.day, utc.month, utc.year);
    LocalTimestamp {
        year: utc.year,
        month: utc.month,
        day,
        hour,
        minute: utc.minute,
        second: utc.second,
        daylight: is_daylight_active(utc.year, utc.month, utc.day, utc.hour),
    }
}
