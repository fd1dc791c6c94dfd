//! Day grid generation under proleptic Gregorian rules.
//!
//! The scheduler only ever fetches dates produced by [`day_grid`], so an
//! invalid (year, month, day) combination is never scheduled.

use std::ops::RangeInclusive;

/// Whether `year` is a Gregorian leap year.
#[must_use]
pub const fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Number of days in `(year, month)`.
///
/// # Panics
///
/// Panics if `month` is outside 1–12. Months always come from
/// [`MonthPolicy::months_for_year`], which clamps to that range.
///
/// [`MonthPolicy::months_for_year`]: meteo_harvest_models::MonthPolicy::months_for_year
#[must_use]
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        other => panic!("month out of calendar range: {other}"),
    }
}

/// The valid days of `(year, month)`, `1..=days_in_month`.
#[must_use]
pub fn day_grid(year: i32, month: u32) -> RangeInclusive<u32> {
    1..=days_in_month(year, month)
}
