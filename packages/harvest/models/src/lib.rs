#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared data model for the meteo harvest pipeline.
//!
//! The harvester produces one [`RawRecord`] per successfully fetched
//! (city, date) page. Every record carries the mandatory [`DATE_FIELD`]
//! tag so the aggregate table stays attributable regardless of the order
//! in which concurrent fetches complete.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Name of the mandatory date field attached to every raw record,
/// formatted `YYYY/MM/DD`.
pub const DATE_FIELD: &str = "Date";

/// A navigable city page discovered on the country root page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityRef {
    /// Absolute URL of the city's archive page.
    pub url: String,
    /// Human-readable city name, boilerplate prefix already stripped.
    pub name: String,
}

/// The unit of scheduled work: one city, one calendar date.
///
/// Only valid Gregorian dates are ever constructed — the day grid
/// generator never emits a day past the month's length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayTask {
    /// The city whose page this task fetches.
    pub city: CityRef,
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1–12.
    pub month: u32,
    /// Day of month, valid for `(year, month)`.
    pub day: u32,
}

impl DayTask {
    /// URL of the day page, `{city_url}/{year}/{month:02}/{day:02}`.
    #[must_use]
    pub fn url(&self) -> String {
        format!(
            "{}/{}/{:02}/{:02}",
            self.city.url.trim_end_matches('/'),
            self.year,
            self.month,
            self.day
        )
    }

    /// The date tag carried into the raw record, `YYYY/MM/DD`.
    #[must_use]
    pub fn date_string(&self) -> String {
        format!("{}/{:02}/{:02}", self.year, self.month, self.day)
    }
}

impl fmt::Display for DayTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.city.name, self.date_string())
    }
}

/// One scraped day page: slugified KPI name → raw string value, plus the
/// [`DATE_FIELD`] tag.
///
/// Which KPI fields are present depends on what the source page rendered
/// that day; missing fields are simply absent until normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Field name → raw value, exactly as scraped.
    pub fields: BTreeMap<String, String>,
}

impl RawRecord {
    /// Inserts a scraped field.
    pub fn insert(&mut self, key: String, value: String) {
        self.fields.insert(key, value);
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Tags the record with its `YYYY/MM/DD` date.
    pub fn set_date(&mut self, date: String) {
        self.fields.insert(DATE_FIELD.to_owned(), date);
    }
}

/// Why a single day task failed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FailureKind {
    /// The request exceeded the per-request timeout.
    Timeout,
    /// Connection-level failure (DNS, reset, refused).
    Network,
    /// The server answered with a non-success status.
    #[strum(to_string = "http-{0}")]
    Http(u16),
    /// The page was fetched but the expected table structure was absent.
    MalformedPage,
}

impl FailureKind {
    /// Whether the scheduler should retry this failure.
    ///
    /// Timeouts, connection errors and 5xx responses are transient;
    /// 4xx responses and malformed pages are not.
    #[must_use]
    pub const fn is_transient(self) -> bool {
        match self {
            Self::Timeout | Self::Network => true,
            Self::Http(status) => status >= 500,
            Self::MalformedPage => false,
        }
    }
}

/// A failed day task, captured as data and surfaced in the run summary.
///
/// Per-task failures never propagate past the scheduler boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// The task that failed.
    pub task: DayTask,
    /// Terminal failure kind, after any retries.
    pub kind: FailureKind,
    /// When the task was given up on.
    pub at: DateTime<Utc>,
}

/// Result of one day task flowing out of the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page was fetched and extracted.
    Success(RawRecord),
    /// The task failed terminally.
    Failure(FailureKind, DayTask),
}

/// Aggregate counts for a completed harvest run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestSummary {
    /// Total day tasks admitted to the scheduler.
    pub scheduled: usize,
    /// Tasks that produced a raw record.
    pub succeeded: usize,
    /// Tasks that failed terminally.
    pub failed: usize,
    /// Terminal failures grouped by kind.
    pub by_kind: BTreeMap<FailureKind, usize>,
}

impl fmt::Display for HarvestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} scheduled, {} succeeded, {} failed",
            self.scheduled, self.succeeded, self.failed
        )?;
        if !self.by_kind.is_empty() {
            let breakdown: Vec<String> = self
                .by_kind
                .iter()
                .map(|(kind, count)| format!("{kind}: {count}"))
                .collect();
            write!(f, " ({})", breakdown.join(", "))?;
        }
        Ok(())
    }
}

/// Which months of a year to harvest.
///
/// Defaults to the full year for every year. Callers whose data
/// collection is known to end early supply an explicit per-year override
/// instead of the source's hard-coded calendar cutoffs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthPolicy {
    overrides: BTreeMap<i32, RangeInclusive<u32>>,
}

impl MonthPolicy {
    /// Full-year policy for every year.
    #[must_use]
    pub const fn full_years() -> Self {
        Self {
            overrides: BTreeMap::new(),
        }
    }

    /// Restricts `year` to the given inclusive month range.
    #[must_use]
    pub fn with_months(mut self, year: i32, months: RangeInclusive<u32>) -> Self {
        self.overrides.insert(year, months);
        self
    }

    /// The months to harvest for `year`, clamped to 1–12.
    #[must_use]
    pub fn months_for_year(&self, year: i32) -> RangeInclusive<u32> {
        self.overrides.get(&year).map_or(1..=12, |range| {
            (*range.start()).max(1)..=(*range.end()).min(12)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> DayTask {
        DayTask {
            city: CityRef {
                url: "https://example.net/afrique/cote-d-ivoire/abidjan".to_owned(),
                name: "Abidjan".to_owned(),
            },
            year: 2024,
            month: 3,
            day: 7,
        }
    }

    #[test]
    fn task_url_zero_pads_month_and_day() {
        assert_eq!(
            task().url(),
            "https://example.net/afrique/cote-d-ivoire/abidjan/2024/03/07"
        );
    }

    #[test]
    fn task_url_tolerates_trailing_slash() {
        let mut t = task();
        t.city.url.push('/');
        assert_eq!(
            t.url(),
            "https://example.net/afrique/cote-d-ivoire/abidjan/2024/03/07"
        );
    }

    #[test]
    fn date_string_is_slash_formatted() {
        assert_eq!(task().date_string(), "2024/03/07");
    }

    #[test]
    fn transient_kinds() {
        assert!(FailureKind::Timeout.is_transient());
        assert!(FailureKind::Network.is_transient());
        assert!(FailureKind::Http(503).is_transient());
        assert!(!FailureKind::Http(404).is_transient());
        assert!(!FailureKind::MalformedPage.is_transient());
    }

    #[test]
    fn failure_kind_display_includes_status() {
        assert_eq!(FailureKind::Http(404).to_string(), "http-404");
        assert_eq!(FailureKind::Timeout.to_string(), "timeout");
    }

    #[test]
    fn month_policy_defaults_to_full_year() {
        let policy = MonthPolicy::full_years();
        assert_eq!(policy.months_for_year(2023), 1..=12);
    }

    #[test]
    fn month_policy_override_applies_to_its_year_only() {
        let policy = MonthPolicy::full_years().with_months(2024, 1..=3);
        assert_eq!(policy.months_for_year(2024), 1..=3);
        assert_eq!(policy.months_for_year(2023), 1..=12);
    }

    #[test]
    fn month_policy_clamps_out_of_range_months() {
        let policy = MonthPolicy::full_years().with_months(2024, 0..=14);
        assert_eq!(policy.months_for_year(2024), 1..=12);
    }

    #[test]
    fn summary_display_lists_kind_breakdown() {
        let mut summary = HarvestSummary {
            scheduled: 10,
            succeeded: 8,
            failed: 2,
            ..HarvestSummary::default()
        };
        summary.by_kind.insert(FailureKind::Timeout, 1);
        summary.by_kind.insert(FailureKind::Http(404), 1);
        assert_eq!(
            summary.to_string(),
            "10 scheduled, 8 succeeded, 2 failed (timeout: 1, http-404: 1)"
        );
    }
}
