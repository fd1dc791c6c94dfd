//! Concurrent harvest scheduling.
//!
//! Fans the (year × month × day × city) grid out as one [`DayTask`] per
//! cell, executed under a bounded concurrency window via
//! `futures::stream::buffer_unordered`. A single day's failure never
//! aborts the run: terminal failures are captured as [`FailureRecord`]
//! data and surfaced in the [`HarvestSummary`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, StreamExt as _};
use meteo_harvest_models::{
    CityRef, DayTask, FailureKind, FailureRecord, FetchOutcome, HarvestSummary, MonthPolicy,
    RawRecord,
};

use crate::calendar::day_grid;
use crate::extract::{self, ExtractError};
use crate::fetch::Fetch;
use crate::progress::ProgressCallback;

/// Default size of the concurrency window. The source site has no rate
/// limit feedback, so the window stays small.
pub const DEFAULT_CONCURRENCY: usize = 12;

/// Default retry bound for transient failures.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Default base delay for exponential backoff.
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_millis(500);

/// Tuning knobs for a harvest run.
#[derive(Debug, Clone)]
pub struct HarvestOptions {
    /// Maximum simultaneous in-flight fetches.
    pub concurrency: usize,
    /// Retries for transient failures (timeout, network, 5xx).
    pub max_retries: u32,
    /// Backoff base; attempt `n` waits `base * 2^(n-1)`.
    pub backoff_base: Duration,
    /// Which months to harvest per year.
    pub month_policy: MonthPolicy,
}

impl Default for HarvestOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base: DEFAULT_BACKOFF_BASE,
            month_policy: MonthPolicy::full_years(),
        }
    }
}

/// Everything a completed (or cancelled) harvest run produced.
#[derive(Debug, Default)]
pub struct HarvestOutput {
    /// One raw record per successfully fetched day page, arrival order.
    pub records: Vec<RawRecord>,
    /// Terminal per-task failures.
    pub failures: Vec<FailureRecord>,
    /// Aggregate counts for the run.
    pub summary: HarvestSummary,
}

/// Enumerates the full task grid: years × policy months × cities ×
/// valid days. Day validity comes from [`day_grid`], so an invalid date
/// is never scheduled.
fn build_grid(cities: &[CityRef], years: &[i32], policy: &MonthPolicy) -> Vec<DayTask> {
    let mut tasks = Vec::new();
    for &year in years {
        for month in policy.months_for_year(year) {
            for city in cities {
                for day in day_grid(year, month) {
                    tasks.push(DayTask {
                        city: city.clone(),
                        year,
                        month,
                        day,
                    });
                }
            }
        }
    }
    tasks
}

/// Runs one day task to a terminal outcome: fetch, extract, and retry
/// transient failures up to the configured bound with exponential
/// backoff. Non-transient failures (4xx, malformed page) fail
/// immediately.
async fn run_task<F: Fetch>(fetcher: &F, task: DayTask, options: &HarvestOptions) -> FetchOutcome {
    let url = task.url();
    let mut attempt: u32 = 0;

    loop {
        let kind = match fetcher.fetch(&url).await {
            Ok(body) => match extract::extract_day(&body, &task.date_string()) {
                Ok(record) => return FetchOutcome::Success(record),
                Err(ExtractError::MalformedPage(message)) => {
                    log::debug!("{task}: {message}");
                    FailureKind::MalformedPage
                }
            },
            Err(ref e) => FailureKind::from(e),
        };

        if kind.is_transient() && attempt < options.max_retries {
            attempt += 1;
            let delay = options.backoff_base * (1_u32 << (attempt - 1));
            log::warn!(
                "{task}: {kind}, retry {attempt}/{} in {delay:?}",
                options.max_retries
            );
            tokio::time::sleep(delay).await;
            continue;
        }

        return FetchOutcome::Failure(kind, task);
    }
}

/// Harvests every day page of the grid and collects the outcomes.
///
/// At most `options.concurrency` fetches are in flight at once; the
/// single stream consumer is the serialization point for appends, so no
/// lock is needed around the result collections. Completion order
/// across tasks is unspecified — each record carries its own date tag.
///
/// Setting `cancel` stops admitting new tasks promptly; in-flight tasks
/// finish and their results are kept, so partial output stays usable.
pub async fn harvest<F: Fetch>(
    fetcher: &F,
    cities: &[CityRef],
    years: &[i32],
    options: &HarvestOptions,
    progress: &Arc<dyn ProgressCallback>,
    cancel: &AtomicBool,
) -> HarvestOutput {
    let tasks = build_grid(cities, years, &options.month_policy);
    let scheduled = tasks.len();
    log::info!(
        "harvesting {scheduled} day pages across {} cities (concurrency {})",
        cities.len(),
        options.concurrency
    );
    progress.set_total(scheduled as u64);

    let mut outcomes = stream::iter(tasks)
        .take_while(|_| futures::future::ready(!cancel.load(Ordering::Relaxed)))
        .map(|task| run_task(fetcher, task, options))
        .buffer_unordered(options.concurrency.max(1));

    let mut output = HarvestOutput {
        summary: HarvestSummary {
            scheduled,
            ..HarvestSummary::default()
        },
        ..HarvestOutput::default()
    };

    while let Some(outcome) = outcomes.next().await {
        match outcome {
            FetchOutcome::Success(record) => {
                output.records.push(record);
                output.summary.succeeded += 1;
            }
            FetchOutcome::Failure(kind, task) => {
                log::warn!("giving up on {task}: {kind}");
                *output.summary.by_kind.entry(kind).or_insert(0) += 1;
                output.summary.failed += 1;
                output.failures.push(FailureRecord {
                    task,
                    kind,
                    at: Utc::now(),
                });
            }
        }
        progress.inc(1);
    }
    let completed = output.summary.succeeded + output.summary.failed;
    if completed < scheduled {
        log::warn!(
            "harvest cancelled after {completed}/{scheduled} tasks; partial results kept"
        );
    }
    log::info!("harvest finished: {}", output.summary);
    output
}
