#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command line entry point for the meteo harvest pipeline.
//!
//! One configurable binary replaces the original's pile of near-
//! duplicate driver scripts: country URL, years, month policy, and the
//! tuning knobs (timeout, concurrency window, retries, header skip) are
//! all explicit flags. Resolves the topology, harvests under the
//! bounded concurrency window, normalizes, and hands the typed table to
//! the CSV sink. Ctrl-C stops admitting new day tasks while keeping
//! everything already collected.

mod sink;

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Parser;
use meteo_cli_utils::IndicatifProgress;
use meteo_harvest::fetch::HttpFetcher;
use meteo_harvest::scheduler::{self, HarvestOptions};
use meteo_harvest::topology::{self, resolve_cities};
use meteo_harvest_models::MonthPolicy;
use meteo_normalize::{Schema, normalize};

/// Restricts one year to an inclusive month range, parsed from
/// `YEAR=START-END` (e.g. `2024=1-3`).
#[derive(Debug, Clone, PartialEq, Eq)]
struct MonthOverride {
    year: i32,
    start: u32,
    end: u32,
}

impl FromStr for MonthOverride {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let usage = || format!("expected YEAR=START-END (e.g. 2024=1-3), got '{s}'");
        let (year, span) = s.split_once('=').ok_or_else(usage)?;
        let (start, end) = span.split_once('-').ok_or_else(usage)?;

        let year: i32 = year.trim().parse().map_err(|_| usage())?;
        let start: u32 = start.trim().parse().map_err(|_| usage())?;
        let end: u32 = end.trim().parse().map_err(|_| usage())?;

        if start < 1 || end > 12 || start > end {
            return Err(format!("month range {start}-{end} is not within 1-12"));
        }
        Ok(Self { year, start, end })
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "meteo_harvest",
    about = "Harvest daily weather history for every city of a country into a typed CSV"
)]
struct Args {
    /// Country root page URL
    /// (e.g. https://www.historique-meteo.net/afrique/cote-d-ivoire)
    country_url: String,

    /// Years to harvest, comma separated or repeated
    #[arg(long, required = true, value_delimiter = ',', num_args = 1..)]
    years: Vec<i32>,

    /// Restrict a year to a month range (repeatable)
    #[arg(long = "months", value_name = "YEAR=START-END")]
    months: Vec<MonthOverride>,

    /// Output CSV path
    #[arg(long, default_value = "meteo_data.csv")]
    out: PathBuf,

    /// Maximum simultaneous in-flight fetches
    #[arg(long, default_value_t = scheduler::DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 5)]
    timeout_secs: u64,

    /// Retry bound for transient failures
    #[arg(long, default_value_t = scheduler::DEFAULT_MAX_RETRIES)]
    retries: u32,

    /// Backoff base in milliseconds; attempt n waits base * 2^(n-1)
    #[arg(long, default_value_t = 500)]
    backoff_ms: u64,

    /// Leading country-page links to skip (navigation/by-year links)
    #[arg(long, default_value_t = topology::DEFAULT_HEADER_SKIP)]
    header_skip: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = meteo_cli_utils::init_logger();
    let args = Args::parse();

    let month_policy = args
        .months
        .iter()
        .fold(MonthPolicy::full_years(), |policy, o| {
            policy.with_months(o.year, o.start..=o.end)
        });

    let fetcher = HttpFetcher::new(Duration::from_secs(args.timeout_secs))?;

    log::info!("resolving cities from {}", args.country_url);
    let cities = resolve_cities(&fetcher, &args.country_url, args.header_skip).await?;

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::warn!("interrupt received, finishing in-flight fetches");
                cancel.store(true, Ordering::Relaxed);
            }
        });
    }

    let options = HarvestOptions {
        concurrency: args.concurrency,
        max_retries: args.retries,
        backoff_base: Duration::from_millis(args.backoff_ms),
        month_policy,
    };
    let progress = IndicatifProgress::harvest_bar(&multi, "Harvesting day pages");
    let output = meteo_harvest::harvest(
        &fetcher,
        &cities,
        &args.years,
        &options,
        &progress,
        &cancel,
    )
    .await;
    progress.finish(output.summary.to_string());

    let (table, report) = normalize(&output.records, &Schema::default());
    log::info!("normalized: {report}");

    sink::write_csv(&table, &args.out)?;
    log::info!("wrote {} rows to {}", table.len(), args.out.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_month_override() {
        let o: MonthOverride = "2024=1-3".parse().unwrap();
        assert_eq!(
            o,
            MonthOverride {
                year: 2024,
                start: 1,
                end: 3
            }
        );
    }

    #[test]
    fn rejects_bad_month_override() {
        assert!("2024".parse::<MonthOverride>().is_err());
        assert!("2024=3-1".parse::<MonthOverride>().is_err());
        assert!("2024=0-5".parse::<MonthOverride>().is_err());
        assert!("2024=1-13".parse::<MonthOverride>().is_err());
        assert!("year=1-3".parse::<MonthOverride>().is_err());
    }

    #[test]
    fn month_overrides_fold_into_policy() {
        let overrides = vec![
            MonthOverride {
                year: 2024,
                start: 1,
                end: 3,
            },
            MonthOverride {
                year: 2022,
                start: 1,
                end: 6,
            },
        ];
        let policy = overrides
            .iter()
            .fold(MonthPolicy::full_years(), |policy, o| {
                policy.with_months(o.year, o.start..=o.end)
            });
        assert_eq!(policy.months_for_year(2024), 1..=3);
        assert_eq!(policy.months_for_year(2022), 1..=6);
        assert_eq!(policy.months_for_year(2023), 1..=12);
    }
}
