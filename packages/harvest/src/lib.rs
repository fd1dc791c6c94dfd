#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Concurrent harvester for daily historical weather pages.
//!
//! The pipeline: [`topology::resolve_cities`] discovers the crawl
//! topology of a country root page, [`scheduler::harvest`] fans the
//! (year × month × day × city) grid out under a bounded concurrency
//! window, driving [`fetch`] and [`extract`] for each cell, and collects
//! raw records plus per-task failures. Normalization of the raw table
//! lives in the `meteo_normalize` crate.
//!
//! Only [`ResolutionError`] aborts a run — no cities means no work. Every
//! per-task failure is captured as data and surfaced in the run summary.

pub mod calendar;
pub mod extract;
pub mod fetch;
pub mod progress;
pub mod scheduler;
pub mod slug;
pub mod topology;

pub use extract::ExtractError;
pub use fetch::{Fetch, FetchError, HttpFetcher};
pub use scheduler::{HarvestOptions, HarvestOutput, harvest};
pub use topology::ResolutionError;
