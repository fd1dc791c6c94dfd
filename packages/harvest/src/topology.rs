//! Crawl topology resolution: country root page → city list.
//!
//! The country page lists every region/city as `a.list-group-item`
//! anchors. The first [`DEFAULT_HEADER_SKIP`] anchors are navigation and
//! "aggregate by year" links rather than cities and are excluded by
//! position; each city's display name lives in the anchor's `title`
//! attribute behind a fixed-length boilerplate phrase.

use std::sync::LazyLock;

use meteo_harvest_models::CityRef;
use scraper::{Html, Selector};

use crate::fetch::{Fetch, FetchError};

/// Number of leading `a.list-group-item` anchors on a country page that
/// are navigation/by-year links, not cities.
///
/// Empirical for the observed source; configurable per call because a
/// site redesign can shift it.
pub const DEFAULT_HEADER_SKIP: usize = 16;

/// Length in characters of the boilerplate phrase prefixed to every
/// anchor `title` attribute before the city name.
pub const TITLE_BOILERPLATE_LEN: usize = 19;

static CITY_LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.list-group-item[href]").expect("valid selector"));

/// Errors while resolving the city list.
///
/// Losing the entire city list means there is no work at all, so these
/// are the only errors that abort a harvest run.
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    /// The country root page could not be fetched.
    #[error("failed to fetch country page: {0}")]
    Fetch(#[from] FetchError),

    /// The country URL itself is not parseable.
    #[error("invalid country URL '{url}': {message}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Parser diagnostic.
        message: String,
    },

    /// The page fetched but contained no city anchors after the header
    /// skip.
    #[error("no city links found at {0}")]
    NoCities(String),
}

/// Resolves the ordered list of cities reachable from `country_url`.
///
/// `header_skip` anchors are dropped from the front of the link list
/// (see [`DEFAULT_HEADER_SKIP`]). Relative hrefs are joined against the
/// country URL.
///
/// # Errors
///
/// Returns [`ResolutionError`] if the page cannot be fetched, the URL is
/// malformed, or no city anchors remain after the skip.
pub async fn resolve_cities<F: Fetch>(
    fetcher: &F,
    country_url: &str,
    header_skip: usize,
) -> Result<Vec<CityRef>, ResolutionError> {
    let base = reqwest::Url::parse(country_url).map_err(|e| ResolutionError::InvalidUrl {
        url: country_url.to_owned(),
        message: e.to_string(),
    })?;

    let body = fetcher.fetch(country_url).await?;
    let document = Html::parse_document(&body);

    let mut cities = Vec::new();
    for anchor in document.select(&CITY_LINK_SEL) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Ok(url) = base.join(href) else {
            log::debug!("skipping unjoinable href '{href}'");
            continue;
        };
        let name = anchor.value().attr("title").map_or_else(
            || anchor.text().collect::<String>().trim().to_owned(),
            strip_title_boilerplate,
        );
        cities.push(CityRef {
            url: url.to_string(),
            name,
        });
    }

    if cities.len() <= header_skip {
        return Err(ResolutionError::NoCities(country_url.to_owned()));
    }

    // The first links are by-year aggregates, not cities.
    let cities = cities.split_off(header_skip);
    log::info!("resolved {} cities from {country_url}", cities.len());
    Ok(cities)
}

/// Drops the fixed-length boilerplate phrase from a `title` attribute,
/// leaving the city name.
fn strip_title_boilerplate(title: &str) -> String {
    title
        .trim()
        .chars()
        .skip(TITLE_BOILERPLATE_LEN)
        .collect::<String>()
        .trim()
        .to_owned()
}
