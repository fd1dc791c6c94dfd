//! Slug normalization for scraped KPI labels.
//!
//! The source site renders measurement names as accented, punctuated
//! French labels ("Température maximale"). [`slugify`] turns them into
//! stable ASCII-safe identifiers usable as column names, applied
//! symmetrically wherever a label is used as a key.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Regex matching characters that are neither word characters,
/// whitespace, nor hyphens.
static DISALLOWED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("valid regex"));

/// Regex matching runs of whitespace and/or hyphens.
static SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-\s]+").expect("valid regex"));

/// Slugifies a human-readable label.
///
/// The pipeline:
/// 1. NFKD-decompose and strip combining marks (accents, diacritics)
/// 2. Remove characters that are not alphanumeric, whitespace, or hyphen
/// 3. Trim and lowercase
/// 4. Collapse whitespace/hyphen runs into a single hyphen
/// 5. Trim leading/trailing hyphens
///
/// Deterministic, idempotent, and free of side effects.
#[must_use]
pub fn slugify(label: &str) -> String {
    let decomposed: String = label.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    let kept = DISALLOWED_RE.replace_all(&decomposed, "");
    let lowered = kept.trim().to_lowercase();
    SEPARATOR_RE
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_owned()
}
