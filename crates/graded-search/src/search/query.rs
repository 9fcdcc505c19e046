//! Query normalization and repair-intent detection.
//!
//! A raw search string is reduced to two candidates: a hyphenated slug for
//! exact slug matching and a space-separated name for the ILIKE-style steps.
//! Repair intent is a substring scan over a fixed keyword list, optionally
//! forced by the caller's filter hint.

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Anything outside lowercase alphanumerics and whitespace is dropped before
/// candidate extraction.
static NON_SEARCH_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9\s]+").expect("valid normalizer pattern"));

/// Keywords whose presence marks a query as repair-intent.
///
/// Multi-word phrases come first so that stripping removes them before their
/// constituent words are considered.
pub const REPAIR_KEYWORDS: &[&str] = &[
    "not working",
    "call out",
    "repair",
    "fix",
    "broken",
    "engineer",
    "service",
    "maintenance",
    "fault",
    "error",
    "leaking",
    "noise",
    "technician",
];

/// Optional buy/repair hint supplied by the search UI alongside the query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchFilter {
    #[default]
    All,
    Buy,
    Repair,
}

impl SearchFilter {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Buy => "buy",
            Self::Repair => "repair",
        }
    }
}

/// The two lookup candidates derived from one raw query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedQuery {
    /// Space-separated form, e.g. `"newcastle upon tyne"`.
    pub name: String,
    /// Hyphenated slug form, e.g. `"newcastle-upon-tyne"`.
    pub slug: String,
}

/// Normalize a raw query into lookup candidates.
///
/// Returns `None` when nothing survives normalization; callers must treat
/// that as "no match" without touching the data frames.
#[must_use]
pub fn normalize_query(raw: &str) -> Option<NormalizedQuery> {
    let lowered = raw.to_lowercase();
    let cleaned = NON_SEARCH_CHARS.replace_all(&lowered, "");

    let name = cleaned.split_whitespace().join(" ");
    if name.is_empty() {
        return None;
    }
    let slug = name.split(' ').join("-");

    Some(NormalizedQuery { name, slug })
}

/// Decide whether a query expresses repair intent.
///
/// The scan runs over the lowercased raw query (not the normalized form) and
/// uses plain containment, so `"repairs"` counts. A `repair` filter hint
/// forces the flag regardless of the text.
#[must_use]
pub fn detect_repair_intent(raw: &str, filter: SearchFilter) -> bool {
    if filter == SearchFilter::Repair {
        return true;
    }
    let lowered = raw.to_lowercase();
    REPAIR_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}

/// Remove repair keywords from a query before category/brand matching.
///
/// `"bosch repair"` must still find the brand `bosch` and
/// `"washing machine repair"` the category `Washing Machines`, so the intent
/// vocabulary is blanked out (phrases before single words) and the remainder
/// is re-normalized by the caller.
#[must_use]
pub fn strip_repair_keywords(raw: &str) -> String {
    let mut stripped = raw.to_lowercase();
    for kw in REPAIR_KEYWORDS {
        if stripped.contains(kw) {
            stripped = stripped.replace(kw, " ");
        }
    }
    stripped
}
