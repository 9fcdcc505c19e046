//! graded-search - Search core for the UK graded appliance directory
//!
//! The directory lists discounted "graded" appliances (ex-display, cosmetic
//! seconds) and repair services across UK stores. This crate is its search
//! brain: it turns one free-text search-box query into exactly one
//! destination URL, resolves place and admin-area names, finds the nearest
//! listed place to a coordinate, and serves type-ahead suggestions.
//!
//! Entity data lives in four read-only tables (places, admin areas, appliance
//! categories, brands) queried through polars lazy frames.
//!
//! # Quick Start
//!
//! ```rust
//! use graded_search::{DirectoryData, DirectorySearcher, SearchFilter};
//!
//! let searcher = DirectorySearcher::new(DirectoryData::sample());
//!
//! // A city name routes to its location page
//! let result = searcher.classify("manchester", SearchFilter::All);
//! assert_eq!(result.url, "/england/manchester/");
//!
//! // Repair wording routes to a category repair page
//! let result = searcher.classify("fridge freezer repair", SearchFilter::All);
//! assert_eq!(result.url, "/fridge-freezers-repair/");
//!
//! // Anything unrecognised falls through to full-text search
//! let result = searcher.classify("cheap gadgets", SearchFilter::All);
//! assert_eq!(result.url, "/search?q=cheap+gadgets");
//! ```
use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod config;
mod core;
mod data;
pub mod error;
mod search;

pub use config::{SearchTuning, SearchTuningBuilder};
pub use core::DirectorySearcher;
pub use data::{AdminArea, Brand, Category, DirectoryData, Place};
pub use error::DirectoryError;
pub use polars;
pub use search::{
    BrandSuggestion, CategorySuggestion, Classification, MatchKind, NearestPlace,
    NormalizedQuery, PlaceSuggestion, SearchFilter, SuggestionScope, Suggestions,
    classify_intent, detect_repair_intent, haversine_miles, normalize_query,
    strip_repair_keywords,
};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Initialize logging for the graded-search library.
///
/// Sets up structured logging with configurable levels and filtering. Call
/// once at the start of your application; later calls are no-ops.
///
/// # Examples
///
/// ```rust
/// use graded_search::init_logging;
/// use tracing::Level;
///
/// init_logging(Level::INFO)?;
/// # Ok::<(), graded_search::DirectoryError>(())
/// ```
pub fn init_logging(level: impl Into<LevelFilter>) -> Result<&'static (), DirectoryError> {
    LOGGER_INIT.get_or_try_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level.into().to_string()))?
            .add_directive("polars=warn".parse()?)
            .add_directive("hyper_util=warn".parse()?);

        tracing_subscriber::fmt::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .init();
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_test_env() {
        let _ = init_logging(tracing::Level::WARN);
    }

    #[test]
    fn test_searcher_creation() {
        setup_test_env();

        let searcher = DirectorySearcher::new(DirectoryData::sample());
        assert!(searcher.data().total_entities() > 0);
    }

    #[test]
    fn test_root_exports_cover_the_free_functions() {
        setup_test_env();

        // The free functions are part of the public surface alongside the
        // searcher facade.
        let data = DirectoryData::sample();
        let result = classify_intent("manchester", SearchFilter::All, &data);
        assert_eq!(result.url, "/england/manchester/");

        assert_eq!(normalize_query("Leeds!").unwrap().slug, "leeds");
        assert!(detect_repair_intent("broken fridge", SearchFilter::All));
        let stripped = strip_repair_keywords("bosch repair");
        assert_eq!(normalize_query(&stripped).unwrap().name, "bosch");
    }

    #[test]
    fn test_basic_classification() {
        setup_test_env();

        let searcher = DirectorySearcher::new(DirectoryData::sample());

        let test_terms = vec!["London", "Leeds", "Liverpool", "Bristol", "York"];
        for term in test_terms {
            let result = searcher.classify(term, SearchFilter::All);
            assert_eq!(result.kind, MatchKind::Place, "'{term}' should be a place");
        }
    }
}
