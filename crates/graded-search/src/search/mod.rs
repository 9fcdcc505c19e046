//! Query-side logic: normalization, the resolution cascades, intent
//! classification, nearest-place lookup and suggestions.
//!
//! Everything here operates on [`DirectoryData`](crate::data::DirectoryData)
//! frames through lazy queries and is exposed through free `*_inner`
//! functions; [`DirectorySearcher`](crate::DirectorySearcher) wraps them with
//! its configured tuning.

mod classify;
mod nearest;
mod query;
mod resolve;
mod suggest;

pub use classify::{Classification, MatchKind, classify_intent};
pub use error::{Result, SearchError};
pub use nearest::{NearestPlace, haversine_miles, nearest_place_inner};
pub use query::{
    NormalizedQuery, SearchFilter, detect_repair_intent, normalize_query, strip_repair_keywords,
};
pub use resolve::{resolve_admin_area_inner, resolve_place_inner};
pub use suggest::{
    BrandSuggestion, CategorySuggestion, PlaceSuggestion, SuggestionScope, Suggestions,
    popular_categories_inner, popular_places_inner, suggest_inner,
};

mod error {
    use polars::prelude::PolarsError;
    use thiserror::Error;

    pub type Result<T> = std::result::Result<T, SearchError>;

    #[derive(Error, Debug)]
    pub enum SearchError {
        #[error("DataFrame error: {0}")]
        DataFrame(#[from] PolarsError),
        #[error(transparent)]
        Other(#[from] anyhow::Error),
    }
}
