//! Core search functionality for the graded-appliance directory.
//!
//! This module provides the main [`DirectorySearcher`] interface: one struct
//! owning a [`DirectoryData`] snapshot and a [`SearchTuning`], exposing the
//! resolution cascade, intent classification, nearest-place lookup and
//! suggestions as methods.
//!
//! # Quick Start
//!
//! ```rust
//! use graded_search::{DirectoryData, DirectorySearcher, SearchFilter};
//!
//! let searcher = DirectorySearcher::new(DirectoryData::sample());
//!
//! // Route a search-box query to a destination URL
//! let result = searcher.classify("washing machine repair", SearchFilter::All);
//! assert_eq!(result.url, "/washing-machines-repair/");
//!
//! // Resolve free text to a place
//! let place = searcher.resolve_place("manchester").unwrap();
//! assert_eq!(place.slug, "manchester");
//! ```

use tracing::{info, instrument};

use crate::{
    config::SearchTuning,
    data::{AdminArea, DirectoryData, Place},
    search::{
        Classification, NearestPlace, SearchFilter, SuggestionScope, Suggestions,
        classify_intent, nearest_place_inner, popular_categories_inner, popular_places_inner,
        resolve_admin_area_inner, resolve_place_inner, suggest_inner,
    },
};

pub use crate::search::{CategorySuggestion, PlaceSuggestion};

/// The main directory searcher.
///
/// Holds a read-only data snapshot plus tuning, and is cheap to clone; every
/// method is `&self`, so one instance can be shared across request handlers.
///
/// # Examples
///
/// ```rust
/// use graded_search::{DirectoryData, DirectorySearcher, SearchTuning};
///
/// let tuning = SearchTuning::builder().suggest_place_limit(3).build();
/// let searcher = DirectorySearcher::with_tuning(DirectoryData::sample(), tuning);
/// let suggestions = searcher.suggest("man", Default::default())?;
/// assert!(suggestions.places.len() <= 3);
/// # Ok::<(), graded_search::DirectoryError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DirectorySearcher {
    data: DirectoryData,
    tuning: SearchTuning,
}

impl DirectorySearcher {
    /// Create a searcher over `data` with the default tuning.
    #[instrument(name = "Initialize DirectorySearcher", level = "info", skip(data))]
    #[must_use]
    pub fn new(data: DirectoryData) -> Self {
        Self::with_tuning(data, SearchTuning::default())
    }

    /// Create a searcher with explicit tuning.
    #[instrument(name = "Initialize DirectorySearcher", level = "info", skip(data, tuning))]
    #[must_use]
    pub fn with_tuning(data: DirectoryData, tuning: SearchTuning) -> Self {
        info!(
            entities = data.total_entities(),
            "DirectorySearcher initialized"
        );
        Self { data, tuning }
    }

    /// Resolve free text to the single best matching place, if any.
    pub fn resolve_place(&self, query: &str) -> Option<Place> {
        resolve_place_inner(query, &self.data)
    }

    /// Resolve free text to the single best matching admin area, if any.
    pub fn resolve_admin_area(&self, query: &str) -> Option<AdminArea> {
        resolve_admin_area_inner(query, &self.data)
    }

    /// Route one search-box query to exactly one destination URL.
    #[must_use]
    pub fn classify(&self, query: &str, filter: SearchFilter) -> Classification {
        classify_intent(query, filter, &self.data)
    }

    /// Find the active place nearest to a coordinate.
    pub fn nearest_place(
        &self,
        lat: f64,
        lng: f64,
    ) -> crate::error::Result<Option<NearestPlace>> {
        Ok(nearest_place_inner(lat, lng, &self.data, &self.tuning)?)
    }

    /// Type-ahead suggestions for a partial query.
    pub fn suggest(
        &self,
        query: &str,
        scope: SuggestionScope,
    ) -> crate::error::Result<Suggestions> {
        Ok(suggest_inner(query, scope, &self.data, &self.tuning)?)
    }

    /// Categories in curated display order, for empty-input panels.
    pub fn popular_categories(&self) -> crate::error::Result<Vec<CategorySuggestion>> {
        Ok(popular_categories_inner(&self.data, &self.tuning)?)
    }

    /// The most populous active places, for empty-input panels.
    pub fn popular_places(&self) -> crate::error::Result<Vec<PlaceSuggestion>> {
        Ok(popular_places_inner(&self.data, &self.tuning)?)
    }

    #[must_use]
    pub fn data(&self) -> &DirectoryData {
        &self.data
    }

    #[must_use]
    pub fn tuning(&self) -> &SearchTuning {
        &self.tuning
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::MatchKind;

    #[test]
    fn searcher_wires_every_component() {
        let searcher = DirectorySearcher::new(DirectoryData::sample());

        assert_eq!(searcher.resolve_place("london").unwrap().slug, "london");
        assert_eq!(
            searcher.resolve_admin_area("kent").unwrap().slug,
            "kent"
        );
        assert_eq!(
            searcher.classify("bosch", SearchFilter::All).kind,
            MatchKind::Brand
        );
        assert!(
            searcher
                .nearest_place(51.5, -0.12)
                .unwrap()
                .is_some_and(|p| p.slug == "london")
        );
        assert!(!searcher.popular_categories().unwrap().is_empty());
        assert!(!searcher.popular_places().unwrap().is_empty());
    }

    #[test]
    fn custom_tuning_is_respected() {
        let tuning = SearchTuning::builder().popular_limit(2).build();
        let searcher = DirectorySearcher::with_tuning(DirectoryData::sample(), tuning);
        assert_eq!(searcher.popular_places().unwrap().len(), 2);
    }
}
