//! Cascade matching for places and admin areas.
//!
//! Each resolver runs a strict, ordered cascade of match strategies against
//! one frame and stops at the first step that yields a row: exact slug, exact
//! name, name prefix, name substring. Within a step, places are ranked by
//! population (nulls last) and only one row is retained, so a fuzzy match at
//! a later step can never beat an exact match at an earlier one.
//!
//! Resolution is deliberately fail-open: a query-layer error inside a step is
//! logged and treated as "this step found nothing".

use polars::prelude::*;
use tracing::{debug, instrument, warn};

use super::query::{NormalizedQuery, normalize_query};
use crate::data::{AdminArea, DirectoryData, Place};

/// The ordered match strategies of the cascade.
fn cascade_steps(query: &NormalizedQuery) -> [(&'static str, Expr); 4] {
    let lowered_name = col("name").str().to_lowercase();
    [
        ("slug_exact", col("slug").eq(lit(query.slug.clone()))),
        ("name_exact", lowered_name.clone().eq(lit(query.name.clone()))),
        (
            "name_prefix",
            lowered_name
                .clone()
                .str()
                .starts_with(lit(query.name.clone())),
        ),
        (
            "name_contains",
            lowered_name.str().contains_literal(lit(query.name.clone())),
        ),
    ]
}

/// Run the cascade over `data`, returning the single best row.
///
/// `rank_by_population` applies the population tie-break within a step; admin
/// areas carry no population column and keep natural order instead.
pub(crate) fn cascade_match(
    data: &LazyFrame,
    query: &NormalizedQuery,
    rank_by_population: bool,
) -> Option<DataFrame> {
    for (step, predicate) in cascade_steps(query) {
        let mut lf = data.clone().filter(predicate);
        if rank_by_population {
            lf = lf.sort(
                ["population"],
                SortMultipleOptions::new()
                    .with_order_descending(true)
                    .with_nulls_last(true),
            );
        }
        if let Some(df) = first_row(lf, step) {
            debug!(step, "cascade matched");
            return Some(df);
        }
    }
    None
}

/// Collect a single-row result, swallowing query-layer failures.
pub(crate) fn first_row(lf: LazyFrame, step: &'static str) -> Option<DataFrame> {
    match lf.limit(1).collect() {
        Ok(df) if !df.is_empty() => Some(df),
        Ok(_) => None,
        Err(e) => {
            warn!(step, error = %e, "lookup step failed, treating as no match");
            None
        }
    }
}

pub(crate) fn place_cascade(data: &DirectoryData, query: &NormalizedQuery) -> Option<Place> {
    cascade_match(&data.places_lf(), query, true).and_then(|df| Place::from_row(&df, 0))
}

pub(crate) fn admin_area_cascade(
    data: &DirectoryData,
    query: &NormalizedQuery,
) -> Option<AdminArea> {
    cascade_match(&data.admin_areas_lf(), query, false).and_then(|df| AdminArea::from_row(&df, 0))
}

/// Resolve a free-text query to the single best matching place.
///
/// An empty or whitespace-only query short-circuits to `None` without a
/// frame scan.
#[instrument(name = "Resolve Place", level = "debug", skip(data), fields(query = raw))]
pub fn resolve_place_inner(raw: &str, data: &DirectoryData) -> Option<Place> {
    let query = normalize_query(raw)?;
    place_cascade(data, &query)
}

/// Resolve a free-text query to the single best matching admin area.
#[instrument(name = "Resolve Admin Area", level = "debug", skip(data), fields(query = raw))]
pub fn resolve_admin_area_inner(raw: &str, data: &DirectoryData) -> Option<AdminArea> {
    let query = normalize_query(raw)?;
    admin_area_cascade(data, &query)
}
