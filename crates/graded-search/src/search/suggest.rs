//! Type-ahead suggestions and the popular fallback lists.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{
    error::Result,
    query::normalize_query,
};
use crate::{
    config::SearchTuning,
    data::{Brand, Category, DirectoryData, Place},
};

/// Which entity tables a suggestion request wants searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionScope {
    /// Categories and brands only.
    Keyword,
    /// Places only.
    Location,
    #[default]
    All,
}

impl SuggestionScope {
    fn wants_keywords(self) -> bool {
        matches!(self, Self::Keyword | Self::All)
    }

    fn wants_locations(self) -> bool {
        matches!(self, Self::Location | Self::All)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceSuggestion {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySuggestion {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandSuggestion {
    pub name: String,
    pub url: String,
}

/// One response's worth of type-ahead matches, grouped by entity kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestions {
    pub places: Vec<PlaceSuggestion>,
    pub categories: Vec<CategorySuggestion>,
    pub brands: Vec<BrandSuggestion>,
}

/// Substring suggestions for a partial query.
///
/// Queries shorter than the configured minimum return empty lists rather
/// than scanning every table on each keystroke. Places are ranked with
/// prefix matches first, then by population; categories and brands keep
/// their table order.
#[instrument(name = "Suggest", level = "debug", skip(data, tuning), fields(query = raw, scope = ?scope))]
pub fn suggest_inner(
    raw: &str,
    scope: SuggestionScope,
    data: &DirectoryData,
    tuning: &SearchTuning,
) -> Result<Suggestions> {
    let Some(query) = normalize_query(raw) else {
        return Ok(Suggestions::default());
    };
    if query.name.len() < tuning.suggest_min_query_len {
        return Ok(Suggestions::default());
    }

    let mut suggestions = Suggestions::default();

    if scope.wants_locations() {
        suggestions.places = suggest_places(&query.name, data, tuning)?;
    }
    if scope.wants_keywords() {
        suggestions.categories = suggest_categories(&query.name, data, tuning)?;
        suggestions.brands = suggest_brands(&query.name, data, tuning)?;
    }

    Ok(suggestions)
}

fn suggest_places(
    needle: &str,
    data: &DirectoryData,
    tuning: &SearchTuning,
) -> Result<Vec<PlaceSuggestion>> {
    let lowered = col("name").str().to_lowercase();
    let df = data
        .places_lf()
        .filter(col("is_active").and(lowered.clone().str().contains_literal(lit(needle))))
        .with_column(
            lowered
                .str()
                .starts_with(lit(needle))
                .alias("prefix_match"),
        )
        .sort(
            ["prefix_match", "population"],
            SortMultipleOptions::new()
                .with_order_descending_multi([true, true])
                .with_nulls_last(true),
        )
        .limit(tuning.suggest_place_limit)
        .collect()?;

    Ok((0..df.height())
        .filter_map(|idx| Place::from_row(&df, idx))
        .map(|place| PlaceSuggestion {
            url: format!("/{}/{}/", place.country_slug, place.slug),
            name: place.name,
        })
        .collect())
}

fn suggest_categories(
    needle: &str,
    data: &DirectoryData,
    tuning: &SearchTuning,
) -> Result<Vec<CategorySuggestion>> {
    let df = data
        .categories_lf()
        .filter(
            col("name")
                .str()
                .to_lowercase()
                .str()
                .contains_literal(lit(needle))
                .or(col("name_plural")
                    .str()
                    .to_lowercase()
                    .str()
                    .contains_literal(lit(needle))),
        )
        .limit(tuning.suggest_category_limit)
        .collect()?;

    Ok((0..df.height())
        .filter_map(|idx| Category::from_row(&df, idx))
        .map(|category| CategorySuggestion {
            url: format!("/{}/", category.slug),
            name: category.name_plural,
        })
        .collect())
}

fn suggest_brands(
    needle: &str,
    data: &DirectoryData,
    tuning: &SearchTuning,
) -> Result<Vec<BrandSuggestion>> {
    let df = data
        .brands_lf()
        .filter(
            col("name")
                .str()
                .to_lowercase()
                .str()
                .contains_literal(lit(needle)),
        )
        .limit(tuning.suggest_brand_limit)
        .collect()?;

    Ok((0..df.height())
        .filter_map(|idx| Brand::from_row(&df, idx))
        .map(|brand| BrandSuggestion {
            url: format!("/{}-repair/", brand.slug),
            name: brand.name,
        })
        .collect())
}

/// Categories in curated display order, for empty-input suggestion panels.
///
/// Rows without a display order sort after the curated ones.
#[instrument(name = "Popular Categories", level = "debug", skip(data, tuning))]
pub fn popular_categories_inner(
    data: &DirectoryData,
    tuning: &SearchTuning,
) -> Result<Vec<CategorySuggestion>> {
    let df = data
        .categories_lf()
        .sort(
            ["display_order"],
            SortMultipleOptions::new().with_nulls_last(true),
        )
        .limit(tuning.popular_limit)
        .collect()?;

    Ok((0..df.height())
        .filter_map(|idx| Category::from_row(&df, idx))
        .map(|category| CategorySuggestion {
            url: format!("/{}/", category.slug),
            name: category.name_plural,
        })
        .collect())
}

/// The most populous active places, for empty-input suggestion panels.
#[instrument(name = "Popular Places", level = "debug", skip(data, tuning))]
pub fn popular_places_inner(
    data: &DirectoryData,
    tuning: &SearchTuning,
) -> Result<Vec<PlaceSuggestion>> {
    let df = data
        .places_lf()
        .filter(col("is_active"))
        .sort(
            ["population"],
            SortMultipleOptions::new()
                .with_order_descending(true)
                .with_nulls_last(true),
        )
        .limit(tuning.popular_limit)
        .collect()?;

    Ok((0..df.height())
        .filter_map(|idx| Place::from_row(&df, idx))
        .map(|place| PlaceSuggestion {
            url: format!("/{}/{}/", place.country_slug, place.slug),
            name: place.name,
        })
        .collect())
}
