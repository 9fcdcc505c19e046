//! Search-intent classification.
//!
//! Routes one raw search string to exactly one destination URL. The cascade
//! is an ordered slice of matcher functions evaluated with a short-circuiting
//! loop: place, admin area, category, brand, then the `/search` fallback.
//! Classification is advisory and never fails; a matcher that errors is
//! logged and skipped, and the fallback terminates every path.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::form_urlencoded;

use super::{
    query::{
        NormalizedQuery, SearchFilter, detect_repair_intent, normalize_query,
        strip_repair_keywords,
    },
    resolve::{admin_area_cascade, first_row, place_cascade},
};
use crate::data::{Brand, Category, DirectoryData};

/// Which branch of the cascade produced the destination.
///
/// Informational only; the `url` is authoritative for navigation. Admin-area
/// matches report [`MatchKind::Place`] since both are location destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Place,
    Category,
    Brand,
    Repair,
    Search,
}

/// The single destination decided for a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    #[serde(rename = "type")]
    pub kind: MatchKind,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_name: Option<String>,
}

struct MatcherInput<'a> {
    data: &'a DirectoryData,
    /// Full normalized query, used for the geographic branches.
    query: &'a NormalizedQuery,
    /// Query with repair keywords stripped, used for category/brand matching
    /// when intent was detected. Falls back to the full query when stripping
    /// leaves nothing.
    entity_query: Option<&'a NormalizedQuery>,
    repair_intent: bool,
}

impl MatcherInput<'_> {
    fn entity_query(&self) -> &NormalizedQuery {
        self.entity_query.unwrap_or(self.query)
    }
}

type Matcher = fn(&MatcherInput<'_>) -> Option<Classification>;

/// Cascade order is the routing policy: a query that is simultaneously a
/// place slug and a category slug resolves to the place URL.
const MATCHERS: &[(&str, Matcher)] = &[
    ("place", match_place),
    ("admin_area", match_admin_area),
    ("category", match_category),
    ("brand", match_brand),
];

/// Classify a raw search string into a navigation destination.
///
/// Empty or whitespace-only queries resolve straight to the search fallback
/// without issuing a single lookup.
///
/// # Examples
///
/// ```rust
/// use graded_search::{DirectoryData, SearchFilter, classify_intent};
///
/// let data = DirectoryData::sample();
/// let result = classify_intent("manchester", SearchFilter::All, &data);
/// assert_eq!(result.url, "/england/manchester/");
/// ```
#[instrument(name = "Classify Intent", level = "debug", skip(data), fields(query = raw, filter = filter.as_str()))]
#[must_use]
pub fn classify_intent(raw: &str, filter: SearchFilter, data: &DirectoryData) -> Classification {
    let Some(query) = normalize_query(raw) else {
        debug!("empty query, routing to search fallback without lookups");
        return fallback(raw, filter);
    };

    let repair_intent = detect_repair_intent(raw, filter);
    let entity_query = if repair_intent {
        normalize_query(&strip_repair_keywords(raw))
    } else {
        None
    };

    let input = MatcherInput {
        data,
        query: &query,
        entity_query: entity_query.as_ref(),
        repair_intent,
    };

    for (name, matcher) in MATCHERS {
        if let Some(classification) = matcher(&input) {
            debug!(matcher = name, url = %classification.url, "query classified");
            return classification;
        }
    }

    debug!("no entity matched, routing to search fallback");
    fallback(raw, filter)
}

fn match_place(input: &MatcherInput<'_>) -> Option<Classification> {
    let place = place_cascade(input.data, input.query)?;
    Some(Classification {
        kind: MatchKind::Place,
        url: format!("/{}/{}/", place.country_slug, place.slug),
        matched_name: Some(place.name),
    })
}

fn match_admin_area(input: &MatcherInput<'_>) -> Option<Classification> {
    let area = admin_area_cascade(input.data, input.query)?;
    Some(Classification {
        kind: MatchKind::Place,
        url: format!("/{}/{}/", area.country_slug, area.slug),
        matched_name: Some(area.name),
    })
}

/// Category lookup: slug equality, then name contains, then plural-name
/// contains. First row wins; there is no population tie-break here.
fn match_category(input: &MatcherInput<'_>) -> Option<Classification> {
    let query = input.entity_query();
    let lf = input.data.categories_lf();

    let steps: [(&'static str, Expr); 3] = [
        ("category_slug", col("slug").eq(lit(query.slug.clone()))),
        (
            "category_name",
            col("name")
                .str()
                .to_lowercase()
                .str()
                .contains_literal(lit(query.name.clone())),
        ),
        (
            "category_name_plural",
            col("name_plural")
                .str()
                .to_lowercase()
                .str()
                .contains_literal(lit(query.name.clone())),
        ),
    ];

    let category = steps
        .into_iter()
        .find_map(|(step, predicate)| first_row(lf.clone().filter(predicate), step))
        .and_then(|df| Category::from_row(&df, 0))?;

    if input.repair_intent && category.supports_repair {
        Some(Classification {
            kind: MatchKind::Repair,
            url: format!("/{}-repair/", category.slug),
            matched_name: Some(category.name),
        })
    } else {
        Some(Classification {
            kind: MatchKind::Category,
            url: format!("/{}/", category.slug),
            matched_name: Some(category.name),
        })
    }
}

/// Brand lookup: slug equality, then exact case-insensitive name. Brand pages
/// are repair directories, so the destination is `-repair/` regardless of the
/// detected intent or filter hint.
fn match_brand(input: &MatcherInput<'_>) -> Option<Classification> {
    let query = input.entity_query();
    let lf = input.data.brands_lf();

    let steps: [(&'static str, Expr); 2] = [
        ("brand_slug", col("slug").eq(lit(query.slug.clone()))),
        (
            "brand_name",
            col("name")
                .str()
                .to_lowercase()
                .eq(lit(query.name.clone())),
        ),
    ];

    let brand = steps
        .into_iter()
        .find_map(|(step, predicate)| first_row(lf.clone().filter(predicate), step))
        .and_then(|df| Brand::from_row(&df, 0))?;

    Some(Classification {
        kind: MatchKind::Brand,
        url: format!("/{}-repair/", brand.slug),
        matched_name: Some(brand.name),
    })
}

fn fallback(raw: &str, filter: SearchFilter) -> Classification {
    let mut params = form_urlencoded::Serializer::new(String::new());
    params.append_pair("q", raw.trim());
    if filter != SearchFilter::All {
        params.append_pair("type", filter.as_str());
    }
    Classification {
        kind: MatchKind::Search,
        url: format!("/search?{}", params.finish()),
        matched_name: None,
    }
}
