//! Nearest-place lookup by coordinates.
//!
//! Two-phase candidate selection keeps the haversine work small: a degree
//! bounding box around the point first, then a widened fallback over the most
//! populous places when the box comes back empty (coastal points and visitors
//! from outside the UK land here). Distance is computed in Rust over the
//! collected candidates rather than as a frame expression.

use polars::prelude::*;
use serde::Serialize;
use tracing::{debug, instrument};

use super::error::Result;
use crate::{
    config::SearchTuning,
    data::{DirectoryData, row_f64, row_i64, row_str},
};

const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Great-circle distance between two coordinates, in miles.
#[must_use]
pub fn haversine_miles(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_MILES * c
}

/// The place closest to a requested coordinate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearestPlace {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub country_slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_area: Option<String>,
}

impl NearestPlace {
    fn from_row(df: &DataFrame, idx: usize) -> Option<Self> {
        Some(Self {
            id: row_i64(df, "id", idx)?,
            name: row_str(df, "name", idx)?,
            slug: row_str(df, "slug", idx)?,
            country_slug: row_str(df, "country_slug", idx)
                .unwrap_or_else(|| crate::data::DEFAULT_COUNTRY_SLUG.to_string()),
            admin_area: row_str(df, "admin_area", idx),
        })
    }
}

/// Find the active place nearest to `(lat, lng)`.
///
/// Returns `Ok(None)` only when the dataset holds no active place with
/// coordinates at all. Query failures propagate, unlike the text cascades;
/// a coordinate lookup with broken data is a server fault, not a miss.
#[instrument(name = "Nearest Place", level = "debug", skip(data, tuning))]
pub fn nearest_place_inner(
    lat: f64,
    lng: f64,
    data: &DirectoryData,
    tuning: &SearchTuning,
) -> Result<Option<NearestPlace>> {
    let located = data
        .places_lf()
        .filter(
            col("is_active")
                .and(col("latitude").is_not_null())
                .and(col("longitude").is_not_null()),
        );

    let radius = tuning.nearest_box_radius_deg;
    let boxed = located
        .clone()
        .filter(
            col("latitude")
                .gt_eq(lit(lat - radius))
                .and(col("latitude").lt_eq(lit(lat + radius)))
                .and(col("longitude").gt_eq(lit(lng - radius)))
                .and(col("longitude").lt_eq(lit(lng + radius))),
        )
        .limit(tuning.nearest_box_limit)
        .collect()?;

    let candidates = if boxed.height() > 0 {
        boxed
    } else {
        debug!(
            radius,
            "bounding box empty, widening to the most populous places"
        );
        located
            .sort(
                ["population"],
                SortMultipleOptions::new()
                    .with_order_descending(true)
                    .with_nulls_last(true),
            )
            .limit(tuning.nearest_fallback_limit)
            .collect()?
    };

    let mut nearest: Option<(f64, NearestPlace)> = None;
    for idx in 0..candidates.height() {
        let (Some(place_lat), Some(place_lng)) = (
            row_f64(&candidates, "latitude", idx),
            row_f64(&candidates, "longitude", idx),
        ) else {
            continue;
        };
        let distance = haversine_miles(lat, lng, place_lat, place_lng);
        // Strict comparison keeps the earlier row on an exact tie.
        if nearest.as_ref().is_none_or(|(best, _)| distance < *best) {
            if let Some(place) = NearestPlace::from_row(&candidates, idx) {
                nearest = Some((distance, place));
            }
        }
    }

    if let Some((distance, place)) = nearest {
        debug!(place = %place.slug, distance_miles = distance, "nearest place found");
        Ok(Some(place))
    } else {
        debug!("no active place with coordinates in the dataset");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> DirectoryData {
        DirectoryData::sample()
    }

    #[test]
    fn haversine_matches_known_city_distance() {
        // London to Manchester is roughly 163 miles great-circle.
        let miles = haversine_miles(51.5074, -0.1278, 53.4808, -2.2426);
        assert!((miles - 163.0).abs() < 2.0, "got {miles}");
    }

    #[test]
    fn haversine_is_zero_for_identical_points() {
        assert!(haversine_miles(53.0, -2.0, 53.0, -2.0).abs() < 1e-9);
    }

    #[test]
    fn point_near_manchester_resolves_to_manchester() {
        let place = nearest_place_inner(53.48, -2.24, &data(), &SearchTuning::default())
            .unwrap()
            .unwrap();
        assert_eq!(place.slug, "manchester");
        assert_eq!(place.admin_area.as_deref(), Some("Greater Manchester"));
    }

    #[test]
    fn remote_point_falls_back_to_populous_places() {
        // Shetland is well outside every sample bounding box; the fallback
        // still has to produce the geographically closest of the big places.
        let place = nearest_place_inner(60.15, -1.15, &data(), &SearchTuning::default())
            .unwrap()
            .unwrap();
        assert_eq!(place.slug, "edinburgh");
    }

    #[test]
    fn inactive_and_coordinate_free_places_are_skipped() {
        let places = df!(
            "id" => [1i64, 2, 3],
            "name" => ["Ghost Town", "No Fix", "Real Town"],
            "slug" => ["ghost-town", "no-fix", "real-town"],
            "population" => [Some(1_000_000i64), Some(500_000), Some(100)],
            "latitude" => [Some(53.0f64), None, Some(52.0)],
            "longitude" => [Some(-2.0f64), None, Some(-1.0)],
            "country_slug" => [Some("england"), Some("england"), Some("england")],
            "admin_area" => [None::<&str>, None, None],
            "is_active" => [false, true, true],
        )
        .unwrap();
        let sample = data();
        let data = DirectoryData::from_frames(
            places,
            sample.admin_areas().clone(),
            sample.categories().clone(),
            sample.brands().clone(),
        )
        .unwrap();

        let place = nearest_place_inner(53.0, -2.0, &data, &SearchTuning::default())
            .unwrap()
            .unwrap();
        assert_eq!(place.slug, "real-town");
    }

    #[test]
    fn empty_dataset_returns_none() {
        let places = df!(
            "id" => [1i64],
            "name" => ["No Fix"],
            "slug" => ["no-fix"],
            "population" => [Some(1i64)],
            "latitude" => [None::<f64>],
            "longitude" => [None::<f64>],
            "country_slug" => [Some("england")],
            "admin_area" => [None::<&str>],
            "is_active" => [true],
        )
        .unwrap();
        let sample = data();
        let data = DirectoryData::from_frames(
            places,
            sample.admin_areas().clone(),
            sample.categories().clone(),
            sample.brands().clone(),
        )
        .unwrap();

        let nearest = nearest_place_inner(53.0, -2.0, &data, &SearchTuning::default()).unwrap();
        assert!(nearest.is_none());
    }

    #[test]
    fn exact_tie_keeps_the_first_row() {
        let places = df!(
            "id" => [1i64, 2],
            "name" => ["First Twin", "Second Twin"],
            "slug" => ["first-twin", "second-twin"],
            "population" => [Some(10i64), Some(10)],
            "latitude" => [Some(53.0f64), Some(53.0)],
            "longitude" => [Some(-2.0f64), Some(-2.0)],
            "country_slug" => [Some("england"), Some("england")],
            "admin_area" => [None::<&str>, None],
            "is_active" => [true, true],
        )
        .unwrap();
        let sample = data();
        let data = DirectoryData::from_frames(
            places,
            sample.admin_areas().clone(),
            sample.categories().clone(),
            sample.brands().clone(),
        )
        .unwrap();

        let place = nearest_place_inner(53.0, -2.0, &data, &SearchTuning::default())
            .unwrap()
            .unwrap();
        assert_eq!(place.slug, "first-twin");
    }
}
