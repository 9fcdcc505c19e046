//! Directory datasets backing the search core.
//!
//! The directory itself is owned elsewhere (stores, providers and the
//! geography they hang off are maintained through the admin workflows); this
//! module only materialises read-only snapshots of the four entity tables as
//! polars [`DataFrame`]s and validates their shape. Every resolver in this
//! crate queries these frames through [`LazyFrame`] pipelines.

use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::info;

pub use error::{DataError, Result};

/// Country slug substituted when a place or admin area has no country join.
pub const DEFAULT_COUNTRY_SLUG: &str = "england";

/// Required columns per frame, in no particular order.
pub mod columns {
    pub const PLACES: &[&str] = &[
        "id",
        "name",
        "slug",
        "population",
        "latitude",
        "longitude",
        "country_slug",
        "admin_area",
        "is_active",
    ];
    pub const ADMIN_AREAS: &[&str] = &["id", "name", "slug", "country_slug"];
    pub const CATEGORIES: &[&str] = &[
        "id",
        "name",
        "name_plural",
        "slug",
        "supports_repair",
        "display_order",
    ];
    pub const BRANDS: &[&str] = &["id", "name", "slug"];
}

/// In-memory snapshot of the directory's entity tables.
///
/// Frames are cheap to clone (column data is shared), so the searcher and the
/// HTTP layer can each hold their own handle.
///
/// # Examples
///
/// ```rust
/// use graded_search::DirectoryData;
///
/// let data = DirectoryData::sample();
/// assert!(data.places().height() > 0);
/// ```
#[derive(Debug, Clone)]
pub struct DirectoryData {
    places: DataFrame,
    admin_areas: DataFrame,
    categories: DataFrame,
    brands: DataFrame,
}

impl DirectoryData {
    /// Build a dataset from pre-loaded frames, validating the column sets.
    pub fn from_frames(
        places: DataFrame,
        admin_areas: DataFrame,
        categories: DataFrame,
        brands: DataFrame,
    ) -> Result<Self> {
        ensure_columns(&places, "places", columns::PLACES)?;
        ensure_columns(&admin_areas, "admin_areas", columns::ADMIN_AREAS)?;
        ensure_columns(&categories, "categories", columns::CATEGORIES)?;
        ensure_columns(&brands, "brands", columns::BRANDS)?;

        Ok(Self {
            places,
            admin_areas,
            categories,
            brands,
        })
    }

    /// Load the four entity tables from CSV exports in `dir`.
    ///
    /// Expects `places.csv`, `admin_areas.csv`, `categories.csv` and
    /// `brands.csv`, each with a header row matching [`columns`].
    pub fn from_csv_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        info!(dir = ?dir, "Loading directory data from CSV exports");

        let places = read_csv(dir.join("places.csv"))?;
        let admin_areas = read_csv(dir.join("admin_areas.csv"))?;
        let categories = read_csv(dir.join("categories.csv"))?;
        let brands = read_csv(dir.join("brands.csv"))?;

        Self::from_frames(places, admin_areas, categories, brands)
    }

    /// Embedded UK sample dataset.
    ///
    /// A handful of real cities, admin areas, appliance categories and brands,
    /// enough to exercise every code path. Used by tests and as the server's
    /// fallback when no data directory is configured.
    #[must_use]
    pub fn sample() -> Self {
        Self::from_frames(
            sample_places(),
            sample_admin_areas(),
            sample_categories(),
            sample_brands(),
        )
        .expect("sample dataset matches the required schema")
    }

    pub fn places(&self) -> &DataFrame {
        &self.places
    }

    pub fn admin_areas(&self) -> &DataFrame {
        &self.admin_areas
    }

    pub fn categories(&self) -> &DataFrame {
        &self.categories
    }

    pub fn brands(&self) -> &DataFrame {
        &self.brands
    }

    pub fn places_lf(&self) -> LazyFrame {
        self.places.clone().lazy()
    }

    pub fn admin_areas_lf(&self) -> LazyFrame {
        self.admin_areas.clone().lazy()
    }

    pub fn categories_lf(&self) -> LazyFrame {
        self.categories.clone().lazy()
    }

    pub fn brands_lf(&self) -> LazyFrame {
        self.brands.clone().lazy()
    }

    /// Total rows across all four frames.
    #[must_use]
    pub fn total_entities(&self) -> usize {
        self.places.height()
            + self.admin_areas.height()
            + self.categories.height()
            + self.brands.height()
    }
}

fn read_csv(path: PathBuf) -> Result<DataFrame> {
    if !path.exists() {
        return Err(DataError::MissingFile(path));
    }
    Ok(LazyCsvReader::new(path)
        .with_has_header(true)
        .finish()?
        .collect()?)
}

fn ensure_columns(df: &DataFrame, frame: &'static str, required: &[&str]) -> Result<()> {
    for column in required {
        if df.column(column).is_err() {
            return Err(DataError::MissingColumn {
                frame,
                column: (*column).to_string(),
            });
        }
    }
    Ok(())
}

// --- Typed row projections -------------------------------------------------

/// A city or town, the smallest indexed geography.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub population: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    pub country_slug: String,
}

impl Place {
    pub(crate) fn from_row(df: &DataFrame, idx: usize) -> Option<Self> {
        Some(Self {
            id: row_i64(df, "id", idx)?,
            name: row_str(df, "name", idx)?,
            slug: row_str(df, "slug", idx)?,
            population: row_i64(df, "population", idx),
            latitude: row_f64(df, "latitude", idx),
            longitude: row_f64(df, "longitude", idx),
            country_slug: row_str(df, "country_slug", idx)
                .unwrap_or_else(|| DEFAULT_COUNTRY_SLUG.to_string()),
        })
    }
}

/// A county or borough, one geographic tier above [`Place`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminArea {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub country_slug: String,
}

impl AdminArea {
    pub(crate) fn from_row(df: &DataFrame, idx: usize) -> Option<Self> {
        Some(Self {
            id: row_i64(df, "id", idx)?,
            name: row_str(df, "name", idx)?,
            slug: row_str(df, "slug", idx)?,
            country_slug: row_str(df, "country_slug", idx)
                .unwrap_or_else(|| DEFAULT_COUNTRY_SLUG.to_string()),
        })
    }
}

/// An appliance category such as "Washing Machines".
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub name_plural: String,
    pub slug: String,
    pub supports_repair: bool,
}

impl Category {
    pub(crate) fn from_row(df: &DataFrame, idx: usize) -> Option<Self> {
        Some(Self {
            id: row_i64(df, "id", idx)?,
            name: row_str(df, "name", idx)?,
            name_plural: row_str(df, "name_plural", idx)?,
            slug: row_str(df, "slug", idx)?,
            supports_repair: row_bool(df, "supports_repair", idx).unwrap_or(false),
        })
    }
}

/// An appliance brand. Brand pages in this product are repair directories.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

impl Brand {
    pub(crate) fn from_row(df: &DataFrame, idx: usize) -> Option<Self> {
        Some(Self {
            id: row_i64(df, "id", idx)?,
            name: row_str(df, "name", idx)?,
            slug: row_str(df, "slug", idx)?,
        })
    }
}

pub(crate) fn row_str(df: &DataFrame, name: &str, idx: usize) -> Option<String> {
    df.column(name)
        .ok()
        .and_then(|c| c.str().ok())
        .and_then(|ca| ca.get(idx))
        .map(ToOwned::to_owned)
}

pub(crate) fn row_i64(df: &DataFrame, name: &str, idx: usize) -> Option<i64> {
    df.column(name)
        .ok()
        .and_then(|c| c.i64().ok())
        .and_then(|ca| ca.get(idx))
}

pub(crate) fn row_f64(df: &DataFrame, name: &str, idx: usize) -> Option<f64> {
    df.column(name)
        .ok()
        .and_then(|c| c.f64().ok())
        .and_then(|ca| ca.get(idx))
}

pub(crate) fn row_bool(df: &DataFrame, name: &str, idx: usize) -> Option<bool> {
    df.column(name)
        .ok()
        .and_then(|c| c.bool().ok())
        .and_then(|ca| ca.get(idx))
}

// --- Embedded sample dataset ----------------------------------------------

fn sample_places() -> DataFrame {
    df!(
        "id" => [1i64, 2, 3, 4, 5, 6, 7, 8, 9, 10],
        "name" => [
            "Manchester",
            "London",
            "Birmingham",
            "Leeds",
            "Liverpool",
            "Bristol",
            "Newcastle upon Tyne",
            "York",
            "Cardiff",
            "Edinburgh",
        ],
        "slug" => [
            "manchester",
            "london",
            "birmingham",
            "leeds",
            "liverpool",
            "bristol",
            "newcastle-upon-tyne",
            "york",
            "cardiff",
            "edinburgh",
        ],
        "population" => [
            Some(553230i64),
            Some(8961989),
            Some(1141816),
            Some(789194),
            Some(864122),
            Some(617280),
            Some(302820),
            Some(153717),
            Some(362310),
            Some(488050),
        ],
        "latitude" => [
            Some(53.4808f64),
            Some(51.5074),
            Some(52.4862),
            Some(53.8008),
            Some(53.4084),
            Some(51.4545),
            Some(54.9783),
            Some(53.9600),
            Some(51.4816),
            Some(55.9533),
        ],
        "longitude" => [
            Some(-2.2426f64),
            Some(-0.1278),
            Some(-1.8904),
            Some(-1.5491),
            Some(-2.9916),
            Some(-2.5879),
            Some(-1.6178),
            Some(-1.0873),
            Some(-3.1791),
            Some(-3.1883),
        ],
        "country_slug" => [
            Some("england"),
            Some("england"),
            Some("england"),
            Some("england"),
            Some("england"),
            Some("england"),
            Some("england"),
            Some("england"),
            Some("wales"),
            Some("scotland"),
        ],
        "admin_area" => [
            Some("Greater Manchester"),
            Some("Greater London"),
            Some("West Midlands"),
            Some("West Yorkshire"),
            Some("Merseyside"),
            Some("Bristol"),
            Some("Tyne and Wear"),
            Some("North Yorkshire"),
            Some("Cardiff"),
            Some("City of Edinburgh"),
        ],
        "is_active" => [true, true, true, true, true, true, true, true, true, true],
    )
    .expect("sample places frame")
}

fn sample_admin_areas() -> DataFrame {
    df!(
        "id" => [1i64, 2, 3, 4, 5],
        "name" => [
            "Greater Manchester",
            "West Midlands",
            "West Yorkshire",
            "Merseyside",
            "Kent",
        ],
        "slug" => [
            "greater-manchester",
            "west-midlands",
            "west-yorkshire",
            "merseyside",
            "kent",
        ],
        "country_slug" => [
            Some("england"),
            Some("england"),
            Some("england"),
            Some("england"),
            Some("england"),
        ],
    )
    .expect("sample admin areas frame")
}

fn sample_categories() -> DataFrame {
    df!(
        "id" => [1i64, 2, 3, 4, 5, 6],
        "name" => [
            "Washing Machine",
            "Fridge Freezer",
            "Dishwasher",
            "Tumble Dryer",
            "Cooker",
            "Television",
        ],
        "name_plural" => [
            "Washing Machines",
            "Fridge Freezers",
            "Dishwashers",
            "Tumble Dryers",
            "Cookers",
            "Televisions",
        ],
        "slug" => [
            "washing-machines",
            "fridge-freezers",
            "dishwashers",
            "tumble-dryers",
            "cookers",
            "televisions",
        ],
        "supports_repair" => [true, true, true, true, true, false],
        "display_order" => [
            Some(1i64),
            Some(2),
            Some(3),
            Some(4),
            Some(5),
            None,
        ],
    )
    .expect("sample categories frame")
}

fn sample_brands() -> DataFrame {
    df!(
        "id" => [1i64, 2, 3, 4, 5],
        "name" => ["Bosch", "Samsung", "Hotpoint", "Beko", "LG"],
        "slug" => ["bosch", "samsung", "hotpoint", "beko", "lg"],
    )
    .expect("sample brands frame")
}

mod error {
    use std::path::PathBuf;

    use polars::prelude::PolarsError;
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum DataError {
        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),
        #[error("Polars error: {0}")]
        Polars(#[from] PolarsError),
        #[error("column '{column}' missing from '{frame}' frame")]
        MissingColumn { frame: &'static str, column: String },
        #[error("required data file not found: {0}")]
        MissingFile(PathBuf),
    }

    pub type Result<T> = std::result::Result<T, DataError>;
}
