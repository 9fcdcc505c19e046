use crate::error::DirectoryError;

/// Tunable limits for the search components.
///
/// The defaults match the production site; override individual knobs through
/// [`SearchTuning::builder`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchTuning {
    /// Half-width of the nearest-place bounding box, in degrees.
    pub nearest_box_radius_deg: f64,
    /// Candidate cap inside the bounding box.
    pub nearest_box_limit: u32,
    /// Candidate cap for the nationwide population fallback.
    pub nearest_fallback_limit: u32,
    /// Minimum normalized query length before suggestions run.
    pub suggest_min_query_len: usize,
    /// Maximum place suggestions per response.
    pub suggest_place_limit: u32,
    /// Maximum category suggestions per response.
    pub suggest_category_limit: u32,
    /// Maximum brand suggestions per response.
    pub suggest_brand_limit: u32,
    /// Row cap for the popular-categories and popular-places lists.
    pub popular_limit: u32,
}

impl SearchTuning {
    pub fn builder() -> SearchTuningBuilder {
        SearchTuningBuilder::default()
    }
}

impl Default for SearchTuning {
    fn default() -> Self {
        Self {
            nearest_box_radius_deg: 0.5,
            nearest_box_limit: 20,
            nearest_fallback_limit: 50,
            suggest_min_query_len: 2,
            suggest_place_limit: 8,
            suggest_category_limit: 5,
            suggest_brand_limit: 5,
            popular_limit: 8,
        }
    }
}

/// Builder for search tuning with ergonomic defaults
#[derive(Debug, Clone, Default)]
pub struct SearchTuningBuilder {
    tuning: SearchTuning,
}

impl SearchTuningBuilder {
    /// Create a new builder with the production defaults
    pub fn new() -> Self {
        Self {
            tuning: SearchTuning::default(),
        }
    }

    /// Preset for sparse rural datasets: a wider bounding box and a larger
    /// fallback pool.
    pub fn wide_area() -> Self {
        let mut builder = Self::new();
        builder.tuning.nearest_box_radius_deg = 1.0;
        builder.tuning.nearest_box_limit = 50;
        builder.tuning.nearest_fallback_limit = 100;
        builder
    }

    /// Set the bounding-box half-width in degrees (must be positive)
    pub fn nearest_box_radius_deg(mut self, radius: f64) -> Result<Self, DirectoryError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(DirectoryError::ConfigError(format!(
                "Bounding box radius must be a positive number of degrees, got {radius}"
            )));
        }
        self.tuning.nearest_box_radius_deg = radius;
        Ok(self)
    }

    /// Set the candidate cap inside the bounding box
    pub fn nearest_box_limit(mut self, limit: u32) -> Self {
        self.tuning.nearest_box_limit = limit;
        self
    }

    /// Set the candidate cap for the nationwide fallback
    pub fn nearest_fallback_limit(mut self, limit: u32) -> Self {
        self.tuning.nearest_fallback_limit = limit;
        self
    }

    /// Set the minimum query length before suggestions run
    pub fn suggest_min_query_len(mut self, len: usize) -> Self {
        self.tuning.suggest_min_query_len = len;
        self
    }

    /// Set the maximum place suggestions per response
    pub fn suggest_place_limit(mut self, limit: u32) -> Self {
        self.tuning.suggest_place_limit = limit;
        self
    }

    /// Set the maximum category suggestions per response
    pub fn suggest_category_limit(mut self, limit: u32) -> Self {
        self.tuning.suggest_category_limit = limit;
        self
    }

    /// Set the maximum brand suggestions per response
    pub fn suggest_brand_limit(mut self, limit: u32) -> Self {
        self.tuning.suggest_brand_limit = limit;
        self
    }

    /// Set the row cap for the popular lists
    pub fn popular_limit(mut self, limit: u32) -> Self {
        self.tuning.popular_limit = limit;
        self
    }

    /// Build the final tuning
    pub fn build(self) -> SearchTuning {
        self.tuning
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_builder() {
        let tuning = SearchTuningBuilder::new().build();
        assert_eq!(tuning, SearchTuning::default());
        assert_eq!(tuning.nearest_box_limit, 20);
        assert_eq!(tuning.nearest_fallback_limit, 50);
    }

    #[test]
    fn test_wide_area_preset() {
        let tuning = SearchTuningBuilder::wide_area().build();
        assert_eq!(tuning.nearest_box_radius_deg, 1.0);
        assert_eq!(tuning.nearest_fallback_limit, 100);
    }

    #[test]
    fn test_method_chaining() {
        let tuning = SearchTuning::builder()
            .suggest_place_limit(3)
            .suggest_min_query_len(1)
            .popular_limit(4)
            .build();

        assert_eq!(tuning.suggest_place_limit, 3);
        assert_eq!(tuning.suggest_min_query_len, 1);
        assert_eq!(tuning.popular_limit, 4);
    }

    #[test]
    fn test_radius_validation() {
        let result = SearchTuningBuilder::new().nearest_box_radius_deg(0.25);
        assert!(result.is_ok());

        let result = SearchTuningBuilder::new().nearest_box_radius_deg(-0.5);
        assert!(result.is_err());

        let result = SearchTuningBuilder::new().nearest_box_radius_deg(f64::NAN);
        assert!(result.is_err());
    }
}
