use serde::{Deserialize, Serialize};

use crate::error::{ViewError, ViewResult};

pub const DEFAULT_DECIMATION_THRESHOLD: usize = 40_000;
pub const DEFAULT_TARGET_POINTS: usize = 4_000;

/// Policy knobs of the adaptive series reducer.
///
/// Serializable so host applications can persist/load viewer setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReducerConfig {
    /// Visible sample counts above this switch to min/max decimation.
    #[serde(default = "default_decimation_threshold")]
    pub decimation_threshold: usize,
    /// Point budget used to derive the decimation step.
    #[serde(default = "default_target_points")]
    pub target_points: usize,
}

impl Default for ReducerConfig {
    fn default() -> Self {
        Self {
            decimation_threshold: default_decimation_threshold(),
            target_points: default_target_points(),
        }
    }
}

impl ReducerConfig {
    #[must_use]
    pub fn with_decimation_threshold(mut self, decimation_threshold: usize) -> Self {
        self.decimation_threshold = decimation_threshold;
        self
    }

    #[must_use]
    pub fn with_target_points(mut self, target_points: usize) -> Self {
        self.target_points = target_points;
        self
    }

    pub fn validate(self) -> ViewResult<()> {
        if self.target_points == 0 {
            return Err(ViewError::InvalidData(
                "target point budget must be > 0".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Viewer session configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub reducer: ReducerConfig,
    /// Chunks retained by LRU-backed sessions. Single-slot sessions ignore it.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reducer: ReducerConfig::default(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn with_reducer(mut self, reducer: ReducerConfig) -> Self {
        self.reducer = reducer;
        self
    }

    #[must_use]
    pub fn with_cache_capacity(mut self, cache_capacity: usize) -> Self {
        self.cache_capacity = cache_capacity;
        self
    }

    pub fn validate(self) -> ViewResult<()> {
        self.reducer.validate()
    }

    /// Checks `cache_capacity`, which only LRU-backed sessions use.
    pub fn validate_cache_capacity(self) -> ViewResult<()> {
        if self.cache_capacity == 0 {
            return Err(ViewError::InvalidData(
                "cache capacity must be > 0".to_owned(),
            ));
        }
        Ok(())
    }

    pub fn from_json_str(input: &str) -> ViewResult<Self> {
        let config: Self = serde_json::from_str(input).map_err(|e| {
            ViewError::InvalidData(format!("failed to parse session config: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> ViewResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            ViewError::InvalidData(format!("failed to serialize session config: {e}"))
        })
    }
}

fn default_decimation_threshold() -> usize {
    DEFAULT_DECIMATION_THRESHOLD
}

fn default_target_points() -> usize {
    DEFAULT_TARGET_POINTS
}

fn default_cache_capacity() -> usize {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = SessionConfig::from_json_str("{}").expect("parse");
        assert_eq!(config, SessionConfig::default());

        let config = SessionConfig::from_json_str(r#"{"reducer": {"target_points": 500}}"#)
            .expect("parse");
        assert_eq!(config.reducer.target_points, 500);
        assert_eq!(
            config.reducer.decimation_threshold,
            DEFAULT_DECIMATION_THRESHOLD
        );
    }

    #[test]
    fn zero_budget_is_rejected() {
        assert!(SessionConfig::from_json_str(r#"{"reducer": {"target_points": 0}}"#).is_err());
    }

    #[test]
    fn cache_capacity_is_checked_separately() {
        let config = SessionConfig::from_json_str(r#"{"cache_capacity": 0}"#).expect("parse");
        assert!(config.validate().is_ok());
        assert!(config.validate_cache_capacity().is_err());
        assert!(SessionConfig::default().validate_cache_capacity().is_ok());
    }

    #[test]
    fn json_round_trip_preserves_values() {
        let config = SessionConfig::default()
            .with_cache_capacity(8)
            .with_reducer(ReducerConfig::default().with_decimation_threshold(1_000));
        let json = config.to_json_pretty().expect("serialize");
        assert_eq!(SessionConfig::from_json_str(&json).expect("parse"), config);
    }
}
