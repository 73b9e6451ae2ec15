//! Predictor configuration.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Tunables for a [`PredictionEngine`](crate::PredictionEngine).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PredictorConfig {
    /// Distance used both ahead and behind by the default window.
    pub default_distance: u64,
    /// Largest span (ahead + behind + 1) the default window may cover.
    pub max_window: u64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            default_distance: 1,
            max_window: 10_000,
        }
    }
}

impl PredictorConfig {
    /// Validate configuration.
    ///
    /// This is called by every engine constructor.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidConfig`] if a value is out of bounds.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.default_distance == 0 {
            return Err(ValidationError::InvalidConfig {
                reason: "default_distance must be > 0".to_string(),
            });
        }
        let span = self
            .default_distance
            .saturating_mul(2)
            .saturating_add(1);
        if span > self.max_window {
            return Err(ValidationError::InvalidConfig {
                reason: format!(
                    "default window spans {span} counters, exceeding max_window {}",
                    self.max_window
                ),
            });
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration document.
    ///
    /// Missing fields take their defaults; unknown fields are rejected.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidConfig`] for malformed JSON or invalid values.
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ValidationError::InvalidConfig {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_is_valid() {
        PredictorConfig::default().validate().unwrap();
    }

    #[test]
    fn config_rejects_zero_distance() {
        let c = PredictorConfig {
            default_distance: 0,
            ..PredictorConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn config_rejects_window_over_limit() {
        let c = PredictorConfig {
            default_distance: 5,
            max_window: 10,
        };
        assert!(c.validate().is_err());

        let c = PredictorConfig {
            default_distance: 5,
            max_window: 11,
        };
        c.validate().unwrap();
    }

    #[test]
    fn config_from_json_fills_defaults() {
        let c = PredictorConfig::from_json(r#"{"default_distance": 20}"#).unwrap();
        assert_eq!(c.default_distance, 20);
        assert_eq!(c.max_window, 10_000);
    }

    #[test]
    fn config_from_json_rejects_unknown_and_invalid() {
        assert!(PredictorConfig::from_json(r#"{"distance": 3}"#).is_err());
        assert!(PredictorConfig::from_json(r#"{"default_distance": 0}"#).is_err());
        assert!(PredictorConfig::from_json("not json").is_err());
    }
}
