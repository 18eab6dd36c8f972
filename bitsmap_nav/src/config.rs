// Data-driven navigation configuration.
//
// `NavConfig` holds the few tunables the compiler and narrator read: where
// the description cursor starts, how strict the line grammar is, the minimum
// angle reported as a turn, and the landmark ranking used when several POIs
// share a node. Loaded from JSON; every field has a default so partial files
// are accepted.
//
// See also: `compiler.rs` (origin, strict_lines), `narrate.rs`
// (turn_threshold_degrees, landmark_preference).

use crate::error::ConfigError;
use crate::types::LandmarkClass;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables for compilation and narration. Never mutated after load.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Cursor position before the first description line.
    pub origin: [f64; 3],

    /// Turns whose magnitude does not exceed this many degrees are treated
    /// as going straight.
    pub turn_threshold_degrees: f64,

    /// When true an unrecognized line aborts compilation; when false it is
    /// skipped with a warning. Blank lines and `#` comments are always
    /// skipped.
    pub strict_lines: bool,

    /// Landmark ranking for "Goto <landmark>" instructions, most preferred
    /// first. Classes missing from the list rank after all listed ones.
    pub landmark_preference: Vec<LandmarkClass>,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            origin: [0.0, 0.0, 0.0],
            turn_threshold_degrees: 1.0,
            strict_lines: true,
            landmark_preference: vec![
                LandmarkClass::Room,
                LandmarkClass::Washroom,
                LandmarkClass::Fixture,
                LandmarkClass::Lift,
                LandmarkClass::Stairs,
            ],
        }
    }
}

impl NavConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: NavConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Reject values that parse but cannot be used. Floors are whole
    /// numbers, so the origin's z must be one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.origin.iter().all(|c| c.is_finite()) {
            return Err(ConfigError::Invalid("origin must be finite".into()));
        }
        if self.origin[2].fract() != 0.0 {
            return Err(ConfigError::Invalid(format!(
                "origin z must be a whole floor number, got {}",
                self.origin[2]
            )));
        }
        if !self.turn_threshold_degrees.is_finite() || self.turn_threshold_degrees < 0.0 {
            return Err(ConfigError::Invalid(
                "turn_threshold_degrees must be a non-negative number".into(),
            ));
        }
        Ok(())
    }

    /// Rank of a landmark class; lower is more preferred.
    pub fn landmark_rank(&self, class: LandmarkClass) -> usize {
        self.landmark_preference
            .iter()
            .position(|&c| c == class)
            .unwrap_or(self.landmark_preference.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = NavConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let restored = NavConfig::from_json_str(&json).unwrap();
        assert_eq!(config.origin, restored.origin);
        assert_eq!(config.turn_threshold_degrees, restored.turn_threshold_degrees);
        assert_eq!(config.landmark_preference, restored.landmark_preference);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config = NavConfig::from_json_str(r#"{ "turn_threshold_degrees": 10.0 }"#).unwrap();
        assert_eq!(config.turn_threshold_degrees, 10.0);
        assert!(config.strict_lines);
        assert_eq!(config.origin, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn config_loads_from_json_string() {
        let json = r#"{
            "origin": [2.0, 3.0, 1.0],
            "turn_threshold_degrees": 5.0,
            "strict_lines": false,
            "landmark_preference": ["Washroom", "Room"]
        }"#;
        let config = NavConfig::from_json_str(json).unwrap();
        assert_eq!(config.origin, [2.0, 3.0, 1.0]);
        assert!(!config.strict_lines);
        assert_eq!(config.landmark_rank(LandmarkClass::Washroom), 0);
        assert_eq!(config.landmark_rank(LandmarkClass::Room), 1);
        assert_eq!(config.landmark_rank(LandmarkClass::Stairs), 2);
    }

    #[test]
    fn negative_threshold_rejected() {
        let err = NavConfig::from_json_str(r#"{ "turn_threshold_degrees": -1.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn fractional_origin_floor_rejected() {
        let err = NavConfig::from_json_str(r#"{ "origin": [0.0, 0.0, -0.5] }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(NavConfig::from_json_str(r#"{ "origin": [0.5, 2.5, -1.0] }"#).is_ok());
    }

    #[test]
    fn malformed_json_rejected() {
        let err = NavConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn default_ranking_prefers_rooms() {
        let config = NavConfig::default();
        assert!(
            config.landmark_rank(LandmarkClass::Room)
                < config.landmark_rank(LandmarkClass::Washroom)
        );
        assert!(
            config.landmark_rank(LandmarkClass::Lift) < config.landmark_rank(LandmarkClass::Stairs)
        );
    }
}
