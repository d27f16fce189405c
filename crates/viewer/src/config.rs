use std::path::Path;

use foundation::math::GLOBE_RADIUS;
use runtime::{DEFAULT_CLOUD_DRIFT, DEFAULT_GLOBE_SPEED};
use scene::{MeshOptions, PickOptions, TapClassifier, Triangulation};
use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Invalid { field: &'static str, reason: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "config io error: {err}"),
            ConfigError::Json(err) => write!(f, "config json error: {err}"),
            ConfigError::Invalid { field, reason } => write!(f, "invalid config field {field}: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        ConfigError::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        ConfigError::Json(value)
    }
}

/// Settings for one globe session. Every field has a default, so `{}` is a
/// complete configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GlobeConfig {
    pub radius: f64,
    /// `"fan"` or `"earcut"`.
    pub triangulation: String,
    /// Radians per frame.
    pub globe_speed: f64,
    /// Extra radians per frame for the cloud layer.
    pub cloud_drift: f64,
    pub tap_max_duration_ms: f64,
    pub tap_max_move_px: f64,
    /// Border segments within this distance of a pick ray also count as hits.
    pub line_threshold: Option<f64>,
    /// Base URL of the metadata server, used to resolve relative image paths.
    pub api_base: String,
    /// Object name inside TopoJSON inputs.
    pub topology_object: String,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        let taps = TapClassifier::default();
        Self {
            radius: GLOBE_RADIUS,
            triangulation: Triangulation::Fan.as_str().to_string(),
            globe_speed: DEFAULT_GLOBE_SPEED,
            cloud_drift: DEFAULT_CLOUD_DRIFT,
            tap_max_duration_ms: taps.max_duration_ms,
            tap_max_move_px: taps.max_move_px,
            line_threshold: None,
            api_base: "http://localhost:3000".to_string(),
            topology_object: formats::DEFAULT_TOPOLOGY_OBJECT.to_string(),
        }
    }
}

impl GlobeConfig {
    pub fn from_json_str(payload: &str) -> Result<Self, ConfigError> {
        let cfg: GlobeConfig = serde_json::from_str(payload)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let payload = std::fs::read_to_string(path)?;
        Self::from_json_str(&payload)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(ConfigError::Invalid {
                field: "radius",
                reason: format!("must be positive, got {}", self.radius),
            });
        }
        match self.line_threshold {
            Some(t) if !(t.is_finite() && t >= 0.0) => {
                return Err(ConfigError::Invalid {
                    field: "lineThreshold",
                    reason: format!("must be non-negative, got {t}"),
                });
            }
            _ => {}
        }
        self.triangulation()?;
        Ok(())
    }

    pub fn triangulation(&self) -> Result<Triangulation, ConfigError> {
        match self.triangulation.trim().to_ascii_lowercase().as_str() {
            "fan" => Ok(Triangulation::Fan),
            "earcut" | "ear_cut" => Ok(Triangulation::EarCut),
            other => Err(ConfigError::Invalid {
                field: "triangulation",
                reason: format!("expected \"fan\" or \"earcut\", got {other:?}"),
            }),
        }
    }

    pub fn mesh_options(&self) -> Result<MeshOptions, ConfigError> {
        Ok(MeshOptions {
            radius: self.radius,
            triangulation: self.triangulation()?,
        })
    }

    pub fn pick_options(&self) -> PickOptions {
        PickOptions {
            line_threshold: self.line_threshold,
            ..PickOptions::default()
        }
    }

    pub fn tap_classifier(&self) -> TapClassifier {
        TapClassifier {
            max_duration_ms: self.tap_max_duration_ms,
            max_move_px: self.tap_max_move_px,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_object_is_the_default() {
        let cfg = GlobeConfig::from_json_str("{}").expect("parse");
        assert_eq!(cfg, GlobeConfig::default());
        assert_eq!(cfg.mesh_options().expect("mesh"), MeshOptions::default());
        assert_eq!(cfg.tap_classifier(), TapClassifier::default());
        assert_eq!(cfg.globe_speed, 0.0005);
    }

    #[test]
    fn partial_overrides() {
        let cfg = GlobeConfig::from_json_str(r#"{"triangulation": "EarCut", "lineThreshold": 0.5}"#)
            .expect("parse");
        assert_eq!(cfg.triangulation().expect("triangulation"), Triangulation::EarCut);
        assert_eq!(cfg.pick_options().line_threshold, Some(0.5));
        assert_eq!(cfg.radius, GLOBE_RADIUS);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            GlobeConfig::from_json_str(r#"{"triangulation": "delaunay"}"#),
            Err(ConfigError::Invalid { field: "triangulation", .. })
        ));
        assert!(matches!(
            GlobeConfig::from_json_str(r#"{"radius": 0}"#),
            Err(ConfigError::Invalid { field: "radius", .. })
        ));
        assert!(matches!(GlobeConfig::from_json_str("[]"), Err(ConfigError::Json(_))));
    }
}
