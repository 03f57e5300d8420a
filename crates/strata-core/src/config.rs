//! Editor configuration.

use crate::error::EditorResult;
use serde::{Deserialize, Serialize};

/// Default number of snapshots kept in history.
pub const DEFAULT_MAX_HISTORY: usize = 30;
/// Default snap distance in document pixels.
pub const DEFAULT_SNAP_THRESHOLD: f64 = 15.0;

/// Tunable editor settings.
///
/// Missing fields fall back to their defaults when loaded from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of history snapshots.
    pub max_history: usize,
    /// Snap distance in interaction pixels, compared strictly (`< threshold`).
    pub snap_threshold: f64,
    /// Minimum crop box size in document pixels.
    pub crop_min_size: f64,
    /// Minimum crop box size while resizing by handle, in interaction units.
    pub crop_handle_min: f64,
    /// Minimum layer size while resizing.
    pub resize_min: f64,
    /// Padding around committed text.
    pub text_padding: u32,
    pub snap_enabled: bool,
    /// When false, resizing keeps the aspect ratio.
    pub deform: bool,
    /// Canvas size before anything is imported.
    pub default_canvas: (u32, u32),
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
            snap_threshold: DEFAULT_SNAP_THRESHOLD,
            crop_min_size: 10.0,
            crop_handle_min: 50.0,
            resize_min: 10.0,
            text_padding: 10,
            snap_enabled: true,
            deform: true,
            default_canvas: (800, 600),
        }
    }
}

impl EditorConfig {
    /// Parse a config from JSON.
    pub fn from_json(json: &str) -> EditorResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> EditorResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.max_history, 30);
        assert!((config.snap_threshold - 15.0).abs() < f64::EPSILON);
        assert_eq!(config.default_canvas, (800, 600));
        assert!(config.deform);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EditorConfig::from_json(r#"{ "max_history": 5, "deform": false }"#).unwrap();
        assert_eq!(config.max_history, 5);
        assert!(!config.deform);
        assert_eq!(config.text_padding, 10);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut config = EditorConfig::default();
        config.snap_threshold = 8.0;
        let json = config.to_json().unwrap();
        assert_eq!(EditorConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_json() {
        let result = EditorConfig::from_json("{ not json");
        assert!(matches!(result, Err(crate::EditorError::Config(_))));
    }
}
