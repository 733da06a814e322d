//! Layer options and their persistence

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::host::OVERLAY_PANE;

/// Minimum time between two hover evaluations
pub const DEFAULT_HOVER_THROTTLE_MS: u64 = 120;

/// Options recognised by the layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerOptions {
    /// Host pane the surface is mounted into (None = overlay pane)
    #[serde(default)]
    pub pane: Option<String>,
    /// Stacking hint passed through to the host
    #[serde(default)]
    pub z_index: Option<i32>,
    /// Hover hit testing runs at most once per this many milliseconds
    #[serde(default = "default_hover_throttle_ms")]
    pub hover_throttle_ms: u64,
}

fn default_hover_throttle_ms() -> u64 {
    DEFAULT_HOVER_THROTTLE_MS
}

/// Partial options; only fields that are set replace current values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerOptionsPatch {
    #[serde(default)]
    pub pane: Option<String>,
    #[serde(default)]
    pub z_index: Option<i32>,
    #[serde(default)]
    pub hover_throttle_ms: Option<u64>,
}

impl LayerOptions {
    /// Pane the surface mounts into
    pub fn pane(&self) -> &str {
        self.pane.as_deref().unwrap_or(OVERLAY_PANE)
    }

    pub fn hover_throttle(&self) -> Duration {
        Duration::from_millis(self.hover_throttle_ms)
    }

    /// Apply the fields set in `patch`
    pub fn merge(&mut self, patch: LayerOptionsPatch) {
        if let Some(pane) = patch.pane {
            self.pane = Some(pane);
        }
        if let Some(z_index) = patch.z_index {
            self.z_index = Some(z_index);
        }
        if let Some(ms) = patch.hover_throttle_ms {
            self.hover_throttle_ms = ms;
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load options from disk, or return defaults if unavailable
    pub fn load(path: &Path) -> Self {
        match Self::read(path) {
            Ok(options) => options,
            Err(err) => {
                log::warn!(
                    "Error loading layer options from {}, using defaults: {}",
                    path.display(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Save options to disk
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

impl Default for LayerOptions {
    fn default() -> Self {
        Self {
            // Mount into the host's overlay pane
            pane: None,
            z_index: None,
            hover_throttle_ms: DEFAULT_HOVER_THROTTLE_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = LayerOptions::default();
        assert_eq!(options.pane(), OVERLAY_PANE);
        assert_eq!(options.hover_throttle(), Duration::from_millis(120));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let options = LayerOptions::from_json(r#"{ "pane": "markers" }"#).unwrap();
        assert_eq!(options.pane(), "markers");
        assert_eq!(options.hover_throttle_ms, DEFAULT_HOVER_THROTTLE_MS);
        assert_eq!(options.z_index, None);
    }

    #[test]
    fn test_merge_only_touches_set_fields() {
        let mut options = LayerOptions {
            pane: Some("a".into()),
            z_index: Some(3),
            hover_throttle_ms: 50,
        };
        options.merge(LayerOptionsPatch {
            z_index: Some(7),
            ..Default::default()
        });
        assert_eq!(options.pane(), "a");
        assert_eq!(options.z_index, Some(7));
        assert_eq!(options.hover_throttle_ms, 50);
    }

    #[test]
    fn test_load_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert_eq!(LayerOptions::load(&missing), LayerOptions::default());

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{ not json").unwrap();
        assert_eq!(LayerOptions::load(&bad), LayerOptions::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layer.json");
        let options = LayerOptions {
            pane: Some("shadowPane".into()),
            z_index: Some(400),
            hover_throttle_ms: 60,
        };
        options.save(&path).unwrap();
        assert_eq!(LayerOptions::load(&path), options);
    }
}
