// SPDX-License-Identifier: MIT OR Apache-2.0
//! Model settings.
//!
//! Settings carry the global frame defaults (the values a frame takes when
//! its element lacks an attribute) and the attribute write policy. They are
//! stored as RON.

use crate::error::{DocumentError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Values used for frame attributes missing from the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameDefaults {
    /// Frame title
    pub title: String,
    /// Hide the frame's content outside its own view
    pub hide: bool,
    /// Clip to the frame boundary
    pub clip: bool,
    /// Advance automatically after a timeout
    pub timeout_enable: bool,
    /// Timeout before advancing, in milliseconds
    pub timeout_ms: u32,
    /// Duration of the transition into the frame, in milliseconds
    pub transition_duration_ms: u32,
    /// Zoom applied halfway through the transition, in percent
    pub transition_zoom_percent: i32,
    /// Timing profile of the transition
    pub transition_profile: String,
}

impl Default for FrameDefaults {
    fn default() -> Self {
        Self {
            title: String::new(),
            hide: true,
            clip: true,
            timeout_enable: false,
            timeout_ms: 5000,
            transition_duration_ms: 1000,
            transition_zoom_percent: 0,
            transition_profile: "linear".to_string(),
        }
    }
}

/// How field values are committed to the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WritePolicy {
    /// Write every field on every commit
    #[default]
    Always,
    /// Remove attributes whose value equals their fallback
    /// (global default for frames, enclosing frame for layers)
    OmitDefaults,
}

impl WritePolicy {
    /// Whether fallback-equal values are omitted
    pub fn omits_defaults(self) -> bool {
        self == Self::OmitDefaults
    }
}

/// Complete model settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Settings format version
    pub version: u32,
    /// Frame attribute defaults
    #[serde(default)]
    pub frame_defaults: FrameDefaults,
    /// Attribute write policy
    #[serde(default)]
    pub write_policy: WritePolicy,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            frame_defaults: FrameDefaults::default(),
            write_policy: WritePolicy::default(),
        }
    }
}

impl ModelSettings {
    /// Parse settings from RON text
    pub fn from_ron(content: &str) -> Result<Self> {
        let settings: ModelSettings =
            ron::from_str(content).map_err(|e| DocumentError::Settings(e.to_string()))?;

        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(DocumentError::UnsupportedSettingsVersion {
                found: settings.version,
                supported: SETTINGS_FORMAT_VERSION,
            });
        }

        Ok(settings)
    }

    /// Serialize settings to pretty RON
    pub fn to_ron(&self) -> Result<String> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);

        ron::ser::to_string_pretty(self, config).map_err(|e| DocumentError::Settings(e.to_string()))
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings = Self::from_ron(&content)?;
        tracing::debug!("Loaded model settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_ron()?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_frame_values() {
        let defaults = FrameDefaults::default();
        assert_eq!(defaults.title, "");
        assert!(defaults.hide);
        assert!(defaults.clip);
        assert!(!defaults.timeout_enable);
        assert_eq!(defaults.timeout_ms, 5000);
        assert_eq!(defaults.transition_duration_ms, 1000);
        assert_eq!(defaults.transition_zoom_percent, 0);
        assert_eq!(defaults.transition_profile, "linear");
    }

    #[test]
    fn test_settings_serialization() {
        let mut settings = ModelSettings::default();
        settings.frame_defaults.timeout_ms = 3000;
        settings.write_policy = WritePolicy::OmitDefaults;

        let ron_str = settings.to_ron().unwrap();
        let loaded = ModelSettings::from_ron(&ron_str).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_partial_settings_use_defaults() {
        let loaded = ModelSettings::from_ron(
            "(version: 1, frame_defaults: (transition_profile: \"accelerate\"))",
        )
        .unwrap();
        assert_eq!(loaded.frame_defaults.transition_profile, "accelerate");
        assert_eq!(loaded.frame_defaults.timeout_ms, 5000);
        assert_eq!(loaded.write_policy, WritePolicy::Always);
    }

    #[test]
    fn test_newer_version_rejected() {
        let err = ModelSettings::from_ron("(version: 99)").unwrap_err();
        assert!(matches!(
            err,
            DocumentError::UnsupportedSettingsVersion { found: 99, .. }
        ));
    }

    #[test]
    fn test_settings_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sozi.ron");

        let mut settings = ModelSettings::default();
        settings.frame_defaults.hide = false;
        settings.save(&path).unwrap();

        assert_eq!(ModelSettings::load(&path).unwrap(), settings);
    }
}
