//! Engine configuration with TOML preset support.
//!
//! All tunables (update rate, initial target, duration mapping, spring
//! parameters) are consolidated here. Options serialize to/from TOML so
//! motion presets can be stored on disk and shared; a JSON schema
//! export is available for UI form generation.
//!
//! Out-of-range values never error. Construction routes every field
//! through the engine's rejecting setters, so an invalid field simply
//! falls back to its default, matching the setters' silently-ignore
//! contract.

use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::FederError;
use crate::spring::{DEFAULT_DAMPENING, DEFAULT_STIFFNESS, Endpoint};

/// Configuration for a [`SpringInterpolator`](crate::SpringInterpolator).
///
/// Uses `#[serde(default)]` so partial TOML files (e.g. only overriding
/// `stiffness`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema,
)]
#[serde(default)]
pub struct InterpolatorOptions {
    /// Ticks per second of the update loop.
    pub update_rate: u32,
    /// Endpoint the model starts at rest at.
    pub initial_target: Endpoint,
    /// Real-time milliseconds one full simulation sweep should take.
    /// Accepted range `[100, 5000]` (inclusive).
    pub approximate_duration_ms: f64,
    /// Spring stiffness (k). Accepted range `(0.1, 20)` (exclusive).
    pub stiffness: f64,
    /// Damper dampening (d). Accepted range `(0.1, 10)` (exclusive).
    pub dampening: f64,
}

impl Default for InterpolatorOptions {
    fn default() -> Self {
        Self {
            update_rate: 60,
            initial_target: Endpoint::Bottom,
            approximate_duration_ms: 1000.0,
            stiffness: DEFAULT_STIFFNESS,
            dampening: DEFAULT_DAMPENING,
        }
    }
}

impl InterpolatorOptions {
    /// Generate JSON Schema describing the options surface.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(InterpolatorOptions)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`FederError::Io`] if the file cannot be read and
    /// [`FederError::OptionsParse`] if it is not valid TOML.
    pub fn load(path: &Path) -> Result<Self, FederError> {
        let content = std::fs::read_to_string(path).map_err(FederError::Io)?;
        toml::from_str(&content)
            .map_err(|e| FederError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// Returns [`FederError::OptionsParse`] if serialization fails and
    /// [`FederError::Io`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), FederError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| FederError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(FederError::Io)?;
        }
        std::fs::write(path, content).map_err(FederError::Io)
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = InterpolatorOptions::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: InterpolatorOptions = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r#"
stiffness = 7.5
initial_target = "top"
"#;
        let opts: InterpolatorOptions = toml::from_str(toml_str).unwrap();
        assert_eq!(opts.stiffness, 7.5);
        assert_eq!(opts.initial_target, Endpoint::Top);
        // Everything else should be default
        assert_eq!(opts.update_rate, 60);
        assert_eq!(opts.approximate_duration_ms, 1000.0);
        assert_eq!(opts.dampening, 1.0);
    }

    #[test]
    fn schema_lists_every_field() {
        let schema = InterpolatorOptions::json_schema();
        let json = serde_json::to_value(&schema).unwrap();
        let props = json["properties"].as_object().unwrap();
        for field in [
            "update_rate",
            "initial_target",
            "approximate_duration_ms",
            "stiffness",
            "dampening",
        ] {
            assert!(props.contains_key(field), "schema missing {field}");
        }
    }

    #[test]
    fn save_and_load_preset() {
        let dir = std::env::temp_dir().join("feder-preset-test");
        let path = dir.join("snappy.toml");

        let mut opts = InterpolatorOptions::default();
        opts.stiffness = 12.0;
        opts.approximate_duration_ms = 400.0;
        opts.save(&path).unwrap();

        let loaded = InterpolatorOptions::load(&path).unwrap();
        assert_eq!(loaded, opts);
        assert!(InterpolatorOptions::list_presets(&dir)
            .contains(&"snappy".to_owned()));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
