// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Settings shared by every scene pass of one pipeline.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How much debug output partial resolves produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveDebugLevel {
    /// No instrumentation.
    #[default]
    Off,
    /// Count resolves and the pixels they copy.
    Statistics,
    /// Statistics, plus a wireframe quad around every resolve rectangle.
    Wireframe,
}

/// A collection of settings that affect how scene passes plan and submit work.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneRenderSettings {
    /// Enables inline resolves for refractive items.
    pub refraction: bool,
    /// Limits resolves to the screen bounds of the triggering item.
    pub refraction_partial_resolves: bool,
    /// Instrumentation of partial resolves.
    pub partial_resolve_debug: ResolveDebugLevel,
    /// Plans contexts but never dispatches them in immediate mode.
    pub no_draw: bool,
    /// Upper bound of the depth range used by the near viewport.
    pub near_z_range: f32,
    /// Panics on fatal contract violations instead of skipping the operation.
    pub strict_contracts: bool,
}

impl Default for SceneRenderSettings {
    fn default() -> Self {
        Self {
            refraction: true,
            refraction_partial_resolves: true,
            partial_resolve_debug: ResolveDebugLevel::Off,
            no_draw: false,
            near_z_range: Self::DEFAULT_NEAR_Z_RANGE,
            strict_contracts: cfg!(debug_assertions),
        }
    }
}

impl SceneRenderSettings {
    /// Default depth range of the near viewport.
    pub const DEFAULT_NEAR_Z_RANGE: f32 = 0.12;

    /// Parses settings from JSON; missing fields keep their defaults.
    pub fn from_json_str(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<SceneRenderSettings>(contents).map(Self::validate)
    }

    /// Loads settings from a JSON file, falling back to defaults when the file
    /// is missing or malformed.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_json_str(&contents) {
                Ok(settings) => {
                    info!("Loaded scene render settings from {:?}", path);
                    settings
                }
                Err(err) => {
                    warn!(
                        "Failed to parse {:?} ({}). Falling back to default scene render settings.",
                        path, err
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "Scene render settings file {:?} not found. Using default settings.",
                    path
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    "Failed to read {:?} ({}). Falling back to default scene render settings.",
                    path, err
                );
                Self::default()
            }
        }
    }

    /// Replaces out-of-range values with their defaults.
    pub fn validate(mut self) -> Self {
        if !(self.near_z_range > 0.0 && self.near_z_range <= 1.0) {
            warn!(
                "Near Z range {} is outside (0, 1]. Using {} instead.",
                self.near_z_range,
                Self::DEFAULT_NEAR_Z_RANGE
            );
            self.near_z_range = Self::DEFAULT_NEAR_Z_RANGE;
        }

        if self.partial_resolve_debug != ResolveDebugLevel::Off && !self.refraction {
            info!("Partial resolve debugging has no effect while refraction is disabled.");
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let settings = SceneRenderSettings::from_json_str("{}").unwrap();
        assert_eq!(settings, SceneRenderSettings::default());
        assert_eq!(settings.near_z_range, 0.12);
        assert!(settings.refraction);
    }

    #[test]
    fn parses_partial_overrides() {
        let settings = SceneRenderSettings::from_json_str(
            r#"{ "no_draw": true, "partial_resolve_debug": "wireframe", "near_z_range": 0.5 }"#,
        )
        .unwrap();
        assert!(settings.no_draw);
        assert_eq!(settings.partial_resolve_debug, ResolveDebugLevel::Wireframe);
        assert_eq!(settings.near_z_range, 0.5);
        assert!(settings.refraction_partial_resolves);
    }

    #[test]
    fn validate_repairs_near_z_range() {
        let settings = SceneRenderSettings::from_json_str(r#"{ "near_z_range": 1.5 }"#).unwrap();
        assert_eq!(settings.near_z_range, SceneRenderSettings::DEFAULT_NEAR_Z_RANGE);

        let settings = SceneRenderSettings::from_json_str(r#"{ "near_z_range": 0.0 }"#).unwrap();
        assert_eq!(settings.near_z_range, SceneRenderSettings::DEFAULT_NEAR_Z_RANGE);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(SceneRenderSettings::from_json_str("{ refraction: yes }").is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let settings = SceneRenderSettings::load_from_path("does/not/exist/scene_settings.json");
        assert_eq!(settings, SceneRenderSettings::default());
    }

    #[test]
    fn debug_levels_are_ordered() {
        assert!(ResolveDebugLevel::Wireframe > ResolveDebugLevel::Statistics);
        assert!(ResolveDebugLevel::Statistics > ResolveDebugLevel::Off);
    }
}
