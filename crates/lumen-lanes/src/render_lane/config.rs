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

//! Construction parameters of the forward pipeline.

use lumen_core::renderer::{light::LightDefaults, ConfigError};
use serde::{Deserialize, Serialize};

/// Default shadow map resolution, in texels per side of one shadow view.
pub const DEFAULT_SHADOW_MAP_RESOLUTION: u32 = 1024;

/// Parameters used to create a `ForwardPipeline`.
///
/// Loadable from RON; missing fields take their defaults:
///
/// ```
/// use lumen_lanes::ForwardPipelineConfig;
///
/// let config = ForwardPipelineConfig::from_ron_str("(shadow_map_resolution: 2048)").unwrap();
/// assert_eq!(config.shadow_map_resolution, 2048);
/// assert!(config.spot_16bit_shadow_map);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForwardPipelineConfig {
    /// Resolution of the spot shadow map and of each linear cascade.
    pub shadow_map_resolution: u32,
    /// Store the spot shadow map with 16-bit depth instead of 32-bit float.
    pub spot_16bit_shadow_map: bool,
    /// Defaults applied by the light constructors of this pipeline.
    pub light_defaults: LightDefaults,
}

impl Default for ForwardPipelineConfig {
    fn default() -> Self {
        Self {
            shadow_map_resolution: DEFAULT_SHADOW_MAP_RESOLUTION,
            spot_16bit_shadow_map: true,
            light_defaults: LightDefaults::default(),
        }
    }
}

impl ForwardPipelineConfig {
    /// Parses and validates a configuration from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            ron::de::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration to pretty RON text.
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        let pretty_config = ron::ser::PrettyConfig::default().indentor("  ".to_string());
        ron::ser::to_string_pretty(self, pretty_config)
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Checks that cascades tile the shadow atlas evenly.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.shadow_map_resolution.is_power_of_two() {
            return Err(ConfigError::InvalidShadowMapResolution(
                self.shadow_map_resolution,
            ));
        }
        Ok(())
    }
}
