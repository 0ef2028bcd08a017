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

//! Defines the light model of the forward renderer.
//!
//! A [`Light`] is a closed sum over its shape ([`LightKind`]) plus the
//! parameters shared by every kind: world transform, colors, selection
//! priority and shadow settings. Defaults are named constants gathered in
//! [`LightDefaults`], which callers may override and inject.
//!
//! Light colors carry their intensity in the alpha channel.

use crate::math::{self, LinearRgba, Mat4, Vec3, DEG_TO_RAD};
use serde::{Deserialize, Serialize};

/// Default depth bias applied when sampling a light's shadow map.
pub const DEFAULT_SHADOW_BIAS: f32 = 0.0001;
/// Default inner cone half-angle of a spot light, in radians (40 degrees).
pub const DEFAULT_SPOT_INNER_ANGLE: f32 = 40.0 * DEG_TO_RAD;
/// Default outer cone half-angle of a spot light, in radians (45 degrees).
pub const DEFAULT_SPOT_OUTER_ANGLE: f32 = 45.0 * DEG_TO_RAD;
/// Default cascade split distances of a linear light.
pub const DEFAULT_PSSM_SPLIT: [f32; 4] = [10.0, 50.0, 100.0, 500.0];

/// Shadow technique of a light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShadowType {
    /// The light casts no shadow.
    #[default]
    None,
    /// The light renders a shadow map.
    Map,
}

/// Shape of a light and its kind-specific parameters.
///
/// Angles are in radians. Each variant only carries the parameters it uses.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum LightKind {
    /// A disabled light. It is never selected and contributes nothing.
    #[default]
    None,
    /// An omnidirectional light with an influence radius (0 means unbounded).
    Point {
        /// Influence radius.
        radius: f32,
    },
    /// A cone light.
    Spot {
        /// Influence radius (0 means unbounded).
        radius: f32,
        /// Half-angle of the fully lit cone.
        inner_angle: f32,
        /// Half-angle where the light fades to zero.
        outer_angle: f32,
    },
    /// A directional light with cascaded shadow split distances.
    Linear {
        /// Far distance of each of the four cascades, in view space.
        pssm_split: [f32; 4],
    },
}

impl LightKind {
    /// Returns a short name of the kind, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Point { .. } => "point",
            Self::Spot { .. } => "spot",
            Self::Linear { .. } => "linear",
        }
    }

    /// Returns the influence radius, or 0 for kinds without one.
    pub fn radius(&self) -> f32 {
        match self {
            Self::Point { radius } | Self::Spot { radius, .. } => *radius,
            Self::None | Self::Linear { .. } => 0.0,
        }
    }
}

/// Defaults applied by the light constructors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightDefaults {
    /// Shadow depth bias.
    pub shadow_bias: f32,
    /// Spot inner cone half-angle, in radians.
    pub spot_inner_angle: f32,
    /// Spot outer cone half-angle, in radians.
    pub spot_outer_angle: f32,
    /// Linear light cascade split distances.
    pub pssm_split: [f32; 4],
}

impl LightDefaults {
    /// The built-in defaults.
    pub const BUILTIN: Self = Self {
        shadow_bias: DEFAULT_SHADOW_BIAS,
        spot_inner_angle: DEFAULT_SPOT_INNER_ANGLE,
        spot_outer_angle: DEFAULT_SPOT_OUTER_ANGLE,
        pssm_split: DEFAULT_PSSM_SPLIT,
    };

    fn base(
        &self,
        kind: LightKind,
        world: Mat4,
        diffuse: LinearRgba,
        specular: LinearRgba,
    ) -> Light {
        Light {
            kind,
            shadow_type: ShadowType::None,
            world,
            diffuse,
            specular,
            priority: 0.0,
            shadow_bias: self.shadow_bias,
        }
    }

    /// Builds a point light with radius 0, priority 0 and no shadow.
    pub fn point(&self, world: Mat4, diffuse: LinearRgba, specular: LinearRgba) -> Light {
        self.base(LightKind::Point { radius: 0.0 }, world, diffuse, specular)
    }

    /// Builds a spot light with radius 0, the default cone, priority 0 and no shadow.
    pub fn spot(&self, world: Mat4, diffuse: LinearRgba, specular: LinearRgba) -> Light {
        let kind = LightKind::Spot {
            radius: 0.0,
            inner_angle: self.spot_inner_angle,
            outer_angle: self.spot_outer_angle,
        };
        self.base(kind, world, diffuse, specular)
    }

    /// Builds a linear light with the default cascade splits, priority 0 and no shadow.
    pub fn linear(&self, world: Mat4, diffuse: LinearRgba, specular: LinearRgba) -> Light {
        let kind = LightKind::Linear {
            pssm_split: self.pssm_split,
        };
        self.base(kind, world, diffuse, specular)
    }
}

impl Default for LightDefaults {
    fn default() -> Self {
        Self::BUILTIN
    }
}

/// A light submitted to the forward renderer.
///
/// # Examples
///
/// ```
/// use lumen_core::math::{LinearRgba, Mat4, Vec3};
/// use lumen_core::renderer::light::{Light, ShadowType};
///
/// let sun = Light::linear(
///     Mat4::from_rotation_x(-1.0),
///     LinearRgba::new(1.0, 0.95, 0.8, 2.0),
///     LinearRgba::WHITE,
/// )
/// .with_priority(10.0)
/// .with_shadow(ShadowType::Map);
/// assert!(sun.casts_shadow());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    /// Shape and kind-specific parameters.
    pub kind: LightKind,
    /// Shadow technique.
    pub shadow_type: ShadowType,
    /// World transform. Translation is the position, +Z is the direction.
    pub world: Mat4,
    /// Diffuse color, intensity in alpha.
    pub diffuse: LinearRgba,
    /// Specular color, intensity in alpha.
    pub specular: LinearRgba,
    /// Selection priority. Higher is more important.
    pub priority: f32,
    /// Depth bias applied when sampling the shadow map.
    pub shadow_bias: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self::none()
    }
}

impl Light {
    /// The disabled light used to fill unused slots.
    pub const fn none() -> Self {
        Self {
            kind: LightKind::None,
            shadow_type: ShadowType::None,
            world: Mat4::IDENTITY,
            diffuse: LinearRgba::TRANSPARENT,
            specular: LinearRgba::TRANSPARENT,
            priority: 0.0,
            shadow_bias: 0.0,
        }
    }

    /// Builds a point light with the built-in defaults.
    pub fn point(world: Mat4, diffuse: LinearRgba, specular: LinearRgba) -> Self {
        LightDefaults::BUILTIN.point(world, diffuse, specular)
    }

    /// Builds a spot light with the built-in defaults.
    pub fn spot(world: Mat4, diffuse: LinearRgba, specular: LinearRgba) -> Self {
        LightDefaults::BUILTIN.spot(world, diffuse, specular)
    }

    /// Builds a linear (directional) light with the built-in defaults.
    pub fn linear(world: Mat4, diffuse: LinearRgba, specular: LinearRgba) -> Self {
        LightDefaults::BUILTIN.linear(world, diffuse, specular)
    }

    /// Sets the influence radius. Ignored by kinds without a radius.
    pub fn with_radius(mut self, radius: f32) -> Self {
        match &mut self.kind {
            LightKind::Point { radius: r } | LightKind::Spot { radius: r, .. } => *r = radius,
            LightKind::None | LightKind::Linear { .. } => {}
        }
        self
    }

    /// Sets the cone half-angles, in radians. Ignored by non-spot lights.
    pub fn with_cone(mut self, inner: f32, outer: f32) -> Self {
        if let LightKind::Spot {
            inner_angle,
            outer_angle,
            ..
        } = &mut self.kind
        {
            *inner_angle = inner;
            *outer_angle = outer;
        }
        self
    }

    /// Sets the cascade split distances. Ignored by non-linear lights.
    pub fn with_pssm_split(mut self, split: [f32; 4]) -> Self {
        if let LightKind::Linear { pssm_split } = &mut self.kind {
            *pssm_split = split;
        }
        self
    }

    /// Sets the selection priority.
    pub fn with_priority(mut self, priority: f32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the shadow technique.
    pub fn with_shadow(mut self, shadow_type: ShadowType) -> Self {
        self.shadow_type = shadow_type;
        self
    }

    /// Sets the shadow depth bias.
    pub fn with_shadow_bias(mut self, bias: f32) -> Self {
        self.shadow_bias = bias;
        self
    }

    /// Returns `false` for disabled lights.
    pub fn is_enabled(&self) -> bool {
        !matches!(self.kind, LightKind::None)
    }

    /// Returns `true` if the light is enabled and renders a shadow map.
    pub fn casts_shadow(&self) -> bool {
        self.is_enabled() && self.shadow_type == ShadowType::Map
    }

    /// World-space position.
    pub fn position(&self) -> Vec3 {
        math::translation(&self.world)
    }

    /// World-space direction (normalized +Z axis of the world transform).
    pub fn direction(&self) -> Vec3 {
        math::forward_axis(&self.world)
    }
}
