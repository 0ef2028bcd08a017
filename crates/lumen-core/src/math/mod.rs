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

//! Mathematics primitives used by the renderer.
//!
//! Linear algebra comes from `glam`; this module re-exports the types the
//! renderer speaks in and adds the engine's [`LinearRgba`] color type.
//!
//! All angular functions in this module operate in **radians** by default, unless
//! explicitly specified otherwise (e.g., `degrees_to_radians`).

/// A small constant for floating-point comparisons.
pub const EPSILON: f32 = 1e-5;

pub use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

/// The factor to convert degrees to radians (PI / 180.0).
pub const DEG_TO_RAD: f32 = PI / 180.0;

pub mod color;

pub use self::color::LinearRgba;
pub use glam::{Mat4, Vec2, Vec3, Vec4};

/// Converts an angle from degrees to radians.
///
/// # Examples
///
/// ```
/// use lumen_core::math::{degrees_to_radians, PI};
/// assert!((degrees_to_radians(180.0) - PI).abs() < 1e-6);
/// ```
#[inline]
pub fn degrees_to_radians(degrees: f32) -> f32 {
    degrees * DEG_TO_RAD
}

/// Returns the forward axis of a world transform (its +Z column), normalized.
///
/// Falls back to `-Z` when the transform has a degenerate Z axis.
#[inline]
pub fn forward_axis(world: &Mat4) -> Vec3 {
    world.z_axis.truncate().try_normalize().unwrap_or(-Vec3::Z)
}

/// Returns the translation part of a world transform.
#[inline]
pub fn translation(world: &Mat4) -> Vec3 {
    world.w_axis.truncate()
}
