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

//! Light selection and packing into the fixed forward shader slots.

use lumen_core::{
    math::{Vec3, Vec4},
    renderer::light::{Light, LightKind},
};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Number of light slots exposed to the forward shaders.
pub const FORWARD_LIGHT_COUNT: usize = 8;

/// Secondary ranking applied between lights of equal priority.
///
/// Selection orders lights by `priority` first, then by `relevance`, then by
/// input order. Policies only decide the second key.
pub trait LightRanking {
    /// Returns a human-readable name for this policy.
    fn name(&self) -> &'static str;

    /// Returns how much the light is expected to affect the current view.
    fn relevance(&self, light: &Light) -> f32;
}

/// Ranks by priority only; equal priorities keep input order.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriorityOnly;

impl LightRanking for PriorityOnly {
    fn name(&self) -> &'static str {
        "PriorityOnly"
    }

    fn relevance(&self, _light: &Light) -> f32 {
        0.0
    }
}

/// Favours brighter lights: luminance of diffuse plus specular.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntensityRanking;

impl LightRanking for IntensityRanking {
    fn name(&self) -> &'static str {
        "Intensity"
    }

    fn relevance(&self, light: &Light) -> f32 {
        light.diffuse.luminance() + light.specular.luminance()
    }
}

/// Favours bright lights close to the viewer.
///
/// Linear lights reach everything and rank as their plain intensity. A
/// point or spot light whose radius does not reach the eye is irrelevant.
#[derive(Debug, Clone, Copy)]
pub struct ProximityRanking {
    /// Viewer position in world space.
    pub eye: Vec3,
}

impl LightRanking for ProximityRanking {
    fn name(&self) -> &'static str {
        "Proximity"
    }

    fn relevance(&self, light: &Light) -> f32 {
        let intensity = IntensityRanking.relevance(light);
        match light.kind {
            LightKind::None => 0.0,
            LightKind::Linear { .. } => intensity,
            LightKind::Point { radius } | LightKind::Spot { radius, .. } => {
                let distance = light.position().distance(self.eye);
                if radius > 0.0 && distance >= radius {
                    0.0
                } else {
                    intensity / (1.0 + distance * distance)
                }
            }
        }
    }
}

/// Lights packed into the forward shader slots.
///
/// Slot `i` of every vector array and of `lights` describes the same light.
/// Slots are filled in rank order; unused slots hold zero vectors and
/// [`Light::none`].
///
/// Per-slot encoding:
///
/// | vector | xyz | w |
/// |--------|-----|---|
/// | `pos`  | world position | radius (0 = unbounded) |
/// | `dir`  | world direction, zero for point lights | shadow bias, 0 without shadow |
/// | `diff` | diffuse rgb × intensity | cos(inner angle) for spot lights, else 0 |
/// | `spec` | specular rgb × intensity | cos(outer angle) for spot lights, else 0 |
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardLights {
    pub pos: [Vec4; FORWARD_LIGHT_COUNT],
    pub dir: [Vec4; FORWARD_LIGHT_COUNT],
    pub diff: [Vec4; FORWARD_LIGHT_COUNT],
    pub spec: [Vec4; FORWARD_LIGHT_COUNT],
    pub lights: [Light; FORWARD_LIGHT_COUNT],
}

impl Default for ForwardLights {
    fn default() -> Self {
        Self {
            pos: [Vec4::ZERO; FORWARD_LIGHT_COUNT],
            dir: [Vec4::ZERO; FORWARD_LIGHT_COUNT],
            diff: [Vec4::ZERO; FORWARD_LIGHT_COUNT],
            spec: [Vec4::ZERO; FORWARD_LIGHT_COUNT],
            lights: [Light::none(); FORWARD_LIGHT_COUNT],
        }
    }
}

/// The packed light vectors as a single GPU block.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ForwardLightsUniform {
    pub pos: [Vec4; FORWARD_LIGHT_COUNT],
    pub dir: [Vec4; FORWARD_LIGHT_COUNT],
    pub diff: [Vec4; FORWARD_LIGHT_COUNT],
    pub spec: [Vec4; FORWARD_LIGHT_COUNT],
}

impl ForwardLights {
    /// Returns the number of occupied slots.
    pub fn count(&self) -> usize {
        self.lights.iter().filter(|l| l.is_enabled()).count()
    }

    /// Iterates over occupied slots and their lights.
    pub fn active(&self) -> impl Iterator<Item = (usize, &Light)> {
        self.lights.iter().enumerate().filter(|(_, l)| l.is_enabled())
    }

    /// Slot of the highest-ranked shadow-casting linear light.
    pub fn linear_shadow_slot(&self) -> Option<usize> {
        self.active()
            .find(|(_, l)| l.casts_shadow() && matches!(l.kind, LightKind::Linear { .. }))
            .map(|(i, _)| i)
    }

    /// Slot of the highest-ranked shadow-casting spot light.
    pub fn spot_shadow_slot(&self) -> Option<usize> {
        self.active()
            .find(|(_, l)| l.casts_shadow() && matches!(l.kind, LightKind::Spot { .. }))
            .map(|(i, _)| i)
    }

    /// Shadow slot state as read by the shaders: `x` is the linear shadow slot,
    /// `y` the spot shadow slot, `-1` when absent.
    pub fn shadow_state(&self) -> Vec4 {
        let slot = |s: Option<usize>| s.map_or(-1.0, |i| i as f32);
        Vec4::new(
            slot(self.linear_shadow_slot()),
            slot(self.spot_shadow_slot()),
            0.0,
            0.0,
        )
    }

    /// Returns the packed vectors as one GPU block.
    pub fn uniform(&self) -> ForwardLightsUniform {
        ForwardLightsUniform {
            pos: self.pos,
            dir: self.dir,
            diff: self.diff,
            spec: self.spec,
        }
    }

    fn write_slot(&mut self, slot: usize, light: &Light) {
        let position = light.position();
        let direction = match light.kind {
            LightKind::Point { .. } | LightKind::None => Vec3::ZERO,
            LightKind::Spot { .. } | LightKind::Linear { .. } => light.direction(),
        };
        let (cos_inner, cos_outer) = match light.kind {
            LightKind::Spot {
                inner_angle,
                outer_angle,
                ..
            } => (inner_angle.cos(), outer_angle.cos()),
            _ => (0.0, 0.0),
        };
        let bias = if light.casts_shadow() {
            light.shadow_bias
        } else {
            0.0
        };

        self.pos[slot] = position.extend(light.kind.radius());
        self.dir[slot] = direction.extend(bias);
        self.diff[slot] = Vec3::from_array(light.diffuse.premultiplied_rgb()).extend(cos_inner);
        self.spec[slot] = Vec3::from_array(light.specular.premultiplied_rgb()).extend(cos_outer);
        self.lights[slot] = *light;
    }
}

/// Ranking key of a candidate light. Greater is better.
#[derive(Debug, Clone, Copy)]
struct Ranked {
    priority: f32,
    relevance: f32,
    index: usize,
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .total_cmp(&other.priority)
            .then_with(|| self.relevance.total_cmp(&other.relevance))
            // Earlier input wins ties.
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

/// NaN ranks below every number.
fn rank_key(value: f32) -> f32 {
    if value.is_nan() {
        f32::NEG_INFINITY
    } else {
        value
    }
}

/// Packs `lights` into the forward slots using [`IntensityRanking`].
pub fn prepare_forward_lights(lights: &[Light]) -> ForwardLights {
    prepare_forward_lights_with(lights, &IntensityRanking)
}

/// Packs `lights` into the forward slots, ranking equal priorities with `ranking`.
///
/// Disabled lights are skipped. When more than [`FORWARD_LIGHT_COUNT`] lights
/// remain, the lowest-ranked ones are dropped for this frame.
pub fn prepare_forward_lights_with<R: LightRanking + ?Sized>(
    lights: &[Light],
    ranking: &R,
) -> ForwardLights {
    // Min-heap of the best candidates seen so far.
    let mut heap: BinaryHeap<Reverse<Ranked>> = BinaryHeap::with_capacity(FORWARD_LIGHT_COUNT + 1);
    let mut candidates = 0usize;

    for (index, light) in lights.iter().enumerate() {
        if !light.is_enabled() {
            continue;
        }
        candidates += 1;
        if light.priority.is_nan() {
            log::warn!("Light {index} has a NaN priority, ranking it last");
        }
        heap.push(Reverse(Ranked {
            priority: rank_key(light.priority),
            relevance: rank_key(ranking.relevance(light)),
            index,
        }));
        if heap.len() > FORWARD_LIGHT_COUNT {
            heap.pop();
        }
    }

    if candidates > FORWARD_LIGHT_COUNT {
        log::debug!(
            "Dropped {} of {} lights over the {} forward slots (ranking: {})",
            candidates - FORWARD_LIGHT_COUNT,
            candidates,
            FORWARD_LIGHT_COUNT,
            ranking.name()
        );
    }

    let mut packed = ForwardLights::default();
    // Ascending `Reverse` order is best-first.
    for (slot, Reverse(ranked)) in heap.into_sorted_vec().into_iter().enumerate() {
        packed.write_slot(slot, &lights[ranked.index]);
    }
    packed
}
