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

//! Shadow pass lane: renders shadow casters into the forward shadow maps.
//!
//! Two independent entry points share the same shape. Each claims sequential
//! GPU views starting at the caller's view id, renders every caster depth-only
//! from the light, and records the matrices the shading pass samples with.
//! Shadow views must precede the main view, since views execute in id order.

use super::{ForwardLights, ForwardPipeline, DEPTH_ONLY_CONFIG_IDX};
use lumen_core::{
    math::{Mat4, Vec3, Vec4, EPSILON, PI},
    renderer::{
        light::LightKind, CommandEncoder, FrameBufferId, Material, MaterialRef, ModelDisplayList,
        ModelRef, PipelineResources, Primitive, ProgramId, RenderState, SkinnedModelDisplayList,
        UniformValue, ViewClear, ViewId, ViewRect, ViewState,
    },
};
use smallvec::SmallVec;

/// Number of shadow sub-passes.
pub const SHADOW_PASS_COUNT: usize = 5;

/// Number of cascades of the linear shadow map.
pub const LINEAR_SHADOW_SPLIT_COUNT: usize = 4;

/// Shadow sub-passes, in the order their views are recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForwardPipelineShadowPass {
    Slot0LinearSplit0,
    Slot0LinearSplit1,
    Slot0LinearSplit2,
    Slot0LinearSplit3,
    Slot1Spot,
}

impl ForwardPipelineShadowPass {
    /// The cascade passes of the linear light.
    pub const LINEAR_SPLITS: [Self; LINEAR_SHADOW_SPLIT_COUNT] = [
        Self::Slot0LinearSplit0,
        Self::Slot0LinearSplit1,
        Self::Slot0LinearSplit2,
        Self::Slot0LinearSplit3,
    ];

    /// Index of the pass in [`ShadowPassViewIds`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns a human-readable name for this pass.
    pub fn name(self) -> &'static str {
        match self {
            Self::Slot0LinearSplit0 => "linear shadow split 0",
            Self::Slot0LinearSplit1 => "linear shadow split 1",
            Self::Slot0LinearSplit2 => "linear shadow split 2",
            Self::Slot0LinearSplit3 => "linear shadow split 3",
            Self::Slot1Spot => "spot shadow",
        }
    }
}

/// View ids used by each shadow sub-pass, indexed by [`ForwardPipelineShadowPass::index`].
pub type ShadowPassViewIds = [ViewId; SHADOW_PASS_COUNT];

/// Matrices the shading pass uses to sample the shadow maps.
///
/// Slot 0 belongs to the cascaded linear light, slot 1 to the spot light.
/// Each generator only writes its own slot; the other keeps its previous value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowData {
    /// World to shadow-atlas texture space, one per cascade.
    pub linear_shadow_mtx: [Mat4; LINEAR_SHADOW_SPLIT_COUNT],
    /// Far distance of each cascade, in view space.
    pub linear_shadow_slice: Vec4,
    /// World to spot shadow map texture space.
    pub spot_shadow_mtx: Mat4,
}

impl Default for ShadowData {
    fn default() -> Self {
        Self {
            linear_shadow_mtx: [Mat4::IDENTITY; LINEAR_SHADOW_SPLIT_COUNT],
            linear_shadow_slice: Vec4::ZERO,
            spot_shadow_mtx: Mat4::IDENTITY,
        }
    }
}

/// Scene geometry rendered into the shadow maps.
#[derive(Debug, Clone, Copy)]
pub struct ShadowCasters<'a> {
    pub display_lists: &'a [ModelDisplayList],
    pub skinned_display_lists: &'a [SkinnedModelDisplayList],
    /// World matrices indexed by the display lists.
    pub mtxs: &'a [Mat4],
    pub resources: &'a PipelineResources,
}

/// Near plane of spot shadow projections.
const SPOT_SHADOW_NEAR: f32 = 0.01;
/// Far plane of spot shadow projections for lights of unbounded radius.
const SPOT_SHADOW_UNBOUNDED_FAR: f32 = 1000.0;

/// Maps clip space to texture space of a sub-rectangle of a shadow map.
///
/// `offset` and `scale` are in normalized texture coordinates; texture space
/// has its origin at the top-left corner.
fn clip_to_texture(offset: (f32, f32), scale: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(offset.0, offset.1, 0.0))
        * Mat4::from_scale(Vec3::new(scale, scale, 1.0))
        * Mat4::from_translation(Vec3::new(0.5, 0.5, 0.0))
        * Mat4::from_scale(Vec3::new(0.5, -0.5, 1.0))
}

fn light_up(direction: Vec3) -> Vec3 {
    if direction.y.abs() > 0.99 {
        Vec3::X
    } else {
        Vec3::Y
    }
}

/// Fits an orthographic light projection around a frustum slice.
///
/// The projection covers the slice's bounding sphere, so its extent does not
/// change as the camera rotates, and its center is snapped to the shadow map
/// texel grid to keep shadows from shimmering while the camera moves. The
/// extent is padded by one texel on each side to absorb the snapping. Depth
/// extends one radius towards the light to catch casters outside the slice.
pub fn fit_cascade(direction: Vec3, corners: &[Vec3; 8], resolution: u32) -> (Mat4, Mat4) {
    let direction = direction.try_normalize().unwrap_or(-Vec3::Z);
    let center = corners.iter().copied().sum::<Vec3>() / 8.0;
    let radius = corners
        .iter()
        .map(|c| c.distance(center))
        .fold(0.0f32, f32::max)
        .max(EPSILON);
    // Quantize the radius so the texel size is stable frame to frame.
    let radius = (radius * 16.0).ceil() / 16.0;
    let texels = resolution.max(4) as f32;
    let half_extent = radius * texels / (texels - 2.0);
    let texel = 2.0 * half_extent / texels;

    let view = Mat4::look_to_rh(Vec3::ZERO, direction, light_up(direction));
    let ls_center = view.transform_point3(center);
    let x = (ls_center.x / texel).floor() * texel;
    let y = (ls_center.y / texel).floor() * texel;

    // Light space looks down -Z: larger z is closer to the light.
    let near = -(ls_center.z + 2.0 * half_extent);
    let far = -(ls_center.z - half_extent);
    let proj = Mat4::orthographic_rh(
        x - half_extent,
        x + half_extent,
        y - half_extent,
        y + half_extent,
        near,
        far,
    );
    (view, proj)
}

/// Builds the perspective light projection of a spot light.
pub fn fit_spot(position: Vec3, direction: Vec3, outer_angle: f32, radius: f32) -> (Mat4, Mat4) {
    let direction = direction.try_normalize().unwrap_or(-Vec3::Z);
    let view = Mat4::look_to_rh(position, direction, light_up(direction));
    let fov = (outer_angle * 2.0).clamp(0.01, PI - 0.01);
    let far = if radius > 0.0 {
        radius.max(SPOT_SHADOW_NEAR * 2.0)
    } else {
        SPOT_SHADOW_UNBOUNDED_FAR
    };
    let proj = Mat4::perspective_rh(fov, 1.0, SPOT_SHADOW_NEAR, far);
    (view, proj)
}

fn view_name(debug_name: Option<&str>, pass: ForwardPipelineShadowPass) -> String {
    match debug_name {
        Some(prefix) => format!("{prefix}: {}", pass.name()),
        None => pass.name().to_string(),
    }
}

/// Resolves the primitive, material and depth-only program of a draw.
fn resolve<'a>(
    resources: &'a PipelineResources,
    model: ModelRef,
    lst_idx: usize,
    material: MaterialRef,
) -> Option<(&'a Primitive, &'a Material, ProgramId)> {
    let primitive = resources.model(model)?.lists.get(lst_idx)?;
    let material = resources.material(material)?;
    let program = resources
        .program(material.program)?
        .get(material.variant, DEPTH_ONLY_CONFIG_IDX)?;
    Some((primitive, material, program))
}

/// Submits one depth-only draw. The material's values and textures are bound so
/// alpha-tested casters can discard through their mask.
fn draw_depth(
    encoder: &mut dyn CommandEncoder,
    view: ViewId,
    primitive: &Primitive,
    material: &Material,
    program: ProgramId,
) {
    for value in &material.values {
        encoder.set_uniform(value.uniform, UniformValue::Vec4(std::slice::from_ref(&value.value)));
    }
    for texture in &material.textures {
        encoder.set_texture(texture.stage, texture.sampler, texture.texture);
    }
    encoder.set_vertex_buffer(primitive.vertex_buffer);
    encoder.set_index_buffer(primitive.index_buffer, primitive.index_count);
    encoder.set_state(RenderState::DEPTH_ONLY | material.state.culling());
    encoder.submit(view, program, 0);
}

/// Draws every caster depth-only into `view`. Returns the number of draws.
fn submit_casters(encoder: &mut dyn CommandEncoder, view: ViewId, casters: &ShadowCasters) -> usize {
    let mut draws = 0;

    for dl in casters.display_lists {
        let Some((primitive, material, program)) =
            resolve(casters.resources, dl.model, dl.lst_idx, dl.material)
        else {
            log::trace!("Skipping shadow caster without a depth-only program: {dl:?}");
            continue;
        };
        let Some(mtx) = casters.mtxs.get(dl.mtx_idx) else {
            log::warn!("Shadow caster matrix {} out of range", dl.mtx_idx);
            continue;
        };
        encoder.set_transform(mtx);
        draw_depth(encoder, view, primitive, material, program);
        draws += 1;
    }

    for dl in casters.skinned_display_lists {
        let Some((primitive, material, program)) =
            resolve(casters.resources, dl.model, dl.lst_idx, dl.material)
        else {
            log::trace!("Skipping skinned shadow caster without a depth-only program");
            continue;
        };
        let bones: Option<SmallVec<[Mat4; 32]>> =
            dl.bones_idx.iter().map(|&i| casters.mtxs.get(i).copied()).collect();
        let Some(bones) = bones else {
            log::warn!("Skinned shadow caster bone matrix out of range");
            continue;
        };
        encoder.set_transforms(&bones);
        draw_depth(encoder, view, primitive, material, program);
        draws += 1;
    }

    draws
}

fn setup_shadow_view(
    encoder: &mut dyn CommandEncoder,
    view: ViewId,
    name: &str,
    rect: ViewRect,
    frame_buffer: FrameBufferId,
    view_mtx: &Mat4,
    proj: &Mat4,
) {
    encoder.set_view_name(view, name);
    encoder.set_view_rect(view, rect);
    encoder.set_view_frame_buffer(view, Some(frame_buffer));
    encoder.set_view_clear(view, ViewClear::DEPTH);
    encoder.set_view_transform(view, view_mtx, proj);
    encoder.touch(view);
}

/// Renders the cascaded shadow map of the highest-ranked shadow-casting linear light.
///
/// Claims four views starting at `view_id`, one per cascade, each rendering
/// into its quadrant of the linear shadow atlas. Writes shadow data slot 0:
/// the cascade matrices and the light's split distances, unchanged. Does
/// nothing when no linear light casts a shadow.
#[allow(clippy::too_many_arguments)]
pub fn generate_linear_shadow_map(
    encoder: &mut dyn CommandEncoder,
    view_id: &mut ViewId,
    view_state: &ViewState,
    casters: &ShadowCasters,
    lights: &ForwardLights,
    pipeline: &ForwardPipeline,
    views: &mut ShadowPassViewIds,
    shadow_data: &mut ShadowData,
    debug_name: Option<&str>,
) {
    let Some(slot) = lights.linear_shadow_slot() else {
        log::debug!("No shadow-casting linear light, skipping linear shadow pass");
        return;
    };
    let light = &lights.lights[slot];
    let LightKind::Linear { pssm_split } = light.kind else {
        return;
    };

    let resolution = pipeline.shadow_map_resolution;
    let target = pipeline.linear_shadow_target();
    let direction = light.direction();
    let (camera_near, camera_far) = view_state.clip_range();
    let mut split_near = camera_near.max(0.0);

    for (i, pass) in ForwardPipelineShadowPass::LINEAR_SPLITS.iter().enumerate() {
        // The fitted slice never extends past the camera far plane.
        let split_far = pssm_split[i].min(camera_far).max(split_near + EPSILON);
        let corners = view_state.slice_corners(split_near, split_far);
        let (view_mtx, proj) = fit_cascade(direction, &corners, resolution);

        let (col, row) = ((i % 2) as u32, (i / 2) as u32);
        let rect = ViewRect::new(col * resolution, row * resolution, resolution, resolution);
        let view = view_id.claim();
        views[pass.index()] = view;
        setup_shadow_view(
            encoder,
            view,
            &view_name(debug_name, *pass),
            rect,
            target.frame_buffer,
            &view_mtx,
            &proj,
        );
        let draws = submit_casters(encoder, view, casters);
        log::trace!("{} on {view}: {draws} draws", pass.name());

        let offset = (col as f32 * 0.5, row as f32 * 0.5);
        shadow_data.linear_shadow_mtx[i] = clip_to_texture(offset, 0.5) * proj * view_mtx;
        split_near = split_far;
    }

    shadow_data.linear_shadow_slice = Vec4::from_array(pssm_split);
}

/// Renders the shadow map of the highest-ranked shadow-casting spot light.
///
/// Claims one view at `view_id`. Writes shadow data slot 1 only. Does nothing
/// when no spot light casts a shadow.
#[allow(clippy::too_many_arguments)]
pub fn generate_spot_shadow_map(
    encoder: &mut dyn CommandEncoder,
    view_id: &mut ViewId,
    casters: &ShadowCasters,
    lights: &ForwardLights,
    pipeline: &ForwardPipeline,
    views: &mut ShadowPassViewIds,
    shadow_data: &mut ShadowData,
    debug_name: Option<&str>,
) {
    let Some(slot) = lights.spot_shadow_slot() else {
        log::debug!("No shadow-casting spot light, skipping spot shadow pass");
        return;
    };
    let light = &lights.lights[slot];
    let LightKind::Spot {
        radius,
        outer_angle,
        ..
    } = light.kind
    else {
        return;
    };

    let (view_mtx, proj) = fit_spot(light.position(), light.direction(), outer_angle, radius);
    let target = pipeline.spot_shadow_target();
    let pass = ForwardPipelineShadowPass::Slot1Spot;
    let view = view_id.claim();
    views[pass.index()] = view;
    setup_shadow_view(
        encoder,
        view,
        &view_name(debug_name, pass),
        ViewRect::new(0, 0, target.size, target.size),
        target.frame_buffer,
        &view_mtx,
        &proj,
    );
    let draws = submit_casters(encoder, view, casters);
    log::trace!("{} on {view}: {draws} draws", pass.name());

    shadow_data.spot_shadow_mtx = clip_to_texture((0.0, 0.0), 1.0) * proj * view_mtx;
}
