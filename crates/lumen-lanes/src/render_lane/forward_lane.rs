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

//! Forward lane: binds the forward pipeline state and draws models.

use super::{pipeline::texture_stage, ForwardLights, ForwardPipeline, ForwardPipelineFog};
use lumen_core::{
    math::{LinearRgba, Mat4},
    renderer::{
        CommandEncoder, Model, PipelineProgram, ProgramId, RenderState, UniformValue, ViewId,
    },
};

/// Shading tiers of the forward pipeline, selected by the configuration index.
///
/// Each tier binds a superset of the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ForwardPipelineStage {
    /// Geometry attributes only (depth, normals, motion vectors) for the
    /// screen-space prepass.
    AttributeBuffers,
    /// Direct lighting, ambient, fog and shadows.
    #[default]
    Basic,
    /// Basic plus noise, PBR probe, ambient occlusion and screen-space effects.
    Advanced,
}

impl ForwardPipelineStage {
    /// All stages, in configuration-index order.
    pub const ALL: [Self; 3] = [Self::AttributeBuffers, Self::Basic, Self::Advanced];

    /// Returns the stage drawn by a pipeline configuration index.
    pub fn from_config_index(config_idx: usize) -> Option<Self> {
        Self::ALL.get(config_idx).copied()
    }

    /// Returns the pipeline configuration index of this stage.
    pub fn config_index(self) -> usize {
        self as usize
    }

    /// Returns a human-readable name for this stage.
    pub fn name(self) -> &'static str {
        match self {
            Self::AttributeBuffers => "AttributeBuffers",
            Self::Basic => "Basic",
            Self::Advanced => "Advanced",
        }
    }
}

/// Per-draw lighting inputs.
struct DrawLighting<'a> {
    ambient: LinearRgba,
    lights: &'a ForwardLights,
    fog: &'a ForwardPipelineFog,
}

type StageBinder = fn(&mut dyn CommandEncoder, &ForwardPipeline, &DrawLighting);

/// Bind routines indexed by [`ForwardPipelineStage::config_index`].
const STAGE_BINDERS: [StageBinder; 3] = [bind_attribute_buffers, bind_basic, bind_advanced];

fn bind_attribute_buffers(
    encoder: &mut dyn CommandEncoder,
    pipeline: &ForwardPipeline,
    _lighting: &DrawLighting,
) {
    let u = pipeline.uniforms();
    let aaa = pipeline.aaa();
    encoder.set_uniform(u.main_projection, UniformValue::Mat4(&[aaa.proj]));
    encoder.set_uniform(u.view_proj, UniformValue::Mat4(&[aaa.proj * aaa.view]));
    encoder.set_uniform(
        u.previous_view_proj,
        UniformValue::Mat4(&[aaa.prv_proj * aaa.prv_view]),
    );
    encoder.set_uniform(u.aaa_params, UniformValue::Vec4(&aaa.packed()));
}

fn bind_basic(
    encoder: &mut dyn CommandEncoder,
    pipeline: &ForwardPipeline,
    lighting: &DrawLighting,
) {
    let u = pipeline.uniforms();
    let lights = lighting.lights;
    encoder.set_uniform(u.light_pos, UniformValue::Vec4(&lights.pos));
    encoder.set_uniform(u.light_dir, UniformValue::Vec4(&lights.dir));
    encoder.set_uniform(u.light_diffuse, UniformValue::Vec4(&lights.diff));
    encoder.set_uniform(u.light_specular, UniformValue::Vec4(&lights.spec));
    encoder.set_uniform(u.ambient_color, UniformValue::Vec4(&[lighting.ambient.to_vec4()]));
    encoder.set_uniform(u.fog_color, UniformValue::Vec4(&[lighting.fog.color.to_vec4()]));
    encoder.set_uniform(u.fog_state, UniformValue::Vec4(&[lighting.fog.state()]));

    let frame = pipeline.lighting();
    let shadow = &frame.shadow_data;
    encoder.set_uniform(u.linear_shadow_mtx, UniformValue::Mat4(&shadow.linear_shadow_mtx));
    encoder.set_uniform(
        u.linear_shadow_slice,
        UniformValue::Vec4(&[shadow.linear_shadow_slice]),
    );
    encoder.set_uniform(u.spot_shadow_mtx, UniformValue::Mat4(&[shadow.spot_shadow_mtx]));
    encoder.set_uniform(u.shadow_state, UniformValue::Vec4(&[frame.shadow_state]));
    encoder.set_texture(
        texture_stage::LINEAR_SHADOW,
        u.s_linear_shadow,
        pipeline.linear_shadow_target().texture,
    );
    encoder.set_texture(
        texture_stage::SPOT_SHADOW,
        u.s_spot_shadow,
        pipeline.spot_shadow_target().texture,
    );
}

fn bind_advanced(
    encoder: &mut dyn CommandEncoder,
    pipeline: &ForwardPipeline,
    lighting: &DrawLighting,
) {
    bind_basic(encoder, pipeline, lighting);

    let u = pipeline.uniforms();
    let aaa = pipeline.aaa();
    encoder.set_uniform(u.main_projection, UniformValue::Mat4(&[aaa.proj]));
    encoder.set_uniform(u.aaa_params, UniformValue::Vec4(&aaa.packed()));

    if let Some(noise) = pipeline.noise() {
        encoder.set_texture(texture_stage::NOISE, u.s_noise, noise);
    }
    if let Some(probe) = pipeline.pbr_probe() {
        encoder.set_texture(texture_stage::IRRADIANCE, u.s_irradiance, probe.irradiance);
        encoder.set_texture(texture_stage::RADIANCE, u.s_radiance, probe.radiance);
        encoder.set_texture(texture_stage::BRDF, u.s_brdf, probe.brdf);
    }
    if let Some(ao) = pipeline.ao() {
        encoder.set_texture(texture_stage::AO, u.s_ao, ao);
    }
    if let Some(post) = pipeline.post_buffers() {
        encoder.set_texture(texture_stage::SSGI, u.s_ssgi, post.ssgi);
        encoder.set_texture(texture_stage::SSR, u.s_ssr, post.ssr);
    }
}

fn select_program(
    program: &PipelineProgram,
    variant: u32,
    config_idx: usize,
) -> Option<(ForwardPipelineStage, ProgramId)> {
    let stage = ForwardPipelineStage::from_config_index(config_idx)?;
    let id = program.get(variant, config_idx)?;
    Some((stage, id))
}

/// Draws every primitive of `model` into `view_id` with the forward shading
/// of the stage selected by `pipeline_config_idx`.
///
/// `ambient`, `lights` and `fog` are bound as given; shadow data, textures and
/// post parameters come from the pipeline's last `update*` calls. Nothing is
/// drawn if `program` has no shader for `(variant, pipeline_config_idx)`.
#[allow(clippy::too_many_arguments)]
pub fn submit_model_to_forward_pipeline(
    encoder: &mut dyn CommandEncoder,
    view_id: ViewId,
    model: &Model,
    pipeline: &ForwardPipeline,
    program: &PipelineProgram,
    variant: u32,
    pipeline_config_idx: usize,
    ambient: LinearRgba,
    lights: &ForwardLights,
    fog: &ForwardPipelineFog,
    mtx: &Mat4,
) {
    let Some((stage, program_id)) = select_program(program, variant, pipeline_config_idx) else {
        log::warn!(
            "Program '{}' has no forward shader for variant {variant}, config {pipeline_config_idx}",
            program.name
        );
        return;
    };

    let lighting = DrawLighting {
        ambient,
        lights,
        fog,
    };
    let bind = STAGE_BINDERS[stage.config_index()];

    // Draw state is consumed by each submit, so it is rebound per primitive.
    for primitive in &model.lists {
        bind(encoder, pipeline, &lighting);
        encoder.set_transform(mtx);
        encoder.set_vertex_buffer(primitive.vertex_buffer);
        encoder.set_index_buffer(primitive.index_buffer, primitive.index_count);
        encoder.set_state(RenderState::DEFAULT);
        encoder.submit(view_id, program_id, 0);
    }
    log::trace!(
        "Submitted {} primitives to {view_id} ({} stage)",
        model.lists.len(),
        stage.name()
    );
}
