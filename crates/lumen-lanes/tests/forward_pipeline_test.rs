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

//! Integration tests for forward pipeline state and model submission.

mod common;

use anyhow::Result;
use common::{
    forward_program, point_light, primitive, scene, MockGraphicsDevice, RecordedUniform,
    RecordingEncoder,
};
use lumen_core::{
    math::{LinearRgba, Mat4, Vec2, Vec3, Vec4, FRAC_PI_2, FRAC_PI_4},
    renderer::{
        light::{Light, ShadowType},
        BackbufferRatio, Model, PipelineProgram, ProgramId, RenderError, RenderState,
        ResourceError, TextureFormat, TextureId, ViewId, ViewRect, ViewState,
    },
};
use lumen_lanes::{
    forward_pipeline_info, generate_linear_shadow_map, generate_spot_shadow_map,
    prepare_forward_lights, submit_model_to_forward_pipeline, texture_stage, AaaParams,
    ForwardLights, ForwardPipeline, ForwardPipelineConfig, ForwardPipelineFog,
    ForwardPipelineStage, ShadowCasters, ShadowData,
};

fn fog() -> ForwardPipelineFog {
    ForwardPipelineFog {
        near: 20.0,
        far: 120.0,
        color: LinearRgba::rgb(0.5, 0.6, 0.7),
    }
}

fn lights() -> ForwardLights {
    prepare_forward_lights(&[
        point_light(1.0, 1.0),
        Light::linear(Mat4::from_rotation_x(FRAC_PI_2), LinearRgba::WHITE, LinearRgba::WHITE)
            .with_priority(10.0)
            .with_shadow(ShadowType::Map),
    ])
}

fn submit(
    encoder: &mut RecordingEncoder,
    pipeline: &ForwardPipeline,
    model: &Model,
    program: &PipelineProgram,
    stage: ForwardPipelineStage,
    lights: &ForwardLights,
) {
    submit_model_to_forward_pipeline(
        encoder,
        ViewId(10),
        model,
        pipeline,
        program,
        0,
        stage.config_index(),
        LinearRgba::rgb(0.1, 0.1, 0.1),
        lights,
        &fog(),
        &Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)),
    );
}

#[test]
fn test_create_allocates_shadow_maps_and_uniforms() -> Result<()> {
    common::init_logger();
    let device = MockGraphicsDevice::new();
    let pipeline = ForwardPipeline::create(&device, &ForwardPipelineConfig::default())?;

    assert_eq!(pipeline.shadow_map_resolution, 1024);
    let linear = device
        .texture(pipeline.linear_shadow_target().texture)
        .expect("linear shadow map");
    assert_eq!((linear.width, linear.height), (2048, 2048));
    assert_eq!(linear.format, TextureFormat::D32F);
    assert!(linear.compare && linear.render_target);

    let spot = device
        .texture(pipeline.spot_shadow_target().texture)
        .expect("spot shadow map");
    assert_eq!((spot.width, spot.height), (1024, 1024));
    assert_eq!(spot.format, TextureFormat::D16);

    assert_eq!(
        device.uniform_named("uLightPos"),
        Some(pipeline.uniforms().light_pos)
    );
    assert_eq!(pipeline.base.resource_count(), device.live_count());
    Ok(())
}

#[test]
fn test_spot_shadow_map_precision_choice() -> Result<()> {
    let device = MockGraphicsDevice::new();
    let config = ForwardPipelineConfig::from_ron_str(
        "(shadow_map_resolution: 256, spot_16bit_shadow_map: false)",
    )?;
    let pipeline = ForwardPipeline::create(&device, &config)?;
    let spot = device
        .texture(pipeline.spot_shadow_target().texture)
        .expect("spot shadow map");
    assert_eq!(spot.format, TextureFormat::D32F);
    assert_eq!(spot.width, 256);
    Ok(())
}

#[test]
fn test_destroy_releases_everything() -> Result<()> {
    let device = MockGraphicsDevice::new();
    let mut pipeline = ForwardPipeline::create(&device, &ForwardPipelineConfig::default())?;
    pipeline.ensure_post_buffers(&device, 1280, 720)?;
    assert!(device.live_count() > 0);

    pipeline.destroy(&device);
    assert_eq!(device.live_count(), 0);
    Ok(())
}

#[test]
fn test_failed_creation_releases_partial_resources() {
    common::init_logger();
    let device = MockGraphicsDevice::fail_after(5);
    let result = ForwardPipeline::create(&device, &ForwardPipelineConfig::default());

    assert!(matches!(
        result,
        Err(RenderError::Resource(ResourceError::CreationFailed { .. }))
    ));
    assert_eq!(device.live_count(), 0);
}

#[test]
fn test_invalid_resolution_is_rejected_before_allocation() {
    let device = MockGraphicsDevice::new();
    let config = ForwardPipelineConfig {
        shadow_map_resolution: 600,
        ..Default::default()
    };
    assert!(matches!(
        ForwardPipeline::create(&device, &config),
        Err(RenderError::Config(_))
    ));
    assert_eq!(device.live_count(), 0);
}

#[test]
fn test_post_buffers_follow_output_size_and_ratios() -> Result<()> {
    let device = MockGraphicsDevice::new();
    let mut pipeline = ForwardPipeline::create(&device, &ForwardPipelineConfig::default())?;
    let base_textures = device.live_textures();

    pipeline.ensure_post_buffers(&device, 1280, 720)?;
    let first = *pipeline.post_buffers().expect("post buffers");
    assert_eq!(device.texture(first.ssgi).map(|t| t.width), Some(640));
    assert_eq!(device.live_textures(), base_textures + 2);

    pipeline.ensure_post_buffers(&device, 1280, 720)?;
    assert_eq!(pipeline.post_buffers(), Some(&first), "unchanged size is a no-op");

    pipeline.update_aaa(&AaaParams {
        ssr_ratio: BackbufferRatio::Quarter,
        ..Default::default()
    });
    pipeline.ensure_post_buffers(&device, 1920, 1080)?;
    let resized = *pipeline.post_buffers().expect("post buffers");
    assert_ne!(resized.ssgi, first.ssgi);
    assert_eq!(device.texture(resized.ssr).map(|t| t.height), Some(270));
    assert_eq!(device.live_textures(), base_textures + 2);
    assert!(device.texture(first.ssgi).is_none());
    Ok(())
}

#[test]
fn test_update_calls_overwrite_their_own_slice() -> Result<()> {
    let device = MockGraphicsDevice::new();
    let mut pipeline = ForwardPipeline::create(&device, &ForwardPipelineConfig::default())?;
    assert_eq!(pipeline.noise(), None);

    let shadow_data = ShadowData {
        linear_shadow_slice: Vec4::new(1.0, 2.0, 3.0, 4.0),
        ..Default::default()
    };
    let lights = lights();
    pipeline.update(&shadow_data, LinearRgba::rgb(0.2, 0.2, 0.2), &lights, &fog());
    pipeline.update_noise(TextureId(500));
    pipeline.update_pbr_probe(TextureId(501), TextureId(502), TextureId(503));
    pipeline.update_ao(TextureId(504));

    let frame = pipeline.lighting();
    assert_eq!(frame.shadow_data, shadow_data);
    assert_eq!(frame.fog, fog());
    assert_eq!(frame.shadow_state, Vec4::new(0.0, -1.0, 0.0, 0.0));
    assert_eq!(pipeline.noise(), Some(TextureId(500)));
    assert_eq!(pipeline.pbr_probe().map(|p| p.radiance), Some(TextureId(502)));
    assert_eq!(pipeline.ao(), Some(TextureId(504)));

    // A later noise update leaves everything else alone.
    pipeline.update_noise(TextureId(600));
    assert_eq!(pipeline.noise(), Some(TextureId(600)));
    assert_eq!(pipeline.ao(), Some(TextureId(504)));
    assert_eq!(pipeline.lighting().shadow_data, shadow_data);
    Ok(())
}

#[test]
fn test_double_submit_records_identical_independent_draws() -> Result<()> {
    common::init_logger();
    let device = MockGraphicsDevice::new();
    let mut pipeline = ForwardPipeline::create(&device, &ForwardPipelineConfig::default())?;
    let lights = lights();
    pipeline.update(&ShadowData::default(), LinearRgba::BLACK, &lights, &fog());

    let model = Model::new(vec![primitive(1)]);
    let program = forward_program("pbr", 100);
    let mut encoder = RecordingEncoder::new();
    submit(&mut encoder, &pipeline, &model, &program, ForwardPipelineStage::Basic, &lights);
    submit(&mut encoder, &pipeline, &model, &program, ForwardPipelineStage::Basic, &lights);

    assert_eq!(encoder.draws.len(), 2);
    assert_eq!(encoder.draws[0], encoder.draws[1]);
    // Each draw carries exactly one set of bindings.
    let u = pipeline.uniforms();
    let light_pos_sets = encoder.draws[1]
        .state
        .uniforms
        .iter()
        .filter(|(id, _)| *id == u.light_pos)
        .count();
    assert_eq!(light_pos_sets, 1);
    Ok(())
}

#[test]
fn test_basic_stage_binds_lighting_and_shadows() -> Result<()> {
    let device = MockGraphicsDevice::new();
    let mut pipeline = ForwardPipeline::create(&device, &ForwardPipelineConfig::default())?;
    let lights = lights();
    let shadow_data = ShadowData {
        spot_shadow_mtx: Mat4::from_scale(Vec3::splat(4.0)),
        ..Default::default()
    };
    pipeline.update(&shadow_data, LinearRgba::BLACK, &lights, &fog());

    let model = Model::new(vec![primitive(1)]);
    let program = forward_program("pbr", 100);
    let mut encoder = RecordingEncoder::new();
    submit(&mut encoder, &pipeline, &model, &program, ForwardPipelineStage::Basic, &lights);

    let draw = &encoder.draws[0];
    let u = pipeline.uniforms();
    assert_eq!(draw.program, ProgramId(101));
    assert_eq!(draw.view, ViewId(10));
    assert_eq!(draw.state.state, Some(RenderState::DEFAULT));
    assert_eq!(
        draw.state.transforms,
        vec![Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0))]
    );
    assert_eq!(
        draw.state.uniform(u.light_pos),
        Some(&RecordedUniform::Vec4(lights.pos.to_vec()))
    );
    assert_eq!(
        draw.state.uniform(u.ambient_color),
        Some(&RecordedUniform::Vec4(vec![Vec4::new(0.1, 0.1, 0.1, 1.0)]))
    );
    assert_eq!(
        draw.state.uniform(u.fog_state),
        Some(&RecordedUniform::Vec4(vec![Vec4::new(20.0, 120.0, 0.01, 0.0)]))
    );
    assert_eq!(
        draw.state.uniform(u.spot_shadow_mtx),
        Some(&RecordedUniform::Mat4(vec![shadow_data.spot_shadow_mtx]))
    );
    assert_eq!(
        draw.state.uniform(u.shadow_state),
        Some(&RecordedUniform::Vec4(vec![Vec4::new(0.0, -1.0, 0.0, 0.0)]))
    );
    assert_eq!(
        draw.state.texture_at(texture_stage::LINEAR_SHADOW),
        Some(pipeline.linear_shadow_target().texture)
    );
    assert_eq!(
        draw.state.texture_at(texture_stage::SPOT_SHADOW),
        Some(pipeline.spot_shadow_target().texture)
    );
    assert_eq!(draw.state.texture_at(texture_stage::NOISE), None);
    Ok(())
}

#[test]
fn test_stages_bind_increasing_state() -> Result<()> {
    let device = MockGraphicsDevice::new();
    let mut pipeline = ForwardPipeline::create(&device, &ForwardPipelineConfig::default())?;
    let lights = lights();
    pipeline.update(&ShadowData::default(), LinearRgba::BLACK, &lights, &fog());
    pipeline.update_noise(TextureId(500));
    pipeline.update_pbr_probe(TextureId(501), TextureId(502), TextureId(503));
    pipeline.update_ao(TextureId(504));
    pipeline.update_aaa(&AaaParams {
        rect: ViewRect::new(0, 0, 1280, 720),
        view: Mat4::from_translation(Vec3::new(0.0, -2.0, -10.0)),
        proj: Mat4::perspective_rh(FRAC_PI_4, 16.0 / 9.0, 0.1, 100.0),
        prv_view: Mat4::from_translation(Vec3::new(0.0, -2.0, -9.5)),
        jitter: Vec2::new(0.5, -0.5),
        ..Default::default()
    });
    pipeline.ensure_post_buffers(&device, 1280, 720)?;

    let model = Model::new(vec![primitive(1)]);
    let program = forward_program("pbr", 100);
    let mut encoder = RecordingEncoder::new();
    for stage in ForwardPipelineStage::ALL {
        submit(&mut encoder, &pipeline, &model, &program, stage, &lights);
    }

    let u = pipeline.uniforms();
    let [attributes, basic, advanced] = [&encoder.draws[0], &encoder.draws[1], &encoder.draws[2]];
    assert_eq!(
        [attributes.program, basic.program, advanced.program],
        [ProgramId(100), ProgramId(101), ProgramId(102)]
    );

    let aaa = pipeline.aaa();
    assert_eq!(
        attributes.state.uniform(u.view_proj),
        Some(&RecordedUniform::Mat4(vec![aaa.proj * aaa.view]))
    );
    assert_eq!(
        attributes.state.uniform(u.previous_view_proj),
        Some(&RecordedUniform::Mat4(vec![aaa.prv_proj * aaa.prv_view]))
    );
    assert_ne!(
        attributes.state.uniform(u.view_proj),
        attributes.state.uniform(u.previous_view_proj)
    );
    assert!(attributes.state.uniform(u.light_pos).is_none());
    assert!(attributes.state.textures.is_empty());

    assert!(basic.state.uniform(u.light_pos).is_some());
    assert_eq!(basic.state.texture_at(texture_stage::AO), None);

    assert!(advanced.state.uniform(u.light_pos).is_some());
    assert_eq!(advanced.state.texture_at(texture_stage::NOISE), Some(TextureId(500)));
    assert_eq!(advanced.state.texture_at(texture_stage::BRDF), Some(TextureId(503)));
    assert_eq!(advanced.state.texture_at(texture_stage::AO), Some(TextureId(504)));
    let post = pipeline.post_buffers().expect("post buffers");
    assert_eq!(advanced.state.texture_at(texture_stage::SSR), Some(post.ssr));
    assert_eq!(
        advanced.state.uniform(u.aaa_params),
        Some(&RecordedUniform::Vec4(pipeline.aaa().packed().to_vec()))
    );
    Ok(())
}

#[test]
fn test_one_draw_per_primitive() -> Result<()> {
    let device = MockGraphicsDevice::new();
    let pipeline = ForwardPipeline::create(&device, &ForwardPipelineConfig::default())?;
    let model = Model::new(vec![primitive(1), primitive(2), primitive(3)]);
    let program = forward_program("pbr", 100);
    let mut encoder = RecordingEncoder::new();
    let stage = ForwardPipelineStage::Advanced;
    submit(&mut encoder, &pipeline, &model, &program, stage, &lights());

    assert_eq!(encoder.draws.len(), 3);
    let vbs: Vec<_> = encoder
        .draws
        .iter()
        .map(|d| d.state.vertex_buffer.map(|v| v.0))
        .collect();
    assert_eq!(vbs, vec![Some(1), Some(2), Some(3)]);
    assert!(encoder
        .draws
        .iter()
        .all(|d| d.state.uniform(pipeline.uniforms().light_pos).is_some()));
    Ok(())
}

#[test]
fn test_missing_program_draws_nothing() -> Result<()> {
    common::init_logger();
    let device = MockGraphicsDevice::new();
    let pipeline = ForwardPipeline::create(&device, &ForwardPipelineConfig::default())?;
    let model = Model::new(vec![primitive(1)]);
    let program = PipelineProgram::new("partial").with_variant(vec![Some(ProgramId(1))]);
    let mut encoder = RecordingEncoder::new();

    let stage = ForwardPipelineStage::Basic;
    submit(&mut encoder, &pipeline, &model, &program, stage, &lights());
    submit_model_to_forward_pipeline(
        &mut encoder,
        ViewId(0),
        &model,
        &pipeline,
        &program,
        0,
        forward_pipeline_info().configs.len(),
        LinearRgba::BLACK,
        &lights(),
        &fog(),
        &Mat4::IDENTITY,
    );
    assert!(encoder.draws.is_empty());
    Ok(())
}

#[test]
fn test_full_frame_records_shadow_views_before_main_view() -> Result<()> {
    common::init_logger();
    let device = MockGraphicsDevice::new();
    let config = ForwardPipelineConfig::from_ron_str("(shadow_map_resolution: 512)")?;
    let mut pipeline = ForwardPipeline::create(&device, &config)?;
    let defaults = *pipeline.light_defaults();

    let scene = scene();
    let casters = ShadowCasters {
        display_lists: &scene.display_lists,
        skinned_display_lists: &scene.skinned_display_lists,
        mtxs: &scene.mtxs,
        resources: &scene.resources,
    };
    let lights = prepare_forward_lights(&[
        defaults
            .linear(Mat4::from_rotation_x(FRAC_PI_2), LinearRgba::WHITE, LinearRgba::WHITE)
            .with_shadow(ShadowType::Map),
        defaults
            .spot(
                Mat4::from_translation(Vec3::Y * 5.0) * Mat4::from_rotation_x(FRAC_PI_2),
                LinearRgba::WHITE,
                LinearRgba::WHITE,
            )
            .with_radius(20.0)
            .with_shadow(ShadowType::Map),
    ]);
    let camera = ViewState::new(
        Mat4::IDENTITY,
        Mat4::perspective_rh(FRAC_PI_4, 16.0 / 9.0, 0.1, 800.0),
    );

    let mut encoder = RecordingEncoder::new();
    let mut view_id = ViewId(0);
    let mut views = [ViewId(0); 5];
    let mut shadow_data = ShadowData::default();
    generate_linear_shadow_map(
        &mut encoder,
        &mut view_id,
        &camera,
        &casters,
        &lights,
        &pipeline,
        &mut views,
        &mut shadow_data,
        Some("frame"),
    );
    generate_spot_shadow_map(
        &mut encoder,
        &mut view_id,
        &casters,
        &lights,
        &pipeline,
        &mut views,
        &mut shadow_data,
        Some("frame"),
    );
    pipeline.update(&shadow_data, LinearRgba::BLACK, &lights, &fog());

    let main_view = view_id.claim();
    let model = Model::new(vec![primitive(7)]);
    let program = forward_program("pbr", 100);
    submit_model_to_forward_pipeline(
        &mut encoder,
        main_view,
        &model,
        &pipeline,
        &program,
        0,
        ForwardPipelineStage::Basic.config_index(),
        LinearRgba::BLACK,
        &lights,
        &fog(),
        &Mat4::IDENTITY,
    );

    assert_eq!(views, [ViewId(0), ViewId(1), ViewId(2), ViewId(3), ViewId(4)]);
    assert_eq!(main_view, ViewId(5));
    assert!(views.iter().all(|v| *v < main_view));

    let main_draw = encoder.draws.last().expect("main draw");
    assert_eq!(main_draw.view, main_view);
    let u = pipeline.uniforms();
    assert_eq!(
        main_draw.state.uniform(u.linear_shadow_mtx),
        Some(&RecordedUniform::Mat4(shadow_data.linear_shadow_mtx.to_vec()))
    );
    assert_eq!(
        main_draw.state.uniform(u.linear_shadow_slice),
        Some(&RecordedUniform::Vec4(vec![Vec4::new(10.0, 50.0, 100.0, 500.0)]))
    );
    assert_eq!(
        main_draw.state.uniform(u.shadow_state),
        Some(&RecordedUniform::Vec4(vec![Vec4::new(0.0, 1.0, 0.0, 0.0)]))
    );

    pipeline.destroy(&device);
    assert_eq!(device.live_count(), 0);
    Ok(())
}
