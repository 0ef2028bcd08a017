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

//! Forward pipeline state: GPU resources and per-frame configuration.

use super::{ForwardLights, ForwardPipelineConfig, ShadowData, FORWARD_LIGHT_COUNT};
use lumen_core::{
    math::{LinearRgba, Mat4, Vec2, Vec4},
    renderer::{
        light::LightDefaults, BackbufferRatio, FrameBufferDescriptor, FrameBufferId,
        GraphicsDevice, Pipeline, PipelineInfo, RenderError, ResourceError, TextureDescriptor,
        TextureFormat, TextureId, UniformDescriptor, UniformId, UniformKind, ViewRect,
    },
};

/// Configuration names of the forward pipeline, in configuration-index order.
///
/// The first three are the shading stages; the last one is the depth-only
/// configuration shadow passes draw with.
pub const FORWARD_PIPELINE_CONFIGS: &[&str] = &[
    "FORWARD_PIPELINE_ATTRIBUTE_BUFFERS",
    "FORWARD_PIPELINE_BASIC",
    "FORWARD_PIPELINE_ADVANCED",
    "FORWARD_PIPELINE_DEPTH_ONLY",
];

/// Configuration index used by shadow passes.
pub const DEPTH_ONLY_CONFIG_IDX: usize = 3;

static FORWARD_PIPELINE_INFO: PipelineInfo = PipelineInfo {
    name: "Forward",
    configs: FORWARD_PIPELINE_CONFIGS,
};

/// Returns the static description of the forward pipeline.
pub fn forward_pipeline_info() -> &'static PipelineInfo {
    &FORWARD_PIPELINE_INFO
}

/// Sampler stages of the textures bound by the forward pipeline.
pub mod texture_stage {
    pub const NOISE: u8 = 6;
    pub const IRRADIANCE: u8 = 7;
    pub const RADIANCE: u8 = 8;
    pub const BRDF: u8 = 9;
    pub const AO: u8 = 10;
    pub const SSGI: u8 = 11;
    pub const SSR: u8 = 12;
    pub const LINEAR_SHADOW: u8 = 14;
    pub const SPOT_SHADOW: u8 = 15;
}

/// Linear fog between two view distances.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ForwardPipelineFog {
    pub near: f32,
    pub far: f32,
    pub color: LinearRgba,
}

impl ForwardPipelineFog {
    /// `(near, far, 1 / (far - near), 0)`; a null range disables fog.
    pub fn state(&self) -> Vec4 {
        let range = self.far - self.near;
        let inv_range = if range > 0.0 { 1.0 / range } else { 0.0 };
        Vec4::new(self.near, self.far, inv_range, 0.0)
    }
}

/// Post-effect and temporal parameters of a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AaaParams {
    /// Output viewport.
    pub rect: ViewRect,
    /// Current view matrix.
    pub view: Mat4,
    /// Current projection matrix.
    pub proj: Mat4,
    /// Previous frame view matrix.
    pub prv_view: Mat4,
    /// Previous frame projection matrix.
    pub prv_proj: Mat4,
    /// Sub-pixel jitter of the current projection, in pixels.
    pub jitter: Vec2,
    /// Size of the SSGI buffer relative to the output.
    pub ssgi_ratio: BackbufferRatio,
    /// Size of the SSR buffer relative to the output.
    pub ssr_ratio: BackbufferRatio,
    pub temporal_aa_weight: f32,
    pub motion_blur_strength: f32,
    pub exposure: f32,
    pub gamma: f32,
    /// Ray-march sample count of the screen-space effects.
    pub sample_count: u32,
    /// Maximum ray distance of the screen-space effects.
    pub max_distance: f32,
}

impl Default for AaaParams {
    fn default() -> Self {
        Self {
            rect: ViewRect::default(),
            view: Mat4::IDENTITY,
            proj: Mat4::IDENTITY,
            prv_view: Mat4::IDENTITY,
            prv_proj: Mat4::IDENTITY,
            jitter: Vec2::ZERO,
            ssgi_ratio: BackbufferRatio::Half,
            ssr_ratio: BackbufferRatio::Half,
            temporal_aa_weight: 0.1,
            motion_blur_strength: 1.0,
            exposure: 1.0,
            gamma: 2.2,
            sample_count: 2,
            max_distance: 100.0,
        }
    }
}

impl AaaParams {
    /// Packs the scalar parameters as uploaded to `uAAAParams`.
    pub fn packed(&self) -> [Vec4; 3] {
        [
            Vec4::new(
                self.temporal_aa_weight,
                self.motion_blur_strength,
                self.exposure,
                self.gamma,
            ),
            Vec4::new(self.sample_count as f32, self.max_distance, self.jitter.x, self.jitter.y),
            Vec4::new(
                self.rect.x as f32,
                self.rect.y as f32,
                self.rect.width as f32,
                self.rect.height as f32,
            ),
        ]
    }
}

/// PBR ambient probe textures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PbrProbe {
    pub irradiance: TextureId,
    pub radiance: TextureId,
    pub brdf: TextureId,
}

/// Screen-space working buffers of the advanced stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostBuffers {
    pub ssgi: TextureId,
    pub ssr: TextureId,
    /// Output size the buffers were created for.
    pub size: (u32, u32),
    pub ssgi_ratio: BackbufferRatio,
    pub ssr_ratio: BackbufferRatio,
}

/// Uniform handles of the forward shaders.
#[derive(Debug, Clone, Copy)]
pub struct ForwardUniforms {
    pub light_pos: UniformId,
    pub light_dir: UniformId,
    pub light_diffuse: UniformId,
    pub light_specular: UniformId,
    pub ambient_color: UniformId,
    pub fog_color: UniformId,
    pub fog_state: UniformId,
    pub linear_shadow_mtx: UniformId,
    pub linear_shadow_slice: UniformId,
    pub spot_shadow_mtx: UniformId,
    pub shadow_state: UniformId,
    pub main_projection: UniformId,
    pub view_proj: UniformId,
    pub previous_view_proj: UniformId,
    pub aaa_params: UniformId,
    pub s_linear_shadow: UniformId,
    pub s_spot_shadow: UniformId,
    pub s_noise: UniformId,
    pub s_irradiance: UniformId,
    pub s_radiance: UniformId,
    pub s_brdf: UniformId,
    pub s_ao: UniformId,
    pub s_ssgi: UniformId,
    pub s_ssr: UniformId,
}

impl ForwardUniforms {
    fn create(device: &dyn GraphicsDevice, base: &mut Pipeline) -> Result<Self, ResourceError> {
        let light_count = FORWARD_LIGHT_COUNT as u16;
        let mut uniform = |name: &str, kind: UniformKind, count: u16| {
            let id = device.create_uniform(&UniformDescriptor::new(name, kind, count))?;
            base.insert_uniform(name, id);
            Ok::<_, ResourceError>(id)
        };

        Ok(Self {
            light_pos: uniform("uLightPos", UniformKind::Vec4, light_count)?,
            light_dir: uniform("uLightDir", UniformKind::Vec4, light_count)?,
            light_diffuse: uniform("uLightDiffuse", UniformKind::Vec4, light_count)?,
            light_specular: uniform("uLightSpecular", UniformKind::Vec4, light_count)?,
            ambient_color: uniform("uAmbientColor", UniformKind::Vec4, 1)?,
            fog_color: uniform("uFogColor", UniformKind::Vec4, 1)?,
            fog_state: uniform("uFogState", UniformKind::Vec4, 1)?,
            linear_shadow_mtx: uniform("uLinearShadowMatrix", UniformKind::Mat4, 4)?,
            linear_shadow_slice: uniform("uLinearShadowSlice", UniformKind::Vec4, 1)?,
            spot_shadow_mtx: uniform("uSpotShadowMatrix", UniformKind::Mat4, 1)?,
            shadow_state: uniform("uShadowState", UniformKind::Vec4, 1)?,
            main_projection: uniform("uMainProjection", UniformKind::Mat4, 1)?,
            view_proj: uniform("uViewProjection", UniformKind::Mat4, 1)?,
            previous_view_proj: uniform("uPreviousViewProjection", UniformKind::Mat4, 1)?,
            aaa_params: uniform("uAAAParams", UniformKind::Vec4, 3)?,
            s_linear_shadow: uniform("uLinearShadowMap", UniformKind::Sampler, 1)?,
            s_spot_shadow: uniform("uSpotShadowMap", UniformKind::Sampler, 1)?,
            s_noise: uniform("uNoiseMap", UniformKind::Sampler, 1)?,
            s_irradiance: uniform("uIrradianceMap", UniformKind::Sampler, 1)?,
            s_radiance: uniform("uRadianceMap", UniformKind::Sampler, 1)?,
            s_brdf: uniform("uBrdfMap", UniformKind::Sampler, 1)?,
            s_ao: uniform("uAmbientOcclusion", UniformKind::Sampler, 1)?,
            s_ssgi: uniform("uSSGIMap", UniformKind::Sampler, 1)?,
            s_ssr: uniform("uSSRMap", UniformKind::Sampler, 1)?,
        })
    }
}

/// A depth render target: texture plus the frame buffer rendering into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadowTarget {
    pub texture: TextureId,
    pub frame_buffer: FrameBufferId,
    /// Size in texels.
    pub size: u32,
}

impl ShadowTarget {
    fn create(
        device: &dyn GraphicsDevice,
        base: &mut Pipeline,
        name: &str,
        size: u32,
        format: TextureFormat,
    ) -> Result<Self, ResourceError> {
        let texture =
            device.create_texture(&TextureDescriptor::shadow_map(name, size, size, format))?;
        base.insert_texture(name, texture);
        let frame_buffer = device.create_frame_buffer(&FrameBufferDescriptor {
            label: name.to_string(),
            color: Vec::new(),
            depth: Some(texture),
        })?;
        base.insert_frame_buffer(name, frame_buffer);
        Ok(Self {
            texture,
            frame_buffer,
            size,
        })
    }
}

/// Lighting state recorded by [`ForwardPipeline::update`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameLighting {
    pub shadow_data: ShadowData,
    pub ambient: LinearRgba,
    pub fog: ForwardPipelineFog,
    /// Shadow slot state of the lights the shadow data was generated for.
    pub shadow_state: Vec4,
}

impl Default for FrameLighting {
    fn default() -> Self {
        Self {
            shadow_data: ShadowData::default(),
            ambient: LinearRgba::BLACK,
            fog: ForwardPipelineFog::default(),
            shadow_state: Vec4::new(-1.0, -1.0, 0.0, 0.0),
        }
    }
}

/// The forward pipeline: GPU resources owned by the forward renderer and the
/// state of the frame being recorded.
///
/// Created once with [`ForwardPipeline::create`], updated every frame through
/// the `update*` calls, and released with [`ForwardPipeline::destroy`]. All
/// updates of a frame must be recorded before its first submission.
#[derive(Debug)]
pub struct ForwardPipeline {
    /// Registry owning every GPU resource of the pipeline.
    pub base: Pipeline,
    /// Resolution of the spot shadow map and of each linear cascade.
    pub shadow_map_resolution: u32,
    light_defaults: LightDefaults,
    uniforms: ForwardUniforms,
    linear_shadow: ShadowTarget,
    spot_shadow: ShadowTarget,
    lighting: FrameLighting,
    noise: Option<TextureId>,
    pbr_probe: Option<PbrProbe>,
    ao: Option<TextureId>,
    aaa: AaaParams,
    post_buffers: Option<PostBuffers>,
}

impl ForwardPipeline {
    /// Creates the shadow maps and uniforms of the pipeline.
    ///
    /// The linear shadow map is a 2x2 atlas of `shadow_map_resolution` sized
    /// cascades. On failure, every resource created so far is released.
    pub fn create(
        device: &dyn GraphicsDevice,
        config: &ForwardPipelineConfig,
    ) -> Result<Self, RenderError> {
        config.validate()?;
        let resolution = config.shadow_map_resolution;
        let spot_format = if config.spot_16bit_shadow_map {
            TextureFormat::D16
        } else {
            TextureFormat::D32F
        };
        let mut base = Pipeline::new();

        let (uniforms, linear_shadow, spot_shadow) =
            match Self::create_resources(device, &mut base, resolution, spot_format) {
                Ok(resources) => resources,
                Err(e) => {
                    log::error!("Failed to create forward pipeline: {e}");
                    base.destroy(device);
                    return Err(e.into());
                }
            };

        log::debug!(
            "Created forward pipeline: {} resources, shadow map {resolution}px, spot {spot_format:?}",
            base.resource_count(),
        );

        Ok(Self {
            base,
            shadow_map_resolution: resolution,
            light_defaults: config.light_defaults,
            uniforms,
            linear_shadow,
            spot_shadow,
            lighting: FrameLighting::default(),
            noise: None,
            pbr_probe: None,
            ao: None,
            aaa: AaaParams::default(),
            post_buffers: None,
        })
    }

    fn create_resources(
        device: &dyn GraphicsDevice,
        base: &mut Pipeline,
        resolution: u32,
        spot_format: TextureFormat,
    ) -> Result<(ForwardUniforms, ShadowTarget, ShadowTarget), ResourceError> {
        let uniforms = ForwardUniforms::create(device, base)?;
        let linear_shadow = ShadowTarget::create(
            device,
            base,
            "forward.linear_shadow_map",
            resolution * 2,
            TextureFormat::D32F,
        )?;
        let spot_shadow =
            ShadowTarget::create(device, base, "forward.spot_shadow_map", resolution, spot_format)?;
        Ok((uniforms, linear_shadow, spot_shadow))
    }

    /// Releases every GPU resource owned by the pipeline.
    pub fn destroy(mut self, device: &dyn GraphicsDevice) {
        self.base.destroy(device);
        log::debug!("Destroyed forward pipeline");
    }

    /// Records the frame's shadow data, ambient color and fog.
    ///
    /// `lights` must be the packed set the shadow data was generated from; it
    /// decides which light slots sample the shadow maps.
    pub fn update(
        &mut self,
        shadow_data: &ShadowData,
        ambient: LinearRgba,
        lights: &ForwardLights,
        fog: &ForwardPipelineFog,
    ) {
        self.lighting = FrameLighting {
            shadow_data: *shadow_data,
            ambient,
            fog: *fog,
            shadow_state: lights.shadow_state(),
        };
    }

    /// Records the noise texture.
    pub fn update_noise(&mut self, noise: TextureId) {
        self.noise = Some(noise);
    }

    /// Records the PBR probe textures.
    pub fn update_pbr_probe(&mut self, irradiance: TextureId, radiance: TextureId, brdf: TextureId) {
        self.pbr_probe = Some(PbrProbe {
            irradiance,
            radiance,
            brdf,
        });
    }

    /// Records the ambient occlusion texture.
    pub fn update_ao(&mut self, ao: TextureId) {
        self.ao = Some(ao);
    }

    /// Records the post-effect and temporal parameters.
    pub fn update_aaa(&mut self, params: &AaaParams) {
        self.aaa = *params;
    }

    /// Creates or resizes the SSGI and SSR buffers for a `width` x `height`
    /// output at the ratios of the last [`ForwardPipeline::update_aaa`].
    ///
    /// Does nothing when the buffers already match.
    pub fn ensure_post_buffers(
        &mut self,
        device: &dyn GraphicsDevice,
        width: u32,
        height: u32,
    ) -> Result<(), ResourceError> {
        let (ssgi_ratio, ssr_ratio) = (self.aaa.ssgi_ratio, self.aaa.ssr_ratio);
        if let Some(current) = &self.post_buffers {
            if current.size == (width, height)
                && current.ssgi_ratio == ssgi_ratio
                && current.ssr_ratio == ssr_ratio
            {
                return Ok(());
            }
        }
        self.release_post_buffers(device);

        let (w, h) = ssgi_ratio.apply(width, height);
        let ssgi = device.create_texture(&TextureDescriptor::color_target(
            "forward.ssgi",
            w,
            h,
            TextureFormat::Rgba16F,
        ))?;
        self.base.insert_texture("forward.ssgi", ssgi);

        let (w, h) = ssr_ratio.apply(width, height);
        let ssr = device.create_texture(&TextureDescriptor::color_target(
            "forward.ssr",
            w,
            h,
            TextureFormat::Rgba16F,
        ))?;
        self.base.insert_texture("forward.ssr", ssr);

        log::debug!("Post buffers resized for {width}x{height} output");
        self.post_buffers = Some(PostBuffers {
            ssgi,
            ssr,
            size: (width, height),
            ssgi_ratio,
            ssr_ratio,
        });
        Ok(())
    }

    fn release_post_buffers(&mut self, device: &dyn GraphicsDevice) {
        self.post_buffers = None;
        for name in ["forward.ssgi", "forward.ssr"] {
            if let Some(id) = self.base.remove_texture(name) {
                if let Err(e) = device.destroy_texture(id) {
                    log::warn!("Failed to destroy texture '{name}': {e}");
                }
            }
        }
    }

    pub fn light_defaults(&self) -> &LightDefaults {
        &self.light_defaults
    }

    pub fn uniforms(&self) -> &ForwardUniforms {
        &self.uniforms
    }

    pub fn linear_shadow_target(&self) -> &ShadowTarget {
        &self.linear_shadow
    }

    pub fn spot_shadow_target(&self) -> &ShadowTarget {
        &self.spot_shadow
    }

    pub fn lighting(&self) -> &FrameLighting {
        &self.lighting
    }

    pub fn noise(&self) -> Option<TextureId> {
        self.noise
    }

    pub fn pbr_probe(&self) -> Option<&PbrProbe> {
        self.pbr_probe.as_ref()
    }

    pub fn ao(&self) -> Option<TextureId> {
        self.ao
    }

    pub fn aaa(&self) -> &AaaParams {
        &self.aaa
    }

    pub fn post_buffers(&self) -> Option<&PostBuffers> {
        self.post_buffers.as_ref()
    }
}
