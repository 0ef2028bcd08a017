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

//! Shared test doubles: a recording command encoder and a mock graphics device.

#![allow(dead_code)]

use lumen_core::{
    math::{LinearRgba, Mat4, Vec3, Vec4},
    renderer::{
        light::Light, CommandEncoder, FrameBufferDescriptor, FrameBufferId, GraphicsDevice,
        IndexBufferId, Material, Model, ModelDisplayList, PipelineProgram, PipelineProgramRef,
        PipelineResources, Primitive, ProgramId, RenderState, ResourceError,
        SkinnedModelDisplayList, TextureDescriptor, TextureId, UniformDescriptor, UniformId,
        UniformValue, VertexBufferId, ViewClear, ViewId, ViewRect,
    },
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// --- Graphics device ---

#[derive(Debug, Default)]
struct DeviceState {
    next_id: usize,
    created: usize,
    textures: HashMap<usize, TextureDescriptor>,
    frame_buffers: HashMap<usize, FrameBufferDescriptor>,
    uniforms: HashMap<usize, UniformDescriptor>,
}

/// A device that hands out sequential ids and tracks live resources.
///
/// With `fail_after(n)`, the creation following `n` successful creations fails.
#[derive(Debug, Default)]
pub struct MockGraphicsDevice {
    state: Mutex<DeviceState>,
    fail_after: Option<usize>,
}

impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_after(n: usize) -> Self {
        Self {
            state: Mutex::default(),
            fail_after: Some(n),
        }
    }

    fn allocate(&self, kind: &'static str, label: &str) -> Result<usize, ResourceError> {
        let mut state = self.state.lock().unwrap();
        if self.fail_after.is_some_and(|n| state.created >= n) {
            return Err(ResourceError::CreationFailed {
                kind,
                label: label.to_string(),
                details: "mock failure".to_string(),
            });
        }
        state.created += 1;
        state.next_id += 1;
        Ok(state.next_id)
    }

    pub fn live_count(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.textures.len() + state.frame_buffers.len() + state.uniforms.len()
    }

    pub fn live_textures(&self) -> usize {
        self.state.lock().unwrap().textures.len()
    }

    pub fn texture(&self, id: TextureId) -> Option<TextureDescriptor> {
        self.state.lock().unwrap().textures.get(&id.0).cloned()
    }

    pub fn uniform_named(&self, name: &str) -> Option<UniformId> {
        let state = self.state.lock().unwrap();
        state
            .uniforms
            .iter()
            .find(|(_, d)| d.name == name)
            .map(|(id, _)| UniformId(*id))
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureId, ResourceError> {
        let id = self.allocate("texture", &descriptor.label)?;
        self.state.lock().unwrap().textures.insert(id, descriptor.clone());
        Ok(TextureId(id))
    }

    fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError> {
        self.state
            .lock()
            .unwrap()
            .textures
            .remove(&id.0)
            .map(|_| ())
            .ok_or_else(|| ResourceError::InvalidHandle(format!("{id:?}")))
    }

    fn create_frame_buffer(
        &self,
        descriptor: &FrameBufferDescriptor,
    ) -> Result<FrameBufferId, ResourceError> {
        let id = self.allocate("frame buffer", &descriptor.label)?;
        self.state
            .lock()
            .unwrap()
            .frame_buffers
            .insert(id, descriptor.clone());
        Ok(FrameBufferId(id))
    }

    fn destroy_frame_buffer(&self, id: FrameBufferId) -> Result<(), ResourceError> {
        self.state
            .lock()
            .unwrap()
            .frame_buffers
            .remove(&id.0)
            .map(|_| ())
            .ok_or_else(|| ResourceError::InvalidHandle(format!("{id:?}")))
    }

    fn create_uniform(&self, descriptor: &UniformDescriptor) -> Result<UniformId, ResourceError> {
        let id = self.allocate("uniform", &descriptor.name)?;
        self.state.lock().unwrap().uniforms.insert(id, descriptor.clone());
        Ok(UniformId(id))
    }

    fn destroy_uniform(&self, id: UniformId) -> Result<(), ResourceError> {
        self.state
            .lock()
            .unwrap()
            .uniforms
            .remove(&id.0)
            .map(|_| ())
            .ok_or_else(|| ResourceError::InvalidHandle(format!("{id:?}")))
    }
}

// --- Command encoder ---

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedUniform {
    Vec4(Vec<Vec4>),
    Mat4(Vec<Mat4>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordedView {
    pub name: Option<String>,
    pub rect: Option<ViewRect>,
    pub clear: Option<ViewClear>,
    pub frame_buffer: Option<FrameBufferId>,
    pub transform: Option<(Mat4, Mat4)>,
    pub touched: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawState {
    pub uniforms: Vec<(UniformId, RecordedUniform)>,
    pub textures: Vec<(u8, UniformId, TextureId)>,
    pub transforms: Vec<Mat4>,
    pub vertex_buffer: Option<VertexBufferId>,
    pub index_buffer: Option<(IndexBufferId, u32)>,
    pub state: Option<RenderState>,
}

impl DrawState {
    /// Last value set for `uniform`.
    pub fn uniform(&self, uniform: UniformId) -> Option<&RecordedUniform> {
        self.uniforms
            .iter()
            .rev()
            .find(|(id, _)| *id == uniform)
            .map(|(_, v)| v)
    }

    pub fn texture_at(&self, stage: u8) -> Option<TextureId> {
        self.textures
            .iter()
            .rev()
            .find(|(s, _, _)| *s == stage)
            .map(|(_, _, t)| *t)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraw {
    pub view: ViewId,
    pub program: ProgramId,
    pub depth: u32,
    pub state: DrawState,
}

/// Records view setup and draws; pending draw state is reset by `submit`.
#[derive(Debug, Default)]
pub struct RecordingEncoder {
    pub views: BTreeMap<ViewId, RecordedView>,
    pub draws: Vec<RecordedDraw>,
    pending: DrawState,
}

impl RecordingEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draws_in(&self, view: ViewId) -> Vec<&RecordedDraw> {
        self.draws.iter().filter(|d| d.view == view).collect()
    }
}

impl CommandEncoder for RecordingEncoder {
    fn set_view_name(&mut self, view: ViewId, name: &str) {
        self.views.entry(view).or_default().name = Some(name.to_string());
    }

    fn set_view_rect(&mut self, view: ViewId, rect: ViewRect) {
        self.views.entry(view).or_default().rect = Some(rect);
    }

    fn set_view_clear(&mut self, view: ViewId, clear: ViewClear) {
        self.views.entry(view).or_default().clear = Some(clear);
    }

    fn set_view_frame_buffer(&mut self, view: ViewId, frame_buffer: Option<FrameBufferId>) {
        self.views.entry(view).or_default().frame_buffer = frame_buffer;
    }

    fn set_view_transform(&mut self, view: ViewId, view_mtx: &Mat4, proj: &Mat4) {
        self.views.entry(view).or_default().transform = Some((*view_mtx, *proj));
    }

    fn set_uniform(&mut self, uniform: UniformId, value: UniformValue<'_>) {
        let recorded = match value {
            UniformValue::Vec4(v) => RecordedUniform::Vec4(v.to_vec()),
            UniformValue::Mat4(m) => RecordedUniform::Mat4(m.to_vec()),
        };
        self.pending.uniforms.push((uniform, recorded));
    }

    fn set_texture(&mut self, stage: u8, sampler: UniformId, texture: TextureId) {
        self.pending.textures.push((stage, sampler, texture));
    }

    fn set_transform(&mut self, mtx: &Mat4) {
        self.pending.transforms = vec![*mtx];
    }

    fn set_transforms(&mut self, mtxs: &[Mat4]) {
        self.pending.transforms = mtxs.to_vec();
    }

    fn set_vertex_buffer(&mut self, buffer: VertexBufferId) {
        self.pending.vertex_buffer = Some(buffer);
    }

    fn set_index_buffer(&mut self, buffer: IndexBufferId, index_count: u32) {
        self.pending.index_buffer = Some((buffer, index_count));
    }

    fn set_state(&mut self, state: RenderState) {
        self.pending.state = Some(state);
    }

    fn submit(&mut self, view: ViewId, program: ProgramId, depth: u32) {
        self.draws.push(RecordedDraw {
            view,
            program,
            depth,
            state: std::mem::take(&mut self.pending),
        });
    }

    fn touch(&mut self, view: ViewId) {
        self.views.entry(view).or_default().touched = true;
    }
}

// --- Scene fixtures ---

pub const DEPTH_PROGRAM: ProgramId = ProgramId(900);
pub const SKINNED_DEPTH_PROGRAM: ProgramId = ProgramId(901);

/// Programs of a forward shader: one per configuration, depth-only last.
pub fn forward_program(name: &str, base: usize) -> PipelineProgram {
    PipelineProgram::new(name).with_variant(vec![
        Some(ProgramId(base)),
        Some(ProgramId(base + 1)),
        Some(ProgramId(base + 2)),
        Some(ProgramId(base + 3)),
    ])
}

pub fn primitive(n: usize) -> Primitive {
    Primitive {
        vertex_buffer: VertexBufferId(n),
        index_buffer: IndexBufferId(n),
        index_count: 36,
    }
}

pub struct Scene {
    pub resources: PipelineResources,
    pub display_lists: Vec<ModelDisplayList>,
    pub skinned_display_lists: Vec<SkinnedModelDisplayList>,
    pub mtxs: Vec<Mat4>,
    pub program: PipelineProgramRef,
}

/// Two rigid cubes and one skinned mesh with two bones.
pub fn scene() -> Scene {
    let mut resources = PipelineResources::new();
    let program = resources.add_program(
        PipelineProgram::new("depth").with_variant(vec![None, None, None, Some(DEPTH_PROGRAM)]),
    );
    let skinned_program = resources.add_program(
        PipelineProgram::new("skinned depth")
            .with_variant(vec![None, None, None, Some(SKINNED_DEPTH_PROGRAM)]),
    );
    let cube = resources.add_model(Model::new(vec![primitive(1)]));
    let character = resources.add_model(Model::new(vec![primitive(2)]));
    let material = resources.add_material(Material::new(program, 0));
    let skinned_material = resources.add_material(Material::new(skinned_program, 0));

    let mtxs = vec![
        Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0)),
        Mat4::from_translation(Vec3::new(2.0, 0.0, -8.0)),
        Mat4::from_translation(Vec3::new(-1.0, 0.0, -3.0)),
        Mat4::from_translation(Vec3::new(-1.0, 1.0, -3.0)),
    ];

    Scene {
        resources,
        display_lists: vec![
            ModelDisplayList {
                model: cube,
                lst_idx: 0,
                mtx_idx: 0,
                material,
            },
            ModelDisplayList {
                model: cube,
                lst_idx: 0,
                mtx_idx: 1,
                material,
            },
        ],
        skinned_display_lists: vec![SkinnedModelDisplayList {
            model: character,
            lst_idx: 0,
            bones_idx: vec![2, 3],
            material: skinned_material,
        }],
        mtxs,
        program,
    }
}

pub fn point_light(x: f32, priority: f32) -> Light {
    Light::point(
        Mat4::from_translation(Vec3::new(x, 1.0, 0.0)),
        LinearRgba::WHITE,
        LinearRgba::WHITE,
    )
    .with_priority(priority)
}
