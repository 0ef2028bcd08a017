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

//! Model geometry, materials and the display lists that reference them.

use crate::math::Vec4;
use crate::renderer::api::pipeline::PipelineProgramRef;
use crate::renderer::api::resource::{IndexBufferId, TextureId, UniformId, VertexBufferId};
use crate::renderer::api::state::RenderState;

/// One drawable primitive of a model: a vertex buffer and an index range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Primitive {
    /// Vertex buffer of the primitive.
    pub vertex_buffer: VertexBufferId,
    /// Index buffer of the primitive.
    pub index_buffer: IndexBufferId,
    /// Number of indices to draw.
    pub index_count: u32,
}

/// GPU geometry made of one or more primitives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    /// Drawable primitives, addressed by display lists through their index.
    pub lists: Vec<Primitive>,
}

impl Model {
    /// Creates a model from its primitives.
    pub fn new(lists: Vec<Primitive>) -> Self {
        Self { lists }
    }
}

/// A vector uniform value carried by a material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialValue {
    /// Target uniform.
    pub uniform: UniformId,
    /// Value.
    pub value: Vec4,
}

/// A texture bound by a material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialTexture {
    /// Sampler stage.
    pub stage: u8,
    /// Sampler uniform.
    pub sampler: UniformId,
    /// Texture.
    pub texture: TextureId,
}

/// Shading inputs of a draw: program, variant, values, textures and state.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Program used to shade the material.
    pub program: PipelineProgramRef,
    /// Variant of the program selected by the material's feature set.
    pub variant: u32,
    /// Vector uniforms.
    pub values: Vec<MaterialValue>,
    /// Textures.
    pub textures: Vec<MaterialTexture>,
    /// Fixed-function state.
    pub state: RenderState,
}

impl Material {
    /// Creates a material with no values or textures and the default state.
    pub fn new(program: PipelineProgramRef, variant: u32) -> Self {
        Self {
            program,
            variant,
            values: Vec::new(),
            textures: Vec::new(),
            state: RenderState::DEFAULT,
        }
    }
}

/// Index of a [`Model`] in the pipeline resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelRef(pub usize);

/// Index of a [`Material`] in the pipeline resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialRef(pub usize);

/// A draw of one primitive of a rigid model.
///
/// `mtx_idx` indexes the frame's world matrix array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelDisplayList {
    /// Model to draw.
    pub model: ModelRef,
    /// Index of the primitive in [`Model::lists`].
    pub lst_idx: usize,
    /// Index of the world matrix in the frame's matrix array.
    pub mtx_idx: usize,
    /// Material of the draw.
    pub material: MaterialRef,
}

/// A draw of one primitive of a skinned model.
///
/// `bones_idx` indexes the frame's world matrix array, one entry per bone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkinnedModelDisplayList {
    /// Model to draw.
    pub model: ModelRef,
    /// Index of the primitive in [`Model::lists`].
    pub lst_idx: usize,
    /// Bone matrix indices in the frame's matrix array.
    pub bones_idx: Vec<usize>,
    /// Material of the draw.
    pub material: MaterialRef,
}
