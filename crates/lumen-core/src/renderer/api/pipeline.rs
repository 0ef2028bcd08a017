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

//! Generic pipeline scaffolding shared by every pipeline variant.
//!
//! A [`Pipeline`] owns named GPU resources, a [`PipelineProgram`] maps a
//! shader variant and a pipeline configuration to a concrete program, and
//! [`PipelineResources`] is the registry display lists point into.

use crate::renderer::api::model::{Material, MaterialRef, Model, ModelRef};
use crate::renderer::api::resource::{FrameBufferId, ProgramId, TextureId, UniformId};
use crate::renderer::traits::GraphicsDevice;
use ahash::AHashMap;

/// Static description of a pipeline: its name and the configurations it
/// compiles programs for, in configuration-index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineInfo {
    /// Pipeline name.
    pub name: &'static str,
    /// Configuration names, indexed by configuration index.
    pub configs: &'static [&'static str],
}

impl PipelineInfo {
    /// Returns the index of the configuration named `name`.
    pub fn config_index(&self, name: &str) -> Option<usize> {
        self.configs.iter().position(|c| *c == name)
    }
}

/// GPU resources owned by a pipeline, registered by name.
///
/// The pipeline is the single owner of everything registered here and
/// releases it all in [`Pipeline::destroy`].
#[derive(Debug, Default)]
pub struct Pipeline {
    textures: AHashMap<String, TextureId>,
    uniforms: AHashMap<String, UniformId>,
    frame_buffers: AHashMap<String, FrameBufferId>,
}

impl Pipeline {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a texture. Returns the texture previously registered under that name.
    pub fn insert_texture(&mut self, name: impl Into<String>, id: TextureId) -> Option<TextureId> {
        self.textures.insert(name.into(), id)
    }

    /// Registers a uniform. Returns the uniform previously registered under that name.
    pub fn insert_uniform(&mut self, name: impl Into<String>, id: UniformId) -> Option<UniformId> {
        self.uniforms.insert(name.into(), id)
    }

    /// Registers a frame buffer. Returns the frame buffer previously registered under that name.
    pub fn insert_frame_buffer(
        &mut self,
        name: impl Into<String>,
        id: FrameBufferId,
    ) -> Option<FrameBufferId> {
        self.frame_buffers.insert(name.into(), id)
    }

    /// Unregisters a texture without destroying it.
    pub fn remove_texture(&mut self, name: &str) -> Option<TextureId> {
        self.textures.remove(name)
    }

    /// Looks up a texture by name.
    pub fn texture(&self, name: &str) -> Option<TextureId> {
        self.textures.get(name).copied()
    }

    /// Looks up a uniform by name.
    pub fn uniform(&self, name: &str) -> Option<UniformId> {
        self.uniforms.get(name).copied()
    }

    /// Looks up a frame buffer by name.
    pub fn frame_buffer(&self, name: &str) -> Option<FrameBufferId> {
        self.frame_buffers.get(name).copied()
    }

    /// Returns the number of registered resources.
    pub fn resource_count(&self) -> usize {
        self.textures.len() + self.uniforms.len() + self.frame_buffers.len()
    }

    /// Destroys every registered resource.
    ///
    /// Frame buffers go first since they reference textures. Failures are
    /// logged and do not stop the release of the remaining resources.
    pub fn destroy(&mut self, device: &dyn GraphicsDevice) {
        for (name, id) in self.frame_buffers.drain() {
            if let Err(e) = device.destroy_frame_buffer(id) {
                log::warn!("Failed to destroy frame buffer '{name}': {e}");
            }
        }
        for (name, id) in self.textures.drain() {
            if let Err(e) = device.destroy_texture(id) {
                log::warn!("Failed to destroy texture '{name}': {e}");
            }
        }
        for (name, id) in self.uniforms.drain() {
            if let Err(e) = device.destroy_uniform(id) {
                log::warn!("Failed to destroy uniform '{name}': {e}");
            }
        }
    }
}

/// Index of a [`PipelineProgram`] in the pipeline resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineProgramRef(pub usize);

/// A shader compiled for every variant and pipeline configuration.
///
/// `programs[variant][config]` is the program to use; `None` marks a
/// combination that was not compiled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineProgram {
    /// Debug name.
    pub name: String,
    programs: Vec<Vec<Option<ProgramId>>>,
}

impl PipelineProgram {
    /// Creates a program with no variants.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            programs: Vec::new(),
        }
    }

    /// Appends a variant given its per-configuration programs.
    pub fn with_variant(mut self, configs: Vec<Option<ProgramId>>) -> Self {
        self.programs.push(configs);
        self
    }

    /// Returns the number of variants.
    pub fn variant_count(&self) -> usize {
        self.programs.len()
    }

    /// Returns the program for a variant and configuration index.
    pub fn get(&self, variant: u32, config: usize) -> Option<ProgramId> {
        self.programs
            .get(variant as usize)
            .and_then(|configs| configs.get(config))
            .copied()
            .flatten()
    }
}

/// Registry of models, materials and programs referenced by display lists.
#[derive(Debug, Clone, Default)]
pub struct PipelineResources {
    models: Vec<Model>,
    materials: Vec<Material>,
    programs: Vec<PipelineProgram>,
}

impl PipelineResources {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a model.
    pub fn add_model(&mut self, model: Model) -> ModelRef {
        self.models.push(model);
        ModelRef(self.models.len() - 1)
    }

    /// Adds a material.
    pub fn add_material(&mut self, material: Material) -> MaterialRef {
        self.materials.push(material);
        MaterialRef(self.materials.len() - 1)
    }

    /// Adds a pipeline program.
    pub fn add_program(&mut self, program: PipelineProgram) -> PipelineProgramRef {
        self.programs.push(program);
        PipelineProgramRef(self.programs.len() - 1)
    }

    /// Looks up a model.
    pub fn model(&self, r: ModelRef) -> Option<&Model> {
        self.models.get(r.0)
    }

    /// Looks up a material.
    pub fn material(&self, r: MaterialRef) -> Option<&Material> {
        self.materials.get(r.0)
    }

    /// Looks up a pipeline program.
    pub fn program(&self, r: PipelineProgramRef) -> Option<&PipelineProgram> {
        self.programs.get(r.0)
    }
}
