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

//! Defines the `GraphicsDevice` trait, the resource-management contract of a backend.

use crate::renderer::api::resource::{
    FrameBufferDescriptor, FrameBufferId, TextureDescriptor, TextureId, UniformDescriptor,
    UniformId,
};
use crate::renderer::error::ResourceError;
use std::fmt::Debug;

/// Creates and destroys GPU-resident resources.
///
/// Implementations own the real backend objects and hand out opaque ids. All
/// methods take `&self` so a device can be shared across the engine; backends
/// are expected to use interior mutability for their resource tables.
pub trait GraphicsDevice: Send + Sync + Debug {
    /// Creates a texture and returns its id.
    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureId, ResourceError>;

    /// Destroys a texture.
    fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError>;

    /// Creates a frame buffer from previously created attachments.
    fn create_frame_buffer(
        &self,
        descriptor: &FrameBufferDescriptor,
    ) -> Result<FrameBufferId, ResourceError>;

    /// Destroys a frame buffer. Attachments are not destroyed.
    fn destroy_frame_buffer(&self, id: FrameBufferId) -> Result<(), ResourceError>;

    /// Creates a named shader uniform.
    fn create_uniform(&self, descriptor: &UniformDescriptor) -> Result<UniformId, ResourceError>;

    /// Destroys a shader uniform.
    fn destroy_uniform(&self, id: UniformId) -> Result<(), ResourceError>;
}
