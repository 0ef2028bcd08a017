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

//! Defines the `CommandEncoder` trait used to record view setup and draw calls.

use crate::math::Mat4;
use crate::renderer::api::{
    resource::{
        FrameBufferId, IndexBufferId, ProgramId, TextureId, UniformId, UniformValue,
        VertexBufferId, ViewId,
    },
    state::{RenderState, ViewClear, ViewRect},
};

/// Records commands into GPU views.
///
/// Views execute in ascending [`ViewId`] order once the frame is handed to the
/// GPU. Draw state (`set_uniform`, `set_texture`, `set_transform*`, buffers and
/// `set_state`) is pending until the next [`CommandEncoder::submit`], which
/// consumes it. Implementations must reset pending draw state after a submit
/// so consecutive draws never observe each other's bindings.
pub trait CommandEncoder {
    /// Sets the debug name of a view.
    fn set_view_name(&mut self, view: ViewId, name: &str);

    /// Sets the viewport rectangle of a view.
    fn set_view_rect(&mut self, view: ViewId, rect: ViewRect);

    /// Sets the clear operation executed when the view starts.
    fn set_view_clear(&mut self, view: ViewId, clear: ViewClear);

    /// Directs a view into a frame buffer, or the back buffer when `None`.
    fn set_view_frame_buffer(&mut self, view: ViewId, frame_buffer: Option<FrameBufferId>);

    /// Sets the view and projection matrices of a view.
    fn set_view_transform(&mut self, view: ViewId, view_mtx: &Mat4, proj: &Mat4);

    /// Sets a uniform value for the next draw.
    fn set_uniform(&mut self, uniform: UniformId, value: UniformValue<'_>);

    /// Binds a texture to a sampler stage for the next draw.
    fn set_texture(&mut self, stage: u8, sampler: UniformId, texture: TextureId);

    /// Sets the world transform of the next draw.
    fn set_transform(&mut self, mtx: &Mat4);

    /// Sets a palette of world transforms (bone matrices) for the next draw.
    fn set_transforms(&mut self, mtxs: &[Mat4]);

    /// Sets the vertex buffer of the next draw.
    fn set_vertex_buffer(&mut self, buffer: VertexBufferId);

    /// Sets the index buffer and index count of the next draw.
    fn set_index_buffer(&mut self, buffer: IndexBufferId, index_count: u32);

    /// Sets the fixed-function state of the next draw.
    fn set_state(&mut self, state: RenderState);

    /// Records a draw of the pending state into `view` with `program`.
    fn submit(&mut self, view: ViewId, program: ProgramId, depth: u32);

    /// Makes sure a view is processed even if nothing is drawn into it.
    fn touch(&mut self, view: ViewId);
}
