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

//! Public value types of the rendering API.

pub mod model;
pub mod pipeline;
pub mod resource;
pub mod state;
pub mod view;

pub use self::model::{
    Material, MaterialRef, MaterialTexture, MaterialValue, Model, ModelDisplayList, ModelRef,
    Primitive, SkinnedModelDisplayList,
};
pub use self::pipeline::{
    Pipeline, PipelineInfo, PipelineProgram, PipelineProgramRef, PipelineResources,
};
pub use self::resource::{
    BackbufferRatio, FrameBufferDescriptor, FrameBufferId, IndexBufferId, ProgramId,
    TextureDescriptor, TextureFormat, TextureId, UniformDescriptor, UniformId, UniformKind,
    UniformValue, VertexBufferId, ViewId,
};
pub use self::state::{ClearFlags, RenderState, ViewClear, ViewRect};
pub use self::view::ViewState;
