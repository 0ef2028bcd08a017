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

//! Opaque resource handles and resource descriptors.

use crate::math::{Mat4, Vec4};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a GPU view.
///
/// Views are ordered render targets with their own command bucket; the GPU
/// processes them in ascending id order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ViewId(pub u16);

impl ViewId {
    /// Returns the id following this one.
    #[inline]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Returns this id and advances `self` to the next one.
    #[inline]
    pub fn claim(&mut self) -> Self {
        let id = *self;
        *self = id.next();
        id
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

/// An opaque handle to a GPU texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub usize);

/// An opaque handle to a frame buffer (a set of render-target attachments).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameBufferId(pub usize);

/// An opaque handle to a shader uniform or sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformId(pub usize);

/// An opaque handle to a linked shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(pub usize);

/// An opaque handle to a vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexBufferId(pub usize);

/// An opaque handle to an index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexBufferId(pub usize);

/// Pixel formats used by render targets and sampled textures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureFormat {
    /// 16-bit float RGBA.
    Rgba16F,
    /// 16-bit depth.
    D16,
    /// 32-bit float depth.
    D32F,
}

impl TextureFormat {
    /// Returns `true` for depth formats.
    pub fn is_depth(&self) -> bool {
        matches!(self, Self::D16 | Self::D32F)
    }
}

/// Describes a texture to create.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureDescriptor {
    /// Debug label.
    pub label: String,
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Pixel format.
    pub format: TextureFormat,
    /// Whether the texture can be rendered into.
    pub render_target: bool,
    /// Whether sampling uses a depth comparison (shadow sampler).
    pub compare: bool,
}

impl TextureDescriptor {
    /// Describes a depth render target sampled with depth comparison.
    pub fn shadow_map(
        label: impl Into<String>,
        width: u32,
        height: u32,
        format: TextureFormat,
    ) -> Self {
        Self {
            label: label.into(),
            width,
            height,
            format,
            render_target: true,
            compare: true,
        }
    }

    /// Describes a color render target.
    pub fn color_target(
        label: impl Into<String>,
        width: u32,
        height: u32,
        format: TextureFormat,
    ) -> Self {
        Self {
            label: label.into(),
            width,
            height,
            format,
            render_target: true,
            compare: false,
        }
    }
}

/// Describes a frame buffer to create.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBufferDescriptor {
    /// Debug label.
    pub label: String,
    /// Color attachments.
    pub color: Vec<TextureId>,
    /// Depth attachment.
    pub depth: Option<TextureId>,
}

/// The type of a shader uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformKind {
    /// One or more 4-component vectors.
    Vec4,
    /// One or more 4x4 matrices.
    Mat4,
    /// A texture sampler.
    Sampler,
}

/// Describes a shader uniform to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformDescriptor {
    /// Name as declared in shaders.
    pub name: String,
    /// Uniform type.
    pub kind: UniformKind,
    /// Number of array elements.
    pub count: u16,
}

impl UniformDescriptor {
    /// Creates a uniform descriptor.
    pub fn new(name: impl Into<String>, kind: UniformKind, count: u16) -> Self {
        Self {
            name: name.into(),
            kind,
            count,
        }
    }
}

/// A borrowed uniform payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue<'a> {
    /// An array of 4-component vectors.
    Vec4(&'a [Vec4]),
    /// An array of 4x4 matrices.
    Mat4(&'a [Mat4]),
}

impl UniformValue<'_> {
    /// Returns the raw bytes of the payload, as uploaded to the GPU.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Vec4(v) => bytemuck::cast_slice(v),
            Self::Mat4(m) => bytemuck::cast_slice(m),
        }
    }
}

/// Size of a screen-space buffer relative to the back buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BackbufferRatio {
    /// Same size as the back buffer.
    #[default]
    Equal,
    /// Half size.
    Half,
    /// Quarter size.
    Quarter,
    /// Eighth size.
    Eighth,
    /// Sixteenth size.
    Sixteenth,
    /// Double size.
    Double,
}

impl BackbufferRatio {
    /// Returns the size of a buffer at this ratio of a `width` x `height` back buffer.
    ///
    /// Sizes never drop below one texel.
    pub fn apply(&self, width: u32, height: u32) -> (u32, u32) {
        let (w, h) = match self {
            Self::Equal => (width, height),
            Self::Half => (width / 2, height / 2),
            Self::Quarter => (width / 4, height / 4),
            Self::Eighth => (width / 8, height / 8),
            Self::Sixteenth => (width / 16, height / 16),
            Self::Double => (width.saturating_mul(2), height.saturating_mul(2)),
        };
        (w.max(1), h.max(1))
    }
}
