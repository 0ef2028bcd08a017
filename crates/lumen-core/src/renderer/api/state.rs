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

//! Fixed-function render state and view setup values.

use crate::math::LinearRgba;
use bitflags::bitflags;

bitflags! {
    /// Fixed-function state applied to a draw.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RenderState: u32 {
        /// Write the RGB channels.
        const WRITE_RGB = 1 << 0;
        /// Write the alpha channel.
        const WRITE_A = 1 << 1;
        /// Write depth.
        const WRITE_Z = 1 << 2;
        /// Pass the depth test when closer.
        const DEPTH_TEST_LESS = 1 << 3;
        /// Pass the depth test when closer or equal.
        const DEPTH_TEST_LEQUAL = 1 << 4;
        /// Cull clockwise faces.
        const CULL_CW = 1 << 5;
        /// Cull counter-clockwise faces.
        const CULL_CCW = 1 << 6;
        /// Enable multisampling.
        const MSAA = 1 << 7;

        /// Opaque geometry: color and depth writes, depth test, back-face culling.
        const DEFAULT = Self::WRITE_RGB.bits()
            | Self::WRITE_A.bits()
            | Self::WRITE_Z.bits()
            | Self::DEPTH_TEST_LESS.bits()
            | Self::CULL_CW.bits()
            | Self::MSAA.bits();
        /// Depth-only geometry, as rendered into shadow maps.
        const DEPTH_ONLY = Self::WRITE_Z.bits() | Self::DEPTH_TEST_LESS.bits();
    }
}

impl Default for RenderState {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl RenderState {
    /// Returns the culling bits of this state.
    pub fn culling(&self) -> Self {
        *self & (Self::CULL_CW | Self::CULL_CCW)
    }
}

bitflags! {
    /// Buffers cleared when a view starts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u8 {
        /// Clear the color attachments.
        const COLOR = 1 << 0;
        /// Clear the depth attachment.
        const DEPTH = 1 << 1;
        /// Clear the stencil attachment.
        const STENCIL = 1 << 2;
    }
}

/// The clear operation of a view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewClear {
    /// Which buffers to clear.
    pub flags: ClearFlags,
    /// Clear color.
    pub color: LinearRgba,
    /// Clear depth.
    pub depth: f32,
    /// Clear stencil value.
    pub stencil: u8,
}

impl ViewClear {
    /// Clears depth to the far plane and nothing else.
    pub const DEPTH: Self = Self {
        flags: ClearFlags::DEPTH,
        color: LinearRgba::TRANSPARENT,
        depth: 1.0,
        stencil: 0,
    };
}

/// A viewport rectangle in texels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ViewRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

impl ViewRect {
    /// Creates a rectangle.
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}
