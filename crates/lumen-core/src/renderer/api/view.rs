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

//! The camera state a frame is rendered from.

use crate::math::{Mat4, Vec3, Vec4, EPSILON};

/// View and projection matrices of a camera.
///
/// Projections follow glam's right-handed convention with a `[0, 1]` depth
/// range, so the camera looks down `-Z` in view space. Both perspective and
/// orthographic projections are supported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    /// World to view transform.
    pub view: Mat4,
    /// View to clip transform.
    pub proj: Mat4,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            proj: Mat4::IDENTITY,
        }
    }
}

impl ViewState {
    /// Creates a view state.
    pub fn new(view: Mat4, proj: Mat4) -> Self {
        Self { view, proj }
    }

    /// Returns the combined view-projection matrix.
    pub fn view_proj(&self) -> Mat4 {
        self.proj * self.view
    }

    /// Returns the camera position in world space.
    pub fn eye(&self) -> Vec3 {
        self.view.inverse().w_axis.truncate()
    }

    /// Unprojects an NDC point into view space.
    ///
    /// Returns `None` for points at infinity (the far plane of an infinite projection).
    fn unproject(&self, ndc: Vec3) -> Option<Vec3> {
        let p = self.proj.inverse() * Vec4::new(ndc.x, ndc.y, ndc.z, 1.0);
        (p.w.abs() > EPSILON).then(|| p.truncate() / p.w)
    }

    /// Returns the near and far clip distances along the view axis.
    ///
    /// `far` is `f32::INFINITY` for infinite projections. Reversed-Z projections
    /// are not supported.
    pub fn clip_range(&self) -> (f32, f32) {
        let near = self.unproject(Vec3::ZERO).map_or(0.0, |p| -p.z);
        let far = self.unproject(Vec3::Z).map_or(f32::INFINITY, |p| -p.z);
        (near, far)
    }

    /// Returns the 8 world-space corners of the frustum slice between the view
    /// distances `near` and `far`.
    ///
    /// The first four corners lie on the `near` plane, the last four on `far`.
    pub fn slice_corners(&self, near: f32, far: f32) -> [Vec3; 8] {
        const XY: [(f32, f32); 4] = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

        let inv_view = self.view.inverse();
        let mut corners = [Vec3::ZERO; 8];
        for (i, (x, y)) in XY.iter().enumerate() {
            let n = self.unproject(Vec3::new(*x, *y, 0.0)).unwrap_or(Vec3::ZERO);
            let at = |distance: f32| match self.unproject(Vec3::new(*x, *y, 1.0)) {
                Some(f) if (f.z - n.z).abs() > EPSILON => {
                    let t = (distance + n.z) / (n.z - f.z);
                    n + (f - n) * t
                }
                // Infinite projection: the corner ray passes through the eye.
                _ if n.z.abs() > EPSILON => n * (distance / -n.z),
                _ => Vec3::new(n.x, n.y, -distance),
            };
            corners[i] = inv_view.transform_point3(at(near));
            corners[i + 4] = inv_view.transform_point3(at(far));
        }
        corners
    }
}
