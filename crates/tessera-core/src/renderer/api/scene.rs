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

//! Scene-side inputs of a scene pass: render lists, render items and cameras.

use super::flags::BatchFlags;
use super::viewport::ScreenRect;
use crate::math::{Aabb, Mat4, Vec4, EPSILON};

/// The number of pipeline stages that keep a per-stage cache inside compiled
/// render objects. Passes drawing compiled objects must use a stage below this.
pub const MAX_PIPELINE_SCENE_STAGES: u32 = 8;

/// Identifies one of the render lists a render view sorts its items into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderListId {
    /// Depth-only pre-pass items.
    ZPrepass,
    /// Opaque geometry buffer items.
    General,
    /// Terrain layers.
    TerrainLayer,
    /// Deferred decals.
    Decal,
    /// Opaque items drawn in the forward pass.
    ForwardOpaque,
    /// Forward opaque items of the nearest (first person) layer.
    ForwardOpaqueNearest,
    /// Opaque items of the nearest layer.
    NearestObjects,
    /// Water surfaces.
    Water,
    /// Blended items.
    Transparent,
    /// Blended items of the nearest layer.
    TransparentNearest,
    /// Half resolution particles.
    HalfResParticles,
    /// Items rendered after the post-effects.
    AfterPostProcess,
    /// Items drawn with a custom pass.
    Custom,
}

impl RenderListId {
    /// Returns `true` for the lists of the nearest depth layer.
    pub const fn is_nearest(self) -> bool {
        matches!(
            self,
            RenderListId::NearestObjects
                | RenderListId::ForwardOpaqueNearest
                | RenderListId::TransparentNearest
        )
    }

    /// Returns `true` for the blended lists, the only ones that may need inline resolves.
    pub const fn is_transparent(self) -> bool {
        matches!(
            self,
            RenderListId::Transparent | RenderListId::TransparentNearest
        )
    }
}

/// Selects the shader technique items are drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShaderTechnique {
    /// The default lit technique.
    #[default]
    General,
    /// Depth pre-pass.
    ZPrepass,
    /// Geometry buffer fill.
    ZPass,
    /// Shadow map generation.
    ShadowGen,
    /// Motion vectors.
    MotionBlur,
    /// Custom render pass.
    Custom,
    /// Debug visualisation.
    Debug,
}

/// The eye a stereo view is rendering for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StereoEye {
    /// Left eye, also used for mono rendering.
    #[default]
    Left,
    /// Right eye.
    Right,
}

/// An opaque handle to a renderable compiled by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompiledObjectId(pub u64);

/// One draw unit as the render view sorted it into a list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderItem {
    /// Properties used for filtering and resolve detection.
    pub batch_flags: BatchFlags,
    /// World-space bounds of the compiled object.
    pub bounds: Aabb,
    /// The object to dispatch.
    pub object: CompiledObjectId,
}

/// The view and projection a render view draws with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// World to view transform.
    pub view: Mat4,
    /// View to clip transform.
    pub projection: Mat4,
}

impl Camera {
    /// Creates a camera from its two matrices.
    pub const fn new(view: Mat4, projection: Mat4) -> Self {
        Self { view, projection }
    }

    /// The combined world to clip transform.
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// Projects `aabb` onto a `width × height` screen and returns the covered
    /// pixel rectangle, clamped to the screen.
    ///
    /// Returns `None` when a corner lies on or behind the camera plane, where the
    /// perspective divide no longer yields a bounding rectangle.
    pub fn calc_screen_bounds(&self, aabb: &Aabb, width: u32, height: u32) -> Option<ScreenRect> {
        let view_proj = self.view_projection();
        let (w, h) = (width as f32, height as f32);

        let mut min_x = f32::INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut max_y = f32::NEG_INFINITY;

        for corner in aabb.corners() {
            let clip = view_proj * Vec4::new(corner.x, corner.y, corner.z, 1.0);
            if clip.w <= EPSILON {
                return None;
            }
            let ndc_x = clip.x / clip.w;
            let ndc_y = clip.y / clip.w;
            // NDC y points up, screen rows grow downwards.
            let sx = (ndc_x * 0.5 + 0.5) * w;
            let sy = (0.5 - ndc_y * 0.5) * h;
            min_x = min_x.min(sx);
            max_x = max_x.max(sx);
            min_y = min_y.min(sy);
            max_y = max_y.max(sy);
        }

        Some(ScreenRect::new(
            min_x.clamp(0.0, w).floor() as i32,
            min_y.clamp(0.0, h).floor() as i32,
            max_x.clamp(0.0, w).ceil() as i32,
            max_y.clamp(0.0, h).ceil() as i32,
        ))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY)
    }
}
