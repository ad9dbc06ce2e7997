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

//! Resource bindings, rasterizer bias and texture copy regions.

use bitflags::bitflags;

/// An opaque handle to a resource layout (the shape of all bound resource sets).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceLayoutId(pub usize);

/// An opaque handle to a set of bound resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceSetId(pub usize);

/// The slot of a resource layout a resource set is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceLayoutSlot {
    /// Resources shared by every item drawn in one pass.
    PerPass,
    /// Resources owned by one draw.
    PerDraw,
}

/// Rasterizer depth bias applied while a pass is recording.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DepthBias {
    /// Constant depth offset.
    pub constant: f32,
    /// Slope-scaled depth offset.
    pub slope: f32,
    /// Maximum bias.
    pub clamp: f32,
}

impl DepthBias {
    /// No bias.
    pub const NONE: Self = Self {
        constant: 0.0,
        slope: 0.0,
        clamp: 0.0,
    };
}

bitflags! {
    /// Hints attached to a texture copy.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CopyFlags: u32 {
        /// The copy does not overwrite data in use and may be issued from a
        /// concurrent job.
        const NO_OVERWRITE_CONCURRENT = 1 << 0;
    }
}

/// A texel coordinate inside a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TexelOrigin {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

/// The size of a copied region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CopyExtent {
    /// Columns copied.
    pub width: u32,
    /// Rows copied.
    pub height: u32,
    /// Depth slices copied.
    pub depth: u32,
}

impl CopyExtent {
    /// Returns `true` when the extent covers no texel.
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.depth == 0
    }
}

/// Maps a source region of one texture onto a destination region of another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextureRegionMapping {
    /// Where reading starts in the source.
    pub source_origin: TexelOrigin,
    /// Where writing starts in the destination.
    pub destination_origin: TexelOrigin,
    /// Size of the copied region.
    pub extent: CopyExtent,
    /// Copy hints.
    pub flags: CopyFlags,
}
