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

//! Flag sets describing render items and scene passes.

use bitflags::bitflags;

bitflags! {
    /// Properties of a render item, aggregated per render list by the render view.
    ///
    /// A pass filter of [`BatchFlags::all()`] accepts every list.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BatchFlags: u32 {
        /// Written to the depth pre-pass.
        const Z_PREPASS = 1 << 0;
        /// Drawn into the geometry buffer.
        const GENERAL = 1 << 1;
        /// Alpha blended.
        const TRANSPARENT = 1 << 2;
        /// Samples the scene behind it and needs an inline resolve first.
        const REFRACTION = 1 << 3;
        /// Like [`BatchFlags::REFRACTION`] but the resolve must cover the whole viewport.
        const RESOLVE_FULL = 1 << 4;
        /// Renders with the custom render pass.
        const CUSTOM_RENDER_PASS = 1 << 5;
        /// Receives decals.
        const DECAL = 1 << 6;
        /// Drawn into the motion-vector pass.
        const MOTION_BLUR = 1 << 7;
        /// Rendered after the post-effects.
        const AFTER_POST_PROCESS = 1 << 8;
        /// Tessellated geometry.
        const TESSELLATION = 1 << 9;
        /// Casts shadows.
        const SHADOW_CASTER = 1 << 10;
        /// Rendered in the forward-only tiled pass.
        const TILED_FORWARD = 1 << 11;
    }
}

impl BatchFlags {
    /// Flags that make an item require an inline resolve before it draws.
    pub const RESOLVE_MASK: Self = Self::REFRACTION.union(Self::RESOLVE_FULL);

    /// Returns `true` when an item with these flags needs an inline resolve.
    #[inline]
    pub fn needs_resolve(self) -> bool {
        self.intersects(Self::RESOLVE_MASK)
    }
}

bitflags! {
    /// Configuration switches of a scene pass.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PassFlags: u32 {
        /// Depth is stored reversed (`1` near, `0` far).
        const REVERSE_DEPTH = 1 << 0;
        /// The pass renders nearest-object lists into a restricted depth range.
        const RENDER_NEAREST = 1 << 1;
        /// Viewport setup is delegated to the stereo projection subsystem.
        const STEREO_PROJECTION = 1 << 2;
        /// The stereo subsystem applies its projection state and must restore it afterwards.
        const USE_STEREO_STATE = 1 << 3;
        /// The stereo subsystem must provide its projection constants.
        const REQUIRE_STEREO_CONSTANTS = 1 << 4;
    }
}
