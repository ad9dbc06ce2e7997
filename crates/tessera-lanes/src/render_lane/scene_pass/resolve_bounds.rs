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

//! Screen area of inline resolves.

use tessera_core::math::Aabb;
use tessera_core::renderer::{Camera, ScreenRect, Viewport};

/// Computes the screen rectangle an inline resolve must copy before the item
/// bounded by `bounds` is drawn.
///
/// Returns the full `[0, 0, width, height]` viewport when partial resolves are
/// disabled, when `force_fullscreen` is set, when the bounds are invalid, or when
/// part of the box lies behind the camera. Otherwise the projected box is
/// clamped to the viewport; a box entirely off screen yields an empty rectangle.
pub fn compute_resolve_viewport(
    viewport: &Viewport,
    bounds: &Aabb,
    camera: &Camera,
    force_fullscreen: bool,
    partial_resolves_enabled: bool,
) -> ScreenRect {
    let width = viewport.width.max(0.0) as u32;
    let height = viewport.height.max(0.0) as u32;
    let full = ScreenRect::full(width as i32, height as i32);

    if !partial_resolves_enabled || force_fullscreen || !bounds.is_valid() {
        return full;
    }

    camera
        .calc_screen_bounds(bounds, width, height)
        .unwrap_or(full)
}
