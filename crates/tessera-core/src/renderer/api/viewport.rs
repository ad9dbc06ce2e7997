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

//! Viewports, scissor rectangles and integer screen-space rectangles.

/// Defines the rasterization viewport, mapping normalized device coordinates to
/// window coordinates together with a depth range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Left edge in pixels.
    pub x: f32,
    /// Top edge in pixels.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// Lower bound of the depth range.
    pub min_depth: f32,
    /// Upper bound of the depth range.
    pub max_depth: f32,
}

impl Viewport {
    /// Creates a viewport at the origin covering `width × height` with the full `[0, 1]` depth range.
    pub const fn from_size(width: f32, height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }

    /// Returns the same viewport with its depth range replaced.
    pub const fn with_depth_range(self, min_depth: f32, max_depth: f32) -> Self {
        Self {
            min_depth,
            max_depth,
            ..self
        }
    }

    /// Applies the reverse-depth mapping `d -> 1 - d` to the depth range.
    ///
    /// The bounds swap so that `min_depth <= max_depth` still holds: `[0, N]`
    /// becomes `[1 - N, 1]`.
    pub fn reversed_depth(self) -> Self {
        Self {
            min_depth: 1.0 - self.max_depth,
            max_depth: 1.0 - self.min_depth,
            ..self
        }
    }

    /// Returns the integer scissor rectangle bounding this viewport.
    ///
    /// Each edge is truncated toward zero, the same way the backend converts
    /// float viewports into rectangles.
    pub fn scissor_rect(&self) -> ScissorRect {
        ScissorRect {
            left: self.x as i32,
            top: self.y as i32,
            right: (self.x + self.width) as i32,
            bottom: (self.y + self.height) as i32,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::from_size(0.0, 0.0)
    }
}

/// An integer rectangle limiting rasterization, stored as edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScissorRect {
    /// Left edge (inclusive).
    pub left: i32,
    /// Top edge (inclusive).
    pub top: i32,
    /// Right edge (exclusive).
    pub right: i32,
    /// Bottom edge (exclusive).
    pub bottom: i32,
}

/// An axis-aligned rectangle in integer screen coordinates, `[x0, x1) × [y0, y1)`.
///
/// Resolve passes carry one of these to limit the area of their copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScreenRect {
    /// Left edge.
    pub x0: i32,
    /// Top edge.
    pub y0: i32,
    /// Right edge.
    pub x1: i32,
    /// Bottom edge.
    pub y1: i32,
}

impl ScreenRect {
    /// Creates a rectangle from its four edges.
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Returns the rectangle `[0, 0, width, height]`.
    pub const fn full(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Signed width; negative for inverted rectangles.
    #[inline]
    pub const fn width(&self) -> i32 {
        self.x1 - self.x0
    }

    /// Signed height; negative for inverted rectangles.
    #[inline]
    pub const fn height(&self) -> i32 {
        self.y1 - self.y0
    }

    /// Area in pixels, or `0` when the width or the height is not positive.
    pub fn clamped_area(&self) -> u64 {
        let (w, h) = (self.width(), self.height());
        if w <= 0 || h <= 0 {
            0
        } else {
            w as u64 * h as u64
        }
    }

    /// Returns `true` when the rectangle covers no pixel.
    pub fn is_empty(&self) -> bool {
        self.clamped_area() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn reversed_depth_maps_near_range() {
        let vp = Viewport::from_size(1920.0, 1080.0).with_depth_range(0.0, 0.12);
        let reversed = vp.reversed_depth();
        assert_relative_eq!(reversed.min_depth, 0.88);
        assert_relative_eq!(reversed.max_depth, 1.0);
        assert_eq!(reversed.width, 1920.0);
    }

    #[test]
    fn scissor_truncates_edges() {
        let vp = Viewport {
            x: 10.7,
            y: 0.5,
            width: 100.6,
            height: 50.2,
            min_depth: 0.0,
            max_depth: 1.0,
        };
        let rect = vp.scissor_rect();
        assert_eq!(
            rect,
            ScissorRect {
                left: 10,
                top: 0,
                right: 111,
                bottom: 50
            }
        );
    }

    #[test]
    fn clamped_area_ignores_inverted_rects() {
        assert_eq!(ScreenRect::new(0, 0, 10, 20).clamped_area(), 200);
        assert_eq!(ScreenRect::new(10, 0, 0, 20).clamped_area(), 0);
        // Both extents negative: a plain product would be positive.
        assert_eq!(ScreenRect::new(10, 10, 0, 0).clamped_area(), 0);
        assert!(ScreenRect::new(5, 5, 5, 9).is_empty());
    }
}
