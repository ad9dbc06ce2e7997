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

use crate::math::{LinearRgba, Vec2};
use std::fmt::Debug;

/// Immediate debug geometry drawn on top of the frame.
pub trait AuxGeometry: Send + Sync + Debug {
    /// Draws alpha-blended screen-space line segments.
    ///
    /// `points` holds pairs of segment end points in pixels.
    fn draw_lines_2d(&self, points: &[Vec2], color: LinearRgba);
}
