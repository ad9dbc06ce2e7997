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

use crate::renderer::api::{
    BatchFlags, Camera, PassContext, RenderItem, RenderListId, StereoEye, Viewport,
};
use crate::renderer::traits::SceneRenderPass;
use std::fmt::Debug;

/// The scene-side owner of sorted render items for one view of the frame.
///
/// A render view is shared between the thread planning a pass and the worker
/// threads replaying it, so every method takes `&self`.
pub trait RenderView: Send + Sync + Debug {
    /// Returns the ordered items of `list`.
    fn render_items(&self, list: RenderListId) -> &[RenderItem];

    /// Returns the union of the batch flags of every item in `list`.
    fn batch_flags(&self, list: RenderListId) -> BatchFlags;

    /// Returns the eye currently being rendered.
    fn current_eye(&self) -> StereoEye;

    /// Returns the camera used for `eye`.
    fn camera(&self, eye: StereoEye) -> Camera;

    /// Returns the viewport the view renders into.
    fn viewport(&self) -> Viewport;

    /// Records the work described by `context` on behalf of `pass`.
    ///
    /// Draw contexts bracket their items with `pass.begin_render_pass` and
    /// `pass.end_render_pass`; resolve contexts call `pass.resolve_pass`.
    fn draw_compiled_render_items(&self, pass: &dyn SceneRenderPass, context: &PassContext);
}
