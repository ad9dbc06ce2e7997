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

use crate::renderer::api::{ScenePassId, ScreenRect};
use crate::renderer::error::RenderError;
use crate::renderer::traits::CommandRecorder;

/// The recording surface of a configured scene pass.
///
/// Every method takes `&self` and may be called from several worker threads at
/// once, each with its own recorder. Configuration is frozen while recording.
pub trait SceneRenderPass: Send + Sync {
    /// The unique id of the pass inside its pipeline.
    fn id(&self) -> ScenePassId;

    /// A human-readable label used in logs and profiler sections.
    fn label(&self) -> &str;

    /// Begins the compiled render pass on `recorder` and binds the pass state.
    ///
    /// `use_near` selects the near viewport used by nearest-object lists.
    fn begin_render_pass(
        &self,
        recorder: &mut dyn CommandRecorder,
        use_near: bool,
    ) -> Result<(), RenderError>;

    /// Ends the render pass and resets the state `begin_render_pass` changed.
    fn end_render_pass(
        &self,
        recorder: &mut dyn CommandRecorder,
        use_near: bool,
    ) -> Result<(), RenderError>;

    /// Copies the scene color over `bounds` so refractive items can sample it.
    ///
    /// Returns `true` when a copy was recorded; empty bounds record nothing.
    fn resolve_pass(&self, recorder: &mut dyn CommandRecorder, bounds: ScreenRect) -> bool;

    /// Replays the contexts queued while executing in deferred mode and returns
    /// how many were dispatched.
    fn execute(&self) -> usize;
}
