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
    DepthBias, RenderPassId, ResourceLayoutId, ResourceLayoutSlot, ResourceSetId, ScissorRect,
    TextureId, TextureRegionMapping, Viewport,
};

/// A trait for an object that records a sequence of GPU commands.
///
/// Each worker thread records into its own recorder, so methods take `&mut self`
/// while the scene pass driving them is shared.
pub trait CommandRecorder: Send {
    /// Begins `pass`, limiting rasterization to `scissor`.
    fn begin_render_pass(&mut self, pass: RenderPassId, scissor: &ScissorRect);

    /// Ends `pass`.
    fn end_render_pass(&mut self, pass: RenderPassId);

    /// Sets the active viewports.
    fn set_viewports(&mut self, viewports: &[Viewport]);

    /// Sets the active scissor rectangles.
    fn set_scissor_rects(&mut self, rects: &[ScissorRect]);

    /// Binds the resource layout all following resource sets must match.
    fn set_resource_layout(&mut self, layout: ResourceLayoutId);

    /// Binds a resource set to `slot` of the current layout.
    fn set_resources(&mut self, slot: ResourceLayoutSlot, set: ResourceSetId);

    /// Sets the rasterizer depth bias.
    fn set_depth_bias(&mut self, bias: DepthBias);

    /// Transitions the attachments of `pass` into the states the pass needs.
    fn prepare_render_pass_for_use(&mut self, pass: RenderPassId);

    /// Transitions the resources of `set` into the states `slot` needs.
    fn prepare_resources_for_use(&mut self, slot: ResourceLayoutSlot, set: ResourceSetId);

    /// Copies a region of `source` into `destination`.
    fn copy_texture_region(
        &mut self,
        source: TextureId,
        destination: TextureId,
        mapping: &TextureRegionMapping,
    );

    /// Returns `true` when depth bias is dynamic state that must be set while recording.
    ///
    /// Backends baking the bias into pipeline state objects return `false`.
    fn uses_dynamic_depth_bias(&self) -> bool {
        true
    }
}
