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

use crate::renderer::api::{RenderPassDescriptor, RenderPassId};
use crate::renderer::error::ResourceError;
use std::fmt::Debug;

/// The device-side services a scene pass needs: compiling its attachments into
/// a render-pass object and releasing stale ones.
pub trait GraphicsDevice: Send + Sync + Debug + 'static {
    /// Creates a render pass from the provided descriptor.
    /// ## Arguments
    /// * `descriptor` - The attachments the render pass binds.
    /// ## Returns
    /// A `Result` containing the ID of the created render pass or an error if the creation fails.
    /// ## Errors
    /// * `ResourceError` - If the backend rejects the descriptor.
    fn create_render_pass(
        &self,
        descriptor: &RenderPassDescriptor,
    ) -> Result<RenderPassId, ResourceError>;

    /// Releases the render pass associated with the given ID.
    /// ## Errors
    /// * `ResourceError` - If the ID is unknown to the device.
    fn release_render_pass(&self, id: RenderPassId) -> Result<(), ResourceError>;
}
