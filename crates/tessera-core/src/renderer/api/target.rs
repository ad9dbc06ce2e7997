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

//! Render targets, attachment bindings and the render-pass descriptor.

use crate::renderer::error::ContractViolation;
use std::fmt;

/// The number of color attachments a scene pass can bind.
pub const MAX_COLOR_TARGETS: usize = 4;

/// An opaque handle to a texture owned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub usize);

/// An opaque handle selecting a sub-resource view of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceViewHandle(pub u32);

impl ResourceViewHandle {
    /// The texture's default view covering every sub-resource.
    pub const DEFAULT: Self = Self(0);
}

impl Default for ResourceViewHandle {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// An opaque handle to a compiled, backend-side render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderPassId(pub u64);

/// What a scene pass needs to know about a texture it renders into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetTexture {
    /// The backend texture.
    pub id: TextureId,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Whether device memory currently backs this texture.
    pub has_device_storage: bool,
}

impl TargetTexture {
    /// Describes a texture that already has device storage.
    pub const fn new(id: TextureId, width: u32, height: u32) -> Self {
        Self {
            id,
            width,
            height,
            has_device_storage: true,
        }
    }
}

/// A texture bound to an attachment point, together with the view used to bind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttachmentBinding {
    /// The bound texture.
    pub texture: TargetTexture,
    /// The sub-resource view.
    pub view: ResourceViewHandle,
}

/// Identifies one attachment point of a render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetSlot {
    /// A color attachment index.
    Color(usize),
    /// The depth-stencil attachment.
    Depth,
}

impl fmt::Display for TargetSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetSlot::Color(slot) => write!(f, "color slot {slot}"),
            TargetSlot::Depth => write!(f, "the depth slot"),
        }
    }
}

/// The attachments of a render pass: up to [`MAX_COLOR_TARGETS`] color targets
/// and one depth target.
///
/// Backends compile this into a [`RenderPassId`]; the scene pass compares the
/// current descriptor against the one it compiled to detect staleness.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RenderPassDescriptor {
    /// Color attachments, indexed by slot.
    pub color_targets: [Option<AttachmentBinding>; MAX_COLOR_TARGETS],
    /// Depth-stencil attachment.
    pub depth_target: Option<AttachmentBinding>,
}

impl RenderPassDescriptor {
    /// Binds `texture` (or clears the binding) in color `slot`.
    pub fn set_color_target(
        &mut self,
        slot: usize,
        texture: Option<TargetTexture>,
        view: ResourceViewHandle,
    ) -> Result<(), ContractViolation> {
        let entry = self
            .color_targets
            .get_mut(slot)
            .ok_or(ContractViolation::InvalidTargetSlot { slot })?;
        *entry = texture.map(|texture| AttachmentBinding { texture, view });
        Ok(())
    }

    /// Binds `texture` (or clears the binding) as the depth target.
    pub fn set_depth_target(&mut self, texture: Option<TargetTexture>, view: ResourceViewHandle) {
        self.depth_target = texture.map(|texture| AttachmentBinding { texture, view });
    }

    /// Iterates the bound color targets with their slot index.
    pub fn bound_color_targets(&self) -> impl Iterator<Item = (usize, &AttachmentBinding)> {
        self.color_targets
            .iter()
            .enumerate()
            .filter_map(|(slot, binding)| binding.as_ref().map(|b| (slot, b)))
    }

    /// Returns `true` when nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.depth_target.is_none() && self.color_targets.iter().all(Option::is_none)
    }
}
