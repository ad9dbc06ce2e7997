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

//! Defines the hierarchy of error types for the scene pass layer.

use crate::renderer::api::TargetSlot;
use std::fmt;

/// A broken programming contract between a scene pass and its caller.
///
/// These are never retried. Fatal kinds stop the frame in strict mode; the
/// remaining kinds are diagnostics and the pass carries on with what it was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractViolation {
    /// A pass drawing compiled render objects was bound to a stage outside the
    /// range that keeps a compiled-object cache.
    InvalidSceneStage {
        /// The stage that was requested.
        stage: u32,
        /// The exclusive upper bound for compiled-object stages.
        max: u32,
    },
    /// `begin_execution` was called while another execution was still open on
    /// the same pipeline.
    ReentrantExecution {
        /// The label of the pass that tried to begin.
        pass: String,
    },
    /// `end_execution` was called without a matching `begin_execution`.
    UnbalancedEndExecution {
        /// The label of the pass that tried to end.
        pass: String,
    },
    /// Render items were submitted to a pass that is not executing.
    NotExecuting {
        /// The label of the pass that received the draw.
        pass: String,
    },
    /// Two bound color targets have different widths.
    ColorTargetSizeMismatch {
        /// The slot whose width disagrees with the first bound color target.
        slot: usize,
        /// Width of the first bound color target.
        expected: u32,
        /// Width found in `slot`.
        found: u32,
    },
    /// The depth target is narrower than one of the color targets.
    DepthTargetTooSmall {
        /// Width of the depth target.
        depth_width: u32,
        /// Width of the widest color target.
        color_width: u32,
    },
    /// A target was exchanged that has no device storage behind it.
    MissingDeviceStorage {
        /// The attachment that received the target.
        slot: TargetSlot,
    },
    /// A color slot outside the attachment range was addressed.
    InvalidTargetSlot {
        /// The slot index that was requested.
        slot: usize,
    },
    /// The resource layout or the per-pass resource set was never assigned.
    MissingPassResources {
        /// The label of the incomplete pass.
        pass: String,
    },
    /// Recording was attempted before `prepare_for_use` compiled the render pass.
    RenderPassNotPrepared {
        /// The label of the unprepared pass.
        pass: String,
    },
    /// A draw range reached past the end of its render list.
    ItemRangeOutOfBounds {
        /// Requested start index.
        start: usize,
        /// Requested end index.
        end: usize,
        /// Number of items in the list.
        len: usize,
    },
}

impl ContractViolation {
    /// Returns `true` when the violation must stop the frame in strict mode.
    ///
    /// Target validation and range clamping only produce diagnostics.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            ContractViolation::ColorTargetSizeMismatch { .. }
                | ContractViolation::DepthTargetTooSmall { .. }
                | ContractViolation::MissingDeviceStorage { .. }
                | ContractViolation::ItemRangeOutOfBounds { .. }
        )
    }
}

impl fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractViolation::InvalidSceneStage { stage, max } => write!(
                f,
                "Stage {stage} cannot draw compiled render objects (limit is {max})"
            ),
            ContractViolation::ReentrantExecution { pass } => {
                write!(f, "Pass '{pass}' began execution while another execution is open")
            }
            ContractViolation::UnbalancedEndExecution { pass } => {
                write!(f, "Pass '{pass}' ended an execution that was never begun")
            }
            ContractViolation::NotExecuting { pass } => {
                write!(f, "Pass '{pass}' received render items outside of an execution")
            }
            ContractViolation::ColorTargetSizeMismatch {
                slot,
                expected,
                found,
            } => write!(
                f,
                "Color targets are of different size: slot {slot} is {found} wide, expected {expected}"
            ),
            ContractViolation::DepthTargetTooSmall {
                depth_width,
                color_width,
            } => write!(
                f,
                "Depth target is smaller than the color target(s): {depth_width} < {color_width}"
            ),
            ContractViolation::MissingDeviceStorage { slot } => {
                write!(f, "Target exchanged into {slot} has no device storage")
            }
            ContractViolation::InvalidTargetSlot { slot } => {
                write!(f, "Color target slot {slot} is out of range")
            }
            ContractViolation::MissingPassResources { pass } => {
                write!(f, "Pass '{pass}' has no resource layout or per-pass resource set")
            }
            ContractViolation::RenderPassNotPrepared { pass } => {
                write!(f, "Pass '{pass}' was recorded before being prepared for use")
            }
            ContractViolation::ItemRangeOutOfBounds { start, end, len } => write!(
                f,
                "Render item range {start}..{end} exceeds list length {len}"
            ),
        }
    }
}

impl std::error::Error for ContractViolation {}

/// An error related to the creation or use of a GPU resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// A generic resource could not be found.
    NotFound,
    /// The handle or ID used to reference a resource is invalid.
    InvalidHandle,
    /// An error originating from the specific graphics backend implementation.
    BackendError(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::NotFound => write!(f, "Resource not found with ID."),
            ResourceError::InvalidHandle => write!(f, "Invalid resource handle or ID."),
            ResourceError::BackendError(msg) => {
                write!(f, "Backend-specific resource error: {msg}")
            }
        }
    }
}

impl std::error::Error for ResourceError {}

/// A high-level error returned by scene pass operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// A programming contract was broken by the caller.
    Contract(ContractViolation),
    /// The device failed to create or access a resource.
    Resource(ResourceError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Contract(err) => write!(f, "Contract violation: {err}"),
            RenderError::Resource(err) => write!(f, "Graphics resource operation failed: {err}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Contract(err) => Some(err),
            RenderError::Resource(err) => Some(err),
        }
    }
}

impl From<ContractViolation> for RenderError {
    fn from(err: ContractViolation) -> Self {
        RenderError::Contract(err)
    }
}

impl From<ResourceError> for RenderError {
    fn from(err: ResourceError) -> Self {
        RenderError::Resource(err)
    }
}
