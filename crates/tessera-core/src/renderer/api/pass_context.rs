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

//! Pass contexts: the schedulable units of work a scene pass produces per frame.

use std::ops::Range;
use std::sync::Arc;

use super::flags::BatchFlags;
use super::scene::{RenderListId, ShaderTechnique, StereoEye};
use super::viewport::ScreenRect;
use crate::renderer::traits::{PassScheduler, RenderView};
use crate::telemetry::DrawCallObserver;

/// A unique identifier for a scene pass, allocated by its pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScenePassId(pub u64);

/// How the contexts produced while a pass executes are submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SubmissionMode {
    /// Contexts are dispatched to their render view as soon as they are planned.
    #[default]
    Immediate,
    /// Contexts are queued on the pass and replayed later by `execute`.
    Deferred,
}

impl SubmissionMode {
    /// Chooses the mode for a frame from the state of the pass scheduler.
    ///
    /// Decide once per frame and hand the result to every `begin_execution`.
    pub fn for_frame(scheduler: &dyn PassScheduler) -> Self {
        if scheduler.is_active() {
            SubmissionMode::Deferred
        } else {
            SubmissionMode::Immediate
        }
    }

    /// Returns `true` for [`SubmissionMode::Deferred`].
    pub fn is_deferred(self) -> bool {
        self == SubmissionMode::Deferred
    }
}

/// What a pass context does when it is dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassContextKind {
    /// Draw the half-open range of items of the context's render list.
    Draw {
        /// Item indices into the render view's list.
        items: Range<usize>,
    },
    /// Copy the current scene color over `bounds` so following items can sample it.
    Resolve {
        /// Screen area to copy; may be empty, in which case the copy is skipped.
        bounds: ScreenRect,
    },
}

/// One schedulable unit of work of a scene pass.
///
/// Resolve contexts carry the same pass identity as the draw contexts around
/// them so that backends and profilers can attribute them to the pass.
#[derive(Debug, Clone)]
pub struct PassContext {
    /// Draw range or inline resolve.
    pub kind: PassContextKind,
    /// The render view that owns the items and dispatches the context.
    pub view: Arc<dyn RenderView>,
    /// The scene pass that produced the context.
    pub pass: ScenePassId,
    /// Technique the items are drawn with.
    pub technique: ShaderTechnique,
    /// Items must carry one of these flags to be drawn.
    pub batch_filter: BatchFlags,
    /// Items carrying one of these flags are skipped.
    pub exclude_filter: BatchFlags,
    /// Pipeline stage of the owning pass.
    pub stage: u32,
    /// Sub-pass inside the stage.
    pub sub_pass: u32,
    /// The list the item range indexes into.
    pub render_list: RenderListId,
    /// Whether the near viewport applies to these items.
    pub render_nearest: bool,
    /// Ordinal of this context inside its pass for the current execution.
    pub render_item_group: u32,
    /// Eye the render view was rendering when the context was planned.
    pub eye: StereoEye,
    /// Profiler section opened by the pass, if a profiler is attached.
    pub profiler_section_index: Option<u32>,
    /// Caller-chosen id used to group statistics of one list submission.
    pub profiling_list_id: u32,
    /// Receives draw-call notifications when statistics collection is enabled.
    pub observer: Option<Arc<dyn DrawCallObserver>>,
}

impl PassContext {
    /// Returns the item range of a draw context.
    pub fn items(&self) -> Option<Range<usize>> {
        match &self.kind {
            PassContextKind::Draw { items } => Some(items.clone()),
            PassContextKind::Resolve { .. } => None,
        }
    }

    /// Returns the copy area of a resolve context.
    pub fn resolve_bounds(&self) -> Option<ScreenRect> {
        match self.kind {
            PassContextKind::Resolve { bounds } => Some(bounds),
            PassContextKind::Draw { .. } => None,
        }
    }

    /// Returns `true` for a resolve context.
    pub fn is_resolve(&self) -> bool {
        matches!(self.kind, PassContextKind::Resolve { .. })
    }
}
