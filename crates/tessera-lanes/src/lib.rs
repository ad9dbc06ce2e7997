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

//! # Tessera Lanes
//!
//! Hot-path execution of scene passes: resolve bounds, batch planning, pass
//! recording, and deferred replay. Everything here talks to the GPU and to the
//! scene only through the contracts of `tessera-core`.

#![warn(missing_docs)]

pub mod render_lane;

pub use self::render_lane::scene_pass::{
    compute_resolve_viewport, record_pass_context, ContractPolicy, DeferredPassScheduler,
    PassBatchPlanner, ScenePass, ScenePipelineContext,
};
