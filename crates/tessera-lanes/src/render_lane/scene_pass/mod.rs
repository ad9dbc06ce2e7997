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

//! Scene passes and the machinery that plans, records and replays their work.
//!
//! A [`ScenePass`] is configured once per frame, then executes: every call to
//! [`ScenePass::draw_render_items`] runs the [`PassBatchPlanner`] over a range of
//! a render list and either dispatches the resulting pass contexts right away
//! or queues them for the [`DeferredPassScheduler`] to replay.

mod context;
mod pass;
mod planner;
mod recording;
mod resolve_bounds;
mod scheduler;

pub use self::context::{ContractPolicy, ScenePipelineContext};
pub use self::pass::ScenePass;
pub use self::planner::PassBatchPlanner;
pub use self::recording::record_pass_context;
pub use self::resolve_bounds::compute_resolve_viewport;
pub use self::scheduler::DeferredPassScheduler;
