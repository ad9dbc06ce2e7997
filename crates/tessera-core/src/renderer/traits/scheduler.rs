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

use crate::renderer::api::ScenePassId;
use std::fmt::Debug;

/// Collects the passes that defer their work during a frame.
///
/// While active, passes queue their contexts instead of dispatching them, and
/// the scheduler replays them once every pass has been planned.
pub trait PassScheduler: Send + Sync + Debug {
    /// Returns `true` when passes should defer their work this frame.
    fn is_active(&self) -> bool;

    /// Registers a pass that began executing in deferred mode.
    fn add_pass(&self, id: ScenePassId, label: &str);
}
