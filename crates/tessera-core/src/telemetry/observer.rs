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

//! Pluggable draw-call instrumentation.

use std::fmt::Debug;

use crate::renderer::api::PassContext;
use crate::renderer::error::ContractViolation;

/// Receives notifications about the work a scene pass produces.
///
/// A pass asks [`DrawCallObserver::is_enabled`] once when it builds the
/// template for a list submission; disabled observers are not attached to the
/// resulting contexts and cost nothing on the dispatch path.
pub trait DrawCallObserver: Send + Sync + Debug {
    /// Returns `true` when the observer currently wants per-context notifications.
    fn is_enabled(&self) -> bool;

    /// Called once for every pass context when it is dispatched to its render view.
    fn on_pass_context(&self, context: &PassContext);

    /// Called for every contract violation reported by a pass.
    ///
    /// This default implementation does nothing.
    fn on_contract_violation(&self, pass: &str, violation: &ContractViolation) {
        let _ = (pass, violation);
    }
}
