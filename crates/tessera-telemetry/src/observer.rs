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

//! A draw-call observer that counts what it sees.

use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use tessera_core::renderer::{ContractViolation, PassContext, PassContextKind};
use tessera_core::telemetry::DrawCallObserver;

/// Counters collected by a [`CountingObserver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DrawCallSnapshot {
    /// Draw contexts dispatched.
    pub draw_contexts: u64,
    /// Resolve contexts dispatched.
    pub resolve_contexts: u64,
    /// Render items covered by the dispatched draw contexts.
    pub drawn_items: u64,
    /// Contract violations reported.
    pub contract_violations: u64,
}

/// Counts dispatched pass contexts and keeps the reported contract violations.
///
/// Toggle it with [`CountingObserver::set_enabled`]; passes stop attaching it to
/// new contexts while it is disabled.
#[derive(Debug)]
pub struct CountingObserver {
    enabled: AtomicBool,
    draw_contexts: AtomicU64,
    resolve_contexts: AtomicU64,
    drawn_items: AtomicU64,
    violations: Mutex<Vec<(String, ContractViolation)>>,
}

impl CountingObserver {
    /// Creates an enabled observer with zeroed counters.
    pub fn new() -> Self {
        Self {
            enabled: AtomicBool::new(true),
            draw_contexts: AtomicU64::new(0),
            resolve_contexts: AtomicU64::new(0),
            drawn_items: AtomicU64::new(0),
            violations: Mutex::new(Vec::new()),
        }
    }

    /// Enables or disables per-context notifications.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Returns the current counters.
    pub fn snapshot(&self) -> DrawCallSnapshot {
        DrawCallSnapshot {
            draw_contexts: self.draw_contexts.load(Ordering::Relaxed),
            resolve_contexts: self.resolve_contexts.load(Ordering::Relaxed),
            drawn_items: self.drawn_items.load(Ordering::Relaxed),
            contract_violations: self.lock_violations().len() as u64,
        }
    }

    /// Returns the violations reported so far, with the label of the reporting pass.
    pub fn violations(&self) -> Vec<(String, ContractViolation)> {
        self.lock_violations().clone()
    }

    /// Zeroes every counter and forgets the reported violations.
    pub fn reset(&self) {
        self.draw_contexts.store(0, Ordering::Relaxed);
        self.resolve_contexts.store(0, Ordering::Relaxed);
        self.drawn_items.store(0, Ordering::Relaxed);
        self.lock_violations().clear();
    }

    fn lock_violations(&self) -> std::sync::MutexGuard<'_, Vec<(String, ContractViolation)>> {
        self.violations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for CountingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawCallObserver for CountingObserver {
    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    fn on_pass_context(&self, context: &PassContext) {
        match &context.kind {
            PassContextKind::Draw { items } => {
                self.draw_contexts.fetch_add(1, Ordering::Relaxed);
                self.drawn_items
                    .fetch_add(items.len() as u64, Ordering::Relaxed);
            }
            PassContextKind::Resolve { .. } => {
                self.resolve_contexts.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn on_contract_violation(&self, pass: &str, violation: &ContractViolation) {
        debug!("[CountingObserver] '{}' reported: {}", pass, violation);
        self.lock_violations()
            .push((pass.to_owned(), violation.clone()));
    }
}
