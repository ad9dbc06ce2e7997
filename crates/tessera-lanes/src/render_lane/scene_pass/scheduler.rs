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

//! Deferred replay of scene passes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, warn};
use rayon::prelude::*;
use tessera_core::renderer::{PassScheduler, SceneRenderPass, ScenePassId};

/// Collects the passes that execute in deferred mode and replays them once
/// every pass of the frame has been planned.
///
/// Passes replay in registration order. [`DeferredPassScheduler::execute_parallel`]
/// spreads distinct passes over the rayon pool; the contexts of one pass always
/// replay in the order they were planned.
#[derive(Debug, Default)]
pub struct DeferredPassScheduler {
    active: AtomicBool,
    registered: Mutex<Vec<(ScenePassId, String)>>,
}

impl DeferredPassScheduler {
    /// Creates an inactive scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scheduler that is active from the first frame.
    pub fn active() -> Self {
        let scheduler = Self::new();
        scheduler.set_active(true);
        scheduler
    }

    /// Turns deferred submission on or off for the following frames.
    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::Relaxed);
    }

    /// Returns the ids of the passes registered this frame, in registration order.
    pub fn registered_passes(&self) -> Vec<ScenePassId> {
        self.lock_registered().iter().map(|(id, _)| *id).collect()
    }

    /// Replays the registered passes on the calling thread.
    ///
    /// `passes` may contain passes that did not register; those are skipped.
    /// Returns the number of contexts dispatched.
    pub fn execute(&self, passes: &[&dyn SceneRenderPass]) -> usize {
        self.ordered(passes)
            .into_iter()
            .map(|pass| pass.execute())
            .sum()
    }

    /// Replays the registered passes on the rayon thread pool.
    ///
    /// Returns the number of contexts dispatched.
    pub fn execute_parallel(&self, passes: &[&dyn SceneRenderPass]) -> usize {
        self.ordered(passes)
            .into_par_iter()
            .map(|pass| pass.execute())
            .sum()
    }

    /// Clears the registrations of the finished frame and returns them.
    pub fn end_frame(&self) -> Vec<ScenePassId> {
        std::mem::take(&mut *self.lock_registered())
            .into_iter()
            .map(|(id, _)| id)
            .collect()
    }

    fn ordered<'p>(&self, passes: &[&'p dyn SceneRenderPass]) -> Vec<&'p dyn SceneRenderPass> {
        let registered = self.lock_registered();
        let mut ordered = Vec::with_capacity(registered.len());
        for (id, label) in registered.iter() {
            match passes.iter().find(|pass| pass.id() == *id) {
                Some(pass) => ordered.push(*pass),
                None => warn!(
                    "DeferredPassScheduler: registered pass '{}' was not provided for replay",
                    label
                ),
            }
        }
        if ordered.len() < passes.len() {
            debug!(
                "DeferredPassScheduler: {} provided passes did not register this frame",
                passes.len() - ordered.len()
            );
        }
        ordered
    }

    fn lock_registered(&self) -> MutexGuard<'_, Vec<(ScenePassId, String)>> {
        self.registered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl PassScheduler for DeferredPassScheduler {
    fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    fn add_pass(&self, id: ScenePassId, label: &str) {
        let mut registered = self.lock_registered();
        if registered.iter().any(|(registered_id, _)| *registered_id == id) {
            debug!("DeferredPassScheduler: pass '{}' is already registered", label);
            return;
        }
        registered.push((id, label.to_owned()));
    }
}
