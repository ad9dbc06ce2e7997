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

//! State shared by every scene pass of one graphics pipeline.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use log::{error, warn};
use tessera_core::renderer::{
    AuxGeometry, ContractViolation, NullStereoProjection, PassScheduler, PipelineProfiler,
    RenderError, SceneRenderSettings, ScenePassId, StereoProjectionProvider,
};
use tessera_core::telemetry::DrawCallObserver;
use tessera_telemetry::{ResolveStatistics, ResolveStatisticsSnapshot};

use super::scheduler::DeferredPassScheduler;

/// How fatal contract violations are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractPolicy {
    /// Fatal violations panic.
    Strict,
    /// Fatal violations are logged and returned; the offending operation is skipped.
    Lenient,
}

impl ContractPolicy {
    /// Derives the policy from the pipeline settings.
    pub fn from_settings(settings: &SceneRenderSettings) -> Self {
        if settings.strict_contracts {
            ContractPolicy::Strict
        } else {
            ContractPolicy::Lenient
        }
    }
}

/// Per-pipeline state shared by its scene passes.
///
/// Holds the settings, the recursion guard that keeps executions from nesting,
/// the frame-global resolve statistics and every optional collaborator. Passes
/// keep an `Arc` to it; nothing here is process-global.
#[derive(Debug)]
pub struct ScenePipelineContext {
    settings: RwLock<SceneRenderSettings>,
    executing: AtomicU32,
    next_pass_id: AtomicU64,
    statistics: Arc<ResolveStatistics>,
    scheduler: Arc<dyn PassScheduler>,
    stereo: Arc<dyn StereoProjectionProvider>,
    profiler: Option<Arc<dyn PipelineProfiler>>,
    aux_geometry: Option<Arc<dyn AuxGeometry>>,
    observer: Option<Arc<dyn DrawCallObserver>>,
}

impl ScenePipelineContext {
    /// Creates a context with an inactive scheduler and no stereo support.
    pub fn new(settings: SceneRenderSettings) -> Self {
        Self {
            settings: RwLock::new(settings),
            executing: AtomicU32::new(0),
            next_pass_id: AtomicU64::new(0),
            statistics: Arc::new(ResolveStatistics::new()),
            scheduler: Arc::new(DeferredPassScheduler::new()),
            stereo: Arc::new(NullStereoProjection),
            profiler: None,
            aux_geometry: None,
            observer: None,
        }
    }

    /// Replaces the pass scheduler.
    pub fn with_scheduler(mut self, scheduler: Arc<dyn PassScheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Replaces the stereo projection provider.
    pub fn with_stereo(mut self, stereo: Arc<dyn StereoProjectionProvider>) -> Self {
        self.stereo = stereo;
        self
    }

    /// Attaches a profiler; executing passes open one section each.
    pub fn with_profiler(mut self, profiler: Arc<dyn PipelineProfiler>) -> Self {
        self.profiler = Some(profiler);
        self
    }

    /// Attaches debug geometry used by the wireframe resolve debug level.
    pub fn with_aux_geometry(mut self, aux_geometry: Arc<dyn AuxGeometry>) -> Self {
        self.aux_geometry = Some(aux_geometry);
        self
    }

    /// Attaches a draw-call observer.
    pub fn with_observer(mut self, observer: Arc<dyn DrawCallObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Shares resolve statistics with another pipeline or a frame reporter.
    pub fn with_statistics(mut self, statistics: Arc<ResolveStatistics>) -> Self {
        self.statistics = statistics;
        self
    }

    /// Returns a copy of the current settings.
    pub fn settings(&self) -> SceneRenderSettings {
        *self.settings.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the settings; passes pick them up on their next call.
    pub fn set_settings(&self, settings: SceneRenderSettings) {
        *self.settings.write().unwrap_or_else(PoisonError::into_inner) = settings.validate();
    }

    /// The policy applied to fatal contract violations.
    pub fn policy(&self) -> ContractPolicy {
        ContractPolicy::from_settings(&self.settings())
    }

    /// The pass scheduler.
    pub fn scheduler(&self) -> &Arc<dyn PassScheduler> {
        &self.scheduler
    }

    /// The stereo projection provider.
    pub fn stereo(&self) -> &dyn StereoProjectionProvider {
        self.stereo.as_ref()
    }

    /// The attached profiler, if any.
    pub fn profiler(&self) -> Option<&dyn PipelineProfiler> {
        self.profiler.as_deref()
    }

    /// The attached debug geometry, if any.
    pub fn aux_geometry(&self) -> Option<&dyn AuxGeometry> {
        self.aux_geometry.as_deref()
    }

    /// The attached observer, if any.
    pub fn observer(&self) -> Option<&Arc<dyn DrawCallObserver>> {
        self.observer.as_ref()
    }

    /// The frame-global resolve statistics.
    pub fn statistics(&self) -> &ResolveStatistics {
        &self.statistics
    }

    /// Returns the resolve statistics of the finished frame and zeroes them.
    pub fn reset_frame_statistics(&self) -> ResolveStatisticsSnapshot {
        self.statistics.reset()
    }

    /// Allocates a pass id unique within this pipeline.
    pub fn allocate_pass_id(&self) -> ScenePassId {
        ScenePassId(self.next_pass_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns `true` while a pass of this pipeline is executing.
    pub fn is_executing(&self) -> bool {
        self.executing.load(Ordering::Acquire) != 0
    }

    /// Marks the start of an execution; fails if one is already open.
    pub(crate) fn enter_execution(&self, pass: &str) -> Result<(), RenderError> {
        match self
            .executing
            .compare_exchange(0, 1, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => Ok(()),
            Err(_) => self.report(
                pass,
                ContractViolation::ReentrantExecution {
                    pass: pass.to_owned(),
                },
            ),
        }
    }

    /// Marks the end of the open execution.
    pub(crate) fn leave_execution(&self, pass: &str) -> Result<(), RenderError> {
        match self
            .executing
            .compare_exchange(1, 0, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => Ok(()),
            Err(_) => self.report(
                pass,
                ContractViolation::UnbalancedEndExecution {
                    pass: pass.to_owned(),
                },
            ),
        }
    }

    /// Reports a contract violation raised by `pass`.
    ///
    /// Non-fatal violations are logged and yield `Ok`. Fatal ones panic under
    /// [`ContractPolicy::Strict`] and are returned as errors otherwise.
    pub fn report(&self, pass: &str, violation: ContractViolation) -> Result<(), RenderError> {
        if let Some(observer) = &self.observer {
            observer.on_contract_violation(pass, &violation);
        }

        if !violation.is_fatal() {
            warn!("ScenePass '{}': {}", pass, violation);
            return Ok(());
        }

        match self.policy() {
            ContractPolicy::Strict => panic!("ScenePass '{}': {}", pass, violation),
            ContractPolicy::Lenient => {
                error!("ScenePass '{}': {}", pass, violation);
                Err(RenderError::Contract(violation))
            }
        }
    }
}

impl Default for ScenePipelineContext {
    fn default() -> Self {
        Self::new(SceneRenderSettings::default())
    }
}
