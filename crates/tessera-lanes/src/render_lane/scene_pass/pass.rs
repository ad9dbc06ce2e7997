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

//! The scene pass: one configured GPU render pass and the work drawn against it.

use std::ops::{Bound, RangeBounds};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, warn};
use tessera_core::renderer::{
    AttachmentBinding, BatchFlags, CommandRecorder, ContractViolation, CopyExtent, CopyFlags, DepthBias,
    GraphicsDevice, PassContext, PassContextKind, PassFlags, RenderError, RenderListId,
    RenderPassDescriptor, RenderPassId, RenderView, ResourceLayoutId, ResourceLayoutSlot,
    ResourceSetId, ResourceViewHandle, SceneRenderPass, ScenePassId, ScissorRect, ScreenRect,
    ShaderTechnique, SubmissionMode, TargetSlot, TargetTexture, TexelOrigin,
    TextureRegionMapping, Viewport, MAX_COLOR_TARGETS, MAX_PIPELINE_SCENE_STAGES,
};

use super::context::ScenePipelineContext;
use super::planner::PassBatchPlanner;

/// The render pass compiled by the device, with the descriptor it was built from.
#[derive(Debug, Clone)]
struct CompiledRenderPass {
    id: RenderPassId,
    descriptor: RenderPassDescriptor,
}

/// Source and destination of the inline resolve copy.
#[derive(Debug, Clone, Copy)]
struct ResolveTargets {
    source: TargetTexture,
    destination: TargetTexture,
}

/// Per-frame execution state, guarded by one mutex.
#[derive(Debug, Default)]
struct ExecutionState {
    executing: bool,
    mode: SubmissionMode,
    render_item_groups: u32,
    profiler_section_index: Option<u32>,
    contexts: Vec<PassContext>,
}

/// One configured GPU render pass of a scene pipeline stage.
///
/// A pass lives as long as its pipeline and is reused every frame:
///
/// 1. **Configure** (`&mut self`): targets, viewport, resources, filters.
/// 2. **Prepare**: [`ScenePass::prepare_for_use`] compiles the render pass if
///    its attachments changed and transitions the bound resources.
/// 3. **Execute** (`&self`): [`ScenePass::begin_execution`], any number of
///    [`ScenePass::draw_render_items`] calls, [`ScenePass::end_execution`].
/// 4. **Replay** (deferred mode): [`SceneRenderPass::execute`].
///
/// Recording methods may run on several worker threads at once; configuration
/// is frozen while they do because it requires `&mut self`.
#[derive(Debug)]
pub struct ScenePass {
    id: ScenePassId,
    label: String,
    pipeline: Arc<ScenePipelineContext>,

    descriptor: RenderPassDescriptor,
    compiled: Option<CompiledRenderPass>,
    resource_layout: Option<ResourceLayoutId>,
    per_pass_resources: Option<ResourceSetId>,
    resolve_targets: Option<ResolveTargets>,

    viewports: [Viewport; 2],
    scissor: ScissorRect,
    depth_bias: DepthBias,
    flags: PassFlags,

    stage: u32,
    sub_pass: u32,
    technique: ShaderTechnique,
    batch_filter: BatchFlags,
    exclude_filter: BatchFlags,
    render_list: Option<RenderListId>,

    execution: Mutex<ExecutionState>,
}

impl ScenePass {
    /// Creates an unconfigured pass labelled `SCENE_PASS`.
    pub fn new(pipeline: Arc<ScenePipelineContext>) -> Self {
        Self {
            id: pipeline.allocate_pass_id(),
            label: "SCENE_PASS".to_owned(),
            pipeline,
            descriptor: RenderPassDescriptor::default(),
            compiled: None,
            resource_layout: None,
            per_pass_resources: None,
            resolve_targets: None,
            viewports: [Viewport::default(); 2],
            scissor: ScissorRect::default(),
            depth_bias: DepthBias::NONE,
            flags: PassFlags::empty(),
            stage: 0,
            sub_pass: 0,
            technique: ShaderTechnique::default(),
            batch_filter: BatchFlags::all(),
            exclude_filter: BatchFlags::empty(),
            render_list: None,
            execution: Mutex::new(ExecutionState::default()),
        }
    }

    // --- Configuration ---

    /// Sets the label used in logs, diagnostics and profiler sections.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Sets the pass flags. Set them before [`ScenePass::set_viewport`], which
    /// derives the near viewport from them.
    pub fn set_flags(&mut self, flags: PassFlags) {
        self.flags = flags;
    }

    /// Binds the pass to its stage, technique and filters.
    ///
    /// Passes drawing compiled render objects must use a stage below
    /// [`MAX_PIPELINE_SCENE_STAGES`]. When they don't, the violation is reported
    /// and, if the pipeline is lenient, the include filter is forced empty so
    /// the pass draws nothing.
    #[allow(clippy::too_many_arguments)]
    pub fn setup_pass_context(
        &mut self,
        stage: u32,
        sub_pass: u32,
        technique: ShaderTechnique,
        include_filter: BatchFlags,
        render_list: Option<RenderListId>,
        exclude_filter: BatchFlags,
        uses_compiled_draw_path: bool,
    ) -> Result<(), RenderError> {
        let drawable = !uses_compiled_draw_path || stage < MAX_PIPELINE_SCENE_STAGES;
        let result = if drawable {
            Ok(())
        } else {
            self.pipeline.report(
                &self.label,
                ContractViolation::InvalidSceneStage {
                    stage,
                    max: MAX_PIPELINE_SCENE_STAGES,
                },
            )
        };

        self.stage = stage;
        self.sub_pass = sub_pass;
        self.technique = technique;
        self.batch_filter = if drawable {
            include_filter
        } else {
            BatchFlags::empty()
        };
        self.exclude_filter = exclude_filter;
        self.render_list = render_list;
        result
    }

    /// Sets the resource layout and the per-pass resource set.
    pub fn set_pass_resources(&mut self, layout: ResourceLayoutId, per_pass: ResourceSetId) {
        self.resource_layout = Some(layout);
        self.per_pass_resources = Some(per_pass);
    }

    /// Replaces every attachment with default views.
    ///
    /// Color targets must share one width and the depth target must be at least
    /// as wide as every color target. Violations are reported once per rule and
    /// the targets are assigned regardless.
    pub fn set_render_targets(
        &mut self,
        depth: Option<TargetTexture>,
        colors: [Option<TargetTexture>; MAX_COLOR_TARGETS],
    ) {
        for (slot, color) in colors.iter().enumerate() {
            self.descriptor.color_targets[slot] = color.map(|texture| AttachmentBinding {
                texture,
                view: ResourceViewHandle::DEFAULT,
            });
        }
        self.descriptor
            .set_depth_target(depth, ResourceViewHandle::DEFAULT);

        let mut bound = colors
            .iter()
            .enumerate()
            .filter_map(|(slot, c)| c.map(|c| (slot, c.width)));
        if let Some((_, expected)) = bound.next() {
            if let Some((slot, found)) = bound.find(|(_, width)| *width != expected) {
                // Non-fatal: reporting never fails for target checks.
                let _ = self.pipeline.report(
                    &self.label,
                    ContractViolation::ColorTargetSizeMismatch {
                        slot,
                        expected,
                        found,
                    },
                );
            }
        }

        let widest_color = colors.iter().flatten().map(|c| c.width).max();
        if let (Some(depth), Some(color_width)) = (depth, widest_color) {
            if depth.width < color_width {
                let _ = self.pipeline.report(
                    &self.label,
                    ContractViolation::DepthTargetTooSmall {
                        depth_width: depth.width,
                        color_width,
                    },
                );
            }
        }
    }

    /// Swaps the color target in `slot` without touching the other attachments.
    pub fn exchange_render_target(
        &mut self,
        slot: usize,
        target: Option<TargetTexture>,
        view: ResourceViewHandle,
    ) -> Result<(), RenderError> {
        if let Err(violation) = self.descriptor.set_color_target(slot, target, view) {
            return self.pipeline.report(&self.label, violation);
        }
        self.check_device_storage(TargetSlot::Color(slot), target);
        Ok(())
    }

    /// Swaps the depth target without touching the color attachments.
    pub fn exchange_depth_target(&mut self, target: Option<TargetTexture>, view: ResourceViewHandle) {
        self.descriptor.set_depth_target(target, view);
        self.check_device_storage(TargetSlot::Depth, target);
    }

    fn check_device_storage(&self, slot: TargetSlot, target: Option<TargetTexture>) {
        if target.is_some_and(|t| !t.has_device_storage) {
            let _ = self
                .pipeline
                .report(&self.label, ContractViolation::MissingDeviceStorage { slot });
        }
    }

    /// Sets the viewport and derives the scissor and the near viewport.
    ///
    /// With [`PassFlags::RENDER_NEAREST`] the near viewport keeps the depth range
    /// `[0, near_z_range]`, reversed to `[1 - near_z_range, 1]` under
    /// [`PassFlags::REVERSE_DEPTH`]. Otherwise both viewports are identical.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        let mut near = viewport;
        if self.flags.contains(PassFlags::RENDER_NEAREST) {
            near = viewport.with_depth_range(0.0, self.pipeline.settings().near_z_range);
            if self.flags.contains(PassFlags::REVERSE_DEPTH) {
                near = near.reversed_depth();
            }
        }
        self.viewports = [viewport, near];
        self.scissor = viewport.scissor_rect();
    }

    /// Sets the rasterizer depth bias applied while recording.
    pub fn set_depth_bias(&mut self, constant: f32, slope: f32, clamp: f32) {
        self.depth_bias = DepthBias {
            constant,
            slope,
            clamp,
        };
    }

    /// Sets the textures the inline resolve copies from and into.
    pub fn set_resolve_textures(&mut self, source: TargetTexture, destination: TargetTexture) {
        self.resolve_targets = Some(ResolveTargets {
            source,
            destination,
        });
    }

    // --- Preparation ---

    /// Compiles the render pass again if the attachments changed since the last
    /// compilation, releasing the stale one.
    pub fn update_render_pass(&mut self, device: &dyn GraphicsDevice) -> Result<RenderPassId, RenderError> {
        if let Some(compiled) = &self.compiled {
            if compiled.descriptor == self.descriptor {
                return Ok(compiled.id);
            }
        }

        let id = device.create_render_pass(&self.descriptor)?;
        if let Some(stale) = self.compiled.take() {
            if let Err(e) = device.release_render_pass(stale.id) {
                warn!("ScenePass '{}': failed to release stale render pass: {}", self.label, e);
            }
        }
        debug!("ScenePass '{}': compiled render pass {:?}", self.label, id);
        self.compiled = Some(CompiledRenderPass {
            id,
            descriptor: self.descriptor.clone(),
        });
        Ok(id)
    }

    /// Makes the pass ready for recording on `recorder`.
    ///
    /// Safe to call several times per frame. Stereo passes also prepare the
    /// projection parameters of both viewports when multi-resolution stereo is
    /// enabled, since the nearest flag of the draws is not known yet.
    pub fn prepare_for_use(
        &mut self,
        device: &dyn GraphicsDevice,
        recorder: &mut dyn CommandRecorder,
    ) -> Result<(), RenderError> {
        let Some(per_pass) = self.per_pass_resources.filter(|_| self.resource_layout.is_some())
        else {
            return self.pipeline.report(
                &self.label,
                ContractViolation::MissingPassResources {
                    pass: self.label.clone(),
                },
            );
        };

        let id = self.update_render_pass(device)?;
        recorder.prepare_render_pass_for_use(id);
        recorder.prepare_resources_for_use(ResourceLayoutSlot::PerPass, per_pass);

        if self.flags.contains(PassFlags::STEREO_PROJECTION) {
            let stereo = self.pipeline.stereo();
            if stereo.is_multi_res_enabled() {
                stereo.prepare_projection_parameters(recorder, &self.viewports[0]);
                stereo.prepare_projection_parameters(recorder, &self.viewports[1]);
            }
        }
        Ok(())
    }

    /// Releases the compiled render pass.
    pub fn release(&mut self, device: &dyn GraphicsDevice) -> Result<(), RenderError> {
        if let Some(compiled) = self.compiled.take() {
            device.release_render_pass(compiled.id)?;
        }
        Ok(())
    }

    // --- Execution ---

    /// Opens an execution cycle.
    ///
    /// Fails if any pass of the pipeline is already executing. Resets the
    /// render-item-group counter and drops contexts left from the previous
    /// frame; in deferred mode the pass registers with the scheduler.
    pub fn begin_execution(&self, mode: SubmissionMode) -> Result<(), RenderError> {
        self.pipeline.enter_execution(&self.label)?;

        let mut state = self.lock_execution();
        state.executing = true;
        state.mode = mode;
        state.render_item_groups = 0;
        state.contexts.clear();
        state.profiler_section_index = self
            .pipeline
            .profiler()
            .map(|profiler| profiler.insert_multithreaded_section(&self.label));
        drop(state);

        if mode.is_deferred() {
            self.pipeline.scheduler().add_pass(self.id, &self.label);
        }
        Ok(())
    }

    /// Closes the execution cycle opened by [`ScenePass::begin_execution`].
    pub fn end_execution(&self) -> Result<(), RenderError> {
        let mut state = self.lock_execution();
        if !state.executing {
            drop(state);
            return self.pipeline.report(
                &self.label,
                ContractViolation::UnbalancedEndExecution {
                    pass: self.label.clone(),
                },
            );
        }
        state.executing = false;
        drop(state);
        self.pipeline.leave_execution(&self.label)
    }

    /// Plans `range` of `list` and submits the resulting contexts.
    ///
    /// Unbounded range ends resolve to the bounds of the list and an end past
    /// the list is clamped. Lists sharing no flag with the include filter are
    /// skipped unless the filter is [`BatchFlags::all()`]. Deferred passes queue
    /// the contexts; immediate passes dispatch them unless `no_draw` is set.
    ///
    /// Returns the number of contexts planned.
    pub fn draw_render_items(
        &self,
        view: &Arc<dyn RenderView>,
        list: RenderListId,
        range: impl RangeBounds<usize>,
        profiling_list_id: u32,
    ) -> Result<usize, RenderError> {
        let settings = self.pipeline.settings();

        // Planning runs under the lock so concurrent calls get contiguous groups.
        let mut state = self.lock_execution();
        if !state.executing {
            drop(state);
            return self
                .pipeline
                .report(
                    &self.label,
                    ContractViolation::NotExecuting {
                        pass: self.label.clone(),
                    },
                )
                .map(|_| 0);
        }

        let list_flags = view.batch_flags(list);
        if self.batch_filter != BatchFlags::all() && !list_flags.intersects(self.batch_filter) {
            return Ok(0);
        }

        let len = view.render_items(list).len();
        let start = match range.start_bound() {
            Bound::Included(&s) => s,
            Bound::Excluded(&s) => s.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let mut end = match range.end_bound() {
            Bound::Included(&e) => e.saturating_add(1),
            Bound::Excluded(&e) => e,
            Bound::Unbounded => len,
        };
        if end > len {
            self.pipeline.report(
                &self.label,
                ContractViolation::ItemRangeOutOfBounds { start, end, len },
            )?;
            end = len;
        }
        let start = start.min(end);

        let template = PassContext {
            kind: PassContextKind::Draw { items: start..end },
            view: Arc::clone(view),
            pass: self.id,
            technique: self.technique,
            batch_filter: self.batch_filter,
            exclude_filter: self.exclude_filter,
            stage: self.stage,
            sub_pass: self.sub_pass,
            render_list: list,
            render_nearest: list.is_nearest() && self.flags.contains(PassFlags::RENDER_NEAREST),
            render_item_group: 0,
            eye: view.current_eye(),
            profiler_section_index: state.profiler_section_index,
            profiling_list_id,
            observer: self
                .pipeline
                .observer()
                .filter(|observer| observer.is_enabled())
                .cloned(),
        };

        let planner = PassBatchPlanner::new(&settings, self.pipeline.statistics())
            .with_aux_geometry(self.pipeline.aux_geometry());
        let contexts = planner.plan(&template, start..end, &mut state.render_item_groups);
        let planned = contexts.len();

        if state.mode.is_deferred() {
            state.contexts.extend(contexts);
            return Ok(planned);
        }
        drop(state);

        if !settings.no_draw {
            for context in &contexts {
                self.dispatch(context);
            }
        }
        Ok(planned)
    }

    fn dispatch(&self, context: &PassContext) {
        if let Some(observer) = &context.observer {
            observer.on_pass_context(context);
        }
        context.view.draw_compiled_render_items(self, context);
    }

    // --- Accessors ---

    /// The viewport used for regular (`use_near == false`) or nearest draws.
    pub fn viewport(&self, use_near: bool) -> Viewport {
        self.viewports[usize::from(use_near)]
    }

    /// The scissor rectangle derived from the viewport.
    pub fn scissor_rect(&self) -> ScissorRect {
        self.scissor
    }

    /// The current attachments.
    pub fn descriptor(&self) -> &RenderPassDescriptor {
        &self.descriptor
    }

    /// The compiled render pass, if it matches the current attachments.
    pub fn render_pass(&self) -> Option<RenderPassId> {
        self.compiled
            .as_ref()
            .filter(|compiled| compiled.descriptor == self.descriptor)
            .map(|compiled| compiled.id)
    }

    /// The depth bias applied while recording.
    pub fn depth_bias(&self) -> DepthBias {
        self.depth_bias
    }

    /// The pass flags.
    pub fn flags(&self) -> PassFlags {
        self.flags
    }

    /// The pipeline stage the pass belongs to.
    pub fn stage(&self) -> u32 {
        self.stage
    }

    /// The include filter.
    pub fn batch_filter(&self) -> BatchFlags {
        self.batch_filter
    }

    /// The render list bound at setup, if any.
    pub fn render_list(&self) -> Option<RenderListId> {
        self.render_list
    }

    /// The pipeline this pass belongs to.
    pub fn pipeline(&self) -> &Arc<ScenePipelineContext> {
        &self.pipeline
    }

    /// Returns `true` between `begin_execution` and `end_execution`.
    pub fn is_executing(&self) -> bool {
        self.lock_execution().executing
    }

    /// The number of contexts planned in the current execution cycle.
    pub fn render_item_group_count(&self) -> u32 {
        self.lock_execution().render_item_groups
    }

    /// A snapshot of the contexts queued for deferred replay.
    pub fn pass_contexts(&self) -> Vec<PassContext> {
        self.lock_execution().contexts.clone()
    }

    fn lock_execution(&self) -> MutexGuard<'_, ExecutionState> {
        self.execution
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn compiled_for_recording(&self) -> Result<RenderPassId, RenderError> {
        if let Some(id) = self.render_pass() {
            return Ok(id);
        }
        let violation = ContractViolation::RenderPassNotPrepared {
            pass: self.label.clone(),
        };
        self.pipeline.report(&self.label, violation.clone())?;
        Err(RenderError::Contract(violation))
    }
}

impl SceneRenderPass for ScenePass {
    fn id(&self) -> ScenePassId {
        self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn begin_render_pass(
        &self,
        recorder: &mut dyn CommandRecorder,
        use_near: bool,
    ) -> Result<(), RenderError> {
        let render_pass = self.compiled_for_recording()?;
        let (Some(layout), Some(per_pass)) = (self.resource_layout, self.per_pass_resources) else {
            return self.pipeline.report(
                &self.label,
                ContractViolation::MissingPassResources {
                    pass: self.label.clone(),
                },
            );
        };

        let viewport = self.viewport(use_near);
        recorder.begin_render_pass(render_pass, &self.scissor);

        let viewport_set = self.flags.contains(PassFlags::STEREO_PROJECTION)
            && self.pipeline.stereo().set_rendering_state(
                recorder,
                &viewport,
                self.flags.contains(PassFlags::USE_STEREO_STATE),
                self.flags.contains(PassFlags::REQUIRE_STEREO_CONSTANTS),
            );
        if !viewport_set {
            recorder.set_viewports(&[viewport]);
            recorder.set_scissor_rects(&[self.scissor]);
        }

        recorder.set_resource_layout(layout);
        recorder.set_resources(ResourceLayoutSlot::PerPass, per_pass);

        if recorder.uses_dynamic_depth_bias() {
            recorder.set_depth_bias(self.depth_bias);
        }
        Ok(())
    }

    fn end_render_pass(
        &self,
        recorder: &mut dyn CommandRecorder,
        _use_near: bool,
    ) -> Result<(), RenderError> {
        let render_pass = self.compiled_for_recording()?;
        recorder.end_render_pass(render_pass);

        if recorder.uses_dynamic_depth_bias() {
            recorder.set_depth_bias(DepthBias::NONE);
        }

        if self
            .flags
            .contains(PassFlags::STEREO_PROJECTION | PassFlags::USE_STEREO_STATE)
        {
            self.pipeline.stereo().restore_state(recorder);
        }
        Ok(())
    }

    fn resolve_pass(&self, recorder: &mut dyn CommandRecorder, bounds: ScreenRect) -> bool {
        let Some(targets) = self.resolve_targets else {
            debug!("ScenePass '{}': no resolve textures, skipping resolve", self.label);
            return false;
        };

        let x0 = bounds.x0.max(0);
        let y0 = bounds.y0.max(0);
        let extent_along = |size: i32, origin: i32, texture_size: u32| -> u32 {
            let available = i64::from(texture_size) - i64::from(origin);
            i64::from(size).min(available).max(0) as u32
        };

        let origin = TexelOrigin {
            x: x0 as u32,
            y: y0 as u32,
        };
        let mapping = TextureRegionMapping {
            source_origin: origin,
            destination_origin: origin,
            extent: CopyExtent {
                width: extent_along(bounds.x1 - x0, x0, targets.source.width),
                height: extent_along(bounds.y1 - y0, y0, targets.source.height),
                depth: 1,
            },
            flags: CopyFlags::NO_OVERWRITE_CONCURRENT,
        };

        if mapping.extent.is_empty() {
            debug!(
                "ScenePass '{}': skipping zero-area resolve {:?}",
                self.label, bounds
            );
            return false;
        }

        recorder.copy_texture_region(targets.source.id, targets.destination.id, &mapping);
        true
    }

    fn execute(&self) -> usize {
        let contexts = std::mem::take(&mut self.lock_execution().contexts);
        for context in &contexts {
            self.dispatch(context);
        }
        contexts.len()
    }
}
