use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use approx::assert_relative_eq;
use rayon::prelude::*;
use tessera_core::math::{Aabb, Vec3};
use tessera_core::renderer::*;
use tessera_lanes::{record_pass_context, DeferredPassScheduler, ScenePass, ScenePipelineContext};
use tessera_telemetry::CountingObserver;

const WIDTH: u32 = 1280;
const HEIGHT: u32 = 720;

// --- Mocks ---

#[derive(Debug, Clone, PartialEq)]
enum Command {
    BeginRenderPass(RenderPassId, ScissorRect),
    EndRenderPass(RenderPassId),
    SetViewports(Vec<Viewport>),
    SetScissorRects(Vec<ScissorRect>),
    SetResourceLayout(ResourceLayoutId),
    SetResources(ResourceLayoutSlot, ResourceSetId),
    SetDepthBias(DepthBias),
    PrepareRenderPass(RenderPassId),
    PrepareResources(ResourceLayoutSlot, ResourceSetId),
    Copy(TextureId, TextureId, TextureRegionMapping),
}

#[derive(Debug, Default)]
struct MockRecorder {
    commands: Vec<Command>,
    static_depth_bias: bool,
}

impl CommandRecorder for MockRecorder {
    fn begin_render_pass(&mut self, pass: RenderPassId, scissor: &ScissorRect) {
        self.commands.push(Command::BeginRenderPass(pass, *scissor));
    }
    fn end_render_pass(&mut self, pass: RenderPassId) {
        self.commands.push(Command::EndRenderPass(pass));
    }
    fn set_viewports(&mut self, viewports: &[Viewport]) {
        self.commands.push(Command::SetViewports(viewports.to_vec()));
    }
    fn set_scissor_rects(&mut self, rects: &[ScissorRect]) {
        self.commands.push(Command::SetScissorRects(rects.to_vec()));
    }
    fn set_resource_layout(&mut self, layout: ResourceLayoutId) {
        self.commands.push(Command::SetResourceLayout(layout));
    }
    fn set_resources(&mut self, slot: ResourceLayoutSlot, set: ResourceSetId) {
        self.commands.push(Command::SetResources(slot, set));
    }
    fn set_depth_bias(&mut self, bias: DepthBias) {
        self.commands.push(Command::SetDepthBias(bias));
    }
    fn prepare_render_pass_for_use(&mut self, pass: RenderPassId) {
        self.commands.push(Command::PrepareRenderPass(pass));
    }
    fn prepare_resources_for_use(&mut self, slot: ResourceLayoutSlot, set: ResourceSetId) {
        self.commands.push(Command::PrepareResources(slot, set));
    }
    fn copy_texture_region(
        &mut self,
        source: TextureId,
        destination: TextureId,
        mapping: &TextureRegionMapping,
    ) {
        self.commands
            .push(Command::Copy(source, destination, *mapping));
    }
    fn uses_dynamic_depth_bias(&self) -> bool {
        !self.static_depth_bias
    }
}

#[derive(Debug, Default)]
struct MockRenderView {
    lists: HashMap<RenderListId, Vec<RenderItem>>,
    recorder: Mutex<MockRecorder>,
    dispatched: Mutex<Vec<(PassContextKind, u32)>>,
    drawn: Mutex<Vec<CompiledObjectId>>,
    errors: Mutex<Vec<RenderError>>,
}

impl MockRenderView {
    fn new(lists: Vec<(RenderListId, Vec<RenderItem>)>) -> Arc<Self> {
        Arc::new(Self {
            lists: lists.into_iter().collect(),
            ..Default::default()
        })
    }

    fn commands(&self) -> Vec<Command> {
        self.recorder.lock().unwrap().commands.clone()
    }

    fn dispatched(&self) -> Vec<(PassContextKind, u32)> {
        self.dispatched.lock().unwrap().clone()
    }

    fn drawn(&self) -> Vec<CompiledObjectId> {
        self.drawn.lock().unwrap().clone()
    }
}

impl RenderView for MockRenderView {
    fn render_items(&self, list: RenderListId) -> &[RenderItem] {
        self.lists.get(&list).map(Vec::as_slice).unwrap_or(&[])
    }
    fn batch_flags(&self, list: RenderListId) -> BatchFlags {
        self.render_items(list)
            .iter()
            .fold(BatchFlags::empty(), |acc, item| acc | item.batch_flags)
    }
    fn current_eye(&self) -> StereoEye {
        StereoEye::Left
    }
    fn camera(&self, _eye: StereoEye) -> Camera {
        Camera::default()
    }
    fn viewport(&self) -> Viewport {
        Viewport::from_size(WIDTH as f32, HEIGHT as f32)
    }
    fn draw_compiled_render_items(&self, pass: &dyn SceneRenderPass, context: &PassContext) {
        self.dispatched
            .lock()
            .unwrap()
            .push((context.kind.clone(), context.render_item_group));

        let mut recorder = self.recorder.lock().unwrap();
        let mut drawn = Vec::new();
        let result = record_pass_context(pass, context, &mut *recorder, |_, item| {
            drawn.push(item.object)
        });
        self.drawn.lock().unwrap().extend(drawn);
        if let Err(e) = result {
            self.errors.lock().unwrap().push(e);
        }
    }
}

#[derive(Debug, Default)]
struct MockDevice {
    next_id: AtomicU64,
    released: Mutex<Vec<RenderPassId>>,
}

impl MockDevice {
    fn created(&self) -> u64 {
        self.next_id.load(Ordering::SeqCst)
    }
}

impl GraphicsDevice for MockDevice {
    fn create_render_pass(
        &self,
        descriptor: &RenderPassDescriptor,
    ) -> Result<RenderPassId, ResourceError> {
        if descriptor.is_empty() {
            return Err(ResourceError::BackendError("no attachments".into()));
        }
        Ok(RenderPassId(self.next_id.fetch_add(1, Ordering::SeqCst)))
    }
    fn release_render_pass(&self, id: RenderPassId) -> Result<(), ResourceError> {
        self.released.lock().unwrap().push(id);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MockStereo {
    multi_res: bool,
    owns_viewports: bool,
    calls: Mutex<Vec<&'static str>>,
}

impl MockStereo {
    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

impl StereoProjectionProvider for MockStereo {
    fn is_multi_res_enabled(&self) -> bool {
        self.multi_res
    }
    fn prepare_projection_parameters(&self, _recorder: &mut dyn CommandRecorder, _viewport: &Viewport) {
        self.calls.lock().unwrap().push("prepare");
    }
    fn set_rendering_state(
        &self,
        _recorder: &mut dyn CommandRecorder,
        _viewport: &Viewport,
        use_projection_state: bool,
        _require_constants: bool,
    ) -> bool {
        self.calls.lock().unwrap().push(if use_projection_state {
            "set_state"
        } else {
            "set_constants"
        });
        self.owns_viewports
    }
    fn restore_state(&self, _recorder: &mut dyn CommandRecorder) {
        self.calls.lock().unwrap().push("restore");
    }
}

#[derive(Debug, Default)]
struct MockProfiler {
    sections: AtomicU32,
}

impl PipelineProfiler for MockProfiler {
    fn insert_multithreaded_section(&self, _label: &str) -> u32 {
        self.sections.fetch_add(1, Ordering::SeqCst) + 10
    }
}

// --- Helpers ---

fn lenient() -> SceneRenderSettings {
    SceneRenderSettings {
        strict_contracts: false,
        refraction_partial_resolves: false,
        ..Default::default()
    }
}

fn tex(id: usize) -> TargetTexture {
    TargetTexture::new(TextureId(id), WIDTH, HEIGHT)
}

fn item(object: u64, batch_flags: BatchFlags) -> RenderItem {
    RenderItem {
        batch_flags,
        bounds: Aabb::from_center_half_extents(Vec3::new(0.0, 0.0, 0.5), Vec3::splat(0.25)),
        object: CompiledObjectId(object),
    }
}

fn opaque_items(count: u64) -> Vec<RenderItem> {
    (0..count).map(|i| item(i, BatchFlags::GENERAL)).collect()
}

/// Transparent items; the indices in `refractive` also need a resolve.
fn transparent_items(count: u64, refractive: &[u64]) -> Vec<RenderItem> {
    (0..count)
        .map(|i| {
            let mut flags = BatchFlags::TRANSPARENT;
            if refractive.contains(&i) {
                flags |= BatchFlags::REFRACTION;
            }
            item(i, flags)
        })
        .collect()
}

fn configured_pass(pipeline: &Arc<ScenePipelineContext>, flags: PassFlags) -> (ScenePass, MockDevice) {
    let mut pass = ScenePass::new(Arc::clone(pipeline));
    pass.set_label("Forward");
    pass.set_flags(flags);
    pass.setup_pass_context(
        0,
        0,
        ShaderTechnique::General,
        BatchFlags::all(),
        None,
        BatchFlags::empty(),
        true,
    )
    .unwrap();
    pass.set_render_targets(Some(tex(100)), [Some(tex(1)), None, None, None]);
    pass.set_viewport(Viewport::from_size(WIDTH as f32, HEIGHT as f32));
    pass.set_pass_resources(ResourceLayoutId(3), ResourceSetId(5));
    pass.set_depth_bias(1.0, 2.0, 0.5);
    pass.set_resolve_textures(tex(1), tex(2));

    let device = MockDevice::default();
    let mut recorder = MockRecorder::default();
    pass.prepare_for_use(&device, &mut recorder).unwrap();
    (pass, device)
}

fn as_dyn(view: &Arc<MockRenderView>) -> Arc<dyn RenderView> {
    view.clone()
}

// --- Recording ---

#[test]
fn immediate_draw_records_bound_state_in_order() {
    let pipeline = Arc::new(ScenePipelineContext::new(lenient()));
    let (pass, _device) = configured_pass(&pipeline, PassFlags::empty());
    let view = MockRenderView::new(vec![(RenderListId::General, opaque_items(3))]);

    pass.begin_execution(SubmissionMode::Immediate).unwrap();
    let planned = pass
        .draw_render_items(&as_dyn(&view), RenderListId::General, .., 0)
        .unwrap();
    pass.end_execution().unwrap();

    assert_eq!(planned, 1);
    let render_pass = pass.render_pass().unwrap();
    let scissor = pass.scissor_rect();
    assert_eq!(
        view.commands(),
        vec![
            Command::BeginRenderPass(render_pass, scissor),
            Command::SetViewports(vec![pass.viewport(false)]),
            Command::SetScissorRects(vec![scissor]),
            Command::SetResourceLayout(ResourceLayoutId(3)),
            Command::SetResources(ResourceLayoutSlot::PerPass, ResourceSetId(5)),
            Command::SetDepthBias(DepthBias {
                constant: 1.0,
                slope: 2.0,
                clamp: 0.5
            }),
            Command::EndRenderPass(render_pass),
            Command::SetDepthBias(DepthBias::NONE),
        ]
    );
    assert_eq!(view.drawn().len(), 3);
}

#[test]
fn static_depth_bias_is_never_recorded() {
    let pipeline = Arc::new(ScenePipelineContext::new(lenient()));
    let (pass, _device) = configured_pass(&pipeline, PassFlags::empty());
    let mut recorder = MockRecorder {
        static_depth_bias: true,
        ..Default::default()
    };

    pass.begin_render_pass(&mut recorder, false).unwrap();
    pass.end_render_pass(&mut recorder, false).unwrap();

    assert!(!recorder
        .commands
        .iter()
        .any(|c| matches!(c, Command::SetDepthBias(_))));
}

#[test]
fn nearest_lists_use_the_near_viewport() {
    let pipeline = Arc::new(ScenePipelineContext::new(lenient()));
    let (pass, _device) = configured_pass(&pipeline, PassFlags::RENDER_NEAREST);
    let view = MockRenderView::new(vec![(RenderListId::NearestObjects, opaque_items(2))]);

    pass.begin_execution(SubmissionMode::Immediate).unwrap();
    pass.draw_render_items(&as_dyn(&view), RenderListId::NearestObjects, .., 0)
        .unwrap();
    pass.end_execution().unwrap();

    let viewports: Vec<Viewport> = view
        .commands()
        .into_iter()
        .filter_map(|c| match c {
            Command::SetViewports(v) => Some(v[0]),
            _ => None,
        })
        .collect();
    assert_eq!(viewports.len(), 1);
    assert_relative_eq!(viewports[0].max_depth, SceneRenderSettings::DEFAULT_NEAR_Z_RANGE);
}

#[test]
fn exclude_filter_drops_items_while_recording() {
    let pipeline = Arc::new(ScenePipelineContext::new(lenient()));
    let (mut pass, device) = configured_pass(&pipeline, PassFlags::empty());
    pass.setup_pass_context(
        1,
        0,
        ShaderTechnique::General,
        BatchFlags::GENERAL,
        Some(RenderListId::General),
        BatchFlags::DECAL,
        true,
    )
    .unwrap();
    pass.update_render_pass(&device).unwrap();

    let mut items = opaque_items(4);
    items[2].batch_flags |= BatchFlags::DECAL;
    let view = MockRenderView::new(vec![(RenderListId::General, items)]);

    pass.begin_execution(SubmissionMode::Immediate).unwrap();
    pass.draw_render_items(&as_dyn(&view), RenderListId::General, .., 0)
        .unwrap();
    pass.end_execution().unwrap();

    assert_eq!(
        view.drawn(),
        vec![CompiledObjectId(0), CompiledObjectId(1), CompiledObjectId(3)]
    );
}

#[test]
fn lists_outside_the_filter_are_skipped() {
    let pipeline = Arc::new(ScenePipelineContext::new(lenient()));
    let (mut pass, _device) = configured_pass(&pipeline, PassFlags::empty());
    pass.setup_pass_context(
        0,
        0,
        ShaderTechnique::General,
        BatchFlags::DECAL,
        None,
        BatchFlags::empty(),
        true,
    )
    .unwrap();
    let view = MockRenderView::new(vec![(RenderListId::General, opaque_items(5))]);

    pass.begin_execution(SubmissionMode::Immediate).unwrap();
    let planned = pass
        .draw_render_items(&as_dyn(&view), RenderListId::General, .., 0)
        .unwrap();
    pass.end_execution().unwrap();

    assert_eq!(planned, 0);
    assert_eq!(pass.render_item_group_count(), 0);
    assert!(view.commands().is_empty());
}

#[test]
fn invalid_stage_draws_nothing() {
    let pipeline = Arc::new(ScenePipelineContext::new(lenient()));
    let (mut pass, _device) = configured_pass(&pipeline, PassFlags::empty());
    assert!(pass
        .setup_pass_context(
            MAX_PIPELINE_SCENE_STAGES,
            0,
            ShaderTechnique::General,
            BatchFlags::GENERAL,
            None,
            BatchFlags::empty(),
            true,
        )
        .is_err());
    let view = MockRenderView::new(vec![(RenderListId::General, opaque_items(5))]);

    pass.begin_execution(SubmissionMode::Immediate).unwrap();
    let planned = pass
        .draw_render_items(&as_dyn(&view), RenderListId::General, .., 0)
        .unwrap();
    pass.end_execution().unwrap();

    assert_eq!(planned, 0);
    assert!(view.dispatched().is_empty());
}

#[test]
fn empty_range_plans_nothing() {
    let pipeline = Arc::new(ScenePipelineContext::new(lenient()));
    let (pass, _device) = configured_pass(&pipeline, PassFlags::empty());
    let view = MockRenderView::new(vec![(RenderListId::General, opaque_items(5))]);

    pass.begin_execution(SubmissionMode::Immediate).unwrap();
    let planned = pass
        .draw_render_items(&as_dyn(&view), RenderListId::General, 3..3, 0)
        .unwrap();
    pass.end_execution().unwrap();

    assert_eq!(planned, 0);
    assert!(view.dispatched().is_empty());
}

#[test]
fn range_past_the_list_is_clamped_and_reported() {
    let observer = Arc::new(CountingObserver::new());
    let pipeline = Arc::new(ScenePipelineContext::new(lenient()).with_observer(observer.clone()));
    let (pass, _device) = configured_pass(&pipeline, PassFlags::empty());
    let view = MockRenderView::new(vec![(RenderListId::General, opaque_items(3))]);

    pass.begin_execution(SubmissionMode::Immediate).unwrap();
    pass.draw_render_items(&as_dyn(&view), RenderListId::General, 1..10, 0)
        .unwrap();
    pass.end_execution().unwrap();

    assert_eq!(view.dispatched(), vec![(PassContextKind::Draw { items: 1..3 }, 0)]);
    assert_eq!(
        observer.violations(),
        vec![(
            "Forward".to_owned(),
            ContractViolation::ItemRangeOutOfBounds {
                start: 1,
                end: 10,
                len: 3
            }
        )]
    );
}

// --- Resolves ---

#[test]
fn refractive_items_get_inline_resolves() {
    let pipeline = Arc::new(ScenePipelineContext::new(lenient()));
    let (pass, _device) = configured_pass(&pipeline, PassFlags::empty());
    let view = MockRenderView::new(vec![(
        RenderListId::Transparent,
        transparent_items(10, &[3, 7]),
    )]);

    pass.begin_execution(SubmissionMode::Immediate).unwrap();
    let planned = pass
        .draw_render_items(&as_dyn(&view), RenderListId::Transparent, .., 0)
        .unwrap();
    pass.end_execution().unwrap();

    let full = ScreenRect::full(WIDTH as i32, HEIGHT as i32);
    assert_eq!(planned, 5);
    assert_eq!(
        view.dispatched(),
        vec![
            (PassContextKind::Draw { items: 0..3 }, 0),
            (PassContextKind::Resolve { bounds: full }, 1),
            (PassContextKind::Draw { items: 3..7 }, 2),
            (PassContextKind::Resolve { bounds: full }, 3),
            (PassContextKind::Draw { items: 7..10 }, 4),
        ]
    );

    let copies: Vec<Command> = view
        .commands()
        .into_iter()
        .filter(|c| matches!(c, Command::Copy(..)))
        .collect();
    assert_eq!(copies.len(), 2);
    let Command::Copy(source, destination, mapping) = copies[0] else {
        unreachable!()
    };
    assert_eq!((source, destination), (TextureId(1), TextureId(2)));
    assert_eq!(mapping.extent.width, WIDTH);
    assert_eq!(mapping.extent.height, HEIGHT);
    assert_eq!(mapping.flags, CopyFlags::NO_OVERWRITE_CONCURRENT);
    assert_eq!(view.drawn().len(), 10);
}

#[test]
fn partial_resolves_cover_the_item_only() {
    let pipeline = Arc::new(ScenePipelineContext::new(SceneRenderSettings {
        refraction_partial_resolves: true,
        partial_resolve_debug: ResolveDebugLevel::Statistics,
        ..lenient()
    }));
    let (pass, _device) = configured_pass(&pipeline, PassFlags::empty());
    let view = MockRenderView::new(vec![(RenderListId::Transparent, transparent_items(2, &[1]))]);

    pass.begin_execution(SubmissionMode::Immediate).unwrap();
    pass.draw_render_items(&as_dyn(&view), RenderListId::Transparent, .., 0)
        .unwrap();
    pass.end_execution().unwrap();

    let expected = ScreenRect::new(480, 270, 800, 450);
    assert_eq!(view.dispatched()[1].0, PassContextKind::Resolve { bounds: expected });

    let stats = pipeline.reset_frame_statistics();
    assert_eq!(stats.resolve_count, 1);
    assert_eq!(stats.resolve_pixel_count, 320 * 180);
    assert_eq!(pipeline.statistics().snapshot().resolve_count, 0);
}

#[test]
fn resolve_copy_is_clamped_to_the_texture() {
    let pipeline = Arc::new(ScenePipelineContext::new(lenient()));
    let (pass, _device) = configured_pass(&pipeline, PassFlags::empty());
    let mut recorder = MockRecorder::default();

    assert!(pass.resolve_pass(&mut recorder, ScreenRect::new(1200, 700, 1400, 800)));
    let Command::Copy(_, _, mapping) = recorder.commands[0] else {
        unreachable!()
    };
    assert_eq!(mapping.source_origin, TexelOrigin { x: 1200, y: 700 });
    assert_eq!(mapping.destination_origin, mapping.source_origin);
    assert_eq!(
        mapping.extent,
        CopyExtent {
            width: 80,
            height: 20,
            depth: 1
        }
    );
}

#[test]
fn zero_area_resolve_is_skipped() {
    let pipeline = Arc::new(ScenePipelineContext::new(lenient()));
    let (pass, _device) = configured_pass(&pipeline, PassFlags::empty());
    let mut recorder = MockRecorder::default();

    assert!(!pass.resolve_pass(&mut recorder, ScreenRect::new(10, 10, 10, 50)));
    assert!(!pass.resolve_pass(&mut recorder, ScreenRect::new(WIDTH as i32, 0, WIDTH as i32 + 5, 5)));
    assert!(recorder.commands.is_empty());
}

// --- Submission modes ---

#[test]
fn deferred_contexts_replay_on_execute() {
    let scheduler = Arc::new(DeferredPassScheduler::active());
    let pipeline =
        Arc::new(ScenePipelineContext::new(lenient()).with_scheduler(scheduler.clone()));
    let (pass, _device) = configured_pass(&pipeline, PassFlags::empty());
    let view = MockRenderView::new(vec![(RenderListId::General, opaque_items(6))]);

    let mode = SubmissionMode::for_frame(scheduler.as_ref());
    assert_eq!(mode, SubmissionMode::Deferred);

    pass.begin_execution(mode).unwrap();
    pass.draw_render_items(&as_dyn(&view), RenderListId::General, 0..2, 0)
        .unwrap();
    pass.draw_render_items(&as_dyn(&view), RenderListId::General, 2..6, 1)
        .unwrap();
    pass.end_execution().unwrap();

    assert!(view.dispatched().is_empty());
    let queued = pass.pass_contexts();
    assert_eq!(queued.len(), 2);
    assert_eq!(queued[1].profiling_list_id, 1);
    assert_eq!(scheduler.registered_passes(), vec![pass.id()]);

    let replayed: [&dyn SceneRenderPass; 1] = [&pass];
    assert_eq!(scheduler.execute(&replayed), 2);
    assert_eq!(
        view.dispatched(),
        vec![
            (PassContextKind::Draw { items: 0..2 }, 0),
            (PassContextKind::Draw { items: 2..6 }, 1),
        ]
    );
    assert!(pass.pass_contexts().is_empty());
    assert_eq!(scheduler.end_frame(), vec![pass.id()]);
}

#[test]
fn no_draw_plans_without_dispatching() {
    let pipeline = Arc::new(ScenePipelineContext::new(SceneRenderSettings {
        no_draw: true,
        ..lenient()
    }));
    let (pass, _device) = configured_pass(&pipeline, PassFlags::empty());
    let view = MockRenderView::new(vec![(RenderListId::General, opaque_items(4))]);

    pass.begin_execution(SubmissionMode::Immediate).unwrap();
    let planned = pass
        .draw_render_items(&as_dyn(&view), RenderListId::General, .., 0)
        .unwrap();
    pass.end_execution().unwrap();

    assert_eq!(planned, 1);
    assert_eq!(pass.render_item_group_count(), 1);
    assert!(view.dispatched().is_empty());
}

#[test]
fn concurrent_draws_get_unique_contiguous_groups() {
    let pipeline = Arc::new(ScenePipelineContext::new(lenient()));
    let (pass, _device) = configured_pass(&pipeline, PassFlags::empty());
    let view = MockRenderView::new(vec![(
        RenderListId::Transparent,
        transparent_items(5, &[1, 3]),
    )]);
    let dyn_view = as_dyn(&view);

    pass.begin_execution(SubmissionMode::Deferred).unwrap();
    let planned: usize = (0..16u32)
        .into_par_iter()
        .map(|list_id| {
            pass.draw_render_items(&dyn_view, RenderListId::Transparent, .., list_id)
                .unwrap()
        })
        .sum();
    pass.end_execution().unwrap();

    assert_eq!(planned, 16 * 5);
    let queued = pass.pass_contexts();
    let groups: Vec<u32> = queued.iter().map(|c| c.render_item_group).collect();
    assert_eq!(groups, (0..80).collect::<Vec<u32>>());

    // Contexts of one call stay adjacent.
    for chunk in queued.chunks(5) {
        assert!(chunk
            .iter()
            .all(|c| c.profiling_list_id == chunk[0].profiling_list_id));
    }

    assert_eq!(pass.execute(), 80);
    assert_eq!(view.drawn().len(), 16 * 5);
}

#[test]
fn parallel_replay_of_several_passes() {
    let scheduler = Arc::new(DeferredPassScheduler::active());
    let pipeline =
        Arc::new(ScenePipelineContext::new(lenient()).with_scheduler(scheduler.clone()));
    let view = MockRenderView::new(vec![(RenderListId::General, opaque_items(3))]);
    let passes: Vec<ScenePass> = (0..4)
        .map(|_| configured_pass(&pipeline, PassFlags::empty()).0)
        .collect();

    for pass in &passes {
        pass.begin_execution(SubmissionMode::Deferred).unwrap();
        pass.draw_render_items(&as_dyn(&view), RenderListId::General, .., 0)
            .unwrap();
        pass.end_execution().unwrap();
    }

    let refs: Vec<&dyn SceneRenderPass> = passes.iter().map(|p| p as &dyn SceneRenderPass).collect();
    assert_eq!(scheduler.execute_parallel(&refs), 4);
    assert_eq!(view.drawn().len(), 12);
    assert!(view.errors.lock().unwrap().is_empty());
}

// --- Collaborators ---

#[test]
fn stereo_provider_owns_viewports_when_it_sets_them() {
    let stereo = Arc::new(MockStereo {
        multi_res: true,
        owns_viewports: true,
        ..Default::default()
    });
    let pipeline = Arc::new(ScenePipelineContext::new(lenient()).with_stereo(stereo.clone()));
    let (pass, _device) = configured_pass(
        &pipeline,
        PassFlags::STEREO_PROJECTION | PassFlags::USE_STEREO_STATE,
    );
    assert_eq!(stereo.calls(), vec!["prepare", "prepare"]);

    let view = MockRenderView::new(vec![(RenderListId::General, opaque_items(1))]);
    pass.begin_execution(SubmissionMode::Immediate).unwrap();
    pass.draw_render_items(&as_dyn(&view), RenderListId::General, .., 0)
        .unwrap();
    pass.end_execution().unwrap();

    assert_eq!(stereo.calls(), vec!["prepare", "prepare", "set_state", "restore"]);
    assert!(!view
        .commands()
        .iter()
        .any(|c| matches!(c, Command::SetViewports(_) | Command::SetScissorRects(_))));
}

#[test]
fn stereo_constants_only_keep_pass_viewports() {
    let stereo = Arc::new(MockStereo::default());
    let pipeline = Arc::new(ScenePipelineContext::new(lenient()).with_stereo(stereo.clone()));
    let (pass, _device) = configured_pass(&pipeline, PassFlags::STEREO_PROJECTION);
    let mut recorder = MockRecorder::default();

    pass.begin_render_pass(&mut recorder, false).unwrap();
    pass.end_render_pass(&mut recorder, false).unwrap();

    assert_eq!(stereo.calls(), vec!["set_constants"]);
    assert!(recorder
        .commands
        .iter()
        .any(|c| matches!(c, Command::SetViewports(_))));
}

#[test]
fn profiler_section_and_observer_follow_contexts() {
    let profiler = Arc::new(MockProfiler::default());
    let observer = Arc::new(CountingObserver::new());
    let pipeline = Arc::new(
        ScenePipelineContext::new(lenient())
            .with_profiler(profiler.clone())
            .with_observer(observer.clone()),
    );
    let (pass, _device) = configured_pass(&pipeline, PassFlags::empty());
    let view = MockRenderView::new(vec![(
        RenderListId::Transparent,
        transparent_items(4, &[2]),
    )]);

    pass.begin_execution(SubmissionMode::Deferred).unwrap();
    pass.draw_render_items(&as_dyn(&view), RenderListId::Transparent, .., 7)
        .unwrap();
    pass.end_execution().unwrap();

    let queued = pass.pass_contexts();
    assert!(queued.iter().all(|c| c.profiler_section_index == Some(10)));
    assert!(queued.iter().all(|c| c.observer.is_some()));

    pass.execute();
    let snapshot = observer.snapshot();
    assert_eq!(snapshot.draw_contexts, 2);
    assert_eq!(snapshot.resolve_contexts, 1);
    assert_eq!(snapshot.drawn_items, 4);
}

#[test]
fn disabled_observer_is_not_attached() {
    let observer = Arc::new(CountingObserver::new());
    observer.set_enabled(false);
    let pipeline = Arc::new(ScenePipelineContext::new(lenient()).with_observer(observer.clone()));
    let (pass, _device) = configured_pass(&pipeline, PassFlags::empty());
    let view = MockRenderView::new(vec![(RenderListId::General, opaque_items(2))]);

    pass.begin_execution(SubmissionMode::Immediate).unwrap();
    pass.draw_render_items(&as_dyn(&view), RenderListId::General, .., 0)
        .unwrap();
    pass.end_execution().unwrap();

    assert_eq!(observer.snapshot().draw_contexts, 0);
    assert_eq!(view.dispatched().len(), 1);
}

// --- Render pass compilation ---

#[test]
fn render_pass_is_rebuilt_only_when_targets_change() {
    let pipeline = Arc::new(ScenePipelineContext::new(lenient()));
    let (mut pass, device) = configured_pass(&pipeline, PassFlags::empty());
    let first = pass.render_pass().unwrap();

    pass.update_render_pass(&device).unwrap();
    assert_eq!(device.created(), 1);

    pass.exchange_render_target(1, Some(tex(7)), ResourceViewHandle::DEFAULT)
        .unwrap();
    assert_eq!(pass.render_pass(), None);

    let second = pass.update_render_pass(&device).unwrap();
    assert_ne!(first, second);
    assert_eq!(device.created(), 2);
    assert_eq!(*device.released.lock().unwrap(), vec![first]);
}

#[test]
fn recording_a_stale_pass_is_reported() {
    let pipeline = Arc::new(ScenePipelineContext::new(lenient()));
    let (mut pass, _device) = configured_pass(&pipeline, PassFlags::empty());
    pass.exchange_depth_target(Some(tex(101)), ResourceViewHandle(1));

    let mut recorder = MockRecorder::default();
    assert!(matches!(
        pass.begin_render_pass(&mut recorder, false),
        Err(RenderError::Contract(ContractViolation::RenderPassNotPrepared { .. }))
    ));
    assert!(recorder.commands.is_empty());
}

#[test]
fn prepare_requires_pass_resources() {
    let pipeline = Arc::new(ScenePipelineContext::new(lenient()));
    let mut pass = ScenePass::new(pipeline);
    pass.set_render_targets(None, [Some(tex(1)), None, None, None]);
    let device = MockDevice::default();
    let mut recorder = MockRecorder::default();

    assert!(matches!(
        pass.prepare_for_use(&device, &mut recorder),
        Err(RenderError::Contract(ContractViolation::MissingPassResources { .. }))
    ));
    assert_eq!(device.created(), 0);
}

#[test]
fn prepare_transitions_pass_and_resources() {
    let pipeline = Arc::new(ScenePipelineContext::new(lenient()));
    let (mut pass, device) = configured_pass(&pipeline, PassFlags::empty());
    let mut recorder = MockRecorder::default();

    pass.prepare_for_use(&device, &mut recorder).unwrap();
    assert_eq!(
        recorder.commands,
        vec![
            Command::PrepareRenderPass(pass.render_pass().unwrap()),
            Command::PrepareResources(ResourceLayoutSlot::PerPass, ResourceSetId(5)),
        ]
    );
    assert_eq!(device.created(), 1);
}

#[test]
fn target_size_mismatches_are_diagnostics_only() {
    let observer = Arc::new(CountingObserver::new());
    let pipeline = Arc::new(
        ScenePipelineContext::new(SceneRenderSettings {
            strict_contracts: true,
            ..lenient()
        })
        .with_observer(observer.clone()),
    );
    let mut pass = ScenePass::new(pipeline);
    let small_depth = TargetTexture::new(TextureId(9), 640, 360);
    let half_color = TargetTexture::new(TextureId(2), 640, 360);

    pass.set_render_targets(Some(small_depth), [Some(tex(1)), Some(half_color), None, None]);

    let violations: Vec<ContractViolation> =
        observer.violations().into_iter().map(|(_, v)| v).collect();
    assert_eq!(
        violations,
        vec![
            ContractViolation::ColorTargetSizeMismatch {
                slot: 1,
                expected: WIDTH,
                found: 640
            },
            ContractViolation::DepthTargetTooSmall {
                depth_width: 640,
                color_width: WIDTH
            },
        ]
    );
    assert!(pass.descriptor().color_targets[1].is_some());
}

#[test]
fn exchanging_a_target_without_storage_is_reported() {
    let observer = Arc::new(CountingObserver::new());
    let pipeline = Arc::new(ScenePipelineContext::new(lenient()).with_observer(observer.clone()));
    let mut pass = ScenePass::new(pipeline);
    let evicted = TargetTexture {
        has_device_storage: false,
        ..tex(4)
    };

    pass.exchange_render_target(0, Some(evicted), ResourceViewHandle::DEFAULT)
        .unwrap();
    assert_eq!(
        observer.violations()[0].1,
        ContractViolation::MissingDeviceStorage {
            slot: TargetSlot::Color(0)
        }
    );
}

// --- Execution contracts ---

#[test]
fn executions_cannot_nest() {
    let pipeline = Arc::new(ScenePipelineContext::new(lenient()));
    let (a, _) = configured_pass(&pipeline, PassFlags::empty());
    let (b, _) = configured_pass(&pipeline, PassFlags::empty());

    a.begin_execution(SubmissionMode::Immediate).unwrap();
    assert!(matches!(
        b.begin_execution(SubmissionMode::Immediate),
        Err(RenderError::Contract(ContractViolation::ReentrantExecution { .. }))
    ));
    assert!(!b.is_executing());
    a.end_execution().unwrap();

    b.begin_execution(SubmissionMode::Immediate).unwrap();
    b.end_execution().unwrap();
    assert!(!pipeline.is_executing());
}

#[test]
fn drawing_outside_an_execution_is_rejected() {
    let pipeline = Arc::new(ScenePipelineContext::new(lenient()));
    let (pass, _device) = configured_pass(&pipeline, PassFlags::empty());
    let view = MockRenderView::new(vec![(RenderListId::General, opaque_items(2))]);

    assert!(matches!(
        pass.draw_render_items(&as_dyn(&view), RenderListId::General, .., 0),
        Err(RenderError::Contract(ContractViolation::NotExecuting { .. }))
    ));
    assert!(view.dispatched().is_empty());
}

#[test]
fn ending_twice_is_rejected() {
    let pipeline = Arc::new(ScenePipelineContext::new(lenient()));
    let (pass, _device) = configured_pass(&pipeline, PassFlags::empty());

    pass.begin_execution(SubmissionMode::Immediate).unwrap();
    pass.end_execution().unwrap();
    assert!(pass.end_execution().is_err());
    assert!(!pipeline.is_executing());
}

#[test]
#[should_panic(expected = "began execution while another execution is open")]
fn strict_pipeline_panics_on_nested_execution() {
    let pipeline = Arc::new(ScenePipelineContext::new(SceneRenderSettings {
        strict_contracts: true,
        ..lenient()
    }));
    let (a, _) = configured_pass(&pipeline, PassFlags::empty());
    let (b, _) = configured_pass(&pipeline, PassFlags::empty());

    a.begin_execution(SubmissionMode::Immediate).unwrap();
    let _ = b.begin_execution(SubmissionMode::Immediate);
}

#[test]
#[should_panic(expected = "received render items outside of an execution")]
fn strict_pipeline_panics_on_draw_outside_execution() {
    let pipeline = Arc::new(ScenePipelineContext::new(SceneRenderSettings {
        strict_contracts: true,
        ..lenient()
    }));
    let (pass, _device) = configured_pass(&pipeline, PassFlags::empty());
    let view = MockRenderView::new(vec![(RenderListId::General, opaque_items(2))]);

    let _ = pass.draw_render_items(&as_dyn(&view), RenderListId::General, .., 0);
}
