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

// Tessera Sandbox
// Drives a forward pass and a transparent pass through one immediate and one
// deferred frame against a headless backend.

mod headless;

use std::sync::Arc;

use anyhow::{Context, Result};
use tessera_core::renderer::{
    BatchFlags, PassFlags, RenderListId, RenderView, ResolveDebugLevel, ResourceLayoutId, ResourceSetId,
    SceneRenderPass, SceneRenderSettings, ShaderTechnique, SubmissionMode, TargetTexture,
    TextureId, Viewport,
};
use tessera_lanes::{DeferredPassScheduler, ScenePass, ScenePipelineContext};
use tessera_telemetry::CountingObserver;

use crate::headless::{HeadlessDevice, HeadlessView, LoggingAuxGeometry, LoggingRecorder};

const WIDTH: u32 = 1920;
const HEIGHT: u32 = 1080;

fn build_pass(
    pipeline: &Arc<ScenePipelineContext>,
    device: &HeadlessDevice,
    label: &str,
    stage: u32,
    include: BatchFlags,
    list: RenderListId,
) -> Result<ScenePass> {
    let scene_color = TargetTexture::new(TextureId(1), WIDTH, HEIGHT);
    let scene_copy = TargetTexture::new(TextureId(2), WIDTH, HEIGHT);
    let depth = TargetTexture::new(TextureId(3), WIDTH, HEIGHT);

    let mut pass = ScenePass::new(Arc::clone(pipeline));
    pass.set_label(label);
    pass.set_flags(PassFlags::RENDER_NEAREST);
    pass.setup_pass_context(
        stage,
        0,
        ShaderTechnique::General,
        include,
        Some(list),
        BatchFlags::empty(),
        true,
    )?;
    pass.set_render_targets(Some(depth), [Some(scene_color), None, None, None]);
    pass.set_viewport(Viewport::from_size(WIDTH as f32, HEIGHT as f32));
    pass.set_pass_resources(ResourceLayoutId(0), ResourceSetId(stage as usize));
    pass.set_resolve_textures(scene_color, scene_copy);

    let mut recorder = LoggingRecorder::default();
    pass.prepare_for_use(device, &mut recorder)
        .with_context(|| format!("failed to prepare pass '{label}'"))?;
    Ok(pass)
}

fn run_frame(
    frame: u32,
    pipeline: &ScenePipelineContext,
    scheduler: &DeferredPassScheduler,
    passes: &[&ScenePass],
    view: &Arc<HeadlessView>,
) -> Result<()> {
    let mode = SubmissionMode::for_frame(scheduler);
    log::info!("Frame {}: {:?} submission", frame, mode);

    let dyn_view: Arc<dyn RenderView> = view.clone();
    for pass in passes {
        let list = pass
            .render_list()
            .context("sandbox passes always bind a render list")?;
        pass.begin_execution(mode)?;
        let planned = pass.draw_render_items(&dyn_view, list, .., frame)?;
        pass.end_execution()?;
        log::info!(" -> '{}' planned {} contexts", pass.label(), planned);
    }

    if mode.is_deferred() {
        let replay: Vec<&dyn SceneRenderPass> =
            passes.iter().map(|pass| *pass as &dyn SceneRenderPass).collect();
        let dispatched = scheduler.execute_parallel(&replay);
        scheduler.end_frame();
        log::info!(" -> replayed {} deferred contexts", dispatched);
    }

    let (commands, copies, drawn) = view.take_counters();
    let stats = pipeline.reset_frame_statistics();
    log::info!(
        " -> {} commands, {} resolve copies, {} items drawn",
        commands,
        copies,
        drawn
    );
    log::info!(" -> resolve statistics: {}", stats.to_json()?);
    Ok(())
}

fn main() -> Result<()> {
    tessera_telemetry::init_logging();

    let settings = match std::env::args().nth(1) {
        Some(path) => SceneRenderSettings::load_from_path(path),
        None => SceneRenderSettings {
            partial_resolve_debug: ResolveDebugLevel::Wireframe,
            ..Default::default()
        },
    };

    let scheduler = Arc::new(DeferredPassScheduler::new());
    let observer = Arc::new(CountingObserver::new());
    let pipeline = Arc::new(
        ScenePipelineContext::new(settings)
            .with_scheduler(scheduler.clone())
            .with_aux_geometry(Arc::new(LoggingAuxGeometry))
            .with_observer(observer.clone()),
    );

    let device = HeadlessDevice::default();
    let forward = build_pass(
        &pipeline,
        &device,
        "FORWARD_OPAQUE",
        1,
        BatchFlags::GENERAL,
        RenderListId::ForwardOpaque,
    )?;
    let transparent = build_pass(
        &pipeline,
        &device,
        "TRANSPARENT",
        2,
        BatchFlags::TRANSPARENT,
        RenderListId::Transparent,
    )?;
    let view = Arc::new(HeadlessView::demo_scene(WIDTH as f32, HEIGHT as f32, 12, 16));

    let passes = [&forward, &transparent];
    run_frame(0, &pipeline, &scheduler, &passes, &view)?;
    scheduler.set_active(true);
    run_frame(1, &pipeline, &scheduler, &passes, &view)?;

    let snapshot = observer.snapshot();
    log::info!(
        "Sandbox: {} draw contexts, {} resolve contexts, {} violations over two frames",
        snapshot.draw_contexts,
        snapshot.resolve_contexts,
        snapshot.contract_violations
    );
    Ok(())
}
