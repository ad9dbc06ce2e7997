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

//! Headless stand-ins for the backend the scene passes record into.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use log::{debug, trace, warn};
use tessera_core::math::{Aabb, LinearRgba, Mat4, Vec2, Vec3};
use tessera_core::renderer::{
    AuxGeometry, BatchFlags, Camera, CommandRecorder, CompiledObjectId, DepthBias,
    GraphicsDevice, PassContext, RenderItem, RenderListId, RenderPassDescriptor, RenderPassId,
    RenderView, ResourceError, ResourceLayoutId, ResourceLayoutSlot, ResourceSetId,
    SceneRenderPass, ScissorRect, StereoEye, TextureId, TextureRegionMapping, Viewport,
};
use tessera_lanes::record_pass_context;

/// Counts recorded commands and traces each one.
#[derive(Debug, Default)]
pub struct LoggingRecorder {
    pub commands: usize,
    pub copies: usize,
}

impl LoggingRecorder {
    fn log(&mut self, command: std::fmt::Arguments<'_>) {
        self.commands += 1;
        trace!("LoggingRecorder: {}", command);
    }
}

impl CommandRecorder for LoggingRecorder {
    fn begin_render_pass(&mut self, pass: RenderPassId, scissor: &ScissorRect) {
        self.log(format_args!("begin {:?} scissor {:?}", pass, scissor));
    }
    fn end_render_pass(&mut self, pass: RenderPassId) {
        self.log(format_args!("end {:?}", pass));
    }
    fn set_viewports(&mut self, viewports: &[Viewport]) {
        self.log(format_args!("viewports {:?}", viewports));
    }
    fn set_scissor_rects(&mut self, rects: &[ScissorRect]) {
        self.log(format_args!("scissors {:?}", rects));
    }
    fn set_resource_layout(&mut self, layout: ResourceLayoutId) {
        self.log(format_args!("layout {:?}", layout));
    }
    fn set_resources(&mut self, slot: ResourceLayoutSlot, set: ResourceSetId) {
        self.log(format_args!("resources {:?} -> {:?}", set, slot));
    }
    fn set_depth_bias(&mut self, bias: DepthBias) {
        self.log(format_args!("depth bias {:?}", bias));
    }
    fn prepare_render_pass_for_use(&mut self, pass: RenderPassId) {
        self.log(format_args!("prepare {:?}", pass));
    }
    fn prepare_resources_for_use(&mut self, slot: ResourceLayoutSlot, set: ResourceSetId) {
        self.log(format_args!("prepare resources {:?} for {:?}", set, slot));
    }
    fn copy_texture_region(
        &mut self,
        source: TextureId,
        destination: TextureId,
        mapping: &TextureRegionMapping,
    ) {
        self.copies += 1;
        self.log(format_args!(
            "copy {:?} -> {:?} extent {:?}",
            source, destination, mapping.extent
        ));
    }
}

/// Hands out render pass ids without touching a GPU.
#[derive(Debug, Default)]
pub struct HeadlessDevice {
    next_id: AtomicU64,
}

impl GraphicsDevice for HeadlessDevice {
    fn create_render_pass(
        &self,
        descriptor: &RenderPassDescriptor,
    ) -> Result<RenderPassId, ResourceError> {
        if descriptor.is_empty() {
            return Err(ResourceError::BackendError(
                "render pass has no attachments".to_owned(),
            ));
        }
        Ok(RenderPassId(self.next_id.fetch_add(1, Ordering::Relaxed)))
    }

    fn release_render_pass(&self, id: RenderPassId) -> Result<(), ResourceError> {
        debug!("HeadlessDevice: released {:?}", id);
        Ok(())
    }
}

/// Prints the wireframe resolve rectangles instead of drawing them.
#[derive(Debug, Default)]
pub struct LoggingAuxGeometry;

impl AuxGeometry for LoggingAuxGeometry {
    fn draw_lines_2d(&self, points: &[Vec2], color: LinearRgba) {
        debug!(
            "LoggingAuxGeometry: {} line points from {:?} to {:?} ({:?})",
            points.len(),
            points.first(),
            points.get(points.len() / 2),
            color
        );
    }
}

/// A render view with fixed render lists, recording everything it is handed.
#[derive(Debug)]
pub struct HeadlessView {
    lists: HashMap<RenderListId, Vec<RenderItem>>,
    camera: Camera,
    viewport: Viewport,
    recorder: Mutex<LoggingRecorder>,
    drawn_items: AtomicUsize,
}

impl HeadlessView {
    /// Builds a scene of `opaque` opaque items and `transparent` blended ones,
    /// every fourth blended item being refractive.
    pub fn demo_scene(width: f32, height: f32, opaque: u64, transparent: u64) -> Self {
        let item = |i: u64, batch_flags: BatchFlags| RenderItem {
            batch_flags,
            bounds: Aabb::from_center_half_extents(
                Vec3::new(i as f32 * 0.4 - 2.0, 0.0, 0.0),
                Vec3::splat(0.3),
            ),
            object: CompiledObjectId(i),
        };

        let opaque_items = (0..opaque)
            .map(|i| item(i, BatchFlags::GENERAL | BatchFlags::SHADOW_CASTER))
            .collect();
        let transparent_items = (0..transparent)
            .map(|i| {
                let mut flags = BatchFlags::TRANSPARENT;
                if i % 4 == 3 {
                    flags |= BatchFlags::REFRACTION;
                }
                item(opaque + i, flags)
            })
            .collect();

        let mut lists = HashMap::new();
        lists.insert(RenderListId::ForwardOpaque, opaque_items);
        lists.insert(RenderListId::Transparent, transparent_items);

        Self {
            lists,
            camera: Camera::new(
                Mat4::look_at_rh(Vec3::new(0.0, 1.0, 6.0), Vec3::ZERO, Vec3::Y),
                Mat4::perspective_rh(std::f32::consts::FRAC_PI_3, width / height, 0.1, 100.0),
            ),
            viewport: Viewport::from_size(width, height),
            recorder: Mutex::new(LoggingRecorder::default()),
            drawn_items: AtomicUsize::new(0),
        }
    }

    /// Returns `(commands, copies, drawn items)` recorded since the last call.
    pub fn take_counters(&self) -> (usize, usize, usize) {
        let mut recorder = self.recorder.lock().unwrap_or_else(PoisonError::into_inner);
        let counters = (
            recorder.commands,
            recorder.copies,
            self.drawn_items.swap(0, Ordering::Relaxed),
        );
        *recorder = LoggingRecorder::default();
        counters
    }
}

impl RenderView for HeadlessView {
    fn render_items(&self, list: RenderListId) -> &[RenderItem] {
        self.lists.get(&list).map(Vec::as_slice).unwrap_or(&[])
    }

    fn batch_flags(&self, list: RenderListId) -> BatchFlags {
        self.render_items(list)
            .iter()
            .fold(BatchFlags::empty(), |flags, item| flags | item.batch_flags)
    }

    fn current_eye(&self) -> StereoEye {
        StereoEye::Left
    }

    fn camera(&self, _eye: StereoEye) -> Camera {
        self.camera
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn draw_compiled_render_items(&self, pass: &dyn SceneRenderPass, context: &PassContext) {
        let mut recorder = self.recorder.lock().unwrap_or_else(PoisonError::into_inner);
        let result = record_pass_context(pass, context, &mut *recorder, |_, item| {
            trace!("HeadlessView: draw {:?}", item.object);
        });
        match result {
            Ok(drawn) => {
                self.drawn_items.fetch_add(drawn, Ordering::Relaxed);
            }
            Err(e) => warn!(
                "HeadlessView: pass '{}' failed to record group {}: {}",
                pass.label(),
                context.render_item_group,
                e
            ),
        }
    }
}
