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

//! Splits a render-item range into ordered draw and resolve contexts.

use std::ops::Range;

use log::trace;
use tessera_core::math::{LinearRgba, Vec2};
use tessera_core::renderer::{
    AuxGeometry, BatchFlags, PassContext, PassContextKind, ResolveDebugLevel,
    SceneRenderSettings, ScreenRect,
};
use tessera_telemetry::ResolveStatistics;

use super::resolve_bounds::compute_resolve_viewport;

/// Plans the pass contexts of one `draw_render_items` call.
///
/// Items that sample the scene behind them need an inline resolve right before
/// they draw. The planner walks the range and cuts it into runs, each starting
/// either at the range start or at an item needing a resolve, and injects a
/// resolve context in front of every run that starts with such an item:
///
/// ```text
/// items   0 1 2 [3] 4 5 6 [7] 8 9
/// output  D[0,3) R(3) D[3,7) R(7) D[7,10)
/// ```
pub struct PassBatchPlanner<'a> {
    settings: &'a SceneRenderSettings,
    statistics: &'a ResolveStatistics,
    aux_geometry: Option<&'a dyn AuxGeometry>,
}

impl<'a> PassBatchPlanner<'a> {
    /// Creates a planner reading `settings` and recording into `statistics`.
    pub fn new(settings: &'a SceneRenderSettings, statistics: &'a ResolveStatistics) -> Self {
        Self {
            settings,
            statistics,
            aux_geometry: None,
        }
    }

    /// Draws resolve rectangles through `aux_geometry` at the wireframe debug level.
    pub fn with_aux_geometry(mut self, aux_geometry: Option<&'a dyn AuxGeometry>) -> Self {
        self.aux_geometry = aux_geometry;
        self
    }

    /// Plans `range` of the template's render list.
    ///
    /// Every returned context is a copy of `template` with its kind and
    /// render-item group replaced. Groups are taken from `next_group`, which is
    /// advanced once per context. An empty range yields no context.
    pub fn plan(
        &self,
        template: &PassContext,
        range: Range<usize>,
        next_group: &mut u32,
    ) -> Vec<PassContext> {
        if range.is_empty() {
            return Vec::new();
        }

        let view = template.view.as_ref();
        let list = template.render_list;
        let list_flags = view.batch_flags(list);

        let mut contexts = Vec::new();
        let mut emit = |kind: PassContextKind, contexts: &mut Vec<PassContext>| {
            let mut context = template.clone();
            context.kind = kind;
            context.render_item_group = *next_group;
            *next_group += 1;
            contexts.push(context);
        };

        if !list.is_transparent() || !list_flags.needs_resolve() || !self.settings.refraction {
            emit(PassContextKind::Draw { items: range }, &mut contexts);
            return contexts;
        }

        let items = view.render_items(list);
        let end = range.end.min(items.len());
        let viewport = view.viewport();
        let camera = view.camera(view.current_eye());

        let mut i = range.start;
        while i < end {
            let first = &items[i];
            let run_start = i;

            // Extend the run up to, not including, the next item needing a resolve.
            i += 1;
            while i < end && !items[i].batch_flags.needs_resolve() {
                i += 1;
            }

            if first.batch_flags.needs_resolve() {
                let bounds = compute_resolve_viewport(
                    &viewport,
                    &first.bounds,
                    &camera,
                    first.batch_flags.contains(BatchFlags::RESOLVE_FULL),
                    self.settings.refraction_partial_resolves,
                );
                emit(PassContextKind::Resolve { bounds }, &mut contexts);
                self.instrument(&bounds);
            }

            emit(PassContextKind::Draw { items: run_start..i }, &mut contexts);
        }

        trace!(
            "Planned {} contexts for {:?} items {:?}",
            contexts.len(),
            list,
            range
        );
        contexts
    }

    fn instrument(&self, bounds: &ScreenRect) {
        let level = self.settings.partial_resolve_debug;
        if level >= ResolveDebugLevel::Statistics {
            self.statistics.record(bounds);
        }
        if level >= ResolveDebugLevel::Wireframe {
            if let Some(aux) = self.aux_geometry {
                aux.draw_lines_2d(&wireframe_quad(bounds), LinearRgba::MAGENTA.with_alpha(0.5));
            }
        }
    }
}

/// The four edges of `bounds` as line segment end points.
fn wireframe_quad(bounds: &ScreenRect) -> [Vec2; 8] {
    let (x0, y0) = (bounds.x0 as f32, bounds.y0 as f32);
    let (x1, y1) = (bounds.x1 as f32, bounds.y1 as f32);
    [
        Vec2::new(x0, y0),
        Vec2::new(x1, y0),
        Vec2::new(x1, y0),
        Vec2::new(x1, y1),
        Vec2::new(x1, y1),
        Vec2::new(x0, y1),
        Vec2::new(x0, y1),
        Vec2::new(x0, y0),
    ]
}
