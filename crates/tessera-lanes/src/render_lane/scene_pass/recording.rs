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

//! Turning one pass context into recorded commands.

use tessera_core::renderer::{
    BatchFlags, CommandRecorder, PassContext, PassContextKind, RenderError, RenderItem,
    SceneRenderPass,
};

/// Records `context` on `recorder` on behalf of `pass`.
///
/// This is what a render view's `draw_compiled_render_items` does with the
/// contexts it receives. A resolve context records the resolve copy. A draw
/// context brackets its items with the pass's begin and end, and hands every
/// item accepted by the context's filters to `draw_item`.
///
/// Returns the number of items handed to `draw_item`.
pub fn record_pass_context<F>(
    pass: &dyn SceneRenderPass,
    context: &PassContext,
    recorder: &mut dyn CommandRecorder,
    mut draw_item: F,
) -> Result<usize, RenderError>
where
    F: FnMut(&mut dyn CommandRecorder, &RenderItem),
{
    let items = match &context.kind {
        PassContextKind::Resolve { bounds } => {
            pass.resolve_pass(recorder, *bounds);
            return Ok(0);
        }
        PassContextKind::Draw { items } => items.clone(),
    };

    let list = context.view.render_items(context.render_list);
    let end = items.end.min(list.len());
    let slice = list.get(items.start.min(end)..end).unwrap_or_default();

    pass.begin_render_pass(recorder, context.render_nearest)?;

    let mut drawn = 0;
    for item in slice.iter().filter(|item| accepts(context, item.batch_flags)) {
        draw_item(recorder, item);
        drawn += 1;
    }

    pass.end_render_pass(recorder, context.render_nearest)?;
    Ok(drawn)
}

fn accepts(context: &PassContext, flags: BatchFlags) -> bool {
    let included = context.batch_filter == BatchFlags::all() || flags.intersects(context.batch_filter);
    included && !flags.intersects(context.exclude_filter)
}
