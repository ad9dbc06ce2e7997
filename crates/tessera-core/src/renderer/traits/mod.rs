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

//! Defines the collaborator contracts of the scene pass layer.
//!
//! These traits decouple pass planning and recording from any specific graphics
//! backend or engine subsystem.
//!
//! - [`CommandRecorder`]: Records GPU commands for one worker thread.
//! - [`GraphicsDevice`]: Compiles and releases render-pass objects.
//! - [`RenderView`]: Owns render lists and dispatches pass contexts.
//! - [`SceneRenderPass`]: The recording surface of a configured scene pass.
//! - [`PassScheduler`]: Decides whether passes replay later, possibly in parallel.
//! - [`StereoProjectionProvider`]: Multi-eye and multi-resolution viewport setup.
//! - [`PipelineProfiler`]: CPU-side profiler sections.
//! - [`AuxGeometry`]: Debug line drawing.

mod aux_geometry;
mod command_recorder;
mod graphics_device;
mod profiler;
mod render_view;
mod scene_pass;
mod scheduler;
mod stereo;

pub use self::aux_geometry::AuxGeometry;
pub use self::command_recorder::CommandRecorder;
pub use self::graphics_device::GraphicsDevice;
pub use self::profiler::PipelineProfiler;
pub use self::render_view::RenderView;
pub use self::scene_pass::SceneRenderPass;
pub use self::scheduler::PassScheduler;
pub use self::stereo::{NullStereoProjection, StereoProjectionProvider};
