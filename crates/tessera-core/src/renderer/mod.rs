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

//! Provides the public, backend-agnostic contracts of the scene render-pass layer.
//!
//! This module defines the "common language" between a scene pass and the
//! systems around it. It contains the abstract `traits` (like [`CommandRecorder`]
//! and [`RenderView`]), plain data structures (like [`RenderPassDescriptor`] and
//! [`PassContext`]), and the error types that every operation reports.
//!
//! The 'how' lives elsewhere: `tessera-lanes` implements the pass itself, and a
//! graphics backend implements [`CommandRecorder`] and [`GraphicsDevice`].

pub mod api;
pub mod error;
pub mod traits;

// Re-export the most important traits and types for easier use.
pub use self::api::*;
pub use self::error::{ContractViolation, RenderError, ResourceError};
pub use self::traits::{
    AuxGeometry, CommandRecorder, GraphicsDevice, NullStereoProjection, PassScheduler,
    PipelineProfiler, RenderView, SceneRenderPass, StereoProjectionProvider,
};
