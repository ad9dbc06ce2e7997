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

use crate::renderer::api::Viewport;
use crate::renderer::traits::CommandRecorder;
use std::fmt::Debug;

/// The capability a stereo/VR projection subsystem exposes to scene passes.
///
/// Only passes flagged as stereo passes consult it; every other pass ignores it.
pub trait StereoProjectionProvider: Send + Sync + Debug {
    /// Returns `true` when multi-resolution stereo rendering is active.
    fn is_multi_res_enabled(&self) -> bool;

    /// Computes the projection parameters used for `viewport`.
    fn prepare_projection_parameters(&self, recorder: &mut dyn CommandRecorder, viewport: &Viewport);

    /// Applies the subsystem's rendering state for `viewport`.
    ///
    /// Returns `true` when the subsystem already set viewports and scissors, in
    /// which case the pass must not set its own.
    fn set_rendering_state(
        &self,
        recorder: &mut dyn CommandRecorder,
        viewport: &Viewport,
        use_projection_state: bool,
        require_constants: bool,
    ) -> bool;

    /// Restores the state changed by `set_rendering_state`.
    fn restore_state(&self, recorder: &mut dyn CommandRecorder);
}

/// The provider used when stereo rendering is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStereoProjection;

impl StereoProjectionProvider for NullStereoProjection {
    fn is_multi_res_enabled(&self) -> bool {
        false
    }

    fn prepare_projection_parameters(&self, _recorder: &mut dyn CommandRecorder, _viewport: &Viewport) {}

    fn set_rendering_state(
        &self,
        _recorder: &mut dyn CommandRecorder,
        _viewport: &Viewport,
        _use_projection_state: bool,
        _require_constants: bool,
    ) -> bool {
        false
    }

    fn restore_state(&self, _recorder: &mut dyn CommandRecorder) {}
}
