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

//! Backend-agnostic data types of the scene pass layer.
//!
//! Organized into several logical sub-modules:
//!
//! - **[`viewport`]**: Viewports, scissors and integer screen rectangles.
//! - **[`target`]**: Render targets, attachments and the render-pass descriptor.
//! - **[`resource`]**: Resource layout handles, depth bias and copy regions.
//! - **[`flags`]**: Batch and pass flag sets.
//! - **[`scene`]**: Render lists, render items and the camera.
//! - **[`pass_context`]**: The schedulable units of work produced for a pass.
//! - **[`settings`]**: Per-pipeline render settings.

pub mod flags;
pub mod pass_context;
pub mod resource;
pub mod scene;
pub mod settings;
pub mod target;
pub mod viewport;

pub use self::flags::*;
pub use self::pass_context::*;
pub use self::resource::*;
pub use self::scene::*;
pub use self::settings::*;
pub use self::target::*;
pub use self::viewport::*;
