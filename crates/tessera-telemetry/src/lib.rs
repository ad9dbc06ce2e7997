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

//! # Tessera Telemetry
//!
//! Concrete telemetry for the scene pass layer:
//!
//! - [`logging`]: the `env_logger` bootstrap used by binaries and tests.
//! - [`stats`]: frame-global resolve statistics shared by every pass of a pipeline.
//! - [`observer`]: a counting [`DrawCallObserver`](tessera_core::telemetry::DrawCallObserver).

#![warn(missing_docs)]

pub mod logging;
pub mod observer;
pub mod stats;

pub use self::logging::{init_logging, init_logging_with_filter};
pub use self::observer::{CountingObserver, DrawCallSnapshot};
pub use self::stats::{ResolveStatistics, ResolveStatisticsSnapshot};
