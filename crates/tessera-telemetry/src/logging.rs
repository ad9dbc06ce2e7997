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

//! Logging bootstrap.

use env_logger::{Builder, Env};

/// Installs `env_logger` with an `info` default filter.
///
/// `RUST_LOG` overrides the default. Returns `false` when a logger was already
/// installed, which makes the call safe from tests and binaries alike.
pub fn init_logging() -> bool {
    init_logging_with_filter("info")
}

/// Installs `env_logger` with `default_filter` used when `RUST_LOG` is unset.
pub fn init_logging_with_filter(default_filter: &str) -> bool {
    Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .try_init()
        .is_ok()
}
