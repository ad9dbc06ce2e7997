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

use std::fmt::Debug;

/// A CPU-side profiler that groups work recorded by several threads under one section.
pub trait PipelineProfiler: Send + Sync + Debug {
    /// Opens a section named `label` that worker threads may report into and
    /// returns its index.
    fn insert_multithreaded_section(&self, label: &str) -> u32;
}
