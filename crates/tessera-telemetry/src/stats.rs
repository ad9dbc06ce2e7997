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

//! Frame-global statistics of inline resolves.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tessera_core::renderer::ScreenRect;

/// Counts the inline resolves of a frame and the pixels they copy.
///
/// Every pass of a pipeline records into the same instance from whichever
/// thread plans it. Accumulation is additive, so only the totals are
/// meaningful, never the interleaving.
#[derive(Debug, Default)]
pub struct ResolveStatistics {
    count: AtomicU64,
    pixels: AtomicU64,
}

/// A point-in-time copy of [`ResolveStatistics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResolveStatisticsSnapshot {
    /// Number of resolve rectangles recorded.
    pub resolve_count: u64,
    /// Sum of their clamped areas.
    pub resolve_pixel_count: u64,
}

impl ResolveStatistics {
    /// Creates zeroed statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one resolve over `bounds`.
    ///
    /// Inverted or empty rectangles count as a resolve but add no pixels.
    pub fn record(&self, bounds: &ScreenRect) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.pixels
            .fetch_add(bounds.clamped_area(), Ordering::Relaxed);
    }

    /// Returns the current totals.
    pub fn snapshot(&self) -> ResolveStatisticsSnapshot {
        ResolveStatisticsSnapshot {
            resolve_count: self.count.load(Ordering::Relaxed),
            resolve_pixel_count: self.pixels.load(Ordering::Relaxed),
        }
    }

    /// Returns the totals and starts a new frame from zero.
    pub fn reset(&self) -> ResolveStatisticsSnapshot {
        ResolveStatisticsSnapshot {
            resolve_count: self.count.swap(0, Ordering::Relaxed),
            resolve_pixel_count: self.pixels.swap(0, Ordering::Relaxed),
        }
    }
}

impl ResolveStatisticsSnapshot {
    /// Serializes the snapshot for frame reports.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
