// omnibox_suggestions — Omnibox suggestion sessions and dropdown rendering
// Copyright (C) 2025  Simon Peter Rothgang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::time::Duration;
use uuid::Uuid;

/// Counters for one suggestion session. Reset when the session ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionMetrics {
    pub requests_dispatched: u32,
    pub results_applied: u32,
    pub rebuilds_skipped: u32,
    pub cache_hits: u32,
    pub scrolled: bool,
    pub refine_count: u32,
    pub touch_downs: u32,
    pub prefetches_started: u32,
    /// Dispatch-to-final latency of the most recent completed request.
    pub last_latency: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub duration: Duration,
    pub metrics: SessionMetrics,
}

impl SessionSummary {
    pub(crate) fn record(&self) {
        let m = &self.metrics;
        tracing::info!(
            target: "metrics",
            session = %self.session_id,
            duration_ms = millis(self.duration),
            requests = m.requests_dispatched,
            applied = m.results_applied,
            skipped = m.rebuilds_skipped,
            cache_hits = m.cache_hits,
            scrolled = m.scrolled,
            refines = m.refine_count,
            touch_downs = m.touch_downs,
            prefetches = m.prefetches_started,
            latency_ms = m.last_latency.map(millis),
            "suggestion session ended"
        );
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
