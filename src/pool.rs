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

//! Recycled view pool with asynchronous prewarming.
//!
//! Views are expensive to build, so the pool fills itself ahead of the first
//! session on the local task set, one view per scheduler turn. Consumers call
//! [`RecycledViewPool::acquire`] and build a view themselves only when the
//! pool for that type is empty.

use crate::dropdown::ViewType;
use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Builds a view of the given type.
pub trait ViewFactory<V> {
    fn create_view(&self, view_type: ViewType) -> V;
}

/// Created/reused counts for one suggestion session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewReuseStats {
    pub created: usize,
    pub reused: usize,
}

#[derive(Debug)]
pub enum Acquired<V> {
    Reused(V),
    /// The pool is empty for this type; the caller builds the view.
    MustCreate,
}

struct PoolState<V> {
    views: BTreeMap<ViewType, VecDeque<V>>,
    prewarmed: BTreeMap<ViewType, usize>,
    session: ViewReuseStats,
}

impl<V> PoolState<V> {
    fn pooled(&self, view_type: ViewType) -> usize {
        self.views.get(&view_type).map_or(0, VecDeque::len)
    }
}

pub struct RecycledViewPool<V> {
    state: Rc<RefCell<PoolState<V>>>,
    factory: Rc<dyn ViewFactory<V>>,
    caps: BTreeMap<ViewType, usize>,
    prewarm_enabled: bool,
    prewarm_token: Option<CancellationToken>,
}

impl<V: 'static> RecycledViewPool<V> {
    /// `low_end_device` disables prewarming; acquire then always reports `MustCreate`.
    pub fn new(
        factory: Rc<dyn ViewFactory<V>>,
        caps: BTreeMap<ViewType, usize>,
        low_end_device: bool,
    ) -> Self {
        Self {
            state: Rc::new(RefCell::new(PoolState {
                views: BTreeMap::new(),
                prewarmed: BTreeMap::new(),
                session: ViewReuseStats::default(),
            })),
            factory,
            caps,
            prewarm_enabled: !low_end_device,
            prewarm_token: None,
        }
    }

    fn cap(&self, view_type: ViewType) -> usize {
        self.caps.get(&view_type).copied().unwrap_or(0)
    }

    /// Start building views in the background. Must run inside a `LocalSet`.
    /// Replaces any prewarm already in progress.
    pub fn prewarm(&mut self, counts: &[(ViewType, usize)]) -> Option<JoinHandle<()>> {
        if !self.prewarm_enabled {
            tracing::debug!("view prewarm skipped on low-end device");
            return None;
        }
        self.stop_creating_views();

        let plan: Vec<(ViewType, usize)> = counts
            .iter()
            .map(|&(view_type, count)| (view_type, count.min(self.cap(view_type))))
            .collect();
        let token = CancellationToken::new();
        self.prewarm_token = Some(token.clone());
        let state = Rc::clone(&self.state);
        let factory = Rc::clone(&self.factory);
        Some(tokio::task::spawn_local(fill(state, factory, plan, token)))
    }

    /// Token of the prewarm in progress, if any.
    #[must_use]
    pub fn prewarm_token(&self) -> Option<CancellationToken> {
        self.prewarm_token.clone()
    }

    /// Cancel prewarming. Views built so far stay pooled.
    pub fn stop_creating_views(&mut self) {
        if let Some(token) = self.prewarm_token.take() {
            token.cancel();
        }
    }

    pub fn acquire(&mut self, view_type: ViewType) -> Acquired<V> {
        let mut state = self.state.borrow_mut();
        match state.views.get_mut(&view_type).and_then(VecDeque::pop_front) {
            Some(view) => {
                state.session.reused += 1;
                Acquired::Reused(view)
            }
            None => {
                state.session.created += 1;
                Acquired::MustCreate
            }
        }
    }

    /// Return a view for reuse. Views beyond the per-type cap are dropped.
    pub fn release(&mut self, view_type: ViewType, view: V) {
        if !self.prewarm_enabled {
            return;
        }
        let cap = self.cap(view_type);
        let mut state = self.state.borrow_mut();
        if state.pooled(view_type) < cap {
            state.views.entry(view_type).or_default().push_back(view);
        }
    }

    #[must_use]
    pub fn pooled(&self, view_type: ViewType) -> usize {
        self.state.borrow().pooled(view_type)
    }

    /// Views built by prewarming since the pool was created or destroyed.
    #[must_use]
    pub fn prewarmed(&self, view_type: ViewType) -> usize {
        self.state.borrow().prewarmed.get(&view_type).copied().unwrap_or(0)
    }

    /// Take and reset the counts of the session that just ended.
    pub fn flush_session_stats(&mut self) -> ViewReuseStats {
        let stats = std::mem::take(&mut self.state.borrow_mut().session);
        tracing::info!(
            target: "metrics",
            created = stats.created,
            reused = stats.reused,
            "view reuse"
        );
        stats
    }

    /// Cancel prewarming and release every pooled view.
    pub fn destroy(&mut self) {
        self.stop_creating_views();
        let mut state = self.state.borrow_mut();
        state.views.clear();
        state.prewarmed.clear();
        state.session = ViewReuseStats::default();
    }
}

impl<V> Drop for RecycledViewPool<V> {
    fn drop(&mut self) {
        if let Some(token) = self.prewarm_token.take() {
            token.cancel();
        }
    }
}

async fn fill<V>(
    state: Rc<RefCell<PoolState<V>>>,
    factory: Rc<dyn ViewFactory<V>>,
    plan: Vec<(ViewType, usize)>,
    token: CancellationToken,
) {
    for (view_type, count) in plan {
        // Views acquired while prewarming are not rebuilt.
        let missing = count.saturating_sub(state.borrow().pooled(view_type));
        for _ in 0..missing {
            if token.is_cancelled() {
                return;
            }
            let view = {
                let _t = crate::perf::start("pool::create_view");
                factory.create_view(view_type)
            };
            if token.is_cancelled() {
                return;
            }
            {
                let mut state = state.borrow_mut();
                state.views.entry(view_type).or_default().push_back(view);
                *state.prewarmed.entry(view_type).or_default() += 1;
            }
            tokio::task::yield_now().await;
        }
    }
    tracing::debug!("view prewarm finished");
}
