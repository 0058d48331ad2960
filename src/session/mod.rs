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

//! Omnibox suggestion session state machine.
//!
//! The orchestrator owns everything that happens between the omnibox gaining
//! and losing focus: it debounces text into engine requests, keeps exactly one
//! request scheduled or in flight, serves cached zero-prefix results while the
//! engine is unavailable, rebuilds the dropdown when results change, and turns
//! user actions into engine calls and navigations.
//!
//! All entry points run on one thread. Delayed work goes through an internal
//! [`TaskQueue`]; the host calls [`SessionOrchestrator::run_due_tasks`] when
//! [`SessionOrchestrator::next_deadline`] passes.

mod clock;
mod metrics;
mod tasks;

pub use clock::{Clock, ManualClock, SystemClock, TokioClock};
pub use metrics::{SessionMetrics, SessionSummary};
pub use tasks::{TaskId, TaskQueue};

use crate::cache::SuggestionCache;
use crate::config::SuggestionsConfig;
use crate::dropdown::{
    BuildContext, ColorScheme, DropdownItemBuilder, DropdownListManager, LayoutDirection, ViewInfo,
};
use crate::engine::{
    AutocompleteEngine, Disposition, EngineEvent, QueryRequest, RequestId, SelectionReport,
    ZeroPrefixRequest,
};
use crate::error::SuggestionsError;
use crate::model::{NativeHandle, PageClass, PageContext, Suggestion, SuggestionResult};
use crate::selection::{SaturationMode, SelectionController};
use crate::surface::{NavigationDelegate, RenderingSurface};
use std::collections::HashSet;
use std::rc::Rc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Collaborators injected into the orchestrator.
pub struct SessionDeps {
    pub surface: Box<dyn RenderingSurface>,
    pub delegate: Box<dyn NavigationDelegate>,
    pub cache: SuggestionCache,
    pub clock: Rc<dyn Clock>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Inactive,
    ZeroPrefix,
    Typed,
}

/// Last zero-prefix classification of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ZeroPrefix {
    #[default]
    Unknown,
    Yes,
    No,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum RequestSpec {
    ZeroPrefix,
    Query { text: String, cursor_position: usize, prevent_inline_autocomplete: bool },
}

#[derive(Debug)]
enum Task {
    StartRequest(RequestSpec),
    FinishInteraction,
}

/// The most recently dispatched request.
#[derive(Debug)]
struct Dispatched {
    id: RequestId,
    page_class: PageClass,
    zero_prefix: bool,
    /// Cleared on cancel so latency is never attributed to a later request.
    started_at: Option<Instant>,
    awaiting_final: bool,
    /// Set when a text change supersedes the request; its late answers are dropped.
    cancelled: bool,
}

/// Per-session bookkeeping, reset when the session ends.
struct ActiveSession {
    id: Uuid,
    started_at: Instant,
    span: tracing::Span,
    page: PageContext,
    text: String,
    cursor_position: usize,
    last_input_at: Instant,
    metrics: SessionMetrics,
    prefetched: HashSet<NativeHandle>,
    touch_forwards: u32,
}

pub struct SessionOrchestrator {
    config: SuggestionsConfig,
    surface: Box<dyn RenderingSurface>,
    delegate: Box<dyn NavigationDelegate>,
    cache: SuggestionCache,
    clock: Rc<dyn Clock>,
    engine: Option<Box<dyn AutocompleteEngine>>,

    builder: DropdownItemBuilder,
    list: DropdownListManager,
    selection: SelectionController,
    current: SuggestionResult,

    tasks: TaskQueue<Task>,
    scheduled_request: Option<TaskId>,
    held_request: Option<RequestSpec>,
    last_request_id: RequestId,
    dispatched: Option<Dispatched>,

    session: Option<ActiveSession>,
    zero_prefix: ZeroPrefix,
    zero_prefix_cached: bool,
    window_focused: bool,
    last_summary: Option<SessionSummary>,
}

impl SessionOrchestrator {
    #[must_use]
    pub fn new(config: SuggestionsConfig, deps: SessionDeps) -> Self {
        Self::with_builder(config, deps, DropdownItemBuilder::with_default_processors())
    }

    /// Use a custom processor set.
    #[must_use]
    pub fn with_builder(
        config: SuggestionsConfig,
        deps: SessionDeps,
        builder: DropdownItemBuilder,
    ) -> Self {
        let list = DropdownListManager::new(config.margins, config.features);
        Self {
            config,
            surface: deps.surface,
            delegate: deps.delegate,
            cache: deps.cache,
            clock: deps.clock,
            engine: None,
            builder,
            list,
            selection: SelectionController::new(SaturationMode::Sentinel),
            current: SuggestionResult::empty(),
            tasks: TaskQueue::new(),
            scheduled_request: None,
            held_request: None,
            last_request_id: RequestId::default(),
            dispatched: None,
            session: None,
            zero_prefix: ZeroPrefix::Unknown,
            zero_prefix_cached: false,
            window_focused: true,
            last_summary: None,
        }
    }

    // --- State -----------------------------------------------------------

    #[must_use]
    pub fn state(&self) -> SessionState {
        match (&self.session, self.zero_prefix) {
            (None, _) => SessionState::Inactive,
            (Some(_), ZeroPrefix::Yes) => SessionState::ZeroPrefix,
            (Some(_), _) => SessionState::Typed,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    #[must_use]
    pub fn is_engine_ready(&self) -> bool {
        self.engine.is_some()
    }

    #[must_use]
    pub fn is_window_focused(&self) -> bool {
        self.window_focused
    }

    #[must_use]
    pub fn items(&self) -> &[ViewInfo] {
        self.list.items()
    }

    #[must_use]
    pub fn current_result(&self) -> &SuggestionResult {
        &self.current
    }

    #[must_use]
    pub fn selected_position(&self) -> Option<usize> {
        self.selection.position()
    }

    #[must_use]
    pub fn session_id(&self) -> Option<Uuid> {
        self.session.as_ref().map(|s| s.id)
    }

    #[must_use]
    pub fn text(&self) -> &str {
        self.session.as_ref().map_or("", |s| s.text.as_str())
    }

    #[must_use]
    pub fn metrics(&self) -> Option<&SessionMetrics> {
        self.session.as_ref().map(|s| &s.metrics)
    }

    /// Summary of the most recently ended session.
    #[must_use]
    pub fn last_session_summary(&self) -> Option<&SessionSummary> {
        self.last_summary.as_ref()
    }

    #[must_use]
    pub fn has_pending_request(&self) -> bool {
        self.scheduled_request.is_some() || self.held_request.is_some()
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.tasks.next_deadline()
    }

    // --- Engine lifecycle -------------------------------------------------

    /// Bind the engine. A request held while the engine was missing is replayed once.
    pub fn set_engine(&mut self, engine: Box<dyn AutocompleteEngine>) {
        self.engine = Some(engine);
        tracing::debug!("autocomplete engine bound");
        if let Some(spec) = self.held_request.take()
            && self.session.is_some()
        {
            tracing::debug!("replaying held request");
            self.start_request(spec);
        }
    }

    pub fn on_native_initialized(&mut self) {
        self.builder.on_native_initialized();
    }

    // --- Focus ------------------------------------------------------------

    pub fn on_omnibox_focus_gained(
        &mut self,
        page: PageContext,
        text: &str,
        force_zero_prefix: bool,
    ) {
        if self.session.is_some() {
            tracing::debug!("focus gained while a session is active; ignoring");
            return;
        }
        let now = self.clock.now();
        let id = Uuid::new_v4();
        let span = tracing::debug_span!("session", id = %id);
        let _guard = span.clone().entered();
        let cursor_position = text.chars().count();
        tracing::debug!(
            page_class = ?page.page_class,
            zero_prefix = text.is_empty() || force_zero_prefix,
            "session started"
        );

        self.session = Some(ActiveSession {
            id,
            started_at: now,
            span,
            page,
            text: text.to_owned(),
            cursor_position,
            last_input_at: now,
            metrics: SessionMetrics::default(),
            prefetched: HashSet::new(),
            touch_forwards: 0,
        });
        self.builder.on_session_state_change(true);
        self.surface.notify_session_active(true);

        if text.is_empty() || force_zero_prefix {
            self.zero_prefix = ZeroPrefix::Yes;
            self.zero_prefix_cached = false;
            self.serve_cached_result();
            self.start_request(RequestSpec::ZeroPrefix);
        } else {
            self.zero_prefix = ZeroPrefix::No;
            let spec = RequestSpec::Query {
                text: text.to_owned(),
                cursor_position,
                prevent_inline_autocomplete: false,
            };
            self.schedule_request(spec, self.config.debounce());
        }
    }

    pub fn on_omnibox_focus_lost(&mut self) {
        if self.session.is_some() {
            self.end_session();
        }
    }

    pub fn on_window_focus_changed(&mut self, focused: bool) {
        self.window_focused = focused;
        if focused && let Some(session) = &self.session {
            let spec = self.spec_for(&session.text, session.cursor_position, false);
            let delay = self.delay_for(&spec);
            self.schedule_request(spec, delay);
        }
    }

    // --- Input ------------------------------------------------------------

    pub fn on_text_changed(&mut self, text: &str, cursor_position: usize) {
        let Some(session) = self.session.as_mut() else {
            tracing::debug!("text changed without an active session; ignoring");
            return;
        };
        let _guard = session.span.clone().entered();
        let deleted = text.chars().count() < session.text.chars().count();
        session.text = text.to_owned();
        session.cursor_position = cursor_position;
        session.last_input_at = self.clock.now();

        self.cancel_requests();

        let classification = if text.is_empty() { ZeroPrefix::Yes } else { ZeroPrefix::No };
        if classification != self.zero_prefix {
            tracing::debug!(
                from = ?self.zero_prefix,
                to = ?classification,
                "zero-prefix state changed"
            );
            match classification {
                ZeroPrefix::No => {
                    if let Some(engine) = self.engine.as_mut() {
                        engine.reset_edit_session();
                    }
                }
                ZeroPrefix::Yes | ZeroPrefix::Unknown => self.zero_prefix_cached = false,
            }
            self.zero_prefix = classification;
        }

        let spec = self.spec_for(text, cursor_position, deleted);
        let delay = self.delay_for(&spec);
        self.schedule_request(spec, delay);
    }

    /// Replace the omnibox text with a suggestion's fill text and keep typing from there.
    pub fn on_refine(&mut self, suggestion: &Suggestion) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.metrics.refine_count += 1;
        let text = suggestion.fill_text().to_owned();
        self.delegate.set_omnibox_text(&text);
        self.on_text_changed(&text, text.chars().count());
    }

    pub fn on_suggestions_scrolled(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if !session.metrics.scrolled {
            session.metrics.scrolled = true;
            self.delegate.hide_keyboard();
        }
    }

    // --- Engine results ---------------------------------------------------

    pub fn on_suggestions_received(&mut self, event: EngineEvent) {
        let span = self.session.as_ref().map_or_else(tracing::Span::none, |s| s.span.clone());
        let _guard = span.entered();

        let Some(dispatched) = self.dispatched.as_mut() else {
            tracing::debug!(
                request = event.request.0,
                "result without a dispatched request; dropping"
            );
            return;
        };
        if event.request != dispatched.id {
            tracing::debug!(
                request = event.request.0,
                current = dispatched.id.0,
                "stale result; dropping"
            );
            return;
        }
        if dispatched.cancelled {
            tracing::debug!(request = event.request.0, "result of a cancelled request; dropping");
            return;
        }

        let mut latency = None;
        if event.is_final {
            dispatched.awaiting_final = false;
            let now = self.clock.now();
            latency = dispatched.started_at.take().map(|at| now.saturating_duration_since(at));
            if dispatched.zero_prefix
                && !self.zero_prefix_cached
                && !event.result.is_empty()
                && self.config.is_cacheable(dispatched.page_class)
            {
                let page_class = dispatched.page_class;
                match self.cache.save(page_class, &event.result) {
                    Ok(()) => self.zero_prefix_cached = !event.result.is_from_cache(),
                    Err(err) => tracing::warn!("failed to cache zero-prefix result: {err}"),
                }
            }
        }

        let Some(session) = self.session.as_mut() else {
            tracing::debug!(request = event.request.0, "result arrived after session end");
            return;
        };
        if latency.is_some() {
            session.metrics.last_latency = latency;
        }
        self.apply_result(event.result, event.is_final);
    }

    // --- User actions -----------------------------------------------------

    pub fn on_suggestion_clicked(
        &mut self,
        suggestion: &Suggestion,
        position: usize,
        disposition: Disposition,
    ) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let _guard = session.span.clone().entered();
        let elapsed = self.clock.now().saturating_duration_since(session.last_input_at);
        let input_text = session.text.clone();
        self.cancel_scheduled_request();

        let handle = suggestion.handle();
        let url = if self.current.owns(handle) {
            let report = SelectionReport {
                handle,
                position,
                disposition,
                elapsed_since_input: Some(elapsed),
                input_text,
            };
            let rewritten = self.engine.as_mut().and_then(|engine| {
                engine.notify_selected(&report);
                engine.updated_destination_url(handle, elapsed)
            });
            rewritten.unwrap_or_else(|| suggestion.url().to_owned())
        } else {
            let text =
                if input_text.is_empty() { suggestion.fill_text() } else { input_text.as_str() };
            tracing::debug!(?handle, "clicked suggestion is stale; classifying text instead");
            match self.classify(text) {
                Some(url) => url,
                None => {
                    tracing::debug!("stale suggestion could not be classified; ignoring click");
                    return;
                }
            }
        };

        self.navigate(&url, disposition);
    }

    /// Enter on the omnibox: open the selected entry, or classify the typed text.
    pub fn on_enter(&mut self, disposition: Disposition) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let selected = self
            .selection
            .position()
            .and_then(|index| self.list.items().get(index))
            .and_then(ViewInfo::suggestion)
            .map(|(position, suggestion)| (position, suggestion.clone()));
        if let Some((position, suggestion)) = selected {
            self.on_suggestion_clicked(&suggestion, position, disposition);
            return;
        }

        let text = session.text.clone();
        if text.is_empty() {
            return;
        }
        self.cancel_scheduled_request();
        if let Some(url) = self.classify(&text) {
            self.navigate(&url, disposition);
        }
    }

    /// Press without release. Forwarded as a prefetch hint within the per-session budget.
    pub fn on_suggestion_touch_down(&mut self, suggestion: &Suggestion) {
        let handle = suggestion.handle();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if !self.current.owns(handle) {
            return;
        }
        session.metrics.touch_downs += 1;
        if session.touch_forwards >= self.config.touch_prefetch_budget
            || session.prefetched.contains(&handle)
        {
            return;
        }
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        session.touch_forwards += 1;
        session.prefetched.insert(handle);
        if engine.notify_touch_down(handle) {
            session.metrics.prefetches_started += 1;
        }
    }

    pub fn on_delete_suggestion(&mut self, suggestion: &Suggestion) {
        let handle = suggestion.handle();
        if !self.current.owns(handle) || !suggestion.is_deletable() {
            tracing::debug!(?handle, "delete ignored for stale or undeletable suggestion");
            return;
        }
        if let Some(engine) = self.engine.as_mut() {
            engine.delete_suggestion(handle);
        }
    }

    pub fn on_delete_action_element(&mut self, suggestion: &Suggestion, element_index: usize) {
        let handle = suggestion.handle();
        if !self.current.owns(handle) {
            tracing::debug!(?handle, "element delete ignored for stale suggestion");
            return;
        }
        if let Some(engine) = self.engine.as_mut() {
            engine.delete_suggestion_element(handle, element_index);
        }
    }

    // --- Keyboard navigation ----------------------------------------------

    pub fn select_next(&mut self) -> bool {
        let moved = self.selection.select_next_item(&mut self.list);
        self.surface.apply_view_info_list(self.list.items());
        moved
    }

    pub fn select_previous(&mut self) -> bool {
        let moved = self.selection.select_previous_item(&mut self.list);
        self.surface.apply_view_info_list(self.list.items());
        moved
    }

    // --- Presentation -----------------------------------------------------

    pub fn set_layout_direction(&mut self, direction: LayoutDirection) {
        self.list.set_layout_direction(direction);
        self.surface.set_layout_direction(direction);
        self.surface.apply_view_info_list(self.list.items());
    }

    pub fn set_color_scheme(&mut self, scheme: ColorScheme) {
        self.list.set_color_scheme(scheme);
        self.surface.set_color_scheme(scheme);
        self.surface.apply_view_info_list(self.list.items());
    }

    // --- Scheduling -------------------------------------------------------

    /// Run every task whose deadline has passed.
    pub fn run_due_tasks(&mut self) {
        while let Some(task) = self.tasks.pop_due(self.clock.now()) {
            match task {
                Task::StartRequest(spec) => {
                    self.scheduled_request = None;
                    self.start_request(spec);
                }
                Task::FinishInteraction => {
                    if self.session.is_some() {
                        self.delegate.clear_omnibox_focus();
                        self.end_session();
                    }
                }
            }
        }
    }

    fn spec_for(&self, text: &str, cursor_position: usize, deleted: bool) -> RequestSpec {
        if text.is_empty() {
            RequestSpec::ZeroPrefix
        } else {
            RequestSpec::Query {
                text: text.to_owned(),
                cursor_position,
                prevent_inline_autocomplete: deleted || cursor_position < text.chars().count(),
            }
        }
    }

    fn delay_for(&self, spec: &RequestSpec) -> Duration {
        match spec {
            RequestSpec::ZeroPrefix => Duration::ZERO,
            RequestSpec::Query { .. } => self.config.debounce(),
        }
    }

    /// Replace whatever request is scheduled or held with `spec`.
    fn schedule_request(&mut self, spec: RequestSpec, delay: Duration) {
        self.cancel_scheduled_request();
        self.held_request = None;
        let due = self.clock.now() + delay;
        self.scheduled_request = Some(self.tasks.post(due, Task::StartRequest(spec)));
    }

    fn cancel_scheduled_request(&mut self) {
        if let Some(id) = self.scheduled_request.take() {
            self.tasks.cancel(id);
        }
    }

    /// Drop the scheduled, held and in-flight requests.
    fn cancel_requests(&mut self) {
        self.cancel_scheduled_request();
        self.held_request = None;
        let Some(dispatched) = self.dispatched.as_mut() else {
            return;
        };
        dispatched.cancelled = true;
        dispatched.started_at = None;
        if dispatched.awaiting_final {
            dispatched.awaiting_final = false;
            if let Some(engine) = self.engine.as_mut() {
                engine.stop(false);
            }
        }
    }

    fn start_request(&mut self, spec: RequestSpec) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(engine) = self.engine.as_mut() else {
            tracing::debug!("engine not ready; holding request");
            self.held_request = Some(spec);
            return;
        };

        let id = self.last_request_id.next();
        self.last_request_id = id;
        let page = session.page.clone();
        let page_class = page.page_class;
        let zero_prefix = matches!(spec, RequestSpec::ZeroPrefix);
        match spec {
            RequestSpec::ZeroPrefix => {
                engine.start_zero_prefix_query(ZeroPrefixRequest { id, page });
            }
            RequestSpec::Query { text, cursor_position, prevent_inline_autocomplete } => {
                engine.start_query(QueryRequest {
                    id,
                    text,
                    cursor_position,
                    page,
                    prevent_inline_autocomplete,
                });
            }
        }
        session.metrics.requests_dispatched += 1;
        tracing::debug!(request = id.0, zero_prefix, "request dispatched");
        self.dispatched = Some(Dispatched {
            id,
            page_class,
            zero_prefix,
            started_at: Some(self.clock.now()),
            awaiting_final: true,
            cancelled: false,
        });
    }

    /// Cached results only bridge the time before the engine is bound.
    fn serve_cached_result(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let page_class = session.page.page_class;
        if self.engine.is_some() || !self.config.is_cacheable(page_class) {
            return;
        }
        let cached = self.cache.load(page_class);
        if cached.is_empty() {
            return;
        }
        session.metrics.cache_hits += 1;
        tracing::debug!(suggestions = cached.len(), "serving cached zero-prefix result");
        self.apply_result(cached, false);
    }

    fn apply_result(&mut self, result: SuggestionResult, is_final: bool) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if result == self.current {
            crate::perf::mark("session::rebuild_skipped");
            session.metrics.rebuilds_skipped += 1;
            self.current = result;
            self.list.rebind_handles(&self.current);
            self.surface.notify_list_final(is_final);
            return;
        }

        let ctx = BuildContext { page: &session.page, features: self.config.features };
        match self.builder.build(&ctx, &result) {
            Ok(items) => {
                session.metrics.results_applied += 1;
                self.list.set_result(items, result.groups().clone());
                self.selection.reset(&mut self.list);
                self.current = result;
                self.surface.apply_view_info_list(self.list.items());
                self.surface.notify_list_final(is_final);
            }
            Err(err) => report_configuration_error(&err),
        }
    }

    fn classify(&mut self, text: &str) -> Option<String> {
        let page = &self.session.as_ref()?.page;
        let suggestion = self.engine.as_mut()?.classify(text, page)?;
        let url = suggestion.url();
        if url.is_empty() { None } else { Some(url.to_owned()) }
    }

    fn navigate(&mut self, url: &str, disposition: Disposition) {
        tracing::debug!(url, ?disposition, "navigating");
        self.delegate.navigate(url, disposition);
        // Focus is cleared after navigation dispatch, never inside it.
        self.tasks.post(self.clock.now(), Task::FinishInteraction);
    }

    fn end_session(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        let _guard = session.span.clone().entered();
        self.cancel_scheduled_request();
        self.held_request = None;
        if let Some(dispatched) = self.dispatched.as_mut() {
            // The request may still finish and be cached, but its latency is no longer tracked.
            dispatched.started_at = None;
        }
        self.tasks.clear();

        self.list.clear();
        self.selection.reset(&mut self.list);
        self.current = SuggestionResult::empty();
        self.surface.apply_view_info_list(&[]);
        self.surface.notify_session_active(false);
        self.builder.on_session_state_change(false);
        self.zero_prefix = ZeroPrefix::Unknown;

        let summary = SessionSummary {
            session_id: session.id,
            duration: self.clock.now().saturating_duration_since(session.started_at),
            metrics: session.metrics,
        };
        summary.record();
        self.last_summary = Some(summary);
    }
}

fn report_configuration_error(err: &SuggestionsError) {
    tracing::error!("dropdown build failed: {err}");
    debug_assert!(!err.is_configuration_error(), "dropdown configuration error: {err}");
}
