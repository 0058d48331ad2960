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

//! The autocomplete engine collaborator.
//!
//! The engine ranks suggestions out of process. Requests go out through
//! [`AutocompleteEngine`]; results come back later as [`EngineEvent`]s, which
//! the host redelivers to the orchestrator on its own thread.

use crate::model::{NativeHandle, PageContext, Suggestion, SuggestionResult};
use std::time::Duration;

/// Identifies one dispatched request. Ids increase monotonically per orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RequestId(pub u64);

impl RequestId {
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub id: RequestId,
    pub text: String,
    pub cursor_position: usize,
    pub page: PageContext,
    pub prevent_inline_autocomplete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZeroPrefixRequest {
    pub id: RequestId,
    pub page: PageContext,
}

/// Where a navigation opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disposition {
    #[default]
    CurrentTab,
    NewTab,
    NewBackgroundTab,
}

/// Sent to the engine when the user picks a suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionReport {
    pub handle: NativeHandle,
    pub position: usize,
    pub disposition: Disposition,
    /// Time since the last input that started the request behind this result.
    pub elapsed_since_input: Option<Duration>,
    pub input_text: String,
}

/// One response to a request. A request yields zero or more partial results
/// followed by exactly one final result.
#[derive(Debug, Clone)]
pub struct EngineEvent {
    pub request: RequestId,
    pub result: SuggestionResult,
    pub is_final: bool,
}

pub trait AutocompleteEngine {
    fn start_query(&mut self, request: QueryRequest);

    fn start_zero_prefix_query(&mut self, request: ZeroPrefixRequest);

    /// Best-effort suggestion for raw text, used when a clicked suggestion is stale.
    fn classify(&mut self, text: &str, page: &PageContext) -> Option<Suggestion>;

    fn stop(&mut self, clear_results: bool);

    /// Marks the start of a fresh typing session.
    fn reset_edit_session(&mut self);

    fn delete_suggestion(&mut self, handle: NativeHandle);

    fn delete_suggestion_element(&mut self, handle: NativeHandle, element_index: usize);

    /// Prefetch hint. Returns whether a prefetch actually started.
    fn notify_touch_down(&mut self, handle: NativeHandle) -> bool;

    fn notify_selected(&mut self, report: &SelectionReport);

    /// Destination rewritten with the time the query was formulated, if the
    /// engine does that for this suggestion.
    fn updated_destination_url(
        &mut self,
        _handle: NativeHandle,
        _elapsed: Duration,
    ) -> Option<String> {
        None
    }
}
