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

//! Suggestion data shared by the engine, the cache and the dropdown.
//!
//! A [`SuggestionResult`] is produced by the engine (or restored from the
//! cache) and owns its suggestions. Every suggestion carries a [`NativeHandle`]
//! stamped with the epoch of the result that created it; once the orchestrator
//! replaces its current result, handles from the old one stop validating.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of a single suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionType {
    SearchWhatYouTyped,
    SearchHistory,
    SearchSuggest,
    SearchSuggestEntity,
    UrlWhatYouTyped,
    HistoryUrl,
    Bookmark,
    Navsuggest,
    ClipboardUrl,
    ClipboardText,
    Answer,
    Tile,
}

impl SuggestionType {
    #[must_use]
    pub const fn is_search(self) -> bool {
        matches!(
            self,
            Self::SearchWhatYouTyped
                | Self::SearchHistory
                | Self::SearchSuggest
                | Self::SearchSuggestEntity
                | Self::ClipboardText
                | Self::Answer
        )
    }

    #[must_use]
    pub const fn is_clipboard(self) -> bool {
        matches!(self, Self::ClipboardUrl | Self::ClipboardText)
    }
}

/// Opaque reference into the engine's result set.
///
/// Handles restored from the cache are [`NativeHandle::DETACHED`] and never
/// validate against a live result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NativeHandle {
    epoch: u64,
    slot: usize,
}

impl NativeHandle {
    pub const DETACHED: Self = Self { epoch: 0, slot: 0 };

    #[must_use]
    pub const fn new(epoch: u64, slot: usize) -> Self {
        Self { epoch, slot }
    }

    #[must_use]
    pub const fn epoch(self) -> u64 {
        self.epoch
    }

    #[must_use]
    pub const fn slot(self) -> usize {
        self.slot
    }

    #[must_use]
    pub const fn is_detached(self) -> bool {
        self.epoch == 0
    }
}

/// Monotonic source of result epochs. Epoch 0 is reserved for detached results.
#[derive(Debug, Clone, Default)]
pub struct EpochClock {
    last: u64,
}

impl EpochClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_epoch(&mut self) -> u64 {
        self.last = self.last.wrapping_add(1).max(1);
        self.last
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Call,
    Directions,
    SwitchToTab,
    Reviews,
}

/// Executable action attached to a suggestion (rendered as a chip).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionAction {
    pub kind: ActionKind,
    pub label: String,
    pub target_url: String,
}

/// One autocomplete suggestion. Immutable once received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    kind: SuggestionType,
    display_text: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    fill_text: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    group_id: Option<u32>,
    #[serde(default)]
    deletable: bool,
    #[serde(default)]
    actions: Vec<SuggestionAction>,
    #[serde(skip)]
    handle: NativeHandle,
}

impl Suggestion {
    pub fn new(kind: SuggestionType, display_text: impl Into<String>) -> Self {
        Self {
            kind,
            display_text: display_text.into(),
            description: String::new(),
            fill_text: String::new(),
            url: String::new(),
            group_id: None,
            deletable: false,
            actions: Vec::new(),
            handle: NativeHandle::DETACHED,
        }
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_fill_text(mut self, fill_text: impl Into<String>) -> Self {
        self.fill_text = fill_text.into();
        self
    }

    #[must_use]
    pub fn with_group(mut self, group_id: u32) -> Self {
        self.group_id = Some(group_id);
        self
    }

    #[must_use]
    pub fn with_deletable(mut self, deletable: bool) -> Self {
        self.deletable = deletable;
        self
    }

    #[must_use]
    pub fn with_action(mut self, action: SuggestionAction) -> Self {
        self.actions.push(action);
        self
    }

    #[must_use]
    pub fn kind(&self) -> SuggestionType {
        self.kind
    }

    #[must_use]
    pub fn display_text(&self) -> &str {
        &self.display_text
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Text placed in the omnibox when the suggestion is refined.
    /// Falls back to the display text when the engine left it empty.
    #[must_use]
    pub fn fill_text(&self) -> &str {
        if self.fill_text.is_empty() { &self.display_text } else { &self.fill_text }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn group_id(&self) -> Option<u32> {
        self.group_id
    }

    #[must_use]
    pub fn is_deletable(&self) -> bool {
        self.deletable
    }

    #[must_use]
    pub fn is_search_type(&self) -> bool {
        self.kind.is_search()
    }

    #[must_use]
    pub fn actions(&self) -> &[SuggestionAction] {
        &self.actions
    }

    #[must_use]
    pub fn handle(&self) -> NativeHandle {
        self.handle
    }

    pub(crate) fn attach(&mut self, handle: NativeHandle) {
        self.handle = handle;
    }
}

/// Structural equality: the native handle is not part of a suggestion's identity.
impl PartialEq for Suggestion {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.display_text == other.display_text
            && self.description == other.description
            && self.fill_text == other.fill_text
            && self.url == other.url
            && self.group_id == other.group_id
            && self.deletable == other.deletable
            && self.actions == other.actions
    }
}

impl Eq for Suggestion {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderType {
    #[default]
    VerticalStack,
    HorizontalStrip,
}

/// Visual section a group belongs to. Consecutive groups in one section render
/// as a single rounded block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct SectionId(pub u32);

impl SectionId {
    pub const UNGROUPED: Self = Self(0);
}

/// Per-group render metadata supplied alongside a result.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GroupConfig {
    #[serde(default)]
    pub header: String,
    #[serde(default)]
    pub render_type: RenderType,
    #[serde(default)]
    pub section: SectionId,
}

impl GroupConfig {
    pub fn new(header: impl Into<String>, render_type: RenderType, section: SectionId) -> Self {
        Self { header: header.into(), render_type, section }
    }
}

/// Ordered suggestions plus their group metadata.
#[derive(Debug, Clone, Default)]
pub struct SuggestionResult {
    suggestions: Vec<Suggestion>,
    groups: BTreeMap<u32, GroupConfig>,
    from_cache: bool,
    epoch: u64,
}

impl SuggestionResult {
    /// Build a live result. Every suggestion is stamped with a handle for `epoch`.
    #[must_use]
    pub fn new(
        epoch: u64,
        mut suggestions: Vec<Suggestion>,
        groups: BTreeMap<u32, GroupConfig>,
    ) -> Self {
        for (slot, suggestion) in suggestions.iter_mut().enumerate() {
            suggestion.attach(NativeHandle::new(epoch, slot));
        }
        Self { suggestions, groups, from_cache: false, epoch }
    }

    /// Build a result restored from the cache. Its handles are detached.
    #[must_use]
    pub fn from_cache(
        mut suggestions: Vec<Suggestion>,
        groups: BTreeMap<u32, GroupConfig>,
    ) -> Self {
        for suggestion in &mut suggestions {
            suggestion.attach(NativeHandle::DETACHED);
        }
        Self { suggestions, groups, from_cache: true, epoch: 0 }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    #[must_use]
    pub fn groups(&self) -> &BTreeMap<u32, GroupConfig> {
        &self.groups
    }

    /// Group config for a suggestion's group, if the result configured one.
    #[must_use]
    pub fn group_config(&self, group_id: Option<u32>) -> Option<&GroupConfig> {
        group_id.and_then(|id| self.groups.get(&id))
    }

    #[must_use]
    pub fn is_from_cache(&self) -> bool {
        self.from_cache
    }

    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.suggestions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }

    /// Whether `handle` was issued by this result and is still usable.
    #[must_use]
    pub fn owns(&self, handle: NativeHandle) -> bool {
        !handle.is_detached()
            && handle.epoch() == self.epoch
            && handle.slot() < self.suggestions.len()
    }

    #[must_use]
    pub fn get(&self, handle: NativeHandle) -> Option<&Suggestion> {
        if self.owns(handle) { self.suggestions.get(handle.slot()) } else { None }
    }
}

/// Structural equality over suggestions and group metadata. Epoch and cache
/// origin are ignored so an identical refresh does not force a rebuild.
impl PartialEq for SuggestionResult {
    fn eq(&self, other: &Self) -> bool {
        self.suggestions == other.suggestions && self.groups == other.groups
    }
}

impl Eq for SuggestionResult {}

/// Classification of the page the omnibox is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PageClass {
    Other,
    Blank,
    NewTabPage,
    SearchResultsPage,
    SearchWidget,
    ShortcutsWidget,
}

impl PageClass {
    /// Stable integer used to key persisted data.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::Other => 4,
            Self::Blank => 2,
            Self::NewTabPage => 1,
            Self::SearchResultsPage => 6,
            Self::SearchWidget => 17,
            Self::ShortcutsWidget => 25,
        }
    }
}

/// Page metadata captured when a session starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    pub page_class: PageClass,
    pub url: String,
    pub title: String,
}

impl PageContext {
    pub fn new(page_class: PageClass, url: impl Into<String>, title: impl Into<String>) -> Self {
        Self { page_class, url: url.into(), title: title.into() }
    }
}
