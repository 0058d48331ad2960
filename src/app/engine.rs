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

//! In-process stand-in for the ranking engine.
//!
//! Answers every request from a small fixed corpus after a configurable
//! delay, first with a partial result and then with the final one. Responses
//! travel back to the event loop over an unbounded channel, like results
//! crossing back from an out-of-process engine.

use crate::engine::{
    AutocompleteEngine, EngineEvent, QueryRequest, RequestId, SelectionReport, ZeroPrefixRequest,
};
use crate::model::{
    ActionKind, EpochClock, GroupConfig, NativeHandle, PageContext, RenderType, SectionId,
    Suggestion, SuggestionAction, SuggestionResult, SuggestionType,
};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const SEARCH_URL: &str = "https://search.example/?q=";
const MAX_QUERY_RESULTS: usize = 6;

const GROUP_TRENDING: u32 = 1;
const GROUP_TILES: u32 = 2;

struct CorpusEntry {
    kind: SuggestionType,
    text: &'static str,
    url: &'static str,
    description: &'static str,
}

const fn entry(
    kind: SuggestionType,
    text: &'static str,
    url: &'static str,
    description: &'static str,
) -> CorpusEntry {
    CorpusEntry { kind, text, url, description }
}

const CORPUS: &[CorpusEntry] = &[
    entry(SuggestionType::SearchHistory, "rust borrow checker", "", ""),
    entry(SuggestionType::SearchSuggest, "rust async book", "", ""),
    entry(SuggestionType::SearchSuggest, "ratatui widgets", "", ""),
    entry(SuggestionType::SearchSuggest, "tokio select macro", "", ""),
    entry(SuggestionType::SearchSuggestEntity, "tokyo", "", "Capital of Japan"),
    entry(
        SuggestionType::HistoryUrl,
        "The Rust Programming Language",
        "https://doc.rust-lang.org/book/",
        "",
    ),
    entry(SuggestionType::HistoryUrl, "docs.rs", "https://docs.rs/", ""),
    entry(SuggestionType::Bookmark, "crates.io", "https://crates.io/", ""),
    entry(SuggestionType::Navsuggest, "This Week in Rust", "https://this-week-in-rust.org/", ""),
    entry(SuggestionType::Answer, "weather", "", "Sunny, 21°"),
];

const TRENDING: &[&str] = &["rust 2024 edition", "terminal user interfaces", "weather"];
const TILES: &[(&str, &str)] = &[
    ("docs.rs", "https://docs.rs/"),
    ("crates.io", "https://crates.io/"),
    ("GitHub", "https://github.com/"),
    ("Rust", "https://www.rust-lang.org/"),
];

#[derive(Default)]
struct EngineState {
    epochs: EpochClock,
    last: SuggestionResult,
    deleted: HashSet<String>,
}

pub struct DemoEngine {
    tx: mpsc::UnboundedSender<EngineEvent>,
    delay: Duration,
    state: Rc<RefCell<EngineState>>,
    running: Option<JoinHandle<()>>,
}

impl DemoEngine {
    pub fn new(tx: mpsc::UnboundedSender<EngineEvent>, delay: Duration) -> Self {
        Self { tx, delay, state: Rc::new(RefCell::new(EngineState::default())), running: None }
    }

    /// Respond to `request` with `partial` after one delay and `full` after two.
    fn respond(
        &mut self,
        request: RequestId,
        partial: Option<Vec<Suggestion>>,
        full: Vec<Suggestion>,
        groups: BTreeMap<u32, GroupConfig>,
    ) {
        self.abort_running();
        let tx = self.tx.clone();
        let state = Rc::clone(&self.state);
        let delay = self.delay;
        self.running = Some(tokio::task::spawn_local(async move {
            if let Some(partial) = partial {
                tokio::time::sleep(delay).await;
                let result = publish(&state, partial, groups.clone());
                if tx.send(EngineEvent { request, result, is_final: false }).is_err() {
                    return;
                }
            }
            tokio::time::sleep(delay).await;
            let result = publish(&state, full, groups);
            let _ = tx.send(EngineEvent { request, result, is_final: true });
        }));
    }

    fn abort_running(&mut self) {
        if let Some(handle) = self.running.take() {
            handle.abort();
        }
    }

    fn is_deleted(&self, text: &str) -> bool {
        self.state.borrow().deleted.contains(text)
    }
}

/// Stamp a fresh epoch on `suggestions` and remember the result for handle lookups.
fn publish(
    state: &RefCell<EngineState>,
    suggestions: Vec<Suggestion>,
    groups: BTreeMap<u32, GroupConfig>,
) -> SuggestionResult {
    let mut state = state.borrow_mut();
    let epoch = state.epochs.next_epoch();
    let result = SuggestionResult::new(epoch, suggestions, groups);
    state.last = result.clone();
    result
}

fn search_url(query: &str) -> String {
    format!("{SEARCH_URL}{}", query.trim().replace(' ', "+"))
}

fn looks_like_url(text: &str) -> bool {
    !text.contains(char::is_whitespace) && text.contains('.')
}

fn corpus_suggestion(entry: &CorpusEntry) -> Suggestion {
    let url = if entry.url.is_empty() { search_url(entry.text) } else { entry.url.to_owned() };
    let deletable =
        matches!(entry.kind, SuggestionType::SearchHistory | SuggestionType::HistoryUrl);
    let mut suggestion = Suggestion::new(entry.kind, entry.text)
        .with_url(url)
        .with_description(entry.description)
        .with_deletable(deletable);
    if entry.kind == SuggestionType::SearchSuggestEntity {
        suggestion = suggestion.with_action(SuggestionAction {
            kind: ActionKind::Directions,
            label: "Directions".to_owned(),
            target_url: format!("https://maps.example/?q={}", entry.text),
        });
    }
    suggestion
}

fn what_you_typed(text: &str) -> Suggestion {
    if looks_like_url(text) {
        let url = if text.contains("://") { text.to_owned() } else { format!("https://{text}/") };
        Suggestion::new(SuggestionType::UrlWhatYouTyped, text).with_url(url)
    } else {
        Suggestion::new(SuggestionType::SearchWhatYouTyped, text).with_url(search_url(text))
    }
}

impl AutocompleteEngine for DemoEngine {
    fn start_query(&mut self, request: QueryRequest) {
        let needle = request.text.to_lowercase();
        let mut matches: Vec<Suggestion> = vec![what_you_typed(&request.text)];
        matches.extend(
            CORPUS
                .iter()
                .filter(|entry| {
                    entry.text.to_lowercase().contains(&needle) && !self.is_deleted(entry.text)
                })
                .map(corpus_suggestion)
                .take(MAX_QUERY_RESULTS - 1),
        );
        if !request.prevent_inline_autocomplete
            && let Some(first) = matches.get(1)
            && first.display_text().to_lowercase().starts_with(&needle)
        {
            tracing::debug!(completion = first.display_text(), "inline autocomplete candidate");
        }
        let partial = (matches.len() > 2).then(|| matches[..2].to_vec());
        tracing::debug!(
            request = request.id.0,
            text = %request.text,
            matches = matches.len(),
            "demo query"
        );
        self.respond(request.id, partial, matches, BTreeMap::new());
    }

    fn start_zero_prefix_query(&mut self, request: ZeroPrefixRequest) {
        let mut suggestions: Vec<Suggestion> = TILES
            .iter()
            .map(|(title, url)| {
                Suggestion::new(SuggestionType::Tile, *title).with_url(*url).with_group(GROUP_TILES)
            })
            .collect();
        if !request.page.url.is_empty() {
            let current = Suggestion::new(SuggestionType::HistoryUrl, request.page.title.clone())
                .with_url(request.page.url.clone());
            suggestions.insert(0, current);
        }
        suggestions.extend(
            TRENDING
                .iter()
                .filter(|text| !self.is_deleted(text))
                .map(|text| {
                    Suggestion::new(SuggestionType::SearchSuggest, *text)
                        .with_url(search_url(text))
                        .with_group(GROUP_TRENDING)
                }),
        );
        let groups = BTreeMap::from([
            (GROUP_TILES, GroupConfig::new("", RenderType::HorizontalStrip, SectionId(1))),
            (
                GROUP_TRENDING,
                GroupConfig::new("Trending searches", RenderType::VerticalStack, SectionId(2)),
            ),
        ]);
        tracing::debug!(
            request = request.id.0,
            page_class = ?request.page.page_class,
            "demo zero-prefix query"
        );
        self.respond(request.id, None, suggestions, groups);
    }

    fn classify(&mut self, text: &str, _page: &PageContext) -> Option<Suggestion> {
        let text = text.trim();
        if text.is_empty() { None } else { Some(what_you_typed(text)) }
    }

    fn stop(&mut self, clear_results: bool) {
        self.abort_running();
        if clear_results {
            self.state.borrow_mut().last = SuggestionResult::empty();
        }
    }

    fn reset_edit_session(&mut self) {
        tracing::debug!("demo engine: new edit session");
    }

    fn delete_suggestion(&mut self, handle: NativeHandle) {
        let mut state = self.state.borrow_mut();
        let Some(text) = state.last.get(handle).map(|s| s.display_text().to_owned()) else {
            return;
        };
        tracing::debug!(%text, "demo engine: suggestion deleted");
        state.deleted.insert(text);
    }

    fn delete_suggestion_element(&mut self, handle: NativeHandle, element_index: usize) {
        tracing::debug!(?handle, element_index, "demo engine: element deleted");
    }

    fn notify_touch_down(&mut self, handle: NativeHandle) -> bool {
        let state = self.state.borrow();
        let prefetch = state.last.get(handle).is_some_and(|s| s.is_search_type());
        tracing::debug!(?handle, prefetch, "demo engine: touch down");
        prefetch
    }

    fn notify_selected(&mut self, report: &SelectionReport) {
        tracing::debug!(
            position = report.position,
            disposition = ?report.disposition,
            elapsed = ?report.elapsed_since_input,
            "demo engine: suggestion selected"
        );
    }

    fn updated_destination_url(
        &mut self,
        handle: NativeHandle,
        elapsed: Duration,
    ) -> Option<String> {
        let state = self.state.borrow();
        let suggestion = state.last.get(handle)?;
        suggestion
            .is_search_type()
            .then(|| format!("{}&qft={}", suggestion.url(), elapsed.as_millis()))
    }
}

impl Drop for DemoEngine {
    fn drop(&mut self) {
        self.abort_running();
    }
}
