// =====
// TESTS: 27
// =====
//
// Session orchestration integration tests.
// Drives the orchestrator through recording collaborators and a manual clock.

use omnibox_suggestions::cache::{FileCacheStore, SuggestionCache};
use omnibox_suggestions::config::SuggestionsConfig;
use omnibox_suggestions::engine::{Disposition, EngineEvent};
use omnibox_suggestions::model::PageClass;
use omnibox_suggestions::session::SessionState;
use pretty_assertions::assert_eq;
use std::time::Duration;

use crate::helpers::{Harness, searches, web_page, widget_page};

fn file_cache(dir: &std::path::Path) -> SuggestionCache {
    SuggestionCache::new(Box::new(FileCacheStore::new(dir)))
}

// --- Debounce ---

#[test]
fn text_changes_within_debounce_collapse_into_one_request() {
    let mut h = Harness::ready();
    h.orchestrator.on_omnibox_focus_gained(web_page(), "", false);
    assert_eq!(h.engine.borrow().zero_prefix.len(), 1);

    h.orchestrator.on_text_changed("r", 1);
    h.advance(10);
    h.orchestrator.on_text_changed("ru", 2);
    h.advance(29);
    assert!(h.engine.borrow().queries.is_empty());

    h.advance(1);
    let engine = h.engine.borrow();
    assert_eq!(engine.queries.len(), 1);
    assert_eq!(engine.queries[0].text, "ru");
    assert_eq!(engine.queries[0].cursor_position, 2);
    assert!(!engine.queries[0].prevent_inline_autocomplete);
    // Leaving zero-prefix stops the in-flight request and resets the edit session once.
    assert_eq!(engine.stops, 1);
    assert_eq!(engine.edit_resets, 1);
}

#[test]
fn deleting_text_prevents_inline_autocomplete() {
    let mut h = Harness::ready();
    h.orchestrator.on_omnibox_focus_gained(web_page(), "rust", false);
    h.orchestrator.on_text_changed("rus", 3);
    h.advance(30);

    let engine = h.engine.borrow();
    assert_eq!(engine.queries.len(), 1);
    assert!(engine.queries[0].prevent_inline_autocomplete);
}

#[test]
fn cursor_inside_text_prevents_inline_autocomplete() {
    let mut h = Harness::ready();
    h.orchestrator.on_omnibox_focus_gained(web_page(), "", false);
    h.orchestrator.on_text_changed("rst", 1);
    h.advance(30);
    assert!(h.engine.borrow().queries[0].prevent_inline_autocomplete);
}

#[test]
fn clearing_text_goes_back_to_zero_prefix_without_debounce() {
    let mut h = Harness::ready();
    h.orchestrator.on_omnibox_focus_gained(web_page(), "rust", false);
    assert_eq!(h.orchestrator.state(), SessionState::Typed);

    h.orchestrator.on_text_changed("", 0);
    assert_eq!(h.orchestrator.state(), SessionState::ZeroPrefix);
    h.advance(0);
    assert_eq!(h.engine.borrow().zero_prefix.len(), 1);
    assert!(h.engine.borrow().queries.is_empty());
}

// --- Results ---

#[test]
fn partial_then_final_results_update_the_surface() {
    let mut h = Harness::ready();
    h.orchestrator.on_omnibox_focus_gained(web_page(), "ru", false);
    h.advance(30);

    h.respond(searches(1, &["rust"]), false);
    assert_eq!(h.surface.borrow().list_final, Some(false));
    assert_eq!(h.surface.borrow().current().len(), 1);

    h.respond(searches(2, &["rust", "rust book"]), true);
    assert_eq!(h.surface.borrow().list_final, Some(true));
    assert_eq!(h.surface.borrow().current().len(), 2);
    assert_eq!(h.orchestrator.metrics().unwrap().results_applied, 2);
}

#[test]
fn identical_result_skips_rebuild_but_refreshes_handles() {
    let mut h = Harness::ready();
    h.orchestrator.on_omnibox_focus_gained(web_page(), "ru", false);
    h.advance(30);
    h.respond(searches(1, &["rust", "rust book"]), false);
    let applied = h.surface.borrow().applied.len();

    h.respond(searches(2, &["rust", "rust book"]), true);
    assert_eq!(h.surface.borrow().applied.len(), applied);
    assert_eq!(h.orchestrator.metrics().unwrap().rebuilds_skipped, 1);

    // Entries now point at the newer result, so clicks are reported to the engine.
    let (position, suggestion) = h.entry(1);
    assert_eq!(suggestion.handle().epoch(), 2);
    h.orchestrator.on_suggestion_clicked(&suggestion, position, Disposition::CurrentTab);
    assert_eq!(h.engine.borrow().selected.len(), 1);
}

#[test]
fn late_answer_to_a_cancelled_request_is_dropped() {
    let mut h = Harness::ready();
    h.orchestrator.on_omnibox_focus_gained(web_page(), "", false);
    let cancelled = h.engine.borrow().last_request();

    h.orchestrator.on_text_changed("r", 1);
    assert_eq!(h.engine.borrow().stops, 1);
    h.orchestrator.on_suggestions_received(EngineEvent {
        request: cancelled,
        result: searches(1, &["weather", "news"]),
        is_final: true,
    });
    assert!(h.surface.borrow().current().is_empty());
    assert_eq!(h.surface.borrow().list_final, None);
    assert_eq!(h.orchestrator.metrics().unwrap().results_applied, 0);

    // The debounced query still goes out and its answer is shown.
    h.advance(30);
    h.respond(searches(2, &["rust"]), true);
    assert_eq!(h.surface.borrow().current().len(), 1);
}

// --- Latency ---

#[test]
fn final_result_records_latency_since_dispatch() {
    let mut h = Harness::ready();
    h.orchestrator.on_omnibox_focus_gained(web_page(), "ru", false);
    h.advance(30);

    h.advance(15);
    h.respond(searches(1, &["rust"]), false);
    assert_eq!(h.orchestrator.metrics().unwrap().last_latency, None);

    h.advance(25);
    h.respond(searches(2, &["rust", "rust book"]), true);
    assert_eq!(h.orchestrator.metrics().unwrap().last_latency, Some(Duration::from_millis(40)));
}

#[test]
fn text_change_discards_latency_of_the_cancelled_request() {
    let mut h = Harness::ready();
    h.orchestrator.on_omnibox_focus_gained(web_page(), "", false);
    h.advance(50);
    h.orchestrator.on_text_changed("r", 1);
    assert_eq!(h.orchestrator.metrics().unwrap().last_latency, None);

    // Latency of the replacement request counts from its own dispatch.
    h.advance(30);
    h.advance(20);
    h.respond(searches(1, &["rust"]), true);
    assert_eq!(h.orchestrator.metrics().unwrap().last_latency, Some(Duration::from_millis(20)));
}

#[test]
fn focus_loss_before_final_result_records_no_latency() {
    let mut h = Harness::ready();
    h.orchestrator.on_omnibox_focus_gained(web_page(), "ru", false);
    h.advance(30);
    h.respond(searches(1, &["rust"]), false);
    h.advance(10);

    h.orchestrator.on_omnibox_focus_lost();
    h.respond(searches(2, &["rust", "rust book"]), true);
    let summary = h.orchestrator.last_session_summary().unwrap();
    assert_eq!(summary.metrics.last_latency, None);
}

// --- Zero-prefix cache ---

#[test]
fn cached_zero_prefix_result_bridges_engine_startup() {
    let dir = tempfile::tempdir().unwrap();

    // First run: the engine answers and the final result is persisted.
    {
        let mut h = Harness::new(file_cache(dir.path()));
        h.bind_engine();
        h.orchestrator.on_omnibox_focus_gained(widget_page(), "", false);
        h.respond(searches(1, &["weather", "news"]), false);
        h.respond(searches(2, &["weather", "news", "scores"]), true);
        h.orchestrator.on_omnibox_focus_lost();
    }

    // Second run: no engine yet, so the cached result is shown and the request is held.
    let mut h = Harness::new(file_cache(dir.path()));
    h.orchestrator.on_omnibox_focus_gained(widget_page(), "", false);
    assert_eq!(h.surface.borrow().current().len(), 3);
    assert_eq!(h.surface.borrow().list_final, Some(false));
    assert_eq!(h.orchestrator.metrics().unwrap().cache_hits, 1);
    assert!(h.orchestrator.has_pending_request());

    h.bind_engine();
    assert_eq!(h.engine.borrow().zero_prefix.len(), 1);
    assert!(!h.orchestrator.has_pending_request());

    // Binding again does not replay anything.
    h.bind_engine();
    assert_eq!(h.engine.borrow().zero_prefix.len(), 1);

    // The live answer matches the cached one; no rebuild, handles become live.
    h.respond(searches(3, &["weather", "news", "scores"]), true);
    assert_eq!(h.orchestrator.metrics().unwrap().rebuilds_skipped, 1);
    let (_, suggestion) = h.entry(0);
    assert!(!suggestion.handle().is_detached());
}

#[test]
fn pages_outside_the_allow_list_are_not_cached() {
    let dir = tempfile::tempdir().unwrap();
    let mut h = Harness::new(file_cache(dir.path()));
    h.bind_engine();
    h.orchestrator.on_omnibox_focus_gained(web_page(), "", false);
    h.respond(searches(1, &["weather"]), true);

    let mut cache = file_cache(dir.path());
    assert!(cache.load(PageClass::Other).is_empty());
}

#[test]
fn in_flight_zero_prefix_result_is_cached_after_focus_loss() {
    let dir = tempfile::tempdir().unwrap();
    let mut h = Harness::new(file_cache(dir.path()));
    h.bind_engine();
    h.orchestrator.on_omnibox_focus_gained(widget_page(), "", false);
    h.orchestrator.on_omnibox_focus_lost();

    h.respond(searches(1, &["weather", "news"]), true);
    assert!(h.surface.borrow().current().is_empty());

    let mut cache = file_cache(dir.path());
    let cached = cache.load(PageClass::SearchWidget);
    assert_eq!(cached.len(), 2);
    assert!(cached.is_from_cache());
}

#[test]
fn cached_result_is_not_served_once_the_engine_is_bound() {
    let dir = tempfile::tempdir().unwrap();
    let mut seed = file_cache(dir.path());
    seed.save(PageClass::SearchWidget, &searches(1, &["weather"])).unwrap();

    let mut h = Harness::new(file_cache(dir.path()));
    h.bind_engine();
    h.orchestrator.on_omnibox_focus_gained(widget_page(), "", false);
    assert!(h.surface.borrow().current().is_empty());
    assert_eq!(h.orchestrator.metrics().unwrap().cache_hits, 0);
}

// --- Clicks and navigation ---

#[test]
fn click_navigates_then_clears_focus_on_next_task_run() {
    let mut h = Harness::ready();
    h.orchestrator.on_omnibox_focus_gained(web_page(), "ru", false);
    h.advance(30);
    h.respond(searches(1, &["rust", "rust book"]), true);

    let (position, suggestion) = h.entry(1);
    h.orchestrator.on_suggestion_clicked(&suggestion, position, Disposition::NewTab);
    assert_eq!(
        h.delegate.borrow().navigations,
        vec![("https://search.example/?q=rust book".to_owned(), Disposition::NewTab)]
    );
    assert_eq!(h.delegate.borrow().focus_cleared, 0);
    assert!(h.orchestrator.is_active());

    h.advance(0);
    assert_eq!(h.delegate.borrow().focus_cleared, 1);
    assert_eq!(h.orchestrator.state(), SessionState::Inactive);
    assert_eq!(h.surface.borrow().active, Some(false));

    let engine = h.engine.borrow();
    let report = &engine.selected[0];
    assert_eq!(report.position, 1);
    assert_eq!(report.input_text, "ru");
    assert_eq!(report.elapsed_since_input, Some(Duration::from_millis(30)));
}

#[test]
fn stale_click_classifies_the_typed_text() {
    let mut h = Harness::ready();
    h.orchestrator.on_omnibox_focus_gained(web_page(), "ru", false);
    h.advance(30);
    h.respond(searches(1, &["rust"]), false);
    let (position, stale) = h.entry(0);

    h.respond(searches(2, &["ruby", "rugby"]), true);
    h.orchestrator.on_suggestion_clicked(&stale, position, Disposition::CurrentTab);

    assert!(h.engine.borrow().selected.is_empty());
    assert_eq!(h.engine.borrow().classified, vec!["ru".to_owned()]);
    assert_eq!(h.delegate.borrow().navigations[0].0, "https://search.example/?q=ru");
}

#[test]
fn stale_click_with_empty_text_classifies_fill_text() {
    let dir = tempfile::tempdir().unwrap();
    let mut seed = file_cache(dir.path());
    seed.save(PageClass::SearchWidget, &searches(1, &["weather"])).unwrap();

    let mut h = Harness::new(file_cache(dir.path()));
    h.orchestrator.on_omnibox_focus_gained(widget_page(), "", false);
    let (position, cached) = h.entry(0);
    h.bind_engine();

    h.orchestrator.on_suggestion_clicked(&cached, position, Disposition::CurrentTab);
    assert_eq!(h.engine.borrow().classified, vec!["weather".to_owned()]);
    assert_eq!(h.delegate.borrow().navigations.len(), 1);
}

#[test]
fn stale_click_without_engine_is_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let mut seed = file_cache(dir.path());
    seed.save(PageClass::SearchWidget, &searches(1, &["weather"])).unwrap();

    let mut h = Harness::new(file_cache(dir.path()));
    h.orchestrator.on_omnibox_focus_gained(widget_page(), "", false);
    let (position, cached) = h.entry(0);
    h.orchestrator.on_suggestion_clicked(&cached, position, Disposition::CurrentTab);

    assert!(h.delegate.borrow().navigations.is_empty());
    assert!(h.orchestrator.is_active());
}

#[test]
fn enter_without_selection_classifies_typed_text() {
    let mut h = Harness::ready();
    h.orchestrator.on_omnibox_focus_gained(web_page(), "rust lang", false);
    h.orchestrator.on_enter(Disposition::CurrentTab);

    assert_eq!(h.engine.borrow().classified, vec!["rust lang".to_owned()]);
    assert_eq!(h.delegate.borrow().navigations[0].0, "https://search.example/?q=rust lang");
    // The pending debounced request never fires.
    h.advance(100);
    assert!(h.engine.borrow().queries.is_empty());
}

#[test]
fn enter_opens_the_selected_entry() {
    let mut h = Harness::ready();
    h.orchestrator.on_omnibox_focus_gained(web_page(), "ru", false);
    h.advance(30);
    h.respond(searches(1, &["rust", "rust book"]), true);

    assert!(h.orchestrator.select_next());
    assert!(h.orchestrator.select_next());
    assert_eq!(h.orchestrator.selected_position(), Some(1));
    assert!(h.surface.borrow().current()[1].model.selected);

    h.orchestrator.on_enter(Disposition::CurrentTab);
    assert_eq!(h.engine.borrow().selected[0].position, 1);
    assert!(h.engine.borrow().classified.is_empty());
}

// --- Touch, delete, refine, scroll ---

#[test]
fn touch_down_prefetch_respects_budget_and_dedupes() {
    let mut h = Harness::ready();
    h.orchestrator.on_omnibox_focus_gained(web_page(), "a", false);
    h.advance(30);
    h.respond(searches(1, &["a1", "a2", "a3", "a4", "a5", "a6", "a7"]), true);

    let (_, first) = h.entry(0);
    h.orchestrator.on_suggestion_touch_down(&first);
    h.orchestrator.on_suggestion_touch_down(&first);
    for index in 1..7 {
        let (_, suggestion) = h.entry(index);
        h.orchestrator.on_suggestion_touch_down(&suggestion);
    }

    assert_eq!(h.engine.borrow().touch_downs.len(), 5);
    let metrics = h.orchestrator.metrics().unwrap();
    assert_eq!(metrics.touch_downs, 8);
    assert_eq!(metrics.prefetches_started, 5);
}

#[test]
fn delete_is_forwarded_only_for_live_deletable_suggestions() {
    let mut h = Harness::ready();
    h.orchestrator.on_omnibox_focus_gained(web_page(), "ru", false);
    h.advance(30);
    h.respond(searches(1, &["rust"]), false);
    let (_, stale) = h.entry(0);
    h.respond(searches(2, &["ruby"]), true);
    let (_, live) = h.entry(0);

    h.orchestrator.on_delete_suggestion(&stale);
    h.orchestrator.on_delete_suggestion(&live);
    assert_eq!(h.engine.borrow().deleted, vec![live.handle()]);
}

#[test]
fn refine_fills_the_omnibox_and_queries_the_fill_text() {
    let mut h = Harness::ready();
    h.orchestrator.on_omnibox_focus_gained(web_page(), "ru", false);
    h.advance(30);
    h.respond(searches(1, &["rust book"]), true);

    let (_, suggestion) = h.entry(0);
    h.orchestrator.on_refine(&suggestion);
    assert_eq!(h.delegate.borrow().omnibox_text.as_deref(), Some("rust book"));
    h.advance(30);

    let engine = h.engine.borrow();
    assert_eq!(engine.queries.last().unwrap().text, "rust book");
    assert_eq!(h.orchestrator.text(), "rust book");
    assert_eq!(h.orchestrator.metrics().unwrap().refine_count, 1);
}

#[test]
fn first_scroll_hides_the_keyboard() {
    let mut h = Harness::ready();
    h.orchestrator.on_omnibox_focus_gained(web_page(), "", false);
    h.orchestrator.on_suggestions_scrolled();
    h.orchestrator.on_suggestions_scrolled();
    assert_eq!(h.delegate.borrow().keyboard_hidden, 1);
}

// --- Focus ---

#[test]
fn focus_loss_cancels_the_scheduled_request() {
    let mut h = Harness::ready();
    h.orchestrator.on_omnibox_focus_gained(web_page(), "rust", false);
    assert!(h.orchestrator.has_pending_request());

    h.orchestrator.on_omnibox_focus_lost();
    assert!(!h.orchestrator.has_pending_request());
    assert_eq!(h.orchestrator.next_deadline(), None);
    h.advance(100);
    assert!(h.engine.borrow().queries.is_empty());
    assert!(h.orchestrator.last_session_summary().is_some());
}

#[test]
fn window_refocus_restarts_the_request() {
    let mut h = Harness::ready();
    h.orchestrator.on_omnibox_focus_gained(web_page(), "rust", false);
    h.advance(30);
    assert_eq!(h.engine.borrow().queries.len(), 1);

    h.orchestrator.on_window_focus_changed(false);
    assert!(!h.orchestrator.is_window_focused());
    h.orchestrator.on_window_focus_changed(true);
    h.advance(30);
    assert_eq!(h.engine.borrow().queries.len(), 2);
}

#[test]
fn custom_debounce_is_honored() {
    let config = SuggestionsConfig { debounce_ms: 100, ..SuggestionsConfig::default() };
    let mut h = Harness::with_config(config, SuggestionCache::in_memory());
    h.bind_engine();
    h.orchestrator.on_omnibox_focus_gained(web_page(), "rust", false);
    h.advance(99);
    assert!(h.engine.borrow().queries.is_empty());
    h.advance(1);
    assert_eq!(h.engine.borrow().queries.len(), 1);
}
