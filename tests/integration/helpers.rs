use omnibox_suggestions::cache::SuggestionCache;
use omnibox_suggestions::config::SuggestionsConfig;
use omnibox_suggestions::dropdown::{ColorScheme, LayoutDirection, ViewInfo};
use omnibox_suggestions::engine::{
    AutocompleteEngine, Disposition, EngineEvent, QueryRequest, RequestId, SelectionReport,
    ZeroPrefixRequest,
};
use omnibox_suggestions::model::{
    NativeHandle, PageClass, PageContext, Suggestion, SuggestionResult, SuggestionType,
};
use omnibox_suggestions::session::{ManualClock, SessionDeps, SessionOrchestrator};
use omnibox_suggestions::surface::{NavigationDelegate, RenderingSurface};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

/// Everything the recording engine was asked to do.
#[derive(Debug, Default)]
pub struct EngineLog {
    pub queries: Vec<QueryRequest>,
    pub zero_prefix: Vec<ZeroPrefixRequest>,
    pub classified: Vec<String>,
    pub stops: u32,
    pub edit_resets: u32,
    pub deleted: Vec<NativeHandle>,
    pub touch_downs: Vec<NativeHandle>,
    pub selected: Vec<SelectionReport>,
}

impl EngineLog {
    /// Id of the most recent request of either kind.
    pub fn last_request(&self) -> RequestId {
        let query = self.queries.last().map(|q| q.id);
        let zero_prefix = self.zero_prefix.last().map(|z| z.id);
        query.max(zero_prefix).unwrap_or_default()
    }
}

pub struct RecordingEngine(pub Rc<RefCell<EngineLog>>);

impl AutocompleteEngine for RecordingEngine {
    fn start_query(&mut self, request: QueryRequest) {
        self.0.borrow_mut().queries.push(request);
    }

    fn start_zero_prefix_query(&mut self, request: ZeroPrefixRequest) {
        self.0.borrow_mut().zero_prefix.push(request);
    }

    fn classify(&mut self, text: &str, _page: &PageContext) -> Option<Suggestion> {
        self.0.borrow_mut().classified.push(text.to_owned());
        Some(
            Suggestion::new(SuggestionType::SearchWhatYouTyped, text)
                .with_url(format!("https://search.example/?q={text}")),
        )
    }

    fn stop(&mut self, _clear_results: bool) {
        self.0.borrow_mut().stops += 1;
    }

    fn reset_edit_session(&mut self) {
        self.0.borrow_mut().edit_resets += 1;
    }

    fn delete_suggestion(&mut self, handle: NativeHandle) {
        self.0.borrow_mut().deleted.push(handle);
    }

    fn delete_suggestion_element(&mut self, _handle: NativeHandle, _element_index: usize) {}

    fn notify_touch_down(&mut self, handle: NativeHandle) -> bool {
        self.0.borrow_mut().touch_downs.push(handle);
        true
    }

    fn notify_selected(&mut self, report: &SelectionReport) {
        self.0.borrow_mut().selected.push(report.clone());
    }
}

#[derive(Debug, Default)]
pub struct SurfaceLog {
    pub applied: Vec<Vec<ViewInfo>>,
    pub active: Option<bool>,
    pub list_final: Option<bool>,
}

impl SurfaceLog {
    pub fn current(&self) -> &[ViewInfo] {
        self.applied.last().map_or(&[], Vec::as_slice)
    }
}

pub struct RecordingSurface(pub Rc<RefCell<SurfaceLog>>);

impl RenderingSurface for RecordingSurface {
    fn apply_view_info_list(&mut self, items: &[ViewInfo]) {
        self.0.borrow_mut().applied.push(items.to_vec());
    }

    fn set_layout_direction(&mut self, _direction: LayoutDirection) {}

    fn set_color_scheme(&mut self, _scheme: ColorScheme) {}

    fn notify_session_active(&mut self, active: bool) {
        self.0.borrow_mut().active = Some(active);
    }

    fn notify_list_final(&mut self, is_final: bool) {
        self.0.borrow_mut().list_final = Some(is_final);
    }
}

#[derive(Debug, Default)]
pub struct DelegateLog {
    pub navigations: Vec<(String, Disposition)>,
    pub focus_cleared: u32,
    pub omnibox_text: Option<String>,
    pub keyboard_hidden: u32,
}

pub struct RecordingDelegate(pub Rc<RefCell<DelegateLog>>);

impl NavigationDelegate for RecordingDelegate {
    fn navigate(&mut self, url: &str, disposition: Disposition) {
        self.0.borrow_mut().navigations.push((url.to_owned(), disposition));
    }

    fn clear_omnibox_focus(&mut self) {
        self.0.borrow_mut().focus_cleared += 1;
    }

    fn set_omnibox_text(&mut self, text: &str) {
        self.0.borrow_mut().omnibox_text = Some(text.to_owned());
    }

    fn hide_keyboard(&mut self) {
        self.0.borrow_mut().keyboard_hidden += 1;
    }
}

/// Orchestrator wired to recording collaborators and a manual clock.
pub struct Harness {
    pub orchestrator: SessionOrchestrator,
    pub clock: Rc<ManualClock>,
    pub engine: Rc<RefCell<EngineLog>>,
    pub surface: Rc<RefCell<SurfaceLog>>,
    pub delegate: Rc<RefCell<DelegateLog>>,
}

impl Harness {
    /// Harness without an engine; call [`Harness::bind_engine`] to attach one.
    pub fn new(cache: SuggestionCache) -> Self {
        Self::with_config(SuggestionsConfig::default(), cache)
    }

    pub fn with_config(config: SuggestionsConfig, cache: SuggestionCache) -> Self {
        let clock = Rc::new(ManualClock::new());
        let surface = Rc::new(RefCell::new(SurfaceLog::default()));
        let delegate = Rc::new(RefCell::new(DelegateLog::default()));
        let deps = SessionDeps {
            surface: Box::new(RecordingSurface(surface.clone())),
            delegate: Box::new(RecordingDelegate(delegate.clone())),
            cache,
            clock: clock.clone(),
        };
        Self {
            orchestrator: SessionOrchestrator::new(config, deps),
            clock,
            engine: Rc::new(RefCell::new(EngineLog::default())),
            surface,
            delegate,
        }
    }

    /// Harness with the engine already bound and an in-memory cache.
    pub fn ready() -> Self {
        let mut harness = Self::new(SuggestionCache::in_memory());
        harness.bind_engine();
        harness
    }

    pub fn bind_engine(&mut self) {
        self.orchestrator.set_engine(Box::new(RecordingEngine(self.engine.clone())));
        self.orchestrator.on_native_initialized();
    }

    pub fn advance(&mut self, millis: u64) {
        self.clock.advance(Duration::from_millis(millis));
        self.orchestrator.run_due_tasks();
    }

    /// Answer the most recent request.
    pub fn respond(&mut self, result: SuggestionResult, is_final: bool) {
        let request = self.engine.borrow().last_request();
        self.orchestrator.on_suggestions_received(EngineEvent { request, result, is_final });
    }

    /// Suggestion hosted by the dropdown entry at `index`, with its current handle.
    pub fn entry(&self, index: usize) -> (usize, Suggestion) {
        let info = &self.orchestrator.items()[index];
        let (position, suggestion) = info.suggestion().expect("entry hosts a suggestion");
        (position, suggestion.clone())
    }
}

pub fn widget_page() -> PageContext {
    PageContext::new(PageClass::SearchWidget, "", "")
}

pub fn web_page() -> PageContext {
    PageContext::new(PageClass::Other, "https://www.rust-lang.org/", "Rust Programming Language")
}

/// Live result of search suggestions, one per title.
pub fn searches(epoch: u64, titles: &[&str]) -> SuggestionResult {
    let suggestions = titles
        .iter()
        .map(|title| {
            Suggestion::new(SuggestionType::SearchSuggest, *title)
                .with_fill_text(*title)
                .with_url(format!("https://search.example/?q={title}"))
                .with_deletable(true)
        })
        .collect();
    SuggestionResult::new(epoch, suggestions, BTreeMap::new())
}
