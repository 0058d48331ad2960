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

mod engine;
mod events;
mod state;
mod surface;

pub use engine::DemoEngine;
pub use state::{App, DropdownRow, InputLine, Navigation, OmniboxView, RowView};
pub use surface::{RowFactory, TuiDelegate, TuiSurface};

use crate::Cli;
use crate::cache::{FileCacheStore, InMemoryCacheStore, SuggestionCache};
use crate::config::SuggestionsConfig;
use crate::model::{PageClass, PageContext};
use crate::perf::PerfLogger;
use crate::session::{SessionDeps, SessionOrchestrator, TokioClock};
use crossterm::event::{
    DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, EventStream,
};
use futures::{FutureExt as _, StreamExt};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Build the app and start prewarming row views. Must run inside a `LocalSet`.
pub fn create_app(cli: &Cli, config: SuggestionsConfig) -> App {
    let view = Rc::new(RefCell::new(OmniboxView::default()));
    let mut surface = TuiSurface::new(Rc::clone(&view), &config);
    surface.prewarm(&config);

    let deps = SessionDeps {
        surface: Box::new(surface),
        delegate: Box::new(TuiDelegate::new(Rc::clone(&view))),
        cache: open_cache(cli),
        clock: Rc::new(TokioClock),
    };
    let orchestrator = SessionOrchestrator::new(config, deps);
    let (engine_tx, engine_rx) = mpsc::unbounded_channel();
    let perf = cli.perf_log.as_deref().and_then(|path| PerfLogger::open(path, cli.perf_log_append));

    App {
        orchestrator,
        view,
        page: page_for(cli.page_class),
        engine_rx,
        engine_tx: Some(engine_tx),
        engine_ready_at: Some(Instant::now() + Duration::from_millis(cli.engine_startup_ms)),
        engine_delay: Duration::from_millis(cli.engine_delay_ms),
        pressed_entry: None,
        should_quit: false,
        perf,
    }
}

fn open_cache(cli: &Cli) -> SuggestionCache {
    let store = match &cli.cache_dir {
        Some(dir) => Some(FileCacheStore::new(dir.clone())),
        None => FileCacheStore::in_default_location(),
    };
    if let Some(store) = store {
        tracing::info!("zero-prefix cache at {}", store.dir().display());
        SuggestionCache::new(Box::new(store))
    } else {
        tracing::warn!("no cache directory available; zero-prefix cache is in-memory only");
        SuggestionCache::new(Box::new(InMemoryCacheStore::new()))
    }
}

fn page_for(page_class: PageClass) -> PageContext {
    match page_class {
        PageClass::Other => {
            PageContext::new(page_class, "https://www.rust-lang.org/", "Rust Programming Language")
        }
        PageClass::SearchResultsPage => {
            PageContext::new(page_class, "https://search.example/?q=rust", "rust - Search")
        }
        _ => PageContext::new(page_class, "", ""),
    }
}

/// Bind the demo engine once its simulated startup delay has passed.
fn bind_engine_if_ready(app: &mut App) {
    let Some(ready_at) = app.engine_ready_at else {
        return;
    };
    if Instant::now() < ready_at {
        return;
    }
    app.engine_ready_at = None;
    let Some(tx) = app.engine_tx.take() else {
        return;
    };
    tracing::info!("demo engine ready");
    app.orchestrator.set_engine(Box::new(DemoEngine::new(tx, app.engine_delay)));
    app.orchestrator.on_native_initialized();
}

/// Earliest instant the loop must wake up at without any input.
fn next_wake(app: &App) -> Option<Instant> {
    let task = app.orchestrator.next_deadline().map(Instant::from_std);
    match (task, app.engine_ready_at) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

// ---------------------------------------------------------------------------
// TUI event loop
// ---------------------------------------------------------------------------

pub async fn run_tui(app: &mut App) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();
    let _ = crossterm::execute!(std::io::stdout(), EnableMouseCapture, EnableFocusChange);

    let mut events = EventStream::new();
    let idle = Duration::from_millis(250);

    loop {
        // Phase 1: wait for input, an engine response, or the next deadline
        let wake = next_wake(app).unwrap_or_else(|| Instant::now() + idle);
        tokio::select! {
            Some(Ok(event)) = events.next() => {
                events::handle_terminal_event(app, event);
            }
            Some(event) = app.engine_rx.recv() => {
                events::handle_engine_event(app, event);
            }
            () = tokio::time::sleep_until(wake) => {}
        }

        // Phase 2: drain whatever else is ready without blocking
        loop {
            if let Some(Some(Ok(event))) = events.next().now_or_never() {
                events::handle_terminal_event(app, event);
                continue;
            }
            match app.engine_rx.try_recv() {
                Ok(event) => events::handle_engine_event(app, event),
                Err(_) => break,
            }
        }

        bind_engine_if_ready(app);
        app.orchestrator.run_due_tasks();

        if app.should_quit {
            break;
        }

        // Phase 3: render once
        terminal.draw(|f| crate::ui::render(f, app))?;
    }

    app.orchestrator.on_omnibox_focus_lost();
    let _ = crossterm::execute!(std::io::stdout(), DisableMouseCapture, DisableFocusChange);
    ratatui::restore();
    Ok(())
}
