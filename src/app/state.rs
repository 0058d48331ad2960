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

use crate::dropdown::{ColorScheme, LayoutDirection, ViewInfo, ViewType};
use crate::engine::{Disposition, EngineEvent};
use crate::model::PageContext;
use crate::perf::PerfLogger;
use crate::pool::ViewReuseStats;
use crate::session::SessionOrchestrator;
use crate::ui::theme;
use ratatui::style::{Modifier, Style};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Single-line omnibox text with a char-indexed cursor.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InputLine {
    text: String,
    cursor: usize,
}

impl InputLine {
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Replace the text and put the cursor at the end.
    pub fn set_text(&mut self, text: &str) {
        text.clone_into(&mut self.text);
        self.cursor = self.text.chars().count();
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_idx = char_to_byte_index(&self.text, self.cursor);
        self.text.insert(byte_idx, c);
        self.cursor += 1;
    }

    /// Returns whether anything was removed.
    pub fn delete_char_before(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let byte_idx = char_to_byte_index(&self.text, self.cursor);
        self.text.remove(byte_idx);
        true
    }

    pub fn delete_char_after(&mut self) -> bool {
        if self.cursor >= self.text.chars().count() {
            return false;
        }
        let byte_idx = char_to_byte_index(&self.text, self.cursor);
        self.text.remove(byte_idx);
        true
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.chars().count();
    }
}

fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

/// Reusable terminal row. Holds the styling decided once per view type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub view_type: ViewType,
    pub style: Style,
    pub indent: u16,
}

impl RowView {
    #[must_use]
    pub fn new(view_type: ViewType) -> Self {
        let (style, indent) = match view_type {
            ViewType::Header => (Style::default().fg(theme::DIM).add_modifier(Modifier::BOLD), 1),
            ViewType::Separator => (Style::default().fg(theme::DIM), 1),
            ViewType::EditUrl => (Style::default().add_modifier(Modifier::BOLD), 2),
            ViewType::Answer => (Style::default().fg(theme::ANSWER), 2),
            ViewType::Clipboard | ViewType::Basic | ViewType::TileCarousel => (Style::default(), 2),
        };
        Self { view_type, style, indent }
    }
}

/// One displayed dropdown entry bound to a row view.
#[derive(Debug, Clone)]
pub struct DropdownRow {
    pub info: ViewInfo,
    pub view: RowView,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub url: String,
    pub disposition: Disposition,
}

/// State shared between the event loop, the rendering surface and the
/// navigation delegate.
#[derive(Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct OmniboxView {
    pub input: InputLine,
    pub focused: bool,
    pub keyboard_visible: bool,
    pub session_active: bool,
    pub list_final: bool,
    pub rows: Vec<DropdownRow>,
    pub layout_direction: LayoutDirection,
    pub color_scheme: ColorScheme,
    pub last_navigation: Option<Navigation>,
    pub last_reuse: Option<ViewReuseStats>,
    /// Screen row of each rendered entry, for mouse hit testing.
    pub hit_rows: Vec<(u16, usize)>,
}

impl Default for OmniboxView {
    fn default() -> Self {
        Self {
            input: InputLine::default(),
            focused: false,
            keyboard_visible: false,
            session_active: false,
            list_final: false,
            rows: Vec::new(),
            layout_direction: LayoutDirection::default(),
            color_scheme: ColorScheme::Dark,
            last_navigation: None,
            last_reuse: None,
            hit_rows: Vec::new(),
        }
    }
}

impl OmniboxView {
    /// Entry index rendered on screen row `y`.
    #[must_use]
    pub fn entry_at(&self, y: u16) -> Option<usize> {
        self.hit_rows.iter().find(|(row, _)| *row == y).map(|(_, index)| *index)
    }
}

pub struct App {
    pub orchestrator: SessionOrchestrator,
    pub view: Rc<RefCell<OmniboxView>>,
    pub page: PageContext,
    pub engine_rx: mpsc::UnboundedReceiver<EngineEvent>,
    /// Moved into the engine once it is started.
    pub engine_tx: Option<mpsc::UnboundedSender<EngineEvent>>,
    /// When the simulated engine finishes starting up.
    pub engine_ready_at: Option<Instant>,
    pub engine_delay: Duration,
    /// Entry index of the last mouse press, completed into a click on release.
    pub pressed_entry: Option<usize>,
    pub should_quit: bool,
    /// Keeps the perf log open for the lifetime of the app.
    pub perf: Option<PerfLogger>,
}
