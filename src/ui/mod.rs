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

mod dropdown;
mod input;
pub mod theme;

use crate::app::{App, OmniboxView};
use crate::dropdown::LayoutDirection;
use crate::session::SessionOrchestrator;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

const HEADER_PAD: u16 = 2;

const KEY_HINTS: &str = "   Tab focus · ↑↓ select · Enter go · Ctrl+D delete · Ctrl+R refine \
                         · Ctrl+L dir · Ctrl+T theme";

pub fn render(frame: &mut Frame, app: &mut App) {
    let _t = crate::perf::start("ui::render");
    let areas: [Rect; 7] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());
    let [header, header_sep, input_area, input_sep, body, footer_sep, footer] = areas;

    let mut view = app.view.borrow_mut();
    render_header(frame, header, app);
    render_separator(frame, header_sep);
    {
        let _t = crate::perf::start("ui::input");
        input::render(frame, input_area, &view);
    }
    render_separator(frame, input_sep);
    {
        let _t = crate::perf::start("ui::dropdown");
        dropdown::render(frame, body, &mut view);
    }
    render_separator(frame, footer_sep);
    render_footer(frame, footer, &view, &app.orchestrator, app.engine_tx.is_none());
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let padded = pad(area, HEADER_PAD);
    let line = Line::from(vec![
        Span::styled(
            "omnibox",
            Style::default().fg(theme::RUST_ORANGE).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {:?}", app.page.page_class), Style::default().fg(theme::DIM)),
        Span::styled(format!("  {:?}", app.orchestrator.state()), Style::default().fg(theme::DIM)),
        Span::styled(KEY_HINTS, Style::default().fg(theme::DIM)),
    ]);
    frame.render_widget(Paragraph::new(line), padded);
}

fn render_footer(
    frame: &mut Frame,
    area: Rect,
    view: &OmniboxView,
    orchestrator: &SessionOrchestrator,
    engine_ready: bool,
) {
    let padded = pad(area, HEADER_PAD);
    let mut parts: Vec<String> = Vec::new();

    parts.push(if engine_ready { "engine: ready" } else { "engine: starting" }.to_owned());
    if view.session_active {
        let status = if view.list_final { "final" } else { "partial" };
        parts.push(format!("{} entries ({status})", view.rows.len()));
    }
    if let Some(metrics) = orchestrator.metrics() {
        parts.push(format!("requests {}", metrics.requests_dispatched));
    }
    if let Some(reuse) = view.last_reuse {
        parts.push(format!("views {} new / {} reused", reuse.created, reuse.reused));
    }
    let direction = match view.layout_direction {
        LayoutDirection::LeftToRight => "ltr",
        LayoutDirection::RightToLeft => "rtl",
    };
    parts.push(format!("{direction} · {}", theme::scheme_label(view.color_scheme)));

    let mut spans = vec![Span::styled(parts.join(" | "), Style::default().fg(theme::DIM))];
    if let Some(nav) = &view.last_navigation {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("→ {} ({:?})", nav.url, nav.disposition),
            Style::default().fg(theme::RUST_ORANGE),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), padded);
}

fn render_separator(frame: &mut Frame, area: Rect) {
    if area.height == 0 {
        return;
    }
    let sep_str = theme::SEPARATOR_CHAR.repeat(usize::from(area.width));
    let line = Line::from(Span::styled(sep_str, Style::default().fg(theme::DIM)));
    frame.render_widget(Paragraph::new(line), area);
}

fn pad(area: Rect, pad: u16) -> Rect {
    Rect { x: area.x + pad, width: area.width.saturating_sub(pad * 2), ..area }
}
