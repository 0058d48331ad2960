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

use crate::app::{DropdownRow, OmniboxView};
use crate::dropdown::{DropdownItem, LayoutDirection, RenderedLine, ViewType};
use crate::ui::theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

/// Horizontal padding to match input inset.
const DROPDOWN_PAD: u16 = 2;

/// Margin units that make up one blank terminal line.
const MARGIN_PER_LINE: u16 = 8;

/// One screen line of the dropdown and the entry it belongs to, if any.
struct ScreenLine {
    line: Line<'static>,
    entry: Option<usize>,
    selected: bool,
}

/// Render the dropdown entries and record the screen row of each for mouse hit testing.
pub fn render(frame: &mut Frame, area: Rect, view: &mut OmniboxView) {
    view.hit_rows.clear();
    let padded = Rect {
        x: area.x + DROPDOWN_PAD,
        y: area.y,
        width: area.width.saturating_sub(DROPDOWN_PAD * 2),
        height: area.height,
    };
    if padded.height == 0 || padded.width == 0 || view.rows.is_empty() {
        return;
    }

    let lines = {
        let _t = crate::perf::start_with("ui::dropdown_lines", "rows", view.rows.len());
        layout_lines(&view.rows, view.layout_direction, padded.width)
    };

    // Keep the selected entry on screen.
    let height = usize::from(padded.height);
    let last_selected = lines.iter().rposition(|l| l.selected);
    let offset = last_selected.map_or(0, |i| (i + 1).saturating_sub(height));

    let (fg, bg) = theme::scheme_colors(view.color_scheme);
    let mut visible: Vec<Line<'static>> = Vec::with_capacity(height);
    for (row, screen_line) in lines.into_iter().skip(offset).take(height).enumerate() {
        if let Some(entry) = screen_line.entry {
            #[allow(clippy::cast_possible_truncation)]
            view.hit_rows.push((padded.y + row as u16, entry));
        }
        visible.push(screen_line.line);
    }

    frame.render_widget(Paragraph::new(visible).style(Style::default().fg(fg).bg(bg)), padded);
}

fn layout_lines(rows: &[DropdownRow], direction: LayoutDirection, width: u16) -> Vec<ScreenLine> {
    let alignment = match direction {
        LayoutDirection::LeftToRight => Alignment::Left,
        LayoutDirection::RightToLeft => Alignment::Right,
    };
    let blank = |count: u16, out: &mut Vec<ScreenLine>| {
        for _ in 0..count / MARGIN_PER_LINE {
            out.push(ScreenLine { line: Line::default(), entry: None, selected: false });
        }
    };

    let mut out = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        let model = &row.info.model;
        blank(model.top_margin, &mut out);

        let entry = row.info.is_selectable().then_some(index);
        let content = match &row.info.item {
            DropdownItem::Header { text, .. } => {
                vec![Line::from(Span::styled(text.clone(), row.view.style))]
            }
            DropdownItem::Separator => {
                let rule = usize::from(width.saturating_sub(row.view.indent));
                vec![Line::from(Span::styled(theme::SEPARATOR_CHAR.repeat(rule), row.view.style))]
            }
            DropdownItem::Carousel { .. } => vec![carousel_line(&model.lines)],
            DropdownItem::Suggestion { .. } => model
                .lines
                .iter()
                .flat_map(|line| suggestion_lines(line, row.view.style))
                .collect(),
        };

        for line in content {
            let indent = Span::raw(" ".repeat(usize::from(row.view.indent)));
            let mut spans = vec![gutter(row, direction), indent];
            spans.extend(line.spans);
            if direction == LayoutDirection::RightToLeft {
                spans.reverse();
            }
            out.push(ScreenLine {
                line: Line::from(spans).alignment(alignment),
                entry,
                selected: model.selected,
            });
        }

        if model.show_divider && row.view.view_type != ViewType::Separator {
            out.push(ScreenLine {
                line: Line::from(Span::styled(
                    format!("{}{}", " ".repeat(usize::from(row.view.indent) + 3), "┈".repeat(8)),
                    Style::default().fg(theme::DIM),
                ))
                .alignment(alignment),
                entry: None,
                selected: false,
            });
        }
        blank(model.bottom_margin, &mut out);
    }
    out
}

/// Selection marker, or the rounded background edge of the entry.
fn gutter(row: &DropdownRow, direction: LayoutDirection) -> Span<'static> {
    let model = &row.info.model;
    if model.selected {
        let marker = match direction {
            LayoutDirection::LeftToRight => theme::SELECTED_CHAR,
            LayoutDirection::RightToLeft => "◂",
        };
        return Span::styled(
            format!(" {marker} "),
            Style::default().fg(theme::RUST_ORANGE).add_modifier(Modifier::BOLD),
        );
    }
    if !row.info.background_rounding {
        return Span::raw("   ");
    }
    let edge = match (model.round_top, model.round_bottom) {
        (true, true) => "(",
        (true, false) => "╭",
        (false, true) => "╰",
        (false, false) => "│",
    };
    Span::styled(format!(" {edge} "), Style::default().fg(theme::DIM))
}

fn suggestion_lines(rendered: &RenderedLine, style: Style) -> Vec<Line<'static>> {
    let mut spans = vec![
        Span::styled(
            format!("{} ", theme::icon_glyph(rendered.icon)),
            Style::default().fg(theme::DIM),
        ),
        Span::styled(rendered.title.clone(), style),
    ];
    if !rendered.subtitle.is_empty() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(rendered.subtitle.clone(), Style::default().fg(theme::DIM)));
    }
    let mut lines = vec![Line::from(spans)];
    if !rendered.chips.is_empty() {
        let mut chips = vec![Span::raw("  ")];
        for chip in &rendered.chips {
            chips.push(Span::styled(format!("[{chip}]"), Style::default().fg(theme::CHIP)));
            chips.push(Span::raw(" "));
        }
        lines.push(Line::from(chips));
    }
    lines
}

fn carousel_line(tiles: &[RenderedLine]) -> Line<'static> {
    let mut spans = Vec::with_capacity(tiles.len() * 2);
    for (i, tile) in tiles.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" │ ", Style::default().fg(theme::DIM)));
        }
        spans.push(Span::raw(format!("{} {}", theme::icon_glyph(tile.icon), tile.title)));
    }
    Line::from(spans)
}
