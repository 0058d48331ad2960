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

use crate::app::OmniboxView;
use crate::ui::theme;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

/// Horizontal padding to match header/footer inset.
const INPUT_PAD: u16 = 2;

/// Prompt prefix width: "❯ " = 2 columns
const PROMPT_WIDTH: u16 = 2;

pub fn render(frame: &mut Frame, area: Rect, view: &OmniboxView) {
    let padded = Rect {
        x: area.x + INPUT_PAD,
        y: area.y,
        width: area.width.saturating_sub(INPUT_PAD * 2),
        height: area.height,
    };
    let prompt_color = if view.focused { theme::RUST_ORANGE } else { theme::DIM };
    let prompt =
        Span::styled(format!("{} ", theme::PROMPT_CHAR), Style::default().fg(prompt_color));

    if view.input.is_empty() {
        let placeholder = Span::styled("Search or type URL", Style::default().fg(theme::DIM));
        let line = Line::from(vec![prompt, placeholder]);
        frame.render_widget(Paragraph::new(line), padded);
        if view.focused {
            frame.set_cursor_position((padded.x + PROMPT_WIDTH, padded.y));
        }
        return;
    }

    let content_width = usize::from(padded.width.saturating_sub(PROMPT_WIDTH));
    if content_width == 0 {
        return;
    }

    // Scroll horizontally so the cursor stays visible.
    let text = view.input.text();
    let before_cursor: String = text.chars().take(view.input.cursor()).collect();
    let cursor_col = before_cursor.width();
    let skip_cols = (cursor_col + 1).saturating_sub(content_width);
    let visible = skip_columns(text, skip_cols);

    frame.render_widget(Paragraph::new(Line::from(vec![prompt, Span::raw(visible)])), padded);

    if view.focused {
        #[allow(clippy::cast_possible_truncation)]
        let cursor_x = padded.x + PROMPT_WIDTH + (cursor_col - skip_cols) as u16;
        if cursor_x < padded.right() {
            frame.set_cursor_position((cursor_x, padded.y));
        }
    }
}

/// Drop leading characters until at least `cols` display columns are skipped.
fn skip_columns(text: &str, cols: usize) -> String {
    let mut skipped = 0;
    text.chars()
        .skip_while(|c| {
            if skipped >= cols {
                return false;
            }
            skipped += unicode_width::UnicodeWidthChar::width(*c).unwrap_or(0);
            true
        })
        .collect()
}
