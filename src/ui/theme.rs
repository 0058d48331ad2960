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

use crate::dropdown::{ColorScheme, Icon};
use ratatui::style::Color;

// Accent
pub const RUST_ORANGE: Color = Color::Rgb(244, 118, 0);

// UI chrome
pub const DIM: Color = Color::DarkGray;
pub const PROMPT_CHAR: &str = "❯";
pub const SEPARATOR_CHAR: &str = "─";
pub const SELECTED_CHAR: &str = "▸";

// Row accents
pub const ANSWER: Color = Color::Cyan;
pub const CHIP: Color = Color::Yellow;

// Scheme backgrounds
pub const INCOGNITO_BG: Color = Color::Rgb(32, 33, 36);
pub const LIGHT_BG: Color = Color::Rgb(241, 243, 244);

/// Monochrome glyph for a suggestion icon.
pub fn icon_glyph(icon: Icon) -> &'static str {
    match icon {
        Icon::Search => "⌕",
        Icon::Globe => "◍",
        Icon::Favicon => "◉",
        Icon::History => "↺",
        Icon::Clipboard => "⎘",
        Icon::Answer => "◆",
        Icon::Tile => "▦",
    }
}

/// `(foreground, background)` of the dropdown for a color scheme.
pub fn scheme_colors(scheme: ColorScheme) -> (Color, Color) {
    match scheme {
        ColorScheme::Light => (Color::Black, LIGHT_BG),
        ColorScheme::Dark => (Color::White, Color::Reset),
        ColorScheme::Incognito => (Color::Gray, INCOGNITO_BG),
    }
}

pub fn scheme_label(scheme: ColorScheme) -> &'static str {
    match scheme {
        ColorScheme::Light => "light",
        ColorScheme::Dark => "dark",
        ColorScheme::Incognito => "incognito",
    }
}
