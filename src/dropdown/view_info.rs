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

use crate::model::{NativeHandle, SectionId, Suggestion};
use serde::{Deserialize, Serialize};

/// Renderer kind. Each type has its own recycled view pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewType {
    Basic,
    EditUrl,
    Answer,
    Clipboard,
    TileCarousel,
    Header,
    Separator,
}

impl ViewType {
    pub const ALL: [Self; 7] = [
        Self::Basic,
        Self::EditUrl,
        Self::Answer,
        Self::Clipboard,
        Self::TileCarousel,
        Self::Header,
        Self::Separator,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutDirection {
    #[default]
    LeftToRight,
    RightToLeft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
    Incognito,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Search,
    Globe,
    Favicon,
    History,
    Clipboard,
    Answer,
    Tile,
}

/// One line of text a processor produced for an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    pub icon: Icon,
    pub title: String,
    pub subtitle: String,
    /// Labels of action chips shown under the line.
    pub chips: Vec<String>,
}

/// Mutable presentation state of one entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct PresentationModel {
    pub layout_direction: LayoutDirection,
    pub color_scheme: ColorScheme,
    pub round_top: bool,
    pub round_bottom: bool,
    pub show_divider: bool,
    pub top_margin: u16,
    pub bottom_margin: u16,
    pub selected: bool,
    pub lines: Vec<RenderedLine>,
}

/// What an entry stands for. `position` is the suggestion's index in the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropdownItem {
    Header { group_id: Option<u32>, text: String },
    Separator,
    Suggestion { suggestion: Suggestion, position: usize },
    /// One horizontal strip hosting a whole run of suggestions.
    Carousel { suggestions: Vec<(usize, Suggestion)> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewInfo {
    pub view_type: ViewType,
    pub item: DropdownItem,
    pub section: SectionId,
    /// Whether the renderer draws a rounded background and takes group margins.
    pub background_rounding: bool,
    pub model: PresentationModel,
}

impl ViewInfo {
    pub(crate) fn new(
        view_type: ViewType,
        item: DropdownItem,
        section: SectionId,
        background_rounding: bool,
    ) -> Self {
        Self { view_type, item, section, background_rounding, model: PresentationModel::default() }
    }

    /// Headers and separators cannot be focused.
    #[must_use]
    pub fn is_selectable(&self) -> bool {
        matches!(self.item, DropdownItem::Suggestion { .. } | DropdownItem::Carousel { .. })
    }

    /// Primary suggestion of the entry (first tile for carousels).
    #[must_use]
    pub fn suggestion(&self) -> Option<(usize, &Suggestion)> {
        match &self.item {
            DropdownItem::Suggestion { suggestion, position } => Some((*position, suggestion)),
            DropdownItem::Carousel { suggestions } => suggestions.first().map(|(p, s)| (*p, s)),
            DropdownItem::Header { .. } | DropdownItem::Separator => None,
        }
    }

    /// Re-point every hosted suggestion at `lookup(position)`.
    pub(crate) fn rebind(&mut self, lookup: impl Fn(usize) -> Option<NativeHandle>) {
        match &mut self.item {
            DropdownItem::Suggestion { suggestion, position } => {
                if let Some(handle) = lookup(*position) {
                    suggestion.attach(handle);
                }
            }
            DropdownItem::Carousel { suggestions } => {
                for (position, suggestion) in suggestions {
                    if let Some(handle) = lookup(*position) {
                        suggestion.attach(handle);
                    }
                }
            }
            DropdownItem::Header { .. } | DropdownItem::Separator => {}
        }
    }
}
