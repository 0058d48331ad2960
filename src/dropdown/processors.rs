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

//! Per-type suggestion renderers.
//!
//! The builder scans processors in priority order and hands each suggestion to
//! the first one whose [`SuggestionProcessor::does_process`] accepts it. The
//! last processor must be a catch-all.

use super::builder::BuildContext;
use super::view_info::{Icon, PresentationModel, RenderedLine, ViewType};
use crate::model::{PageClass, Suggestion, SuggestionType};

/// Tiles beyond this count are dropped from a carousel.
pub const MAX_CAROUSEL_TILES: usize = 8;

pub trait SuggestionProcessor {
    fn view_type(&self) -> ViewType;

    fn does_process(
        &self,
        suggestion: &Suggestion,
        position: usize,
        ctx: &BuildContext<'_>,
    ) -> bool;

    /// Fill `model` for `suggestion`. Called once per suggestion; carousels
    /// receive one call per tile on the same model.
    fn populate(&mut self, suggestion: &Suggestion, position: usize, model: &mut PresentationModel);

    fn allow_background_rounding(&self) -> bool {
        true
    }

    fn is_catch_all(&self) -> bool {
        false
    }

    fn on_session_state_change(&mut self, _active: bool) {}

    fn on_native_initialized(&mut self) {}

    /// Called before every build pass.
    fn on_suggestions_received(&mut self) {}
}

fn chips(suggestion: &Suggestion) -> Vec<String> {
    suggestion.actions().iter().map(|a| a.label.clone()).collect()
}

/// First-position row that lets the user edit the URL of the current page.
#[derive(Debug, Default)]
pub struct EditUrlProcessor;

impl SuggestionProcessor for EditUrlProcessor {
    fn view_type(&self) -> ViewType {
        ViewType::EditUrl
    }

    fn does_process(
        &self,
        suggestion: &Suggestion,
        position: usize,
        ctx: &BuildContext<'_>,
    ) -> bool {
        position == 0
            && matches!(ctx.page.page_class, PageClass::Other | PageClass::SearchResultsPage)
            && matches!(
                suggestion.kind(),
                SuggestionType::UrlWhatYouTyped | SuggestionType::HistoryUrl
            )
            && !ctx.page.url.is_empty()
            && suggestion.url() == ctx.page.url
    }

    fn populate(
        &mut self,
        suggestion: &Suggestion,
        _position: usize,
        model: &mut PresentationModel,
    ) {
        model.lines.push(RenderedLine {
            icon: Icon::Favicon,
            title: suggestion.display_text().to_owned(),
            subtitle: suggestion.url().to_owned(),
            chips: vec!["Share".to_owned(), "Copy".to_owned(), "Edit".to_owned()],
        });
    }
}

#[derive(Debug, Default)]
pub struct ClipboardProcessor;

impl SuggestionProcessor for ClipboardProcessor {
    fn view_type(&self) -> ViewType {
        ViewType::Clipboard
    }

    fn does_process(
        &self,
        suggestion: &Suggestion,
        _position: usize,
        _ctx: &BuildContext<'_>,
    ) -> bool {
        suggestion.kind().is_clipboard()
    }

    fn populate(
        &mut self,
        suggestion: &Suggestion,
        _position: usize,
        model: &mut PresentationModel,
    ) {
        let subtitle = match suggestion.kind() {
            SuggestionType::ClipboardUrl => "Link you copied",
            _ => "Text you copied",
        };
        model.lines.push(RenderedLine {
            icon: Icon::Clipboard,
            title: suggestion.display_text().to_owned(),
            subtitle: subtitle.to_owned(),
            chips: chips(suggestion),
        });
    }
}

#[derive(Debug, Default)]
pub struct AnswerProcessor;

impl SuggestionProcessor for AnswerProcessor {
    fn view_type(&self) -> ViewType {
        ViewType::Answer
    }

    fn does_process(
        &self,
        suggestion: &Suggestion,
        _position: usize,
        _ctx: &BuildContext<'_>,
    ) -> bool {
        suggestion.kind() == SuggestionType::Answer
    }

    fn populate(
        &mut self,
        suggestion: &Suggestion,
        _position: usize,
        model: &mut PresentationModel,
    ) {
        model.lines.push(RenderedLine {
            icon: Icon::Answer,
            title: suggestion.display_text().to_owned(),
            subtitle: suggestion.description().to_owned(),
            chips: chips(suggestion),
        });
    }
}

/// Horizontal strip of site tiles.
#[derive(Debug, Default)]
pub struct TileCarouselProcessor {
    tiles_in_pass: usize,
}

impl SuggestionProcessor for TileCarouselProcessor {
    fn view_type(&self) -> ViewType {
        ViewType::TileCarousel
    }

    fn does_process(
        &self,
        suggestion: &Suggestion,
        _position: usize,
        _ctx: &BuildContext<'_>,
    ) -> bool {
        suggestion.kind() == SuggestionType::Tile
    }

    fn populate(
        &mut self,
        suggestion: &Suggestion,
        _position: usize,
        model: &mut PresentationModel,
    ) {
        if self.tiles_in_pass >= MAX_CAROUSEL_TILES {
            return;
        }
        self.tiles_in_pass += 1;
        model.lines.push(RenderedLine {
            icon: Icon::Tile,
            title: suggestion.display_text().to_owned(),
            subtitle: suggestion.url().to_owned(),
            chips: Vec::new(),
        });
    }

    fn on_suggestions_received(&mut self) {
        self.tiles_in_pass = 0;
    }
}

/// Catch-all renderer for searches and URLs.
#[derive(Debug, Default)]
pub struct BasicProcessor {
    native_ready: bool,
}

impl SuggestionProcessor for BasicProcessor {
    fn view_type(&self) -> ViewType {
        ViewType::Basic
    }

    fn does_process(
        &self,
        _suggestion: &Suggestion,
        _position: usize,
        _ctx: &BuildContext<'_>,
    ) -> bool {
        true
    }

    fn populate(
        &mut self,
        suggestion: &Suggestion,
        _position: usize,
        model: &mut PresentationModel,
    ) {
        let icon = match suggestion.kind() {
            SuggestionType::SearchHistory => Icon::History,
            kind if kind.is_search() => Icon::Search,
            // Favicons come from the engine once it is up.
            _ if self.native_ready => Icon::Favicon,
            _ => Icon::Globe,
        };
        let subtitle = if suggestion.description().is_empty() && !suggestion.is_search_type() {
            suggestion.url().to_owned()
        } else {
            suggestion.description().to_owned()
        };
        model.lines.push(RenderedLine {
            icon,
            title: suggestion.display_text().to_owned(),
            subtitle,
            chips: chips(suggestion),
        });
    }

    fn is_catch_all(&self) -> bool {
        true
    }

    fn on_native_initialized(&mut self) {
        self.native_ready = true;
    }
}

/// Processors in priority order, catch-all last.
#[must_use]
pub fn default_processors() -> Vec<Box<dyn SuggestionProcessor>> {
    vec![
        Box::new(EditUrlProcessor),
        Box::new(ClipboardProcessor),
        Box::new(AnswerProcessor),
        Box::new(TileCarouselProcessor::default()),
        Box::new(BasicProcessor::default()),
    ]
}
