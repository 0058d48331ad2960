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

use super::processors::{SuggestionProcessor, default_processors};
use super::view_info::{DropdownItem, ViewInfo, ViewType};
use crate::config::FeatureToggles;
use crate::error::SuggestionsError;
use crate::model::{
    GroupConfig, PageContext, RenderType, SectionId, Suggestion, SuggestionResult, SuggestionType,
};

/// Request-scoped inputs to a build pass.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    pub page: &'a PageContext,
    pub features: FeatureToggles,
}

/// Builds the ordered [`ViewInfo`] list for a result.
pub struct DropdownItemBuilder {
    processors: Vec<Box<dyn SuggestionProcessor>>,
}

struct Member<'r> {
    position: usize,
    suggestion: &'r Suggestion,
    processor: usize,
}

struct Run<'r> {
    section: SectionId,
    config: GroupConfig,
    group_id: Option<u32>,
    members: Vec<Member<'r>>,
}

impl DropdownItemBuilder {
    /// Fails when the last processor is not a catch-all.
    pub fn new(processors: Vec<Box<dyn SuggestionProcessor>>) -> Result<Self, SuggestionsError> {
        if !processors.last().is_some_and(|p| p.is_catch_all()) {
            return Err(SuggestionsError::MissingCatchAllProcessor);
        }
        Ok(Self { processors })
    }

    #[must_use]
    pub fn with_default_processors() -> Self {
        Self { processors: default_processors() }
    }

    pub fn on_session_state_change(&mut self, active: bool) {
        for processor in &mut self.processors {
            processor.on_session_state_change(active);
        }
    }

    pub fn on_native_initialized(&mut self) {
        for processor in &mut self.processors {
            processor.on_native_initialized();
        }
    }

    pub fn build(
        &mut self,
        ctx: &BuildContext<'_>,
        result: &SuggestionResult,
    ) -> Result<Vec<ViewInfo>, SuggestionsError> {
        crate::perf::next_pass();
        let _t = crate::perf::start_with("dropdown::build", "suggestions", result.len());
        for processor in &mut self.processors {
            processor.on_suggestions_received();
        }

        let runs = self.partition(ctx, result)?;
        let mut items = Vec::with_capacity(result.len() + runs.len());
        // (render type, had header) of the previous emitted run.
        let mut previous: Option<(RenderType, bool)> = None;

        for run in runs {
            let has_header = !run.config.header.is_empty();
            if has_header {
                let header = DropdownItem::Header {
                    group_id: run.group_id,
                    text: run.config.header.clone(),
                };
                items.push(ViewInfo::new(ViewType::Header, header, run.section, false));
            } else if run.config.render_type == RenderType::VerticalStack
                && previous == Some((RenderType::VerticalStack, false))
            {
                let separator =
                    ViewInfo::new(ViewType::Separator, DropdownItem::Separator, run.section, false);
                items.push(separator);
            }

            match run.config.render_type {
                RenderType::VerticalStack => self.emit_stack(&run, &mut items),
                RenderType::HorizontalStrip => self.emit_strip(&run, &mut items),
            }
            previous = Some((run.config.render_type, has_header));
        }

        tracing::debug!(entries = items.len(), "built dropdown entries");
        Ok(items)
    }

    /// Assign processors, drop suppressed suggestions and split the rest into
    /// maximal runs sharing section and render type.
    fn partition<'r>(
        &self,
        ctx: &BuildContext<'_>,
        result: &'r SuggestionResult,
    ) -> Result<Vec<Run<'r>>, SuggestionsError> {
        let mut runs: Vec<Run<'r>> = Vec::new();
        for (position, suggestion) in result.suggestions().iter().enumerate() {
            if is_suppressed(suggestion, ctx.features) {
                continue;
            }
            let processor = self
                .processors
                .iter()
                .position(|p| p.does_process(suggestion, position, ctx))
                .ok_or(SuggestionsError::NoProcessorForSuggestion(suggestion.kind()))?;

            let config = result.group_config(suggestion.group_id()).cloned().unwrap_or_default();
            let member = Member { position, suggestion, processor };
            let extends_run = runs.last().is_some_and(|run| {
                run.section == config.section && run.config.render_type == config.render_type
            });
            if extends_run {
                if let Some(run) = runs.last_mut() {
                    run.members.push(member);
                }
            } else {
                runs.push(Run {
                    section: config.section,
                    group_id: suggestion.group_id(),
                    config,
                    members: vec![member],
                });
            }
        }
        Ok(runs)
    }

    fn emit_stack(&mut self, run: &Run<'_>, items: &mut Vec<ViewInfo>) {
        let last = run.members.len().saturating_sub(1);
        for (i, member) in run.members.iter().enumerate() {
            let processor = &mut self.processors[member.processor];
            let item = DropdownItem::Suggestion {
                suggestion: member.suggestion.clone(),
                position: member.position,
            };
            let mut info = ViewInfo::new(
                processor.view_type(),
                item,
                run.section,
                processor.allow_background_rounding(),
            );
            processor.populate(member.suggestion, member.position, &mut info.model);
            info.model.round_top = i == 0;
            info.model.round_bottom = i == last;
            info.model.show_divider = i != last;
            items.push(info);
        }
    }

    fn emit_strip(&mut self, run: &Run<'_>, items: &mut Vec<ViewInfo>) {
        let Some(first) = run.members.first() else {
            return;
        };
        let host = &self.processors[first.processor];
        let suggestions = run.members.iter().map(|m| (m.position, m.suggestion.clone())).collect();
        let mut info = ViewInfo::new(
            host.view_type(),
            DropdownItem::Carousel { suggestions },
            run.section,
            host.allow_background_rounding(),
        );
        for member in &run.members {
            let processor = &mut self.processors[member.processor];
            processor.populate(member.suggestion, member.position, &mut info.model);
        }
        info.model.round_top = true;
        info.model.round_bottom = true;
        items.push(info);
    }
}

fn is_suppressed(suggestion: &Suggestion, features: FeatureToggles) -> bool {
    match suggestion.kind() {
        SuggestionType::ClipboardUrl | SuggestionType::ClipboardText => {
            features.suppress_clipboard_suggestions
        }
        SuggestionType::Tile => features.hide_tile_carousel,
        _ => false,
    }
}
