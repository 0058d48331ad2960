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

use super::view_info::{ColorScheme, LayoutDirection, ViewInfo, ViewType};
use crate::config::{FeatureToggles, MarginConfig};
use crate::model::{GroupConfig, SectionId, SuggestionResult};
use crate::selection::SelectableItems;
use std::collections::BTreeMap;

/// Owns the list currently shown in the dropdown.
#[derive(Debug, Default)]
pub struct DropdownListManager {
    items: Vec<ViewInfo>,
    groups: BTreeMap<u32, GroupConfig>,
    layout_direction: LayoutDirection,
    color_scheme: ColorScheme,
    margins: MarginConfig,
    features: FeatureToggles,
}

impl DropdownListManager {
    #[must_use]
    pub fn new(margins: MarginConfig, features: FeatureToggles) -> Self {
        Self { margins, features, ..Self::default() }
    }

    #[must_use]
    pub fn items(&self) -> &[ViewInfo] {
        &self.items
    }

    #[must_use]
    pub fn groups(&self) -> &BTreeMap<u32, GroupConfig> {
        &self.groups
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn layout_direction(&self) -> LayoutDirection {
        self.layout_direction
    }

    #[must_use]
    pub fn color_scheme(&self) -> ColorScheme {
        self.color_scheme
    }

    /// Replace the whole list and recompute spacing.
    pub fn set_result(&mut self, items: Vec<ViewInfo>, groups: BTreeMap<u32, GroupConfig>) {
        self.items = items;
        self.groups = groups;
        for item in &mut self.items {
            item.model.layout_direction = self.layout_direction;
            item.model.color_scheme = self.color_scheme;
            item.model.selected = false;
        }
        self.apply_spacing();
    }

    pub fn set_layout_direction(&mut self, direction: LayoutDirection) {
        self.layout_direction = direction;
        for item in &mut self.items {
            item.model.layout_direction = direction;
        }
    }

    pub fn set_color_scheme(&mut self, scheme: ColorScheme) {
        self.color_scheme = scheme;
        for item in &mut self.items {
            item.model.color_scheme = scheme;
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.groups.clear();
    }

    /// Point the held suggestions at the handles of a structurally equal result.
    pub fn rebind_handles(&mut self, result: &SuggestionResult) {
        let suggestions = result.suggestions();
        for item in &mut self.items {
            item.rebind(|position| suggestions.get(position).map(crate::model::Suggestion::handle));
        }
    }

    fn apply_spacing(&mut self) {
        let list_top = self
            .margins
            .list_top
            .select(self.features.active_omnibox_color, self.features.small_bottom_margin);
        let mut previous_section: Option<SectionId> = None;

        for (index, item) in self.items.iter_mut().enumerate() {
            item.model.top_margin = 0;
            item.model.bottom_margin = 0;

            if index == 0 {
                item.model.top_margin = if item.view_type == ViewType::EditUrl {
                    self.margins.edit_url_list_top
                } else {
                    list_top
                };
            } else if item.background_rounding {
                let leads_group = item.model.round_top || previous_section != Some(item.section);
                item.model.top_margin =
                    if leads_group { self.margins.inter_group } else { self.margins.intra_group };
            }

            if item.background_rounding {
                previous_section = Some(item.section);
            } else {
                // Headers and separators break the group.
                previous_section = None;
            }
        }

        if let Some(last) = self.items.last_mut() {
            last.model.round_bottom = true;
            last.model.bottom_margin = if self.features.small_bottom_margin {
                self.margins.list_bottom_small
            } else {
                self.margins.list_bottom
            };
        }
    }
}

impl SelectableItems for DropdownListManager {
    fn item_count(&self) -> usize {
        self.items.len()
    }

    fn is_selectable(&self, index: usize) -> bool {
        self.items.get(index).is_some_and(ViewInfo::is_selectable)
    }

    fn set_item_state(&mut self, index: usize, selected: bool) {
        if let Some(item) = self.items.get_mut(index) {
            item.model.selected = selected;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ListTopMargins;
    use crate::dropdown::DropdownItem;
    use crate::model::{Suggestion, SuggestionType};

    fn margins() -> MarginConfig {
        MarginConfig {
            inter_group: 8,
            intra_group: 2,
            list_top: ListTopMargins {
                default: 12,
                active_color: 10,
                small_bottom: 7,
                active_color_small_bottom: 5,
            },
            edit_url_list_top: 1,
            list_bottom: 12,
            list_bottom_small: 4,
        }
    }

    fn entry(view_type: ViewType, section: u32, round_top: bool) -> ViewInfo {
        let item = match view_type {
            ViewType::Header => DropdownItem::Header { group_id: None, text: "Header".to_owned() },
            ViewType::Separator => DropdownItem::Separator,
            _ => DropdownItem::Suggestion {
                suggestion: Suggestion::new(SuggestionType::SearchSuggest, "q"),
                position: 0,
            },
        };
        let rounding = !matches!(view_type, ViewType::Header | ViewType::Separator);
        let mut info = ViewInfo::new(view_type, item, SectionId(section), rounding);
        info.model.round_top = round_top;
        info
    }

    #[test]
    fn last_entry_is_always_bottom_rounded() {
        let tails =
            [ViewType::Basic, ViewType::Header, ViewType::Separator, ViewType::TileCarousel];
        for tail in tails {
            let mut manager = DropdownListManager::new(margins(), FeatureToggles::default());
            let entries = vec![entry(ViewType::Basic, 0, true), entry(tail, 1, false)];
            manager.set_result(entries, BTreeMap::new());
            assert!(manager.items().last().unwrap().model.round_bottom, "tail {tail:?}");
        }
    }

    #[test]
    fn group_leading_entries_get_inter_group_margin() {
        let mut manager = DropdownListManager::new(margins(), FeatureToggles::default());
        manager.set_result(
            vec![
                entry(ViewType::Basic, 0, true),
                entry(ViewType::Basic, 0, false),
                entry(ViewType::Basic, 1, true),
                entry(ViewType::Header, 2, false),
                entry(ViewType::Basic, 2, true),
            ],
            BTreeMap::new(),
        );
        let tops: Vec<u16> = manager.items().iter().map(|i| i.model.top_margin).collect();
        assert_eq!(tops, vec![12, 2, 8, 0, 8]);
        assert_eq!(manager.items()[4].model.bottom_margin, 12);
    }

    #[test]
    fn list_top_margin_follows_feature_matrix_and_edit_url() {
        let cases = [(false, false, 12), (true, false, 10), (false, true, 7), (true, true, 5)];
        for (active_color, small_bottom, expected) in cases {
            let features = FeatureToggles {
                active_omnibox_color: active_color,
                small_bottom_margin: small_bottom,
                ..FeatureToggles::default()
            };
            let mut manager = DropdownListManager::new(margins(), features);
            manager.set_result(vec![entry(ViewType::Basic, 0, true)], BTreeMap::new());
            assert_eq!(manager.items()[0].model.top_margin, expected);

            manager.set_result(vec![entry(ViewType::EditUrl, 0, true)], BTreeMap::new());
            assert_eq!(manager.items()[0].model.top_margin, 1);
        }
    }

    #[test]
    fn small_bottom_margin_shrinks_list_bottom() {
        let features = FeatureToggles { small_bottom_margin: true, ..FeatureToggles::default() };
        let mut manager = DropdownListManager::new(margins(), features);
        manager.set_result(vec![entry(ViewType::Basic, 0, true)], BTreeMap::new());
        assert_eq!(manager.items()[0].model.bottom_margin, 4);
    }

    #[test]
    fn direction_and_scheme_apply_in_place_and_to_new_lists() {
        let mut manager = DropdownListManager::new(margins(), FeatureToggles::default());
        manager.set_result(vec![entry(ViewType::Basic, 0, true)], BTreeMap::new());
        manager.set_layout_direction(LayoutDirection::RightToLeft);
        manager.set_color_scheme(ColorScheme::Incognito);
        assert_eq!(manager.items()[0].model.layout_direction, LayoutDirection::RightToLeft);
        assert_eq!(manager.items()[0].model.color_scheme, ColorScheme::Incognito);

        manager.set_result(vec![entry(ViewType::Basic, 0, true)], BTreeMap::new());
        assert_eq!(manager.items()[0].model.color_scheme, ColorScheme::Incognito);
    }

    #[test]
    fn headers_are_not_selectable() {
        let mut manager = DropdownListManager::new(margins(), FeatureToggles::default());
        let entries = vec![entry(ViewType::Header, 0, false), entry(ViewType::Basic, 0, true)];
        manager.set_result(entries, BTreeMap::new());
        assert!(!manager.is_selectable(0));
        assert!(manager.is_selectable(1));
        manager.set_item_state(1, true);
        assert!(manager.items()[1].model.selected);
    }

    #[test]
    fn clear_empties_list() {
        let mut manager = DropdownListManager::new(margins(), FeatureToggles::default());
        manager.set_result(vec![entry(ViewType::Basic, 0, true)], BTreeMap::new());
        manager.clear();
        assert!(manager.is_empty());
        assert!(manager.groups().is_empty());
    }
}
