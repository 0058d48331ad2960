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

use crate::dropdown::ViewType;
use crate::error::SuggestionsError;
use crate::model::PageClass;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_DEBOUNCE_MS: u64 = 30;
pub const DEFAULT_TOUCH_PREFETCH_BUDGET: u32 = 5;

/// Top-of-list margins selected by the (active color × small bottom margin) toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListTopMargins {
    pub default: u16,
    pub active_color: u16,
    pub small_bottom: u16,
    pub active_color_small_bottom: u16,
}

impl Default for ListTopMargins {
    fn default() -> Self {
        Self { default: 12, active_color: 10, small_bottom: 8, active_color_small_bottom: 6 }
    }
}

impl ListTopMargins {
    #[must_use]
    pub const fn select(&self, active_color: bool, small_bottom: bool) -> u16 {
        match (active_color, small_bottom) {
            (false, false) => self.default,
            (true, false) => self.active_color,
            (false, true) => self.small_bottom,
            (true, true) => self.active_color_small_bottom,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarginConfig {
    /// Space above the first entry of a section.
    pub inter_group: u16,
    /// Space above every other entry.
    pub intra_group: u16,
    pub list_top: ListTopMargins,
    /// Top margin when the first entry is the edit-URL row.
    pub edit_url_list_top: u16,
    pub list_bottom: u16,
    pub list_bottom_small: u16,
}

impl Default for MarginConfig {
    fn default() -> Self {
        Self {
            inter_group: 8,
            intra_group: 2,
            list_top: ListTopMargins::default(),
            edit_url_list_top: 0,
            list_bottom: 12,
            list_bottom_small: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct FeatureToggles {
    pub active_omnibox_color: bool,
    pub small_bottom_margin: bool,
    pub suppress_clipboard_suggestions: bool,
    pub hide_tile_carousel: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionsConfig {
    pub debounce_ms: u64,
    pub touch_prefetch_budget: u32,
    /// Page classes whose zero-prefix results may be cached. Kept narrow on purpose.
    pub cacheable_page_classes: Vec<PageClass>,
    /// Skips view prewarming entirely.
    pub low_end_device: bool,
    pub pool_caps: BTreeMap<ViewType, usize>,
    pub margins: MarginConfig,
    pub features: FeatureToggles,
}

impl Default for SuggestionsConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            touch_prefetch_budget: DEFAULT_TOUCH_PREFETCH_BUDGET,
            cacheable_page_classes: vec![PageClass::SearchWidget, PageClass::ShortcutsWidget],
            low_end_device: false,
            pool_caps: default_pool_caps(),
            margins: MarginConfig::default(),
            features: FeatureToggles::default(),
        }
    }
}

fn default_pool_caps() -> BTreeMap<ViewType, usize> {
    BTreeMap::from([
        (ViewType::Basic, 12),
        (ViewType::EditUrl, 1),
        (ViewType::Answer, 1),
        (ViewType::Clipboard, 1),
        (ViewType::TileCarousel, 1),
        (ViewType::Header, 4),
        (ViewType::Separator, 2),
    ])
}

impl SuggestionsConfig {
    /// Read a JSON config. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, SuggestionsError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("config {} not found, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(SuggestionsError::Config {
                    path: path.to_owned(),
                    reason: err.to_string(),
                });
            }
        };
        serde_json::from_str(&content)
            .map_err(|err| SuggestionsError::Config {
                path: path.to_owned(),
                reason: err.to_string(),
            })
    }

    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    #[must_use]
    pub fn is_cacheable(&self, page_class: PageClass) -> bool {
        self.cacheable_page_classes.contains(&page_class)
    }

    #[must_use]
    pub fn pool_cap(&self, view_type: ViewType) -> usize {
        self.pool_caps.get(&view_type).copied().unwrap_or(0)
    }
}
