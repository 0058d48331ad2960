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

use crate::model::SuggestionType;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SuggestionsError {
    #[error("cache store I/O failed: {0}")]
    CacheIo(#[from] std::io::Error),
    #[error("cached suggestions could not be decoded: {0}")]
    CacheDecode(#[from] serde_json::Error),
    #[error("cached suggestions use schema {found}, expected {expected}")]
    CacheSchemaMismatch { found: u32, expected: u32 },
    #[error("failed to load config {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },
    #[error("processor list has no catch-all processor in last position")]
    MissingCatchAllProcessor,
    #[error("no processor accepts suggestion of type {0:?}")]
    NoProcessorForSuggestion(SuggestionType),
}

impl SuggestionsError {
    /// Contract violations that indicate a programming error, not a runtime condition.
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::MissingCatchAllProcessor | Self::NoProcessorForSuggestion(_))
    }

    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::CacheIo(_) | Self::CacheDecode(_) | Self::CacheSchemaMismatch { .. } => {
                "The suggestion cache could not be read; continuing without it."
            }
            Self::Config { .. } => {
                "The configuration file is invalid. Fix it or remove it to use defaults."
            }
            Self::MissingCatchAllProcessor | Self::NoProcessorForSuggestion(_) => {
                "Internal dropdown configuration error."
            }
        }
    }

    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 20,
            Self::CacheIo(_) | Self::CacheDecode(_) | Self::CacheSchemaMismatch { .. } => 21,
            Self::MissingCatchAllProcessor | Self::NoProcessorForSuggestion(_) => 22,
        }
    }
}
