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

//! Zero-prefix suggestion cache.
//!
//! Results are persisted as engine-opaque blobs keyed by page class. The cache
//! only bridges the gap before the engine is bound; it is never consulted
//! once a live engine is available.

use crate::error::SuggestionsError;
use crate::model::{GroupConfig, PageClass, Suggestion, SuggestionResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

pub const CACHE_SCHEMA_VERSION: u32 = 1;
const CACHE_DIR_NAME: &str = "omnibox-suggestions";

/// Raw key-value storage for cached blobs.
pub trait CacheStore {
    fn save(&mut self, key: u32, blob: &[u8]) -> Result<(), SuggestionsError>;
    fn load(&self, key: u32) -> Result<Option<Vec<u8>>, SuggestionsError>;
    fn erase(&mut self, key: u32) -> Result<(), SuggestionsError>;
    fn erase_all(&mut self) -> Result<(), SuggestionsError>;
}

#[derive(Debug, Default)]
pub struct InMemoryCacheStore {
    entries: HashMap<u32, Vec<u8>>,
}

impl InMemoryCacheStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for InMemoryCacheStore {
    fn save(&mut self, key: u32, blob: &[u8]) -> Result<(), SuggestionsError> {
        self.entries.insert(key, blob.to_vec());
        Ok(())
    }

    fn load(&self, key: u32) -> Result<Option<Vec<u8>>, SuggestionsError> {
        Ok(self.entries.get(&key).cloned())
    }

    fn erase(&mut self, key: u32) -> Result<(), SuggestionsError> {
        self.entries.remove(&key);
        Ok(())
    }

    fn erase_all(&mut self) -> Result<(), SuggestionsError> {
        self.entries.clear();
        Ok(())
    }
}

/// One JSON file per page class under a directory.
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    dir: PathBuf,
}

impl FileCacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store under the platform cache directory, if there is one.
    #[must_use]
    pub fn in_default_location() -> Option<Self> {
        dirs::cache_dir().map(|dir| Self::new(dir.join(CACHE_DIR_NAME)))
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: u32) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl CacheStore for FileCacheStore {
    fn save(&mut self, key: u32, blob: &[u8]) -> Result<(), SuggestionsError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), blob)?;
        Ok(())
    }

    fn load(&self, key: u32) -> Result<Option<Vec<u8>>, SuggestionsError> {
        match std::fs::read(self.path_for(key)) {
            Ok(blob) => Ok(Some(blob)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn erase(&mut self, key: u32) -> Result<(), SuggestionsError> {
        match std::fs::remove_file(self.path_for(key)) {
            Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }

    fn erase_all(&mut self) -> Result<(), SuggestionsError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(err.into()),
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                std::fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct CachedResult {
    schema: u32,
    suggestions: Vec<Suggestion>,
    groups: BTreeMap<u32, GroupConfig>,
}

/// Typed cache of zero-prefix results.
pub struct SuggestionCache {
    store: Box<dyn CacheStore>,
}

impl SuggestionCache {
    pub fn new(store: Box<dyn CacheStore>) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Box::new(InMemoryCacheStore::new()))
    }

    /// Persist `result` for `page_class`. Results restored from the cache are
    /// never written back.
    pub fn save(
        &mut self,
        page_class: PageClass,
        result: &SuggestionResult,
    ) -> Result<(), SuggestionsError> {
        if result.is_from_cache() {
            return Ok(());
        }
        let cached = CachedResult {
            schema: CACHE_SCHEMA_VERSION,
            suggestions: result.suggestions().to_vec(),
            groups: result.groups().clone(),
        };
        let blob = serde_json::to_vec(&cached)?;
        self.store.save(page_class.code(), &blob)?;
        tracing::debug!(?page_class, suggestions = result.len(), "cached zero-prefix result");
        Ok(())
    }

    /// Cached result for `page_class`, or an empty result. Corrupt entries are erased.
    pub fn load(&mut self, page_class: PageClass) -> SuggestionResult {
        match self.try_load(page_class) {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(?page_class, "dropping unreadable cache entry: {err}");
                if let Err(err) = self.store.erase(page_class.code()) {
                    tracing::warn!(?page_class, "failed to erase cache entry: {err}");
                }
                SuggestionResult::empty()
            }
        }
    }

    fn try_load(&self, page_class: PageClass) -> Result<SuggestionResult, SuggestionsError> {
        let Some(blob) = self.store.load(page_class.code())? else {
            return Ok(SuggestionResult::empty());
        };
        let cached: CachedResult = serde_json::from_slice(&blob)?;
        if cached.schema != CACHE_SCHEMA_VERSION {
            return Err(SuggestionsError::CacheSchemaMismatch {
                found: cached.schema,
                expected: CACHE_SCHEMA_VERSION,
            });
        }
        Ok(SuggestionResult::from_cache(cached.suggestions, cached.groups))
    }

    pub fn erase(&mut self, page_class: PageClass) -> Result<(), SuggestionsError> {
        self.store.erase(page_class.code())
    }

    pub fn erase_all(&mut self) -> Result<(), SuggestionsError> {
        self.store.erase_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RenderType, SectionId, SuggestionType};
    use pretty_assertions::assert_eq;

    fn widget_result() -> SuggestionResult {
        let trending = GroupConfig::new("Trending", RenderType::VerticalStack, SectionId(3));
        let groups = BTreeMap::from([(7, trending)]);
        SuggestionResult::new(
            4,
            vec![
                Suggestion::new(SuggestionType::SearchSuggest, "weather").with_group(7),
                Suggestion::new(SuggestionType::Navsuggest, "News")
                    .with_url("https://news.example"),
            ],
            groups,
        )
    }

    #[test]
    fn round_trip_preserves_suggestions_and_groups() {
        let mut cache = SuggestionCache::in_memory();
        let result = widget_result();
        cache.save(PageClass::SearchWidget, &result).unwrap();

        let loaded = cache.load(PageClass::SearchWidget);
        assert_eq!(loaded.suggestions(), result.suggestions());
        assert_eq!(loaded.groups(), result.groups());
        assert!(loaded.is_from_cache());
        assert!(cache.load(PageClass::ShortcutsWidget).is_empty());
    }

    #[test]
    fn cached_results_are_not_written_back() {
        let mut cache = SuggestionCache::in_memory();
        let suggestions = widget_result().suggestions().to_vec();
        let cached = SuggestionResult::from_cache(suggestions, BTreeMap::new());
        cache.save(PageClass::SearchWidget, &cached).unwrap();
        assert!(cache.load(PageClass::SearchWidget).is_empty());
    }

    #[test]
    fn corrupt_entry_reads_empty_and_is_erased() {
        let mut store = InMemoryCacheStore::new();
        store.save(PageClass::SearchWidget.code(), b"\x00garbage").unwrap();
        let mut cache = SuggestionCache::new(Box::new(store));
        assert!(cache.load(PageClass::SearchWidget).is_empty());
        assert!(cache.try_load(PageClass::SearchWidget).unwrap().is_empty());
    }

    #[test]
    fn schema_mismatch_is_treated_as_corruption() {
        let mut store = InMemoryCacheStore::new();
        let entry = br#"{"schema": 99, "suggestions": [], "groups": {}}"#;
        store.save(PageClass::SearchWidget.code(), entry).unwrap();
        let cache = SuggestionCache::new(Box::new(store));
        let err = cache.try_load(PageClass::SearchWidget).unwrap_err();
        assert!(matches!(err, SuggestionsError::CacheSchemaMismatch { found: 99, .. }));
    }

    #[test]
    fn file_store_round_trip_and_erase_all() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCacheStore::new(dir.path().join("cache"));
        let mut cache = SuggestionCache::new(Box::new(store));
        cache.save(PageClass::SearchWidget, &widget_result()).unwrap();
        cache.save(PageClass::ShortcutsWidget, &widget_result()).unwrap();
        assert_eq!(cache.load(PageClass::SearchWidget), widget_result());

        cache.erase(PageClass::SearchWidget).unwrap();
        assert!(cache.load(PageClass::SearchWidget).is_empty());
        assert!(!cache.load(PageClass::ShortcutsWidget).is_empty());

        cache.erase_all().unwrap();
        assert!(cache.load(PageClass::ShortcutsWidget).is_empty());
    }
}
