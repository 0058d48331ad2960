// =====
// TESTS: 5
// =====
//
// Zero-prefix cache integration tests against the file-backed store.

use omnibox_suggestions::cache::{FileCacheStore, SuggestionCache};
use omnibox_suggestions::model::{PageClass, SuggestionResult};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::helpers::searches;

fn cache_in(dir: &Path) -> SuggestionCache {
    SuggestionCache::new(Box::new(FileCacheStore::new(dir)))
}

fn cache_files(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .map_or_else(|_| Vec::new(), |entries| entries.flatten().map(|e| e.path()).collect())
}

#[test]
fn saved_result_survives_a_new_cache_instance() {
    let dir = tempfile::tempdir().unwrap();
    let live = searches(4, &["weather", "news"]);
    cache_in(dir.path()).save(PageClass::SearchWidget, &live).unwrap();

    let restored = cache_in(dir.path()).load(PageClass::SearchWidget);
    assert_eq!(restored, live);
    assert!(restored.is_from_cache());
    assert!(restored.suggestions().iter().all(|s| s.handle().is_detached()));
    assert!(cache_in(dir.path()).load(PageClass::ShortcutsWidget).is_empty());
}

#[test]
fn corrupt_entry_is_dropped_and_erased() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = cache_in(dir.path());
    cache.save(PageClass::SearchWidget, &searches(1, &["weather"])).unwrap();
    let files = cache_files(dir.path());
    assert_eq!(files.len(), 1);
    std::fs::write(&files[0], b"{not json").unwrap();

    assert!(cache.load(PageClass::SearchWidget).is_empty());
    assert!(cache_files(dir.path()).is_empty());
}

#[test]
fn entry_from_another_schema_is_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = cache_in(dir.path());
    cache.save(PageClass::SearchWidget, &searches(1, &["weather"])).unwrap();
    let files = cache_files(dir.path());
    std::fs::write(&files[0], br#"{"schema":99,"suggestions":[],"groups":{}}"#).unwrap();

    assert!(cache.load(PageClass::SearchWidget).is_empty());
    assert!(cache_files(dir.path()).is_empty());
}

#[test]
fn cached_results_are_not_written_back() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = cache_in(dir.path());
    let suggestions = searches(1, &["weather"]).suggestions().to_vec();
    let restored = SuggestionResult::from_cache(suggestions, BTreeMap::new());
    cache.save(PageClass::SearchWidget, &restored).unwrap();
    assert!(cache_files(dir.path()).is_empty());
}

#[test]
fn erase_all_clears_every_page_class() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = cache_in(dir.path());
    cache.save(PageClass::SearchWidget, &searches(1, &["weather"])).unwrap();
    cache.save(PageClass::ShortcutsWidget, &searches(2, &["news"])).unwrap();
    assert_eq!(cache_files(dir.path()).len(), 2);

    cache.erase_all().unwrap();
    assert!(cache.load(PageClass::SearchWidget).is_empty());
    assert!(cache.load(PageClass::ShortcutsWidget).is_empty());
}
