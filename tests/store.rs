mod common;

use camino::Utf8PathBuf;
use foodlex::BrowserConfig;
use foodlex::CatalogError;
use foodlex::store::{
    AllLoadStep, CatalogStore, FsSource, LoadState, LoadStep, MemorySource, cache_busted,
};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::tempdir;

use common::{FISH, SPICES};

fn store() -> CatalogStore {
    let config = BrowserConfig::default();
    CatalogStore::new(config.registry().unwrap(), "english").with_cache_token("t")
}

#[test]
fn category_is_fetched_once_per_session() {
    let mut source = common::source();
    let mut store = store();

    let first = store.load(&mut source, "spices").unwrap().unwrap();
    let second = store.load(&mut source, "spices").unwrap().unwrap();

    assert_eq!(first.len(), 3);
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(source.request_count(SPICES), 1);
    assert_eq!(source.requests(), &["/data/spices.json?v=t".to_string()]);
    assert!(first.iter().all(|e| e.category.as_deref() == Some("spices")));
    assert_eq!(
        store.state(),
        &LoadState::Ready {
            category: "spices".into()
        }
    );
}

#[test]
fn requests_during_a_load_are_ignored() {
    let mut store = store();
    let LoadStep::Fetch(ticket) = store.begin_load("fish").unwrap() else {
        panic!("expected a fetch");
    };
    assert!(store.is_loading());
    assert!(matches!(store.begin_load("fish").unwrap(), LoadStep::InFlight));
    assert!(matches!(store.begin_load("spices").unwrap(), LoadStep::InFlight));
    assert!(matches!(store.begin_load_all().unwrap(), AllLoadStep::InFlight));

    store
        .finish_load(ticket, Ok(common::fish().to_string()))
        .unwrap();
    assert!(!store.is_loading());
    assert!(matches!(store.begin_load("fish").unwrap(), LoadStep::Cached(_)));
}

#[test]
fn unknown_category_is_rejected() {
    let mut store = store();
    assert!(matches!(
        store.begin_load("snacks"),
        Err(CatalogError::UnknownCategory(key)) if key == "snacks"
    ));
}

#[test]
fn failed_load_is_reported_and_not_cached() {
    let mut source = MemorySource::new();
    let mut store = store();

    let err = store.load(&mut source, "fish").unwrap_err();
    assert!(matches!(err, CatalogError::Fetch { .. }));
    assert!(matches!(store.state(), LoadState::Failed { category, .. } if category == "fish"));
    assert!(!store.is_cached("fish"));
    assert!(!store.is_loading());

    source.insert(FISH, common::fish().to_string());
    let fish = store.load(&mut source, "fish").unwrap().unwrap();
    assert_eq!(fish.len(), 2);
    assert_eq!(source.request_count(FISH), 2);
}

#[test]
fn failure_does_not_evict_other_categories() {
    let mut source = common::source();
    let mut store = store();
    store.load(&mut source, "spices").unwrap();

    let mut broken = MemorySource::new();
    broken.insert(FISH, "{ not json");
    let err = store.load(&mut broken, "fish").unwrap_err();
    assert!(matches!(err, CatalogError::Parse { .. }));
    assert!(store.is_cached("spices"));
}

#[test]
fn cross_category_load_reuses_cached_parts() {
    let mut source = common::source();
    let mut store = store();
    store.load(&mut source, "spices").unwrap();

    let all = store.load_all(&mut source).unwrap().unwrap();
    assert_eq!(all.len(), 2 + 50 + 3 + 2 + 1);
    assert_eq!(source.request_count(SPICES), 1);
    assert_eq!(source.requests().len(), 5);

    // Registry order: vegetables-fruits, grains, spices, fish, flowers.
    let categories: Vec<&str> = all.iter().filter_map(|e| e.category.as_deref()).collect();
    assert_eq!(categories.first(), Some(&"vegetables-fruits"));
    assert_eq!(categories.last(), Some(&"flowers"));

    store.load_all(&mut source).unwrap();
    assert_eq!(source.requests().len(), 5);
}

#[test]
fn cross_category_failure_leaves_union_unpopulated() {
    let mut source = common::source();
    let mut broken = MemorySource::new();
    for (locator, body) in [(SPICES, common::spices()), (FISH, common::fish())] {
        broken.insert(locator, body.to_string());
    }
    let mut store = store();

    assert!(store.load_all(&mut broken).is_err());
    assert!(store.everything().is_none());
    assert!(store.is_cached("spices"));
    assert!(store.is_cached("fish"));

    store.load_all(&mut source).unwrap();
    assert!(store.everything().is_some());
    assert_eq!(source.request_count(SPICES), 0);
}

#[test]
fn cache_token_is_appended() {
    assert_eq!(cache_busted("/data/a.json", "42"), "/data/a.json?v=42");
    assert_eq!(cache_busted("/data/a.json?x=1", "42"), "/data/a.json?x=1&v=42");
}

#[test]
fn filesystem_source_serves_site_relative_locators() {
    let tmp = tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).unwrap();
    fs::create_dir_all(root.join("data")).unwrap();
    fs::write(root.join("data/spices.json"), common::spices().to_string()).unwrap();

    let mut source = FsSource::new(root.clone());
    assert_eq!(source.resolve("/data/spices.json?v=1"), root.join("data/spices.json"));

    let mut store = store();
    let spices = store.load(&mut source, "spices").unwrap().unwrap();
    assert_eq!(spices[0].id, "turmeric");
    assert!(store.load(&mut source, "fish").is_err());
}
