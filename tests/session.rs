mod common;

use foodlex::BrowserConfig;
use foodlex::route::History;
use foodlex::session::FetchRequest;
use foodlex::store::{LoadState, MemorySource};
use pretty_assertions::assert_eq;
use std::time::{Duration, Instant};

use common::{FISH, SPICES, browser, browser_with, started};

#[test]
fn deep_link_resolves_item_label_and_highlights_it() {
    let mut source = common::source();
    let b = started("/spices/turmeric", &mut source);

    assert_eq!(b.view().category.as_deref(), Some("spices"));
    assert_eq!(b.view().query, "Turmeric");
    assert_eq!(b.results().ids(), vec!["turmeric"]);
    assert_eq!(b.target().highlighted.as_deref(), Some("turmeric"));
    assert_eq!(b.target().scrolls_to_top, 0);
    assert_eq!(b.history().current(), "/spices/turmeric");

    let meta = b.head().current.as_ref().unwrap();
    assert_eq!(meta.title, "Turmeric | Spices | FoodBhasha");
    assert_eq!(meta.active_tab, "spices");
}

#[test]
fn reconciling_the_same_deep_link_again_keeps_the_item() {
    let mut source = common::source();
    let mut b = started("/spices/turmeric", &mut source);
    b.on_pop_state();
    assert_eq!(b.view().query, "Turmeric");
    assert_eq!(b.results().len(), 1);
    assert_eq!(source.request_count(SPICES), 1);
}

#[test]
fn unknown_item_scrolls_to_top() {
    let mut source = common::source();
    let mut b = started("/spices/saffron", &mut source);
    assert_eq!(b.view().query, "");
    assert_eq!(b.results().len(), 3);
    assert_eq!(b.target().highlighted, None);
    assert_eq!(b.target().scrolls_to_top, 1);

    // Same policy when the category is already loaded.
    b.open_item("spices", "nutmeg");
    assert_eq!(b.target().scrolls_to_top, 2);
    assert_eq!(source.request_count(SPICES), 1);
}

#[test]
fn unknown_category_falls_back_to_default() {
    let mut source = common::source();
    let b = started("/snacks", &mut source);
    assert_eq!(b.view().category.as_deref(), Some("vegetables-fruits"));
    assert_eq!(b.target().ids(), vec!["tomato", "spinach"]);
    assert!(b.target().error.is_none());
}

#[test]
fn legacy_fragment_address_is_rewritten_once() {
    let mut source = common::source();
    let b = started("/#fish&search=rohu", &mut source);
    assert_eq!(b.history().current(), "/fish?search=rohu");
    assert_eq!(b.history().len(), 1);
    assert_eq!(b.view().category.as_deref(), Some("fish"));
    assert_eq!(b.results().ids(), vec!["rohu"]);
}

#[test]
fn search_edits_update_results_now_and_address_once() {
    let mut source = common::source();
    let mut b = started("/spices", &mut source);
    let presents_before = b.target().clears;
    let t0 = Instant::now();

    for (i, text) in ["h", "ha", "hal", "hald", "haldi"].iter().enumerate() {
        b.edit_search(text, t0 + Duration::from_millis(100 * i as u64));
        assert!(!b.tick(t0 + Duration::from_millis(100 * i as u64 + 50)));
    }
    assert_eq!(b.target().clears - presents_before, 5);
    assert_eq!(b.results().ids(), vec!["turmeric"]);
    assert_eq!(b.history().len(), 1);

    assert!(!b.tick(t0 + Duration::from_millis(850)));
    assert!(b.tick(t0 + Duration::from_millis(900)));
    assert!(!b.tick(t0 + Duration::from_millis(2000)));
    assert_eq!(
        b.history().entries(),
        &["/spices".to_string(), "/spices?search=haldi".to_string()]
    );
    assert_eq!(source.request_count(SPICES), 1);
}

#[test]
fn debounced_write_is_skipped_when_address_is_unchanged() {
    let mut source = common::source();
    let mut b = started("/spices?search=cumin", &mut source);
    let t0 = Instant::now();
    b.edit_search("cumin ", t0);
    assert!(!b.tick(t0 + Duration::from_secs(1)));
    assert_eq!(b.history().len(), 1);
}

#[test]
fn back_and_forward_reconcile_without_refetching() {
    let mut source = common::source();
    let mut b = started("/fish", &mut source);
    b.select_category("spices");
    b.run_fetches(&mut source);
    assert_eq!(b.history().entries(), &["/fish".to_string(), "/spices".to_string()]);
    assert_eq!(b.target().ids(), vec!["turmeric", "cumin", "chilli"]);

    assert!(b.back());
    assert_eq!(b.view().category.as_deref(), Some("fish"));
    assert_eq!(b.target().ids(), vec!["rohu", "seer-fish"]);
    assert!(!b.has_pending_fetches());

    assert!(b.forward());
    assert_eq!(b.view().category.as_deref(), Some("spices"));
    assert_eq!(source.request_count(FISH), 1);
    assert_eq!(source.request_count(SPICES), 1);
}

#[test]
fn query_only_navigation_refilters_without_fetching() {
    let mut source = common::source();
    let mut b = started("/fish", &mut source);
    b.history_mut().push("/fish?search=vanjaram");
    b.on_pop_state();
    assert_eq!(b.view().query, "vanjaram");
    assert_eq!(b.results().ids(), vec!["seer-fish"]);
    assert_eq!(source.requests().len(), 1);
    assert_eq!(
        b.head().current.as_ref().unwrap().title,
        "vanjaram | Search in Fish & Seafood | FoodBhasha"
    );
}

#[test]
fn head_is_rewritten_on_every_reconciliation() {
    let mut source = common::source();
    let mut b = started("/fish", &mut source);
    let writes = b.head().writes;
    b.on_pop_state();
    b.on_pop_state();
    assert_eq!(b.head().writes, writes + 2);
}

#[test]
fn switching_category_clears_tags_and_adopts_query() {
    let mut source = common::source();
    let mut b = started("/spices", &mut source);
    b.toggle_tag("seed");
    assert_eq!(b.results().ids(), vec!["cumin"]);
    assert_eq!(b.history().len(), 1);

    b.history_mut().push("/fish?search=rohu");
    b.on_pop_state();
    b.run_fetches(&mut source);
    assert!(b.view().tags.is_empty());
    assert_eq!(b.results().ids(), vec!["rohu"]);
}

#[test]
fn stale_category_response_is_not_committed() {
    let mut source = common::source();
    let mut b = browser("/fish");
    b.start();
    let fish = b.take_fetches();
    assert_eq!(fish.len(), 1);

    b.select_category("spices");
    assert!(b.target().loading);
    assert!(!b.has_pending_fetches());

    for request in fish {
        let bodies = request
            .locators()
            .into_iter()
            .map(|l| source_fetch(&mut source, l))
            .collect();
        b.complete_fetch(request, bodies);
    }
    assert!(b.target().cards.is_empty());
    assert_eq!(b.view().category.as_deref(), Some("spices"));
    assert!(b.store().is_cached("fish"));

    let pending = b.take_fetches();
    assert!(matches!(&pending[..], [FetchRequest::Category(t)] if t.category() == "spices"));
    for request in pending {
        b.complete_fetch(request, vec![Ok(common::spices().to_string())]);
    }
    assert_eq!(b.target().ids(), vec!["turmeric", "cumin", "chilli"]);
}

fn source_fetch(source: &mut MemorySource, locator: &str) -> anyhow::Result<String> {
    use foodlex::store::CatalogSource;
    source.fetch(locator)
}

#[test]
fn fetch_failure_shows_error_and_later_navigation_retries() {
    let mut source = common::source();
    let mut missing = MemorySource::new();
    missing.insert(SPICES, common::spices().to_string());

    let mut b = browser("/fish");
    b.start();
    b.run_fetches(&mut missing);
    assert!(b.target().error.is_some());
    assert!(b.target().cards.is_empty());
    assert!(matches!(b.store().state(), LoadState::Failed { .. }));
    assert!(!b.has_pending_fetches());

    b.select_category("spices");
    b.run_fetches(&mut missing);
    assert!(b.target().error.is_none());
    assert_eq!(b.target().cards.len(), 3);

    b.select_category("fish");
    b.run_fetches(&mut source);
    assert_eq!(b.target().ids(), vec!["rohu", "seer-fish"]);
    assert_eq!(missing.request_count(FISH), 1);
    assert_eq!(source.request_count(FISH), 1);
}

#[test]
fn focusing_search_with_query_drops_tag_filters() {
    let mut source = common::source();
    let mut b = started("/spices", &mut source);
    b.toggle_tag("seed");
    b.search_focused();
    assert_eq!(b.view().tags.len(), 1);

    b.edit_search("e", Instant::now());
    b.search_focused();
    assert!(b.view().tags.is_empty());
}

#[test]
fn clear_button_resets_query_and_address() {
    let mut source = common::source();
    let mut b = started("/spices", &mut source);
    let t0 = Instant::now();
    b.edit_search("cumin", t0);
    assert!(b.tick(t0 + Duration::from_millis(500)));
    assert_eq!(b.history().current(), "/spices?search=cumin");

    b.edit_search("cumin s", t0 + Duration::from_millis(600));
    b.clear_search();
    assert!(!b.has_pending_write());
    assert_eq!(b.view().query, "");
    assert_eq!(b.results().len(), 3);
    assert_eq!(b.history().current(), "/spices");
    assert_eq!(b.history().len(), 3);
}

#[test]
fn cross_category_search_covers_every_category() {
    let mut source = common::source();
    let config = BrowserConfig {
        cross_category_search: true,
        ..BrowserConfig::default()
    };
    let mut b = browser_with(config, "/fish");
    b.start();
    b.run_fetches(&mut source);

    b.edit_search("manjal", Instant::now());
    assert!(b.has_pending_fetches());
    b.run_fetches(&mut source);

    assert_eq!(b.results().ids(), vec!["turmeric"]);
    let card = &b.target().cards[0];
    assert_eq!(card.category, "spices");
    assert_eq!(card.share_url, "https://foodbhasha.com/spices/turmeric");
    // union searched, counted against the fish dataset
    assert_eq!(b.results().total(), 2 + 50 + 3 + 2 + 1);
    assert_eq!(b.counter().to_string(), "1/2");
    assert_eq!(source.request_count(FISH), 1);

    b.clear_search();
    assert_eq!(b.target().ids(), vec!["rohu", "seer-fish"]);
}

#[test]
fn language_toggle_persists_and_rerenders() {
    let mut source = common::source();
    let mut b = started("/fish", &mut source);
    let presents = b.target().clears;
    assert!(b.toggle_language("bengali").unwrap());
    assert_eq!(b.target().clears, presents + 1);
    assert_eq!(b.languages().last().map(String::as_str), Some("bengali"));

    let rohu = &b.target().cards[0];
    let bengali = rohu.primary.iter().find(|r| r.language == "bengali").unwrap();
    assert_eq!(bengali.value, "রুই / Rui");
    let seer = &b.target().cards[1];
    let bengali = seer.primary.iter().find(|r| r.language == "bengali").unwrap();
    assert_eq!(bengali.value, "-");
}

#[test]
fn switching_tabs_keeps_the_search_text() {
    let mut source = common::source();
    let mut b = started("/fish", &mut source);
    let t0 = Instant::now();
    b.edit_search("a", t0);
    assert!(b.tick(t0 + Duration::from_millis(600)));
    assert_eq!(b.history().current(), "/fish?search=a");

    b.select_category("spices");
    b.run_fetches(&mut source);
    assert_eq!(b.history().current(), "/spices?search=a");
    assert_eq!(b.view().query, "a");
    assert_eq!(b.results().ids(), vec!["turmeric", "cumin", "chilli"]);

    // an unsettled edit travels with the tab click as well
    b.edit_search("cumin", t0 + Duration::from_secs(1));
    b.select_category("fish");
    b.run_fetches(&mut source);
    assert!(!b.has_pending_write());
    assert_eq!(b.history().current(), "/fish?search=cumin");
    assert!(b.results().is_empty());
}

#[test]
fn switching_tabs_drops_a_focused_item_label() {
    let mut source = common::source();
    let mut b = started("/spices/turmeric", &mut source);
    assert_eq!(b.view().query, "Turmeric");

    b.select_category("fish");
    b.run_fetches(&mut source);
    assert_eq!(b.history().current(), "/fish");
    assert_eq!(b.view().query, "");
    assert_eq!(b.results().ids(), vec!["rohu", "seer-fish"]);
}

#[test]
fn deep_link_stays_in_its_category_with_cross_search_warm() {
    let mut source = common::source();
    let config = BrowserConfig {
        cross_category_search: true,
        ..BrowserConfig::default()
    };
    let mut b = browser_with(config, "/fish");
    b.start();
    b.run_fetches(&mut source);
    b.edit_search("grain", Instant::now());
    b.run_fetches(&mut source);
    assert_eq!(b.results().len(), 50);
    assert!(b.store().everything().is_some());

    b.open_item("grains", "grain-01");
    assert!(!b.has_pending_fetches());
    assert_eq!(b.view().query, "Grain 01");
    assert_eq!(b.results().ids(), vec!["grain-01"]);
    // filtered over the grains dataset, not the union
    assert_eq!(b.results().total(), 50);
    assert_eq!(b.target().highlighted.as_deref(), Some("grain-01"));

    b.open_item("spices", "turmeric");
    assert_eq!(b.results().ids(), vec!["turmeric"]);
    assert_eq!(b.counter().to_string(), "1/3");
}
