#![allow(dead_code)]

use foodlex::BrowserConfig;
use foodlex::meta::MemoryHead;
use foodlex::prefs::MemoryPreferences;
use foodlex::render::MemoryTarget;
use foodlex::route::MemoryHistory;
use foodlex::session::Browser;
use foodlex::store::MemorySource;
use serde_json::{Value, json};

pub type TestBrowser = Browser<MemoryHistory, MemoryTarget, MemoryHead>;

pub const SPICES: &str = "/data/spices.json";
pub const FISH: &str = "/data/fish-seafood.json";
pub const GRAINS: &str = "/data/grains-pulses.json";
pub const VEG: &str = "/data/vegetables-fruits.json";
pub const FLOWERS: &str = "/data/flowers.json";

pub fn record(id: &str, english: &str, tags: &[&str]) -> Value {
    json!({
        "id": id,
        "names": { "english": [english] },
        "scientificName": format!("{} sp.", english),
        "tags": tags,
        "notes": "",
        "photo": format!("images/{}.webp", id),
    })
}

pub fn spices() -> Value {
    json!([
        {
            "id": "turmeric",
            "names": {
                "english": ["Turmeric"],
                "tamil": ["மஞ்சள்", "Manjal"],
                "hindi": ["हल्दी", "Haldi"],
                "bengali": ["-"]
            },
            "scientificName": "Curcuma longa",
            "tags": ["root"],
            "notes": "Bright yellow rhizome."
        },
        {
            "id": "cumin",
            "names": { "english": ["Cumin"], "tamil": ["சீரகம்", "Seeragam"], "hindi": ["जीरा", "Jeera"] },
            "scientificName": "Cuminum cyminum",
            "tags": ["seed", "aromatic"],
            "notes": "Earthy seeds."
        },
        {
            "id": "chilli",
            "names": { "english": ["Red Chilli"], "tamil": ["மிளகாய்", "Milagai"] },
            "scientificName": "Capsicum annuum",
            "tags": ["heat"],
            "notes": null
        }
    ])
}

pub fn fish() -> Value {
    json!([
        {
            "id": "rohu",
            "names": { "english": ["Rohu"], "bengali": ["রুই", "Rui"] },
            "scientificName": "Labeo rohita",
            "tags": ["freshwater"]
        },
        {
            "id": "seer-fish",
            "names": { "english": ["Seer Fish", "King Mackerel"], "tamil": ["வஞ்சிரம்", "Vanjaram"], "bengali": ["-"] },
            "scientificName": "Scomberomorus commerson",
            "tags": ["sea"]
        }
    ])
}

/// Fifty grains cycling through cereal, pulse and millet.
pub fn grains() -> Value {
    let kinds = ["cereal", "pulse", "millet"];
    Value::Array(
        (0..50)
            .map(|i| record(&format!("grain-{:02}", i), &format!("Grain {:02}", i), &[kinds[i % 3]]))
            .collect(),
    )
}

pub fn vegetables() -> Value {
    json!([
        record("tomato", "Tomato", &["fruit"]),
        record("spinach", "Spinach", &["leafy"]),
    ])
}

pub fn flowers() -> Value {
    json!([record("jasmine", "Jasmine", &["flower", "aromatic"])])
}

/// Every default category document.
pub fn source() -> MemorySource {
    let mut source = MemorySource::new();
    source.insert(SPICES, spices().to_string());
    source.insert(FISH, fish().to_string());
    source.insert(GRAINS, grains().to_string());
    source.insert(VEG, vegetables().to_string());
    source.insert(FLOWERS, flowers().to_string());
    source
}

pub fn browser_with(config: BrowserConfig, address: &str) -> TestBrowser {
    Browser::new(
        config,
        MemoryHistory::new(address),
        MemoryTarget::default(),
        MemoryHead::default(),
        Box::new(MemoryPreferences::new()),
    )
    .unwrap()
    .with_cache_token("t")
}

pub fn browser(address: &str) -> TestBrowser {
    browser_with(BrowserConfig::default(), address)
}

/// Start at `address` and serve every fetch from `source`.
pub fn started(address: &str, source: &mut MemorySource) -> TestBrowser {
    let mut b = browser(address);
    b.start();
    b.run_fetches(source);
    b
}
