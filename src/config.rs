//! Browser configuration with built-in defaults for the FoodBhasha catalog.

use camino::Utf8Path;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{CatalogError, Result};
use crate::model::{Category, CategoryRegistry};

/// Supported display languages: code and "native / English" label.
const LANGUAGES: &[(&str, &str)] = &[
    ("assamese", "অসমীয়া / Assamese"),
    ("bengali", "বাংলা / Bengali"),
    ("bodo", "बोडो / Bodo"),
    ("dogri", "डोगरी / Dogri"),
    ("gujarati", "ગુજરાતી / Gujarati"),
    ("hindi", "हिंदी / Hindi"),
    ("kannada", "ಕನ್ನಡ / Kannada"),
    ("kashmiri", "कॉशुर / Kashmiri"),
    ("konkani", "कोंकणी / Konkani"),
    ("maithili", "मैथिली / Maithili"),
    ("malayalam", "മലയാളം / Malayalam"),
    ("manipuri", "মৈতৈলোন্ / Manipuri"),
    ("marathi", "मराठी / Marathi"),
    ("nepali", "नेपाली / Nepali"),
    ("odia", "ଓଡ଼ିଆ / Odia"),
    ("punjabi", "ਪੰਜਾਬੀ / Punjabi"),
    ("sanskrit", "संस्कृत / Sanskrit"),
    ("santali", "ᱥᱟᱱᱛᱟᱲᱤ / Santali"),
    ("sindhi", "سنڌي / Sindhi"),
    ("tamil", "தமிழ் / Tamil"),
    ("telugu", "తెలుగు / Telugu"),
    ("urdu", "اردو / Urdu"),
];

fn builtin_categories() -> Vec<Category> {
    vec![
        Category::new(
            "vegetables-fruits",
            "Vegetables & Fruits",
            "/data/vegetables-fruits.json",
            &["fruit", "root", "leafy", "vegetable"],
            "veg",
        ),
        Category::new(
            "grains",
            "Grains & Pulses",
            "/data/grains-pulses.json",
            &["cereal", "pulse", "millet"],
            "grain",
        ),
        Category::new(
            "spices",
            "Spices",
            "/data/spices.json",
            &["seed", "aromatic", "heat", "root", "acidic", "resin", "flower", "dry-fruit"],
            "spice",
        ),
        Category::new(
            "fish",
            "Fish & Seafood",
            "/data/fish-seafood.json",
            &["sea", "freshwater", "brackish"],
            "fish",
        ),
        Category::new(
            "flowers",
            "Flowers",
            "/data/flowers.json",
            &["flower", "aromatic", "decorative", "religious", "edible", "aquatic", "medicinal"],
            "flower",
        ),
    ]
}

fn strings(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Everything the engine needs to know about the deployed catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub categories: Vec<Category>,
    pub default_category: String,
    /// Language guaranteed on every entity and used as its primary label.
    pub anchor_language: String,
    /// Entities rendered per batch.
    pub batch_size: usize,
    /// Delay before a search edit is written to the address bar.
    pub debounce_ms: u64,
    /// Search every category while the query is non-empty.
    pub cross_category_search: bool,
    /// Supported language codes with display names, in picker order.
    pub languages: IndexMap<String, String>,
    /// Languages shown on cards until the user picks their own.
    pub default_card_languages: Vec<String>,
    /// Languages quoted in item descriptions.
    pub meta_languages: Vec<String>,
    pub site_name: String,
    pub base_url: String,
    pub social_image: String,
    /// Preference-store key holding the selected card languages.
    pub preference_key: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            categories: builtin_categories(),
            default_category: "vegetables-fruits".to_string(),
            anchor_language: "english".to_string(),
            batch_size: 20,
            debounce_ms: 500,
            cross_category_search: false,
            languages: LANGUAGES
                .iter()
                .map(|(code, name)| (code.to_string(), name.to_string()))
                .collect(),
            default_card_languages: strings(&["tamil", "kannada", "telugu", "hindi"]),
            meta_languages: strings(&["tamil", "hindi", "kannada", "malayalam"]),
            site_name: "FoodBhasha".to_string(),
            base_url: "https://foodbhasha.com".to_string(),
            social_image: "/assets/graphics/logo.webp".to_string(),
            preference_key: "cardLanguages".to_string(),
        }
    }
}

impl BrowserConfig {
    /// Read a JSON configuration; omitted fields keep their defaults.
    pub fn from_file(path: &Utf8Path) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_std_path())?;
        let config: Self = serde_json::from_str(&text)?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(CatalogError::Config("batch_size must be positive".into()));
        }
        if self.anchor_language.trim().is_empty() {
            return Err(CatalogError::Config("anchor_language is empty".into()));
        }
        Ok(())
    }

    /// Validated category registry.
    pub fn registry(&self) -> Result<CategoryRegistry> {
        self.check()?;
        CategoryRegistry::new(self.categories.clone(), &self.default_category)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Display name for a language code, falling back to the code.
    pub fn language_name<'a>(&'a self, code: &'a str) -> &'a str {
        self.languages.get(code).map(String::as_str).unwrap_or(code)
    }

    /// Absolute URL for a site-relative path.
    pub fn absolute_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}
