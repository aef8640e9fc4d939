//! Catalog data model: entities, categories and the category registry.
//!
//! Entities are deserialized straight from the per-category JSON documents.
//! Once loaded they are shared as an immutable [`Snapshot`]; nothing in the
//! engine mutates a record after the store has stamped its category.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;

use crate::error::{CatalogError, Result};

/// Literal value used inside a name list to mark "no data".
pub const PLACEHOLDER: &str = "-";

/// Immutable, shareable dataset for one category (or the cross-category union).
pub type Snapshot = Arc<[Entity]>;

/// A snapshot with no entities.
pub fn empty_snapshot() -> Snapshot {
    Arc::from(Vec::new())
}

/// Returns true for the `"-"` placeholder (surrounding whitespace ignored).
pub fn is_placeholder(value: &str) -> bool {
    value.trim() == PLACEHOLDER
}

// ────────────────────────────────────────────────────────────────────────────
// Entity
// ────────────────────────────────────────────────────────────────────────────

/// One catalog record.
///
/// `names` keeps the insertion order of the source document so that display
/// and search walk languages in the order the data author wrote them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    /// Stable URL-safe identifier, unique within its category.
    #[serde(default)]
    pub id: String,
    /// Language code → ordered display strings (native script, then romanized).
    #[serde(default, deserialize_with = "lenient_names")]
    pub names: IndexMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scientific_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    /// Source category, stamped by the store at load time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

fn lenient_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_names<'de, D>(
    deserializer: D,
) -> std::result::Result<IndexMap<String, Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<IndexMap<String, Option<Vec<String>>>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(lang, names)| (lang, names.unwrap_or_default()))
        .collect())
}

impl Entity {
    /// Create an entity with only an id; mostly useful for fixtures.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            names: IndexMap::new(),
            scientific_name: None,
            tags: Vec::new(),
            notes: None,
            photo: None,
            category: None,
        }
    }

    /// Builder-style helper to set the names of one language.
    pub fn with_names(mut self, language: &str, names: &[&str]) -> Self {
        self.names.insert(
            language.to_string(),
            names.iter().map(|n| n.to_string()).collect(),
        );
        self
    }

    /// Builder-style helper to set the tags.
    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Real names recorded for `language`: blanks and placeholders are skipped.
    pub fn names_in<'a>(&'a self, language: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        self.names
            .get(language)
            .into_iter()
            .flatten()
            .map(String::as_str)
            .filter(|n| !n.trim().is_empty() && !is_placeholder(n))
    }

    /// Whether `language` carries at least one real name.
    pub fn has_names_in(&self, language: &str) -> bool {
        self.names_in(language).next().is_some()
    }

    /// Every real name across all languages, in document order.
    pub fn all_names(&self) -> impl Iterator<Item = &str> {
        self.names
            .values()
            .flatten()
            .map(String::as_str)
            .filter(|n| !is_placeholder(n))
    }

    /// Names of `language` joined for display, or `"-"` when there is no data.
    pub fn display_names(&self, language: &str) -> String {
        let names: Vec<&str> = self.names_in(language).collect();
        if names.is_empty() {
            PLACEHOLDER.to_string()
        } else {
            names.join(" / ")
        }
    }

    /// Primary label: the first anchor-language name, else the identifier.
    pub fn label(&self, anchor: &str) -> &str {
        self.names_in(anchor).next().unwrap_or(&self.id)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Photo reference normalized to an absolute path.
    pub fn photo_path(&self) -> Option<String> {
        let photo = self.photo.as_deref()?.trim();
        if photo.is_empty() {
            None
        } else if photo.starts_with('/') || photo.contains("://") {
            Some(photo.to_string())
        } else {
            Some(format!("/{}", photo))
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Category
// ────────────────────────────────────────────────────────────────────────────

/// A top-level grouping with its own data source and tag whitelist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Route segment, e.g. `"grains"`.
    pub key: String,
    /// Human-readable name, e.g. `"Grains & Pulses"`.
    pub label: String,
    /// Locator of the JSON document, e.g. `"/data/grains-pulses.json"`.
    pub source: String,
    /// Recognized tags in display order.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Suffix of the fallback image, e.g. `"grain"`.
    #[serde(default)]
    pub placeholder: String,
}

impl Category {
    pub fn new(key: &str, label: &str, source: &str, tags: &[&str], placeholder: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            source: source.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            placeholder: placeholder.to_string(),
        }
    }

    /// Whether `tag` is on this category's whitelist.
    pub fn recognizes(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Deterministic image used when an entity photo is missing or broken.
    pub fn fallback_photo(&self) -> String {
        let kind = if self.placeholder.is_empty() {
            self.key.as_str()
        } else {
            self.placeholder.as_str()
        };
        format!("/assets/graphics/placeholder_{}.webp", kind)
    }
}

/// Static, ordered set of categories with a default.
#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    categories: IndexMap<String, Category>,
    default_index: usize,
}

impl CategoryRegistry {
    /// Build a registry; fails on an empty list, duplicate keys or an
    /// unregistered default.
    pub fn new(categories: Vec<Category>, default_key: &str) -> Result<Self> {
        let mut map = IndexMap::with_capacity(categories.len());
        for c in categories {
            if map.contains_key(&c.key) {
                return Err(CatalogError::Config(format!("duplicate category '{}'", c.key)));
            }
            map.insert(c.key.clone(), c);
        }
        let default_index = map.get_index_of(default_key).ok_or_else(|| {
            CatalogError::Config(format!("default category '{}' is not registered", default_key))
        })?;
        Ok(Self {
            categories: map,
            default_index,
        })
    }

    pub fn get(&self, key: &str) -> Option<&Category> {
        self.categories.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.categories.contains_key(key)
    }

    pub fn default_category(&self) -> &Category {
        &self.categories[self.default_index]
    }

    /// Map a route segment to a category, falling back to the default when
    /// the segment is absent or unrecognized.
    pub fn resolve(&self, segment: Option<&str>) -> &Category {
        match segment {
            Some(key) => match self.categories.get(key) {
                Some(c) => c,
                None => {
                    tracing::debug!(segment = key, "unknown category segment, using default");
                    self.default_category()
                }
            },
            None => self.default_category(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
