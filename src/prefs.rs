//! Persistent user preferences (the selected display languages).
//!
//! The store is a flat string key/value map that survives across sessions.
//! It is read once when a session starts and written on every explicit toggle.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;

use crate::error::{CatalogError, Result};

/// Persistent key/value store.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Volatile store for tests and headless sessions.
#[derive(Debug, Default, Clone)]
pub struct MemoryPreferences {
    values: IndexMap<String, String>,
    writes: usize,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set` calls so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}

/// Preferences kept in a JSON object on disk, rewritten on every `set`.
#[derive(Debug, Clone)]
pub struct FilePreferences {
    path: Utf8PathBuf,
    values: IndexMap<String, String>,
}

impl FilePreferences {
    /// Open `path`; a missing file starts out empty.
    pub fn open(path: impl Into<Utf8PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.as_std_path().exists() {
            read_values(&path).map_err(|e| CatalogError::Preferences(format!("{:#}", e)))?
        } else {
            IndexMap::new()
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn save(&self) -> anyhow::Result<()> {
        let text = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(self.path.as_std_path(), text)
            .with_context(|| format!("Failed to write preferences to {}", self.path))
    }
}

fn read_values(path: &Utf8Path) -> anyhow::Result<IndexMap<String, String>> {
    let text = std::fs::read_to_string(path.as_std_path())
        .with_context(|| format!("Failed to read preferences from {}", path))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid preferences file {}", path))
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.save()
            .map_err(|e| CatalogError::Preferences(format!("{:#}", e)))
    }
}

/// The ordered set of languages shown first on every card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePreference {
    key: String,
    active: Vec<String>,
}

impl LanguagePreference {
    /// Read the stored selection, falling back to `defaults` when nothing (or
    /// something unreadable) is stored.
    pub fn load(store: &dyn PreferenceStore, key: &str, defaults: &[String]) -> Self {
        let active = match store.get(key) {
            Some(raw) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(list) => list,
                Err(err) => {
                    tracing::warn!(key, error = %err, "ignoring unreadable language preference");
                    defaults.to_vec()
                }
            },
            None => defaults.to_vec(),
        };
        Self {
            key: key.to_string(),
            active,
        }
    }

    pub fn active(&self) -> &[String] {
        &self.active
    }

    pub fn is_active(&self, language: &str) -> bool {
        self.active.iter().any(|l| l == language)
    }

    /// Add or remove `language` and persist the new selection. Returns whether
    /// the language is active afterwards.
    pub fn toggle(&mut self, language: &str, store: &mut dyn PreferenceStore) -> Result<bool> {
        let now_active = match self.active.iter().position(|l| l == language) {
            Some(idx) => {
                self.active.remove(idx);
                false
            }
            None => {
                self.active.push(language.to_string());
                true
            }
        };
        store.set(&self.key, &serde_json::to_string(&self.active)?)?;
        Ok(now_active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Vec<String> {
        vec!["tamil".into(), "hindi".into()]
    }

    #[test]
    fn defaults_apply_until_first_toggle() {
        let mut store = MemoryPreferences::new();
        let mut pref = LanguagePreference::load(&store, "cardLanguages", &defaults());
        assert_eq!(pref.active(), defaults().as_slice());
        assert_eq!(store.writes(), 0);

        assert!(pref.toggle("bengali", &mut store).unwrap());
        assert!(!pref.toggle("tamil", &mut store).unwrap());
        assert_eq!(store.writes(), 2);
        assert_eq!(
            store.get("cardLanguages").as_deref(),
            Some(r#"["hindi","bengali"]"#)
        );
    }

    #[test]
    fn garbage_value_falls_back_to_defaults() {
        let mut store = MemoryPreferences::new();
        store.set("cardLanguages", "not json").unwrap();
        let pref = LanguagePreference::load(&store, "cardLanguages", &defaults());
        assert_eq!(pref.active(), defaults().as_slice());
    }
}
