//! Display projection of an entity, as handed to the render target.

use serde::Serialize;

use crate::chips::tag_label;
use crate::config::BrowserConfig;
use crate::model::{Category, CategoryRegistry, Entity};

/// One language row on a card. `value` is `"-"` when the language has no data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameRow {
    pub language: String,
    pub label: String,
    pub value: String,
}

/// Everything a presentation layer needs to draw one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    pub id: String,
    pub category: String,
    /// Anchor-language names joined with `" / "`.
    pub title: String,
    /// Primary label (first anchor name, or the id for malformed records).
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scientific_name: Option<String>,
    /// Labels of the tags recognized by the entity's own category.
    pub badges: Vec<String>,
    /// Rows for the user's selected languages, in selection order.
    pub primary: Vec<NameRow>,
    /// Rows for the remaining supported languages.
    pub other: Vec<NameRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub photo: String,
    pub fallback_photo: String,
    pub share_url: String,
}

/// Builds [`Card`]s for the current language selection.
#[derive(Debug, Clone)]
pub struct CardBuilder {
    config: BrowserConfig,
    registry: CategoryRegistry,
    active: Vec<String>,
}

impl CardBuilder {
    pub fn new(config: BrowserConfig, registry: CategoryRegistry, active: Vec<String>) -> Self {
        Self {
            config,
            registry,
            active,
        }
    }

    pub fn active_languages(&self) -> &[String] {
        &self.active
    }

    pub fn set_active_languages(&mut self, active: Vec<String>) {
        self.active = active;
    }

    fn row(&self, entity: &Entity, language: &str) -> NameRow {
        NameRow {
            language: language.to_string(),
            label: self.config.language_name(language).to_string(),
            value: entity.display_names(language),
        }
    }

    /// Project `entity`. `current` is the category being browsed; an entity
    /// stamped with another category (cross-category results) keeps its own.
    pub fn build(&self, entity: &Entity, current: &str) -> Card {
        let anchor = self.config.anchor_language.as_str();
        let key = entity.category.as_deref().unwrap_or(current);
        let category: &Category = self
            .registry
            .get(key)
            .unwrap_or_else(|| self.registry.default_category());

        let anchor_names: Vec<&str> = entity.names_in(anchor).collect();
        let title = if anchor_names.is_empty() {
            entity.id.clone()
        } else {
            anchor_names.join(" / ")
        };
        let fallback_photo = category.fallback_photo();

        Card {
            id: entity.id.clone(),
            category: category.key.clone(),
            title,
            label: entity.label(anchor).to_string(),
            scientific_name: entity
                .scientific_name
                .as_ref()
                .filter(|s| !s.trim().is_empty())
                .cloned(),
            badges: entity
                .tags
                .iter()
                .filter(|t| category.recognizes(t))
                .map(|t| tag_label(t))
                .collect(),
            primary: self.active.iter().map(|l| self.row(entity, l)).collect(),
            other: self
                .config
                .languages
                .keys()
                .filter(|l| !self.active.contains(*l))
                .map(|l| self.row(entity, l))
                .collect(),
            notes: entity
                .notes
                .as_ref()
                .filter(|n| !n.trim().is_empty())
                .cloned(),
            photo: entity.photo_path().unwrap_or_else(|| fallback_photo.clone()),
            fallback_photo,
            share_url: self
                .config
                .absolute_url(&format!("/{}/{}", category.key, entity.id)),
        }
    }
}
