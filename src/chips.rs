//! Filter chips: which tags can be toggled for the loaded category.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

use crate::filter::TagSet;
use crate::model::{Category, Entity};

static TAG_LABELS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("sea", "🌊 Sea"),
        ("freshwater", "💧 Freshwater"),
        ("brackish", "🌿 Brackish"),
        ("root", "🥔 Root"),
        ("leafy", "🥬 Leafy"),
        ("vegetable", "🍆 Vegetable"),
        ("fruit", "🍎 Fruit"),
        ("cereal", "🌾 Cereal"),
        ("pulse", "🫘 Pulse"),
        ("millet", "🥣 Millet"),
        ("spice", "🌶️ Spice"),
        ("seed", "🌿 Seed"),
        ("aromatic", "🪵 Aromatic"),
        ("heat", "🔥 Heat"),
        ("acidic", "🍋 Acidic"),
        ("resin", "🥣 Resin"),
        ("flower", "🌸 Flower"),
        ("dry-fruit", "🥜 Dry Fruit"),
        ("aquatic", "💧 Aquatic"),
        ("medicinal", "💊 Medicinal"),
        ("decorative", "🎋 Decorative"),
        ("religious", "🙏 Religious"),
        ("edible", "🍽️ Edible"),
    ])
});

/// Display label for a tag; unknown tags are capitalized.
pub fn tag_label(tag: &str) -> String {
    if let Some(label) = TAG_LABELS.get(tag) {
        return label.to_string();
    }
    let mut chars = tag.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// One toggle button. `tag == None` is the "All" pseudo-chip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chip {
    pub tag: Option<String>,
    pub label: String,
    pub active: bool,
}

/// Whitelisted tags that occur on at least one entity of `dataset`, in
/// whitelist order.
pub fn available_tags(category: &Category, dataset: &[Entity]) -> Vec<String> {
    category
        .tags
        .iter()
        .filter(|t| dataset.iter().any(|e| e.has_tag(t)))
        .cloned()
        .collect()
}

/// Chip row for `category`: "All" first, then [`available_tags`].
pub fn chips(category: &Category, dataset: &[Entity], active: &TagSet) -> Vec<Chip> {
    let mut out = vec![Chip {
        tag: None,
        label: "All".to_string(),
        active: active.is_empty(),
    }];
    out.extend(available_tags(category, dataset).into_iter().map(|t| Chip {
        label: tag_label(&t),
        active: active.contains(&t),
        tag: Some(t),
    }));
    out
}

/// Add or remove `tag`; returns whether it is active afterwards.
pub fn toggle(active: &mut TagSet, tag: &str) -> bool {
    if active.remove(tag) {
        false
    } else {
        active.insert(tag.to_string());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spices() -> Category {
        Category::new("spices", "Spices", "/data/spices.json", &["seed", "aromatic", "heat", "root"], "spice")
    }

    #[test]
    fn chips_follow_whitelist_order_and_presence() {
        let data = vec![
            Entity::new("chilli").with_tags(&["heat", "spice"]),
            Entity::new("cumin").with_tags(&["seed"]),
        ];
        let chips = chips(&spices(), &data, &TagSet::new());
        let tags: Vec<Option<&str>> = chips.iter().map(|c| c.tag.as_deref()).collect();
        assert_eq!(tags, vec![None, Some("seed"), Some("heat")]);
        assert!(chips[0].active);
        assert_eq!(chips[2].label, "🔥 Heat");
    }

    #[test]
    fn all_chip_is_active_only_without_filters() {
        let data = vec![Entity::new("cumin").with_tags(&["seed"])];
        let mut active = TagSet::new();
        assert!(toggle(&mut active, "seed"));
        let row = chips(&spices(), &data, &active);
        assert!(!row[0].active);
        assert!(row[1].active);
        assert!(!toggle(&mut active, "seed"));
        assert!(active.is_empty());
    }

    #[test]
    fn unknown_tags_are_capitalized() {
        assert_eq!(tag_label("smoked"), "Smoked");
        assert_eq!(tag_label(""), "");
    }
}
