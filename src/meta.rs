//! Page title and discoverability metadata, recomputed on every reconciliation.

use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::Serialize;

use crate::config::BrowserConfig;
use crate::model::{Category, Entity};

/// Document head contents derived from {category, query, resolved item}.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub url: String,
    pub canonical: String,
    pub og_title: String,
    pub og_description: String,
    pub image: String,
    /// Category tab to show as active.
    pub active_tab: String,
}

/// Receives head updates (title, meta tags, canonical link, active tab).
pub trait PageHead {
    fn apply(&mut self, meta: &PageMeta);
}

/// Keeps the last written metadata and counts writes.
#[derive(Debug, Default, Clone)]
pub struct MemoryHead {
    pub current: Option<PageMeta>,
    pub writes: usize,
}

impl PageHead for MemoryHead {
    fn apply(&mut self, meta: &PageMeta) {
        self.current = Some(meta.clone());
        self.writes += 1;
    }
}

impl PageMeta {
    /// Pure function of its inputs; `path` is the current address path.
    pub fn compute(
        config: &BrowserConfig,
        category: &Category,
        query: &str,
        item: Option<&Entity>,
        path: &str,
    ) -> Self {
        let site = config.site_name.as_str();
        let cat = category.label.as_str();
        let language_count = config.languages.len();
        let query = query.trim();

        let title = match item {
            Some(e) => format!("{} | {} | {}", e.label(&config.anchor_language), cat, site),
            None if !query.is_empty() => format!("{} | Search in {} | {}", query, cat, site),
            None => format!("{} | {}", cat, site),
        };

        let (description, og_title) = match item {
            Some(e) => {
                let anchor: Vec<&str> = e.names_in(&config.anchor_language).collect();
                let english = if anchor.is_empty() {
                    e.id.clone()
                } else {
                    anchor.join(", ")
                };
                let scientific = e
                    .scientific_name
                    .as_deref()
                    .filter(|s| !s.trim().is_empty())
                    .map(|s| format!(" ({})", s))
                    .unwrap_or_default();
                let regional: Vec<&str> = config
                    .meta_languages
                    .iter()
                    .filter_map(|l| e.names_in(l).next())
                    .collect();
                (
                    format!(
                        "{}{}. Regional names: {}. Multilingual {} glossary in {} Indian languages including Tamil, Hindi, Malayalam, and Kannada.",
                        english,
                        scientific,
                        regional.join(", "),
                        cat,
                        language_count
                    ),
                    format!("{} | {} Names", english, cat),
                )
            }
            None if !query.is_empty() => (
                format!(
                    "Search results for \"{}\" in the {} glossary: names in {} Indian languages with photos.",
                    query,
                    cat.to_lowercase(),
                    language_count
                ),
                format!("{} | {}", query, cat),
            ),
            None => (
                format!(
                    "Instantly identify and translate Indian food ingredients. Detailed glossary for Fish, Vegetables, Fruits, Grains, and Spices across {} languages including Tamil, Hindi, Malayalam, and Kannada.",
                    language_count
                ),
                format!("{} | Indian Ingredient Lexicon", cat),
            ),
        };

        let url = config.absolute_url(path);
        let canonical = if url.ends_with('/') {
            url.clone()
        } else {
            format!("{}/", url)
        };

        Self {
            title,
            og_description: description.clone(),
            description,
            url,
            canonical,
            og_title: format!("{} | {}", og_title, site),
            image: config.absolute_url(&config.social_image),
            active_tab: category.key.clone(),
        }
    }

    /// Render the head fragment (title, description, canonical, social tags).
    pub fn to_html(&self) -> String {
        let attr = |v: &str| encode_double_quoted_attribute(v).into_owned();
        let mut out = String::new();
        out.push_str(&format!("<title>{}</title>\n", encode_text(&self.title)));
        out.push_str(&format!(
            "<meta name=\"description\" content=\"{}\">\n",
            attr(self.description.as_str())
        ));
        out.push_str(&format!(
            "<link rel=\"canonical\" href=\"{}\">\n",
            attr(self.canonical.as_str())
        ));
        for prefix in ["og", "twitter"] {
            for (name, value) in [
                ("url", &self.url),
                ("title", &self.og_title),
                ("description", &self.og_description),
                ("image", &self.image),
            ] {
                out.push_str(&format!(
                    "<meta property=\"{}:{}\" content=\"{}\">\n",
                    prefix,
                    name,
                    attr(value.as_str())
                ));
            }
        }
        out
    }
}
