//! Offline integrity and language-coverage check over a catalog directory.
//!
//! Works on raw JSON values rather than [`Entity`](crate::model::Entity) so
//! that shape problems the lenient loader would paper over (a `tags` string,
//! a non-list name entry) are still reported.

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};
use walkdir::WalkDir;

use crate::config::BrowserConfig;
use crate::model::{Category, PLACEHOLDER, is_placeholder};
use crate::store::{CatalogSource, FsSource};

/// Note text left behind by the data-entry template.
const PLACEHOLDER_NOTE: &str = "Description to be added.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub severity: Severity,
    /// Entity id (or `#index` when the record has none).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    pub message: String,
}

/// Findings for one category document.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryReport {
    pub category: String,
    pub source: String,
    pub entities: usize,
    pub issues: Vec<Issue>,
    /// Language → number of entities with no real names in it.
    pub missing_languages: IndexMap<String, usize>,
}

impl CategoryReport {
    pub fn errors(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warnings(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub categories: Vec<CategoryReport>,
    /// JSON files next to the category documents that no category references.
    pub unreferenced: Vec<String>,
    pub errors: usize,
    pub warnings: usize,
}

impl Report {
    pub fn passed(&self) -> bool {
        self.errors == 0
    }
}

struct Checker<'a> {
    category: &'a Category,
    config: &'a BrowserConfig,
    issues: Vec<Issue>,
}

impl Checker<'_> {
    fn push(&mut self, severity: Severity, item: &str, message: String) {
        self.issues.push(Issue {
            severity,
            item: Some(item.to_string()),
            message,
        });
    }

    fn error(&mut self, item: &str, message: impl Into<String>) {
        self.push(Severity::Error, item, message.into());
    }

    fn warn(&mut self, item: &str, message: impl Into<String>) {
        self.push(Severity::Warning, item, message.into());
    }

    fn check_record(&mut self, idx: usize, record: &Value, seen: &mut HashSet<String>) {
        let id = record.get("id").and_then(Value::as_str).unwrap_or_default();
        let item = if id.is_empty() {
            format!("#{}", idx)
        } else {
            id.to_string()
        };

        if id.is_empty() {
            self.error(&item, "missing id");
        } else if !seen.insert(id.to_string()) {
            self.error(&item, "duplicate id");
        }

        match record.get("tags") {
            None | Some(Value::Null) => self.error(&item, "missing tags"),
            Some(Value::Array(tags)) if tags.is_empty() => self.error(&item, "tags list is empty"),
            Some(Value::Array(tags)) => {
                for tag in tags {
                    match tag.as_str() {
                        Some(t) if !self.category.recognizes(t) => {
                            self.warn(&item, format!("unknown tag '{}'", t))
                        }
                        Some(_) => {}
                        None => self.error(&item, "tags must be strings"),
                    }
                }
            }
            Some(_) => self.error(&item, "tags must be a list"),
        }

        let scientific = record
            .get("scientificName")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if scientific.trim().is_empty() {
            self.error(&item, "missing scientificName");
        }

        match record.get("notes") {
            None => self.warn(&item, "missing notes"),
            Some(v) => match v.as_str().map(str::trim) {
                None | Some("") => self.warn(&item, "empty notes"),
                Some(PLACEHOLDER_NOTE) => self.warn(&item, "placeholder note"),
                Some(_) => {}
            },
        }

        let Some(names) = record.get("names").and_then(Value::as_object) else {
            self.error(&item, "missing names");
            return;
        };
        let anchor = self.config.anchor_language.as_str();
        if !has_real_names(names.get(anchor)) {
            self.error(&item, format!("missing {} name", anchor));
        }
        for language in self.config.languages.keys() {
            match names.get(language) {
                None => self.warn(&item, format!("missing key for language {}", language)),
                Some(Value::Array(list)) => {
                    let single_placeholder =
                        list.len() == 1 && list[0].as_str() == Some(PLACEHOLDER);
                    if list.len() % 2 != 0 && !single_placeholder {
                        self.warn(
                            &item,
                            format!(
                                "{} has an odd number of names ({}), expected native/romanized pairs",
                                language,
                                list.len()
                            ),
                        );
                    }
                }
                Some(Value::Null) => {}
                Some(_) => self.error(&item, format!("{} names must be a list", language)),
            }
        }
    }
}

/// A name list carrying at least one real (non-placeholder) string.
fn has_real_names(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_array)
        .is_some_and(|list| {
            list.iter()
                .filter_map(Value::as_str)
                .any(|n| !n.trim().is_empty() && !is_placeholder(n))
        })
}

/// Validate one category document body.
pub fn check_category(config: &BrowserConfig, category: &Category, text: &str) -> CategoryReport {
    let mut report = CategoryReport {
        category: category.key.clone(),
        source: category.source.clone(),
        entities: 0,
        issues: Vec::new(),
        missing_languages: IndexMap::new(),
    };
    let records = match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(records)) => records,
        Ok(_) => {
            report.issues.push(Issue {
                severity: Severity::Error,
                item: None,
                message: "document is not a JSON array".into(),
            });
            return report;
        }
        Err(err) => {
            report.issues.push(Issue {
                severity: Severity::Error,
                item: None,
                message: format!("invalid JSON: {}", err),
            });
            return report;
        }
    };

    let mut checker = Checker {
        category,
        config,
        issues: Vec::new(),
    };
    let mut seen = HashSet::new();
    for (idx, record) in records.iter().enumerate() {
        checker.check_record(idx, record, &mut seen);
    }

    for language in config.languages.keys() {
        let missing = records
            .iter()
            .filter(|r| !has_real_names(r.get("names").and_then(|n| n.get(language))))
            .count();
        report.missing_languages.insert(language.clone(), missing);
    }
    report.entities = records.len();
    report.issues = checker.issues;
    report
}

/// JSON files in the directories holding category documents that no
/// category references.
fn unreferenced_documents(source: &FsSource, config: &BrowserConfig) -> Vec<String> {
    let referenced: HashSet<Utf8PathBuf> = config
        .categories
        .iter()
        .map(|c| source.resolve(&c.source))
        .collect();
    let dirs: BTreeSet<Utf8PathBuf> = referenced
        .iter()
        .filter_map(|p| p.parent().map(Utf8Path::to_path_buf))
        .collect();

    let mut out = Vec::new();
    for dir in dirs {
        for entry in WalkDir::new(dir.as_std_path())
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let Ok(path) = Utf8PathBuf::from_path_buf(entry.path().to_path_buf()) else {
                continue;
            };
            if entry.file_type().is_file()
                && path.extension() == Some("json")
                && !referenced.contains(&path)
            {
                out.push(path.to_string());
            }
        }
    }
    out
}

/// Validate every category document under the site root `root`.
pub fn validate_dir(root: &Utf8Path, config: &BrowserConfig) -> Report {
    let mut source = FsSource::new(root.to_path_buf());
    let bodies: Vec<(&Category, anyhow::Result<String>)> = config
        .categories
        .iter()
        .map(|c| (c, source.fetch(&c.source)))
        .collect();

    let categories: Vec<CategoryReport> = bodies
        .par_iter()
        .map(|(category, body)| match body {
            Ok(text) => check_category(config, category, text),
            Err(err) => CategoryReport {
                category: category.key.clone(),
                source: category.source.clone(),
                entities: 0,
                issues: vec![Issue {
                    severity: Severity::Error,
                    item: None,
                    message: format!("{:#}", err),
                }],
                missing_languages: IndexMap::new(),
            },
        })
        .collect();

    let unreferenced = unreferenced_documents(&source, config);
    for path in &unreferenced {
        tracing::warn!(%path, "JSON document not referenced by any category");
    }
    let errors = categories.iter().map(CategoryReport::errors).sum();
    let warnings =
        categories.iter().map(CategoryReport::warnings).sum::<usize>() + unreferenced.len();
    Report {
        categories,
        unreferenced,
        errors,
        warnings,
    }
}
