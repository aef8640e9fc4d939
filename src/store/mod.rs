//! Category-scoped catalog loading and caching.
//!
//! Loads are split in two phases so the caller owns the suspension point:
//! [`CatalogStore::begin_load`] hands out a [`LoadTicket`] naming the document
//! to fetch, and [`CatalogStore::finish_load`] commits the fetched body. A
//! single in-flight guard covers both per-category and cross-category loads;
//! a request arriving while one is outstanding is a no-op.
//!
//! Within one store a category that loaded successfully is never fetched
//! again. Every fetch still carries a cache-busting token so a new store (a
//! new browsing session) sees published data updates.

mod source;

pub use source::{CatalogSource, FsSource, MemorySource, strip_query};

use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{CatalogError, Result};
use crate::model::{CategoryRegistry, Entity, Snapshot};

/// Pseudo category key used for the cross-category union.
pub const EVERYTHING: &str = "*";

/// Observable loading status of the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum LoadState {
    Idle,
    Loading { category: String },
    Ready { category: String },
    Failed { category: String, message: String },
}

/// Which load currently holds the in-flight guard.
#[derive(Debug, Clone, PartialEq, Eq)]
enum InFlight {
    Category(String),
    Everything,
}

/// Permission to fetch one category document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    category: String,
    locator: String,
}

impl LoadTicket {
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Cache-busted locator to fetch.
    pub fn locator(&self) -> &str {
        &self.locator
    }
}

/// Permission to fetch every category not cached yet, for the cross-category union.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllLoadTicket {
    parts: Vec<LoadTicket>,
}

impl AllLoadTicket {
    pub fn parts(&self) -> &[LoadTicket] {
        &self.parts
    }
}

/// Outcome of [`CatalogStore::begin_load`].
#[derive(Debug, Clone)]
pub enum LoadStep {
    /// Already loaded in this session.
    Cached(Snapshot),
    /// Another load holds the guard; nothing was started.
    InFlight,
    /// The caller must fetch the ticket's locator and call `finish_load`.
    Fetch(LoadTicket),
}

/// Outcome of [`CatalogStore::begin_load_all`].
#[derive(Debug, Clone)]
pub enum AllLoadStep {
    Cached(Snapshot),
    InFlight,
    Fetch(AllLoadTicket),
}

/// Append the cache-busting token to a locator.
pub fn cache_busted(locator: &str, token: &str) -> String {
    let sep = if locator.contains('?') { '&' } else { '?' };
    format!("{}{}v={}", locator, sep, token)
}

/// Decode one category document and stamp every record with `category`.
///
/// Records without anchor-language names are kept (their id serves as the
/// label) and reported as data-quality warnings.
pub fn decode_category(
    category: &str,
    locator: &str,
    text: &str,
    anchor_language: &str,
) -> Result<Vec<Entity>> {
    let mut entities: Vec<Entity> =
        serde_json::from_str(text).map_err(|source| CatalogError::Parse {
            locator: locator.to_string(),
            source,
        })?;
    for (idx, e) in entities.iter_mut().enumerate() {
        e.category = Some(category.to_string());
        if e.id.trim().is_empty() {
            tracing::warn!(category, index = idx, "record without id");
        }
        if !e.has_names_in(anchor_language) {
            tracing::warn!(
                category,
                id = %e.id,
                language = anchor_language,
                "record without anchor-language names, falling back to id"
            );
        }
    }
    Ok(entities)
}

fn session_token() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

/// Per-category and cross-category snapshot cache with an in-flight guard.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    registry: CategoryRegistry,
    anchor_language: String,
    cache_token: String,
    snapshots: IndexMap<String, Snapshot>,
    everything: Option<Snapshot>,
    in_flight: Option<InFlight>,
    state: LoadState,
}

impl CatalogStore {
    pub fn new(registry: CategoryRegistry, anchor_language: impl Into<String>) -> Self {
        Self {
            registry,
            anchor_language: anchor_language.into(),
            cache_token: session_token(),
            snapshots: IndexMap::new(),
            everything: None,
            in_flight: None,
            state: LoadState::Idle,
        }
    }

    /// Replace the cache-busting token (deterministic locators in tests).
    pub fn with_cache_token(mut self, token: impl Into<String>) -> Self {
        self.cache_token = token.into();
        self
    }

    pub fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn snapshot(&self, category: &str) -> Option<Snapshot> {
        self.snapshots.get(category).cloned()
    }

    pub fn is_cached(&self, category: &str) -> bool {
        self.snapshots.contains_key(category)
    }

    /// The cross-category union, once populated.
    pub fn everything(&self) -> Option<Snapshot> {
        self.everything.clone()
    }

    fn ticket(&self, category: &str) -> Result<LoadTicket> {
        let c = self
            .registry
            .get(category)
            .ok_or_else(|| CatalogError::UnknownCategory(category.to_string()))?;
        Ok(LoadTicket {
            category: c.key.clone(),
            locator: cache_busted(&c.source, &self.cache_token),
        })
    }

    /// Start loading `category`.
    pub fn begin_load(&mut self, category: &str) -> Result<LoadStep> {
        let ticket = self.ticket(category)?;
        if let Some(snapshot) = self.snapshots.get(category) {
            self.state = LoadState::Ready {
                category: category.to_string(),
            };
            return Ok(LoadStep::Cached(snapshot.clone()));
        }
        if let Some(busy) = &self.in_flight {
            tracing::debug!(category, ?busy, "load already in flight, ignoring request");
            return Ok(LoadStep::InFlight);
        }
        self.in_flight = Some(InFlight::Category(category.to_string()));
        self.state = LoadState::Loading {
            category: category.to_string(),
        };
        Ok(LoadStep::Fetch(ticket))
    }

    /// Commit the fetched body for `ticket`. The guard is released either way.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        body: anyhow::Result<String>,
    ) -> Result<Snapshot> {
        if self.in_flight == Some(InFlight::Category(ticket.category.clone())) {
            self.in_flight = None;
        }
        match self.decode(&ticket, body) {
            Ok(snapshot) => {
                tracing::info!(category = %ticket.category, entities = snapshot.len(), "category loaded");
                self.snapshots
                    .insert(ticket.category.clone(), snapshot.clone());
                self.state = LoadState::Ready {
                    category: ticket.category,
                };
                Ok(snapshot)
            }
            Err(err) => {
                tracing::error!(category = %ticket.category, error = %err, "failed to load category");
                self.state = LoadState::Failed {
                    category: ticket.category,
                    message: err.to_string(),
                };
                Err(err)
            }
        }
    }

    fn decode(&self, ticket: &LoadTicket, body: anyhow::Result<String>) -> Result<Snapshot> {
        let text = body.map_err(|err| CatalogError::Fetch {
            locator: ticket.locator.clone(),
            message: format!("{:#}", err),
        })?;
        let entities = decode_category(
            &ticket.category,
            &ticket.locator,
            &text,
            &self.anchor_language,
        )?;
        Ok(Arc::from(entities))
    }

    /// Start populating the cross-category union. Categories already cached are
    /// reused; only the missing ones are fetched.
    pub fn begin_load_all(&mut self) -> Result<AllLoadStep> {
        if let Some(all) = &self.everything {
            return Ok(AllLoadStep::Cached(all.clone()));
        }
        if let Some(busy) = &self.in_flight {
            tracing::debug!(?busy, "load already in flight, ignoring cross-category request");
            return Ok(AllLoadStep::InFlight);
        }
        let mut parts = Vec::new();
        for key in self.registry.keys() {
            if !self.snapshots.contains_key(key) {
                parts.push(self.ticket(key)?);
            }
        }
        if parts.is_empty() {
            return Ok(AllLoadStep::Cached(self.assemble_everything()));
        }
        self.in_flight = Some(InFlight::Everything);
        self.state = LoadState::Loading {
            category: EVERYTHING.to_string(),
        };
        Ok(AllLoadStep::Fetch(AllLoadTicket { parts }))
    }

    /// Commit the bodies for every part of `ticket`, in ticket order.
    ///
    /// Successfully decoded parts are cached per category even when another
    /// part fails; the union itself is only cached when all parts succeed.
    pub fn finish_load_all(
        &mut self,
        ticket: AllLoadTicket,
        bodies: Vec<anyhow::Result<String>>,
    ) -> Result<Snapshot> {
        if self.in_flight == Some(InFlight::Everything) {
            self.in_flight = None;
        }
        let mut bodies = bodies.into_iter();
        let mut first_error = None;
        for part in &ticket.parts {
            let body = bodies
                .next()
                .unwrap_or_else(|| Err(anyhow::anyhow!("No response for {}", part.locator)));
            match self.decode(part, body) {
                Ok(snapshot) => {
                    self.snapshots.insert(part.category.clone(), snapshot);
                }
                Err(err) => {
                    tracing::error!(category = %part.category, error = %err, "failed to load category for cross-category search");
                    first_error.get_or_insert(err);
                }
            }
        }
        if let Some(err) = first_error {
            self.state = LoadState::Failed {
                category: EVERYTHING.to_string(),
                message: err.to_string(),
            };
            return Err(err);
        }
        let all = self.assemble_everything();
        tracing::info!(entities = all.len(), "cross-category cache populated");
        self.state = LoadState::Ready {
            category: EVERYTHING.to_string(),
        };
        Ok(all)
    }

    fn assemble_everything(&mut self) -> Snapshot {
        let union: Vec<Entity> = self
            .registry
            .keys()
            .filter_map(|k| self.snapshots.get(k))
            .flat_map(|s| s.iter().cloned())
            .collect();
        let all: Snapshot = Arc::from(union);
        self.everything = Some(all.clone());
        all
    }

    /// Load `category` synchronously through `source`.
    ///
    /// Returns `Ok(None)` when another load holds the in-flight guard.
    pub fn load(
        &mut self,
        source: &mut dyn CatalogSource,
        category: &str,
    ) -> Result<Option<Snapshot>> {
        match self.begin_load(category)? {
            LoadStep::Cached(s) => Ok(Some(s)),
            LoadStep::InFlight => Ok(None),
            LoadStep::Fetch(ticket) => {
                let body = source.fetch(ticket.locator());
                self.finish_load(ticket, body).map(Some)
            }
        }
    }

    /// Populate the cross-category union synchronously through `source`.
    pub fn load_all(&mut self, source: &mut dyn CatalogSource) -> Result<Option<Snapshot>> {
        match self.begin_load_all()? {
            AllLoadStep::Cached(s) => Ok(Some(s)),
            AllLoadStep::InFlight => Ok(None),
            AllLoadStep::Fetch(ticket) => {
                let bodies = ticket
                    .parts()
                    .iter()
                    .map(|p| source.fetch(p.locator()))
                    .collect();
                self.finish_load_all(ticket, bodies).map(Some)
            }
        }
    }
}
