//! Combined tag / free-text filter over a catalog snapshot.
//!
//! Tags use OR semantics (selecting two tags widens the result), text search
//! is a case-folded substring test over notes, scientific name and every name
//! in every language. Input order is always preserved.

use std::collections::BTreeSet;

use crate::model::{Entity, Snapshot, empty_snapshot};

/// Active tag filters. Ordered so that equal sets compare and print identically.
pub type TagSet = BTreeSet<String>;

/// Case-fold a raw query for matching. Whitespace-only queries fold to `""`.
pub fn fold_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Tag predicate: an empty filter set accepts everything.
pub fn matches_tags(entity: &Entity, tags: &TagSet) -> bool {
    tags.is_empty() || entity.tags.iter().any(|t| tags.contains(t))
}

/// Text predicate against an already folded query.
pub fn matches_folded(entity: &Entity, folded: &str) -> bool {
    if folded.is_empty() {
        return true;
    }
    let hit = |s: &str| s.to_lowercase().contains(folded);
    entity.notes.as_deref().is_some_and(hit)
        || entity.scientific_name.as_deref().is_some_and(hit)
        || entity.all_names().any(hit)
}

/// Check whether an entity passes both predicates.
pub fn matches(entity: &Entity, query: &str, tags: &TagSet) -> bool {
    matches_tags(entity, tags) && matches_folded(entity, &fold_query(query))
}

/// Positions in `dataset` of the entities passing the filter, ascending.
pub fn matching_indices(dataset: &[Entity], query: &str, tags: &TagSet) -> Vec<usize> {
    let folded = fold_query(query);
    dataset
        .iter()
        .enumerate()
        .filter(|(_, e)| matches_tags(e, tags) && matches_folded(e, &folded))
        .map(|(i, _)| i)
        .collect()
}

/// Filter `dataset`, returning the passing entities in their original order.
pub fn filter<'a>(dataset: &'a [Entity], query: &str, tags: &TagSet) -> Vec<&'a Entity> {
    matching_indices(dataset, query, tags)
        .into_iter()
        .map(|i| &dataset[i])
        .collect()
}

/// A filtered view over a shared snapshot.
///
/// Holds the snapshot by reference count plus the matching positions, so the
/// render controller can page through results without cloning entities.
#[derive(Debug, Clone)]
pub struct ResultSet {
    snapshot: Snapshot,
    hits: Vec<usize>,
}

impl Default for ResultSet {
    fn default() -> Self {
        Self {
            snapshot: empty_snapshot(),
            hits: Vec::new(),
        }
    }
}

impl ResultSet {
    pub fn new(snapshot: Snapshot, query: &str, tags: &TagSet) -> Self {
        let hits = matching_indices(&snapshot, query, tags);
        Self { snapshot, hits }
    }

    /// Every entity of the snapshot, unfiltered.
    pub fn all(snapshot: Snapshot) -> Self {
        let hits = (0..snapshot.len()).collect();
        Self { snapshot, hits }
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Size of the underlying (unfiltered) snapshot.
    pub fn total(&self) -> usize {
        self.snapshot.len()
    }

    pub fn get(&self, index: usize) -> Option<&Entity> {
        self.hits.get(index).map(|&i| &self.snapshot[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.hits.iter().map(|&i| &self.snapshot[i])
    }

    /// Entities in `start..end`, clamped to the result length.
    pub fn slice(&self, start: usize, end: usize) -> Vec<&Entity> {
        let end = end.min(self.hits.len());
        let start = start.min(end);
        self.hits[start..end]
            .iter()
            .map(|&i| &self.snapshot[i])
            .collect()
    }

    /// Result position of the entity with `id`, if it is part of the result.
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.iter().position(|e| e.id == id)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.iter().map(|e| e.id.as_str()).collect()
    }
}
