//! Navigable addresses and navigation history.
//!
//! Addresses follow `/{category}[/{itemId}][?search={query}]`. Parsing never
//! fails: anything unusable degrades to an empty [`Route`], which the browser
//! maps onto the default category.

use url::Url;

/// Query parameter carrying the search text.
pub const SEARCH_PARAM: &str = "search";

const LOCAL_BASE: &str = "http://localhost/";

/// The three logical route components.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Route {
    /// First path segment, unvalidated.
    pub category: Option<String>,
    /// Second path segment.
    pub item_id: Option<String>,
    /// Search text (trimmed), empty when absent.
    pub query: String,
}

fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

impl Route {
    /// Route for a category page.
    pub fn category(key: &str) -> Self {
        Self {
            category: Some(key.to_string()),
            ..Self::default()
        }
    }

    /// Route for a single item inside a category.
    pub fn item(category: &str, id: &str) -> Self {
        Self {
            category: Some(category.to_string()),
            item_id: Some(id.to_string()),
            query: String::new(),
        }
    }

    pub fn with_query(mut self, query: &str) -> Self {
        self.query = query.trim().to_string();
        self
    }

    /// Parse a path (`/fish/rohu?search=x`) or an absolute URL.
    pub fn parse(address: &str) -> Self {
        let Ok(base) = Url::parse(LOCAL_BASE) else {
            return Self::default();
        };
        let Ok(url) = base.join(address.trim()) else {
            tracing::debug!(address, "unparseable address");
            return Self::default();
        };
        let mut segments = url
            .path_segments()
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .map(decode_segment);
        let category = segments.next();
        let item_id = segments.next();
        let query = url
            .query_pairs()
            .find(|(k, _)| k == SEARCH_PARAM)
            .map(|(_, v)| v.trim().to_string())
            .unwrap_or_default();
        Self {
            category,
            item_id,
            query,
        }
    }

    /// Format as a path with optional search parameter.
    pub fn to_address(&self) -> String {
        let mut out = String::from("/");
        if let Some(category) = &self.category {
            out.push_str(&urlencoding::encode(category));
            if let Some(id) = &self.item_id {
                out.push('/');
                out.push_str(&urlencoding::encode(id));
            }
        }
        let q = self.query.trim();
        if !q.is_empty() {
            out.push('?');
            out.push_str(SEARCH_PARAM);
            out.push('=');
            out.push_str(&urlencoding::encode(q));
        }
        out
    }
}

/// Canonical form of an address, used to detect no-op navigations.
pub fn normalize(address: &str) -> String {
    Route::parse(address).to_address()
}

/// Rewrite a legacy fragment address (`/#fish&search=rohu`) into the path
/// scheme (`/fish?search=rohu`). Returns `None` when there is no fragment.
///
/// Only the fragment is read; any path or query before `#` is dropped. The
/// search value is form-decoded and re-encoded the way [`Route`] writes it.
pub fn rewrite_legacy(address: &str) -> Option<String> {
    let (_, fragment) = address.split_once('#')?;
    let mut pairs = url::form_urlencoded::parse(fragment.as_bytes());
    let (category, _) = pairs.next().filter(|(k, _)| !k.is_empty())?;
    let search = pairs
        .find(|(k, _)| k == SEARCH_PARAM)
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default();
    Some(Route::category(&category).with_query(&search).to_address())
}

// ────────────────────────────────────────────────────────────────────────────
// History
// ────────────────────────────────────────────────────────────────────────────

/// Non-reloading navigation primitive (the address bar + session history).
pub trait History {
    /// Current address (path and query).
    fn current(&self) -> String;
    /// Add a new entry and make it current, dropping any forward entries.
    fn push(&mut self, address: &str);
    /// Overwrite the current entry.
    fn replace(&mut self, address: &str);
}

/// In-memory session history with back/forward support.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    entries: Vec<String>,
    cursor: usize,
}

impl MemoryHistory {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            entries: vec![initial.into()],
            cursor: 0,
        }
    }

    /// Step back; returns true if the current entry changed.
    pub fn back(&mut self) -> bool {
        if self.cursor > 0 {
            self.cursor -= 1;
            true
        } else {
            false
        }
    }

    /// Step forward; returns true if the current entry changed.
    pub fn forward(&mut self) -> bool {
        if self.cursor + 1 < self.entries.len() {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl History for MemoryHistory {
    fn current(&self) -> String {
        self.entries[self.cursor].clone()
    }

    fn push(&mut self, address: &str) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(address.to_string());
        self.cursor = self.entries.len() - 1;
    }

    fn replace(&mut self, address: &str) {
        self.entries[self.cursor] = address.to_string();
    }
}
