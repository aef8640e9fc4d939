//! A browsing session: the single owned view state and every entry point
//! that mutates it.
//!
//! [`Browser`] ties the catalog store, the route synchronizer, the render
//! controller and the head metadata together. It never performs I/O itself:
//! loads are queued as [`FetchRequest`]s which the host fulfils (see
//! [`Browser::take_fetches`] / [`Browser::complete_fetch`], or
//! [`Browser::run_fetches`] for synchronous hosts).
//!
//! Reconciliation of the address against the view follows a fixed precedence:
//!
//! 1. new category (or nothing loaded yet): load it, clear tag filters, adopt
//!    the address query and remember the item to resolve once data arrives;
//! 2. otherwise a different query: re-filter and re-present, no fetch;
//! 3. otherwise an item id: resolve it again;
//!
//! and finally the page head is rewritten unconditionally.

use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use std::time::Instant;

use crate::card::CardBuilder;
use crate::chips::{self, Chip};
use crate::config::BrowserConfig;
use crate::debounce::Debouncer;
use crate::error::Result;
use crate::filter::{ResultSet, TagSet};
use crate::meta::{PageHead, PageMeta};
use crate::model::{Entity, Snapshot};
use crate::prefs::{LanguagePreference, PreferenceStore};
use crate::render::{Phase, RenderController, RenderTarget, SensorId};
use crate::route::{History, MemoryHistory, Route, normalize, rewrite_legacy};
use crate::store::{
    AllLoadStep, AllLoadTicket, CatalogSource, CatalogStore, LoadStep, LoadTicket,
};

/// Everything the user can see or change, owned by one [`Browser`].
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    /// Current category key; `None` before the first reconciliation.
    pub category: Option<String>,
    /// Committed dataset of the current category; `None` while loading.
    pub dataset: Option<Snapshot>,
    pub tags: TagSet,
    pub query: String,
    /// Item whose label currently stands in for the query.
    pub focused_item: Option<String>,
    /// Deep-linked item waiting for its category to load.
    pub pending_item: Option<String>,
    /// Load failure shown instead of results.
    pub error: Option<String>,
}

impl ViewState {
    pub fn is_loaded(&self) -> bool {
        self.dataset.is_some()
    }
}

/// I/O the host must perform on behalf of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    Category(LoadTicket),
    Everything(AllLoadTicket),
}

impl FetchRequest {
    /// Locators to fetch, in the order their bodies must be returned.
    pub fn locators(&self) -> Vec<&str> {
        match self {
            FetchRequest::Category(t) => vec![t.locator()],
            FetchRequest::Everything(t) => t.parts().iter().map(LoadTicket::locator).collect(),
        }
    }
}

/// Visible results over the size of the dataset they were filtered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Counter {
    pub visible: usize,
    pub total: usize,
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.visible, self.total)
    }
}

pub struct Browser<H, T, P> {
    config: BrowserConfig,
    store: CatalogStore,
    view: ViewState,
    renderer: RenderController,
    cards: CardBuilder,
    debouncer: Debouncer,
    prefs: Box<dyn PreferenceStore>,
    languages: LanguagePreference,
    history: H,
    target: T,
    head: P,
    fetches: VecDeque<FetchRequest>,
    everything_failed: bool,
}

impl<H: History, T: RenderTarget, P: PageHead> Browser<H, T, P> {
    pub fn new(
        config: BrowserConfig,
        history: H,
        target: T,
        head: P,
        prefs: Box<dyn PreferenceStore>,
    ) -> Result<Self> {
        let registry = config.registry()?;
        let store = CatalogStore::new(registry.clone(), config.anchor_language.clone());
        let languages = LanguagePreference::load(
            prefs.as_ref(),
            &config.preference_key,
            &config.default_card_languages,
        );
        let cards = CardBuilder::new(config.clone(), registry, languages.active().to_vec());
        Ok(Self {
            renderer: RenderController::new(config.batch_size),
            debouncer: Debouncer::new(config.debounce()),
            config,
            store,
            view: ViewState::default(),
            cards,
            prefs,
            languages,
            history,
            target,
            head,
            fetches: VecDeque::new(),
            everything_failed: false,
        })
    }

    /// Use a fixed cache-busting token instead of the session timestamp.
    pub fn with_cache_token(mut self, token: &str) -> Self {
        self.store = self.store.with_cache_token(token);
        self
    }

    // ── accessors ──────────────────────────────────────────────────────────

    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut H {
        &mut self.history
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    pub fn head(&self) -> &P {
        &self.head
    }

    pub fn head_mut(&mut self) -> &mut P {
        &mut self.head
    }

    pub fn results(&self) -> &ResultSet {
        self.renderer.results()
    }

    pub fn rendered_count(&self) -> usize {
        self.renderer.rendered_count()
    }

    pub fn render_phase(&self) -> Phase {
        self.renderer.phase()
    }

    pub fn active_sensor(&self) -> Option<SensorId> {
        self.renderer.active_sensor()
    }

    pub fn languages(&self) -> &[String] {
        self.languages.active()
    }

    pub fn has_pending_fetches(&self) -> bool {
        !self.fetches.is_empty()
    }

    /// Whether a debounced address write is waiting to fire.
    pub fn has_pending_write(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Visible results over the size of the current category's dataset, also
    /// while a search spans every category.
    pub fn counter(&self) -> Counter {
        Counter {
            visible: self.renderer.results().len(),
            total: self.view.dataset.as_ref().map_or(0, |d| d.len()),
        }
    }

    /// Chip row for the current category's loaded dataset.
    pub fn chips(&self) -> Vec<Chip> {
        let category = self
            .store
            .registry()
            .resolve(self.view.category.as_deref());
        let dataset: &[Entity] = self.view.dataset.as_deref().unwrap_or(&[]);
        chips::chips(category, dataset, &self.view.tags)
    }

    /// Route describing the view as it should appear in the address bar.
    pub fn current_route(&self) -> Route {
        let category = self
            .store
            .registry()
            .resolve(self.view.category.as_deref())
            .key
            .clone();
        match &self.view.focused_item {
            Some(id) => Route::item(&category, id),
            None => Route::category(&category).with_query(&self.view.query),
        }
    }

    // ── navigation ─────────────────────────────────────────────────────────

    /// Initial load: rewrite a legacy fragment address once, then reconcile.
    pub fn start(&mut self) {
        let current = self.history.current();
        if let Some(rewritten) = rewrite_legacy(&current) {
            tracing::debug!(from = %current, to = %rewritten, "rewriting legacy address");
            self.history.replace(&rewritten);
        }
        self.reconcile();
    }

    /// Bring the view in line with the current address.
    pub fn reconcile(&mut self) {
        let route = Route::parse(&self.history.current());
        let category = self
            .store
            .registry()
            .resolve(route.category.as_deref())
            .key
            .clone();

        if self.view.category.as_deref() != Some(category.as_str()) || !self.view.is_loaded() {
            self.debouncer.cancel();
            self.view.category = Some(category.clone());
            self.view.dataset = None;
            self.view.tags.clear();
            self.view.query = route.query.clone();
            self.view.focused_item = None;
            self.view.pending_item = route.item_id.clone();
            self.request_category(&category);
        } else if !self.same_query(&route) {
            self.view.query = route.query.clone();
            self.view.focused_item = None;
            self.present();
        } else if let Some(id) = &route.item_id {
            self.resolve_item(id);
        }
        self.sync_head();
    }

    /// The address query matches the view, treating a substituted item label
    /// as equal to the empty query of that item's address.
    fn same_query(&self, route: &Route) -> bool {
        route.query == self.view.query
            || (route.query.is_empty()
                && route.item_id.is_some()
                && route.item_id == self.view.focused_item)
    }

    /// Write `route` as a new history entry unless it is already current.
    fn push_route(&mut self, route: &Route) -> bool {
        let address = route.to_address();
        if normalize(&self.history.current()) == address {
            return false;
        }
        tracing::debug!(%address, "pushing address");
        self.history.push(&address);
        true
    }

    /// Category tab clicked. The search text follows the user into the new
    /// category unless it is only the label of a focused item.
    pub fn select_category(&mut self, key: &str) {
        let query = match self.view.focused_item {
            Some(_) => "",
            None => self.view.query.as_str(),
        };
        let route = Route::category(key).with_query(query);
        self.push_route(&route);
        self.reconcile();
    }

    /// Deep-link to one item.
    pub fn open_item(&mut self, category: &str, id: &str) {
        self.push_route(&Route::item(category, id));
        self.reconcile();
    }

    /// Back/forward (or any external address change) happened.
    pub fn on_pop_state(&mut self) {
        self.reconcile();
    }

    // ── search & filters ───────────────────────────────────────────────────

    /// Search box edited: results update now, the address after the debounce window.
    pub fn edit_search(&mut self, text: &str, now: Instant) {
        self.view.query = text.trim().to_string();
        self.view.focused_item = None;
        self.present();
        self.debouncer.schedule(now);
        self.ensure_everything();
    }

    /// Advance the clock; writes the debounced address when due. Returns
    /// whether a history entry was added.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.debouncer.poll(now) {
            return false;
        }
        let route = self.current_route();
        let pushed = self.push_route(&route);
        if pushed {
            self.sync_head();
        }
        pushed
    }

    /// Clear button: empty query, immediate refresh and address write.
    pub fn clear_search(&mut self) {
        self.debouncer.cancel();
        self.view.query.clear();
        self.view.focused_item = None;
        self.present();
        let route = self.current_route();
        self.push_route(&route);
        self.sync_head();
    }

    /// Focusing a non-empty search box drops active tag filters.
    pub fn search_focused(&mut self) {
        if !self.view.query.is_empty() && !self.view.tags.is_empty() {
            self.view.tags.clear();
            self.present();
        }
    }

    /// Toggle one chip; returns whether the tag is active afterwards.
    pub fn toggle_tag(&mut self, tag: &str) -> bool {
        let active = chips::toggle(&mut self.view.tags, tag);
        self.present();
        active
    }

    /// The "All" chip.
    pub fn clear_tags(&mut self) {
        self.view.tags.clear();
        self.present();
    }

    /// The trailing sentinel scrolled into view.
    pub fn on_sentinel_visible(&mut self, sensor: SensorId) -> bool {
        self.renderer
            .on_visible(sensor, &self.cards, &mut self.target)
    }

    /// Render every remaining batch.
    pub fn render_all(&mut self) {
        while let Some(sensor) = self.renderer.active_sensor() {
            self.on_sentinel_visible(sensor);
        }
    }

    /// Add or remove a card language, persist the selection and re-present.
    pub fn toggle_language(&mut self, language: &str) -> Result<bool> {
        let active = self.languages.toggle(language, self.prefs.as_mut())?;
        self.cards
            .set_active_languages(self.languages.active().to_vec());
        self.present();
        Ok(active)
    }

    // ── loading ────────────────────────────────────────────────────────────

    /// Drain the queued fetches.
    pub fn take_fetches(&mut self) -> Vec<FetchRequest> {
        self.fetches.drain(..).collect()
    }

    /// Hand back the bodies for `request`, one per locator in order.
    pub fn complete_fetch(&mut self, request: FetchRequest, bodies: Vec<anyhow::Result<String>>) {
        match request {
            FetchRequest::Category(ticket) => {
                let body = bodies
                    .into_iter()
                    .next()
                    .unwrap_or_else(|| Err(anyhow::anyhow!("No response for {}", ticket.locator())));
                self.complete_category(ticket, body);
            }
            FetchRequest::Everything(ticket) => self.complete_everything(ticket, bodies),
        }
        self.ensure_current_loaded();
        self.ensure_everything();
    }

    /// Serve every queued fetch (including ones queued while serving) from
    /// `source`. Returns the number of requests served.
    pub fn run_fetches(&mut self, source: &mut dyn CatalogSource) -> usize {
        let mut served = 0;
        while let Some(request) = self.fetches.pop_front() {
            let bodies = request
                .locators()
                .into_iter()
                .map(|locator| source.fetch(locator))
                .collect();
            self.complete_fetch(request, bodies);
            served += 1;
        }
        served
    }

    fn request_category(&mut self, key: &str) {
        self.view.error = None;
        match self.store.begin_load(key) {
            Ok(LoadStep::Cached(snapshot)) => self.commit_category(snapshot),
            Ok(LoadStep::InFlight) => {
                self.renderer.reset(&mut self.target);
                self.target.show_loading();
            }
            Ok(LoadStep::Fetch(ticket)) => {
                self.renderer.reset(&mut self.target);
                self.target.show_loading();
                self.fetches.push_back(FetchRequest::Category(ticket));
            }
            Err(err) => self.fail(&err.to_string()),
        }
    }

    fn complete_category(&mut self, ticket: LoadTicket, body: anyhow::Result<String>) {
        let key = ticket.category().to_string();
        let is_current = self.view.category.as_deref() == Some(key.as_str()) && !self.view.is_loaded();
        match self.store.finish_load(ticket, body) {
            Ok(snapshot) if is_current => self.commit_category(snapshot),
            Ok(_) => tracing::debug!(category = %key, "discarding stale category response"),
            Err(err) if is_current => self.fail(&err.to_string()),
            Err(_) => tracing::debug!(category = %key, "ignoring failure of stale category load"),
        }
    }

    fn complete_everything(&mut self, ticket: AllLoadTicket, bodies: Vec<anyhow::Result<String>>) {
        match self.store.finish_load_all(ticket, bodies) {
            Ok(_) => {
                if self.searching_everywhere() && self.view.is_loaded() {
                    self.present();
                }
            }
            Err(err) => {
                self.everything_failed = true;
                if self.searching_everywhere() && self.view.is_loaded() {
                    self.fail(&err.to_string());
                }
            }
        }
    }

    /// Re-request the current category after a stale or blocked load.
    fn ensure_current_loaded(&mut self) {
        if self.view.is_loaded() || self.view.error.is_some() || self.store.is_loading() {
            return;
        }
        if let Some(key) = self.view.category.clone() {
            self.request_category(&key);
        }
    }

    /// A focused item's label is never searched outside its own category.
    fn searching_everywhere(&self) -> bool {
        self.config.cross_category_search
            && !self.view.query.is_empty()
            && self.view.focused_item.is_none()
    }

    /// Start the cross-category load when a search needs it.
    fn ensure_everything(&mut self) {
        if !self.searching_everywhere()
            || self.everything_failed
            || !self.view.is_loaded()
            || self.store.everything().is_some()
            || self.store.is_loading()
        {
            return;
        }
        match self.store.begin_load_all() {
            Ok(AllLoadStep::Cached(_)) => self.present(),
            Ok(AllLoadStep::InFlight) => {}
            Ok(AllLoadStep::Fetch(ticket)) => self.fetches.push_back(FetchRequest::Everything(ticket)),
            Err(err) => tracing::warn!(error = %err, "cannot start cross-category load"),
        }
    }

    fn commit_category(&mut self, snapshot: Snapshot) {
        self.view.dataset = Some(snapshot);
        self.view.error = None;
        match self.view.pending_item.take() {
            Some(id) => self.resolve_item(&id),
            None => self.present(),
        }
        self.sync_head();
    }

    fn fail(&mut self, message: &str) {
        self.view.error = Some(message.to_string());
        self.renderer.reset(&mut self.target);
        self.target.show_error(message);
    }

    // ── presentation ───────────────────────────────────────────────────────

    /// Dataset the current query is filtered over.
    fn active_dataset(&self) -> Option<Snapshot> {
        let own = self.view.dataset.clone()?;
        if self.searching_everywhere() {
            if let Some(all) = self.store.everything() {
                return Some(all);
            }
        }
        Some(own)
    }

    fn present(&mut self) {
        let Some(dataset) = self.active_dataset() else {
            return;
        };
        let Some(category) = self.view.category.clone() else {
            return;
        };
        let results = ResultSet::new(dataset, &self.view.query, &self.view.tags);
        self.renderer
            .present(results, &category, &self.cards, &mut self.target);
    }

    /// Substitute the item's label for the query and highlight it, or scroll
    /// to the top when the id is unknown.
    fn resolve_item(&mut self, id: &str) {
        let Some(dataset) = self.view.dataset.clone() else {
            self.view.pending_item = Some(id.to_string());
            return;
        };
        let anchor = self.config.anchor_language.as_str();
        match dataset.iter().find(|e| e.id == id) {
            Some(entity) => {
                self.view.query = entity.label(anchor).to_string();
                self.view.focused_item = Some(id.to_string());
                self.present();
                if let Some(position) = self.renderer.results().position_of(id) {
                    self.renderer
                        .reveal(position, &self.cards, &mut self.target);
                    self.target.highlight(id);
                }
            }
            None => {
                tracing::debug!(item = id, "unknown item id, scrolling to top");
                self.view.focused_item = None;
                self.present();
                self.target.scroll_to_top();
            }
        }
    }

    fn focused_entity(&self) -> Option<&Entity> {
        let id = self.view.focused_item.as_deref()?;
        self.view.dataset.as_deref()?.iter().find(|e| e.id == id)
    }

    fn sync_head(&mut self) {
        let category = self
            .store
            .registry()
            .resolve(self.view.category.as_deref());
        let mut path_route = self.current_route();
        path_route.query.clear();
        let meta = PageMeta::compute(
            &self.config,
            category,
            &self.view.query,
            self.focused_entity(),
            &path_route.to_address(),
        );
        self.head.apply(&meta);
    }
}

impl<T: RenderTarget, P: PageHead> Browser<MemoryHistory, T, P> {
    /// Browser back button.
    pub fn back(&mut self) -> bool {
        let moved = self.history.back();
        if moved {
            self.on_pop_state();
        }
        moved
    }

    /// Browser forward button.
    pub fn forward(&mut self) -> bool {
        let moved = self.history.forward();
        if moved {
            self.on_pop_state();
        }
        moved
    }
}
