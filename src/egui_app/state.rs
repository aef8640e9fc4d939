#![cfg(feature = "egui")]

use std::time::Instant;

use eframe::egui;

use crate::card::Card;
use crate::meta::{PageHead, PageMeta};
use crate::render::{RenderTarget, SensorId};
use crate::route::MemoryHistory;
use crate::session::Browser;
use crate::store::CatalogSource;

/// What the results area shows besides the cards.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum ResultStatus {
    #[default]
    Cards,
    Loading,
    NoResults,
    Error(String),
}

/// Render target backing the egui card list.
#[derive(Clone, Debug, Default)]
pub struct CardList {
    pub cards: Vec<Card>,
    pub sentinel: Option<SensorId>,
    pub status: ResultStatus,
    /// Card to scroll to and highlight on the next frame.
    pub highlight: Option<String>,
    /// Scroll the list back to the top on the next frame.
    pub scroll_top: bool,
}

impl RenderTarget for CardList {
    fn clear(&mut self) {
        self.cards.clear();
        self.status = ResultStatus::Cards;
        self.highlight = None;
    }

    fn append(&mut self, cards: &[Card]) {
        self.cards.extend_from_slice(cards);
    }

    fn observe_sentinel(&mut self, sensor: SensorId) {
        self.sentinel = Some(sensor);
    }

    fn remove_sentinel(&mut self, sensor: SensorId) {
        if self.sentinel == Some(sensor) {
            self.sentinel = None;
        }
    }

    fn show_no_results(&mut self) {
        self.status = ResultStatus::NoResults;
    }

    fn show_loading(&mut self) {
        self.status = ResultStatus::Loading;
    }

    fn show_error(&mut self, message: &str) {
        self.status = ResultStatus::Error(message.to_string());
    }

    fn scroll_to_top(&mut self) {
        self.scroll_top = true;
    }

    fn highlight(&mut self, id: &str) {
        self.highlight = Some(id.to_string());
    }
}

/// Window title and active tab, taken from the page metadata.
#[derive(Clone, Debug, Default)]
pub struct WindowHead {
    pub title: String,
    pub active_tab: String,
    pub share_url: String,
    /// Title changed since it was last sent to the viewport.
    pub dirty: bool,
}

impl PageHead for WindowHead {
    fn apply(&mut self, meta: &PageMeta) {
        if self.title != meta.title {
            self.title = meta.title.clone();
            self.dirty = true;
        }
        self.active_tab = meta.active_tab.clone();
        self.share_url = meta.url.clone();
    }
}

pub type GuiBrowser = Browser<MemoryHistory, CardList, WindowHead>;

/// Interactive desktop catalog browser.
pub struct CatalogApp {
    pub browser: GuiBrowser,
    pub source: Box<dyn CatalogSource>,
    /// Contents of the search box (the view keeps the trimmed query).
    pub search_text: String,
    pub show_languages: bool,
}

impl CatalogApp {
    /// Wrap a browser that has not been started yet.
    pub fn new(browser: GuiBrowser, source: Box<dyn CatalogSource>) -> Self {
        let mut app = Self {
            browser,
            source,
            search_text: String::new(),
            show_languages: false,
        };
        app.browser.start();
        app.pump();
        app.search_text = app.browser.view().query.clone();
        app
    }

    /// Serve pending fetches and fire a due debounced address write.
    pub fn pump(&mut self) {
        self.browser.run_fetches(self.source.as_mut());
        self.browser.tick(Instant::now());
    }

    /// Re-read the search box after a navigation replaced the query.
    pub fn sync_search_text(&mut self) {
        self.search_text = self.browser.view().query.clone();
    }
}

impl eframe::App for CatalogApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        super::ui::update(self, ctx);
    }
}
