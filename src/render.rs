//! Incremental rendering of a filtered result list.
//!
//! [`RenderController::present`] replaces the rendered output and draws the
//! first batch. While results remain, a sentinel is observed; when the host
//! reports it visible, the next batch is appended. Each render cycle is a
//! small state machine:
//!
//! ```text
//! present ──► AwaitingVisibility(sensor) ──visible──► AwaitingVisibility(next) … ──► Complete
//!    └──────► Empty (no results)
//! ```
//!
//! Presenting again always tears down the outstanding sensor first, so a late
//! visibility signal from a previous cycle is recognised as stale and ignored.

use serde::Serialize;

use crate::card::{Card, CardBuilder};
use crate::filter::ResultSet;

/// Identity of one sentinel observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SensorId(pub u64);

/// Abstract results surface: append, clear, observe a sentinel.
pub trait RenderTarget {
    /// Remove every rendered card and any status indicator.
    fn clear(&mut self);
    fn append(&mut self, cards: &[Card]);
    /// Place a trailing sentinel and start observing its visibility.
    fn observe_sentinel(&mut self, sensor: SensorId);
    /// Stop observing and remove the sentinel.
    fn remove_sentinel(&mut self, sensor: SensorId);
    /// The current result list is empty.
    fn show_no_results(&mut self);
    fn show_loading(&mut self);
    fn show_error(&mut self, message: &str);
    fn scroll_to_top(&mut self);
    /// Scroll a rendered card into view and highlight it briefly.
    fn highlight(&mut self, id: &str);
}

/// Render-cycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// Nothing presented (initial, loading or error).
    Idle,
    /// Presented an empty result list.
    Empty,
    /// Some results are rendered; waiting for the sentinel to become visible.
    AwaitingVisibility(SensorId),
    /// All results are rendered.
    Complete,
}

#[derive(Debug, Clone)]
pub struct RenderController {
    batch_size: usize,
    results: ResultSet,
    category: String,
    rendered: usize,
    phase: Phase,
    next_sensor: u64,
}

impl RenderController {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            results: ResultSet::default(),
            category: String::new(),
            rendered: 0,
            phase: Phase::Idle,
            next_sensor: 0,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn rendered_count(&self) -> usize {
        self.rendered
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    /// The sensor currently being observed, if any.
    pub fn active_sensor(&self) -> Option<SensorId> {
        match self.phase {
            Phase::AwaitingVisibility(s) => Some(s),
            _ => None,
        }
    }

    fn teardown<T: RenderTarget + ?Sized>(&mut self, target: &mut T) {
        if let Phase::AwaitingVisibility(sensor) = self.phase {
            target.remove_sentinel(sensor);
        }
        self.phase = Phase::Idle;
    }

    /// Drop all render state without presenting anything (loading / error).
    pub fn reset<T: RenderTarget + ?Sized>(&mut self, target: &mut T) {
        self.teardown(target);
        target.clear();
        self.results = ResultSet::default();
        self.rendered = 0;
    }

    /// Replace the rendered output with `results` and render the first batch.
    pub fn present<T: RenderTarget + ?Sized>(
        &mut self,
        results: ResultSet,
        category: &str,
        cards: &CardBuilder,
        target: &mut T,
    ) {
        self.teardown(target);
        target.clear();
        self.results = results;
        self.category = category.to_string();
        self.rendered = 0;
        if self.results.is_empty() {
            self.phase = Phase::Empty;
            target.show_no_results();
        } else {
            self.render_batch(cards, target);
        }
    }

    fn render_batch<T: RenderTarget + ?Sized>(&mut self, cards: &CardBuilder, target: &mut T) {
        let end = (self.rendered + self.batch_size).min(self.results.len());
        let batch: Vec<Card> = self
            .results
            .slice(self.rendered, end)
            .into_iter()
            .map(|e| cards.build(e, &self.category))
            .collect();
        target.append(&batch);
        self.rendered = end;
        if self.rendered < self.results.len() {
            self.next_sensor += 1;
            let sensor = SensorId(self.next_sensor);
            target.observe_sentinel(sensor);
            self.phase = Phase::AwaitingVisibility(sensor);
        } else {
            self.phase = Phase::Complete;
        }
    }

    /// Handle a visibility signal. Returns false for stale or unknown sensors.
    pub fn on_visible<T: RenderTarget + ?Sized>(
        &mut self,
        sensor: SensorId,
        cards: &CardBuilder,
        target: &mut T,
    ) -> bool {
        if self.active_sensor() != Some(sensor) {
            tracing::debug!(?sensor, phase = ?self.phase, "ignoring stale sentinel");
            return false;
        }
        target.remove_sentinel(sensor);
        self.render_batch(cards, target);
        true
    }

    /// Render batches until the result at `position` is on screen.
    pub fn reveal<T: RenderTarget + ?Sized>(
        &mut self,
        position: usize,
        cards: &CardBuilder,
        target: &mut T,
    ) -> bool {
        while position >= self.rendered {
            match self.active_sensor() {
                Some(sensor) => {
                    self.on_visible(sensor, cards, target);
                }
                None => return false,
            }
        }
        true
    }
}

/// Render target that records what would be on screen.
#[derive(Debug, Default, Clone, Serialize)]
pub struct MemoryTarget {
    pub cards: Vec<Card>,
    pub sentinel: Option<SensorId>,
    pub no_results: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub highlighted: Option<String>,
    /// Number of scroll-to-top requests.
    pub scrolls_to_top: usize,
    /// Number of `clear` calls, i.e. result-list replacements.
    pub clears: usize,
}

impl MemoryTarget {
    pub fn ids(&self) -> Vec<&str> {
        self.cards.iter().map(|c| c.id.as_str()).collect()
    }
}

impl RenderTarget for MemoryTarget {
    fn clear(&mut self) {
        self.cards.clear();
        self.no_results = false;
        self.loading = false;
        self.error = None;
        self.highlighted = None;
        self.clears += 1;
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
        self.no_results = true;
    }

    fn show_loading(&mut self) {
        self.loading = true;
    }

    fn show_error(&mut self, message: &str) {
        self.loading = false;
        self.error = Some(message.to_string());
    }

    fn scroll_to_top(&mut self) {
        self.scrolls_to_top += 1;
    }

    fn highlight(&mut self, id: &str) {
        if self.cards.iter().any(|c| c.id == id) {
            self.highlighted = Some(id.to_string());
        }
    }
}
