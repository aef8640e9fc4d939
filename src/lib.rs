//! Multilingual food catalog browsing engine.
//!
//! This crate provides a [`Browser`](session::Browser) that loads category
//! documents on demand, filters them by free text and tags, keeps the view in
//! sync with a navigable address and renders results in batches.
//!
//! The binary `foodlex` runs a headless session against a data directory and
//! prints the resulting view as JSON; it can also validate the data.

pub mod card;
pub mod chips;
pub mod config;
pub mod debounce;
pub mod error;
pub mod filter;
pub mod meta;
pub mod model;
pub mod prefs;
pub mod render;
pub mod route;
pub mod session;
pub mod store;
pub mod validate;

// Optional GUI/egui functionality lives behind the `egui` feature flag.
// It is used by the `foodlex-gui` binary.
#[cfg(feature = "egui")]
pub mod egui_app;

pub use config::BrowserConfig;
pub use error::{CatalogError, Result};
pub use filter::{ResultSet, TagSet, filter};
pub use model::{Category, CategoryRegistry, Entity, Snapshot};
pub use session::{Browser, FetchRequest, ViewState};
