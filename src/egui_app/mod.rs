//! Egui-based interactive catalog browser (feature = "egui").
//!
//! [`CatalogApp`] drives a [`Browser`](crate::session::Browser) whose render
//! target is an egui card list and whose history lives in memory.

#![cfg(feature = "egui")]

mod state;
mod text;
mod ui;

pub use state::{CardList, CatalogApp, GuiBrowser, ResultStatus, WindowHead};
pub use text::highlight_query_job;
