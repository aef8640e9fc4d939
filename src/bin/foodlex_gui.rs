//! Browse a catalog directory in a desktop window (requires `--features egui`).
//!
//! Usage:
//!   cargo run --features egui --bin foodlex-gui -- --data ./site /spices/turmeric

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::Parser;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use foodlex::BrowserConfig;
use foodlex::egui_app::{CardList, CatalogApp, GuiBrowser, WindowHead};
use foodlex::prefs::FilePreferences;
use foodlex::route::MemoryHistory;
use foodlex::store::FsSource;

/// Preference file kept next to the data.
const PREFERENCES_FILE: &str = ".foodlex-preferences.json";

#[derive(Parser, Debug)]
#[command(author, version, about = "Browse a multilingual food catalog in a window", long_about = None)]
struct Args {
    /// Site root containing the category documents (e.g. `data/spices.json`)
    #[arg(long, value_name = "DIR")]
    data: Utf8PathBuf,

    /// Address to open, e.g. "/fish?search=rohu"
    #[arg(value_name = "ADDRESS", default_value = "/")]
    address: String,

    /// JSON configuration overriding the built-in catalog settings
    #[arg(long, value_name = "FILE")]
    config: Option<Utf8PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => BrowserConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration {}", path))?,
        None => BrowserConfig::default(),
    };
    let prefs = FilePreferences::open(args.data.join(PREFERENCES_FILE))?;
    let browser: GuiBrowser = GuiBrowser::new(
        config,
        MemoryHistory::new(args.address.as_str()),
        CardList::default(),
        WindowHead::default(),
        Box::new(prefs),
    )?;
    let app = CatalogApp::new(browser, Box::new(FsSource::new(args.data.clone())));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([960.0, 720.0]),
        ..Default::default()
    };
    eframe::run_native(
        "FoodBhasha",
        options,
        Box::new(|cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::light());
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))?;
    Ok(())
}
