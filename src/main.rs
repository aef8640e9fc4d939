use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use foodlex::BrowserConfig;
use foodlex::card::Card;
use foodlex::chips::Chip;
use foodlex::meta::{MemoryHead, PageMeta};
use foodlex::prefs::MemoryPreferences;
use foodlex::render::MemoryTarget;
use foodlex::route::{History, MemoryHistory};
use foodlex::session::{Browser, Counter};
use foodlex::store::{FsSource, LoadState};
use foodlex::validate;

#[derive(Parser, Debug)]
#[command(author, version, about = "Browse and validate a multilingual food catalog", long_about = None)]
struct Cli {
    /// Log debug events to stderr (overrides the `warn` default; RUST_LOG wins)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON configuration overriding the built-in catalog settings
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open an address headlessly and print the resulting view as JSON
    Browse {
        /// Site root containing the category documents (e.g. `data/spices.json`)
        #[arg(long, value_name = "DIR")]
        data: Utf8PathBuf,

        /// Address to open, e.g. "/spices/turmeric" or "/fish?search=rohu"
        #[arg(value_name = "ADDRESS", default_value = "/")]
        address: String,

        /// Toggle a filter chip after loading (repeatable)
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        /// Search across every category while the query is non-empty
        #[arg(long)]
        everywhere: bool,

        /// Render every batch instead of only the first
        #[arg(long)]
        all: bool,

        /// Also print the HTML head fragment
        #[arg(long)]
        head: bool,
    },
    /// Check the data directory for integrity problems and language gaps
    Validate {
        #[arg(long, value_name = "DIR")]
        data: Utf8PathBuf,
    },
}

#[derive(Serialize)]
struct BrowseOutput<'a> {
    address: String,
    category: Option<&'a str>,
    query: &'a str,
    state: &'a LoadState,
    counter: Counter,
    rendered: usize,
    chips: Vec<Chip>,
    cards: &'a [Card],
    #[serde(skip_serializing_if = "Option::is_none")]
    highlighted: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    meta: Option<&'a PageMeta>,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Utf8PathBuf>) -> Result<BrowserConfig> {
    match path {
        Some(p) => BrowserConfig::from_file(p)
            .with_context(|| format!("Failed to load configuration {}", p)),
        None => Ok(BrowserConfig::default()),
    }
}

fn browse(
    mut config: BrowserConfig,
    data: Utf8PathBuf,
    address: &str,
    tags: &[String],
    everywhere: bool,
    all: bool,
    head: bool,
) -> Result<()> {
    if everywhere {
        config.cross_category_search = true;
    }
    let mut source = FsSource::new(data);
    let mut browser = Browser::new(
        config,
        MemoryHistory::new(address),
        MemoryTarget::default(),
        MemoryHead::default(),
        Box::new(MemoryPreferences::new()),
    )?;
    browser.start();
    browser.run_fetches(&mut source);
    for tag in tags {
        browser.toggle_tag(tag);
    }
    if all {
        browser.render_all();
    }

    let view = browser.view();
    let target = browser.target();
    let meta = browser.head().current.as_ref();
    let output = BrowseOutput {
        address: browser.history().current(),
        category: view.category.as_deref(),
        query: &view.query,
        state: browser.store().state(),
        counter: browser.counter(),
        rendered: browser.rendered_count(),
        chips: browser.chips(),
        cards: &target.cards,
        highlighted: target.highlighted.as_deref(),
        error: target.error.as_deref(),
        meta,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    if head {
        if let Some(meta) = meta {
            print!("{}", meta.to_html());
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Command::Browse {
            data,
            address,
            tags,
            everywhere,
            all,
            head,
        } => browse(config, data, &address, &tags, everywhere, all, head),
        Command::Validate { data } => {
            let report = validate::validate_dir(&data, &config);
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.passed() {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
