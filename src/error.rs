use thiserror::Error;

/// Failures surfaced by the browsing engine.
///
/// Route problems (unknown category, unknown item) are not errors: they are
/// recovered by falling back to the default category or scrolling to the top.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Failed to fetch {locator}: {message}")]
    Fetch { locator: String, message: String },

    #[error("Failed to parse {locator}: {source}")]
    Parse {
        locator: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Preference store error: {0}")]
    Preferences(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
