//! Error types for the learning-downloader library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Session / auth errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Session error: {0}")]
    Session(String),

    // API errors
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Missing required field '{field}' in {node} payload")]
    MalformedData { field: String, node: String },

    // Tree errors
    #[error("Tree violation: {0}")]
    Tree(String),

    // File system errors
    #[error("Failed to create directory '{path}': {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid path component: {0}")]
    InvalidName(String),

    #[error("Cookie store error: {0}")]
    CookieStore(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    // URL parsing errors
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Missing-field error naming the field and the node being built.
    pub fn malformed(field: &str, node: &str) -> Self {
        Error::MalformedData {
            field: field.to_string(),
            node: node.to_string(),
        }
    }
}
