//! Course and learning-path downloader for LinkedIn Learning.
//!
//! This library authenticates against the platform, fetches the nested
//! catalog (learning path → course → chapter → video), rebuilds it as an
//! in-memory tree, and lazily streams each video to disk.
//!
//! # Features
//!
//! - Pluggable login strategies: credential login, cookie-jar cached login
//!   with fallback
//! - CSRF-authenticated API fetching with bounded, order-preserving fan-out
//! - Typed content tree with lazy traversal and deferred download tasks
//! - Chunked streaming downloads with per-chunk progress reporting
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use learning_downloader::{Config, Downloader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(Path::new("config.toml"))?;
//!     let strategy = config.login_strategy()?;
//!     let mut downloader = Downloader::with_config(strategy, config);
//!
//!     downloader.start()?;
//!     downloader.login().await?;
//!
//!     let tree = downloader.fetch_course_path("advance-your-skills").await?;
//!     print!("{}", tree.render());
//!
//!     for task in tree.download_tasks(Path::new("downloads")) {
//!         task?.run().await?;
//!     }
//!
//!     downloader.close();
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod downloader;
pub mod error;
pub mod fs;
pub mod parser;
pub mod session;
pub mod tree;

// Re-exports for convenience
pub use api::Fetcher;
pub use auth::{CachedLogin, CredentialLogin, LoginStrategy};
pub use config::{Config, Credentials};
pub use downloader::{Downloader, DownloaderState};
pub use error::{Error, Result};
pub use parser::TreeParser;
pub use session::Session;
pub use tree::{ContentTree, DownloadTask, NodeKind};
