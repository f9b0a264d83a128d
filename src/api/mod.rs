//! Learning platform API access.
//!
//! This module provides:
//! - The authenticated [`Fetcher`] for catalog and media requests
//! - Typed payload definitions in [`types`]

pub mod client;
pub mod types;

pub use client::{Fetcher, CHUNK_SIZE, DEFAULT_CONCURRENT_FETCHES};
