//! Cookie-jar persistence behind a narrow load/save interface.
//!
//! The on-disk format is the JSON serialization from `cookie_store`; callers
//! never see it, they only hand over a path. Session cookies are persisted
//! too, since the signed-in markers we care about are session-scoped.

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::Path;

use cookie_store::CookieStore;

use crate::error::{Error, Result};

/// Load a previously persisted cookie store.
///
/// A missing file is not an error; it is a cold start and returns `None`.
/// Any other failure (unreadable file, corrupt contents) propagates.
pub fn load(path: &Path) -> Result<Option<CookieStore>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let store = cookie_store::serde::json::load_all(BufReader::new(file))
        .map_err(|e| Error::CookieStore(format!("failed to load '{}': {}", path.display(), e)))?;

    tracing::debug!("loaded cookie store from {}", path.display());
    Ok(Some(store))
}

/// Persist a cookie store, overwriting any previous contents.
pub fn save(path: &Path, store: &CookieStore) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);

    cookie_store::serde::json::save_incl_expired_and_nonpersistent(store, &mut writer)
        .map_err(|e| Error::CookieStore(format!("failed to save '{}': {}", path.display(), e)))?;

    tracing::debug!("saved cookie store to {}", path.display());
    Ok(())
}
