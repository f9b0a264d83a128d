//! Filename sanitization.
//!
//! Course, chapter, and video titles come straight from API payloads and end
//! up as path components, so they are sanitized rather than trusted.

use crate::error::{Error, Result};

/// Sanitize a path component (folder or file name).
///
/// Separators and other problematic characters are replaced with underscores;
/// traversal attempts, null bytes, and empty names are rejected.
pub fn sanitize_path_component(name: &str) -> Result<String> {
    if name.contains("..") {
        return Err(Error::InvalidName(format!(
            "path traversal detected: '{}'",
            name
        )));
    }

    if name.contains('\0') {
        return Err(Error::InvalidName(format!(
            "null bytes not allowed: '{}'",
            name
        )));
    }

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.trim().is_empty() {
        return Err(Error::InvalidName(
            "path component cannot be empty or whitespace-only".to_string(),
        ));
    }

    Ok(sanitized)
}
