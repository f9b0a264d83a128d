//! Destination layout and directory management.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::fs::naming::sanitize_path_component;

/// Ensure a directory exists, creating it if necessary.
///
/// Idempotent: concurrent creators must not fail each other, so an
/// "already exists" race is swallowed. Any other error propagates with its
/// original kind preserved.
pub async fn ensure_dir(path: &Path) -> Result<()> {
    match tokio::fs::create_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(Error::Filesystem {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Destination path for a video:
/// `{base}/{course title}/{chapter title}/{video title}.mp4`.
pub fn video_destination(
    base_dir: &Path,
    course_title: &str,
    chapter_title: &str,
    video_title: &str,
) -> Result<PathBuf> {
    Ok(base_dir
        .join(sanitize_path_component(course_title)?)
        .join(sanitize_path_component(chapter_title)?)
        .join(format!("{}.mp4", sanitize_path_component(video_title)?)))
}
