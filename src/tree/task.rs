//! Deferred per-video download work items.

use std::path::{Path, PathBuf};

use crate::api::Fetcher;
use crate::error::Result;

/// A deferred download for one video leaf.
///
/// Holds everything needed to perform the download later: the fetcher
/// capability, the course and video slugs for link resolution, and the
/// resolved destination path. Creating a task performs no I/O.
#[derive(Debug, Clone)]
pub struct DownloadTask {
    fetcher: Fetcher,
    course_slug: String,
    video_slug: String,
    destination: PathBuf,
}

impl DownloadTask {
    pub(crate) fn new(
        fetcher: Fetcher,
        course_slug: String,
        video_slug: String,
        destination: PathBuf,
    ) -> Self {
        Self {
            fetcher,
            course_slug,
            video_slug,
            destination,
        }
    }

    pub fn course_slug(&self) -> &str {
        &self.course_slug
    }

    pub fn video_slug(&self) -> &str {
        &self.video_slug
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Resolve the video's download link and stream it to the destination.
    /// Returns the total bytes transferred.
    pub async fn run(&self) -> Result<u64> {
        self.run_with_progress(|_| {}).await
    }

    /// Like [`run`](Self::run), invoking `on_chunk` with the byte count after
    /// each written chunk.
    pub async fn run_with_progress(&self, on_chunk: impl FnMut(u64) + Send) -> Result<u64> {
        let url = self
            .fetcher
            .fetch_download_link(&self.course_slug, &self.video_slug)
            .await?;
        tracing::info!(
            "downloading video '{}' to {}",
            self.video_slug,
            self.destination.display()
        );
        self.fetcher
            .download_file_with_progress(&url, &self.destination, on_chunk)
            .await
    }
}
