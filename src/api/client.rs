//! Authenticated learning API fetcher.

use std::path::Path;

use futures::{StreamExt, TryStreamExt};
use reqwest::header;
use serde::de::DeserializeOwned;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_util::io::StreamReader;
use url::Url;

use crate::api::types::{CourseData, Envelope, PathData, VideoDetail};
use crate::error::{Error, Result};
use crate::fs::paths::ensure_dir;
use crate::session::Session;

/// Fixed chunk size for streaming downloads to disk.
pub const CHUNK_SIZE: usize = 32 * 1024;

/// Default fan-out width for course fetches within a learning path.
pub const DEFAULT_CONCURRENT_FETCHES: usize = 4;

/// Authenticated API fetcher.
///
/// Every API call reads (never sets) the CSRF token from the session cookie
/// jar and attaches it as a header; the session must already be validated by
/// a login strategy. Cheap to clone; clones share the underlying session.
#[derive(Debug, Clone)]
pub struct Fetcher {
    session: Session,
    concurrency: usize,
}

impl Fetcher {
    /// Create a fetcher with the default fan-out width.
    pub fn new(session: Session) -> Self {
        Self::with_concurrency(session, DEFAULT_CONCURRENT_FETCHES)
    }

    /// Create a fetcher with a custom fan-out width (clamped to at least 1).
    pub fn with_concurrency(session: Session, concurrency: usize) -> Self {
        Self {
            session,
            concurrency: concurrency.max(1),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Fetch the detail payload for a single course.
    pub async fn fetch_course_data(&self, slug: &str) -> Result<CourseData> {
        let path = format!(
            "learning-api/detailedCourses\
             ?fields=fullCourseUnlocked,releasedOn,exerciseFileUrls,exerciseFiles\
             &addParagraphsToTranscript=true&courseSlug={}&q=slugs",
            slug
        );
        self.fetch_first(&path, &format!("course '{}'", slug)).await
    }

    /// Fetch a learning path payload plus the detail payload of every course
    /// it references, in document order.
    ///
    /// Course fetches fan out concurrently, bounded by the configured width.
    /// `buffered` reassembles results in request order regardless of
    /// completion order, and the first failure drops the in-flight siblings
    /// and aborts the whole fetch.
    pub async fn fetch_course_path_data(&self, slug: &str) -> Result<(PathData, Vec<CourseData>)> {
        let path = format!(
            "learning-api/detailedLearningPaths?learningPathSlug={}&q=slug&version=2",
            slug
        );
        let data: PathData = self
            .fetch_first(&path, &format!("learning path '{}'", slug))
            .await?;

        let slugs = course_slugs(&data)?;
        tracing::debug!("learning path '{}' references {} courses", slug, slugs.len());

        let courses = futures::stream::iter(slugs.iter().map(|slug| self.fetch_course_data(slug)))
            .buffered(self.concurrency)
            .try_collect::<Vec<_>>()
            .await?;

        Ok((data, courses))
    }

    /// Resolve the progressive download URL for a video, at the fixed 720p
    /// resolution.
    pub async fn fetch_download_link(&self, course_slug: &str, video_slug: &str) -> Result<Url> {
        let path = format!(
            "learning-api/detailedCourses?addParagraphsToTranscript=false\
             &courseSlug={}&q=slugs&resolution=_720&videoSlug={}",
            course_slug, video_slug
        );
        let detail: VideoDetail = self
            .fetch_first(
                &path,
                &format!("video '{}' in course '{}'", video_slug, course_slug),
            )
            .await?;

        let raw = detail
            .selected_video
            .and_then(|video| video.url)
            .and_then(|url| url.progressive_url)
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "progressive download URL for video '{}'",
                    video_slug
                ))
            })?;

        Ok(Url::parse(&raw)?)
    }

    /// Stream a file to disk.
    pub async fn download_file(&self, url: &Url, destination: &Path) -> Result<u64> {
        self.download_file_with_progress(url, destination, |_| {})
            .await
    }

    /// Stream a file to disk in fixed-size chunks, invoking `on_chunk` with
    /// the byte count after each chunk is written. Returns the total bytes
    /// transferred.
    ///
    /// A failed download may leave a truncated file behind; there is no
    /// cleanup or resume.
    pub async fn download_file_with_progress(
        &self,
        url: &Url,
        destination: &Path,
        mut on_chunk: impl FnMut(u64) + Send,
    ) -> Result<u64> {
        if let Some(parent) = destination.parent() {
            ensure_dir(parent).await?;
        }

        tracing::debug!("GET {} -> {}", url, destination.display());
        let response = self
            .session
            .client()
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?;

        let stream = response.bytes_stream().map_err(std::io::Error::other);
        let mut reader = StreamReader::new(stream);
        let mut file = File::create(destination).await?;
        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut total: u64 = 0;

        loop {
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            file.write_all(&buf[..n]).await?;
            total += n as u64;
            on_chunk(n as u64);
        }

        file.flush().await?;
        tracing::debug!("downloaded {} bytes to {}", total, destination.display());
        Ok(total)
    }

    /// Build the headers every API call carries.
    fn api_headers(&self) -> Result<header::HeaderMap> {
        let csrf = self.session.csrf_token()?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            "Csrf-Token",
            csrf.parse()
                .map_err(|_| Error::Session("CSRF token is not a valid header value".into()))?,
        );
        Ok(headers)
    }

    /// Authenticated GET returning the deserialized JSON body.
    async fn fetch_json<T: DeserializeOwned>(&self, path_and_query: &str) -> Result<T> {
        let url = self.session.endpoint(path_and_query)?;
        tracing::debug!("GET {}", url);

        let response = self
            .session
            .client()
            .get(url)
            .headers(self.api_headers()?)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }

    /// Fetch an envelope and return its first element, or `NotFound` naming
    /// what was asked for.
    async fn fetch_first<T: DeserializeOwned>(&self, path_and_query: &str, what: &str) -> Result<T> {
        let envelope: Envelope<T> = self.fetch_json(path_and_query).await?;
        envelope
            .elements
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(what.to_string()))
    }
}

/// Extract the referenced course slugs from a learning path payload, in
/// document order.
///
/// Each item's `content` map embeds the item type as a single dynamic key;
/// we require exactly one entry and take it regardless of iteration order.
fn course_slugs(data: &PathData) -> Result<Vec<String>> {
    let sections = data
        .sections
        .as_ref()
        .ok_or_else(|| Error::malformed("sections", "learning path"))?;

    let mut slugs = Vec::new();
    for section in sections {
        let items = section
            .items
            .as_ref()
            .ok_or_else(|| Error::malformed("items", "learning path section"))?;
        for item in items {
            let mut entries = item.content.values();
            let (Some(content), None) = (entries.next(), entries.next()) else {
                return Err(Error::malformed("content", "learning path item"));
            };
            let slug = content
                .slug
                .as_ref()
                .ok_or_else(|| Error::malformed("slug", "learning path item"))?;
            slugs.push(slug.clone());
        }
    }
    Ok(slugs)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use cookie_store::CookieStore;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::session::CSRF_COOKIE;

    const COURSES_PATH: &str = "/learning-api/detailedCourses";
    const PATHS_PATH: &str = "/learning-api/detailedLearningPaths";

    /// Session pointed at the mock server, pre-seeded with a CSRF cookie.
    fn mock_session(server: &MockServer) -> Session {
        let home = Url::parse(&server.uri()).unwrap();
        let session = Session::with_home_url("test-agent", home.clone()).unwrap();

        let mut jar = CookieStore::default();
        jar.parse(&format!("{}=\"ajax:test\"; Path=/", CSRF_COOKIE), &home)
            .unwrap();
        session.replace_cookies(jar);
        session
    }

    fn course_body(slug: &str) -> serde_json::Value {
        json!({
            "elements": [{
                "title": format!("Course {}", slug),
                "slug": slug,
                "chapters": [],
            }]
        })
    }

    fn path_body(slugs: &[&str]) -> serde_json::Value {
        let items: Vec<_> = slugs
            .iter()
            .map(|slug| json!({ "content": { "listedCourse": { "slug": slug } } }))
            .collect();
        json!({
            "elements": [{
                "title": "Path",
                "slug": "the-path",
                "sections": [{ "items": items }],
            }]
        })
    }

    #[tokio::test]
    async fn fetch_course_data_returns_first_element() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(COURSES_PATH))
            .and(query_param("courseSlug", "rust-basics"))
            .respond_with(ResponseTemplate::new(200).set_body_json(course_body("rust-basics")))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(mock_session(&server));
        let course = fetcher.fetch_course_data("rust-basics").await.unwrap();
        assert_eq!(course.slug.as_deref(), Some("rust-basics"));
        assert_eq!(course.title.as_deref(), Some("Course rust-basics"));
    }

    #[tokio::test]
    async fn fetch_course_data_empty_elements_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(COURSES_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "elements": [] })))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(mock_session(&server));
        let err = fetcher.fetch_course_data("missing").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn api_calls_require_a_csrf_cookie() {
        let server = MockServer::start().await;
        let home = Url::parse(&server.uri()).unwrap();
        let session = Session::with_home_url("test-agent", home).unwrap();

        let fetcher = Fetcher::new(session);
        let err = fetcher.fetch_course_data("any").await.unwrap_err();
        assert!(matches!(err, Error::Session(_)));
    }

    #[tokio::test]
    async fn course_path_fan_in_preserves_request_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PATHS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(path_body(&["b", "a", "c"])))
            .mount(&server)
            .await;

        // "a" resolves fastest, "b" slowest; results must still come back in
        // document order [b, a, c].
        for (slug, delay_ms) in [("b", 150u64), ("a", 0), ("c", 75)] {
            Mock::given(method("GET"))
                .and(path(COURSES_PATH))
                .and(query_param("courseSlug", slug))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(course_body(slug))
                        .set_delay(Duration::from_millis(delay_ms)),
                )
                .mount(&server)
                .await;
        }

        let fetcher = Fetcher::new(mock_session(&server));
        let (data, courses) = fetcher.fetch_course_path_data("the-path").await.unwrap();
        assert_eq!(data.slug.as_deref(), Some("the-path"));

        let order: Vec<_> = courses.iter().map(|c| c.slug.as_deref().unwrap()).collect();
        assert_eq!(order, ["b", "a", "c"]);
    }

    #[tokio::test]
    async fn course_path_without_courses_yields_no_course_data() {
        let server = MockServer::start().await;
        let body = json!({
            "elements": [{
                "title": "Path",
                "slug": "the-path",
                "sections": [],
            }]
        });
        Mock::given(method("GET"))
            .and(path(PATHS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(mock_session(&server));
        let (data, courses) = fetcher.fetch_course_path_data("the-path").await.unwrap();
        assert_eq!(data.slug.as_deref(), Some("the-path"));
        assert!(courses.is_empty());
    }

    #[tokio::test]
    async fn course_path_fetch_is_all_or_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PATHS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(path_body(&["x1", "x2"])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(COURSES_PATH))
            .and(query_param("courseSlug", "x1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(course_body("x1")))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(COURSES_PATH))
            .and(query_param("courseSlug", "x2"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(mock_session(&server));
        let err = fetcher.fetch_course_path_data("the-path").await.unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }

    #[tokio::test]
    async fn ambiguous_content_key_is_malformed() {
        let server = MockServer::start().await;
        let body = json!({
            "elements": [{
                "title": "Path",
                "slug": "the-path",
                "sections": [{
                    "items": [{
                        "content": {
                            "listedCourse": { "slug": "x1" },
                            "otherThing": { "slug": "x2" },
                        }
                    }]
                }],
            }]
        });
        Mock::given(method("GET"))
            .and(path(PATHS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(mock_session(&server));
        let err = fetcher.fetch_course_path_data("the-path").await.unwrap_err();
        assert!(matches!(err, Error::MalformedData { ref field, .. } if field == "content"));
    }

    #[tokio::test]
    async fn download_of_empty_body_writes_empty_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/media/empty.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(Vec::<u8>::new()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("nested").join("empty.mp4");
        let url = Url::parse(&format!("{}/media/empty.mp4", server.uri())).unwrap();

        let fetcher = Fetcher::new(mock_session(&server));
        let total = fetcher.download_file(&url, &dest).await.unwrap();
        assert_eq!(total, 0);
        assert_eq!(std::fs::metadata(&dest).unwrap().len(), 0);
    }

    #[tokio::test]
    async fn download_reports_progress_per_chunk() {
        let payload = vec![7u8; 100_000];
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/media/video.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(payload.clone()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("video.mp4");
        let url = Url::parse(&format!("{}/media/video.mp4", server.uri())).unwrap();

        let fetcher = Fetcher::new(mock_session(&server));
        let mut chunks = Vec::new();
        let total = fetcher
            .download_file_with_progress(&url, &dest, |n| chunks.push(n))
            .await
            .unwrap();

        assert_eq!(total, payload.len() as u64);
        assert_eq!(chunks.iter().sum::<u64>(), total);
        assert!(chunks.iter().all(|&n| n <= CHUNK_SIZE as u64));
        assert_eq!(std::fs::read(&dest).unwrap(), payload);
    }
}
