//! API payload type definitions.
//!
//! Required fields are modelled as `Option` so that a missing field surfaces
//! as a `MalformedData` error naming the field, instead of a deserialization
//! failure for the whole payload.

use std::collections::HashMap;

use serde::Deserialize;

/// Envelope every learning API response uses.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    #[serde(default)]
    pub elements: Vec<T>,
}

/// Course detail payload.
#[derive(Debug, Clone, Deserialize)]
pub struct CourseData {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub chapters: Option<Vec<ChapterData>>,
}

/// Chapter entry within a course payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ChapterData {
    pub title: Option<String>,
    pub videos: Option<Vec<VideoData>>,
}

/// Video entry within a chapter payload.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoData {
    pub title: Option<String>,
    pub slug: Option<String>,
}

/// Learning path detail payload.
#[derive(Debug, Clone, Deserialize)]
pub struct PathData {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub sections: Option<Vec<SectionData>>,
}

/// Section within a learning path.
#[derive(Debug, Clone, Deserialize)]
pub struct SectionData {
    pub items: Option<Vec<SectionItem>>,
}

/// Item within a learning path section.
///
/// The `content` map embeds the item type as a single dynamic key whose value
/// carries the slug.
#[derive(Debug, Clone, Deserialize)]
pub struct SectionItem {
    #[serde(default)]
    pub content: HashMap<String, ContentRef>,
}

/// Slug-bearing value under a section item's content key.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentRef {
    pub slug: Option<String>,
}

/// Video detail payload used to resolve a download link.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetail {
    pub selected_video: Option<SelectedVideo>,
}

/// Selected resolution block of a video detail payload.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectedVideo {
    pub url: Option<VideoUrl>,
}

/// URL block of a selected video.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoUrl {
    pub progressive_url: Option<String>,
}
