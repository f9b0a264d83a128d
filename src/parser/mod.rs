//! Mapping from raw API payloads to the typed content tree.
//!
//! Pure functions, no I/O: the fetcher held here is only cloned into video
//! nodes as their download capability. Children are attached in payload
//! order, so tree order mirrors document order at every level.

use crate::api::types::{ChapterData, CourseData, PathData, VideoData};
use crate::api::Fetcher;
use crate::error::{Error, Result};
use crate::tree::{ContentTree, NodeId, NodeKind};

/// Builds [`ContentTree`]s out of raw API payloads.
#[derive(Debug, Clone)]
pub struct TreeParser {
    fetcher: Fetcher,
}

impl TreeParser {
    pub fn new(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }

    /// Build a tree rooted at a single course.
    pub fn course(&self, data: CourseData) -> Result<ContentTree> {
        let title = require(data.title, "title", "course")?;
        let slug = require(data.slug, "slug", "course")?;
        let chapters = require(data.chapters, "chapters", "course")?;

        let mut tree = ContentTree::new(title, NodeKind::Course { slug });
        let root = tree.root();
        self.chapters_into(&mut tree, root, chapters)?;
        Ok(tree)
    }

    /// Build a tree rooted at a learning path, attaching one course per
    /// entry of `courses` in the given order.
    ///
    /// `courses` comes from the fetcher's fan-in, which already preserves
    /// the path payload's document order.
    pub fn course_path(&self, data: PathData, courses: Vec<CourseData>) -> Result<ContentTree> {
        let title = require(data.title, "title", "learning path")?;
        let slug = require(data.slug, "slug", "learning path")?;

        let mut tree = ContentTree::new(title, NodeKind::CoursePath { slug });
        let root = tree.root();
        for course in courses {
            self.course_into(&mut tree, root, course)?;
        }
        Ok(tree)
    }

    fn course_into(
        &self,
        tree: &mut ContentTree,
        parent: NodeId,
        data: CourseData,
    ) -> Result<NodeId> {
        let title = require(data.title, "title", "course")?;
        let slug = require(data.slug, "slug", "course")?;
        let chapters = require(data.chapters, "chapters", "course")?;

        let course = tree.insert(title, NodeKind::Course { slug });
        tree.attach_child(parent, course)?;
        self.chapters_into(tree, course, chapters)?;
        Ok(course)
    }

    fn chapters_into(
        &self,
        tree: &mut ContentTree,
        course: NodeId,
        chapters: Vec<ChapterData>,
    ) -> Result<()> {
        for chapter in chapters {
            self.chapter_into(tree, course, chapter)?;
        }
        Ok(())
    }

    fn chapter_into(
        &self,
        tree: &mut ContentTree,
        parent: NodeId,
        data: ChapterData,
    ) -> Result<NodeId> {
        let title = require(data.title, "title", "chapter")?;
        let videos = require(data.videos, "videos", "chapter")?;

        let chapter = tree.insert(title, NodeKind::Chapter);
        tree.attach_child(parent, chapter)?;
        for video in videos {
            self.video_into(tree, chapter, video)?;
        }
        Ok(chapter)
    }

    fn video_into(&self, tree: &mut ContentTree, parent: NodeId, data: VideoData) -> Result<NodeId> {
        let title = require(data.title, "title", "video")?;
        let slug = require(data.slug, "slug", "video")?;

        let video = tree.insert(
            title,
            NodeKind::Video {
                slug,
                fetcher: self.fetcher.clone(),
            },
        );
        tree.attach_child(parent, video)?;
        Ok(video)
    }
}

fn require<T>(value: Option<T>, field: &str, node: &str) -> Result<T> {
    value.ok_or_else(|| Error::malformed(field, node))
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use url::Url;

    use crate::session::Session;

    fn parser() -> TreeParser {
        let home = Url::parse("http://127.0.0.1:1/").unwrap();
        let session = Session::with_home_url("test-agent", home).unwrap();
        TreeParser::new(Fetcher::new(session))
    }

    fn course_data(value: serde_json::Value) -> CourseData {
        serde_json::from_value(value).unwrap()
    }

    fn sample_course(slug: &str) -> CourseData {
        course_data(json!({
            "title": format!("Course {}", slug),
            "slug": slug,
            "chapters": [
                {
                    "title": "Chapter One",
                    "videos": [
                        { "title": "First", "slug": "first" },
                        { "title": "Second", "slug": "second" },
                    ],
                },
                {
                    "title": "Chapter Two",
                    "videos": [
                        { "title": "Third", "slug": "third" },
                    ],
                },
            ],
        }))
    }

    #[test]
    fn course_preserves_payload_order() {
        let tree = parser().course(sample_course("c1")).unwrap();

        let titles: Vec<_> = tree
            .traverse()
            .map(|id| tree.get(id).title().to_string())
            .collect();
        assert_eq!(
            titles,
            [
                "Course c1",
                "Chapter One",
                "First",
                "Second",
                "Chapter Two",
                "Third"
            ]
        );
    }

    #[test]
    fn course_path_attaches_courses_in_list_order() {
        let path: PathData = serde_json::from_value(json!({
            "title": "Advance Your Skills",
            "slug": "advance-your-skills",
            "sections": [],
        }))
        .unwrap();

        let tree = parser()
            .course_path(path, vec![sample_course("x1"), sample_course("x2")])
            .unwrap();

        let root = tree.get(tree.root());
        assert!(matches!(root.kind(), NodeKind::CoursePath { .. }));

        let course_titles: Vec<_> = root
            .children()
            .iter()
            .map(|&id| tree.get(id).title().to_string())
            .collect();
        assert_eq!(course_titles, ["Course x1", "Course x2"]);
    }

    #[test]
    fn missing_course_title_names_field_and_node() {
        let data = course_data(json!({ "slug": "c1", "chapters": [] }));
        let err = parser().course(data).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedData { ref field, ref node } if field == "title" && node == "course"
        ));
    }

    #[test]
    fn missing_chapters_collection_is_malformed() {
        let data = course_data(json!({ "title": "t", "slug": "c1" }));
        let err = parser().course(data).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedData { ref field, .. } if field == "chapters"
        ));
    }

    #[test]
    fn missing_video_slug_is_malformed() {
        let data = course_data(json!({
            "title": "t",
            "slug": "c1",
            "chapters": [
                { "title": "ch", "videos": [ { "title": "v" } ] },
            ],
        }));
        let err = parser().course(data).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedData { ref field, ref node } if field == "slug" && node == "video"
        ));
    }

    #[test]
    fn parsed_videos_carry_a_fetcher_capability() {
        let tree = parser().course(sample_course("c1")).unwrap();
        let video_count = tree
            .traverse()
            .filter(|&id| matches!(tree.get(id).kind(), NodeKind::Video { .. }))
            .count();
        assert_eq!(video_count, 3);
    }
}
