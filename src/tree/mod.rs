//! Content tree: the CoursePath → Course → Chapter → Video hierarchy.
//!
//! Nodes live in an arena owned by [`ContentTree`] and reference each other
//! by [`NodeId`], which gives owning parent→children edges plus a non-owning
//! parent back-reference without any cyclic ownership. A node's parent is set
//! exactly once, when it is attached; re-attachment is an error.

pub mod task;

use std::fmt::Write as _;
use std::path::Path;

use crate::api::Fetcher;
use crate::error::{Error, Result};
use crate::fs::paths::video_destination;

pub use task::DownloadTask;

/// Index of a node within its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Variant-specific node data.
///
/// A video owns the fetcher capability it needs to resolve its download link.
#[derive(Debug, Clone)]
pub enum NodeKind {
    CoursePath { slug: String },
    Course { slug: String },
    Chapter,
    Video { slug: String, fetcher: Fetcher },
}

impl NodeKind {
    fn name(&self) -> &'static str {
        match self {
            NodeKind::CoursePath { .. } => "CoursePath",
            NodeKind::Course { .. } => "Course",
            NodeKind::Chapter => "Chapter",
            NodeKind::Video { .. } => "Video",
        }
    }
}

/// A node in the content tree.
#[derive(Debug, Clone)]
pub struct Node {
    title: String,
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Arena-backed content tree with a single root.
#[derive(Debug, Clone)]
pub struct ContentTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl ContentTree {
    /// Create a tree containing only its root node.
    pub fn new(title: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            nodes: vec![Node {
                title: title.into(),
                kind,
                parent: None,
                children: Vec::new(),
            }],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Insert a detached node into the arena.
    pub fn insert(&mut self, title: impl Into<String>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            title: title.into(),
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Attach `child` under `parent`, appending it to the parent's children
    /// and setting the child's parent link.
    ///
    /// The parent link is set exactly once; attaching a node that already has
    /// a parent is a tree violation.
    pub fn attach_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if self.nodes[child.0].parent.is_some() {
            return Err(Error::Tree(format!(
                "node '{}' already has a parent; re-parenting is not supported",
                self.nodes[child.0].title
            )));
        }
        if parent == child {
            return Err(Error::Tree(format!(
                "cannot attach node '{}' to itself",
                self.nodes[child.0].title
            )));
        }

        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    /// Lazy depth-first pre-order traversal starting at the root.
    ///
    /// Each call yields a fresh, restartable iterator.
    pub fn traverse(&self) -> Traverse<'_> {
        Traverse {
            tree: self,
            stack: vec![self.root],
        }
    }

    /// Lazy sequence of download tasks, one per video leaf, in traversal
    /// order. No I/O happens until a task is run.
    ///
    /// Each task captures its resolved destination path
    /// (`{base}/{course}/{chapter}/{video}.mp4`) and the course slug drawn
    /// from the video's grandparent; a video without that ancestry yields a
    /// tree violation instead of a task.
    pub fn download_tasks<'a>(
        &'a self,
        base_dir: &'a Path,
    ) -> impl Iterator<Item = Result<DownloadTask>> + 'a {
        self.traverse().filter_map(move |id| {
            match self.get(id).kind() {
                NodeKind::Video { .. } => Some(self.video_task(id, base_dir)),
                _ => None,
            }
        })
    }

    /// Indented textual rendering of the tree, one node per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_node(self.root, 0, &mut out);
        out
    }

    fn render_node(&self, id: NodeId, indent: usize, out: &mut String) {
        let node = self.get(id);
        let _ = writeln!(
            out,
            "{}({}, {})",
            "  ".repeat(indent),
            node.kind.name(),
            node.title
        );
        for &child in &node.children {
            self.render_node(child, indent + 1, out);
        }
    }

    fn video_task(&self, id: NodeId, base_dir: &Path) -> Result<DownloadTask> {
        let video = self.get(id);
        let NodeKind::Video { slug, fetcher } = &video.kind else {
            return Err(Error::Tree(format!("node '{}' is not a video", video.title)));
        };

        let chapter = video
            .parent
            .map(|p| self.get(p))
            .filter(|n| matches!(n.kind, NodeKind::Chapter))
            .ok_or_else(|| {
                Error::Tree(format!("video '{}' is not attached to a chapter", video.title))
            })?;

        let course = chapter
            .parent
            .map(|p| self.get(p))
            .ok_or_else(|| {
                Error::Tree(format!("video '{}' has no course ancestor", video.title))
            })?;
        let NodeKind::Course { slug: course_slug } = &course.kind else {
            return Err(Error::Tree(format!(
                "video '{}' has no course ancestor",
                video.title
            )));
        };

        let destination =
            video_destination(base_dir, &course.title, &chapter.title, &video.title)?;

        Ok(DownloadTask::new(
            fetcher.clone(),
            course_slug.clone(),
            slug.clone(),
            destination,
        ))
    }
}

/// Depth-first pre-order iterator over a tree's nodes.
pub struct Traverse<'a> {
    tree: &'a ContentTree,
    stack: Vec<NodeId>,
}

impl Iterator for Traverse<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        let node = self.tree.get(id);
        // Push in reverse so the first child is visited first.
        self.stack.extend(node.children.iter().rev().copied());
        Some(id)
    }
}
