//! Filesystem helpers: path layout and name sanitization.

pub mod naming;
pub mod paths;

pub use naming::sanitize_path_component;
pub use paths::{ensure_dir, video_destination};
