//! Input loading and live rebuilds on file changes

pub mod service;
pub mod source;
pub mod watcher;

pub use service::RebuildService;
pub use source::{Source, scan_tree};
pub use watcher::{FileWatcher, WatchEvent, should_ignore_path};
