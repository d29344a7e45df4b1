//! Controller discovery.
//!
//! # Responsibilities
//! - Enumerate controller artifacts in the discovery directory
//! - Yield base names filtered by a fixed extension

use std::fs;
use std::path::PathBuf;

/// Source of discoverable controller names.
pub trait ControllerSource: Send + Sync {
    /// Base names (no extension) of every eligible artifact, sorted.
    fn controllers(&self) -> Vec<String>;
}

/// Lists `<dir>/*.<extension>` on the filesystem.
#[derive(Debug, Clone)]
pub struct DirectoryLister {
    dir: PathBuf,
    extension: String,
}

impl DirectoryLister {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
        }
    }
}

impl ControllerSource for DirectoryLister {
    fn controllers(&self) -> Vec<String> {
        if !self.dir.is_dir() {
            return Vec::new();
        }
        let entries = match fs::read_dir(&self.dir) {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(dir = %self.dir.display(), error = %e, "Cannot read controller directory");
                return Vec::new();
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.extension()
                    .and_then(|e| e.to_str())
                    .map(|e| e == self.extension)
                    .unwrap_or(false)
            })
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .collect();
        names.sort();
        names
    }
}

/// Fixed list of controllers, for hosts without a discovery directory.
#[derive(Debug, Clone, Default)]
pub struct StaticControllers(pub Vec<String>);

impl ControllerSource for StaticControllers {
    fn controllers(&self) -> Vec<String> {
        let mut names = self.0.clone();
        names.sort();
        names
    }
}
