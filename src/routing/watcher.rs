//! Override document watcher for hot reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::kernel::Kernel;

/// Reloads the kernel's routes whenever the override document changes.
pub struct RoutesWatcher {
    kernel: Arc<Kernel>,
    path: PathBuf,
}

impl RoutesWatcher {
    pub fn new(kernel: Arc<Kernel>) -> Self {
        let path = kernel.routes_path();
        Self { kernel, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start watching in a background thread.
    ///
    /// The document's directory is watched, since the document itself may
    /// not exist yet. The returned watcher must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let kernel = self.kernel.clone();
        let target = self.path.clone();
        let dir = self
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let relevant = (event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove())
                        && event.paths.iter().any(|p| p.file_name() == target.file_name());
                    if relevant {
                        let routes = kernel.load_routes();
                        tracing::info!(routes, "Route overrides changed, registry reloaded");
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Routes watcher started");
        Ok(watcher)
    }
}
