//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use route_kernel::config::KernelConfig;
use route_kernel::{Handler, Kernel, KernelBuilder, KernelError, Request, Response};
use tempfile::TempDir;

/// Handler writing a fixed body, tagged with the routing key it was built for.
pub struct Echo {
    pub name: &'static str,
    pub key: String,
}

impl Handler for Echo {
    fn run(&mut self, _request: &Request, response: &mut Response) -> Result<(), KernelError> {
        response.write(format!("{} {}", self.name, self.key));
        Ok(())
    }
}

/// Factory for an `Echo` handler named `name`.
pub fn echo(name: &'static str) -> impl Fn(&str, &str) -> Box<dyn Handler> + Send + Sync + 'static {
    move |_pattern, key| {
        Box::new(Echo {
            name,
            key: key.to_string(),
        })
    }
}

/// An install root on disk with a kernel config pointing at it.
pub struct TestSite {
    pub dir: TempDir,
    pub config: KernelConfig,
}

impl TestSite {
    /// An installed site (non-empty database name).
    pub fn installed() -> Self {
        let mut site = Self::not_installed();
        site.config.kernel.db_name = "erp".to_string();
        site
    }

    pub fn not_installed() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = KernelConfig::default();
        config.kernel.install_root = dir.path().to_path_buf();
        Self { dir, config }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file below the install root, creating parents.
    pub fn write(&self, relative: &str, content: &str) {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    /// Builder with the common echo handlers registered.
    pub fn builder(&self) -> KernelBuilder {
        Kernel::builder(self.config.clone())
            .handler("Dashboard", echo("Dashboard"))
            .handler("AdminPlugins", echo("AdminPlugins"))
            .handler("Installer", echo("Installer"))
    }

    pub fn kernel(&self) -> Kernel {
        self.builder().build()
    }
}
