//! Test helper functions for integration tests
//!
//! Shared across the test files in this directory via the tests/common/
//! pattern.

#![allow(dead_code)]

use async_trait::async_trait;
use ngpm_core::package::{
    PackageIdentifier, PackageManager, Registry, RegistryError, StoreLayout,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Once;
use tempfile::TempDir;

/// Initialize logging for tests (only once per test run)
static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_target(true)
                    .with_level(true),
            )
            .with(tracing_subscriber::filter::EnvFilter::from_default_env())
            .try_init();
    });
}

/// In-memory registry that serves one body and counts requests
pub struct MockRegistry {
    body: Vec<u8>,
    fail_after_partial: bool,
    requests: AtomicUsize,
}

impl MockRegistry {
    pub fn serving(body: &[u8]) -> Self {
        Self {
            body: body.to_vec(),
            fail_after_partial: false,
            requests: AtomicUsize::new(0),
        }
    }

    /// Writes the first half of the body, then fails
    pub fn failing(body: &[u8]) -> Self {
        Self {
            fail_after_partial: true,
            ..Self::serving(body)
        }
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Registry for MockRegistry {
    fn resource_url(&self, id: &PackageIdentifier) -> String {
        format!("mock://registry/{}", id.key())
    }

    async fn download(&self, id: &PackageIdentifier, dest: &Path) -> Result<u64, RegistryError> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        let write_err = |source| RegistryError::Write {
            path: dest.to_path_buf(),
            source,
        };

        if self.fail_after_partial {
            std::fs::write(dest, &self.body[..self.body.len() / 2]).map_err(write_err)?;
            return Err(RegistryError::Status {
                url: self.resource_url(id),
                status: 503,
            });
        }

        std::fs::write(dest, &self.body).map_err(write_err)?;
        Ok(self.body.len() as u64)
    }
}

/// A package manager over fresh temporary areas
pub struct TestStore {
    pub temp_dir: TempDir,
    pub manager: PackageManager<MockRegistry>,
}

impl TestStore {
    pub fn new(registry: MockRegistry) -> Self {
        init_test_logging();
        let temp_dir = TempDir::new().expect("create temp dir");
        let layout = StoreLayout::new(
            temp_dir.path().join("packages"),
            temp_dir.path().join("installed"),
        );
        Self {
            temp_dir,
            manager: PackageManager::new(layout, registry),
        }
    }

    pub fn packages_dir(&self) -> PathBuf {
        self.manager.layout().packages_dir().to_path_buf()
    }

    pub fn installed_dir(&self) -> PathBuf {
        self.manager.layout().installed_dir().to_path_buf()
    }

    /// Place a fetched package directory by hand, bypassing the registry
    pub fn seed_fetched(&self, id: &PackageIdentifier, files: &[(&str, &str)]) -> PathBuf {
        let dir = self.manager.layout().fetched_path(id);
        std::fs::create_dir_all(&dir).expect("create fetched dir");
        for (name, content) in files {
            std::fs::write(dir.join(name), content).expect("write fetched file");
        }
        dir
    }
}

pub fn id(name: &str, version: &str) -> PackageIdentifier {
    PackageIdentifier::new(name, version).expect("valid identifier")
}

pub fn manifest_json(name: &str, version: &str, build: Option<&str>) -> String {
    match build {
        Some(cmd) => serde_json::json!({
            "name": name,
            "version": version,
            "scripts": { "build": cmd }
        })
        .to_string(),
        None => serde_json::json!({ "name": name, "version": version }).to_string(),
    }
}

/// Entries directly under `dir`, sorted by name
pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|rd| {
            rd.filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
