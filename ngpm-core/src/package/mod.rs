//! ngpm package pipeline - fetch, install and build packages
//!
//! A package moves through three stages, each keyed by the same
//! [`PackageIdentifier`]:
//!
//! ```text
//! Registry ({registry_url}/<name>@v-<version>)
//!     │  fetch
//!     ▼
//! packages/<name>@v-<version>/package.zip
//!     │  install (shallow copy)
//!     ▼
//! installed/<name>@v-<version>/...
//!     │  build (scripts.build from package.json)
//!     ▼
//! exit status
//! ```
//!
//! Each stage checks the previous stage's directory before doing any work and
//! reports an [`outcome`] instead of failing when the work is already done or
//! the package is missing. Directories only appear under their final name once
//! complete, so existence is a reliable state signal.

mod build;
mod catalog;
mod fetch;
mod identifier;
mod install;
mod manifest;
pub mod outcome;
mod registry;
mod store;

pub use catalog::ListedPackage;
pub use identifier::{IdentifierError, PackageIdentifier};
pub use manifest::{PackageManifest, Scripts, MANIFEST_FILE};
pub use outcome::{BuildOutcome, ExitClass, FetchOutcome, InstallOutcome};
pub use registry::{
    validate_base_url, HttpRegistry, Registry, RegistryError, DEFAULT_REGISTRY_URL,
};
pub use store::{StoreLayout, ARCHIVE_FILE};

use crate::config::NgpmConfig;
use crate::error::PackageError;

/// Runs the fetch, install and build stages against a storage layout
///
/// Holds no package state of its own; every call re-reads the filesystem.
pub struct PackageManager<R: Registry> {
    layout: StoreLayout,
    registry: R,
}

impl PackageManager<HttpRegistry> {
    /// Create a manager backed by the HTTP registry described in `config`
    pub fn from_config(config: &NgpmConfig) -> Result<Self, PackageError> {
        let registry = HttpRegistry::new(&config.registry_url, config.request_timeout())
            .map_err(PackageError::Registry)?;
        Ok(Self::new(StoreLayout::from_config(config), registry))
    }
}

impl<R: Registry> PackageManager<R> {
    pub fn new(layout: StoreLayout, registry: R) -> Self {
        Self { layout, registry }
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }
}
