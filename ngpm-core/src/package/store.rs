//! Local storage layout
//!
//! Two areas, each holding one directory per package key:
//!
//! ```text
//! packages/<name>@v-<version>/package.zip   ← fetched
//! installed/<name>@v-<version>/...          ← installed
//! ```
//!
//! Stages build their output in a hidden staging directory inside the target
//! area and rename it into place when complete, so a package directory that
//! exists is always a finished one.

use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::PackageIdentifier;
use crate::config::NgpmConfig;

/// File name of the fetched archive
pub const ARCHIVE_FILE: &str = "package.zip";

/// Prefix of in-progress directories; identifiers cannot start with '.'
const STAGING_PREFIX: &str = ".ngpm-staging-";

/// Locations of the packages and installed areas
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    packages_dir: PathBuf,
    installed_dir: PathBuf,
}

impl StoreLayout {
    pub fn new(packages_dir: impl Into<PathBuf>, installed_dir: impl Into<PathBuf>) -> Self {
        Self {
            packages_dir: packages_dir.into(),
            installed_dir: installed_dir.into(),
        }
    }

    pub fn from_config(config: &NgpmConfig) -> Self {
        Self::new(&config.packages_dir, &config.installed_dir)
    }

    pub fn packages_dir(&self) -> &Path {
        &self.packages_dir
    }

    pub fn installed_dir(&self) -> &Path {
        &self.installed_dir
    }

    /// Directory of a fetched package
    pub fn fetched_path(&self, id: &PackageIdentifier) -> PathBuf {
        self.packages_dir.join(id.key())
    }

    /// Archive inside a fetched package
    pub fn archive_path(&self, id: &PackageIdentifier) -> PathBuf {
        self.fetched_path(id).join(ARCHIVE_FILE)
    }

    /// Directory of an installed package
    pub fn installed_path(&self, id: &PackageIdentifier) -> PathBuf {
        self.installed_dir.join(id.key())
    }

    /// Create the installed area if it does not exist yet
    pub fn ensure_installed_dir(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.installed_dir)
    }
}

/// Whether a staging directory became the final package directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Commit {
    Committed,
    /// Another process finished the same package first; our copy was dropped
    AlreadyPresent,
}

/// An in-progress package directory, removed on drop unless committed
pub(crate) struct Staging {
    dir: TempDir,
}

impl Staging {
    /// Create a staging directory inside `area`, creating the area if needed
    pub(crate) fn new_in(area: &Path) -> io::Result<Self> {
        std::fs::create_dir_all(area)?;
        let dir = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(area)?;
        Ok(Self { dir })
    }

    pub(crate) fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Move the staging directory to `target`
    pub(crate) fn commit(self, target: &Path) -> io::Result<Commit> {
        match std::fs::rename(self.dir.path(), target) {
            // The TempDir's own cleanup now finds nothing and ignores the error
            Ok(()) => Ok(Commit::Committed),
            Err(_) if target.exists() => Ok(Commit::AlreadyPresent),
            Err(e) => Err(e),
        }
    }
}

/// Staging directories are hidden; anything starting with '.' is not a package
pub(crate) fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|n| n.starts_with('.'))
}
