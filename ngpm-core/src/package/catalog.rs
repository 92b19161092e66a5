//! Catalog lister: what is in the packages area

use serde::Serialize;
use std::path::PathBuf;

use super::manifest::{PackageManifest, MANIFEST_FILE};
use super::store::is_hidden;
use super::{PackageManager, Registry};
use crate::error::{PackageError, Stage};

/// A package directory with a readable manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedPackage {
    /// Name declared in the manifest
    pub name: String,
    /// Version declared in the manifest
    pub version: String,
    /// Package directory inside the packages area
    pub path: PathBuf,
}

impl<R: Registry> PackageManager<R> {
    /// List packages in the packages area by their manifest identity
    ///
    /// Directories without a `package.json` are skipped, as are manifests that
    /// fail to parse (with a warning). A missing packages area is empty.
    pub fn list(&self) -> Result<Vec<ListedPackage>, PackageError> {
        let area = self.layout.packages_dir();
        if !area.exists() {
            return Ok(Vec::new());
        }

        let read_err = |e| PackageError::Storage {
            stage: Stage::List,
            id: None,
            action: "could not read",
            path: area.to_path_buf(),
            source: e,
        };

        let mut dirs = Vec::new();
        for entry in std::fs::read_dir(area).map_err(read_err)? {
            let entry = entry.map_err(read_err)?;
            if entry.path().is_dir() && !is_hidden(&entry.file_name()) {
                dirs.push(entry.path());
            }
        }
        dirs.sort();

        let mut listed = Vec::new();
        for dir in dirs {
            if !dir.join(MANIFEST_FILE).is_file() {
                continue;
            }

            match PackageManifest::from_dir(&dir) {
                Ok(manifest) => listed.push(ListedPackage {
                    name: manifest.name,
                    version: manifest.version,
                    path: dir,
                }),
                Err(e) => tracing::warn!("Skipping {}: {}", dir.display(), e),
            }
        }

        Ok(listed)
    }
}
