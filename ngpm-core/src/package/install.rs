//! Install stage: `packages/<key>` → `installed/<key>`

use std::path::Path;

use super::outcome::InstallOutcome;
use super::store::{Commit, Staging};
use super::{PackageIdentifier, PackageManager, Registry};
use crate::error::{PackageError, Stage};

impl<R: Registry> PackageManager<R> {
    /// Copy a fetched package into the installed area
    ///
    /// Only the top level is copied: files byte-for-byte, subdirectories are
    /// recreated empty. The archive is copied as-is, not extracted.
    #[tracing::instrument(skip_all, fields(package = %id))]
    pub fn install(&self, id: &PackageIdentifier) -> Result<InstallOutcome, PackageError> {
        let source = self.layout.fetched_path(id);
        if !source.is_dir() {
            return Ok(InstallOutcome::NotFound { id: id.clone() });
        }

        let target = self.layout.installed_path(id);
        if target.exists() {
            return Ok(InstallOutcome::AlreadyInstalled { id: id.clone() });
        }

        let staging = Staging::new_in(self.layout.installed_dir()).map_err(|e| {
            PackageError::storage(
                Stage::Install,
                id,
                "could not create directory in",
                self.layout.installed_dir(),
                e,
            )
        })?;

        let entries = copy_top_level(id, &source, staging.path())?;

        match staging.commit(&target) {
            Ok(Commit::Committed) => {
                tracing::info!("Installed {} to {}", id, target.display());
                Ok(InstallOutcome::Installed {
                    id: id.clone(),
                    path: target,
                    entries,
                })
            }
            Ok(Commit::AlreadyPresent) => {
                tracing::warn!("{} was installed concurrently; keeping existing copy", id);
                Ok(InstallOutcome::AlreadyInstalled { id: id.clone() })
            }
            Err(e) => Err(PackageError::storage(
                Stage::Install,
                id,
                "could not move installation to",
                target,
                e,
            )),
        }
    }
}

fn copy_top_level(id: &PackageIdentifier, from: &Path, to: &Path) -> Result<usize, PackageError> {
    let read_err = |e| PackageError::storage(Stage::Install, id, "could not read", from, e);

    let mut copied = 0;
    for entry in std::fs::read_dir(from).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let src = entry.path();
        let dest = to.join(entry.file_name());

        // symlink_metadata: a link to a directory is copied as a file
        let metadata = std::fs::symlink_metadata(&src)
            .map_err(|e| PackageError::storage(Stage::Install, id, "could not read", &src, e))?;

        if metadata.is_dir() {
            std::fs::create_dir_all(&dest).map_err(|e| {
                PackageError::storage(Stage::Install, id, "could not create", &dest, e)
            })?;
        } else {
            std::fs::copy(&src, &dest).map_err(|e| {
                PackageError::storage(Stage::Install, id, "could not copy to", &dest, e)
            })?;
        }

        tracing::debug!("Copied {}", src.display());
        copied += 1;
    }

    Ok(copied)
}
