//! Fetch stage: registry → `packages/<key>/package.zip`

use super::outcome::FetchOutcome;
use super::store::{Commit, Staging, ARCHIVE_FILE};
use super::{PackageIdentifier, PackageManager, Registry};
use crate::error::{PackageError, Stage};

impl<R: Registry> PackageManager<R> {
    /// Download a package archive unless it is already present
    ///
    /// An existing `packages/<key>` directory short-circuits without touching
    /// the network. A failed download leaves nothing behind.
    #[tracing::instrument(skip_all, fields(package = %id))]
    pub async fn fetch(&self, id: &PackageIdentifier) -> Result<FetchOutcome, PackageError> {
        let target = self.layout.fetched_path(id);

        if target.exists() {
            tracing::debug!("{} already present, skipping download", target.display());
            return Ok(FetchOutcome::AlreadyDownloaded { id: id.clone() });
        }

        let staging = Staging::new_in(self.layout.packages_dir()).map_err(|e| {
            PackageError::storage(
                Stage::Fetch,
                id,
                "could not create directory in",
                self.layout.packages_dir(),
                e,
            )
        })?;

        let archive = staging.path().join(ARCHIVE_FILE);
        tracing::info!("Downloading {} from {}", id, self.registry.resource_url(id));

        // Dropping `staging` on error removes the partial download
        let bytes = self
            .registry
            .download(id, &archive)
            .await
            .map_err(|source| PackageError::Transport {
                stage: Stage::Fetch,
                id: id.clone(),
                source,
            })?;

        match staging.commit(&target) {
            Ok(Commit::Committed) => {
                tracing::info!("Fetched {} ({} bytes) to {}", id, bytes, target.display());
                Ok(FetchOutcome::Downloaded {
                    id: id.clone(),
                    path: target.join(ARCHIVE_FILE),
                    bytes,
                })
            }
            Ok(Commit::AlreadyPresent) => {
                tracing::warn!("{} was fetched concurrently; keeping existing copy", id);
                Ok(FetchOutcome::AlreadyDownloaded { id: id.clone() })
            }
            Err(e) => Err(PackageError::storage(
                Stage::Fetch,
                id,
                "could not move download to",
                target,
                e,
            )),
        }
    }
}
