//! Build stage: run `scripts.build` inside the installed package

use once_cell::sync::Lazy;
use std::process::Stdio;
use tokio::process::Command;

use super::manifest::{PackageManifest, MANIFEST_FILE};
use super::outcome::BuildOutcome;
use super::{PackageIdentifier, PackageManager, Registry};
use crate::error::{PackageError, Stage};

/// Shell used to run build scripts, determined at first use
pub static SHELL_COMMAND: Lazy<&'static str> = Lazy::new(find_shell_command);

/// Detects the shell for the current platform
///
/// On Windows, prefers Git Bash at its standard install locations and falls
/// back to `bash.exe` from PATH. On Unix, uses `sh`.
fn find_shell_command() -> &'static str {
    if cfg!(windows) {
        if std::path::Path::new(r"C:\Program Files\Git\bin\bash.exe").exists() {
            tracing::debug!("Found Git Bash at standard 64-bit location");
            return r"C:\Program Files\Git\bin\bash.exe";
        }

        if std::path::Path::new(r"C:\Program Files (x86)\Git\bin\bash.exe").exists() {
            tracing::debug!("Found Git Bash at 32-bit location");
            return r"C:\Program Files (x86)\Git\bin\bash.exe";
        }

        tracing::debug!("No Git Bash found at standard locations, trying bash.exe from PATH");
        "bash.exe"
    } else {
        "sh"
    }
}

impl<R: Registry> PackageManager<R> {
    /// Run the package's build script, if it declares one
    ///
    /// The script runs with the installed package directory as its working
    /// directory and inherits this process's stdin, stdout and stderr. Blocks
    /// until it exits; a non-zero exit is an error.
    #[tracing::instrument(skip_all, fields(package = %id))]
    pub async fn build(&self, id: &PackageIdentifier) -> Result<BuildOutcome, PackageError> {
        let package_dir = self.layout.installed_path(id);
        if !package_dir.join(MANIFEST_FILE).is_file() {
            return Ok(BuildOutcome::NotInstalled { id: id.clone() });
        }

        let manifest =
            PackageManifest::from_dir(&package_dir).map_err(|source| PackageError::Manifest {
                stage: Stage::Build,
                id: id.clone(),
                source,
            })?;

        let Some(command) = manifest.build_script() else {
            return Ok(BuildOutcome::NoBuildScript { id: id.clone() });
        };

        tracing::info!("Running build script for {}: {}", id, command);

        let status = Command::new(*SHELL_COMMAND)
            .arg("-c")
            .arg(command)
            .current_dir(&package_dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|source| PackageError::Spawn {
                id: id.clone(),
                command: command.to_string(),
                source,
            })?;

        if !status.success() {
            return Err(PackageError::BuildFailed {
                id: id.clone(),
                command: command.to_string(),
                code: status.code(),
            });
        }

        tracing::info!("Build script for {} finished", id);
        Ok(BuildOutcome::Built {
            id: id.clone(),
            command: command.to_string(),
        })
    }
}
