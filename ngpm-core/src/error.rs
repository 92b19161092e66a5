//! Fatal pipeline errors
//!
//! Expected steady states ("already installed", "not found", ...) are not
//! errors; they are returned as outcomes. Everything here aborts the current
//! stage and names the stage and the package it was working on.

use std::path::PathBuf;
use thiserror::Error;

use crate::package::{ExitClass, IdentifierError, PackageIdentifier, RegistryError};

/// Pipeline stage, used to label errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Install,
    Build,
    List,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Stage::Fetch => "fetch",
            Stage::Install => "install",
            Stage::Build => "build",
            Stage::List => "list",
        })
    }
}

/// Failure to read or parse a package.json
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to read manifest: {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse manifest: {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Fatal errors surfaced by the package pipeline
#[derive(Error, Debug)]
pub enum PackageError {
    #[error(transparent)]
    InvalidIdentifier(#[from] IdentifierError),

    #[error("Failed to set up registry client")]
    Registry(#[source] RegistryError),

    #[error("{stage} failed for {id}: could not download from registry")]
    Transport {
        stage: Stage,
        id: PackageIdentifier,
        #[source]
        source: RegistryError,
    },

    #[error("{stage} failed for {}: {action} {}", OptionalId(id), path.display())]
    Storage {
        stage: Stage,
        id: Option<PackageIdentifier>,
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{stage} failed for {id}: invalid manifest")]
    Manifest {
        stage: Stage,
        id: PackageIdentifier,
        #[source]
        source: ManifestError,
    },

    #[error("build failed for {id}: could not run '{command}'")]
    Spawn {
        id: PackageIdentifier,
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("build failed for {id}: '{command}' {}", describe_exit(*code))]
    BuildFailed {
        id: PackageIdentifier,
        command: String,
        /// `None` when the process was terminated by a signal
        code: Option<i32>,
    },
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {code}"),
        None => "was terminated by a signal".to_string(),
    }
}

impl PackageError {
    /// Shorthand for a storage error inside a stage
    pub(crate) fn storage(
        stage: Stage,
        id: &PackageIdentifier,
        action: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        PackageError::Storage {
            stage,
            id: Some(id.clone()),
            action,
            path: path.into(),
            source,
        }
    }

    /// Exit-code class for this failure
    pub fn exit_class(&self) -> ExitClass {
        match self {
            PackageError::InvalidIdentifier(_) => ExitClass::InvalidInput,
            PackageError::Registry(_) => ExitClass::Internal,
            PackageError::Transport { .. } => ExitClass::TransportError,
            PackageError::Storage { .. } => ExitClass::StorageError,
            PackageError::Manifest { .. }
            | PackageError::Spawn { .. }
            | PackageError::BuildFailed { .. } => ExitClass::BuildFailure,
        }
    }
}

/// Renders a storage error's package, or the area when there is none
struct OptionalId<'a>(&'a Option<PackageIdentifier>);

impl std::fmt::Display for OptionalId<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(id) => write!(f, "{id}"),
            None => f.write_str("packages area"),
        }
    }
}
