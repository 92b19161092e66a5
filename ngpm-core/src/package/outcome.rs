//! Reported (non-fatal) stage outcomes and exit-code classes
//!
//! Each outcome renders as the status line shown to the user.

use std::fmt;
use std::path::PathBuf;

use super::PackageIdentifier;

/// Outcome class, mapped one-to-one onto a process exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitClass {
    Success,
    Internal,
    AlreadyDone,
    NotFound,
    InvalidInput,
    TransportError,
    StorageError,
    BuildFailure,
}

impl ExitClass {
    /// Process exit code for this class (2 is left to clap usage errors)
    pub fn code(self) -> u8 {
        match self {
            ExitClass::Success => 0,
            ExitClass::Internal => 1,
            ExitClass::AlreadyDone => 3,
            ExitClass::NotFound => 4,
            ExitClass::InvalidInput => 5,
            ExitClass::TransportError => 10,
            ExitClass::StorageError => 11,
            ExitClass::BuildFailure => 12,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Downloaded {
        id: PackageIdentifier,
        path: PathBuf,
        bytes: u64,
    },
    AlreadyDownloaded { id: PackageIdentifier },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed {
        id: PackageIdentifier,
        path: PathBuf,
        /// Number of top-level entries copied
        entries: usize,
    },
    AlreadyInstalled { id: PackageIdentifier },
    /// The package has not been fetched
    NotFound { id: PackageIdentifier },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    Built {
        id: PackageIdentifier,
        command: String,
    },
    NoBuildScript { id: PackageIdentifier },
    /// No manifest in the installed area
    NotInstalled { id: PackageIdentifier },
}

impl FetchOutcome {
    pub fn exit_class(&self) -> ExitClass {
        match self {
            FetchOutcome::Downloaded { .. } => ExitClass::Success,
            FetchOutcome::AlreadyDownloaded { .. } => ExitClass::AlreadyDone,
        }
    }
}

impl InstallOutcome {
    pub fn exit_class(&self) -> ExitClass {
        match self {
            InstallOutcome::Installed { .. } => ExitClass::Success,
            InstallOutcome::AlreadyInstalled { .. } => ExitClass::AlreadyDone,
            InstallOutcome::NotFound { .. } => ExitClass::NotFound,
        }
    }
}

impl BuildOutcome {
    pub fn exit_class(&self) -> ExitClass {
        match self {
            BuildOutcome::Built { .. } => ExitClass::Success,
            BuildOutcome::NoBuildScript { .. } | BuildOutcome::NotInstalled { .. } => {
                ExitClass::NotFound
            }
        }
    }
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchOutcome::Downloaded { id, .. } => write!(f, "Package {id} downloaded."),
            FetchOutcome::AlreadyDownloaded { id } => {
                write!(f, "Package {id} is already downloaded.")
            }
        }
    }
}

impl fmt::Display for InstallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallOutcome::Installed { id, .. } => write!(f, "Package {id} installed."),
            InstallOutcome::AlreadyInstalled { id } => {
                write!(f, "Package {id} is already installed.")
            }
            InstallOutcome::NotFound { id } => write!(f, "Package {id} not found."),
        }
    }
}

impl fmt::Display for BuildOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildOutcome::Built { id, .. } => write!(f, "Package {id} built."),
            BuildOutcome::NoBuildScript { id } => {
                write!(f, "No build script found for package {id}.")
            }
            BuildOutcome::NotInstalled { id } => write!(f, "Package {id} is not installed."),
        }
    }
}
