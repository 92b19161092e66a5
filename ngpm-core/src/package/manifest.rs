//! Package manifest parsing (package.json)

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ManifestError;

/// Manifest file name inside a package directory
pub const MANIFEST_FILE: &str = "package.json";

/// A package manifest
///
/// Only the fields the pipeline reads are modelled; anything else in the file
/// is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    pub name: String,

    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scripts: Option<Scripts>,
}

/// The `scripts` table of a manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scripts {
    /// Shell command run by the build stage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
}

impl PackageManifest {
    /// Load manifest from a file path
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json(&content).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load manifest from a package directory
    pub fn from_dir(dir: &Path) -> Result<Self, ManifestError> {
        Self::from_file(&dir.join(MANIFEST_FILE))
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// The build command, if one is declared and non-blank
    pub fn build_script(&self) -> Option<&str> {
        self.scripts
            .as_ref()
            .and_then(|s| s.build.as_deref())
            .filter(|cmd| !cmd.trim().is_empty())
    }
}
