//! Package identity and the `<name>@v-<version>` addressing key
//!
//! The key is the single name a package has everywhere: the registry URL path
//! segment, the directory under the packages area and the directory under the
//! installed area. [`PackageIdentifier::key`] is the only place it is built.
//! On the command line a package may also be written `name@version`.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Separator between name and version inside the addressing key
const KEY_SEPARATOR: &str = "@v-";

/// Rejected identifier input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("Package {field} must not be empty")]
    Empty { field: &'static str },

    #[error(
        "Package {field} '{value}' contains '{invalid}'. \
         Allowed characters: letters, digits, '.', '_', '+', '-'"
    )]
    InvalidCharacter {
        field: &'static str,
        value: String,
        invalid: char,
    },

    #[error("Package {field} '{value}' must not start with '.'")]
    LeadingDot { field: &'static str, value: String },

    #[error("'{0}' is not of the form <name>@<version>")]
    MissingVersion(String),
}

/// A validated `(name, version)` pair
///
/// No normalisation is applied: `Demo` and `demo` are different packages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageIdentifier {
    name: String,
    version: String,
}

impl PackageIdentifier {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Result<Self, IdentifierError> {
        let name = name.into();
        let version = version.into();

        validate_segment("name", &name)?;
        validate_segment("version", &version)?;

        Ok(Self { name, version })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// The addressing key `<name>@v-<version>`
    pub fn key(&self) -> String {
        format!("{}{}{}", self.name, KEY_SEPARATOR, self.version)
    }
}

/// Displays as `name@version`, the form used in status lines
impl fmt::Display for PackageIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// Parses the `name@version` shorthand
impl FromStr for PackageIdentifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, version) = s
            .rsplit_once('@')
            .ok_or_else(|| IdentifierError::MissingVersion(s.to_string()))?;
        Self::new(name, version)
    }
}

fn validate_segment(field: &'static str, value: &str) -> Result<(), IdentifierError> {
    if value.is_empty() {
        return Err(IdentifierError::Empty { field });
    }

    if let Some(invalid) = value.chars().find(|c| !is_allowed(*c)) {
        return Err(IdentifierError::InvalidCharacter {
            field,
            value: value.to_string(),
            invalid,
        });
    }

    // Also rules out "." and ".."; staging directories use a leading dot
    if value.starts_with('.') {
        return Err(IdentifierError::LeadingDot {
            field,
            value: value.to_string(),
        });
    }

    Ok(())
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '+' | '-')
}
