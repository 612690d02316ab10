//! Layout versions of schema documents.
//!
//! The top-level `version` key selects how the `variables` list is read.
//! Documents that omit the key are read with the newest layout, and
//! `generate-schema` always writes it.

use std::fmt;

use super::error::SchemaError;

/// A schema document layout this build can read.
///
/// # Examples
///
/// ```
/// use env_lint::schema::SchemaVersion;
///
/// assert_eq!(SchemaVersion::from_declared(None).ok(), Some(SchemaVersion::V1));
/// assert_eq!(SchemaVersion::LATEST.number(), 1);
/// assert!(SchemaVersion::from_declared(Some(2)).is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SchemaVersion {
    /// A flat `variables` list; each entry carries its type, default and
    /// constraints inline.
    #[default]
    V1,
}

impl SchemaVersion {
    /// The layout written by `generate-schema`.
    pub const LATEST: Self = Self::V1;

    /// Resolve a document's `version` key.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnsupportedVersion`] for any number other than
    /// a known layout, including 0.
    pub fn from_declared(declared: Option<u32>) -> Result<Self, SchemaError> {
        match declared {
            None | Some(1) => Ok(Self::V1),
            Some(found) => Err(SchemaError::UnsupportedVersion {
                found,
                max: Self::LATEST.number(),
            }),
        }
    }

    /// The number written in the `version` key.
    #[must_use]
    pub const fn number(self) -> u32 {
        match self {
            Self::V1 => 1,
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.number())
    }
}
