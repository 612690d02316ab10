//! Schema load errors.
//!
//! Every variant is fatal: a schema that fails to load aborts the run before
//! the environment is read. Variants carry enough location detail (line and
//! column for syntax errors, entry position and field for structural errors)
//! to point the user at the offending text.

use std::fmt;

use camino::Utf8PathBuf;
use thiserror::Error;

use super::format::SchemaFormat;

/// A 1-based line and column within a schema document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextPosition {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number, counted in characters.
    pub column: usize,
}

impl TextPosition {
    /// Locate a byte offset within `text`.
    ///
    /// Offsets past the end of `text` resolve to the final position.
    ///
    /// # Examples
    ///
    /// ```
    /// use env_lint::schema::TextPosition;
    ///
    /// let position = TextPosition::from_offset("a = 1\nb = ?\n", 10);
    /// assert_eq!(position, TextPosition { line: 2, column: 5 });
    /// ```
    #[must_use]
    pub fn from_offset(text: &str, offset: usize) -> Self {
        let mut line = 1;
        let mut column = 1;
        for (index, character) in text.char_indices() {
            if index >= offset {
                break;
            }
            if character == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Self { line, column }
    }
}

impl fmt::Display for TextPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Identifies a schema entry by its 1-based position and, when known, name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryLocation {
    /// 1-based position in the `variables` list.
    pub index: usize,
    /// Declared name, if the entry has a usable one.
    pub name: Option<String>,
}

impl EntryLocation {
    /// Build a location from a 0-based position.
    #[must_use]
    pub fn new(position: usize, name: Option<&str>) -> Self {
        Self {
            index: position + 1,
            name: name.filter(|name| !name.is_empty()).map(str::to_owned),
        }
    }
}

impl fmt::Display for EntryLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "entry #{} ({name})", self.index),
            None => write!(f, "entry #{}", self.index),
        }
    }
}

/// Errors raised while loading a schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The schema file could not be read.
    #[error("failed to read schema {path}")]
    Read {
        /// Path that was read.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The schema file extension does not name a supported format.
    #[error("unsupported schema format for {path}; expected a .toml or .json file")]
    UnsupportedFormat {
        /// Path with the unrecognised extension.
        path: Utf8PathBuf,
    },

    /// The document is not well-formed or does not match the schema layout.
    #[error("invalid {format} schema{}: {message}", describe_position(.position.as_ref()))]
    Syntax {
        /// Document format being parsed.
        format: SchemaFormat,
        /// Location of the error, when the parser reports one.
        position: Option<TextPosition>,
        /// Parser message.
        message: String,
    },

    /// The document declares a schema version this build cannot read.
    #[error("unsupported schema version {found}; this build reads versions 1 to {max}")]
    UnsupportedVersion {
        /// Declared version.
        found: u32,
        /// Highest supported version.
        max: u32,
    },

    /// An entry breaks a structural invariant.
    #[error("schema {location}: field `{field}` {reason}")]
    InvalidEntry {
        /// Offending entry.
        location: EntryLocation,
        /// Offending field.
        field: &'static str,
        /// What is wrong with the field.
        reason: String,
    },

    /// Two entries declare the same variable name.
    #[error("duplicate variable {name} declared by entries #{first} and #{second}")]
    DuplicateName {
        /// Repeated variable name.
        name: String,
        /// 1-based position of the first declaration.
        first: usize,
        /// 1-based position of the repeated declaration.
        second: usize,
    },
}

fn describe_position(position: Option<&TextPosition>) -> String {
    position.map_or_else(String::new, |position| format!(" at {position}"))
}
