//! Schema document formats and sources.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;

/// Supported schema document formats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SchemaFormat {
    /// TOML with a `[[variables]]` array of tables.
    #[default]
    Toml,
    /// JSON with a `"variables"` array.
    Json,
}

impl SchemaFormat {
    /// Select a format from a file extension (case-insensitive).
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use env_lint::schema::SchemaFormat;
    ///
    /// assert_eq!(
    ///     SchemaFormat::from_path(Utf8Path::new("env-schema.toml")),
    ///     Some(SchemaFormat::Toml)
    /// );
    /// assert_eq!(
    ///     SchemaFormat::from_path(Utf8Path::new("schema.JSON")),
    ///     Some(SchemaFormat::Json)
    /// );
    /// assert_eq!(SchemaFormat::from_path(Utf8Path::new("schema.yaml")), None);
    /// ```
    #[must_use]
    pub fn from_path(path: &Utf8Path) -> Option<Self> {
        let extension = path.extension()?.to_ascii_lowercase();
        match extension.as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl fmt::Display for SchemaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Toml => f.write_str("TOML"),
            Self::Json => f.write_str("JSON"),
        }
    }
}

/// Where a schema is read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SchemaSource {
    /// A file whose extension selects the format.
    Path(Utf8PathBuf),
    /// Schema text supplied directly.
    Text {
        /// Document format.
        format: SchemaFormat,
        /// Document contents.
        contents: String,
    },
}

impl SchemaSource {
    /// Describe the source for log lines.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Path(path) => path.to_string(),
            Self::Text { format, .. } => format!("inline {format} text"),
        }
    }
}

impl From<Utf8PathBuf> for SchemaSource {
    fn from(path: Utf8PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Utf8Path> for SchemaSource {
    fn from(path: &Utf8Path) -> Self {
        Self::Path(path.to_owned())
    }
}
