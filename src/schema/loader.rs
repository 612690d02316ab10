//! Schema document parsing.
//!
//! Documents are deserialised into private raw types that mirror the file
//! layout, then converted into validated [`Schema`] values. Syntax problems
//! surface with a line and column; structural problems name the entry and
//! field. Camel-case keys (`minLength`, `maxLength`, `customError`) are
//! accepted as aliases for their snake-case forms.

use log::debug;
use serde::Deserialize;

use super::error::{EntryLocation, SchemaError, TextPosition};
use super::format::{SchemaFormat, SchemaSource};
use super::version::SchemaVersion;
use super::{Constraints, NumericBound, Pattern, Schema, SchemaEntry, VariableKind};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDocument {
    #[serde(default)]
    version: Option<u32>,
    #[serde(default)]
    variables: Vec<RawEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawEntry {
    name: Option<String>,
    #[serde(rename = "type")]
    kind: RawKind,
    required: bool,
    default: Option<Scalar>,
    allowed: Option<Vec<Scalar>>,
    pattern: Option<String>,
    min: Option<NumericBound>,
    max: Option<NumericBound>,
    length: Option<usize>,
    #[serde(alias = "minLength")]
    min_length: Option<usize>,
    #[serde(alias = "maxLength")]
    max_length: Option<usize>,
    #[serde(alias = "customError")]
    message: Option<String>,
    sensitive: bool,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum RawKind {
    #[default]
    String,
    Int,
    Float,
    Bool,
    Url,
    Enum,
    Regex,
}

/// A scalar written where the schema expects a string value.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Returns the value as the text a variable would hold.
    ///
    /// Floats yield `None`: the parsed `f64` no longer carries the digits the
    /// author wrote (`1.0` would print as `1`), so they must be quoted.
    fn into_text(self) -> Option<String> {
        match self {
            Self::Bool(value) => Some(value.to_string()),
            Self::Int(value) => Some(value.to_string()),
            Self::Float(_) => None,
            Self::Text(value) => Some(value),
        }
    }
}

/// Load a schema from a file or from inline text.
///
/// # Errors
///
/// Returns [`SchemaError`] when the file cannot be read, its extension names
/// no supported format, or its contents fail to parse or validate.
///
/// # Examples
///
/// ```
/// use env_lint::schema::{SchemaFormat, SchemaSource, load_schema};
///
/// let source = SchemaSource::Text {
///     format: SchemaFormat::Json,
///     contents: r#"{"variables": [{"name": "PORT", "type": "int"}]}"#.to_owned(),
/// };
/// let schema = load_schema(&source).expect("valid schema");
/// assert_eq!(schema.len(), 1);
/// ```
pub fn load_schema(source: &SchemaSource) -> Result<Schema, SchemaError> {
    let schema = match source {
        SchemaSource::Path(path) => {
            let format = SchemaFormat::from_path(path)
                .ok_or_else(|| SchemaError::UnsupportedFormat { path: path.clone() })?;
            let contents = std::fs::read_to_string(path).map_err(|source| SchemaError::Read {
                path: path.clone(),
                source,
            })?;
            parse_schema(&contents, format)?
        }
        SchemaSource::Text { format, contents } => parse_schema(contents, *format)?,
    };

    debug!(
        "loaded schema from {} with {} variable(s)",
        source.describe(),
        schema.len()
    );
    Ok(schema)
}

/// Parse schema text in the given format.
///
/// An empty TOML document is a valid, empty schema.
///
/// # Errors
///
/// Returns [`SchemaError::Syntax`] for malformed documents,
/// [`SchemaError::UnsupportedVersion`] for unknown versions, and
/// [`SchemaError::InvalidEntry`] or [`SchemaError::DuplicateName`] for
/// structurally invalid entries.
///
/// # Examples
///
/// ```
/// use env_lint::schema::{SchemaError, SchemaFormat, parse_schema};
///
/// let schema = parse_schema(
///     "[[variables]]\nname = \"MODE\"\ntype = \"enum\"\nallowed = [\"dev\", \"prod\"]\n",
///     SchemaFormat::Toml,
/// )
/// .expect("valid schema");
/// assert!(schema.get("MODE").is_some());
///
/// let err = parse_schema(
///     "[[variables]]\nname = \"MODE\"\ntype = \"enum\"\n",
///     SchemaFormat::Toml,
/// )
/// .expect_err("enum entries need allowed values");
/// assert!(matches!(err, SchemaError::InvalidEntry { field: "allowed", .. }));
/// ```
pub fn parse_schema(text: &str, format: SchemaFormat) -> Result<Schema, SchemaError> {
    let document: RawDocument = match format {
        SchemaFormat::Toml => toml::from_str(text).map_err(|err| toml_syntax_error(text, &err))?,
        SchemaFormat::Json => serde_json::from_str(text).map_err(|err| json_syntax_error(&err))?,
    };

    let version = SchemaVersion::from_declared(document.version)?;
    debug!("parsing {format} schema, layout {version}");

    let entries = document
        .variables
        .into_iter()
        .enumerate()
        .map(|(position, raw)| build_entry(position, raw))
        .collect::<Result<Vec<_>, _>>()?;

    Schema::from_entries(entries)
}

fn toml_syntax_error(text: &str, err: &toml::de::Error) -> SchemaError {
    SchemaError::Syntax {
        format: SchemaFormat::Toml,
        position: err
            .span()
            .map(|span| TextPosition::from_offset(text, span.start)),
        message: err.message().trim_end().to_owned(),
    }
}

fn json_syntax_error(err: &serde_json::Error) -> SchemaError {
    let (line, column) = (err.line(), err.column());
    let rendered = err.to_string();
    let suffix = format!(" at line {line} column {column}");
    let message = rendered
        .strip_suffix(&suffix)
        .unwrap_or(&rendered)
        .to_owned();

    SchemaError::Syntax {
        format: SchemaFormat::Json,
        position: (line > 0).then_some(TextPosition { line, column }),
        message,
    }
}

fn build_entry(position: usize, raw: RawEntry) -> Result<SchemaEntry, SchemaError> {
    let RawEntry {
        name,
        kind,
        required,
        default,
        allowed,
        pattern,
        min,
        max,
        length,
        min_length,
        max_length,
        message,
        sensitive,
    } = raw;

    let Some(name) = name else {
        return Err(SchemaError::InvalidEntry {
            location: EntryLocation::new(position, None),
            field: "name",
            reason: "is required".to_owned(),
        });
    };
    let invalid = |field: &'static str, reason: String| SchemaError::InvalidEntry {
        location: EntryLocation::new(position, Some(&name)),
        field,
        reason,
    };

    if allowed.is_some() && kind != RawKind::Enum {
        return Err(invalid(
            "allowed",
            "only applies to enum entries".to_owned(),
        ));
    }

    let text = |field: &'static str, scalar: Scalar| {
        scalar.into_text().ok_or_else(|| {
            invalid(
                field,
                "fractional numbers must be quoted, e.g. \"0.25\"".to_owned(),
            )
        })
    };

    let compile = |source: &str| {
        Pattern::new(source).map_err(|err| {
            invalid(
                "pattern",
                format!("is not a valid regular expression: {err}"),
            )
        })
    };

    let variable_kind = match kind {
        RawKind::String => VariableKind::String,
        RawKind::Int => VariableKind::Int,
        RawKind::Float => VariableKind::Float,
        RawKind::Bool => VariableKind::Bool,
        RawKind::Url => VariableKind::Url,
        RawKind::Enum => VariableKind::Enum {
            allowed: allowed
                .unwrap_or_default()
                .into_iter()
                .map(|value| text("allowed", value))
                .collect::<Result<_, _>>()?,
        },
        RawKind::Regex => {
            let source = pattern.as_deref().ok_or_else(|| {
                invalid("pattern", "is required for regex entries".to_owned())
            })?;
            VariableKind::Regex {
                pattern: compile(source)?,
            }
        }
    };

    // For regex entries the pattern is the kind itself; elsewhere it is a
    // constraint, which only string entries accept.
    let string_pattern = if kind == RawKind::Regex {
        None
    } else {
        pattern.as_deref().map(compile).transpose()?
    };

    Ok(SchemaEntry {
        name: name.clone(),
        required,
        kind: variable_kind,
        default: default.map(|value| text("default", value)).transpose()?,
        message,
        sensitive,
        constraints: Constraints {
            pattern: string_pattern,
            min,
            max,
            length,
            min_length,
            max_length,
        },
    })
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
