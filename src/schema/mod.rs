//! Declarative environment-variable schema.
//!
//! A [`Schema`] is an ordered list of [`SchemaEntry`] values keyed by unique
//! variable name. Schemas are built once, either through the
//! [`loader`] from a TOML or JSON document or programmatically via
//! [`Schema::from_entries`], and are immutable afterwards. Both paths share
//! the same structural validation, so an invalid schema never reaches the
//! rule engine.

pub mod error;
pub mod format;
pub mod loader;
pub mod version;

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub use error::{EntryLocation, SchemaError, TextPosition};
pub use format::{SchemaFormat, SchemaSource};
pub use loader::{load_schema, parse_schema};
pub use version::SchemaVersion;

/// The closed set of value kinds a schema entry can declare.
///
/// The rule engine matches exhaustively on this enum, so adding a kind is a
/// compile-time change everywhere a value is checked.
#[derive(Clone, Debug, PartialEq)]
pub enum VariableKind {
    /// Any string value.
    String,
    /// A base-10 signed 64-bit integer with an optional leading `-`.
    Int,
    /// A finite floating-point number.
    Float,
    /// One of `true`, `false`, `1`, `0`, `yes`, `no` (case-insensitive).
    Bool,
    /// An absolute URL with a scheme and a host.
    Url,
    /// One of a fixed, non-empty set of strings.
    Enum {
        /// Accepted values, compared by exact string match.
        allowed: Vec<String>,
    },
    /// A string fully matching a regular expression.
    Regex {
        /// The compiled pattern.
        pattern: Pattern,
    },
}

impl VariableKind {
    /// Returns the schema-file keyword for this kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use env_lint::schema::VariableKind;
    ///
    /// assert_eq!(VariableKind::Int.keyword(), "int");
    /// assert_eq!(VariableKind::Url.keyword(), "url");
    /// ```
    #[must_use]
    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Url => "url",
            Self::Enum { .. } => "enum",
            Self::Regex { .. } => "regex",
        }
    }

    const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int | Self::Float)
    }
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A regular expression that must match a whole value.
///
/// The source text is kept for reporting; matching uses an anchored copy so
/// that `[a-z]+` rejects `abc1` rather than finding a partial match.
#[derive(Clone, Debug)]
pub struct Pattern {
    source: String,
    anchored: Regex,
}

impl Pattern {
    /// Compile a pattern.
    ///
    /// # Errors
    ///
    /// Returns the regex compilation error when `source` is not a valid
    /// pattern.
    ///
    /// # Examples
    ///
    /// ```
    /// use env_lint::schema::Pattern;
    ///
    /// let pattern = Pattern::new("[a-z]+").expect("valid pattern");
    /// assert!(pattern.is_full_match("abc"));
    /// assert!(!pattern.is_full_match("abc1"));
    /// ```
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        // Validate the pattern on its own first so error messages point at
        // the user's text rather than the anchored wrapper.
        Regex::new(source)?;
        // A verbose-mode `#` comment at the end of `source` would swallow
        // the closing wrapper; the newline ends the comment and is ignored
        // as whitespace under `(?x)`.
        let anchored = Regex::new(&format!("^(?:{source})$"))
            .or_else(|_| Regex::new(&format!("^(?:{source}\n)$")))?;
        Ok(Self {
            source: source.to_owned(),
            anchored,
        })
    }

    /// Returns the pattern as written in the schema.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns true when the whole of `value` matches the pattern.
    #[must_use]
    pub fn is_full_match(&self, value: &str) -> bool {
        self.anchored.is_match(value)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// An inclusive numeric bound for `int` and `float` entries.
///
/// Schema files may write either an integer or a float; `int` entries only
/// accept integral bounds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericBound {
    /// An integral bound.
    Int(i64),
    /// A fractional bound.
    Float(f64),
}

impl NumericBound {
    /// Returns the bound as a float for comparison against `float` values.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "bounds beyond 2^53 lose precision exactly as the parsed float values do"
    )]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(value) => value as f64,
            Self::Float(value) => value,
        }
    }
}

impl fmt::Display for NumericBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
        }
    }
}

/// Additional checks applied once a value has passed its type check.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Constraints {
    /// Full-match pattern for `string` entries.
    pub pattern: Option<Pattern>,
    /// Inclusive lower bound for numeric entries.
    pub min: Option<NumericBound>,
    /// Inclusive upper bound for numeric entries.
    pub max: Option<NumericBound>,
    /// Exact length in characters.
    pub length: Option<usize>,
    /// Minimum length in characters.
    pub min_length: Option<usize>,
    /// Maximum length in characters.
    pub max_length: Option<usize>,
}

impl Constraints {
    /// Returns true when no constraint is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pattern.is_none()
            && self.min.is_none()
            && self.max.is_none()
            && self.length.is_none()
            && self.min_length.is_none()
            && self.max_length.is_none()
    }
}

/// One expected environment variable.
///
/// # Examples
///
/// ```
/// use env_lint::schema::{SchemaEntry, VariableKind};
///
/// let entry = SchemaEntry::new("PORT", VariableKind::Int)
///     .required()
///     .with_default("8080");
/// assert!(entry.required);
/// assert_eq!(entry.default.as_deref(), Some("8080"));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SchemaEntry {
    /// Variable name; unique within a schema.
    pub name: String,
    /// Whether the variable must be present when no default is declared.
    pub required: bool,
    /// Declared value kind.
    pub kind: VariableKind,
    /// Value used when the variable is absent. Still type-checked.
    pub default: Option<String>,
    /// Message replacing generated type and constraint failure text.
    pub message: Option<String>,
    /// Redact values from messages.
    pub sensitive: bool,
    /// Extra checks applied after the type check.
    pub constraints: Constraints,
}

impl SchemaEntry {
    /// Create an optional entry with no default and no constraints.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: VariableKind) -> Self {
        Self {
            name: name.into(),
            required: false,
            kind,
            default: None,
            message: None,
            sensitive: false,
            constraints: Constraints::default(),
        }
    }

    /// Mark the entry as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the default value.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Set a custom failure message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Mark the entry's values as sensitive.
    #[must_use]
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Replace the entry's constraints.
    #[must_use]
    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Check the entry's own invariants, returning the offending field and a
    /// reason on failure.
    fn check_invariants(&self) -> Result<(), (&'static str, String)> {
        if self.name.is_empty() {
            return Err(("name", "must not be empty".to_owned()));
        }
        if !is_variable_name(&self.name) {
            return Err((
                "name",
                "must start with a letter or underscore and contain only ASCII letters, digits, and underscores"
                    .to_owned(),
            ));
        }
        if let VariableKind::Enum { allowed } = &self.kind {
            check_allowed(allowed)?;
        }
        self.check_constraints()
    }

    fn check_constraints(&self) -> Result<(), (&'static str, String)> {
        let constraints = &self.constraints;

        if constraints.pattern.is_some() && self.kind != VariableKind::String {
            return Err((
                "pattern",
                format!(
                    "only applies to string entries; use type \"regex\" instead of \"{}\"",
                    self.kind
                ),
            ));
        }

        for (field, bound) in [("min", constraints.min), ("max", constraints.max)] {
            let Some(bound) = bound else { continue };
            if !self.kind.is_numeric() {
                return Err((field, format!("does not apply to {} entries", self.kind)));
            }
            if self.kind == VariableKind::Int && matches!(bound, NumericBound::Float(_)) {
                return Err((field, format!("must be an integer for int entries, got {bound}")));
            }
        }

        if let (Some(min), Some(max)) = (constraints.min, constraints.max) {
            if min.as_f64() > max.as_f64() {
                return Err(("min", format!("{min} is greater than max {max}")));
            }
        }

        if constraints.length.is_some()
            && (constraints.min_length.is_some() || constraints.max_length.is_some())
        {
            return Err((
                "length",
                "cannot be combined with min_length or max_length".to_owned(),
            ));
        }

        if let (Some(min), Some(max)) = (constraints.min_length, constraints.max_length) {
            if min > max {
                return Err((
                    "min_length",
                    format!("{min} is greater than max_length {max}"),
                ));
            }
        }

        Ok(())
    }
}

fn check_allowed(allowed: &[String]) -> Result<(), (&'static str, String)> {
    if allowed.is_empty() {
        return Err((
            "allowed",
            "must list at least one value for enum entries".to_owned(),
        ));
    }
    for (position, value) in allowed.iter().enumerate() {
        if allowed.iter().take(position).any(|earlier| earlier == value) {
            return Err(("allowed", format!("lists '{value}' more than once")));
        }
    }
    Ok(())
}

/// Returns true when `name` is a portable environment variable identifier.
///
/// # Examples
///
/// ```
/// use env_lint::schema::is_variable_name;
///
/// assert!(is_variable_name("DATABASE_URL"));
/// assert!(is_variable_name("_private"));
/// assert!(!is_variable_name("9LIVES"));
/// assert!(!is_variable_name("WITH-DASH"));
/// ```
#[must_use]
pub fn is_variable_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// An ordered, validated collection of schema entries.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Schema {
    entries: Vec<SchemaEntry>,
}

impl Schema {
    /// Build a schema, validating every entry and rejecting duplicate names.
    ///
    /// Entry positions in errors are 1-based to match what a user counts in
    /// the schema file.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidEntry`] for the first entry breaking an
    /// invariant and [`SchemaError::DuplicateName`] when a name repeats.
    ///
    /// # Examples
    ///
    /// ```
    /// use env_lint::schema::{Schema, SchemaEntry, SchemaError, VariableKind};
    ///
    /// let schema = Schema::from_entries(vec![
    ///     SchemaEntry::new("PORT", VariableKind::Int),
    ///     SchemaEntry::new("HOST", VariableKind::String),
    /// ])
    /// .expect("valid schema");
    /// assert_eq!(schema.len(), 2);
    ///
    /// let err = Schema::from_entries(vec![
    ///     SchemaEntry::new("PORT", VariableKind::Int),
    ///     SchemaEntry::new("PORT", VariableKind::String),
    /// ])
    /// .expect_err("duplicates are rejected");
    /// assert!(matches!(err, SchemaError::DuplicateName { .. }));
    /// ```
    pub fn from_entries(entries: Vec<SchemaEntry>) -> Result<Self, SchemaError> {
        for (position, entry) in entries.iter().enumerate() {
            entry
                .check_invariants()
                .map_err(|(field, reason)| SchemaError::InvalidEntry {
                    location: EntryLocation::new(position, Some(&entry.name)),
                    field,
                    reason,
                })?;

            if let Some(first) = entries
                .iter()
                .take(position)
                .position(|earlier| earlier.name == entry.name)
            {
                return Err(SchemaError::DuplicateName {
                    name: entry.name.clone(),
                    first: first + 1,
                    second: position + 1,
                });
            }
        }

        Ok(Self { entries })
    }

    /// Returns the entries in declaration order.
    #[must_use]
    pub fn entries(&self) -> &[SchemaEntry] {
        &self.entries
    }

    /// Look up an entry by variable name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SchemaEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the schema declares no variables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
