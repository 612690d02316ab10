//! Generate-schema command implementation.
//!
//! Drafts a schema from an existing dotenv file. Every key becomes an
//! optional entry whose default is the file's value and whose type is
//! guessed from that value. The draft is a starting point: tighten `required`
//! flags, enums, and patterns by hand afterwards.

use std::io::Write;

use log::debug;
use serde::Serialize;

use crate::cli::GenerateArgs;
use crate::dotenv::{DotenvEntry, read_dotenv};
use crate::engine::{parse_float, parse_int};
use crate::error::{EnvLintError, Result};
use crate::schema::{
    NumericBound, Pattern, Schema, SchemaEntry, SchemaError, SchemaFormat, SchemaVersion,
    VariableKind,
};

const BOOL_WORDS: [&str; 4] = ["true", "false", "yes", "no"];

/// Guess the narrowest kind accepting `value`.
///
/// Checks run in order: boolean words, integer, finite float, string.
/// `1` and `0` are guessed as integers.
///
/// # Examples
///
/// ```
/// use env_lint::generate::infer_kind;
/// use env_lint::schema::VariableKind;
///
/// assert_eq!(infer_kind("Yes"), VariableKind::Bool);
/// assert_eq!(infer_kind("8080"), VariableKind::Int);
/// assert_eq!(infer_kind("0.75"), VariableKind::Float);
/// assert_eq!(infer_kind("localhost"), VariableKind::String);
/// ```
#[must_use]
pub fn infer_kind(value: &str) -> VariableKind {
    if BOOL_WORDS
        .iter()
        .any(|word| word.eq_ignore_ascii_case(value))
    {
        VariableKind::Bool
    } else if parse_int(value).is_some() {
        VariableKind::Int
    } else if parse_float(value).is_some() {
        VariableKind::Float
    } else {
        VariableKind::String
    }
}

/// Build a draft schema from dotenv assignments.
///
/// Repeated keys keep their first position and their last value, matching
/// how the file would be loaded.
///
/// # Errors
///
/// Returns [`SchemaError`] if the draft breaks a schema invariant.
pub fn infer_schema(entries: &[DotenvEntry]) -> std::result::Result<Schema, SchemaError> {
    let mut drafts: Vec<SchemaEntry> = Vec::with_capacity(entries.len());

    for entry in entries {
        let draft = SchemaEntry::new(&entry.key, infer_kind(&entry.value)).with_default(&entry.value);
        match drafts.iter_mut().find(|existing| existing.name == entry.key) {
            Some(existing) => {
                debug!("{} is assigned again on line {}", entry.key, entry.line);
                *existing = draft;
            }
            None => drafts.push(draft),
        }
    }

    Schema::from_entries(drafts)
}

#[derive(Serialize)]
struct SchemaDocument<'a> {
    version: u32,
    variables: Vec<VariableView<'a>>,
}

#[derive(Serialize)]
struct VariableView<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    default: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    allowed: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pattern: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min: Option<NumericBound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max: Option<NumericBound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    sensitive: bool,
}

impl<'a> VariableView<'a> {
    fn new(entry: &'a SchemaEntry) -> Self {
        let (allowed, kind_pattern) = match &entry.kind {
            VariableKind::Enum { allowed } => (Some(allowed.as_slice()), None),
            VariableKind::Regex { pattern } => (None, Some(pattern.as_str())),
            _ => (None, None),
        };
        let constraints = &entry.constraints;

        Self {
            name: &entry.name,
            kind: entry.kind.keyword(),
            required: entry.required,
            default: entry.default.as_deref(),
            allowed,
            pattern: kind_pattern.or_else(|| constraints.pattern.as_ref().map(Pattern::as_str)),
            min: constraints.min,
            max: constraints.max,
            length: constraints.length,
            min_length: constraints.min_length,
            max_length: constraints.max_length,
            message: entry.message.as_deref(),
            sensitive: entry.sensitive,
        }
    }
}

/// Serialise a schema in the given format.
///
/// The output loads back through [`crate::schema::parse_schema`] to an
/// equal schema.
///
/// # Errors
///
/// Returns [`EnvLintError::Render`] if serialisation fails.
///
/// # Examples
///
/// ```
/// use env_lint::generate::render_schema;
/// use env_lint::schema::{Schema, SchemaEntry, SchemaFormat, VariableKind};
///
/// let schema = Schema::from_entries(vec![
///     SchemaEntry::new("PORT", VariableKind::Int).with_default("8080"),
/// ])
/// .expect("valid schema");
///
/// let toml = render_schema(&schema, SchemaFormat::Toml).expect("schema should render");
/// assert!(toml.contains("[[variables]]"));
/// assert!(toml.contains("name = \"PORT\""));
/// ```
pub fn render_schema(schema: &Schema, format: SchemaFormat) -> Result<String> {
    let document = SchemaDocument {
        version: SchemaVersion::LATEST.number(),
        variables: schema.entries().iter().map(VariableView::new).collect(),
    };

    let rendered = match format {
        SchemaFormat::Toml => toml::to_string(&document).map_err(|err| EnvLintError::Render {
            reason: err.to_string(),
        })?,
        SchemaFormat::Json => {
            serde_json::to_string_pretty(&document).map_err(|err| EnvLintError::Render {
                reason: err.to_string(),
            })?
        }
    };
    Ok(rendered)
}

/// Generates a schema from the dotenv file named in `args` and writes it to
/// `stdout`.
///
/// # Errors
///
/// Returns an error if:
/// - The dotenv file cannot be read or parsed
/// - The draft cannot be rendered
/// - Writing to stdout fails
pub fn run_generate(args: &GenerateArgs, stdout: &mut dyn Write) -> Result<()> {
    let entries = read_dotenv(&args.env_file).map_err(|source| EnvLintError::EnvFile {
        path: args.env_file.clone(),
        source,
    })?;
    let schema = infer_schema(&entries)?;
    debug!(
        "drafted {} variable(s) from {}",
        schema.len(),
        args.env_file
    );

    let mut output = render_schema(&schema, args.format)?;
    if !output.ends_with('\n') {
        output.push('\n');
    }
    stdout
        .write_all(output.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|source| EnvLintError::WriteFailed { source })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dotenv::parse_dotenv;
    use crate::schema::{Constraints, parse_schema};
    use camino::Utf8PathBuf;
    use rstest::rstest;

    fn draft(text: &str) -> Schema {
        infer_schema(&parse_dotenv(text).expect("dotenv should parse")).expect("draft is valid")
    }

    #[rstest]
    #[case::true_word("TRUE", VariableKind::Bool)]
    #[case::no_word("no", VariableKind::Bool)]
    #[case::one("1", VariableKind::Int)]
    #[case::negative("-3", VariableKind::Int)]
    #[case::huge("123456789012345678901234", VariableKind::Float)]
    #[case::fraction("2.5", VariableKind::Float)]
    #[case::infinity("inf", VariableKind::String)]
    #[case::empty("", VariableKind::String)]
    #[case::url("https://example.com", VariableKind::String)]
    fn guesses_kinds(#[case] value: &str, #[case] expected: VariableKind) {
        assert_eq!(infer_kind(value), expected);
    }

    #[rstest]
    fn entries_are_optional_with_file_defaults() {
        let schema = draft("PORT=8080\nDEBUG=false\n");

        let port = schema.get("PORT").expect("PORT entry");
        assert!(!port.required);
        assert_eq!(port.kind, VariableKind::Int);
        assert_eq!(port.default.as_deref(), Some("8080"));
        assert_eq!(schema.get("DEBUG").map(|e| &e.kind), Some(&VariableKind::Bool));
    }

    #[rstest]
    fn repeated_keys_keep_first_position_and_last_value() {
        let schema = draft("A=1\nB=x\nA=two\n");

        let names: Vec<_> = schema.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
        let a = schema.get("A").expect("A entry");
        assert_eq!(a.default.as_deref(), Some("two"));
        assert_eq!(a.kind, VariableKind::String);
    }

    #[rstest]
    #[case::toml(SchemaFormat::Toml)]
    #[case::json(SchemaFormat::Json)]
    fn rendered_draft_loads_back(#[case] format: SchemaFormat) {
        let schema = draft("HOST=localhost\nPORT=5432\nRATIO=0.5\nTLS=yes\n");

        let rendered = render_schema(&schema, format).expect("draft should render");
        let loaded = parse_schema(&rendered, format).expect("rendered draft should load");

        assert_eq!(loaded, schema);
    }

    #[rstest]
    fn rendering_keeps_kind_payloads_and_constraints() {
        let schema = Schema::from_entries(vec![
            SchemaEntry::new(
                "MODE",
                VariableKind::Enum {
                    allowed: vec!["dev".to_owned(), "prod".to_owned()],
                },
            )
            .required(),
            SchemaEntry::new(
                "TAG",
                VariableKind::Regex {
                    pattern: Pattern::new("v[0-9]+").expect("valid pattern"),
                },
            ),
            SchemaEntry::new("PORT", VariableKind::Int)
                .with_message("PORT must be a port")
                .with_constraints(Constraints {
                    min: Some(NumericBound::Int(1)),
                    max: Some(NumericBound::Int(65_535)),
                    ..Constraints::default()
                }),
            SchemaEntry::new("TOKEN", VariableKind::String)
                .sensitive()
                .with_constraints(Constraints {
                    min_length: Some(32),
                    ..Constraints::default()
                }),
        ])
        .expect("valid schema");

        let rendered = render_schema(&schema, SchemaFormat::Toml).expect("schema should render");
        let loaded = parse_schema(&rendered, SchemaFormat::Toml).expect("schema should load");

        assert_eq!(loaded, schema);
        assert!(rendered.contains("sensitive = true"));
    }

    #[rstest]
    fn run_generate_writes_schema_to_stdout() {
        let dir = tempfile::tempdir().expect("tempdir");
        let env_file = Utf8PathBuf::from_path_buf(dir.path().join(".env"))
            .expect("temp path should be UTF-8");
        std::fs::write(&env_file, "export API_URL=https://api.example.com\n").expect("write env");

        let mut stdout = Vec::new();
        run_generate(
            &GenerateArgs {
                env_file,
                format: SchemaFormat::Json,
            },
            &mut stdout,
        )
        .expect("generate should succeed");

        let output = String::from_utf8(stdout).expect("output should be UTF-8");
        assert!(output.contains("\"name\": \"API_URL\""));
        assert!(output.contains("\"type\": \"string\""));
        assert!(output.ends_with('\n'));
    }

    #[rstest]
    fn run_generate_reports_missing_env_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let env_file = Utf8PathBuf::from_path_buf(dir.path().join("absent.env"))
            .expect("temp path should be UTF-8");

        let err = run_generate(
            &GenerateArgs {
                env_file,
                format: SchemaFormat::Toml,
            },
            &mut Vec::new(),
        )
        .expect_err("missing env file should fail");

        assert!(matches!(err, EnvLintError::EnvFile { .. }));
    }
}
