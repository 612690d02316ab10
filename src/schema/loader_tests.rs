//! Unit tests for schema document loading.

use super::*;
use camino::Utf8PathBuf;
use rstest::rstest;

fn toml(text: &str) -> Result<Schema, SchemaError> {
    parse_schema(text, SchemaFormat::Toml)
}

fn json(text: &str) -> Result<Schema, SchemaError> {
    parse_schema(text, SchemaFormat::Json)
}

const SERVICE_TOML: &str = r#"
version = 1

[[variables]]
name = "DATABASE_URL"
type = "url"
required = true
sensitive = true

[[variables]]
name = "PORT"
type = "int"
default = 8080
min = 1
max = 65535

[[variables]]
name = "LOG_LEVEL"
type = "enum"
allowed = ["debug", "info", "warn"]
default = "info"

[[variables]]
name = "RELEASE"
type = "regex"
pattern = "v[0-9]+\\.[0-9]+"
message = "RELEASE must look like v1.2"

[[variables]]
name = "API_TOKEN"
pattern = "[A-Za-z0-9]+"
min_length = 32
"#;

#[rstest]
fn loads_a_full_toml_schema() {
    let schema = toml(SERVICE_TOML).expect("valid schema");

    assert_eq!(schema.len(), 5);

    let database = schema.get("DATABASE_URL").expect("DATABASE_URL entry");
    assert!(database.required);
    assert!(database.sensitive);
    assert_eq!(database.kind, VariableKind::Url);

    let port = schema.get("PORT").expect("PORT entry");
    assert_eq!(port.default.as_deref(), Some("8080"));
    assert_eq!(port.constraints.min, Some(NumericBound::Int(1)));
    assert_eq!(port.constraints.max, Some(NumericBound::Int(65_535)));

    let release = schema.get("RELEASE").expect("RELEASE entry");
    assert!(matches!(&release.kind, VariableKind::Regex { pattern } if pattern.as_str() == "v[0-9]+\\.[0-9]+"));
    assert!(release.constraints.pattern.is_none());
    assert_eq!(release.message.as_deref(), Some("RELEASE must look like v1.2"));

    let token = schema.get("API_TOKEN").expect("API_TOKEN entry");
    assert_eq!(token.kind, VariableKind::String);
    assert!(token.constraints.pattern.is_some());
    assert_eq!(token.constraints.min_length, Some(32));
}

#[rstest]
fn loads_json_with_camel_case_aliases() {
    let schema = json(
        r#"{
            "variables": [
                {
                    "name": "SECRET",
                    "type": "string",
                    "minLength": 8,
                    "maxLength": 64,
                    "customError": "SECRET must be 8 to 64 characters"
                }
            ]
        }"#,
    )
    .expect("valid schema");

    let secret = schema.get("SECRET").expect("SECRET entry");
    assert_eq!(secret.constraints.min_length, Some(8));
    assert_eq!(secret.constraints.max_length, Some(64));
    assert_eq!(
        secret.message.as_deref(),
        Some("SECRET must be 8 to 64 characters")
    );
}

#[rstest]
#[case::integer("default = 3", "3")]
#[case::boolean("default = true", "true")]
#[case::quoted_float("default = \"1.0\"", "1.0")]
#[case::text("default = \"x\"", "x")]
fn scalar_defaults_become_text(#[case] line: &str, #[case] expected: &str) {
    let schema = toml(&format!("[[variables]]\nname = \"V\"\n{line}\n")).expect("valid schema");

    assert_eq!(
        schema.get("V").and_then(|e| e.default.as_deref()),
        Some(expected)
    );
}

#[rstest]
fn enum_values_may_be_numbers() {
    let schema = toml("[[variables]]\nname = \"LEVEL\"\ntype = \"enum\"\nallowed = [1, 2, 3]\n")
        .expect("valid schema");

    assert_eq!(
        schema.get("LEVEL").map(|e| &e.kind),
        Some(&VariableKind::Enum {
            allowed: vec!["1".to_owned(), "2".to_owned(), "3".to_owned()],
        })
    );
}

#[rstest]
#[case::toml_default(SchemaFormat::Toml, "[[variables]]\nname = \"RATIO\"\ntype = \"float\"\ndefault = 1.0\n", "default")]
#[case::json_default(SchemaFormat::Json, r#"{"variables": [{"name": "RATIO", "type": "float", "default": 0.50}]}"#, "default")]
#[case::toml_allowed(SchemaFormat::Toml, "[[variables]]\nname = \"RATIO\"\ntype = \"enum\"\nallowed = [\"1\", 1.0]\n", "allowed")]
fn unquoted_fractional_scalars_are_rejected(
    #[case] format: SchemaFormat,
    #[case] text: &str,
    #[case] expected_field: &str,
) {
    let err = parse_schema(text, format).expect_err("unquoted float");
    assert!(err.to_string().contains("must be quoted"), "unexpected message: {err}");

    match err {
        SchemaError::InvalidEntry {
            location, field, ..
        } => {
            assert_eq!(location.name.as_deref(), Some("RATIO"));
            assert_eq!(field, expected_field);
        }
        other => panic!("expected InvalidEntry, got {other:?}"),
    }
}

#[rstest]
fn quoted_fractional_values_keep_their_digits() {
    let schema = toml("[[variables]]\nname = \"RATIO\"\ntype = \"enum\"\nallowed = [\"1.0\", \"0.50\"]\ndefault = \"1.0\"\n")
        .expect("valid schema");
    let ratio = schema.get("RATIO").expect("RATIO entry");

    assert_eq!(ratio.default.as_deref(), Some("1.0"));
    assert_eq!(
        ratio.kind,
        VariableKind::Enum {
            allowed: vec!["1.0".to_owned(), "0.50".to_owned()],
        }
    );
}

#[rstest]
fn missing_type_defaults_to_string() {
    let schema = json(r#"{"variables": [{"name": "HOST"}]}"#).expect("valid schema");
    assert_eq!(schema.get("HOST").map(|e| &e.kind), Some(&VariableKind::String));
}

#[rstest]
#[case::toml_empty(SchemaFormat::Toml, "")]
#[case::toml_version_only(SchemaFormat::Toml, "version = 1\n")]
#[case::json_empty_list(SchemaFormat::Json, r#"{"variables": []}"#)]
fn documents_without_variables_are_empty(#[case] format: SchemaFormat, #[case] text: &str) {
    assert!(parse_schema(text, format).expect("valid schema").is_empty());
}

// -------------------------------------------------------------------------
// Rejections
// -------------------------------------------------------------------------

#[rstest]
fn toml_syntax_errors_carry_a_position() {
    let err = toml("[[variables]]\nname = \"PORT\"\ntype = \n").expect_err("malformed TOML");

    match err {
        SchemaError::Syntax {
            format, position, ..
        } => {
            assert_eq!(format, SchemaFormat::Toml);
            let position = position.expect("TOML errors carry a span");
            assert_eq!(position.line, 3);
        }
        other => panic!("expected Syntax, got {other:?}"),
    }
}

#[rstest]
fn json_syntax_errors_carry_a_position() {
    let err = json("{\n  \"variables\": [\n    {\"name\": }\n  ]\n}").expect_err("malformed JSON");

    match err {
        SchemaError::Syntax {
            format,
            position: Some(position),
            message,
        } => {
            assert_eq!(format, SchemaFormat::Json);
            assert_eq!(position.line, 3);
            assert!(!message.contains(" at line "), "position is not repeated: {message}");
        }
        other => panic!("expected Syntax with a position, got {other:?}"),
    }
}

#[rstest]
#[case::document("version = 1\nextra = true\n")]
#[case::entry("[[variables]]\nname = \"A\"\nrequird = true\n")]
fn unknown_fields_are_rejected(#[case] text: &str) {
    assert!(matches!(toml(text), Err(SchemaError::Syntax { .. })));
}

#[rstest]
fn unknown_type_is_rejected() {
    let err = json(r#"{"variables": [{"name": "A", "type": "duration"}]}"#)
        .expect_err("unknown type");
    assert!(matches!(err, SchemaError::Syntax { .. }));
}

#[rstest]
#[case(0)]
#[case(2)]
fn unsupported_versions_are_rejected(#[case] version: u32) {
    let err = toml(&format!("version = {version}\n")).expect_err("unsupported version");
    assert!(matches!(err, SchemaError::UnsupportedVersion { found, max: 1 } if found == version));
}

#[rstest]
fn missing_name_reports_the_position() {
    let err = toml("[[variables]]\nname = \"A\"\n\n[[variables]]\ntype = \"int\"\n")
        .expect_err("nameless entry");

    assert_eq!(err.to_string(), "schema entry #2: field `name` is required");
}

#[rstest]
fn allowed_requires_an_enum_entry() {
    let err = toml("[[variables]]\nname = \"MODE\"\nallowed = [\"a\"]\n").expect_err("allowed on string");
    assert!(matches!(err, SchemaError::InvalidEntry { field: "allowed", .. }));
}

#[rstest]
fn regex_entries_need_a_pattern() {
    let err = toml("[[variables]]\nname = \"TAG\"\ntype = \"regex\"\n").expect_err("no pattern");
    assert_eq!(
        err.to_string(),
        "schema entry #1 (TAG): field `pattern` is required for regex entries"
    );
}

#[rstest]
fn invalid_regex_names_the_entry() {
    let err = toml("[[variables]]\nname = \"TAG\"\ntype = \"regex\"\npattern = \"(v\"\n")
        .expect_err("bad regex");

    match err {
        SchemaError::InvalidEntry {
            location,
            field,
            reason,
        } => {
            assert_eq!(location.name.as_deref(), Some("TAG"));
            assert_eq!(field, "pattern");
            assert!(reason.starts_with("is not a valid regular expression"));
        }
        other => panic!("expected InvalidEntry, got {other:?}"),
    }
}

#[rstest]
fn pattern_on_int_entry_is_rejected() {
    let err = toml("[[variables]]\nname = \"PORT\"\ntype = \"int\"\npattern = \"[0-9]+\"\n")
        .expect_err("pattern on int");
    assert!(matches!(err, SchemaError::InvalidEntry { field: "pattern", .. }));
}

#[rstest]
fn duplicate_names_are_rejected() {
    let err = json(r#"{"variables": [{"name": "A"}, {"name": "A", "type": "int"}]}"#)
        .expect_err("duplicate");
    assert!(matches!(
        err,
        SchemaError::DuplicateName {
            first: 1,
            second: 2,
            ..
        }
    ));
}

// -------------------------------------------------------------------------
// Sources
// -------------------------------------------------------------------------

fn temp_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> Utf8PathBuf {
    let path = Utf8PathBuf::from_path_buf(dir.path().join(name)).expect("temp path should be UTF-8");
    std::fs::write(&path, contents).expect("write schema");
    path
}

#[rstest]
#[case::toml("env-schema.toml", "[[variables]]\nname = \"PORT\"\ntype = \"int\"\n")]
#[case::json("env-schema.JSON", r#"{"variables": [{"name": "PORT", "type": "int"}]}"#)]
fn loads_files_by_extension(#[case] name: &str, #[case] contents: &str) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = temp_file(&dir, name, contents);

    let schema = load_schema(&SchemaSource::from(path)).expect("schema should load");
    assert_eq!(schema.get("PORT").map(|e| &e.kind), Some(&VariableKind::Int));
}

#[rstest]
fn unsupported_extension_is_rejected_before_reading() {
    let err = load_schema(&SchemaSource::Path(Utf8PathBuf::from("does-not-exist.yaml")))
        .expect_err("yaml is unsupported");
    assert!(matches!(err, SchemaError::UnsupportedFormat { .. }));
}

#[rstest]
fn missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path =
        Utf8PathBuf::from_path_buf(dir.path().join("absent.toml")).expect("temp path should be UTF-8");

    let err = load_schema(&SchemaSource::Path(path)).expect_err("missing file");
    assert!(matches!(err, SchemaError::Read { .. }));
}
