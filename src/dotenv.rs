//! Dotenv file parsing.
//!
//! Supports the common subset of the format:
//!
//! - `KEY=VALUE` lines, with an optional leading `export`
//! - blank lines and `#` comment lines
//! - unquoted values, trimmed, with trailing ` # comment` text removed
//! - single-quoted values taken literally
//! - double-quoted values with `\n`, `\r`, `\t`, `\"`, and `\\` escapes
//! - quoted values spanning several lines
//!
//! Variable expansion (`${OTHER}`) is not performed; such text is kept
//! verbatim.

use camino::Utf8Path;
use thiserror::Error;

use crate::schema::is_variable_name;

/// One assignment read from a dotenv file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DotenvEntry {
    /// Variable name.
    pub key: String,
    /// Unquoted, unescaped value.
    pub value: String,
    /// 1-based line on which the assignment starts.
    pub line: usize,
}

/// Errors raised while reading a dotenv file.
#[derive(Debug, Error)]
pub enum DotenvError {
    /// The file could not be read.
    #[error("failed to read env file")]
    Read {
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A line could not be parsed.
    #[error("line {line}: {reason}")]
    Syntax {
        /// 1-based line number.
        line: usize,
        /// What is wrong with the line.
        reason: String,
    },
}

/// Read and parse a dotenv file.
///
/// # Errors
///
/// Returns [`DotenvError::Read`] when the file cannot be read and
/// [`DotenvError::Syntax`] for malformed lines.
pub fn read_dotenv(path: &Utf8Path) -> Result<Vec<DotenvEntry>, DotenvError> {
    let contents = std::fs::read_to_string(path).map_err(|source| DotenvError::Read { source })?;
    parse_dotenv(&contents)
}

/// Parse dotenv text into assignments, in file order.
///
/// Repeated keys are all returned; callers decide which one wins.
///
/// # Errors
///
/// Returns [`DotenvError::Syntax`] naming the first malformed line.
///
/// # Examples
///
/// ```
/// use env_lint::dotenv::parse_dotenv;
///
/// let entries = parse_dotenv(concat!(
///     "# database\n",
///     "export DB_HOST=localhost # local only\n",
///     "DB_PASSWORD='p#ss w0rd'\n",
///     "GREETING=\"hello\\nworld\"\n",
/// ))
/// .expect("valid dotenv");
///
/// assert_eq!(entries.len(), 3);
/// assert_eq!(entries[0].value, "localhost");
/// assert_eq!(entries[1].value, "p#ss w0rd");
/// assert_eq!(entries[2].value, "hello\nworld");
/// ```
pub fn parse_dotenv(text: &str) -> Result<Vec<DotenvEntry>, DotenvError> {
    let mut entries = Vec::new();
    let mut lines = text.lines().enumerate();

    while let Some((index, raw_line)) = lines.next() {
        let line = index + 1;
        // Only the leading side is trimmed: a quoted value may continue onto
        // the next line and keeps its trailing whitespace.
        let trimmed = raw_line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let assignment = strip_export(trimmed);
        let Some((raw_key, raw_value)) = assignment.split_once('=') else {
            return Err(syntax(line, "expected KEY=VALUE"));
        };

        let key = raw_key.trim();
        if !is_variable_name(key) {
            return Err(syntax(line, format!("invalid variable name '{key}'")));
        }

        let value = parse_value(raw_value.trim_start(), line, &mut lines)?;
        entries.push(DotenvEntry {
            key: key.to_owned(),
            value,
            line,
        });
    }

    Ok(entries)
}

fn strip_export(line: &str) -> &str {
    line.strip_prefix("export")
        .filter(|rest| rest.starts_with(char::is_whitespace))
        .map_or(line, str::trim_start)
}

fn parse_value<'a, I>(raw: &str, line: usize, rest: &mut I) -> Result<String, DotenvError>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    let quote = match raw.chars().next() {
        Some(quote @ ('"' | '\'')) => quote,
        _ => return Ok(strip_inline_comment(raw).trim_end().to_owned()),
    };

    let mut buffer = raw.get(quote.len_utf8()..).unwrap_or_default().to_owned();
    loop {
        if let Some((value, trailing)) = scan_quoted(&buffer, quote) {
            let trailing = trailing.trim();
            if !trailing.is_empty() && !trailing.starts_with('#') {
                return Err(syntax(
                    line,
                    format!("unexpected text after closing quote: '{trailing}'"),
                ));
            }
            return Ok(value);
        }

        let Some((_, next)) = rest.next() else {
            return Err(syntax(line, format!("unterminated {quote} quoted value")));
        };
        buffer.push('\n');
        buffer.push_str(next);
    }
}

/// Scan up to the closing quote, returning the decoded value and the text
/// after the quote. Returns `None` when the quote is not closed.
fn scan_quoted(body: &str, quote: char) -> Option<(String, &str)> {
    let mut value = String::with_capacity(body.len());
    let mut chars = body.char_indices();

    while let Some((index, character)) = chars.next() {
        if character == quote {
            let after = body.get(index + quote.len_utf8()..).unwrap_or_default();
            return Some((value, after));
        }
        if character == '\\' && quote == '"' {
            let (_, escaped) = chars.next()?;
            match escaped {
                'n' => value.push('\n'),
                'r' => value.push('\r'),
                't' => value.push('\t'),
                '"' | '\\' => value.push(escaped),
                other => {
                    value.push('\\');
                    value.push(other);
                }
            }
            continue;
        }
        value.push(character);
    }

    None
}

fn strip_inline_comment(value: &str) -> &str {
    let mut previous_is_space = false;
    for (index, character) in value.char_indices() {
        if character == '#' && previous_is_space {
            return value.get(..index).unwrap_or(value);
        }
        previous_is_space = character.is_whitespace();
    }
    value
}

fn syntax(line: usize, reason: impl Into<String>) -> DotenvError {
    DotenvError::Syntax {
        line,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn single_value(text: &str) -> String {
        let entries = parse_dotenv(text).expect("dotenv should parse");
        assert_eq!(entries.len(), 1, "expected one entry in {text:?}");
        entries
            .into_iter()
            .next()
            .map(|entry| entry.value)
            .unwrap_or_default()
    }

    #[rstest]
    #[case::plain("KEY=value", "value")]
    #[case::trimmed("KEY =  value  ", "value")]
    #[case::empty("KEY=", "")]
    #[case::inline_comment("KEY=value # note", "value")]
    #[case::hash_without_space("KEY=abc#def", "abc#def")]
    #[case::exported("export KEY=value", "value")]
    #[case::single_quoted("KEY='a \\n # b'", "a \\n # b")]
    #[case::double_quoted("KEY=\"a\\tb\\\"c\\\\\"", "a\tb\"c\\")]
    #[case::unknown_escape("KEY=\"a\\qb\"", "a\\qb")]
    #[case::quoted_with_comment("KEY=\"value\" # note", "value")]
    #[case::equals_in_value("KEY=a=b", "a=b")]
    fn parses_values(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(single_value(text), expected);
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let entries = parse_dotenv("\n# comment\n   \nA=1\n  # indented comment\nB=2\n")
            .expect("dotenv should parse");
        let keys: Vec<_> = entries.iter().map(|entry| entry.key.as_str()).collect();
        assert_eq!(keys, ["A", "B"]);
        assert_eq!(entries.get(1).map(|entry| entry.line), Some(6));
    }

    #[test]
    fn multi_line_double_quoted_value() {
        let entries = parse_dotenv("KEY=\"first\nsecond\"\nNEXT=1\n").expect("dotenv should parse");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries.first().map(|e| e.value.as_str()), Some("first\nsecond"));
        assert_eq!(entries.get(1).map(|e| e.line), Some(3));
    }

    #[test]
    fn multi_line_value_keeps_trailing_whitespace() {
        let entries =
            parse_dotenv("KEY=\"first  \n  second\"  \nNEXT=1\n").expect("dotenv should parse");
        assert_eq!(entries.first().map(|e| e.value.as_str()), Some("first  \n  second"));
        assert_eq!(entries.get(1).map(|e| e.value.as_str()), Some("1"));
    }

    #[test]
    fn keeps_repeated_keys_in_order() {
        let entries = parse_dotenv("A=1\nA=2\n").expect("dotenv should parse");
        let values: Vec<_> = entries.iter().map(|entry| entry.value.as_str()).collect();
        assert_eq!(values, ["1", "2"]);
    }

    #[test]
    fn variable_named_export_is_not_a_prefix() {
        let entries = parse_dotenv("exported=1\n").expect("dotenv should parse");
        assert_eq!(entries.first().map(|e| e.key.as_str()), Some("exported"));
    }

    #[rstest]
    #[case::missing_equals("JUST_A_WORD", 1, "KEY=VALUE")]
    #[case::bad_key("1BAD=value", 1, "invalid variable name")]
    #[case::unterminated("A=1\nB=\"open", 2, "unterminated")]
    #[case::trailing_text("A='x' y", 1, "unexpected text")]
    fn reports_syntax_errors(#[case] text: &str, #[case] line: usize, #[case] fragment: &str) {
        let err = parse_dotenv(text).expect_err("dotenv should fail");
        match err {
            DotenvError::Syntax {
                line: actual,
                reason,
            } => {
                assert_eq!(actual, line);
                assert!(reason.contains(fragment), "unexpected reason: {reason}");
            }
            DotenvError::Read { .. } => panic!("expected a syntax error"),
        }
    }

    #[test]
    fn read_dotenv_reports_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = camino::Utf8PathBuf::from_path_buf(dir.path().join("missing.env"))
            .expect("temp path should be UTF-8");
        let err = read_dotenv(&path).expect_err("missing file should fail");
        assert!(matches!(err, DotenvError::Read { .. }));
    }
}
