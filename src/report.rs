//! Report rendering for validation results.
//!
//! Two renderings are provided: a line-oriented human format and a JSON
//! document. The JSON layout is a versioned external contract; consumers
//! should check `version` before reading anything else. [`parse_json`] reads
//! the document back and is used by tools that post-process reports.

use std::borrow::Cow;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::violation::{Notice, ValidationResult, Violation, ViolationCounts};

/// Version written to the `version` field of JSON reports.
pub const REPORT_VERSION: u32 = 1;

/// Report output formats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One line per finding followed by a summary line.
    #[default]
    Human,
    /// A pretty-printed JSON document.
    Json,
}

/// Options controlling what a rendering includes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Include notices (defaults applied, optional variables missing).
    pub include_notices: bool,
}

impl Default for RenderOptions {
    /// Returns options that include notices.
    ///
    /// # Examples
    ///
    /// ```
    /// use env_lint::report::RenderOptions;
    ///
    /// assert!(RenderOptions::default().include_notices);
    /// ```
    fn default() -> Self {
        Self {
            include_notices: true,
        }
    }
}

/// Render a result in the requested format.
#[must_use]
pub fn render(result: &ValidationResult, format: OutputFormat, options: &RenderOptions) -> String {
    match format {
        OutputFormat::Human => render_human(result, options),
        OutputFormat::Json => render_json(result, options),
    }
}

/// Render a result for terminals and CI logs.
///
/// Violations come first in schema order, then notices prefixed with
/// `warning:`, then a one-line summary. The output always ends with a
/// newline.
///
/// # Examples
///
/// ```
/// use env_lint::report::{RenderOptions, render_human};
/// use env_lint::violation::ValidationResult;
///
/// let output = render_human(&ValidationResult::new(3, Vec::new(), Vec::new()), &RenderOptions::default());
/// assert_eq!(output, "ok: 3 variable(s) checked, no violations\n");
/// ```
#[must_use]
pub fn render_human(result: &ValidationResult, options: &RenderOptions) -> String {
    let mut output = String::new();

    for violation in result.violations() {
        output.push_str(&format!(
            "{}: {}\n",
            violation.name(),
            single_line(violation.message())
        ));
    }

    if options.include_notices {
        for notice in result.notices() {
            output.push_str(&format!(
                "warning: {}: {}\n",
                notice.name(),
                single_line(notice.message())
            ));
        }
    }

    output.push_str(&summary_line(result));
    output.push('\n');
    output
}

/// Escapes line breaks so each finding stays on one line.
fn single_line(message: &str) -> Cow<'_, str> {
    if message.contains(['\n', '\r']) {
        Cow::Owned(message.replace('\r', "\\r").replace('\n', "\\n"))
    } else {
        Cow::Borrowed(message)
    }
}

fn summary_line(result: &ValidationResult) -> String {
    if result.passed() {
        return format!(
            "ok: {} variable(s) checked, no violations",
            result.checked()
        );
    }

    let counts = result.counts();
    format!(
        "{} violation(s): {} missing required, {} type mismatch, {} invalid value",
        counts.total(),
        counts.missing_required,
        counts.type_mismatch,
        counts.invalid_value
    )
}

/// Borrowed view serialised by [`render_json`].
#[derive(Serialize)]
struct ReportView<'a> {
    version: u32,
    passed: bool,
    checked: usize,
    counts: &'a ViolationCounts,
    violations: &'a [Violation],
    notices: &'a [Notice],
}

/// Owned document read back by [`parse_json`].
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ReportDocument {
    version: u32,
    passed: bool,
    checked: usize,
    counts: ViolationCounts,
    violations: Vec<Violation>,
    #[serde(default)]
    notices: Vec<Notice>,
}

/// Render a result as a pretty-printed JSON document.
///
/// When notices are excluded the `notices` array is written empty.
///
/// # Examples
///
/// ```
/// use env_lint::report::{RenderOptions, render_json};
/// use env_lint::violation::ValidationResult;
///
/// let json = render_json(&ValidationResult::default(), &RenderOptions::default());
/// assert!(json.contains("\"version\": 1"));
/// assert!(json.contains("\"passed\": true"));
/// ```
#[must_use]
pub fn render_json(result: &ValidationResult, options: &RenderOptions) -> String {
    let view = ReportView {
        version: REPORT_VERSION,
        passed: result.passed(),
        checked: result.checked(),
        counts: result.counts(),
        violations: result.violations(),
        notices: if options.include_notices {
            result.notices()
        } else {
            &[]
        },
    };

    // The view holds only strings, integers, and booleans.
    serde_json::to_string_pretty(&view).unwrap_or_else(|_| "{}".to_owned())
}

/// Errors raised while reading a JSON report.
#[derive(Debug, Error)]
pub enum ReportParseError {
    /// The text is not a well-formed report document.
    #[error("malformed report: {0}")]
    Syntax(#[from] serde_json::Error),

    /// The report was written by an incompatible version.
    #[error("unsupported report version {found}; expected {REPORT_VERSION}")]
    UnsupportedVersion {
        /// Declared version.
        found: u32,
    },

    /// The summary fields disagree with the violation list.
    #[error("inconsistent report: {reason}")]
    Inconsistent {
        /// Which field disagrees.
        reason: String,
    },
}

/// Read a JSON report produced by [`render_json`].
///
/// # Errors
///
/// Returns [`ReportParseError::Syntax`] for malformed documents,
/// [`ReportParseError::UnsupportedVersion`] for other versions, and
/// [`ReportParseError::Inconsistent`] when `counts` or `passed` do not match
/// the violations.
///
/// # Examples
///
/// ```
/// use env_lint::report::{RenderOptions, parse_json, render_json};
/// use env_lint::violation::ValidationResult;
///
/// let original = ValidationResult::new(2, Vec::new(), Vec::new());
/// let parsed = parse_json(&render_json(&original, &RenderOptions::default()))
///     .expect("report should parse");
/// assert_eq!(parsed, original);
/// ```
pub fn parse_json(text: &str) -> Result<ValidationResult, ReportParseError> {
    let document: ReportDocument = serde_json::from_str(text)?;

    if document.version != REPORT_VERSION {
        return Err(ReportParseError::UnsupportedVersion {
            found: document.version,
        });
    }

    let result = ValidationResult::new(document.checked, document.violations, document.notices);

    if *result.counts() != document.counts {
        return Err(ReportParseError::Inconsistent {
            reason: format!(
                "counts {:?} do not match the {} listed violation(s)",
                document.counts,
                result.violations().len()
            ),
        });
    }
    if result.passed() != document.passed {
        return Err(ReportParseError::Inconsistent {
            reason: format!(
                "passed is {} but {} violation(s) are listed",
                document.passed,
                result.violations().len()
            ),
        });
    }

    Ok(result)
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
