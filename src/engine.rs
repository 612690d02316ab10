//! Rule engine: evaluates a schema against an environment snapshot.
//!
//! Evaluation is a pure function of its inputs. Every entry is evaluated
//! independently in declaration order and every finding is collected, so the
//! result is exhaustive and byte-for-byte reproducible. Variables present in
//! the snapshot but not declared in the schema are never inspected.
//!
//! Per entry:
//!
//! 1. An absent variable with a default is evaluated using the default; the
//!    default must satisfy the same checks as a real value.
//! 2. An absent required variable without a default is a
//!    [`ViolationKind::MissingRequired`] and nothing else is checked.
//! 3. An absent optional variable without a default only yields a notice.
//! 4. A value is type-checked; a type failure skips the remaining checks.
//! 5. Constraints run in a fixed order: pattern, `min`, `max`, `length`,
//!    `min_length`, `max_length`.

use std::cmp::Ordering;

use log::trace;

use crate::schema::{NumericBound, Schema, SchemaEntry, VariableKind};
use crate::snapshot::EnvironmentSnapshot;
use crate::violation::{
    Notice, NoticeKind, ValidationResult, ValueOrigin, Violation, ViolationKind,
};

const MISSING_REQUIRED_MESSAGE: &str = "required variable is not set";
const OPTIONAL_MISSING_MESSAGE: &str = "optional variable is not set";
const REDACTED: &str = "<redacted>";

/// Accepted spellings for `bool` entries, compared case-insensitively.
pub const BOOL_VALUES: [&str; 6] = ["true", "false", "1", "0", "yes", "no"];

/// A failed check on a single value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Failure {
    /// Violation category.
    pub kind: ViolationKind,
    /// Explanation, already honouring custom messages and redaction.
    pub message: String,
}

/// Evaluate every schema entry against the snapshot.
///
/// # Examples
///
/// ```
/// use env_lint::engine::evaluate;
/// use env_lint::schema::{Schema, SchemaEntry, VariableKind};
/// use env_lint::snapshot::EnvironmentSnapshot;
/// use env_lint::violation::ViolationKind;
///
/// let schema = Schema::from_entries(vec![
///     SchemaEntry::new("PORT", VariableKind::Int).required(),
/// ])
/// .expect("valid schema");
///
/// let result = evaluate(&schema, &EnvironmentSnapshot::default());
/// assert_eq!(result.violations().len(), 1);
/// assert_eq!(
///     result.violations()[0].kind(),
///     ViolationKind::MissingRequired
/// );
/// ```
#[must_use]
pub fn evaluate(schema: &Schema, snapshot: &EnvironmentSnapshot) -> ValidationResult {
    let mut violations = Vec::new();
    let mut notices = Vec::new();

    for entry in schema.entries() {
        evaluate_entry(entry, snapshot, &mut violations, &mut notices);
    }

    ValidationResult::new(schema.len(), violations, notices)
}

fn evaluate_entry(
    entry: &SchemaEntry,
    snapshot: &EnvironmentSnapshot,
    violations: &mut Vec<Violation>,
    notices: &mut Vec<Notice>,
) {
    let (value, origin) = match (snapshot.get(&entry.name), entry.default.as_deref()) {
        (Some(value), _) => (value, ValueOrigin::Environment),
        (None, Some(default)) => {
            notices.push(Notice::new(
                &entry.name,
                NoticeKind::DefaultApplied,
                format!("not set; using default {}", shown(entry, default)),
            ));
            (default, ValueOrigin::Default)
        }
        (None, None) if entry.required => {
            trace!("{}: missing required variable", entry.name);
            violations.push(Violation::new(
                &entry.name,
                ViolationKind::MissingRequired,
                ValueOrigin::Absent,
                MISSING_REQUIRED_MESSAGE,
            ));
            return;
        }
        (None, None) => {
            notices.push(Notice::new(
                &entry.name,
                NoticeKind::OptionalMissing,
                OPTIONAL_MISSING_MESSAGE,
            ));
            return;
        }
    };

    let failures = check_value(entry, value);
    trace!(
        "{}: checked {:?} value as {}, {} failure(s)",
        entry.name,
        origin,
        entry.kind,
        failures.len()
    );

    violations.extend(failures.into_iter().map(|failure| {
        let message = match origin {
            ValueOrigin::Default if entry.message.is_none() => {
                format!("default value: {}", failure.message)
            }
            _ => failure.message,
        };
        Violation::new(&entry.name, failure.kind, origin, message)
    }));
}

/// Check one value against an entry's type and constraints.
///
/// Returns every failure, in check order. A type failure is returned alone
/// because constraints cannot be evaluated against an unparsed value.
///
/// # Examples
///
/// ```
/// use env_lint::engine::check_value;
/// use env_lint::schema::{SchemaEntry, VariableKind};
/// use env_lint::violation::ViolationKind;
///
/// let entry = SchemaEntry::new("DEBUG", VariableKind::Bool);
/// assert!(check_value(&entry, "YES").is_empty());
///
/// let failures = check_value(&entry, "maybe");
/// assert_eq!(failures.len(), 1);
/// assert_eq!(failures[0].kind, ViolationKind::TypeMismatch);
/// ```
#[must_use]
pub fn check_value(entry: &SchemaEntry, value: &str) -> Vec<Failure> {
    let parsed = match check_type(entry, value) {
        Ok(parsed) => parsed,
        Err(failure) => return vec![failure],
    };
    check_constraints(entry, value, parsed)
}

/// A value after its type check, kept for numeric range checks.
#[derive(Clone, Copy, Debug)]
enum Parsed {
    Text,
    Int(i64),
    Float(f64),
}

fn check_type(entry: &SchemaEntry, value: &str) -> Result<Parsed, Failure> {
    let shown_value = shown(entry, value);
    match &entry.kind {
        VariableKind::String => Ok(Parsed::Text),
        VariableKind::Int => parse_int(value).map(Parsed::Int).ok_or_else(|| {
            fail(
                entry,
                ViolationKind::TypeMismatch,
                format!("expected a 64-bit integer, got {shown_value}"),
            )
        }),
        VariableKind::Float => parse_float(value).map(Parsed::Float).ok_or_else(|| {
            fail(
                entry,
                ViolationKind::TypeMismatch,
                format!("expected a finite number, got {shown_value}"),
            )
        }),
        VariableKind::Bool => {
            if is_bool(value) {
                Ok(Parsed::Text)
            } else {
                Err(fail(
                    entry,
                    ViolationKind::TypeMismatch,
                    format!(
                        "expected a boolean ({}), got {shown_value}",
                        BOOL_VALUES.join(", ")
                    ),
                ))
            }
        }
        VariableKind::Url => {
            if is_absolute_url(value) {
                Ok(Parsed::Text)
            } else {
                Err(fail(
                    entry,
                    ViolationKind::TypeMismatch,
                    format!("expected an absolute URL with a scheme and host, got {shown_value}"),
                ))
            }
        }
        VariableKind::Enum { allowed } => {
            if allowed.iter().any(|candidate| candidate == value) {
                Ok(Parsed::Text)
            } else {
                Err(fail(
                    entry,
                    ViolationKind::InvalidValue,
                    format!(
                        "value {shown_value} is not allowed; expected one of: {}",
                        allowed.join(", ")
                    ),
                ))
            }
        }
        VariableKind::Regex { pattern } => {
            if pattern.is_full_match(value) {
                Ok(Parsed::Text)
            } else {
                Err(fail(
                    entry,
                    ViolationKind::InvalidValue,
                    format!("value {shown_value} does not match pattern {pattern}"),
                ))
            }
        }
    }
}

fn check_constraints(entry: &SchemaEntry, value: &str, parsed: Parsed) -> Vec<Failure> {
    let constraints = &entry.constraints;
    let shown_value = shown(entry, value);
    let mut failures = Vec::new();
    let mut reject = |message: String| {
        failures.push(fail(entry, ViolationKind::InvalidValue, message));
    };

    if let Some(pattern) = &constraints.pattern {
        if !pattern.is_full_match(value) {
            reject(format!(
                "value {shown_value} does not match pattern {pattern}"
            ));
        }
    }

    if let Some(min) = constraints.min {
        if compare(parsed, min) == Some(Ordering::Less) {
            reject(format!("expected a value >= {min}, got {shown_value}"));
        }
    }

    if let Some(max) = constraints.max {
        if compare(parsed, max) == Some(Ordering::Greater) {
            reject(format!("expected a value <= {max}, got {shown_value}"));
        }
    }

    let length = value.chars().count();
    if let Some(expected) = constraints.length {
        if length != expected {
            reject(format!(
                "expected exactly {expected} character(s), got {length}"
            ));
        }
    }

    if let Some(min_length) = constraints.min_length {
        if length < min_length {
            reject(format!(
                "expected at least {min_length} character(s), got {length}"
            ));
        }
    }

    if let Some(max_length) = constraints.max_length {
        if length > max_length {
            reject(format!(
                "expected at most {max_length} character(s), got {length}"
            ));
        }
    }

    failures
}

fn compare(parsed: Parsed, bound: NumericBound) -> Option<Ordering> {
    match (parsed, bound) {
        (Parsed::Int(value), NumericBound::Int(limit)) => Some(value.cmp(&limit)),
        (Parsed::Int(value), NumericBound::Float(_)) => {
            NumericBound::Int(value).as_f64().partial_cmp(&bound.as_f64())
        }
        (Parsed::Float(value), _) => value.partial_cmp(&bound.as_f64()),
        (Parsed::Text, _) => None,
    }
}

fn fail(entry: &SchemaEntry, kind: ViolationKind, generated: String) -> Failure {
    Failure {
        kind,
        message: entry.message.clone().unwrap_or(generated),
    }
}

fn shown(entry: &SchemaEntry, value: &str) -> String {
    if entry.sensitive {
        REDACTED.to_owned()
    } else {
        format!("'{value}'")
    }
}

/// Parse a base-10 integer with an optional leading `-`.
///
/// A leading `+`, surrounding whitespace, and values outside the `i64` range
/// are rejected.
///
/// # Examples
///
/// ```
/// use env_lint::engine::parse_int;
///
/// assert_eq!(parse_int("-42"), Some(-42));
/// assert_eq!(parse_int("+42"), None);
/// assert_eq!(parse_int(" 42"), None);
/// assert_eq!(parse_int("99999999999999999999"), None);
/// ```
#[must_use]
pub fn parse_int(value: &str) -> Option<i64> {
    let digits = value.strip_prefix('-').unwrap_or(value);
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

/// Parse a finite floating-point number.
#[must_use]
pub fn parse_float(value: &str) -> Option<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

/// Returns true when `value` is an accepted boolean spelling.
#[must_use]
pub fn is_bool(value: &str) -> bool {
    BOOL_VALUES
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(value))
}

/// Returns true when `value` is an absolute URL with a scheme and a host.
///
/// # Examples
///
/// ```
/// use env_lint::engine::is_absolute_url;
///
/// assert!(is_absolute_url("postgres://db.internal:5432/app"));
/// assert!(!is_absolute_url("/relative/path"));
/// assert!(!is_absolute_url("mailto:ops@example.com"));
/// ```
#[must_use]
pub fn is_absolute_url(value: &str) -> bool {
    url::Url::parse(value).is_ok_and(|url| {
        !url.scheme().is_empty() && url.host_str().is_some_and(|host| !host.is_empty())
    })
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
