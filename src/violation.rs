//! Findings produced by the rule engine.
//!
//! A [`ValidationResult`] holds every [`Violation`] in schema declaration
//! order together with per-kind counts. Counts are always derived from the
//! violation list, so the two cannot disagree. Findings are immutable once
//! created.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Categories of schema violations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// A required variable is absent and has no default.
    MissingRequired,
    /// A value does not parse as its declared type.
    TypeMismatch,
    /// A value parses but fails an enum, pattern, range, or length check.
    InvalidValue,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRequired => f.write_str("missing required"),
            Self::TypeMismatch => f.write_str("type mismatch"),
            Self::InvalidValue => f.write_str("invalid value"),
        }
    }
}

/// Where the value behind a finding came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueOrigin {
    /// The variable was set in the environment.
    Environment,
    /// The variable was absent and the schema default was used.
    Default,
    /// The variable was absent and no value was available.
    Absent,
}

/// A single mismatch between the schema and the environment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    name: String,
    kind: ViolationKind,
    origin: ValueOrigin,
    message: String,
}

impl Violation {
    /// Create a violation.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        kind: ViolationKind,
        origin: ValueOrigin,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            origin,
            message: message.into(),
        }
    }

    /// Returns the schema entry name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the violation category.
    #[must_use]
    pub const fn kind(&self) -> ViolationKind {
        self.kind
    }

    /// Returns where the offending value came from.
    #[must_use]
    pub const fn origin(&self) -> ValueOrigin {
        self.origin
    }

    /// Returns the human-readable explanation.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Categories of informational findings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// An absent variable fell back to its schema default.
    DefaultApplied,
    /// An optional variable without a default is absent.
    OptionalMissing,
}

/// An informational finding that never fails a run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    name: String,
    kind: NoticeKind,
    message: String,
}

impl Notice {
    /// Create a notice.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            message: message.into(),
        }
    }

    /// Returns the schema entry name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the notice category.
    #[must_use]
    pub const fn kind(&self) -> NoticeKind {
        self.kind
    }

    /// Returns the human-readable explanation.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Number of violations per kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationCounts {
    /// Count of [`ViolationKind::MissingRequired`].
    pub missing_required: usize,
    /// Count of [`ViolationKind::TypeMismatch`].
    pub type_mismatch: usize,
    /// Count of [`ViolationKind::InvalidValue`].
    pub invalid_value: usize,
}

impl ViolationCounts {
    /// Tally the kinds of the given violations.
    #[must_use]
    pub fn tally(violations: &[Violation]) -> Self {
        violations
            .iter()
            .fold(Self::default(), |mut counts, violation| {
                let slot = match violation.kind() {
                    ViolationKind::MissingRequired => &mut counts.missing_required,
                    ViolationKind::TypeMismatch => &mut counts.type_mismatch,
                    ViolationKind::InvalidValue => &mut counts.invalid_value,
                };
                *slot = slot.saturating_add(1);
                counts
            })
    }

    /// Returns the count for one kind.
    #[must_use]
    pub const fn get(&self, kind: ViolationKind) -> usize {
        match kind {
            ViolationKind::MissingRequired => self.missing_required,
            ViolationKind::TypeMismatch => self.type_mismatch,
            ViolationKind::InvalidValue => self.invalid_value,
        }
    }

    /// Returns the total across all kinds.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.missing_required + self.type_mismatch + self.invalid_value
    }
}

/// The complete outcome of evaluating a schema against a snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationResult {
    checked: usize,
    violations: Vec<Violation>,
    notices: Vec<Notice>,
    counts: ViolationCounts,
}

impl ValidationResult {
    /// Assemble a result, deriving the per-kind counts.
    ///
    /// # Examples
    ///
    /// ```
    /// use env_lint::violation::{ValidationResult, ValueOrigin, Violation, ViolationKind};
    ///
    /// let result = ValidationResult::new(
    ///     1,
    ///     vec![Violation::new(
    ///         "PORT",
    ///         ViolationKind::MissingRequired,
    ///         ValueOrigin::Absent,
    ///         "required variable is not set",
    ///     )],
    ///     Vec::new(),
    /// );
    /// assert!(!result.passed());
    /// assert_eq!(result.counts().missing_required, 1);
    /// ```
    #[must_use]
    pub fn new(checked: usize, violations: Vec<Violation>, notices: Vec<Notice>) -> Self {
        let counts = ViolationCounts::tally(&violations);
        Self {
            checked,
            violations,
            notices,
            counts,
        }
    }

    /// Returns the number of schema entries evaluated.
    #[must_use]
    pub const fn checked(&self) -> usize {
        self.checked
    }

    /// Returns violations in schema declaration order.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Returns notices in schema declaration order.
    #[must_use]
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Returns per-kind violation counts.
    #[must_use]
    pub const fn counts(&self) -> &ViolationCounts {
        &self.counts
    }

    /// Returns true when there are no violations. Notices do not count.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    /// Iterate over the violations reported for one variable.
    pub fn violations_for<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Violation> {
        self.violations
            .iter()
            .filter(move |violation| violation.name() == name)
    }
}
