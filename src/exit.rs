//! Process exit statuses.
//!
//! Codes distinguish "the environment is wrong" from "the tool could not
//! check it", so CI pipelines can tell a misconfigured deployment apart from
//! a broken schema or a missing env file.

use crate::violation::ValidationResult;

/// Outcome of a run, mapped to a process exit code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    /// The environment satisfies the schema.
    Clean,
    /// One or more violations were found.
    Violations,
    /// The schema could not be loaded.
    InvalidSchema,
    /// An env file, config file, or output stream failed.
    InputFailure,
    /// The command line was invalid.
    Usage,
}

impl ExitStatus {
    /// Map a validation result to a status.
    ///
    /// # Examples
    ///
    /// ```
    /// use env_lint::exit::ExitStatus;
    /// use env_lint::violation::ValidationResult;
    ///
    /// assert_eq!(ExitStatus::for_result(&ValidationResult::default()), ExitStatus::Clean);
    /// ```
    #[must_use]
    pub fn for_result(result: &ValidationResult) -> Self {
        if result.passed() {
            Self::Clean
        } else {
            Self::Violations
        }
    }

    /// Returns the process exit code.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Clean => 0,
            Self::Violations => 1,
            Self::InvalidSchema => 2,
            Self::InputFailure => 3,
            Self::Usage => 64,
        }
    }

    /// Returns true for [`ExitStatus::Clean`].
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Clean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::violation::{ValueOrigin, Violation, ViolationKind};
    use rstest::rstest;

    #[rstest]
    #[case(ExitStatus::Clean, 0)]
    #[case(ExitStatus::Violations, 1)]
    #[case(ExitStatus::InvalidSchema, 2)]
    #[case(ExitStatus::InputFailure, 3)]
    #[case(ExitStatus::Usage, 64)]
    fn codes_are_stable(#[case] status: ExitStatus, #[case] code: i32) {
        assert_eq!(status.code(), code);
    }

    #[test]
    fn any_violation_fails_the_run() {
        let result = ValidationResult::new(
            1,
            vec![Violation::new(
                "PORT",
                ViolationKind::MissingRequired,
                ValueOrigin::Absent,
                "required variable is not set",
            )],
            Vec::new(),
        );
        let status = ExitStatus::for_result(&result);
        assert_eq!(status, ExitStatus::Violations);
        assert!(!status.is_success());
    }

    #[test]
    fn clean_result_succeeds() {
        assert!(ExitStatus::for_result(&ValidationResult::default()).is_success());
    }
}
