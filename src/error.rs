//! Error types for the `env-lint` command line.
//!
//! Violations are data, not errors: they live in a
//! [`ValidationResult`](crate::violation::ValidationResult). The variants here
//! cover everything that stops a run from producing a result at all. Each one
//! maps to an [`ExitStatus`] so callers never pick exit codes by hand.

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::config::ConfigError;
use crate::dotenv::DotenvError;
use crate::exit::ExitStatus;
use crate::schema::SchemaError;

/// Errors that abort an `env-lint` run.
#[derive(Debug, Error)]
pub enum EnvLintError {
    /// The schema could not be loaded.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The env file could not be read or parsed.
    #[error("failed to load env file {path}")]
    EnvFile {
        /// Path to the env file.
        path: Utf8PathBuf,
        /// Underlying read or syntax error.
        #[source]
        source: DotenvError,
    },

    /// The configuration file could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generated output would not load back as a schema.
    #[error("failed to render schema: {reason}")]
    Render {
        /// Serialiser message.
        reason: String,
    },

    /// Failed to write output.
    #[error("failed to write output")]
    WriteFailed {
        /// The underlying error that caused the write to fail.
        #[source]
        source: std::io::Error,
    },
}

impl EnvLintError {
    /// Returns the exit status this error maps to.
    ///
    /// # Examples
    ///
    /// ```
    /// use env_lint::error::EnvLintError;
    /// use env_lint::exit::ExitStatus;
    ///
    /// let err = EnvLintError::WriteFailed {
    ///     source: std::io::Error::other("broken pipe"),
    /// };
    /// assert_eq!(err.exit_status(), ExitStatus::InputFailure);
    /// ```
    #[must_use]
    pub const fn exit_status(&self) -> ExitStatus {
        match self {
            Self::Schema(_) | Self::Render { .. } => ExitStatus::InvalidSchema,
            Self::EnvFile { .. } | Self::Config(_) | Self::WriteFailed { .. } => {
                ExitStatus::InputFailure
            }
        }
    }
}

/// Result type for `env-lint` operations.
pub type Result<T> = std::result::Result<T, EnvLintError>;
