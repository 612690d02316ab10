//! Validate command implementation.
//!
//! The run is strictly ordered: load the schema, capture the environment,
//! evaluate, render, write. A schema that fails to load stops the run before
//! the environment is read.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use log::{info, warn};

use crate::cli::ValidateArgs;
use crate::config::LintConfig;
use crate::engine::evaluate;
use crate::error::{EnvLintError, Result};
use crate::exit::ExitStatus;
use crate::report::{OutputFormat, RenderOptions, render};
use crate::schema::{SchemaSource, load_schema};
use crate::snapshot::EnvironmentSnapshot;

/// Schema file used when neither `--schema` nor the config file names one.
pub const DEFAULT_SCHEMA_FILE: &str = "env-schema.toml";

/// Where the variables under validation come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnvSource {
    /// The current process environment.
    Process,
    /// A dotenv file.
    DotenvFile(Utf8PathBuf),
}

/// Fully resolved settings for one validate run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Schema file to load.
    pub schema: Utf8PathBuf,
    /// Source of the environment snapshot.
    pub env_source: EnvSource,
    /// Report format.
    pub format: OutputFormat,
    /// Rendering options.
    pub render: RenderOptions,
}

impl ValidateOptions {
    /// Merge command-line arguments over configuration over defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8PathBuf;
    /// use env_lint::cli::ValidateArgs;
    /// use env_lint::config::LintConfig;
    /// use env_lint::report::OutputFormat;
    /// use env_lint::validate::{EnvSource, ValidateOptions};
    ///
    /// let config = LintConfig {
    ///     schema: Some(Utf8PathBuf::from("config.toml")),
    ///     format: Some(OutputFormat::Json),
    ///     ..LintConfig::default()
    /// };
    /// let args = ValidateArgs {
    ///     schema: Some(Utf8PathBuf::from("cli.toml")),
    ///     ..ValidateArgs::default()
    /// };
    ///
    /// let options = ValidateOptions::resolve(&args, &config);
    /// assert_eq!(options.schema, "cli.toml");
    /// assert_eq!(options.format, OutputFormat::Json);
    /// assert_eq!(options.env_source, EnvSource::Process);
    /// ```
    #[must_use]
    pub fn resolve(args: &ValidateArgs, config: &LintConfig) -> Self {
        let schema = args
            .schema
            .clone()
            .or_else(|| config.schema.clone())
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_SCHEMA_FILE));

        let env_source = args
            .env_file
            .clone()
            .or_else(|| config.env_file.clone())
            .map_or(EnvSource::Process, EnvSource::DotenvFile);

        let format = args.format.or(config.format).unwrap_or_default();
        let suppress = args.suppress_warnings || config.suppress_warnings.unwrap_or(false);

        Self {
            schema,
            env_source,
            format,
            render: RenderOptions {
                include_notices: !suppress,
            },
        }
    }
}

/// Load configuration and resolve options for the given arguments.
///
/// # Errors
///
/// Returns [`EnvLintError::Config`] when the config file cannot be loaded.
pub fn options_from_args(args: &ValidateArgs) -> Result<ValidateOptions> {
    let config = LintConfig::load(args.config.as_deref())?;
    Ok(ValidateOptions::resolve(args, &config))
}

/// Validates the environment and writes the report to `stdout`.
///
/// Returns [`ExitStatus::Clean`] or [`ExitStatus::Violations`]; every other
/// outcome is an error.
///
/// # Errors
///
/// Returns an error if:
/// - The schema cannot be loaded
/// - The env file cannot be read or parsed
/// - Writing to stdout fails
pub fn run_validate(options: &ValidateOptions, stdout: &mut dyn Write) -> Result<ExitStatus> {
    run_validate_with(options, stdout, EnvironmentSnapshot::capture)
}

/// Internal implementation with injectable environment capture for testability.
fn run_validate_with<F>(
    options: &ValidateOptions,
    stdout: &mut dyn Write,
    capture: F,
) -> Result<ExitStatus>
where
    F: FnOnce() -> EnvironmentSnapshot,
{
    let schema = load_schema(&SchemaSource::Path(options.schema.clone()))?;
    if schema.is_empty() {
        warn!("schema {} declares no variables", options.schema);
    }

    let snapshot = match &options.env_source {
        EnvSource::Process => capture(),
        EnvSource::DotenvFile(path) => snapshot_from_file(path)?,
    };

    let result = evaluate(&schema, &snapshot);
    info!(
        "checked {} variable(s); {} violation(s), {} notice(s)",
        result.checked(),
        result.violations().len(),
        result.notices().len()
    );

    let mut output = render(&result, options.format, &options.render);
    if !output.ends_with('\n') {
        output.push('\n');
    }
    stdout
        .write_all(output.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|source| EnvLintError::WriteFailed { source })?;

    Ok(ExitStatus::for_result(&result))
}

fn snapshot_from_file(path: &Utf8Path) -> Result<EnvironmentSnapshot> {
    EnvironmentSnapshot::from_dotenv_file(path).map_err(|source| EnvLintError::EnvFile {
        path: path.to_owned(),
        source,
    })
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
