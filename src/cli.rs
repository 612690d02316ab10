//! CLI argument definitions for `env-lint`.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint so the argument surface can be unit tested
//! without spawning the binary.

use std::ffi::OsString;

use camino::Utf8PathBuf;
use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};

use crate::report::OutputFormat;
use crate::schema::SchemaFormat;

/// Validate environment variables against a declarative schema.
#[derive(Parser, Debug)]
#[command(name = "env-lint")]
#[command(version, about)]
#[command(long_about = concat!(
    "Validate environment variables against a declarative schema.\n\n",
    "env-lint loads a TOML or JSON schema describing the variables a service ",
    "expects, captures the environment once, and reports every missing, ",
    "mistyped, or invalid variable in a single pass.\n\n",
    "Validation is the default when no subcommand is given.",
))]
#[command(after_help = concat!(
    "EXIT CODES:\n",
    "  0   no violations\n",
    "  1   one or more violations\n",
    "  2   the schema could not be loaded\n",
    "  3   an env file, config file, or output stream failed\n",
    "  64  invalid command-line usage\n\n",
    "EXAMPLES:\n",
    "  Validate the process environment against env-schema.toml:\n",
    "    $ env-lint\n\n",
    "  Validate a dotenv file and emit JSON:\n",
    "    $ env-lint validate -s env-schema.json -e .env --format json\n\n",
    "  Draft a schema from an existing dotenv file:\n",
    "    $ env-lint generate-schema -e .env.example > env-schema.toml",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Validate arguments (used when no subcommand is given).
    #[command(flatten)]
    pub validate: ValidateArgs,

    /// Increase log verbosity (repeatable: -v, -vv, -vvv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbosity")]
    pub quiet: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Validate the environment against a schema (default).
    Validate(ValidateArgs),

    /// Generate a draft schema from a dotenv file.
    GenerateSchema(GenerateArgs),
}

/// Arguments for the validate command.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidateArgs {
    /// Schema file (.toml or .json) [default: env-schema.toml].
    #[arg(short, long, value_name = "PATH")]
    pub schema: Option<Utf8PathBuf>,

    /// Validate this dotenv file instead of the process environment.
    #[arg(short, long, value_name = "PATH")]
    pub env_file: Option<Utf8PathBuf>,

    /// Report format [default: human].
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Hide notices about defaults and unset optional variables.
    #[arg(short = 'w', long)]
    pub suppress_warnings: bool,

    /// Configuration file [default: env-lint.toml when present].
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,
}

/// Arguments for the generate-schema command.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct GenerateArgs {
    /// Dotenv file to read.
    #[arg(short, long, value_name = "PATH", default_value = ".env")]
    pub env_file: Utf8PathBuf,

    /// Schema format to write.
    #[arg(short, long, value_enum, value_name = "FORMAT", default_value = "toml")]
    pub format: SchemaFormat,
}

impl Default for GenerateArgs {
    /// Creates arguments reading `.env` and writing TOML.
    ///
    /// # Examples
    ///
    /// ```
    /// use env_lint::cli::GenerateArgs;
    /// use env_lint::schema::SchemaFormat;
    ///
    /// let args = GenerateArgs::default();
    /// assert_eq!(args.env_file, ".env");
    /// assert_eq!(args.format, SchemaFormat::Toml);
    /// ```
    fn default() -> Self {
        Self {
            env_file: Utf8PathBuf::from(".env"),
            format: SchemaFormat::Toml,
        }
    }
}

impl Cli {
    /// Parse `args`, rejecting validation options that precede a subcommand.
    ///
    /// `env-lint --schema a.toml validate` would otherwise read the default
    /// schema, because the subcommand brings its own argument set.
    ///
    /// # Errors
    ///
    /// Returns clap's error for malformed usage, or an
    /// [`ErrorKind::ArgumentConflict`] error for options the subcommand
    /// would ignore.
    ///
    /// # Examples
    ///
    /// ```
    /// use env_lint::cli::Cli;
    ///
    /// assert!(Cli::try_parse_args(["env-lint", "validate", "-s", "a.toml"]).is_ok());
    /// assert!(Cli::try_parse_args(["env-lint", "-s", "a.toml", "validate"]).is_err());
    /// ```
    pub fn try_parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let cli = Self::try_parse_from(args)?;
        if cli.command.is_some() && cli.validate != ValidateArgs::default() {
            return Err(Self::command().error(
                ErrorKind::ArgumentConflict,
                "validation options must follow the subcommand, not precede it",
            ));
        }
        Ok(cli)
    }

    /// Returns the effective validate arguments.
    ///
    /// If a `validate` subcommand was provided, returns those arguments.
    /// Otherwise returns the flattened arguments.
    ///
    /// # Note
    ///
    /// When `Command::GenerateSchema` is active, this returns the default
    /// flattened arguments. Callers should check `self.command` first.
    #[must_use]
    pub fn validate_args(&self) -> &ValidateArgs {
        match &self.command {
            Some(Command::Validate(args)) => args,
            Some(Command::GenerateSchema(_)) | None => &self.validate,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
