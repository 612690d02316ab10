//! `env-lint` CLI entrypoint.
//!
//! This binary validates the environment against a schema, or drafts a
//! schema from a dotenv file. Reports go to stdout; diagnostics and log
//! records go to stderr.

use std::error::Error as _;
use std::io::Write;

use clap::error::ErrorKind;
use env_lint::cli::{Cli, Command};
use env_lint::error::Result;
use env_lint::exit::ExitStatus;
use env_lint::generate::run_generate;
use env_lint::logging;
use env_lint::validate::{options_from_args, run_validate};

fn main() {
    let mut stderr = std::io::stderr();
    let status = match Cli::try_parse_args(std::env::args_os()) {
        Ok(cli) => {
            if let Err(err) = logging::init(logging::level_for(cli.verbosity, cli.quiet)) {
                write_stderr_line(&mut stderr, format_args!("warning: logging disabled: {err}"));
            }
            let mut stdout = std::io::stdout().lock();
            exit_status_for_run_result(run(&cli, &mut stdout), &mut stderr)
        }
        Err(err) => usage_status(&err),
    };

    if !status.is_success() {
        std::process::exit(status.code());
    }
}

fn run(cli: &Cli, stdout: &mut dyn Write) -> Result<ExitStatus> {
    match &cli.command {
        Some(Command::GenerateSchema(args)) => {
            run_generate(args, stdout)?;
            Ok(ExitStatus::Clean)
        }
        Some(Command::Validate(_)) | None => {
            let options = options_from_args(cli.validate_args())?;
            run_validate(&options, stdout)
        }
    }
}

/// Prints clap's message and maps help and version requests to success.
fn usage_status(err: &clap::Error) -> ExitStatus {
    if err.print().is_err() {
        // Best-effort output; the exit status still reports the problem.
    }
    status_for_parse_error(err.kind())
}

const fn status_for_parse_error(kind: ErrorKind) -> ExitStatus {
    match kind {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitStatus::Clean,
        _ => ExitStatus::Usage,
    }
}

fn exit_status_for_run_result(result: Result<ExitStatus>, stderr: &mut dyn Write) -> ExitStatus {
    match result {
        Ok(status) => status,
        Err(err) => {
            write_stderr_line(stderr, format_args!("error: {err}"));
            let mut source = err.source();
            while let Some(cause) = source {
                write_stderr_line(stderr, format_args!("  caused by: {cause}"));
                source = cause.source();
            }
            err.exit_status()
        }
    }
}

fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}
