//! Declarative validation of environment variables.
//!
//! `env-lint` loads a schema describing the variables a service expects,
//! captures the environment once, evaluates every entry, and reports all
//! violations in a single pass. The pipeline is:
//!
//! 1. [`schema::load_schema`] reads a TOML or JSON schema into a validated
//!    [`schema::Schema`].
//! 2. [`snapshot::EnvironmentSnapshot`] captures the process environment or
//!    a dotenv file.
//! 3. [`engine::evaluate`] checks the snapshot against the schema and returns
//!    a [`violation::ValidationResult`].
//! 4. [`report`] renders the result for humans or machines, and
//!    [`exit::ExitStatus`] maps it to a process exit code.
//!
//! # Examples
//!
//! ```
//! use env_lint::engine::evaluate;
//! use env_lint::exit::ExitStatus;
//! use env_lint::schema::{SchemaFormat, parse_schema};
//! use env_lint::snapshot::EnvironmentSnapshot;
//!
//! let schema = parse_schema(
//!     "[[variables]]\nname = \"PORT\"\ntype = \"int\"\nrequired = true\n",
//!     SchemaFormat::Toml,
//! )
//! .expect("valid schema");
//!
//! let result = evaluate(&schema, &EnvironmentSnapshot::from_pairs([("PORT", "http")]));
//! assert_eq!(ExitStatus::for_result(&result), ExitStatus::Violations);
//! ```

pub mod cli;
pub mod config;
pub mod dotenv;
pub mod engine;
pub mod error;
pub mod exit;
pub mod generate;
pub mod logging;
pub mod report;
pub mod schema;
pub mod snapshot;
pub mod validate;
pub mod violation;

pub use error::{EnvLintError, Result};
pub use exit::ExitStatus;
