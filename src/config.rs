//! Optional `env-lint.toml` configuration.
//!
//! A project can pin its schema location, env file, and report settings in
//! `env-lint.toml` so CI invocations stay short. Command-line flags always
//! win over the file, and the file wins over built-in defaults. Relative
//! paths in the file are resolved against the file's own directory.

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use serde::Deserialize;
use thiserror::Error;

use crate::report::OutputFormat;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "env-lint.toml";

/// Project settings read from `env-lint.toml`.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LintConfig {
    /// Schema file used when `--schema` is not given.
    pub schema: Option<Utf8PathBuf>,
    /// Env file validated instead of the process environment.
    pub env_file: Option<Utf8PathBuf>,
    /// Report format used when `--format` is not given.
    pub format: Option<OutputFormat>,
    /// Hide notices unless `--suppress-warnings` is given.
    pub suppress_warnings: Option<bool>,
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("config file {path} not found")]
    NotFound {
        /// Requested path.
        path: Utf8PathBuf,
    },

    /// The config file exists but could not be read.
    #[error("failed to read config file {path}")]
    Read {
        /// Path that was read.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML or contains unknown keys.
    #[error("invalid config file {path}: {message}")]
    Parse {
        /// Path that was parsed.
        path: Utf8PathBuf,
        /// Parser message.
        message: String,
    },
}

impl LintConfig {
    /// Load configuration from `explicit`, or from [`DEFAULT_CONFIG_FILE`]
    /// when no path is given.
    ///
    /// A missing default file yields the default configuration; a missing
    /// explicit file is an error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed.
    pub fn load(explicit: Option<&Utf8Path>) -> Result<Self, ConfigError> {
        Self::load_with(explicit, read_if_present)
    }

    /// Load configuration using the supplied reader.
    ///
    /// The reader returns `Ok(None)` when the file does not exist. This
    /// variant exists so tests can simulate the file system.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the reader fails, the explicit file is
    /// missing, or the contents do not parse.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use env_lint::config::LintConfig;
    /// use env_lint::report::OutputFormat;
    ///
    /// let config = LintConfig::load_with(None, |_| Ok(Some("format = \"json\"\n".to_owned())))
    ///     .expect("config should load");
    /// assert_eq!(config.format, Some(OutputFormat::Json));
    ///
    /// let absent = LintConfig::load_with(None, |_| Ok(None)).expect("missing default is fine");
    /// assert_eq!(absent, LintConfig::default());
    ///
    /// let missing = LintConfig::load_with(Some(Utf8Path::new("ci.toml")), |_| Ok(None));
    /// assert!(missing.is_err());
    /// ```
    pub fn load_with<F>(explicit: Option<&Utf8Path>, reader: F) -> Result<Self, ConfigError>
    where
        F: FnOnce(&Utf8Path) -> std::io::Result<Option<String>>,
    {
        let path = explicit.unwrap_or_else(|| Utf8Path::new(DEFAULT_CONFIG_FILE));
        let contents = reader(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;

        let Some(contents) = contents else {
            if explicit.is_some() {
                return Err(ConfigError::NotFound {
                    path: path.to_owned(),
                });
            }
            debug!("no {DEFAULT_CONFIG_FILE} found; using built-in defaults");
            return Ok(Self::default());
        };

        let config = Self::from_toml_str(&contents).map_err(|err| ConfigError::Parse {
            path: path.to_owned(),
            message: err.message().trim_end().to_owned(),
        })?;
        debug!("loaded configuration from {path}");

        Ok(config.relative_to(path.parent().unwrap_or_else(|| Utf8Path::new(""))))
    }

    /// Parse configuration from TOML text without resolving paths.
    ///
    /// # Errors
    ///
    /// Returns the TOML error for malformed text or unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    fn relative_to(self, base: &Utf8Path) -> Self {
        let resolve = |path: Utf8PathBuf| {
            if path.is_absolute() || base.as_str().is_empty() {
                path
            } else {
                base.join(path)
            }
        };

        Self {
            schema: self.schema.map(resolve),
            env_file: self.env_file.map(resolve),
            ..self
        }
    }
}

fn read_if_present(path: &Utf8Path) -> std::io::Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn stub(contents: &'static str) -> impl FnOnce(&Utf8Path) -> std::io::Result<Option<String>> {
        move |_| Ok(Some(contents.to_owned()))
    }

    #[rstest]
    fn defaults_leave_every_setting_unset() {
        let config = LintConfig::default();

        assert!(config.schema.is_none());
        assert!(config.env_file.is_none());
        assert!(config.format.is_none());
        assert!(config.suppress_warnings.is_none());
    }

    #[rstest]
    fn deserialises_all_settings() {
        let source = concat!(
            "schema = \"config/env-schema.json\"\n",
            "env_file = \".env.ci\"\n",
            "format = \"json\"\n",
            "suppress_warnings = true\n",
        );

        let config = LintConfig::from_toml_str(source).expect("config should parse");

        assert_eq!(
            config.schema.as_deref(),
            Some(Utf8Path::new("config/env-schema.json"))
        );
        assert_eq!(config.env_file.as_deref(), Some(Utf8Path::new(".env.ci")));
        assert_eq!(config.format, Some(OutputFormat::Json));
        assert_eq!(config.suppress_warnings, Some(true));
    }

    #[rstest]
    #[case::unknown_key("strict = true\n")]
    #[case::wrong_type("suppress_warnings = \"yes\"\n")]
    #[case::unknown_format("format = \"yaml\"\n")]
    fn rejects_invalid_settings(#[case] source: &str) {
        assert!(LintConfig::from_toml_str(source).is_err());
    }

    #[rstest]
    fn load_with_reads_the_default_file() {
        let config = LintConfig::load_with(None, |path| {
            assert_eq!(path.as_str(), DEFAULT_CONFIG_FILE);
            Ok(Some("suppress_warnings = true\n".to_owned()))
        })
        .expect("config should load");

        assert_eq!(config.suppress_warnings, Some(true));
    }

    #[rstest]
    fn explicit_file_paths_resolve_against_its_directory() {
        let config = LintConfig::load_with(
            Some(Utf8Path::new("deploy/env-lint.toml")),
            stub("schema = \"env-schema.toml\"\nenv_file = \"/etc/app.env\"\n"),
        )
        .expect("config should load");

        assert_eq!(
            config.schema.as_deref(),
            Some(Utf8Path::new("deploy/env-schema.toml"))
        );
        assert_eq!(config.env_file.as_deref(), Some(Utf8Path::new("/etc/app.env")));
    }

    #[rstest]
    fn missing_explicit_file_is_an_error() {
        let err = LintConfig::load_with(Some(Utf8Path::new("ci.toml")), |_| Ok(None))
            .expect_err("explicit config must exist");

        assert!(matches!(err, ConfigError::NotFound { .. }));
        assert_eq!(err.to_string(), "config file ci.toml not found");
    }

    #[rstest]
    fn parse_errors_name_the_file() {
        let err = LintConfig::load_with(None, stub("format = \"yaml\"\n"))
            .expect_err("unknown format should fail");

        assert!(err.to_string().starts_with("invalid config file env-lint.toml:"));
    }

    #[rstest]
    fn read_errors_keep_their_source() {
        let err = LintConfig::load_with(None, |_| {
            Err(std::io::Error::other("permission denied"))
        })
        .expect_err("read failure should propagate");

        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[rstest]
    fn load_reads_files_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("env-lint.toml"))
            .expect("temp path should be UTF-8");
        std::fs::write(&path, "format = \"human\"\n").expect("write config");

        let config = LintConfig::load(Some(&path)).expect("config should load");

        assert_eq!(config.format, Some(OutputFormat::Human));
    }
}
