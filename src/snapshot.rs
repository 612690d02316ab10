//! Immutable environment snapshots.
//!
//! The rule engine never reads the process environment itself. Callers
//! capture it once into an [`EnvironmentSnapshot`] and pass that value in, so
//! a report stays consistent even if the environment changes mid-run and the
//! engine stays a pure function of its inputs.

use std::collections::BTreeMap;
use std::ffi::OsString;

use camino::Utf8Path;
use log::debug;

use crate::dotenv::{DotenvError, read_dotenv};

/// A captured mapping from variable name to raw value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnvironmentSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvironmentSnapshot {
    /// Capture the current process environment.
    ///
    /// Names or values that are not valid UTF-8 are converted lossily; the
    /// conversion is logged at debug level.
    #[must_use]
    pub fn capture() -> Self {
        let snapshot = Self::from_os_pairs(std::env::vars_os());
        debug!(
            "captured {} variable(s) from the process environment",
            snapshot.len()
        );
        snapshot
    }

    fn from_os_pairs(pairs: impl IntoIterator<Item = (OsString, OsString)>) -> Self {
        let vars = pairs
            .into_iter()
            .map(|(key, value)| (lossy(key), lossy(value)))
            .collect();
        Self { vars }
    }

    /// Build a snapshot from name/value pairs. Later duplicates win.
    ///
    /// # Examples
    ///
    /// ```
    /// use env_lint::snapshot::EnvironmentSnapshot;
    ///
    /// let snapshot = EnvironmentSnapshot::from_pairs([("PORT", "80"), ("PORT", "8080")]);
    /// assert_eq!(snapshot.get("PORT"), Some("8080"));
    /// assert_eq!(snapshot.len(), 1);
    /// ```
    #[must_use]
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let vars = pairs
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self { vars }
    }

    /// Build a snapshot from a dotenv file instead of the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`DotenvError`] when the file cannot be read or parsed.
    pub fn from_dotenv_file(path: &Utf8Path) -> Result<Self, DotenvError> {
        let entries = read_dotenv(path)?;
        let snapshot = Self::from_pairs(entries.into_iter().map(|entry| (entry.key, entry.value)));
        debug!("captured {} variable(s) from {path}", snapshot.len());
        Ok(snapshot)
    }

    /// Look up a variable.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Returns true when the variable is set, even to an empty value.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Iterate over variable names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    /// Returns the number of captured variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Returns true when nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

fn lossy(value: OsString) -> String {
    value.into_string().unwrap_or_else(|raw| {
        let converted = raw.to_string_lossy().into_owned();
        debug!("converted non-UTF-8 environment text lossily: {converted}");
        converted
    })
}
