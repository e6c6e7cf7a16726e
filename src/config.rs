//! Generator configuration.
//!
//! Looked up in this order:
//!
//! 1. an explicit `--config <path>`
//! 2. `./sql2godb.toml`
//! 3. `<config dir>/sql2godb/config.toml` (e.g. `~/.config` on Linux)
//!
//! ```toml
//! package = "store"
//! timeout_secs = 5
//! db_type = "DB"
//! conflict_error = "ErrEditConflict"
//! on_error = "skip-table"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{GenError, GenResult};
use crate::ident::is_go_keyword;

/// Project-local config file name.
pub const FILE_NAME: &str = "sql2godb.toml";

/// Largest timeout whose `time.Second*N` still fits Go's `int64` nanoseconds.
pub const MAX_TIMEOUT_SECS: u64 = i64::MAX as u64 / 1_000_000_000;

/// What to do when one table cannot be generated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    /// Stop the run; nothing is written.
    #[default]
    Abort,
    /// Leave the table out and keep going.
    SkipTable,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Go package in the generated header.
    pub package: String,
    /// Timeout of every generated database call, in seconds.
    pub timeout_secs: u64,
    /// Handle type the generated functions take as `db`.
    pub db_type: String,
    /// Error returned by Update when the version check fails.
    pub conflict_error: Option<String>,
    pub on_error: ErrorPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            package: "data".to_string(),
            timeout_secs: 3,
            db_type: "DB".to_string(),
            conflict_error: None,
            on_error: ErrorPolicy::Abort,
        }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> GenResult<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| GenError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> GenResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            GenError::Config(format!("failed to read '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&content).map_err(|e| match e {
            GenError::Config(msg) => GenError::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    /// Load the explicit file if given, otherwise the first discovered one,
    /// otherwise defaults.
    pub fn load(explicit: Option<&Path>) -> GenResult<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let cwd = std::env::current_dir()?;
        match discover(&cwd) {
            Some(path) => {
                tracing::info!(path = %path.display(), "loading config");
                Self::from_file(&path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Reject values that would produce invalid Go.
    pub fn validate(&self) -> GenResult<()> {
        if !is_go_identifier(&self.package) {
            return Err(GenError::Config(format!(
                "package '{}' is not a valid Go identifier",
                self.package
            )));
        }
        if !is_go_identifier(&self.db_type) {
            return Err(GenError::Config(format!(
                "db_type '{}' is not a valid Go identifier",
                self.db_type
            )));
        }
        if self.timeout_secs == 0 {
            return Err(GenError::Config("timeout_secs must be at least 1".to_string()));
        }
        if self.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(GenError::Config(format!(
                "timeout_secs must be at most {}",
                MAX_TIMEOUT_SECS
            )));
        }
        if let Some(name) = &self.conflict_error {
            // allow a qualified name such as data.ErrEditConflict
            if !name.split('.').all(is_go_identifier) {
                return Err(GenError::Config(format!(
                    "conflict_error '{}' is not a valid Go identifier",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Find a config file starting from `cwd`.
pub fn discover(cwd: &Path) -> Option<PathBuf> {
    let local = cwd.join(FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("sql2godb").join("config.toml"))
        .filter(|path| path.is_file())
}

fn is_go_identifier(s: &str) -> bool {
    if is_go_keyword(s) {
        return false;
    }
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
