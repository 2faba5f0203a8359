//! User configuration

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::entities::run::DEFAULT_CREATED_BY;

/// Environment variable overriding the snapshot path
pub const STORE_ENV: &str = "TLEDGER_STORE";
/// Environment variable overriding the run author
pub const AUTHOR_ENV: &str = "TLEDGER_AUTHOR";
/// Environment variable holding `EnvFilter` directives
pub const LOG_ENV: &str = "TLEDGER_LOG";

const DEFAULT_LOG_LEVEL: &str = "warn";
const STORE_FILE: &str = "store.json";

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    #[diagnostic(code(testledger::config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {message}")]
    #[diagnostic(
        code(testledger::config::yaml),
        help("config keys are store_path, author and log_level")
    )]
    Yaml { path: PathBuf, message: String },
}

/// Settings read from `config.yaml` and the environment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Snapshot file
    pub store_path: Option<PathBuf>,
    /// Default `createdBy` for new runs
    pub author: Option<String>,
    /// Level or `EnvFilter` directives
    pub log_level: Option<String>,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "testledger")
}

impl Config {
    /// Load the user config file, then apply environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match project_dirs() {
            Some(dirs) => Self::load_from(&dirs.config_dir().join("config.yaml"))?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Load from a specific file; a missing file gives the defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yml::from_str(content).map_err(|e| ConfigError::Yaml {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Apply `TLEDGER_STORE` and `TLEDGER_AUTHOR`
    pub fn apply_env(&mut self) {
        if let Some(store) = non_empty_env(STORE_ENV) {
            self.store_path = Some(PathBuf::from(store));
        }
        if let Some(author) = non_empty_env(AUTHOR_ENV) {
            self.author = Some(author);
        }
    }

    /// Snapshot file to use; falls back to the platform data dir
    pub fn store_path(&self) -> PathBuf {
        if let Some(path) = &self.store_path {
            return path.clone();
        }
        match project_dirs() {
            Some(dirs) => dirs.data_dir().join(STORE_FILE),
            None => PathBuf::from(STORE_FILE),
        }
    }

    pub fn author(&self) -> &str {
        self.author.as_deref().unwrap_or(DEFAULT_CREATED_BY)
    }

    /// Directives for the log filter
    ///
    /// `TLEDGER_LOG` wins over the configured level; `verbose` forces debug.
    pub fn log_directives(&self, verbose: bool) -> String {
        if verbose {
            return "debug".to_string();
        }
        non_empty_env(LOG_ENV)
            .or_else(|| self.log_level.clone().filter(|l| !l.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
    }

    /// Filter for the tracing subscriber; bad directives fall back to `warn`
    pub fn env_filter(&self, verbose: bool) -> EnvFilter {
        EnvFilter::try_new(self.log_directives(verbose))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let tmp = tempdir().unwrap();
        let config = Config::load_from(&tmp.path().join("config.yaml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.author(), DEFAULT_CREATED_BY);
    }

    #[test]
    fn test_parse_yaml() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(
            &path,
            "store_path: /tmp/ledger.json\nauthor: qa@example.com\nlog_level: info\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.store_path(), PathBuf::from("/tmp/ledger.json"));
        assert_eq!(config.author(), "qa@example.com");
        assert_eq!(config.log_level.as_deref(), Some("info"));
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "author: [unclosed").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Yaml { .. })
        ));
    }

    #[test]
    fn test_verbose_forces_debug() {
        let config = Config {
            log_level: Some("error".into()),
            ..Config::default()
        };
        assert_eq!(config.log_directives(true), "debug");
    }

    #[test]
    fn test_default_store_path_ends_with_file_name() {
        let config = Config::default();
        assert!(config.store_path().ends_with(STORE_FILE));
    }
}
