//! Service configuration.
//!
//! Read from a TOML file, either the one given with `--config` or
//! `config.toml` in the platform config directory, then overridden by
//! `RECORD_CLEANER_*` environment variables.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use rc_client::{DEFAULT_TIMEOUT_SECS, ServiceConfig};
use rc_core::DEFAULT_BATCH_SIZE;
use serde::{Deserialize, Serialize};

pub const ENV_SERVICE_URL: &str = "RECORD_CLEANER_SERVICE_URL";
pub const ENV_USERNAME: &str = "RECORD_CLEANER_USERNAME";
pub const ENV_PASSWORD: &str = "RECORD_CLEANER_PASSWORD";

/// Contents of the configuration file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub service_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout_secs: Option<u64>,
    pub batch_size: Option<usize>,
}

/// Resolved application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub service: ServiceConfig,
    pub batch_size: usize,
    /// File the settings were read from, if any.
    pub source: Option<PathBuf>,
}

impl AppConfig {
    /// Default location of the configuration file.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("org", "BiologicalRecordsCentre", "record-cleaner")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("record-cleaner.toml"))
    }

    /// Load from `path`, or the default location when `None`, applying
    /// environment overrides.
    ///
    /// An explicit path must exist; a missing default file is treated as
    /// empty.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// As [`AppConfig::load`], with environment lookups supplied by `env`.
    pub fn load_with_env(path: Option<&Path>, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let (file, source) = match path {
            Some(path) => (read_config_file(path)?, Some(path.to_path_buf())),
            None => {
                let default = Self::default_path();
                if default.exists() {
                    (read_config_file(&default)?, Some(default))
                } else {
                    (ConfigFile::default(), None)
                }
            }
        };
        Self::resolve(file, source, env)
    }

    fn resolve(
        file: ConfigFile,
        source: Option<PathBuf>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let service_url = env(ENV_SERVICE_URL)
            .or(file.service_url)
            .unwrap_or_default();
        if service_url.trim().is_empty() {
            let location = source.clone().unwrap_or_else(Self::default_path);
            bail!(
                "no service URL configured; set service_url in {} or {ENV_SERVICE_URL}",
                location.display()
            );
        }
        let username = env(ENV_USERNAME).or(file.username).unwrap_or_default();
        let password = env(ENV_PASSWORD).or(file.password).unwrap_or_default();

        let mut service = ServiceConfig::new(service_url).with_credentials(username, password);
        service.timeout_secs = file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        Ok(Self {
            service,
            batch_size: file.batch_size.unwrap_or(DEFAULT_BATCH_SIZE).max(1),
            source,
        })
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parse config {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn file_values_are_used() {
        let file = ConfigFile {
            service_url: Some("https://cleaner.example.org/".into()),
            username: Some("alice".into()),
            password: Some("secret".into()),
            timeout_secs: Some(5),
            batch_size: Some(0),
        };
        let config = AppConfig::resolve(file, None, no_env).expect("config");
        assert_eq!(config.service.service_url, "https://cleaner.example.org/");
        assert_eq!(config.service.username, "alice");
        assert_eq!(config.service.timeout_secs, 5);
        assert_eq!(config.batch_size, 1);
    }

    #[test]
    fn environment_overrides_file() {
        let file = ConfigFile {
            service_url: Some("https://old.example.org".into()),
            password: Some("old".into()),
            ..ConfigFile::default()
        };
        let env = |key: &str| match key {
            ENV_SERVICE_URL => Some("https://new.example.org".to_string()),
            ENV_PASSWORD => Some("new".to_string()),
            _ => None,
        };
        let config = AppConfig::resolve(file, None, env).expect("config");
        assert_eq!(config.service.service_url, "https://new.example.org");
        assert_eq!(config.service.password, "new");
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
    }

    #[test]
    fn missing_url_is_an_error() {
        let err = AppConfig::resolve(ConfigFile::default(), None, no_env).expect_err("no url");
        assert!(err.to_string().contains(ENV_SERVICE_URL));
    }
}
