//! Settings for the catering server.
//!
//! Values are layered: built-in defaults, then an optional
//! `catering.toml` in the working directory, then `CATERING_*`
//! environment variables (`CATERING_BIND`, `CATERING_REPORTS_PATH`,
//! `CATERING_LOG_LEVEL`, `CATERING_STORE`).

use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "catering";
const ENV_PREFIX: &str = "CATERING";

/// Where saved reports are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    File,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bind: String,
    pub reports_path: PathBuf,
    pub log_level: String,
    pub store: StoreKind,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            reports_path: PathBuf::from("data/reports.json"),
            log_level: "info".to_string(),
            store: StoreKind::File,
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_sources(DEFAULT_CONFIG_PATH, Environment::with_prefix(ENV_PREFIX))
    }

    /// Load from `config_path` (extension optional, file optional) and `env`.
    pub fn from_sources(config_path: &str, env: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(config_path).required(false))
            .add_source(env)
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn no_env() -> Environment {
        Environment::with_prefix(ENV_PREFIX).source(Some(Default::default()))
    }

    #[test]
    fn defaults_without_file_or_env() {
        let settings = Settings::from_sources("does/not/exist", no_env()).unwrap();
        assert_eq!(settings.bind, "127.0.0.1:3000");
        assert_eq!(settings.reports_path, PathBuf::from("data/reports.json"));
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.store, StoreKind::File);
    }

    #[test]
    fn file_then_env_override_defaults() {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("target/test_settings")
            .join(uuid::Uuid::new_v4().to_string());
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("catering.toml");
        fs::write(&path, "bind = \"0.0.0.0:8080\"\nlog_level = \"debug\"\n").unwrap();

        let env = Environment::with_prefix(ENV_PREFIX).source(Some(
            [("CATERING_STORE".to_string(), "memory".to_string())]
                .into_iter()
                .collect(),
        ));
        let settings = Settings::from_sources(path.to_str().unwrap(), env).unwrap();
        assert_eq!(settings.bind, "0.0.0.0:8080");
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.store, StoreKind::Memory);
        assert_eq!(settings.reports_path, PathBuf::from("data/reports.json"));

        fs::remove_dir_all(&dir).unwrap();
    }
}
