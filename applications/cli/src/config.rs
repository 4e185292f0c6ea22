/// CLI configuration
use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use soul_queue::QueueConfig;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default)]
    pub queue: QueueConfig,

    #[serde(default = "default_storage")]
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

impl CliConfig {
    /// Load configuration from file and environment
    ///
    /// Reads `path` (which must exist) or `./config.toml` when present, then
    /// applies `SOUL_`-prefixed environment variables, e.g.
    /// `SOUL_QUEUE__WINDOW_SIZE=200` or `SOUL_STORAGE__DATABASE_URL=...`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let config_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if config_path.exists() {
                    settings = settings.add_source(config::File::from(config_path));
                }
            }
        }

        // Override with environment variables (prefixed with SOUL_)
        settings = settings.add_source(
            config::Environment::with_prefix("SOUL")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.queue.window_size == 0 {
            return Err(CliError::Config(
                "queue.window_size must be at least 1".to_string(),
            ));
        }

        if self.queue.lookahead_threshold > self.queue.window_size {
            tracing::warn!(
                "lookahead_threshold {} exceeds window_size {}; every advance will refill",
                self.queue.lookahead_threshold,
                self.queue.window_size
            );
        }

        if self.storage.database_url.is_empty() {
            return Err(CliError::Config(
                "Database URL is required (set SOUL_STORAGE__DATABASE_URL)".to_string(),
            ));
        }

        Ok(())
    }
}

// Default values
fn default_storage() -> StorageSettings {
    StorageSettings {
        database_url: default_database_url(),
    }
}

fn default_database_url() -> String {
    "sqlite://./data/soul-queue.db".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            queue: QueueConfig::default(),
            storage: default_storage(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = write_config(
            r#"
            [queue]
            window_size = 40

            [storage]
            database_url = "sqlite://./test.db"
            "#,
        );

        let config = CliConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.queue.window_size, 40);
        assert_eq!(
            config.queue.lookahead_threshold,
            soul_queue::DEFAULT_LOOKAHEAD_THRESHOLD
        );
        assert_eq!(config.storage.database_url, "sqlite://./test.db");
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let file = write_config("");

        let config = CliConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.queue, QueueConfig::default());
        assert_eq!(config.storage.database_url, default_database_url());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = CliConfig::load(Some(Path::new("/nonexistent/soul-queue.toml")));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_window() {
        let mut config = CliConfig::default();
        config.queue.window_size = 0;
        assert!(config.validate().is_err());

        assert!(CliConfig::default().validate().is_ok());
    }
}
