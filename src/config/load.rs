//! Configuration loading from files.
//!
//! `folio.yaml` is read through the `config` crate so any field can be
//! overridden from the environment, e.g. `FOLIO__SITE__NAME=Portfolio`.

use std::path::{Path, PathBuf};

use super::{ConfigError, FolioConfig};

/// The config file used when none is given on the command line.
pub const DEFAULT_CONFIG_FILE: &str = "folio.yaml";

impl FolioConfig {
    /// Load the config from the command line argument, defaulting to `folio.yaml`.
    ///
    /// Relative paths inside the config are resolved against the config
    /// file's directory.
    pub async fn load_from_arg(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config_file = config_file.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
        let config_file = if config_file.is_relative() {
            std::env::current_dir()
                .map_err(ConfigError::CwdFailure)?
                .join(config_file)
        } else {
            config_file.to_path_buf()
        };

        let mut config = Self::load_from_file(&config_file).await?;
        config.resolve_paths(&base_path_from_config(&config_file));
        Ok(config)
    }

    /// Load the config from a file path, applying `FOLIO__*` environment overrides
    pub(crate) async fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let path_str = path
            .as_os_str()
            .to_str()
            .ok_or_else(|| ConfigError::EncodePath(path.to_path_buf()))?;

        Ok(config::Config::builder()
            .add_source(config::File::new(path_str, config::FileFormat::Yaml))
            .add_source(
                config::Environment::with_prefix("FOLIO")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<FolioConfig>()?)
    }
}

/// Get the base path from a config file path (its parent directory).
pub fn base_path_from_config(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}
