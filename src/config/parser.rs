//! Configuration parser for loading the provisioning configuration.
//!
//! This module handles loading configuration from YAML files, `.env`
//! files and environment variables, with proper precedence and error handling.

use crate::error::{ConfigError, ProvisionError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::spec::ProvisionConfig;

/// Environment variable overriding `controller.url`.
pub const ENV_URL: &str = "NSO_URL";

/// Environment variable overriding `controller.username`.
pub const ENV_USERNAME: &str = "NSO_USERNAME";

/// Environment variable overriding `controller.password`.
pub const ENV_PASSWORD: &str = "NSO_PASSWORD";

/// Configuration parser for loading provisioning configuration.
#[derive(Debug, Default)]
pub struct ConfigParser {
    /// Base path for resolving relative paths.
    base_path: Option<PathBuf>,
}

impl ConfigParser {
    /// Creates a new configuration parser.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the base path for resolving relative paths.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads configuration from a YAML file.
    ///
    /// Relative paths inside the file are resolved against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<ProvisionConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(ProvisionError::Config(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            ProvisionError::Config(ConfigError::ParseError {
                message: format!("Failed to read file: {e}"),
                location: Some(path.display().to_string()),
            })
        })?;

        let mut config = self.parse_yaml(&content, Some(path))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.resolve_paths(base);

        Ok(config)
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<ProvisionConfig> {
        debug!("Parsing YAML configuration");

        let config: ProvisionConfig = serde_yaml::from_str(content).map_err(|e| {
            let location = source.map(|p| p.display().to_string());
            ProvisionError::Config(ConfigError::ParseError {
                message: format!("YAML parse error: {e}"),
                location,
            })
        })?;

        debug!(
            "Parsed configuration for service {} at {}",
            config.service.resource_name(),
            config.controller.url
        );
        Ok(config)
    }

    /// Loads configuration with environment variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if no
    /// password is available from either the file or the environment.
    pub fn load_with_env(&self, path: impl AsRef<Path>) -> Result<ProvisionConfig> {
        let mut config = self.load_file(path)?;

        Self::apply_env_overrides(&mut config);

        if config.controller.password.is_none() {
            return Err(ProvisionError::Config(ConfigError::MissingEnvVar {
                name: String::from(ENV_PASSWORD),
            }));
        }

        Ok(config)
    }

    /// Applies environment variable overrides to the configuration.
    fn apply_env_overrides(config: &mut ProvisionConfig) {
        if let Ok(url) = std::env::var(ENV_URL) {
            debug!("Overriding controller.url from environment");
            config.controller.url = url;
        }

        if let Ok(username) = std::env::var(ENV_USERNAME) {
            debug!("Overriding controller.username from environment");
            config.controller.username = username;
        }

        if let Ok(password) = std::env::var(ENV_PASSWORD) {
            debug!("Overriding controller.password from environment");
            config.controller.password = Some(password);
        }
    }

    /// Loads the .env file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| {
                ProvisionError::Config(ConfigError::ParseError {
                    message: format!("Failed to load .env file: {e}"),
                    location: Some(env_path.display().to_string()),
                })
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }
}

/// Default configuration file names to search for.
pub const DEFAULT_CONFIG_FILES: &[&str] = &["provision.yaml", "provision.yml", "config.yaml"];

/// Finds the configuration file in the given directory or its parents.
///
/// # Errors
///
/// Returns an error if no configuration file is found.
pub fn find_config_file(start_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let start = start_dir.as_ref();
    let mut current = start.to_path_buf();

    loop {
        for filename in DEFAULT_CONFIG_FILES {
            let config_path = current.join(filename);
            if config_path.exists() {
                info!("Found configuration file: {}", config_path.display());
                return Ok(config_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    Err(ProvisionError::Config(ConfigError::FileNotFound {
        path: start.join(DEFAULT_CONFIG_FILES[0]),
    }))
}
