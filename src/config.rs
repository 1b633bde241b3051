//! Configuration System
//!
//! Host-supplied startup parameters. Layers are merged lowest to highest:
//! built-in defaults, the global config file, an explicit config file, then
//! `STAGECOACH__*` environment variables. The coordinator only ever reads the
//! resulting [`StartupParameters`].

use crate::error::ConfigError;
use crate::logging::LoggingConfig;
use crate::platform::PlatformKind;
use config::Environment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

mod merge;
mod sources;

pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartupParameters {
    /// Running under an automated test harness that drives the loop itself
    #[serde(default)]
    pub test_harness: bool,

    /// Platform used to select the platform hooks
    #[serde(default)]
    pub platform: PlatformKind,

    /// Backing store settings for the persistent context
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for StartupParameters {
    fn default() -> Self {
        Self {
            test_harness: false,
            platform: PlatformKind::current(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Storage settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory of the persistent store. Unset means a temporary store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    #[serde(default = "default_cache_capacity")]
    pub cache_capacity_bytes: u64,
}

pub(crate) fn default_cache_capacity() -> u64 {
    64 * 1024 * 1024 // 64 MB
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            cache_capacity_bytes: default_cache_capacity(),
        }
    }
}

impl StartupParameters {
    /// Parameters for a test-harness run with a temporary store.
    pub fn for_test_harness() -> Self {
        Self {
            test_harness: true,
            platform: PlatformKind::Headless,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.cache_capacity_bytes == 0 {
            return Err(ConfigError::Invalid(
                "storage.cache_capacity_bytes must be greater than zero".to_string(),
            ));
        }
        if let Some(dir) = &self.storage.data_dir {
            if dir.as_os_str().is_empty() {
                return Err(ConfigError::Invalid(
                    "storage.data_dir cannot be empty".to_string(),
                ));
            }
        }
        // The config layer lowercases keys on load.
        if let Some(module) = self
            .logging
            .modules
            .keys()
            .find(|module| module.chars().any(char::is_uppercase))
        {
            return Err(ConfigError::Invalid(format!(
                "logging.modules key {:?} must be lowercase",
                module
            )));
        }
        Ok(())
    }

    /// Render as TOML. Parameters that would not load back are rejected.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        self.validate()?;
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Layered loader for [`StartupParameters`]
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    explicit_file: Option<PathBuf>,
    include_global: bool,
    include_environment: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            explicit_file: None,
            include_global: true,
            include_environment: true,
        }
    }

    /// Add a config file that must exist. It overrides the global file.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_file = Some(path.into());
        self
    }

    pub fn without_global(mut self) -> Self {
        self.include_global = false;
        self
    }

    pub fn without_environment(mut self) -> Self {
        self.include_environment = false;
        self
    }

    /// Load defaults and a single file, ignoring the global file and the environment.
    pub fn load_from_file(path: &Path) -> Result<StartupParameters, ConfigError> {
        Self::new()
            .with_file(path)
            .without_global()
            .without_environment()
            .load()
    }

    pub fn load(&self) -> Result<StartupParameters, ConfigError> {
        let mut builder = merge::merge_policy::builder_with_defaults()?;

        if self.include_global {
            builder = sources::global_file::add_to_builder(builder)?;
        }
        if let Some(path) = &self.explicit_file {
            builder = sources::explicit_file::add_to_builder(builder, path)?;
        }
        if self.include_environment {
            builder = builder.add_source(
                Environment::with_prefix("STAGECOACH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );
        }

        let params: StartupParameters = builder.build()?.try_deserialize()?;
        params.validate()?;
        debug!(
            test_harness = params.test_harness,
            platform = params.platform.as_str(),
            "Startup parameters loaded"
        );
        Ok(params)
    }
}
