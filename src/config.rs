// Global configuration management

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::engine::{
    DEFAULT_IPD_MM, EncodeConfig, EngineLocator, FixedLocator, SystemLocator, default_configs,
};
use crate::logging::DEFAULT_LOG_FILE;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: DefaultsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// IPD prefilled in the form and used when `--ipd` is absent
    #[serde(default = "default_ipd_mm")]
    pub ipd_mm: f64,

    /// Stop after the hardware encoder fails instead of retrying with libx264
    #[serde(default)]
    pub disable_software_fallback: bool,

    /// Use exactly this ffmpeg binary instead of searching for one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log file, appended to for the process lifetime
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
}

fn default_ipd_mm() -> f64 {
    DEFAULT_IPD_MM
}

fn default_log_file() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_FILE)
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            ipd_mm: default_ipd_mm(),
            disable_software_fallback: false, // Hardware first, then libx264
            engine_path: None,                // Search PATH and friends
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: default_log_file(),
        }
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "macos") {
            dirs::home_dir()
                .context("Could not determine home directory")?
                .join(".config")
                .join("stereoscoper")
        } else {
            dirs::config_dir()
                .context("Could not determine config directory")?
                .join("stereoscoper")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from disk, or create default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = fs::read_to_string(&config_path).with_context(|| {
                format!("Failed to read config file: {}", config_path.display())
            })?;

            Self::parse(&contents)
                .with_context(|| format!("Failed to parse config file: {}", config_path.display()))
        } else {
            let config = Config::default();

            // Not fatal: a read-only config dir just means built-in defaults
            if let Err(e) = config.save() {
                eprintln!("Warning: Could not create default config file: {}", e);
                eprintln!(
                    "Using built-in defaults. Run 'stereoscoper init-config' to create a config file."
                );
            }

            Ok(config)
        }
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).context("Invalid config TOML")?;
        let ipd_mm = config.defaults.ipd_mm;
        ensure!(
            ipd_mm.is_finite(),
            "Invalid defaults.ipd_mm {}: expected a finite number of millimeters",
            ipd_mm
        );
        Ok(config)
    }

    /// Save config to disk
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, contents)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    /// Encode chain honoring `disable_software_fallback`
    pub fn encode_configs(&self) -> Vec<EncodeConfig> {
        let mut configs = default_configs();
        if self.defaults.disable_software_fallback {
            configs.truncate(1);
        }
        configs
    }

    /// Locator honoring `engine_path`
    pub fn engine_locator(&self) -> Box<dyn EngineLocator> {
        match &self.defaults.engine_path {
            Some(path) => Box::new(FixedLocator::new(path)),
            None => Box::new(SystemLocator::new()),
        }
    }
}
