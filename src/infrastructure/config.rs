use std::path::{Path, PathBuf};

use config::ConfigError;
use serde::Deserialize;

use crate::utils;

const CONFIG: &str = include_str!("../../.config/config.json5");

const CONFIG_FILES: [(&str, config::FileFormat); 5] = [
    ("config.json5", config::FileFormat::Json5),
    ("config.json", config::FileFormat::Json),
    ("config.yaml", config::FileFormat::Yaml),
    ("config.toml", config::FileFormat::Toml),
    ("config.ini", config::FileFormat::Ini),
];

/// Where the configuration was read from
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigPaths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
    /// User files layered over the embedded defaults, in load order
    pub config_files: Vec<PathBuf>,
}

/// Settings for the generated in-memory message stream
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct SourceConfig {
    #[serde(default = "default_message_count")]
    pub message_count: usize,
    #[serde(default)]
    pub latency_ms: u64,
    #[serde(default)]
    pub reply_every: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            message_count: default_message_count(),
            latency_ms: 0,
            reply_every: 0,
        }
    }
}

fn default_message_count() -> usize {
    200
}

fn default_page_size() -> usize {
    25
}

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    #[serde(skip)]
    pub paths: ConfigPaths,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default)]
    pub source: SourceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: ConfigPaths::default(),
            page_size: default_page_size(),
            source: SourceConfig::default(),
        }
    }
}

impl Config {
    /// Load the configuration from the user's config directory
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_from(&utils::get_config_dir(), &utils::get_data_dir())
    }

    /// The defaults shipped with the binary
    pub fn embedded() -> Result<Self, ConfigError> {
        json5::from_str(CONFIG)
            .map_err(|e| ConfigError::Message(format!("Failed to load default config: {e}")))
    }

    /// Layer the embedded defaults and any `config.*` file found in `config_dir`
    pub fn load_from(config_dir: &Path, data_dir: &Path) -> Result<Self, ConfigError> {
        let user_files: Vec<_> = CONFIG_FILES
            .iter()
            .map(|(file, format)| (config_dir.join(file), *format))
            .filter(|(path, _)| path.exists())
            .collect();

        let mut cfg = if user_files.is_empty() {
            tracing::info!(dir = %config_dir.display(), "No configuration file found, using defaults");
            Self::embedded()?
        } else {
            let mut builder = config::Config::builder()
                .add_source(config::File::from_str(CONFIG, config::FileFormat::Json5));
            for (path, format) in &user_files {
                builder = builder.add_source(config::File::from(path.as_path()).format(*format));
            }
            builder.build()?.try_deserialize::<Self>()?
        };

        cfg.paths = ConfigPaths {
            config_dir: config_dir.to_path_buf(),
            data_dir: data_dir.to_path_buf(),
            config_files: user_files.into_iter().map(|(path, _)| path).collect(),
        };
        cfg.validate()?;
        tracing::info!(
            files = ?cfg.paths.config_files,
            data_dir = %cfg.paths.data_dir.display(),
            page_size = cfg.page_size,
            "Configuration loaded"
        );
        Ok(cfg)
    }

    /// Apply a page size given on the command line
    pub fn with_page_size(mut self, page_size: Option<usize>) -> Result<Self, ConfigError> {
        if let Some(page_size) = page_size {
            self.page_size = page_size;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Message(String::from(
                "page_size must be greater than zero",
            )));
        }
        Ok(())
    }
}
