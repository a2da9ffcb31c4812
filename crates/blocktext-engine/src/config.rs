use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::model::BlockKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// Behaviour switches of a [`Document`](crate::model::Document).
///
/// Missing keys take their default value, so an empty file is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Kind of the block created when a consumer registers.
    pub initial_block_kind: BlockKind,
    /// Enter in a block appends a new text block.
    pub split_on_enter: bool,
    /// Backspace at the start of a text block merges it into the previous one.
    pub merge_on_backspace_from_origin: bool,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            initial_block_kind: BlockKind::Text,
            split_on_enter: true,
            merge_on_backspace_from_origin: true,
        }
    }
}

impl DocumentConfig {
    /// Read the config at `config_path`; `None` when there is no such file.
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        let content = match std::fs::read_to_string(config_path) {
            Ok(content) => content,
            Err(source) if source.kind() == ErrorKind::NotFound => {
                log::debug!("no document config at {}", config_path.display());
                return Ok(None);
            }
            Err(source) => {
                return Err(ConfigError::ConfigReadError {
                    config_path: config_path.to_path_buf(),
                    source,
                });
            }
        };

        toml::from_str(&content)
            .map(Some)
            .map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })
    }

    /// The user's config, or the defaults when they have none.
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self::load_from_path(Self::config_path())?.unwrap_or_default())
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(config_path, toml::to_string_pretty(self)?)?;
        log::debug!("saved document config to {}", config_path.display());
        Ok(())
    }

    /// `~/.config/blocktext/config.toml`, with the home directory expanded.
    pub fn config_path() -> PathBuf {
        let home = shellexpand::tilde("~");
        Path::new(home.as_ref()).join(".config/blocktext/config.toml")
    }
}
