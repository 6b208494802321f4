pub mod theme;

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{de::DeserializeOwned, Deserialize};

use crate::{
    error::LoadError,
    helpers::{constants::paths::settings_path, extension_of},
};

use self::theme::{MenuStyles, Style};

const DEFAULT_SETTINGS: &str = include_str!("./default_settings.json5");

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub normal: Style,
    #[serde(default = "default_highlight")]
    pub highlight: Style,
    #[serde(default = "default_show_exit_option")]
    pub show_exit_option: bool,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_highlight() -> Style {
    MenuStyles::default().highlight
}

fn default_show_exit_option() -> bool {
    true
}

fn default_poll_interval_ms() -> u64 {
    50
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            normal: Style::default(),
            highlight: default_highlight(),
            show_exit_option: default_show_exit_option(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Settings {
    pub fn default_path() -> PathBuf {
        settings_path()
    }

    pub fn styles(&self) -> MenuStyles {
        MenuStyles {
            normal: self.normal,
            highlight: self.highlight,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn parse_default() -> Result<Self, LoadError> {
        Ok(json5::from_str(DEFAULT_SETTINGS)?)
    }

    pub fn load(path: &Path) -> Result<Self, LoadError> {
        log::debug!("Loading settings from {:?}", path);
        load_by_path(path)
    }

    /// Loads the settings file, writing the default one first if it doesn't
    /// exist yet. Any failure is logged and the built-in defaults are used.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            if let Err(err) = Self::write_default(path) {
                log::warn!("Failed to write default settings to {:?}: {}", path, err);
                return Self::default();
            }
        }

        match Self::load(path) {
            Ok(settings) => settings,
            Err(err) => {
                log::error!("Failed to load settings from {:?}: {}", path, err);
                Self::default()
            }
        }
    }

    pub fn write_default(path: &Path) -> Result<(), LoadError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, DEFAULT_SETTINGS)?;
        Ok(())
    }

    pub fn reset_config(path: &Path) -> Result<(), LoadError> {
        log::info!("Resetting settings at {:?}", path);
        Self::write_default(path)
    }
}

/// Reads `path` and deserializes it as json5 or toml, picked by extension.
pub fn load_by_path<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let content = fs::read_to_string(path)?;
    parse_by_extension(path, &content)
}

pub fn parse_by_extension<T: DeserializeOwned>(path: &Path, content: &str) -> Result<T, LoadError> {
    match extension_of(path).as_deref() {
        Some("toml") => Ok(toml::from_str(content)?),
        Some("json") | Some("json5") => Ok(json5::from_str(content)?),
        _ => Err(LoadError::UnknownExtension(path.to_path_buf())),
    }
}
