//! Console configuration.
//!
//! Insert a [`ConsoleConfig`] before adding [`ConsolePlugin`](crate::ConsolePlugin)
//! to override the defaults. With the `config-file` feature the configuration can
//! also be read from a RON file.

use std::time::Duration;

use bevy::prelude::*;
#[cfg(feature = "config-file")]
use serde::{Deserialize, Serialize};

use crate::core::ColorTag;

/// Default config file name.
#[cfg(feature = "config-file")]
pub const DEFAULT_CONFIG_FILE: &str = "console.ron";

/// Console settings.
#[derive(Resource, Debug, Clone)]
#[cfg_attr(feature = "config-file", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-file", serde(default))]
pub struct ConsoleConfig {
    /// Key that opens and closes the console while held.
    pub toggle_key: KeyCode,
    /// Key that submits the current input line.
    pub submit_key: KeyCode,
    /// Print the welcome banner on startup.
    pub print_welcome: bool,
    /// Mirror the application's log messages into the console.
    pub print_log_messages: bool,
    /// Move the window back to [`origin`](Self::origin) when the console closes.
    pub reposition_on_close: bool,
    /// Window position captured at startup.
    pub origin: Vec2,
    /// Seconds before the toggle key reacts again after a transition.
    pub toggle_delay_secs: f32,
    /// Name shown in the window title and help banner.
    pub title: String,
    /// Output colors.
    pub colors: ConsoleColors,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            toggle_key: KeyCode::F12,
            submit_key: KeyCode::Enter,
            print_welcome: true,
            print_log_messages: true,
            reposition_on_close: true,
            origin: Vec2::new(40.0, 40.0),
            toggle_delay_secs: 1.0,
            title: "CosmicConsole".to_string(),
            colors: ConsoleColors::default(),
        }
    }
}

impl ConsoleConfig {
    /// The debounce delay as a [`Duration`]. Negative values count as zero.
    pub fn toggle_delay(&self) -> Duration {
        Duration::from_secs_f32(self.toggle_delay_secs.max(0.0))
    }
}

/// Colors used to render [`ColorTag`]s.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "config-file", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-file", serde(default))]
pub struct ConsoleColors {
    pub normal: Color,
    pub info: Color,
    pub warning: Color,
    pub error: Color,
}

impl Default for ConsoleColors {
    fn default() -> Self {
        Self {
            normal: Color::WHITE,
            info: Color::srgb(0.0, 1.0, 1.0),
            warning: Color::srgb(1.0, 1.0, 0.0),
            error: Color::srgb(1.0, 0.5, 0.5),
        }
    }
}

impl ConsoleColors {
    /// Resolve a tag to a concrete color.
    pub fn resolve(&self, tag: ColorTag) -> Color {
        match tag {
            ColorTag::Normal => self.normal,
            ColorTag::Info => self.info,
            ColorTag::Warning => self.warning,
            ColorTag::Error => self.error,
            ColorTag::Custom(color) => color.into(),
        }
    }
}

/// Errors that can occur while reading a config file.
#[cfg(feature = "config-file")]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid RON for [`ConsoleConfig`].
    #[error("failed to parse '{path}': {message}")]
    Parse { path: String, message: String },
}

#[cfg(feature = "config-file")]
impl ConsoleConfig {
    /// Parse a config from RON text. Missing fields keep their defaults.
    pub fn from_ron_str(contents: &str) -> Result<Self, ConfigError> {
        ron::from_str(contents).map_err(|e| ConfigError::Parse {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Load a config from a RON file.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        ron::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Load a config from file, returning the default if it is missing or invalid.
    pub fn load_or_default(path: impl AsRef<std::path::Path>) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Console: {e}, using default config");
                Self::default()
            }
        }
    }
}
