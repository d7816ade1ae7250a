//! Configuration loader plus strongly typed settings structures.
//!
//! Settings live in a single TOML file. The default file is embedded in the
//! binary and written out on first run so users have something to edit.

use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyModifiers};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = include_str!("../defaults/config.toml");

/// Environment variable that overrides the data directory
pub const DIR_ENV_VAR: &str = "PLATE_VIEWER_DIR";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_layout_path")]
    pub layout_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UiConfig {
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,
    #[serde(default = "default_cell_width")]
    pub cell_width: u16,
    #[serde(default = "default_mount")]
    pub mount: String,
    #[serde(default = "default_advance_key")]
    pub advance_key: String,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8888".to_string()
}

fn default_layout_path() -> String {
    "/plate_layout".to_string()
}

fn default_poll_timeout_ms() -> u64 {
    16
}

fn default_cell_width() -> u16 {
    15
}

fn default_mount() -> String {
    "plate-viewer".to_string()
}

fn default_advance_key() -> String {
    "enter".to_string()
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            layout_path: default_layout_path(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            poll_timeout_ms: default_poll_timeout_ms(),
            cell_width: default_cell_width(),
            mount: default_mount(),
            advance_key: default_advance_key(),
        }
    }
}

impl Config {
    /// Load `config.toml` from the data directory, writing the default file
    /// there first if it does not exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            Self::extract_default(&path)?;
        }
        Self::load_from_path(&path)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).context(format!("Failed to read config file: {:?}", path))?;
        let config = Self::from_toml_str(&contents)
            .context(format!("Failed to parse config file: {:?}", path))?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    fn extract_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .context(format!("Failed to create config directory: {:?}", parent))?;
        }
        fs::write(path, DEFAULT_CONFIG)
            .context(format!("Failed to write default config: {:?}", path))?;
        tracing::info!("Wrote default config to {:?}", path);
        Ok(())
    }

    /// Get the base directory (~/.plate-viewer/)
    /// Can be overridden with PLATE_VIEWER_DIR environment variable
    pub fn config_dir() -> Result<PathBuf> {
        if let Ok(custom_dir) = std::env::var(DIR_ENV_VAR) {
            return Ok(PathBuf::from(custom_dir));
        }

        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".plate-viewer"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Key that advances focus, falling back to Enter if the setting is not understood
    pub fn advance_binding(&self) -> (KeyCode, KeyModifiers) {
        parse_key_string(&self.ui.advance_key).unwrap_or_else(|| {
            tracing::warn!(
                "Unknown advance_key '{}', using enter",
                self.ui.advance_key
            );
            (KeyCode::Enter, KeyModifiers::NONE)
        })
    }
}

/// Parse a key description like `enter`, `tab` or `ctrl+n`
pub fn parse_key_string(key_str: &str) -> Option<(KeyCode, KeyModifiers)> {
    let parts: Vec<&str> = key_str.split('+').collect();
    let (key_part, modifier_parts) = parts.split_last()?;

    let mut modifiers = KeyModifiers::NONE;
    for part in modifier_parts {
        match part.to_lowercase().as_str() {
            "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
            "alt" => modifiers |= KeyModifiers::ALT,
            "shift" => modifiers |= KeyModifiers::SHIFT,
            _ => return None,
        }
    }

    let key_code = match key_part.to_lowercase().as_str() {
        "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "space" => KeyCode::Char(' '),
        "down" => KeyCode::Down,
        "up" => KeyCode::Up,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "pagedown" | "page_down" => KeyCode::PageDown,
        "pageup" | "page_up" => KeyCode::PageUp,
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                (Some('f'), Some(_)) => KeyCode::F(other[1..].parse().ok()?),
                _ => return None,
            }
        }
    };

    Some((key_code, modifiers))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_default_matches_default() {
        let config = Config::from_toml_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = Config::from_toml_str(
            r#"
            [connection]
            base_url = "http://lab.example:9000"
            "#,
        )
        .unwrap();
        assert_eq!(config.connection.base_url, "http://lab.example:9000");
        assert_eq!(config.connection.layout_path, "/plate_layout");
        assert_eq!(config.ui, UiConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(Config::from_toml_str("[ui]\npoll_timeout_ms = \"fast\"").is_err());
    }

    #[test]
    fn test_parse_key_string() {
        assert_eq!(
            parse_key_string("enter"),
            Some((KeyCode::Enter, KeyModifiers::NONE))
        );
        assert_eq!(
            parse_key_string("ctrl+n"),
            Some((KeyCode::Char('n'), KeyModifiers::CONTROL))
        );
        assert_eq!(
            parse_key_string("alt+shift+down"),
            Some((KeyCode::Down, KeyModifiers::ALT | KeyModifiers::SHIFT))
        );
        assert_eq!(
            parse_key_string("f5"),
            Some((KeyCode::F(5), KeyModifiers::NONE))
        );
        assert_eq!(parse_key_string("hyper+x"), None);
        assert_eq!(parse_key_string("nonsense"), None);
        assert_eq!(parse_key_string(""), None);
    }

    #[test]
    fn test_advance_binding_fallback() {
        let mut config = Config::default();
        config.ui.advance_key = "wat".to_string();
        assert_eq!(
            config.advance_binding(),
            (KeyCode::Enter, KeyModifiers::NONE)
        );

        config.ui.advance_key = "down".to_string();
        assert_eq!(config.advance_binding(), (KeyCode::Down, KeyModifiers::NONE));
    }

    #[test]
    fn test_load_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        Config::extract_default(&path).unwrap();
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config, Config::default());
    }
}
