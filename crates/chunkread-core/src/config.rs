use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result, anyhow};
use tracing::warn;

use crate::mode::ModePolicy;

pub const DEFAULT_DATA_DIR: &str = "passages";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    White,
    Black,
    Pink,
    Sky,
    Green,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::White => "white",
            Theme::Black => "black",
            Theme::Pink => "pink",
            Theme::Sky => "sky",
            Theme::Green => "green",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Theme::White => "White",
            Theme::Black => "Black",
            Theme::Pink => "Pink",
            Theme::Sky => "Sky",
            Theme::Green => "Green",
        }
    }

    pub fn all() -> Vec<Theme> {
        vec![Theme::White, Theme::Black, Theme::Pink, Theme::Sky, Theme::Green]
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub data_dir: Option<PathBuf>,
    pub theme: Option<Theme>,
    pub chunk_mode_requires_selection: bool,
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            data_dir: None,
            theme: None,
            chunk_mode_requires_selection: true,
            log_level: None,
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)
            .with_context(|| format!("Malformed config at {}", config_path.display()))?;
        Ok(config)
    }

    /// Load the config, falling back to defaults. The load error is handed
    /// back so it can be logged once logging is up.
    pub fn load_or_default() -> (Self, Option<anyhow::Error>) {
        match Self::get_config_path() {
            Ok(path) => Self::load_or_default_from(&path),
            Err(e) => (Self::new(), Some(e)),
        }
    }

    pub fn load_or_default_from(config_path: &Path) -> (Self, Option<anyhow::Error>) {
        match Self::load_from(config_path) {
            Ok(config) => (config, None),
            Err(e) => (Self::new(), Some(e)),
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    pub fn save_theme(theme: Theme) -> Result<()> {
        let (mut config, error) = Self::load_or_default();
        if let Some(e) = error {
            warn!(error = %format!("{:#}", e), "Replacing unreadable config while saving theme");
        }
        config.theme = Some(theme);
        config.save()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }

    pub fn mode_policy(&self) -> ModePolicy {
        ModePolicy {
            chunk_requires_selection: self.chunk_mode_requires_selection,
        }
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("chunkread").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
        assert_eq!(config.data_dir(), PathBuf::from(DEFAULT_DATA_DIR));
        assert!(config.mode_policy().chunk_requires_selection);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::new();
        config.theme = Some(Theme::Sky);
        config.chunk_mode_requires_selection = false;
        config.data_dir = Some(PathBuf::from("/srv/passages"));
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert!(!loaded.mode_policy().chunk_requires_selection);
    }

    #[test]
    fn test_malformed_config_falls_back_with_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "theme": "#).unwrap();

        let (config, error) = Config::load_or_default_from(&path);
        assert_eq!(config, Config::new());
        let error = error.expect("malformed config should report an error");
        assert!(error.to_string().starts_with("Malformed config at"));
    }

    #[test]
    fn test_missing_config_reports_no_error() {
        let dir = TempDir::new().unwrap();
        let (config, error) = Config::load_or_default_from(&dir.path().join("config.json"));
        assert_eq!(config, Config::new());
        assert!(error.is_none());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "theme": "black" }"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.theme, Some(Theme::Black));
        assert!(config.chunk_mode_requires_selection);
    }
}
