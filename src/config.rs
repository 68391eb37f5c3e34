//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\playdeck\config.toml
//! - macOS: ~/Library/Application Support/playdeck/config.toml
//! - Linux: ~/.config/playdeck/config.toml
//!
//! `PLAYDECK_CONFIG` points at a different file. A missing or broken file
//! never stops the player; defaults are used instead.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "PLAYDECK_CONFIG";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the track catalog comes from
    pub catalog: CatalogConfig,

    /// URL prefixes for songs and images
    pub assets: AssetsConfig,

    /// Playback defaults
    pub playback: PlaybackConfig,
}

/// Track catalog sources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Sectioned track list; the playlist is every section's tracks in order
    pub songs_data: PathBuf,

    /// Per-file metadata (title, artists, image), keyed by bare filename
    pub songs_meta: PathBuf,

    /// More card sections (artists, top songs); they don't extend the playlist
    pub extra_sections: Vec<PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            songs_data: PathBuf::from("assets/data/songsData.json"),
            songs_meta: PathBuf::from("assets/songs/songs.json"),
            extra_sections: vec![
                PathBuf::from("assets/data/artistData.json"),
                PathBuf::from("assets/data/topSongsData.json"),
            ],
        }
    }
}

/// Asset URL prefixes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    pub songs_base: String,
    pub images_base: String,
    /// Image shown when a cover can't be loaded (relative to `images_base`)
    pub placeholder_image: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            songs_base: "./assets/songs/".to_string(),
            images_base: "./assets/images/".to_string(),
            placeholder_image: "placeholder.jpg".to_string(),
        }
    }
}

/// Playback defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Start the first playlist entry as soon as the catalog is loaded
    pub autoplay_first: bool,

    /// Initial volume level (0.0 - 1.0)
    pub volume: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            autoplay_first: true,
            volume: 1.0,
        }
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("playdeck"))
}

/// Get the full path to the config file, honouring `PLAYDECK_CONFIG`
pub fn config_path() -> Option<PathBuf> {
    if let Some(p) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(p));
    }
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from the default location
pub fn load() -> Config {
    match config_path() {
        Some(path) => load_from(&path),
        None => {
            tracing::warn!("Could not determine config directory, using defaults");
            Config::default()
        }
    }
}

/// Load configuration from `path`
///
/// Returns default config if the file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load_from(path: &Path) -> Config {
    if !path.exists() {
        tracing::info!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Save configuration to `path`
///
/// Creates the parent directory if it doesn't exist.
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

/// Save configuration to the default location
pub fn save(config: &Config) -> Result<(), ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to(config, &path)
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[catalog]"));
        assert!(toml.contains("[assets]"));
        assert!(toml.contains("[playback]"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
[playback]
autoplay_first = false
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert!(!config.playback.autoplay_first);
        assert_eq!(config.playback.volume, 1.0);
        assert_eq!(config.assets.songs_base, "./assets/songs/");
        assert_eq!(
            config.catalog.songs_data,
            PathBuf::from("assets/data/songsData.json")
        );
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.playback.volume = 0.5;
        config.assets.images_base = "/static/img/".to_string();
        save_to(&config, &path).unwrap();

        assert_eq!(load_from(&path), config);
        assert!(!path.with_extension("toml.tmp").exists());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_from(&dir.path().join("nope.toml")), Config::default());
    }

    #[test]
    fn test_load_broken_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[playback\nvolume = ").unwrap();
        assert_eq!(load_from(&path), Config::default());
    }
}
