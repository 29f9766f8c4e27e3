use anyhow::Context;
use pairs_core::{ConfigError, Difficulty, StartConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Color theme selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeName {
    #[default]
    Dark,
    Light,
    HighContrast,
}

/// Persistent user settings. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Difficulty preselected in the menu
    pub difficulty: Difficulty,
    /// Custom board size; overrides the difficulty when set
    pub tiles: Option<usize>,
    /// Custom time limit in seconds
    pub time_secs: Option<u64>,
    /// Page to offer after a win
    pub redirect: Option<String>,
    pub theme: ThemeName,
    /// Stats file location; the platform data dir when unset
    pub stats_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Casual,
            tiles: None,
            time_secs: None,
            redirect: None,
            theme: ThemeName::Dark,
            stats_file: None,
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pairs")
            .join("settings.json")
    }

    /// Load settings; a missing file gives the defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        match fs::read_to_string(path) {
            Ok(json) => serde_json::from_str(&json)
                .with_context(|| format!("invalid settings file {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e).with_context(|| format!("cannot read {}", path.display())),
        }
    }

    /// Load settings, falling back to defaults on any error
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            log::warn!("{:#}, using default settings", e);
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("cannot write {}", path.display()))
    }

    /// Whether a custom board is configured
    pub fn is_custom(&self) -> bool {
        self.tiles.is_some() || self.time_secs.is_some()
    }

    /// Start configuration for the next game.
    ///
    /// A custom size without a time limit gets the difficulty's seconds per
    /// pair; a custom time without a size keeps the difficulty's board.
    pub fn start_config(&self) -> Result<StartConfig, ConfigError> {
        if !self.is_custom() {
            return Ok(StartConfig::for_difficulty(self.difficulty));
        }
        let tiles = self.tiles.unwrap_or_else(|| self.difficulty.tile_count());
        let secs = self.time_secs.unwrap_or_else(|| {
            let per_pair =
                self.difficulty.time_limit_secs() / self.difficulty.pair_count() as u64;
            (tiles / 2).max(1) as u64 * per_pair
        });
        StartConfig::custom(tiles, secs)
    }
}
