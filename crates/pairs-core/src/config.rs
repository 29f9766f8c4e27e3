use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Largest board the engine accepts
pub const MAX_TILE_COUNT: usize = 1024;

/// Built-in difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Casual,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn all() -> &'static [Difficulty] {
        &[Difficulty::Casual, Difficulty::Medium, Difficulty::Hard]
    }

    /// Number of symbol pairs on the board
    pub fn pair_count(self) -> usize {
        match self {
            Difficulty::Casual => 8,
            Difficulty::Medium => 18,
            Difficulty::Hard => 32,
        }
    }

    pub fn tile_count(self) -> usize {
        self.pair_count() * 2
    }

    /// Seconds granted per pair
    fn seconds_per_pair(self) -> u64 {
        match self {
            Difficulty::Casual => 4,
            Difficulty::Medium => 5,
            Difficulty::Hard => 6,
        }
    }

    pub fn time_limit_secs(self) -> u64 {
        self.pair_count() as u64 * self.seconds_per_pair()
    }

    /// Key used for the best-time record of this difficulty
    pub fn key(self) -> &'static str {
        match self {
            Difficulty::Casual => "casual",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Casual => "Casual",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "casual" | "easy" => Ok(Difficulty::Casual),
            "medium" | "normal" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{}'", other)),
        }
    }
}

/// Validated start configuration for one game session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartConfig {
    tile_count: usize,
    time_limit_secs: u64,
    difficulty_key: String,
}

impl StartConfig {
    /// Build a configuration, rejecting boards the engine cannot play
    pub fn new(
        tile_count: usize,
        time_limit_secs: u64,
        difficulty_key: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        match tile_count {
            0 => return Err(ConfigError::ZeroTiles),
            1 => return Err(ConfigError::TooFewTiles(1)),
            n if n > MAX_TILE_COUNT => {
                return Err(ConfigError::TooManyTiles {
                    got: n,
                    max: MAX_TILE_COUNT,
                })
            }
            _ => {}
        }
        if time_limit_secs == 0 {
            return Err(ConfigError::ZeroTimeLimit);
        }
        Ok(Self {
            tile_count,
            time_limit_secs,
            difficulty_key: difficulty_key.into(),
        })
    }

    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        Self {
            tile_count: difficulty.tile_count(),
            time_limit_secs: difficulty.time_limit_secs(),
            difficulty_key: difficulty.key().to_string(),
        }
    }

    /// Custom board; best times are filed under `custom_<tiles>`
    pub fn custom(tile_count: usize, time_limit_secs: u64) -> Result<Self, ConfigError> {
        Self::new(tile_count, time_limit_secs, format!("custom_{}", tile_count))
    }

    pub fn tile_count(&self) -> usize {
        self.tile_count
    }

    pub fn pair_count(&self) -> usize {
        self.tile_count / 2
    }

    pub fn has_filler(&self) -> bool {
        self.tile_count % 2 == 1
    }

    pub fn time_limit(&self) -> Duration {
        Duration::from_secs(self.time_limit_secs)
    }

    pub fn difficulty_key(&self) -> &str {
        &self.difficulty_key
    }

    /// Side of the smallest square grid that fits every tile
    pub fn grid_side(&self) -> usize {
        let mut side = 1;
        while side * side < self.tile_count {
            side += 1;
        }
        side
    }
}
