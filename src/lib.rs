//! Tournament win-probability modeling
//!
//! Builds team-season features from historical results, trains a logistic
//! regression classifier with season-grouped cross-validation, and produces
//! calibrated probabilities for candidate matchups.

pub mod data;
pub mod features;
pub mod model;
pub mod predict;
pub mod training;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::features::elo::EloConfig;
use crate::predict::calibration::Calibration;
use crate::training::trainer::TrainConfig;

/// Competition season (calendar year the tournament is played in)
pub type Season = i32;

/// Unique identifier for a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TeamId(pub i32);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One team's one season; the join key for every per-team table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TeamSeasonKey {
    pub season: Season,
    pub team: TeamId,
}

impl TeamSeasonKey {
    pub fn new(season: Season, team: TeamId) -> Self {
        TeamSeasonKey { season, team }
    }
}

/// Where the winning team played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Location {
    Home,
    Away,
    #[default]
    Neutral,
}

impl Location {
    /// Parse the single-letter location code; blank or unknown codes are neutral
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_uppercase().as_str() {
            "H" => Location::Home,
            "A" => Location::Away,
            _ => Location::Neutral,
        }
    }
}

/// A single completed game
#[derive(Debug, Clone, PartialEq)]
pub struct GameResult {
    pub season: Season,
    pub day_num: i32,
    pub winner: TeamId,
    pub winner_score: i32,
    pub loser: TeamId,
    pub loser_score: i32,
    pub location: Location,
    pub num_ot: i32,
}

impl GameResult {
    /// Winning margin (always non-negative for well-formed input)
    pub fn margin(&self) -> i32 {
        self.winner_score - self.loser_score
    }

    pub fn winner_key(&self) -> TeamSeasonKey {
        TeamSeasonKey::new(self.season, self.winner)
    }

    pub fn loser_key(&self) -> TeamSeasonKey {
        TeamSeasonKey::new(self.season, self.loser)
    }
}

/// Stable-sort games into chronological order within each season
pub fn sort_chronologically(games: &mut [GameResult]) {
    games.sort_by_key(|g| (g.season, g.day_num));
}

/// Tournament seed assignment for a team-season
#[derive(Debug, Clone, PartialEq)]
pub struct SeedAssignment {
    pub season: Season,
    pub team: TeamId,
    /// Raw seed code, e.g. `W01` or `X16a`
    pub code: String,
}

/// A ranking system's ordinal for a team as of a given day
#[derive(Debug, Clone, PartialEq)]
pub struct RankingObservation {
    pub season: Season,
    pub team: TeamId,
    pub ranking_day: i32,
    pub system: String,
    pub ordinal: i32,
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum ManiaError {
    #[error("No file found in {dir}: tried {candidates:?}")]
    NotFound {
        dir: PathBuf,
        candidates: Vec<String>,
    },

    #[error("Malformed record in {file} row {row}: column {column} = {value:?}")]
    MalformedRecord {
        file: String,
        row: usize,
        column: String,
        value: String,
    },

    #[error("Bad matchup ID {0:?}: expected season_teamA_teamB")]
    MalformedId(String),

    #[error("Bad model: {weights} weights for {features} features (expected features + 1)")]
    SchemaMismatch { weights: usize, features: usize },

    #[error("Model features {found:?} do not match expected {expected:?}")]
    FeatureMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Model not found at {0} - run `mania train` first")]
    NoModel(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ManiaError>;

/// Application configuration loaded from mania.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub elo: EloConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub calibration: Calibration,
    #[serde(default)]
    pub data: DataConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    #[serde(flatten)]
    pub optimizer: TrainConfig,
    /// Number of season-grouped folds
    pub folds: usize,
    /// Seed for the season shuffle
    pub seed: u64,
    /// Drop labeled rows from seasons before this one
    pub min_season: Option<Season>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            optimizer: TrainConfig::default(),
            folds: 5,
            seed: 42,
            min_season: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding the raw competition CSV files
    pub data_dir: String,
    /// Directory for feature tables and the model
    pub artifacts_dir: String,
    /// Directory for the submission file
    pub submission_dir: String,
    /// Skip and count malformed rows instead of failing the read
    pub skip_malformed_rows: bool,
    /// Restrict ranking ordinals to a single system (e.g. "POM")
    pub ranking_system: Option<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            data_dir: "data".to_string(),
            artifacts_dir: "artifacts".to_string(),
            submission_dir: "submissions".to_string(),
            skip_malformed_rows: false,
            ranking_system: None,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ManiaError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| ManiaError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ManiaError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(season: Season, day: i32, w: i32, l: i32) -> GameResult {
        GameResult {
            season,
            day_num: day,
            winner: TeamId(w),
            winner_score: 70,
            loser: TeamId(l),
            loser_score: 60,
            location: Location::Neutral,
            num_ot: 0,
        }
    }

    #[test]
    fn test_location_codes() {
        assert_eq!(Location::from_code("H"), Location::Home);
        assert_eq!(Location::from_code("a"), Location::Away);
        assert_eq!(Location::from_code("N"), Location::Neutral);
        assert_eq!(Location::from_code(""), Location::Neutral);
    }

    #[test]
    fn test_sort_chronologically_is_stable() {
        let mut games = vec![
            game(2022, 10, 1, 2),
            game(2021, 30, 3, 4),
            game(2021, 5, 5, 6),
            game(2021, 30, 7, 8),
        ];
        sort_chronologically(&mut games);
        let order: Vec<i32> = games.iter().map(|g| g.winner.0).collect();
        assert_eq!(order, vec![5, 3, 7, 1]);
    }

    #[test]
    fn test_config_roundtrip_through_toml() {
        let mut config = Config::default();
        config.training.folds = 7;
        config.training.min_season = Some(2010);
        config.calibration.temperature = 1.3;

        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.training.folds, 7);
        assert_eq!(parsed.training.min_season, Some(2010));
        assert_eq!(parsed.calibration.temperature, 1.3);
        assert_eq!(parsed.training.optimizer.epochs, 400);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: Config = toml::from_str("[training]\nfolds = 3\n").unwrap();
        assert_eq!(parsed.training.folds, 3);
        assert_eq!(parsed.training.seed, 42);
        assert_eq!(parsed.elo.k_factor, 20.0);
        assert_eq!(parsed.calibration.clip_lo, 0.02);
        assert_eq!(parsed.data.data_dir, "data");
    }
}
