//! Elo rating system for team strength estimation
//!
//! Computes end-of-season team ratings from game history. Ratings are keyed
//! by team-season, so every team restarts at the initial rating each season.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{GameResult, TeamSeasonKey};

/// Elo rating configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EloConfig {
    /// K-factor: how much ratings change per game
    pub k_factor: f64,
    /// Starting rating for a team's first game of a season
    pub initial_rating: f64,
}

impl Default for EloConfig {
    fn default() -> Self {
        EloConfig {
            k_factor: 20.0,
            initial_rating: 1500.0,
        }
    }
}

/// Expected score (0-1) for a team rated `rating` against `opponent`
pub fn expected_score(rating: f64, opponent: f64) -> f64 {
    1.0 / (1.0 + 10.0_f64.powf((opponent - rating) / 400.0))
}

/// Elo rating computer
pub struct EloRatings {
    ratings: HashMap<TeamSeasonKey, f64>,
    config: EloConfig,
}

impl Default for EloRatings {
    fn default() -> Self {
        Self::new(EloConfig::default())
    }
}

impl EloRatings {
    pub fn new(config: EloConfig) -> Self {
        EloRatings {
            ratings: HashMap::new(),
            config,
        }
    }

    /// Current rating for a team-season (initial rating if unseen)
    pub fn get_rating(&self, key: TeamSeasonKey) -> f64 {
        self.ratings
            .get(&key)
            .copied()
            .unwrap_or(self.config.initial_rating)
    }

    fn rating_entry(&mut self, key: TeamSeasonKey) -> f64 {
        *self
            .ratings
            .entry(key)
            .or_insert(self.config.initial_rating)
    }

    /// Apply one game result. Both ratings are written back before the next
    /// game is processed.
    pub fn update(&mut self, game: &GameResult) {
        let winner_key = game.winner_key();
        let loser_key = game.loser_key();

        let winner_rating = self.rating_entry(winner_key);
        let loser_rating = self.rating_entry(loser_key);

        let winner_expected = expected_score(winner_rating, loser_rating);
        let loser_expected = 1.0 - winner_expected;

        let k = self.config.k_factor;
        self.ratings
            .insert(winner_key, winner_rating + k * (1.0 - winner_expected));
        self.ratings
            .insert(loser_key, loser_rating + k * (0.0 - loser_expected));
    }

    /// Fold a sequence of games in the order given
    pub fn process(&mut self, games: &[GameResult]) {
        for game in games {
            self.update(game);
        }
        log::debug!(
            "Processed {} games, {} team-seasons rated",
            games.len(),
            self.ratings.len()
        );
    }

    /// Number of rated team-seasons
    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    /// Consume into the final rating table
    pub fn into_ratings(self) -> HashMap<TeamSeasonKey, f64> {
        self.ratings
    }
}

/// End-of-season ratings for every team-season appearing in `games`.
///
/// Games must already be in chronological order within each season.
pub fn build_end_of_season(games: &[GameResult], config: &EloConfig) -> HashMap<TeamSeasonKey, f64> {
    let mut elo = EloRatings::new(config.clone());
    elo.process(games);
    elo.into_ratings()
}
