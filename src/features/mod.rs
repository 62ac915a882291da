//! Feature extraction
//!
//! Converts raw game results into team-season statistics and joins them
//! into model-ready matchup rows.

pub mod elo;
pub mod feature_set;
pub mod matchups;
pub mod team_stats;

pub use elo::{EloConfig, EloRatings};
pub use feature_set::{FeatureSet, RawData};
pub use matchups::{FeatureDiffs, MatchupRow, FEATURE_NAMES};
pub use team_stats::{SeasonAggregator, TeamSeasonAgg, TeamSeasonTable};
