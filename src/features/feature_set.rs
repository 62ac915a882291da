//! Feature-build pipeline
//!
//! Raw games, seeds and rankings → team-season table → joined matchup rows
//! for training (tournament history) and prediction (candidate ids).

use std::path::Path;

use crate::data::reader::{self, ReadOptions};
use crate::features::elo::{self, EloConfig};
use crate::features::matchups::{self, MatchupRow};
use crate::features::team_stats::{SeasonAggregator, TeamSeasonTable};
use crate::{GameResult, RankingObservation, Result, SeedAssignment};

/// All raw inputs needed to build features
#[derive(Debug, Clone, Default)]
pub struct RawData {
    /// Regular-season games, chronological within each season
    pub regular: Vec<GameResult>,
    pub tourney: Vec<GameResult>,
    pub seeds: Vec<SeedAssignment>,
    pub rankings: Vec<RankingObservation>,
    pub candidate_ids: Vec<String>,
}

impl RawData {
    /// Read every source from `dir`; only the ranking file is optional
    pub fn load(dir: &Path, options: ReadOptions) -> Result<Self> {
        log::info!("Reading regular season...");
        let regular = reader::read_regular_season(dir, options)?;
        log::info!("Reading tournament results...");
        let tourney = reader::read_tourney(dir, options)?;
        log::info!("Reading seeds...");
        let seeds = reader::read_seeds(dir, options)?;
        log::info!("Reading rankings (optional)...");
        let rankings = reader::read_rankings(dir, options)?;
        log::info!("Reading candidate matchup IDs...");
        let candidate_ids = reader::read_candidate_ids(dir)?;

        let skipped = regular.skipped + tourney.skipped + seeds.skipped + rankings.skipped;
        if skipped > 0 {
            log::warn!("{} malformed rows skipped across all inputs", skipped);
        }

        Ok(RawData {
            regular: regular.rows,
            tourney: tourney.rows,
            seeds: seeds.rows,
            rankings: rankings.rows,
            candidate_ids,
        })
    }
}

/// Team-season table plus joined training and prediction rows
#[derive(Debug, Clone)]
pub struct FeatureSet {
    pub team_seasons: TeamSeasonTable,
    pub train: Vec<MatchupRow>,
    pub test: Vec<MatchupRow>,
}

/// Aggregate the raw inputs into the team-season table
pub fn build_team_seasons(
    raw: &RawData,
    elo_config: &EloConfig,
    ranking_system: Option<&str>,
) -> TeamSeasonTable {
    log::info!("Building Elo ratings from {} games...", raw.regular.len());
    let ratings = elo::build_end_of_season(&raw.regular, elo_config);

    log::info!("Aggregating team-season statistics...");
    let mut agg = SeasonAggregator::new();
    agg.add_games(&raw.regular);
    agg.assign_seeds(&raw.seeds);
    agg.apply_rankings(&raw.rankings, ranking_system);
    agg.attach_ratings(&ratings);
    agg.finish()
}

impl FeatureSet {
    pub fn build(raw: &RawData, elo_config: &EloConfig, ranking_system: Option<&str>) -> Result<Self> {
        let team_seasons = build_team_seasons(raw, elo_config, ranking_system);

        let mut train = matchups::training_rows(&raw.tourney);
        matchups::attach_features(&mut train, &team_seasons);

        let mut test = matchups::prediction_rows(&raw.candidate_ids)?;
        matchups::attach_features(&mut test, &team_seasons);

        log::info!(
            "Built {} team-seasons, {} training rows, {} prediction rows",
            team_seasons.len(),
            train.len(),
            test.len()
        );

        Ok(FeatureSet {
            team_seasons,
            train,
            test,
        })
    }
}
