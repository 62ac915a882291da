//! Team-season statistics
//!
//! Accumulates per-team-season totals from game results, then derives rates
//! in a separate finalization pass. Seeds, ranking ordinals and end-of-season
//! ratings are folded into the same keyed table.

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::{GameResult, RankingObservation, SeedAssignment, TeamSeasonKey};

/// Statistics for one team in one season
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamSeasonAgg {
    pub games: u32,
    pub wins: u32,
    pub losses: u32,
    /// Total points scored
    pub points_for: f64,
    /// Total points conceded
    pub points_against: f64,
    /// Sum of per-game margins (positive when winning)
    pub margin_sum: f64,

    pub win_pct: f64,
    pub avg_pf: f64,
    pub avg_pa: f64,
    pub avg_margin: f64,

    pub elo_end: f64,
    pub seed: f64,
    pub ranking_ordinal: f64,
}

impl TeamSeasonAgg {
    /// Record a win by `winner_score` to `loser_score`
    pub fn record_win(&mut self, winner_score: i32, loser_score: i32) {
        self.games += 1;
        self.wins += 1;
        self.points_for += winner_score as f64;
        self.points_against += loser_score as f64;
        self.margin_sum += (winner_score - loser_score) as f64;
    }

    /// Record a loss by `loser_score` to `winner_score`
    pub fn record_loss(&mut self, loser_score: i32, winner_score: i32) {
        self.games += 1;
        self.losses += 1;
        self.points_for += loser_score as f64;
        self.points_against += winner_score as f64;
        self.margin_sum += (loser_score - winner_score) as f64;
    }

    /// Recompute derived rates from the accumulated sums.
    ///
    /// Leaves the rates at zero when no games were played. Safe to call
    /// more than once.
    pub fn finalize(&mut self) {
        if self.games == 0 {
            self.win_pct = 0.0;
            self.avg_pf = 0.0;
            self.avg_pa = 0.0;
            self.avg_margin = 0.0;
            return;
        }
        let n = self.games as f64;
        self.win_pct = self.wins as f64 / n;
        self.avg_pf = self.points_for / n;
        self.avg_pa = self.points_against / n;
        self.avg_margin = self.margin_sum / n;
    }
}

fn seed_digits() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("static regex"))
}

/// Numeric seed from a seed code: the first run of digits.
///
/// `W01` → 1, `X16a` → 16, codes without digits → 0.
pub fn parse_seed(code: &str) -> u32 {
    seed_digits()
        .find(code.trim())
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Accumulation stage: builds the team-season table from raw inputs
#[derive(Debug, Default)]
pub struct SeasonAggregator {
    stats: HashMap<TeamSeasonKey, TeamSeasonAgg>,
}

impl SeasonAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, key: TeamSeasonKey) -> &mut TeamSeasonAgg {
        self.stats.entry(key).or_default()
    }

    /// Fold game results into both participants' totals
    pub fn add_games(&mut self, games: &[GameResult]) {
        for game in games {
            self.entry(game.winner_key())
                .record_win(game.winner_score, game.loser_score);
            self.entry(game.loser_key())
                .record_loss(game.loser_score, game.winner_score);
        }
    }

    /// Assign parsed seeds; a later assignment for the same key overwrites
    pub fn assign_seeds(&mut self, seeds: &[SeedAssignment]) {
        for s in seeds {
            let seed = parse_seed(&s.code);
            self.entry(TeamSeasonKey::new(s.season, s.team)).seed = seed as f64;
        }
    }

    /// Keep each team-season's ordinal from its latest ranking day.
    ///
    /// Equal days resolve to the last observation seen. When `system` is set
    /// only that ranking system is considered.
    pub fn apply_rankings(&mut self, rankings: &[RankingObservation], system: Option<&str>) {
        let mut latest: HashMap<TeamSeasonKey, (i32, i32)> = HashMap::new();
        for obs in rankings {
            if let Some(name) = system {
                if !obs.system.eq_ignore_ascii_case(name) {
                    continue;
                }
            }
            let key = TeamSeasonKey::new(obs.season, obs.team);
            match latest.get(&key) {
                Some(&(day, _)) if obs.ranking_day < day => {}
                _ => {
                    latest.insert(key, (obs.ranking_day, obs.ordinal));
                }
            }
        }
        for (key, (_, ordinal)) in latest {
            self.entry(key).ranking_ordinal = ordinal as f64;
        }
    }

    /// Attach end-of-season ratings
    pub fn attach_ratings(&mut self, ratings: &HashMap<TeamSeasonKey, f64>) {
        for (key, rating) in ratings {
            self.entry(*key).elo_end = *rating;
        }
    }

    /// Finalization stage: derive rates for every entry
    pub fn finish(mut self) -> TeamSeasonTable {
        for agg in self.stats.values_mut() {
            agg.finalize();
        }
        TeamSeasonTable { stats: self.stats }
    }
}

/// Finalized team-season statistics
#[derive(Debug, Clone, Default)]
pub struct TeamSeasonTable {
    stats: HashMap<TeamSeasonKey, TeamSeasonAgg>,
}

impl TeamSeasonTable {
    /// Statistics for a team-season, if present
    pub fn get(&self, key: TeamSeasonKey) -> Option<&TeamSeasonAgg> {
        self.stats.get(&key)
    }

    /// Statistics for a team-season, or the zero aggregate if absent
    pub fn get_or_zero(&self, key: TeamSeasonKey) -> TeamSeasonAgg {
        self.stats.get(&key).cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Entries ordered by (season, team)
    pub fn sorted(&self) -> Vec<(TeamSeasonKey, &TeamSeasonAgg)> {
        let mut entries: Vec<_> = self.stats.iter().map(|(k, v)| (*k, v)).collect();
        entries.sort_by_key(|(k, _)| *k);
        entries
    }
}
