//! Directional matchup rows
//!
//! Each row compares team A against team B through seven difference
//! features (A minus B) drawn from the team-season table.

use crate::features::team_stats::{TeamSeasonAgg, TeamSeasonTable};
use crate::{GameResult, ManiaError, Result, Season, TeamId, TeamSeasonKey};

/// Feature column names, in model order
pub const FEATURE_NAMES: [&str; FeatureDiffs::DIM] = [
    "DSeed",
    "DElo",
    "DWinPct",
    "DAvgMargin",
    "DAvgPF",
    "DAvgPA",
    "DMasseyOrd",
];

/// Differences between two team-season aggregates (A minus B)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FeatureDiffs {
    pub seed: f64,
    pub elo: f64,
    pub win_pct: f64,
    pub avg_margin: f64,
    pub avg_pf: f64,
    pub avg_pa: f64,
    pub ranking_ordinal: f64,
}

impl FeatureDiffs {
    pub const DIM: usize = 7;

    pub fn between(a: &TeamSeasonAgg, b: &TeamSeasonAgg) -> Self {
        FeatureDiffs {
            seed: a.seed - b.seed,
            elo: a.elo_end - b.elo_end,
            win_pct: a.win_pct - b.win_pct,
            avg_margin: a.avg_margin - b.avg_margin,
            avg_pf: a.avg_pf - b.avg_pf,
            avg_pa: a.avg_pa - b.avg_pa,
            ranking_ordinal: a.ranking_ordinal - b.ranking_ordinal,
        }
    }

    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            self.seed,
            self.elo,
            self.win_pct,
            self.avg_margin,
            self.avg_pf,
            self.avg_pa,
            self.ranking_ordinal,
        ]
    }
}

/// One directional pairing of two teams in a season
#[derive(Debug, Clone, PartialEq)]
pub struct MatchupRow {
    /// `season_teamA_teamB`
    pub id: String,
    pub season: Season,
    pub team_a: TeamId,
    pub team_b: TeamId,
    pub features: FeatureDiffs,
    /// 1.0 if A beat B; `None` for rows to be predicted
    pub label: Option<f64>,
}

impl MatchupRow {
    pub fn new(season: Season, team_a: TeamId, team_b: TeamId, label: Option<f64>) -> Self {
        MatchupRow {
            id: matchup_id(season, team_a, team_b),
            season,
            team_a,
            team_b,
            features: FeatureDiffs::default(),
            label,
        }
    }

    pub fn has_label(&self) -> bool {
        self.label.is_some()
    }
}

pub fn matchup_id(season: Season, team_a: TeamId, team_b: TeamId) -> String {
    format!("{}_{}_{}", season, team_a, team_b)
}

/// Parse a `season_teamA_teamB` identifier
pub fn parse_matchup_id(id: &str) -> Result<(Season, TeamId, TeamId)> {
    let malformed = || ManiaError::MalformedId(id.to_string());

    let parts: Vec<&str> = id.trim().split('_').collect();
    if parts.len() != 3 {
        return Err(malformed());
    }
    let season: Season = parts[0].parse().map_err(|_| malformed())?;
    let team_a: i32 = parts[1].parse().map_err(|_| malformed())?;
    let team_b: i32 = parts[2].parse().map_err(|_| malformed())?;
    Ok((season, TeamId(team_a), TeamId(team_b)))
}

/// Two labeled rows per tournament game: winner-first (1.0) and loser-first (0.0)
pub fn training_rows(games: &[GameResult]) -> Vec<MatchupRow> {
    let mut rows = Vec::with_capacity(games.len() * 2);
    for g in games {
        rows.push(MatchupRow::new(g.season, g.winner, g.loser, Some(1.0)));
        rows.push(MatchupRow::new(g.season, g.loser, g.winner, Some(0.0)));
    }
    rows
}

/// Unlabeled rows from candidate identifiers; any malformed id fails the batch
pub fn prediction_rows<S: AsRef<str>>(ids: &[S]) -> Result<Vec<MatchupRow>> {
    ids.iter()
        .map(|id| {
            let id = id.as_ref();
            let (season, a, b) = parse_matchup_id(id)?;
            let mut row = MatchupRow::new(season, a, b, None);
            row.id = id.trim().to_string();
            Ok(row)
        })
        .collect()
}

/// Fill every row's difference features; missing team-seasons count as zero
pub fn attach_features(rows: &mut [MatchupRow], table: &TeamSeasonTable) {
    let mut missing = 0usize;
    for row in rows.iter_mut() {
        let key_a = TeamSeasonKey::new(row.season, row.team_a);
        let key_b = TeamSeasonKey::new(row.season, row.team_b);
        if table.get(key_a).is_none() || table.get(key_b).is_none() {
            missing += 1;
        }
        let a = table.get_or_zero(key_a);
        let b = table.get_or_zero(key_b);
        row.features = FeatureDiffs::between(&a, &b);
    }
    if missing > 0 {
        log::debug!(
            "{} of {} matchups reference a team-season with no statistics",
            missing,
            rows.len()
        );
    }
}
