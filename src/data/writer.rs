//! CSV writers for feature tables and submissions
//!
//! Column order is fixed; floats are written with six decimals.

use std::fs;
use std::path::{Path, PathBuf};

use crate::features::matchups::MatchupRow;
use crate::features::team_stats::TeamSeasonTable;
use crate::predict::inference::SubmissionRow;
use crate::Result;

pub const TEAM_SEASON_FILE: &str = "team_season_features.csv";
pub const TRAIN_FEATURES_FILE: &str = "features_train.csv";
pub const TEST_FEATURES_FILE: &str = "features_test.csv";
pub const SUBMISSION_FILE: &str = "submission.csv";

pub const TEAM_SEASON_HEADER: [&str; 12] = [
    "Season",
    "TeamID",
    "Games",
    "Wins",
    "Losses",
    "WinPct",
    "AvgPF",
    "AvgPA",
    "AvgMargin",
    "EloEnd",
    "Seed",
    "MasseyOrdinal",
];

pub const MATCHUP_HEADER: [&str; 13] = [
    "ID",
    "Season",
    "TeamA",
    "TeamB",
    "DSeed",
    "DElo",
    "DWinPct",
    "DAvgMargin",
    "DAvgPF",
    "DAvgPA",
    "DMasseyOrd",
    "Label",
    "HasLabel",
];

fn fmt_f(x: f64) -> String {
    format!("{:.6}", x)
}

fn create_writer(out_dir: &Path, name: &str) -> Result<(PathBuf, csv::Writer<fs::File>)> {
    fs::create_dir_all(out_dir)?;
    let path = out_dir.join(name);
    let writer = csv::Writer::from_path(&path)?;
    Ok((path, writer))
}

/// Write the team-season table in (season, team) order
pub fn write_team_seasons(out_dir: &Path, table: &TeamSeasonTable) -> Result<PathBuf> {
    let (path, mut w) = create_writer(out_dir, TEAM_SEASON_FILE)?;
    w.write_record(TEAM_SEASON_HEADER)?;

    for (key, s) in table.sorted() {
        w.write_record([
            key.season.to_string(),
            key.team.to_string(),
            s.games.to_string(),
            s.wins.to_string(),
            s.losses.to_string(),
            fmt_f(s.win_pct),
            fmt_f(s.avg_pf),
            fmt_f(s.avg_pa),
            fmt_f(s.avg_margin),
            fmt_f(s.elo_end),
            fmt_f(s.seed),
            fmt_f(s.ranking_ordinal),
        ])?;
    }
    w.flush()?;
    log::info!("Wrote {} team-seasons to {}", table.len(), path.display());
    Ok(path)
}

/// Write matchup rows; unlabeled rows carry `Label = 0` and `HasLabel = false`
pub fn write_matchups(out_dir: &Path, name: &str, rows: &[MatchupRow]) -> Result<PathBuf> {
    let (path, mut w) = create_writer(out_dir, name)?;
    w.write_record(MATCHUP_HEADER)?;

    for r in rows {
        let f = &r.features;
        w.write_record([
            r.id.clone(),
            r.season.to_string(),
            r.team_a.to_string(),
            r.team_b.to_string(),
            fmt_f(f.seed),
            fmt_f(f.elo),
            fmt_f(f.win_pct),
            fmt_f(f.avg_margin),
            fmt_f(f.avg_pf),
            fmt_f(f.avg_pa),
            fmt_f(f.ranking_ordinal),
            fmt_f(r.label.unwrap_or(0.0)),
            r.has_label().to_string(),
        ])?;
    }
    w.flush()?;
    log::info!("Wrote {} matchups to {}", rows.len(), path.display());
    Ok(path)
}

/// Write the two-column `ID,Pred` submission
pub fn write_submission(out_dir: &Path, rows: &[SubmissionRow]) -> Result<PathBuf> {
    let (path, mut w) = create_writer(out_dir, SUBMISSION_FILE)?;
    w.write_record(["ID", "Pred"])?;
    for r in rows {
        w.write_record([r.id.as_str(), fmt_f(r.pred).as_str()])?;
    }
    w.flush()?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::reader::{read_matchups, ReadOptions};
    use crate::features::matchups::{attach_features, prediction_rows, training_rows};
    use crate::features::team_stats::SeasonAggregator;
    use crate::{GameResult, Location, TeamId};

    fn games() -> Vec<GameResult> {
        vec![GameResult {
            season: 2021,
            day_num: 136,
            winner: TeamId(1),
            winner_score: 70,
            loser: TeamId(2),
            loser_score: 63,
            location: Location::Neutral,
            num_ot: 0,
        }]
    }

    #[test]
    fn test_team_season_file_layout() {
        let dir = tempfile::tempdir().unwrap();
        let mut agg = SeasonAggregator::new();
        agg.add_games(&games());
        let table = agg.finish();

        let path = write_team_seasons(dir.path(), &table).unwrap();
        let text = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "Season,TeamID,Games,Wins,Losses,WinPct,AvgPF,AvgPA,AvgMargin,EloEnd,Seed,MasseyOrdinal"
        );
        assert_eq!(
            lines[1],
            "2021,1,1,1,0,1.000000,70.000000,63.000000,7.000000,0.000000,0.000000,0.000000"
        );
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_matchups_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut agg = SeasonAggregator::new();
        agg.add_games(&games());
        let table = agg.finish();

        let mut train = training_rows(&games());
        attach_features(&mut train, &table);
        let mut test = prediction_rows(&["2021_1_2"]).unwrap();
        attach_features(&mut test, &table);

        let train_path = write_matchups(dir.path(), TRAIN_FEATURES_FILE, &train).unwrap();
        let test_path = write_matchups(dir.path(), TEST_FEATURES_FILE, &test).unwrap();

        let train_back = read_matchups(&train_path, ReadOptions::default()).unwrap().rows;
        assert_eq!(train_back, train);

        let test_back = read_matchups(&test_path, ReadOptions::default()).unwrap().rows;
        assert_eq!(test_back.len(), 1);
        assert_eq!(test_back[0].label, None);
        assert_eq!(test_back[0].features.avg_margin, 14.0);

        let text = fs::read_to_string(&test_path).unwrap();
        assert!(text.lines().nth(1).unwrap().ends_with(",0.000000,false"));
    }

    #[test]
    fn test_submission_format() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![SubmissionRow {
            id: "2025_1_2".to_string(),
            pred: 0.123456789,
        }];
        let path = write_submission(dir.path(), &rows).unwrap();
        let text = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["ID,Pred", "2025_1_2,0.123457"]);
    }
}
