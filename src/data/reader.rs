//! CSV readers for the raw competition files and the feature tables
//!
//! Source files are located by candidate name (case-insensitive). Required
//! numeric columns that are missing or unparsable yield a
//! [`ManiaError::MalformedRecord`] carrying the file, row and column, or are
//! skipped and counted when [`ReadOptions::skip_malformed`] is set.

use csv::StringRecord;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::features::matchups::{FeatureDiffs, MatchupRow};
use crate::{
    sort_chronologically, GameResult, Location, ManiaError, RankingObservation, Result,
    SeedAssignment, TeamId,
};

pub const REGULAR_SEASON_FILES: &[&str] = &[
    "MRegularSeasonCompactResults.csv",
    "WRegularSeasonCompactResults.csv",
];
pub const TOURNEY_FILES: &[&str] = &[
    "MNCAATourneyCompactResults.csv",
    "WNCAATourneyCompactResults.csv",
];
pub const SEED_FILES: &[&str] = &["MNCAATourneySeeds.csv", "WNCAATourneySeeds.csv"];
pub const RANKING_FILES: &[&str] = &["MMasseyOrdinals.csv", "WMasseyOrdinals.csv"];
pub const SUBMISSION_FILES: &[&str] = &[
    "SampleSubmissionStage1.csv",
    "SampleSubmissionStage2.csv",
    "MSampleSubmissionStage1.csv",
    "MSampleSubmissionStage2.csv",
];

/// How to treat malformed rows
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions {
    /// Skip and count bad rows instead of failing the whole read
    pub skip_malformed: bool,
}

/// Rows read from one file plus the number of rows skipped as malformed
#[derive(Debug, Clone)]
pub struct Parsed<T> {
    pub rows: Vec<T>,
    pub skipped: usize,
}

impl<T> Parsed<T> {
    fn empty() -> Self {
        Parsed {
            rows: Vec::new(),
            skipped: 0,
        }
    }
}

/// Locate the first candidate file in `dir`, exact name first, then
/// case-insensitively
pub fn find_file(dir: &Path, candidates: &[&str]) -> Result<PathBuf> {
    for c in candidates {
        let path = dir.join(c);
        if path.is_file() {
            return Ok(path);
        }
    }

    if let Ok(entries) = fs::read_dir(dir) {
        let names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_name().into_string().ok())
            .collect();
        for c in candidates {
            if let Some(name) = names.iter().find(|n| n.eq_ignore_ascii_case(c)) {
                return Ok(dir.join(name));
            }
        }
    }

    Err(ManiaError::NotFound {
        dir: dir.to_path_buf(),
        candidates: candidates.iter().map(|c| c.to_string()).collect(),
    })
}

/// Named-column view over one CSV record
struct Fields<'a> {
    file: &'a str,
    row: usize,
    columns: &'a HashMap<String, usize>,
    record: &'a StringRecord,
}

impl Fields<'_> {
    fn str(&self, name: &str) -> &str {
        self.columns
            .get(name)
            .and_then(|&i| self.record.get(i))
            .map(str::trim)
            .unwrap_or("")
    }

    fn malformed(&self, name: &str) -> ManiaError {
        ManiaError::MalformedRecord {
            file: self.file.to_string(),
            row: self.row,
            column: name.to_string(),
            value: self.str(name).to_string(),
        }
    }

    fn int(&self, name: &str) -> Result<i32> {
        self.str(name).parse().map_err(|_| self.malformed(name))
    }

    fn int_or(&self, name: &str, default: i32) -> i32 {
        self.str(name).parse().unwrap_or(default)
    }

    fn float(&self, name: &str) -> Result<f64> {
        self.str(name).parse().map_err(|_| self.malformed(name))
    }

    fn optional_float(&self, name: &str) -> Result<Option<f64>> {
        let v = self.str(name);
        if v.is_empty() {
            return Ok(None);
        }
        v.parse().map(Some).map_err(|_| self.malformed(name))
    }
}

/// Errors confined to one record; the reader can move on to the next row
fn is_record_error(err: &csv::Error) -> bool {
    matches!(
        err.kind(),
        csv::ErrorKind::Utf8 { .. } | csv::ErrorKind::UnequalLengths { .. }
    )
}

fn read_rows<T, F>(path: &Path, options: ReadOptions, parse: F) -> Result<Parsed<T>>
where
    F: Fn(&Fields) -> Result<T>,
{
    let file = path.display().to_string();
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;

    let columns: HashMap<String, usize> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().trim_start_matches('\u{feff}').to_string(), i))
        .collect();

    let mut parsed = Parsed::empty();
    for (i, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) if options.skip_malformed && is_record_error(&e) => {
                log::debug!("Skipping unreadable row in {}: {}", file, e);
                parsed.skipped += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        let row = record.position().map(|p| p.line() as usize).unwrap_or(i + 2);
        let fields = Fields {
            file: &file,
            row,
            columns: &columns,
            record: &record,
        };
        match parse(&fields) {
            Ok(value) => parsed.rows.push(value),
            Err(e @ ManiaError::MalformedRecord { .. }) if options.skip_malformed => {
                log::debug!("Skipping: {}", e);
                parsed.skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    if parsed.skipped > 0 {
        log::warn!("Skipped {} malformed rows in {}", parsed.skipped, file);
    }
    log::info!("Read {} rows from {}", parsed.rows.len(), file);
    Ok(parsed)
}

fn parse_game(f: &Fields) -> Result<GameResult> {
    Ok(GameResult {
        season: f.int("Season")?,
        day_num: f.int("DayNum")?,
        winner: TeamId(f.int("WTeamID")?),
        winner_score: f.int("WScore")?,
        loser: TeamId(f.int("LTeamID")?),
        loser_score: f.int("LScore")?,
        location: Location::from_code(f.str("WLoc")),
        num_ot: f.int_or("NumOT", 0),
    })
}

fn read_games(dir: &Path, candidates: &[&str], options: ReadOptions) -> Result<Parsed<GameResult>> {
    let path = find_file(dir, candidates)?;
    let mut parsed = read_rows(&path, options, parse_game)?;
    sort_chronologically(&mut parsed.rows);
    Ok(parsed)
}

/// Regular-season results, ordered by (season, day)
pub fn read_regular_season(dir: &Path, options: ReadOptions) -> Result<Parsed<GameResult>> {
    read_games(dir, REGULAR_SEASON_FILES, options)
}

/// Tournament results, ordered by (season, day)
pub fn read_tourney(dir: &Path, options: ReadOptions) -> Result<Parsed<GameResult>> {
    read_games(dir, TOURNEY_FILES, options)
}

pub fn read_seeds(dir: &Path, options: ReadOptions) -> Result<Parsed<SeedAssignment>> {
    let path = find_file(dir, SEED_FILES)?;
    read_rows(&path, options, |f| {
        Ok(SeedAssignment {
            season: f.int("Season")?,
            team: TeamId(f.int("TeamID")?),
            code: f.str("Seed").to_string(),
        })
    })
}

/// Ranking ordinals; an absent file yields no rows
pub fn read_rankings(dir: &Path, options: ReadOptions) -> Result<Parsed<RankingObservation>> {
    let path = match find_file(dir, RANKING_FILES) {
        Ok(p) => p,
        Err(ManiaError::NotFound { .. }) => {
            log::info!("No ranking file in {}, ordinals default to 0", dir.display());
            return Ok(Parsed::empty());
        }
        Err(e) => return Err(e),
    };
    read_rows(&path, options, |f| {
        Ok(RankingObservation {
            season: f.int("Season")?,
            team: TeamId(f.int("TeamID")?),
            ranking_day: f.int("RankingDayNum")?,
            system: f.str("SystemName").to_string(),
            ordinal: f.int("OrdinalRank")?,
        })
    })
}

/// Candidate matchup identifiers from the sample submission
pub fn read_candidate_ids(dir: &Path) -> Result<Vec<String>> {
    let path = find_file(dir, SUBMISSION_FILES)?;
    let parsed = read_rows(&path, ReadOptions::default(), |f| Ok(f.str("ID").to_string()))?;
    Ok(parsed.rows.into_iter().filter(|id| !id.is_empty()).collect())
}

/// Read a matchup feature table written by [`crate::data::writer::write_matchups`]
pub fn read_matchups(path: &Path, options: ReadOptions) -> Result<Parsed<MatchupRow>> {
    read_rows(path, options, |f| {
        let has_label = f.str("HasLabel").eq_ignore_ascii_case("true");
        let label = if has_label {
            Some(f.optional_float("Label")?.unwrap_or(0.0))
        } else {
            None
        };
        Ok(MatchupRow {
            id: f.str("ID").to_string(),
            season: f.int("Season")?,
            team_a: TeamId(f.int("TeamA")?),
            team_b: TeamId(f.int("TeamB")?),
            features: FeatureDiffs {
                seed: f.float("DSeed")?,
                elo: f.float("DElo")?,
                win_pct: f.float("DWinPct")?,
                avg_margin: f.float("DAvgMargin")?,
                avg_pf: f.float("DAvgPF")?,
                avg_pa: f.float("DAvgPA")?,
                ranking_ordinal: f.float("DMasseyOrd")?,
            },
            label,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_find_file_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "mncaatourneyseeds.CSV", "Season,Seed,TeamID\n");

        let path = find_file(dir.path(), SEED_FILES).unwrap();
        assert_eq!(path.file_name().unwrap(), "mncaatourneyseeds.CSV");
    }

    #[test]
    fn test_find_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_file(dir.path(), TOURNEY_FILES).unwrap_err();
        assert!(matches!(err, ManiaError::NotFound { candidates, .. } if candidates.len() == 2));
    }

    #[test]
    fn test_read_games_sorted_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "MRegularSeasonCompactResults.csv",
            "Season,DayNum,WTeamID,WScore,LTeamID,LScore,WLoc,NumOT\n\
             2021,40,1,70,2,60,H,0\n\
             2020,12,3,55,4,50,A,\n\
             2021,10,5,81,6,79,N,2\n",
        );

        let parsed = read_regular_season(dir.path(), ReadOptions::default()).unwrap();
        assert_eq!(parsed.skipped, 0);
        let days: Vec<(i32, i32)> = parsed.rows.iter().map(|g| (g.season, g.day_num)).collect();
        assert_eq!(days, vec![(2020, 12), (2021, 10), (2021, 40)]);
        assert_eq!(parsed.rows[0].num_ot, 0);
        assert_eq!(parsed.rows[0].location, Location::Away);
        assert_eq!(parsed.rows[1].num_ot, 2);
    }

    #[test]
    fn test_malformed_row_strict_and_lenient() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "MNCAATourneyCompactResults.csv",
            "Season,DayNum,WTeamID,WScore,LTeamID,LScore\n\
             2021,136,1,70,2,60\n\
             2021,137,3,x,4,50\n",
        );

        let err = read_tourney(dir.path(), ReadOptions::default()).unwrap_err();
        match err {
            ManiaError::MalformedRecord {
                row, column, value, ..
            } => {
                assert_eq!(row, 3);
                assert_eq!(column, "WScore");
                assert_eq!(value, "x");
            }
            other => panic!("unexpected error: {}", other),
        }

        let parsed = read_tourney(
            dir.path(),
            ReadOptions {
                skip_malformed: true,
            },
        )
        .unwrap();
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.skipped, 1);
    }

    #[test]
    fn test_invalid_utf8_row_strict_and_lenient() {
        let dir = tempfile::tempdir().unwrap();
        let mut content = b"Season,DayNum,WTeamID,WScore,LTeamID,LScore\n2021,136,1,70,2,60\n2021,137,3,"
            .to_vec();
        content.extend_from_slice(&[0xff, 0xfe]);
        content.extend_from_slice(b",4,50\n2021,138,5,70,6,60\n");
        fs::write(dir.path().join("MNCAATourneyCompactResults.csv"), content).unwrap();

        let err = read_tourney(dir.path(), ReadOptions::default()).unwrap_err();
        assert!(matches!(err, ManiaError::Csv(_)));

        let parsed = read_tourney(
            dir.path(),
            ReadOptions {
                skip_malformed: true,
            },
        )
        .unwrap();
        assert_eq!(parsed.skipped, 1);
        let days: Vec<i32> = parsed.rows.iter().map(|g| g.day_num).collect();
        assert_eq!(days, vec![136, 138]);
    }

    #[test]
    fn test_missing_rankings_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let parsed = read_rankings(dir.path(), ReadOptions::default()).unwrap();
        assert!(parsed.rows.is_empty());
    }

    #[test]
    fn test_read_seeds_and_rankings() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "WNCAATourneySeeds.csv", "Season,Seed,TeamID\n2021,W16a,3101\n");
        write(
            dir.path(),
            "MMasseyOrdinals.csv",
            "Season,RankingDayNum,SystemName,TeamID,OrdinalRank\n2021,133,POM,1101,12\n",
        );

        let seeds = read_seeds(dir.path(), ReadOptions::default()).unwrap();
        assert_eq!(seeds.rows[0].code, "W16a");
        assert_eq!(seeds.rows[0].team, TeamId(3101));

        let rankings = read_rankings(dir.path(), ReadOptions::default()).unwrap();
        assert_eq!(rankings.rows[0].system, "POM");
        assert_eq!(rankings.rows[0].ordinal, 12);
    }

    #[test]
    fn test_read_candidate_ids() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "SampleSubmissionStage2.csv",
            "ID,Pred\n2025_1101_1102,0.5\n,0.5\n2025_1101_1103,0.5\n",
        );
        let ids = read_candidate_ids(dir.path()).unwrap();
        assert_eq!(ids, vec!["2025_1101_1102", "2025_1101_1103"]);
    }
}
