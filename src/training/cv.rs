//! Season-grouped cross-validation
//!
//! Whole seasons are assigned to folds so that no season's games appear on
//! both sides of a split.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::{BTreeSet, HashSet};

use crate::features::matchups::MatchupRow;
use crate::Season;

/// Fold count used when fewer than two folds are requested
pub const DEFAULT_FOLDS: usize = 5;

/// One train/validation partition of the labeled rows
#[derive(Debug, Clone, Default)]
pub struct Fold {
    /// Indices into the row slice passed to [`season_group_folds`]
    pub train_idx: Vec<usize>,
    pub val_idx: Vec<usize>,
    /// Seasons held out in this fold, in assignment order
    pub val_seasons: Vec<Season>,
}

impl Fold {
    /// First held-out season, or `None` for an empty bucket
    pub fn val_season(&self) -> Option<Season> {
        self.val_seasons.first().copied()
    }
}

/// Split labeled rows into `k` season-disjoint folds.
///
/// Distinct labeled seasons are sorted, shuffled with `seed`, then dealt
/// round-robin. Unlabeled rows never appear in any fold.
pub fn season_group_folds(rows: &[MatchupRow], k: usize, seed: u64) -> Vec<Fold> {
    let k = if k <= 1 { DEFAULT_FOLDS } else { k };

    let mut seasons: Vec<Season> = rows
        .iter()
        .filter(|r| r.has_label())
        .map(|r| r.season)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut rng = StdRng::seed_from_u64(seed);
    seasons.shuffle(&mut rng);

    let mut buckets: Vec<Vec<Season>> = vec![Vec::new(); k];
    for (i, season) in seasons.into_iter().enumerate() {
        buckets[i % k].push(season);
    }

    let folds: Vec<Fold> = buckets
        .into_iter()
        .map(|bucket| {
            let held_out: HashSet<Season> = bucket.iter().copied().collect();
            let mut fold = Fold {
                val_seasons: bucket,
                ..Default::default()
            };
            for (i, row) in rows.iter().enumerate().filter(|(_, r)| r.has_label()) {
                if held_out.contains(&row.season) {
                    fold.val_idx.push(i);
                } else {
                    fold.train_idx.push(i);
                }
            }
            fold
        })
        .collect();

    log::info!("CV: {} folds (season-grouped)", folds.len());
    folds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TeamId;

    fn rows_for(seasons: &[Season]) -> Vec<MatchupRow> {
        let mut rows = Vec::new();
        for &s in seasons {
            rows.push(MatchupRow::new(s, TeamId(1), TeamId(2), Some(1.0)));
            rows.push(MatchupRow::new(s, TeamId(2), TeamId(1), Some(0.0)));
        }
        rows
    }

    #[test]
    fn test_validation_seasons_partition_labeled_seasons() {
        let seasons: Vec<Season> = (2003..2020).collect();
        let rows = rows_for(&seasons);
        let folds = season_group_folds(&rows, 4, 42);
        assert_eq!(folds.len(), 4);

        let mut seen: Vec<Season> = folds.iter().flat_map(|f| f.val_seasons.clone()).collect();
        seen.sort();
        assert_eq!(seen, seasons);
    }

    #[test]
    fn test_no_season_on_both_sides() {
        let rows = rows_for(&[2015, 2016, 2017, 2018, 2019, 2021]);
        for fold in season_group_folds(&rows, 3, 7) {
            let train: HashSet<Season> = fold.train_idx.iter().map(|&i| rows[i].season).collect();
            let val: HashSet<Season> = fold.val_idx.iter().map(|&i| rows[i].season).collect();
            assert!(train.is_disjoint(&val));
            assert_eq!(fold.train_idx.len() + fold.val_idx.len(), rows.len());
        }
    }

    #[test]
    fn test_unlabeled_rows_excluded() {
        let mut rows = rows_for(&[2018, 2019]);
        rows.push(MatchupRow::new(2025, TeamId(3), TeamId(4), None));
        let folds = season_group_folds(&rows, 2, 1);

        for fold in &folds {
            assert!(!fold.train_idx.contains(&4));
            assert!(!fold.val_idx.contains(&4));
            assert!(!fold.val_seasons.contains(&2025));
        }
    }

    #[test]
    fn test_small_k_defaults_to_five() {
        let rows = rows_for(&[2018, 2019]);
        assert_eq!(season_group_folds(&rows, 0, 42).len(), 5);
        assert_eq!(season_group_folds(&rows, 1, 42).len(), 5);
    }

    #[test]
    fn test_empty_bucket_has_no_val_season() {
        let rows = rows_for(&[2018, 2019]);
        let folds = season_group_folds(&rows, 3, 42);
        let empty: Vec<&Fold> = folds.iter().filter(|f| f.val_seasons.is_empty()).collect();
        assert_eq!(empty.len(), 1);
        assert_eq!(empty[0].val_season(), None);
        assert!(empty[0].val_idx.is_empty());
        assert_eq!(empty[0].train_idx.len(), 4);
    }

    #[test]
    fn test_deterministic_for_seed() {
        let rows = rows_for(&(2000..2024).collect::<Vec<_>>());
        let a = season_group_folds(&rows, 5, 99);
        let b = season_group_folds(&rows, 5, 99);
        for (fa, fb) in a.iter().zip(&b) {
            assert_eq!(fa.val_seasons, fb.val_seasons);
            assert_eq!(fa.val_idx, fb.val_idx);
        }
    }

    #[test]
    fn test_input_order_does_not_change_assignment() {
        let seasons: Vec<Season> = (2010..2020).collect();
        let rows = rows_for(&seasons);
        let mut reversed = rows.clone();
        reversed.reverse();

        let a = season_group_folds(&rows, 3, 5);
        let b = season_group_folds(&reversed, 3, 5);
        for (fa, fb) in a.iter().zip(&b) {
            assert_eq!(fa.val_seasons, fb.val_seasons);
        }
    }
}
