//! Model training
//!
//! Logistic regression trainer, season-grouped cross-validation, and
//! evaluation metrics.

pub mod cv;
pub mod metrics;
pub mod trainer;

pub use cv::{season_group_folds, Fold};
pub use metrics::{brier_score, CvReport, FoldMetrics};
pub use trainer::{TrainConfig, Trainer};

use crate::features::matchups::{MatchupRow, FEATURE_NAMES};
use crate::predict::calibration::Calibration;
use crate::Season;

/// Labeled rows as a design matrix
#[derive(Debug, Clone, Default)]
pub struct LabeledSet {
    pub x: Vec<Vec<f64>>,
    pub y: Vec<f64>,
    pub seasons: Vec<Season>,
}

impl LabeledSet {
    /// Keep labeled rows, optionally only from `min_season` onward
    pub fn from_rows(rows: &[MatchupRow], min_season: Option<Season>) -> Self {
        let mut set = LabeledSet::default();
        for row in rows {
            let Some(label) = row.label else { continue };
            if min_season.is_some_and(|min| row.season < min) {
                continue;
            }
            set.x.push(row.features.to_vec());
            set.y.push(label);
            set.seasons.push(row.season);
        }
        set
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    pub fn subset(&self, idx: &[usize]) -> LabeledSet {
        LabeledSet {
            x: idx.iter().map(|&i| self.x[i].clone()).collect(),
            y: idx.iter().map(|&i| self.y[i]).collect(),
            seasons: idx.iter().map(|&i| self.seasons[i]).collect(),
        }
    }
}

/// Canonical feature names as owned strings
pub fn feature_names() -> Vec<String> {
    FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
}

/// Run season-grouped cross-validation over labeled rows.
///
/// Rows outside `min_season` and unlabeled rows are dropped before folding.
/// Calibration is applied only to validation predictions for the
/// calibrated score.
pub fn cross_validate(
    rows: &[MatchupRow],
    trainer: &Trainer,
    folds: usize,
    seed: u64,
    min_season: Option<Season>,
    calibration: &Calibration,
) -> CvReport {
    let kept: Vec<MatchupRow> = rows
        .iter()
        .filter(|r| r.has_label() && min_season.map_or(true, |min| r.season >= min))
        .cloned()
        .collect();
    let data = LabeledSet::from_rows(&kept, None);
    let names = feature_names();

    let mut report = CvReport::new();
    for (fi, fold) in season_group_folds(&kept, folds, seed).iter().enumerate() {
        let train = data.subset(&fold.train_idx);
        let val = data.subset(&fold.val_idx);

        let model = trainer.fit(&train.x, &train.y, &names);
        let raw = model.predict_batch(&val.x);
        let calibrated: Vec<f64> = raw.iter().map(|&p| calibration.apply(p)).collect();

        let metrics =
            FoldMetrics::evaluate(fi, fold.val_season(), train.len(), &val.y, &raw, &calibrated);
        if metrics.brier.is_none() {
            log::warn!("Fold {} has no validation rows", fi + 1);
        }
        report.push(metrics);
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::matchups::FeatureDiffs;
    use crate::TeamId;

    fn row(season: Season, elo: f64, label: Option<f64>) -> MatchupRow {
        let mut r = MatchupRow::new(season, TeamId(1), TeamId(2), label);
        r.features = FeatureDiffs {
            elo,
            ..Default::default()
        };
        r
    }

    #[test]
    fn test_labeled_set_filters() {
        let rows = vec![
            row(2010, 1.0, Some(1.0)),
            row(2015, -1.0, Some(0.0)),
            row(2025, 0.5, None),
        ];
        let all = LabeledSet::from_rows(&rows, None);
        assert_eq!(all.len(), 2);
        assert_eq!(all.x[0].len(), FEATURE_NAMES.len());

        let recent = LabeledSet::from_rows(&rows, Some(2012));
        assert_eq!(recent.len(), 1);
        assert_eq!(recent.seasons, vec![2015]);
        assert_eq!(recent.y, vec![0.0]);
    }

    #[test]
    fn test_cross_validate_reports_every_fold() {
        let mut rows = Vec::new();
        for season in 2010..2020 {
            rows.push(row(season, 0.8, Some(1.0)));
            rows.push(row(season, -0.8, Some(0.0)));
        }
        rows.push(row(2025, 0.3, None));

        let report = cross_validate(
            &rows,
            &Trainer::default(),
            5,
            42,
            None,
            &Calibration::default(),
        );
        assert_eq!(report.folds.len(), 5);
        assert_eq!(report.empty_folds(), 0);
        let n_val: usize = report.folds.iter().map(|f| f.n_val).sum();
        assert_eq!(n_val, 20);

        let (mean, _) = report.brier_mean_std();
        assert!(mean < 0.25);
    }

    #[test]
    fn test_cross_validate_min_season() {
        let mut rows = Vec::new();
        for season in 2000..2010 {
            rows.push(row(season, 1.0, Some(1.0)));
            rows.push(row(season, -1.0, Some(0.0)));
        }
        let report = cross_validate(
            &rows,
            &Trainer::default(),
            2,
            3,
            Some(2008),
            &Calibration::default(),
        );
        let seasons: Vec<Season> = report.folds.iter().filter_map(|f| f.val_season).collect();
        assert!(seasons.iter().all(|&s| s >= 2008));
        let n_val: usize = report.folds.iter().map(|f| f.n_val).sum();
        assert_eq!(n_val, 4);
    }
}
