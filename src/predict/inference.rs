//! Calibrated predictions for matchup rows

use crate::features::matchups::{MatchupRow, FEATURE_NAMES};
use crate::model::logistic::LogisticModel;
use crate::predict::calibration::Calibration;
use crate::{ManiaError, Result};

/// One line of the submission file
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionRow {
    pub id: String,
    pub pred: f64,
}

/// Model plus inference-time calibration
pub struct Predictor {
    model: LogisticModel,
    calibration: Calibration,
}

impl Predictor {
    /// The model's features must be the matchup features in row order
    pub fn new(model: LogisticModel, calibration: Calibration) -> Result<Self> {
        if model.feature_names.iter().map(String::as_str).ne(FEATURE_NAMES) {
            return Err(ManiaError::FeatureMismatch {
                expected: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
                found: model.feature_names.clone(),
            });
        }
        Ok(Predictor { model, calibration })
    }

    pub fn model(&self) -> &LogisticModel {
        &self.model
    }

    /// Uncalibrated probability that team A wins
    pub fn raw_probability(&self, row: &MatchupRow) -> f64 {
        self.model.predict_proba(&row.features.to_vec())
    }

    /// Predict, temperature-scale, then clip
    pub fn predict(&self, row: &MatchupRow) -> f64 {
        self.calibration.apply(self.raw_probability(row))
    }

    pub fn predict_all(&self, rows: &[MatchupRow]) -> Vec<SubmissionRow> {
        let out: Vec<SubmissionRow> = rows
            .iter()
            .map(|row| SubmissionRow {
                id: row.id.clone(),
                pred: self.predict(row),
            })
            .collect();
        log::info!("Predicted {} matchups", out.len());
        out
    }
}
