//! Logistic regression model
//!
//! A linear score over named features passed through a clamped sigmoid.
//! Persisted as JSON with `feature_names` and `weights` (bias first).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::{ManiaError, Result};

/// Probabilities are kept this far from exact 0 and 1
pub const PROB_EPS: f64 = 1e-15;

/// Logistic sigmoid, clamped strictly inside (0, 1)
pub fn sigmoid(z: f64) -> f64 {
    let p = 1.0 / (1.0 + (-z).exp());
    p.clamp(PROB_EPS, 1.0 - PROB_EPS)
}

/// Binary classifier: `weights[0]` is the bias, `weights[i + 1]` pairs with
/// `feature_names[i]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub feature_names: Vec<String>,
    pub weights: Vec<f64>,
}

impl LogisticModel {
    /// All-zero model (predicts 0.5 everywhere)
    pub fn zeros(feature_names: Vec<String>) -> Self {
        let weights = vec![0.0; feature_names.len() + 1];
        LogisticModel {
            feature_names,
            weights,
        }
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Linear score `bias + Σ w_i x_i` over the overlapping prefix of `x`
    pub fn decision(&self, x: &[f64]) -> f64 {
        let Some((bias, coefs)) = self.weights.split_first() else {
            return 0.0;
        };
        bias + coefs.iter().zip(x).map(|(w, v)| w * v).sum::<f64>()
    }

    /// Probability that team A wins
    pub fn predict_proba(&self, x: &[f64]) -> f64 {
        sigmoid(self.decision(x))
    }

    pub fn predict_batch(&self, xs: &[Vec<f64>]) -> Vec<f64> {
        xs.iter().map(|x| self.predict_proba(x)).collect()
    }

    fn validate(&self) -> Result<()> {
        if self.weights.len() != self.feature_names.len() + 1 {
            return Err(ManiaError::SchemaMismatch {
                weights: self.weights.len(),
                features: self.feature_names.len(),
            });
        }
        Ok(())
    }

    /// Write as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("Saved model to {}", path.display());
        Ok(())
    }

    /// Load and check that there is exactly one weight per feature plus bias
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ManiaError::NoModel(path.to_path_buf()));
        }
        let json = fs::read_to_string(path)?;
        let model: LogisticModel = serde_json::from_str(&json)?;
        model.validate()?;
        Ok(model)
    }
}
