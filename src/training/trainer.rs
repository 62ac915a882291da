//! Full-batch gradient descent for logistic regression

use serde::{Deserialize, Serialize};

use crate::model::logistic::{sigmoid, LogisticModel};
use crate::training::metrics;

/// Optimizer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub learning_rate: f64,
    pub epochs: usize,
    /// L2 penalty on every weight except the bias
    pub l2: f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            learning_rate: 0.05,
            epochs: 400,
            l2: 1e-4,
        }
    }
}

/// Deterministic logistic regression trainer
pub struct Trainer {
    config: TrainConfig,
}

impl Default for Trainer {
    fn default() -> Self {
        Self::new(TrainConfig::default())
    }
}

impl Trainer {
    pub fn new(config: TrainConfig) -> Self {
        Trainer { config }
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// Fit weights to `x` (one row per sample) and labels `y` in {0, 1}.
    ///
    /// The model has one weight per feature name plus the bias. Rows longer
    /// than the feature list are truncated; shorter rows use their prefix.
    /// `x` and `y` must have the same length.
    pub fn fit(&self, x: &[Vec<f64>], y: &[f64], feature_names: &[String]) -> LogisticModel {
        debug_assert_eq!(x.len(), y.len(), "one label per training row");
        let mut model = LogisticModel::zeros(feature_names.to_vec());
        if x.is_empty() {
            log::warn!("No training rows, returning zero-weight model");
            return model;
        }

        let d = feature_names.len();
        let n = x.len() as f64;
        let cfg = &self.config;

        for epoch in 0..cfg.epochs {
            let mut grad = vec![0.0; d + 1];

            for (xi, &yi) in x.iter().zip(y) {
                let err = sigmoid(model.decision(xi)) - yi;
                grad[0] += err;
                for (g, v) in grad[1..].iter_mut().zip(xi) {
                    *g += err * v;
                }
            }

            grad[0] /= n;
            for (g, w) in grad[1..].iter_mut().zip(&model.weights[1..]) {
                *g = *g / n + cfg.l2 * w;
            }

            for (w, g) in model.weights.iter_mut().zip(&grad) {
                *w -= cfg.learning_rate * g;
            }

            if epoch % 50 == 0 || epoch + 1 == cfg.epochs {
                log::debug!(
                    "Epoch {}/{}: loss={:.6}",
                    epoch + 1,
                    cfg.epochs,
                    metrics::log_loss(y, &model.predict_batch(x)).unwrap_or(0.0)
                );
            }
        }

        model
    }
}
