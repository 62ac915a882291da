//! Evaluation metrics and cross-validation reporting

use std::fmt;

use crate::model::logistic::PROB_EPS;
use crate::Season;

/// Mean squared error between predicted probabilities and 0/1 outcomes.
///
/// `None` for an empty set.
pub fn brier_score(y_true: &[f64], y_pred: &[f64]) -> Option<f64> {
    if y_true.is_empty() {
        return None;
    }
    let sum: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (p - t).powi(2))
        .sum();
    Some(sum / y_true.len() as f64)
}

/// Mean binary cross-entropy
pub fn log_loss(y_true: &[f64], y_pred: &[f64]) -> Option<f64> {
    if y_true.is_empty() {
        return None;
    }
    let sum: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(&t, &p)| {
            let p = p.clamp(PROB_EPS, 1.0 - PROB_EPS);
            -(t * p.ln() + (1.0 - t) * (1.0 - p).ln())
        })
        .sum();
    Some(sum / y_true.len() as f64)
}

/// Share of predictions on the correct side of 0.5
pub fn accuracy(y_true: &[f64], y_pred: &[f64]) -> Option<f64> {
    if y_true.is_empty() {
        return None;
    }
    let correct = y_true
        .iter()
        .zip(y_pred)
        .filter(|(t, p)| (**p >= 0.5) == (**t >= 0.5))
        .count();
    Some(correct as f64 / y_true.len() as f64)
}

/// Population mean and standard deviation; (0, 0) for an empty slice
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// Validation result for one fold
#[derive(Debug, Clone)]
pub struct FoldMetrics {
    pub fold: usize,
    pub val_season: Option<Season>,
    pub n_train: usize,
    pub n_val: usize,
    pub brier: Option<f64>,
    pub calibrated_brier: Option<f64>,
    pub log_loss: Option<f64>,
    pub accuracy: Option<f64>,
}

impl FoldMetrics {
    /// Compute fold metrics from raw and calibrated validation predictions
    pub fn evaluate(
        fold: usize,
        val_season: Option<Season>,
        n_train: usize,
        y_true: &[f64],
        raw: &[f64],
        calibrated: &[f64],
    ) -> Self {
        FoldMetrics {
            fold,
            val_season,
            n_train,
            n_val: y_true.len(),
            brier: brier_score(y_true, raw),
            calibrated_brier: brier_score(y_true, calibrated),
            log_loss: log_loss(y_true, raw),
            accuracy: accuracy(y_true, raw),
        }
    }
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| format!("{:.6}", x))
        .unwrap_or_else(|| "n/a".to_string())
}

impl fmt::Display for FoldMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Fold {}: val_season={} n_train={} n_val={} Brier={} (calibrated {}) LogLoss={} Acc={}",
            self.fold + 1,
            self.val_season.unwrap_or(-1),
            self.n_train,
            self.n_val,
            fmt_opt(self.brier),
            fmt_opt(self.calibrated_brier),
            fmt_opt(self.log_loss),
            self.accuracy
                .map(|a| format!("{:.1}%", a * 100.0))
                .unwrap_or_else(|| "n/a".to_string()),
        )
    }
}

/// Cross-validation results across all folds
#[derive(Debug, Clone, Default)]
pub struct CvReport {
    pub folds: Vec<FoldMetrics>,
}

impl CvReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, fold: FoldMetrics) {
        self.folds.push(fold);
    }

    /// Mean and std of raw Brier over folds with validation rows
    pub fn brier_mean_std(&self) -> (f64, f64) {
        let scores: Vec<f64> = self.folds.iter().filter_map(|f| f.brier).collect();
        mean_std(&scores)
    }

    /// Mean and std of calibrated Brier over folds with validation rows
    pub fn calibrated_brier_mean_std(&self) -> (f64, f64) {
        let scores: Vec<f64> = self.folds.iter().filter_map(|f| f.calibrated_brier).collect();
        mean_std(&scores)
    }

    /// Folds that had no validation rows
    pub fn empty_folds(&self) -> usize {
        self.folds.iter().filter(|f| f.brier.is_none()).count()
    }
}

impl fmt::Display for CvReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (mean, std) = self.brier_mean_std();
        let (cal_mean, cal_std) = self.calibrated_brier_mean_std();
        write!(
            f,
            "CV Brier mean={:.6} std={:.6} | calibrated mean={:.6} std={:.6}",
            mean, std, cal_mean, cal_std
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brier_score() {
        assert_eq!(brier_score(&[1.0, 0.0], &[1.0, 0.0]), Some(0.0));
        assert_eq!(brier_score(&[1.0, 0.0], &[0.5, 0.5]), Some(0.25));
        assert_eq!(brier_score(&[1.0], &[0.0]), Some(1.0));
        assert_eq!(brier_score(&[], &[]), None);
    }

    #[test]
    fn test_log_loss_finite_at_extremes() {
        let ll = log_loss(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
        assert!(ll.is_finite());
        assert!(ll > 30.0);
        let half = log_loss(&[1.0], &[0.5]).unwrap();
        assert!((half - std::f64::consts::LN_2).abs() < 1e-12);
    }

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(&[1.0, 0.0, 1.0, 0.0], &[0.9, 0.2, 0.4, 0.6]), Some(0.5));
    }

    #[test]
    fn test_mean_std() {
        assert_eq!(mean_std(&[]), (0.0, 0.0));
        let (m, s) = mean_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(m, 5.0);
        assert_eq!(s, 2.0);
    }

    #[test]
    fn test_report_skips_empty_folds() {
        let mut report = CvReport::new();
        report.push(FoldMetrics::evaluate(0, Some(2019), 10, &[1.0, 0.0], &[0.8, 0.2], &[0.7, 0.3]));
        report.push(FoldMetrics::evaluate(1, None, 12, &[], &[], &[]));

        assert_eq!(report.empty_folds(), 1);
        let (mean, std) = report.brier_mean_std();
        assert!((mean - 0.04).abs() < 1e-12);
        assert_eq!(std, 0.0);
        let (cal_mean, _) = report.calibrated_brier_mean_std();
        assert!((cal_mean - 0.09).abs() < 1e-12);

        let line = report.folds[1].to_string();
        assert!(line.contains("val_season=-1"));
        assert!(line.contains("Brier=n/a"));
    }
}
