//! Post-hoc probability calibration
//!
//! Temperature scaling on the log-odds, then a hard clip. Applied at
//! inference only.

use serde::{Deserialize, Serialize};

use crate::model::logistic::{sigmoid, PROB_EPS};
use crate::{ManiaError, Result};

/// Clamp `p` into `[lo, hi]`
pub fn clip_prob(p: f64, lo: f64, hi: f64) -> f64 {
    if p < lo {
        lo
    } else if p > hi {
        hi
    } else {
        p
    }
}

/// Divide the log-odds of `p` by `t` and map back to a probability.
///
/// `t > 1` pulls predictions toward 0.5, `t < 1` pushes them outward.
/// Non-positive temperatures return `p` unchanged.
pub fn temperature_scale(p: f64, t: f64) -> f64 {
    if t <= 0.0 {
        return p;
    }
    let p = p.clamp(PROB_EPS, 1.0 - PROB_EPS);
    let logit = (p / (1.0 - p)).ln();
    sigmoid(logit / t)
}

/// Inference-time calibration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    pub temperature: f64,
    pub clip_lo: f64,
    pub clip_hi: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Calibration {
            temperature: 1.0,
            clip_lo: 0.02,
            clip_hi: 0.98,
        }
    }
}

impl Calibration {
    /// Require `0 <= clip_lo <= clip_hi <= 1` and a finite temperature
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.clip_lo)
            || !(0.0..=1.0).contains(&self.clip_hi)
            || self.clip_lo > self.clip_hi
        {
            return Err(ManiaError::Config(format!(
                "Invalid clip bounds [{}, {}], need 0 <= lo <= hi <= 1",
                self.clip_lo, self.clip_hi
            )));
        }
        if !self.temperature.is_finite() {
            return Err(ManiaError::Config(format!(
                "Invalid temperature {}",
                self.temperature
            )));
        }
        Ok(())
    }

    /// Temperature-scale then clip
    pub fn apply(&self, p: f64) -> f64 {
        clip_prob(
            temperature_scale(p, self.temperature),
            self.clip_lo,
            self.clip_hi,
        )
    }
}
