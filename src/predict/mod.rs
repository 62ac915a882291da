//! Prediction and calibration
//!
//! Apply a trained model to matchup rows and calibrate the output.

pub mod calibration;
pub mod inference;

pub use calibration::{clip_prob, temperature_scale, Calibration};
pub use inference::{Predictor, SubmissionRow};
