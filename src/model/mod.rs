//! Model definitions
//!
//! Logistic regression over matchup difference features.

pub mod logistic;

pub use logistic::{sigmoid, LogisticModel};
