//! Data ingestion and output
//!
//! CSV readers for the raw competition files and writers for the feature
//! tables and submissions.

pub mod reader;
pub mod writer;

pub use reader::{Parsed, ReadOptions};
