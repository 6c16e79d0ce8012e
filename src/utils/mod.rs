// src/utils/mod.rs
//! Numeric helpers shared by the pipeline stages

pub mod stats;

pub use stats::{coefficient_of_variation, mean, median, rmssd, std_dev};
