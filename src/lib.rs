//! ECG-Core: electrocardiogram denoising and metric extraction
//!
//! This library turns a single-lead ECG record into a labelled metric report.
//! It features:
//!
//! - Stationary wavelet denoising with noise-adaptive shrinkage
//! - R-peak and P/Q/S/T fiducial detection
//! - RR, PQ, QRS, QT and ST measurements with explicit absence
//! - Reference-range classification of heart rate, rhythm, PQ, ST and T-wave
//! - TOML and environment based configuration
//! - A seeded ECG synthesizer for tests and benchmarks
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ecg_core::{AnalysisConfig, EcgPipeline};
//! use ecg_core::simulation::{EcgSynthesizer, SynthesisConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let record = EcgSynthesizer::new(SynthesisConfig::default())?.generate()?;
//!
//!     let pipeline = EcgPipeline::new(AnalysisConfig::default())?;
//!     let report = pipeline.analyze(record)?;
//!
//!     println!("mean heart rate: {:?} bpm", report.summary.mean_heart_rate_bpm);
//!     println!("rhythm: {}", report.summary.rhythm);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod error;
pub mod processing;
pub mod signal;
pub mod simulation;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::{AnalysisConfig, ConfigLoader};
pub use error::{EcgError, EcgResult, PipelineStage};
pub use processing::{
    AnalysisOutcome, Beat, EcgPipeline, FiducialDetector, IntervalAnalyzer, IntervalSet,
    MetricClassifier, MetricReport, WaveletDenoiser, WaveletFamily,
};
pub use signal::{DenoisedSignal, Signal};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: "ECG denoising and metric extraction library".to_string(),
        features: vec![
            "Stationary wavelet denoising".to_string(),
            "Fiducial point detection".to_string(),
            "Interval analysis".to_string(),
            "Reference-range classification".to_string(),
            "Parallel batch analysis".to_string(),
        ],
    }
}

/// Library version information
#[derive(Debug, Clone)]
pub struct VersionInfo {
    /// Library name
    pub name: String,
    /// Version string
    pub version: String,
    /// Description
    pub description: String,
    /// List of features
    pub features: Vec<String>,
}
