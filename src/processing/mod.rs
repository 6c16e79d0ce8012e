// src/processing/mod.rs
//! Signal processing stages for ECG records

pub mod classification;
pub mod denoising;
pub mod detection;
pub mod intervals;
pub mod pipeline;
pub mod quality;

pub use classification::{
    BeatClassification, HeartRateBracket, Label, LabelDistribution, MetricClassifier, MetricReport,
    PqStatus, ReportSummary, RhythmStatus, StStatus, TWaveStatus,
};
pub use denoising::{WaveletDenoiser, WaveletFamily};
pub use detection::{Beat, FiducialDetector};
pub use intervals::{IntervalAnalyzer, IntervalSet};
pub use pipeline::{AnalysisOutcome, EcgPipeline};
pub use quality::QualityEstimate;
