// src/error.rs
//! Unified error handling for ECG Core
//!
//! Every structural failure of the analysis pipeline surfaces as an [`EcgError`].
//! Missing fiducials are never errors: they travel through the pipeline as
//! `None` and end up as indeterminate labels in the report.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::loader::ConfigError;

/// Result type alias for ECG operations
pub type EcgResult<T> = Result<T, EcgError>;

/// Unified error type for the ECG analysis core
#[derive(Error, Debug)]
pub enum EcgError {
    /// A tunable parameter is invalid for the stage that consumes it
    #[error("[CONFIG] {stage} stage: invalid `{parameter}`: {reason}")]
    Configuration {
        stage: PipelineStage,
        parameter: String,
        reason: String,
    },

    /// The signal is too short for the requested decomposition depth
    #[error("[LENGTH] signal has {actual} samples, at least {required} required")]
    InsufficientLength { required: usize, actual: usize },

    /// No R-peak was found in a record long enough to contain one
    #[error("[DETECTION] no beats detected in {samples} samples ({duration_s:.3} s)")]
    NoBeatsDetected { samples: usize, duration_s: f64 },

    /// Nothing reached the classifier
    #[error("[CLASSIFICATION] record contains no beats to classify")]
    EmptyRecord,

    /// A sample is NaN or infinite
    #[error("[DATA] sample {index} is not finite ({value})")]
    InvalidSample { index: usize, value: f64 },

    /// Configuration file loading failed
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Pipeline stages for error attribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineStage {
    Ingestion,
    Denoising,
    Detection,
    Intervals,
    Classification,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Ingestion => "ingestion",
            PipelineStage::Denoising => "denoising",
            PipelineStage::Detection => "detection",
            PipelineStage::Intervals => "intervals",
            PipelineStage::Classification => "classification",
        };
        f.write_str(name)
    }
}

impl EcgError {
    /// Shorthand for a configuration error on `parameter`
    pub fn configuration(
        stage: PipelineStage,
        parameter: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        EcgError::Configuration {
            stage,
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// True for errors caused by the input record rather than by configuration
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            EcgError::InsufficientLength { .. }
                | EcgError::NoBeatsDetected { .. }
                | EcgError::EmptyRecord
                | EcgError::InvalidSample { .. }
        )
    }
}

/// Checks that `value` is finite and strictly positive
pub(crate) fn require_positive(
    stage: PipelineStage,
    parameter: &str,
    value: f64,
) -> EcgResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(EcgError::configuration(
            stage,
            parameter,
            format!("must be finite and > 0, got {}", value),
        ))
    }
}
