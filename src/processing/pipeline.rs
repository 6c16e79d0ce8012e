//! Offline analysis pipeline: denoise, detect, measure, classify

use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, info_span, warn};

use crate::config::AnalysisConfig;
use crate::error::EcgResult;
use crate::processing::classification::{MetricClassifier, MetricReport};
use crate::processing::denoising::WaveletDenoiser;
use crate::processing::detection::{Beat, FiducialDetector};
use crate::processing::intervals::{IntervalAnalyzer, IntervalSet};
use crate::processing::quality::QualityEstimate;
use crate::signal::{DenoisedSignal, Signal};

/// Every artifact produced while analysing one record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisOutcome {
    pub denoised: DenoisedSignal,
    pub beats: Vec<Beat>,
    pub intervals: Vec<IntervalSet>,
    pub report: MetricReport,
    pub quality: QualityEstimate,
}

/// The four analysis stages, configured once and reusable across records
///
/// A pipeline holds only immutable configuration, so one instance can be
/// shared by reference between threads analysing different records.
#[derive(Debug, Clone)]
pub struct EcgPipeline {
    config: AnalysisConfig,
    denoiser: WaveletDenoiser,
    detector: FiducialDetector,
    analyzer: IntervalAnalyzer,
    classifier: MetricClassifier,
}

impl EcgPipeline {
    pub fn new(config: AnalysisConfig) -> EcgResult<Self> {
        config.validate()?;

        Ok(Self {
            denoiser: WaveletDenoiser::new(config.denoise.clone())?,
            detector: FiducialDetector::new(config.detection.clone())?,
            analyzer: IntervalAnalyzer::new(config.intervals.clone())?,
            classifier: MetricClassifier::new(config.classification.clone())?,
            config,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run every stage and keep the intermediate artifacts
    pub fn run(&self, signal: Signal) -> EcgResult<AnalysisOutcome> {
        let span = info_span!(
            "ecg_pipeline",
            samples = signal.len(),
            sampling_rate_hz = signal.sampling_rate_hz()
        );
        let _guard = span.enter();

        // Stage 1: wavelet denoising
        let original = signal.samples().to_vec();
        let denoised = self.denoiser.denoise(signal)?;

        // Stage 2: fiducial detection
        let beats = self.detector.detect(&denoised)?;

        // Stage 3: interval analysis
        let intervals = self.analyzer.compute(&beats, &denoised)?;

        // Stage 4: classification
        let report = self.classifier.classify(&intervals)?;

        let r_peaks: Vec<usize> = beats.iter().map(|b| b.r).collect();
        let quality = QualityEstimate::assess(
            &original,
            denoised.samples(),
            &r_peaks,
            denoised.sampling_rate_hz(),
        );

        let low_confidence = beats.iter().filter(|b| !b.confident).count();
        if low_confidence > 0 {
            warn!(low_confidence, total = beats.len(), "beats with missing fiducials");
        }
        info!(
            beats = beats.len(),
            residual_snr_db = ?quality.residual_snr_db,
            "analysis complete"
        );

        Ok(AnalysisOutcome {
            denoised,
            beats,
            intervals,
            report,
            quality,
        })
    }

    /// Run every stage and return only the report
    pub fn analyze(&self, signal: Signal) -> EcgResult<MetricReport> {
        self.run(signal).map(|outcome| outcome.report)
    }

    /// Analyse independent records in parallel; results keep input order
    pub fn analyze_batch(&self, signals: Vec<Signal>) -> Vec<EcgResult<MetricReport>> {
        info!(records = signals.len(), "starting batch analysis");
        signals
            .into_par_iter()
            .map(|signal| self.analyze(signal))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EcgError;

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = AnalysisConfig::default();
        config.detection.refractory_period_s = 0.0;
        assert!(matches!(
            EcgPipeline::new(config),
            Err(EcgError::Configuration { .. })
        ));
    }

    #[test]
    fn test_flat_record_fails_detection() {
        let pipeline = EcgPipeline::new(AnalysisConfig::default()).unwrap();
        let signal = Signal::new(vec![0.0; 1024], 250.0).unwrap();
        assert!(matches!(
            pipeline.analyze(signal),
            Err(EcgError::NoBeatsDetected { .. })
        ));
    }
}
