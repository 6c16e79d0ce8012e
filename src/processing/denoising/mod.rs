//! Stationary wavelet denoising for ECG records
//!
//! The record is decomposed with an undecimated wavelet transform, the noise
//! level is estimated from the finest detail level, every detail level is
//! shrunk with the same threshold, and the record is rebuilt from the
//! untouched approximation plus the shrunk details.

pub mod swt;
pub mod threshold;
pub mod wavelets;

use tracing::{debug, instrument};

use crate::config::DenoiseConfig;
use crate::error::EcgResult;
use crate::signal::{DenoisedSignal, Signal};

pub use swt::{swt_max_level, StationaryWaveletTransform, SwtCoefficients};
pub use wavelets::{FilterBank, WaveletFamily};

/// Wavelet-shrinkage denoiser
#[derive(Debug, Clone)]
pub struct WaveletDenoiser {
    config: DenoiseConfig,
    transform: StationaryWaveletTransform,
}

impl WaveletDenoiser {
    pub fn new(config: DenoiseConfig) -> EcgResult<Self> {
        config.validate()?;
        let transform = StationaryWaveletTransform::new(config.wavelet, config.levels)?;
        Ok(Self { config, transform })
    }

    /// Denoiser with the given wavelet and depth, other settings default
    pub fn with_wavelet(wavelet: WaveletFamily, levels: usize) -> EcgResult<Self> {
        Self::new(DenoiseConfig {
            wavelet,
            levels,
            ..Default::default()
        })
    }

    pub fn config(&self) -> &DenoiseConfig {
        &self.config
    }

    /// Denoise a record
    #[instrument(skip_all, fields(samples = signal.len(), wavelet = %self.config.wavelet))]
    pub fn denoise(&self, signal: Signal) -> EcgResult<DenoisedSignal> {
        self.transform.check_length(signal.len())?;
        let sampling_rate_hz = signal.sampling_rate_hz();

        if is_constant(signal.samples()) {
            debug!("constant record, nothing to shrink");
            return Ok(DenoisedSignal::new(signal.into_samples(), sampling_rate_hz, 0.0, 0.0));
        }

        let mut coefficients = self.transform.decompose(signal.samples())?;

        let noise_sigma = threshold::estimate_noise_sigma(&coefficients.details[0]);
        let threshold = threshold::select_threshold(
            self.config.threshold_rule,
            noise_sigma,
            signal.len(),
            self.config.threshold_scale,
        );
        debug!(noise_sigma, threshold, "shrinking detail coefficients");

        for detail in coefficients.details.iter_mut() {
            threshold::shrink_all(detail, threshold, self.config.shrinkage);
        }

        let samples = self.transform.reconstruct(&coefficients)?;
        Ok(DenoisedSignal::new(samples, sampling_rate_hz, noise_sigma, threshold))
    }
}

fn is_constant(samples: &[f64]) -> bool {
    match samples.split_first() {
        Some((first, rest)) => rest.iter().all(|x| x == first),
        None => true,
    }
}
