//! Undecimated (a trous) stationary wavelet transform with periodic extension

use crate::config::constants::denoise::{MAX_LEVELS, MIN_LEVELS};
use crate::error::{EcgError, EcgResult, PipelineStage};
use super::wavelets::{Filter, FilterBank, WaveletFamily};

/// Coefficients of a multi-level SWT
#[derive(Debug, Clone, PartialEq)]
pub struct SwtCoefficients {
    /// Approximation at the coarsest level
    pub approximation: Vec<f64>,
    /// Detail coefficients, finest level first
    pub details: Vec<Vec<f64>>,
}

impl SwtCoefficients {
    pub fn levels(&self) -> usize {
        self.details.len()
    }

    /// Detail energy per level followed by the approximation energy,
    /// normalised to sum to one
    pub fn energy_distribution(&self) -> Vec<f64> {
        let mut energy: Vec<f64> = self
            .details
            .iter()
            .map(|level| level.iter().map(|c| c * c).sum())
            .collect();
        energy.push(self.approximation.iter().map(|c| c * c).sum());

        let total: f64 = energy.iter().sum();
        if total > 0.0 {
            energy.iter_mut().for_each(|e| *e /= total);
        }
        energy
    }
}

/// Deepest decomposition a signal of `len` samples admits
pub fn swt_max_level(len: usize) -> usize {
    if len == 0 {
        0
    } else {
        len.trailing_zeros() as usize
    }
}

/// Multi-level stationary wavelet transform
#[derive(Debug, Clone)]
pub struct StationaryWaveletTransform {
    bank: FilterBank,
    levels: usize,
}

impl StationaryWaveletTransform {
    pub fn new(wavelet: WaveletFamily, levels: usize) -> EcgResult<Self> {
        if !(MIN_LEVELS..=MAX_LEVELS).contains(&levels) {
            return Err(EcgError::configuration(
                PipelineStage::Denoising,
                "levels",
                format!("must be within {}..={}, got {}", MIN_LEVELS, MAX_LEVELS, levels),
            ));
        }
        Ok(Self {
            bank: wavelet.filter_bank(),
            levels,
        })
    }

    pub fn levels(&self) -> usize {
        self.levels
    }

    /// Check that `len` admits the configured depth
    pub fn check_length(&self, len: usize) -> EcgResult<()> {
        let block = 1usize << self.levels;
        if len < block {
            return Err(EcgError::InsufficientLength {
                required: block,
                actual: len,
            });
        }
        if len % block != 0 {
            return Err(EcgError::configuration(
                PipelineStage::Denoising,
                "levels",
                format!(
                    "signal length {} is not a multiple of 2^{} = {}; at most {} levels fit",
                    len,
                    self.levels,
                    block,
                    swt_max_level(len)
                ),
            ));
        }
        Ok(())
    }

    /// Decompose `signal` into `levels` detail sets and one approximation
    pub fn decompose(&self, signal: &[f64]) -> EcgResult<SwtCoefficients> {
        self.check_length(signal.len())?;

        let mut approximation = signal.to_vec();
        let mut details = Vec::with_capacity(self.levels);

        for level in 0..self.levels {
            let step = 1usize << level;
            let next_approx = correlate(&approximation, &self.bank.dec_lo, step);
            let detail = correlate(&approximation, &self.bank.dec_hi, step);
            details.push(detail);
            approximation = next_approx;
        }

        Ok(SwtCoefficients { approximation, details })
    }

    /// Invert a decomposition produced by [`StationaryWaveletTransform::decompose`]
    pub fn reconstruct(&self, coefficients: &SwtCoefficients) -> EcgResult<Vec<f64>> {
        if coefficients.levels() != self.levels {
            return Err(EcgError::configuration(
                PipelineStage::Denoising,
                "levels",
                format!(
                    "coefficients have {} levels, transform expects {}",
                    coefficients.levels(),
                    self.levels
                ),
            ));
        }

        let mut approximation = coefficients.approximation.clone();
        for (level, detail) in coefficients.details.iter().enumerate().rev() {
            let step = 1usize << level;
            let low = convolve(&approximation, &self.bank.rec_lo, step);
            let high = convolve(detail, &self.bank.rec_hi, step);
            approximation = low
                .iter()
                .zip(high.iter())
                .map(|(l, h)| 0.5 * (l + h))
                .collect();
        }

        Ok(approximation)
    }
}

/// `y[n] = sum_k f[k] x[n + k*step]`, indices wrapped
fn correlate(signal: &[f64], filter: &Filter, step: usize) -> Vec<f64> {
    let n = signal.len() as isize;
    let step = step as isize;
    (0..n)
        .map(|i| {
            filter
                .offsets()
                .map(|(k, tap)| tap * signal[(i + k * step).rem_euclid(n) as usize])
                .sum()
        })
        .collect()
}

/// `y[n] = sum_k f[k] x[n - k*step]`, the adjoint of [`correlate`]
fn convolve(signal: &[f64], filter: &Filter, step: usize) -> Vec<f64> {
    let n = signal.len() as isize;
    let step = step as isize;
    (0..n)
        .map(|i| {
            filter
                .offsets()
                .map(|(k, tap)| tap * signal[(i - k * step).rem_euclid(n) as usize])
                .sum()
        })
        .collect()
}
