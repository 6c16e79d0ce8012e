//! Fiducial point detection
//!
//! R-peaks are located first over the whole record. Each beat then gets its
//! secondary landmarks from bounded windows around its R-peak: Q and S as the
//! flanking minima, P as the largest maximum before Q, and T as the dominant
//! extremum after S. A landmark without a qualifying extremum is left as
//! `None`; only a record with no beats at all is an error.

mod morphology;
mod r_peaks;

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::config::DetectionConfig;
use crate::error::{require_positive, EcgError, EcgResult, PipelineStage};
use crate::signal::{seconds_to_samples, DenoisedSignal};
use crate::utils::stats::median;

pub(crate) use morphology::{clip_window, window_mean};
use morphology::{dominant_extremum, highest_local_max, lowest_local_min};

/// One cardiac cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Beat {
    /// R-peak sample index
    pub r: usize,
    pub p: Option<usize>,
    pub q: Option<usize>,
    pub s: Option<usize>,
    pub t: Option<usize>,
    /// True when every secondary fiducial was located
    pub confident: bool,
}

impl Beat {
    pub fn new(r: usize, p: Option<usize>, q: Option<usize>, s: Option<usize>, t: Option<usize>) -> Self {
        let confident = p.is_some() && q.is_some() && s.is_some() && t.is_some();
        Self { r, p, q, s, t, confident }
    }

    /// Beat with only its R-peak known
    pub fn r_only(r: usize) -> Self {
        Self::new(r, None, None, None, None)
    }
}

/// Window lengths resolved to samples for one record
#[derive(Debug, Clone, Copy)]
struct SearchWindows {
    q: isize,
    s: isize,
    p: isize,
    st_gap: isize,
    expected_rr: isize,
}

impl SearchWindows {
    fn resolve(config: &DetectionConfig, sampling_rate_hz: f64) -> Self {
        let samples = |seconds: f64| seconds_to_samples(seconds, sampling_rate_hz) as isize;
        Self {
            q: samples(config.q_window_s).max(1),
            s: samples(config.s_window_s).max(1),
            p: samples(config.p_window_s).max(1),
            st_gap: samples(config.min_st_gap_s),
            expected_rr: samples(config.expected_rr_s).max(1),
        }
    }
}

/// Locates R-peaks and the P, Q, S and T landmarks around them
#[derive(Debug, Clone)]
pub struct FiducialDetector {
    config: DetectionConfig,
}

impl FiducialDetector {
    pub fn new(config: DetectionConfig) -> EcgResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Detect every beat in `denoised`, ordered by time
    #[instrument(skip_all, fields(samples = denoised.len()))]
    pub fn detect(&self, denoised: &DenoisedSignal) -> EcgResult<Vec<Beat>> {
        let sampling_rate_hz = denoised.sampling_rate_hz();
        require_positive(PipelineStage::Detection, "sampling_rate_hz", sampling_rate_hz)?;

        let x = denoised.samples();
        let r_peaks = r_peaks::detect_r_peaks(x, sampling_rate_hz, &self.config);

        if r_peaks.is_empty() {
            if denoised.duration_s() >= self.config.refractory_period_s {
                return Err(EcgError::NoBeatsDetected {
                    samples: denoised.len(),
                    duration_s: denoised.duration_s(),
                });
            }
            warn!(
                duration_s = denoised.duration_s(),
                "record shorter than one refractory period, no beats"
            );
            return Ok(Vec::new());
        }

        let windows = SearchWindows::resolve(&self.config, sampling_rate_hz);
        let beats: Vec<Beat> = r_peaks
            .iter()
            .enumerate()
            .map(|(i, &r)| {
                let previous = i.checked_sub(1).map(|j| r_peaks[j]);
                let next = r_peaks.get(i + 1).copied();
                self.delineate(x, r, previous, next, &windows)
            })
            .collect();

        let confident = beats.iter().filter(|b| b.confident).count();
        debug!(beats = beats.len(), confident, "fiducial detection complete");
        Ok(beats)
    }

    /// Secondary fiducials for the beat at `r`
    fn delineate(
        &self,
        x: &[f64],
        r: usize,
        previous: Option<usize>,
        next: Option<usize>,
        w: &SearchWindows,
    ) -> Beat {
        let len = x.len();
        let ri = r as isize;

        let q = clip_window(ri - w.q, ri, len).and_then(|win| lowest_local_min(x, win));
        let s = clip_window(ri + 1, ri + 1 + w.s, len).and_then(|win| lowest_local_min(x, win));

        let p_end = q.map_or(ri - w.q, |q| q as isize);
        let p = clip_window(p_end - w.p, p_end, len).and_then(|win| highest_local_max(x, win));

        let expected_rr = match (previous, next) {
            (_, Some(n)) => (n - r) as isize,
            (Some(p), None) => (r - p) as isize,
            (None, None) => w.expected_rr,
        };
        let t_start = s.map_or(ri + w.s, |s| s as isize) + w.st_gap;
        let mut t_end = ri + (self.config.t_window_rr_fraction * expected_rr as f64).round() as isize;
        if let Some(n) = next {
            t_end = t_end.min(n as isize);
        }

        let t = clip_window(t_start, t_end, len).and_then(|win| {
            let reference = clip_window(ri - (w.p + w.q), t_end, len)
                .and_then(|span| median(&x[span]))
                .unwrap_or(0.0);
            dominant_extremum(x, win, reference)
        });

        Beat::new(r, p, q, s, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::Signal;

    const FS: f64 = 250.0;

    fn gaussian(t: f64, centre: f64, width: f64, amplitude: f64) -> f64 {
        amplitude * (-((t - centre) / width).powi(2) / 2.0).exp()
    }

    /// Clean PQRST beats every 0.8 s, R at 0.3 s into each cycle
    fn beat_train(beats: usize) -> DenoisedSignal {
        let cycle = 0.8;
        let len = (beats as f64 * cycle * FS) as usize;
        let samples = (0..len)
            .map(|i| {
                let t = i as f64 / FS;
                let local = t % cycle;
                gaussian(local, 0.14, 0.02, 0.15)
                    + gaussian(local, 0.27, 0.008, -0.12)
                    + gaussian(local, 0.30, 0.01, 1.2)
                    + gaussian(local, 0.33, 0.008, -0.2)
                    + gaussian(local, 0.55, 0.04, 0.3)
            })
            .collect();
        DenoisedSignal::from_clean(Signal::new(samples, FS).unwrap())
    }

    fn detector() -> FiducialDetector {
        FiducialDetector::new(DetectionConfig::default()).unwrap()
    }

    #[test]
    fn test_beat_confidence() {
        assert!(Beat::new(10, Some(1), Some(8), Some(12), Some(30)).confident);
        assert!(!Beat::new(10, Some(1), None, Some(12), Some(30)).confident);
        assert!(!Beat::r_only(10).confident);
    }

    #[test]
    fn test_detects_all_beats_with_fiducials() {
        let beats = detector().detect(&beat_train(6)).unwrap();
        assert_eq!(beats.len(), 6);

        for (k, beat) in beats.iter().enumerate() {
            let expected_r = (k as f64 * 0.8 * FS + 0.30 * FS).round() as usize;
            assert!(beat.r.abs_diff(expected_r) <= 1, "beat {} at {}", k, beat.r);

            let q = beat.q.expect("q");
            let s = beat.s.expect("s");
            let p = beat.p.expect("p");
            let t = beat.t.expect("t");
            assert!(p < q && q < beat.r && beat.r < s && s < t);
            assert!(beat.confident);
        }
    }

    #[test]
    fn test_t_wave_found_near_expected_position() {
        let beats = detector().detect(&beat_train(4)).unwrap();
        let t = beats[1].t.unwrap();
        let expected = (0.8 * FS + 0.55 * FS).round() as usize;
        assert!(t.abs_diff(expected) <= 2, "T at {}, expected {}", t, expected);
    }

    #[test]
    fn test_flat_record_has_no_beats() {
        let flat = DenoisedSignal::from_clean(Signal::new(vec![0.0; 1000], FS).unwrap());
        assert!(matches!(
            detector().detect(&flat),
            Err(EcgError::NoBeatsDetected { samples: 1000, .. })
        ));
    }

    #[test]
    fn test_record_shorter_than_refractory_period() {
        let short = DenoisedSignal::from_clean(Signal::new(vec![0.0; 10], FS).unwrap());
        assert!(detector().detect(&short).unwrap().is_empty());
    }

    #[test]
    fn test_peak_at_record_edges_marks_fiducials_absent() {
        // Peaks two samples from either edge leave no room for Q/P or S/T
        let mut samples = vec![0.0; 500];
        for (i, v) in [(1, 0.6), (2, 1.0), (3, 0.6), (496, 0.6), (497, 1.0), (498, 0.6)] {
            samples[i] = v;
        }
        let signal = DenoisedSignal::from_clean(Signal::new(samples, FS).unwrap());
        let beats = detector().detect(&signal).unwrap();

        assert_eq!(beats.len(), 2);
        assert_eq!(beats[0].r, 2);
        assert!(beats[0].p.is_none() && beats[0].q.is_none());
        assert_eq!(beats[1].r, 497);
        assert!(beats[1].s.is_none() && beats[1].t.is_none());
        assert!(!beats[0].confident && !beats[1].confident);
    }
}
