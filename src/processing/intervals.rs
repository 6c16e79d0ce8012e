//! Interval and amplitude measurements per beat

use serde::Serialize;
use tracing::{debug, instrument};

use crate::config::IntervalConfig;
use crate::error::EcgResult;
use crate::processing::detection::{clip_window, window_mean, Beat};
use crate::signal::{seconds_to_samples, DenoisedSignal};

/// Durations in seconds and amplitudes in millivolts for one beat
///
/// Every field is `None` when a fiducial it depends on is missing, which keeps
/// "not measured" distinct from a zero measurement.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct IntervalSet {
    /// R-peak sample index of the beat this set describes
    pub r_index: usize,
    pub rr_s: Option<f64>,
    pub pq_s: Option<f64>,
    pub qrs_s: Option<f64>,
    /// Q point to T-peak
    pub qt_s: Option<f64>,
    /// S point to T-peak
    pub st_segment_s: Option<f64>,
    pub st_deviation_mv: Option<f64>,
    pub t_amplitude_mv: Option<f64>,
    /// Isoelectric level the amplitudes are measured against
    pub baseline_mv: Option<f64>,
}

/// Offsets resolved to samples for one record
#[derive(Debug, Clone, Copy)]
struct Offsets {
    st_point: isize,
    st_half_window: isize,
    p_onset: isize,
    baseline: isize,
    fallback_start: isize,
    fallback_end: isize,
}

impl Offsets {
    fn resolve(config: &IntervalConfig, sampling_rate_hz: f64) -> Self {
        let samples = |seconds: f64| seconds_to_samples(seconds, sampling_rate_hz) as isize;
        Self {
            st_point: samples(config.st_point_offset_s),
            st_half_window: samples(config.st_averaging_window_s / 2.0),
            p_onset: samples(config.p_onset_offset_s),
            baseline: samples(config.baseline_window_s).max(1),
            fallback_start: samples(config.fallback_baseline_start_s),
            fallback_end: samples(config.fallback_baseline_end_s),
        }
    }
}

/// Turns fiducial points into durations and amplitudes
#[derive(Debug, Clone)]
pub struct IntervalAnalyzer {
    config: IntervalConfig,
}

impl IntervalAnalyzer {
    pub fn new(config: IntervalConfig) -> EcgResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &IntervalConfig {
        &self.config
    }

    /// One [`IntervalSet`] per beat, in beat order
    #[instrument(skip_all, fields(beats = beats.len()))]
    pub fn compute(&self, beats: &[Beat], denoised: &DenoisedSignal) -> EcgResult<Vec<IntervalSet>> {
        let fs = denoised.sampling_rate_hz();
        let x = denoised.samples();
        let offsets = Offsets::resolve(&self.config, fs);

        let duration = |from: Option<usize>, to: Option<usize>| match (from, to) {
            (Some(a), Some(b)) if b >= a => Some((b - a) as f64 / fs),
            _ => None,
        };

        let intervals: Vec<IntervalSet> = beats
            .iter()
            .enumerate()
            .map(|(i, beat)| {
                let previous_r = i.checked_sub(1).map(|j| beats[j].r);
                let baseline_mv = baseline(x, beat, &offsets);

                let st_deviation_mv = beat.s.zip(baseline_mv).and_then(|(s, base)| {
                    let centre = s as isize + offsets.st_point;
                    let window = clip_window(
                        centre - offsets.st_half_window,
                        centre + offsets.st_half_window + 1,
                        x.len(),
                    )?;
                    window_mean(x, window).map(|level| level - base)
                });

                IntervalSet {
                    r_index: beat.r,
                    rr_s: duration(previous_r, Some(beat.r)),
                    pq_s: duration(beat.p, Some(beat.r)),
                    qrs_s: duration(beat.q, beat.s),
                    qt_s: duration(beat.q, beat.t),
                    st_segment_s: duration(beat.s, beat.t),
                    st_deviation_mv,
                    t_amplitude_mv: beat.t.zip(baseline_mv).map(|(t, base)| x[t] - base),
                    baseline_mv,
                }
            })
            .collect();

        debug!(
            with_rr = intervals.iter().filter(|s| s.rr_s.is_some()).count(),
            with_st = intervals.iter().filter(|s| s.st_deviation_mv.is_some()).count(),
            "interval analysis complete"
        );
        Ok(intervals)
    }
}

/// Isoelectric level before the P-wave, or before R when P is missing
fn baseline(x: &[f64], beat: &Beat, offsets: &Offsets) -> Option<f64> {
    let window = match beat.p {
        Some(p) => {
            let end = p as isize - offsets.p_onset;
            clip_window(end - offsets.baseline, end, x.len())
        }
        None => {
            let r = beat.r as isize;
            clip_window(r - offsets.fallback_start, r - offsets.fallback_end, x.len())
        }
    }?;
    window_mean(x, window)
}
