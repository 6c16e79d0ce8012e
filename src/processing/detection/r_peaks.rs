//! R-peak search with an adaptive amplitude threshold

use std::collections::VecDeque;

use tracing::trace;

use super::morphology::is_local_max;
use crate::config::constants::detection::SLOPE_SPAN_S;
use crate::config::DetectionConfig;
use crate::signal::seconds_to_samples;
use crate::utils::stats::median;

/// Locate R-peaks in `samples`.
///
/// Candidates are local maxima of the median-centred signal that reach
/// `threshold_fraction` of the centred rolling maximum. Candidates closer
/// than the refractory period collapse to the larger one. A candidate inside
/// the T-wave rejection window of the previous peak is dropped when its
/// steepest slope is below `t_wave_slope_ratio` of that peak's.
pub(crate) fn detect_r_peaks(samples: &[f64], sampling_rate_hz: f64, config: &DetectionConfig) -> Vec<usize> {
    let Some(baseline) = median(samples) else {
        return Vec::new();
    };
    let centred: Vec<f64> = samples.iter().map(|x| x - baseline).collect();

    let half_window = seconds_to_samples(config.rolling_window_s / 2.0, sampling_rate_hz).max(1);
    let envelope = rolling_max(&centred, half_window);
    let refractory = seconds_to_samples(config.refractory_period_s, sampling_rate_hz).max(1);
    let t_window = seconds_to_samples(config.t_wave_rejection_window_s, sampling_rate_hz);
    let slopes = SlopeProbe {
        x: &centred,
        span: seconds_to_samples(SLOPE_SPAN_S, sampling_rate_hz).max(1),
        before: seconds_to_samples(config.q_window_s, sampling_rate_hz),
        after: seconds_to_samples(config.s_window_s, sampling_rate_hz),
    };

    let mut peaks: Vec<usize> = Vec::new();
    for i in 1..centred.len().saturating_sub(1) {
        let amplitude = centred[i];
        if amplitude <= 0.0 || amplitude < config.threshold_fraction * envelope[i] {
            continue;
        }
        if config.min_peak_height.is_some_and(|height| samples[i] < height) {
            continue;
        }
        if !is_local_max(&centred, i) {
            continue;
        }

        match peaks.last_mut() {
            Some(last) if i - *last < refractory => {
                if amplitude > centred[*last] {
                    trace!(replaced = *last, by = i, "refractory collision");
                    *last = i;
                }
            }
            Some(&mut last)
                if i - last < t_window
                    && slopes.steepest(i) < config.t_wave_slope_ratio * slopes.steepest(last) =>
            {
                trace!(candidate = i, after = last, "rejected as T-wave");
            }
            _ => peaks.push(i),
        }
    }

    peaks
}

/// Steepest central-difference slope around a candidate peak
struct SlopeProbe<'a> {
    x: &'a [f64],
    span: usize,
    before: usize,
    after: usize,
}

impl SlopeProbe<'_> {
    fn steepest(&self, i: usize) -> f64 {
        let n = self.x.len();
        let lo = i.saturating_sub(self.before).max(self.span);
        let hi = (i + self.after).min(n.saturating_sub(self.span + 1));
        (lo..=hi)
            .map(|j| (self.x[j + self.span] - self.x[j - self.span]).abs())
            .fold(0.0, f64::max)
            / (2 * self.span) as f64
    }
}

/// Maximum over `[i - half, i + half]` for every `i`, via a monotonic deque
fn rolling_max(x: &[f64], half: usize) -> Vec<f64> {
    let n = x.len();
    let mut out = Vec::with_capacity(n);
    let mut deque: VecDeque<usize> = VecDeque::new();
    let mut next = 0;

    for i in 0..n {
        let hi = (i + half).min(n - 1);
        while next <= hi {
            while deque.back().is_some_and(|&back| x[back] <= x[next]) {
                deque.pop_back();
            }
            deque.push_back(next);
            next += 1;
        }

        let lo = i.saturating_sub(half);
        while deque.front().is_some_and(|&front| front < lo) {
            deque.pop_front();
        }

        out.push(deque.front().map_or(f64::NEG_INFINITY, |&front| x[front]));
    }

    out
}
