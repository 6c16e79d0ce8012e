//! Bounded extremum searches over sample windows
//!
//! Every search clips its window to the record and only accepts samples with
//! both neighbours inside the record, so callers may pass windows that hang
//! over either edge.

use std::ops::Range;

/// Clip the half-open window `[start, end)` to `0..len`
pub(crate) fn clip_window(start: isize, end: isize, len: usize) -> Option<Range<usize>> {
    let start = start.max(0);
    let end = end.min(len as isize);
    if end <= start {
        None
    } else {
        Some(start as usize..end as usize)
    }
}

pub(crate) fn is_local_max(x: &[f64], i: usize) -> bool {
    i > 0 && i + 1 < x.len() && x[i] > x[i - 1] && x[i] >= x[i + 1]
}

pub(crate) fn is_local_min(x: &[f64], i: usize) -> bool {
    i > 0 && i + 1 < x.len() && x[i] < x[i - 1] && x[i] <= x[i + 1]
}

/// Highest local maximum in `window`; the earliest wins ties
pub(crate) fn highest_local_max(x: &[f64], window: Range<usize>) -> Option<usize> {
    window
        .filter(|&i| is_local_max(x, i))
        .fold(None, |best: Option<usize>, i| match best {
            Some(b) if x[b] >= x[i] => Some(b),
            _ => Some(i),
        })
}

/// Lowest local minimum in `window`; the earliest wins ties
pub(crate) fn lowest_local_min(x: &[f64], window: Range<usize>) -> Option<usize> {
    window
        .filter(|&i| is_local_min(x, i))
        .fold(None, |best: Option<usize>, i| match best {
            Some(b) if x[b] <= x[i] => Some(b),
            _ => Some(i),
        })
}

/// Local extremum of either polarity deviating most from `reference`
pub(crate) fn dominant_extremum(x: &[f64], window: Range<usize>, reference: f64) -> Option<usize> {
    window
        .filter(|&i| is_local_max(x, i) || is_local_min(x, i))
        .fold(None, |best: Option<usize>, i| match best {
            Some(b) if (x[b] - reference).abs() >= (x[i] - reference).abs() => Some(b),
            _ => Some(i),
        })
}

/// Mean over `window`; `None` when the window is empty
pub(crate) fn window_mean(x: &[f64], window: Range<usize>) -> Option<f64> {
    let slice = x.get(window)?;
    crate::utils::stats::mean(slice)
}
