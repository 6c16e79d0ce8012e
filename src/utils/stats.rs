//! Descriptive statistics over sample and interval slices
//!
//! Functions return `None` instead of failing when the input is too short
//! for the statistic to be defined.

/// Arithmetic mean.
///
/// Accumulates deviations from the first element, so a constant slice
/// returns that constant bit-for-bit.
pub fn mean(data: &[f64]) -> Option<f64> {
    let (&first, rest) = data.split_first()?;
    let offset: f64 = rest.iter().map(|x| x - first).sum();
    Some(first + offset / data.len() as f64)
}

/// Median; averages the two central values for even lengths
pub fn median(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Population standard deviation (divides by N)
pub fn std_dev(data: &[f64]) -> Option<f64> {
    let m = mean(data)?;
    let variance = data.iter().map(|x| (x - m).powi(2)).sum::<f64>() / data.len() as f64;
    Some(variance.sqrt())
}

/// Standard deviation over mean; `None` for fewer than two values or a zero mean
pub fn coefficient_of_variation(data: &[f64]) -> Option<f64> {
    if data.len() < 2 {
        return None;
    }
    let m = mean(data)?;
    if m == 0.0 {
        return None;
    }
    Some(std_dev(data)? / m.abs())
}

/// Median of absolute values
pub fn median_absolute(data: &[f64]) -> Option<f64> {
    let abs: Vec<f64> = data.iter().map(|x| x.abs()).collect();
    median(&abs)
}

/// Root mean square of successive differences
pub fn rmssd(data: &[f64]) -> Option<f64> {
    if data.len() < 2 {
        return None;
    }
    let sum_sq: f64 = data.windows(2).map(|w| (w[1] - w[0]).powi(2)).sum();
    Some((sum_sq / (data.len() - 1) as f64).sqrt())
}

/// Sum of squares
pub fn energy(data: &[f64]) -> f64 {
    data.iter().map(|x| x * x).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_constant_is_exact() {
        let data = vec![0.8; 17];
        assert_eq!(mean(&data), Some(0.8));
    }

    #[test]
    fn test_mean_and_median() {
        let data = [1.0, 3.0, 2.0, 10.0];
        assert_eq!(mean(&data), Some(4.0));
        assert_eq!(median(&data), Some(2.5));
        assert_eq!(median(&[5.0, 1.0, 3.0]), Some(3.0));
        assert_eq!(mean(&[]), None);
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_std_dev() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((std_dev(&data).unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_coefficient_of_variation() {
        assert_eq!(coefficient_of_variation(&[0.8]), None);
        assert_eq!(coefficient_of_variation(&[0.8, 0.8, 0.8]), Some(0.0));
        let cv = coefficient_of_variation(&[0.5, 1.5]).unwrap();
        assert!((cv - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_median_absolute() {
        assert_eq!(median_absolute(&[-3.0, 1.0, -2.0]), Some(2.0));
    }

    #[test]
    fn test_rmssd() {
        assert_eq!(rmssd(&[1.0]), None);
        let value = rmssd(&[1.0, 2.0, 4.0]).unwrap();
        assert!((value - (2.5f64).sqrt()).abs() < 1e-12);
    }
}
