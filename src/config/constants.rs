// src/config/constants.rs
//! System-wide configuration constants

/// Signal constants
pub mod signal {
    pub const DEFAULT_SAMPLING_RATE_HZ: f64 = 250.0;
    pub const MIN_SAMPLING_RATE_HZ: f64 = 50.0;
    pub const MAX_SAMPLING_RATE_HZ: f64 = 20_000.0;
}

/// Stationary wavelet denoising constants
pub mod denoise {
    pub const DEFAULT_LEVELS: usize = 4;
    pub const MIN_LEVELS: usize = 1;
    pub const MAX_LEVELS: usize = 12;
    pub const DEFAULT_THRESHOLD_SCALE: f64 = 1.0;

    /// Converts a median absolute deviation into a Gaussian sigma
    pub const MAD_TO_SIGMA: f64 = 0.6745;
}

/// Fiducial detection constants
pub mod detection {
    /// 300 bpm upper physiological bound
    pub const DEFAULT_REFRACTORY_PERIOD_S: f64 = 0.2;
    pub const DEFAULT_THRESHOLD_FRACTION: f64 = 0.5;
    pub const DEFAULT_ROLLING_WINDOW_S: f64 = 2.0;
    pub const DEFAULT_Q_WINDOW_S: f64 = 0.05;
    pub const DEFAULT_S_WINDOW_S: f64 = 0.05;
    pub const DEFAULT_P_WINDOW_S: f64 = 0.2;
    pub const DEFAULT_MIN_ST_GAP_S: f64 = 0.04;
    pub const DEFAULT_T_WINDOW_RR_FRACTION: f64 = 0.5;
    pub const DEFAULT_EXPECTED_RR_S: f64 = 1.0;
    /// Candidates this soon after an R-peak are checked for T-wave morphology
    pub const DEFAULT_T_WAVE_REJECTION_WINDOW_S: f64 = 0.36;
    /// Slope ratio below which such a candidate is taken as a T-wave
    pub const DEFAULT_T_WAVE_SLOPE_RATIO: f64 = 0.5;
    /// Half-span of the central difference used for QRS slopes
    pub const SLOPE_SPAN_S: f64 = 0.01;
}

/// Interval measurement constants
pub mod intervals {
    pub const DEFAULT_ST_POINT_OFFSET_S: f64 = 0.08;
    pub const DEFAULT_ST_AVERAGING_WINDOW_S: f64 = 0.02;
    pub const DEFAULT_P_ONSET_OFFSET_S: f64 = 0.06;
    pub const DEFAULT_BASELINE_WINDOW_S: f64 = 0.04;
    pub const DEFAULT_FALLBACK_BASELINE_START_S: f64 = 0.10;
    pub const DEFAULT_FALLBACK_BASELINE_END_S: f64 = 0.05;
}

/// Reference ranges for classification
pub mod classification {
    pub const DEFAULT_BRADYCARDIA_BELOW_BPM: f64 = 60.0;
    pub const DEFAULT_TACHYCARDIA_ABOVE_BPM: f64 = 100.0;
    pub const DEFAULT_RHYTHM_CV_THRESHOLD: f64 = 0.10;
    pub const DEFAULT_PQ_MIN_S: f64 = 0.12;
    pub const DEFAULT_PQ_MAX_S: f64 = 0.20;
    pub const DEFAULT_ST_DEVIATION_THRESHOLD_MV: f64 = 0.1;
    pub const DEFAULT_T_INVERSION_THRESHOLD_MV: f64 = 0.1;
    pub const DEFAULT_T_FLAT_THRESHOLD_MV: f64 = 0.1;

    pub const SECONDS_PER_MINUTE: f64 = 60.0;
}

/// Signal quality estimation constants
pub mod quality {
    pub const DEFAULT_WELCH_SEGMENT_LEN: usize = 256;
    /// Samples dropped at each edge of the residual before PSD estimation
    pub const PSD_EDGE_TRIM_SAMPLES: usize = 5;
}

/// Configuration file paths
pub mod paths {
    pub const SYSTEM_CONFIG_PATH: &str = "/etc/ecg-core/config.toml";
    pub const USER_CONFIG_DIR: &str = ".config/ecg-core";
    pub const DEFAULT_CONFIG_FILE: &str = "ecg-config.toml";
    pub const LOCAL_CONFIG_FILE: &str = "ecg-config.local.toml";
    pub const ENV_PREFIX: &str = "ECG_";
    pub const ENV_NESTING_SEPARATOR: &str = "__";
}
