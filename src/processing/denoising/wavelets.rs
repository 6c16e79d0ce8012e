//! Mother-wavelet filter banks for the stationary wavelet transform

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EcgError, PipelineStage};

/// Supported mother wavelets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum WaveletFamily {
    Haar,
    Db2,
    Db3,
    Db4,
    Sym4,
    Coif1,
    /// CDF 5/3 spline wavelet
    Bior22,
}

impl WaveletFamily {
    pub const ALL: [WaveletFamily; 7] = [
        WaveletFamily::Haar,
        WaveletFamily::Db2,
        WaveletFamily::Db3,
        WaveletFamily::Db4,
        WaveletFamily::Sym4,
        WaveletFamily::Coif1,
        WaveletFamily::Bior22,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            WaveletFamily::Haar => "haar",
            WaveletFamily::Db2 => "db2",
            WaveletFamily::Db3 => "db3",
            WaveletFamily::Db4 => "db4",
            WaveletFamily::Sym4 => "sym4",
            WaveletFamily::Coif1 => "coif1",
            WaveletFamily::Bior22 => "bior2.2",
        }
    }

    /// Resolve a family prefix plus order, e.g. `("db", 4)`
    pub fn from_family_and_order(family: &str, order: u32) -> Result<Self, EcgError> {
        let name = if family.eq_ignore_ascii_case("haar") {
            "haar".to_string()
        } else {
            format!("{}{}", family.to_ascii_lowercase(), order)
        };
        name.parse()
    }

    pub fn is_orthogonal(&self) -> bool {
        !matches!(self, WaveletFamily::Bior22)
    }

    /// Build the analysis and synthesis filters
    pub fn filter_bank(&self) -> FilterBank {
        match self {
            WaveletFamily::Haar => {
                let h = std::f64::consts::FRAC_1_SQRT_2;
                FilterBank::orthogonal(vec![h, h])
            }
            WaveletFamily::Db2 => {
                let sqrt3 = 3.0f64.sqrt();
                let denom = 4.0 * 2.0f64.sqrt();
                FilterBank::orthogonal(vec![
                    (1.0 + sqrt3) / denom,
                    (3.0 + sqrt3) / denom,
                    (3.0 - sqrt3) / denom,
                    (1.0 - sqrt3) / denom,
                ])
            }
            WaveletFamily::Db3 => FilterBank::orthogonal(vec![
                0.035226291882100656,
                -0.08544127388224149,
                -0.13501102001039084,
                0.4598775021193313,
                0.8068915093133388,
                0.3326705529509569,
            ]),
            WaveletFamily::Db4 => FilterBank::orthogonal(vec![
                -0.010597401785069032,
                0.0328830116668852,
                0.030841381835560764,
                -0.18703481171909309,
                -0.027983769416859854,
                0.6308807679298589,
                0.7148465705529157,
                0.2303778133088965,
            ]),
            WaveletFamily::Sym4 => FilterBank::orthogonal(vec![
                -0.07576571478927333,
                -0.02963552764599851,
                0.49761866763201545,
                0.8037387518059161,
                0.29785779560527736,
                -0.09921954357684722,
                -0.012603967262037833,
                0.0322231006040427,
            ]),
            WaveletFamily::Coif1 => FilterBank::orthogonal(vec![
                -0.01565572813546454,
                -0.0727326195128539,
                0.38486484686420286,
                0.8525720202122554,
                0.3378976624578092,
                -0.0727326195128539,
            ]),
            WaveletFamily::Bior22 => {
                // Symmetric taps centred on their middle element, so every
                // response is zero-phase and the undecimated bank satisfies
                // H(w)H~(w) + H(w+pi)H~(w+pi) = 2.
                let s = std::f64::consts::SQRT_2;
                FilterBank {
                    dec_lo: Filter::centred(vec![-s / 8.0, s / 4.0, 3.0 * s / 4.0, s / 4.0, -s / 8.0]),
                    dec_hi: Filter::centred(vec![-s / 4.0, s / 2.0, -s / 4.0]),
                    rec_lo: Filter::centred(vec![s / 4.0, s / 2.0, s / 4.0]),
                    rec_hi: Filter::centred(vec![-s / 8.0, -s / 4.0, 3.0 * s / 4.0, -s / 4.0, -s / 8.0]),
                }
            }
        }
    }
}

impl fmt::Display for WaveletFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WaveletFamily {
    type Err = EcgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        WaveletFamily::ALL
            .iter()
            .copied()
            .find(|family| family.name() == normalized || (normalized == "db1" && *family == WaveletFamily::Haar))
            .ok_or_else(|| {
                let supported: Vec<&str> = WaveletFamily::ALL.iter().map(|w| w.name()).collect();
                EcgError::configuration(
                    PipelineStage::Denoising,
                    "wavelet",
                    format!("unsupported wavelet '{}', expected one of [{}]", s, supported.join(", ")),
                )
            })
    }
}

impl TryFrom<String> for WaveletFamily {
    type Error = EcgError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WaveletFamily> for String {
    fn from(family: WaveletFamily) -> Self {
        family.name().to_string()
    }
}

/// One filter with the index of its origin tap
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub taps: Vec<f64>,
    pub origin: usize,
}

impl Filter {
    fn causal(taps: Vec<f64>) -> Self {
        Self { taps, origin: 0 }
    }

    fn centred(taps: Vec<f64>) -> Self {
        let origin = taps.len() / 2;
        Self { taps, origin }
    }

    /// Tap offsets relative to the origin, paired with tap values
    pub fn offsets(&self) -> impl Iterator<Item = (isize, f64)> + '_ {
        let origin = self.origin as isize;
        self.taps
            .iter()
            .enumerate()
            .map(move |(j, &tap)| (j as isize - origin, tap))
    }

    pub fn sum(&self) -> f64 {
        self.taps.iter().sum()
    }
}

/// Analysis (decomposition) and synthesis (reconstruction) filter pairs
#[derive(Debug, Clone, PartialEq)]
pub struct FilterBank {
    pub dec_lo: Filter,
    pub dec_hi: Filter,
    pub rec_lo: Filter,
    pub rec_hi: Filter,
}

impl FilterBank {
    /// Orthonormal bank from its scaling filter; the wavelet filter is the
    /// quadrature mirror `g[k] = (-1)^k h[L-1-k]`.
    fn orthogonal(low_pass: Vec<f64>) -> Self {
        let len = low_pass.len();
        let high_pass: Vec<f64> = (0..len)
            .map(|k| {
                let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
                sign * low_pass[len - 1 - k]
            })
            .collect();

        Self {
            dec_lo: Filter::causal(low_pass.clone()),
            dec_hi: Filter::causal(high_pass.clone()),
            rec_lo: Filter::causal(low_pass),
            rec_hi: Filter::causal(high_pass),
        }
    }
}
