//! Reference-range classification of beats and records
//!
//! Every label enum carries an `Indeterminate` variant. A missing interval
//! never fails classification; it only makes the affected label
//! indeterminate. The sole structural failure is an empty record.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::{debug, info, instrument};

use crate::config::constants::classification::SECONDS_PER_MINUTE;
use crate::config::ClassificationConfig;
use crate::error::{EcgError, EcgResult};
use crate::processing::intervals::IntervalSet;
use crate::utils::stats;

/// A categorical status with a fixed, ordered set of values
pub trait Label: Copy + Eq + fmt::Debug + 'static {
    /// Every value, in reporting order
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;
}

macro_rules! label_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl Label for $name {
            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

label_enum!(
    /// Heart-rate bracket against the bradycardia/tachycardia bounds
    HeartRateBracket {
        Bradycardia => "bradycardia",
        Normal => "normal",
        Tachycardia => "tachycardia",
        Indeterminate => "indeterminate",
    }
);

label_enum!(
    /// RR regularity
    RhythmStatus {
        Regular => "regular",
        Irregular => "irregular",
        Indeterminate => "indeterminate",
    }
);

label_enum!(
    /// PQ interval status
    PqStatus {
        Normal => "normal",
        Prolonged => "prolonged",
        Shortened => "shortened",
        Indeterminate => "indeterminate",
    }
);

label_enum!(
    /// ST-segment deviation status
    StStatus {
        Normal => "normal",
        Elevated => "elevated",
        Depressed => "depressed",
        Indeterminate => "indeterminate",
    }
);

label_enum!(
    /// T-wave morphology status
    TWaveStatus {
        Normal => "normal",
        Inverted => "inverted",
        Flattened => "flattened",
        Indeterminate => "indeterminate",
    }
);

/// Share of beats carrying each value of a label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelDistribution<L: Label> {
    counts: Vec<usize>,
    total: usize,
    _label: std::marker::PhantomData<L>,
}

impl<L: Label> LabelDistribution<L> {
    pub fn from_labels(labels: impl IntoIterator<Item = L>) -> Self {
        let mut counts = vec![0; L::ALL.len()];
        let mut total = 0;
        for label in labels {
            if let Some(slot) = L::ALL.iter().position(|l| *l == label) {
                counts[slot] += 1;
                total += 1;
            }
        }
        Self {
            counts,
            total,
            _label: std::marker::PhantomData,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn count(&self, label: L) -> usize {
        L::ALL
            .iter()
            .position(|l| *l == label)
            .map_or(0, |slot| self.counts[slot])
    }

    /// Fraction of beats with `label`; 0 for an empty distribution
    pub fn proportion(&self, label: L) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.count(label) as f64 / self.total as f64
        }
    }

    /// Most frequent label; earlier labels in [`Label::ALL`] win ties
    pub fn dominant(&self) -> Option<L> {
        if self.total == 0 {
            return None;
        }
        let mut best = 0;
        for (slot, &count) in self.counts.iter().enumerate() {
            if count > self.counts[best] {
                best = slot;
            }
        }
        Some(L::ALL[best])
    }

    /// `(label, proportion)` pairs in reporting order
    pub fn proportions(&self) -> impl Iterator<Item = (L, f64)> + '_ {
        L::ALL.iter().map(move |&label| (label, self.proportion(label)))
    }
}

impl<L: Label> Serialize for LabelDistribution<L> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(L::ALL.len()))?;
        for (label, proportion) in self.proportions() {
            map.serialize_entry(label.as_str(), &proportion)?;
        }
        map.end()
    }
}

/// Labels for one beat
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BeatClassification {
    pub r_index: usize,
    pub heart_rate_bpm: Option<f64>,
    pub heart_rate_bracket: HeartRateBracket,
    pub rhythm: RhythmStatus,
    pub pq: PqStatus,
    pub st: StStatus,
    pub t_wave: TWaveStatus,
}

/// Record-level statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub beat_count: usize,
    /// 60 / mean RR
    pub mean_heart_rate_bpm: Option<f64>,
    pub median_heart_rate_bpm: Option<f64>,
    pub heart_rate_bracket: HeartRateBracket,
    pub rhythm: RhythmStatus,
    pub rr_coefficient_of_variation: Option<f64>,
    pub sdnn_s: Option<f64>,
    pub rmssd_s: Option<f64>,
    pub rhythm_distribution: LabelDistribution<RhythmStatus>,
    pub pq_distribution: LabelDistribution<PqStatus>,
    pub st_distribution: LabelDistribution<StStatus>,
    pub t_wave_distribution: LabelDistribution<TWaveStatus>,
}

/// Labelled analysis of one record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricReport {
    pub beats: Vec<BeatClassification>,
    pub summary: ReportSummary,
}

impl MetricReport {
    pub fn beat_count(&self) -> usize {
        self.beats.len()
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Maps intervals to labels against configurable reference ranges
#[derive(Debug, Clone)]
pub struct MetricClassifier {
    config: ClassificationConfig,
}

impl MetricClassifier {
    pub fn new(config: ClassificationConfig) -> EcgResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ClassificationConfig {
        &self.config
    }

    /// Classify every beat and summarise the record
    #[instrument(skip_all, fields(beats = intervals.len()))]
    pub fn classify(&self, intervals: &[IntervalSet]) -> EcgResult<MetricReport> {
        if intervals.is_empty() {
            return Err(EcgError::EmptyRecord);
        }

        let rr: Vec<f64> = intervals.iter().filter_map(|set| set.rr_s).collect();
        let mean_rr = if rr.len() >= 2 { stats::mean(&rr) } else { None };

        let beats: Vec<BeatClassification> = intervals
            .iter()
            .map(|set| {
                let heart_rate_bpm = set.rr_s.map(heart_rate);
                BeatClassification {
                    r_index: set.r_index,
                    heart_rate_bpm,
                    heart_rate_bracket: self.bracket(heart_rate_bpm),
                    rhythm: self.beat_rhythm(set.rr_s, mean_rr),
                    pq: self.pq_status(set.pq_s),
                    st: self.st_status(set.st_deviation_mv),
                    t_wave: self.t_wave_status(set.t_amplitude_mv),
                }
            })
            .collect();

        let summary = self.summarise(&rr, &beats);
        info!(
            beats = summary.beat_count,
            mean_hr = ?summary.mean_heart_rate_bpm,
            rhythm = %summary.rhythm,
            "record classified"
        );
        Ok(MetricReport { beats, summary })
    }

    fn summarise(&self, rr: &[f64], beats: &[BeatClassification]) -> ReportSummary {
        let mean_heart_rate_bpm = stats::mean(rr).map(heart_rate);
        let rates: Vec<f64> = beats.iter().filter_map(|b| b.heart_rate_bpm).collect();
        let rr_coefficient_of_variation = stats::coefficient_of_variation(rr);

        let rhythm = match rr_coefficient_of_variation {
            _ if rr.len() < 2 => RhythmStatus::Indeterminate,
            Some(cv) if cv < self.config.rhythm_cv_threshold => RhythmStatus::Regular,
            Some(_) => RhythmStatus::Irregular,
            None => RhythmStatus::Indeterminate,
        };
        debug!(?rr_coefficient_of_variation, %rhythm, "record rhythm");

        ReportSummary {
            beat_count: beats.len(),
            mean_heart_rate_bpm,
            median_heart_rate_bpm: stats::median(&rates),
            heart_rate_bracket: self.bracket(mean_heart_rate_bpm),
            rhythm,
            rr_coefficient_of_variation,
            sdnn_s: if rr.len() >= 2 { stats::std_dev(rr) } else { None },
            rmssd_s: stats::rmssd(rr),
            rhythm_distribution: LabelDistribution::from_labels(beats.iter().map(|b| b.rhythm)),
            pq_distribution: LabelDistribution::from_labels(beats.iter().map(|b| b.pq)),
            st_distribution: LabelDistribution::from_labels(beats.iter().map(|b| b.st)),
            t_wave_distribution: LabelDistribution::from_labels(beats.iter().map(|b| b.t_wave)),
        }
    }

    pub fn bracket(&self, heart_rate_bpm: Option<f64>) -> HeartRateBracket {
        match heart_rate_bpm {
            None => HeartRateBracket::Indeterminate,
            Some(hr) if hr < self.config.bradycardia_below_bpm => HeartRateBracket::Bradycardia,
            Some(hr) if hr > self.config.tachycardia_above_bpm => HeartRateBracket::Tachycardia,
            Some(_) => HeartRateBracket::Normal,
        }
    }

    fn beat_rhythm(&self, rr_s: Option<f64>, mean_rr: Option<f64>) -> RhythmStatus {
        match (rr_s, mean_rr) {
            (Some(rr), Some(mean)) if mean > 0.0 => {
                if (rr - mean).abs() / mean < self.config.rhythm_cv_threshold {
                    RhythmStatus::Regular
                } else {
                    RhythmStatus::Irregular
                }
            }
            _ => RhythmStatus::Indeterminate,
        }
    }

    pub fn pq_status(&self, pq_s: Option<f64>) -> PqStatus {
        match pq_s {
            None => PqStatus::Indeterminate,
            Some(pq) if pq < self.config.pq_min_s => PqStatus::Shortened,
            Some(pq) if pq > self.config.pq_max_s => PqStatus::Prolonged,
            Some(_) => PqStatus::Normal,
        }
    }

    pub fn st_status(&self, deviation_mv: Option<f64>) -> StStatus {
        let threshold = self.config.st_deviation_threshold_mv;
        match deviation_mv {
            None => StStatus::Indeterminate,
            Some(d) if d > threshold => StStatus::Elevated,
            Some(d) if d < -threshold => StStatus::Depressed,
            Some(_) => StStatus::Normal,
        }
    }

    pub fn t_wave_status(&self, amplitude_mv: Option<f64>) -> TWaveStatus {
        match amplitude_mv {
            None => TWaveStatus::Indeterminate,
            Some(a) if a < -self.config.t_inversion_threshold_mv => TWaveStatus::Inverted,
            Some(a) if a.abs() < self.config.t_flat_threshold_mv => TWaveStatus::Flattened,
            Some(_) => TWaveStatus::Normal,
        }
    }
}

#[inline]
fn heart_rate(rr_s: f64) -> f64 {
    SECONDS_PER_MINUTE / rr_s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> MetricClassifier {
        MetricClassifier::new(ClassificationConfig::default()).unwrap()
    }

    fn set(rr_s: Option<f64>) -> IntervalSet {
        IntervalSet {
            rr_s,
            pq_s: Some(0.16),
            st_deviation_mv: Some(0.0),
            t_amplitude_mv: Some(0.3),
            ..Default::default()
        }
    }

    #[test]
    fn test_constant_rr_gives_exact_heart_rate() {
        let intervals: Vec<IntervalSet> = std::iter::once(set(None))
            .chain((0..9).map(|_| set(Some(0.8))))
            .collect();
        let report = classifier().classify(&intervals).unwrap();

        assert_eq!(report.summary.mean_heart_rate_bpm, Some(75.0));
        assert_eq!(report.summary.median_heart_rate_bpm, Some(75.0));
        assert_eq!(report.summary.rhythm, RhythmStatus::Regular);
        assert_eq!(report.summary.heart_rate_bracket, HeartRateBracket::Normal);
        assert_eq!(report.summary.sdnn_s, Some(0.0));
        assert_eq!(report.beats[0].heart_rate_bpm, None);
        assert_eq!(report.beats[0].rhythm, RhythmStatus::Indeterminate);
        assert_eq!(report.beats[1].rhythm, RhythmStatus::Regular);
    }

    #[test]
    fn test_single_beat_is_indeterminate() {
        let report = classifier().classify(&[set(None)]).unwrap();
        assert_eq!(report.summary.rhythm, RhythmStatus::Indeterminate);
        assert_eq!(report.summary.mean_heart_rate_bpm, None);
        assert_eq!(report.summary.heart_rate_bracket, HeartRateBracket::Indeterminate);
        assert_eq!(report.beats[0].pq, PqStatus::Normal);
    }

    #[test]
    fn test_irregular_rhythm() {
        let intervals: Vec<IntervalSet> = [None, Some(0.6), Some(1.1), Some(0.7), Some(1.2)]
            .into_iter()
            .map(set)
            .collect();
        let report = classifier().classify(&intervals).unwrap();
        assert_eq!(report.summary.rhythm, RhythmStatus::Irregular);
        assert!(report.summary.rmssd_s.unwrap() > 0.3);
    }

    #[test]
    fn test_heart_rate_brackets() {
        let c = classifier();
        assert_eq!(c.bracket(Some(45.0)), HeartRateBracket::Bradycardia);
        assert_eq!(c.bracket(Some(60.0)), HeartRateBracket::Normal);
        assert_eq!(c.bracket(Some(100.0)), HeartRateBracket::Normal);
        assert_eq!(c.bracket(Some(130.0)), HeartRateBracket::Tachycardia);
        assert_eq!(c.bracket(None), HeartRateBracket::Indeterminate);
    }

    #[test]
    fn test_interval_and_morphology_statuses() {
        let c = classifier();
        assert_eq!(c.pq_status(Some(0.10)), PqStatus::Shortened);
        assert_eq!(c.pq_status(Some(0.24)), PqStatus::Prolonged);
        assert_eq!(c.pq_status(None), PqStatus::Indeterminate);

        assert_eq!(c.st_status(Some(0.25)), StStatus::Elevated);
        assert_eq!(c.st_status(Some(-0.25)), StStatus::Depressed);
        assert_eq!(c.st_status(Some(0.05)), StStatus::Normal);
        assert_eq!(c.st_status(None), StStatus::Indeterminate);

        assert_eq!(c.t_wave_status(Some(-0.3)), TWaveStatus::Inverted);
        assert_eq!(c.t_wave_status(Some(0.02)), TWaveStatus::Flattened);
        assert_eq!(c.t_wave_status(Some(0.35)), TWaveStatus::Normal);
        // absent is never mistaken for a zero-amplitude T-wave
        assert_eq!(c.t_wave_status(None), TWaveStatus::Indeterminate);
    }

    #[test]
    fn test_custom_reference_ranges() {
        let c = MetricClassifier::new(ClassificationConfig {
            bradycardia_below_bpm: 50.0,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(c.bracket(Some(55.0)), HeartRateBracket::Normal);
        assert_eq!(classifier().bracket(Some(55.0)), HeartRateBracket::Bradycardia);
    }

    #[test]
    fn test_label_distribution() {
        let dist = LabelDistribution::from_labels([
            StStatus::Normal,
            StStatus::Elevated,
            StStatus::Elevated,
            StStatus::Indeterminate,
        ]);
        assert_eq!(dist.total(), 4);
        assert_eq!(dist.count(StStatus::Elevated), 2);
        assert_eq!(dist.proportion(StStatus::Normal), 0.25);
        assert_eq!(dist.proportion(StStatus::Depressed), 0.0);
        assert_eq!(dist.dominant(), Some(StStatus::Elevated));

        let empty = LabelDistribution::<StStatus>::from_labels([]);
        assert_eq!(empty.dominant(), None);
        assert_eq!(empty.proportion(StStatus::Normal), 0.0);
    }

    #[test]
    fn test_report_serializes_labels() {
        let report = classifier().classify(&[set(None), set(Some(0.8))]).unwrap();
        let json = report.to_json().unwrap();
        assert!(json.contains("\"rhythm\": \"indeterminate\""));
        assert!(json.contains("\"t_wave_distribution\""));
    }

    #[test]
    fn test_empty_record() {
        assert!(matches!(classifier().classify(&[]), Err(EcgError::EmptyRecord)));
    }
}
