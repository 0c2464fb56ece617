//! Confidence calibration of raw forest probabilities.
//!
//! Forest probabilities on sparse, imbalanced symptom data are low even for
//! correct answers. The calibrator boosts the top class by how much evidence
//! the utterance carried, drops candidates under a floor that depends on the
//! number of detected symptoms, then boosts each survivor by how well the
//! detected symptoms overlap the disease's recorded profile. Confidences are
//! never lowered below the classifier's own probability and never exceed the
//! configured ceiling.

use crate::classifier::{argmax, LabelEncoder};
use crate::config::CalibrationConfig;
use crate::vocabulary::{DiseaseProfile, DiseaseProfiles};
use serde::Serialize;
use std::cmp::Ordering;

/// Overlap between detected symptoms and a disease profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MatchScore {
    Scored(f64),
    /// No recorded symptoms for the disease; contributes nothing
    NoProfile,
}

impl MatchScore {
    pub fn value(self) -> f64 {
        match self {
            Self::Scored(score) => score,
            Self::NoProfile => 0.0,
        }
    }
}

/// One candidate that passed the floor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedDisease {
    pub disease: String,
    pub base_confidence: f64,
    pub match_score: MatchScore,
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Ranking {
    /// Sorted by descending confidence
    pub candidates: Vec<RankedDisease>,
    /// Top-k classes dropped by the confidence floor
    pub below_floor: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ConfidenceCalibrator {
    config: CalibrationConfig,
}

impl ConfidenceCalibrator {
    pub fn new(config: CalibrationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Add the evidence bonus to the most probable class and renormalise.
    pub fn adjust(&self, probabilities: &[f64], symptom_count: usize, total_weight: f64) -> Vec<f64> {
        let cfg = &self.config;
        let multi_symptom_bonus = (cfg.multi_symptom_step * symptom_count as f64).min(cfg.multi_symptom_cap);
        let weight_bonus = (cfg.weight_step * total_weight).min(cfg.weight_cap);

        let mut adjusted = probabilities.to_vec();
        if let Some(top) = adjusted.get_mut(argmax(probabilities)) {
            *top += multi_symptom_bonus + weight_bonus;
        }
        let sum: f64 = adjusted.iter().sum();
        if sum > 0.0 {
            adjusted.iter_mut().for_each(|p| *p /= sum);
        }
        adjusted
    }

    /// `precision * w_p + coverage * w_c + frequency * w_f`, capped
    pub fn match_score(&self, profile: Option<&DiseaseProfile>, detected: &[String]) -> MatchScore {
        let cfg = &self.config;
        let Some(profile) = profile.filter(|p| !p.symptoms.is_empty() && p.record_count > 0) else {
            return MatchScore::NoProfile;
        };
        if detected.is_empty() {
            return MatchScore::Scored(0.0);
        }

        let matches = detected.iter().filter(|s| profile.symptoms.contains(*s)).count() as f64;
        let precision = matches / detected.len() as f64;
        let coverage = matches / profile.symptoms.len().min(cfg.coverage_cap) as f64;
        let frequency = (profile.record_count as f64 / cfg.frequency_divisor).min(cfg.frequency_cap);

        let score = precision * cfg.precision_weight + coverage * cfg.coverage_weight + frequency * cfg.frequency_weight;
        MatchScore::Scored(score.min(cfg.match_cap))
    }

    /// Boost by match score, bounded below by the base and above by the ceiling
    pub fn calibrate(&self, base: f64, match_score: f64) -> f64 {
        let ceiling = self.config.confidence_ceiling;
        let base = base.min(ceiling);
        (base * (1.0 + match_score * self.config.match_boost)).clamp(base, ceiling)
    }

    pub fn rank(
        &self,
        probabilities: &[f64],
        detected: &[String],
        total_weight: f64,
        top_k: usize,
        labels: &LabelEncoder,
        profiles: &DiseaseProfiles,
    ) -> Ranking {
        let adjusted = self.adjust(probabilities, detected.len(), total_weight);
        let floor = self.config.floor_for(detected.len());

        let mut order: Vec<usize> = (0..adjusted.len()).collect();
        order.sort_by(|&a, &b| adjusted[b].partial_cmp(&adjusted[a]).unwrap_or(Ordering::Equal));

        let mut ranking = Ranking::default();
        for idx in order.into_iter().take(top_k) {
            let probability = adjusted[idx];
            if probability <= floor {
                ranking.below_floor += 1;
                continue;
            }
            let Some(disease) = labels.inverse_transform(idx) else {
                tracing::warn!(class = idx, "⚠️ Class index without label skipped");
                continue;
            };

            let match_score = self.match_score(profiles.get(disease), detected);
            if match_score == MatchScore::NoProfile {
                tracing::warn!(disease = %disease, "⚠️ No symptom profile for disease, match score is zero");
            }

            ranking.candidates.push(RankedDisease {
                disease: disease.to_string(),
                base_confidence: probability.min(self.config.confidence_ceiling),
                match_score,
                confidence: self.calibrate(probability, match_score.value()),
            });
        }

        ranking
            .candidates
            .sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(Ordering::Equal));
        ranking
    }
}
