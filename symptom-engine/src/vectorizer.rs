use crate::config::WeightingConfig;
use crate::vocabulary::SymptomVocabulary;
use serde::Serialize;
use std::sync::Arc;

/// Weighted encoding of one utterance's symptoms
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    /// One slot per vocabulary entry
    pub values: Vec<f64>,
    pub total_weight: f64,
    /// Weight per detected symptom in detection order, vocabulary hits only
    pub weights: Vec<(String, f64)>,
}

impl FeatureVector {
    pub fn weight_of(&self, symptom: &str) -> Option<f64> {
        self.weights.iter().find(|(s, _)| s == symptom).map(|(_, w)| *w)
    }
}

/// Turns detected symptoms into the classifier's input vector.
#[derive(Debug, Clone)]
pub struct FeatureVectorizer {
    vocabulary: Arc<SymptomVocabulary>,
    weighting: WeightingConfig,
}

impl FeatureVectorizer {
    pub fn new(vocabulary: Arc<SymptomVocabulary>, weighting: WeightingConfig) -> Self {
        Self { vocabulary, weighting }
    }

    /// Specificity weight of a known symptom.
    ///
    /// Base weight, plus a bonus for multi-word names, scaled by
    /// `min(cap, ln(numerator / max(count, 1)) + 1)`.
    pub fn symptom_weight(&self, symptom: &str) -> f64 {
        let w = &self.weighting;
        let mut weight = w.base_weight;
        if symptom.replace('_', " ").split_whitespace().count() > 1 {
            weight += w.multi_word_bonus;
        }
        let count = f64::from(self.vocabulary.occurrence_count(symptom).max(1));
        let rarity = ((w.rarity_numerator / count).ln() + 1.0).min(w.rarity_cap);
        weight * rarity
    }

    /// Identifiers outside the vocabulary get no slot and no weight.
    pub fn vectorize(&self, detected: &[String]) -> FeatureVector {
        let mut values = vec![0.0; self.vocabulary.len()];
        let mut weights = Vec::with_capacity(detected.len());
        let mut total_weight = 0.0;

        for symptom in detected {
            let Some(idx) = self.vocabulary.index_of(symptom) else {
                tracing::debug!(symptom = %symptom, "Symptom outside model vocabulary ignored");
                continue;
            };
            if weights.iter().any(|(s, _)| s == symptom) {
                continue;
            }
            let weight = self.symptom_weight(symptom);
            values[idx] = weight;
            total_weight += weight;
            weights.push((symptom.clone(), weight));
        }

        FeatureVector {
            values,
            total_weight,
            weights,
        }
    }

    pub fn vocabulary(&self) -> &SymptomVocabulary {
        &self.vocabulary
    }
}
