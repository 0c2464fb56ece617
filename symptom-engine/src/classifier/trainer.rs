use super::artifact::{ModelArtifact, ModelMetadata};
use super::encoder::LabelEncoder;
use super::forest::{argmax, ForestParams, RandomForest};
use crate::config::TrainingConfig;
use crate::dataset::SymptomDataset;
use crate::vocabulary::{DiseaseProfiles, SymptomVocabulary};
use error_common::{DiagnosisError, Result};
use rand::prelude::SliceRandom;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Outcome of one training run. Logged and stored with the model, never gating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub records_total: usize,
    pub samples_used: usize,
    pub train_samples: usize,
    pub test_samples: usize,
    pub classes: usize,
    pub stratified: bool,
    /// `None` when no samples were held out
    pub accuracy: Option<f64>,
    /// Mean top-1 probability on the held-out samples
    pub mean_confidence: Option<f64>,
    pub duration_ms: u64,
}

/// Offline training of the disease classifier.
#[derive(Debug, Clone)]
pub struct Trainer {
    config: TrainingConfig,
}

struct Split {
    train: Vec<usize>,
    test: Vec<usize>,
    stratified: bool,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    /// Encode a dataset record: each filled slot carries its position weight.
    /// A symptom repeated within a record keeps the weight of its last slot.
    fn encode(&self, slots: impl Iterator<Item = (usize, usize)>, n_features: usize) -> Vec<f64> {
        let mut row = vec![0.0; n_features];
        for (slot, feature) in slots {
            row[feature] = self.config.position_weight(slot);
        }
        row
    }

    pub fn train(
        &self,
        dataset: &SymptomDataset,
        vocabulary: &SymptomVocabulary,
        mapping_size: usize,
    ) -> Result<(ModelArtifact, TrainingReport)> {
        let started = Instant::now();
        tracing::info!(records = dataset.len(), "🤖 Training disease prediction model");

        let mut rows = Vec::new();
        let mut diseases = Vec::new();
        for record in dataset.records() {
            let slots: Vec<(usize, usize)> = record
                .filled_slots()
                .filter_map(|(slot, symptom)| vocabulary.index_of(symptom).map(|f| (slot, f)))
                .collect();
            if slots.len() < self.config.min_filled_slots {
                continue;
            }
            rows.push(self.encode(slots.into_iter(), vocabulary.len()));
            diseases.push(record.disease.as_str());
        }

        if rows.is_empty() {
            return Err(DiagnosisError::Training(format!(
                "no record has at least {} symptoms",
                self.config.min_filled_slots
            )));
        }

        let labels = LabelEncoder::fit(diseases.iter().copied());
        let encoded: Vec<usize> = diseases
            .iter()
            .map(|d| {
                labels
                    .transform(d)
                    .ok_or_else(|| DiagnosisError::Training(format!("unencoded label {d}")))
            })
            .collect::<Result<_>>()?;

        tracing::info!(
            samples = rows.len(),
            filtered_from = dataset.len(),
            diseases = labels.len(),
            "📊 Training data prepared"
        );

        let split = self.split(&encoded, labels.len());
        let train_rows: Vec<Vec<f64>> = split.train.iter().map(|&i| rows[i].clone()).collect();
        let train_labels: Vec<usize> = split.train.iter().map(|&i| encoded[i]).collect();

        let forest = RandomForest::fit(&train_rows, &train_labels, labels.len(), ForestParams::from(&self.config))?;

        let (accuracy, mean_confidence) = if split.test.is_empty() {
            (None, None)
        } else {
            let mut correct = 0usize;
            let mut confidence = 0.0;
            for &i in &split.test {
                let proba = forest.predict_proba(&rows[i]);
                let predicted = argmax(&proba);
                if predicted == encoded[i] {
                    correct += 1;
                }
                confidence += proba.get(predicted).copied().unwrap_or(0.0);
            }
            let n = split.test.len() as f64;
            (Some(correct as f64 / n), Some(confidence / n))
        };

        let report = TrainingReport {
            records_total: dataset.len(),
            samples_used: rows.len(),
            train_samples: split.train.len(),
            test_samples: split.test.len(),
            classes: labels.len(),
            stratified: split.stratified,
            accuracy,
            mean_confidence,
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        };

        if let (Some(accuracy), Some(confidence)) = (accuracy, mean_confidence) {
            tracing::info!(accuracy = format!("{accuracy:.3}"), "🎯 Model accuracy");
            tracing::info!(mean_confidence = format!("{confidence:.3}"), "📈 Average confidence");
        }
        tracing::info!(
            trees = forest.n_trees(),
            duration_ms = report.duration_ms,
            "✅ Model trained successfully"
        );

        let metadata = ModelMetadata::new(vocabulary, labels.len(), mapping_size, report.clone());
        let artifact = ModelArtifact {
            metadata,
            vocabulary: vocabulary.clone(),
            labels,
            forest,
            profiles: DiseaseProfiles::from_dataset(dataset),
        };
        Ok((artifact, report))
    }

    /// Stratified when every class has two samples, plain random otherwise.
    fn split(&self, labels: &[usize], n_classes: usize) -> Split {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let fraction = self.config.test_fraction;
        let n = labels.len();

        if fraction <= 0.0 || n < 2 {
            return Split {
                train: (0..n).collect(),
                test: Vec::new(),
                stratified: false,
            };
        }

        let mut by_class: Vec<Vec<usize>> = vec![Vec::new(); n_classes];
        for (i, &label) in labels.iter().enumerate() {
            by_class[label].push(i);
        }
        let min_count = by_class.iter().map(Vec::len).filter(|&c| c > 0).min().unwrap_or(0);

        if min_count >= 2 {
            let mut train = Vec::with_capacity(n);
            let mut test = Vec::new();
            for mut members in by_class.into_iter().filter(|m| !m.is_empty()) {
                members.shuffle(&mut rng);
                let count = members.len();
                let n_test = ((count as f64 * fraction).round() as usize).clamp(1, count - 1);
                test.extend_from_slice(&members[..n_test]);
                train.extend_from_slice(&members[n_test..]);
            }
            train.sort_unstable();
            test.sort_unstable();
            return Split {
                train,
                test,
                stratified: true,
            };
        }

        tracing::warn!(
            min_samples = min_count,
            "⚠️ Some classes have a single sample; using random split instead of stratified"
        );
        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(&mut rng);
        let n_test = ((n as f64 * fraction).ceil() as usize).min(n - 1);
        let test = order[..n_test].to_vec();
        let train = order[n_test..].to_vec();
        Split {
            train,
            test,
            stratified: false,
        }
    }
}
