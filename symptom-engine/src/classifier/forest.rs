use super::tree::{DecisionTree, TrainingView, TreeParams};
use crate::config::TrainingConfig;
use error_common::{DiagnosisError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub class_balanced: bool,
    pub seed: u64,
}

impl From<&TrainingConfig> for ForestParams {
    fn from(config: &TrainingConfig) -> Self {
        Self {
            n_estimators: config.n_estimators,
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            min_samples_leaf: config.min_samples_leaf,
            class_balanced: config.class_balanced,
            seed: config.seed,
        }
    }
}

/// Bagged ensemble of CART trees.
///
/// Each tree sees a bootstrap sample of the training rows and `sqrt(n_features)`
/// candidate features per node. Probabilities are the mean of the per-tree leaf
/// distributions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_features: usize,
    n_classes: usize,
    params: ForestParams,
}

impl RandomForest {
    pub fn fit(rows: &[Vec<f64>], labels: &[usize], n_classes: usize, params: ForestParams) -> Result<Self> {
        if rows.is_empty() {
            return Err(DiagnosisError::Training("no training samples".to_string()));
        }
        if rows.len() != labels.len() {
            return Err(DiagnosisError::Training(format!(
                "{} rows but {} labels",
                rows.len(),
                labels.len()
            )));
        }
        if params.n_estimators == 0 {
            return Err(DiagnosisError::Training("n_estimators must be positive".to_string()));
        }
        let n_features = rows[0].len();
        if let Some(bad) = rows.iter().position(|r| r.len() != n_features) {
            return Err(DiagnosisError::Training(format!(
                "row {bad} has {} features, expected {n_features}",
                rows[bad].len()
            )));
        }
        if let Some(&bad) = labels.iter().find(|&&l| l >= n_classes) {
            return Err(DiagnosisError::Training(format!(
                "label {bad} out of range for {n_classes} classes"
            )));
        }

        let class_weights = if params.class_balanced {
            balanced_class_weights(labels, n_classes)
        } else {
            vec![1.0; n_classes]
        };

        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split,
            min_samples_leaf: params.min_samples_leaf,
            max_features: max_features(n_features),
        };
        let data = TrainingView {
            rows,
            labels,
            n_features,
            n_classes,
        };

        let trees: Vec<DecisionTree> = (0..params.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                // seeded per tree so the result does not depend on scheduling
                let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(tree_idx as u64));
                let weights = bootstrap_weights(labels, &class_weights, &mut rng);
                DecisionTree::fit(&data, &weights, tree_params, &mut rng)
            })
            .collect();

        tracing::debug!(
            trees = trees.len(),
            features = n_features,
            classes = n_classes,
            max_features = tree_params.max_features,
            "Forest fitted"
        );

        Ok(Self {
            trees,
            n_features,
            n_classes,
            params,
        })
    }

    /// Mean class distribution over all trees
    pub fn predict_proba(&self, row: &[f64]) -> Vec<f64> {
        let mut proba = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (acc, p) in proba.iter_mut().zip(tree.predict_proba(row)) {
                *acc += p;
            }
        }
        let n = self.trees.len().max(1) as f64;
        proba.iter_mut().for_each(|p| *p /= n);
        proba
    }

    /// Most probable class, lowest index on ties
    pub fn predict(&self, row: &[f64]) -> usize {
        argmax(&self.predict_proba(row))
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }
}

/// Index of the largest value, first one on ties
pub fn argmax(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(best_i, best_v), (i, &v)| {
            if v > best_v {
                (i, v)
            } else {
                (best_i, best_v)
            }
        })
        .0
}

/// `n_samples / (n_classes * count(class))`, over classes present in `labels`
fn balanced_class_weights(labels: &[usize], n_classes: usize) -> Vec<f64> {
    let mut counts = vec![0usize; n_classes];
    for &label in labels {
        counts[label] += 1;
    }
    let present = counts.iter().filter(|&&c| c > 0).count().max(1) as f64;
    let n = labels.len() as f64;
    counts
        .iter()
        .map(|&c| if c == 0 { 0.0 } else { n / (present * c as f64) })
        .collect()
}

fn max_features(n_features: usize) -> usize {
    ((n_features as f64).sqrt() as usize).max(1)
}

/// Class weight times how often each row was drawn with replacement
fn bootstrap_weights(labels: &[usize], class_weights: &[f64], rng: &mut StdRng) -> Vec<f64> {
    let n = labels.len();
    let mut draws = vec![0u32; n];
    for _ in 0..n {
        draws[rng.gen_range(0..n)] += 1;
    }
    draws
        .iter()
        .zip(labels)
        .map(|(&d, &label)| f64::from(d) * class_weights[label])
        .collect()
}
