use rand::prelude::SliceRandom;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

const IMPURITY_EPSILON: f64 = 1e-12;

/// Growth limits of a single tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    pub max_depth: usize,
    /// Distinct samples a node needs before it may split
    pub min_samples_split: usize,
    /// Distinct samples each child must keep
    pub min_samples_leaf: usize,
    /// Non-constant features examined per node
    pub max_features: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Leaf {
        /// Sparse class distribution, probabilities sum to 1
        distribution: Vec<(usize, f64)>,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// CART classification tree stored as a flat node arena, root at index 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
    n_classes: usize,
}

/// Borrowed training data shared by every tree of a forest
pub(crate) struct TrainingView<'a> {
    pub rows: &'a [Vec<f64>],
    pub labels: &'a [usize],
    pub n_features: usize,
    pub n_classes: usize,
}

struct Candidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

struct Builder<'a> {
    data: &'a TrainingView<'a>,
    /// Per-sample weight (class weight times bootstrap multiplicity)
    weights: &'a [f64],
    params: TreeParams,
    rng: &'a mut StdRng,
    nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Grow a tree on the samples with a non-zero weight.
    pub(crate) fn fit(data: &TrainingView<'_>, weights: &[f64], params: TreeParams, rng: &mut StdRng) -> Self {
        let samples: Vec<usize> = (0..data.rows.len()).filter(|&i| weights[i] > 0.0).collect();
        let mut builder = Builder {
            data,
            weights,
            params,
            rng,
            nodes: Vec::new(),
        };
        builder.grow(samples, 0);
        Self {
            nodes: builder.nodes,
            n_classes: data.n_classes,
        }
    }

    /// Class distribution of the leaf `row` falls into
    pub fn predict_proba(&self, row: &[f64]) -> Vec<f64> {
        let mut proba = vec![0.0; self.n_classes];
        let mut idx = 0;
        loop {
            match self.nodes.get(idx) {
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = row.get(*feature).copied().unwrap_or(0.0);
                    idx = if value <= *threshold { *left } else { *right };
                }
                Some(TreeNode::Leaf { distribution }) => {
                    for &(class, p) in distribution {
                        if let Some(slot) = proba.get_mut(class) {
                            *slot = p;
                        }
                    }
                    return proba;
                }
                None => return proba,
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[TreeNode], idx: usize) -> usize {
            match nodes.get(idx) {
                Some(TreeNode::Split { left, right, .. }) => 1 + walk(nodes, *left).max(walk(nodes, *right)),
                _ => 0,
            }
        }
        walk(&self.nodes, 0)
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }
}

impl Builder<'_> {
    /// Returns the index of the node created for `samples`
    fn grow(&mut self, samples: Vec<usize>, depth: usize) -> usize {
        let class_weights = self.class_weights(&samples);
        let impurity = gini(&class_weights);

        let splittable = depth < self.params.max_depth
            && samples.len() >= self.params.min_samples_split
            && samples.len() >= 2 * self.params.min_samples_leaf
            && impurity > IMPURITY_EPSILON;

        let candidate = if splittable { self.best_split(&samples) } else { None };

        let Some(candidate) = candidate else {
            return self.push_leaf(&class_weights);
        };

        let (left, right): (Vec<usize>, Vec<usize>) = samples
            .into_iter()
            .partition(|&i| self.data.rows[i][candidate.feature] <= candidate.threshold);

        tracing::trace!(
            depth,
            feature = candidate.feature,
            impurity = candidate.impurity,
            "Split node"
        );

        // reserve the split slot so children get higher indices
        let idx = self.nodes.len();
        self.nodes.push(TreeNode::Leaf { distribution: Vec::new() });
        let left_idx = self.grow(left, depth + 1);
        let right_idx = self.grow(right, depth + 1);
        self.nodes[idx] = TreeNode::Split {
            feature: candidate.feature,
            threshold: candidate.threshold,
            left: left_idx,
            right: right_idx,
        };
        idx
    }

    fn push_leaf(&mut self, class_weights: &[f64]) -> usize {
        let total: f64 = class_weights.iter().sum();
        let distribution = if total > 0.0 {
            class_weights
                .iter()
                .enumerate()
                .filter(|(_, w)| **w > 0.0)
                .map(|(class, w)| (class, w / total))
                .collect()
        } else {
            Vec::new()
        };
        self.nodes.push(TreeNode::Leaf { distribution });
        self.nodes.len() - 1
    }

    fn class_weights(&self, samples: &[usize]) -> Vec<f64> {
        let mut totals = vec![0.0; self.data.n_classes];
        for &i in samples {
            totals[self.data.labels[i]] += self.weights[i];
        }
        totals
    }

    /// Examine up to `max_features` non-constant features in random order.
    fn best_split(&mut self, samples: &[usize]) -> Option<Candidate> {
        let mut features: Vec<usize> = (0..self.data.n_features).collect();
        features.shuffle(&mut *self.rng);

        let mut best: Option<Candidate> = None;
        let mut examined = 0;
        for feature in features {
            if examined >= self.params.max_features {
                break;
            }
            let first = self.data.rows[samples[0]][feature];
            if samples.iter().all(|&i| self.data.rows[i][feature] == first) {
                continue;
            }
            examined += 1;

            if let Some(candidate) = self.best_threshold(samples, feature) {
                if best.as_ref().map_or(true, |b| candidate.impurity < b.impurity) {
                    best = Some(candidate);
                }
            }
        }
        best
    }

    /// Lowest weighted child impurity over all thresholds of one feature
    fn best_threshold(&self, samples: &[usize], feature: usize) -> Option<Candidate> {
        let rows = self.data.rows;
        let mut ordered: Vec<usize> = samples.to_vec();
        ordered.sort_by(|&a, &b| rows[a][feature].total_cmp(&rows[b][feature]));

        let mut right = self.class_weights(&ordered);
        let mut left = vec![0.0; self.data.n_classes];
        let total: f64 = right.iter().sum();
        let mut left_total = 0.0;
        let min_leaf = self.params.min_samples_leaf;

        let mut best: Option<Candidate> = None;
        for pos in 0..ordered.len() - 1 {
            let i = ordered[pos];
            let w = self.weights[i];
            left[self.data.labels[i]] += w;
            right[self.data.labels[i]] -= w;
            left_total += w;

            let here = rows[i][feature];
            let next = rows[ordered[pos + 1]][feature];
            let left_count = pos + 1;
            if here == next || left_count < min_leaf || ordered.len() - left_count < min_leaf {
                continue;
            }

            let right_total = total - left_total;
            let impurity = (left_total * gini(&left) + right_total * gini(&right)) / total;
            if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                best = Some(Candidate {
                    feature,
                    threshold: here + (next - here) / 2.0,
                    impurity,
                });
            }
        }
        best
    }
}

/// Gini impurity of a weighted class histogram
pub(crate) fn gini(class_weights: &[f64]) -> f64 {
    let total: f64 = class_weights.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    1.0 - class_weights.iter().map(|w| (w / total).powi(2)).sum::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn params() -> TreeParams {
        TreeParams {
            max_depth: 10,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: 2,
        }
    }

    #[test]
    fn test_gini() {
        assert!(gini(&[5.0, 0.0]).abs() < 1e-12);
        assert!((gini(&[1.0, 1.0]) - 0.5).abs() < 1e-12);
        assert!(gini(&[0.0, 0.0]).abs() < 1e-12);
    }

    #[test]
    fn test_separable_data_is_learned() {
        let rows = vec![
            vec![2.7, 0.0],
            vec![2.6, 0.0],
            vec![2.5, 0.0],
            vec![0.0, 2.7],
            vec![0.0, 2.6],
            vec![0.0, 2.5],
        ];
        let labels = vec![0, 0, 0, 1, 1, 1];
        let data = TrainingView {
            rows: &rows,
            labels: &labels,
            n_features: 2,
            n_classes: 2,
        };
        let mut rng = StdRng::seed_from_u64(42);
        let tree = DecisionTree::fit(&data, &[1.0; 6], params(), &mut rng);

        assert_eq!(tree.predict_proba(&[2.0, 0.0]), vec![1.0, 0.0]);
        assert_eq!(tree.predict_proba(&[0.0, 2.0]), vec![0.0, 1.0]);
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn test_min_samples_leaf_prevents_split() {
        let rows = vec![vec![1.0], vec![0.0], vec![0.0]];
        let labels = vec![1, 0, 0];
        let data = TrainingView {
            rows: &rows,
            labels: &labels,
            n_features: 1,
            n_classes: 2,
        };
        let mut rng = StdRng::seed_from_u64(1);
        let tree = DecisionTree::fit(
            &data,
            &[1.0; 3],
            TreeParams {
                min_samples_leaf: 2,
                ..params()
            },
            &mut rng,
        );
        assert_eq!(tree.node_count(), 1);
        let proba = tree.predict_proba(&[1.0]);
        assert!((proba[0] - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_weight_samples_are_ignored() {
        let rows = vec![vec![1.0], vec![0.0]];
        let labels = vec![1, 0];
        let data = TrainingView {
            rows: &rows,
            labels: &labels,
            n_features: 1,
            n_classes: 2,
        };
        let mut rng = StdRng::seed_from_u64(1);
        let tree = DecisionTree::fit(&data, &[0.0, 3.0], params(), &mut rng);
        assert_eq!(tree.predict_proba(&[1.0]), vec![1.0, 0.0]);
    }

    #[test]
    fn test_max_depth_limits_growth() {
        let rows: Vec<Vec<f64>> = (0..16).map(|i| vec![f64::from(i)]).collect();
        let labels: Vec<usize> = (0..16).map(|i| i % 2).collect();
        let data = TrainingView {
            rows: &rows,
            labels: &labels,
            n_features: 1,
            n_classes: 2,
        };
        let mut rng = StdRng::seed_from_u64(3);
        let tree = DecisionTree::fit(
            &data,
            &[1.0; 16],
            TreeParams {
                max_depth: 2,
                ..params()
            },
            &mut rng,
        );
        assert!(tree.depth() <= 2);
    }
}
