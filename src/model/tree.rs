//! Gini decision tree, the base learner for the random forest.

use serde::{Deserialize, Serialize};

use super::{IrisFeatures, ModelError, Result, N_FEATURES};

/// Recursive binary splitter minimizing gini impurity.
///
/// Nodes live in a flat arena indexed by `usize`, which keeps the tree
/// serde-friendly and lets `predict` walk it without recursion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
    root: usize,
    max_depth: usize,
    min_samples_split: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum TreeNode {
    Leaf { class: usize },
    Split { feature: usize, threshold: f64, left: usize, right: usize },
}

impl DecisionTree {
    pub fn new(max_depth: usize, min_samples_split: usize) -> Self {
        Self { nodes: Vec::new(), root: 0, max_depth, min_samples_split }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Grow the tree on the given samples, replacing any previous fit.
    pub fn fit(&mut self, features: &[IrisFeatures], labels: &[usize]) -> Result<()> {
        if features.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        if features.len() != labels.len() {
            return Err(ModelError::LengthMismatch { left: features.len(), right: labels.len() });
        }

        let x: Vec<[f64; N_FEATURES]> = features.iter().map(IrisFeatures::as_array).collect();
        let n_classes = labels.iter().copied().max().unwrap_or(0) + 1;
        let indices: Vec<usize> = (0..x.len()).collect();

        self.nodes.clear();
        self.root = self.build(&x, labels, n_classes, indices, 0);
        Ok(())
    }

    fn build(
        &mut self,
        x: &[[f64; N_FEATURES]],
        y: &[usize],
        n_classes: usize,
        indices: Vec<usize>,
        depth: usize,
    ) -> usize {
        let counts = class_counts(y, &indices, n_classes);
        let is_pure = counts.iter().filter(|&&c| c > 0).count() <= 1;

        if is_pure || depth >= self.max_depth || indices.len() < self.min_samples_split {
            return self.push(TreeNode::Leaf { class: majority_class(&counts) });
        }

        let Some((feature, threshold)) = best_split(x, y, n_classes, &indices) else {
            // No feature separates the remaining samples.
            return self.push(TreeNode::Leaf { class: majority_class(&counts) });
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) =
            indices.into_iter().partition(|&i| x[i][feature] <= threshold);

        let left = self.build(x, y, n_classes, left_idx, depth + 1);
        let right = self.build(x, y, n_classes, right_idx, depth + 1);
        self.push(TreeNode::Split { feature, threshold, left, right })
    }

    fn push(&mut self, node: TreeNode) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Predict one class label per sample. Unfitted trees predict class 0.
    pub fn predict(&self, batch: &[IrisFeatures]) -> Vec<usize> {
        batch.iter().map(|f| self.predict_one(f)).collect()
    }

    pub fn predict_one(&self, features: &IrisFeatures) -> usize {
        let x = features.as_array();
        let mut idx = self.root;
        while let Some(node) = self.nodes.get(idx) {
            match node {
                TreeNode::Leaf { class } => return *class,
                TreeNode::Split { feature, threshold, left, right } => {
                    idx = if x[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
        0
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(ModelError::NotFitted);
        }
        for node in &self.nodes {
            if let TreeNode::Split { feature, threshold, left, right } = node {
                if !threshold.is_finite() {
                    return Err(ModelError::NonFinite("split threshold"));
                }
                if *feature >= N_FEATURES
                    || *left >= self.nodes.len()
                    || *right >= self.nodes.len()
                {
                    return Err(ModelError::NotFitted);
                }
            }
        }
        Ok(())
    }
}

fn class_counts(y: &[usize], indices: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0usize; n_classes];
    for &i in indices {
        counts[y[i]] += 1;
    }
    counts
}

/// Most frequent class; ties resolve to the smallest label.
pub(crate) fn majority_class(counts: &[usize]) -> usize {
    let mut best = 0;
    for (class, &count) in counts.iter().enumerate().skip(1) {
        if count > counts[best] {
            best = class;
        }
    }
    best
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let sum_sq: f64 = counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total as f64;
            p * p
        })
        .sum();
    1.0 - sum_sq
}

/// Exhaustive search over all features and midpoint thresholds for the split
/// with the lowest weighted gini impurity. `None` when every feature is
/// constant across the samples.
fn best_split(
    x: &[[f64; N_FEATURES]],
    y: &[usize],
    n_classes: usize,
    indices: &[usize],
) -> Option<(usize, f64)> {
    let total = indices.len();
    let mut best: Option<(usize, f64)> = None;
    let mut best_impurity = f64::INFINITY;

    for feature in 0..N_FEATURES {
        let mut order: Vec<usize> = indices.to_vec();
        order.sort_by(|&a, &b| {
            x[a][feature].partial_cmp(&x[b][feature]).unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut left_counts = vec![0usize; n_classes];
        let mut right_counts = class_counts(y, indices, n_classes);

        for (pos, window) in order.windows(2).enumerate() {
            let (cur, next) = (window[0], window[1]);
            left_counts[y[cur]] += 1;
            right_counts[y[cur]] -= 1;

            if x[cur][feature] == x[next][feature] {
                continue;
            }

            let n_left = pos + 1;
            let n_right = total - n_left;
            let impurity = (n_left as f64 * gini(&left_counts, n_left)
                + n_right as f64 * gini(&right_counts, n_right))
                / total as f64;

            if impurity < best_impurity {
                best_impurity = impurity;
                best = Some((feature, (x[cur][feature] + x[next][feature]) / 2.0));
            }
        }
    }

    best
}
