//! Random forest: bagged gini trees with majority voting.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::tree::{majority_class, DecisionTree};
use super::{IrisFeatures, ModelError, Result};

const TREE_MIN_SAMPLES_SPLIT: usize = 2;

/// Ensemble of [`DecisionTree`]s, each grown on a bootstrap resample drawn
/// from a seeded RNG. The same `(data, random_state)` always produces the
/// same forest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_trees: usize,
    max_depth: usize,
    random_state: u64,
}

impl RandomForest {
    pub fn new(n_trees: usize, max_depth: usize, random_state: u64) -> Self {
        Self { trees: Vec::new(), n_trees, max_depth, random_state }
    }

    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    pub fn random_state(&self) -> u64 {
        self.random_state
    }

    /// Grow `n_trees` trees, each on its own bootstrap sample.
    pub fn fit(&mut self, features: &[IrisFeatures], labels: &[usize]) -> Result<()> {
        if features.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        if features.len() != labels.len() {
            return Err(ModelError::LengthMismatch { left: features.len(), right: labels.len() });
        }

        let n = features.len();
        let mut rng = StdRng::seed_from_u64(self.random_state);
        let mut trees = Vec::with_capacity(self.n_trees);

        for _ in 0..self.n_trees {
            let mut sample_x = Vec::with_capacity(n);
            let mut sample_y = Vec::with_capacity(n);
            for _ in 0..n {
                let i = rng.gen_range(0..n);
                sample_x.push(features[i]);
                sample_y.push(labels[i]);
            }

            let mut tree = DecisionTree::new(self.max_depth, TREE_MIN_SAMPLES_SPLIT);
            tree.fit(&sample_x, &sample_y)?;
            trees.push(tree);
        }

        self.trees = trees;
        Ok(())
    }

    /// Predict one class label per sample by majority vote across all trees.
    /// Unfitted forests predict class 0.
    pub fn predict(&self, batch: &[IrisFeatures]) -> Vec<usize> {
        batch.iter().map(|f| self.predict_one(f)).collect()
    }

    fn predict_one(&self, features: &IrisFeatures) -> usize {
        let votes: Vec<usize> = self.trees.iter().map(|t| t.predict_one(features)).collect();
        let n_classes = votes.iter().copied().max().unwrap_or(0) + 1;
        let mut counts = vec![0usize; n_classes];
        for v in votes {
            counts[v] += 1;
        }
        majority_class(&counts)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(ModelError::NotFitted);
        }
        for tree in &self.trees {
            tree.validate()?;
        }
        Ok(())
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_predictions_come_from_training_labels(
            samples in prop::collection::vec(
                ((0.0f64..10.0, 0.0f64..10.0, 0.0f64..10.0, 0.0f64..10.0), 0usize..3),
                2..20,
            ),
            seed: u64,
        ) {
            let features: Vec<IrisFeatures> = samples
                .iter()
                .map(|((sl, sw, pl, pw), _)| IrisFeatures::new(*sl, *sw, *pl, *pw))
                .collect();
            let labels: Vec<usize> = samples.iter().map(|(_, y)| *y).collect();

            let mut forest = RandomForest::new(7, 6, seed);
            forest.fit(&features, &labels).unwrap();
            forest.validate().unwrap();

            for p in forest.predict(&features) {
                prop_assert!(labels.contains(&p));
            }
        }
    }
}
