//! Multinomial logistic regression trained by gradient descent.

use serde::{Deserialize, Serialize};

use super::{IrisFeatures, ModelError, Result, N_FEATURES};

/// Softmax classifier over all classes at once.
///
/// Features are standardized internally (the scaling parameters are learned
/// during `fit` and stored with the model), so gradient descent behaves the
/// same regardless of the raw feature ranges.
///
/// # Example
///
/// ```
/// use cultivar::model::{IrisFeatures, LogisticRegression};
///
/// let features = vec![
///     IrisFeatures::new(5.0, 3.4, 1.5, 0.2),
///     IrisFeatures::new(6.8, 3.1, 5.8, 2.2),
/// ];
/// let labels = vec![0, 1];
///
/// let mut model = LogisticRegression::new(200, 0.1);
/// model.fit(&features, &labels).unwrap();
/// assert_eq!(model.predict(&features), labels);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Per-class weight rows, `[n_classes][N_FEATURES]`. Empty until fitted.
    coefficients: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
    feature_means: Vec<f64>,
    feature_stds: Vec<f64>,
    max_iter: usize,
    learning_rate: f64,
}

impl LogisticRegression {
    pub fn new(max_iter: usize, learning_rate: f64) -> Self {
        Self {
            coefficients: Vec::new(),
            intercepts: Vec::new(),
            feature_means: Vec::new(),
            feature_stds: Vec::new(),
            max_iter,
            learning_rate,
        }
    }

    pub fn max_iter(&self) -> usize {
        self.max_iter
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Fit the classifier with full-batch gradient descent on cross-entropy.
    pub fn fit(&mut self, features: &[IrisFeatures], labels: &[usize]) -> Result<()> {
        if features.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        if features.len() != labels.len() {
            return Err(ModelError::LengthMismatch { left: features.len(), right: labels.len() });
        }

        let n = features.len();
        let n_classes = labels.iter().copied().max().unwrap_or(0) + 1;

        let (means, stds) = standardization_params(features);
        let x: Vec<[f64; N_FEATURES]> =
            features.iter().map(|f| standardize(f, &means, &stds)).collect();

        let mut coefficients = vec![vec![0.0; N_FEATURES]; n_classes];
        let mut intercepts = vec![0.0; n_classes];

        for _ in 0..self.max_iter {
            let mut grad_w = vec![[0.0; N_FEATURES]; n_classes];
            let mut grad_b = vec![0.0; n_classes];

            for (xi, &yi) in x.iter().zip(labels.iter()) {
                let scores: Vec<f64> = (0..n_classes)
                    .map(|c| dot(&coefficients[c], xi) + intercepts[c])
                    .collect();
                let probs = softmax(&scores);

                for c in 0..n_classes {
                    let err = probs[c] - f64::from(u8::from(c == yi));
                    for (g, &v) in grad_w[c].iter_mut().zip(xi.iter()) {
                        *g += err * v;
                    }
                    grad_b[c] += err;
                }
            }

            let step = self.learning_rate / n as f64;
            for c in 0..n_classes {
                for (w, g) in coefficients[c].iter_mut().zip(grad_w[c].iter()) {
                    *w -= step * g;
                }
                intercepts[c] -= step * grad_b[c];
            }
        }

        self.coefficients = coefficients;
        self.intercepts = intercepts;
        self.feature_means = means;
        self.feature_stds = stds;
        Ok(())
    }

    /// Predict one class label per sample. Unfitted models predict class 0.
    pub fn predict(&self, batch: &[IrisFeatures]) -> Vec<usize> {
        batch.iter().map(|f| argmax(&self.scores(f))).collect()
    }

    /// Class probabilities for a single sample, in class order.
    pub fn predict_proba(&self, features: &IrisFeatures) -> Vec<f64> {
        softmax(&self.scores(features))
    }

    fn scores(&self, features: &IrisFeatures) -> Vec<f64> {
        let x = standardize(features, &self.feature_means, &self.feature_stds);
        self.coefficients
            .iter()
            .zip(self.intercepts.iter())
            .map(|(row, b)| dot(row, &x) + b)
            .collect()
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.coefficients.is_empty() {
            return Err(ModelError::NotFitted);
        }
        if self.coefficients.iter().flatten().any(|v| !v.is_finite()) {
            return Err(ModelError::NonFinite("coefficients"));
        }
        if self.intercepts.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::NonFinite("intercepts"));
        }
        if self.feature_means.iter().chain(self.feature_stds.iter()).any(|v| !v.is_finite()) {
            return Err(ModelError::NonFinite("feature scaling"));
        }
        Ok(())
    }
}

fn dot(weights: &[f64], x: &[f64; N_FEATURES]) -> f64 {
    weights.iter().zip(x.iter()).map(|(w, v)| w * v).sum()
}

fn standardization_params(features: &[IrisFeatures]) -> (Vec<f64>, Vec<f64>) {
    let n = features.len() as f64;
    let mut means = vec![0.0; N_FEATURES];
    let mut stds = vec![0.0; N_FEATURES];

    for f in features {
        for (m, v) in means.iter_mut().zip(f.as_array().iter()) {
            *m += v;
        }
    }
    for m in means.iter_mut() {
        *m /= n;
    }

    for f in features {
        for (s, (v, m)) in stds.iter_mut().zip(f.as_array().iter().zip(means.iter())) {
            *s += (v - m) * (v - m);
        }
    }
    for s in stds.iter_mut() {
        *s = (*s / n).sqrt();
        // Constant features would divide by zero otherwise.
        if *s == 0.0 {
            *s = 1.0;
        }
    }

    (means, stds)
}

fn standardize(features: &IrisFeatures, means: &[f64], stds: &[f64]) -> [f64; N_FEATURES] {
    let raw = features.as_array();
    if means.len() != N_FEATURES || stds.len() != N_FEATURES {
        return raw;
    }
    let mut out = [0.0; N_FEATURES];
    for i in 0..N_FEATURES {
        out[i] = (raw[i] - means[i]) / stds[i];
    }
    out
}

/// Numerically stable softmax: the max score is subtracted before
/// exponentiation so large logits cannot overflow.
fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    if sum == 0.0 {
        return exps;
    }
    exps.into_iter().map(|e| e / sum).collect()
}

fn argmax(scores: &[f64]) -> usize {
    let mut best = 0;
    for (i, &s) in scores.iter().enumerate().skip(1) {
        if s > scores[best] {
            best = i;
        }
    }
    best
}
