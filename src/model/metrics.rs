//! Evaluation metrics for discrete class labels.

use super::{ModelError, Result};

/// Fraction of predictions that exactly match the true labels.
///
/// # Example
///
/// ```
/// use cultivar::model::accuracy;
///
/// let predicted = vec![0, 1, 2, 1];
/// let actual = vec![0, 1, 2, 2];
/// assert_eq!(accuracy(&predicted, &actual).unwrap(), 0.75);
/// ```
pub fn accuracy(predicted: &[usize], actual: &[usize]) -> Result<f64> {
    if predicted.len() != actual.len() {
        return Err(ModelError::LengthMismatch { left: predicted.len(), right: actual.len() });
    }
    if predicted.is_empty() {
        return Err(ModelError::EmptyPredictions);
    }

    let correct = predicted.iter().zip(actual.iter()).filter(|(p, a)| p == a).count();
    Ok(correct as f64 / predicted.len() as f64)
}
