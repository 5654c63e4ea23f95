//! Seeded train/test splitting.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::{IrisFeatures, ModelError, Result};

/// Shuffle the dataset with a seeded RNG and split it into train and test
/// partitions.
///
/// `test_size` is the fraction of samples held out, exclusive on both ends.
/// The same `(data, test_size, seed)` always produces the same split, so a
/// training run can be reproduced exactly.
///
/// Returns `(train_features, test_features, train_labels, test_labels)`.
///
/// # Example
///
/// ```
/// use cultivar::model::{train_test_split, IrisFeatures};
///
/// let features: Vec<IrisFeatures> =
///     (0..10).map(|i| IrisFeatures::new(i as f64, 3.0, 1.5, 0.2)).collect();
/// let labels: Vec<usize> = (0..10).map(|i| i % 2).collect();
///
/// let (x_train, x_test, y_train, y_test) =
///     train_test_split(&features, &labels, 0.2, 42).unwrap();
/// assert_eq!(x_train.len(), 8);
/// assert_eq!(x_test.len(), 2);
/// assert_eq!(y_train.len(), 8);
/// assert_eq!(y_test.len(), 2);
/// ```
#[allow(clippy::type_complexity)]
pub fn train_test_split(
    features: &[IrisFeatures],
    labels: &[usize],
    test_size: f64,
    seed: u64,
) -> Result<(Vec<IrisFeatures>, Vec<IrisFeatures>, Vec<usize>, Vec<usize>)> {
    if features.len() != labels.len() {
        return Err(ModelError::LengthMismatch { left: features.len(), right: labels.len() });
    }
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(ModelError::InvalidTestSize(test_size));
    }

    let n = features.len();
    if n < 2 {
        return Err(ModelError::TooFewSamples(n));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    // Both partitions stay non-empty even for extreme fractions.
    let n_test = ((n as f64 * test_size).round() as usize).clamp(1, n - 1);

    let (test_idx, train_idx) = indices.split_at(n_test);

    let x_train = train_idx.iter().map(|&i| features[i]).collect();
    let x_test = test_idx.iter().map(|&i| features[i]).collect();
    let y_train = train_idx.iter().map(|&i| labels[i]).collect();
    let y_test = test_idx.iter().map(|&i| labels[i]).collect();

    Ok((x_train, x_test, y_train, y_test))
}
