//! Stratified splitting for model selection

use crate::error::{IncomeLensError, Result};
use ndarray::Array1;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

/// A single train/test split of row indices
#[derive(Debug, Clone)]
pub struct CVSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
    pub fold_idx: usize,
}

/// Stratified train/test split that preserves the class ratio in both parts.
///
/// Indices are shuffled per class with a seeded generator, so the split is
/// deterministic for a given seed.
pub fn stratified_train_test_split(
    y: &Array1<f64>,
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(0.0..1.0).contains(&test_fraction) || test_fraction == 0.0 {
        return Err(IncomeLensError::ValidationError(format!(
            "test fraction must be in (0, 1), got {}",
            test_fraction
        )));
    }

    let mut class_indices: HashMap<i64, Vec<usize>> = HashMap::new();
    for (idx, &val) in y.iter().enumerate() {
        class_indices.entry(val.round() as i64).or_default().push(idx);
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    // Iterate classes in sorted order so the seed fully determines the split
    let mut classes: Vec<i64> = class_indices.keys().copied().collect();
    classes.sort_unstable();

    for class in classes {
        let mut indices = class_indices.remove(&class).unwrap_or_default();
        indices.shuffle(&mut rng);

        let n_test = ((indices.len() as f64) * test_fraction).round() as usize;
        let n_test = n_test.min(indices.len());

        test.extend_from_slice(&indices[..n_test]);
        train.extend_from_slice(&indices[n_test..]);
    }

    if train.is_empty() || test.is_empty() {
        return Err(IncomeLensError::ValidationError(
            "stratified split produced an empty partition".to_string(),
        ));
    }

    Ok((train, test))
}

/// Stratified k-fold splits maintaining class distribution per fold.
pub fn stratified_k_fold(y: &Array1<f64>, n_splits: usize, seed: u64) -> Result<Vec<CVSplit>> {
    if n_splits < 2 {
        return Err(IncomeLensError::ValidationError(
            "n_splits must be at least 2".to_string(),
        ));
    }
    if y.len() < n_splits {
        return Err(IncomeLensError::ValidationError(format!(
            "n_samples ({}) must be >= n_splits ({})",
            y.len(),
            n_splits
        )));
    }

    let mut class_indices: HashMap<i64, Vec<usize>> = HashMap::new();
    for (idx, &val) in y.iter().enumerate() {
        class_indices.entry(val.round() as i64).or_default().push(idx);
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut classes: Vec<i64> = class_indices.keys().copied().collect();
    classes.sort_unstable();

    // Distribute each class round-robin over the folds
    let mut folds: Vec<Vec<usize>> = vec![Vec::new(); n_splits];
    for class in classes {
        let mut indices = class_indices.remove(&class).unwrap_or_default();
        indices.shuffle(&mut rng);
        for (i, idx) in indices.into_iter().enumerate() {
            folds[i % n_splits].push(idx);
        }
    }

    let mut splits = Vec::with_capacity(n_splits);
    for fold_idx in 0..n_splits {
        let test_indices = folds[fold_idx].clone();
        let train_indices: Vec<usize> = folds
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != fold_idx)
            .flat_map(|(_, f)| f.iter().copied())
            .collect();

        splits.push(CVSplit {
            train_indices,
            test_indices,
            fold_idx,
        });
    }

    Ok(splits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;

    fn imbalanced_y() -> Array1<f64> {
        let mut v = vec![0.0; 80];
        v.extend(vec![1.0; 20]);
        Array1::from_vec(v)
    }

    #[test]
    fn test_split_preserves_class_ratio() {
        let y = imbalanced_y();
        let (train, test) = stratified_train_test_split(&y, 0.2, 42).unwrap();

        assert_eq!(train.len() + test.len(), 100);
        let test_pos = test.iter().filter(|&&i| y[i] > 0.5).count();
        assert_eq!(test_pos, 4); // 20% of the 20 positives
    }

    #[test]
    fn test_split_deterministic_for_seed() {
        let y = imbalanced_y();
        let a = stratified_train_test_split(&y, 0.2, 7).unwrap();
        let b = stratified_train_test_split(&y, 0.2, 7).unwrap();
        assert_eq!(a.0, b.0);
        assert_eq!(a.1, b.1);
    }

    #[test]
    fn test_k_fold_covers_all_rows() {
        let y = imbalanced_y();
        let splits = stratified_k_fold(&y, 3, 42).unwrap();
        assert_eq!(splits.len(), 3);

        let mut seen: Vec<usize> = splits.iter().flat_map(|s| s.test_indices.clone()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..100).collect::<Vec<_>>());

        for split in &splits {
            let pos = split.test_indices.iter().filter(|&&i| y[i] > 0.5).count();
            assert!(pos >= 6 && pos <= 7, "fold positives out of balance: {}", pos);
        }
    }

    #[test]
    fn test_invalid_fraction_rejected() {
        let y = imbalanced_y();
        assert!(stratified_train_test_split(&y, 0.0, 42).is_err());
        assert!(stratified_train_test_split(&y, 1.0, 42).is_err());
    }
}
