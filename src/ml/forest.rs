//! Random Forest Classifier
//!
//! Bootstrap-aggregated CART trees with probability averaging. The
//! ensemble exposes exactly the contract the detector needs: fit over a
//! feature matrix, positive-class probability per row, and hold-out
//! accuracy for the training report.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::tree::{DecisionTree, TreeParams};

/// Forest hyperparameters.
#[derive(Debug, Clone, Copy)]
pub struct ForestParams {
    /// Number of bootstrap trees
    pub trees: usize,
    /// Maximum depth per tree
    pub max_depth: usize,
    /// Minimum samples each side of a split must retain
    pub min_samples_leaf: usize,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            trees: 100,
            max_depth: 12,
            min_samples_leaf: 2,
        }
    }
}

/// A fitted random forest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    /// Feature-row width the forest was trained on
    features: usize,
}

impl RandomForest {
    /// Fit the forest on the full matrix. Each tree sees a bootstrap
    /// resample and √n candidate features per split.
    pub fn fit<R: Rng>(x: &[Vec<f64>], y: &[u8], params: &ForestParams, rng: &mut R) -> Self {
        let features = x.first().map(|row| row.len()).unwrap_or(0);
        let features_per_split = ((features as f64).sqrt().round() as usize).max(1);
        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_samples_leaf: params.min_samples_leaf,
            features_per_split,
        };

        let mut trees = Vec::with_capacity(params.trees);
        for _ in 0..params.trees {
            let sample: Vec<usize> = (0..x.len()).map(|_| rng.gen_range(0..x.len())).collect();
            trees.push(DecisionTree::fit(x, y, &sample, &tree_params, rng));
        }

        Self { trees, features }
    }

    /// Mean positive-class probability across the ensemble.
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let total: f64 = self.trees.iter().map(|t| t.predict_proba(row)).sum();
        total / self.trees.len() as f64
    }

    /// Binary prediction; probability ties resolve to the positive class.
    pub fn predict(&self, row: &[f64]) -> bool {
        self.predict_proba(row) >= 0.5
    }

    /// Fraction of rows predicted correctly.
    pub fn accuracy(&self, x: &[Vec<f64>], y: &[u8]) -> f64 {
        if x.is_empty() {
            return 0.0;
        }
        let correct = x
            .iter()
            .zip(y)
            .filter(|(row, &label)| self.predict(row) == (label == 1))
            .count();
        correct as f64 / x.len() as f64
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Feature-row width the forest expects.
    pub fn feature_count(&self) -> usize {
        self.features
    }
}

/// Shuffle row indices and split off a test partition.
///
/// Returns `(train, test)`. The test partition holds
/// `round(n * test_fraction)` rows, capped so training always keeps at
/// least one row.
pub fn train_test_split<R: Rng>(
    n: usize,
    test_fraction: f64,
    rng: &mut R,
) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);

    let test_len = ((n as f64 * test_fraction).round() as usize).min(n.saturating_sub(1));
    let test = indices.split_off(n - test_len);
    (indices, test)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn separable_data(n: usize) -> (Vec<Vec<f64>>, Vec<u8>) {
        let x = (0..n)
            .map(|i| vec![f64::from(u8::from(i % 2 == 0)), (i % 7) as f64])
            .collect();
        let y = (0..n).map(|i| u8::from(i % 2 == 0)).collect();
        (x, y)
    }

    #[test]
    fn fits_and_separates_simple_data() {
        let (x, y) = separable_data(100);
        let mut rng = StdRng::seed_from_u64(5);
        let forest = RandomForest::fit(
            &x,
            &y,
            &ForestParams {
                trees: 20,
                ..ForestParams::default()
            },
            &mut rng,
        );

        assert_eq!(forest.tree_count(), 20);
        assert!(forest.predict(&[1.0, 3.0]));
        assert!(!forest.predict(&[0.0, 3.0]));
        assert!(forest.accuracy(&x, &y) > 0.95);
    }

    #[test]
    fn probabilities_stay_in_unit_interval() {
        let (x, y) = separable_data(40);
        let mut rng = StdRng::seed_from_u64(5);
        let forest = RandomForest::fit(&x, &y, &ForestParams::default(), &mut rng);

        for row in &x {
            let p = forest.predict_proba(row);
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn split_sizes_add_up_and_do_not_overlap() {
        let mut rng = StdRng::seed_from_u64(9);
        let (train, test) = train_test_split(100, 0.2, &mut rng);
        assert_eq!(train.len(), 80);
        assert_eq!(test.len(), 20);
        for i in &test {
            assert!(!train.contains(i));
        }
    }

    #[test]
    fn split_always_leaves_training_rows() {
        let mut rng = StdRng::seed_from_u64(9);
        let (train, test) = train_test_split(2, 0.9, &mut rng);
        assert_eq!(train.len(), 1);
        assert_eq!(test.len(), 1);
    }
}
