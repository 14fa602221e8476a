//! CART Decision Tree
//!
//! Binary classification tree grown on Gini impurity. The forest hands
//! each tree a bootstrap resample plus a per-split random feature
//! subset; leaves store the positive-class fraction so ensemble
//! probability averaging is a plain leaf lookup.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Tree growth hyperparameters, fixed for the lifetime of a fit call.
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    /// Maximum tree depth before forcing a leaf
    pub max_depth: usize,
    /// Minimum samples each side of a split must retain
    pub min_samples_leaf: usize,
    /// Number of candidate features examined per split
    pub features_per_split: usize,
}

/// Flat node arena; split children index into the same vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        /// Fraction of positive-class samples that reached this leaf
        probability: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A fitted decision tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Grow a tree over the rows selected by `indices`.
    ///
    /// `indices` may repeat (bootstrap resamples do); `x` rows must all
    /// have the same width.
    pub fn fit<R: Rng>(
        x: &[Vec<f64>],
        y: &[u8],
        indices: &[usize],
        params: &TreeParams,
        rng: &mut R,
    ) -> Self {
        let mut nodes = Vec::new();
        build(&mut nodes, x, y, indices, 0, params, rng);
        Self { nodes }
    }

    /// Positive-class probability for a feature row.
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        let mut at = 0;
        loop {
            match &self.nodes[at] {
                Node::Leaf { probability } => return *probability,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = row.get(*feature).copied().unwrap_or(0.0);
                    at = if value <= *threshold { *left } else { *right };
                }
            }
        }
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Recursively grow the subtree for `indices`, returning its root index.
fn build<R: Rng>(
    nodes: &mut Vec<Node>,
    x: &[Vec<f64>],
    y: &[u8],
    indices: &[usize],
    depth: usize,
    params: &TreeParams,
    rng: &mut R,
) -> usize {
    let positives = indices.iter().filter(|&&i| y[i] == 1).count();
    let probability = if indices.is_empty() {
        0.0
    } else {
        positives as f64 / indices.len() as f64
    };

    let pure = positives == 0 || positives == indices.len();
    if depth >= params.max_depth || pure || indices.len() < 2 * params.min_samples_leaf {
        nodes.push(Node::Leaf { probability });
        return nodes.len() - 1;
    }

    let Some((feature, threshold)) = best_split(x, y, indices, params, rng) else {
        nodes.push(Node::Leaf { probability });
        return nodes.len() - 1;
    };

    let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .copied()
        .partition(|&i| x[i][feature] <= threshold);

    // Reserve the split slot before recursing so the subtree root index
    // is stable.
    nodes.push(Node::Leaf { probability });
    let slot = nodes.len() - 1;
    let left = build(nodes, x, y, &left_rows, depth + 1, params, rng);
    let right = build(nodes, x, y, &right_rows, depth + 1, params, rng);
    nodes[slot] = Node::Split {
        feature,
        threshold,
        left,
        right,
    };
    slot
}

/// Find the lowest-impurity (feature, threshold) pair over a random
/// feature subset. Returns `None` when no split satisfies the leaf
/// minimum or reduces impurity.
fn best_split<R: Rng>(
    x: &[Vec<f64>],
    y: &[u8],
    indices: &[usize],
    params: &TreeParams,
    rng: &mut R,
) -> Option<(usize, f64)> {
    let n_features = x.first().map(|row| row.len()).unwrap_or(0);
    if n_features == 0 {
        return None;
    }

    let mut candidates: Vec<usize> = (0..n_features).collect();
    candidates.shuffle(rng);
    candidates.truncate(params.features_per_split.max(1));

    let parent_gini = gini(y, indices);
    let total = indices.len() as f64;
    let mut best: Option<(usize, f64, f64)> = None;

    for feature in candidates {
        let mut values: Vec<f64> = indices.iter().map(|&i| x[i][feature]).collect();
        values.sort_by(|a, b| a.total_cmp(b));
        values.dedup();

        for pair in values.windows(2) {
            let threshold = (pair[0] + pair[1]) / 2.0;
            let left: Vec<usize> = indices
                .iter()
                .copied()
                .filter(|&i| x[i][feature] <= threshold)
                .collect();
            let right: Vec<usize> = indices
                .iter()
                .copied()
                .filter(|&i| x[i][feature] > threshold)
                .collect();
            if left.len() < params.min_samples_leaf || right.len() < params.min_samples_leaf {
                continue;
            }

            let weighted = (left.len() as f64 / total) * gini(y, &left)
                + (right.len() as f64 / total) * gini(y, &right);
            if weighted + 1e-12 < best.map(|(_, _, g)| g).unwrap_or(parent_gini) {
                best = Some((feature, threshold, weighted));
            }
        }
    }

    best.map(|(feature, threshold, _)| (feature, threshold))
}

/// Gini impurity of the labels selected by `indices`.
fn gini(y: &[u8], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    let positives = indices.iter().filter(|&&i| y[i] == 1).count() as f64;
    let p = positives / indices.len() as f64;
    1.0 - p * p - (1.0 - p) * (1.0 - p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn params() -> TreeParams {
        TreeParams {
            max_depth: 8,
            min_samples_leaf: 1,
            features_per_split: 2,
        }
    }

    #[test]
    fn learns_a_single_separable_feature() {
        // Column 0 perfectly separates the classes.
        let x: Vec<Vec<f64>> = (0..20)
            .map(|i| vec![if i < 10 { 0.0 } else { 1.0 }, 0.5])
            .collect();
        let y: Vec<u8> = (0..20).map(|i| u8::from(i >= 10)).collect();
        let indices: Vec<usize> = (0..20).collect();

        let mut rng = StdRng::seed_from_u64(3);
        let tree = DecisionTree::fit(&x, &y, &indices, &params(), &mut rng);

        assert!(tree.predict_proba(&[0.0, 0.5]) < 0.5);
        assert!(tree.predict_proba(&[1.0, 0.5]) > 0.5);
    }

    #[test]
    fn pure_nodes_become_leaves() {
        let x = vec![vec![0.0], vec![1.0], vec![2.0]];
        let y = vec![1, 1, 1];
        let indices = vec![0, 1, 2];

        let mut rng = StdRng::seed_from_u64(3);
        let tree = DecisionTree::fit(&x, &y, &indices, &params(), &mut rng);
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.predict_proba(&[5.0]), 1.0);
    }

    #[test]
    fn gini_is_zero_for_pure_and_half_for_even() {
        let y = vec![0, 0, 1, 1];
        assert_eq!(gini(&y, &[0, 1]), 0.0);
        assert!((gini(&y, &[0, 1, 2, 3]) - 0.5).abs() < 1e-9);
    }
}
