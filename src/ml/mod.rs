//! Ensemble Classifier
//!
//! A small, dependency-free random forest over the fixed URL feature
//! vector. Two pieces:
//!
//! - `tree`: CART decision trees split on Gini impurity
//! - `forest`: bootstrap aggregation with probability averaging, plus
//!   the shuffled train/test split used for hold-out accuracy
//!
//! The detector only relies on the fit / predict_proba / accuracy
//! surface, so the ensemble could be swapped without touching the
//! training contract.

pub mod forest;
pub mod tree;

pub use forest::{train_test_split, ForestParams, RandomForest};
pub use tree::DecisionTree;
