//! Model training and selection
//!
//! Two candidate families — a class-weighted logistic regression and a
//! random forest — are grid-searched under stratified cross-validation and
//! compared once on a held-out split. The winner ships as a
//! [`FittedPipeline`] (preprocessor + model).

pub mod cross_validation;
pub mod decision_tree;
pub mod engine;
pub mod logistic;
pub mod metrics;
pub mod model;
pub mod random_forest;

pub use cross_validation::{stratified_k_fold, stratified_train_test_split, CVSplit};
pub use decision_tree::{DecisionTree, TreeNode};
pub use engine::{FittedPipeline, TrainEngine, TrainingConfig, TrainingOutcome};
pub use logistic::LogisticRegression;
pub use metrics::{confusion_counts, f1_score, precision, recall};
pub use model::ClassifierFamily;
pub use random_forest::RandomForest;
