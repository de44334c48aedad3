pub mod config;
pub mod error;
pub mod evaluation;
pub mod fastball;
pub mod feature_set;
pub mod kmeans;
pub mod knn;
pub mod normalize;

pub use crate::config::ClassifierConfig;
pub use crate::error::ClassifierError;
pub use crate::evaluation::{
    leave_one_out, select_model, GridResult, LooPrediction, LooReport, ModelSelection,
    DEFAULT_K_GRID,
};
pub use crate::fastball::{
    classify_unsupervised, fastball_scores, FastballWeights, UnsupervisedTyping,
};
pub use crate::feature_set::FeatureSet;
pub use crate::kmeans::{KMeans1d, KMeansFit};
pub use crate::knn::KnnClassifier;
pub use crate::normalize::{feature_row, ZScoreNormalizer};
