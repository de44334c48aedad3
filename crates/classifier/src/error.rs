use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ClassifierError {
    #[error("training set is empty")]
    EmptyTrainingSet,
    #[error("feature set {0:?} names no features")]
    EmptyFeatureSet(String),
    #[error("k must be at least 1")]
    InvalidK,
    #[error("query has none of the features in set {0:?}")]
    MissingFeatures(String),
    #[error("leave-one-out needs at least 2 examples, got {0}")]
    TooFewExamples(usize),
    #[error("no pitches to cluster")]
    EmptyBatch,
    #[error("no feature set / k combination could be evaluated")]
    NoViableModel,
}
