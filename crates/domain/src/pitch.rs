use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{DomainError, FeatureVector};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PitchType {
    Fastball,
    Changeup,
    Curveball,
}

impl PitchType {
    /// Cluster labels in descending fastball-score order.
    pub const BY_DESCENDING_SCORE: [PitchType; 3] =
        [PitchType::Fastball, PitchType::Changeup, PitchType::Curveball];

    pub fn as_str(&self) -> &'static str {
        match self {
            PitchType::Fastball => "Fastball",
            PitchType::Changeup => "Changeup",
            PitchType::Curveball => "Curveball",
        }
    }
}

impl fmt::Display for PitchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PitchType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fastball" => Ok(PitchType::Fastball),
            "changeup" => Ok(PitchType::Changeup),
            "curveball" => Ok(PitchType::Curveball),
            other => Err(DomainError::validation(format!(
                "unknown pitch type {other:?}"
            ))),
        }
    }
}

/// A labeled feature vector. Labels are free-form so training sets may use
/// pitch types beyond the three clustering labels.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TrainingExample {
    pub label: String,
    pub features: FeatureVector,
}

impl TrainingExample {
    pub fn new(label: impl Into<String>, features: FeatureVector) -> Self {
        Self {
            label: label.into(),
            features,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LabelVotes {
    pub label: String,
    pub count: usize,
}

/// Outcome of one k-NN vote. `votes` is ordered by descending count; equal
/// counts keep the order in which their labels were first met.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassificationResult {
    pub predicted: String,
    pub votes: Vec<LabelVotes>,
}

impl ClassificationResult {
    pub fn votes_for(&self, label: &str) -> usize {
        self.votes
            .iter()
            .find(|entry| entry.label == label)
            .map(|entry| entry.count)
            .unwrap_or(0)
    }
}
