//! Leave-one-out evaluation and (feature set, k) model selection.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use pitchcall_domain::TrainingExample;

use crate::error::ClassifierError;
use crate::feature_set::FeatureSet;
use crate::knn::KnnClassifier;

/// k values swept by default.
pub const DEFAULT_K_GRID: [usize; 4] = [1, 3, 5, 7];

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LooPrediction {
    pub index: usize,
    pub actual: String,
    /// `None` when the held-out example had none of the selected features.
    pub predicted: Option<String>,
}

impl LooPrediction {
    pub fn is_correct(&self) -> bool {
        self.predicted.as_deref() == Some(self.actual.as_str())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LooReport {
    pub accuracy: f64,
    pub correct: usize,
    pub total: usize,
    pub predictions: Vec<LooPrediction>,
}

/// Classifies each example against all the others, refitting the
/// normalization every fold.
pub fn leave_one_out(
    examples: &[TrainingExample],
    feature_set: &FeatureSet,
    k: usize,
) -> Result<LooReport, ClassifierError> {
    if examples.len() < 2 {
        return Err(ClassifierError::TooFewExamples(examples.len()));
    }
    if k == 0 {
        return Err(ClassifierError::InvalidK);
    }

    let mut predictions = Vec::with_capacity(examples.len());
    for (held_out, example) in examples.iter().enumerate() {
        let rest = examples
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != held_out)
            .map(|(_, e)| e);
        let knn = KnnClassifier::fit_iter(rest, feature_set)?;
        let predicted = match knn.predict(&example.features, k) {
            Ok(result) => Some(result.predicted),
            Err(ClassifierError::MissingFeatures(_)) => None,
            Err(err) => return Err(err),
        };
        predictions.push(LooPrediction {
            index: held_out,
            actual: example.label.clone(),
            predicted,
        });
    }

    let correct = predictions.iter().filter(|p| p.is_correct()).count();
    let total = predictions.len();
    Ok(LooReport {
        accuracy: correct as f64 / total as f64,
        correct,
        total,
        predictions,
    })
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GridResult {
    pub feature_set: String,
    pub k: usize,
    pub accuracy: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ModelSelection {
    pub feature_set: FeatureSet,
    pub k: usize,
    pub accuracy: f64,
    /// Every evaluated combination, in sweep order.
    pub grid: Vec<GridResult>,
}

impl ModelSelection {
    /// Fits the winning combination on the full training set.
    pub fn build(&self, examples: &[TrainingExample]) -> Result<KnnClassifier, ClassifierError> {
        KnnClassifier::fit(examples, &self.feature_set)
    }
}

/// Sweeps feature sets × k with leave-one-out and keeps the most accurate
/// combination; ties go to the earlier one in sweep order. Combinations that
/// cannot be evaluated are skipped.
pub fn select_model(
    examples: &[TrainingExample],
    feature_sets: &[FeatureSet],
    ks: &[usize],
) -> Result<ModelSelection, ClassifierError> {
    if examples.len() < 2 {
        return Err(ClassifierError::TooFewExamples(examples.len()));
    }
    let combos: Vec<(&FeatureSet, usize)> = feature_sets
        .iter()
        .flat_map(|set| ks.iter().map(move |&k| (set, k)))
        .collect();

    let outcomes: Vec<(&FeatureSet, usize, Result<LooReport, ClassifierError>)> = combos
        .into_iter()
        .map(|(set, k)| (set, k, leave_one_out(examples, set, k)))
        .collect();

    let mut grid = Vec::new();
    let mut best: Option<(&FeatureSet, usize, f64)> = None;
    for (set, k, outcome) in outcomes {
        match outcome {
            Ok(report) => {
                grid.push(GridResult {
                    feature_set: set.name.clone(),
                    k,
                    accuracy: report.accuracy,
                });
                if best.map_or(true, |(_, _, acc)| report.accuracy > acc) {
                    best = Some((set, k, report.accuracy));
                }
            }
            Err(err) => warn!(feature_set = %set.name, k, error = %err, "skipping combination"),
        }
    }

    let (set, k, accuracy) = best.ok_or(ClassifierError::NoViableModel)?;
    info!(feature_set = %set.name, k, accuracy, "model selected");
    Ok(ModelSelection {
        feature_set: set.clone(),
        k,
        accuracy,
        grid,
    })
}
