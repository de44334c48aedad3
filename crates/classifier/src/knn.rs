use ndarray::{Array1, Array2, ArrayView1, Axis};
use tracing::debug;

use pitchcall_domain::{ClassificationResult, FeatureVector, LabelVotes, TrainingExample};

use crate::error::ClassifierError;
use crate::feature_set::FeatureSet;
use crate::normalize::{feature_row, ZScoreNormalizer};

/// k-nearest-neighbour classifier over z-scored features. Holds its own
/// normalized copy of the training set; the caller's examples are untouched.
#[derive(Clone, Debug)]
pub struct KnnClassifier {
    feature_set: FeatureSet,
    normalizer: ZScoreNormalizer,
    points: Array2<f64>,
    labels: Vec<String>,
}

impl KnnClassifier {
    pub fn fit(examples: &[TrainingExample], feature_set: &FeatureSet) -> Result<Self, ClassifierError> {
        Self::fit_iter(examples.iter(), feature_set)
    }

    pub(crate) fn fit_iter<'a, I>(examples: I, feature_set: &FeatureSet) -> Result<Self, ClassifierError>
    where
        I: IntoIterator<Item = &'a TrainingExample>,
    {
        if feature_set.is_empty() {
            return Err(ClassifierError::EmptyFeatureSet(feature_set.name.clone()));
        }
        let mut labels = Vec::new();
        let mut rows = Vec::new();
        for example in examples {
            labels.push(example.label.clone());
            rows.push(feature_row(&example.features, feature_set));
        }
        if labels.is_empty() {
            return Err(ClassifierError::EmptyTrainingSet);
        }

        let mut raw = Array2::from_elem((rows.len(), feature_set.len()), f64::NAN);
        for (i, row) in rows.iter().enumerate() {
            raw.row_mut(i).assign(row);
        }
        let normalizer = ZScoreNormalizer::fit(&raw);
        let points = normalizer.transform_all(&raw);
        Ok(Self {
            feature_set: feature_set.clone(),
            normalizer,
            points,
            labels,
        })
    }

    pub fn feature_set(&self) -> &FeatureSet {
        &self.feature_set
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Majority vote among the `k` nearest training points (all of them when
    /// `k` exceeds the training size). Distance ties keep training order;
    /// vote ties go to the label met first, nearest neighbour first.
    pub fn predict(&self, query: &FeatureVector, k: usize) -> Result<ClassificationResult, ClassifierError> {
        if k == 0 {
            return Err(ClassifierError::InvalidK);
        }
        let raw = feature_row(query, &self.feature_set);
        if raw.iter().all(|v| v.is_nan()) {
            return Err(ClassifierError::MissingFeatures(self.feature_set.name.clone()));
        }
        let z = self.normalizer.transform(raw.view());

        let mut neighbours: Vec<(usize, f64)> = self
            .points
            .axis_iter(Axis(0))
            .enumerate()
            .map(|(i, point)| (i, squared_distance(point, &z)))
            .collect();
        neighbours.sort_by(|a, b| a.1.total_cmp(&b.1));

        let mut votes: Vec<LabelVotes> = Vec::new();
        for &(index, _) in neighbours.iter().take(k) {
            let label = &self.labels[index];
            match votes.iter_mut().find(|entry| &entry.label == label) {
                Some(entry) => entry.count += 1,
                None => votes.push(LabelVotes {
                    label: label.clone(),
                    count: 1,
                }),
            }
        }
        // stable: equal counts stay in first-met order
        votes.sort_by(|a, b| b.count.cmp(&a.count));

        let predicted = votes[0].label.clone();
        debug!(k, predicted = %predicted, "knn vote");
        Ok(ClassificationResult { predicted, votes })
    }
}

fn squared_distance(a: ArrayView1<f64>, b: &Array1<f64>) -> f64 {
    (&a - b).mapv(|d| d * d).sum()
}
