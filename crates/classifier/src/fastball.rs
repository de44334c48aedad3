//! Unsupervised pitch typing from pop signatures.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use pitchcall_domain::{PitchType, PopSignature};

use crate::error::ClassifierError;
use crate::kmeans::{KMeans1d, KMeansFit};

/// Weights of the fastball-likeness score. Louder pops, faster decay and
/// denser zero crossings all push the score up.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FastballWeights {
    pub amplitude: f64,
    pub decay: f64,
    pub zero_crossings: f64,
}

impl Default for FastballWeights {
    fn default() -> Self {
        Self {
            amplitude: 0.6,
            decay: 0.2,
            zero_crossings: 0.2,
        }
    }
}

/// Min-max scales to [0, 1]; a constant column maps to 0.
fn min_max(values: &[f64]) -> Vec<f64> {
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = hi - lo;
    values
        .iter()
        .map(|v| if span > 0.0 { (v - lo) / span } else { 0.0 })
        .collect()
}

/// Scores every signature relative to the rest of the batch.
pub fn fastball_scores(signatures: &[PopSignature], weights: &FastballWeights) -> Vec<f64> {
    let amp = min_max(&signatures.iter().map(|s| s.peak_abs).collect::<Vec<_>>());
    let decay = min_max(&signatures.iter().map(|s| s.decay_ratio).collect::<Vec<_>>());
    let zcr = min_max(&signatures.iter().map(|s| s.zc_rate).collect::<Vec<_>>());
    (0..signatures.len())
        .map(|i| {
            weights.amplitude * amp[i]
                + weights.decay * (1.0 - decay[i])
                + weights.zero_crossings * zcr[i]
        })
        .collect()
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UnsupervisedTyping {
    /// One label per input signature, in input order.
    pub labels: Vec<PitchType>,
    pub scores: Vec<f64>,
    pub clustering: KMeansFit,
}

/// Clusters a batch by fastball score and names clusters by descending
/// centroid.
#[instrument(skip_all, fields(pitches = signatures.len()))]
pub fn classify_unsupervised(
    signatures: &[PopSignature],
    weights: &FastballWeights,
    kmeans: &KMeans1d,
) -> Result<UnsupervisedTyping, ClassifierError> {
    if signatures.is_empty() {
        return Err(ClassifierError::EmptyBatch);
    }
    let scores = fastball_scores(signatures, weights);
    let clustering = kmeans.fit(&scores)?;
    let ranks = clustering.descending_ranks();
    let labels = clustering
        .assignments
        .iter()
        .map(|&cluster| PitchType::BY_DESCENDING_SCORE[ranks[cluster]])
        .collect();

    Ok(UnsupervisedTyping {
        labels,
        scores,
        clustering,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sig(peak_abs: f64, decay_ratio: f64, zc_rate: f64) -> PopSignature {
        PopSignature {
            peak_abs,
            rms: peak_abs / 3.0,
            decay_ratio,
            zc_rate,
        }
    }

    #[test]
    fn score_extremes() {
        let scores = fastball_scores(
            &[sig(20_000.0, 0.1, 0.5), sig(4_000.0, 0.9, 0.1)],
            &FastballWeights::default(),
        );
        assert_abs_diff_eq!(scores[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(scores[1], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn constant_columns_score_zero() {
        let scores = fastball_scores(&[sig(1.0, 0.5, 0.2); 3], &FastballWeights::default());
        // decay contributes 0.2 * (1 - 0)
        for s in scores {
            assert_abs_diff_eq!(s, 0.2, epsilon = 1e-12);
        }
    }

    #[test]
    fn labels_follow_score_order() {
        let batch = [
            sig(20_000.0, 0.10, 0.45),
            sig(5_000.0, 0.80, 0.10),
            sig(12_000.0, 0.45, 0.28),
            sig(19_500.0, 0.12, 0.44),
            sig(5_200.0, 0.78, 0.11),
            sig(12_300.0, 0.44, 0.27),
        ];
        let typing =
            classify_unsupervised(&batch, &FastballWeights::default(), &KMeans1d::default())
                .unwrap();
        use PitchType::*;
        assert_eq!(
            typing.labels,
            vec![Fastball, Curveball, Changeup, Fastball, Curveball, Changeup]
        );
        assert!(typing.clustering.converged);
    }

    #[test]
    fn empty_batch_is_an_error() {
        let err = classify_unsupervised(&[], &FastballWeights::default(), &KMeans1d::default())
            .unwrap_err();
        assert_eq!(err, ClassifierError::EmptyBatch);
    }
}
