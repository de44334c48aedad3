//! Deterministic one-dimensional k-means with three clusters.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ClassifierError;

pub const DEFAULT_SEED_PERCENTILES: [f64; 3] = [0.2, 0.5, 0.8];
pub const DEFAULT_MAX_ITERATIONS: usize = 50;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct KMeansFit {
    pub centroids: Vec<f64>,
    /// Cluster index per input value, in input order.
    pub assignments: Vec<usize>,
    pub iterations: usize,
    pub converged: bool,
}

impl KMeansFit {
    /// Rank of each cluster when centroids are sorted descending. Equal
    /// centroids keep cluster order.
    pub fn descending_ranks(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.centroids.len()).collect();
        order.sort_by(|&a, &b| self.centroids[b].total_cmp(&self.centroids[a]));
        let mut ranks = vec![0; order.len()];
        for (rank, cluster) in order.into_iter().enumerate() {
            ranks[cluster] = rank;
        }
        ranks
    }
}

/// Seeds one centroid per percentile of the sorted input, so the same
/// input always clusters the same way.
#[derive(Clone, Debug)]
pub struct KMeans1d {
    seed_percentiles: [f64; 3],
    max_iterations: usize,
}

impl Default for KMeans1d {
    fn default() -> Self {
        Self::new(DEFAULT_SEED_PERCENTILES, DEFAULT_MAX_ITERATIONS)
    }
}

impl KMeans1d {
    pub fn new(seed_percentiles: [f64; 3], max_iterations: usize) -> Self {
        Self {
            seed_percentiles,
            max_iterations,
        }
    }

    pub fn fit(&self, values: &[f64]) -> Result<KMeansFit, ClassifierError> {
        if values.is_empty() {
            return Err(ClassifierError::EmptyBatch);
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let last = sorted.len() - 1;
        let mut centroids: Vec<f64> = self
            .seed_percentiles
            .iter()
            .map(|p| sorted[((p * sorted.len() as f64) as usize).min(last)])
            .collect();

        let mut assignments = vec![0; values.len()];
        let mut iterations = 0;
        let mut converged = false;
        while iterations < self.max_iterations {
            iterations += 1;
            for (slot, &value) in assignments.iter_mut().zip(values) {
                *slot = nearest(&centroids, value);
            }
            let updated = recompute(&centroids, &assignments, values);
            if updated == centroids {
                converged = true;
                break;
            }
            centroids = updated;
        }
        debug!(iterations, converged, ?centroids, "k-means finished");

        Ok(KMeansFit {
            centroids,
            assignments,
            iterations,
            converged,
        })
    }
}

fn nearest(centroids: &[f64], value: f64) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (index, centroid) in centroids.iter().enumerate() {
        let distance = (value - centroid).abs();
        if distance < best_distance {
            best = index;
            best_distance = distance;
        }
    }
    best
}

/// Cluster means; an empty cluster keeps its previous centroid.
fn recompute(previous: &[f64], assignments: &[usize], values: &[f64]) -> Vec<f64> {
    let mut sums = vec![0.0; previous.len()];
    let mut counts = vec![0usize; previous.len()];
    for (&cluster, &value) in assignments.iter().zip(values) {
        sums[cluster] += value;
        counts[cluster] += 1;
    }
    previous
        .iter()
        .zip(sums.iter().zip(&counts))
        .map(|(&old, (&sum, &count))| if count == 0 { old } else { sum / count as f64 })
        .collect()
}
