use serde::{Deserialize, Serialize};

use crate::evaluation::DEFAULT_K_GRID;
use crate::fastball::FastballWeights;
use crate::feature_set::FeatureSet;
use crate::kmeans::{KMeans1d, DEFAULT_MAX_ITERATIONS, DEFAULT_SEED_PERCENTILES};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassifierConfig {
    /// k values swept by leave-one-out selection.
    pub k_grid: Vec<usize>,
    pub feature_sets: Vec<FeatureSet>,
    pub kmeans_seed_percentiles: [f64; 3],
    pub kmeans_iterations: usize,
    pub weights: FastballWeights,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            k_grid: DEFAULT_K_GRID.to_vec(),
            feature_sets: FeatureSet::defaults(),
            kmeans_seed_percentiles: DEFAULT_SEED_PERCENTILES,
            kmeans_iterations: DEFAULT_MAX_ITERATIONS,
            weights: FastballWeights::default(),
        }
    }
}

impl ClassifierConfig {
    pub fn kmeans(&self) -> KMeans1d {
        KMeans1d::new(self.kmeans_seed_percentiles, self.kmeans_iterations)
    }
}
