use ndarray::{Array1, Array2, ArrayView1, Axis};

use pitchcall_domain::FeatureVector;

use crate::feature_set::FeatureSet;

/// Lowest standard deviation a column is scaled by.
const MIN_STD: f64 = 1.0;

/// Gathers the selected features into a dense row; absent or non-finite
/// values become NaN.
pub fn feature_row(vector: &FeatureVector, set: &FeatureSet) -> Array1<f64> {
    set.features
        .iter()
        .map(|name| match vector.get(name) {
            Some(v) if v.is_finite() => *v,
            _ => f64::NAN,
        })
        .collect()
}

/// Per-feature z-score parameters fitted on a training matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct ZScoreNormalizer {
    mean: Array1<f64>,
    std: Array1<f64>,
}

impl ZScoreNormalizer {
    /// Mean and population standard deviation per column over its finite
    /// entries; the deviation is floored at 1.
    pub fn fit(rows: &Array2<f64>) -> Self {
        let columns = rows.ncols();
        let mut mean = Array1::zeros(columns);
        let mut std = Array1::from_elem(columns, MIN_STD);
        for (col, column) in rows.axis_iter(Axis(1)).enumerate() {
            let finite: Vec<f64> = column.iter().copied().filter(|v| v.is_finite()).collect();
            if finite.is_empty() {
                continue;
            }
            let m = finite.iter().sum::<f64>() / finite.len() as f64;
            let variance = finite.iter().map(|v| (v - m).powi(2)).sum::<f64>() / finite.len() as f64;
            mean[col] = m;
            std[col] = variance.sqrt().max(MIN_STD);
        }
        Self { mean, std }
    }

    /// Missing (NaN) entries normalize to 0, the column mean.
    pub fn transform(&self, row: ArrayView1<f64>) -> Array1<f64> {
        let mut out = Array1::zeros(row.len());
        for (i, &value) in row.iter().enumerate() {
            if value.is_finite() {
                out[i] = (value - self.mean[i]) / self.std[i];
            }
        }
        out
    }

    pub fn transform_all(&self, rows: &Array2<f64>) -> Array2<f64> {
        let mut out = Array2::zeros(rows.raw_dim());
        for (i, row) in rows.axis_iter(Axis(0)).enumerate() {
            out.row_mut(i).assign(&self.transform(row));
        }
        out
    }

    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn std(&self) -> &Array1<f64> {
        &self.std
    }
}
