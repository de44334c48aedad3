use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Named feature values for one pitch. Keys follow the camelCase names used
/// in reports (`peakAmp`, `center_lateFlight`, ...).
pub type FeatureVector = BTreeMap<String, f64>;

pub const PEAK_AMP: &str = "peakAmp";
pub const DECAY_RATIO: &str = "decayRatio";
pub const ZCR: &str = "zcr";

/// Descriptors in a short window around the pop, used by the supervised path.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AcousticFeatures {
    /// Max |sample| within ±5 ms of the pop.
    pub peak_amp: f64,
    /// Energy 10–30 ms after the pop over energy within ±5 ms.
    pub decay_ratio: f64,
    /// Sign changes within ±10 ms of the pop.
    pub zcr: u32,
}

impl AcousticFeatures {
    pub fn to_feature_vector(&self) -> FeatureVector {
        let mut vector = FeatureVector::new();
        vector.insert(PEAK_AMP.to_string(), self.peak_amp);
        vector.insert(DECAY_RATIO.to_string(), self.decay_ratio);
        vector.insert(ZCR.to_string(), f64::from(self.zcr));
        vector
    }
}

/// Descriptors consumed by the unsupervised fastball score. Windows differ
/// from [`AcousticFeatures`]: ±5 ms pop window, 5–50 ms decay window.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PopSignature {
    pub peak_abs: f64,
    pub rms: f64,
    pub decay_ratio: f64,
    /// Sign changes per sample inside the pop window.
    pub zc_rate: f64,
}

/// Open-ended `{zone}_{metric}` map of video descriptors. A key is present
/// only when the motion data behind it existed.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct VideoFeatureMap(BTreeMap<String, f64>);

impl VideoFeatureMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(zone: &str, metric: &str) -> String {
        format!("{zone}_{metric}")
    }

    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        self.0.insert(key.into(), value);
    }

    pub fn insert_zone(&mut self, zone: &str, metric: &str, value: f64) {
        self.0.insert(Self::key(zone, metric), value);
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    pub fn get_zone(&self, zone: &str, metric: &str) -> Option<f64> {
        self.get(&Self::key(zone, metric))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(key, value)| (key.as_str(), *value))
    }
}

impl From<VideoFeatureMap> for FeatureVector {
    fn from(map: VideoFeatureMap) -> Self {
        map.0
    }
}

/// Merges acoustic and video descriptors into one vector for the k-NN stage.
pub fn fuse_features(acoustic: Option<&AcousticFeatures>, video: &VideoFeatureMap) -> FeatureVector {
    let mut vector = acoustic
        .map(AcousticFeatures::to_feature_vector)
        .unwrap_or_default();
    for (key, value) in video.iter() {
        vector.insert(key.to_string(), value);
    }
    vector
}
