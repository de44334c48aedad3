use serde::{Deserialize, Serialize};

use pitchcall_domain::features::{DECAY_RATIO, PEAK_AMP, ZCR};

/// An ordered, named selection of feature keys.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeatureSet {
    pub name: String,
    pub features: Vec<String>,
}

impl FeatureSet {
    pub fn new<I, S>(name: impl Into<String>, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            features: features.into_iter().map(Into::into).collect(),
        }
    }

    pub fn acoustic() -> Self {
        Self::new("acoustic", [PEAK_AMP, DECAY_RATIO, ZCR])
    }

    pub fn video() -> Self {
        Self::new(
            "video",
            [
                "center_lateFlight",
                "center_flightAvg",
                "center_flightCV",
                "pitchLane_peakPos",
                "pitchLane_lateFlight",
                "catchZone_peakPos",
                "edgeDensityPrePop",
                "edgeDensityAtPop",
            ],
        )
    }

    /// Acoustic and video features together.
    pub fn fusion() -> Self {
        let mut features = Self::acoustic().features;
        features.extend(Self::video().features);
        Self {
            name: "fusion".to_string(),
            features,
        }
    }

    /// The sets swept during model selection.
    pub fn defaults() -> Vec<Self> {
        vec![Self::acoustic(), Self::video(), Self::fusion()]
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
