use serde::{Deserialize, Serialize};

use crate::{
    AcousticFeatures, CallConfidence, GlovePopEvent, UmpireCall, UmpireCallResult, VideoFeatureMap,
};

pub fn round_to(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// One human-readable row per pitch. Ratios carry 1 decimal, seconds carry
/// 3 decimals, milliseconds are whole numbers.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PitchReport {
    pub id: String,
    pub pop_found: bool,
    pub pop_time_s: Option<f64>,
    pub pop_amplitude: Option<f64>,
    pub rise_ratio: Option<f64>,
    pub call: Option<UmpireCall>,
    pub confidence: Option<CallConfidence>,
    pub score: Option<u32>,
    pub peak_ratio: Option<f64>,
    pub p75_ratio: Option<f64>,
    pub mean_ratio: Option<f64>,
    pub sustained_ms: Option<f64>,
    pub available_s: Option<f64>,
    pub peak_amp: Option<f64>,
    pub decay_ratio: Option<f64>,
    pub zcr: Option<u32>,
    pub video_features: usize,
    pub pitch_type: Option<String>,
}

impl PitchReport {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            pop_found: false,
            pop_time_s: None,
            pop_amplitude: None,
            rise_ratio: None,
            call: None,
            confidence: None,
            score: None,
            peak_ratio: None,
            p75_ratio: None,
            mean_ratio: None,
            sustained_ms: None,
            available_s: None,
            peak_amp: None,
            decay_ratio: None,
            zcr: None,
            video_features: 0,
            pitch_type: None,
        }
    }

    pub fn with_pop(mut self, pop: &GlovePopEvent) -> Self {
        self.pop_found = true;
        self.pop_time_s = Some(round_to(pop.time_seconds, 3));
        self.pop_amplitude = Some(round_to(pop.amplitude, 1));
        self.rise_ratio = Some(round_to(pop.rise_ratio, 1));
        self
    }

    pub fn with_call(mut self, result: &UmpireCallResult) -> Self {
        self.call = Some(result.call);
        self.confidence = Some(result.confidence);
        self.score = Some(result.score);
        self.peak_ratio = Some(round_to(result.peak_ratio, 1));
        self.p75_ratio = Some(round_to(result.p75_ratio, 1));
        self.mean_ratio = Some(round_to(result.mean_ratio, 1));
        self.sustained_ms = Some(round_to(result.sustained_ms, 0));
        self.available_s = Some(round_to(result.available_s, 3));
        self
    }

    pub fn with_acoustic(mut self, features: &AcousticFeatures) -> Self {
        self.peak_amp = Some(round_to(features.peak_amp, 1));
        self.decay_ratio = Some(round_to(features.decay_ratio, 3));
        self.zcr = Some(features.zcr);
        self
    }

    pub fn with_video(mut self, features: &VideoFeatureMap) -> Self {
        self.video_features = features.len();
        self
    }

    pub fn with_pitch_type(mut self, label: impl Into<String>) -> Self {
        self.pitch_type = Some(label.into());
        self
    }
}
