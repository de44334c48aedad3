use std::fmt;

use serde::{Deserialize, Serialize};

/// The single most probable glove-pop instant in a clip.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GlovePopEvent {
    pub sample_index: usize,
    pub time_seconds: f64,
    /// Envelope value at `sample_index`.
    pub amplitude: f64,
    /// Envelope at the pop over envelope 5 ms earlier (plus one).
    pub rise_ratio: f64,
}

impl GlovePopEvent {
    /// Ranking key used to pick between candidates.
    pub fn salience(&self) -> f64 {
        self.amplitude * self.rise_ratio
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum UmpireCall {
    Strike,
    Ball,
}

impl fmt::Display for UmpireCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UmpireCall::Strike => f.write_str("Strike"),
            UmpireCall::Ball => f.write_str("Ball"),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum CallConfidence {
    None,
    Low,
    Medium,
    High,
}

impl fmt::Display for CallConfidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            CallConfidence::None => "none",
            CallConfidence::Low => "low",
            CallConfidence::Medium => "medium",
            CallConfidence::High => "high",
        };
        f.write_str(text)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UmpireCallResult {
    pub call: UmpireCall,
    pub confidence: CallConfidence,
    /// Additive rule score, 0..=9 with the default scoring table.
    pub score: u32,
    pub peak_ratio: f64,
    pub p75_ratio: f64,
    pub mean_ratio: f64,
    pub sustained_ms: f64,
    /// Seconds of audio remaining after the pop.
    pub available_s: f64,
    /// Median pre-pop frame RMS.
    pub baseline: f64,
    /// Maximum post-pop frame RMS.
    pub post_max: f64,
}

impl UmpireCallResult {
    /// Result for a pop with no usable audio after it.
    pub fn no_evidence(available_s: f64) -> Self {
        Self {
            call: UmpireCall::Ball,
            confidence: CallConfidence::None,
            score: 0,
            peak_ratio: 0.0,
            p75_ratio: 0.0,
            mean_ratio: 0.0,
            sustained_ms: 0.0,
            available_s,
            baseline: 0.0,
            post_max: 0.0,
        }
    }

    pub fn is_strike(&self) -> bool {
        self.call == UmpireCall::Strike
    }
}
