//! Per-pitch descriptors around the pop.
//!
//! Two extractors share a family of measurements but not their windows:
//! [`acoustic_features`] feeds the k-NN path and [`analyze_pop_signature`]
//! feeds the fastball score. Each keeps its own window definitions.

use std::ops::Range;

use pitchcall_domain::samples::seconds_to_samples;
use pitchcall_domain::{AcousticFeatures, PopSignature, SampleBuffer};

use crate::dsp::{energy, peak_abs, rms, zero_crossings};
use crate::error::AudioError;

const FEATURE_POP_HALF_MS: f64 = 5.0;
const FEATURE_DECAY_START_MS: f64 = 10.0;
const FEATURE_DECAY_END_MS: f64 = 30.0;
const FEATURE_ZCR_HALF_MS: f64 = 10.0;

const SIGNATURE_POP_HALF_MS: f64 = 5.0;
const SIGNATURE_DECAY_START_MS: f64 = 5.0;
const SIGNATURE_DECAY_END_MS: f64 = 50.0;

/// `peakAmp` and pop energy over ±5 ms, decay energy over 10–30 ms after the
/// pop, zero crossings over ±10 ms.
pub fn acoustic_features(buffer: &SampleBuffer, pop_index: usize) -> Result<AcousticFeatures, AudioError> {
    check_index(buffer, pop_index)?;
    let samples = buffer.samples();
    let pop = centered(buffer, pop_index, FEATURE_POP_HALF_MS);
    let decay = after(buffer, pop_index, FEATURE_DECAY_START_MS, FEATURE_DECAY_END_MS);
    let zcr = centered(buffer, pop_index, FEATURE_ZCR_HALF_MS);

    let pop_energy = energy(&samples[pop.clone()]);
    let decay_energy = energy(&samples[decay]);
    Ok(AcousticFeatures {
        peak_amp: peak_abs(&samples[pop]),
        decay_ratio: if pop_energy > 0.0 {
            decay_energy / pop_energy
        } else {
            0.0
        },
        zcr: zero_crossings(&samples[zcr]),
    })
}

/// `peakAbs`, `rms` and zero-crossing rate over ±5 ms; `decayRatio` is the
/// RMS 5–50 ms after the pop over the pop-window RMS.
pub fn analyze_pop_signature(buffer: &SampleBuffer, pop_index: usize) -> Result<PopSignature, AudioError> {
    check_index(buffer, pop_index)?;
    let samples = buffer.samples();
    let pop = &samples[centered(buffer, pop_index, SIGNATURE_POP_HALF_MS)];
    let decay = &samples[after(
        buffer,
        pop_index,
        SIGNATURE_DECAY_START_MS,
        SIGNATURE_DECAY_END_MS,
    )];

    let pop_rms = rms(pop);
    let zc_rate = if pop.len() > 1 {
        f64::from(zero_crossings(pop)) / (pop.len() - 1) as f64
    } else {
        0.0
    };
    Ok(PopSignature {
        peak_abs: peak_abs(pop),
        rms: pop_rms,
        decay_ratio: if pop_rms > 0.0 { rms(decay) / pop_rms } else { 0.0 },
        zc_rate,
    })
}

fn check_index(buffer: &SampleBuffer, pop_index: usize) -> Result<(), AudioError> {
    if buffer.is_empty() {
        return Err(AudioError::EmptyBuffer);
    }
    if pop_index >= buffer.len() {
        return Err(AudioError::PopOutOfRange {
            index: pop_index,
            len: buffer.len(),
        });
    }
    Ok(())
}

/// `[pop - half, pop + half]`, clamped to the clip.
fn centered(buffer: &SampleBuffer, pop_index: usize, half_ms: f64) -> Range<usize> {
    let half = seconds_to_samples(buffer.sample_rate(), half_ms / 1000.0);
    pop_index.saturating_sub(half)..(pop_index + half + 1).min(buffer.len())
}

/// `[pop + start, pop + end)`, clamped to the clip; empty past the end.
fn after(buffer: &SampleBuffer, pop_index: usize, start_ms: f64, end_ms: f64) -> Range<usize> {
    let rate = buffer.sample_rate();
    let start = (pop_index + seconds_to_samples(rate, start_ms / 1000.0)).min(buffer.len());
    let end = (pop_index + seconds_to_samples(rate, end_ms / 1000.0)).min(buffer.len());
    start..end.max(start)
}
