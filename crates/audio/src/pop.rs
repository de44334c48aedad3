use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use pitchcall_domain::samples::seconds_to_samples;
use pitchcall_domain::{GlovePopEvent, SampleBuffer};

use crate::dsp::median;
use crate::envelope::Envelope;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PopDetectorConfig {
    pub envelope_window_ms: f64,
    /// Candidates must be the envelope maximum within ± this window and at
    /// least this far from either clip edge.
    pub isolation_ms: f64,
    /// Multiple of the noise floor a candidate must exceed.
    pub threshold_factor: f64,
    /// Distance back from the candidate used for the rise ratio.
    pub rise_lookback_ms: f64,
    /// Fraction trimmed from each end before the noise-floor median.
    pub edge_trim: f64,
}

impl Default for PopDetectorConfig {
    fn default() -> Self {
        Self {
            envelope_window_ms: 2.0,
            isolation_ms: 50.0,
            threshold_factor: 4.0,
            rise_lookback_ms: 5.0,
            edge_trim: 0.1,
        }
    }
}

/// Finds the sharpest loud transient in a clip.
#[derive(Debug, Clone, Default)]
pub struct GlovePopDetector {
    config: PopDetectorConfig,
}

impl GlovePopDetector {
    pub fn new(config: PopDetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PopDetectorConfig {
        &self.config
    }

    /// Returns the best candidate, or `None` when nothing clears the
    /// threshold and isolation checks.
    #[instrument(skip(self, buffer), fields(samples = buffer.len()))]
    pub fn detect(&self, buffer: &SampleBuffer) -> Option<GlovePopEvent> {
        let best = self.candidates(buffer).into_iter().next();
        match &best {
            Some(pop) => debug!(
                index = pop.sample_index,
                amplitude = pop.amplitude,
                rise = pop.rise_ratio,
                "glove pop selected"
            ),
            None => debug!("no glove pop candidate"),
        }
        best
    }

    /// Every candidate, ranked by amplitude × rise ratio (descending). Equal
    /// scores keep clip order.
    pub fn candidates(&self, buffer: &SampleBuffer) -> Vec<GlovePopEvent> {
        let rate = buffer.sample_rate();
        let envelope = Envelope::extract(buffer.samples(), rate, self.config.envelope_window_ms);
        let values = envelope.values();
        let n = values.len();
        if n == 0 {
            return Vec::new();
        }

        let floor = self.noise_floor(values);
        let threshold = self.config.threshold_factor * floor;
        let isolation = seconds_to_samples(rate, self.config.isolation_ms / 1000.0);
        let lookback = seconds_to_samples(rate, self.config.rise_lookback_ms / 1000.0);
        debug!(floor, threshold, isolation, "pop thresholds");

        if n <= 2 * isolation {
            return Vec::new();
        }
        let leaders = window_leaders(values, isolation);

        let mut candidates: Vec<GlovePopEvent> = (isolation..n - isolation)
            // strict: an all-zero clip has threshold 0 and must not qualify
            .filter(|&i| values[i] > threshold && leaders[i])
            .map(|i| {
                let before = values[i.saturating_sub(lookback)];
                GlovePopEvent {
                    sample_index: i,
                    time_seconds: buffer.seconds_at(i),
                    amplitude: values[i],
                    rise_ratio: values[i] / (before + 1.0),
                }
            })
            .collect();
        candidates.sort_by(|a, b| b.salience().total_cmp(&a.salience()));
        candidates
    }

    /// Median envelope over the clip with the leading and trailing
    /// `edge_trim` fraction removed.
    fn noise_floor(&self, values: &[f64]) -> f64 {
        let trim = (values.len() as f64 * self.config.edge_trim.clamp(0.0, 0.49)) as usize;
        let middle = &values[trim..values.len() - trim];
        let middle = if middle.is_empty() { values } else { middle };
        median(middle).unwrap_or(0.0)
    }
}

/// `true` at `i` when `i` is the earliest index holding the maximum of
/// `values[i - radius ..= i + radius]` (clamped to the slice).
fn window_leaders(values: &[f64], radius: usize) -> Vec<bool> {
    let n = values.len();
    let mut leaders = vec![false; n];
    let mut window: VecDeque<usize> = VecDeque::new();
    let mut next = 0;
    for (i, leader) in leaders.iter_mut().enumerate() {
        let right = (i + radius).min(n - 1);
        while next <= right {
            while let Some(&back) = window.back() {
                if values[back] < values[next] {
                    window.pop_back();
                } else {
                    break;
                }
            }
            window.push_back(next);
            next += 1;
        }
        let left = i.saturating_sub(radius);
        while let Some(&front) = window.front() {
            if front < left {
                window.pop_front();
            } else {
                break;
            }
        }
        *leader = window.front() == Some(&i);
    }
    leaders
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 44_100;

    /// Low alternating hiss so the noise floor is non-zero.
    fn hiss(len: usize, level: i16) -> Vec<i16> {
        (0..len).map(|i| if i % 2 == 0 { level } else { -level }).collect()
    }

    /// Triangular-envelope burst of alternating sign centred on `center`.
    fn add_burst(samples: &mut [i16], center: usize, half_width: usize, peak: f64) {
        for offset in 0..=2 * half_width {
            let index = center + offset - half_width;
            let distance = (offset as f64 - half_width as f64).abs();
            let amplitude = peak * (1.0 - distance / half_width as f64);
            let sign = if index % 2 == 0 { 1.0 } else { -1.0 };
            samples[index] = (sign * amplitude) as i16;
        }
    }

    #[test]
    fn all_zero_buffer_has_no_pop() {
        let buffer = SampleBuffer::at_default_rate(vec![0; RATE as usize]);
        let detector = GlovePopDetector::default();
        assert!(detector.detect(&buffer).is_none());
        assert!(detector.candidates(&buffer).is_empty());
    }

    #[test]
    fn empty_and_tiny_buffers_have_no_pop() {
        let detector = GlovePopDetector::default();
        assert!(detector.detect(&SampleBuffer::at_default_rate(Vec::new())).is_none());
        let mut short = hiss(3000, 3);
        add_burst(&mut short, 1500, 110, 9000.0);
        assert!(detector.detect(&SampleBuffer::at_default_rate(short)).is_none());
    }

    #[test]
    fn finds_single_burst_center() {
        let mut samples = hiss(RATE as usize, 3);
        let center = 22_050;
        // 5 ms burst: 220 samples wide
        add_burst(&mut samples, center, 110, 10_000.0);
        let buffer = SampleBuffer::at_default_rate(samples);
        let pop = GlovePopDetector::default().detect(&buffer).expect("pop");
        let distance = (pop.sample_index as i64 - center as i64).abs();
        assert!(distance <= 110, "pop at {} vs {}", pop.sample_index, center);
        assert!(pop.amplitude > 4.0 * 3.0);
        assert!(pop.rise_ratio > 10.0);
        assert!((pop.time_seconds - buffer.seconds_at(pop.sample_index)).abs() < 1e-12);
    }

    #[test]
    fn burst_inside_edge_margin_is_ignored() {
        let mut samples = hiss(RATE as usize, 3);
        add_burst(&mut samples, 1000, 110, 10_000.0);
        let buffer = SampleBuffer::at_default_rate(samples);
        assert!(GlovePopDetector::default().detect(&buffer).is_none());
    }

    #[test]
    fn sharp_transient_beats_louder_sustained_noise() {
        let len = 2 * RATE as usize;
        let mut samples = hiss(len, 3);
        // crowd swell: 300 ms ramp to 4000, 200 ms hold, then silence
        let start = (0.3 * RATE as f64) as usize;
        let ramp = (0.3 * RATE as f64) as usize;
        let hold = (0.2 * RATE as f64) as usize;
        for k in 0..ramp + hold {
            let level = if k < ramp {
                4000.0 * k as f64 / ramp as f64
            } else {
                4000.0
            };
            let index = start + k;
            samples[index] = if index % 2 == 0 { level as i16 } else { -(level as i16) };
        }
        let transient = (1.5 * RATE as f64) as usize;
        add_burst(&mut samples, transient, 110, 3000.0);

        let buffer = SampleBuffer::at_default_rate(samples);
        let detector = GlovePopDetector::default();
        let candidates = detector.candidates(&buffer);
        assert!(candidates.len() >= 2);
        assert!(candidates
            .iter()
            .any(|c| c.amplitude > candidates[0].amplitude));
        let pop = &candidates[0];
        assert!((pop.sample_index as i64 - transient as i64).abs() <= 110);
    }

    #[test]
    fn leaders_pick_first_index_of_plateau() {
        let values = [0.0, 1.0, 5.0, 5.0, 5.0, 2.0, 0.0];
        let leaders = window_leaders(&values, 2);
        assert_eq!(
            leaders,
            vec![false, false, true, false, false, false, false]
        );
    }
}
