//! Ball/strike scoring from the energy the umpire's call adds after the pop.
//!
//! The scorer is a fixed additive rule set rather than a trained model: each
//! post-pop statistic is compared against a tier table and the points are
//! summed. All breakpoints live in [`ScoringTable`] and [`DecisionPolicy`].

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use pitchcall_domain::samples::seconds_to_samples;
use pitchcall_domain::{CallConfidence, SampleBuffer, UmpireCall, UmpireCallResult};

use crate::dsp::{frame_rms, mean, median, percentile};
use crate::error::AudioError;

/// Lowest baseline used for ratios, in sample units. Keeps ratios finite on
/// digitally silent lead-ins.
const MIN_BASELINE: f64 = 1.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScoreTier {
    /// The metric must be strictly greater than this.
    pub above: f64,
    pub points: u32,
}

impl ScoreTier {
    pub const fn new(above: f64, points: u32) -> Self {
        Self { above, points }
    }
}

/// Tiered points per metric. A metric earns the points of the highest tier
/// it clears.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringTable {
    pub peak_ratio: Vec<ScoreTier>,
    pub p75_ratio: Vec<ScoreTier>,
    pub mean_ratio: Vec<ScoreTier>,
    pub sustained_ms: Vec<ScoreTier>,
}

impl Default for ScoringTable {
    fn default() -> Self {
        Self {
            peak_ratio: vec![
                ScoreTier::new(8.0, 3),
                ScoreTier::new(4.0, 2),
                ScoreTier::new(2.5, 1),
            ],
            p75_ratio: vec![ScoreTier::new(3.0, 2), ScoreTier::new(1.8, 1)],
            mean_ratio: vec![ScoreTier::new(2.5, 2), ScoreTier::new(1.5, 1)],
            sustained_ms: vec![ScoreTier::new(200.0, 2), ScoreTier::new(80.0, 1)],
        }
    }
}

impl ScoringTable {
    pub fn points(tiers: &[ScoreTier], value: f64) -> u32 {
        tiers
            .iter()
            .filter(|tier| value > tier.above)
            .map(|tier| tier.points)
            .max()
            .unwrap_or(0)
    }

    pub fn score(&self, stats: &PostPopStats) -> u32 {
        Self::points(&self.peak_ratio, stats.peak_ratio)
            + Self::points(&self.p75_ratio, stats.p75_ratio)
            + Self::points(&self.mean_ratio, stats.mean_ratio)
            + Self::points(&self.sustained_ms, stats.sustained_ms)
    }
}

/// Maps a score and the amount of post-pop audio onto a call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DecisionPolicy {
    pub strike_high_score: u32,
    pub strike_medium_score: u32,
    /// Below this much post-pop audio a low score is not trusted.
    pub short_clip_s: f64,
    pub lenient_peak_ratio: f64,
    pub lenient_sustained_ms: f64,
    /// Post-pop audio needed for a high-confidence ball.
    pub confident_ball_s: f64,
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            strike_high_score: 4,
            strike_medium_score: 2,
            short_clip_s: 0.5,
            lenient_peak_ratio: 1.8,
            lenient_sustained_ms: 40.0,
            confident_ball_s: 0.8,
        }
    }
}

impl DecisionPolicy {
    pub fn decide(&self, score: u32, stats: &PostPopStats, available_s: f64) -> (UmpireCall, CallConfidence) {
        if score >= self.strike_high_score {
            (UmpireCall::Strike, CallConfidence::High)
        } else if score >= self.strike_medium_score {
            (UmpireCall::Strike, CallConfidence::Medium)
        } else if available_s < self.short_clip_s {
            if stats.peak_ratio > self.lenient_peak_ratio
                || stats.sustained_ms > self.lenient_sustained_ms
            {
                (UmpireCall::Strike, CallConfidence::Low)
            } else {
                (UmpireCall::Ball, CallConfidence::Low)
            }
        } else if available_s >= self.confident_ball_s {
            (UmpireCall::Ball, CallConfidence::High)
        } else {
            (UmpireCall::Ball, CallConfidence::Medium)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UmpireConfig {
    pub frame_ms: f64,
    pub hop_ms: f64,
    /// Baseline window, seconds before the pop (start is further back).
    pub baseline_start_s: f64,
    pub baseline_end_s: f64,
    /// Reaction window, seconds after the pop.
    pub reaction_start_s: f64,
    pub reaction_end_s: f64,
    /// Baseline used when no pre-pop frame exists.
    pub default_baseline: f64,
    /// Frames above `sustain_factor × baseline` count toward `sustained_ms`.
    pub sustain_factor: f64,
    pub scoring: ScoringTable,
    pub policy: DecisionPolicy,
}

impl Default for UmpireConfig {
    fn default() -> Self {
        Self {
            frame_ms: 20.0,
            hop_ms: 10.0,
            baseline_start_s: 1.0,
            baseline_end_s: 0.3,
            reaction_start_s: 0.15,
            reaction_end_s: 3.0,
            default_baseline: 200.0,
            sustain_factor: 1.3,
            scoring: ScoringTable::default(),
            policy: DecisionPolicy::default(),
        }
    }
}

/// Post-pop energy statistics relative to the pre-pop baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostPopStats {
    pub baseline: f64,
    pub post_max: f64,
    pub peak_ratio: f64,
    pub p75_ratio: f64,
    pub mean_ratio: f64,
    pub sustained_ms: f64,
}

#[derive(Debug, Clone, Default)]
pub struct UmpireCallScorer {
    config: UmpireConfig,
}

impl UmpireCallScorer {
    pub fn new(config: UmpireConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &UmpireConfig {
        &self.config
    }

    #[instrument(skip(self, buffer), fields(samples = buffer.len()))]
    pub fn score(&self, buffer: &SampleBuffer, pop_index: usize) -> Result<UmpireCallResult, AudioError> {
        let n = buffer.len();
        if n == 0 {
            return Err(AudioError::EmptyBuffer);
        }
        if pop_index >= n {
            return Err(AudioError::PopOutOfRange {
                index: pop_index,
                len: n,
            });
        }

        let rate = buffer.sample_rate();
        let cfg = &self.config;
        let available_s = buffer.seconds_at(n - pop_index);
        let post_start = pop_index + seconds_to_samples(rate, cfg.reaction_start_s);
        let post_end = (pop_index + seconds_to_samples(rate, cfg.reaction_end_s)).min(n);
        if post_start >= post_end {
            debug!(available_s, "no audio after pop");
            return Ok(UmpireCallResult::no_evidence(available_s));
        }

        let frame = seconds_to_samples(rate, cfg.frame_ms / 1000.0).max(1);
        let hop = seconds_to_samples(rate, cfg.hop_ms / 1000.0).max(1);
        let pre_start = pop_index.saturating_sub(seconds_to_samples(rate, cfg.baseline_start_s));
        let pre_end = pop_index.saturating_sub(seconds_to_samples(rate, cfg.baseline_end_s));

        let pre = frame_rms(buffer.samples(), pre_start, pre_end, frame, hop);
        let post = frame_rms(buffer.samples(), post_start, post_end, frame, hop);
        let baseline = median(&pre)
            .unwrap_or(cfg.default_baseline)
            .max(MIN_BASELINE);

        let stats = self.post_pop_stats(&post, baseline, buffer.seconds_at(hop) * 1000.0);
        let score = cfg.scoring.score(&stats);
        let (call, confidence) = cfg.policy.decide(score, &stats, available_s);
        debug!(
            baseline,
            peak_ratio = stats.peak_ratio,
            p75_ratio = stats.p75_ratio,
            mean_ratio = stats.mean_ratio,
            sustained_ms = stats.sustained_ms,
            score,
            "umpire call scored"
        );

        Ok(UmpireCallResult {
            call,
            confidence,
            score,
            peak_ratio: stats.peak_ratio,
            p75_ratio: stats.p75_ratio,
            mean_ratio: stats.mean_ratio,
            sustained_ms: stats.sustained_ms,
            available_s,
            baseline,
            post_max: stats.post_max,
        })
    }

    fn post_pop_stats(&self, post: &[f64], baseline: f64, hop_ms: f64) -> PostPopStats {
        let post_max = post.iter().copied().fold(0.0, f64::max);
        let p75 = percentile(post, 75.0).unwrap_or(0.0);
        let sustain_level = self.config.sustain_factor * baseline;

        let mut longest = 0usize;
        let mut run = 0usize;
        for &value in post {
            if value > sustain_level {
                run += 1;
                longest = longest.max(run);
            } else {
                run = 0;
            }
        }

        PostPopStats {
            baseline,
            post_max,
            peak_ratio: post_max / baseline,
            p75_ratio: p75 / baseline,
            mean_ratio: mean(post) / baseline,
            sustained_ms: longest as f64 * hop_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const RATE: usize = 44_100;

    fn flat(len: usize, level: i16) -> Vec<i16> {
        (0..len).map(|i| if i % 2 == 0 { level } else { -level }).collect()
    }

    fn fill(samples: &mut [i16], from_s: f64, to_s: f64, level: i16) {
        let from = (from_s * RATE as f64) as usize;
        let to = ((to_s * RATE as f64) as usize).min(samples.len());
        for (i, sample) in samples.iter_mut().enumerate().take(to).skip(from) {
            *sample = if i % 2 == 0 { level } else { -level };
        }
    }

    #[test]
    fn sustained_reaction_is_high_confidence_strike() {
        let mut samples = flat(4 * RATE, 1000);
        let pop = (1.5 * RATE as f64) as usize;
        fill(&mut samples, 1.65, 2.15, 10_000);
        let buffer = SampleBuffer::at_default_rate(samples);

        let result = UmpireCallScorer::default().score(&buffer, pop).unwrap();
        assert_eq!(result.call, UmpireCall::Strike);
        assert_eq!(result.confidence, CallConfidence::High);
        assert!(result.score >= 4);
        assert_abs_diff_eq!(result.baseline, 1000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.peak_ratio, 10.0, epsilon = 1e-9);
        assert!(result.sustained_ms > 200.0);
        assert_abs_diff_eq!(result.available_s, 2.5, epsilon = 1e-9);
    }

    #[test]
    fn flat_energy_is_ball() {
        let buffer = SampleBuffer::at_default_rate(flat(4 * RATE, 1000));
        let result = UmpireCallScorer::default()
            .score(&buffer, (1.5 * RATE as f64) as usize)
            .unwrap();
        assert_eq!(result.call, UmpireCall::Ball);
        assert_eq!(result.confidence, CallConfidence::High);
        assert_eq!(result.score, 0);
        assert_eq!(result.sustained_ms, 0.0);
    }

    #[test]
    fn pop_at_clip_end_has_no_evidence() {
        let buffer = SampleBuffer::at_default_rate(flat(2 * RATE, 1000));
        let result = UmpireCallScorer::default()
            .score(&buffer, 2 * RATE - 1)
            .unwrap();
        assert_eq!(result.call, UmpireCall::Ball);
        assert_eq!(result.confidence, CallConfidence::None);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn short_tail_uses_lenient_test() {
        // pop at 1.5 s in a 1.8 s clip leaves 0.3 s after it
        let len = (1.8 * RATE as f64) as usize;
        let pop = (1.5 * RATE as f64) as usize;
        let buffer = SampleBuffer::at_default_rate(flat(len, 1000));
        let quiet = UmpireCallScorer::default().score(&buffer, pop).unwrap();
        assert_eq!(quiet.call, UmpireCall::Ball);
        assert_eq!(quiet.confidence, CallConfidence::Low);

        let mut samples = flat(len, 1000);
        fill(&mut samples, 1.65, 1.68, 2000);
        let buffer = SampleBuffer::at_default_rate(samples);
        let blip = UmpireCallScorer::default().score(&buffer, pop).unwrap();
        assert!(blip.score < 2, "score {}", blip.score);
        assert_eq!(blip.call, UmpireCall::Strike);
        assert_eq!(blip.confidence, CallConfidence::Low);
    }

    #[test]
    fn pop_near_start_uses_default_baseline() {
        let buffer = SampleBuffer::at_default_rate(flat(2 * RATE, 200));
        let result = UmpireCallScorer::default()
            .score(&buffer, (0.2 * RATE as f64) as usize)
            .unwrap();
        assert_eq!(result.baseline, 200.0);
        assert_abs_diff_eq!(result.peak_ratio, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn rejects_degenerate_inputs() {
        let scorer = UmpireCallScorer::default();
        let empty = SampleBuffer::at_default_rate(Vec::new());
        assert!(matches!(scorer.score(&empty, 0), Err(AudioError::EmptyBuffer)));
        let buffer = SampleBuffer::at_default_rate(vec![0; 10]);
        assert!(matches!(
            scorer.score(&buffer, 10),
            Err(AudioError::PopOutOfRange { index: 10, len: 10 })
        ));
    }

    #[test]
    fn tier_points_take_highest_cleared_tier() {
        let table = ScoringTable::default();
        assert_eq!(ScoringTable::points(&table.peak_ratio, 9.0), 3);
        assert_eq!(ScoringTable::points(&table.peak_ratio, 4.5), 2);
        assert_eq!(ScoringTable::points(&table.peak_ratio, 2.5), 0);
        let maxed = PostPopStats {
            baseline: 1.0,
            post_max: 100.0,
            peak_ratio: 100.0,
            p75_ratio: 100.0,
            mean_ratio: 100.0,
            sustained_ms: 1000.0,
        };
        assert_eq!(table.score(&maxed), 9);
    }

    #[test]
    fn decision_policy_branches() {
        let quiet = PostPopStats {
            baseline: 1000.0,
            post_max: 1000.0,
            peak_ratio: 1.0,
            p75_ratio: 1.0,
            mean_ratio: 1.0,
            sustained_ms: 0.0,
        };
        let loud_blip = PostPopStats {
            peak_ratio: 2.0,
            ..quiet
        };
        let policy = DecisionPolicy::default();
        let cases = [
            (5, quiet, 2.0, UmpireCall::Strike, CallConfidence::High),
            (4, quiet, 2.0, UmpireCall::Strike, CallConfidence::High),
            (3, quiet, 2.0, UmpireCall::Strike, CallConfidence::Medium),
            (2, quiet, 0.1, UmpireCall::Strike, CallConfidence::Medium),
            (1, loud_blip, 0.3, UmpireCall::Strike, CallConfidence::Low),
            (1, quiet, 0.3, UmpireCall::Ball, CallConfidence::Low),
            (0, loud_blip, 0.5, UmpireCall::Ball, CallConfidence::Medium),
            (0, quiet, 0.79, UmpireCall::Ball, CallConfidence::Medium),
            (0, quiet, 0.8, UmpireCall::Ball, CallConfidence::High),
            (1, quiet, 3.0, UmpireCall::Ball, CallConfidence::High),
        ];
        for (score, stats, available_s, call, confidence) in cases {
            assert_eq!(
                policy.decide(score, &stats, available_s),
                (call, confidence),
                "score {score}, available {available_s}"
            );
        }
    }
}
