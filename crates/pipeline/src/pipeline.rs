use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use pitchcall_audio::{acoustic_features, analyze_pop_signature, GlovePopDetector, UmpireCallScorer};
use pitchcall_domain::{
    fuse_features, AcousticFeatures, FeatureVector, GlovePopEvent, PitchReport, PopSignature,
    SampleBuffer, UmpireCallResult, VideoFeatureMap,
};
use pitchcall_video::VideoMotionExtractor;

use crate::config::AnalysisConfig;
use crate::frames::{FrameProvider, NoFrames};

/// One pitch: its audio and, optionally, access to its video frames.
pub struct PitchClip {
    pub id: String,
    pub samples: SampleBuffer,
    pub frames: Box<dyn FrameProvider>,
}

impl PitchClip {
    pub fn new(id: impl Into<String>, samples: SampleBuffer) -> Self {
        Self {
            id: id.into(),
            samples,
            frames: Box::new(NoFrames),
        }
    }

    pub fn with_frames(mut self, frames: impl FrameProvider + 'static) -> Self {
        self.frames = Box::new(frames);
        self
    }
}

/// Everything measured for one pitch. All stages after pop detection are
/// absent when no pop was found.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PitchAnalysis {
    pub id: String,
    pub pop: Option<GlovePopEvent>,
    pub call: Option<UmpireCallResult>,
    pub acoustic: Option<AcousticFeatures>,
    pub signature: Option<PopSignature>,
    pub video: VideoFeatureMap,
}

impl PitchAnalysis {
    fn without_pop(id: &str) -> Self {
        Self {
            id: id.to_string(),
            pop: None,
            call: None,
            acoustic: None,
            signature: None,
            video: VideoFeatureMap::new(),
        }
    }

    /// Acoustic and video features merged under their flat keys.
    pub fn features(&self) -> FeatureVector {
        fuse_features(self.acoustic.as_ref(), &self.video)
    }

    pub fn report(&self, pitch_type: Option<&str>) -> PitchReport {
        let mut report = PitchReport::new(self.id.clone()).with_video(&self.video);
        if let Some(pop) = &self.pop {
            report = report.with_pop(pop);
        }
        if let Some(call) = &self.call {
            report = report.with_call(call);
        }
        if let Some(acoustic) = &self.acoustic {
            report = report.with_acoustic(acoustic);
        }
        if let Some(label) = pitch_type {
            report = report.with_pitch_type(label);
        }
        report
    }
}

/// Runs envelope → pop → call → features for single clips.
#[derive(Debug, Clone, Default)]
pub struct PitchAnalyzer {
    detector: GlovePopDetector,
    scorer: UmpireCallScorer,
    video: VideoMotionExtractor,
}

impl PitchAnalyzer {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            detector: GlovePopDetector::new(config.pop.clone()),
            scorer: UmpireCallScorer::new(config.umpire.clone()),
            video: VideoMotionExtractor::new(config.video.clone()),
        }
    }

    #[instrument(skip(self, clip), fields(id = %clip.id))]
    pub fn analyze(&self, clip: &PitchClip) -> Result<PitchAnalysis> {
        let samples = &clip.samples;
        let Some(pop) = self.detector.detect(samples) else {
            info!("no glove pop found");
            return Ok(PitchAnalysis::without_pop(&clip.id));
        };

        let call = self
            .scorer
            .score(samples, pop.sample_index)
            .with_context(|| format!("scoring call for {}", clip.id))?;
        let acoustic = acoustic_features(samples, pop.sample_index)
            .with_context(|| format!("acoustic features for {}", clip.id))?;
        let signature = analyze_pop_signature(samples, pop.sample_index)
            .with_context(|| format!("pop signature for {}", clip.id))?;
        let video = self.video_features(clip, pop.time_seconds);

        info!(
            pop_s = pop.time_seconds,
            call = %call.call,
            confidence = %call.confidence,
            score = call.score,
            video_keys = video.len(),
            "pitch analyzed"
        );
        Ok(PitchAnalysis {
            id: clip.id.clone(),
            pop: Some(pop),
            call: Some(call),
            acoustic: Some(acoustic),
            signature: Some(signature),
            video,
        })
    }

    /// Video never fails the pitch; problems leave the map empty.
    fn video_features(&self, clip: &PitchClip, pop_s: f64) -> VideoFeatureMap {
        let config = self.video.config();
        let start = (pop_s - config.pre_pop_s).max(0.0);
        let duration = pop_s + config.post_pop_s - start;
        let window = match clip.frames.frames(start, duration) {
            Ok(window) => window,
            Err(err) => {
                warn!(id = %clip.id, error = %err, "frames unavailable");
                return VideoFeatureMap::new();
            }
        };
        if window.frames.is_empty() {
            return VideoFeatureMap::new();
        }
        match self.video.extract(&window.frames, pop_s - window.first_frame_s) {
            Ok(features) => features,
            Err(err) => {
                warn!(id = %clip.id, error = %err, "video features skipped");
                VideoFeatureMap::new()
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::frames::FrameWindow;
    use approx::assert_abs_diff_eq;
    use pitchcall_domain::UmpireCall;
    use pitchcall_video::RgbFrame;

    pub(crate) const RATE: usize = 44_100;

    fn fill(samples: &mut [i16], from_s: f64, to_s: f64, level: i16) {
        let from = (from_s * RATE as f64) as usize;
        let to = ((to_s * RATE as f64) as usize).min(samples.len());
        for (i, sample) in samples.iter_mut().enumerate().take(to).skip(from) {
            *sample = if i % 2 == 0 { level } else { -level };
        }
    }

    /// Flat ±1000 clip with a 3 ms pop at 1.5 s. `reaction` adds loud
    /// post-pop energy from 1.65 to 2.15 s.
    pub(crate) fn clip_samples(pop_level: i16, reaction: bool) -> SampleBuffer {
        let mut samples = vec![0i16; 4 * RATE];
        fill(&mut samples, 0.0, 4.0, 1000);
        fill(&mut samples, 1.5, 1.503, pop_level);
        if reaction {
            fill(&mut samples, 1.65, 2.15, 10_000);
        }
        SampleBuffer::at_default_rate(samples)
    }

    struct StaticFrames;

    impl FrameProvider for StaticFrames {
        fn frames(&self, start_s: f64, duration_s: f64) -> Result<FrameWindow> {
            let count = (duration_s * 30.0).round() as usize;
            Ok(FrameWindow {
                first_frame_s: start_s,
                frames: vec![RgbFrame::filled(32, 24, (90, 90, 90)); count],
            })
        }
    }

    struct BrokenFrames;

    impl FrameProvider for BrokenFrames {
        fn frames(&self, _start_s: f64, _duration_s: f64) -> Result<FrameWindow> {
            anyhow::bail!("decoder exited")
        }
    }

    #[test]
    fn loud_reaction_is_called_strike() {
        let clip = PitchClip::new("p1", clip_samples(24_000, true));
        let analysis = PitchAnalyzer::default().analyze(&clip).unwrap();
        let pop = analysis.pop.unwrap();
        assert_abs_diff_eq!(pop.time_seconds, 1.5, epsilon = 0.005);
        assert_eq!(analysis.call.unwrap().call, UmpireCall::Strike);
        assert!(analysis.acoustic.is_some());
        assert!(analysis.signature.is_some());
        assert!(analysis.video.is_empty());

        let features = analysis.features();
        assert!(features.contains_key("peakAmp"));
        let report = analysis.report(Some("Fastball"));
        assert!(report.pop_found);
        assert_eq!(report.pitch_type.as_deref(), Some("Fastball"));
    }

    #[test]
    fn quiet_clip_has_no_pop() {
        let clip = PitchClip::new("quiet", SampleBuffer::at_default_rate(vec![0; RATE]));
        let analysis = PitchAnalyzer::default().analyze(&clip).unwrap();
        assert!(analysis.pop.is_none());
        assert!(analysis.call.is_none());
        assert!(!analysis.report(None).pop_found);
    }

    #[test]
    fn frames_feed_video_features() {
        let clip = PitchClip::new("v", clip_samples(24_000, false)).with_frames(StaticFrames);
        let analysis = PitchAnalyzer::default().analyze(&clip).unwrap();
        assert!(analysis.video.get("edgeDensityAtPop").is_some());
        assert!(analysis.features().contains_key("edgeDensityPrePop"));
    }

    #[test]
    fn broken_frames_degrade_to_audio_only() {
        let clip = PitchClip::new("b", clip_samples(24_000, true)).with_frames(BrokenFrames);
        let analysis = PitchAnalyzer::default().analyze(&clip).unwrap();
        assert!(analysis.video.is_empty());
        assert_eq!(analysis.call.unwrap().call, UmpireCall::Strike);
    }
}
