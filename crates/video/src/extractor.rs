use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use pitchcall_domain::VideoFeatureMap;

use crate::edge::edge_density;
use crate::error::VideoError;
use crate::frame::{GrayFrame, RgbFrame};
use crate::motion::{flight_stats, motion_timeline, peak_position};
use crate::zones::{default_zones, Zone};

pub const PEAK_POS: &str = "peakPos";
pub const LATE_FLIGHT: &str = "lateFlight";
pub const FLIGHT_AVG: &str = "flightAvg";
pub const FLIGHT_CV: &str = "flightCV";
pub const EDGE_DENSITY_PRE_POP: &str = "edgeDensityPrePop";
pub const EDGE_DENSITY_AT_POP: &str = "edgeDensityAtPop";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Capture rate of the supplied frames.
    pub fps: f64,
    /// Seconds before the pop the frame window starts.
    pub pre_pop_s: f64,
    /// Seconds after the pop the frame window ends.
    pub post_pop_s: f64,
    /// Per-pixel luma change treated as sensor noise.
    pub noise_threshold: f32,
    /// Timeline entries in the flight phase, ending just before the pop.
    pub flight_frames: usize,
    /// Frames before the pop used for the pre-pop edge density.
    pub edge_lookback_frames: usize,
    /// Shorter sequences produce an empty feature map.
    pub min_frames: usize,
    /// Zone the edge densities are measured over.
    pub edge_zone: String,
    pub zones: Vec<Zone>,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            fps: 30.0,
            pre_pop_s: 1.0,
            post_pop_s: 0.15,
            noise_threshold: 12.0,
            flight_frames: 16,
            edge_lookback_frames: 5,
            min_frames: 10,
            edge_zone: "center".to_string(),
            zones: default_zones(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct VideoMotionExtractor {
    config: VideoConfig,
}

impl VideoMotionExtractor {
    pub fn new(config: VideoConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VideoConfig {
        &self.config
    }

    /// Motion descriptors for a frame window; `pop_time_s` is measured from
    /// the first frame. Too few frames give an empty map.
    #[instrument(skip(self, frames), fields(frames = frames.len()))]
    pub fn extract(&self, frames: &[RgbFrame], pop_time_s: f64) -> Result<VideoFeatureMap, VideoError> {
        let mut features = VideoFeatureMap::new();
        if frames.len() < self.config.min_frames.max(2) {
            debug!("too few frames for motion features");
            return Ok(features);
        }
        check_dimensions(frames)?;

        let (width, height) = (frames[0].width, frames[0].height);
        let grays: Vec<GrayFrame> = frames.iter().map(GrayFrame::from_rgb).collect();
        let pop_frame = self.pop_frame(pop_time_s, grays.len());

        for zone in &self.config.zones {
            let rect = zone.to_pixels(width, height);
            let timeline = motion_timeline(&grays, rect, self.config.noise_threshold);
            let Some(peak) = peak_position(&timeline) else {
                continue;
            };
            features.insert_zone(&zone.name, PEAK_POS, peak);

            let end = pop_frame.min(timeline.len());
            let start = end.saturating_sub(self.config.flight_frames);
            if let Some(stats) = flight_stats(&timeline[start..end]) {
                features.insert_zone(&zone.name, LATE_FLIGHT, stats.late_flight);
                features.insert_zone(&zone.name, FLIGHT_AVG, stats.average);
                features.insert_zone(&zone.name, FLIGHT_CV, stats.variation);
            }
        }

        if let Some(zone) = self.config.zones.iter().find(|z| z.name == self.config.edge_zone) {
            let rect = zone.to_pixels(width, height);
            let before = pop_frame.saturating_sub(self.config.edge_lookback_frames);
            features.insert(EDGE_DENSITY_PRE_POP, edge_density(&grays[before], rect));
            features.insert(EDGE_DENSITY_AT_POP, edge_density(&grays[pop_frame], rect));
        }

        debug!(pop_frame, keys = features.len(), "video features extracted");
        Ok(features)
    }

    fn pop_frame(&self, pop_time_s: f64, frame_count: usize) -> usize {
        let index = (pop_time_s.max(0.0) * self.config.fps).round() as usize;
        index.min(frame_count - 1)
    }
}

fn check_dimensions(frames: &[RgbFrame]) -> Result<(), VideoError> {
    let (width, height) = (frames[0].width, frames[0].height);
    for (index, frame) in frames.iter().enumerate() {
        if frame.width != width || frame.height != height {
            return Err(VideoError::MixedDimensions {
                index,
                width: frame.width,
                height: frame.height,
                expected_width: width,
                expected_height: height,
            });
        }
        let expected = width as usize * height as usize * 3;
        if frame.data.len() != expected {
            return Err(VideoError::BufferSize {
                width,
                height,
                expected,
                actual: frame.data.len(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: u32 = 64;
    const H: u32 = 36;

    /// A bright 4×4 "ball" moving down the centre column, one step per frame.
    fn flight(count: usize) -> Vec<RgbFrame> {
        (0..count)
            .map(|i| {
                let mut frame = RgbFrame::filled(W, H, (20, 20, 20));
                let top = (i as u32 * 2) % (H - 4);
                for y in top..top + 4 {
                    for x in 30..34 {
                        frame.set_pixel(x, y, (250, 250, 250));
                    }
                }
                frame
            })
            .collect()
    }

    #[test]
    fn fewer_than_ten_frames_is_empty() {
        let extractor = VideoMotionExtractor::default();
        assert!(extractor.extract(&flight(9), 0.2).unwrap().is_empty());
        assert!(extractor.extract(&[], 0.0).unwrap().is_empty());
    }

    #[test]
    fn full_window_produces_zone_and_edge_keys() {
        let frames = flight(34);
        let features = VideoMotionExtractor::default().extract(&frames, 1.0).unwrap();
        for zone in ["center", "pitchLane", "catchZone"] {
            assert!(features.get_zone(zone, PEAK_POS).is_some(), "{zone}");
        }
        assert!(features.get_zone("center", LATE_FLIGHT).is_some());
        assert!(features.get_zone("center", FLIGHT_CV).is_some());
        assert!(features.get(EDGE_DENSITY_PRE_POP).is_some());
        assert!(features.get(EDGE_DENSITY_AT_POP).is_some());
        let peak = features.get_zone("center", PEAK_POS).unwrap();
        assert!((0.0..=1.0).contains(&peak));
    }

    #[test]
    fn pop_at_first_frame_skips_flight_keys() {
        let frames = flight(12);
        let features = VideoMotionExtractor::default().extract(&frames, 0.0).unwrap();
        assert!(features.get_zone("center", PEAK_POS).is_some());
        assert!(features.get_zone("center", LATE_FLIGHT).is_none());
        assert!(features.get_zone("center", FLIGHT_AVG).is_none());
    }

    #[test]
    fn still_frames_have_no_motion() {
        let frames: Vec<RgbFrame> = (0..15).map(|_| RgbFrame::filled(W, H, (80, 80, 80))).collect();
        let features = VideoMotionExtractor::default().extract(&frames, 0.4).unwrap();
        assert_eq!(features.get_zone("center", FLIGHT_AVG), Some(0.0));
        assert_eq!(features.get_zone("center", PEAK_POS), Some(0.0));
        assert_eq!(features.get(EDGE_DENSITY_AT_POP), Some(0.0));
    }

    #[test]
    fn mixed_dimensions_are_rejected() {
        let mut frames = flight(12);
        frames[5] = RgbFrame::filled(W / 2, H, (0, 0, 0));
        let err = VideoMotionExtractor::default().extract(&frames, 0.2).unwrap_err();
        assert!(matches!(err, VideoError::MixedDimensions { index: 5, .. }));
    }

    #[test]
    fn extraction_is_deterministic() {
        let frames = flight(34);
        let extractor = VideoMotionExtractor::default();
        assert_eq!(
            extractor.extract(&frames, 1.0).unwrap(),
            extractor.extract(&frames, 1.0).unwrap()
        );
    }
}
