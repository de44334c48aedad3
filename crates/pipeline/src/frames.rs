//! Access to decoded video frames. Container decoding happens outside this
//! crate; providers only hand back raw RGB24 frames for a time window.

use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use pitchcall_video::RgbFrame;

/// Frames for a requested window plus the time of the first returned frame.
#[derive(Debug, Clone, Default)]
pub struct FrameWindow {
    pub first_frame_s: f64,
    pub frames: Vec<RgbFrame>,
}

pub trait FrameProvider: Send + Sync {
    fn frames(&self, start_s: f64, duration_s: f64) -> Result<FrameWindow>;
}

/// Audio-only clips.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFrames;

impl FrameProvider for NoFrames {
    fn frames(&self, start_s: f64, _duration_s: f64) -> Result<FrameWindow> {
        Ok(FrameWindow {
            first_frame_s: start_s.max(0.0),
            frames: Vec::new(),
        })
    }
}

/// Headerless file of back-to-back RGB24 frames at a fixed size and rate.
#[derive(Debug, Clone)]
pub struct RawFrameFile {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
}

impl RawFrameFile {
    pub fn new(path: impl Into<PathBuf>, width: u32, height: u32, fps: f64) -> Self {
        Self {
            path: path.into(),
            width,
            height,
            fps,
        }
    }

    fn frame_bytes(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}

impl FrameProvider for RawFrameFile {
    fn frames(&self, start_s: f64, duration_s: f64) -> Result<FrameWindow> {
        anyhow::ensure!(self.fps > 0.0, "frame rate must be positive");
        let frame_bytes = self.frame_bytes();
        anyhow::ensure!(frame_bytes > 0, "frame size must be non-zero");

        let first = (start_s.max(0.0) * self.fps).floor() as u64;
        let count = (duration_s.max(0.0) * self.fps).ceil() as usize;
        let mut file = File::open(&self.path)
            .with_context(|| format!("failed to open frames {}", self.path.display()))?;
        file.seek(SeekFrom::Start(first * frame_bytes as u64))?;

        let mut frames = Vec::with_capacity(count);
        for _ in 0..count {
            let mut data = vec![0u8; frame_bytes];
            match file.read_exact(&mut data) {
                Ok(()) => frames.push(RgbFrame::new(self.width, self.height, data)?),
                // a trailing partial frame is dropped
                Err(err) if err.kind() == ErrorKind::UnexpectedEof => break,
                Err(err) => return Err(err.into()),
            }
        }
        debug!(first, requested = count, read = frames.len(), "frames loaded");
        Ok(FrameWindow {
            first_frame_s: first as f64 / self.fps,
            frames,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::io::Write;

    fn write_frames(count: u8, width: u32, height: u32) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for i in 0..count {
            let frame = vec![i; (width * height * 3) as usize];
            file.write_all(&frame).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn reads_the_requested_window() {
        let file = write_frames(20, 4, 2);
        let provider = RawFrameFile::new(file.path(), 4, 2, 10.0);
        let window = provider.frames(0.5, 0.3).unwrap();
        assert_abs_diff_eq!(window.first_frame_s, 0.5);
        assert_eq!(window.frames.len(), 3);
        assert_eq!(window.frames[0].pixel(0, 0), (5, 5, 5));
        assert_eq!(window.frames[2].pixel(3, 1), (7, 7, 7));
    }

    #[test]
    fn stops_at_end_of_file() {
        let file = write_frames(4, 2, 2);
        let provider = RawFrameFile::new(file.path(), 2, 2, 10.0);
        let window = provider.frames(-1.0, 2.0).unwrap();
        assert_abs_diff_eq!(window.first_frame_s, 0.0);
        assert_eq!(window.frames.len(), 4);
    }

    #[test]
    fn missing_file_is_an_error() {
        let provider = RawFrameFile::new("no-such-frames.rgb", 2, 2, 30.0);
        assert!(provider.frames(0.0, 1.0).is_err());
    }

    #[test]
    fn no_frames_is_empty() {
        assert!(NoFrames.frames(1.0, 1.0).unwrap().frames.is_empty());
    }
}
