use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use pitchcall_domain::SampleBuffer;

use crate::error::AudioError;

/// Reads the headerless little-endian s16 mono stream the external decoder
/// writes for each clip.
pub struct PcmReader;

impl PcmReader {
    pub fn open<P: AsRef<Path>>(path: P, sample_rate: u32) -> Result<SampleBuffer> {
        let path_ref = path.as_ref();
        let bytes =
            fs::read(path_ref).with_context(|| format!("open PCM file {:?}", path_ref))?;
        let samples = Self::decode(&bytes)?;
        debug!(path = ?path_ref, samples = samples.len(), "read PCM clip");
        Ok(SampleBuffer::new(samples, sample_rate)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Vec<i16>, AudioError> {
        if bytes.len() % 2 != 0 {
            return Err(AudioError::TruncatedPcm(bytes.len()));
        }
        Ok(bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect())
    }
}
