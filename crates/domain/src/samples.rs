use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Sample rate every decoded clip is delivered at.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Mono signed 16-bit PCM for one pitch clip.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SampleBuffer {
    samples: Vec<i16>,
    sample_rate: u32,
}

impl SampleBuffer {
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Result<Self, DomainError> {
        if sample_rate == 0 {
            return Err(DomainError::validation("sample rate must be positive"));
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Wraps samples decoded at [`DEFAULT_SAMPLE_RATE`].
    pub fn at_default_rate(samples: Vec<i16>) -> Self {
        Self {
            samples,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Converts a duration in seconds into a whole number of samples.
    pub fn samples_for(&self, seconds: f64) -> usize {
        seconds_to_samples(self.sample_rate, seconds)
    }

    pub fn seconds_at(&self, index: usize) -> f64 {
        index as f64 / self.sample_rate as f64
    }
}

pub fn seconds_to_samples(sample_rate: u32, seconds: f64) -> usize {
    (sample_rate as f64 * seconds).round().max(0.0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_sample_rate() {
        assert!(SampleBuffer::new(vec![0; 4], 0).is_err());
        assert!(SampleBuffer::new(vec![0; 4], 8_000).is_ok());
    }

    #[test]
    fn converts_durations_to_sample_counts() {
        let buffer = SampleBuffer::at_default_rate(vec![0; 44_100]);
        assert_eq!(buffer.samples_for(0.002), 88);
        assert_eq!(buffer.samples_for(0.05), 2205);
        assert_eq!(buffer.duration_seconds(), 1.0);
        assert_eq!(buffer.seconds_at(22_050), 0.5);
    }
}
