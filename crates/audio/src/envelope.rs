use pitchcall_domain::samples::seconds_to_samples;

/// Default smoothing window for the pop detector.
pub const DEFAULT_WINDOW_MS: f64 = 2.0;

/// Causal moving average of |sample|, one value per input sample.
#[derive(Clone, Debug, PartialEq)]
pub struct Envelope {
    values: Vec<f64>,
    window: usize,
}

impl Envelope {
    /// O(n) running sum over the trailing window. The first `window - 1`
    /// values average over the samples seen so far.
    pub fn extract(samples: &[i16], sample_rate: u32, window_ms: f64) -> Self {
        let window = seconds_to_samples(sample_rate, window_ms / 1000.0).max(1);
        let mut values = Vec::with_capacity(samples.len());
        // integer sum keeps the output independent of summation order
        let mut running: i64 = 0;
        for (i, &sample) in samples.iter().enumerate() {
            running += i64::from(sample).abs();
            if i >= window {
                running -= i64::from(samples[i - window]).abs();
            }
            let count = (i + 1).min(window);
            values.push(running as f64 / count as f64);
        }
        Self { values, window }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Window length in samples.
    pub fn window(&self) -> usize {
        self.window
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn length_matches_and_values_are_non_negative() {
        let samples: Vec<i16> = (0..5000)
            .map(|i| ((i * 7919) % 65_536 - 32_768) as i16)
            .collect();
        let envelope = Envelope::extract(&samples, 44_100, DEFAULT_WINDOW_MS);
        assert_eq!(envelope.len(), samples.len());
        assert!(envelope.values().iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn empty_input_gives_empty_envelope() {
        let envelope = Envelope::extract(&[], 44_100, DEFAULT_WINDOW_MS);
        assert!(envelope.is_empty());
    }

    #[test]
    fn early_samples_average_over_what_was_seen() {
        let samples = [100i16, -300, 200, -400, 0];
        let envelope = Envelope::extract(&samples, 1000, 3.0);
        assert_eq!(envelope.window(), 3);
        let values = envelope.values();
        assert_abs_diff_eq!(values[0], 100.0);
        assert_abs_diff_eq!(values[1], 200.0);
        assert_abs_diff_eq!(values[2], 200.0);
        assert_abs_diff_eq!(values[3], 300.0);
        assert_abs_diff_eq!(values[4], 200.0);
    }

    #[test]
    fn handles_most_negative_sample() {
        let envelope = Envelope::extract(&[i16::MIN; 4], 1000, 2.0);
        assert!(envelope.values().iter().all(|&v| v == 32_768.0));
    }
}
