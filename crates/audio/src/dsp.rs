//! Small statistics helpers shared by the detectors.

/// Frame RMS over `[start, end)` using fixed frames and hop. A window too
/// short for one full frame yields a single frame over what is there.
pub fn frame_rms(samples: &[i16], start: usize, end: usize, frame: usize, hop: usize) -> Vec<f64> {
    let end = end.min(samples.len());
    if start >= end || frame == 0 || hop == 0 {
        return Vec::new();
    }
    if end - start < frame {
        return vec![rms(&samples[start..end])];
    }
    let mut out = Vec::with_capacity((end - start - frame) / hop + 1);
    let mut cursor = start;
    while cursor + frame <= end {
        out.push(rms(&samples[cursor..cursor + frame]));
        cursor += hop;
    }
    out
}

pub fn rms(samples: &[i16]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    (energy(samples) / samples.len() as f64).sqrt()
}

/// Sum of squared samples.
pub fn energy(samples: &[i16]) -> f64 {
    samples
        .iter()
        .map(|&s| {
            let v = f64::from(s);
            v * v
        })
        .sum()
}

pub fn peak_abs(samples: &[i16]) -> f64 {
    samples
        .iter()
        .map(|&s| i32::from(s).unsigned_abs())
        .max()
        .map(f64::from)
        .unwrap_or(0.0)
}

/// Counts sign changes between consecutive samples; zero counts as positive.
pub fn zero_crossings(samples: &[i16]) -> u32 {
    samples
        .windows(2)
        .filter(|pair| (pair[0] >= 0) != (pair[1] >= 0))
        .count() as u32
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn median(values: &[f64]) -> Option<f64> {
    percentile(values, 50.0)
}

/// Linear-interpolated percentile (`q` in 0..=100) of unsorted values.
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let rank = (q.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}
