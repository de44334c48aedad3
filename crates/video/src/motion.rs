use crate::frame::GrayFrame;
use crate::zones::PixelRect;

/// Motion energy per consecutive frame pair: the sum of |Δluma| over zone
/// pixels whose change exceeds `noise_threshold`. One entry per pair.
pub fn motion_timeline(frames: &[GrayFrame], rect: PixelRect, noise_threshold: f32) -> Vec<f64> {
    if rect.is_empty() {
        return Vec::new();
    }
    frames
        .windows(2)
        .map(|pair| {
            let (before, after) = (&pair[0], &pair[1]);
            let mut total = 0.0f64;
            for y in rect.y0..rect.y1 {
                for x in rect.x0..rect.x1 {
                    let diff = (after.at(x, y) - before.at(x, y)).abs();
                    if diff > noise_threshold {
                        total += f64::from(diff);
                    }
                }
            }
            total
        })
        .collect()
}

/// Index of the first maximum, normalized to 0..1 over the timeline.
pub fn peak_position(timeline: &[f64]) -> Option<f64> {
    let (index, _) = timeline
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, &v)| match best {
            Some((_, bv)) if bv >= v => best,
            _ => Some((i, v)),
        })?;
    if timeline.len() == 1 {
        Some(0.0)
    } else {
        Some(index as f64 / (timeline.len() - 1) as f64)
    }
}

/// Statistics of the flight-phase slice of a zone timeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlightStats {
    /// Second-half mean over first-half mean plus one.
    pub late_flight: f64,
    pub average: f64,
    /// Standard deviation over mean; 0 when the mean is 0.
    pub variation: f64,
}

pub fn flight_stats(flight: &[f64]) -> Option<FlightStats> {
    if flight.is_empty() {
        return None;
    }
    let half = flight.len() / 2;
    let (first, second) = flight.split_at(half);
    let average = mean(flight);
    let variance = flight.iter().map(|v| (v - average).powi(2)).sum::<f64>() / flight.len() as f64;
    Some(FlightStats {
        late_flight: mean(second) / (mean(first) + 1.0),
        average,
        variation: if average > 0.0 {
            variance.sqrt() / average
        } else {
            0.0
        },
    })
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
