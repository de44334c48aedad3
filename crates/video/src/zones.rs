use serde::{Deserialize, Serialize};

/// Named rectangle in normalized frame coordinates (0..1, origin top-left).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Zone {
    pub name: String,
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

/// Pixel rectangle `[x0, x1) × [y0, y1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PixelRect {
    pub fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }

    pub fn area(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.x1 - self.x0) as usize * (self.y1 - self.y0) as usize
        }
    }
}

impl Zone {
    pub fn new(name: impl Into<String>, x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            name: name.into(),
            x0,
            y0,
            x1,
            y1,
        }
    }

    pub fn to_pixels(&self, width: u32, height: u32) -> PixelRect {
        let scale = |v: f32, extent: u32| ((v.clamp(0.0, 1.0) * extent as f32).round() as u32).min(extent);
        PixelRect {
            x0: scale(self.x0, width),
            y0: scale(self.y0, height),
            x1: scale(self.x1, width),
            y1: scale(self.y1, height),
        }
    }
}

/// Broadcast centre-field framing: the pitcher-to-plate lane runs down the
/// middle of the frame and the catcher sits in the lower centre.
pub fn default_zones() -> Vec<Zone> {
    vec![
        Zone::new("center", 0.35, 0.30, 0.65, 0.70),
        Zone::new("pitchLane", 0.30, 0.15, 0.70, 0.55),
        Zone::new("catchZone", 0.35, 0.55, 0.65, 0.95),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_to_pixels() {
        let zone = Zone::new("center", 0.35, 0.30, 0.65, 0.70);
        let rect = zone.to_pixels(640, 360);
        assert_eq!(rect, PixelRect { x0: 224, y0: 108, x1: 416, y1: 252 });
        assert_eq!(rect.area(), 192 * 144);
    }

    #[test]
    fn clamps_out_of_range_coordinates() {
        let zone = Zone::new("wide", -0.5, 0.0, 1.5, 0.0);
        let rect = zone.to_pixels(100, 50);
        assert_eq!((rect.x0, rect.x1), (0, 100));
        assert!(rect.is_empty());
    }

    #[test]
    fn default_zone_names() {
        let names: Vec<String> = default_zones().into_iter().map(|z| z.name).collect();
        assert_eq!(names, vec!["center", "pitchLane", "catchZone"]);
    }
}
