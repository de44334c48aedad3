use crate::frame::GrayFrame;
use crate::zones::PixelRect;

/// Sobel gradient magnitude at (x, y). Border pixels return 0.
pub fn sobel_magnitude(frame: &GrayFrame, x: u32, y: u32) -> f32 {
    if x == 0 || y == 0 || x + 1 >= frame.width || y + 1 >= frame.height {
        return 0.0;
    }

    let tl = frame.at(x - 1, y - 1);
    let tc = frame.at(x, y - 1);
    let tr = frame.at(x + 1, y - 1);
    let ml = frame.at(x - 1, y);
    let mr = frame.at(x + 1, y);
    let bl = frame.at(x - 1, y + 1);
    let bc = frame.at(x, y + 1);
    let br = frame.at(x + 1, y + 1);

    // differences first, so a flat patch is exactly zero
    let gx = (tr - tl) + 2.0 * (mr - ml) + (br - bl);
    let gy = (bl - tl) + 2.0 * (bc - tc) + (br - tr);

    (gx * gx + gy * gy).sqrt()
}

/// Mean Sobel magnitude over a zone; a proxy for how much sharp structure
/// (such as a ball in flight) is visible there.
pub fn edge_density(frame: &GrayFrame, rect: PixelRect) -> f64 {
    if rect.is_empty() {
        return 0.0;
    }
    let mut sum = 0.0f64;
    for y in rect.y0..rect.y1 {
        for x in rect.x0..rect.x1 {
            sum += f64::from(sobel_magnitude(frame, x, y));
        }
    }
    sum / rect.area() as f64
}
