//! RGB to HSV conversion on the OpenCV 8-bit scale
//!
//! Configured detection bounds use the OpenCV convention: hue is stored as
//! degrees / 2 in `0..=179`, saturation and value in `0..=255`.

use serde::{Deserialize, Serialize};

/// Largest hue value on the 8-bit scale
pub const HUE_MAX: u8 = 179;

/// HSV triple on the OpenCV 8-bit scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hsv {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl Hsv {
    pub const fn new(h: u8, s: u8, v: u8) -> Self {
        Self { h, s, v }
    }
}

impl From<[u8; 3]> for Hsv {
    fn from(c: [u8; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }
}

/// Convert one RGB pixel to HSV
#[must_use]
pub fn rgb_to_hsv(rgb: [u8; 3]) -> Hsv {
    let r = f32::from(rgb[0]);
    let g = f32::from(rgb[1]);
    let b = f32::from(rgb[2]);

    let v = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = v - min;

    let s = if v > 0.0 { delta * 255.0 / v } else { 0.0 };

    let mut h = if delta == 0.0 {
        0.0
    } else if v == r {
        60.0 * (g - b) / delta
    } else if v == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    if h < 0.0 {
        h += 360.0;
    }

    // 360 degrees / 2 rounds to 180, which wraps back to red
    let h = ((h / 2.0).round() as u16 % 180) as u8;

    Hsv::new(h, s.round() as u8, v as u8)
}
