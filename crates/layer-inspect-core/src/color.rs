use serde::{Deserialize, Serialize};

use crate::Bgr;

/// Colour space the classifier sees pixels in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpace {
    /// Raw blue/green/red bytes as captured.
    #[default]
    Bgr,
    /// 8-bit hue/saturation/value (hue in `0..180`, half-degrees).
    Hsv,
}

impl ColorSpace {
    #[inline]
    pub fn convert(self, px: Bgr) -> [u8; 3] {
        match self {
            ColorSpace::Bgr => px,
            ColorSpace::Hsv => bgr_to_hsv(px),
        }
    }

    /// Human-readable channel names, in storage order.
    pub fn channel_names(self) -> [&'static str; 3] {
        match self {
            ColorSpace::Bgr => ["blue", "green", "red"],
            ColorSpace::Hsv => ["hue", "saturation", "value"],
        }
    }
}

/// Convert one BGR pixel to 8-bit HSV with hue halved to fit a byte.
pub fn bgr_to_hsv(px: Bgr) -> [u8; 3] {
    let [b, g, r] = px.map(f32::from);
    let v = b.max(g).max(r);
    let min = b.min(g).min(r);
    let diff = v - min;

    let s = if v > 0.0 { diff * 255.0 / v } else { 0.0 };

    let h = if diff == 0.0 {
        0.0
    } else if v == r {
        60.0 * (g - b) / diff
    } else if v == g {
        120.0 + 60.0 * (b - r) / diff
    } else {
        240.0 + 60.0 * (r - g) / diff
    };
    let h = if h < 0.0 { h + 360.0 } else { h };

    let h8 = ((h / 2.0).round() as u16 % 180) as u8;
    [h8, s.round() as u8, v as u8]
}
