//! Color space conversion utilities
//!
//! Provides the numeric conversions used throughout the pipeline:
//! - RGB (0-255 floats) to HSV on the 0-360 / 0-100 / 0-100 scale and back
//! - RGB to HLS (unit scale) and back
//! - RGB to lowercase `#rrggbb` hex and back
//! - RGB to CIE Lab for perceptual differences
//! - Complementary colors by half-turn hue rotation

use palette::{encoding, FromColor, Hsl, Hsv, Lab, Srgb};
use serde::{Deserialize, Serialize};

use crate::{AnalysisError, Result};

type Hsv64 = Hsv<encoding::Srgb, f64>;
type Hsl64 = Hsl<encoding::Srgb, f64>;

/// An RGB color with channels in [0, 255]
///
/// Channels are floats because cluster centroids are averages and rarely
/// land on integer intensities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

/// HSV color: hue in [0, 360), saturation and value in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HsvColor {
    pub hue: f64,
    pub saturation: f64,
    pub value: f64,
}

/// HLS color with every component in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HlsColor {
    pub hue: f64,
    pub lightness: f64,
    pub saturation: f64,
}

impl Color {
    pub const fn new(red: f64, green: f64, blue: f64) -> Self {
        Self { red, green, blue }
    }

    pub fn from_rgb8(rgb: [u8; 3]) -> Self {
        Self::new(f64::from(rgb[0]), f64::from(rgb[1]), f64::from(rgb[2]))
    }

    /// Round to the nearest 8-bit intensities
    pub fn to_rgb8(self) -> [u8; 3] {
        [
            channel_to_u8(self.red),
            channel_to_u8(self.green),
            channel_to_u8(self.blue),
        ]
    }

    pub fn to_hsv(self) -> HsvColor {
        rgb_to_hsv(self.red, self.green, self.blue)
    }

    pub fn to_hls(self) -> HlsColor {
        rgb_to_hls(self.red, self.green, self.blue)
    }

    pub fn to_hex(self) -> String {
        rgb_to_hex(self.red, self.green, self.blue)
    }

    pub fn to_lab(self) -> Lab {
        let srgb = self.to_srgb();
        Lab::from_color(Srgb::new(
            srgb.red as f32,
            srgb.green as f32,
            srgb.blue as f32,
        ))
    }

    fn to_srgb(self) -> Srgb<f64> {
        Srgb::new(
            unit(self.red),
            unit(self.green),
            unit(self.blue),
        )
    }

    fn from_srgb(srgb: Srgb<f64>) -> Self {
        Self::new(srgb.red * 255.0, srgb.green * 255.0, srgb.blue * 255.0)
    }
}

impl From<[u8; 3]> for Color {
    fn from(rgb: [u8; 3]) -> Self {
        Self::from_rgb8(rgb)
    }
}

fn unit(channel: f64) -> f64 {
    (channel / 255.0).clamp(0.0, 1.0)
}

fn channel_to_u8(channel: f64) -> u8 {
    channel.round().clamp(0.0, 255.0) as u8
}

/// Convert RGB (0-255) to HSV
///
/// Output hue is in degrees [0, 360); saturation and value are percentages.
pub fn rgb_to_hsv(r: f64, g: f64, b: f64) -> HsvColor {
    let hsv = Hsv64::from_color(Color::new(r, g, b).to_srgb());
    let hue = hsv.hue.into_positive_degrees();
    HsvColor {
        // Guard against 360.0 produced by rounding of tiny negative angles
        hue: if hue >= 360.0 { 0.0 } else { hue },
        saturation: hsv.saturation * 100.0,
        value: hsv.value * 100.0,
    }
}

/// Convert HSV (0-360, 0-100, 0-100) back to RGB (0-255)
pub fn hsv_to_rgb(hsv: HsvColor) -> Color {
    let hsv = Hsv64::new(
        hsv.hue,
        (hsv.saturation / 100.0).clamp(0.0, 1.0),
        (hsv.value / 100.0).clamp(0.0, 1.0),
    );
    Color::from_srgb(Srgb::from_color(hsv))
}

/// Convert RGB (0-255) to HLS with every component in [0, 1]
pub fn rgb_to_hls(r: f64, g: f64, b: f64) -> HlsColor {
    let hsl = Hsl64::from_color(Color::new(r, g, b).to_srgb());
    let hue = hsl.hue.into_positive_degrees() / 360.0;
    HlsColor {
        hue: if hue >= 1.0 { 0.0 } else { hue },
        lightness: hsl.lightness,
        saturation: hsl.saturation,
    }
}

/// Convert HLS (unit scale) back to RGB (0-255)
pub fn hls_to_rgb(hls: HlsColor) -> Color {
    let hsl = Hsl64::new(
        hls.hue * 360.0,
        hls.saturation.clamp(0.0, 1.0),
        hls.lightness.clamp(0.0, 1.0),
    );
    Color::from_srgb(Srgb::from_color(hsl))
}

/// Format RGB (0-255) as a lowercase `#rrggbb` string
///
/// Channels are clamped to [0, 255] and truncated toward zero.
pub fn rgb_to_hex(r: f64, g: f64, b: f64) -> String {
    let truncate = |c: f64| c.clamp(0.0, 255.0) as u8;
    format!("#{:02x}{:02x}{:02x}", truncate(r), truncate(g), truncate(b))
}

/// Parse a `#rrggbb` or `rrggbb` string (any case)
pub fn hex_to_rgb(hex: &str) -> Result<Color> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(AnalysisError::invalid_parameter("hex", hex));
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .map_err(|_| AnalysisError::invalid_parameter("hex", hex))
    };

    Ok(Color::from_rgb8([channel(0..2)?, channel(2..4)?, channel(4..6)?]))
}

/// Complementary color: HLS hue rotated by half a turn
pub fn complement(color: Color) -> Color {
    let hls = color.to_hls();
    let hue = if hls.hue < 0.5 { hls.hue + 0.5 } else { hls.hue - 0.5 };
    hls_to_rgb(HlsColor { hue, ..hls })
}

/// Euclidean color difference in Lab (ΔE76)
pub fn delta_e(lab1: Lab, lab2: Lab) -> f32 {
    let dl = lab1.l - lab2.l;
    let da = lab1.a - lab2.a;
    let db = lab1.b - lab2.b;
    (dl * dl + da * da + db * db).sqrt()
}
