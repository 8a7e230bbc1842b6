//! Wavelength to display color conversion.

use crate::constants::spectrum::{
    BAND_BLUE, BAND_CYAN, BAND_GREEN, BAND_RED, BAND_YELLOW, EDGE_INTENSITY, FALLOFF_HIGH,
    FALLOFF_LOW, VISIBLE_MAX, VISIBLE_MIN,
};
use serde::{Deserialize, Serialize};

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from channel fractions in `[0, 1]`; out of range values are clamped.
    pub fn from_fractions(r: f64, g: f64, b: f64) -> Self {
        Self {
            r: channel(r),
            g: channel(g),
            b: channel(b),
        }
    }
}

#[inline]
fn channel(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Linear ramp from 0 at `from` to 1 at `to`.
#[inline]
fn ramp(w: f64, from: f64, to: f64) -> f64 {
    (w - from) / (to - from)
}

/// Approximate the perceived color of monochromatic light.
///
/// Piecewise linear over six hue bands between 380 and 780 nm:
///
/// | band (nm) | red  | green | blue |
/// |-----------|------|-------|------|
/// | 380-440   | 1→0  | 0     | 1    |
/// | 440-480   | 0    | 0→1   | 1    |
/// | 480-500   | 0    | 1     | 1→0  |
/// | 500-560   | 0→1  | 1     | 0    |
/// | 560-620   | 1    | 1→0   | 0    |
/// | 620-780   | 1    | 0     | 0    |
///
/// Intensity falls off linearly to 30% towards both edges (below 420 nm and
/// above 700 nm). Wavelengths outside the visible range are black.
pub fn visible_spectrum(wavelength: f64) -> Rgb {
    let w = wavelength;
    if !w.is_finite() || !(VISIBLE_MIN..=VISIBLE_MAX).contains(&w) {
        return Rgb::BLACK;
    }

    let (r, g, b) = if w < BAND_BLUE {
        (1.0 - ramp(w, VISIBLE_MIN, BAND_BLUE), 0.0, 1.0)
    } else if w < BAND_CYAN {
        (0.0, ramp(w, BAND_BLUE, BAND_CYAN), 1.0)
    } else if w < BAND_GREEN {
        (0.0, 1.0, 1.0 - ramp(w, BAND_CYAN, BAND_GREEN))
    } else if w < BAND_YELLOW {
        (ramp(w, BAND_GREEN, BAND_YELLOW), 1.0, 0.0)
    } else if w < BAND_RED {
        (1.0, 1.0 - ramp(w, BAND_YELLOW, BAND_RED), 0.0)
    } else {
        (1.0, 0.0, 0.0)
    };

    let factor = if w < FALLOFF_LOW {
        EDGE_INTENSITY + (1.0 - EDGE_INTENSITY) * ramp(w, VISIBLE_MIN, FALLOFF_LOW)
    } else if w > FALLOFF_HIGH {
        EDGE_INTENSITY + (1.0 - EDGE_INTENSITY) * (1.0 - ramp(w, FALLOFF_HIGH, VISIBLE_MAX))
    } else {
        1.0
    };

    Rgb::from_fractions(r * factor, g * factor, b * factor)
}
