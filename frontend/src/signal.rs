//! Signal quality to marker color.

use std::fmt;

pub const MAX_SIGNAL: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Red (0) through yellow (5) to green (10). Values outside 0..=10 are
/// clamped.
pub fn color_for_signal(signal: f64) -> Rgb {
    let ratio = signal.clamp(0.0, MAX_SIGNAL) / MAX_SIGNAL;
    let ratio = if ratio.is_nan() { 0.0 } else { ratio };

    if ratio <= 0.5 {
        Rgb {
            r: 255,
            g: (255.0 * ratio * 2.0).round() as u8,
            b: 0,
        }
    } else {
        Rgb {
            r: (255.0 * (1.0 - (ratio - 0.5) * 2.0)).round() as u8,
            g: 255,
            b: 0,
        }
    }
}

/// css class used by the popup for a signal level
pub fn signal_class(signal: i32) -> &'static str {
    if signal > 7 {
        "signal-high"
    } else if signal > 3 {
        "signal-medium"
    } else {
        "signal-low"
    }
}
