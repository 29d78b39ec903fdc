// src/units.rs

//! Unit conversion and number formatting shared by every encoder.
//!
//! EasyEDA stores geometry in "pixels" of 10 mil. The legacy symbol dialect
//! wants whole mils, everything else wants millimetres.

use serde::Deserialize;

/// Target KiCad symbol dialect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KicadVersion {
    /// Legacy `.lib` line records.
    V5,
    /// `.kicad_sym` nested lists.
    #[default]
    V6,
}

pub const PX_TO_MIL: f64 = 10.0;
pub const MIL_TO_MM: f64 = 0.0254;

/// Per-component origin subtracted from every source position.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoundingBoxOrigin {
    pub x: f64,
    pub y: f64,
}

impl BoundingBoxOrigin {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn relative(&self, x: f64, y: f64) -> (f64, f64) {
        (x - self.x, y - self.y)
    }
}

/// Pixels to whole mils, truncating toward negative infinity.
pub fn px_to_mil(value: f64) -> f64 {
    (PX_TO_MIL * value).floor()
}

pub fn px_to_mm(value: f64) -> f64 {
    PX_TO_MIL * value * MIL_TO_MM
}

/// Symbol-domain conversion for the chosen dialect.
pub fn to_ki(value: f64, version: KicadVersion) -> f64 {
    match version {
        KicadVersion::V5 => px_to_mil(value),
        KicadVersion::V6 => px_to_mm(value),
    }
}

/// Footprint-domain conversion, unrounded.
pub fn convert_to_mm(value: f64) -> f64 {
    value * PX_TO_MIL * MIL_TO_MM
}

/// Footprint-domain conversion rounded to 2 decimals.
pub fn fp_to_ki(value: f64) -> f64 {
    round_to(convert_to_mm(value), 2)
}

/// Rounds half-to-even at a fixed number of decimals.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// Fixed-point formatting; negative zero keeps its sign (`-0.00`).
pub fn fmt_fixed(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value)
}

/// Integer formatting for the legacy dialect. Negative zero prints as `0`.
pub fn fmt_int(value: f64) -> String {
    let rounded = value.round_ties_even() as i64;
    rounded.to_string()
}

/// Shortest round-trip float text that always carries a decimal point
/// (`2.0`, `-0.5`).
pub fn fmt_float(value: f64) -> String {
    format!("{:?}", value)
}

/// Folds a rotation in degrees into KiCad's (-180, 180] convention.
pub fn angle_to_ki(rotation: f64) -> f64 {
    if rotation > 180.0 {
        -(360.0 - rotation)
    } else {
        rotation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_units_floor() {
        assert_eq!(px_to_mil(1.25), 12.0);
        assert_eq!(px_to_mil(-1.25), -13.0);
    }

    #[test]
    fn fixed_formatting_keeps_negative_zero() {
        assert_eq!(fmt_fixed(-0.001, 2), "-0.00");
        assert_eq!(fmt_fixed(0.126, 2), "0.13");
        assert_eq!(fmt_int(-0.0), "0");
    }

    #[test]
    fn angles_fold_past_half_turn() {
        assert_eq!(angle_to_ki(270.0), -90.0);
        assert_eq!(angle_to_ki(180.0), 180.0);
    }
}
