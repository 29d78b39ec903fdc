// src/kicad_models/mod.rs

pub mod footprint;
pub mod symbol;

pub use footprint::*;
pub use symbol::*;

use crate::units::fmt_fixed;
use glam::DVec3;

// --- 3D Model Structs ---

/// Represents a 3D model in KiCad format.
///
/// Contains the generated VRML text and the downloaded STEP blob, plus the
/// placement written into the footprint's `(model ...)` block.
#[derive(Debug, Clone, PartialEq)]
pub struct Ki3dModel {
    pub name: String,
    pub wrl_data: Option<String>,
    pub step_data: Option<bytes::Bytes>,
    // KiCad placement info
    pub offset: DVec3,
    pub scale: DVec3,
    /// Already folded into KiCad's `(360 - r) mod 360` convention.
    pub rotate: DVec3,
}

impl Ki3dModel {
    /// KiCad rotates models the opposite way round.
    pub fn kicad_rotation(rotation: DVec3) -> DVec3 {
        DVec3::new(
            (360.0 - rotation.x) % 360.0,
            (360.0 - rotation.y) % 360.0,
            (360.0 - rotation.z) % 360.0,
        )
    }

    pub(crate) fn export_reference(&self, model_dir: &str) -> String {
        format!(
            "\t(model \"{}/{}.wrl\"\n\t\t(offset (xyz {} {} {}))\n\t\t(scale (xyz {} {} {}))\n\t\t(rotate (xyz {} {} {}))\n\t)\n",
            model_dir.trim_end_matches('/'),
            self.name,
            fmt_fixed(self.offset.x, 3),
            fmt_fixed(self.offset.y, 3),
            fmt_fixed(self.offset.z, 3),
            fmt_fixed(self.scale.x, 3),
            fmt_fixed(self.scale.y, 3),
            fmt_fixed(self.scale.z, 3),
            fmt_fixed(self.rotate.x, 0),
            fmt_fixed(self.rotate.y, 0),
            fmt_fixed(self.rotate.z, 0)
        )
    }
}
