// src/pose.rs

//! 3D placement of a component's physical model.
//!
//! A [`Pose`] is a plain value. Each geometry source (footprint outline, 3D
//! placement metadata) produces a contribution and [`Pose::accumulate`]
//! returns the combined pose, so the caller controls the order.

use crate::easyeda_models::Ee3dModel;
use crate::units::{convert_to_mm, round_to};
use glam::{DMat4, DQuat, DVec3};

/// Decomposed placement: translation in mm, rotation in degrees about X, Y
/// and Z (applied Z, then X, then Y), per-axis scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub translation: DVec3,
    pub rotation: DVec3,
    pub scale: DVec3,
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Pose {
    pub fn identity() -> Self {
        Self {
            translation: DVec3::ZERO,
            rotation: DVec3::ZERO,
            scale: DVec3::ONE,
        }
    }

    pub fn from_translation(translation: DVec3) -> Self {
        Self {
            translation,
            ..Self::identity()
        }
    }

    /// Adds a contribution on top of this pose. Translations and rotations
    /// sum, scales multiply.
    pub fn accumulate(&self, contribution: &Pose) -> Pose {
        Pose {
            translation: self.translation + contribution.translation,
            rotation: self.rotation + contribution.rotation,
            scale: self.scale * contribution.scale,
        }
    }
}

/// Offset the footprint outline contributes: the model is shifted so the
/// centre of the footprint extents lands on the origin.
pub fn footprint_contribution(extents_center_x: f64, extents_center_y: f64) -> Pose {
    Pose::from_translation(DVec3::new(-extents_center_x, -extents_center_y, 0.0))
}

/// Axis-aligned bounds of a mesh, in mm.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeshBounds {
    pub min: DVec3,
    pub max: DVec3,
}

impl MeshBounds {
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = DVec3>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    /// Centre in X/Y, bottom in Z.
    pub fn anchor(&self) -> DVec3 {
        DVec3::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
            self.min.z,
        )
    }
}

/// Placement metadata read from the footprint's 3D model node.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlacementInfo {
    /// Degrees about X, Y, Z.
    pub rotation: DVec3,
    /// Height above the board in mm.
    pub z: f64,
    pub target_width: Option<f64>,
    pub target_height: Option<f64>,
}

impl From<&Ee3dModel> for PlacementInfo {
    fn from(model: &Ee3dModel) -> Self {
        let (rx, ry, rz) = model.rotation;
        Self {
            rotation: DVec3::new(rx, ry, rz),
            z: round_to(convert_to_mm(model.z), 2),
            target_width: model.width.map(convert_to_mm),
            target_height: model.height.map(convert_to_mm),
        }
    }
}

/// Rotation applied Z first, then X, then Y (intrinsic), from degrees.
pub fn rotation_zxy(degrees: DVec3) -> DQuat {
    let r = degrees * (std::f64::consts::PI / 180.0);
    DQuat::from_rotation_z(r.z) * DQuat::from_rotation_x(r.x) * DQuat::from_rotation_y(r.y)
}

/// Uniform scale fitting the mesh footprint into the target width/height.
fn fit_scale(bounds: &MeshBounds, placement: &PlacementInfo) -> f64 {
    let size = bounds.size();
    match (placement.target_width, placement.target_height) {
        (Some(w), Some(h)) if size.x > 0.0 && size.y > 0.0 && w > 0.0 && h > 0.0 => {
            (w / size.x).min(h / size.y)
        }
        _ => 1.0,
    }
}

/// Full placement matrix: move the mesh anchor to the origin, rotate, scale,
/// then lift by the placement height.
pub fn compose_matrix(bounds: &MeshBounds, placement: &PlacementInfo) -> DMat4 {
    let center = DMat4::from_translation(-bounds.anchor());
    let rotate = DMat4::from_quat(rotation_zxy(placement.rotation));
    let scale = DMat4::from_scale(DVec3::splat(fit_scale(bounds, placement)));
    let lift = DMat4::from_translation(DVec3::new(0.0, 0.0, placement.z));
    lift * scale * rotate * center
}

/// Composes and decomposes the placement transform. Without placement
/// metadata there is no pose and the model is left out.
pub fn compose_pose(bounds: &MeshBounds, placement: Option<&PlacementInfo>) -> Option<Pose> {
    let placement = placement?;
    let matrix = compose_matrix(bounds, placement);
    let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
    Some(Pose {
        translation,
        rotation: quat_to_euler_zxy(rotation),
        scale,
    })
}

/// Extracts (x, y, z) degrees from a rotation built as `Rz * Rx * Ry`.
pub fn quat_to_euler_zxy(q: DQuat) -> DVec3 {
    let (x, y, z, w) = (q.x, q.y, q.z, q.w);
    let r21 = 2.0 * (y * z + w * x);

    let (alpha, beta, gamma) = if r21.abs() < 1.0 - 1e-12 {
        let r20 = 2.0 * (x * z - w * y);
        let r22 = 1.0 - 2.0 * (x * x + y * y);
        let r01 = 2.0 * (x * y - w * z);
        let r11 = 1.0 - 2.0 * (x * x + z * z);
        (r21.asin(), (-r20).atan2(r22), (-r01).atan2(r11))
    } else {
        // Gimbal lock: Y folds into Z.
        let r10 = 2.0 * (x * y + w * z);
        let r00 = 1.0 - 2.0 * (y * y + z * z);
        (r21.clamp(-1.0, 1.0).asin(), 0.0, r10.atan2(r00))
    };

    DVec3::new(alpha.to_degrees(), beta.to_degrees(), gamma.to_degrees())
}
