// src/arc.rs

//! Center/extent reconstruction for SVG endpoint-parameterised arcs.

use crate::svg_path::SvgArc;

/// Extent reported when the angle between the radius vectors cannot be
/// solved with `acos` (zero-length radius vector or a ratio outside [-1, 1]).
/// It passes through the sweep adjustment below like any other extent.
pub const ARC_EXTENT_SENTINEL: f64 = 360.0 + 359.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcGeometry {
    pub center_x: f64,
    pub center_y: f64,
    /// Signed extent in degrees, counter-clockwise positive once the source
    /// Y axis has been flipped upward.
    pub angle_extent: f64,
}

/// Reconstructs the ellipse center and signed angular extent of an arc
/// running from `(start_x, start_y)` to the arc's end point.
///
/// Radii that are too small for the chord are scaled up. A zero radius
/// contributes nothing to the radius vectors instead of dividing by zero.
pub fn compute_arc(start_x: f64, start_y: f64, arc: &SvgArc) -> ArcGeometry {
    let SvgArc {
        mut radius_x,
        mut radius_y,
        x_axis_rotation,
        large_arc,
        sweep,
        end_x,
        end_y,
    } = *arc;

    let dx2 = (start_x - end_x) / 2.0;
    let dy2 = (start_y - end_y) / 2.0;

    let angle = (x_axis_rotation % 360.0).to_radians();
    let (sin_angle, cos_angle) = angle.sin_cos();

    // Chord midpoint in the ellipse frame.
    let x1 = cos_angle * dx2 + sin_angle * dy2;
    let y1 = -sin_angle * dx2 + cos_angle * dy2;

    radius_x = radius_x.abs();
    radius_y = radius_y.abs();
    let mut prx = radius_x * radius_x;
    let mut pry = radius_y * radius_y;
    let px1 = x1 * x1;
    let py1 = y1 * y1;

    let radii_check = if prx != 0.0 && pry != 0.0 {
        px1 / prx + py1 / pry
    } else {
        0.0
    };
    if radii_check > 1.0 {
        let factor = radii_check.sqrt();
        radius_x *= factor;
        radius_y *= factor;
        prx = radius_x * radius_x;
        pry = radius_y * radius_y;
    }

    let sign = if large_arc == sweep { -1.0 } else { 1.0 };
    let denominator = prx * py1 + pry * px1;
    let sq = if denominator > 0.0 {
        ((prx * pry - prx * py1 - pry * px1) / denominator).max(0.0)
    } else {
        0.0
    };
    let coef = sign * sq.sqrt();
    let cx1 = if radius_y != 0.0 {
        coef * (radius_x * y1 / radius_y)
    } else {
        0.0
    };
    let cy1 = if radius_x != 0.0 {
        coef * -(radius_y * x1 / radius_x)
    } else {
        0.0
    };

    let sx2 = (start_x + end_x) / 2.0;
    let sy2 = (start_y + end_y) / 2.0;
    let center_x = sx2 + (cos_angle * cx1 - sin_angle * cy1);
    let center_y = sy2 + (sin_angle * cx1 + cos_angle * cy1);

    let scaled = |value: f64, radius: f64| if radius != 0.0 { value / radius } else { 0.0 };
    let ux = scaled(x1 - cx1, radius_x);
    let uy = scaled(y1 - cy1, radius_y);
    let vx = scaled(-x1 - cx1, radius_x);
    let vy = scaled(-y1 - cy1, radius_y);

    let n = ((ux * ux + uy * uy) * (vx * vx + vy * vy)).sqrt();
    let p = ux * vx + uy * vy;
    let sign2 = if ux * vy - uy * vx < 0.0 { -1.0 } else { 1.0 };

    let mut angle_extent = if n != 0.0 && (p / n).abs() <= 1.0 {
        sign2 * (p / n).acos().to_degrees()
    } else {
        ARC_EXTENT_SENTINEL
    };

    if !sweep && angle_extent > 0.0 {
        angle_extent -= 360.0;
    } else if sweep && angle_extent < 0.0 {
        angle_extent += 360.0;
    }

    let extent_sign = if angle_extent < 0.0 { 1.0 } else { -1.0 };
    angle_extent = (angle_extent.abs() % 360.0) * extent_sign;

    ArcGeometry {
        center_x,
        center_y,
        angle_extent,
    }
}

/// Point halfway along an arc, given its center, start point and extent.
pub fn arc_midpoint(
    center: (f64, f64),
    start: (f64, f64),
    angle_extent: f64,
) -> (f64, f64) {
    let half = (angle_extent / 2.0).to_radians();
    let (sin_h, cos_h) = half.sin_cos();
    let (dx, dy) = (start.0 - center.0, start.1 - center.1);
    (
        center.0 + dx * cos_h - dy * sin_h,
        center.1 + dx * sin_h + dy * cos_h,
    )
}
