use easyeda_kipm::{
    arc::{arc_midpoint, compute_arc, ARC_EXTENT_SENTINEL},
    easyeda_models::Ee3dModel,
    pose::{compose_pose, quat_to_euler_zxy, rotation_zxy, MeshBounds, PlacementInfo, Pose},
    svg_path::SvgArc,
    units::*,
};
use glam::DVec3;

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {} but got {}",
        expected,
        actual
    );
}

fn assert_vec_close(actual: DVec3, expected: DVec3) {
    assert_close(actual.x, expected.x);
    assert_close(actual.y, expected.y);
    assert_close(actual.z, expected.z);
}

fn arc(radius: f64, large_arc: bool, sweep: bool, end_x: f64, end_y: f64) -> SvgArc {
    SvgArc {
        radius_x: radius,
        radius_y: radius,
        x_axis_rotation: 0.0,
        large_arc,
        sweep,
        end_x,
        end_y,
    }
}

#[test]
fn half_circle_arc_center_and_extent() {
    let geometry = compute_arc(10.0, 10.0, &arc(5.0, false, true, 20.0, 10.0));
    assert_close(geometry.center_x, 15.0);
    assert_close(geometry.center_y, 10.0);
    assert_close(geometry.angle_extent, -180.0);
}

#[test]
fn quarter_arc_center_is_equidistant() {
    let geometry = compute_arc(0.0, 0.0, &arc(10.0, false, true, 10.0, 10.0));
    assert_close(geometry.center_x, 0.0);
    assert_close(geometry.center_y, 10.0);
    assert_close(geometry.angle_extent, -90.0);

    let to_start = (geometry.center_x.powi(2) + geometry.center_y.powi(2)).sqrt();
    let to_end = ((10.0 - geometry.center_x).powi(2) + (10.0 - geometry.center_y).powi(2)).sqrt();
    assert_close(to_start, to_end);
}

#[test]
fn zero_radius_arc_falls_back_to_sentinel() {
    assert_eq!(ARC_EXTENT_SENTINEL, 719.0);
    for sweep in [true, false] {
        let geometry = compute_arc(0.0, 0.0, &arc(0.0, false, sweep, 10.0, 0.0));
        assert!(geometry.center_x.is_finite());
        assert!(geometry.center_y.is_finite());
        assert_close(geometry.angle_extent, -359.0);
    }
}

#[test]
fn too_small_radius_is_scaled_up() {
    let geometry = compute_arc(0.0, 0.0, &arc(1.0, false, true, 10.0, 0.0));
    assert_close(geometry.center_x, 5.0);
    assert_close(geometry.center_y, 0.0);
    assert_close(geometry.angle_extent.abs(), 180.0);
}

#[test]
fn midpoint_rotates_half_the_extent() {
    let (x, y) = arc_midpoint((15.0, -10.0), (10.0, -10.0), -180.0);
    assert_close(x, 15.0);
    assert_close(y, -5.0);

    let (x, y) = arc_midpoint((0.0, 0.0), (1.0, 0.0), 90.0);
    assert_close(x, 0.5f64.sqrt());
    assert_close(y, 0.5f64.sqrt());
}

#[test]
fn unit_conversions() {
    assert_close(px_to_mm(10.0), 2.54);
    assert_eq!(to_ki(10.0, KicadVersion::V5), 100.0);
    assert_close(to_ki(10.0, KicadVersion::V6), 2.54);
    assert_eq!(fp_to_ki(3.937), 1.0);
    assert_close(convert_to_mm(3.937), 0.999998);
}

#[test]
fn rounding_is_idempotent() {
    for value in [0.125, 1.005, -2.675, 3.14159, 1e-9] {
        let once = round_to(value, 2);
        assert_eq!(round_to(once, 2), once);
        assert_eq!(fp_to_ki(value), round_to(convert_to_mm(value), 2));
    }
}

#[test]
fn negative_zero_is_kept_in_fixed_output() {
    assert_eq!(fmt_fixed(-(0.0f64), 2), "-0.00");
    assert_eq!(fmt_fixed(0.0, 2), "0.00");
    assert_eq!(fmt_int(-0.4), "0");
    assert_eq!(fmt_float(-2.0), "-2.0");
}

#[test]
fn bbox_origin_is_subtracted() {
    let origin = BoundingBoxOrigin::new(400.0, 300.0);
    assert_eq!(origin.relative(410.0, 290.0), (10.0, -10.0));
}

#[test]
fn pose_contributions_accumulate() {
    let footprint = Pose::from_translation(DVec3::new(1.0, 0.0, 0.0));
    let model = Pose {
        translation: DVec3::new(0.0, 1.0, 0.0),
        rotation: DVec3::new(0.0, 0.0, 90.0),
        scale: DVec3::splat(0.5),
    };
    let pose = Pose::identity().accumulate(&footprint).accumulate(&model);
    assert_vec_close(pose.translation, DVec3::new(1.0, 1.0, 0.0));
    assert_vec_close(pose.rotation, DVec3::new(0.0, 0.0, 90.0));
    assert_vec_close(pose.scale, DVec3::splat(0.5));
}

#[test]
fn zxy_euler_round_trip() {
    for degrees in [
        DVec3::new(30.0, 20.0, 45.0),
        DVec3::new(0.0, 0.0, 90.0),
        DVec3::new(-45.0, 120.0, 10.0),
    ] {
        let back = quat_to_euler_zxy(rotation_zxy(degrees));
        assert_vec_close(back, degrees);
    }
}

#[test]
fn pose_without_placement_is_absent() {
    let bounds = MeshBounds::default();
    assert!(compose_pose(&bounds, None).is_none());
}

#[test]
fn pose_centers_mesh_and_lifts_it() {
    let bounds = MeshBounds::from_points([DVec3::new(0.0, 0.0, 1.0), DVec3::new(2.0, 4.0, 3.0)])
        .expect("bounds");
    let placement = PlacementInfo {
        z: 1.0,
        ..Default::default()
    };
    let pose = compose_pose(&bounds, Some(&placement)).expect("pose");
    assert_vec_close(pose.translation, DVec3::new(-1.0, -2.0, 0.0));
    assert_vec_close(pose.rotation, DVec3::ZERO);
    assert_vec_close(pose.scale, DVec3::ONE);
}

#[test]
fn pose_scales_mesh_into_target_size() {
    let bounds = MeshBounds::from_points([DVec3::new(0.0, 0.0, 0.0), DVec3::new(2.0, 4.0, 1.0)])
        .expect("bounds");
    let placement = PlacementInfo {
        target_width: Some(1.0),
        target_height: Some(1.0),
        ..Default::default()
    };
    let pose = compose_pose(&bounds, Some(&placement)).expect("pose");
    assert_vec_close(pose.scale, DVec3::splat(0.25));
    assert_vec_close(pose.translation, DVec3::new(-0.25, -0.5, 0.0));
}

#[test]
fn placement_reads_model_node_in_mm() {
    let model = Ee3dModel {
        name: "R0805".to_string(),
        z: 10.0,
        rotation: (0.0, 0.0, 90.0),
        width: Some(10.0),
        ..Default::default()
    };
    let placement = PlacementInfo::from(&model);
    assert_close(placement.z, 2.54);
    assert_vec_close(placement.rotation, DVec3::new(0.0, 0.0, 90.0));
    assert_close(placement.target_width.unwrap_or_default(), 2.54);
    assert!(placement.target_height.is_none());
}
