use super::*;
use glam::Vec3;

#[test]
fn step_and_fract_follow_glsl() {
    assert_eq!(step(0.5, 0.4), 0.0);
    assert_eq!(step(0.5, 0.5), 1.0);
    assert!((fract(-0.25) - 0.75).abs() < 1e-6);
    assert!((fract(2.5) - 0.5).abs() < 1e-6);
}

#[test]
fn frustum_maps_near_plane_corners_to_clip_edges() {
    let m = frustum(-8.0, 8.0, -8.0, 8.0, 5.0, 25.0);
    let p = m.project_point3(Vec3::new(8.0, 8.0, -5.0));
    assert!((p.x - 1.0).abs() < 1e-5);
    assert!((p.y - 1.0).abs() < 1e-5);
    assert!((p.z + 1.0).abs() < 1e-5);
    let far = m.project_point3(Vec3::new(0.0, 0.0, -25.0));
    assert!((far.z - 1.0).abs() < 1e-5);
}

#[test]
fn lerp_endpoints() {
    assert_eq!(lerp(2.0, 4.0, 0.0), 2.0);
    assert_eq!(lerp(2.0, 4.0, 1.0), 4.0);
    assert!(approx_eq(lerp(2.0, 4.0, 0.25), 2.5, 1e-12));
    assert_eq!(clamp01(3.0), 1.0);
}
