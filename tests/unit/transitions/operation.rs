use super::*;

fn samples() -> Vec<Operation> {
    vec![
        Operation::translate(Vec3::new(2.0, -1.0, 0.5), true, 0.2, 0.6),
        Operation::rotate(Vec3::Y, Vec3::new(0.0, 0.0, -1.0), 90.0, true, 0.2, 0.6),
        Operation::scale(Vec3::splat(0.01), Vec3::ZERO, true, 0.2, 0.6),
        Operation::rotate_depth_by_width(Vec3::Y, Vec3::new(0.0, 0.0, -1.0), -90.0, true, 0.2, 0.6),
        Operation::ellipse_translate(0.5, 0.5, 0.25, 1.0, true, 0.2, 0.6),
    ]
}

fn start() -> Mat4 {
    Mat4::from_translation(Vec3::new(0.1, 0.2, 0.3)) * Mat4::from_scale(Vec3::new(1.0, 2.0, 1.0))
}

#[test]
fn matrix_untouched_until_window_opens() {
    for op in samples() {
        for t in [-1.0, 0.0, 0.1, 0.2] {
            assert_eq!(op.interpolate(start(), t, 1.3, 0.7), start(), "{op:?} at {t}");
        }
    }
}

#[test]
fn matrix_clamps_after_window_closes() {
    for op in samples() {
        let end = op.interpolate(start(), 0.6, 1.3, 0.7);
        for t in [0.61, 0.8, 1.0, 5.0] {
            assert!(op.interpolate(start(), t, 1.3, 0.7).abs_diff_eq(end, 1e-6), "{op:?} at {t}");
        }
    }
}

#[test]
fn window_is_remapped_linearly() {
    let op = Operation::translate(Vec3::X, true, 0.2, 0.6);
    assert_eq!(op.fraction(0.2), None);
    assert!((op.fraction(0.3).unwrap() - 0.25).abs() < 1e-12);
    assert!((op.fraction(0.4).unwrap() - 0.5).abs() < 1e-12);
    assert_eq!(op.fraction(0.9), Some(1.0));

    let m = op.interpolate(Mat4::IDENTITY, 0.4, 1.0, 1.0);
    assert!((m.w_axis.x - 0.5).abs() < 1e-6);
}

#[test]
fn discrete_operations_jump_to_end_state() {
    for op in samples() {
        let discrete = Operation { interpolate: false, ..op };
        let end = discrete.interpolate(start(), discrete.t1, 1.3, 0.7);
        let eps = 1e-4;
        let early = discrete.interpolate(start(), discrete.t0 + eps, 1.3, 0.7);
        let late = discrete.interpolate(start(), discrete.t1 - eps, 1.3, 0.7);
        assert!(early.abs_diff_eq(end, 1e-6), "{op:?}");
        assert!(late.abs_diff_eq(end, 1e-6), "{op:?}");
        assert_eq!(discrete.interpolate(start(), discrete.t0, 1.3, 0.7), start());
    }
}

#[test]
fn operations_compose_in_order() {
    let ops = [
        Operation::rotate(Vec3::Z, Vec3::ZERO, 90.0, true, 0.0, 1.0),
        Operation::translate(Vec3::X, true, 0.0, 1.0),
    ];
    let m = apply_all(&ops, Mat4::IDENTITY, 1.0, 1.0, 1.0);
    let p = m.transform_point3(Vec3::ZERO);
    // translation is applied in the rotated frame
    assert!(p.abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), 1e-5));

    let reversed = [ops[1], ops[0]];
    let q = apply_all(&reversed, Mat4::IDENTITY, 1.0, 1.0, 1.0).transform_point3(Vec3::ZERO);
    assert!(q.abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), 1e-5));
}

#[test]
fn scale_reaches_target_factor() {
    let op = Operation::scale(Vec3::splat(0.5), Vec3::ZERO, true, 0.0, 1.0);
    let p = op.interpolate(Mat4::IDENTITY, 1.0, 1.0, 1.0).transform_point3(Vec3::new(2.0, 2.0, 0.0));
    assert!(p.abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-6));
}

#[test]
fn empty_window_acts_as_a_step() {
    let op = Operation::translate(Vec3::X, true, 0.5, 0.5);
    assert_eq!(op.fraction(0.5), None);
    assert_eq!(op.fraction(0.7), Some(1.0));

    let m = op.interpolate(Mat4::IDENTITY, 0.7, 1.0, 1.0);
    assert!(m.is_finite());
    assert!((m.w_axis.x - 1.0).abs() < 1e-6);
    assert_eq!(op.interpolate(Mat4::IDENTITY, 0.2, 1.0, 1.0), Mat4::IDENTITY);

    let discrete = Operation::translate(Vec3::X, false, 0.5, 0.5);
    assert!(discrete.interpolate(Mat4::IDENTITY, 0.7, 1.0, 1.0).is_finite());
}
