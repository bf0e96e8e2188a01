use super::*;

#[test]
fn unit_quad_covers_the_slide_facing_the_viewer() {
    let quad = Primitive::unit_quad();
    assert_eq!(quad.vertices.len(), 6);
    for tri in quad.vertices.chunks(3) {
        let n = (tri[0].position - tri[1].position).cross(tri[1].position - tri[2].position);
        assert!(n.z >= 0.0);
    }
    let top_left = quad
        .vertices
        .iter()
        .find(|v| v.tex_coord == Vec2::ZERO)
        .unwrap();
    assert_eq!(top_left.position, Vec3::new(-1.0, 1.0, 0.0));
}

#[test]
fn back_facing_triangles_are_rewound() {
    let mut p = Primitive::new();
    // clockwise on screen once y is flipped
    p.push_triangle(Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0));
    let v = &p.vertices;
    let n = (v[0].position - v[1].position).cross(v[1].position - v[2].position);
    assert!(n.z >= 0.0);
    assert_eq!(v[1].tex_coord, Vec2::new(0.0, 1.0));
}

#[test]
fn cloned_primitive_has_its_own_operations() {
    let mut leaving = Primitive::unit_quad();
    leaving.push_operation(Operation::translate(Vec3::X, true, 0.0, 1.0));
    let mut entering = leaving.clone();
    entering.push_operation(Operation::rotate(Vec3::Y, Vec3::ZERO, 90.0, false, -1.0, 0.0));
    entering.vertices[0].position.z = 3.0;

    assert_eq!(leaving.operations.len(), 1);
    assert_eq!(entering.operations.len(), 2);
    assert_eq!(leaving.vertices[0].position.z, 0.0);
}

#[test]
fn transform_applies_aspect_last() {
    let mut p = Primitive::unit_quad();
    p.push_operation(Operation::translate(Vec3::new(1.0, 0.0, 0.0), true, 0.0, 1.0));
    let m = p.transform(1.0, 1.0, 0.5);
    let corner = m.transform_point3(Vec3::new(1.0, 1.0, 0.0));
    assert!(corner.abs_diff_eq(Vec3::new(2.0, 0.5, 0.0), 1e-6));
}

#[test]
fn halves_policy_switches_at_midpoint() {
    assert!(DrawPolicy::Halves.draws_leaving(0.49));
    assert!(!DrawPolicy::Halves.draws_entering(0.49));
    assert!(DrawPolicy::Halves.draws_entering(0.5));
    assert!(DrawPolicy::Both.draws_leaving(0.9) && DrawPolicy::Both.draws_entering(0.1));
}

#[test]
fn slide_fits_into_the_unit_square() {
    assert_eq!(slide_scales(1920, 1080), (1.0, 1080.0 / 1920.0));
    assert_eq!(slide_scales(600, 800), (0.75, 1.0));
    assert_eq!(slide_scales(0, 10), (1.0, 1.0));
}

#[test]
fn scene_sits_inside_the_view_volume() {
    let mvp = projection_matrix() * model_view_matrix();
    let p = mvp.project_point3(Vec3::new(1.0, 1.0, 0.0));
    let limit = 1.0 + 1e-5;
    assert!(p.x.abs() <= limit && p.y.abs() <= limit && p.z.abs() <= limit);
}
