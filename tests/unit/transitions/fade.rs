use super::*;

const LEAVING: Vec4 = Vec4::new(1.0, 0.2, 0.0, 1.0);
const ENTERING: Vec4 = Vec4::new(0.0, 0.6, 1.0, 1.0);

#[test]
fn cross_fade_blends_linearly() {
    let fade = FadeTransition::cross_fade();
    let uv = Vec2::new(0.3, 0.7);
    assert_eq!(fade.blend(uv, 0.0, LEAVING, ENTERING), LEAVING);
    assert_eq!(fade.blend(uv, 1.0, LEAVING, ENTERING), ENTERING);
    let mid = fade.blend(uv, 0.5, LEAVING, ENTERING);
    assert!(mid.abs_diff_eq((LEAVING + ENTERING) / 2.0, 1e-6));
}

#[test]
fn fade_over_color_passes_through_the_color() {
    let white = Vec4::ONE;
    let fade = FadeTransition::new(TransitionSubType::FadeOverColor, white);
    let uv = Vec2::ZERO;
    assert_eq!(fade.blend(uv, 0.5, LEAVING, ENTERING), white);
    assert!(fade.blend(uv, 0.25, LEAVING, ENTERING).abs_diff_eq((LEAVING + white) / 2.0, 1e-6));
    assert_eq!(fade.blend(uv, 1.0, LEAVING, ENTERING), ENTERING);
}

#[test]
fn shader_uses_the_matching_blend() {
    let cross = FadeTransition::cross_fade().fragment_shader().unwrap();
    assert!(cross.contains("mix(color0, color1, time)"));
    let over = FadeTransition::new(TransitionSubType::FadeToColor, Vec4::ONE)
        .fragment_shader()
        .unwrap();
    assert!(over.contains("fadeColor, time * 2.0"));
}
