use glam::{Mat4, Vec4};

pub(crate) fn clamp01(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    (1.0 - t) * a + t * b
}

/// GLSL `fract`: `x - floor(x)`, also for negative inputs.
pub(crate) fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// GLSL `step(edge, x)`.
pub(crate) fn step(edge: f32, x: f32) -> f32 {
    if x < edge { 0.0 } else { 1.0 }
}

pub(crate) fn mix4(a: Vec4, b: Vec4, t: f32) -> Vec4 {
    a * (1.0 - t) + b * t
}

/// OpenGL-style perspective frustum (right-handed, clip z in [-1, 1]).
pub(crate) fn frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    let rl = right - left;
    let tb = top - bottom;
    let fnr = far - near;
    Mat4::from_cols_array(&[
        2.0 * near / rl,
        0.0,
        0.0,
        0.0,
        0.0,
        2.0 * near / tb,
        0.0,
        0.0,
        (right + left) / rl,
        (top + bottom) / tb,
        -(far + near) / fnr,
        -1.0,
        0.0,
        0.0,
        -2.0 * far * near / fnr,
        0.0,
    ])
}

pub(crate) fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
