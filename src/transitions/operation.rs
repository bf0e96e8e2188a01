//! Time-windowed matrix operations composed onto 3D transition primitives.

use glam::{Mat4, Vec3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OperationKind {
    /// Translate by `vector`, x and y scaled by the slide scales.
    Translate { vector: Vec3 },
    /// Rotate `angle` degrees about `axis` through `origin`.
    Rotate { axis: Vec3, origin: Vec3, angle: f32 },
    /// Scale towards `scale` around `origin`.
    Scale { scale: Vec3, origin: Vec3 },
    /// Rotation whose origin depth is scaled by the slide width scale.
    RotateDepthByWidth { axis: Vec3, origin: Vec3, angle: f32 },
    /// Rotation whose origin depth is scaled by the slide height scale.
    RotateDepthByHeight { axis: Vec3, origin: Vec3, angle: f32 },
    /// Move along an ellipse in the xz plane between two fractions of a turn.
    EllipseTranslate {
        width: f32,
        height: f32,
        start_position: f32,
        end_position: f32,
    },
}

/// A transform active in the window `[t0, t1]` of the transition.
///
/// Before `t0` the matrix is left untouched. Past `t1` the operation holds its end state. With
/// `interpolate` unset any time past `t0` jumps straight to the end state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Operation {
    pub kind: OperationKind,
    pub interpolate: bool,
    pub t0: f64,
    pub t1: f64,
}

impl Operation {
    pub fn new(kind: OperationKind, interpolate: bool, t0: f64, t1: f64) -> Self {
        Self {
            kind,
            interpolate,
            t0,
            t1,
        }
    }

    pub fn translate(vector: Vec3, interpolate: bool, t0: f64, t1: f64) -> Self {
        Self::new(OperationKind::Translate { vector }, interpolate, t0, t1)
    }

    pub fn rotate(axis: Vec3, origin: Vec3, angle: f32, interpolate: bool, t0: f64, t1: f64) -> Self {
        Self::new(
            OperationKind::Rotate {
                axis,
                origin,
                angle,
            },
            interpolate,
            t0,
            t1,
        )
    }

    pub fn scale(scale: Vec3, origin: Vec3, interpolate: bool, t0: f64, t1: f64) -> Self {
        Self::new(OperationKind::Scale { scale, origin }, interpolate, t0, t1)
    }

    pub fn rotate_depth_by_width(
        axis: Vec3,
        origin: Vec3,
        angle: f32,
        interpolate: bool,
        t0: f64,
        t1: f64,
    ) -> Self {
        Self::new(
            OperationKind::RotateDepthByWidth {
                axis,
                origin,
                angle,
            },
            interpolate,
            t0,
            t1,
        )
    }

    pub fn rotate_depth_by_height(
        axis: Vec3,
        origin: Vec3,
        angle: f32,
        interpolate: bool,
        t0: f64,
        t1: f64,
    ) -> Self {
        Self::new(
            OperationKind::RotateDepthByHeight {
                axis,
                origin,
                angle,
            },
            interpolate,
            t0,
            t1,
        )
    }

    pub fn ellipse_translate(
        width: f32,
        height: f32,
        start_position: f32,
        end_position: f32,
        interpolate: bool,
        t0: f64,
        t1: f64,
    ) -> Self {
        Self::new(
            OperationKind::EllipseTranslate {
                width,
                height,
                start_position,
                end_position,
            },
            interpolate,
            t0,
            t1,
        )
    }

    /// Progress through the window for transition time `t`, `None` before the window opens.
    pub fn fraction(&self, t: f64) -> Option<f64> {
        if t <= self.t0 {
            return None;
        }
        // an empty window jumps straight to the end state
        if self.t1 <= self.t0 {
            return Some(1.0);
        }
        let t = if !self.interpolate || t > self.t1 {
            self.t1
        } else {
            t
        };
        Some((t - self.t0) / (self.t1 - self.t0))
    }

    pub fn interpolate(&self, matrix: Mat4, t: f64, width_scale: f64, height_scale: f64) -> Mat4 {
        let Some(f) = self.fraction(t) else {
            return matrix;
        };
        let f = f as f32;
        let sx = width_scale as f32;
        let sy = height_scale as f32;

        match self.kind {
            OperationKind::Translate { vector } => {
                matrix * Mat4::from_translation(Vec3::new(sx * f * vector.x, sy * f * vector.y, f * vector.z))
            }
            OperationKind::Rotate {
                axis,
                origin,
                angle,
            } => rotate_about(
                matrix,
                Vec3::new(sx * origin.x, sy * origin.y, origin.z),
                Vec3::new(sx * sx, sy * sy, 1.0),
                axis,
                f * angle,
            ),
            OperationKind::RotateDepthByWidth {
                axis,
                origin,
                angle,
            } => rotate_about(
                matrix,
                Vec3::new(sx * origin.x, sy * origin.y, sx * origin.z),
                Vec3::new(sx * sx, sy * sy, 1.0),
                axis,
                f * angle,
            ),
            OperationKind::RotateDepthByHeight {
                axis,
                origin,
                angle,
            } => rotate_about(
                matrix,
                Vec3::new(sx * origin.x, sy * origin.y, sy * origin.z),
                Vec3::new(sx * sx, sy * sy, 1.0),
                axis,
                f * angle,
            ),
            OperationKind::Scale { scale, origin } => {
                let pivot = Vec3::new(sx * origin.x, sy * origin.y, origin.z);
                let factor = Vec3::splat(1.0 - f) + scale * f;
                matrix
                    * Mat4::from_translation(pivot)
                    * Mat4::from_scale(factor)
                    * Mat4::from_translation(-pivot)
            }
            OperationKind::EllipseTranslate {
                width,
                height,
                start_position,
                end_position,
            } => {
                let tau = std::f32::consts::TAU;
                let a1 = start_position * tau;
                let a2 = (start_position + f * (end_position - start_position)) * tau;
                let x = width * (a2.cos() - a1.cos()) / 2.0;
                let z = height * (a2.sin() - a1.sin()) / 2.0;
                matrix * Mat4::from_translation(Vec3::new(x, 0.0, z))
            }
        }
    }
}

/// Rotation in slide space: move to `pivot`, undo the slide aspect, rotate, restore.
fn rotate_about(matrix: Mat4, pivot: Vec3, aspect: Vec3, axis: Vec3, degrees: f32) -> Mat4 {
    let Some(axis) = axis.try_normalize() else {
        return matrix;
    };
    matrix
        * Mat4::from_translation(pivot)
        * Mat4::from_scale(aspect)
        * Mat4::from_axis_angle(axis, degrees.to_radians())
        * Mat4::from_scale(aspect.recip())
        * Mat4::from_translation(-pivot)
}

/// Fold `operations` in order onto `matrix`.
pub fn apply_all(operations: &[Operation], matrix: Mat4, t: f64, width_scale: f64, height_scale: f64) -> Mat4 {
    operations
        .iter()
        .fold(matrix, |m, op| op.interpolate(m, t, width_scale, height_scale))
}

#[cfg(test)]
#[path = "../../tests/unit/transitions/operation.rs"]
mod tests;
