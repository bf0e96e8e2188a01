use glam::{Mat4, Vec2, Vec3};

use crate::foundation::math::frustum;
use crate::transitions::operation::{Operation, apply_all};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tex_coord: Vec2,
}

impl Vertex {
    /// Interleaved `position, normal, tex_coord` as uploaded to a vertex buffer.
    pub const FLOATS: usize = 8;

    pub fn to_array(&self) -> [f32; Self::FLOATS] {
        [
            self.position.x,
            self.position.y,
            self.position.z,
            self.normal.x,
            self.normal.y,
            self.normal.z,
            self.tex_coord.x,
            self.tex_coord.y,
        ]
    }
}

/// A small mesh cut from the slide plus the operations that move it.
///
/// `Clone` copies both the vertices and the operation list, so a primitive built for the leaving
/// slide can be cloned and extended for the entering slide.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Primitive {
    pub vertices: Vec<Vertex>,
    pub operations: Vec<Operation>,
}

impl Primitive {
    pub fn new() -> Self {
        Self::default()
    }

    /// The whole slide as two triangles.
    pub fn unit_quad() -> Self {
        let mut quad = Self::new();
        quad.push_triangle(Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0));
        quad.push_triangle(Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0), Vec2::new(1.0, 1.0));
        quad
    }

    /// Add a triangle given in slide coordinates (`0..1`, top-left origin).
    ///
    /// Vertices land in `-1..1` with y pointing up, and the winding is flipped where needed so
    /// the face looks towards the viewer.
    pub fn push_triangle(&mut self, a: Vec2, b: Vec2, c: Vec2) {
        let to_space = |p: Vec2| Vec3::new(2.0 * p.x - 1.0, -2.0 * p.y + 1.0, 0.0);
        let (pa, pb, pc) = (to_space(a), to_space(b), to_space(c));
        let facing = (pa - pb).cross(pb - pc).z >= 0.0;
        let corners = if facing {
            [(pa, a), (pb, b), (pc, c)]
        } else {
            [(pa, a), (pc, c), (pb, b)]
        };
        self.vertices
            .extend(corners.into_iter().map(|(position, tex_coord)| Vertex {
                position,
                normal: Vec3::Z,
                tex_coord,
            }));
    }

    pub fn vertex(&self, index: usize) -> Option<Vec3> {
        self.vertices.get(index).map(|v| v.position)
    }

    /// Midpoint of two vertices, the usual pivot for tile flips.
    pub fn midpoint(&self, a: usize, b: usize) -> Vec3 {
        match (self.vertex(a), self.vertex(b)) {
            (Some(a), Some(b)) => (a + b) / 2.0,
            _ => Vec3::ZERO,
        }
    }

    pub fn push_operation(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    /// Model matrix at time `t`: all operations in order, then the slide aspect scale.
    pub fn transform(&self, t: f64, width_scale: f64, height_scale: f64) -> Mat4 {
        apply_all(&self.operations, Mat4::IDENTITY, t, width_scale, height_scale)
            * Mat4::from_scale(Vec3::new(width_scale as f32, height_scale as f32, 1.0))
    }
}

/// Which slide meshes are drawn at a given time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawPolicy {
    Both,
    /// Leaving slide before `t = 0.5`, entering slide from then on.
    Halves,
}

impl DrawPolicy {
    pub fn draws_leaving(self, t: f64) -> bool {
        match self {
            Self::Both => true,
            Self::Halves => t < 0.5,
        }
    }

    pub fn draws_entering(self, t: f64) -> bool {
        match self {
            Self::Both => true,
            Self::Halves => t >= 0.5,
        }
    }
}

/// Meshes of both slides plus the operations applied to the scene as a whole.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransitionScene {
    pub leaving: Vec<Primitive>,
    pub entering: Vec<Primitive>,
    pub overall: Vec<Operation>,
}

impl TransitionScene {
    pub fn new(leaving: Vec<Primitive>, entering: Vec<Primitive>, overall: Vec<Operation>) -> Self {
        Self {
            leaving,
            entering,
            overall,
        }
    }

    pub fn scene_transform(&self, t: f64, width_scale: f64, height_scale: f64) -> Mat4 {
        apply_all(&self.overall, Mat4::IDENTITY, t, width_scale, height_scale)
    }
}

pub fn projection_matrix() -> Mat4 {
    frustum(-8.0, 8.0, -8.0, 8.0, 5.0, 25.0) * Mat4::from_scale(Vec3::new(16.0, 16.0, 1.0))
}

pub fn model_view_matrix() -> Mat4 {
    Mat4::from_translation(Vec3::new(0.0, 0.0, -10.0))
}

/// Fit a `width` x `height` slide into the unit square, keeping its aspect.
pub fn slide_scales(width: u32, height: u32) -> (f64, f64) {
    if width == 0 || height == 0 {
        return (1.0, 1.0);
    }
    let (w, h) = (f64::from(width), f64::from(height));
    if w >= h { (1.0, h / w) } else { (w / h, 1.0) }
}

#[cfg(test)]
#[path = "../../tests/unit/transitions/primitive.rs"]
mod tests;
