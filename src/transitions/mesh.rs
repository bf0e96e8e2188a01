//! 3D transitions: slides cut into primitives that move through space.

use std::f32::consts::PI;

use glam::{Vec2, Vec3};

use crate::foundation::error::SlideShowResult;
use crate::transitions::kind::TransitionKind;
use crate::transitions::operation::Operation;
use crate::transitions::primitive::{DrawPolicy, Primitive, TransitionScene};
use crate::transitions::shader::{
    DISSOLVE_BODY, DISSOLVE_DECLARATIONS, MESH_FRAGMENT, MESH_LIT_BODY,
};
use crate::transitions::types::TransitionSubType as S;

/// Fragment program flavour of a mesh transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeshShading {
    Lit,
    /// Per texel switch driven by a permutation texture.
    Dissolve,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MeshTransition {
    kind: TransitionKind,
    scene: TransitionScene,
    policy: DrawPolicy,
    shading: MeshShading,
}

impl MeshTransition {
    pub fn new(kind: TransitionKind, scene: TransitionScene, policy: DrawPolicy, shading: MeshShading) -> Self {
        Self {
            kind,
            scene,
            policy,
            shading,
        }
    }

    /// Build the scene for one of the 3D kinds.
    pub fn build(kind: TransitionKind, subtype: S, push: bool) -> Self {
        let lit = |scene, policy| Self::new(kind, scene, policy, MeshShading::Lit);
        match kind {
            TransitionKind::Cover => lit(cover(subtype, push), DrawPolicy::Both),
            TransitionKind::Cube if subtype == S::CornersIn => lit(inside_cube(), DrawPolicy::Both),
            TransitionKind::Cube => lit(outside_cube(), DrawPolicy::Both),
            TransitionKind::Helix => lit(helix(20), DrawPolicy::Halves),
            TransitionKind::Fall => lit(fall(), DrawPolicy::Both),
            TransitionKind::TurnAround => lit(turn_around(), DrawPolicy::Halves),
            TransitionKind::FlipTiles => lit(flip_tiles(8, 6), DrawPolicy::Halves),
            TransitionKind::Venetian3d if subtype == S::TopCenter => {
                lit(venetian_blinds(false, 6), DrawPolicy::Halves)
            }
            TransitionKind::Venetian3d => lit(venetian_blinds(true, 8), DrawPolicy::Halves),
            TransitionKind::NewsFlash => lit(news_flash(), DrawPolicy::Halves),
            TransitionKind::Dissolve => Self::new(
                kind,
                TransitionScene::new(vec![Primitive::unit_quad()], vec![Primitive::unit_quad()], Vec::new()),
                DrawPolicy::Both,
                MeshShading::Dissolve,
            ),
            other => {
                tracing::warn!(kind = %other, "not a mesh transition, drawing a plain cut");
                Self::new(
                    other,
                    TransitionScene::new(Vec::new(), vec![Primitive::unit_quad()], Vec::new()),
                    DrawPolicy::Both,
                    MeshShading::Lit,
                )
            }
        }
    }

    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    pub fn scene(&self) -> &TransitionScene {
        &self.scene
    }

    pub fn policy(&self) -> DrawPolicy {
        self.policy
    }

    pub fn shading(&self) -> MeshShading {
        self.shading
    }

    pub fn fragment_shader(&self) -> SlideShowResult<String> {
        let (declarations, body) = match self.shading {
            MeshShading::Lit => ("", MESH_LIT_BODY),
            MeshShading::Dissolve => (DISSOLVE_DECLARATIONS, DISSOLVE_BODY),
        };
        MESH_FRAGMENT.render(&[("declarations", declarations), ("body", body)])
    }
}

fn cover(subtype: S, push: bool) -> TransitionScene {
    // where the entering slide comes from, in slide space (y up)
    let from = match subtype {
        S::FromTop => Vec3::new(0.0, 2.0, 0.0),
        S::FromRight => Vec3::new(2.0, 0.0, 0.0),
        S::FromBottom => Vec3::new(0.0, -2.0, 0.0),
        S::FromTopLeft => Vec3::new(-2.0, 2.0, 0.0),
        S::FromTopRight => Vec3::new(2.0, 2.0, 0.0),
        S::FromBottomLeft => Vec3::new(-2.0, -2.0, 0.0),
        S::FromBottomRight => Vec3::new(2.0, -2.0, 0.0),
        _ => Vec3::new(-2.0, 0.0, 0.0),
    };

    let mut leaving = Primitive::unit_quad();
    if push {
        leaving.push_operation(Operation::translate(-from, true, 0.0, 1.0));
    }
    let mut entering = Primitive::unit_quad();
    entering.push_operation(Operation::translate(from, false, -1.0, 0.0));
    entering.push_operation(Operation::translate(-from, true, 0.0, 1.0));
    // the covering slide sits slightly in front
    entering.push_operation(Operation::translate(Vec3::new(0.0, 0.0, 0.01), false, -1.0, 0.0));

    TransitionScene::new(vec![leaving], vec![entering], Vec::new())
}

fn outside_cube() -> TransitionScene {
    let slide = Primitive::unit_quad();
    let leaving = vec![slide.clone()];
    let mut face = slide;
    face.push_operation(Operation::rotate_depth_by_width(
        Vec3::Y,
        Vec3::new(0.0, 0.0, -1.0),
        90.0,
        false,
        -1.0,
        0.0,
    ));
    let overall = vec![Operation::rotate_depth_by_width(
        Vec3::Y,
        Vec3::new(0.0, 0.0, -1.0),
        -90.0,
        true,
        0.0,
        1.0,
    )];
    TransitionScene::new(leaving, vec![face], overall)
}

fn inside_cube() -> TransitionScene {
    let slide = Primitive::unit_quad();
    let leaving = vec![slide.clone()];
    let mut face = slide;
    face.push_operation(Operation::rotate_depth_by_width(
        Vec3::Y,
        Vec3::new(0.0, 0.0, 1.0),
        -90.0,
        false,
        -1.0,
        0.0,
    ));
    let overall = vec![Operation::rotate_depth_by_width(
        Vec3::Y,
        Vec3::new(0.0, 0.0, 1.0),
        90.0,
        true,
        0.0,
        1.0,
    )];
    TransitionScene::new(leaving, vec![face], overall)
}

fn fall() -> TransitionScene {
    let slide = Primitive::unit_quad();
    let entering = vec![slide.clone()];
    let mut falling = slide;
    falling.push_operation(Operation::rotate(
        Vec3::X,
        Vec3::new(0.0, -1.0, 0.0),
        90.0,
        true,
        0.0,
        1.0,
    ));
    TransitionScene::new(vec![falling], entering, Vec::new())
}

fn turn_around() -> TransitionScene {
    let slide = Primitive::unit_quad();
    let leaving = vec![slide.clone()];
    let mut back = slide;
    back.push_operation(Operation::rotate(Vec3::Y, Vec3::ZERO, -180.0, false, -1.0, 0.0));
    let overall = vec![
        Operation::translate(Vec3::new(0.0, 0.0, -1.5), true, 0.0, 0.5),
        Operation::translate(Vec3::new(0.0, 0.0, 1.5), true, 0.5, 1.0),
        Operation::rotate_depth_by_width(Vec3::Y, Vec3::ZERO, -180.0, true, 0.0, 1.0),
    ];
    TransitionScene::new(leaving, vec![back], overall)
}

fn helix(rows: u32) -> TransitionScene {
    let inv = 1.0 / rows as f32;
    let half = rows as f32 / 2.0;
    let mut leaving = Vec::new();
    let mut entering = Vec::new();
    for i in 0..rows {
        let top = i as f32 * inv;
        let bottom = top + inv;
        let mut tile = Primitive::new();
        tile.push_triangle(Vec2::new(1.0, top), Vec2::new(0.0, top), Vec2::new(0.0, bottom));
        tile.push_triangle(Vec2::new(1.0, bottom), Vec2::new(1.0, top), Vec2::new(0.0, bottom));

        let pivot = tile.midpoint(1, 3);
        let t0 = f64::from(((i as f32 - half) * inv / 2.0).clamp(0.0, 1.0));
        let t1 = f64::from(((i as f32 + half) * inv / 2.0).clamp(0.0, 1.0));
        tile.push_operation(Operation::rotate(Vec3::Y, pivot, 180.0, true, t0, t1));
        leaving.push(tile.clone());

        tile.push_operation(Operation::rotate(Vec3::Y, pivot, -180.0, false, -1.0, 0.0));
        entering.push(tile);
    }
    TransitionScene::new(leaving, entering, Vec::new())
}

fn flip_tiles(columns: u32, rows: u32) -> TransitionScene {
    let w = 1.0 / columns as f32;
    let h = 1.0 / rows as f32;
    let mut leaving = Vec::new();
    let mut entering = Vec::new();
    for x in 0..columns {
        for y in 0..rows {
            let x11 = Vec2::new(x as f32 * w, y as f32 * h);
            let x12 = Vec2::new(x as f32 * w, (y + 1) as f32 * h);
            let x21 = Vec2::new((x + 1) as f32 * w, y as f32 * h);
            let x22 = Vec2::new((x + 1) as f32 * w, (y + 1) as f32 * h);

            let mut tile = Primitive::new();
            tile.push_triangle(x21, x11, x12);
            tile.push_triangle(x22, x21, x12);

            let pivot = tile.midpoint(1, 3);
            let t0 = f64::from(x11.x * x11.y / 2.0);
            let t1 = f64::from((x22.x * x22.y + 1.0) / 2.0);
            tile.push_operation(Operation::rotate(Vec3::Y, pivot, 180.0, true, t0, t1));
            leaving.push(tile.clone());

            tile.push_operation(Operation::rotate(Vec3::Y, pivot, -180.0, false, -1.0, 0.0));
            entering.push(tile);
        }
    }
    TransitionScene::new(leaving, entering, Vec::new())
}

fn venetian_blinds(vertical: bool, parts: u32) -> TransitionScene {
    let t30 = (PI / 6.0).tan();
    let p = 1.0 / parts as f32;
    let mut ln = 0.0f32;
    let mut leaving = Vec::new();
    let mut entering = Vec::new();
    for i in 0..parts {
        let n = p * (i + 1) as f32;
        let mut slat = Primitive::new();
        if vertical {
            slat.push_triangle(Vec2::new(ln, 0.0), Vec2::new(n, 0.0), Vec2::new(ln, 1.0));
            slat.push_triangle(Vec2::new(n, 0.0), Vec2::new(ln, 1.0), Vec2::new(n, 1.0));
            slat.push_operation(Operation::rotate_depth_by_width(
                Vec3::Y,
                Vec3::new(n + ln - 1.0, 0.0, -t30 * p),
                -120.0,
                true,
                0.0,
                1.0,
            ));
        } else {
            slat.push_triangle(Vec2::new(0.0, ln), Vec2::new(1.0, ln), Vec2::new(0.0, n));
            slat.push_triangle(Vec2::new(1.0, ln), Vec2::new(0.0, n), Vec2::new(1.0, n));
            slat.push_operation(Operation::rotate_depth_by_height(
                Vec3::X,
                Vec3::new(0.0, 1.0 - n - ln, -t30 * p),
                -120.0,
                true,
                0.0,
                1.0,
            ));
        }
        leaving.push(slat.clone());

        if vertical {
            slat.push_operation(Operation::rotate(Vec3::Y, Vec3::new(2.0 * n - 1.0, 0.0, 0.0), -60.0, false, -1.0, 0.0));
            slat.push_operation(Operation::rotate(Vec3::Y, Vec3::new(n + ln - 1.0, 0.0, 0.0), 180.0, false, -1.0, 0.0));
        } else {
            slat.push_operation(Operation::rotate(Vec3::X, Vec3::new(0.0, 1.0 - 2.0 * n, 0.0), -60.0, false, -1.0, 0.0));
            slat.push_operation(Operation::rotate(Vec3::X, Vec3::new(0.0, 1.0 - n - ln, 0.0), 180.0, false, -1.0, 0.0));
        }
        entering.push(slat);
        ln = n;
    }
    TransitionScene::new(leaving, entering, Vec::new())
}

fn news_flash() -> TransitionScene {
    let mut leaving = Primitive::unit_quad();
    leaving.push_operation(Operation::rotate(Vec3::Z, Vec3::ZERO, 3600.0, true, 0.0, 0.5));
    leaving.push_operation(Operation::scale(Vec3::splat(0.01), Vec3::ZERO, true, 0.0, 0.5));
    leaving.push_operation(Operation::translate(Vec3::new(-10000.0, 0.0, 0.0), false, 0.5, 2.0));

    let mut entering = Primitive::unit_quad();
    entering.push_operation(Operation::rotate(Vec3::Z, Vec3::ZERO, -3600.0, true, 0.5, 1.0));
    entering.push_operation(Operation::translate(Vec3::new(-100.0, 0.0, 0.0), false, -1.0, 1.0));
    entering.push_operation(Operation::translate(Vec3::new(100.0, 0.0, 0.0), false, 0.5, 1.0));
    entering.push_operation(Operation::scale(Vec3::splat(0.01), Vec3::ZERO, false, -1.0, 1.0));
    entering.push_operation(Operation::scale(Vec3::splat(100.0), Vec3::ZERO, true, 0.5, 1.0));

    let overall = vec![Operation::rotate(Vec3::Z, Vec3::new(0.2, 0.2, 0.0), 1080.0, true, 0.0, 1.0)];
    TransitionScene::new(vec![leaving], vec![entering], overall)
}

/// Deterministic byte noise for the dissolve permutation texture.
pub fn permutation_texture(size: u32) -> image::RgbaImage {
    let mut state: u32 = 0x9e37_79b9;
    image::RgbaImage::from_fn(size, size, |_, _| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let v = (state & 0xff) as u8;
        image::Rgba([v, v, v, 255])
    })
}

#[cfg(test)]
#[path = "../../tests/unit/transitions/mesh.rs"]
mod tests;
