//! The GL surface a slide change draws through.

use std::fmt;

use glam::{Mat4, Vec4};
use image::RgbaImage;

use crate::foundation::error::SlideShowResult;
use crate::transitions::primitive::Vertex;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Uniform {
    Float(f32),
    Int(i32),
    Vec4(Vec4),
    Mat4(Mat4),
}

/// Minimal GL-style device used by slide changes.
///
/// Ids are only valid on the backend that issued them. Deleting an unknown id is a no-op.
pub trait GlBackend: fmt::Debug {
    fn create_program(&mut self, vertex: &str, fragment: &str) -> SlideShowResult<ProgramId>;

    fn delete_program(&mut self, program: ProgramId);

    fn use_program(&mut self, program: ProgramId);

    fn create_texture(&mut self, image: &RgbaImage, mipmaps: bool) -> SlideShowResult<TextureId>;

    fn delete_texture(&mut self, texture: TextureId);

    fn bind_texture(&mut self, unit: u32, texture: TextureId);

    /// Uniforms the program does not declare are ignored.
    fn set_uniform(&mut self, program: ProgramId, name: &str, value: Uniform);

    fn upload_vertices(&mut self, vertices: &[Vertex]) -> SlideShowResult<BufferId>;

    fn delete_buffer(&mut self, buffer: BufferId);

    fn draw_triangles(&mut self, buffer: BufferId, first: usize, count: usize);

    fn clear(&mut self, color: Vec4);
}

/// One call made on a [`GlBackend`].
#[derive(Clone, Debug, PartialEq)]
pub enum GlCommand {
    CreateProgram(ProgramId),
    DeleteProgram(ProgramId),
    UseProgram(ProgramId),
    CreateTexture {
        texture: TextureId,
        width: u32,
        height: u32,
        mipmaps: bool,
    },
    DeleteTexture(TextureId),
    BindTexture {
        unit: u32,
        texture: TextureId,
    },
    SetUniform {
        program: ProgramId,
        name: String,
        value: Uniform,
    },
    UploadVertices {
        buffer: BufferId,
        count: usize,
    },
    DeleteBuffer(BufferId),
    DrawTriangles {
        buffer: BufferId,
        first: usize,
        count: usize,
    },
    Clear(Vec4),
}

impl GlCommand {
    pub fn is_draw(&self) -> bool {
        matches!(self, Self::DrawTriangles { .. })
    }
}
