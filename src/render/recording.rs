//! Headless [`GlBackend`] that records every call.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use glam::Vec4;
use image::RgbaImage;

use crate::foundation::error::{SlideShowError, SlideShowResult};
use crate::render::backend::{BufferId, GlBackend, GlCommand, ProgramId, TextureId, Uniform};
use crate::transitions::primitive::Vertex;

/// Shared view of the commands a [`RecordingBackend`] has seen.
#[derive(Clone, Debug, Default)]
pub struct CommandLog(Rc<RefCell<Vec<GlCommand>>>);

impl CommandLog {
    pub fn snapshot(&self) -> Vec<GlCommand> {
        self.0.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn draw_count(&self) -> usize {
        self.0.borrow().iter().filter(|c| c.is_draw()).count()
    }

    /// Last value set for `name`, on any program.
    pub fn last_uniform(&self, name: &str) -> Option<Uniform> {
        self.0.borrow().iter().rev().find_map(|c| match c {
            GlCommand::SetUniform { name: n, value, .. } if n == name => Some(*value),
            _ => None,
        })
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    fn push(&self, command: GlCommand) {
        self.0.borrow_mut().push(command);
    }
}

#[derive(Debug, Default)]
pub struct RecordingBackend {
    log: CommandLog,
    next_id: u32,
    programs: BTreeSet<ProgramId>,
    textures: BTreeSet<TextureId>,
    buffers: BTreeSet<BufferId>,
    fail_compile: bool,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `create_program` fail, as a driver would on a bad shader.
    pub fn failing_compiles() -> Self {
        Self {
            fail_compile: true,
            ..Self::default()
        }
    }

    pub fn log(&self) -> CommandLog {
        self.log.clone()
    }

    /// Programs, textures and buffers created and not yet deleted.
    pub fn live_objects(&self) -> usize {
        self.programs.len() + self.textures.len() + self.buffers.len()
    }

    fn issue(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

impl GlBackend for RecordingBackend {
    fn create_program(&mut self, vertex: &str, fragment: &str) -> SlideShowResult<ProgramId> {
        if self.fail_compile || vertex.is_empty() || fragment.is_empty() {
            return Err(SlideShowError::render("shader program failed to compile"));
        }
        let id = ProgramId(self.issue());
        self.programs.insert(id);
        self.log.push(GlCommand::CreateProgram(id));
        Ok(id)
    }

    fn delete_program(&mut self, program: ProgramId) {
        if self.programs.remove(&program) {
            self.log.push(GlCommand::DeleteProgram(program));
        }
    }

    fn use_program(&mut self, program: ProgramId) {
        self.log.push(GlCommand::UseProgram(program));
    }

    fn create_texture(&mut self, image: &RgbaImage, mipmaps: bool) -> SlideShowResult<TextureId> {
        let id = TextureId(self.issue());
        self.textures.insert(id);
        self.log.push(GlCommand::CreateTexture {
            texture: id,
            width: image.width(),
            height: image.height(),
            mipmaps,
        });
        Ok(id)
    }

    fn delete_texture(&mut self, texture: TextureId) {
        if self.textures.remove(&texture) {
            self.log.push(GlCommand::DeleteTexture(texture));
        }
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureId) {
        self.log.push(GlCommand::BindTexture { unit, texture });
    }

    fn set_uniform(&mut self, program: ProgramId, name: &str, value: Uniform) {
        self.log.push(GlCommand::SetUniform {
            program,
            name: name.to_owned(),
            value,
        });
    }

    fn upload_vertices(&mut self, vertices: &[Vertex]) -> SlideShowResult<BufferId> {
        let id = BufferId(self.issue());
        self.buffers.insert(id);
        self.log.push(GlCommand::UploadVertices {
            buffer: id,
            count: vertices.len(),
        });
        Ok(id)
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        if self.buffers.remove(&buffer) {
            self.log.push(GlCommand::DeleteBuffer(buffer));
        }
    }

    fn draw_triangles(&mut self, buffer: BufferId, first: usize, count: usize) {
        self.log.push(GlCommand::DrawTriangles {
            buffer,
            first,
            count,
        });
    }

    fn clear(&mut self, color: Vec4) {
        self.log.push(GlCommand::Clear(color));
    }
}
