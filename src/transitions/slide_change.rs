//! GL lifecycle of one slide change: compile, upload, draw requested frames, release.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec4;
use image::RgbaImage;

use crate::animation::animations::Animation;
use crate::animation::element::ElementRef;
use crate::animation::value::AnimValue;
use crate::foundation::error::{SlideShowError, SlideShowResult};
use crate::foundation::math::clamp01;
use crate::render::backend::{BufferId, GlBackend, ProgramId, TextureId, Uniform};
use crate::transitions::kind::TransitionKind;
use crate::transitions::mesh::{MeshShading, permutation_texture};
use crate::transitions::primitive::{Primitive, model_view_matrix, projection_matrix, slide_scales};
use crate::transitions::registry::TransitionProgram;

const PERMUTATION_SIZE: u32 = 256;
const CLEAR: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);

type Mesh = (BufferId, usize);

#[derive(Debug)]
enum Geometry {
    Quad(Mesh),
    Scene {
        leaving: Vec<Mesh>,
        entering: Vec<Mesh>,
    },
}

/// Everything `start` created on the backend.
#[derive(Debug)]
struct Uploaded {
    program: ProgramId,
    leaving: TextureId,
    entering: TextureId,
    permutation: Option<TextureId>,
    geometry: Geometry,
}

/// Objects created so far, released as a unit when a later step fails.
#[derive(Debug, Default)]
struct Created {
    program: Option<ProgramId>,
    textures: Vec<TextureId>,
    buffers: Vec<BufferId>,
}

impl Created {
    fn release(self, gl: &mut dyn GlBackend) {
        if let Some(p) = self.program {
            gl.delete_program(p);
        }
        for t in self.textures {
            gl.delete_texture(t);
        }
        for b in self.buffers {
            gl.delete_buffer(b);
        }
    }
}

#[derive(Debug)]
pub struct SlideChange {
    program: TransitionProgram,
    leaving: Rc<RgbaImage>,
    entering: Rc<RgbaImage>,
    mipmaps: bool,
    uploaded: Option<Uploaded>,
    pending: Option<f64>,
    finished: bool,
    frames: usize,
}

impl SlideChange {
    pub fn new(
        program: TransitionProgram,
        leaving: Rc<RgbaImage>,
        entering: Rc<RgbaImage>,
        mipmaps: bool,
    ) -> Self {
        Self {
            program,
            leaving,
            entering,
            mipmaps,
            uploaded: None,
            pending: None,
            finished: false,
            frames: 0,
        }
    }

    pub fn kind(&self) -> TransitionKind {
        self.program.kind()
    }

    pub fn program(&self) -> &TransitionProgram {
        &self.program
    }

    pub fn is_started(&self) -> bool {
        self.uploaded.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn pending(&self) -> Option<f64> {
        self.pending
    }

    pub fn frames_rendered(&self) -> usize {
        self.frames
    }

    /// Compile the program and upload textures and meshes. Starting twice is a no-op.
    #[tracing::instrument(level = "debug", skip_all, fields(kind = %self.kind()))]
    pub fn start(&mut self, gl: &mut dyn GlBackend) -> SlideShowResult<()> {
        if self.finished {
            return Err(SlideShowError::invalid_state("slide change already ended"));
        }
        if self.uploaded.is_some() {
            return Ok(());
        }
        let mut created = Created::default();
        match self.upload(gl, &mut created) {
            Ok(uploaded) => {
                self.uploaded = Some(uploaded);
                Ok(())
            }
            Err(e) => {
                created.release(gl);
                Err(e)
            }
        }
    }

    fn upload(&self, gl: &mut dyn GlBackend, created: &mut Created) -> SlideShowResult<Uploaded> {
        let fragment = self.program.fragment_shader()?;
        let program = gl.create_program(self.program.vertex_shader(), &fragment)?;
        created.program = Some(program);

        let leaving = gl.create_texture(&self.leaving, self.mipmaps)?;
        created.textures.push(leaving);
        let entering = gl.create_texture(&self.entering, self.mipmaps)?;
        created.textures.push(entering);

        let mut upload_mesh = |p: &Primitive| -> SlideShowResult<Mesh> {
            let buffer = gl.upload_vertices(&p.vertices)?;
            created.buffers.push(buffer);
            Ok((buffer, p.vertices.len()))
        };

        let (geometry, dissolve) = match &self.program {
            TransitionProgram::Flat(_) => (Geometry::Quad(upload_mesh(&Primitive::unit_quad())?), false),
            TransitionProgram::Mesh(mesh) => {
                let scene = mesh.scene();
                let leaving = scene
                    .leaving
                    .iter()
                    .map(|p| upload_mesh(p))
                    .collect::<SlideShowResult<Vec<_>>>()?;
                let entering = scene
                    .entering
                    .iter()
                    .map(|p| upload_mesh(p))
                    .collect::<SlideShowResult<Vec<_>>>()?;
                (
                    Geometry::Scene { leaving, entering },
                    mesh.shading() == MeshShading::Dissolve,
                )
            }
        };

        let permutation = if dissolve {
            let texture = gl.create_texture(&permutation_texture(PERMUTATION_SIZE), false)?;
            created.textures.push(texture);
            Some(texture)
        } else {
            None
        };

        Ok(Uploaded {
            program,
            leaving,
            entering,
            permutation,
            geometry,
        })
    }

    /// Request a frame at `t`; only the latest request is kept.
    pub fn perform(&mut self, t: f64) -> bool {
        if self.finished {
            return false;
        }
        self.pending = Some(clamp01(t));
        true
    }

    /// Draw the pending frame, if any. Returns whether something was drawn.
    pub fn render_pending(&mut self, gl: &mut dyn GlBackend) -> SlideShowResult<bool> {
        if self.finished {
            return Ok(false);
        }
        let Some(t) = self.pending.take() else {
            return Ok(false);
        };
        let Some(uploaded) = &self.uploaded else {
            return Err(SlideShowError::invalid_state(
                "slide change rendered before start",
            ));
        };

        gl.clear(CLEAR);
        gl.use_program(uploaded.program);
        gl.set_uniform(uploaded.program, "time", Uniform::Float(t as f32));
        match (&self.program, &uploaded.geometry) {
            (TransitionProgram::Flat(transition), Geometry::Quad((buffer, count))) => {
                gl.bind_texture(0, uploaded.leaving);
                gl.bind_texture(1, uploaded.entering);
                gl.set_uniform(uploaded.program, "leavingSlideTexture", Uniform::Int(0));
                gl.set_uniform(uploaded.program, "enteringSlideTexture", Uniform::Int(1));
                for (name, value) in transition.uniforms() {
                    gl.set_uniform(uploaded.program, name, value);
                }
                gl.draw_triangles(*buffer, 0, *count);
            }
            (TransitionProgram::Mesh(mesh), Geometry::Scene { leaving, entering }) => {
                let program = uploaded.program;
                let (sx, sy) = slide_scales(self.leaving.width(), self.leaving.height());
                let scene = mesh.scene();
                gl.set_uniform(program, "u_projectionMatrix", Uniform::Mat4(projection_matrix()));
                gl.set_uniform(program, "u_modelViewMatrix", Uniform::Mat4(model_view_matrix()));
                gl.set_uniform(
                    program,
                    "u_sceneTransformMatrix",
                    Uniform::Mat4(scene.scene_transform(t, sx, sy)),
                );
                gl.set_uniform(program, "slideTexture", Uniform::Int(0));
                if let Some(permutation) = uploaded.permutation {
                    gl.bind_texture(1, permutation);
                    gl.set_uniform(program, "permTexture", Uniform::Int(1));
                }

                let passes = [
                    (mesh.policy().draws_leaving(t), uploaded.leaving, &scene.leaving, leaving, 0.0),
                    (mesh.policy().draws_entering(t), uploaded.entering, &scene.entering, entering, 1.0),
                ];
                for (draw, texture, primitives, meshes, is_entering) in passes {
                    if !draw {
                        continue;
                    }
                    gl.bind_texture(0, texture);
                    if uploaded.permutation.is_some() {
                        gl.set_uniform(program, "isEntering", Uniform::Float(is_entering));
                    }
                    for (primitive, (buffer, count)) in primitives.iter().zip(meshes) {
                        gl.set_uniform(
                            program,
                            "u_primitiveTransformMatrix",
                            Uniform::Mat4(primitive.transform(t, sx, sy)),
                        );
                        gl.draw_triangles(*buffer, 0, *count);
                    }
                }
            }
            _ => {
                return Err(SlideShowError::invalid_state(
                    "uploaded geometry does not match the transition program",
                ));
            }
        }
        self.frames += 1;
        Ok(true)
    }

    /// Release every GL object. Safe to call more than once.
    pub fn end(&mut self, gl: &mut dyn GlBackend) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.pending = None;
        let Some(uploaded) = self.uploaded.take() else {
            return;
        };
        gl.delete_program(uploaded.program);
        gl.delete_texture(uploaded.leaving);
        gl.delete_texture(uploaded.entering);
        if let Some(p) = uploaded.permutation {
            gl.delete_texture(p);
        }
        let meshes = match uploaded.geometry {
            Geometry::Quad(mesh) => vec![mesh],
            Geometry::Scene { leaving, entering } => leaving.into_iter().chain(entering).collect(),
        };
        for (buffer, _) in meshes {
            gl.delete_buffer(buffer);
        }
        tracing::debug!(kind = %self.kind(), frames = self.frames, "slide change ended");
    }
}

/// The one GL context of a slideshow and the slide change currently holding it.
#[derive(Debug)]
pub struct TransitionStage {
    backend: Box<dyn GlBackend>,
    active: Option<SlideChange>,
}

impl TransitionStage {
    pub fn new(backend: Box<dyn GlBackend>) -> Self {
        Self {
            backend,
            active: None,
        }
    }

    pub fn shared(backend: Box<dyn GlBackend>) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new(backend)))
    }

    /// End whatever runs now, then start `change` on the context.
    pub fn begin(&mut self, mut change: SlideChange) -> SlideShowResult<()> {
        if let Some(mut previous) = self.active.take() {
            previous.end(self.backend.as_mut());
        }
        change.start(self.backend.as_mut())?;
        self.active = Some(change);
        Ok(())
    }

    pub fn perform(&mut self, t: f64) -> bool {
        self.active.as_mut().is_some_and(|c| c.perform(t))
    }

    pub fn render_pending(&mut self) -> SlideShowResult<bool> {
        match self.active.as_mut() {
            Some(change) => change.render_pending(self.backend.as_mut()),
            None => Ok(false),
        }
    }

    /// Draw the last requested frame and release the active change.
    pub fn finish(&mut self) {
        let Some(mut change) = self.active.take() else {
            return;
        };
        if let Err(e) = change.render_pending(self.backend.as_mut()) {
            tracing::warn!(error = %e, "final transition frame failed");
        }
        change.end(self.backend.as_mut());
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&SlideChange> {
        self.active.as_ref()
    }

    pub fn backend(&self) -> &dyn GlBackend {
        self.backend.as_ref()
    }
}

/// Feeds activity progress into the shared [`TransitionStage`].
#[derive(Debug)]
pub struct TransitionAnimation {
    stage: Rc<RefCell<TransitionStage>>,
    prepared: Option<SlideChange>,
}

impl TransitionAnimation {
    pub fn new(stage: Rc<RefCell<TransitionStage>>, change: SlideChange) -> Self {
        Self {
            stage,
            prepared: Some(change),
        }
    }
}

impl Animation for TransitionAnimation {
    fn start(&mut self, _target: Option<&ElementRef>) {
        let Some(change) = self.prepared.take() else {
            return;
        };
        if let Err(e) = self.stage.borrow_mut().begin(change) {
            tracing::warn!(error = %e, "slide transition failed to start");
        }
    }

    fn perform(&mut self, value: &AnimValue) {
        if let AnimValue::Number(t) = value {
            self.stage.borrow_mut().perform(*t);
        }
    }

    fn end(&mut self) {
        self.stage.borrow_mut().finish();
    }

    fn underlying_value(&self) -> Option<AnimValue> {
        Some(AnimValue::Number(0.0))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transitions/slide_change.rs"]
mod tests;
