//! [`GlBackend`] over a browser WebGL2 context.

use std::collections::HashMap;

use glam::Vec4;
use image::RgbaImage;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as Gl, WebGlBuffer, WebGlProgram, WebGlShader,
    WebGlTexture,
};

use crate::foundation::error::{SlideShowError, SlideShowResult};
use crate::render::backend::{BufferId, GlBackend, ProgramId, TextureId, Uniform};
use crate::transitions::primitive::Vertex;

const ATTRIBUTES: [(&str, i32, i32); 3] = [("a_position", 3, 0), ("a_normal", 3, 3), ("a_texCoord", 2, 6)];

fn js_error(context: &str, value: JsValue) -> SlideShowError {
    SlideShowError::render(format!("{context}: {value:?}"))
}

#[derive(Debug)]
pub struct WebGlBackend {
    gl: Gl,
    next_id: u32,
    programs: HashMap<ProgramId, WebGlProgram>,
    textures: HashMap<TextureId, WebGlTexture>,
    buffers: HashMap<BufferId, WebGlBuffer>,
}

impl WebGlBackend {
    pub fn new(gl: Gl) -> Self {
        gl.enable(Gl::DEPTH_TEST);
        Self {
            gl,
            next_id: 0,
            programs: HashMap::new(),
            textures: HashMap::new(),
            buffers: HashMap::new(),
        }
    }

    pub fn from_canvas(canvas: &HtmlCanvasElement) -> SlideShowResult<Self> {
        let context = canvas
            .get_context("webgl2")
            .map_err(|e| js_error("webgl2 context", e))?
            .ok_or_else(|| SlideShowError::render("webgl2 is not available"))?;
        let gl = context
            .dyn_into::<Gl>()
            .map_err(|_| SlideShowError::render("context is not a WebGL2RenderingContext"))?;
        Ok(Self::new(gl))
    }

    pub fn context(&self) -> &Gl {
        &self.gl
    }

    fn issue(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn compile(&self, kind: u32, source: &str) -> SlideShowResult<WebGlShader> {
        let shader = self
            .gl
            .create_shader(kind)
            .ok_or_else(|| SlideShowError::render("unable to create shader"))?;
        self.gl.shader_source(&shader, source);
        self.gl.compile_shader(&shader);
        let ok = self
            .gl
            .get_shader_parameter(&shader, Gl::COMPILE_STATUS)
            .as_bool()
            .unwrap_or(false);
        if ok {
            return Ok(shader);
        }
        let log = self.gl.get_shader_info_log(&shader).unwrap_or_default();
        self.gl.delete_shader(Some(&shader));
        Err(SlideShowError::render(format!("shader compile failed: {log}")))
    }
}

impl GlBackend for WebGlBackend {
    fn create_program(&mut self, vertex: &str, fragment: &str) -> SlideShowResult<ProgramId> {
        let vs = self.compile(Gl::VERTEX_SHADER, vertex)?;
        let fs = match self.compile(Gl::FRAGMENT_SHADER, fragment) {
            Ok(fs) => fs,
            Err(e) => {
                self.gl.delete_shader(Some(&vs));
                return Err(e);
            }
        };
        let program = self
            .gl
            .create_program()
            .ok_or_else(|| SlideShowError::render("unable to create program"))?;
        self.gl.attach_shader(&program, &vs);
        self.gl.attach_shader(&program, &fs);
        for (index, (name, _, _)) in ATTRIBUTES.iter().enumerate() {
            self.gl.bind_attrib_location(&program, index as u32, name);
        }
        self.gl.link_program(&program);
        self.gl.delete_shader(Some(&vs));
        self.gl.delete_shader(Some(&fs));

        let linked = self
            .gl
            .get_program_parameter(&program, Gl::LINK_STATUS)
            .as_bool()
            .unwrap_or(false);
        if !linked {
            let log = self.gl.get_program_info_log(&program).unwrap_or_default();
            self.gl.delete_program(Some(&program));
            return Err(SlideShowError::render(format!("program link failed: {log}")));
        }

        let id = ProgramId(self.issue());
        self.programs.insert(id, program);
        Ok(id)
    }

    fn delete_program(&mut self, program: ProgramId) {
        if let Some(p) = self.programs.remove(&program) {
            self.gl.delete_program(Some(&p));
        }
    }

    fn use_program(&mut self, program: ProgramId) {
        self.gl.use_program(self.programs.get(&program));
    }

    fn create_texture(&mut self, image: &RgbaImage, mipmaps: bool) -> SlideShowResult<TextureId> {
        let texture = self
            .gl
            .create_texture()
            .ok_or_else(|| SlideShowError::render("unable to create texture"))?;
        self.gl.bind_texture(Gl::TEXTURE_2D, Some(&texture));
        self.gl
            .tex_image_2d_with_i32_and_i32_and_i32_and_format_and_type_and_opt_u8_array(
                Gl::TEXTURE_2D,
                0,
                Gl::RGBA as i32,
                image.width() as i32,
                image.height() as i32,
                0,
                Gl::RGBA,
                Gl::UNSIGNED_BYTE,
                Some(image.as_raw()),
            )
            .map_err(|e| js_error("texture upload", e))?;

        let min_filter = if mipmaps {
            self.gl.generate_mipmap(Gl::TEXTURE_2D);
            Gl::LINEAR_MIPMAP_LINEAR
        } else {
            Gl::LINEAR
        };
        self.gl
            .tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_MIN_FILTER, min_filter as i32);
        self.gl
            .tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_MAG_FILTER, Gl::LINEAR as i32);
        self.gl
            .tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_WRAP_S, Gl::CLAMP_TO_EDGE as i32);
        self.gl
            .tex_parameteri(Gl::TEXTURE_2D, Gl::TEXTURE_WRAP_T, Gl::CLAMP_TO_EDGE as i32);
        self.gl.bind_texture(Gl::TEXTURE_2D, None);

        let id = TextureId(self.issue());
        self.textures.insert(id, texture);
        Ok(id)
    }

    fn delete_texture(&mut self, texture: TextureId) {
        if let Some(t) = self.textures.remove(&texture) {
            self.gl.delete_texture(Some(&t));
        }
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureId) {
        self.gl.active_texture(Gl::TEXTURE0 + unit);
        self.gl.bind_texture(Gl::TEXTURE_2D, self.textures.get(&texture));
    }

    fn set_uniform(&mut self, program: ProgramId, name: &str, value: Uniform) {
        let Some(p) = self.programs.get(&program) else {
            return;
        };
        let Some(location) = self.gl.get_uniform_location(p, name) else {
            return;
        };
        let location = Some(&location);
        match value {
            Uniform::Float(v) => self.gl.uniform1f(location, v),
            Uniform::Int(v) => self.gl.uniform1i(location, v),
            Uniform::Vec4(v) => self.gl.uniform4f(location, v.x, v.y, v.z, v.w),
            Uniform::Mat4(m) => {
                self.gl
                    .uniform_matrix4fv_with_f32_array(location, false, &m.to_cols_array())
            }
        }
    }

    fn upload_vertices(&mut self, vertices: &[Vertex]) -> SlideShowResult<BufferId> {
        let data: Vec<f32> = vertices.iter().flat_map(|v| v.to_array()).collect();
        let buffer = self
            .gl
            .create_buffer()
            .ok_or_else(|| SlideShowError::render("unable to create buffer"))?;
        self.gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&buffer));
        self.gl.buffer_data_with_u8_array(
            Gl::ARRAY_BUFFER,
            bytemuck::cast_slice(&data),
            Gl::STATIC_DRAW,
        );
        let id = BufferId(self.issue());
        self.buffers.insert(id, buffer);
        Ok(id)
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        if let Some(b) = self.buffers.remove(&buffer) {
            self.gl.delete_buffer(Some(&b));
        }
    }

    fn draw_triangles(&mut self, buffer: BufferId, first: usize, count: usize) {
        let Some(b) = self.buffers.get(&buffer) else {
            return;
        };
        self.gl.bind_buffer(Gl::ARRAY_BUFFER, Some(b));
        let stride = (Vertex::FLOATS * std::mem::size_of::<f32>()) as i32;
        for (index, (_, size, offset)) in ATTRIBUTES.iter().enumerate() {
            let index = index as u32;
            self.gl.enable_vertex_attrib_array(index);
            self.gl.vertex_attrib_pointer_with_i32(
                index,
                *size,
                Gl::FLOAT,
                false,
                stride,
                offset * std::mem::size_of::<f32>() as i32,
            );
        }
        self.gl
            .draw_arrays(Gl::TRIANGLES, first as i32, count as i32);
    }

    fn clear(&mut self, color: Vec4) {
        self.gl.clear_color(color.x, color.y, color.z, color.w);
        self.gl.clear(Gl::COLOR_BUFFER_BIT | Gl::DEPTH_BUFFER_BIT);
    }
}
