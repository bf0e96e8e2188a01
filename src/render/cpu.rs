//! Software rendering of 2D transitions, pixel for pixel what the fragment shaders compute.

use glam::{Vec2, Vec4};
use image::{Rgba, RgbaImage, imageops};

use crate::foundation::error::{SlideShowError, SlideShowResult};
use crate::transitions::Transition2d;
use crate::transitions::registry::TransitionProgram;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CpuCompositor {
    width: u32,
    height: u32,
}

impl CpuCompositor {
    pub fn new(width: u32, height: u32) -> SlideShowResult<Self> {
        if width == 0 || height == 0 {
            return Err(SlideShowError::validation(
                "compositor size must be non-zero",
            ));
        }
        Ok(Self { width, height })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Scale `image` to the compositor size if it differs.
    pub fn fit(&self, image: &RgbaImage) -> RgbaImage {
        if image.dimensions() == self.size() {
            return image.clone();
        }
        imageops::resize(image, self.width, self.height, imageops::FilterType::Triangle)
    }

    /// Blend both slides at `time` in `[0, 1]`.
    pub fn render(
        &self,
        transition: &dyn Transition2d,
        leaving: &RgbaImage,
        entering: &RgbaImage,
        time: f64,
    ) -> SlideShowResult<RgbaImage> {
        if leaving.dimensions() != self.size() || entering.dimensions() != self.size() {
            return Err(SlideShowError::render(
                "cpu compositor expects slide images matching its width and height",
            ));
        }
        let time = time.clamp(0.0, 1.0) as f32;
        let (w, h) = (self.width as f32, self.height as f32);

        let mut out = RgbaImage::new(self.width, self.height);
        for (x, y, px) in out.enumerate_pixels_mut() {
            let uv = Vec2::new((x as f32 + 0.5) / w, (y as f32 + 0.5) / h);
            let a = to_vec4(*leaving.get_pixel(x, y));
            let b = to_vec4(*entering.get_pixel(x, y));
            *px = from_vec4(transition.blend(uv, time, a, b));
        }
        Ok(out)
    }

    pub fn render_program(
        &self,
        program: &TransitionProgram,
        leaving: &RgbaImage,
        entering: &RgbaImage,
        time: f64,
    ) -> SlideShowResult<RgbaImage> {
        match program {
            TransitionProgram::Flat(transition) => {
                self.render(transition.as_ref(), leaving, entering, time)
            }
            TransitionProgram::Mesh(mesh) => Err(SlideShowError::render(format!(
                "'{}' is a 3D transition and needs a GL backend",
                mesh.kind()
            ))),
        }
    }
}

pub fn to_vec4(px: Rgba<u8>) -> Vec4 {
    Vec4::from_array(px.0.map(f32::from)) / 255.0
}

pub fn from_vec4(color: Vec4) -> Rgba<u8> {
    let c = color.clamp(Vec4::ZERO, Vec4::ONE) * 255.0;
    Rgba(c.round().to_array().map(|v| v as u8))
}

pub fn solid(width: u32, height: u32, color: Rgba<u8>) -> RgbaImage {
    RgbaImage::from_pixel(width, height, color)
}
