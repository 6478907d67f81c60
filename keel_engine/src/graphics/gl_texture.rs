/// GL texture object
///
/// Owns one texture handle created from a [`TextureData`]. Textures are
/// released explicitly with [`GlTexture::dispose`]; GL objects cannot be
/// freed on drop because the context is not reachable from there.

use crate::error::Result;
use crate::graphics::gl_enums as gl;
use crate::graphics::{GlContext, TextureData};

/// CPU pixel layouts a basic colour attachment can be created with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Alpha,
    Intensity,
    LuminanceAlpha,
    Rgb565,
    Rgba4444,
    Rgb888,
    Rgba8888,
}

impl PixelFormat {
    pub fn gl_format(&self) -> u32 {
        match self {
            PixelFormat::Alpha | PixelFormat::Intensity => gl::ALPHA,
            PixelFormat::LuminanceAlpha => gl::LUMINANCE_ALPHA,
            PixelFormat::Rgb565 | PixelFormat::Rgb888 => gl::RGB,
            PixelFormat::Rgba4444 | PixelFormat::Rgba8888 => gl::RGBA,
        }
    }

    pub fn gl_type(&self) -> u32 {
        match self {
            PixelFormat::Rgb565 => gl::UNSIGNED_SHORT_5_6_5,
            PixelFormat::Rgba4444 => gl::UNSIGNED_SHORT_4_4_4_4,
            _ => gl::UNSIGNED_BYTE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFilter {
    Nearest,
    Linear,
}

impl TextureFilter {
    pub fn gl_enum(&self) -> u32 {
        match self {
            TextureFilter::Nearest => gl::NEAREST,
            TextureFilter::Linear => gl::LINEAR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureWrap {
    ClampToEdge,
    Repeat,
    MirroredRepeat,
}

impl TextureWrap {
    pub fn gl_enum(&self) -> u32 {
        match self {
            TextureWrap::ClampToEdge => gl::CLAMP_TO_EDGE,
            TextureWrap::Repeat => gl::REPEAT,
            TextureWrap::MirroredRepeat => gl::MIRRORED_REPEAT,
        }
    }
}

#[derive(Debug)]
pub struct GlTexture {
    handle: u32,
    target: u32,
    width: u32,
    height: u32,
    min_filter: TextureFilter,
    mag_filter: TextureFilter,
    u_wrap: TextureWrap,
    v_wrap: TextureWrap,
}

impl GlTexture {
    /// Create a 2D texture and upload `data` into it
    ///
    /// The data is prepared first if needed. On failure the new handle is
    /// deleted before the error is returned.
    pub fn from_data(ctx: &GlContext, data: &mut dyn TextureData) -> Result<Self> {
        if !data.is_prepared() {
            data.prepare(ctx)?;
        }

        let gl_api = ctx.gl();
        let handle = gl_api.gen_texture();
        gl_api.bind_texture(gl::TEXTURE_2D, handle);
        if let Err(error) = data.consume_custom_data(ctx, gl::TEXTURE_2D) {
            gl_api.bind_texture(gl::TEXTURE_2D, 0);
            gl_api.delete_texture(handle);
            return Err(error);
        }

        let mut texture = Self {
            handle,
            target: gl::TEXTURE_2D,
            width: data.width(),
            height: data.height(),
            min_filter: TextureFilter::Nearest,
            mag_filter: TextureFilter::Nearest,
            u_wrap: TextureWrap::ClampToEdge,
            v_wrap: TextureWrap::ClampToEdge,
        };
        texture.upload_parameters(ctx);
        gl_api.bind_texture(texture.target, 0);
        Ok(texture)
    }

    pub fn handle(&self) -> u32 {
        self.handle
    }

    pub fn target(&self) -> u32 {
        self.target
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn filter(&self) -> (TextureFilter, TextureFilter) {
        (self.min_filter, self.mag_filter)
    }

    pub fn wrap(&self) -> (TextureWrap, TextureWrap) {
        (self.u_wrap, self.v_wrap)
    }

    pub fn set_filter(&mut self, ctx: &GlContext, min_filter: TextureFilter, mag_filter: TextureFilter) {
        self.min_filter = min_filter;
        self.mag_filter = mag_filter;
        let gl_api = ctx.gl();
        gl_api.bind_texture(self.target, self.handle);
        gl_api.tex_parameteri(self.target, gl::TEXTURE_MIN_FILTER, min_filter.gl_enum() as i32);
        gl_api.tex_parameteri(self.target, gl::TEXTURE_MAG_FILTER, mag_filter.gl_enum() as i32);
    }

    pub fn set_wrap(&mut self, ctx: &GlContext, u_wrap: TextureWrap, v_wrap: TextureWrap) {
        self.u_wrap = u_wrap;
        self.v_wrap = v_wrap;
        let gl_api = ctx.gl();
        gl_api.bind_texture(self.target, self.handle);
        gl_api.tex_parameteri(self.target, gl::TEXTURE_WRAP_S, u_wrap.gl_enum() as i32);
        gl_api.tex_parameteri(self.target, gl::TEXTURE_WRAP_T, v_wrap.gl_enum() as i32);
    }

    fn upload_parameters(&mut self, ctx: &GlContext) {
        let (min, mag) = (self.min_filter, self.mag_filter);
        let (u, v) = (self.u_wrap, self.v_wrap);
        self.set_filter(ctx, min, mag);
        self.set_wrap(ctx, u, v);
    }

    /// Delete the GL texture; later calls are no-ops
    pub fn dispose(&mut self, ctx: &GlContext) {
        if self.handle != 0 {
            ctx.gl().delete_texture(self.handle);
            self.handle = 0;
        }
    }
}
