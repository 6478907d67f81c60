/// Texture data sources uploaded straight to the GPU
///
/// Neither source holds a pixmap: `GlOnlyTextureData` only allocates
/// storage, `FloatTextureData` optionally keeps a CPU-side float buffer.
/// Both must be prepared exactly once before their data is consumed.

use crate::error::Result;
use crate::graphics::gl_enums as gl;
use crate::graphics::{ApplicationType, GlContext};

const SOURCE: &str = "keel::TextureData";

/// Data a texture is created from
pub trait TextureData {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn is_prepared(&self) -> bool;

    /// Allocate CPU-side data; calling it twice is a misuse error
    fn prepare(&mut self, ctx: &GlContext) -> Result<()>;

    /// Upload into the texture currently bound to `target`
    fn consume_custom_data(&self, ctx: &GlContext, target: u32) -> Result<()>;

    /// Whether the data can be re-uploaded after a context loss
    fn is_managed(&self) -> bool;
}

// ===== GL-ONLY DATA =====

/// Storage-only texture (render target), never backed by CPU memory
#[derive(Debug, Clone)]
pub struct GlOnlyTextureData {
    width: u32,
    height: u32,
    mip_level: i32,
    internal_format: u32,
    format: u32,
    data_type: u32,
    prepared: bool,
}

impl GlOnlyTextureData {
    pub fn new(width: u32, height: u32, mip_level: i32, internal_format: u32, format: u32, data_type: u32) -> Self {
        Self {
            width,
            height,
            mip_level,
            internal_format,
            format,
            data_type,
            prepared: false,
        }
    }
}

impl TextureData for GlOnlyTextureData {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn is_prepared(&self) -> bool {
        self.prepared
    }

    fn prepare(&mut self, _ctx: &GlContext) -> Result<()> {
        if self.prepared {
            crate::engine_bail!(SOURCE, InvalidResource, "Already prepared");
        }
        self.prepared = true;
        Ok(())
    }

    fn consume_custom_data(&self, ctx: &GlContext, target: u32) -> Result<()> {
        ctx.gl().tex_image_2d(
            target,
            self.mip_level,
            self.internal_format,
            self.width as i32,
            self.height as i32,
            0,
            self.format,
            self.data_type,
            None,
        );
        Ok(())
    }

    fn is_managed(&self) -> bool {
        false
    }
}

// ===== FLOAT DATA =====

/// Floating point texture, optionally with a zeroed CPU-side buffer
#[derive(Debug, Clone)]
pub struct FloatTextureData {
    width: u32,
    height: u32,
    internal_format: u32,
    format: u32,
    data_type: u32,
    gpu_only: bool,
    prepared: bool,
    buffer: Option<Vec<f32>>,
}

impl FloatTextureData {
    pub fn new(width: u32, height: u32, internal_format: u32, format: u32, data_type: u32, gpu_only: bool) -> Self {
        Self {
            width,
            height,
            internal_format,
            format,
            data_type,
            gpu_only,
            prepared: false,
            buffer: None,
        }
    }

    /// CPU-side buffer, allocated by `prepare` unless the data is GPU-only
    pub fn buffer(&self) -> Option<&[f32]> {
        self.buffer.as_deref()
    }

    pub fn buffer_mut(&mut self) -> Option<&mut [f32]> {
        self.buffer.as_deref_mut()
    }

    pub fn data_type(&self) -> u32 {
        self.data_type
    }

    /// Floats per texel; only desktop GL sizes the buffer from the internal format
    fn components(&self, application_type: ApplicationType) -> usize {
        if !application_type.is_desktop_gl() {
            return 4;
        }
        match self.internal_format {
            gl::RGB16F | gl::RGB32F => 3,
            gl::RG16F | gl::RG32F => 2,
            gl::R16F | gl::R32F => 1,
            _ => 4,
        }
    }
}

impl TextureData for FloatTextureData {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn is_prepared(&self) -> bool {
        self.prepared
    }

    fn prepare(&mut self, ctx: &GlContext) -> Result<()> {
        if self.prepared {
            crate::engine_bail!(SOURCE, InvalidResource, "Already prepared");
        }
        if !self.gpu_only {
            let len = self.width as usize * self.height as usize * self.components(ctx.application_type());
            self.buffer = Some(vec![0.0; len]);
        }
        self.prepared = true;
        Ok(())
    }

    fn consume_custom_data(&self, ctx: &GlContext, target: u32) -> Result<()> {
        let capabilities = ctx.capabilities();
        let pixels: Option<&[u8]> = self
            .buffer
            .as_deref()
            .map(|floats| bytemuck::cast_slice::<f32, u8>(floats));

        let gles = match ctx.application_type() {
            ApplicationType::Android | ApplicationType::Ios => true,
            ApplicationType::WebGl => !capabilities.gl30,
            _ => false,
        };

        if gles {
            if !capabilities.supports_extension(gl::EXT_OES_TEXTURE_FLOAT) {
                crate::engine_bail!(SOURCE, BackendError, "Extension OES_texture_float not supported!");
            }
            // GLES and WebGL 1 take the float format from the format/type pair
            ctx.gl().tex_image_2d(
                target,
                0,
                gl::RGBA,
                self.width as i32,
                self.height as i32,
                0,
                gl::RGBA,
                gl::FLOAT,
                pixels,
            );
        } else {
            if !capabilities.gl30 && !capabilities.supports_extension(gl::EXT_ARB_TEXTURE_FLOAT) {
                crate::engine_bail!(SOURCE, BackendError, "Extension GL_ARB_texture_float not supported!");
            }
            // Desktop GL takes it from the sized internal format
            ctx.gl().tex_image_2d(
                target,
                0,
                self.internal_format,
                self.width as i32,
                self.height as i32,
                0,
                self.format,
                gl::FLOAT,
                pixels,
            );
        }
        Ok(())
    }

    fn is_managed(&self) -> bool {
        true
    }
}

#[cfg(test)]
#[path = "texture_data_tests.rs"]
mod tests;
