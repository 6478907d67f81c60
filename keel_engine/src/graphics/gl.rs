/// GL call surface and context
///
/// `Gl` is the narrow subset of GLES 2.0/3.0 used by the framebuffer code.
/// A back-end wraps a real driver; tests use a recording mock. GL objects
/// are bound to the thread owning the context, so neither the trait nor
/// `GlContext` is `Send`.

use std::cell::Cell;
use rustc_hash::FxHashSet;
use crate::graphics::gl_enums as gl;

/// GL entry points (names follow the C API without the `gl` prefix)
pub trait Gl {
    // ===== FRAMEBUFFERS =====

    fn gen_framebuffer(&self) -> u32;
    fn delete_framebuffer(&self, framebuffer: u32);
    fn bind_framebuffer(&self, target: u32, framebuffer: u32);
    fn check_framebuffer_status(&self, target: u32) -> u32;
    fn framebuffer_texture_2d(&self, target: u32, attachment: u32, tex_target: u32, texture: u32, level: i32);
    fn framebuffer_renderbuffer(&self, target: u32, attachment: u32, rb_target: u32, renderbuffer: u32);

    // ===== RENDERBUFFERS =====

    fn gen_renderbuffer(&self) -> u32;
    fn delete_renderbuffer(&self, renderbuffer: u32);
    fn bind_renderbuffer(&self, target: u32, renderbuffer: u32);
    fn renderbuffer_storage(&self, target: u32, internal_format: u32, width: i32, height: i32);
    fn renderbuffer_storage_multisample(
        &self,
        target: u32,
        samples: i32,
        internal_format: u32,
        width: i32,
        height: i32,
    );

    // ===== TEXTURES =====

    fn gen_texture(&self) -> u32;
    fn delete_texture(&self, texture: u32);
    fn bind_texture(&self, target: u32, texture: u32);
    #[allow(clippy::too_many_arguments)]
    fn tex_image_2d(
        &self,
        target: u32,
        level: i32,
        internal_format: u32,
        width: i32,
        height: i32,
        border: i32,
        format: u32,
        data_type: u32,
        pixels: Option<&[u8]>,
    );
    fn tex_parameteri(&self, target: u32, pname: u32, param: i32);

    // ===== DRAW / READ / BLIT =====

    fn draw_buffers(&self, buffers: &[u32]);
    fn read_buffer(&self, source: u32);
    #[allow(clippy::too_many_arguments)]
    fn blit_framebuffer(
        &self,
        src_x0: i32,
        src_y0: i32,
        src_x1: i32,
        src_y1: i32,
        dst_x0: i32,
        dst_y0: i32,
        dst_x1: i32,
        dst_y1: i32,
        mask: u32,
        filter: u32,
    );

    // ===== STATE =====

    fn get_integer(&self, pname: u32) -> i32;
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
}

/// Platform the context runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApplicationType {
    Desktop,
    Android,
    Ios,
    WebGl,
    HeadlessDesktop,
}

impl ApplicationType {
    /// Desktop OpenGL (as opposed to GLES / WebGL)
    pub fn is_desktop_gl(&self) -> bool {
        matches!(self, ApplicationType::Desktop | ApplicationType::HeadlessDesktop)
    }
}

/// What the active context supports
#[derive(Debug, Clone)]
pub struct GlCapabilities {
    /// GLES 3.0 (or desktop GL 3.x) entry points are available
    pub gl30: bool,
    /// Extension names reported by the driver
    pub extensions: FxHashSet<String>,
    /// GL_MAX_COLOR_ATTACHMENTS (0 = unknown, not checked)
    pub max_color_attachments: u32,
}

impl GlCapabilities {
    pub fn gles20() -> Self {
        Self {
            gl30: false,
            extensions: FxHashSet::default(),
            max_color_attachments: 1,
        }
    }

    pub fn gles30() -> Self {
        Self {
            gl30: true,
            extensions: FxHashSet::default(),
            max_color_attachments: 4,
        }
    }

    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extensions.insert(extension.to_string());
        self
    }

    pub fn with_max_color_attachments(mut self, max_color_attachments: u32) -> Self {
        self.max_color_attachments = max_color_attachments;
        self
    }

    pub fn supports_extension(&self, extension: &str) -> bool {
        self.extensions.contains(extension)
    }

    /// Either flavour of the packed depth-stencil extension
    pub fn supports_packed_depth_stencil(&self) -> bool {
        self.supports_extension(gl::EXT_OES_PACKED_DEPTH_STENCIL)
            || self.supports_extension(gl::EXT_EXT_PACKED_DEPTH_STENCIL)
    }
}

/// GL surface of one context, owned by the GPU thread
pub struct GlContext {
    gl: Box<dyn Gl>,
    capabilities: GlCapabilities,
    application_type: ApplicationType,
    default_framebuffer: Cell<Option<u32>>,
    back_buffer_size: Cell<(u32, u32)>,
}

impl GlContext {
    pub fn new(gl: Box<dyn Gl>, capabilities: GlCapabilities, application_type: ApplicationType) -> Self {
        Self {
            gl,
            capabilities,
            application_type,
            default_framebuffer: Cell::new(None),
            back_buffer_size: Cell::new((0, 0)),
        }
    }

    pub fn gl(&self) -> &dyn Gl {
        self.gl.as_ref()
    }

    pub fn capabilities(&self) -> &GlCapabilities {
        &self.capabilities
    }

    pub fn application_type(&self) -> ApplicationType {
        self.application_type
    }

    /// Handle of the on-screen framebuffer
    ///
    /// Queried once and cached. iOS renders into a framebuffer owned by the
    /// view, so its handle is read from the live binding; elsewhere it is 0.
    pub fn default_framebuffer_handle(&self) -> u32 {
        if let Some(handle) = self.default_framebuffer.get() {
            return handle;
        }
        let handle = match self.application_type {
            ApplicationType::Ios => self.gl.get_integer(gl::FRAMEBUFFER_BINDING).max(0) as u32,
            _ => 0,
        };
        self.default_framebuffer.set(Some(handle));
        handle
    }

    /// Size of the back buffer, restored as viewport by `GlFrameBuffer::end`
    pub fn back_buffer_size(&self) -> (u32, u32) {
        self.back_buffer_size.get()
    }

    pub fn set_back_buffer_size(&self, width: u32, height: u32) {
        self.back_buffer_size.set((width, height));
    }
}

#[cfg(test)]
#[path = "gl_tests.rs"]
mod tests;
