/// Framebuffer objects
///
/// A [`FrameBufferBuilder`] describes the attachments (texture or
/// renderbuffer backed) and is validated against the context capabilities
/// before anything is allocated. Building goes through a
/// [`FrameBufferRegistry`](crate::graphics::FrameBufferRegistry), which
/// owns the resulting [`GlFrameBuffer`] and can rebuild it after a context
/// loss.
///
/// # Example
///
/// ```ignore
/// let id = FrameBufferBuilder::new(1024, 768)
///     .add_basic_color_texture_attachment(PixelFormat::Rgba8888)
///     .add_basic_depth_render_buffer()
///     .build(&ctx, &mut registry)?;
/// registry.get(id).unwrap().begin(&ctx);
/// ```

use bitflags::bitflags;
use crate::error::{Error, FrameBufferStatus, Result};
use crate::graphics::gl_enums as gl;
use crate::graphics::{
    FloatTextureData, FrameBufferId, FrameBufferRegistry, GlCapabilities, GlContext,
    GlOnlyTextureData, GlTexture, PixelFormat, TextureFilter, TextureWrap,
};

const SOURCE: &str = "keel::GlFrameBuffer";

bitflags! {
    /// Buffers copied by a framebuffer transfer
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferBits: u32 {
        const COLOR = gl::COLOR_BUFFER_BIT;
        const DEPTH = gl::DEPTH_BUFFER_BIT;
        const STENCIL = gl::STENCIL_BUFFER_BIT;
    }
}

fn frame_buffer_status(code: u32) -> FrameBufferStatus {
    match code {
        gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => FrameBufferStatus::IncompleteAttachment,
        gl::FRAMEBUFFER_INCOMPLETE_DIMENSIONS => FrameBufferStatus::IncompleteDimensions,
        gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => FrameBufferStatus::MissingAttachment,
        gl::FRAMEBUFFER_UNSUPPORTED => FrameBufferStatus::Unsupported,
        gl::FRAMEBUFFER_INCOMPLETE_MULTISAMPLE => FrameBufferStatus::MultisampleMismatch,
        other => FrameBufferStatus::Unknown(other),
    }
}

// ===== ATTACHMENT SPECS =====

/// Texture-backed attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureAttachmentSpec {
    pub internal_format: u32,
    pub format: u32,
    pub data_type: u32,
    pub is_float: bool,
    pub is_gpu_only: bool,
    pub is_depth: bool,
    pub is_stencil: bool,
}

impl TextureAttachmentSpec {
    fn new(internal_format: u32, format: u32, data_type: u32) -> Self {
        Self {
            internal_format,
            format,
            data_type,
            is_float: false,
            is_gpu_only: false,
            is_depth: false,
            is_stencil: false,
        }
    }

    pub fn is_color_texture(&self) -> bool {
        !self.is_depth && !self.is_stencil
    }
}

/// Renderbuffer-backed attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderBufferSpec {
    pub internal_format: u32,
}

// ===== KIND =====

/// Decides how texture attachments are created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameBufferKind {
    /// Storage-only textures, linear filtering
    Standard,
    /// Float textures; linear filtering on desktop GL only
    Float,
}

impl FrameBufferKind {
    fn create_texture(
        &self,
        ctx: &GlContext,
        width: u32,
        height: u32,
        spec: &TextureAttachmentSpec,
    ) -> Result<GlTexture> {
        let (mut texture, filter) = match self {
            FrameBufferKind::Standard => {
                let mut data = GlOnlyTextureData::new(
                    width,
                    height,
                    0,
                    spec.internal_format,
                    spec.format,
                    spec.data_type,
                );
                (GlTexture::from_data(ctx, &mut data)?, TextureFilter::Linear)
            }
            FrameBufferKind::Float => {
                let mut data = FloatTextureData::new(
                    width,
                    height,
                    spec.internal_format,
                    spec.format,
                    spec.data_type,
                    spec.is_gpu_only,
                );
                let filter = if ctx.application_type().is_desktop_gl() {
                    TextureFilter::Linear
                } else {
                    TextureFilter::Nearest
                };
                (GlTexture::from_data(ctx, &mut data)?, filter)
            }
        };
        texture.set_filter(ctx, filter, filter);
        texture.set_wrap(ctx, TextureWrap::ClampToEdge, TextureWrap::ClampToEdge);
        Ok(texture)
    }

    fn attach_color_texture(&self, ctx: &GlContext, texture: &GlTexture) {
        ctx.gl().framebuffer_texture_2d(
            gl::FRAMEBUFFER,
            gl::COLOR_ATTACHMENT0,
            gl::TEXTURE_2D,
            texture.handle(),
            0,
        );
    }

    fn dispose_texture(&self, ctx: &GlContext, texture: &mut GlTexture) {
        texture.dispose(ctx);
    }
}

// ===== BUILDER =====

/// Attachment description for a framebuffer; holds no GL state
#[derive(Debug, Clone)]
pub struct FrameBufferBuilder {
    kind: FrameBufferKind,
    width: u32,
    height: u32,
    samples: u32,
    texture_attachments: Vec<TextureAttachmentSpec>,
    color_render_buffers: Vec<RenderBufferSpec>,
    depth_render_buffer: Option<RenderBufferSpec>,
    stencil_render_buffer: Option<RenderBufferSpec>,
    packed_stencil_depth_render_buffer: Option<RenderBufferSpec>,
}

impl FrameBufferBuilder {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_kind(FrameBufferKind::Standard, width, height, 0)
    }

    /// Multisampled framebuffer (renderbuffer attachments only, GLES 3.0+)
    pub fn multisampled(width: u32, height: u32, samples: u32) -> Self {
        Self::with_kind(FrameBufferKind::Standard, width, height, samples)
    }

    /// Framebuffer whose texture attachments are float textures
    pub fn float(width: u32, height: u32) -> Self {
        Self::with_kind(FrameBufferKind::Float, width, height, 0)
    }

    fn with_kind(kind: FrameBufferKind, width: u32, height: u32, samples: u32) -> Self {
        Self {
            kind,
            width,
            height,
            samples,
            texture_attachments: Vec::new(),
            color_render_buffers: Vec::new(),
            depth_render_buffer: None,
            stencil_render_buffer: None,
            packed_stencil_depth_render_buffer: None,
        }
    }

    // ===== TEXTURE ATTACHMENTS =====

    pub fn add_color_texture_attachment(mut self, internal_format: u32, format: u32, data_type: u32) -> Self {
        self.texture_attachments
            .push(TextureAttachmentSpec::new(internal_format, format, data_type));
        self
    }

    pub fn add_basic_color_texture_attachment(self, format: PixelFormat) -> Self {
        let gl_format = format.gl_format();
        self.add_color_texture_attachment(gl_format, gl_format, format.gl_type())
    }

    pub fn add_float_attachment(mut self, internal_format: u32, format: u32, data_type: u32, gpu_only: bool) -> Self {
        let mut spec = TextureAttachmentSpec::new(internal_format, format, data_type);
        spec.is_float = true;
        spec.is_gpu_only = gpu_only;
        self.texture_attachments.push(spec);
        self
    }

    pub fn add_depth_texture_attachment(mut self, internal_format: u32, data_type: u32) -> Self {
        let mut spec = TextureAttachmentSpec::new(internal_format, gl::DEPTH_COMPONENT, data_type);
        spec.is_depth = true;
        self.texture_attachments.push(spec);
        self
    }

    pub fn add_stencil_texture_attachment(mut self, internal_format: u32, data_type: u32) -> Self {
        let mut spec = TextureAttachmentSpec::new(internal_format, gl::STENCIL_ATTACHMENT, data_type);
        spec.is_stencil = true;
        self.texture_attachments.push(spec);
        self
    }

    // ===== RENDER BUFFERS =====

    pub fn add_color_render_buffer(mut self, internal_format: u32) -> Self {
        self.color_render_buffers.push(RenderBufferSpec { internal_format });
        self
    }

    pub fn add_depth_render_buffer(mut self, internal_format: u32) -> Self {
        self.depth_render_buffer = Some(RenderBufferSpec { internal_format });
        self
    }

    pub fn add_stencil_render_buffer(mut self, internal_format: u32) -> Self {
        self.stencil_render_buffer = Some(RenderBufferSpec { internal_format });
        self
    }

    pub fn add_stencil_depth_packed_render_buffer(mut self, internal_format: u32) -> Self {
        self.packed_stencil_depth_render_buffer = Some(RenderBufferSpec { internal_format });
        self
    }

    pub fn add_basic_depth_render_buffer(self) -> Self {
        self.add_depth_render_buffer(gl::DEPTH_COMPONENT16)
    }

    pub fn add_basic_stencil_render_buffer(self) -> Self {
        self.add_stencil_render_buffer(gl::STENCIL_INDEX8)
    }

    pub fn add_basic_stencil_depth_packed_render_buffer(self) -> Self {
        self.add_stencil_depth_packed_render_buffer(gl::DEPTH24_STENCIL8)
    }

    // ===== ACCESSORS =====

    pub fn kind(&self) -> FrameBufferKind {
        self.kind
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn samples(&self) -> u32 {
        self.samples
    }

    pub fn texture_attachments(&self) -> &[TextureAttachmentSpec] {
        &self.texture_attachments
    }

    pub fn color_render_buffers(&self) -> &[RenderBufferSpec] {
        &self.color_render_buffers
    }

    pub fn depth_render_buffer(&self) -> Option<&RenderBufferSpec> {
        self.depth_render_buffer.as_ref()
    }

    pub fn stencil_render_buffer(&self) -> Option<&RenderBufferSpec> {
        self.stencil_render_buffer.as_ref()
    }

    pub fn packed_stencil_depth_render_buffer(&self) -> Option<&RenderBufferSpec> {
        self.packed_stencil_depth_render_buffer.as_ref()
    }

    // ===== VALIDATION =====

    /// Check the configuration against what the context supports
    ///
    /// Runs before any GL call; a rejected configuration allocates nothing.
    pub fn validate(&self, capabilities: &GlCapabilities) -> Result<()> {
        if self.samples > 0 && !capabilities.gl30 {
            crate::engine_bail!(SOURCE, Configuration, "Framebuffer multisample requires GLES 3.0+");
        }
        if self.samples > 0 && !self.texture_attachments.is_empty() {
            crate::engine_bail!(
                SOURCE,
                Configuration,
                "Framebuffer multisample with texture attachments not yet supported"
            );
        }

        if !capabilities.gl30 {
            if self.packed_stencil_depth_render_buffer.is_some() && !capabilities.supports_packed_depth_stencil() {
                crate::engine_bail!(
                    SOURCE,
                    Configuration,
                    "Packed Stencil/Render render buffers are not available on GLES 2.0"
                );
            }
            if self.texture_attachments.len() > 1 {
                crate::engine_bail!(SOURCE, Configuration, "Multiple render targets not available on GLES 2.0");
            }
            for spec in &self.texture_attachments {
                if spec.is_depth {
                    crate::engine_bail!(
                        SOURCE,
                        Configuration,
                        "Depth texture FrameBuffer Attachment not available on GLES 2.0"
                    );
                }
                if spec.is_stencil {
                    crate::engine_bail!(
                        SOURCE,
                        Configuration,
                        "Stencil texture FrameBuffer Attachment not available on GLES 2.0"
                    );
                }
                let float_texture = spec.is_float || (self.kind == FrameBufferKind::Float && spec.is_color_texture());
                if float_texture && !capabilities.supports_extension(gl::EXT_OES_TEXTURE_FLOAT) {
                    crate::engine_bail!(
                        SOURCE,
                        Configuration,
                        "Float texture FrameBuffer Attachment not available on GLES 2.0"
                    );
                }
            }
        }

        if self.packed_stencil_depth_render_buffer.is_some()
            && (self.depth_render_buffer.is_some() || self.stencil_render_buffer.is_some())
        {
            crate::engine_bail!(
                SOURCE,
                Configuration,
                "Frame buffer couldn't be constructed: packed stencil depth buffer cannot be specified together with separated depth or stencil buffer"
            );
        }

        let color_attachments = self
            .texture_attachments
            .iter()
            .filter(|spec| spec.is_color_texture())
            .count()
            + self.color_render_buffers.len();
        let max = capabilities.max_color_attachments as usize;
        if max > 0 && color_attachments > max {
            crate::engine_bail!(
                SOURCE,
                Configuration,
                "Framebuffer requests {} color attachments, only {} available",
                color_attachments,
                max
            );
        }
        Ok(())
    }

    /// `validate` plus the checks that depend on the platform
    fn validate_for(&self, ctx: &GlContext) -> Result<()> {
        self.validate(ctx.capabilities())?;
        if self.kind == FrameBufferKind::Float
            && ctx.capabilities().gl30
            && ctx.application_type() == crate::graphics::ApplicationType::WebGl
            && !ctx.capabilities().supports_extension(gl::EXT_COLOR_BUFFER_FLOAT)
        {
            // WebGL2 can only render into float textures with this extension
            crate::engine_bail!(SOURCE, Configuration, "Extension EXT_color_buffer_float not supported!");
        }
        Ok(())
    }

    /// Allocate the framebuffer and register it in `registry`
    pub fn build(self, ctx: &GlContext, registry: &mut FrameBufferRegistry) -> Result<FrameBufferId> {
        registry.build(ctx, self)
    }
}

// ===== FRAMEBUFFER =====

/// Live framebuffer and the GL objects it owns
#[derive(Debug)]
pub struct GlFrameBuffer {
    builder: FrameBufferBuilder,
    framebuffer_handle: u32,
    depthbuffer_handle: u32,
    stencilbuffer_handle: u32,
    depth_stencil_packed_buffer_handle: u32,
    has_depth_stencil_packed_buffer: bool,
    color_buffer_handles: Vec<u32>,
    texture_attachments: Vec<GlTexture>,
    is_mrt: bool,
    default_draw_buffers: Option<Vec<u32>>,
}

impl GlFrameBuffer {
    pub(crate) fn build(builder: FrameBufferBuilder, ctx: &GlContext) -> Result<Self> {
        let mut frame_buffer = Self {
            builder,
            framebuffer_handle: 0,
            depthbuffer_handle: 0,
            stencilbuffer_handle: 0,
            depth_stencil_packed_buffer_handle: 0,
            has_depth_stencil_packed_buffer: false,
            color_buffer_handles: Vec::new(),
            texture_attachments: Vec::new(),
            is_mrt: false,
            default_draw_buffers: None,
        };
        frame_buffer.construct(ctx)?;
        Ok(frame_buffer)
    }

    /// Create every GL object described by the builder
    ///
    /// Handles from a previous construction are dropped without deleting
    /// them: this runs again only after the context that owned them is gone.
    /// On failure everything allocated here is deleted again.
    pub(crate) fn construct(&mut self, ctx: &GlContext) -> Result<()> {
        self.builder.validate_for(ctx)?;
        self.forget_handles();

        let default_framebuffer = ctx.default_framebuffer_handle();
        let allocated = self.allocate(ctx);
        ctx.gl().bind_framebuffer(gl::FRAMEBUFFER, default_framebuffer);

        let code = match allocated {
            Ok(code) => code,
            Err(error) => {
                self.release(ctx);
                return Err(error);
            }
        };

        if code != gl::FRAMEBUFFER_COMPLETE {
            self.release(ctx);
            let status = frame_buffer_status(code);
            crate::engine_error!(SOURCE, "Frame buffer couldn't be constructed: {}", status);
            return Err(Error::IncompleteFrameBuffer(status));
        }
        Ok(())
    }

    /// Allocate and attach; returns the completeness status
    fn allocate(&mut self, ctx: &GlContext) -> Result<u32> {
        let builder = self.builder.clone();
        let gl_api = ctx.gl();
        let width = builder.width as i32;
        let height = builder.height as i32;
        let samples = builder.samples as i32;

        let create_render_buffer = |internal_format: u32| -> u32 {
            let handle = gl_api.gen_renderbuffer();
            gl_api.bind_renderbuffer(gl::RENDERBUFFER, handle);
            if samples > 0 {
                gl_api.renderbuffer_storage_multisample(gl::RENDERBUFFER, samples, internal_format, width, height);
            } else {
                gl_api.renderbuffer_storage(gl::RENDERBUFFER, internal_format, width, height);
            }
            handle
        };

        self.framebuffer_handle = gl_api.gen_framebuffer();
        gl_api.bind_framebuffer(gl::FRAMEBUFFER, self.framebuffer_handle);

        if let Some(spec) = builder.depth_render_buffer {
            self.depthbuffer_handle = create_render_buffer(spec.internal_format);
        }
        if let Some(spec) = builder.stencil_render_buffer {
            self.stencilbuffer_handle = create_render_buffer(spec.internal_format);
        }
        if let Some(spec) = builder.packed_stencil_depth_render_buffer {
            self.depth_stencil_packed_buffer_handle = create_render_buffer(spec.internal_format);
            self.has_depth_stencil_packed_buffer = true;
        }

        self.is_mrt = builder.texture_attachments.len() > 1;
        let mut color_attachments = 0u32;

        if self.is_mrt {
            for spec in &builder.texture_attachments {
                let texture = builder.kind.create_texture(ctx, builder.width, builder.height, spec)?;
                let attachment = if spec.is_color_texture() {
                    color_attachments += 1;
                    gl::COLOR_ATTACHMENT0 + color_attachments - 1
                } else if spec.is_depth {
                    gl::DEPTH_ATTACHMENT
                } else {
                    gl::STENCIL_ATTACHMENT
                };
                gl_api.framebuffer_texture_2d(gl::FRAMEBUFFER, attachment, gl::TEXTURE_2D, texture.handle(), 0);
                self.texture_attachments.push(texture);
            }
        } else if let Some(spec) = builder.texture_attachments.first() {
            let texture = builder.kind.create_texture(ctx, builder.width, builder.height, spec)?;
            gl_api.bind_texture(texture.target(), texture.handle());
            self.texture_attachments.push(texture);
        }

        // Plain colour renderbuffers follow the texture-backed colour attachments
        for spec in &builder.color_render_buffers {
            let handle = create_render_buffer(spec.internal_format);
            gl_api.framebuffer_renderbuffer(
                gl::FRAMEBUFFER,
                gl::COLOR_ATTACHMENT0 + color_attachments,
                gl::RENDERBUFFER,
                handle,
            );
            self.color_buffer_handles.push(handle);
            color_attachments += 1;
        }

        if self.is_mrt || samples > 0 {
            let draw_buffers: Vec<u32> = (0..color_attachments).map(|i| gl::COLOR_ATTACHMENT0 + i).collect();
            gl_api.draw_buffers(&draw_buffers);
            self.default_draw_buffers = Some(draw_buffers);
        } else if let Some(texture) = self.texture_attachments.first() {
            builder.kind.attach_color_texture(ctx, texture);
        }

        if builder.depth_render_buffer.is_some() {
            gl_api.framebuffer_renderbuffer(
                gl::FRAMEBUFFER,
                gl::DEPTH_ATTACHMENT,
                gl::RENDERBUFFER,
                self.depthbuffer_handle,
            );
        }
        if builder.stencil_render_buffer.is_some() {
            gl_api.framebuffer_renderbuffer(
                gl::FRAMEBUFFER,
                gl::STENCIL_ATTACHMENT,
                gl::RENDERBUFFER,
                self.stencilbuffer_handle,
            );
        }
        if builder.packed_stencil_depth_render_buffer.is_some() {
            gl_api.framebuffer_renderbuffer(
                gl::FRAMEBUFFER,
                gl::DEPTH_STENCIL_ATTACHMENT,
                gl::RENDERBUFFER,
                self.depth_stencil_packed_buffer_handle,
            );
        }

        gl_api.bind_renderbuffer(gl::RENDERBUFFER, 0);
        for texture in &self.texture_attachments {
            gl_api.bind_texture(texture.target(), 0);
        }

        let mut status = gl_api.check_framebuffer_status(gl::FRAMEBUFFER);

        if status == gl::FRAMEBUFFER_UNSUPPORTED
            && builder.depth_render_buffer.is_some()
            && builder.stencil_render_buffer.is_some()
            && ctx.capabilities().supports_packed_depth_stencil()
        {
            crate::engine_warn!(
                SOURCE,
                "Separate depth and stencil render buffers unsupported, using a packed depth-stencil buffer"
            );
            gl_api.delete_renderbuffer(self.depthbuffer_handle);
            self.depthbuffer_handle = 0;
            gl_api.delete_renderbuffer(self.stencilbuffer_handle);
            self.stencilbuffer_handle = 0;
            gl_api.delete_renderbuffer(self.depth_stencil_packed_buffer_handle);

            self.depth_stencil_packed_buffer_handle = create_render_buffer(gl::DEPTH24_STENCIL8_OES);
            self.has_depth_stencil_packed_buffer = true;
            gl_api.bind_renderbuffer(gl::RENDERBUFFER, 0);

            gl_api.framebuffer_renderbuffer(
                gl::FRAMEBUFFER,
                gl::DEPTH_ATTACHMENT,
                gl::RENDERBUFFER,
                self.depth_stencil_packed_buffer_handle,
            );
            gl_api.framebuffer_renderbuffer(
                gl::FRAMEBUFFER,
                gl::STENCIL_ATTACHMENT,
                gl::RENDERBUFFER,
                self.depth_stencil_packed_buffer_handle,
            );
            status = gl_api.check_framebuffer_status(gl::FRAMEBUFFER);
        }

        Ok(status)
    }

    /// Delete every owned GL object (deleting handle 0 is a GL no-op)
    pub(crate) fn release(&mut self, ctx: &GlContext) {
        let gl_api = ctx.gl();
        let kind = self.builder.kind;
        for mut texture in self.texture_attachments.drain(..) {
            kind.dispose_texture(ctx, &mut texture);
        }
        gl_api.delete_renderbuffer(self.depth_stencil_packed_buffer_handle);
        gl_api.delete_renderbuffer(self.depthbuffer_handle);
        gl_api.delete_renderbuffer(self.stencilbuffer_handle);
        for handle in self.color_buffer_handles.drain(..) {
            gl_api.delete_renderbuffer(handle);
        }
        gl_api.delete_framebuffer(self.framebuffer_handle);
        self.forget_handles();
    }

    fn forget_handles(&mut self) {
        self.framebuffer_handle = 0;
        self.depthbuffer_handle = 0;
        self.stencilbuffer_handle = 0;
        self.depth_stencil_packed_buffer_handle = 0;
        self.has_depth_stencil_packed_buffer = false;
        self.color_buffer_handles.clear();
        self.texture_attachments.clear();
        self.is_mrt = false;
        self.default_draw_buffers = None;
    }

    // ===== ACCESSORS =====

    pub fn builder(&self) -> &FrameBufferBuilder {
        &self.builder
    }

    pub fn width(&self) -> u32 {
        self.builder.width
    }

    pub fn height(&self) -> u32 {
        self.builder.height
    }

    pub fn framebuffer_handle(&self) -> u32 {
        self.framebuffer_handle
    }

    pub fn depth_buffer_handle(&self) -> u32 {
        self.depthbuffer_handle
    }

    pub fn stencil_buffer_handle(&self) -> u32 {
        self.stencilbuffer_handle
    }

    pub fn depth_stencil_packed_buffer_handle(&self) -> u32 {
        self.depth_stencil_packed_buffer_handle
    }

    pub fn has_depth_stencil_packed_buffer(&self) -> bool {
        self.has_depth_stencil_packed_buffer
    }

    pub fn color_buffer_handle(&self, index: usize) -> Option<u32> {
        self.color_buffer_handles.get(index).copied()
    }

    pub fn color_buffer_handles(&self) -> &[u32] {
        &self.color_buffer_handles
    }

    pub fn texture_attachments(&self) -> &[GlTexture] {
        &self.texture_attachments
    }

    /// First texture attachment
    pub fn color_buffer_texture(&self) -> Option<&GlTexture> {
        self.texture_attachments.first()
    }

    pub fn is_multiple_render_targets(&self) -> bool {
        self.is_mrt
    }

    // ===== BINDING =====

    pub fn bind(&self, ctx: &GlContext) {
        ctx.gl().bind_framebuffer(gl::FRAMEBUFFER, self.framebuffer_handle);
    }

    /// Bind and set the viewport to the framebuffer size
    pub fn begin(&self, ctx: &GlContext) {
        self.bind(ctx);
        ctx.gl().viewport(0, 0, self.builder.width as i32, self.builder.height as i32);
    }

    /// Restore the default framebuffer and the back buffer viewport
    pub fn end(&self, ctx: &GlContext) {
        let (width, height) = ctx.back_buffer_size();
        self.end_with_viewport(ctx, 0, 0, width as i32, height as i32);
    }

    pub fn end_with_viewport(&self, ctx: &GlContext, x: i32, y: i32, width: i32, height: i32) {
        Self::unbind(ctx);
        ctx.gl().viewport(x, y, width, height);
    }

    /// Bind the default framebuffer
    pub fn unbind(ctx: &GlContext) {
        ctx.gl().bind_framebuffer(gl::FRAMEBUFFER, ctx.default_framebuffer_handle());
    }

    // ===== TRANSFER =====

    /// Buffers worth copying into `destination`, derived from its texture attachments
    pub fn copy_bits_for(&self, destination: &GlFrameBuffer) -> BufferBits {
        let has_depth = self.builder.depth_render_buffer.is_some()
            || self.builder.packed_stencil_depth_render_buffer.is_some();
        let has_stencil = self.builder.stencil_render_buffer.is_some()
            || self.builder.packed_stencil_depth_render_buffer.is_some();

        let mut bits = BufferBits::empty();
        for spec in &destination.builder.texture_attachments {
            if spec.is_depth && has_depth {
                bits |= BufferBits::DEPTH;
            } else if spec.is_stencil && has_stencil {
                bits |= BufferBits::STENCIL;
            } else if !self.color_buffer_handles.is_empty() {
                bits |= BufferBits::COLOR;
            }
        }
        bits
    }

    /// Blit this framebuffer into `destination` (same size required)
    ///
    /// Colour is copied one destination texture at a time: the draw-buffer
    /// list must be a sequential run, optionally preceded by `NONE`
    /// entries, so each pass enables only attachment `i` at position `i`.
    pub(crate) fn transfer_to(&self, ctx: &GlContext, destination: &GlFrameBuffer, bits: BufferBits) -> Result<()> {
        if destination.width() != self.width() || destination.height() != self.height() {
            crate::engine_bail!(
                SOURCE,
                InvalidResource,
                "source and destination frame buffers must have same size ({}x{} vs {}x{})",
                self.width(),
                self.height(),
                destination.width(),
                destination.height()
            );
        }

        let gl_api = ctx.gl();
        let (width, height) = (self.width() as i32, self.height() as i32);
        gl_api.bind_framebuffer(gl::READ_FRAMEBUFFER, self.framebuffer_handle);
        gl_api.bind_framebuffer(gl::DRAW_FRAMEBUFFER, destination.framebuffer_handle);

        let mut mask = bits;
        if mask.contains(BufferBits::COLOR) {
            let total = destination
                .builder
                .texture_attachments
                .iter()
                .filter(|spec| spec.is_color_texture())
                .count() as u32;

            for index in 0..total {
                gl_api.read_buffer(gl::COLOR_ATTACHMENT0 + index);
                let draw_buffers: Vec<u32> = (0..total)
                    .map(|i| if i == index { gl::COLOR_ATTACHMENT0 + i } else { gl::NONE })
                    .collect();
                gl_api.draw_buffers(&draw_buffers);
                gl_api.blit_framebuffer(0, 0, width, height, 0, 0, width, height, mask.bits(), gl::NEAREST);
                // Depth and stencil go with the first pass only
                mask = BufferBits::COLOR;
            }
        }

        // Depth and/or stencil without colour
        if !mask.is_empty() && mask != BufferBits::COLOR {
            gl_api.blit_framebuffer(0, 0, width, height, 0, 0, width, height, mask.bits(), gl::NEAREST);
        }

        if let Some(draw_buffers) = &destination.default_draw_buffers {
            gl_api.draw_buffers(draw_buffers);
        }
        gl_api.bind_framebuffer(gl::READ_FRAMEBUFFER, 0);
        gl_api.bind_framebuffer(gl::DRAW_FRAMEBUFFER, 0);
        Ok(())
    }
}

#[cfg(test)]
#[path = "frame_buffer_tests.rs"]
mod tests;
