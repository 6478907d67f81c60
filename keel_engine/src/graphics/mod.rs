//! Off-screen render targets
//!
//! - [`Gl`] / [`GlContext`]: GL call surface, capabilities, platform
//! - [`FrameBufferBuilder`]: attachment description, validated before allocation
//! - [`GlFrameBuffer`]: live framebuffer (bind, begin/end, blit transfer)
//! - [`FrameBufferRegistry`]: owns framebuffers, rebuilds them after context loss

pub mod gl_enums;
mod gl;
mod texture_data;
mod gl_texture;
mod frame_buffer;
mod frame_buffer_registry;

#[cfg(test)]
pub(crate) mod mock_gl;

pub use gl::{ApplicationType, Gl, GlCapabilities, GlContext};
pub use texture_data::{FloatTextureData, GlOnlyTextureData, TextureData};
pub use gl_texture::{GlTexture, PixelFormat, TextureFilter, TextureWrap};
pub use frame_buffer::{
    BufferBits, FrameBufferBuilder, FrameBufferKind, GlFrameBuffer, RenderBufferSpec,
    TextureAttachmentSpec,
};
pub use frame_buffer_registry::{FrameBufferId, FrameBufferRegistry};
