/// Framebuffer registry
///
/// Owns every live [`GlFrameBuffer`] of a context. After the context is
/// lost and recreated, [`FrameBufferRegistry::invalidate_all`] rebuilds
/// each buffer from its builder; when the application goes away,
/// [`FrameBufferRegistry::clear`] forgets them without touching GL.

use slotmap::{new_key_type, SlotMap};
use crate::error::Result;
use crate::graphics::{BufferBits, FrameBufferBuilder, GlContext, GlFrameBuffer};

const SOURCE: &str = "keel::FrameBufferRegistry";

new_key_type! {
    /// Stable key to a registered framebuffer
    pub struct FrameBufferId;
}

#[derive(Debug, Default)]
pub struct FrameBufferRegistry {
    buffers: SlotMap<FrameBufferId, GlFrameBuffer>,
}

impl FrameBufferRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a framebuffer; it is registered only if construction succeeds
    pub fn build(&mut self, ctx: &GlContext, builder: FrameBufferBuilder) -> Result<FrameBufferId> {
        let frame_buffer = GlFrameBuffer::build(builder, ctx)?;
        let (width, height) = (frame_buffer.width(), frame_buffer.height());
        let id = self.buffers.insert(frame_buffer);
        crate::engine_debug!(SOURCE, "Frame buffer {:?} built ({}x{})", id, width, height);
        Ok(id)
    }

    pub fn get(&self, id: FrameBufferId) -> Option<&GlFrameBuffer> {
        self.buffers.get(id)
    }

    pub fn contains(&self, id: FrameBufferId) -> bool {
        self.buffers.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = FrameBufferId> + '_ {
        self.buffers.keys()
    }

    /// Delete the GL objects of `id` and unregister it
    pub fn dispose(&mut self, ctx: &GlContext, id: FrameBufferId) -> Result<()> {
        match self.buffers.remove(id) {
            Some(mut frame_buffer) => {
                frame_buffer.release(ctx);
                crate::engine_debug!(SOURCE, "Frame buffer {:?} disposed", id);
                Ok(())
            }
            None => Err(crate::engine_err!(SOURCE, InvalidResource, "Unknown frame buffer: {:?}", id)),
        }
    }

    /// Dispose every registered framebuffer
    pub fn dispose_all(&mut self, ctx: &GlContext) {
        for (_, mut frame_buffer) in self.buffers.drain() {
            frame_buffer.release(ctx);
        }
    }

    /// Rebuild every framebuffer in place after a context loss
    ///
    /// Ids stay valid. A buffer that fails to rebuild is left without GL
    /// objects; the others are still rebuilt and the first error is returned.
    pub fn invalidate_all(&mut self, ctx: &GlContext) -> Result<()> {
        let mut first_error = None;
        for (id, frame_buffer) in self.buffers.iter_mut() {
            match frame_buffer.construct(ctx) {
                Ok(()) => crate::engine_debug!(SOURCE, "Frame buffer {:?} rebuilt", id),
                Err(error) => {
                    if first_error.is_none() {
                        first_error = Some(error);
                    }
                }
            }
        }
        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Forget every framebuffer without any GL call (the context is gone)
    pub fn clear(&mut self) {
        self.buffers.clear();
    }

    pub fn managed_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn managed_status(&self) -> String {
        if self.buffers.is_empty() {
            "Managed buffers/app: { }".to_string()
        } else {
            format!("Managed buffers/app: {{ {} }}", self.buffers.len())
        }
    }

    /// Blit `bits` of `source` into `destination`
    pub fn transfer(
        &self,
        ctx: &GlContext,
        source: FrameBufferId,
        destination: FrameBufferId,
        bits: BufferBits,
    ) -> Result<()> {
        let (source, destination) = self.pair(source, destination)?;
        source.transfer_to(ctx, destination, bits)
    }

    /// Blit whatever `source` has that `destination`'s textures can receive
    pub fn transfer_auto(&self, ctx: &GlContext, source: FrameBufferId, destination: FrameBufferId) -> Result<()> {
        let (source, destination) = self.pair(source, destination)?;
        let bits = source.copy_bits_for(destination);
        source.transfer_to(ctx, destination, bits)
    }

    fn pair(&self, source: FrameBufferId, destination: FrameBufferId) -> Result<(&GlFrameBuffer, &GlFrameBuffer)> {
        let source = self
            .buffers
            .get(source)
            .ok_or_else(|| crate::engine_err!(SOURCE, InvalidResource, "Unknown frame buffer: {:?}", source))?;
        let destination = self
            .buffers
            .get(destination)
            .ok_or_else(|| crate::engine_err!(SOURCE, InvalidResource, "Unknown frame buffer: {:?}", destination))?;
        Ok((source, destination))
    }
}

#[cfg(test)]
#[path = "frame_buffer_registry_tests.rs"]
mod tests;
