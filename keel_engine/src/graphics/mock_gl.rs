/// Mock GL for unit tests (no driver required)
///
/// Records every call as a string, hands out increasing handles and keeps
/// track of which objects are still alive. Clones share the same state, so
/// a test keeps one clone while the `GlContext` owns the other.

use std::cell::RefCell;
use std::rc::Rc;
use rustc_hash::{FxHashMap, FxHashSet};
use crate::graphics::gl_enums as gl;
use crate::graphics::{ApplicationType, Gl, GlCapabilities, GlContext};

#[derive(Default)]
struct MockGlState {
    calls: Vec<String>,
    next_handle: u32,
    framebuffers: FxHashSet<u32>,
    renderbuffers: FxHashSet<u32>,
    textures: FxHashSet<u32>,
    renderbuffer_formats: FxHashMap<u32, u32>,
    /// (framebuffer, attachment point) -> attached object
    attachments: FxHashMap<(u32, u32), u32>,
    bound_framebuffer: u32,
    bound_renderbuffer: u32,
    forced_status: Option<u32>,
    reject_separate_depth_stencil: bool,
    framebuffer_binding: i32,
}

impl MockGlState {
    fn next(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }
}

#[derive(Clone, Default)]
pub struct MockGl {
    state: Rc<RefCell<MockGlState>>,
}

impl MockGl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context owning a clone of this mock
    pub fn context(&self, capabilities: GlCapabilities, application_type: ApplicationType) -> GlContext {
        GlContext::new(Box::new(self.clone()), capabilities, application_type)
    }

    /// Every status check returns `status`
    pub fn force_status(&self, status: u32) {
        self.state.borrow_mut().forced_status = Some(status);
    }

    /// Report FRAMEBUFFER_UNSUPPORTED when depth and stencil use separate renderbuffers
    pub fn reject_separate_depth_stencil(&self) {
        self.state.borrow_mut().reject_separate_depth_stencil = true;
    }

    /// Value returned for FRAMEBUFFER_BINDING
    pub fn set_framebuffer_binding(&self, handle: i32) {
        self.state.borrow_mut().framebuffer_binding = handle;
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn live_framebuffers(&self) -> usize {
        self.state.borrow().framebuffers.len()
    }

    pub fn live_renderbuffers(&self) -> usize {
        self.state.borrow().renderbuffers.len()
    }

    pub fn live_textures(&self) -> usize {
        self.state.borrow().textures.len()
    }

    pub fn live_handles(&self) -> usize {
        self.live_framebuffers() + self.live_renderbuffers() + self.live_textures()
    }

    pub fn renderbuffer_format(&self, renderbuffer: u32) -> Option<u32> {
        self.state.borrow().renderbuffer_formats.get(&renderbuffer).copied()
    }

    /// Drop every object without recording deletes, as a lost context does
    pub fn lose_context(&self) {
        let mut state = self.state.borrow_mut();
        state.framebuffers.clear();
        state.renderbuffers.clear();
        state.textures.clear();
        state.attachments.clear();
        state.renderbuffer_formats.clear();
    }

    fn record(&self, call: String) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl Gl for MockGl {
    fn gen_framebuffer(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        let handle = state.next();
        state.framebuffers.insert(handle);
        state.calls.push(format!("gen_framebuffer -> {}", handle));
        handle
    }

    fn delete_framebuffer(&self, framebuffer: u32) {
        if framebuffer == 0 {
            return;
        }
        self.record(format!("delete_framebuffer({})", framebuffer));
        let mut state = self.state.borrow_mut();
        state.framebuffers.remove(&framebuffer);
        state.attachments.retain(|(fb, _), _| *fb != framebuffer);
    }

    fn bind_framebuffer(&self, target: u32, framebuffer: u32) {
        self.record(format!("bind_framebuffer({:#x}, {})", target, framebuffer));
        if target == gl::FRAMEBUFFER {
            self.state.borrow_mut().bound_framebuffer = framebuffer;
        }
    }

    fn check_framebuffer_status(&self, target: u32) -> u32 {
        self.record(format!("check_framebuffer_status({:#x})", target));
        let state = self.state.borrow();
        if let Some(status) = state.forced_status {
            return status;
        }
        let fb = state.bound_framebuffer;
        if state.reject_separate_depth_stencil {
            let depth = state.attachments.get(&(fb, gl::DEPTH_ATTACHMENT));
            let stencil = state.attachments.get(&(fb, gl::STENCIL_ATTACHMENT));
            if let (Some(depth), Some(stencil)) = (depth, stencil) {
                if depth != stencil {
                    return gl::FRAMEBUFFER_UNSUPPORTED;
                }
            }
        }
        gl::FRAMEBUFFER_COMPLETE
    }

    fn framebuffer_texture_2d(&self, target: u32, attachment: u32, tex_target: u32, texture: u32, level: i32) {
        self.record(format!(
            "framebuffer_texture_2d({:#x}, {:#x}, {:#x}, {}, {})",
            target, attachment, tex_target, texture, level
        ));
        let mut state = self.state.borrow_mut();
        let fb = state.bound_framebuffer;
        state.attachments.insert((fb, attachment), texture);
    }

    fn framebuffer_renderbuffer(&self, target: u32, attachment: u32, rb_target: u32, renderbuffer: u32) {
        self.record(format!(
            "framebuffer_renderbuffer({:#x}, {:#x}, {:#x}, {})",
            target, attachment, rb_target, renderbuffer
        ));
        let mut state = self.state.borrow_mut();
        let fb = state.bound_framebuffer;
        state.attachments.insert((fb, attachment), renderbuffer);
    }

    fn gen_renderbuffer(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        let handle = state.next();
        state.renderbuffers.insert(handle);
        state.calls.push(format!("gen_renderbuffer -> {}", handle));
        handle
    }

    fn delete_renderbuffer(&self, renderbuffer: u32) {
        if renderbuffer == 0 {
            return;
        }
        self.record(format!("delete_renderbuffer({})", renderbuffer));
        self.state.borrow_mut().renderbuffers.remove(&renderbuffer);
    }

    fn bind_renderbuffer(&self, target: u32, renderbuffer: u32) {
        self.record(format!("bind_renderbuffer({:#x}, {})", target, renderbuffer));
        self.state.borrow_mut().bound_renderbuffer = renderbuffer;
    }

    fn renderbuffer_storage(&self, target: u32, internal_format: u32, width: i32, height: i32) {
        self.record(format!(
            "renderbuffer_storage({:#x}, {:#x}, {}, {})",
            target, internal_format, width, height
        ));
        let mut state = self.state.borrow_mut();
        let handle = state.bound_renderbuffer;
        state.renderbuffer_formats.insert(handle, internal_format);
    }

    fn renderbuffer_storage_multisample(
        &self,
        target: u32,
        samples: i32,
        internal_format: u32,
        width: i32,
        height: i32,
    ) {
        self.record(format!(
            "renderbuffer_storage_multisample({:#x}, {}, {:#x}, {}, {})",
            target, samples, internal_format, width, height
        ));
        let mut state = self.state.borrow_mut();
        let handle = state.bound_renderbuffer;
        state.renderbuffer_formats.insert(handle, internal_format);
    }

    fn gen_texture(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        let handle = state.next();
        state.textures.insert(handle);
        state.calls.push(format!("gen_texture -> {}", handle));
        handle
    }

    fn delete_texture(&self, texture: u32) {
        if texture == 0 {
            return;
        }
        self.record(format!("delete_texture({})", texture));
        self.state.borrow_mut().textures.remove(&texture);
    }

    fn bind_texture(&self, target: u32, texture: u32) {
        self.record(format!("bind_texture({:#x}, {})", target, texture));
    }

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
    ) {
        self.record(format!(
            "tex_image_2d({:#x}, {}, {:#x}, {}, {}, {}, {:#x}, {:#x}, {})",
            target,
            level,
            internal_format,
            width,
            height,
            border,
            format,
            data_type,
            pixels.map_or(0, |p| p.len())
        ));
    }

    fn tex_parameteri(&self, target: u32, pname: u32, param: i32) {
        self.record(format!("tex_parameteri({:#x}, {:#x}, {:#x})", target, pname, param));
    }

    fn draw_buffers(&self, buffers: &[u32]) {
        let list: Vec<String> = buffers.iter().map(|b| format!("{:#x}", b)).collect();
        self.record(format!("draw_buffers([{}])", list.join(", ")));
    }

    fn read_buffer(&self, source: u32) {
        self.record(format!("read_buffer({:#x})", source));
    }

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
    ) {
        self.record(format!(
            "blit_framebuffer({}, {}, {}, {}, {}, {}, {}, {}, {:#x}, {:#x})",
            src_x0, src_y0, src_x1, src_y1, dst_x0, dst_y0, dst_x1, dst_y1, mask, filter
        ));
    }

    fn get_integer(&self, pname: u32) -> i32 {
        self.record(format!("get_integer({:#x})", pname));
        let state = self.state.borrow();
        match pname {
            gl::FRAMEBUFFER_BINDING => state.framebuffer_binding,
            gl::MAX_COLOR_ATTACHMENTS => 4,
            _ => 0,
        }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(format!("viewport({}, {}, {}, {})", x, y, width, height));
    }
}
