//! Unit tests for gl.rs
//!
//! Capabilities helpers and the cached default framebuffer handle.

use crate::graphics::gl_enums as gl;
use crate::graphics::mock_gl::MockGl;
use crate::graphics::{ApplicationType, GlCapabilities};

// ============================================================================
// CAPABILITIES
// ============================================================================

#[test]
fn test_gles_presets() {
    let gles20 = GlCapabilities::gles20();
    assert!(!gles20.gl30);
    assert_eq!(gles20.max_color_attachments, 1);

    let gles30 = GlCapabilities::gles30();
    assert!(gles30.gl30);
    assert_eq!(gles30.max_color_attachments, 4);
    assert!(gles30.extensions.is_empty());
}

#[test]
fn test_packed_depth_stencil_either_extension() {
    assert!(!GlCapabilities::gles20().supports_packed_depth_stencil());
    assert!(GlCapabilities::gles20()
        .with_extension(gl::EXT_OES_PACKED_DEPTH_STENCIL)
        .supports_packed_depth_stencil());
    assert!(GlCapabilities::gles20()
        .with_extension(gl::EXT_EXT_PACKED_DEPTH_STENCIL)
        .supports_packed_depth_stencil());
}

#[test]
fn test_with_max_color_attachments() {
    let caps = GlCapabilities::gles30().with_max_color_attachments(8);
    assert_eq!(caps.max_color_attachments, 8);
}

#[test]
fn test_desktop_gl_application_types() {
    assert!(ApplicationType::Desktop.is_desktop_gl());
    assert!(ApplicationType::HeadlessDesktop.is_desktop_gl());
    assert!(!ApplicationType::Android.is_desktop_gl());
    assert!(!ApplicationType::Ios.is_desktop_gl());
    assert!(!ApplicationType::WebGl.is_desktop_gl());
}

// ============================================================================
// DEFAULT FRAMEBUFFER
// ============================================================================

#[test]
fn test_default_framebuffer_is_zero_on_desktop() {
    let mock = MockGl::new();
    let ctx = mock.context(GlCapabilities::gles30(), ApplicationType::Desktop);

    assert_eq!(ctx.default_framebuffer_handle(), 0);
    assert_eq!(mock.count("get_integer"), 0);
}

#[test]
fn test_default_framebuffer_queried_once_on_ios() {
    let mock = MockGl::new();
    mock.set_framebuffer_binding(7);
    let ctx = mock.context(GlCapabilities::gles30(), ApplicationType::Ios);

    assert_eq!(ctx.default_framebuffer_handle(), 7);
    mock.set_framebuffer_binding(9);
    assert_eq!(ctx.default_framebuffer_handle(), 7);
    assert_eq!(mock.count("get_integer"), 1);
}

#[test]
fn test_negative_binding_clamped_to_zero() {
    let mock = MockGl::new();
    mock.set_framebuffer_binding(-1);
    let ctx = mock.context(GlCapabilities::gles30(), ApplicationType::Ios);

    assert_eq!(ctx.default_framebuffer_handle(), 0);
}

#[test]
fn test_back_buffer_size() {
    let mock = MockGl::new();
    let ctx = mock.context(GlCapabilities::gles30(), ApplicationType::Desktop);

    assert_eq!(ctx.back_buffer_size(), (0, 0));
    ctx.set_back_buffer_size(800, 600);
    assert_eq!(ctx.back_buffer_size(), (800, 600));
    assert_eq!(ctx.application_type(), ApplicationType::Desktop);
}
