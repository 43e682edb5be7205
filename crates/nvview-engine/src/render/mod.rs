//! GPU rendering subsystem.
//!
//! Renderers issue GPU commands via wgpu and own their GPU resources
//! (pipelines, buffers, textures). They draw into a [`RenderTarget`] supplied by
//! the caller, who also owns submission and presentation.

mod ctx;
pub mod yuv;

pub use ctx::{RenderCtx, RenderTarget};
