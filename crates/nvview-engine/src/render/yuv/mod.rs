//! NV21/NV12 frame renderer.
//!
//! A frame is a luma plane followed by one interleaved chroma plane at half
//! resolution. Each plane is uploaded into its own texture (`R8Unorm` and
//! `Rg8Unorm`) and a textured quad converts YUV to RGB in the fragment stage.
//!
//! Lifecycle: [`YuvRenderer::new`] → [`YuvRenderer::resize`] /
//! [`YuvRenderer::render`] → [`YuvRenderer::shutdown`] (or drop).

mod error;
mod frame;
mod quad;
mod renderer;
mod shader;
mod textures;

pub use error::{FrameError, RenderError};
pub use frame::{frame_len, PixelFormat, YuvFrame};
pub use quad::{texture_coords, Orientation, QuadVertex, BASE_TEX_COORDS, QUAD_INDICES, QUAD_VERTICES};
pub use renderer::{RendererConfig, RendererStats, YuvRenderer};
pub use shader::{program_source, validate_program};
pub use textures::{TextureState, UploadPlan};
