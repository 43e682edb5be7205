//! wgpu device ownership.
//!
//! [`Gpu`] drives a window surface; [`HeadlessGpu`] renders offscreen for
//! tests and tools.

mod gpu;
mod headless;
mod init;
mod surface;

pub use gpu::{Gpu, GpuFrame};
pub use surface::SurfaceErrorAction;
pub use headless::HeadlessGpu;
pub use init::GpuInit;
