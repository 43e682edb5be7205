use thiserror::Error;

use super::PixelFormat;

/// A frame buffer that does not match the NV21/NV12 layout contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame dimensions must be non-zero (got {width}x{height})")]
    ZeroDimensions { width: u32, height: u32 },

    #[error("frame dimensions must be even (got {width}x{height})")]
    OddDimensions { width: u32, height: u32 },

    #[error("frame buffer holds {actual} bytes, {expected} required")]
    BufferTooSmall { expected: usize, actual: usize },

    #[error("unknown pixel format: {0}")]
    UnknownFormat(String),
}

/// Renderer construction and configuration failures.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The WGSL program for `format` did not parse or validate.
    #[error("failed to build {format} shader program: {log}")]
    ShaderCompile { format: PixelFormat, log: String },

    #[error("orientation must be a multiple of 90 degrees (got {0})")]
    InvalidOrientation(i32),

    #[error(transparent)]
    Frame(#[from] FrameError),
}
