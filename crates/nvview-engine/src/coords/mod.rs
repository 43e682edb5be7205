//! Pixel-space geometry shared by the device and render layers.
//!
//! All sizes are physical pixels with the origin at the top-left corner of the
//! render target.

mod viewport;

pub use viewport::Viewport;
