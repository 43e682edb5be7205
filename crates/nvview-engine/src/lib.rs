//! nvview engine crate.
//!
//! GPU runtime pieces (device, window loop, timing, logging) and the
//! NV21/NV12 frame renderer in [`render::yuv`].

pub mod device;
pub mod window;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod render;
