//! Frame timing.
//!
//! - [`FrameClock`]: one per render loop; `tick()` once per presented frame.
//! - [`FramePacer`]: converts display-rate ticks into video-rate frame steps.

mod frame_clock;
mod pacer;

pub use frame_clock::{FrameClock, FrameTime};
pub use pacer::FramePacer;
