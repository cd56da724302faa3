//! Time subsystem.
//!
//! Frame timing utilities decoupled from the runtime:
//! - `FrameClock` produces clamped per-frame deltas
//! - `FrameStats` turns those deltas into a once-per-second FPS figure

mod frame_clock;
mod frame_stats;

pub use frame_clock::{FrameClock, FrameTime, MAX_FRAME_DELTA};
pub use frame_stats::FrameStats;
