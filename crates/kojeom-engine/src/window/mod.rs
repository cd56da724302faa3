//! Window + runtime loop.
//!
//! Owns the `winit` event loop and window, and wires them to the device,
//! renderer and camera.

mod config;
mod runtime;

pub use config::EngineConfig;
pub use runtime::{EXIT_FAILURE, Engine, run_application};
