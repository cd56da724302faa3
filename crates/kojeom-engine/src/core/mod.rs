//! Core engine-facing contracts.
//!
//! Defines the interface between the runtime loop and applications built on
//! the engine, plus the context handed to every callback.

mod app;
mod ctx;

pub use app::{AppControl, Application};
pub use ctx::EngineCtx;
