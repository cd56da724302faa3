//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the Surface (swapchain) and guarding resizes
//! - the [`GraphicsContext`] seam through which everything else draws

mod bindings;
mod constants;
mod context;
mod error;
mod frame;
mod gpu;
mod init;
mod surface;

pub(crate) use bindings::BindingLayouts;
pub use context::GraphicsContext;
pub use error::{GraphicsError, SurfaceErrorAction};
pub use gpu::GraphicsDevice;
pub use init::GpuInit;
pub use surface::{SwapchainExtent, Viewport};

#[cfg(test)]
pub(crate) use context::recording;
