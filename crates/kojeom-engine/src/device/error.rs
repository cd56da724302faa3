use std::path::PathBuf;

use thiserror::Error;

use crate::render::ShaderStage;

/// Failures raised by the device and the resources created on it.
#[derive(Debug, Error)]
pub enum GraphicsError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("failed to create surface")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter")]
    AdapterUnavailable(#[from] wgpu::RequestAdapterError),

    #[error("failed to create device/queue")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported formats")]
    NoSurfaceFormat,

    /// The surface could not hand out a frame; rendering resumes next frame.
    #[error("frame skipped")]
    FrameSkipped,

    #[error("surface lost beyond recovery")]
    SurfaceFatal(#[source] wgpu::SurfaceError),

    #[error("{0} shaders are not supported by this backend")]
    UnsupportedStage(ShaderStage),

    #[error("shader compilation failed ({label}):\n{diagnostic}")]
    ShaderCompile { label: String, diagnostic: String },

    #[error("entry point `{entry_point}` not found for {stage} stage")]
    MissingEntryPoint {
        entry_point: String,
        stage: ShaderStage,
    },

    #[error("input layout requires a vertex shader")]
    MissingVertexShader,

    #[error("failed to read shader file {path}")]
    ShaderIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load texture {path}")]
    TextureLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl GraphicsError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM); terminate gracefully.
    Fatal,
}
