use std::f32::consts::FRAC_PI_4;

use crate::device::GpuInit;
use crate::paint::Color;

/// Window, camera and presentation settings for [`Engine`](super::Engine).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub title: String,

    /// Client area size in physical pixels.
    pub width: u32,
    pub height: u32,

    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near_z: f32,
    pub far_z: f32,

    /// Used by the default `Application::render`.
    pub clear_color: Color,
    pub vsync: bool,

    pub gpu: GpuInit,
}

impl EngineConfig {
    pub const DEFAULT_TITLE: &'static str = "KojeomEngine";
    pub const DEFAULT_WIDTH: u32 = 1024;
    pub const DEFAULT_HEIGHT: u32 = 768;
    pub const DEFAULT_CLEAR_COLOR: Color = Color::new(0.0, 0.2, 0.4, 1.0);

    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_perspective(mut self, fov_y: f32, near_z: f32, far_z: f32) -> Self {
        self.fov_y = fov_y;
        self.near_z = near_z;
        self.far_z = far_z;
        self
    }

    pub fn with_clear_color(mut self, clear_color: Color) -> Self {
        self.clear_color = clear_color;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    pub fn with_gpu(mut self, gpu: GpuInit) -> Self {
        self.gpu = gpu;
        self
    }

    /// Width over height of the requested client area.
    ///
    /// Falls back to 1.0 for a zero height.
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: Self::DEFAULT_TITLE.to_string(),
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
            fov_y: FRAC_PI_4,
            near_z: 0.1,
            far_z: 1000.0,
            clear_color: Self::DEFAULT_CLEAR_COLOR,
            vsync: true,
            gpu: GpuInit::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn defaults_match_engine_conventions() {
        let config = EngineConfig::default();
        assert_eq!(config.title, "KojeomEngine");
        assert_eq!((config.width, config.height), (1024, 768));
        assert_relative_eq!(config.fov_y, FRAC_PI_4);
        assert_relative_eq!(config.near_z, 0.1);
        assert_relative_eq!(config.far_z, 1000.0);
        assert!(config.vsync);
        assert_eq!(config.clear_color, Color::new(0.0, 0.2, 0.4, 1.0));
    }

    #[test]
    fn builders_override_fields() {
        let config = EngineConfig::new("demo", 800, 600)
            .with_perspective(1.0, 0.5, 50.0)
            .with_vsync(false)
            .with_clear_color(Color::BLACK);

        assert_eq!(config.title, "demo");
        assert_eq!((config.width, config.height), (800, 600));
        assert_relative_eq!(config.fov_y, 1.0);
        assert_relative_eq!(config.far_z, 50.0);
        assert!(!config.vsync);
        assert_eq!(config.clear_color, Color::BLACK);
    }

    #[test]
    fn aspect_ratio_guards_zero_height() {
        assert_relative_eq!(EngineConfig::default().aspect_ratio(), 1024.0 / 768.0);
        assert_relative_eq!(EngineConfig::default().with_size(10, 0).aspect_ratio(), 1.0);
    }
}
