//! 2D textures: CPU texel data, lazily created GPU resources and the
//! filename-keyed manager.

mod data;
mod manager;

use std::path::Path;
use std::sync::{Arc, OnceLock};

use crate::device::{GraphicsContext, GraphicsError};
use crate::paint::Color;

pub use data::TextureData;
pub use manager::TextureManager;

/// Sampled RGBA8 texture with a bilinear, wrapping sampler.
pub struct Texture {
    label: String,
    data: TextureData,
    gpu: OnceLock<GpuTexture>,
}

pub(crate) struct GpuTexture {
    _texture: wgpu::Texture,
    _view: wgpu::TextureView,
    _sampler: wgpu::Sampler,
    bind_group: wgpu::BindGroup,
}

impl GpuTexture {
    #[inline]
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

impl Texture {
    pub fn new(label: impl Into<String>, data: TextureData) -> Self {
        Self {
            label: label.into(),
            data,
            gpu: OnceLock::new(),
        }
    }

    pub fn solid_color(width: u32, height: u32, color: Color) -> Result<Self, GraphicsError> {
        let data = TextureData::solid_color(width, height, color)?;
        Ok(Self::new(format!("solid {width}x{height}"), data))
    }

    pub fn checkerboard(
        width: u32,
        height: u32,
        color1: Color,
        color2: Color,
        check_size: u32,
    ) -> Result<Self, GraphicsError> {
        let data = TextureData::checkerboard(width, height, color1, color2, check_size)?;
        Ok(Self::new(format!("checkerboard {width}x{height}"), data))
    }

    /// Decodes an image file into an RGBA8 texture.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, GraphicsError> {
        let path = path.as_ref();
        let image = image::open(path)
            .map_err(|source| GraphicsError::TextureLoad {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();

        let (width, height) = image.dimensions();
        let data = TextureData::from_rgba8(width, height, image.as_raw())?;

        log::info!("loaded texture {} ({width}x{height})", path.display());
        Ok(Self::new(path.display().to_string(), data))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn data(&self) -> &TextureData {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.data.width()
    }

    pub fn height(&self) -> u32 {
        self.data.height()
    }

    /// Binds to slot 0.
    pub fn bind<C>(self: &Arc<Self>, ctx: &mut C)
    where
        C: GraphicsContext + ?Sized,
    {
        ctx.bind_texture(self);
    }

    pub fn unbind<C>(&self, ctx: &mut C)
    where
        C: GraphicsContext + ?Sized,
    {
        ctx.unbind_texture();
    }

    pub fn is_uploaded(&self) -> bool {
        self.gpu.get().is_some()
    }

    /// Fails when the texture is larger than `max_dimension` on either axis.
    pub(crate) fn check_fits(&self, max_dimension: u32) -> Result<(), GraphicsError> {
        let (width, height) = (self.width(), self.height());
        if width > max_dimension || height > max_dimension {
            return Err(GraphicsError::invalid(format!(
                "texture `{}` is {width}x{height}, device limit is {max_dimension}",
                self.label
            )));
        }
        Ok(())
    }

    /// Creates the texture, view, sampler and bind group once.
    ///
    /// Textures beyond the device's 2D size limit are refused.
    pub(crate) fn upload(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
    ) -> Result<&GpuTexture, GraphicsError> {
        if let Some(gpu) = self.gpu.get() {
            return Ok(gpu);
        }
        self.check_fits(device.limits().max_texture_dimension_2d)?;

        Ok(self.gpu.get_or_init(|| {
            let (width, height) = (self.data.width(), self.data.height());
            let size = wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            };

            let texture = device.create_texture(&wgpu::TextureDescriptor {
                label: Some(&self.label),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });

            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                &self.data.to_rgba8_bytes(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * width),
                    rows_per_image: Some(height),
                },
                size,
            );

            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

            let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some(&format!("{} sampler", self.label)),
                address_mode_u: wgpu::AddressMode::Repeat,
                address_mode_v: wgpu::AddressMode::Repeat,
                address_mode_w: wgpu::AddressMode::Repeat,
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                mipmap_filter: wgpu::MipmapFilterMode::Linear,
                ..Default::default()
            });

            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("{} bind group", self.label)),
                layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&sampler),
                    },
                ],
            });

            GpuTexture {
                _texture: texture,
                _view: view,
                _sampler: sampler,
                bind_group,
            }
        }))
    }
}

impl std::fmt::Debug for Texture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture")
            .field("label", &self.label)
            .field("width", &self.data.width())
            .field("height", &self.data.height())
            .field("uploaded", &self.is_uploaded())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::recording::{Call, RecordingContext};

    // ── device limits ─────────────────────────────────────────────────────

    #[test]
    fn texture_within_limit_fits() {
        let tex = Texture::solid_color(8192, 4, Color::WHITE).unwrap();
        assert!(tex.check_fits(8192).is_ok());
    }

    #[test]
    fn texture_over_limit_is_refused() {
        let tex = Texture::solid_color(4, 8193, Color::WHITE).unwrap();
        let err = tex.check_fits(8192).unwrap_err();
        assert!(matches!(err, GraphicsError::InvalidArgument(_)));
        assert!(!tex.is_uploaded());
    }

    // ── loading ───────────────────────────────────────────────────────────

    #[test]
    fn load_png_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("red.png");
        image::RgbaImage::from_pixel(3, 2, image::Rgba([255, 0, 0, 255]))
            .save(&path)
            .unwrap();

        let texture = Texture::load_from_file(&path).unwrap();
        assert_eq!((texture.width(), texture.height()), (3, 2));
        assert_eq!(texture.data().texel(2, 1), Some(Color::RED.pack_abgr()));
        assert!(!texture.is_uploaded());
    }

    #[test]
    fn load_missing_file_fails() {
        let err = Texture::load_from_file("no/such/texture.png").unwrap_err();
        assert!(matches!(err, GraphicsError::TextureLoad { .. }));
    }

    #[test]
    fn bind_targets_slot_zero() {
        let texture = Arc::new(Texture::solid_color(4, 4, Color::WHITE).unwrap());
        let mut ctx = RecordingContext::default();
        texture.bind(&mut ctx);
        texture.unbind(&mut ctx);
        assert_eq!(
            ctx.calls,
            vec![
                Call::BindTexture("solid 4x4".to_string()),
                Call::UnbindTexture
            ]
        );
    }
}
