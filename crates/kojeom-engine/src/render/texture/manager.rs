use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::device::GraphicsError;
use crate::paint::Color;

use super::{Texture, TextureData};

pub const DEFAULT_SOLID_SIZE: u32 = 64;
pub const DEFAULT_CHECKERBOARD_SIZE: u32 = 128;
pub const DEFAULT_CHECK_SIZE: u32 = 16;

/// Filename-keyed texture cache plus three built-in textures.
///
/// Entries are never evicted; `clear_cache` drops them all at once.
pub struct TextureManager {
    cache: HashMap<PathBuf, Arc<Texture>>,
    white: Arc<Texture>,
    black: Arc<Texture>,
    checkerboard: Arc<Texture>,
}

impl TextureManager {
    pub fn new() -> Result<Self, GraphicsError> {
        let white = Texture::new(
            "default white",
            TextureData::solid_color(DEFAULT_SOLID_SIZE, DEFAULT_SOLID_SIZE, Color::WHITE)?,
        );
        let black = Texture::new(
            "default black",
            TextureData::solid_color(DEFAULT_SOLID_SIZE, DEFAULT_SOLID_SIZE, Color::BLACK)?,
        );
        let checkerboard = Texture::new(
            "default checkerboard",
            TextureData::checkerboard(
                DEFAULT_CHECKERBOARD_SIZE,
                DEFAULT_CHECKERBOARD_SIZE,
                Color::WHITE,
                Color::new(0.5, 0.5, 0.5, 1.0),
                DEFAULT_CHECK_SIZE,
            )?,
        );

        log::info!("texture manager initialized with default textures");

        Ok(Self {
            cache: HashMap::new(),
            white: Arc::new(white),
            black: Arc::new(black),
            checkerboard: Arc::new(checkerboard),
        })
    }

    /// Returns the cached texture for `path`, loading it on first request.
    ///
    /// Failed loads are not cached.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<Arc<Texture>, GraphicsError> {
        let path = path.as_ref();
        if let Some(texture) = self.cache.get(path) {
            return Ok(Arc::clone(texture));
        }

        let texture = Arc::new(Texture::load_from_file(path).inspect_err(|e| {
            log::error!("failed to load texture {}: {e:#}", path.display());
        })?);

        self.cache.insert(path.to_path_buf(), Arc::clone(&texture));
        Ok(texture)
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<Arc<Texture>> {
        self.cache.get(path.as_ref()).cloned()
    }

    pub fn white(&self) -> &Arc<Texture> {
        &self.white
    }

    pub fn black(&self) -> &Arc<Texture> {
        &self.black
    }

    pub fn checkerboard(&self) -> &Arc<Texture> {
        &self.checkerboard
    }

    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    /// Drops every file-backed texture. Defaults stay.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}
