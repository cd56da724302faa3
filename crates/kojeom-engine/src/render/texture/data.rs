use crate::device::GraphicsError;
use crate::paint::Color;

/// CPU-side RGBA8 image.
///
/// Each texel is packed as `(A << 24) | (B << 16) | (G << 8) | R`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureData {
    width: u32,
    height: u32,
    texels: Vec<u32>,
}

impl TextureData {
    /// Largest width or height accepted on the CPU side.
    pub const MAX_DIMENSION: u32 = 16384;

    pub fn solid_color(width: u32, height: u32, color: Color) -> Result<Self, GraphicsError> {
        let count = ensure_extent(width, height)?;
        let texel = color.pack_abgr();
        Ok(Self {
            width,
            height,
            texels: vec![texel; count],
        })
    }

    /// Alternating `check_size`-sized squares; the square containing (0, 0)
    /// uses `color1`.
    pub fn checkerboard(
        width: u32,
        height: u32,
        color1: Color,
        color2: Color,
        check_size: u32,
    ) -> Result<Self, GraphicsError> {
        if check_size == 0 {
            return Err(GraphicsError::invalid("checker size must be non-zero"));
        }
        ensure_extent(width, height)?;

        let (c1, c2) = (color1.pack_abgr(), color2.pack_abgr());
        let texels = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| {
                if (x / check_size + y / check_size) % 2 == 0 {
                    c1
                } else {
                    c2
                }
            })
            .collect();

        Ok(Self {
            width,
            height,
            texels,
        })
    }

    /// Wraps tightly packed RGBA8 rows.
    pub fn from_rgba8(width: u32, height: u32, bytes: &[u8]) -> Result<Self, GraphicsError> {
        let count = ensure_extent(width, height)?;

        let expected = count.checked_mul(4).ok_or_else(|| {
            GraphicsError::invalid(format!("{width}x{height} RGBA8 image is too large"))
        })?;
        if bytes.len() != expected {
            return Err(GraphicsError::invalid(format!(
                "expected {expected} bytes for {width}x{height} RGBA8, got {}",
                bytes.len()
            )));
        }

        let texels = bytes
            .chunks_exact(4)
            .map(|px| u32::from_le_bytes([px[0], px[1], px[2], px[3]]))
            .collect();

        Ok(Self {
            width,
            height,
            texels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn texels(&self) -> &[u32] {
        &self.texels
    }

    pub fn texel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.texels
            .get((y as usize) * (self.width as usize) + x as usize)
            .copied()
    }

    /// Texels serialized as R, G, B, A bytes regardless of host endianness.
    pub fn to_rgba8_bytes(&self) -> Vec<u8> {
        self.texels.iter().flat_map(|t| t.to_le_bytes()).collect()
    }
}

/// Validates the size and returns the texel count.
fn ensure_extent(width: u32, height: u32) -> Result<usize, GraphicsError> {
    if width == 0 || height == 0 {
        return Err(GraphicsError::invalid(format!(
            "texture size must be non-zero, got {width}x{height}"
        )));
    }
    if width > TextureData::MAX_DIMENSION || height > TextureData::MAX_DIMENSION {
        return Err(GraphicsError::invalid(format!(
            "texture size {width}x{height} exceeds {0}x{0}",
            TextureData::MAX_DIMENSION
        )));
    }

    (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| GraphicsError::invalid(format!("texture size {width}x{height} overflows")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> TextureData {
        TextureData::checkerboard(128, 128, Color::WHITE, Color::BLACK, 16).unwrap()
    }

    // ── checkerboard ──────────────────────────────────────────────────────

    #[test]
    fn checker_alternates_along_x() {
        let tex = board();
        let (c1, c2) = (Color::WHITE.pack_abgr(), Color::BLACK.pack_abgr());
        assert_eq!(tex.texel(0, 0), Some(c1));
        assert_eq!(tex.texel(16, 0), Some(c2));
        assert_eq!(tex.texel(32, 0), Some(c1));
    }

    #[test]
    fn checker_alternates_along_y_and_diagonal() {
        let tex = board();
        let (c1, c2) = (Color::WHITE.pack_abgr(), Color::BLACK.pack_abgr());
        assert_eq!(tex.texel(0, 16), Some(c2));
        assert_eq!(tex.texel(16, 16), Some(c1));
        assert_eq!(tex.texel(15, 15), Some(c1));
        assert_eq!(tex.texel(127, 127), Some(c1));
    }

    #[test]
    fn checker_matches_parity_rule_everywhere() {
        let tex = TextureData::checkerboard(37, 23, Color::RED, Color::BLUE, 5).unwrap();
        for y in 0..23 {
            for x in 0..37 {
                let expected = if (x / 5 + y / 5) % 2 == 0 {
                    Color::RED
                } else {
                    Color::BLUE
                };
                assert_eq!(tex.texel(x, y), Some(expected.pack_abgr()), "({x}, {y})");
            }
        }
    }

    #[test]
    fn zero_check_size_rejected() {
        let err = TextureData::checkerboard(8, 8, Color::WHITE, Color::BLACK, 0).unwrap_err();
        assert!(matches!(err, GraphicsError::InvalidArgument(_)));
    }

    // ── solid / raw ───────────────────────────────────────────────────────

    #[test]
    fn solid_fills_every_texel() {
        let tex = TextureData::solid_color(3, 5, Color::GREEN).unwrap();
        assert_eq!(tex.texels().len(), 15);
        assert!(tex.texels().iter().all(|&t| t == 0xFF00_FF00));
    }

    #[test]
    fn zero_sized_texture_rejected() {
        assert!(TextureData::solid_color(0, 4, Color::WHITE).is_err());
        assert!(TextureData::solid_color(4, 0, Color::WHITE).is_err());
    }

    #[test]
    fn oversized_texture_rejected_without_allocating() {
        for (w, h) in [(65536, 65536), (u32::MAX, 2), (2, TextureData::MAX_DIMENSION + 1)] {
            let err = TextureData::solid_color(w, h, Color::WHITE).unwrap_err();
            assert!(matches!(err, GraphicsError::InvalidArgument(_)), "{w}x{h}");
        }
        assert!(TextureData::checkerboard(65536, 65536, Color::WHITE, Color::BLACK, 8).is_err());
        assert!(TextureData::from_rgba8(u32::MAX, u32::MAX, &[]).is_err());
    }

    #[test]
    fn largest_accepted_dimension_is_inclusive() {
        let tex = TextureData::solid_color(TextureData::MAX_DIMENSION, 1, Color::BLACK).unwrap();
        assert_eq!(tex.texels().len(), TextureData::MAX_DIMENSION as usize);
    }

    #[test]
    fn rgba8_bytes_round_trip() {
        let bytes = [1, 2, 3, 4, 5, 6, 7, 8];
        let tex = TextureData::from_rgba8(2, 1, &bytes).unwrap();
        assert_eq!(tex.texel(0, 0), Some(0x0403_0201));
        assert_eq!(tex.to_rgba8_bytes(), bytes);
    }

    #[test]
    fn rgba8_length_mismatch_rejected() {
        assert!(TextureData::from_rgba8(2, 2, &[0; 12]).is_err());
    }

    #[test]
    fn texel_out_of_bounds_is_none() {
        let tex = TextureData::solid_color(2, 2, Color::WHITE).unwrap();
        assert_eq!(tex.texel(2, 0), None);
        assert_eq!(tex.texel(0, 2), None);
    }
}
