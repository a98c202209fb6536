//! Image decoding for skybox faces: file -> (width, height, RGBA8 bytes).

use std::path::Path;

use crate::error::{AssetError, AssetResult};

/// Decoded pixels in CPU memory, always RGBA8, ready for GPU upload.
#[derive(Clone, Debug)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureData {
    pub fn new_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), (width * height * 4) as usize);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Decode an image file (PNG or JPEG) into RGBA8.
    pub fn load(path: impl AsRef<Path>) -> AssetResult<Self> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| AssetError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        log::debug!("decoded {} ({}x{})", path.display(), width, height);
        Ok(Self::new_rgba8(width, height, rgba.into_raw()))
    }

    /// `true` when the byte count matches the RGBA8 dimensions.
    pub fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.pixels.len() == (self.width * self.height * 4) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_validate_byte_count() {
        let t = TextureData::new_rgba8(2, 2, vec![0u8; 16]);
        assert!(t.is_valid());
        let bad = TextureData {
            width: 2,
            height: 2,
            pixels: vec![0u8; 3],
        };
        assert!(!bad.is_valid());
    }

    #[test]
    fn missing_image_is_a_decode_error() {
        let err = TextureData::load("/definitely/not/here.png").unwrap_err();
        assert!(matches!(err, AssetError::Decode { .. }));
    }
}
