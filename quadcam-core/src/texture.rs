/// Raster textures and how their transparency is expressed
use std::path::Path;

use image::{Rgb, Rgba, RgbaImage};
use thiserror::Error;

/// Side length of [`Texture::default`].
pub const DEFAULT_TEXTURE_SIZE: u32 = 50;

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to load texture: {0}")]
    Image(#[from] image::ImageError),

    #[error("texture has zero area ({width}x{height})")]
    Empty { width: u32, height: u32 },
}

/// How a texture marks its transparent pixels.
///
/// A per-pixel alpha channel and a color key are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transparency {
    /// Every pixel is drawn; the alpha channel is ignored.
    Opaque,
    /// The alpha channel is honoured per pixel.
    Alpha,
    /// Pixels of exactly this color are not drawn.
    ColorKey(Rgb<u8>),
}

/// A rectangular raster image attached to a face.
#[derive(Debug, Clone)]
pub struct Texture {
    image: RgbaImage,
    transparency: Transparency,
}

impl Texture {
    pub fn new(image: RgbaImage, transparency: Transparency) -> Result<Self, TextureError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(TextureError::Empty {
                width: image.width(),
                height: image.height(),
            });
        }
        Ok(Self { image, transparency })
    }

    /// Load an image file. Files with an alpha channel use [`Transparency::Alpha`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TextureError> {
        let dynamic = image::open(path)?;
        let transparency = if dynamic.color().has_alpha() {
            Transparency::Alpha
        } else {
            Transparency::Opaque
        };
        Self::new(dynamic.into_rgba8(), transparency)
    }

    /// Single-color opaque texture. Zero dimensions are bumped to 1.
    pub fn solid(width: u32, height: u32, color: Rgb<u8>) -> Self {
        let Rgb([r, g, b]) = color;
        Self {
            image: RgbaImage::from_pixel(width.max(1), height.max(1), Rgba([r, g, b, 255])),
            transparency: Transparency::Opaque,
        }
    }

    /// Opaque two-color checkerboard with square cells of `cell` pixels.
    pub fn checker(width: u32, height: u32, cell: u32, a: Rgb<u8>, b: Rgb<u8>) -> Self {
        let cell = cell.max(1);
        let image = RgbaImage::from_fn(width.max(1), height.max(1), |x, y| {
            let Rgb([r, g, bl]) = if (x / cell + y / cell) % 2 == 0 { a } else { b };
            Rgba([r, g, bl, 255])
        });
        Self {
            image,
            transparency: Transparency::Opaque,
        }
    }

    pub fn with_transparency(mut self, transparency: Transparency) -> Self {
        self.transparency = transparency;
        self
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn has_alpha(&self) -> bool {
        self.transparency == Transparency::Alpha
    }

    pub fn color_key(&self) -> Option<Rgb<u8>> {
        match self.transparency {
            Transparency::ColorKey(key) => Some(key),
            _ => None,
        }
    }

    pub fn transparency(&self) -> Transparency {
        self.transparency
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn image_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }
}

impl Default for Texture {
    /// A fresh 50x50 black opaque texture
    fn default() -> Self {
        Self::solid(DEFAULT_TEXTURE_SIZE, DEFAULT_TEXTURE_SIZE, Rgb([0, 0, 0]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_texture() {
        let tex = Texture::default();
        assert_eq!((tex.width(), tex.height()), (50, 50));
        assert_eq!(tex.transparency(), Transparency::Opaque);
        assert_eq!(tex.image().get_pixel(10, 10), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_empty_image_rejected() {
        let err = Texture::new(RgbaImage::new(0, 4), Transparency::Opaque).unwrap_err();
        assert!(matches!(err, TextureError::Empty { width: 0, height: 4 }));
    }

    #[test]
    fn test_alpha_and_color_key_are_exclusive() {
        let keyed = Texture::default().with_transparency(Transparency::ColorKey(Rgb([255, 0, 255])));
        assert_eq!(keyed.color_key(), Some(Rgb([255, 0, 255])));
        assert!(!keyed.has_alpha());

        let alpha = keyed.with_transparency(Transparency::Alpha);
        assert!(alpha.has_alpha());
        assert_eq!(alpha.color_key(), None);
    }

    #[test]
    fn test_checker_pattern() {
        let tex = Texture::checker(4, 4, 2, Rgb([255, 255, 255]), Rgb([0, 0, 0]));
        assert_eq!(tex.image().get_pixel(0, 0)[0], 255);
        assert_eq!(tex.image().get_pixel(2, 0)[0], 0);
        assert_eq!(tex.image().get_pixel(2, 2)[0], 255);
    }
}
