//! Image decoding for image textures.
//!
//! Decodes files with the `image` crate into a tightly packed RGB8 buffer.
//! The renderer only samples the buffer; conversion to linear light happens
//! at lookup time.

use std::path::Path;

use thiserror::Error;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to load texture {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Pixel buffer of {len} bytes does not match {width}x{height} RGB")]
    SizeMismatch { width: u32, height: u32, len: usize },

    #[error("Texture has zero size")]
    Empty,
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A decoded image with 8-bit RGB channels, row-major from the top-left.
#[derive(Clone, Debug)]
pub struct ImageData {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl ImageData {
    /// Wrap an existing RGB8 buffer.
    pub fn from_rgb8(width: u32, height: u32, data: Vec<u8>) -> TextureResult<Self> {
        if width == 0 || height == 0 {
            return Err(TextureError::Empty);
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(3));
        if expected != Some(data.len()) {
            return Err(TextureError::SizeMismatch {
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Decode an image file (any format the `image` crate understands).
    pub fn load(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| TextureError::Decode {
            path: path.display().to_string(),
            source,
        })?;

        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();

        log::debug!(
            "Loaded texture: {} ({}x{}, {:.1} KB)",
            path.display(),
            width,
            height,
            rgb.as_raw().len() as f64 / 1024.0
        );

        Self::from_rgb8(width, height, rgb.into_raw())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// RGB bytes at integer coordinates; out-of-range coordinates are clamped
    /// to the nearest edge pixel.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }
}

/// Convert sRGB byte value to linear float.
pub fn srgb_to_linear(value: u8) -> f32 {
    let v = value as f32 / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}
