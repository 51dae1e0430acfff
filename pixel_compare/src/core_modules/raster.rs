// THEORY:
// `RasterImage` is the "dumb" data container at the bottom of the engine: a
// decoded RGBA8 raster and nothing else. Every higher layer reads from it and
// nothing ever writes back. Drawing happens on a canvas obtained through
// `to_canvas`, which is an independent copy, so two comparisons can share
// nothing and a source image survives any number of annotations unchanged.

use std::path::Path;

use image::{ImageReader, RgbaImage};

use crate::error::{CompareError, Result};

/// A decoded, immutable RGBA raster.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    buffer: RgbaImage,
}

impl RasterImage {
    /// Loads and decodes an image file, converting any colour type to RGBA8.
    ///
    /// The format is sniffed from the file's leading bytes, so the extension
    /// does not have to match the content.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(CompareError::InputMissing {
                path: path.to_path_buf(),
            });
        }

        let missing = |_: std::io::Error| CompareError::InputMissing {
            path: path.to_path_buf(),
        };
        let undecodable = |source: image::ImageError| CompareError::Decode {
            path: path.to_path_buf(),
            source,
        };

        let decoded = ImageReader::open(path)
            .map_err(missing)?
            .with_guessed_format()
            .map_err(|e| undecodable(image::ImageError::IoError(e)))?
            .decode()
            .map_err(undecodable)?;

        Ok(Self {
            buffer: decoded.to_rgba8(),
        })
    }

    /// Decodes an in-memory encoded image (PNG, JPEG, ...).
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory(bytes).map_err(|source| CompareError::Decode {
            path: "<memory>".into(),
            source,
        })?;
        Ok(Self {
            buffer: decoded.to_rgba8(),
        })
    }

    /// Wraps a raw row-major RGBA buffer.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let len = pixels.len();
        if len as u64 != width as u64 * height as u64 * 4 {
            return Err(CompareError::BufferSize { width, height, len });
        }
        RgbaImage::from_raw(width, height, pixels)
            .map(|buffer| Self { buffer })
            .ok_or(CompareError::BufferSize { width, height, len })
    }

    /// Builds an image by evaluating `f` for every pixel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [u8; 4]) -> Self {
        Self {
            buffer: RgbaImage::from_fn(width, height, |x, y| image::Rgba(f(x, y))),
        }
    }

    /// A uniformly coloured image.
    pub fn filled(width: u32, height: u32, color: [u8; 4]) -> Self {
        Self::from_fn(width, height, |_, _| color)
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    /// The RGBA channels at `(x, y)`. Panics when out of bounds, like indexing.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.buffer.get_pixel(x, y).0
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.buffer
    }

    /// An owned copy to draw on. The source is never touched.
    pub fn to_canvas(&self) -> RgbaImage {
        self.buffer.clone()
    }
}

impl From<RgbaImage> for RasterImage {
    fn from(buffer: RgbaImage) -> Self {
        Self { buffer }
    }
}
