use std::fs;
use std::path::Path;

use image::{ImageFormat, Rgba, RgbaImage};
use imageproc::map::map_colors;

use crate::error::{ConvertError, ConvertResult, Stage};

/// A non-empty, row-major RGBA raster with 8-bit channels.
///
/// The pixel buffer always holds exactly `width * height * 4` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    image: RgbaImage,
}

impl Bitmap {
    /// Build a bitmap from raw RGBA bytes, validating the dimensions and buffer length.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> ConvertResult<Self> {
        check_dimensions(width, height)?;
        let expected = (width as u64) * (height as u64) * 4;
        if pixels.len() as u64 != expected {
            return Err(ConvertError::invalid(
                Stage::Validation,
                format!(
                    "pixel buffer holds {} bytes, expected {expected} for {width}x{height} RGBA",
                    pixels.len()
                ),
            ));
        }
        let image = RgbaImage::from_raw(width, height, pixels).ok_or_else(|| {
            ConvertError::invalid(Stage::Validation, "pixel buffer does not fit the image")
        })?;
        Ok(Self { image })
    }

    /// Wrap an already decoded RGBA image.
    pub fn from_image(image: RgbaImage) -> ConvertResult<Self> {
        let (width, height) = image.dimensions();
        check_dimensions(width, height)?;
        Ok(Self { image })
    }

    /// Decode a PNG byte stream. Other raster formats are rejected.
    pub fn decode_png(bytes: &[u8]) -> ConvertResult<Self> {
        match image::guess_format(bytes) {
            Ok(ImageFormat::Png) => {}
            Ok(other) => {
                return Err(ConvertError::invalid(
                    Stage::Decoding,
                    format!("expected a PNG image, found {other:?}"),
                ));
            }
            Err(_) => {
                return Err(ConvertError::invalid(
                    Stage::Decoding,
                    "input is not a PNG image",
                ));
            }
        }
        let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Png)?;
        Self::from_image(decoded.to_rgba8())
    }

    /// Read and decode a PNG file.
    pub fn open_png(path: impl AsRef<Path>) -> ConvertResult<Self> {
        let bytes = fs::read(path)?;
        Self::decode_png(&bytes)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// The pixel at column `x`, row `y`. Panics when out of bounds, like [`RgbaImage::get_pixel`].
    pub fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.image.get_pixel(x, y)
    }

    /// A same-sized bitmap with `f` applied to every pixel.
    pub fn map_pixels<F>(&self, f: F) -> Bitmap
    where
        F: Fn(Rgba<u8>) -> Rgba<u8>,
    {
        Bitmap {
            image: map_colors(&self.image, f),
        }
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        self.image.as_raw().len() / 4
    }

    /// A `Bitmap` is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The raw row-major RGBA bytes.
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Encode the bitmap as a PNG file.
    pub fn save_png(&self, path: impl AsRef<Path>) -> ConvertResult<()> {
        self.image.save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }
}

fn check_dimensions(width: u32, height: u32) -> ConvertResult<()> {
    if width == 0 || height == 0 {
        return Err(ConvertError::invalid(
            Stage::Validation,
            format!("bitmap dimensions must be positive, got {width}x{height}"),
        ));
    }
    Ok(())
}
