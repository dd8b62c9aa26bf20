use std::io::Cursor;

use image::{DynamicImage, ImageFormat, imageops::FilterType};
use serde::{Deserialize, Serialize};

use crate::{error::ExportError, scene::TextureFormat};

/// Interpolation method used for texture resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeInterpolation {
    /// Fast nearest-neighbor interpolation.
    Nearest,
    /// Bilinear interpolation (`image`'s `Triangle` filter).
    #[default]
    Bilinear,
    /// Bicubic interpolation (`image`'s `CatmullRom` filter).
    Bicubic,
    /// Gaussian interpolation.
    Gaussian,
    /// Lanczos (windowed sinc) interpolation.
    Lanczos3,
}

impl From<ResizeInterpolation> for FilterType {
    fn from(value: ResizeInterpolation) -> Self {
        match value {
            ResizeInterpolation::Nearest => FilterType::Nearest,
            ResizeInterpolation::Bilinear => FilterType::Triangle,
            ResizeInterpolation::Bicubic => FilterType::CatmullRom,
            ResizeInterpolation::Gaussian => FilterType::Gaussian,
            ResizeInterpolation::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl From<TextureFormat> for ImageFormat {
    fn from(value: TextureFormat) -> Self {
        match value {
            TextureFormat::Png => ImageFormat::Png,
            TextureFormat::Jpeg => ImageFormat::Jpeg,
            TextureFormat::Webp => ImageFormat::WebP,
        }
    }
}

/// Resize image to fit within the specified max size while preserving aspect ratio.
///
/// If the image is already smaller than both limits, this function returns an
/// unchanged clone and does not upscale.
pub fn resize_texture_to_max(
    image: &DynamicImage,
    max_width: u32,
    max_height: u32,
    interpolation: ResizeInterpolation,
) -> DynamicImage {
    if image.width() <= max_width && image.height() <= max_height {
        return image.clone();
    }

    image.resize(max_width, max_height, interpolation.into())
}

/// Downscale encoded texture bytes so the longer side fits `max_size`.
///
/// Returns `None` when the image already fits, so callers keep the original
/// bytes untouched. Oversized images are re-encoded in their own format.
pub fn downscale_encoded(
    bytes: &[u8],
    format: TextureFormat,
    max_size: u32,
    interpolation: ResizeInterpolation,
) -> Result<Option<Vec<u8>>, ExportError> {
    let image_format = ImageFormat::from(format);
    let decoded = image::load_from_memory_with_format(bytes, image_format)?;
    if decoded.width() <= max_size && decoded.height() <= max_size {
        return Ok(None);
    }

    let resized = resize_texture_to_max(&decoded, max_size, max_size, interpolation);
    // JPEG has no alpha channel.
    let resized = match format {
        TextureFormat::Jpeg => DynamicImage::ImageRgb8(resized.to_rgb8()),
        TextureFormat::Png | TextureFormat::Webp => resized,
    };

    let mut encoded = Vec::<u8>::new();
    resized.write_to(&mut Cursor::new(&mut encoded), image_format)?;
    Ok(Some(encoded))
}
