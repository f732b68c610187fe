//! Unified image loading with support for multiple formats
//!
//! This module provides the entry points for turning raw bytes or files into
//! RGB pixel grids, and for encoding results back to PNG.
//!
//! ## Supported Formats
//!
//! Via the `image` crate: JPEG, PNG, GIF (first frame), WebP, TIFF, BMP.
//!
//! ## Transparency
//!
//! Background-removal tools usually emit RGBA images whose background is
//! fully transparent. Those pixels are flattened to black, the reserved
//! background value, so isolated images can be stored and reloaded as
//! plain RGB without losing the foreground/background split.

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageFormat as CodecFormat, ImageReader, Rgb, RgbImage};
use tracing::debug;

use crate::error::{AnalysisError, Result};

/// Supported image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// JPEG image
    Jpeg,
    /// PNG image
    Png,
    /// GIF image (first frame only)
    Gif,
    /// WebP image
    WebP,
    /// TIFF image
    Tiff,
    /// BMP image
    Bmp,
}

impl ImageFormat {
    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<ImageFormat> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            "gif" => Some(ImageFormat::Gif),
            "webp" => Some(ImageFormat::WebP),
            "tiff" | "tif" => Some(ImageFormat::Tiff),
            "bmp" => Some(ImageFormat::Bmp),
            _ => None,
        }
    }

    /// Detect format from the leading bytes of an encoded image
    pub fn from_bytes(bytes: &[u8]) -> Option<ImageFormat> {
        match image::guess_format(bytes).ok()? {
            CodecFormat::Jpeg => Some(ImageFormat::Jpeg),
            CodecFormat::Png => Some(ImageFormat::Png),
            CodecFormat::Gif => Some(ImageFormat::Gif),
            CodecFormat::WebP => Some(ImageFormat::WebP),
            CodecFormat::Tiff => Some(ImageFormat::Tiff),
            CodecFormat::Bmp => Some(ImageFormat::Bmp),
            _ => None,
        }
    }

    fn codec(self) -> CodecFormat {
        match self {
            ImageFormat::Jpeg => CodecFormat::Jpeg,
            ImageFormat::Png => CodecFormat::Png,
            ImageFormat::Gif => CodecFormat::Gif,
            ImageFormat::WebP => CodecFormat::WebP,
            ImageFormat::Tiff => CodecFormat::Tiff,
            ImageFormat::Bmp => CodecFormat::Bmp,
        }
    }
}

/// Decode an encoded image held in memory
///
/// # Arguments
///
/// * `bytes` - Encoded image (format detected from content)
///
/// # Returns
///
/// RGB pixel grid with fully transparent pixels flattened to black
///
/// # Errors
///
/// Returns `AnalysisError::ImageLoad` if the format is not recognized or
/// decoding fails.
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage> {
    let format = ImageFormat::from_bytes(bytes).ok_or_else(|| AnalysisError::ImageLoad {
        message: "Unrecognized image format".to_string(),
        source: None,
    })?;

    let img = image::load_from_memory_with_format(bytes, format.codec())
        .map_err(|e| AnalysisError::image_load(format!("Failed to decode {format:?} image"), e))?;

    debug!(
        ?format,
        width = img.width(),
        height = img.height(),
        "decoded image"
    );
    Ok(flatten_alpha(img))
}

/// Load an image from disk
///
/// # Errors
///
/// Returns `AnalysisError::ImageLoad` if:
/// - The extension is not a supported format
/// - File cannot be opened
/// - Decoding fails
///
/// # Example
///
/// ```rust,no_run
/// use outfit_colors::image_loader::load_image;
/// use std::path::Path;
///
/// let image = load_image(Path::new("shirt.jpg"))?;
/// println!("Loaded image: {}x{}", image.width(), image.height());
/// # Ok::<(), outfit_colors::AnalysisError>(())
/// ```
pub fn load_image(path: &Path) -> Result<RgbImage> {
    if ImageFormat::from_extension(path).is_none() {
        return Err(AnalysisError::ImageLoad {
            message: format!("Unknown image format for file: {}", path.display()),
            source: None,
        });
    }

    let reader = ImageReader::open(path).map_err(|e| {
        AnalysisError::image_load(format!("Failed to open image file: {}", path.display()), e)
    })?;

    let img = reader.decode().map_err(|e| {
        AnalysisError::image_load(format!("Failed to decode image: {}", path.display()), e)
    })?;

    Ok(flatten_alpha(img))
}

/// Convert to RGB, turning fully transparent pixels black
pub fn flatten_alpha(img: DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }

    let rgba = img.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        if a == 0 {
            Rgb([0, 0, 0])
        } else {
            Rgb([r, g, b])
        }
    })
}

/// Encode an RGB image as PNG bytes
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, CodecFormat::Png)
        .map_err(|e| AnalysisError::image_load("Failed to encode PNG", e))?;
    Ok(buffer.into_inner())
}
