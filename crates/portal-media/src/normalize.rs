//! Carousel image normalization.
//!
//! Every image attached to a carousel is stored in one fixed shape:
//! 250x250 pixels, RGB, JPEG at quality 85. Uploads of any decodable
//! format and color mode are funneled through [`normalize_carousel_image`]
//! before the owning record is persisted; the original bytes are
//! discarded and only the normalized payload is ever stored.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage};
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Edge length of a normalized carousel image, in pixels.
pub const CAROUSEL_IMAGE_SIZE: u32 = 250;

/// JPEG quality factor for normalized carousel images.
pub const JPEG_QUALITY: u8 = 85;

/// Normalize uploaded image bytes into the canonical carousel form.
///
/// The input is decoded, flattened to opaque RGB (transparency composited
/// onto a white background), stretched to exactly 250x250 ignoring the
/// original aspect ratio, and re-encoded as JPEG quality 85. Undecodable
/// input yields [`MediaError::Decode`].
pub fn normalize_carousel_image(bytes: &[u8]) -> MediaResult<Vec<u8>> {
    let decoded = image::load_from_memory(bytes).map_err(|e| MediaError::decode(e.to_string()))?;

    let (width, height) = (decoded.width(), decoded.height());
    debug!(width, height, mode = ?decoded.color(), "decoded carousel upload");

    let rgb = flatten_to_rgb(&decoded);
    let resized = imageops::resize(
        &rgb,
        CAROUSEL_IMAGE_SIZE,
        CAROUSEL_IMAGE_SIZE,
        FilterType::Lanczos3,
    );

    let mut buffer = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
    encoder
        .encode_image(&resized)
        .map_err(|e| MediaError::encode(e.to_string()))?;

    debug!(bytes = buffer.len(), "normalized carousel image");
    Ok(buffer)
}

/// Flatten any decoded raster to opaque RGB.
///
/// Images carrying an alpha channel (RGBA, LA, indexed images whose
/// transparency decodes to an alpha mode) are composited onto a solid
/// white canvas using the alpha channel as the blend mask. Everything
/// else converts directly to RGB.
fn flatten_to_rgb(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }

    let rgba = img.to_rgba8();
    let mut flat = RgbImage::new(rgba.width(), rgba.height());
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let out = flat.get_pixel_mut(x, y);
        out.0 = [
            blend_onto_white(r, a),
            blend_onto_white(g, a),
            blend_onto_white(b, a),
        ];
    }
    flat
}

/// Blend a single channel onto a white background by its alpha.
fn blend_onto_white(channel: u8, alpha: u8) -> u8 {
    let c = u32::from(channel);
    let a = u32::from(alpha);
    ((c * a + 255 * (255 - a) + 127) / 255) as u8
}
