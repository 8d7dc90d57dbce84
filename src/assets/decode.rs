use std::sync::Arc;

use anyhow::Context;

use crate::{FlyerError, FlyerResult, assets::PreparedImage};

/// Decode an image via format sniffing, producing premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> FlyerResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(prepared_from(dyn_img))
}

/// Decode a user-supplied photo.
///
/// Fast path is the sniffing decode; when that rejects the bytes (truncated
/// magic, unusual container ordering) a slower explicit per-format sweep is
/// tried before giving up. Callers treat total failure as non-fatal and
/// render without the portrait.
pub fn decode_photo(bytes: &[u8]) -> FlyerResult<PreparedImage> {
    match image::load_from_memory(bytes) {
        Ok(img) => Ok(prepared_from(img)),
        Err(fast_err) => decode_photo_fallback(bytes, &fast_err),
    }
}

fn decode_photo_fallback(
    bytes: &[u8],
    fast_err: &image::ImageError,
) -> FlyerResult<PreparedImage> {
    const FORMATS: &[image::ImageFormat] = &[
        image::ImageFormat::Jpeg,
        image::ImageFormat::Png,
        image::ImageFormat::WebP,
        image::ImageFormat::Gif,
        image::ImageFormat::Bmp,
        image::ImageFormat::Tiff,
    ];

    for &format in FORMATS {
        if let Ok(img) = image::load_from_memory_with_format(bytes, format) {
            tracing::debug!(?format, "photo decoded via explicit-format fallback");
            return Ok(prepared_from(img));
        }
    }

    Err(FlyerError::decode(format!(
        "photo bytes match no supported format: {fast_err}"
    )))
}

fn prepared_from(dyn_img: image::DynamicImage) -> PreparedImage {
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    }
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}
