//! Frame export: JPEG/PNG encoding and the download artifact.

use std::borrow::Cow;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::{
    error::{FlyerError, FlyerResult},
    render::FrameRGBA,
};

/// JPEG encode quality, matching the template's 0.92 canvas export.
pub const JPEG_QUALITY: u8 = 92;

/// Conventional name of the downloaded artifact.
pub const DOWNLOAD_FILE_NAME: &str = "flyer.jpg";

/// Encode a frame as JPEG at [`JPEG_QUALITY`], compositing over white since
/// JPEG carries no alpha.
pub fn encode_jpeg(frame: &FrameRGBA) -> FlyerResult<Vec<u8>> {
    let rgb = premul_over_white_rgb8(frame)?;
    let mut out = Vec::new();
    let mut cursor = Cursor::new(&mut out);
    let enc = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
    image::ImageEncoder::write_image(
        enc,
        &rgb,
        frame.width,
        frame.height,
        image::ExtendedColorType::Rgb8,
    )
    .context("encode jpeg")?;
    Ok(out)
}

/// Encode a frame as lossless PNG with straight alpha.
pub fn encode_png(frame: &FrameRGBA) -> FlyerResult<Vec<u8>> {
    let rgba = unpremultiplied_rgba8(frame)?;
    let mut out = Vec::new();
    let mut cursor = Cursor::new(&mut out);
    let enc = image::codecs::png::PngEncoder::new(&mut cursor);
    image::ImageEncoder::write_image(
        enc,
        &rgba,
        frame.width,
        frame.height,
        image::ExtendedColorType::Rgba8,
    )
    .context("encode png")?;
    Ok(out)
}

/// Write the JPEG artifact as `<dir>/flyer.jpg`, creating `dir` if needed.
pub fn save_flyer(frame: &FrameRGBA, dir: &Path) -> FlyerResult<PathBuf> {
    let bytes = encode_jpeg(frame)?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create output dir '{}'", dir.display()))?;
    let path = dir.join(DOWNLOAD_FILE_NAME);
    std::fs::write(&path, &bytes).with_context(|| format!("write '{}'", path.display()))?;
    Ok(path)
}

fn checked_premul_bytes(frame: &FrameRGBA) -> FlyerResult<Cow<'_, [u8]>> {
    let expected = (frame.width as usize)
        .saturating_mul(frame.height as usize)
        .saturating_mul(4);
    if frame.data.len() != expected {
        return Err(FlyerError::render("frame byte len mismatch"));
    }
    if frame.premultiplied {
        return Ok(Cow::Borrowed(&frame.data));
    }
    let mut bytes = frame.data.clone();
    for px in bytes.chunks_exact_mut(4) {
        let a = px[3] as u16;
        for c in px.iter_mut().take(3) {
            *c = ((u16::from(*c) * a + 127) / 255) as u8;
        }
    }
    Ok(Cow::Owned(bytes))
}

fn premul_over_white_rgb8(frame: &FrameRGBA) -> FlyerResult<Vec<u8>> {
    let premul = checked_premul_bytes(frame)?;
    let mut rgb = Vec::with_capacity(premul.len() / 4 * 3);
    for px in premul.chunks_exact(4) {
        let inv = 255 - px[3];
        rgb.push(px[0].saturating_add(inv));
        rgb.push(px[1].saturating_add(inv));
        rgb.push(px[2].saturating_add(inv));
    }
    Ok(rgb)
}

fn unpremultiplied_rgba8(frame: &FrameRGBA) -> FlyerResult<Vec<u8>> {
    let premul = checked_premul_bytes(frame)?;
    let mut rgba = premul.into_owned();
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        for c in px.iter_mut().take(3) {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
    Ok(rgba)
}
