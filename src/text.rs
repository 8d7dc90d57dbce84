//! Parley-backed text shaping for the flyer's single-line captions.

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};

use crate::{
    core::Rgba8,
    error::{FlyerError, FlyerResult},
};

/// RGBA8 brush color carried through Parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrushRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl From<Rgba8> for TextBrushRgba8 {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// Stateful helper for building Parley text layouts from raw font bytes.
///
/// Font bytes are registered into the fontique collection once per distinct
/// blob; the resolved family name is cached so the shrink loop of the
/// auto-fit (many layouts per line per render) cannot grow the collection
/// without bound.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_cache: HashMap<u64, String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            family_cache: HashMap::new(),
        }
    }

    fn family_for(&mut self, font_bytes: &[u8]) -> FlyerResult<String> {
        let key = font_blob_key(font_bytes);
        if let Some(name) = self.family_cache.get(&key) {
            return Ok(name.clone());
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            FlyerError::validation("no font families registered from font bytes")
        })?;

        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| FlyerError::validation("registered font family has no name"))?
            .to_string();

        self.family_cache.insert(key, family_name.clone());
        Ok(family_name)
    }

    #[cfg(test)]
    fn cached_family_count(&self) -> usize {
        self.family_cache.len()
    }

    /// Shape and lay out a single line of plain text using the provided font
    /// bytes. Flyer lines never wrap; width fitting happens by shrinking the
    /// font size, not by line breaking.
    pub fn layout_plain(
        &mut self,
        text: &str,
        font_bytes: &[u8],
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> FlyerResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(FlyerError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let family_name = self.family_for(font_bytes)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);

        Ok(layout)
    }

    /// Advance width in pixels of `text` at `size_px`.
    pub fn measure_width(
        &mut self,
        text: &str,
        font_bytes: &[u8],
        size_px: f32,
    ) -> FlyerResult<f32> {
        let layout = self.layout_plain(text, font_bytes, size_px, TextBrushRgba8::default())?;
        Ok(layout.width())
    }
}

fn font_blob_key(bytes: &[u8]) -> u64 {
    let mut h = DefaultHasher::new();
    bytes.len().hash(&mut h);
    bytes.hash(&mut h);
    h.finish()
}
