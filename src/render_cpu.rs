//! CPU flyer renderer on top of `vello_cpu`.
//!
//! One `render` call repaints every pixel from scratch: gradient base,
//! template cover draw, circular portrait, three auto-fitted text lines.
//! Identical inputs produce identical frames; nothing is carried across
//! calls except reusable caches (render context, paints).

use std::sync::Arc;

use vello_cpu::kurbo::{Affine, Circle, Rect, Shape};

use crate::{
    assets::{PreparedImage, TemplateCache, decode_photo},
    core::Rgba8,
    cover::cover_rect,
    error::{FlyerError, FlyerResult},
    layout::{self, FlyerLayout, LineSpec, PortraitGeometry},
    model::RenderInput,
    render::{FontSet, FrameRGBA, PortraitGate, PortraitTicket},
    text::{TextBrushRgba8, TextLayoutEngine},
    text_fit::fit_font_size,
};

/// Gradient painted under the template (orange to white, top-left to
/// bottom-right), visible until the template cache is installed.
const BASE_GRADIENT_START: Rgba8 = Rgba8::rgb(0xf9, 0x73, 0x16);
const BASE_GRADIENT_END: Rgba8 = Rgba8::rgb(0xff, 0xff, 0xff);

/// Near-opaque white disc behind the portrait photo.
const RING_FILL: Rgba8 = Rgba8::rgba(255, 255, 255, 242);

#[derive(Clone)]
struct ImagePaint {
    paint: vello_cpu::Image,
    w: u32,
    h: u32,
}

/// CPU renderer with reusable context and paint caches.
pub struct CpuRenderer {
    ctx: Option<vello_cpu::RenderContext>,
    text_engine: TextLayoutEngine,
    // keyed by (buffer identity, w, h); the template buffer is written once
    template_paint: Option<(usize, u32, u32, ImagePaint)>,
    gradient_paint: Option<(u32, u32, vello_cpu::Image)>,
}

impl Default for CpuRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuRenderer {
    pub fn new() -> Self {
        Self {
            ctx: None,
            text_engine: TextLayoutEngine::new(),
            template_paint: None,
            gradient_paint: None,
        }
    }

    /// Render one flyer frame from scratch.
    ///
    /// Degraded paths never fail the whole render: an undecodable photo
    /// drops the portrait, an unshapeable font drops that text line, and a
    /// missing template leaves the gradient base visible.
    #[tracing::instrument(skip_all, fields(w = layout.canvas.width, h = layout.canvas.height))]
    pub fn render(
        &mut self,
        layout: &FlyerLayout,
        input: &RenderInput,
        template: &TemplateCache,
        fonts: &FontSet,
    ) -> FlyerResult<FrameRGBA> {
        layout.validate()?;
        let (w16, h16) = canvas_u16(layout)?;
        let w = layout.canvas.width;
        let h = layout.canvas.height;

        let photo = match input.photo.as_deref().filter(|b| !b.is_empty()) {
            None => None,
            Some(bytes) => match decode_photo(bytes) {
                Ok(img) => Some(img),
                Err(err) => {
                    tracing::warn!(%err, "photo decode failed; rendering without portrait");
                    None
                }
            },
        };

        let template_paint = match template.get() {
            Some(img) => Some(self.template_paint_for(img)?),
            None => None,
        };
        let photo_paint = match photo.as_ref() {
            Some(img) => Some(image_paint_for(img)?),
            None => None,
        };
        let gradient = self.gradient_paint_for(w, h)?;

        let lines = [
            layout::greeting_line(&input.name),
            layout::SECOND_LINE.to_string(),
            layout::SLOGAN_LINE.to_string(),
        ];

        self.with_ctx_mut(w16, h16, |this, ctx| {
            ctx.set_transform(Affine::IDENTITY);
            ctx.set_paint(gradient.clone());
            ctx.fill_rect(&Rect::new(0.0, 0.0, f64::from(w), f64::from(h)));

            if let Some(p) = template_paint.as_ref() {
                draw_cover(ctx, p, 0.0, 0.0, f64::from(w), f64::from(h));
            }

            if let Some(p) = photo_paint.as_ref() {
                draw_portrait(ctx, p, &layout.portrait);
            }

            let max_width = layout.max_text_width();
            for (i, (text, spec)) in lines.iter().zip(layout.lines.iter()).enumerate() {
                let font_bytes = fonts.line_font(i);
                if let Err(err) =
                    this.draw_text_line(ctx, text, layout.text_x, spec, font_bytes, max_width)
                {
                    tracing::warn!(%err, line = i, "skipping unshapeable text line");
                }
            }

            ctx.flush();
            let mut pixmap = vello_cpu::Pixmap::new(w16, h16);
            ctx.render_to_pixmap(&mut pixmap);

            Ok(FrameRGBA {
                width: w,
                height: h,
                data: pixmap.data_as_u8_slice().to_vec(),
                premultiplied: true,
            })
        })
    }

    /// Phase 2 of a deferred portrait draw: composite the ring and the
    /// circularly clipped photo onto an already rendered frame.
    ///
    /// Embedders that run the slow photo decode off the render path call
    /// `gate.begin()` when scheduling the decode and pass the ticket here on
    /// completion; a stale ticket (a newer draw was begun since) is
    /// discarded and the frame is left untouched.
    pub fn complete_portrait(
        &mut self,
        gate: &PortraitGate,
        ticket: PortraitTicket,
        frame: &mut FrameRGBA,
        layout: &FlyerLayout,
        photo: &PreparedImage,
    ) -> FlyerResult<bool> {
        if !gate.admits(ticket) {
            tracing::debug!("discarding stale portrait continuation");
            return Ok(false);
        }
        if !frame.premultiplied {
            return Err(FlyerError::render(
                "portrait completion expects a premultiplied frame",
            ));
        }
        layout.validate()?;
        let (w16, h16) = canvas_u16(layout)?;
        if frame.width != layout.canvas.width || frame.height != layout.canvas.height {
            return Err(FlyerError::render("frame dimensions do not match layout"));
        }

        let base = image_paint_for(&PreparedImage {
            width: frame.width,
            height: frame.height,
            rgba8_premul: Arc::new(frame.data.clone()),
        })?;
        let photo_paint = image_paint_for(photo)?;

        let repainted = self.with_ctx_mut(w16, h16, |_this, ctx| {
            ctx.set_transform(Affine::IDENTITY);
            ctx.set_paint(base.paint.clone());
            ctx.fill_rect(&Rect::new(
                0.0,
                0.0,
                f64::from(frame.width),
                f64::from(frame.height),
            ));

            draw_portrait(ctx, &photo_paint, &layout.portrait);

            ctx.flush();
            let mut pixmap = vello_cpu::Pixmap::new(w16, h16);
            ctx.render_to_pixmap(&mut pixmap);
            Ok(pixmap.data_as_u8_slice().to_vec())
        })?;

        frame.data = repainted;
        Ok(true)
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut Self, &mut vello_cpu::RenderContext) -> FlyerResult<R>,
    ) -> FlyerResult<R> {
        let mut ctx = match self.ctx.take() {
            None => vello_cpu::RenderContext::new(width, height),
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            Some(_) => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(self, &mut ctx)?;
        self.ctx = Some(ctx);
        Ok(out)
    }

    fn template_paint_for(&mut self, img: &PreparedImage) -> FlyerResult<ImagePaint> {
        let key = Arc::as_ptr(&img.rgba8_premul) as usize;
        if let Some((k, w, h, p)) = self.template_paint.as_ref()
            && *k == key
            && *w == img.width
            && *h == img.height
        {
            return Ok(p.clone());
        }
        let p = image_paint_for(img)?;
        self.template_paint = Some((key, img.width, img.height, p.clone()));
        Ok(p)
    }

    fn gradient_paint_for(&mut self, w: u32, h: u32) -> FlyerResult<vello_cpu::Image> {
        if let Some((cw, ch, img)) = self.gradient_paint.as_ref()
            && *cw == w
            && *ch == h
        {
            return Ok(img.clone());
        }

        let start = BASE_GRADIENT_START.premultiplied();
        let end = BASE_GRADIENT_END.premultiplied();
        let mut bytes = vec![0u8; (w as usize).saturating_mul(h as usize).saturating_mul(4)];
        // linear gradient along the corner-to-corner axis (0,0)..(w,h):
        // each pixel is projected onto that axis, t = (x*w + y*h)/(w^2 + h^2)
        let wf = f64::from(w);
        let hf = f64::from(h);
        let denom = wf * wf + hf * hf;
        for y in 0..h {
            for x in 0..w {
                let t = if denom <= 0.0 {
                    0.0
                } else {
                    ((f64::from(x) * wf + f64::from(y) * hf) / denom) as f32
                };
                let lerp = |a: u8, b: u8| -> u8 {
                    let af = a as f32;
                    let bf = b as f32;
                    (af + (bf - af) * t).round().clamp(0.0, 255.0) as u8
                };
                let idx = ((y as usize) * (w as usize) + (x as usize)) * 4;
                bytes[idx] = lerp(start[0], end[0]);
                bytes[idx + 1] = lerp(start[1], end[1]);
                bytes[idx + 2] = lerp(start[2], end[2]);
                bytes[idx + 3] = lerp(start[3], end[3]);
            }
        }

        let img = rgba_premul_to_image(&bytes, w, h)?;
        self.gradient_paint = Some((w, h, img.clone()));
        Ok(img)
    }

    fn draw_text_line(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &str,
        x: f64,
        spec: &LineSpec,
        font_bytes: &[u8],
        max_width: f64,
    ) -> FlyerResult<()> {
        let size = fit_font_size(
            |s| self.text_engine.measure_width(text, font_bytes, s),
            spec.size_px,
            spec.min_size_px,
            max_width,
        )?;

        let brush = TextBrushRgba8::from(spec.color);
        let layout = self
            .text_engine
            .layout_plain(text, font_bytes, size, brush)?;
        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(font_bytes.to_vec()),
            0,
        );

        // `spec.y` is a baseline coordinate (2D-canvas fillText convention);
        // the layout's origin is its top-left corner.
        let baseline = layout
            .lines()
            .next()
            .map(|l| f64::from(l.metrics().baseline))
            .unwrap_or(0.0);
        ctx.set_transform(Affine::translate((x, spec.y - baseline)));

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(())
    }
}

/// Draw `paint` into the target rectangle with cover semantics. Overflow is
/// cropped by whatever clip layer the caller has pushed; a zero-sized source
/// paints nothing.
fn draw_cover(ctx: &mut vello_cpu::RenderContext, paint: &ImagePaint, x: f64, y: f64, w: f64, h: f64) {
    if paint.w == 0 || paint.h == 0 {
        return;
    }
    let iw = f64::from(paint.w);
    let ih = f64::from(paint.h);
    let fit = cover_rect(x, y, w, h, iw, ih);
    ctx.set_transform(
        Affine::translate((fit.x, fit.y)) * Affine::scale_non_uniform(fit.w / iw, fit.h / ih),
    );
    ctx.set_paint(paint.paint.clone());
    ctx.fill_rect(&Rect::new(0.0, 0.0, iw, ih));
}

/// Ring disc plus circularly clipped cover draw of the photo.
///
/// The clip layer is pushed immediately before the photo draw and popped
/// right after, so it can never leak into later background or text passes.
fn draw_portrait(ctx: &mut vello_cpu::RenderContext, paint: &ImagePaint, geom: &PortraitGeometry) {
    let radius = geom.diameter / 2.0;
    let center = (geom.center_x, geom.center_y);

    let ring = RING_FILL;
    ctx.set_transform(Affine::IDENTITY);
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
        ring.r, ring.g, ring.b, ring.a,
    ));
    ctx.fill_path(&Circle::new(center, radius + geom.ring_width).to_path(0.1));

    ctx.set_transform(Affine::IDENTITY);
    ctx.push_clip_layer(&Circle::new(center, radius).to_path(0.1));
    draw_cover(
        ctx,
        paint,
        geom.center_x - radius,
        geom.center_y - radius,
        geom.diameter,
        geom.diameter,
    );
    ctx.pop_layer();
}

fn canvas_u16(layout: &FlyerLayout) -> FlyerResult<(u16, u16)> {
    let w: u16 = layout
        .canvas
        .width
        .try_into()
        .map_err(|_| FlyerError::validation("canvas width exceeds u16"))?;
    let h: u16 = layout
        .canvas
        .height
        .try_into()
        .map_err(|_| FlyerError::validation("canvas height exceeds u16"))?;
    Ok((w, h))
}

fn image_paint_for(img: &PreparedImage) -> FlyerResult<ImagePaint> {
    let pixmap = pixmap_from_premul_bytes(&img.rgba8_premul, img.width, img.height)?;
    Ok(ImagePaint {
        paint: vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        },
        w: img.width,
        h: img.height,
    })
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> FlyerResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| FlyerError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| FlyerError::render("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(FlyerError::render("pixmap byte len mismatch"));
    }
    // Pixmap stores PremulRgba8; our bytes are already premultiplied.
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    for px in bytes.chunks_exact(4) {
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

fn rgba_premul_to_image(
    bytes_premul: &[u8],
    width: u32,
    height: u32,
) -> FlyerResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(bytes_premul, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutVariant;

    #[test]
    fn canvas_u16_accepts_shipped_variants() {
        assert!(canvas_u16(&LayoutVariant::Landscape.layout()).is_ok());
        assert!(canvas_u16(&LayoutVariant::Square.layout()).is_ok());
    }

    #[test]
    fn image_paint_rejects_byte_len_mismatch() {
        let img = PreparedImage {
            width: 2,
            height: 2,
            rgba8_premul: Arc::new(vec![0u8; 4]),
        };
        assert!(image_paint_for(&img).is_err());
    }

    #[test]
    fn gradient_paint_is_cached_per_size() {
        let mut r = CpuRenderer::new();
        r.gradient_paint_for(16, 16).unwrap();
        assert!(r.gradient_paint.is_some());
        let (w, h, _) = r.gradient_paint.as_ref().unwrap();
        assert_eq!((*w, *h), (16, 16));

        r.gradient_paint_for(8, 8).unwrap();
        let (w, h, _) = r.gradient_paint.as_ref().unwrap();
        assert_eq!((*w, *h), (8, 8));
    }

    #[test]
    fn gradient_projects_onto_the_corner_to_corner_axis() {
        let mut r = CpuRenderer::new();
        r.gradient_paint_for(100, 50).unwrap();
        let (_, _, img) = r.gradient_paint.as_ref().unwrap();
        let vello_cpu::ImageSource::Pixmap(pm) = &img.image else {
            panic!("gradient paint should be a pixmap");
        };
        let data = pm.data_as_u8_slice();
        let px = |x: usize, y: usize| -> [u8; 4] {
            let i = (y * 100 + x) * 4;
            data[i..i + 4].try_into().unwrap()
        };

        assert_eq!(px(0, 0), BASE_GRADIENT_START.premultiplied());

        // equal x+y but different projections onto the (w, h) axis; a plain
        // 45-degree ramp would color these identically
        assert_ne!(px(99, 0), px(50, 49));

        // blue channel at (99, 0): t = 99*100 / (100^2 + 50^2)
        let t = 9900.0 / 12500.0;
        let expected = (22.0_f64 + (255.0 - 22.0) * t).round() as i32;
        assert!((i32::from(px(99, 0)[2]) - expected).abs() <= 1);
    }
}
