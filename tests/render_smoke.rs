use std::io::Cursor;

use flyergen::{
    CpuRenderer, FontSet, FrameRGBA, LayoutVariant, PortraitGate, RenderInput, TemplateCache,
    decode_photo,
};

fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn digest_u64(bytes: &[u8]) -> u64 {
    let mut state = 0x9E37_79B9_7F4A_7C15u64;
    for chunk in bytes.chunks(8) {
        let mut v = 0u64;
        for (i, &b) in chunk.iter().enumerate() {
            v |= (b as u64) << (i * 8);
        }
        state = mix64(state ^ v);
    }
    state
}

fn solid_png(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn px(frame: &FrameRGBA, x: u32, y: u32) -> [u8; 4] {
    let idx = ((y * frame.width + x) * 4) as usize;
    frame.data[idx..idx + 4].try_into().unwrap()
}

// Text lines are skipped (with a warning) when no real font is available;
// everything else in the pipeline still renders deterministically.
fn no_fonts() -> FontSet {
    FontSet::single(Vec::new())
}

fn fixture_fonts() -> FontSet {
    let bytes = std::fs::read(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/data/fonts/DejaVuSans.ttf"
    ))
    .unwrap();
    FontSet::single(bytes)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[test]
fn render_is_deterministic_and_nonempty() {
    let layout = LayoutVariant::Landscape.layout();
    let template = TemplateCache::new();
    let input = RenderInput::default();
    let mut renderer = CpuRenderer::new();

    let a = renderer.render(&layout, &input, &template, &no_fonts()).unwrap();
    let b = renderer.render(&layout, &input, &template, &no_fonts()).unwrap();

    assert_eq!(a.width, 1200);
    assert_eq!(a.height, 630);
    assert!(a.premultiplied);
    assert_eq!(digest_u64(&a.data), digest_u64(&b.data));
    assert!(a.data.iter().any(|&x| x != 0));
}

#[test]
fn render_with_photo_and_template_is_idempotent() {
    let layout = LayoutVariant::Square.layout();
    let template = TemplateCache::new();
    template.install(&solid_png(32, 16, [0, 128, 0, 255])).unwrap();
    let input = RenderInput {
        name: "Ada".to_string(),
        photo: Some(solid_png(4, 4, [0, 0, 255, 255])),
    };
    let mut renderer = CpuRenderer::new();

    let a = renderer.render(&layout, &input, &template, &no_fonts()).unwrap();
    let b = renderer.render(&layout, &input, &template, &no_fonts()).unwrap();
    assert_eq!(digest_u64(&a.data), digest_u64(&b.data));
}

#[test]
fn template_not_ready_shows_the_gradient() {
    let layout = LayoutVariant::Landscape.layout();
    let template = TemplateCache::new();
    let mut renderer = CpuRenderer::new();

    let frame = renderer
        .render(&layout, &RenderInput::default(), &template, &no_fonts())
        .unwrap();

    // top-left corner of the orange-to-white gradient
    let [r, g, b, a] = px(&frame, 0, 0);
    assert_eq!(a, 255);
    assert!(r > 240 && g > 100 && g < 140 && b < 40, "got {:?}", [r, g, b]);
}

#[test]
fn installed_template_covers_the_gradient() {
    let layout = LayoutVariant::Landscape.layout();
    let template = TemplateCache::new();
    template.install(&solid_png(32, 16, [0, 200, 0, 255])).unwrap();
    let mut renderer = CpuRenderer::new();

    let frame = renderer
        .render(&layout, &RenderInput::default(), &template, &no_fonts())
        .unwrap();

    let [r, g, b, _] = px(&frame, 600, 315);
    assert!(g > 180 && r < 40 && b < 40, "got {:?}", [r, g, b]);
}

#[test]
fn photo_renders_ring_and_clipped_portrait() {
    let layout = LayoutVariant::Landscape.layout();
    let template = TemplateCache::new();
    let mut renderer = CpuRenderer::new();

    let without = renderer
        .render(&layout, &RenderInput::default(), &template, &no_fonts())
        .unwrap();
    let with = renderer
        .render(
            &layout,
            &RenderInput {
                name: String::new(),
                photo: Some(solid_png(4, 4, [0, 0, 255, 255])),
            },
            &template,
            &no_fonts(),
        )
        .unwrap();

    assert_ne!(digest_u64(&without.data), digest_u64(&with.data));

    let cx = layout.portrait.center_x as u32;
    let cy = layout.portrait.center_y as u32;

    // portrait center shows the blue photo only when a photo was supplied
    let [r, _, b, _] = px(&with, cx, cy);
    assert!(b > 200 && r < 60);
    let [_, _, b, _] = px(&without, cx, cy);
    assert!(b < 200);

    // ring sits just outside the photo radius
    let ring_x = (layout.portrait.center_x + layout.portrait.diameter / 2.0 + 3.0) as u32;
    let [r, g, b, _] = px(&with, ring_x, cy);
    assert!(r > 230 && g > 230 && b > 230, "got {:?}", [r, g, b]);
    let [_, _, b, _] = px(&without, ring_x, cy);
    assert!(b < 200, "no ring expected without a photo");
}

#[test]
fn undecodable_photo_degrades_to_no_portrait() {
    init_tracing();
    let layout = LayoutVariant::Landscape.layout();
    let template = TemplateCache::new();
    let mut renderer = CpuRenderer::new();

    let clean = renderer
        .render(&layout, &RenderInput::default(), &template, &no_fonts())
        .unwrap();
    let degraded = renderer
        .render(
            &layout,
            &RenderInput {
                name: String::new(),
                photo: Some(vec![0xDE, 0xAD, 0xBE, 0xEF]),
            },
            &template,
            &no_fonts(),
        )
        .unwrap();

    assert_eq!(digest_u64(&clean.data), digest_u64(&degraded.data));
}

#[test]
fn stale_portrait_continuation_is_discarded() {
    let layout = LayoutVariant::Landscape.layout();
    let template = TemplateCache::new();
    let mut renderer = CpuRenderer::new();
    let mut gate = PortraitGate::new();

    let mut frame = renderer
        .render(&layout, &RenderInput::default(), &template, &no_fonts())
        .unwrap();
    let before = digest_u64(&frame.data);

    let photo = decode_photo(&solid_png(4, 4, [0, 0, 255, 255])).unwrap();

    let stale = gate.begin();
    let fresh = gate.begin();

    let applied = renderer
        .complete_portrait(&gate, stale, &mut frame, &layout, &photo)
        .unwrap();
    assert!(!applied);
    assert_eq!(digest_u64(&frame.data), before);

    let applied = renderer
        .complete_portrait(&gate, fresh, &mut frame, &layout, &photo)
        .unwrap();
    assert!(applied);
    assert_ne!(digest_u64(&frame.data), before);

    let cx = layout.portrait.center_x as u32;
    let cy = layout.portrait.center_y as u32;
    let [r, _, b, _] = px(&frame, cx, cy);
    assert!(b > 200 && r < 60);
}

#[test]
fn greeting_renders_glyphs_with_a_real_font() {
    init_tracing();
    let layout = LayoutVariant::Landscape.layout();
    let template = TemplateCache::new();
    let input = RenderInput {
        name: "Ada".to_string(),
        photo: None,
    };
    let mut renderer = CpuRenderer::new();

    let blank = renderer.render(&layout, &input, &template, &no_fonts()).unwrap();
    let titled = renderer
        .render(&layout, &input, &template, &fixture_fonts())
        .unwrap();
    assert_ne!(digest_u64(&blank.data), digest_u64(&titled.data));

    // the title line paints near-black glyphs over the light gradient in the
    // band above its baseline; the font-less render leaves it untouched
    let title = &layout.lines[0];
    let x0 = layout.text_x as u32;
    let y1 = title.y as u32;
    let y0 = (title.y - f64::from(title.size_px)) as u32;
    let dark = |frame: &FrameRGBA| {
        (y0..=y1)
            .flat_map(|y| (x0..x0 + 500).map(move |x| (x, y)))
            .filter(|&(x, y)| {
                let [r, g, b, _] = px(frame, x, y);
                r < 90 && g < 90 && b < 110
            })
            .count()
    };
    assert!(dark(&titled) > 20, "expected dark glyph pixels on the title line");
    assert_eq!(dark(&blank), 0);
}

#[test]
fn overlong_greeting_shrinks_to_the_column_or_the_floor() {
    use flyergen::text::TextLayoutEngine;

    let layout = LayoutVariant::Landscape.layout();
    let title = &layout.lines[0];
    let max_width = layout.max_text_width();
    let font = std::fs::read(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/data/fonts/DejaVuSans.ttf"
    ))
    .unwrap();
    let mut engine = TextLayoutEngine::new();

    let text = flyergen::greeting_line(&"Ndubuisi ".repeat(12));
    let fitted = flyergen::fit_font_size(
        |size| engine.measure_width(&text, &font, size),
        title.size_px,
        title.min_size_px,
        max_width,
    )
    .unwrap();

    assert!(fitted >= title.min_size_px);
    assert!(fitted <= title.size_px);
    let width = engine.measure_width(&text, &font, fitted).unwrap();
    assert!(
        f64::from(width) <= max_width || fitted == title.min_size_px,
        "fitted {fitted}px still measures {width}px against {max_width}px"
    );

    // a short name fits at the declared size without shrinking
    let fitted = flyergen::fit_font_size(
        |size| engine.measure_width(&flyergen::greeting_line("Ada"), &font, size),
        title.size_px,
        title.min_size_px,
        max_width,
    )
    .unwrap();
    assert_eq!(fitted, title.size_px);
}

#[test]
fn portrait_completion_rejects_mismatched_frames() {
    let layout = LayoutVariant::Landscape.layout();
    let mut renderer = CpuRenderer::new();
    let mut gate = PortraitGate::new();
    let photo = decode_photo(&solid_png(4, 4, [255, 0, 0, 255])).unwrap();

    let mut frame = FrameRGBA {
        width: 10,
        height: 10,
        data: vec![0u8; 400],
        premultiplied: true,
    };
    let ticket = gate.begin();
    assert!(
        renderer
            .complete_portrait(&gate, ticket, &mut frame, &layout, &photo)
            .is_err()
    );
}
