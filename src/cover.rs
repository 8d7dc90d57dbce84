//! Cover-fit scaling math (CSS `background-size: cover` semantics).

/// Placement of a scaled source image over a target rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Scale a source of intrinsic size `(iw, ih)` uniformly so it covers the
/// target rectangle in both dimensions, centered; the caller's clip crops
/// the overflow. A degenerate intrinsic size (either dimension not positive)
/// silently falls back to a plain stretch fit of the target rectangle.
pub fn cover_rect(x: f64, y: f64, w: f64, h: f64, iw: f64, ih: f64) -> FitRect {
    if !(iw > 0.0) || !(ih > 0.0) {
        return FitRect { x, y, w, h };
    }
    let scale = (w / iw).max(h / ih);
    let nw = iw * scale;
    let nh = ih * scale;
    FitRect {
        x: x + (w - nw) / 2.0,
        y: y + (h - nh) / 2.0,
        w: nw,
        h: nh,
    }
}
