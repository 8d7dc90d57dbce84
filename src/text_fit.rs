//! Auto-shrinking text fit.

/// Shrink a starting font size in whole-pixel steps until the measured text
/// width fits `max_width`, or the floor `min_px` is reached.
///
/// The size decreases by exactly 1 per iteration and is bounded below by
/// `min_px`, so the loop terminates after at most `initial_px - min_px`
/// measurements. When the text still overflows at the floor, the floor size
/// is returned and the caller paints anyway (no truncation, no ellipsis).
pub fn fit_font_size<M, E>(
    mut measure: M,
    initial_px: f32,
    min_px: f32,
    max_width: f64,
) -> Result<f32, E>
where
    M: FnMut(f32) -> Result<f32, E>,
{
    let mut size = initial_px.max(min_px);
    loop {
        let width = measure(size)?;
        if f64::from(width) <= max_width || size <= min_px {
            return Ok(size);
        }
        size = (size - 1.0).max(min_px);
    }
}
