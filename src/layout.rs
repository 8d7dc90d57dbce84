//! Fixed flyer geometry and typography, one table per layout variant.

use crate::{
    core::{Canvas, Rgba8},
    error::{FlyerError, FlyerResult},
};

/// Rendered in place of the name while the input is empty or blank.
pub const GREETING_PLACEHOLDER: &str = "________";

/// Fixed second line under the greeting.
pub const SECOND_LINE: &str = "for House of Rep 2027";

/// Fixed slogan line.
pub const SLOGAN_LINE: &str = "Ifo Lokan, Ifo lo ma se";

/// Shrink floor for auto-fitted text.
pub const MIN_FONT_SIZE_PX: f32 = 12.0;

/// Build the greeting line, substituting the underscore placeholder when the
/// name is empty or whitespace-only.
pub fn greeting_line(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        format!("I, {GREETING_PLACEHOLDER}, support ADJ")
    } else {
        format!("I, {name}, support ADJ")
    }
}

/// The two flyer layouts shipped with the template set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutVariant {
    /// 1200x630 social-card layout, portrait on the left.
    Landscape,
    /// 1080x1080 square layout, portrait centered in the top third.
    Square,
}

impl LayoutVariant {
    pub fn layout(self) -> FlyerLayout {
        match self {
            LayoutVariant::Landscape => FlyerLayout {
                canvas: Canvas {
                    width: 1200,
                    height: 630,
                },
                portrait: PortraitGeometry {
                    center_x: 158.0,
                    center_y: 315.0,
                    diameter: 220.0,
                    ring_width: 6.0,
                },
                text_x: 300.0,
                text_right_pad: 32.0,
                lines: [
                    LineSpec {
                        y: 180.0,
                        size_px: 34.0,
                        min_size_px: MIN_FONT_SIZE_PX,
                        color: Rgba8::rgb(0x0f, 0x17, 0x2a),
                    },
                    LineSpec {
                        y: 228.0,
                        size_px: 28.0,
                        min_size_px: MIN_FONT_SIZE_PX,
                        color: Rgba8::rgb(0x11, 0x18, 0x27),
                    },
                    LineSpec {
                        y: 280.0,
                        size_px: 26.0,
                        min_size_px: MIN_FONT_SIZE_PX,
                        color: Rgba8::rgb(0xb9, 0x1c, 0x1c),
                    },
                ],
            },
            LayoutVariant::Square => FlyerLayout {
                canvas: Canvas {
                    width: 1080,
                    height: 1080,
                },
                portrait: PortraitGeometry {
                    center_x: 540.0,
                    center_y: 330.0,
                    diameter: 320.0,
                    ring_width: 8.0,
                },
                text_x: 120.0,
                text_right_pad: 48.0,
                lines: [
                    LineSpec {
                        y: 760.0,
                        size_px: 48.0,
                        min_size_px: MIN_FONT_SIZE_PX,
                        color: Rgba8::rgb(0x0f, 0x17, 0x2a),
                    },
                    LineSpec {
                        y: 824.0,
                        size_px: 40.0,
                        min_size_px: MIN_FONT_SIZE_PX,
                        color: Rgba8::rgb(0x11, 0x18, 0x27),
                    },
                    LineSpec {
                        y: 900.0,
                        size_px: 36.0,
                        min_size_px: MIN_FONT_SIZE_PX,
                        color: Rgba8::rgb(0xb9, 0x1c, 0x1c),
                    },
                ],
            },
        }
    }
}

/// Full geometry + typography table for one flyer variant.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct FlyerLayout {
    pub canvas: Canvas,
    pub portrait: PortraitGeometry,
    /// Left edge of the text block.
    pub text_x: f64,
    /// Gap kept free between the text block and the right canvas edge.
    pub text_right_pad: f64,
    /// Greeting, second line, slogan.
    pub lines: [LineSpec; 3],
}

/// Position and size of the circular portrait.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct PortraitGeometry {
    pub center_x: f64,
    pub center_y: f64,
    pub diameter: f64,
    pub ring_width: f64,
}

/// Baseline position and type style for one text line.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct LineSpec {
    /// Baseline y coordinate.
    pub y: f64,
    /// Starting font size before auto-fit shrinking.
    pub size_px: f32,
    /// Shrink floor; text is painted even if it still overflows here.
    pub min_size_px: f32,
    pub color: Rgba8,
}

impl FlyerLayout {
    /// Widest advance a text line may occupy before auto-fit shrinks it.
    pub fn max_text_width(&self) -> f64 {
        f64::from(self.canvas.width) - self.text_x - self.text_right_pad
    }

    pub fn validate(&self) -> FlyerResult<()> {
        Canvas::new(self.canvas.width, self.canvas.height)?;

        let p = &self.portrait;
        if !(p.diameter > 0.0) || !p.diameter.is_finite() {
            return Err(FlyerError::validation("portrait diameter must be > 0"));
        }
        if !(p.ring_width >= 0.0) || !p.ring_width.is_finite() {
            return Err(FlyerError::validation("portrait ring_width must be >= 0"));
        }

        if self.max_text_width() <= 0.0 {
            return Err(FlyerError::validation(
                "text block must leave positive width on the canvas",
            ));
        }

        for spec in &self.lines {
            if !spec.size_px.is_finite() || spec.size_px <= 0.0 {
                return Err(FlyerError::validation("line size_px must be finite and > 0"));
            }
            if !spec.min_size_px.is_finite()
                || spec.min_size_px <= 0.0
                || spec.min_size_px > spec.size_px
            {
                return Err(FlyerError::validation(
                    "line min_size_px must be in (0, size_px]",
                ));
            }
        }
        Ok(())
    }
}
