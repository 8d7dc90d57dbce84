use crate::error::{FlyerError, FlyerResult};

/// Flyer canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a validated canvas. The CPU raster backend addresses surfaces
    /// with `u16` coordinates, so both dimensions must fit in `u16`.
    pub fn new(width: u32, height: u32) -> FlyerResult<Self> {
        if width == 0 || height == 0 {
            return Err(FlyerError::validation("canvas width/height must be > 0"));
        }
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(FlyerError::validation(
                "canvas width/height must fit in u16",
            ));
        }
        Ok(Self { width, height })
    }

    /// Byte length of one tightly packed RGBA8 frame at these dimensions.
    pub fn rgba8_len(self) -> usize {
        (self.width as usize) * (self.height as usize) * 4
    }
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Premultiplied byte form used by raster surfaces.
    pub fn premultiplied(self) -> [u8; 4] {
        let a16 = u16::from(self.a);
        let premul = |c: u8| -> u8 { (((u16::from(c) * a16) + 127) / 255) as u8 };
        [premul(self.r), premul(self.g), premul(self.b), self.a]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_rejects_zero_and_oversize() {
        assert!(Canvas::new(0, 630).is_err());
        assert!(Canvas::new(1200, 0).is_err());
        assert!(Canvas::new(70_000, 630).is_err());
        assert!(Canvas::new(1200, 630).is_ok());
    }

    #[test]
    fn rgba8_len_counts_four_bytes_per_pixel() {
        let c = Canvas::new(3, 2).unwrap();
        assert_eq!(c.rgba8_len(), 24);
    }

    #[test]
    fn premultiplied_scales_color_by_alpha() {
        let c = Rgba8::rgba(100, 50, 200, 128);
        assert_eq!(
            c.premultiplied(),
            [
                ((100u16 * 128 + 127) / 255) as u8,
                ((50u16 * 128 + 127) / 255) as u8,
                ((200u16 * 128 + 127) / 255) as u8,
                128
            ]
        );
    }

    #[test]
    fn opaque_premultiply_is_identity() {
        let c = Rgba8::rgb(12, 34, 56);
        assert_eq!(c.premultiplied(), [12, 34, 56, 255]);
    }
}
