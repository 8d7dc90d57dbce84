pub mod decode;
pub mod template;

pub use decode::{decode_image, decode_photo};
pub use template::TemplateCache;

use std::sync::Arc;

/// Decoded raster ready for compositing.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    pub width: u32,
    pub height: u32,
    /// Premultiplied RGBA8, row-major, tightly packed.
    pub rgba8_premul: Arc<Vec<u8>>,
}
