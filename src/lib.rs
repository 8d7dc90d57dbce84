#![forbid(unsafe_code)]

pub mod assets;
pub mod core;
pub mod cover;
pub mod error;
pub mod export;
pub mod layout;
pub mod model;
pub mod render;
pub mod render_cpu;
pub mod share;
pub mod text;
pub mod text_fit;

pub use assets::{PreparedImage, TemplateCache, decode_image, decode_photo};
pub use core::{Canvas, Rgba8};
pub use cover::{FitRect, cover_rect};
pub use error::{FlyerError, FlyerResult};
pub use export::{DOWNLOAD_FILE_NAME, JPEG_QUALITY, encode_jpeg, encode_png, save_flyer};
pub use layout::{FlyerLayout, LayoutVariant, LineSpec, PortraitGeometry, greeting_line};
pub use model::RenderInput;
pub use render::{FontSet, FrameRGBA, PortraitGate, PortraitTicket};
pub use render_cpu::CpuRenderer;
pub use share::{
    NativeShare, NoNativeShare, ShareOutcome, ShareRequest, share_or_fallback, whatsapp_share_url,
};
pub use text_fit::fit_font_size;
