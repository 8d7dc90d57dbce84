use std::sync::OnceLock;

use crate::{
    FlyerResult,
    assets::{PreparedImage, decode_image},
};

/// One-time-writable cache for the decoded flyer template.
///
/// Constructed once at startup and injected into render calls. `install` is
/// first-write-wins: the `OnceLock` makes the write a synchronized one-time
/// initialization, so a duplicate load finishing late cannot swap the
/// template under an in-flight render. Until the install happens, renders
/// paint the gradient placeholder instead.
#[derive(Debug, Default)]
pub struct TemplateCache {
    slot: OnceLock<PreparedImage>,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `bytes` and install the template. Returns `true` when this
    /// call performed the install, `false` when a template was already set.
    pub fn install(&self, bytes: &[u8]) -> FlyerResult<bool> {
        let img = decode_image(bytes)?;
        Ok(self.slot.set(img).is_ok())
    }

    /// Whether the template has been installed.
    pub fn ready(&self) -> bool {
        self.slot.get().is_some()
    }

    pub fn get(&self) -> Option<&PreparedImage> {
        self.slot.get()
    }
}
