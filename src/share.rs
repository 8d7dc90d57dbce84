//! Share actions: native share seam with a deterministic URL fallback.

use crate::error::FlyerResult;

/// Caption prefix used when none is supplied.
pub const DEFAULT_CAPTION_PREFIX: &str = "I just made my flyer! Make yours: ";

/// What to share: the page link plus a caption that embeds it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShareRequest {
    pub page_url: String,
    pub caption: String,
}

impl ShareRequest {
    pub fn new(page_url: impl Into<String>) -> Self {
        let page_url = page_url.into();
        let caption = format!("{DEFAULT_CAPTION_PREFIX}{page_url}");
        Self { page_url, caption }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }
}

/// Platform seam for OS-level share sheets. The CLI has none; an embedder
/// with a share integration implements this.
pub trait NativeShare {
    /// Whether this target can share the given request and JPEG payload.
    fn can_share(&self, req: &ShareRequest, jpeg: &[u8]) -> bool;

    /// Perform the native share.
    fn share(&mut self, req: &ShareRequest, jpeg: &[u8]) -> FlyerResult<()>;
}

/// A target with no share capability; always routes to the URL fallback.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoNativeShare;

impl NativeShare for NoNativeShare {
    fn can_share(&self, _req: &ShareRequest, _jpeg: &[u8]) -> bool {
        false
    }

    fn share(&mut self, _req: &ShareRequest, _jpeg: &[u8]) -> FlyerResult<()> {
        Err(crate::FlyerError::render("no native share target"))
    }
}

/// Result of a share attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShareOutcome {
    /// The native target accepted the share.
    Shared,
    /// No native capability; the caller should open this URL.
    OpenUrl(String),
}

/// Pre-filled WhatsApp share link carrying the url-encoded caption.
pub fn whatsapp_share_url(caption: &str) -> String {
    format!("https://wa.me/?text={}", urlencoding::encode(caption))
}

/// Try the native target first; fall back to the WhatsApp URL when the
/// capability is absent or the native share fails. Never errors out of the
/// share flow itself.
pub fn share_or_fallback(
    target: &mut dyn NativeShare,
    req: &ShareRequest,
    jpeg: &[u8],
) -> ShareOutcome {
    if target.can_share(req, jpeg) {
        match target.share(req, jpeg) {
            Ok(()) => return ShareOutcome::Shared,
            Err(err) => {
                tracing::warn!(%err, "native share failed; falling back to share URL");
            }
        }
    }
    ShareOutcome::OpenUrl(whatsapp_share_url(&req.caption))
}
