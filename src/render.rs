/// A fully rendered flyer frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

/// Raw font bytes for the three flyer lines (title, second line, slogan).
///
/// The original template pairs a bold title with a semibold second line and
/// an italic slogan; callers that only have one face can reuse it for all
/// three via [`FontSet::single`].
#[derive(Clone, Debug)]
pub struct FontSet {
    pub title: Vec<u8>,
    pub sub: Vec<u8>,
    pub slogan: Vec<u8>,
}

impl FontSet {
    pub fn single(bytes: Vec<u8>) -> Self {
        Self {
            title: bytes.clone(),
            sub: bytes.clone(),
            slogan: bytes,
        }
    }

    /// Font bytes for line index 0..3.
    pub fn line_font(&self, line: usize) -> &[u8] {
        match line {
            0 => &self.title,
            1 => &self.sub,
            _ => &self.slogan,
        }
    }
}

/// Serializes deferred portrait draws.
///
/// A slow photo decode completes as a continuation; only the most recently
/// issued ticket is admitted, so a continuation from an abandoned render
/// pass is discarded instead of overwriting newer pixels. There is no
/// cancellation: stale completions simply fail the `admits` check.
#[derive(Debug, Default)]
pub struct PortraitGate {
    issued: u64,
}

/// Sequence token handed out by [`PortraitGate::begin`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PortraitTicket(u64);

impl PortraitGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new portrait draw, invalidating every earlier ticket.
    pub fn begin(&mut self) -> PortraitTicket {
        self.issued += 1;
        PortraitTicket(self.issued)
    }

    /// Whether `ticket` is still the most recent one.
    pub fn admits(&self, ticket: PortraitTicket) -> bool {
        ticket.0 == self.issued
    }
}
