use anyhow::Result;
use std::fmt;

/// Which of the two layered videos a surface renders.
///
/// The background layer is always fully visible and is the timing leader.
/// The foreground layer is revealed by the divider and follows the
/// background's playback position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceRole {
    Background,
    Foreground,
}

impl SurfaceRole {
    pub const ALL: [SurfaceRole; 2] = [SurfaceRole::Background, SurfaceRole::Foreground];
}

impl fmt::Display for SurfaceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceRole::Background => write!(f, "background"),
            SurfaceRole::Foreground => write!(f, "foreground"),
        }
    }
}

/// Playback backend driven by the comparison controller.
///
/// `play` may be rejected by the backend (no source, autoplay denied, decode
/// failure). Callers treat a rejection as an expected outcome and never
/// propagate it.
pub trait MediaSurface {
    fn play(&self) -> Result<()>;

    fn pause(&self);

    fn stop(&self);

    /// Playback position in seconds, if known.
    fn position(&self) -> Option<f64>;

    fn seek(&self, to: f64);

    /// Linear gain in `[0, 1]`.
    fn set_volume(&self, volume: f64);

    fn set_muted(&self, muted: bool);

    fn set_uri(&self, uri: &str);
}
