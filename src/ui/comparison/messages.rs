use anyhow::Result;
use gst_pbutils::DiscovererInfo;

use crate::comparison::SurfaceRole;
use crate::inspection::SourceInfo;
use crate::surface::SurfaceEvent;

#[derive(Debug)]
pub enum ComparisonComponentInput {
    TogglePlayback,
    ToggleMuted,
    SetMuted(bool),
    ForcePlay,
    SetDividerPosition(f64),
    NudgeDivider(f64),
    DumpPipeline(String),
    /// Re-reads the player state after a command issued through a handle.
    Refresh,
    PrivateMessage(internal::PrivateMsg),
}

#[derive(Debug)]
pub enum ComparisonComponentOutput {
    Initialized(Option<anyhow::Error>),
    PlayingChanged(bool),
    MutedChanged(bool),
    DividerMoved(f64),
    SourceInspected(SurfaceRole, SourceInfo),
}

#[derive(Debug)]
pub enum ComparisonComponentCommand {
    Surface(SurfaceRole, SurfaceEvent),
    SourceInspected(SurfaceRole, Result<DiscovererInfo>),
}

pub(super) mod internal {
    use crate::comparison::SurfaceRole;

    #[derive(Debug)]
    pub enum PrivateMsg {
        /// Pointer or touch press in container coordinates.
        Pressed(f64, f64),
        /// Pointer or touch release in container coordinates.
        Released {
            x: f64,
            y: f64,
            on_range_control: bool,
        },
        /// Pointer motion during a drag, in root coordinates.
        DragMotion(f64),
        DragRelease,
        Resized(i32, i32),
        RetryAutoplay,
        SourceChanged(SurfaceRole),
    }
}
