use notify_debouncer_mini::{notify::RecommendedWatcher, Debouncer};
use std::{
    cell::RefCell,
    collections::HashMap,
    rc::Rc,
    sync::Mutex,
    time::Duration,
};

use crate::comparison::{ClipRegion, ComparisonController, ComparisonHandle, DividerPosition, SurfaceRole};
use crate::inspection::SourceInfo;
use crate::surface::VideoSurface;

pub const DEFAULT_BACKGROUND_POSTER: &str = "assets/posters/background.png";
pub const DEFAULT_FOREGROUND_POSTER: &str = "assets/posters/foreground.png";
pub const AUTOPLAY_RETRY_DELAY: Duration = Duration::from_millis(300);
pub const POSITION_UPDATE_INTERVAL_MS: u32 = 100;

/// Media sources and poster images of both layers.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonSources {
    pub background: String,
    pub foreground: String,
    pub background_poster: String,
    pub foreground_poster: String,
}

impl ComparisonSources {
    pub fn new(background: impl Into<String>, foreground: impl Into<String>) -> Self {
        Self {
            background: background.into(),
            foreground: foreground.into(),
            background_poster: DEFAULT_BACKGROUND_POSTER.to_owned(),
            foreground_poster: DEFAULT_FOREGROUND_POSTER.to_owned(),
        }
    }

    pub fn with_posters(mut self, background: impl Into<String>, foreground: impl Into<String>) -> Self {
        self.background_poster = background.into();
        self.foreground_poster = foreground.into();
        self
    }

    pub fn source(&self, role: SurfaceRole) -> &str {
        match role {
            SurfaceRole::Background => &self.background,
            SurfaceRole::Foreground => &self.foreground,
        }
    }

    pub fn poster(&self, role: SurfaceRole) -> &str {
        match role {
            SurfaceRole::Background => &self.background_poster,
            SurfaceRole::Foreground => &self.foreground_poster,
        }
    }
}

pub struct ComparisonComponentInit {
    pub sources: ComparisonSources,
    /// Reload a layer when its local source file changes.
    pub watch_sources: bool,
    pub autoplay_retry: Duration,
    pub position_update_interval_ms: u32,
    pub compositor: Option<gst::Element>,
}

impl ComparisonComponentInit {
    pub fn new(sources: ComparisonSources) -> Self {
        Self {
            sources,
            watch_sources: false,
            autoplay_retry: AUTOPLAY_RETRY_DELAY,
            position_update_interval_ms: POSITION_UPDATE_INTERVAL_MS,
            compositor: None,
        }
    }
}

/// State shared with the divider draw function.
#[derive(Debug, Default)]
pub(super) struct ViewData {
    pub(super) divider_position: DividerPosition,
    pub(super) dragging: bool,
    /// Native size of the background video, used to fit the divider to the picture.
    pub(super) video_dimensions: Option<gst_video::VideoRectangle>,
}

impl ViewData {
    /// Area of a `width` x `height` view covered by the letterboxed video.
    pub(super) fn video_area(&self, width: i32, height: i32) -> gst_video::VideoRectangle {
        let view = gst_video::VideoRectangle::new(0, 0, width, height);
        match &self.video_dimensions {
            Some(video) => gst_video::center_video_rectangle(video, &view, true),
            None => view,
        }
    }
}

pub struct ComparisonComponentModel {
    pub(super) sources: ComparisonSources,
    pub(super) controller: Option<Rc<RefCell<ComparisonController<VideoSurface>>>>,
    pub(super) handle: Option<ComparisonHandle<VideoSurface>>,
    pub(super) view_data: Rc<Mutex<ViewData>>,
    pub(super) view_size: (i32, i32),
    pub(super) divider_position: DividerPosition,
    pub(super) clip_region: ClipRegion,
    pub(super) is_playing: bool,
    pub(super) is_muted: bool,
    pub(super) first_frames: [bool; 2],
    pub(super) failed_surfaces: [bool; 2],
    pub(super) source_infos: HashMap<SurfaceRole, SourceInfo>,
    pub(super) source_watchers: Vec<Debouncer<RecommendedWatcher>>,
}

impl ComparisonComponentModel {
    /// Imperative controls for the host, `None` if the surfaces failed to initialize.
    pub fn handle(&self) -> Option<ComparisonHandle<VideoSurface>> {
        self.handle.clone()
    }

    pub fn divider_position(&self) -> DividerPosition {
        self.divider_position
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_muted(&self) -> bool {
        self.is_muted
    }

    pub(super) fn first_frame_shown(&self, role: SurfaceRole) -> bool {
        self.first_frames[Self::role_index(role)]
    }

    pub(super) fn set_first_frame_shown(&mut self, role: SurfaceRole) {
        self.first_frames[Self::role_index(role)] = true;
    }

    pub(super) fn surface_failed(&self, role: SurfaceRole) -> bool {
        self.failed_surfaces[Self::role_index(role)]
    }

    pub(super) fn set_surface_failed(&mut self, role: SurfaceRole, failed: bool) {
        self.failed_surfaces[Self::role_index(role)] = failed;
    }

    pub(super) fn any_surface_failed(&self) -> bool {
        self.failed_surfaces.iter().any(|failed| *failed)
    }

    pub(super) fn reveal_width(&self) -> i32 {
        self.clip_region.revealed_width(self.view_size.0 as f64).round() as i32
    }

    fn role_index(role: SurfaceRole) -> usize {
        match role {
            SurfaceRole::Background => 0,
            SurfaceRole::Foreground => 1,
        }
    }
}
