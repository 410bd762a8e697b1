use log::*;

use super::{
    divider::{ClipRegion, DividerPosition, MixLevels},
    drag::{position_for_pointer, ClickOrigin, ContainerBounds, DragSession, GestureTracker, ListenerScope, PointerTarget},
    surface::{MediaSurface, SurfaceRole},
    sync,
};

/// Reads the container bounds at the time of the call.
pub type GeometryProvider = Box<dyn Fn() -> Option<ContainerBounds>>;

#[derive(Debug)]
struct SurfacePair<S> {
    background: S,
    foreground: S,
}

impl<S> SurfacePair<S> {
    fn get(&self, role: SurfaceRole) -> &S {
        match role {
            SurfaceRole::Background => &self.background,
            SurfaceRole::Foreground => &self.foreground,
        }
    }

    fn iter(&self) -> impl Iterator<Item = (SurfaceRole, &S)> {
        [
            (SurfaceRole::Background, &self.background),
            (SurfaceRole::Foreground, &self.foreground),
        ]
        .into_iter()
    }
}

/// State and behavior of the comparison player.
///
/// Owns both surfaces. Every write to the divider position or the mute state
/// recomputes the clip region and the audio mix in the same call. After
/// [`ComparisonController::unmount`] the surfaces are released and every
/// operation becomes a no-op.
pub struct ComparisonController<S: MediaSurface> {
    surfaces: Option<SurfacePair<S>>,
    geometry: GeometryProvider,
    divider_position: DividerPosition,
    clip_region: ClipRegion,
    is_playing: bool,
    is_muted: bool,
    drag: Option<DragSession>,
    gesture: GestureTracker,
}

impl<S: MediaSurface> ComparisonController<S> {
    /// Takes ownership of both surfaces, mutes them and attempts autoplay.
    pub fn mount(background: S, foreground: S, geometry: GeometryProvider) -> Self {
        let divider_position = DividerPosition::default();
        let mut controller = Self {
            surfaces: Some(SurfacePair { background, foreground }),
            geometry,
            divider_position,
            clip_region: ClipRegion::for_position(divider_position),
            is_playing: false,
            is_muted: true,
            drag: None,
            gesture: GestureTracker::default(),
        };
        controller.for_each_surface(|_, surface| surface.set_muted(true));
        controller.force_play();
        debug!("Comparison player mounted");
        controller
    }

    pub fn is_mounted(&self) -> bool {
        self.surfaces.is_some()
    }

    pub fn surface(&self, role: SurfaceRole) -> Option<&S> {
        self.surfaces.as_ref().map(|surfaces| surfaces.get(role))
    }

    pub fn divider_position(&self) -> DividerPosition {
        self.divider_position
    }

    pub fn clip_region(&self) -> ClipRegion {
        self.clip_region
    }

    /// Gains for both surfaces, `None` while muted.
    pub fn mix_levels(&self) -> Option<MixLevels> {
        if self.is_muted {
            None
        } else {
            Some(MixLevels::for_position(self.divider_position))
        }
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_muted(&self) -> bool {
        self.is_muted
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn container_bounds(&self) -> Option<ContainerBounds> {
        (self.geometry)()
    }

    pub fn set_divider_position(&mut self, value: impl Into<DividerPosition>) -> DividerPosition {
        self.divider_position = value.into();
        self.clip_region = ClipRegion::for_position(self.divider_position);
        self.apply_mix();
        self.divider_position
    }

    /// Re-issues play after the initial autoplay attempt.
    pub fn retry_autoplay(&mut self) {
        if self.is_playing {
            trace!("Retry autoplay");
            self.play_all("autoplay retry");
        }
    }

    /// Starts a new pointer gesture on `target`.
    ///
    /// Presses on the divider are handled by [`ComparisonController::begin_drag`].
    pub fn press(&mut self, target: PointerTarget) {
        if target == PointerTarget::Surface {
            self.gesture.press();
        }
    }

    /// Starts a drag if the press landed on the divider.
    ///
    /// `listeners` stays registered until the drag ends or the controller is
    /// unmounted. A refused drag releases it immediately.
    pub fn begin_drag(&mut self, target: PointerTarget, pointer_x: f64, listeners: ListenerScope) -> bool {
        if !self.is_mounted() || target != PointerTarget::Divider {
            trace!("Ignore drag start on {target:?}");
            return false;
        }
        if self.drag.take().is_some() {
            debug!("Replace stale drag session");
        }
        self.gesture.drag_started();
        self.drag = Some(DragSession::new(listeners));
        let position = position_for_pointer(self.container_bounds(), pointer_x);
        self.set_divider_position(position);
        trace!("Drag started at {:.1}%", position.value());
        true
    }

    /// Moves the divider under the pointer while a drag is in progress.
    pub fn continue_drag(&mut self, pointer_x: f64) -> Option<DividerPosition> {
        let drag = self.drag.as_mut()?;
        drag.moves += 1;
        let position = position_for_pointer(self.container_bounds(), pointer_x);
        Some(self.set_divider_position(position))
    }

    pub fn end_drag(&mut self) -> bool {
        match self.drag.take() {
            Some(drag) => {
                trace!(
                    "Drag ended at {:.1}% after {} moves",
                    self.divider_position.value(),
                    drag.moves
                );
                true
            }
            None => false,
        }
    }

    /// Handles a click on the container; returns whether playback was toggled.
    pub fn container_click(&mut self, origin: ClickOrigin) -> bool {
        let dragged = self.gesture.take_drag();
        if dragged || self.is_dragging() {
            trace!("Click concludes a drag, keep playback state");
            return false;
        }
        match origin {
            ClickOrigin::Surface => {
                self.toggle_playback();
                true
            }
            ClickOrigin::Divider | ClickOrigin::RangeControl => {
                trace!("Ignore click from {origin:?}");
                false
            }
        }
    }

    pub fn toggle_playback(&mut self) -> bool {
        if !self.is_mounted() {
            return self.is_playing;
        }
        self.is_playing = !self.is_playing;
        if self.is_playing {
            self.play_all("toggle playback");
        } else {
            self.for_each_surface(|_, surface| surface.pause());
        }
        debug!("Playback toggled, playing={}", self.is_playing);
        self.is_playing
    }

    /// Flips the mute state; returns `true` when audio is now audible.
    pub fn toggle_muted(&mut self) -> bool {
        self.set_muted(!self.is_muted);
        !self.is_muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        if !self.is_mounted() {
            return;
        }
        let unmuting = self.is_muted && !muted;
        self.is_muted = muted;
        self.for_each_surface(|_, surface| surface.set_muted(muted));
        if !muted {
            self.apply_mix();
        }
        if unmuting {
            // Audible playback needs a play request issued from the user interaction.
            self.force_play();
        }
        debug!("Audio muted={muted}");
    }

    /// Issues play to both surfaces from a user gesture context.
    pub fn force_play(&mut self) {
        if !self.is_mounted() {
            return;
        }
        self.is_playing = true;
        self.play_all("force play");
    }

    /// Applies the sync correction for a position report of `role`.
    pub fn on_position_update(&mut self, role: SurfaceRole, seconds: f64) -> Option<f64> {
        if role != SurfaceRole::Background {
            return None;
        }
        let surfaces = self.surfaces.as_ref()?;
        let target = sync::correction(seconds, surfaces.foreground.position())?;
        trace!("Resync foreground to {target:.3}s");
        surfaces.foreground.seek(target);
        Some(target)
    }

    /// Restarts a surface that reached its end.
    pub fn on_end_of_stream(&mut self, role: SurfaceRole) {
        let Some(surfaces) = self.surfaces.as_ref() else {
            return;
        };
        trace!("Loop {role} surface");
        let surface = surfaces.get(role);
        surface.seek(0.0);
        if self.is_playing {
            if let Err(error) = surface.play() {
                trace!("Play of {role} surface after loop rejected: {error:?}");
            }
        }
    }

    /// Points `role` at a new media source, keeping mute, mix and play intent.
    pub fn reload_source(&mut self, role: SurfaceRole, uri: &str) {
        let Some(surfaces) = self.surfaces.as_ref() else {
            return;
        };
        info!("Reload {role} source {uri}");
        let surface = surfaces.get(role);
        surface.set_uri(uri);
        surface.set_muted(self.is_muted);
        if let Some(levels) = self.mix_levels() {
            surface.set_volume(match role {
                SurfaceRole::Background => levels.background,
                SurfaceRole::Foreground => levels.foreground,
            });
        }
        if self.is_playing {
            if let Err(error) = surface.play() {
                trace!("Play of reloaded {role} surface rejected: {error:?}");
            }
        }
    }

    /// Stops and releases both surfaces and any drag listeners.
    pub fn unmount(&mut self) {
        self.drag = None;
        if let Some(surfaces) = self.surfaces.take() {
            for (_, surface) in surfaces.iter() {
                surface.stop();
            }
            debug!("Comparison player unmounted");
        }
    }

    fn apply_mix(&self) {
        if let Some(levels) = self.mix_levels() {
            self.for_each_surface(|role, surface| match role {
                SurfaceRole::Background => surface.set_volume(levels.background),
                SurfaceRole::Foreground => surface.set_volume(levels.foreground),
            });
        }
    }

    fn play_all(&self, reason: &str) {
        self.for_each_surface(|role, surface| {
            if let Err(error) = surface.play() {
                trace!("Play of {role} surface rejected ({reason}): {error:?}");
            }
        });
    }

    fn for_each_surface(&self, f: impl Fn(SurfaceRole, &S)) {
        if let Some(surfaces) = &self.surfaces {
            surfaces.iter().for_each(|(role, surface)| f(role, surface));
        }
    }
}

impl<S: MediaSurface> Drop for ComparisonController<S> {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl<S: MediaSurface> std::fmt::Debug for ComparisonController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComparisonController")
            .field("mounted", &self.is_mounted())
            .field("divider_position", &self.divider_position)
            .field("is_playing", &self.is_playing)
            .field("is_muted", &self.is_muted)
            .field("is_dragging", &self.is_dragging())
            .finish()
    }
}
