use anyhow::{Context, Result};
use gst::{glib, prelude::*};
use gst_play::PlayMessage;
use log::*;
use mxl_relm4_components::relm4::{self, gtk::gdk, Sender};
use std::sync::{Arc, Mutex};

use glib::clone;

use crate::comparison::{MediaSurface, SurfaceRole};
use crate::ui::comparison::messages::ComparisonComponentCommand;

const GLSINKBIN_NAME: &str = "glsinkbin";
const DEFAULT_POSITION_UPDATE_INTERVAL_MS: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Paused,
    Playing,
    Buffering,
    Error,
}

impl PlaybackState {
    /// State after a reported change, `None` if the report is ignored.
    ///
    /// A failed surface stays in `Error` while its pipeline winds down to
    /// `Stopped`. Only a new play request leaves the `Error` state.
    pub fn transition(current: Option<PlaybackState>, reported: PlaybackState) -> Option<PlaybackState> {
        match (current, reported) {
            (Some(current), reported) if current == reported => None,
            (Some(PlaybackState::Error), PlaybackState::Stopped) => None,
            _ => Some(reported),
        }
    }
}

/// Events of one surface, forwarded to the comparison component.
#[derive(Debug)]
pub enum SurfaceEvent {
    PositionUpdated(f64),
    DurationChanged(f64),
    EndOfStream(String),
    VideoDimensionsChanged(i32, i32),
    StateChanged(Option<PlaybackState>, PlaybackState),
    Warning(anyhow::Error),
    Error(anyhow::Error),
}

#[derive(Debug)]
pub struct VideoSurfaceBuilder {
    role: SurfaceRole,
    uri: Option<String>,
    muted: bool,
    position_update_interval_ms: u32,
    compositor: Option<gst::Element>,
}

impl VideoSurfaceBuilder {
    pub fn new(role: SurfaceRole) -> Self {
        Self {
            role,
            uri: None,
            muted: true,
            position_update_interval_ms: DEFAULT_POSITION_UPDATE_INTERVAL_MS,
            compositor: None,
        }
    }

    pub fn uri(&mut self, uri: &str) -> &mut Self {
        self.uri = Some(uri.to_owned());
        self
    }

    pub fn muted(&mut self, muted: bool) -> &mut Self {
        self.muted = muted;
        self
    }

    pub fn position_update_interval_ms(&mut self, interval: u32) -> &mut Self {
        self.position_update_interval_ms = interval;
        self
    }

    pub fn compositor(&mut self, compositor: Option<gst::Element>) -> &mut Self {
        self.compositor = compositor;
        self
    }

    pub fn build(&self, sender: relm4::Sender<ComparisonComponentCommand>) -> Result<VideoSurface> {
        let role = self.role;
        let gtk_sink = gst::ElementFactory::make("gtk4paintablesink")
            .build()
            .with_context(|| format!("Failed to create video sink for the {role} surface"))?;

        let paintable = gtk_sink.property::<gdk::Paintable>("paintable");
        paintable.set_property("force-aspect-ratio", true);
        paintable.set_property("use-scaling-filter", true);

        let video_sink = if paintable.property::<Option<gdk::GLContext>>("gl-context").is_some()
            && gst::ElementFactory::find(GLSINKBIN_NAME).is_some()
        {
            debug!("Use GL rendering for the {role} surface");
            gst::ElementFactory::make(GLSINKBIN_NAME)
                .property("sink", &gtk_sink)
                .build()
                .with_context(|| "Failed to create surface with element to process GL textures")?
        } else {
            warn!("Use software rendering for the {role} surface");
            gtk_sink.clone()
        };

        let renderer = gst_play::PlayVideoOverlayVideoRenderer::with_sink(&video_sink);
        let gst_play = gst_play::Play::new(Some(renderer.upcast::<gst_play::PlayVideoRenderer>()));

        let pipeline = gst_play.pipeline();
        pipeline.set_property_from_str("flags", "soft-colorbalance+deinterlace+buffering+soft-volume+audio+video");
        if let Some(compositor) = &self.compositor {
            pipeline.set_property("video-stream-combiner", compositor);
        }

        let mut config = gst_play.config();
        config.set_seek_accurate(false);
        config.set_position_update_interval(self.position_update_interval_ms);
        gst_play
            .set_config(config)
            .with_context(|| format!("Failed to set configuration of the {role} surface"))?;

        let surface_data = Arc::new(Mutex::new(SurfaceData {
            role,
            sender,
            current_state: None,
        }));

        let _bus_watch = gst_play
            .message_bus()
            .add_watch_local(clone!(
                #[weak]
                gst_play,
                #[weak]
                surface_data,
                #[upgrade_or]
                glib::ControlFlow::Break,
                move |_, message| {
                    let Ok(mut surface_data) = surface_data.lock() else {
                        return glib::ControlFlow::Break;
                    };
                    match PlayMessage::parse(message) {
                        Ok(PlayMessage::EndOfStream) => {
                            if let Some(uri) = gst_play.uri() {
                                surface_data.send(SurfaceEvent::EndOfStream(uri.into()));
                            }
                        }
                        Ok(PlayMessage::DurationChanged { duration }) => {
                            if let Some(duration) = duration {
                                surface_data.send(SurfaceEvent::DurationChanged(seconds(duration)));
                            }
                        }
                        Ok(PlayMessage::PositionUpdated { position }) => {
                            if let Some(position) = position {
                                surface_data.send(SurfaceEvent::PositionUpdated(seconds(position)));
                            }
                        }
                        Ok(PlayMessage::VideoDimensionsChanged { width, height }) => {
                            surface_data.send(SurfaceEvent::VideoDimensionsChanged(width as i32, height as i32));
                        }
                        Ok(PlayMessage::StateChanged { state }) => {
                            let state = match state {
                                gst_play::PlayState::Playing => Some(PlaybackState::Playing),
                                gst_play::PlayState::Paused => Some(PlaybackState::Paused),
                                gst_play::PlayState::Stopped => Some(PlaybackState::Stopped),
                                gst_play::PlayState::Buffering => Some(PlaybackState::Buffering),
                                _ => None,
                            };
                            if let Some(s) = state {
                                surface_data.change_state(s);
                            }
                        }
                        Ok(PlayMessage::Error { error, .. }) => {
                            surface_data.change_state(PlaybackState::Error);
                            surface_data.send(SurfaceEvent::Error(anyhow::anyhow!(error)));
                        }
                        Ok(PlayMessage::Warning { error, .. }) => {
                            surface_data.send(SurfaceEvent::Warning(anyhow::anyhow!(error)));
                        }
                        _ => (),
                    }

                    glib::ControlFlow::Continue
                }
            ))
            .with_context(|| format!("Cannot add watcher to the {role} surface bus"))?;

        let surface = VideoSurface {
            role,
            player: gst_play,
            gtk_sink,
            _bus_watch,
            data: surface_data,
        };

        surface.set_muted(self.muted);
        if let Some(uri) = &self.uri {
            surface.set_uri(uri);
        }

        Ok(surface)
    }
}

fn seconds(time: gst::ClockTime) -> f64 {
    time.mseconds() as f64 / 1000_f64
}

/// One of the two video layers, backed by a `gst_play::Play` instance.
#[derive(Debug)]
pub struct VideoSurface {
    role: SurfaceRole,
    player: gst_play::Play,
    gtk_sink: gst::Element,
    _bus_watch: gst::bus::BusWatchGuard,
    data: Arc<Mutex<SurfaceData>>,
}

#[derive(Debug)]
struct SurfaceData {
    role: SurfaceRole,
    sender: Sender<ComparisonComponentCommand>,
    current_state: Option<PlaybackState>,
}

impl SurfaceData {
    fn change_state(&mut self, new_state: PlaybackState) {
        match PlaybackState::transition(self.current_state, new_state) {
            Some(state) => self.set_state(state),
            None => trace!(
                "Ignore {} surface state change from {:?} to {new_state:?}",
                self.role,
                self.current_state
            ),
        }
    }

    fn set_state(&mut self, new_state: PlaybackState) {
        let old_state = self.current_state;
        self.current_state = Some(new_state);
        trace!("{} surface state changed from {old_state:?} to {new_state:?}", self.role);
        self.send(SurfaceEvent::StateChanged(old_state, new_state));
    }

    fn send(&self, event: SurfaceEvent) {
        self.sender
            .send(ComparisonComponentCommand::Surface(self.role, event))
            .unwrap_or_default();
    }
}

impl VideoSurface {
    pub fn role(&self) -> SurfaceRole {
        self.role
    }

    pub fn paintable(&self) -> gdk::Paintable {
        self.gtk_sink.property::<gdk::Paintable>("paintable")
    }

    pub fn dump_pipeline(&self, label: &str) {
        let element = self.player.pipeline();
        if let Ok(pipeline) = element.downcast::<gst::Pipeline>() {
            pipeline.debug_to_dot_file_with_ts(gst::DebugGraphDetails::all(), format!("{label}_{}", self.role));
        }
    }
}

impl MediaSurface for VideoSurface {
    fn play(&self) -> Result<()> {
        if self.player.uri().is_none() {
            anyhow::bail!("No media source set for the {} surface", self.role);
        }
        if let Ok(mut data) = self.data.lock() {
            if data.current_state == Some(PlaybackState::Error) {
                // A new play request leaves the Error state explicitly:
                data.set_state(PlaybackState::Stopped);
            }
        }
        self.player.play();
        Ok(())
    }

    fn pause(&self) {
        self.player.pause();
    }

    fn stop(&self) {
        self.player.stop();
    }

    fn position(&self) -> Option<f64> {
        self.player.position().map(seconds)
    }

    fn seek(&self, to: f64) {
        let to = gst::ClockTime::from_mseconds((to.max(0.0) * 1000_f64) as u64);
        self.player.seek(to);
    }

    fn set_volume(&self, volume: f64) {
        self.player.set_volume(volume.clamp(0.0, 1.0));
    }

    fn set_muted(&self, muted: bool) {
        self.player.set_mute(muted);
    }

    fn set_uri(&self, uri: &str) {
        debug!("{} surface set uri {uri}", self.role);
        self.player.set_uri(Some(uri));
    }
}
