use anyhow::{Context, Result};
use log::*;
use mxl_relm4_components::relm4::{self, gtk::glib, gtk::prelude::*, prelude::*};
use notify_debouncer_mini::{new_debouncer, notify::*, DebounceEventResult, Debouncer};
use relm4_icons::icon_names;
use std::{cell::RefCell, collections::HashMap, f64::consts::PI, path::Path, rc::Rc, sync::Mutex, time::Duration};

use glib::clone;

use super::{
    messages::{internal::PrivateMsg, ComparisonComponentCommand, ComparisonComponentInput, ComparisonComponentOutput},
    model::{ComparisonComponentInit, ComparisonComponentModel, ComparisonSources, ViewData},
};
use crate::comparison::{
    divider::{DIVIDER_MAX, DIVIDER_MIN},
    ClickOrigin, ClipRegion, ComparisonController, ComparisonHandle, ContainerBounds, DividerPosition,
    GeometryProvider, ListenerScope, PointerTarget, SurfaceRole,
};
use crate::inspection;
use crate::localization::helper::fl;
use crate::surface::{PlaybackState, SurfaceEvent, VideoSurface, VideoSurfaceBuilder};
use crate::uri_helpers;

const DIVIDER_LINE_WIDTH: f64 = 2.0;
const DIVIDER_HANDLE_RADIUS: f64 = 14.0;
const DIVIDER_PAGE_STEP: f64 = 10.0;
const NOTIFY_TIMEOUT_SECS: u64 = 2;

type SharedController = Rc<RefCell<ComparisonController<VideoSurface>>>;

#[relm4::component(pub)]
impl Component for ComparisonComponentModel {
    type Init = ComparisonComponentInit;
    type Input = ComparisonComponentInput;
    type Output = ComparisonComponentOutput;
    type CommandOutput = ComparisonComponentCommand;

    view! {
        #[name = "comparison_view"]
        gtk::Overlay {
            set_vexpand: true,
            set_hexpand: true,
            set_overflow: gtk::Overflow::Hidden,

            #[name = "background_picture"]
            gtk::Picture {
                set_content_fit: gtk::ContentFit::Contain,
                set_can_shrink: true,
            },

            add_overlay = background_poster = &gtk::Picture {
                set_content_fit: gtk::ContentFit::Contain,
                set_can_target: false,
                set_filename: Some(&model.sources.background_poster),
                #[watch]
                set_visible: !model.first_frame_shown(SurfaceRole::Background),
            },

            // The foreground is clipped by a viewport that only spans the revealed part:
            add_overlay = foreground_clip = &gtk::ScrolledWindow {
                set_hscrollbar_policy: gtk::PolicyType::External,
                set_vscrollbar_policy: gtk::PolicyType::External,
                set_halign: gtk::Align::Start,
                set_vexpand: true,
                set_can_target: false,
                set_kinetic_scrolling: false,
                #[watch]
                set_width_request: model.reveal_width(),
                #[watch]
                set_visible: model.reveal_width() > 0,

                gtk::Overlay {
                    #[name = "foreground_picture"]
                    gtk::Picture {
                        set_content_fit: gtk::ContentFit::Contain,
                        #[watch]
                        set_size_request: (model.view_size.0, model.view_size.1),
                    },

                    add_overlay = foreground_poster = &gtk::Picture {
                        set_content_fit: gtk::ContentFit::Contain,
                        set_can_target: false,
                        set_filename: Some(&model.sources.foreground_poster),
                        #[watch]
                        set_visible: !model.first_frame_shown(SurfaceRole::Foreground),
                    },
                },
            },

            add_overlay = divider_overlay = &gtk::DrawingArea {
                set_vexpand: true,
                set_hexpand: true,
                set_can_target: false,
            },

            add_overlay = &gtk::Image {
                set_icon_name: Some(icon_names::PLAY_LARGE),
                set_pixel_size: 64,
                set_halign: gtk::Align::Center,
                set_valign: gtk::Align::Center,
                set_can_target: false,
                add_css_class: "osd",
                #[watch]
                set_visible: model.controller.is_some() && !model.is_playing,
            },

            add_overlay = &gtk::Image {
                set_icon_name: Some(icon_names::WARNING),
                set_pixel_size: 24,
                set_halign: gtk::Align::End,
                set_valign: gtk::Align::Start,
                set_margin_top: 12,
                set_margin_end: 12,
                add_css_class: "osd",
                set_tooltip_text: Some(&fl!("comparison-playback-failed")),
                #[watch]
                set_visible: model.controller.is_some() && model.any_surface_failed(),
            },

            add_overlay = &gtk::Box {
                set_orientation: gtk::Orientation::Vertical,
                set_halign: gtk::Align::Center,
                set_valign: gtk::Align::Center,
                set_spacing: 6,
                set_can_target: false,
                #[watch]
                set_visible: model.controller.is_none(),

                gtk::Image {
                    set_icon_name: Some(icon_names::WARNING),
                    set_pixel_size: 48,
                },
                gtk::Label {
                    set_label: &fl!("comparison-unavailable"),
                },
            },

            add_overlay = range_control = &gtk::Scale {
                set_valign: gtk::Align::End,
                set_hexpand: true,
                set_draw_value: false,
                set_range: (DIVIDER_MIN, DIVIDER_MAX),
                set_increments: (1.0, DIVIDER_PAGE_STEP),
                set_tooltip_text: Some(&fl!("comparison-divider")),
                add_css_class: "osd",
                #[watch]
                #[block_signal(divider_changed_handler)]
                set_value: model.divider_position.value(),
                connect_value_changed[sender] => move |scale| {
                    sender.input(ComparisonComponentInput::SetDividerPosition(scale.value()));
                } @divider_changed_handler,
            },
        }
    }

    // Initialize the component.
    fn init(init: Self::Init, root: Self::Root, sender: ComponentSender<Self>) -> ComponentParts<Self> {
        let resolved = Self::resolve_sources(&init.sources);
        let surfaces = resolved
            .as_ref()
            .map_err(|error| anyhow::anyhow!("{error:?}"))
            .and_then(|sources| Self::build_surfaces(&init, sources, sender.command_sender()));

        let controller = match surfaces {
            Ok((background, foreground)) => {
                let container = root.downgrade();
                let geometry: GeometryProvider =
                    Box::new(move || container.upgrade().and_then(|container| container_bounds(&container)));
                sender
                    .output_sender()
                    .send(ComparisonComponentOutput::Initialized(None))
                    .unwrap_or_default();
                Some(Rc::new(RefCell::new(ComparisonController::mount(
                    background, foreground, geometry,
                ))))
            }
            Err(error) => {
                error!("{}: {error:?}", fl!("comparison-unavailable"));
                sender
                    .output_sender()
                    .send(ComparisonComponentOutput::Initialized(Some(error)))
                    .unwrap_or_default();
                None
            }
        };

        let handle = controller.as_ref().map(|controller| {
            let input = sender.input_sender().clone();
            ComparisonHandle::new(Rc::clone(controller))
                .with_notifier(move || input.emit(ComparisonComponentInput::Refresh))
        });

        let divider_position = DividerPosition::default();
        let mut model = ComparisonComponentModel {
            sources: resolved.unwrap_or_else(|_| init.sources.clone()),
            controller,
            handle,
            view_data: Rc::new(Mutex::new(ViewData::default())),
            view_size: (0, 0),
            divider_position,
            clip_region: ClipRegion::for_position(divider_position),
            is_playing: false,
            is_muted: true,
            first_frames: [false; 2],
            failed_surfaces: [false; 2],
            source_infos: HashMap::new(),
            source_watchers: Vec::new(),
        };
        model.sync_view(&sender);

        // Insert the code generation of the view! macro here
        let widgets = view_output!();

        widgets
            .range_control
            .update_property(&[gtk::accessible::Property::Label(&fl!("comparison-range"))]);

        widgets.divider_overlay.set_draw_func(clone!(
            #[weak(rename_to = view_data)]
            model.view_data,
            move |_drawing_area, context, w, h| {
                if let Ok(view_data) = view_data.lock() {
                    draw_divider(context, &view_data, w, h);
                }
            }
        ));

        widgets.divider_overlay.connect_resize(clone!(
            #[strong]
            sender,
            move |_, w, h| {
                sender.input(ComparisonComponentInput::PrivateMessage(PrivateMsg::Resized(w, h)));
            }
        ));

        widgets
            .comparison_view
            .add_controller(model.new_click_gesture(sender.clone(), &widgets.comparison_view, &widgets.range_control));

        if let Some(controller) = &model.controller {
            let controller = controller.borrow();
            if let Some(surface) = controller.surface(SurfaceRole::Background) {
                widgets.background_picture.set_paintable(Some(&surface.paintable()));
            }
            if let Some(surface) = controller.surface(SurfaceRole::Foreground) {
                widgets.foreground_picture.set_paintable(Some(&surface.paintable()));
            }

            // Platforms may ignore the first play request until the sink is realized:
            let input = sender.input_sender().clone();
            glib::timeout_add_local_once(init.autoplay_retry, move || {
                input.emit(ComparisonComponentInput::PrivateMessage(PrivateMsg::RetryAutoplay));
            });

            for role in SurfaceRole::ALL {
                model.inspect_source(role, &sender);
                if init.watch_sources {
                    if let Some(path) = uri_helpers::local_path(model.sources.source(role)) {
                        match Self::init_source_watcher(role, &path, sender.input_sender().clone())
                            .with_context(|| format!("Cannot add watcher for the {role} source {path:?}"))
                        {
                            Ok(debouncer) => model.source_watchers.push(debouncer),
                            Err(error) => error!("{:?}", error),
                        }
                    }
                }
            }
        }

        ComponentParts { model, widgets }
    }

    fn update_with_view(
        &mut self,
        widgets: &mut Self::Widgets,
        msg: Self::Input,
        sender: ComponentSender<Self>,
        _: &Self::Root,
    ) {
        if let Some(controller) = self.controller.clone() {
            match msg {
                ComparisonComponentInput::TogglePlayback => {
                    controller.borrow_mut().toggle_playback();
                }
                ComparisonComponentInput::ToggleMuted => {
                    controller.borrow_mut().toggle_muted();
                }
                ComparisonComponentInput::SetMuted(muted) => controller.borrow_mut().set_muted(muted),
                ComparisonComponentInput::ForcePlay => controller.borrow_mut().force_play(),
                ComparisonComponentInput::SetDividerPosition(value) => {
                    controller.borrow_mut().set_divider_position(value);
                }
                ComparisonComponentInput::NudgeDivider(delta) => {
                    let mut controller = controller.borrow_mut();
                    let value = controller.divider_position().value() + delta;
                    controller.set_divider_position(value);
                }
                ComparisonComponentInput::DumpPipeline(label) => {
                    let controller = controller.borrow();
                    for role in SurfaceRole::ALL {
                        if let Some(surface) = controller.surface(role) {
                            surface.dump_pipeline(&label);
                        }
                    }
                }
                ComparisonComponentInput::Refresh => (),
                ComparisonComponentInput::PrivateMessage(msg) => match msg {
                    PrivateMsg::Pressed(x, y) => {
                        Self::pressed(&controller, &widgets.comparison_view, x, y, &sender);
                    }
                    PrivateMsg::Released { x, y, on_range_control } => {
                        let mut controller = controller.borrow_mut();
                        let origin = if on_range_control {
                            ClickOrigin::RangeControl
                        } else {
                            match to_root_x(&widgets.comparison_view, x, y).map(|root_x| {
                                PointerTarget::resolve(
                                    controller.container_bounds(),
                                    controller.divider_position(),
                                    root_x,
                                )
                            }) {
                                Some(PointerTarget::Divider) => ClickOrigin::Divider,
                                _ => ClickOrigin::Surface,
                            }
                        };
                        controller.container_click(origin);
                    }
                    PrivateMsg::DragMotion(x) => {
                        controller.borrow_mut().continue_drag(x);
                    }
                    PrivateMsg::DragRelease => {
                        controller.borrow_mut().end_drag();
                    }
                    PrivateMsg::Resized(width, height) => {
                        trace!("Comparison view resized to {width}x{height}");
                        self.view_size = (width, height);
                    }
                    PrivateMsg::RetryAutoplay => controller.borrow_mut().retry_autoplay(),
                    PrivateMsg::SourceChanged(role) => {
                        let uri = self.sources.source(role).to_owned();
                        controller.borrow_mut().reload_source(role, &uri);
                        self.inspect_source(role, &sender);
                    }
                },
            }
        }
        self.sync_view(&sender);
        widgets.divider_overlay.queue_draw();
        self.update_view(widgets, sender)
    }

    fn update_cmd(&mut self, msg: Self::CommandOutput, sender: ComponentSender<Self>, _root: &Self::Root) {
        match msg {
            ComparisonComponentCommand::Surface(role, event) => self.surface_event(role, event),
            ComparisonComponentCommand::SourceInspected(role, result) => {
                let result = result.and_then(|info| {
                    inspection::trace_source_info(role, &info);
                    inspection::check_source(&info)
                });
                match result {
                    Ok(info) => {
                        self.source_infos.insert(role, info.clone());
                        self.check_source_pair();
                        sender
                            .output(ComparisonComponentOutput::SourceInspected(role, info))
                            .unwrap_or_default();
                    }
                    Err(error) => warn!("Inspection of the {role} source failed: {error:?}"),
                }
            }
        }
        self.sync_view(&sender);
    }

    fn shutdown(&mut self, _widgets: &mut Self::Widgets, _output: relm4::Sender<Self::Output>) {
        self.source_watchers.clear();
        if let Some(controller) = &self.controller {
            controller.borrow_mut().unmount();
        }
    }
}

impl ComparisonComponentModel {
    fn resolve_sources(sources: &ComparisonSources) -> Result<ComparisonSources> {
        let mut resolved = sources.clone();
        resolved.background = uri_helpers::source_uri(&sources.background)
            .with_context(|| format!("Invalid background source '{}'", sources.background))?;
        resolved.foreground = uri_helpers::source_uri(&sources.foreground)
            .with_context(|| format!("Invalid foreground source '{}'", sources.foreground))?;
        Ok(resolved)
    }

    fn build_surfaces(
        init: &ComparisonComponentInit,
        sources: &ComparisonSources,
        sender: &relm4::Sender<ComparisonComponentCommand>,
    ) -> Result<(VideoSurface, VideoSurface)> {
        let build = |role: SurfaceRole| -> Result<VideoSurface> {
            VideoSurfaceBuilder::new(role)
                .uri(sources.source(role))
                .muted(true)
                .position_update_interval_ms(init.position_update_interval_ms)
                .compositor(init.compositor.clone())
                .build(sender.clone())
        };
        Ok((build(SurfaceRole::Background)?, build(SurfaceRole::Foreground)?))
    }

    fn init_source_watcher(
        role: SurfaceRole,
        path: &Path,
        sender: relm4::Sender<ComparisonComponentInput>,
    ) -> Result<Debouncer<RecommendedWatcher>> {
        let mut debouncer: Debouncer<RecommendedWatcher> = new_debouncer(
            Duration::from_secs(NOTIFY_TIMEOUT_SECS),
            move |res: DebounceEventResult| match res {
                Ok(events) => {
                    if let Some(event) = events.first() {
                        debug!("Source {:?} changed, reloading the {role} surface", event.path);
                        sender.emit(ComparisonComponentInput::PrivateMessage(PrivateMsg::SourceChanged(role)));
                    }
                }
                Err(error) => error!("Error {:?}", error),
            },
        )?;
        debouncer.watcher().watch(path, RecursiveMode::NonRecursive)?;

        Ok(debouncer)
    }

    fn inspect_source(&self, role: SurfaceRole, sender: &ComponentSender<Self>) {
        let uri = self.sources.source(role).to_owned();
        sender.oneshot_command(async move {
            ComparisonComponentCommand::SourceInspected(role, inspection::inspect_source(&uri))
        });
    }

    fn check_source_pair(&self) {
        if let (Some(background), Some(foreground)) = (
            self.source_infos.get(&SurfaceRole::Background),
            self.source_infos.get(&SurfaceRole::Foreground),
        ) {
            if let Some(difference) = inspection::duration_mismatch(background, foreground) {
                warn!(
                    "{}",
                    fl!("source-duration-mismatch", seconds = format!("{difference:.1}"))
                );
            }
        }
    }

    fn surface_event(&mut self, role: SurfaceRole, event: SurfaceEvent) {
        match event {
            SurfaceEvent::PositionUpdated(position) => {
                if let Some(controller) = &self.controller {
                    controller.borrow_mut().on_position_update(role, position);
                }
            }
            SurfaceEvent::DurationChanged(duration) => trace!("{role} surface duration {duration}s"),
            SurfaceEvent::EndOfStream(uri) => {
                debug!("{role} surface end of stream: {uri}");
                if let Some(controller) = &self.controller {
                    controller.borrow_mut().on_end_of_stream(role);
                }
            }
            SurfaceEvent::VideoDimensionsChanged(width, height) => {
                if width == 0 || height == 0 {
                    return;
                }
                if !self.first_frame_shown(role) {
                    debug!("{role} surface video dimensions {width}x{height}, hide poster");
                    self.set_first_frame_shown(role);
                }
                if role == SurfaceRole::Background {
                    if let Ok(mut view_data) = self.view_data.lock() {
                        view_data.video_dimensions = Some(gst_video::VideoRectangle::new(0, 0, width, height));
                    }
                }
            }
            SurfaceEvent::StateChanged(old_state, new_state) => {
                trace!("{role} surface state changed from {old_state:?} to {new_state:?}");
                let failed = new_state == PlaybackState::Error;
                if failed != self.surface_failed(role) {
                    if !failed {
                        debug!("{role} surface recovered from error");
                    }
                    self.set_surface_failed(role, failed);
                }
            }
            SurfaceEvent::Warning(error) => warn!("Internal {role} surface warning: {error:?}"),
            SurfaceEvent::Error(error) => {
                // Playback denial is recoverable, the next play request retries:
                warn!("Playback of the {role} surface failed: {error:?}");
            }
        }
    }

    fn sync_view(&mut self, sender: &ComponentSender<Self>) {
        let Some(controller) = &self.controller else {
            return;
        };
        let controller = controller.borrow();

        let divider_position = controller.divider_position();
        if divider_position != self.divider_position {
            self.divider_position = divider_position;
            sender
                .output(ComparisonComponentOutput::DividerMoved(divider_position.value()))
                .unwrap_or_default();
        }
        self.clip_region = controller.clip_region();
        if controller.is_playing() != self.is_playing {
            self.is_playing = controller.is_playing();
            sender
                .output(ComparisonComponentOutput::PlayingChanged(self.is_playing))
                .unwrap_or_default();
        }
        if controller.is_muted() != self.is_muted {
            self.is_muted = controller.is_muted();
            sender
                .output(ComparisonComponentOutput::MutedChanged(self.is_muted))
                .unwrap_or_default();
        }
        if let Ok(mut view_data) = self.view_data.lock() {
            view_data.divider_position = divider_position;
            view_data.dragging = controller.is_dragging();
        }
    }

    fn pressed(controller: &SharedController, container: &gtk::Overlay, x: f64, y: f64, sender: &ComponentSender<Self>) {
        let Some(root_x) = to_root_x(container, x, y) else {
            return;
        };
        let mut controller = controller.borrow_mut();
        let target = PointerTarget::resolve(controller.container_bounds(), controller.divider_position(), root_x);
        match target {
            PointerTarget::Divider => {
                let listeners = container
                    .root()
                    .map(|root| register_drag_listeners(&root, sender.input_sender().clone()))
                    .unwrap_or_default();
                controller.begin_drag(target, root_x, listeners);
            }
            PointerTarget::Surface => controller.press(target),
        }
    }

    fn new_click_gesture(
        &self,
        sender: ComponentSender<Self>,
        container: &gtk::Overlay,
        range_control: &gtk::Scale,
    ) -> gtk::GestureClick {
        let click = gtk::GestureClick::builder().button(gtk::gdk::BUTTON_PRIMARY).build();
        let container = container.clone();
        let range_control = range_control.clone();

        click.connect_pressed(clone!(
            #[strong]
            sender,
            move |_, _, x, y| {
                sender.input(ComparisonComponentInput::PrivateMessage(PrivateMsg::Pressed(x, y)));
            }
        ));

        click.connect_released(clone!(
            #[strong]
            sender,
            #[weak]
            container,
            #[weak]
            range_control,
            move |_, _, x, y| {
                let on_range_control = container
                    .pick(x, y, gtk::PickFlags::DEFAULT)
                    .is_some_and(|picked| {
                        &picked == range_control.upcast_ref::<gtk::Widget>() || picked.is_ancestor(&range_control)
                    });
                sender.input(ComparisonComponentInput::PrivateMessage(PrivateMsg::Released {
                    x,
                    y,
                    on_range_control,
                }));
            }
        ));

        click
    }
}

fn container_bounds(container: &gtk::Overlay) -> Option<ContainerBounds> {
    let root = container.root()?;
    let bounds = container.compute_bounds(&root)?;
    Some(ContainerBounds::new(bounds.x() as f64, bounds.width() as f64))
}

fn to_root_x(container: &gtk::Overlay, x: f64, y: f64) -> Option<f64> {
    let root = container.root()?;
    container
        .compute_point(&root, &gtk::graphene::Point::new(x as f32, y as f32))
        .map(|point| point.x() as f64)
}

/// Tracks pointer and touch input on the whole window for the duration of a drag.
fn register_drag_listeners(root: &gtk::Root, sender: relm4::Sender<ComparisonComponentInput>) -> ListenerScope {
    let listener = gtk::EventControllerLegacy::new();
    listener.set_propagation_phase(gtk::PropagationPhase::Capture);

    let weak_root = root.downgrade();
    listener.connect_event(move |_, event| {
        let Some(root) = weak_root.upgrade() else {
            return glib::Propagation::Proceed;
        };
        match event.event_type() {
            gtk::gdk::EventType::MotionNotify | gtk::gdk::EventType::TouchUpdate => {
                if let Some((x, _)) = event.position() {
                    // Event positions are relative to the surface, not to the root widget:
                    let (offset_x, _) = root.surface_transform();
                    sender.emit(ComparisonComponentInput::PrivateMessage(PrivateMsg::DragMotion(
                        x - offset_x,
                    )));
                }
                if event.event_type() == gtk::gdk::EventType::TouchUpdate {
                    return glib::Propagation::Stop;
                }
            }
            gtk::gdk::EventType::ButtonRelease | gtk::gdk::EventType::TouchEnd | gtk::gdk::EventType::TouchCancel => {
                sender.emit(ComparisonComponentInput::PrivateMessage(PrivateMsg::DragRelease));
            }
            _ => (),
        }
        glib::Propagation::Proceed
    });
    root.add_controller(listener.clone());
    trace!("Registered drag listeners");

    let root = root.clone();
    ListenerScope::new(move || root.remove_controller(&listener))
}

fn draw_divider(context: &gtk::cairo::Context, view_data: &ViewData, width: i32, height: i32) {
    let x = view_data.divider_position.offset_in(width as f64);
    // The line only spans the picture, not the letterbox bars:
    let area = view_data.video_area(width, height);
    let center_y = area.y as f64 + area.h as f64 / 2.0;

    context.set_source_rgba(1.0, 1.0, 1.0, 0.9);
    context.rectangle(x - DIVIDER_LINE_WIDTH / 2.0, area.y as f64, DIVIDER_LINE_WIDTH, area.h as f64);
    context.new_sub_path();
    context.arc(x, center_y, DIVIDER_HANDLE_RADIUS, 0.0, 2.0 * PI);
    if let Err(error) = context.fill() {
        trace!("Cannot draw divider: {error}");
        return;
    }

    let alpha = if view_data.dragging { 0.9 } else { 0.6 };
    let step = DIVIDER_HANDLE_RADIUS / 3.0;
    context.set_source_rgba(0.0, 0.0, 0.0, alpha);
    for direction in [-1.0, 1.0] {
        context.move_to(x + direction * step * 0.5, center_y - step);
        context.line_to(x + direction * step * 1.5, center_y);
        context.line_to(x + direction * step * 0.5, center_y + step);
        context.close_path();
    }
    if let Err(error) = context.fill() {
        trace!("Cannot draw divider handle: {error}");
    }
}
