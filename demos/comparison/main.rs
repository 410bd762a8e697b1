use anyhow::{bail, Result};
use log::*;
use mxl_comparison_player::{
    actions::{self, Accelerators, DIVIDER_KEY_STEP},
    comparison::{ComparisonHandle, SurfaceRole},
    glib_helpers,
    inspection::SourceInfo,
    surface::VideoSurface,
    ui::comparison::{
        messages::{ComparisonComponentInput, ComparisonComponentOutput},
        model::{ComparisonComponentInit, ComparisonComponentModel, ComparisonSources},
    },
};
use mxl_relm4_components::relm4::{
    self,
    actions::*,
    adw::prelude::*,
    gtk::{gio, glib},
    prelude::*,
};
use tempfile::tempdir;

use glib::clone;

const APP_ID: &str = "com.x-software.mxl.comparison";

struct AppInit {
    sources: ComparisonSources,
}

struct App {
    comparison_component: Controller<ComparisonComponentModel>,
    handle: Option<ComparisonHandle<VideoSurface>>,
    is_playing: bool,
    is_muted: bool,
    divider_position: f64,
}

#[derive(Debug)]
enum AppMsg {
    Initialized(Option<anyhow::Error>),
    PlayingChanged(bool),
    MutedChanged(bool),
    DividerMoved(f64),
    SourceInspected(SurfaceRole, SourceInfo),
    TogglePlayPause,
    ToggleMute,
    ForcePlay,
    NudgeDivider(f64),
    DumpPipeline,
    Quit,
}

relm4::new_action_group!(WindowActionGroup, "win");
relm4::new_stateless_action!(Quit, WindowActionGroup, "quit");
relm4::new_stateless_action!(TogglePlayPause, WindowActionGroup, "toggle-play-pause");
relm4::new_stateless_action!(ToggleMute, WindowActionGroup, "toggle-mute");
relm4::new_stateless_action!(ForcePlay, WindowActionGroup, "force-play");
relm4::new_stateless_action!(DividerLeft, WindowActionGroup, "divider-left");
relm4::new_stateless_action!(DividerRight, WindowActionGroup, "divider-right");
relm4::new_stateless_action!(DumpPipeline, WindowActionGroup, "dump-pipeline");

#[relm4::component]
impl Component for App {
    type Init = AppInit;
    type Input = AppMsg;
    type Output = ();
    type CommandOutput = ();

    view! {
        #[root]
        #[name = "main_window"]
        adw::ApplicationWindow {
            set_default_size: (1280, 720),
            #[watch]
            set_title: Some(&format!("{APP_ID} ({:.0}%)", model.divider_position)),

            gtk::Box {
                set_orientation: gtk::Orientation::Vertical,

                adw::HeaderBar {
                    pack_start = &gtk::Button {
                        #[watch]
                        set_icon_name: if model.is_playing {
                            "media-playback-pause-symbolic"
                        } else {
                            "media-playback-start-symbolic"
                        },
                        connect_clicked => AppMsg::TogglePlayPause,
                    },
                    pack_start = &gtk::Button {
                        #[watch]
                        set_icon_name: if model.is_muted {
                            "audio-volume-muted-symbolic"
                        } else {
                            "audio-volume-high-symbolic"
                        },
                        #[watch]
                        set_sensitive: model.handle.is_some(),
                        connect_clicked => AppMsg::ToggleMute,
                    },
                },

                model.comparison_component.widget(),
            },
        }
    }

    // Initialize the component.
    fn init(app_init: Self::Init, root: Self::Root, sender: ComponentSender<Self>) -> ComponentParts<Self> {
        let app = relm4::main_adw_application();

        let comparison_component = ComparisonComponentModel::builder()
            .launch(ComparisonComponentInit {
                watch_sources: true,
                ..ComparisonComponentInit::new(app_init.sources)
            })
            .forward(sender.input_sender(), |msg| match msg {
                ComparisonComponentOutput::Initialized(x) => AppMsg::Initialized(x),
                ComparisonComponentOutput::PlayingChanged(x) => AppMsg::PlayingChanged(x),
                ComparisonComponentOutput::MutedChanged(x) => AppMsg::MutedChanged(x),
                ComparisonComponentOutput::DividerMoved(x) => AppMsg::DividerMoved(x),
                ComparisonComponentOutput::SourceInspected(role, info) => AppMsg::SourceInspected(role, info),
            });
        let handle = comparison_component.model().handle();

        let model = App {
            is_playing: comparison_component.model().is_playing(),
            is_muted: comparison_component.model().is_muted(),
            divider_position: comparison_component.model().divider_position().value(),
            comparison_component,
            handle,
        };

        {
            app.set_accelerators_for_action::<Quit>(&actions::accelerators(Accelerators::Quit));
            app.set_accelerators_for_action::<TogglePlayPause>(&actions::accelerators(Accelerators::TogglePlayPause));
            app.set_accelerators_for_action::<ToggleMute>(&actions::accelerators(Accelerators::ToggleMute));
            app.set_accelerators_for_action::<ForcePlay>(&actions::accelerators(Accelerators::ForcePlay));
            app.set_accelerators_for_action::<DividerLeft>(&actions::accelerators(Accelerators::DividerLeft));
            app.set_accelerators_for_action::<DividerRight>(&actions::accelerators(Accelerators::DividerRight));
            app.set_accelerators_for_action::<DumpPipeline>(&actions::accelerators(Accelerators::DumpPipeline));
        }

        // Generate the widgets based on the view! macro here
        let widgets = view_output!();

        {
            let mut action_group = RelmActionGroup::<WindowActionGroup>::new();
            action_group.add_action(RelmAction::<Quit>::new_stateless(clone!(
                #[strong]
                sender,
                move |_| sender.input(AppMsg::Quit)
            )));
            action_group.add_action(RelmAction::<TogglePlayPause>::new_stateless(clone!(
                #[strong]
                sender,
                move |_| sender.input(AppMsg::TogglePlayPause)
            )));
            action_group.add_action(RelmAction::<ToggleMute>::new_stateless(clone!(
                #[strong]
                sender,
                move |_| sender.input(AppMsg::ToggleMute)
            )));
            action_group.add_action(RelmAction::<ForcePlay>::new_stateless(clone!(
                #[strong]
                sender,
                move |_| sender.input(AppMsg::ForcePlay)
            )));
            action_group.add_action(RelmAction::<DividerLeft>::new_stateless(clone!(
                #[strong]
                sender,
                move |_| sender.input(AppMsg::NudgeDivider(-DIVIDER_KEY_STEP))
            )));
            action_group.add_action(RelmAction::<DividerRight>::new_stateless(clone!(
                #[strong]
                sender,
                move |_| sender.input(AppMsg::NudgeDivider(DIVIDER_KEY_STEP))
            )));
            action_group.add_action(RelmAction::<DumpPipeline>::new_stateless(clone!(
                #[strong]
                sender,
                move |_| sender.input(AppMsg::DumpPipeline)
            )));
            action_group.register_for_widget(&widgets.main_window);
        }

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, _sender: ComponentSender<Self>, root: &Self::Root) {
        match msg {
            AppMsg::Initialized(None) => debug!("Comparison player initialized"),
            AppMsg::Initialized(Some(error)) => error!("Comparison player failed to initialize: {error:?}"),
            AppMsg::PlayingChanged(playing) => self.is_playing = playing,
            AppMsg::MutedChanged(muted) => self.is_muted = muted,
            AppMsg::DividerMoved(position) => self.divider_position = position,
            AppMsg::SourceInspected(role, info) => {
                info!(
                    "{role} source {} duration={:?} dimensions={:?} audio={}",
                    info.uri, info.duration, info.dimensions, info.has_audio
                );
            }
            AppMsg::TogglePlayPause => {
                self.comparison_component
                    .sender()
                    .send(ComparisonComponentInput::TogglePlayback)
                    .unwrap_or_default();
            }
            AppMsg::ToggleMute => {
                if let Some(handle) = &self.handle {
                    let audible = handle.toggle_muted();
                    debug!("Toggled mute, audible={audible} muted={}", handle.query_muted());
                }
            }
            AppMsg::ForcePlay => {
                if let Some(handle) = &self.handle {
                    handle.force_play();
                }
            }
            AppMsg::NudgeDivider(delta) => {
                self.comparison_component
                    .sender()
                    .send(ComparisonComponentInput::NudgeDivider(delta))
                    .unwrap_or_default();
            }
            AppMsg::DumpPipeline => {
                debug!("Dump pipeline");
                self.comparison_component
                    .sender()
                    .send(ComparisonComponentInput::DumpPipeline(
                        chrono::Local::now().format("mxl_comparison_%Y-%m-%d_%H_%M_%S").to_string(),
                    ))
                    .unwrap_or_default();
            }
            AppMsg::Quit => root.close(),
        }
    }
}

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .try_init()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [background, foreground] = args.as_slice() else {
        bail!("Usage: comparison <background video> <foreground video>");
    };

    let tmp_dir = tempdir()?;
    let proc_dir = tmp_dir.path().join("proc");
    let cache_dir = tmp_dir.path().join("cache");

    glib_helpers::init_logging();
    glib::set_program_name(Some(APP_ID));
    mxl_comparison_player::init(&proc_dir, &cache_dir)?;

    let adw_app = adw::Application::new(Some(APP_ID), gio::ApplicationFlags::default());
    let app = RelmApp::from_app(adw_app);
    app.with_args(vec![]).run::<App>(AppInit {
        sources: ComparisonSources::new(background.as_str(), foreground.as_str()),
    });

    Ok(())
}
