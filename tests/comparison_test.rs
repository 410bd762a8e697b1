use mxl_comparison_player::comparison::{
    ClickOrigin, ComparisonController, ComparisonHandle, ContainerBounds, ListenerScope, PointerTarget, SurfaceRole,
};
use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

mod comparison;

use comparison::{
    init::{fixed_geometry, init, mount, pointer_at},
    mock::{Call, MockSurface},
};

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

fn counting_scope(released: &Rc<Cell<usize>>) -> ListenerScope {
    let released = Rc::clone(released);
    ListenerScope::new(move || released.set(released.get() + 1))
}

#[test]
fn mount_mutes_and_requests_playback() {
    let (controller, background, foreground) = mount();

    assert!(controller.is_mounted());
    assert!(controller.is_playing());
    assert!(controller.is_muted());
    assert_eq!(controller.divider_position().value(), 50.0);
    assert_eq!(controller.mix_levels(), None);
    for surface in [&background, &foreground] {
        assert!(surface.state().muted);
        assert_eq!(surface.count(&Call::Play), 1);
    }
}

#[test]
fn rejected_autoplay_is_retried() {
    init();
    let background = MockSurface::new();
    let foreground = MockSurface::new();
    background.reject_play(true);
    foreground.reject_play(true);

    let mut controller =
        ComparisonController::mount(background.clone(), foreground.clone(), fixed_geometry(0.0, 640.0));
    assert!(controller.is_playing());
    assert!(!background.state().playing);

    background.reject_play(false);
    foreground.reject_play(false);
    controller.retry_autoplay();

    assert!(background.state().playing);
    assert!(foreground.state().playing);
    assert_eq!(background.count(&Call::Play), 2);
}

#[test]
fn retry_autoplay_respects_pause() {
    let (mut controller, background, _foreground) = mount();
    controller.toggle_playback();
    background.clear_calls();

    controller.retry_autoplay();

    assert_eq!(background.count(&Call::Play), 0);
}

#[test]
fn divider_position_is_clamped() {
    let (mut controller, _, _) = mount();

    assert_eq!(controller.set_divider_position(f64::NAN).value(), 50.0);
    assert_eq!(controller.set_divider_position(None::<f64>).value(), 50.0);
    assert_eq!(controller.set_divider_position(-10.0).value(), 0.0);
    assert_eq!(controller.set_divider_position(150.0).value(), 100.0);
    assert_eq!(controller.set_divider_position(Some(33.5)).value(), 33.5);
    assert_eq!(controller.divider_position().value(), 33.5);
}

#[test]
fn volumes_follow_divider_while_unmuted() {
    let (mut controller, background, foreground) = mount();
    controller.set_muted(false);

    for position in [0.0, 12.5, 50.0, 80.0, 100.0] {
        controller.set_divider_position(position);
        let background_volume = background.state().audible_gain();
        let foreground_volume = foreground.state().audible_gain();
        assert_close(background_volume + foreground_volume, 1.0);
        assert_close(foreground_volume, position / 100.0);
    }
}

#[test]
fn muted_surfaces_stay_silent() {
    let (mut controller, background, foreground) = mount();

    for position in [0.0, 25.0, 75.0, 100.0] {
        controller.set_divider_position(position);
        assert_eq!(background.state().audible_gain(), 0.0);
        assert_eq!(foreground.state().audible_gain(), 0.0);
    }
    assert_eq!(controller.mix_levels(), None);
}

#[test]
fn compare_two_sources() {
    let (mut controller, background, foreground) = mount();

    controller.set_muted(false);
    assert_close(background.state().audible_gain(), 0.5);
    assert_close(foreground.state().audible_gain(), 0.5);

    controller.set_divider_position(80.0);
    assert_close(foreground.state().audible_gain(), 0.8);
    assert_close(background.state().audible_gain(), 0.2);
    assert_close(controller.clip_region().revealed, 80.0);
    assert_close(controller.clip_region().inset_right, 20.0);
    assert_close(controller.clip_region().revealed_width(1000.0), 800.0);

    controller.set_muted(true);
    assert_eq!(background.state().audible_gain(), 0.0);
    assert_eq!(foreground.state().audible_gain(), 0.0);

    controller.set_divider_position(30.0);
    assert_eq!(foreground.state().audible_gain(), 0.0);

    controller.set_muted(false);
    assert_close(foreground.state().audible_gain(), 0.3);
    assert_close(background.state().audible_gain(), 0.7);
}

#[test]
fn click_after_drag_keeps_playback_state() {
    let (mut controller, _, _) = mount();
    assert!(controller.is_playing());

    assert!(controller.begin_drag(PointerTarget::Divider, pointer_at(50.0), ListenerScope::empty()));
    for percent in [55.0, 60.0, 65.0] {
        assert!(controller.continue_drag(pointer_at(percent)).is_some());
    }
    assert!(controller.end_drag());

    assert!(!controller.container_click(ClickOrigin::Surface));
    assert!(controller.is_playing());
    assert_close(controller.divider_position().value(), 65.0);
}

#[test]
fn click_during_drag_keeps_playback_state() {
    let (mut controller, _, _) = mount();

    controller.begin_drag(PointerTarget::Divider, pointer_at(50.0), ListenerScope::empty());
    assert!(!controller.container_click(ClickOrigin::Surface));
    assert!(controller.is_playing());
}

#[test]
fn click_toggles_once_per_click() {
    let (mut controller, background, foreground) = mount();

    controller.press(PointerTarget::Surface);
    assert!(controller.container_click(ClickOrigin::Surface));
    assert!(!controller.is_playing());
    assert!(!background.state().playing);
    assert!(!foreground.state().playing);

    controller.press(PointerTarget::Surface);
    assert!(controller.container_click(ClickOrigin::Surface));
    assert!(controller.is_playing());
    assert_eq!(background.count(&Call::Pause), 1);
}

#[test]
fn next_gesture_after_drag_toggles_again() {
    let (mut controller, _, _) = mount();

    controller.begin_drag(PointerTarget::Divider, pointer_at(50.0), ListenerScope::empty());
    controller.continue_drag(pointer_at(20.0));
    controller.end_drag();
    controller.container_click(ClickOrigin::Surface);

    controller.press(PointerTarget::Surface);
    assert!(controller.container_click(ClickOrigin::Surface));
    assert!(!controller.is_playing());
}

#[test]
fn divider_and_range_control_clicks_are_ignored() {
    let (mut controller, _, _) = mount();

    assert!(!controller.container_click(ClickOrigin::Divider));
    assert!(!controller.container_click(ClickOrigin::RangeControl));
    assert!(controller.is_playing());
}

#[test]
fn drag_only_starts_on_divider() {
    let (mut controller, _, _) = mount();
    let released = Rc::new(Cell::new(0));

    assert!(!controller.begin_drag(PointerTarget::Surface, pointer_at(10.0), counting_scope(&released)));
    assert!(!controller.is_dragging());
    assert_eq!(released.get(), 1);
    assert_eq!(controller.continue_drag(pointer_at(10.0)), None);
    assert!(!controller.end_drag());
    assert_close(controller.divider_position().value(), 50.0);
}

#[test]
fn drag_listeners_live_until_drag_end() {
    let (mut controller, _, _) = mount();
    let released = Rc::new(Cell::new(0));

    controller.begin_drag(PointerTarget::Divider, pointer_at(50.0), counting_scope(&released));
    controller.continue_drag(pointer_at(70.0));
    assert!(controller.is_dragging());
    assert_eq!(released.get(), 0);

    controller.end_drag();
    assert_eq!(released.get(), 1);
    controller.end_drag();
    assert_eq!(released.get(), 1);
}

#[test]
fn unmount_releases_drag_listeners() {
    let (mut controller, _, _) = mount();
    let released = Rc::new(Cell::new(0));

    controller.begin_drag(PointerTarget::Divider, pointer_at(50.0), counting_scope(&released));
    controller.unmount();

    assert_eq!(released.get(), 1);
    assert!(!controller.is_dragging());
}

#[test]
fn drag_beyond_container_clamps() {
    let (mut controller, _, _) = mount();

    controller.begin_drag(PointerTarget::Divider, pointer_at(50.0), ListenerScope::empty());
    assert_eq!(controller.continue_drag(pointer_at(-20.0)).map(|p| p.value()), Some(0.0));
    assert_eq!(controller.continue_drag(pointer_at(140.0)).map(|p| p.value()), Some(100.0));
}

#[test]
fn drag_without_geometry_uses_neutral_position() {
    init();
    let mut controller = ComparisonController::mount(MockSurface::new(), MockSurface::new(), Box::new(|| None::<ContainerBounds>));
    controller.set_divider_position(20.0);

    assert!(controller.begin_drag(PointerTarget::Divider, 400.0, ListenerScope::empty()));
    assert_eq!(controller.divider_position().value(), 50.0);
}

#[test]
fn drag_follows_container_resize() {
    init();
    let bounds = Rc::new(Cell::new(ContainerBounds::new(100.0, 800.0)));
    let geometry = Rc::clone(&bounds);
    let mut controller =
        ComparisonController::mount(MockSurface::new(), MockSurface::new(), Box::new(move || Some(geometry.get())));

    assert!(controller.begin_drag(PointerTarget::Divider, 500.0, ListenerScope::empty()));
    assert_close(controller.divider_position().value(), 50.0);

    bounds.set(ContainerBounds::new(300.0, 800.0));
    assert_close(controller.continue_drag(500.0).map(|p| p.value()).unwrap_or(-1.0), 25.0);

    bounds.set(ContainerBounds::new(300.0, 400.0));
    assert_close(controller.continue_drag(500.0).map(|p| p.value()).unwrap_or(-1.0), 50.0);

    controller.end_drag();
    assert_close(controller.divider_position().value(), 50.0);
}

#[test]
fn unmute_requests_playback() {
    let (mut controller, background, _) = mount();
    controller.toggle_playback();
    assert!(!controller.is_playing());
    background.clear_calls();

    controller.set_muted(false);

    assert!(controller.is_playing());
    assert_eq!(background.count(&Call::Play), 1);
    assert!(!background.state().muted);
}

#[test]
fn repeated_unmute_keeps_pause() {
    let (mut controller, background, foreground) = mount();
    controller.set_muted(false);
    controller.toggle_playback();
    assert!(!controller.is_playing());
    background.clear_calls();
    foreground.clear_calls();

    controller.set_muted(false);

    assert!(!controller.is_playing());
    assert!(!controller.is_muted());
    assert_eq!(background.count(&Call::Play), 0);
    assert_eq!(foreground.count(&Call::Play), 0);
}

#[test]
fn background_leads_playback_position() {
    let (mut controller, background, foreground) = mount();

    foreground.set_position(Some(10.2));
    assert_eq!(controller.on_position_update(SurfaceRole::Background, 10.0), Some(10.0));
    assert_eq!(foreground.seeks(), vec![10.0]);

    foreground.clear_calls();
    foreground.set_position(Some(10.05));
    assert_eq!(controller.on_position_update(SurfaceRole::Background, 10.0), None);
    assert!(foreground.seeks().is_empty());

    foreground.set_position(Some(3.0));
    assert_eq!(controller.on_position_update(SurfaceRole::Foreground, 3.0), None);
    assert!(foreground.seeks().is_empty());
    assert!(background.seeks().is_empty());
}

#[test]
fn unknown_foreground_position_is_not_corrected() {
    let (mut controller, _, foreground) = mount();
    foreground.set_position(None);

    assert_eq!(controller.on_position_update(SurfaceRole::Background, 4.0), None);
    assert!(foreground.seeks().is_empty());
}

#[test]
fn end_of_stream_loops_surface() {
    let (mut controller, background, foreground) = mount();
    foreground.clear_calls();

    controller.on_end_of_stream(SurfaceRole::Foreground);
    assert_eq!(foreground.seeks(), vec![0.0]);
    assert_eq!(foreground.count(&Call::Play), 1);
    assert!(background.seeks().is_empty());

    controller.toggle_playback();
    background.clear_calls();
    controller.on_end_of_stream(SurfaceRole::Background);
    assert_eq!(background.seeks(), vec![0.0]);
    assert_eq!(background.count(&Call::Play), 0);
}

#[test]
fn reload_keeps_audio_state() {
    let (mut controller, _, foreground) = mount();
    controller.set_muted(false);
    controller.set_divider_position(80.0);
    foreground.clear_calls();

    controller.reload_source(SurfaceRole::Foreground, "file:///media/after.mp4");

    let state = foreground.state();
    assert_eq!(state.uri.as_deref(), Some("file:///media/after.mp4"));
    assert!(!state.muted);
    assert_close(state.audible_gain(), 0.8);
    assert_eq!(state.calls.iter().filter(|c| **c == Call::Play).count(), 1);
}

#[test]
fn unmounted_controller_ignores_commands() {
    let (mut controller, background, foreground) = mount();
    controller.unmount();
    assert!(!controller.is_mounted());
    assert!(controller.surface(SurfaceRole::Background).is_none());
    assert_eq!(background.count(&Call::Stop), 1);
    assert_eq!(foreground.count(&Call::Stop), 1);
    background.clear_calls();
    foreground.clear_calls();

    assert!(controller.toggle_playback());
    controller.set_muted(false);
    assert!(controller.is_muted());
    controller.force_play();
    assert!(!controller.begin_drag(PointerTarget::Divider, pointer_at(50.0), ListenerScope::empty()));
    assert_eq!(controller.on_position_update(SurfaceRole::Background, 1.0), None);
    controller.on_end_of_stream(SurfaceRole::Foreground);
    controller.reload_source(SurfaceRole::Background, "file:///media/other.mp4");
    controller.unmount();

    assert!(background.state().calls.is_empty());
    assert!(foreground.state().calls.is_empty());
}

#[test]
fn drop_stops_surfaces_once() {
    let (mut controller, background, foreground) = mount();
    controller.unmount();
    drop(controller);

    assert_eq!(background.count(&Call::Stop), 1);
    assert_eq!(foreground.count(&Call::Stop), 1);
}

#[test]
fn handle_toggles_and_queries_mute() {
    let (controller, background, _) = mount();
    let notified = Rc::new(Cell::new(0));
    let handle = ComparisonHandle::new(Rc::new(RefCell::new(controller))).with_notifier({
        let notified = Rc::clone(&notified);
        move || notified.set(notified.get() + 1)
    });

    assert!(handle.query_muted());
    assert!(handle.toggle_muted());
    assert!(!handle.query_muted());
    assert!(!background.state().muted);

    assert!(!handle.toggle_muted());
    assert!(handle.query_muted());
    assert!(background.state().muted);

    handle.set_muted(false);
    assert!(!handle.query_muted());
    assert_eq!(notified.get(), 3);
}

#[test]
fn handle_force_play_resumes_paused_player() {
    let (mut controller, background, foreground) = mount();
    controller.toggle_playback();
    let controller = Rc::new(RefCell::new(controller));
    let handle = ComparisonHandle::new(Rc::clone(&controller));

    handle.clone().force_play();

    assert!(controller.borrow().is_playing());
    assert!(background.state().playing);
    assert!(foreground.state().playing);
}
