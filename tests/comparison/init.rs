use mxl_comparison_player::comparison::{ComparisonController, ContainerBounds, GeometryProvider};

use super::mock::MockSurface;

pub const CONTAINER_LEFT: f64 = 100.0;
pub const CONTAINER_WIDTH: f64 = 800.0;

pub fn init() {
    // Every test calls this, only the first call installs the logger:
    env_logger::builder()
        .filter_level(log::LevelFilter::Trace)
        .is_test(true)
        .try_init()
        .unwrap_or_default();
}

pub fn fixed_geometry(left: f64, width: f64) -> GeometryProvider {
    Box::new(move || Some(ContainerBounds::new(left, width)))
}

/// Mounts a controller on two mock surfaces inside an 800 px wide container
/// starting at x = 100.
pub fn mount() -> (ComparisonController<MockSurface>, MockSurface, MockSurface) {
    init();
    let background = MockSurface::new();
    let foreground = MockSurface::new();
    let controller = ComparisonController::mount(
        background.clone(),
        foreground.clone(),
        fixed_geometry(CONTAINER_LEFT, CONTAINER_WIDTH),
    );
    (controller, background, foreground)
}

/// Pointer x coordinate at `percent` of the container width.
pub fn pointer_at(percent: f64) -> f64 {
    CONTAINER_LEFT + CONTAINER_WIDTH * percent / 100.0
}
