use log::*;
use std::fmt;

use super::divider::DividerPosition;

/// Half width in pixels of the grab zone around the divider line.
pub const DIVIDER_GRAB_RADIUS: f64 = 16.0;

/// Horizontal extent of the comparison container, in the same coordinate
/// space as the pointer positions fed to the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerBounds {
    pub left: f64,
    pub width: f64,
}

impl ContainerBounds {
    pub fn new(left: f64, width: f64) -> Self {
        Self { left, width }
    }

    pub fn is_valid(&self) -> bool {
        self.left.is_finite() && self.width.is_finite() && self.width > 0.0
    }

    /// Divider position under `pointer_x`.
    pub fn position_at(&self, pointer_x: f64) -> DividerPosition {
        if !self.is_valid() {
            return DividerPosition::default();
        }
        DividerPosition::new((pointer_x - self.left) / self.width * 100.0)
    }

    pub fn divider_x(&self, position: DividerPosition) -> f64 {
        self.left + position.offset_in(self.width)
    }
}

/// Divider position for a pointer, falling back to the neutral default when
/// the container has no usable geometry yet.
pub fn position_for_pointer(bounds: Option<ContainerBounds>, pointer_x: f64) -> DividerPosition {
    match bounds {
        Some(bounds) => bounds.position_at(pointer_x),
        None => {
            trace!("No container geometry available, use neutral divider position");
            DividerPosition::default()
        }
    }
}

/// What a pointer press landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    Divider,
    Surface,
}

impl PointerTarget {
    pub fn resolve(bounds: Option<ContainerBounds>, position: DividerPosition, pointer_x: f64) -> Self {
        match bounds {
            Some(bounds) if bounds.is_valid() => {
                if (pointer_x - bounds.divider_x(position)).abs() <= DIVIDER_GRAB_RADIUS {
                    PointerTarget::Divider
                } else {
                    PointerTarget::Surface
                }
            }
            _ => PointerTarget::Surface,
        }
    }
}

/// Origin of a click delivered to the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOrigin {
    Surface,
    Divider,
    /// The accessibility range control, which updates the divider on its own.
    RangeControl,
}

/// Registration of listeners that live only as long as a drag.
///
/// The release action runs exactly once: on [`ListenerScope::release`] or
/// when the scope is dropped.
#[derive(Default)]
pub struct ListenerScope {
    release: Option<Box<dyn FnOnce()>>,
}

impl ListenerScope {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A scope without any registered listeners.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }

    pub fn release(&mut self) {
        if let Some(release) = self.release.take() {
            trace!("Release drag listeners");
            release();
        }
    }
}

impl Drop for ListenerScope {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for ListenerScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerScope")
            .field("active", &self.is_active())
            .finish()
    }
}

#[derive(Debug)]
pub(crate) struct DragSession {
    pub(crate) moves: usize,
    _listeners: ListenerScope,
}

impl DragSession {
    pub(crate) fn new(listeners: ListenerScope) -> Self {
        Self {
            moves: 0,
            _listeners: listeners,
        }
    }
}

/// Per gesture bookkeeping that keeps drag and click apart.
///
/// A drag marks the current gesture; the click that concludes it is
/// swallowed. A press outside the divider starts a fresh gesture.
#[derive(Debug, Default)]
pub(crate) struct GestureTracker {
    drag_in_gesture: bool,
}

impl GestureTracker {
    pub(crate) fn press(&mut self) {
        self.drag_in_gesture = false;
    }

    pub(crate) fn drag_started(&mut self) {
        self.drag_in_gesture = true;
    }

    /// Consumes the drag marker; `true` when the click belongs to a drag.
    pub(crate) fn take_drag(&mut self) -> bool {
        std::mem::take(&mut self.drag_in_gesture)
    }
}
