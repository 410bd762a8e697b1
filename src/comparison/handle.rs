use std::{cell::RefCell, fmt, rc::Rc};

use super::{controller::ComparisonController, surface::MediaSurface};

/// Imperative audio controls a host holds for a mounted comparison player.
///
/// Every command is applied synchronously; the optional notifier lets the
/// owning component refresh its view afterwards.
pub struct ComparisonHandle<S: MediaSurface> {
    controller: Rc<RefCell<ComparisonController<S>>>,
    notifier: Option<Rc<dyn Fn()>>,
}

impl<S: MediaSurface> ComparisonHandle<S> {
    pub fn new(controller: Rc<RefCell<ComparisonController<S>>>) -> Self {
        Self {
            controller,
            notifier: None,
        }
    }

    pub fn with_notifier(mut self, notifier: impl Fn() + 'static) -> Self {
        self.notifier = Some(Rc::new(notifier));
        self
    }

    /// Flips the mute state; returns `true` when audio is now audible.
    pub fn toggle_muted(&self) -> bool {
        let audible = self.controller.borrow_mut().toggle_muted();
        self.notify();
        audible
    }

    pub fn set_muted(&self, muted: bool) {
        self.controller.borrow_mut().set_muted(muted);
        self.notify();
    }

    pub fn query_muted(&self) -> bool {
        self.controller.borrow().is_muted()
    }

    /// Must be called from a user gesture handler to unlock audible playback.
    pub fn force_play(&self) {
        self.controller.borrow_mut().force_play();
        self.notify();
    }

    fn notify(&self) {
        if let Some(notifier) = &self.notifier {
            notifier();
        }
    }
}

impl<S: MediaSurface> Clone for ComparisonHandle<S> {
    fn clone(&self) -> Self {
        Self {
            controller: Rc::clone(&self.controller),
            notifier: self.notifier.clone(),
        }
    }
}

impl<S: MediaSurface> fmt::Debug for ComparisonHandle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComparisonHandle")
            .field("muted", &self.controller.try_borrow().map(|c| c.is_muted()).ok())
            .finish()
    }
}
