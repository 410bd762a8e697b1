use anyhow::{bail, Result};
use mxl_comparison_player::comparison::MediaSurface;
use std::{
    cell::{Ref, RefCell},
    rc::Rc,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Play,
    Pause,
    Stop,
    Seek(f64),
    SetVolume(f64),
    SetMuted(bool),
    SetUri(String),
}

#[derive(Debug, Default)]
pub struct MockState {
    pub calls: Vec<Call>,
    pub playing: bool,
    pub muted: bool,
    pub volume: Option<f64>,
    pub position: Option<f64>,
    pub uri: Option<String>,
    pub reject_play: bool,
}

impl MockState {
    /// Gain that reaches the speakers.
    pub fn audible_gain(&self) -> f64 {
        if self.muted {
            0.0
        } else {
            self.volume.unwrap_or(1.0)
        }
    }
}

/// Records every call and shares its state between clones, so a test keeps
/// one clone while the controller owns the other.
#[derive(Debug, Clone, Default)]
pub struct MockSurface {
    state: Rc<RefCell<MockState>>,
}

impl MockSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Ref<'_, MockState> {
        self.state.borrow()
    }

    /// Simulates an autoplay policy that denies play requests.
    pub fn reject_play(&self, reject: bool) {
        self.state.borrow_mut().reject_play = reject;
    }

    pub fn set_position(&self, position: Option<f64>) {
        self.state.borrow_mut().position = position;
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn count(&self, call: &Call) -> usize {
        self.state.borrow().calls.iter().filter(|c| *c == call).count()
    }

    pub fn seeks(&self) -> Vec<f64> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::Seek(to) => Some(*to),
                _ => None,
            })
            .collect()
    }
}

impl MediaSurface for MockSurface {
    fn play(&self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::Play);
        if state.reject_play {
            bail!("Play request denied");
        }
        state.playing = true;
        Ok(())
    }

    fn pause(&self) {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::Pause);
        state.playing = false;
    }

    fn stop(&self) {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::Stop);
        state.playing = false;
    }

    fn position(&self) -> Option<f64> {
        self.state.borrow().position
    }

    fn seek(&self, to: f64) {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::Seek(to));
        state.position = Some(to);
    }

    fn set_volume(&self, volume: f64) {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::SetVolume(volume));
        state.volume = Some(volume);
    }

    fn set_muted(&self, muted: bool) {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::SetMuted(muted));
        state.muted = muted;
    }

    fn set_uri(&self, uri: &str) {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::SetUri(uri.to_owned()));
        state.uri = Some(uri.to_owned());
    }
}
