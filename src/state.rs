//! Window state tracker
//!
//! Small state machine over {Normal, Minimized, Maximized, FullScreen} x
//! {Active, Inactive}, fed by native notifications and explicit requests.
//! Maximized/restored detection queries the platform placement instead of
//! trusting event payloads.

use serde::{Deserialize, Serialize};

use crate::native::NativeEvent;
use crate::traits::PlacementSource;

/// Window show state. Maximized and FullScreen are exclusive by construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShowState {
    #[default]
    Normal,
    Minimized,
    Maximized,
    FullScreen,
}

impl std::fmt::Display for ShowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            ShowState::Normal => "Normal",
            ShowState::Minimized => "Minimized",
            ShowState::Maximized => "Maximized",
            ShowState::FullScreen => "FullScreen",
        };
        write!(f, "{}", value)
    }
}

/// Logical window state. A minimized window is never active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WindowState {
    show: ShowState,
    active: bool,
}

impl WindowState {
    pub fn new(show: ShowState, active: bool) -> Self {
        Self {
            show,
            active: active && show != ShowState::Minimized,
        }
    }

    pub fn show_state(&self) -> ShowState {
        self.show
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_minimized(&self) -> bool {
        self.show == ShowState::Minimized
    }

    pub fn is_maximized(&self) -> bool {
        self.show == ShowState::Maximized
    }

    pub fn is_full_screen(&self) -> bool {
        self.show == ShowState::FullScreen
    }

    /// States in which the drop shadow may be visible
    pub fn allows_shadow(&self) -> bool {
        self.show == ShowState::Normal
    }
}

/// Delta produced by one transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub previous: WindowState,
    pub current: WindowState,
}

impl StateChange {
    pub fn active_changed(&self) -> bool {
        self.previous.active != self.current.active
    }

    pub fn show_changed(&self) -> bool {
        self.previous.show != self.current.show
    }
}

/// Tracks the logical state of one window
#[derive(Debug, Default)]
pub struct StateTracker {
    state: WindowState,
}

impl StateTracker {
    /// Created Normal and inactive
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    /// Apply a native notification.
    ///
    /// Returns the delta, or None when the event leaves the logical state
    /// untouched (including unknown events and repeated activations).
    pub fn on_native_event(
        &mut self,
        event: &NativeEvent,
        placement: &dyn PlacementSource,
    ) -> Option<StateChange> {
        let current = self.state;
        match event {
            NativeEvent::Activate => self.transition(current.show, true),
            NativeEvent::Deactivate => self.transition(current.show, false),
            NativeEvent::Show | NativeEvent::Resize { .. } => {
                let placed = actual_show_state(placement);
                // Placement cannot express full-screen; only a minimize or
                // maximize reported by it leaves that state.
                let show = if current.show == ShowState::FullScreen && placed == ShowState::Normal
                {
                    ShowState::FullScreen
                } else {
                    placed
                };
                self.transition(show, current.active)
            }
            NativeEvent::StateChanged(ShowState::FullScreen) => {
                self.transition(ShowState::FullScreen, current.active)
            }
            NativeEvent::StateChanged(_) => {
                let show = actual_show_state(placement);
                self.transition(show, current.active)
            }
            _ => None,
        }
    }

    /// Apply an explicit show request from the API
    pub fn request(&mut self, show: ShowState) -> Option<StateChange> {
        let active = self.state.active;
        self.transition(show, active)
    }

    /// Apply an explicit activation change from the API
    pub fn set_active(&mut self, active: bool) -> Option<StateChange> {
        let show = self.state.show;
        self.transition(show, active)
    }

    fn transition(&mut self, show: ShowState, active: bool) -> Option<StateChange> {
        let next = WindowState::new(show, active);
        if next == self.state {
            return None;
        }
        let change = StateChange {
            previous: self.state,
            current: next,
        };
        tracing::debug!(
            from = %change.previous.show,
            to = %change.current.show,
            active = change.current.active,
            "Window state transition"
        );
        self.state = next;
        Some(change)
    }
}

/// Show state from the platform placement; a failed query counts as a
/// normal, non-minimized window.
pub fn actual_show_state(placement: &dyn PlacementSource) -> ShowState {
    match placement.query_actual_window_placement() {
        Ok(p) => p.show,
        Err(e) => {
            tracing::warn!(error = %e, "Window placement query failed, assuming normal");
            ShowState::Normal
        }
    }
}
