//! Platform-specific native window integration
//!
//! Native messages are translated into [`NativeEvent`]s; everything the core
//! needs from the platform goes through the traits in [`crate::traits`].
//! The headless backend is available everywhere and drives tests and the demo.
//! Raw Win32 messages are decided in [`wndproc`] and X11 notifications in
//! [`x11`]; both are plain code so they build and test on every host.

use crate::geometry::Rect;
use crate::state::ShowState;
use crate::title_bar::Theme;

pub mod headless;
pub mod wndproc;
pub mod x11;

#[cfg(target_os = "windows")]
pub mod windows;

/// Platform-neutral native notification
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NativeEvent {
    Activate,
    Deactivate,
    Show,
    Hide,
    /// Frame moved; new top-left in screen pixels
    Move { x: i32, y: i32 },
    /// Frame resized; new size in physical pixels
    Resize { width: i32, height: i32 },
    /// Platform reported a show-state change (payload is advisory)
    StateChanged(ShowState),
    /// Monitor DPI changed
    DpiChanged { dpi: u32 },
    /// System light/dark theme changed
    ThemeChanged(Theme),
    /// Interactive move/resize loop started
    EnterSizeMove,
    /// Interactive move/resize loop finished
    ExitSizeMove,
    /// User or system asked the window to close
    CloseRequested,
    /// Anything else, identified by its raw message id
    Other(u32),
}

/// Actual window placement as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Normal, Minimized or Maximized (platforms do not report full-screen)
    pub show: ShowState,
    /// Frame the window restores to
    pub normal_geometry: Rect,
}
