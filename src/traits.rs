//! Common traits for cross-platform window components
//!
//! These traits isolate every platform-specific call behind one capability
//! set, so the hit-test resolver, state tracker and shadow logic stay pure and
//! can be driven by synthetic events in tests.

use crate::child::ChildMessage;
use crate::geometry::Rect;
use crate::native::{NativeEvent, Placement};
use crate::shadow::paint::ShadowFrame;
use crate::state::ShowState;

/// Source of the window's actual placement (normal/minimized/maximized)
pub trait PlacementSource {
    /// Query the platform for the real placement instead of trusting event
    /// payloads, which under-report on some platforms.
    fn query_actual_window_placement(&self) -> anyhow::Result<Placement>;
}

/// Main native window - the frame the custom chrome lives in
pub trait NativeWindow: PlacementSource {
    /// Current frame rectangle (x, y, width, height) in physical pixels
    fn frame_geometry(&self) -> Rect;

    /// Move and resize the frame
    fn set_frame_geometry(&mut self, rect: Rect);

    /// Ask the platform to minimize/maximize/restore/full-screen the window
    fn apply_show_state(&mut self, state: ShowState);

    fn set_visible(&mut self, visible: bool);

    fn is_visible(&self) -> bool;

    /// Native title (taskbar, Alt-Tab); the drawn title is the title bar's job
    fn set_title(&mut self, title: &str);

    /// Physical pixels per logical pixel for the window's monitor
    fn pixel_ratio(&self) -> f64;

    /// Get platform-specific window handle (0 when there is none)
    fn handle_value(&self) -> isize;

    /// Destroy the native window (cleanup before drop)
    fn destroy(&mut self);
}

/// Stream of native events, pumped by the host message loop
pub trait NativeEventSource {
    /// Next pending event, or None when the queue is drained
    fn next_event(&mut self) -> Option<NativeEvent>;
}

/// Shadow companion window - borderless, click-through, never activated
pub trait ShadowSurface {
    /// Move and resize the shadow frame
    fn set_geometry(&mut self, rect: Rect);

    fn set_visible(&mut self, visible: bool);

    /// Upload a fully composited shadow frame
    fn present(&mut self, frame: &ShadowFrame);

    /// Keep the shadow directly below its owner in z-order
    fn stack_below_owner(&mut self);

    /// Destroy the shadow window (cleanup before drop)
    fn destroy(&mut self);
}

/// Embedded native child window hosted inside the frame
pub trait ChildSurface {
    /// Move and resize the child to the frame's client area
    fn set_geometry(&mut self, rect: Rect);

    /// Re-post a message the child must not consume to the logical parent
    fn post_to_parent(&mut self, message: &ChildMessage);

    /// Destroy the child window (cleanup before drop)
    fn destroy(&mut self);
}
