//! X11 window-manager integration
//!
//! X11 has no non-client hit-test message. A frameless client starts moves
//! and resizes itself by sending `_NET_WM_MOVERESIZE` to the root window on a
//! button press, and learns about state changes from configure, focus, map
//! and `_NET_WM_STATE` notifications. The host owns the X connection; this
//! module decodes what it receives into [`NativeEvent`]s and tells it which
//! request to send back.

use std::collections::VecDeque;

use crate::controller::FramelessWindow;
use crate::geometry::{Point, Rect};
use crate::hit_test::{HitRegion, ResizeEdge};
use crate::native::{NativeEvent, Placement};
use crate::state::ShowState;
use crate::title_bar::{CaptionButtonKind, TitleBarCommand};
use crate::traits::NativeEventSource;

/// `_NET_WM_MOVERESIZE` directions (EWMH 1.5)
pub mod direction {
    pub const SIZE_TOPLEFT: u32 = 0;
    pub const SIZE_TOP: u32 = 1;
    pub const SIZE_TOPRIGHT: u32 = 2;
    pub const SIZE_RIGHT: u32 = 3;
    pub const SIZE_BOTTOMRIGHT: u32 = 4;
    pub const SIZE_BOTTOM: u32 = 5;
    pub const SIZE_BOTTOMLEFT: u32 = 6;
    pub const SIZE_LEFT: u32 = 7;
    pub const MOVE: u32 = 8;
}

/// Move/resize direction for a region, or None when the press belongs to the
/// client
pub fn moveresize_direction(region: HitRegion) -> Option<u32> {
    use self::direction::*;
    match region {
        HitRegion::Caption => Some(MOVE),
        HitRegion::ResizeBorder(edge) => Some(match edge {
            ResizeEdge::TopLeft => SIZE_TOPLEFT,
            ResizeEdge::Top => SIZE_TOP,
            ResizeEdge::TopRight => SIZE_TOPRIGHT,
            ResizeEdge::Right => SIZE_RIGHT,
            ResizeEdge::BottomRight => SIZE_BOTTOMRIGHT,
            ResizeEdge::Bottom => SIZE_BOTTOM,
            ResizeEdge::BottomLeft => SIZE_BOTTOMLEFT,
            ResizeEdge::Left => SIZE_LEFT,
        }),
        HitRegion::Client | HitRegion::CaptionButton | HitRegion::Transparent => None,
    }
}

/// What a primary-button press on the frame should turn into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressAction {
    /// Ungrab the pointer and send `_NET_WM_MOVERESIZE` with this direction
    MoveResize { direction: u32, root: Point },
    /// Caption button; run the command on release
    Command(TitleBarCommand),
    /// Deliver to the client as usual
    PassThrough,
}

/// Classify a button press at a root-window point
pub fn press_action(window: &FramelessWindow, root: Point) -> PressAction {
    let region = window.handle_hit_test(root);
    if let Some(direction) = moveresize_direction(region) {
        return PressAction::MoveResize { direction, root };
    }
    if region != HitRegion::CaptionButton {
        return PressAction::PassThrough;
    }
    match window.caption_button_at(root) {
        Some(CaptionButtonKind::Minimize) => PressAction::Command(TitleBarCommand::Minimize),
        Some(CaptionButtonKind::Maximize) | Some(CaptionButtonKind::Restore) => {
            PressAction::Command(TitleBarCommand::ToggleMaximize)
        }
        Some(CaptionButtonKind::Close) => PressAction::Command(TitleBarCommand::Close),
        None => PressAction::PassThrough,
    }
}

/// `_NET_WM_STATE` atoms present on the window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetWmState {
    pub hidden: bool,
    pub maximized_vert: bool,
    pub maximized_horz: bool,
    pub fullscreen: bool,
}

impl NetWmState {
    /// Placement-level state. Full-screen reads as Normal, like every other
    /// platform placement; half-maximized (tiled) windows are Normal too.
    pub fn show_state(&self) -> ShowState {
        if self.hidden {
            ShowState::Minimized
        } else if self.maximized_vert && self.maximized_horz && !self.fullscreen {
            ShowState::Maximized
        } else {
            ShowState::Normal
        }
    }

    /// Placement for a host-side `PlacementSource`
    pub fn placement(&self, normal_geometry: Rect) -> Placement {
        Placement {
            show: self.show_state(),
            normal_geometry,
        }
    }
}

/// Window-manager notification, decoded by the host's X connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XNotify {
    /// `ConfigureNotify` in root coordinates
    Configure(Rect),
    FocusIn,
    FocusOut,
    Map,
    Unmap,
    /// `PropertyNotify` on `_NET_WM_STATE`
    NetWmState(NetWmState),
    /// `WM_PROTOCOLS` client message carrying `WM_DELETE_WINDOW`
    DeleteWindow,
    /// Anything else, by X event code
    Other(u8),
}

/// Turns X notifications into [`NativeEvent`]s.
///
/// A single `ConfigureNotify` carries both position and size; only the parts
/// that changed since the last one become events.
#[derive(Debug, Default)]
pub struct XEventTranslator {
    last_frame: Option<Rect>,
    last_state: Option<ShowState>,
    events: VecDeque<NativeEvent>,
}

impl XEventTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with the frame the window was created at
    pub fn with_frame(frame: Rect) -> Self {
        Self {
            last_frame: Some(frame),
            ..Self::default()
        }
    }

    pub fn push(&mut self, notify: XNotify) {
        match notify {
            XNotify::Configure(frame) => {
                let last = self.last_frame.replace(frame);
                let moved = last.map_or(true, |r| r.position() != frame.position());
                let resized =
                    last.map_or(true, |r| r.width != frame.width || r.height != frame.height);
                if moved {
                    self.events.push_back(NativeEvent::Move {
                        x: frame.x,
                        y: frame.y,
                    });
                }
                if resized {
                    self.events.push_back(NativeEvent::Resize {
                        width: frame.width,
                        height: frame.height,
                    });
                }
            }
            XNotify::FocusIn => self.events.push_back(NativeEvent::Activate),
            XNotify::FocusOut => self.events.push_back(NativeEvent::Deactivate),
            XNotify::Map => self.events.push_back(NativeEvent::Show),
            XNotify::Unmap => self.events.push_back(NativeEvent::Hide),
            XNotify::NetWmState(state) => {
                let show = state.show_state();
                if self.last_state.replace(show) != Some(show) {
                    self.events.push_back(NativeEvent::StateChanged(show));
                }
            }
            XNotify::DeleteWindow => self.events.push_back(NativeEvent::CloseRequested),
            XNotify::Other(code) => {
                tracing::trace!(code, "Ignoring X event");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl NativeEventSource for XEventTranslator {
    fn next_event(&mut self) -> Option<NativeEvent> {
        self.events.pop_front()
    }
}
