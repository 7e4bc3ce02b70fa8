//! Window-procedure dispatch
//!
//! Decides how a frameless window answers raw `(msg, wparam, lparam)`
//! messages. The decisions are platform-neutral so they can be driven from
//! tests; the Win32 backend only applies the returned [`Reply`] to the
//! structures behind the message's pointers.

use std::collections::VecDeque;

use crate::child::{ChildDisposition, ChildMessage};
use crate::config;
use crate::controller::FramelessWindow;
use crate::geometry::{MarginModel, Point, Rect};
use crate::hit_test::{HitRegion, ResizeEdge};
use crate::native::NativeEvent;
use crate::state::ShowState;
use crate::title_bar::CaptionButtonKind;
use crate::traits::NativeEventSource;

/// Window message ids
pub mod msg {
    pub const WM_CREATE: u32 = 0x0001;
    pub const WM_DESTROY: u32 = 0x0002;
    pub const WM_MOVE: u32 = 0x0003;
    pub const WM_SIZE: u32 = 0x0005;
    pub const WM_ACTIVATE: u32 = 0x0006;
    pub const WM_CLOSE: u32 = 0x0010;
    pub const WM_SHOWWINDOW: u32 = 0x0018;
    pub const WM_GETMINMAXINFO: u32 = 0x0024;
    pub const WM_CONTEXTMENU: u32 = 0x007B;
    pub const WM_NCCALCSIZE: u32 = 0x0083;
    pub const WM_NCHITTEST: u32 = 0x0084;
    pub const WM_SYSKEYDOWN: u32 = 0x0104;
    pub const WM_SYSKEYUP: u32 = 0x0105;
    pub const WM_SYSCHAR: u32 = 0x0106;
    pub const WM_SYSCOMMAND: u32 = 0x0112;
    pub const WM_PARENTNOTIFY: u32 = 0x0210;
    pub const WM_ENTERSIZEMOVE: u32 = 0x0231;
    pub const WM_EXITSIZEMOVE: u32 = 0x0232;
    pub const WM_DPICHANGED: u32 = 0x02E0;

    pub const WA_INACTIVE: u32 = 0;
    pub const SIZE_MINIMIZED: u32 = 1;
    pub const SIZE_MAXIMIZED: u32 = 2;
}

/// `WM_NCHITTEST` answers
pub mod ht {
    pub const HTTRANSPARENT: isize = -1;
    pub const HTCLIENT: isize = 1;
    pub const HTCAPTION: isize = 2;
    pub const HTMINBUTTON: isize = 8;
    pub const HTMAXBUTTON: isize = 9;
    pub const HTLEFT: isize = 10;
    pub const HTRIGHT: isize = 11;
    pub const HTTOP: isize = 12;
    pub const HTTOPLEFT: isize = 13;
    pub const HTTOPRIGHT: isize = 14;
    pub const HTBOTTOM: isize = 15;
    pub const HTBOTTOMLEFT: isize = 16;
    pub const HTBOTTOMRIGHT: isize = 17;
    pub const HTCLOSE: isize = 20;
}

fn loword(value: usize) -> u32 {
    (value & 0xFFFF) as u32
}

fn hiword(value: usize) -> u32 {
    ((value >> 16) & 0xFFFF) as u32
}

/// Signed screen point packed into an LPARAM
pub fn point_from_lparam(lparam: isize) -> Point {
    let x = (lparam & 0xFFFF) as u16 as i16 as i32;
    let y = ((lparam >> 16) & 0xFFFF) as u16 as i16 as i32;
    Point::new(x, y)
}

pub fn lparam_from_point(p: Point) -> isize {
    let x = p.x as i16 as u16 as isize;
    let y = p.y as i16 as u16 as isize;
    x | (y << 16)
}

/// Translate a top-level window message
pub fn translate_message(msg: u32, wparam: usize, lparam: isize) -> NativeEvent {
    use self::msg::*;
    match msg {
        WM_ACTIVATE => {
            if loword(wparam) == WA_INACTIVE {
                NativeEvent::Deactivate
            } else {
                NativeEvent::Activate
            }
        }
        WM_SHOWWINDOW => {
            if wparam != 0 {
                NativeEvent::Show
            } else {
                NativeEvent::Hide
            }
        }
        WM_MOVE => {
            let p = point_from_lparam(lparam);
            NativeEvent::Move { x: p.x, y: p.y }
        }
        WM_SIZE => match wparam as u32 {
            SIZE_MINIMIZED => NativeEvent::StateChanged(ShowState::Minimized),
            SIZE_MAXIMIZED => NativeEvent::StateChanged(ShowState::Maximized),
            _ => NativeEvent::Resize {
                width: loword(lparam as usize) as i32,
                height: hiword(lparam as usize) as i32,
            },
        },
        WM_DPICHANGED => NativeEvent::DpiChanged {
            dpi: loword(wparam),
        },
        WM_ENTERSIZEMOVE => NativeEvent::EnterSizeMove,
        WM_EXITSIZEMOVE => NativeEvent::ExitSizeMove,
        WM_CLOSE => NativeEvent::CloseRequested,
        other => NativeEvent::Other(other),
    }
}

/// Translate a message received by the embedded child
pub fn translate_child_message(msg: u32, wparam: usize, lparam: isize) -> ChildMessage {
    use self::msg::*;
    match msg {
        WM_NCHITTEST => ChildMessage::HitTest(point_from_lparam(lparam)),
        WM_SYSKEYDOWN => ChildMessage::SysKeyDown(wparam as u32),
        WM_SYSKEYUP => ChildMessage::SysKeyUp(wparam as u32),
        WM_SYSCHAR => ChildMessage::SysChar(wparam as u32),
        WM_SYSCOMMAND => ChildMessage::SysCommand(wparam as u32),
        WM_CONTEXTMENU => ChildMessage::ContextMenu(point_from_lparam(lparam)),
        WM_PARENTNOTIFY => match loword(wparam) {
            WM_CREATE => ChildMessage::ChildCreated(lparam as u64),
            WM_DESTROY => ChildMessage::ChildDestroyed(lparam as u64),
            _ => ChildMessage::Other(msg),
        },
        other => ChildMessage::Other(other),
    }
}

/// `WM_NCHITTEST` answer for a resolved region
pub fn hit_region_to_ht(region: HitRegion, button: Option<CaptionButtonKind>) -> isize {
    use self::ht::*;
    match region {
        HitRegion::Client => HTCLIENT,
        HitRegion::Caption => HTCAPTION,
        HitRegion::Transparent => HTTRANSPARENT,
        HitRegion::CaptionButton => match button {
            Some(CaptionButtonKind::Minimize) => HTMINBUTTON,
            // Snap layouts flyout needs HTMAXBUTTON on the maximize button
            Some(CaptionButtonKind::Maximize) | Some(CaptionButtonKind::Restore) => HTMAXBUTTON,
            Some(CaptionButtonKind::Close) => HTCLOSE,
            None => HTCLIENT,
        },
        HitRegion::ResizeBorder(edge) => match edge {
            ResizeEdge::Left => HTLEFT,
            ResizeEdge::Right => HTRIGHT,
            ResizeEdge::Top => HTTOP,
            ResizeEdge::Bottom => HTBOTTOM,
            ResizeEdge::TopLeft => HTTOPLEFT,
            ResizeEdge::TopRight => HTTOPRIGHT,
            ResizeEdge::BottomLeft => HTBOTTOMLEFT,
            ResizeEdge::BottomRight => HTBOTTOMRIGHT,
        },
    }
}

/// Interactive sizing limits for `WM_GETMINMAXINFO`, in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackLimits {
    pub min_width: i32,
    pub min_height: i32,
    pub max_width: i32,
    pub max_height: i32,
}

/// Smallest frame that still fits the title bar's fixed strips
pub fn track_limits(margins: &MarginModel) -> TrackLimits {
    use config::display::*;
    let m = margins.physical();
    TrackLimits {
        min_width: MIN_WINDOW_SIZE.max(m.icon_width + m.left + m.right),
        min_height: MIN_WINDOW_SIZE.max(m.title_bar_height),
        max_width: MAX_WINDOW_WIDTH,
        max_height: MAX_WINDOW_HEIGHT,
    }
}

/// Client area for `WM_NCCALCSIZE`.
///
/// The whole window is client area. A maximized window hangs its invisible
/// resize frame off the monitor, so the client is pulled in by that frame.
pub fn frameless_client_area(proposed: Rect, maximized: bool, frame_thickness: i32) -> Rect {
    if maximized {
        proposed.inset(frame_thickness.max(0))
    } else {
        proposed
    }
}

/// What the window procedure should do with a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// Return this LRESULT without default processing
    Handled(isize),
    /// Let the default procedure run
    Default,
    /// `WM_NCCALCSIZE`: claim the whole window as client area
    RemoveFrame { maximized: bool },
    /// `WM_GETMINMAXINFO`: write these limits, then return 0
    TrackLimits(TrackLimits),
    /// `WM_DPICHANGED`: move to the rect the system suggests, then return 0
    ApplySuggestedRect,
}

/// Decide the answer for a top-level window message
pub fn dispatch(window: &mut FramelessWindow, msg: u32, wparam: usize, lparam: isize) -> Reply {
    match msg {
        msg::WM_NCCALCSIZE => Reply::RemoveFrame {
            maximized: window.placement_maximized(),
        },
        msg::WM_NCHITTEST => {
            let point = point_from_lparam(lparam);
            let region = window.handle_hit_test(point);
            let button = match region {
                HitRegion::CaptionButton => window.caption_button_at(point),
                _ => None,
            };
            Reply::Handled(hit_region_to_ht(region, button))
        }
        msg::WM_GETMINMAXINFO => Reply::TrackLimits(track_limits(window.margin_model())),
        msg::WM_DPICHANGED => {
            window.handle_event(translate_message(msg, wparam, lparam));
            Reply::ApplySuggestedRect
        }
        msg::WM_CLOSE => {
            // The close handler decides; the default procedure would destroy
            window.handle_event(NativeEvent::CloseRequested);
            Reply::Handled(0)
        }
        _ => {
            window.handle_event(translate_message(msg, wparam, lparam));
            Reply::Default
        }
    }
}

/// Decide the answer for a message addressed to the embedded child
pub fn dispatch_child(window: &mut FramelessWindow, msg: u32, wparam: usize, lparam: isize) -> Reply {
    let message = translate_child_message(msg, wparam, lparam);
    match window.handle_child_message(&message) {
        ChildDisposition::HitTest(region) => Reply::Handled(hit_region_to_ht(region, None)),
        ChildDisposition::ForwardToParent => Reply::Handled(0),
        ChildDisposition::PropagateToParent | ChildDisposition::Default => Reply::Default,
    }
}

/// Messages that arrived while the window was already handling one.
///
/// Re-entrant sends (a `SetWindowPos` issued from inside a handler) are
/// queued here and pumped once the outer handler returns.
#[derive(Debug, Default)]
pub struct DeferredEvents {
    events: VecDeque<NativeEvent>,
}

impl DeferredEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw message; messages with no event meaning are dropped
    pub fn defer(&mut self, msg: u32, wparam: usize, lparam: isize) {
        match translate_message(msg, wparam, lparam) {
            NativeEvent::Other(_) => {}
            event => self.events.push_back(event),
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl NativeEventSource for DeferredEvents {
    fn next_event(&mut self) -> Option<NativeEvent> {
        self.events.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{ChromeOptions, CloseDecision};
    use crate::native::headless::{HeadlessChild, HeadlessShadow, HeadlessTitleBar, HeadlessWindow};

    fn window() -> (FramelessWindow, HeadlessWindow, HeadlessChild) {
        let native = HeadlessWindow::new(Rect::new(0, 0, 640, 480));
        let child = HeadlessChild::new();
        let window = FramelessWindow::new(
            Box::new(native.clone()),
            Box::new(HeadlessShadow::new()),
            Box::new(child.clone()),
            Box::new(HeadlessTitleBar::new()),
            ChromeOptions::default(),
        )
        .unwrap();
        (window, native, child)
    }

    fn hit(window: &mut FramelessWindow, x: i32, y: i32) -> Reply {
        dispatch(window, msg::WM_NCHITTEST, 0, lparam_from_point(Point::new(x, y)))
    }

    #[test]
    fn test_translate_activation() {
        assert_eq!(
            translate_message(msg::WM_ACTIVATE, msg::WA_INACTIVE as usize, 0),
            NativeEvent::Deactivate
        );
        assert_eq!(translate_message(msg::WM_ACTIVATE, 1, 0), NativeEvent::Activate);
    }

    #[test]
    fn test_translate_size() {
        assert_eq!(
            translate_message(msg::WM_SIZE, msg::SIZE_MAXIMIZED as usize, 0),
            NativeEvent::StateChanged(ShowState::Maximized)
        );
        assert_eq!(
            translate_message(msg::WM_SIZE, 0, (480 << 16) | 640),
            NativeEvent::Resize {
                width: 640,
                height: 480
            }
        );
    }

    #[test]
    fn test_negative_coordinates_survive_packing() {
        let p = Point::new(-1200, -5);
        assert_eq!(point_from_lparam(lparam_from_point(p)), p);
    }

    #[test]
    fn test_maximize_button_maps_to_maxbutton() {
        assert_eq!(
            hit_region_to_ht(HitRegion::CaptionButton, Some(CaptionButtonKind::Restore)),
            ht::HTMAXBUTTON
        );
        assert_eq!(
            hit_region_to_ht(HitRegion::ResizeBorder(ResizeEdge::BottomRight), None),
            ht::HTBOTTOMRIGHT
        );
    }

    #[test]
    fn test_nchittest_answers_regions() {
        let (mut w, _, _) = window();
        assert_eq!(hit(&mut w, 50, 10), Reply::Handled(ht::HTCAPTION));
        assert_eq!(hit(&mut w, 10, 10), Reply::Handled(ht::HTCLIENT));
        assert_eq!(hit(&mut w, 300, 200), Reply::Handled(ht::HTCLIENT));
        assert_eq!(hit(&mut w, 0, 0), Reply::Handled(ht::HTTOPLEFT));
        assert_eq!(hit(&mut w, 639, 200), Reply::Handled(ht::HTRIGHT));
        assert_eq!(hit(&mut w, 700, 10), Reply::Handled(ht::HTTRANSPARENT));
    }

    #[test]
    fn test_nchittest_answers_caption_buttons() {
        let (mut w, native, _) = window();
        assert_eq!(hit(&mut w, 630, 10), Reply::Handled(ht::HTCLOSE));
        assert_eq!(hit(&mut w, 600, 10), Reply::Handled(ht::HTMAXBUTTON));
        assert_eq!(hit(&mut w, 573, 10), Reply::Handled(ht::HTMINBUTTON));
        // Custom widget slot left of minimize
        assert_eq!(hit(&mut w, 540, 10), Reply::Handled(ht::HTCLIENT));

        native.simulate_show_state(ShowState::Maximized);
        let frame = w.frame_geometry();
        let restore = frame.right() - 27 - 10;
        assert_eq!(hit(&mut w, restore, 10), Reply::Handled(ht::HTMAXBUTTON));
        // No resize border while maximized
        assert_eq!(hit(&mut w, 0, 0), Reply::Handled(ht::HTCLIENT));
    }

    #[test]
    fn test_nccalcsize_follows_placement() {
        let (mut w, native, _) = window();
        assert_eq!(
            dispatch(&mut w, msg::WM_NCCALCSIZE, 1, 0),
            Reply::RemoveFrame { maximized: false }
        );
        native.simulate_show_state(ShowState::Maximized);
        assert_eq!(
            dispatch(&mut w, msg::WM_NCCALCSIZE, 1, 0),
            Reply::RemoveFrame { maximized: true }
        );
    }

    #[test]
    fn test_maximized_client_is_inset_by_frame() {
        let proposed = Rect::new(-8, -8, 1936, 1056);
        assert_eq!(frameless_client_area(proposed, false, 8), proposed);
        assert_eq!(frameless_client_area(proposed, true, 8), Rect::new(0, 0, 1920, 1040));
    }

    #[test]
    fn test_minmaxinfo_keeps_title_bar_strips() {
        let (mut w, _, _) = window();
        let limits = match dispatch(&mut w, msg::WM_GETMINMAXINFO, 0, 0) {
            Reply::TrackLimits(limits) => limits,
            other => panic!("unexpected reply {:?}", other),
        };
        assert_eq!(limits.min_width, 29 + 108);
        assert_eq!(limits.min_height, config::display::MIN_WINDOW_SIZE);
        assert_eq!(limits.max_width, config::display::MAX_WINDOW_WIDTH);
    }

    #[test]
    fn test_dpichanged_rescales_then_asks_for_suggested_rect() {
        let (mut w, _, _) = window();
        let reply = dispatch(&mut w, msg::WM_DPICHANGED, (192 << 16) | 192, 0);
        assert_eq!(reply, Reply::ApplySuggestedRect);
        assert_eq!(w.pixel_ratio(), 2.0);
        // Title bar doubled: y=40 is now caption
        assert_eq!(hit(&mut w, 100, 40), Reply::Handled(ht::HTCAPTION));
    }

    #[test]
    fn test_close_is_answered_by_the_handler() {
        let (mut w, native, _) = window();
        w.set_close_handler(|| CloseDecision::Cancel);
        assert_eq!(dispatch(&mut w, msg::WM_CLOSE, 0, 0), Reply::Handled(0));
        assert!(!w.is_closed());

        w.set_close_handler(|| CloseDecision::Accept);
        assert_eq!(dispatch(&mut w, msg::WM_CLOSE, 0, 0), Reply::Handled(0));
        assert!(w.is_closed());
        assert!(native.snapshot().destroyed);
    }

    #[test]
    fn test_state_messages_fall_through_to_default() {
        let (mut w, native, _) = window();
        assert_eq!(dispatch(&mut w, msg::WM_SHOWWINDOW, 1, 0), Reply::Default);
        assert!(w.is_visible());

        native.simulate_show_state(ShowState::Maximized);
        let reply = dispatch(&mut w, msg::WM_SIZE, msg::SIZE_MAXIMIZED as usize, 0);
        assert_eq!(reply, Reply::Default);
        assert!(w.is_maximized());
    }

    #[test]
    fn test_child_messages() {
        let (mut w, _, child) = window();
        let caption = lparam_from_point(Point::new(50, 10));
        let body = lparam_from_point(Point::new(300, 200));
        assert_eq!(
            dispatch_child(&mut w, msg::WM_NCHITTEST, 0, caption),
            Reply::Handled(ht::HTTRANSPARENT)
        );
        assert_eq!(
            dispatch_child(&mut w, msg::WM_NCHITTEST, 0, body),
            Reply::Handled(ht::HTCLIENT)
        );

        assert_eq!(dispatch_child(&mut w, msg::WM_SYSKEYDOWN, 0x12, 0), Reply::Handled(0));
        assert_eq!(child.snapshot().forwarded, vec![ChildMessage::SysKeyDown(0x12)]);

        let created = msg::WM_CREATE as usize;
        assert_eq!(dispatch_child(&mut w, msg::WM_PARENTNOTIFY, created, 77), Reply::Default);
        assert!(w.child().unwrap().children().any(|id| *id == 77));
        assert_eq!(dispatch_child(&mut w, 0x0200, 0, 0), Reply::Default);
    }

    #[test]
    fn test_deferred_events_pump_in_order() {
        let (mut w, native, _) = window();
        let mut deferred = DeferredEvents::new();
        deferred.defer(msg::WM_SHOWWINDOW, 1, 0);
        deferred.defer(msg::WM_NCHITTEST, 0, 0);
        native.simulate_geometry(Rect::new(0, 0, 700, 480));
        deferred.defer(msg::WM_SIZE, 0, (480 << 16) | 700);
        assert_eq!(deferred.len(), 2);

        assert_eq!(w.pump(&mut deferred), 2);
        assert!(deferred.is_empty());
        assert!(w.is_visible());
        assert_eq!(w.child().unwrap().geometry().width, 700);
    }
}
