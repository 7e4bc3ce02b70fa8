//! Headless backend
//!
//! In-memory implementations of every platform trait. Each component keeps
//! its state behind an `Rc<RefCell<_>>` so a cloned handle can inspect what
//! the controller did after ownership moved into it. A shared journal records
//! teardown order across components.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::child::ChildMessage;
use crate::geometry::Rect;
use crate::native::{NativeEvent, Placement};
use crate::shadow::paint::ShadowFrame;
use crate::state::ShowState;
use crate::title_bar::{CaptionButton, CaptionButtonKind, CaptionLayout, Theme, TitleBar};
use crate::traits::{ChildSurface, NativeEventSource, NativeWindow, PlacementSource, ShadowSurface};

/// Shared teardown journal
pub type Journal = Rc<RefCell<Vec<String>>>;

/// Default screen used for maximized and full-screen frames
pub const HEADLESS_SCREEN: Rect = Rect {
    x: 0,
    y: 0,
    width: 1920,
    height: 1080,
};

#[derive(Debug, Clone)]
pub struct HeadlessWindowState {
    pub geometry: Rect,
    pub normal_geometry: Rect,
    pub show: ShowState,
    pub visible: bool,
    pub title: String,
    pub pixel_ratio: f64,
    pub screen: Rect,
    pub fail_placement: bool,
    pub destroyed: bool,
}

/// Headless main window
#[derive(Clone)]
pub struct HeadlessWindow {
    state: Rc<RefCell<HeadlessWindowState>>,
    journal: Journal,
}

impl HeadlessWindow {
    pub fn new(geometry: Rect) -> Self {
        Self::with_journal(geometry, Journal::default())
    }

    pub fn with_journal(geometry: Rect, journal: Journal) -> Self {
        Self {
            state: Rc::new(RefCell::new(HeadlessWindowState {
                geometry,
                normal_geometry: geometry,
                show: ShowState::Normal,
                visible: false,
                title: String::new(),
                pixel_ratio: 1.0,
                screen: HEADLESS_SCREEN,
                fail_placement: false,
                destroyed: false,
            })),
            journal,
        }
    }

    pub fn snapshot(&self) -> HeadlessWindowState {
        self.state.borrow().clone()
    }

    pub fn journal(&self) -> Journal {
        self.journal.clone()
    }

    /// Change the show state from the platform side (snap, Win+Up, taskbar)
    pub fn simulate_show_state(&self, show: ShowState) {
        let mut s = self.state.borrow_mut();
        match show {
            ShowState::Normal => s.geometry = s.normal_geometry,
            ShowState::Maximized | ShowState::FullScreen => s.geometry = s.screen,
            ShowState::Minimized => {}
        }
        s.show = show;
    }

    /// Move/resize from the platform side (user drag)
    pub fn simulate_geometry(&self, rect: Rect) {
        let mut s = self.state.borrow_mut();
        s.geometry = rect;
        if s.show == ShowState::Normal {
            s.normal_geometry = rect;
        }
    }

    pub fn set_pixel_ratio(&self, ratio: f64) {
        self.state.borrow_mut().pixel_ratio = ratio;
    }

    /// Make placement queries fail, like a destroyed or foreign handle
    pub fn fail_placement_queries(&self, fail: bool) {
        self.state.borrow_mut().fail_placement = fail;
    }
}

impl PlacementSource for HeadlessWindow {
    fn query_actual_window_placement(&self) -> anyhow::Result<Placement> {
        let s = self.state.borrow();
        if s.fail_placement {
            anyhow::bail!("placement unavailable");
        }
        let show = match s.show {
            ShowState::FullScreen => ShowState::Normal,
            other => other,
        };
        Ok(Placement {
            show,
            normal_geometry: s.normal_geometry,
        })
    }
}

impl NativeWindow for HeadlessWindow {
    fn frame_geometry(&self) -> Rect {
        self.state.borrow().geometry
    }

    fn set_frame_geometry(&mut self, rect: Rect) {
        self.simulate_geometry(rect);
    }

    fn apply_show_state(&mut self, state: ShowState) {
        self.simulate_show_state(state);
    }

    fn set_visible(&mut self, visible: bool) {
        self.state.borrow_mut().visible = visible;
    }

    fn is_visible(&self) -> bool {
        self.state.borrow().visible
    }

    fn set_title(&mut self, title: &str) {
        self.state.borrow_mut().title = title.to_string();
    }

    fn pixel_ratio(&self) -> f64 {
        self.state.borrow().pixel_ratio
    }

    fn handle_value(&self) -> isize {
        0
    }

    fn destroy(&mut self) {
        let mut s = self.state.borrow_mut();
        s.visible = false;
        s.destroyed = true;
        self.journal.borrow_mut().push("window.destroy".to_string());
    }
}

#[derive(Debug, Clone, Default)]
pub struct HeadlessShadowState {
    pub geometry: Rect,
    pub visible: bool,
    pub presents: usize,
    pub last_frame_size: Option<(u32, u32)>,
    pub stack_calls: usize,
    pub destroyed: bool,
}

/// Headless shadow window
#[derive(Clone, Default)]
pub struct HeadlessShadow {
    state: Rc<RefCell<HeadlessShadowState>>,
    journal: Journal,
}

impl HeadlessShadow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_journal(journal: Journal) -> Self {
        Self {
            journal,
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> HeadlessShadowState {
        self.state.borrow().clone()
    }
}

impl ShadowSurface for HeadlessShadow {
    fn set_geometry(&mut self, rect: Rect) {
        self.state.borrow_mut().geometry = rect;
    }

    fn set_visible(&mut self, visible: bool) {
        self.state.borrow_mut().visible = visible;
    }

    fn present(&mut self, frame: &ShadowFrame) {
        let mut s = self.state.borrow_mut();
        s.presents += 1;
        s.last_frame_size = Some((frame.width, frame.height));
    }

    fn stack_below_owner(&mut self) {
        self.state.borrow_mut().stack_calls += 1;
    }

    fn destroy(&mut self) {
        let mut s = self.state.borrow_mut();
        s.visible = false;
        s.destroyed = true;
        self.journal.borrow_mut().push("shadow.destroy".to_string());
    }
}

#[derive(Debug, Clone, Default)]
pub struct HeadlessChildState {
    pub geometry: Rect,
    pub forwarded: Vec<ChildMessage>,
    pub destroyed: bool,
}

/// Headless embedded child
#[derive(Clone, Default)]
pub struct HeadlessChild {
    state: Rc<RefCell<HeadlessChildState>>,
    journal: Journal,
}

impl HeadlessChild {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_journal(journal: Journal) -> Self {
        Self {
            journal,
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> HeadlessChildState {
        self.state.borrow().clone()
    }
}

impl ChildSurface for HeadlessChild {
    fn set_geometry(&mut self, rect: Rect) {
        self.state.borrow_mut().geometry = rect;
    }

    fn post_to_parent(&mut self, message: &ChildMessage) {
        self.state.borrow_mut().forwarded.push(*message);
    }

    fn destroy(&mut self) {
        self.state.borrow_mut().destroyed = true;
        self.journal.borrow_mut().push("child.destroy".to_string());
    }
}

/// Queue of synthetic native events
#[derive(Debug, Default)]
pub struct HeadlessEventQueue {
    events: VecDeque<NativeEvent>,
}

impl HeadlessEventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: NativeEvent) {
        self.events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl NativeEventSource for HeadlessEventQueue {
    fn next_event(&mut self) -> Option<NativeEvent> {
        self.events.pop_front()
    }
}

impl Extend<NativeEvent> for HeadlessEventQueue {
    fn extend<I: IntoIterator<Item = NativeEvent>>(&mut self, iter: I) {
        self.events.extend(iter);
    }
}

#[derive(Debug, Clone)]
pub struct HeadlessTitleBarState {
    pub title: String,
    pub icon: String,
    pub active: bool,
    pub maximized: bool,
    pub theme: Theme,
    pub buttons: Vec<CaptionButton>,
    pub layout: CaptionLayout,
    pub updates: usize,
}

/// Title bar that records what it was told, with a standard button row
#[derive(Clone)]
pub struct HeadlessTitleBar {
    state: Rc<RefCell<HeadlessTitleBarState>>,
}

impl Default for HeadlessTitleBar {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessTitleBar {
    pub fn new() -> Self {
        Self::with_layout(CaptionLayout::default())
    }

    /// Title bar whose button row follows `layout` (listed right to left)
    pub fn with_layout(layout: CaptionLayout) -> Self {
        let buttons = layout
            .buttons
            .iter()
            .rev()
            .copied()
            .map(CaptionButton::new)
            .collect();
        Self {
            state: Rc::new(RefCell::new(HeadlessTitleBarState {
                title: String::new(),
                icon: String::new(),
                active: false,
                maximized: false,
                theme: Theme::Light,
                buttons,
                layout,
                updates: 0,
            })),
        }
    }

    pub fn snapshot(&self) -> HeadlessTitleBarState {
        self.state.borrow().clone()
    }
}

impl TitleBar for HeadlessTitleBar {
    fn set_title(&mut self, title: &str) {
        let mut s = self.state.borrow_mut();
        s.title = title.to_string();
        s.updates += 1;
    }

    fn set_icon(&mut self, icon: &str) {
        let mut s = self.state.borrow_mut();
        s.icon = icon.to_string();
        s.updates += 1;
    }

    fn set_active(&mut self, active: bool) {
        let mut s = self.state.borrow_mut();
        s.active = active;
        for button in s.buttons.iter_mut() {
            button.active = active;
        }
        s.updates += 1;
    }

    fn set_maximized(&mut self, maximized: bool) {
        let mut s = self.state.borrow_mut();
        s.maximized = maximized;
        for button in s.buttons.iter_mut() {
            button.kind = match button.kind {
                CaptionButtonKind::Maximize | CaptionButtonKind::Restore if maximized => {
                    CaptionButtonKind::Restore
                }
                CaptionButtonKind::Maximize | CaptionButtonKind::Restore => {
                    CaptionButtonKind::Maximize
                }
                other => other,
            };
        }
        s.updates += 1;
    }

    fn set_theme(&mut self, theme: Theme) {
        let mut s = self.state.borrow_mut();
        s.theme = theme;
        for button in s.buttons.iter_mut() {
            button.dark_icon = !theme.is_dark();
        }
        s.updates += 1;
    }

    fn caption_layout(&self) -> CaptionLayout {
        self.state.borrow().layout.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maximize_and_restore_geometry() {
        let mut window = HeadlessWindow::new(Rect::new(100, 100, 640, 480));
        window.apply_show_state(ShowState::Maximized);
        assert_eq!(window.frame_geometry(), HEADLESS_SCREEN);
        let placement = window.query_actual_window_placement().unwrap();
        assert_eq!(placement.show, ShowState::Maximized);
        assert_eq!(placement.normal_geometry, Rect::new(100, 100, 640, 480));

        window.apply_show_state(ShowState::Normal);
        assert_eq!(window.frame_geometry(), Rect::new(100, 100, 640, 480));
    }

    #[test]
    fn test_full_screen_reports_normal_placement() {
        let mut window = HeadlessWindow::new(Rect::new(0, 0, 640, 480));
        window.apply_show_state(ShowState::FullScreen);
        assert_eq!(
            window.query_actual_window_placement().unwrap().show,
            ShowState::Normal
        );
    }

    #[test]
    fn test_title_bar_swaps_maximize_glyph() {
        let mut bar = HeadlessTitleBar::new();
        bar.set_maximized(true);
        let kinds: Vec<_> = bar.snapshot().buttons.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![
                CaptionButtonKind::Minimize,
                CaptionButtonKind::Restore,
                CaptionButtonKind::Close
            ]
        );
    }

    #[test]
    fn test_event_queue_is_fifo() {
        let mut queue = HeadlessEventQueue::new();
        queue.extend([NativeEvent::Show, NativeEvent::Activate]);
        assert_eq!(queue.next_event(), Some(NativeEvent::Show));
        assert_eq!(queue.next_event(), Some(NativeEvent::Activate));
        assert_eq!(queue.next_event(), None);
    }
}
