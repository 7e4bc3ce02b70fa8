//! Main window controller
//!
//! [`FramelessWindow`] owns the native window, the shadow companion, the
//! embedded child and the margin model, and exposes one platform-uniform
//! facade over them. Every call and every native event is handled in the same
//! order: state tracker first, then shadow re-sync, then the title bar, then
//! the embedded child. Observers never see a maximized window with a shadow.

use std::time::Instant;

use anyhow::Context;

use crate::child::{ChildDisposition, ChildMessage, EmbeddedChild};
use crate::config;
use crate::geometry::{pixel_ratio_for_dpi, validate_window_size, MarginModel, Margins, Point, Rect};
use crate::hit_test::{self, HitRegion};
use crate::native::NativeEvent;
use crate::shadow::ShadowWindow;
use crate::snapshot::GeometrySnapshot;
use crate::state::{actual_show_state, ShowState, StateChange, StateTracker, WindowState};
use crate::timer::ShadowShowPolicy;
use crate::title_bar::{CaptionButtonKind, Theme, TitleBar, TitleBarCommand};
use crate::traits::{ChildSurface, NativeEventSource, NativeWindow, ShadowSurface};

/// Answer of the application to a close request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    Accept,
    Cancel,
}

/// Result of a close attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    Closed,
    Cancelled,
    AlreadyClosed,
}

/// Chrome configuration applied at construction
#[derive(Debug, Clone, PartialEq)]
pub struct ChromeOptions {
    pub title: String,
    pub margins: Margins,
    /// Shadow width in logical pixels
    pub shadow_width: i32,
    pub shadow_policy: ShadowShowPolicy,
    pub theme: Theme,
}

impl Default for ChromeOptions {
    fn default() -> Self {
        Self {
            title: String::new(),
            margins: Margins::default(),
            shadow_width: config::shadow::DEFAULT_WIDTH,
            shadow_policy: ShadowShowPolicy::default(),
            theme: Theme::default(),
        }
    }
}

type CloseHandler = Box<dyn FnMut() -> CloseDecision>;
type ThemeHandler = Box<dyn FnMut(Theme)>;

pub struct FramelessWindow {
    native: Box<dyn NativeWindow>,
    title_bar: Box<dyn TitleBar>,
    shadow: Option<ShadowWindow>,
    child: Option<EmbeddedChild>,
    tracker: StateTracker,
    margins: MarginModel,
    shadow_width: i32,
    theme: Theme,
    title: String,
    icon: String,
    visible: bool,
    interacting: bool,
    closed: bool,
    close_handler: Option<CloseHandler>,
    theme_handler: Option<ThemeHandler>,
}

impl FramelessWindow {
    /// Assemble a window from its platform parts.
    ///
    /// The window starts hidden, Normal and inactive.
    pub fn new(
        native: Box<dyn NativeWindow>,
        shadow_surface: Box<dyn ShadowSurface>,
        child_surface: Box<dyn ChildSurface>,
        title_bar: Box<dyn TitleBar>,
        options: ChromeOptions,
    ) -> anyhow::Result<Self> {
        let margins = MarginModel::new(options.margins, native.pixel_ratio())
            .map_err(anyhow::Error::msg)
            .context("Invalid title bar configuration")?;
        if options.shadow_width < 0 {
            anyhow::bail!("Shadow width must be non-negative, got {}", options.shadow_width);
        }

        let frame = native.frame_geometry();
        let shadow = ShadowWindow::new(
            shadow_surface,
            frame,
            margins.to_physical(options.shadow_width),
            options.shadow_policy,
        );
        let child = EmbeddedChild::new(child_surface, client_rect(frame, &margins));

        tracing::info!(
            frame = ?frame,
            pixel_ratio = margins.pixel_ratio(),
            margins = ?options.margins,
            "Creating frameless window"
        );

        let mut window = Self {
            native,
            title_bar,
            shadow: Some(shadow),
            child: Some(child),
            tracker: StateTracker::new(),
            margins,
            shadow_width: options.shadow_width,
            theme: options.theme,
            title: String::new(),
            icon: String::new(),
            visible: false,
            interacting: false,
            closed: false,
            close_handler: None,
            theme_handler: None,
        };
        window.title_bar.set_theme(options.theme);
        window.title_bar.set_active(false);
        window.title_bar.set_maximized(false);
        window.set_title(&options.title);
        Ok(window)
    }

    // ------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------

    pub fn x(&self) -> i32 {
        self.frame_geometry().x
    }

    pub fn y(&self) -> i32 {
        self.frame_geometry().y
    }

    pub fn width(&self) -> i32 {
        self.frame_geometry().width
    }

    pub fn height(&self) -> i32 {
        self.frame_geometry().height
    }

    /// Window rectangle. Frameless: identical to the frame geometry.
    pub fn geometry(&self) -> Rect {
        self.frame_geometry()
    }

    pub fn frame_geometry(&self) -> Rect {
        self.native.frame_geometry()
    }

    /// Area below the title bar, handed to the embedded child
    pub fn client_geometry(&self) -> Rect {
        client_rect(self.frame_geometry(), &self.margins)
    }

    pub fn set_geometry(&mut self, rect: Rect) {
        if self.closed {
            return;
        }
        self.native.set_frame_geometry(rect);
        self.apply(None, Instant::now());
    }

    pub fn move_to(&mut self, x: i32, y: i32) {
        let rect = self.frame_geometry().with_position(x, y);
        self.set_geometry(rect);
    }

    pub fn resize(&mut self, width: i32, height: i32) {
        let rect = self.frame_geometry().with_size(width, height);
        self.set_geometry(rect);
    }

    // ------------------------------------------------------------------
    // Visibility and state verbs
    // ------------------------------------------------------------------

    pub fn show(&mut self) {
        if self.closed {
            return;
        }
        self.native.set_visible(true);
        self.visible = true;
        let change = self
            .tracker
            .on_native_event(&NativeEvent::Show, self.native.as_ref());
        self.apply(change, Instant::now());
    }

    pub fn hide(&mut self) {
        if self.closed {
            return;
        }
        self.native.set_visible(false);
        self.visible = false;
        self.apply(None, Instant::now());
    }

    pub fn show_minimized(&mut self) {
        self.request_show_state(ShowState::Minimized);
    }

    pub fn show_maximized(&mut self) {
        self.request_show_state(ShowState::Maximized);
    }

    pub fn show_normal(&mut self) {
        self.request_show_state(ShowState::Normal);
    }

    pub fn show_full_screen(&mut self) {
        self.request_show_state(ShowState::FullScreen);
    }

    /// Maximize, or restore when already maximized
    pub fn toggle_maximized(&mut self) {
        if self.is_maximized() {
            self.show_normal();
        } else {
            self.show_maximized();
        }
    }

    fn request_show_state(&mut self, show: ShowState) {
        if self.closed {
            return;
        }
        // Hide the shadow before the frame changes so it never lags behind
        if show != ShowState::Normal {
            if let Some(shadow) = self.shadow.as_mut() {
                shadow.hide();
            }
        }
        self.native.apply_show_state(show);
        self.native.set_visible(true);
        self.visible = true;
        let change = self.tracker.request(show);
        self.apply(change, Instant::now());
    }

    /// Ask the application, then tear down shadow, child and native window
    /// in that order.
    pub fn close(&mut self) -> CloseOutcome {
        if self.closed {
            return CloseOutcome::AlreadyClosed;
        }

        let decision = match self.close_handler.as_mut() {
            Some(handler) => handler(),
            None => CloseDecision::Accept,
        };
        if decision == CloseDecision::Cancel {
            tracing::info!("Close request cancelled by application");
            return CloseOutcome::Cancelled;
        }

        tracing::info!("Closing frameless window");
        self.teardown();
        CloseOutcome::Closed
    }

    fn teardown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.visible = false;

        if let Some(mut shadow) = self.shadow.take() {
            shadow.cancel();
            shadow.destroy();
        }
        if let Some(mut child) = self.child.take() {
            child.destroy();
        }
        self.native.destroy();
        tracing::debug!("Frameless window torn down");
    }

    // ------------------------------------------------------------------
    // Chrome configuration
    // ------------------------------------------------------------------

    pub fn set_margins(
        &mut self,
        title_bar_height: i32,
        icon_width: i32,
        left: i32,
        right: i32,
    ) -> Result<(), String> {
        self.margins
            .set_margins(Margins::new(title_bar_height, icon_width, left, right))?;
        tracing::debug!(title_bar_height, icon_width, left, right, "Margins updated");
        self.sync_child();
        Ok(())
    }

    pub fn margins(&self) -> Margins {
        self.margins.margins()
    }

    pub fn margin_model(&self) -> &MarginModel {
        &self.margins
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.margins.pixel_ratio()
    }

    /// Platform handle of the frame (HWND on Windows, 0 when headless)
    pub fn native_handle(&self) -> isize {
        self.native.handle_value()
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
        self.title_bar.set_title(title);
        if !self.closed {
            self.native.set_title(title);
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_icon(&mut self, icon: &str) {
        self.icon = icon.to_string();
        self.title_bar.set_icon(icon);
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    /// Set the application theme (does not fire the theme-changed handler)
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.title_bar.set_theme(theme);
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Register the cancelable "about to close" notification
    pub fn set_close_handler<F>(&mut self, handler: F)
    where
        F: FnMut() -> CloseDecision + 'static,
    {
        self.close_handler = Some(Box::new(handler));
    }

    /// Register for system theme changes
    pub fn set_theme_changed_handler<F>(&mut self, handler: F)
    where
        F: FnMut(Theme) + 'static,
    {
        self.theme_handler = Some(Box::new(handler));
    }

    // ------------------------------------------------------------------
    // State queries
    // ------------------------------------------------------------------

    pub fn state(&self) -> WindowState {
        self.tracker.state()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_active(&self) -> bool {
        self.state().is_active()
    }

    pub fn is_minimized(&self) -> bool {
        self.state().is_minimized()
    }

    pub fn is_maximized(&self) -> bool {
        self.state().is_maximized()
    }

    pub fn is_full_screen(&self) -> bool {
        self.state().is_full_screen()
    }

    /// True while the user drags or resizes the frame
    pub fn is_interacting(&self) -> bool {
        self.interacting
    }

    pub fn shadow(&self) -> Option<&ShadowWindow> {
        self.shadow.as_ref()
    }

    pub fn child(&self) -> Option<&EmbeddedChild> {
        self.child.as_ref()
    }

    // ------------------------------------------------------------------
    // Native event dispatch
    // ------------------------------------------------------------------

    /// Handle one native notification
    pub fn handle_event(&mut self, event: NativeEvent) -> Option<StateChange> {
        self.handle_event_at(event, Instant::now())
    }

    /// Handle one native notification at a given instant (timers are armed
    /// relative to `now`)
    pub fn handle_event_at(&mut self, event: NativeEvent, now: Instant) -> Option<StateChange> {
        if self.closed {
            return None;
        }

        match event {
            NativeEvent::Activate | NativeEvent::Deactivate => {
                let change = self.tracker.on_native_event(&event, self.native.as_ref());
                // Style refresh even when the logical state did not change
                self.title_bar.set_active(self.tracker.state().is_active());
                self.apply(change, now);
                change
            }
            NativeEvent::Show => {
                self.visible = true;
                let change = self.tracker.on_native_event(&event, self.native.as_ref());
                self.apply(change, now);
                change
            }
            NativeEvent::Hide => {
                self.visible = false;
                self.apply(None, now);
                None
            }
            NativeEvent::Move { .. } | NativeEvent::Resize { .. } | NativeEvent::StateChanged(_) => {
                let change = self.tracker.on_native_event(&event, self.native.as_ref());
                self.apply(change, now);
                change
            }
            NativeEvent::DpiChanged { dpi } => {
                self.apply_pixel_ratio(pixel_ratio_for_dpi(dpi));
                self.apply(None, now);
                None
            }
            NativeEvent::ThemeChanged(theme) => {
                tracing::info!(?theme, "System theme changed");
                self.set_theme(theme);
                if let Some(handler) = self.theme_handler.as_mut() {
                    handler(theme);
                }
                None
            }
            NativeEvent::EnterSizeMove => {
                tracing::trace!("Interactive move/resize started");
                self.interacting = true;
                None
            }
            NativeEvent::ExitSizeMove => {
                self.interacting = false;
                self.apply(None, now);
                None
            }
            NativeEvent::CloseRequested => {
                self.close();
                None
            }
            NativeEvent::Other(id) => {
                tracing::trace!(message = id, "Ignoring native message");
                None
            }
        }
    }

    /// Drain an event source. Returns the number of events handled.
    pub fn pump(&mut self, source: &mut dyn NativeEventSource) -> usize {
        let mut handled = 0;
        while let Some(event) = source.next_event() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Fire due timers. Returns true when the shadow was shown.
    pub fn poll_timers(&mut self, now: Instant) -> bool {
        let eligible = self.shadow_eligible();
        match self.shadow.as_mut() {
            Some(shadow) => shadow.poll(now, eligible),
            None => false,
        }
    }

    /// Answer a native hit-test for a screen point
    pub fn handle_hit_test(&self, point: Point) -> HitRegion {
        if self.closed {
            return HitRegion::Transparent;
        }
        hit_test::resolve(point, self.frame_geometry(), &self.margins, self.placement_maximized())
    }

    /// Caption button under a screen point, if any
    pub fn caption_button_at(&self, point: Point) -> Option<CaptionButtonKind> {
        if self.closed {
            return None;
        }
        hit_test::caption_button_at(
            point,
            self.frame_geometry(),
            &self.margins,
            self.placement_maximized(),
            &self.title_bar.caption_layout(),
        )
    }

    /// Route a message addressed to the embedded child
    pub fn handle_child_message(&mut self, message: &ChildMessage) -> ChildDisposition {
        let frame = self.frame_geometry();
        match self.child.as_mut() {
            Some(child) => child.intercept(message, frame, &self.margins, self.native.as_ref()),
            None => ChildDisposition::Default,
        }
    }

    /// Execute a caption button click
    pub fn handle_title_bar_command(&mut self, command: TitleBarCommand) -> Option<CloseOutcome> {
        match command {
            TitleBarCommand::Minimize => self.show_minimized(),
            TitleBarCommand::ToggleMaximize => self.toggle_maximized(),
            TitleBarCommand::Close => return Some(self.close()),
        }
        None
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Serializable geometry for session restore
    pub fn geometry_snapshot(&self) -> GeometrySnapshot {
        let normal_geometry = match self.native.query_actual_window_placement() {
            Ok(p) => p.normal_geometry,
            Err(e) => {
                tracing::warn!(error = %e, "Placement query failed, snapshotting frame geometry");
                self.frame_geometry()
            }
        };
        GeometrySnapshot {
            normal_geometry,
            show_state: self.state().show_state(),
            pixel_ratio: self.pixel_ratio(),
        }
    }

    /// Restore a snapshot. The size is rescaled when the monitor's pixel
    /// ratio differs from the one it was saved at. Minimized windows come
    /// back Normal.
    pub fn restore_geometry(&mut self, snapshot: &GeometrySnapshot) -> anyhow::Result<()> {
        let rect = snapshot.geometry_for_ratio(self.pixel_ratio());
        validate_window_size(rect.width, rect.height).map_err(anyhow::Error::msg)?;
        if rect != snapshot.normal_geometry {
            tracing::debug!(
                saved_ratio = snapshot.pixel_ratio,
                pixel_ratio = self.pixel_ratio(),
                ?rect,
                "Rescaled saved geometry"
            );
        }

        self.set_geometry(rect);
        match snapshot.show_state {
            ShowState::Maximized => self.show_maximized(),
            ShowState::FullScreen => self.show_full_screen(),
            ShowState::Normal | ShowState::Minimized => {}
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internal synchronization
    // ------------------------------------------------------------------

    /// Maximized according to the platform placement, not the tracker
    pub fn placement_maximized(&self) -> bool {
        actual_show_state(self.native.as_ref()) == ShowState::Maximized
    }

    fn shadow_eligible(&self) -> bool {
        !self.closed && self.visible && self.tracker.state().allows_shadow()
    }

    fn apply_pixel_ratio(&mut self, ratio: f64) {
        if let Err(e) = self.margins.set_pixel_ratio(ratio) {
            tracing::warn!(error = %e, "Ignoring invalid pixel ratio");
            return;
        }
        tracing::debug!(pixel_ratio = ratio, "Pixel ratio changed");
        let frame = self.frame_geometry();
        let width = self.margins.to_physical(self.shadow_width);
        if let Some(shadow) = self.shadow.as_mut() {
            shadow.set_shadow_width(frame, width);
        }
    }

    /// Tracker is already updated; push the result to shadow, title bar and child.
    fn apply(&mut self, change: Option<StateChange>, now: Instant) {
        let state = self.tracker.state();
        let frame = self.native.frame_geometry();
        let eligible = self.shadow_eligible();

        if let Some(shadow) = self.shadow.as_mut() {
            if eligible && self.interacting {
                // Live resize: drop the shadow instead of repainting every step;
                // ExitSizeMove re-arms it at the final size
                if !shadow.is_sized_for(frame) {
                    shadow.hide();
                }
                shadow.sync_geometry(frame);
                shadow.set_active(state.is_active());
            } else if eligible {
                shadow.sync_geometry(frame);
                shadow.set_active(state.is_active());
                shadow.show_later(now);
            } else {
                shadow.hide();
                shadow.sync_geometry(frame);
                shadow.set_active(state.is_active());
            }
        }

        if let Some(change) = change {
            if change.show_changed() {
                self.title_bar.set_maximized(state.is_maximized());
            }
            if change.active_changed() {
                self.title_bar.set_active(state.is_active());
            }
        }

        self.sync_child();
    }

    fn sync_child(&mut self) {
        let client = client_rect(self.native.frame_geometry(), &self.margins);
        if let Some(child) = self.child.as_mut() {
            child.set_geometry(client);
        }
    }
}

impl Drop for FramelessWindow {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn client_rect(frame: Rect, margins: &MarginModel) -> Rect {
    let title = margins.physical().title_bar_height.min(frame.height);
    Rect::new(frame.x, frame.y + title, frame.width, frame.height - title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::headless::{HeadlessChild, HeadlessShadow, HeadlessTitleBar, HeadlessWindow};

    fn window() -> (FramelessWindow, HeadlessWindow) {
        let native = HeadlessWindow::new(Rect::new(100, 100, 640, 480));
        let peek = native.clone();
        let window = FramelessWindow::new(
            Box::new(native),
            Box::new(HeadlessShadow::new()),
            Box::new(HeadlessChild::new()),
            Box::new(HeadlessTitleBar::new()),
            ChromeOptions::default(),
        )
        .unwrap();
        (window, peek)
    }

    #[test]
    fn test_client_rect_below_title_bar() {
        let (window, _) = window();
        assert_eq!(window.client_geometry(), Rect::new(100, 129, 640, 451));
        assert_eq!(window.child().unwrap().geometry(), Rect::new(100, 129, 640, 451));
    }

    #[test]
    fn test_negative_shadow_width_rejected() {
        let options = ChromeOptions {
            shadow_width: -1,
            ..ChromeOptions::default()
        };
        let result = FramelessWindow::new(
            Box::new(HeadlessWindow::new(Rect::new(0, 0, 640, 480))),
            Box::new(HeadlessShadow::new()),
            Box::new(HeadlessChild::new()),
            Box::new(crate::title_bar::NullTitleBar),
            options,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_drop_tears_down() {
        let (window, peek) = window();
        drop(window);
        assert!(peek.snapshot().destroyed);
    }
}
