//! Shadow companion window
//!
//! A borderless, click-through window that paints a soft drop shadow exactly
//! `shadow_width` pixels outside the owner's frame. It is visible only while
//! the owner is in the Normal state and visible, and comes back after state
//! changes through a debounce timer to avoid flicker.

pub mod paint;

use std::time::Instant;

use crate::geometry::Rect;
use crate::timer::{DebounceTimer, ShadowShowPolicy};
use crate::traits::ShadowSurface;
use paint::ShadowPainter;

/// Visibility phase of the shadow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowPhase {
    Hidden,
    /// Show timer armed
    PendingShow,
    Shown,
}

/// Shadow frame for an owner frame: the owner outset by `shadow_width`
pub fn frame_for_owner(owner: Rect, shadow_width: i32) -> Rect {
    owner.outset(shadow_width)
}

pub struct ShadowWindow {
    surface: Box<dyn ShadowSurface>,
    painter: ShadowPainter,
    policy: ShadowShowPolicy,
    phase: ShadowPhase,
    geometry: Rect,
    active: bool,
    timer: DebounceTimer,
}

impl ShadowWindow {
    /// Create a hidden shadow for an owner frame
    ///
    /// # Arguments
    /// * `surface` - Platform shadow window
    /// * `owner` - Owner frame in physical pixels
    /// * `shadow_width` - Shadow width in physical pixels
    /// * `policy` - How a pending show is debounced
    pub fn new(
        mut surface: Box<dyn ShadowSurface>,
        owner: Rect,
        shadow_width: i32,
        policy: ShadowShowPolicy,
    ) -> Self {
        let shadow_width = shadow_width.max(0);
        let geometry = frame_for_owner(owner, shadow_width);
        surface.set_geometry(geometry);
        surface.set_visible(false);
        tracing::debug!(?geometry, ?policy, "Shadow window created");

        Self {
            surface,
            painter: ShadowPainter::new(shadow_width as u32),
            policy,
            phase: ShadowPhase::Hidden,
            geometry,
            active: false,
            timer: DebounceTimer::new(),
        }
    }

    pub fn phase(&self) -> ShadowPhase {
        self.phase
    }

    pub fn is_visible(&self) -> bool {
        self.phase == ShadowPhase::Shown
    }

    pub fn geometry(&self) -> Rect {
        self.geometry
    }

    pub fn shadow_width(&self) -> i32 {
        self.painter.shadow_width() as i32
    }

    pub fn policy(&self) -> ShadowShowPolicy {
        self.policy
    }

    /// Instant at which a pending show fires
    pub fn pending_deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// True when the painted frame already matches the owner's size
    pub fn is_sized_for(&self, owner: Rect) -> bool {
        let geometry = frame_for_owner(owner, self.shadow_width());
        geometry.width == self.geometry.width && geometry.height == self.geometry.height
    }

    /// Follow the owner's frame
    pub fn sync_geometry(&mut self, owner: Rect) {
        let geometry = frame_for_owner(owner, self.shadow_width());
        if geometry == self.geometry {
            return;
        }
        let resized =
            geometry.width != self.geometry.width || geometry.height != self.geometry.height;
        self.geometry = geometry;
        self.surface.set_geometry(geometry);
        if resized && self.phase == ShadowPhase::Shown {
            self.repaint();
        }
    }

    /// Change the shadow width (DPI change) and re-derive geometry
    pub fn set_shadow_width(&mut self, owner: Rect, shadow_width: i32) {
        self.painter.set_shadow_width(shadow_width.max(0) as u32);
        self.geometry = frame_for_owner(owner, self.shadow_width());
        self.surface.set_geometry(self.geometry);
        if self.phase == ShadowPhase::Shown {
            self.repaint();
        }
    }

    /// Arm (or re-arm) the show timer. A shown shadow stays shown.
    pub fn show_later(&mut self, now: Instant) {
        if self.phase == ShadowPhase::Shown {
            return;
        }
        self.phase = ShadowPhase::PendingShow;
        self.timer.arm(now, self.policy.delay());
    }

    /// Fire the show timer if due.
    ///
    /// `eligible` is re-evaluated by the owner at fire time; an ineligible
    /// owner drops the pending show. Returns true when the shadow was shown.
    pub fn poll(&mut self, now: Instant, eligible: bool) -> bool {
        if !self.timer.fire_if_due(now) || self.phase != ShadowPhase::PendingShow {
            return false;
        }
        if eligible {
            self.show_now();
            true
        } else {
            tracing::trace!("Shadow show dropped, owner no longer eligible");
            self.phase = ShadowPhase::Hidden;
            false
        }
    }

    /// Hide immediately, no debounce
    pub fn hide(&mut self) {
        self.timer.disarm();
        if self.phase == ShadowPhase::Shown {
            self.surface.set_visible(false);
        }
        self.phase = ShadowPhase::Hidden;
    }

    /// Track owner activation; every change repaints the whole frame
    pub fn set_active(&mut self, active: bool) {
        if self.active == active {
            return;
        }
        self.active = active;
        if self.phase == ShadowPhase::Shown {
            self.repaint();
            self.surface.stack_below_owner();
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Cancel a pending show (window closing)
    pub fn cancel(&mut self) {
        self.timer.disarm();
        if self.phase == ShadowPhase::PendingShow {
            self.phase = ShadowPhase::Hidden;
        }
    }

    /// Hide and destroy the platform window
    pub fn destroy(&mut self) {
        self.hide();
        self.surface.destroy();
        tracing::debug!("Shadow window destroyed");
    }

    fn show_now(&mut self) {
        self.phase = ShadowPhase::Shown;
        self.repaint();
        self.surface.set_visible(true);
        self.surface.stack_below_owner();
    }

    fn repaint(&mut self) {
        let w = self.shadow_width();
        let owner_w = (self.geometry.width - 2 * w).max(0) as u32;
        let owner_h = (self.geometry.height - 2 * w).max(0) as u32;
        let frame = self.painter.paint(owner_w, owner_h, self.active);
        self.surface.present(&frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::headless::HeadlessShadow;
    use std::time::Duration;

    fn shadow(policy: ShadowShowPolicy) -> (ShadowWindow, HeadlessShadow) {
        let surface = HeadlessShadow::new();
        let peek = surface.clone();
        let window = ShadowWindow::new(
            Box::new(surface),
            Rect::new(100, 100, 640, 480),
            10,
            policy,
        );
        (window, peek)
    }

    #[test]
    fn test_geometry_outside_owner() {
        let (window, peek) = shadow(ShadowShowPolicy::default());
        assert_eq!(window.geometry(), Rect::new(90, 90, 660, 500));
        assert_eq!(peek.snapshot().geometry, Rect::new(90, 90, 660, 500));
    }

    #[test]
    fn test_show_later_waits_for_delay() {
        let (mut window, peek) = shadow(ShadowShowPolicy::default());
        let t0 = Instant::now();
        window.show_later(t0);
        assert_eq!(window.phase(), ShadowPhase::PendingShow);
        assert!(!window.poll(t0 + Duration::from_millis(100), true));
        assert!(window.poll(t0 + Duration::from_millis(500), true));
        assert_eq!(window.phase(), ShadowPhase::Shown);
        assert!(peek.snapshot().visible);
        assert_eq!(peek.snapshot().presents, 1);
    }

    #[test]
    fn test_ineligible_owner_drops_show() {
        let (mut window, peek) = shadow(ShadowShowPolicy::default());
        let t0 = Instant::now();
        window.show_later(t0);
        assert!(!window.poll(t0 + Duration::from_secs(1), false));
        assert_eq!(window.phase(), ShadowPhase::Hidden);
        assert!(!peek.snapshot().visible);
    }

    #[test]
    fn test_coalesced_policy_shows_on_next_poll() {
        let (mut window, _peek) = shadow(ShadowShowPolicy::Coalesced);
        let t0 = Instant::now();
        window.show_later(t0);
        window.show_later(t0);
        assert!(window.poll(t0, true));
        assert!(!window.poll(t0, true));
    }

    #[test]
    fn test_hide_is_immediate() {
        let (mut window, peek) = shadow(ShadowShowPolicy::Coalesced);
        let t0 = Instant::now();
        window.show_later(t0);
        window.poll(t0, true);
        window.hide();
        assert_eq!(window.phase(), ShadowPhase::Hidden);
        assert!(!peek.snapshot().visible);
        assert!(window.pending_deadline().is_none());
    }

    #[test]
    fn test_activation_repaints_when_shown() {
        let (mut window, peek) = shadow(ShadowShowPolicy::Coalesced);
        let t0 = Instant::now();
        window.set_active(true);
        assert_eq!(peek.snapshot().presents, 0);

        window.show_later(t0);
        window.poll(t0, true);
        assert_eq!(peek.snapshot().presents, 1);

        window.set_active(false);
        window.set_active(false);
        assert_eq!(peek.snapshot().presents, 2);
    }

    #[test]
    fn test_sized_for_ignores_position() {
        let (window, _peek) = shadow(ShadowShowPolicy::default());
        assert!(window.is_sized_for(Rect::new(0, 0, 640, 480)));
        assert!(!window.is_sized_for(Rect::new(100, 100, 641, 480)));
    }

    #[test]
    fn test_move_does_not_repaint() {
        let (mut window, peek) = shadow(ShadowShowPolicy::Coalesced);
        let t0 = Instant::now();
        window.show_later(t0);
        window.poll(t0, true);
        window.sync_geometry(Rect::new(300, 200, 640, 480));
        assert_eq!(window.geometry(), Rect::new(290, 190, 660, 500));
        assert_eq!(peek.snapshot().presents, 1);

        window.sync_geometry(Rect::new(300, 200, 800, 600));
        assert_eq!(peek.snapshot().presents, 2);
        assert_eq!(peek.snapshot().last_frame_size, Some((820, 620)));
    }
}
