use std::time::{Duration, Instant};

use framechrome::native::headless::HeadlessShadow;
use framechrome::shadow::{frame_for_owner, ShadowPhase, ShadowWindow};
use framechrome::timer::ShadowShowPolicy;
use framechrome::Rect;

fn shadow(policy: ShadowShowPolicy) -> (ShadowWindow, HeadlessShadow) {
    let surface = HeadlessShadow::new();
    let peek = surface.clone();
    let window = ShadowWindow::new(Box::new(surface), Rect::new(100, 100, 640, 480), 10, policy);
    (window, peek)
}

#[test]
fn frame_is_owner_outset_by_width() {
    assert_eq!(
        frame_for_owner(Rect::new(100, 100, 640, 480), 10),
        Rect::new(90, 90, 660, 500)
    );
    assert_eq!(
        frame_for_owner(Rect::new(0, 0, 640, 480), 0),
        Rect::new(0, 0, 640, 480)
    );
}

#[test]
fn repeated_show_requests_restart_the_delay() {
    let (mut window, peek) = shadow(ShadowShowPolicy::Debounced { delay_ms: 500 });
    let t0 = Instant::now();
    window.show_later(t0);
    let t1 = t0 + Duration::from_millis(300);
    window.show_later(t1);

    // Would have fired for the first request, not for the second
    assert!(!window.poll(t0 + Duration::from_millis(600), true));
    assert_eq!(window.phase(), ShadowPhase::PendingShow);

    assert!(window.poll(t1 + Duration::from_millis(500), true));
    assert!(!window.poll(t1 + Duration::from_secs(5), true));
    assert_eq!(peek.snapshot().presents, 1);
    assert_eq!(peek.snapshot().stack_calls, 1);
}

#[test]
fn hide_during_pending_show_cancels_it() {
    let (mut window, peek) = shadow(ShadowShowPolicy::default());
    let t0 = Instant::now();
    window.show_later(t0);
    window.hide();
    assert!(!window.poll(t0 + Duration::from_secs(1), true));
    assert!(!peek.snapshot().visible);
}

#[test]
fn width_change_repaints_shown_shadow() {
    let (mut window, peek) = shadow(ShadowShowPolicy::Coalesced);
    let t0 = Instant::now();
    window.show_later(t0);
    window.poll(t0, true);

    window.set_shadow_width(Rect::new(100, 100, 640, 480), 16);
    assert_eq!(window.geometry(), Rect::new(84, 84, 672, 512));
    assert_eq!(peek.snapshot().last_frame_size, Some((672, 512)));
    assert_eq!(peek.snapshot().presents, 2);
}

#[test]
fn destroy_hides_and_releases_surface() {
    let (mut window, peek) = shadow(ShadowShowPolicy::Coalesced);
    let t0 = Instant::now();
    window.show_later(t0);
    window.poll(t0, true);
    window.destroy();
    let state = peek.snapshot();
    assert!(state.destroyed);
    assert!(!state.visible);
}
