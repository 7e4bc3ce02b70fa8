//! framechrome demo
//!
//! Drives a frameless window over the headless backend with a scripted
//! native event stream, prints what the chrome decides, and persists the
//! final geometry to the settings file for the next run.

use std::time::{Duration, Instant};

use anyhow::Context;

use framechrome::config;
use framechrome::logging;
use framechrome::native::headless::{
    HeadlessChild, HeadlessEventQueue, HeadlessShadow, HeadlessTitleBar, HeadlessWindow,
};
use framechrome::settings::ChromeSettings;
use framechrome::settings_io;
use framechrome::{CloseDecision, FramelessWindow, NativeEvent, Point, Rect, ShowState};

fn load_settings() -> ChromeSettings {
    match settings_io::framechrome_config_dir() {
        Some(dir) => settings_io::load_settings_from_disk(&dir),
        None => ChromeSettings::default(),
    }
}

fn wait_for_shadow(window: &mut FramelessWindow, timeout: Duration) -> bool {
    let start = Instant::now();
    let interval = Duration::from_millis(config::timing::HOST_POLL_INTERVAL_MS);
    while start.elapsed() < timeout {
        if window.poll_timers(Instant::now()) {
            return true;
        }
        std::thread::sleep(interval);
    }
    false
}

fn report(window: &FramelessWindow, label: &str) {
    let shadow = window.shadow().map(|s| (s.phase(), s.geometry()));
    println!(
        "{:<14} frame={:?} state={} active={} shadow={:?}",
        label,
        window.frame_geometry(),
        window.state().show_state(),
        window.is_active(),
        shadow
    );
}

fn main() -> anyhow::Result<()> {
    let mut settings = load_settings();
    if let Err(e) = logging::init_logging(settings.log_level(), settings.log_to_file) {
        eprintln!("Failed to initialize logging: {}", e);
    }
    logging::auto_cleanup_old_logs(settings.log_retention_days);

    let native = HeadlessWindow::new(Rect::new(100, 100, 640, 480));
    let peek = native.clone();
    let mut window = FramelessWindow::new(
        Box::new(native),
        Box::new(HeadlessShadow::new()),
        Box::new(HeadlessChild::new()),
        Box::new(HeadlessTitleBar::new()),
        settings.chrome_options("framechrome demo"),
    )
    .context("Failed to create frameless window")?;

    if let Some(snapshot) = settings.last_geometry() {
        if let Err(e) = window.restore_geometry(&snapshot) {
            tracing::warn!(error = %e, "Saved geometry rejected");
        }
    }

    window.show();
    let mut queue = HeadlessEventQueue::new();
    queue.extend([
        NativeEvent::Activate,
        NativeEvent::EnterSizeMove,
        NativeEvent::Move { x: 160, y: 140 },
        NativeEvent::ExitSizeMove,
    ]);
    peek.simulate_geometry(Rect::new(160, 140, 640, 480));
    window.pump(&mut queue);
    let shown = wait_for_shadow(&mut window, Duration::from_secs(2));
    report(&window, if shown { "shown" } else { "no shadow" });

    let frame = window.frame_geometry();
    for (name, point) in [
        ("caption", Point::new(frame.x + 200, frame.y + 10)),
        ("icon", Point::new(frame.x + 5, frame.y + 10)),
        ("close", Point::new(frame.right() - 5, frame.y + 10)),
        ("left edge", Point::new(frame.x, frame.y + 200)),
        ("client", Point::new(frame.x + 300, frame.y + 300)),
    ] {
        println!(
            "hit {:<10} -> {:?} {:?}",
            name,
            window.handle_hit_test(point),
            window.caption_button_at(point)
        );
    }

    window.show_maximized();
    report(&window, "maximized");

    window.show_normal();
    wait_for_shadow(&mut window, Duration::from_secs(2));
    report(&window, "restored");

    queue.extend([NativeEvent::DpiChanged { dpi: 144 }]);
    window.pump(&mut queue);
    report(&window, "dpi 144");

    let mut asked = 0;
    window.set_close_handler(move || {
        asked += 1;
        if asked == 1 {
            CloseDecision::Cancel
        } else {
            CloseDecision::Accept
        }
    });
    queue.extend([NativeEvent::CloseRequested]);
    window.pump(&mut queue);
    println!("close request -> closed={}", window.is_closed());

    let snapshot = window.geometry_snapshot();
    println!("close again   -> {:?}", window.close());

    if snapshot.show_state != ShowState::Minimized {
        settings.remember(&snapshot)?;
    }
    if let Some(dir) = settings_io::framechrome_config_dir() {
        settings_io::persist_settings_to_disk(&dir, &settings).map_err(anyhow::Error::msg)?;
    }

    Ok(())
}
