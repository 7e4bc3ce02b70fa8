//! framechrome - Frameless custom-chrome windows
//!
//! Hit-testing for a custom title bar, window show-state tracking, a
//! drop-shadow companion window and an embedded native child, behind one
//! platform-uniform controller.

// Configuration constants
pub mod config;

// Core model
pub mod geometry;
pub mod state;
pub mod timer;
pub mod title_bar;

// Cross-platform trait definitions
pub mod traits;

// Companions
pub mod child;
pub mod shadow;

// Platform backends
pub mod native;

// Window facade
pub mod controller;
pub mod snapshot;

// Ambient: logging and persisted settings
pub mod logging;
pub mod settings;
pub mod settings_io;

pub use controller::{ChromeOptions, CloseDecision, CloseOutcome, FramelessWindow};
pub use geometry::{MarginModel, Margins, Point, Rect};
pub use hit_test::{HitRegion, ResizeEdge};
pub use native::NativeEvent;
pub use snapshot::GeometrySnapshot;
pub use state::{ShowState, WindowState};
pub use title_bar::{CaptionButtonKind, Theme, TitleBar, TitleBarCommand};
