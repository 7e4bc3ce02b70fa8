//! Chrome Configuration Constants
//!
//! Centralized configuration for all magic numbers, colors, timings, and defaults.
//! This makes the codebase more maintainable and easier to tune.

/// Title Bar Configuration
pub mod title_bar {
    /// Default title bar height in logical pixels
    pub const DEFAULT_HEIGHT: i32 = 29;

    /// Default icon strip width in logical pixels (square icon cell)
    pub const DEFAULT_ICON_WIDTH: i32 = 29;

    /// Default reserved strip right of the icon (custom left-aligned widget)
    pub const DEFAULT_LEFT_MARGIN: i32 = 0;

    /// Width of one caption button in logical pixels
    pub const CAPTION_BUTTON_WIDTH: i32 = 27;

    /// Caption buttons laid out right-to-left: close, maximize/restore, minimize, plus one
    /// custom slot left of minimize
    pub const CAPTION_BUTTON_COUNT: i32 = 4;

    /// Default reserved strip on the right (caption buttons)
    pub const DEFAULT_RIGHT_MARGIN: i32 = CAPTION_BUTTON_WIDTH * CAPTION_BUTTON_COUNT;
}

/// Hit-Test Configuration
pub mod hit_test {
    /// Resize border thickness (physical pixels) when the window is not maximized
    pub const RESIZE_INSET: i32 = 1;

    /// Resize border thickness when maximized: maximized windows cannot be resized
    pub const MAXIMIZED_INSET: i32 = 0;
}

/// Shadow Window Configuration
pub mod shadow {
    /// Default shadow width around the owner frame (logical pixels)
    pub const DEFAULT_WIDTH: i32 = 10;

    /// Peak shadow alpha (0-255) next to the frame of an active window
    pub const ACTIVE_ALPHA: u8 = 0x60;

    /// Peak shadow alpha (0-255) next to the frame of an inactive window
    pub const INACTIVE_ALPHA: u8 = 0x30;

    /// Shadow tint (RGB), premultiplied with alpha at composite time
    pub const COLOR_RGB: [u8; 3] = [0, 0, 0];
}

/// Retry and Timing Configuration
pub mod timing {
    /// Debounce before the shadow is shown again after a state change (milliseconds)
    pub const SHADOW_SHOW_DELAY_MS: u64 = 500;

    /// Poll interval for the demo host loop (milliseconds)
    pub const HOST_POLL_INTERVAL_MS: u64 = 10;

    /// Log retention period in days
    pub const LOG_RETENTION_DAYS: u32 = 30;
}

/// Display Configuration
pub mod display {
    /// Baseline DPI corresponding to a pixel ratio of 1.0
    pub const BASE_DPI: u32 = 96;

    /// Smallest accepted pixel ratio; anything at or below zero is rejected
    pub const MIN_PIXEL_RATIO: f64 = 0.25;

    /// Smallest frame accepted when restoring saved geometry
    pub const MIN_WINDOW_SIZE: i32 = 50;

    pub const MAX_WINDOW_WIDTH: i32 = 7680;
    pub const MAX_WINDOW_HEIGHT: i32 = 4320;
}

/// Color Utilities
pub mod colors {
    /// Premultiply an RGB tint with alpha into an RGBA pixel
    pub fn premultiply(rgb: [u8; 3], alpha: u8) -> [u8; 4] {
        let scale = |c: u8| ((c as u32 * alpha as u32 + 127) / 255) as u8;
        [scale(rgb[0]), scale(rgb[1]), scale(rgb[2]), alpha]
    }

    /// Convert RGBA byte array to premultiplied BGRA u32 (0xAARRGGBB), the layout
    /// layered windows expect
    pub fn rgba_to_bgra_u32(rgba: [u8; 4]) -> u32 {
        ((rgba[3] as u32) << 24)
            | ((rgba[0] as u32) << 16)
            | ((rgba[1] as u32) << 8)
            | (rgba[2] as u32)
    }

    /// Scale a 0-255 alpha by a 0.0-1.0 intensity
    pub fn scale_alpha(alpha: u8, intensity: f32) -> u8 {
        (alpha as f32 * intensity.clamp(0.0, 1.0)).round() as u8
    }
}
