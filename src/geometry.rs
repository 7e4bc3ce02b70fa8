//! Geometry and margin model
//!
//! Rectangles, points and the title-bar margin model shared by the hit-test
//! resolver, the shadow window and the embedded child. Margins are stored in
//! logical pixels and scaled to physical pixels by the window's pixel ratio.

use serde::{Deserialize, Serialize};

use crate::config;

/// A point in physical pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle (x, y, width, height) in physical pixels.
///
/// Containment is half-open: `right()` and `bottom()` are outside.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> i32 {
        self.x
    }

    pub fn top(&self) -> i32 {
        self.y
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left() && p.x < self.right() && p.y >= self.top() && p.y < self.bottom()
    }

    /// Shrink by `d` on every side. Never produces a negative size.
    pub fn inset(&self, d: i32) -> Rect {
        Rect {
            x: self.x + d,
            y: self.y + d,
            width: (self.width - 2 * d).max(0),
            height: (self.height - 2 * d).max(0),
        }
    }

    /// Grow by `d` on every side.
    pub fn outset(&self, d: i32) -> Rect {
        self.inset(-d)
    }

    /// Same size, origin at (0, 0)
    pub fn local(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// Translate a screen point into this rectangle's local coordinates
    pub fn to_local(&self, p: Point) -> Point {
        Point::new(p.x - self.x, p.y - self.y)
    }

    pub fn with_position(&self, x: i32, y: i32) -> Rect {
        Rect::new(x, y, self.width, self.height)
    }

    pub fn with_size(&self, width: i32, height: i32) -> Rect {
        Rect::new(self.x, self.y, width, height)
    }
}

/// Title-bar margins in logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Margins {
    pub title_bar_height: i32,
    pub icon_width: i32,
    pub left: i32,
    pub right: i32,
}

impl Default for Margins {
    fn default() -> Self {
        use config::title_bar::*;
        Self {
            title_bar_height: DEFAULT_HEIGHT,
            icon_width: DEFAULT_ICON_WIDTH,
            left: DEFAULT_LEFT_MARGIN,
            right: DEFAULT_RIGHT_MARGIN,
        }
    }
}

impl Margins {
    pub fn new(title_bar_height: i32, icon_width: i32, left: i32, right: i32) -> Self {
        Self {
            title_bar_height,
            icon_width,
            left,
            right,
        }
    }

    /// Validate margins
    ///
    /// # Returns
    /// Ok(()) if every value is non-negative, Err with description otherwise
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("title_bar_height", self.title_bar_height),
            ("icon_width", self.icon_width),
            ("left", self.left),
            ("right", self.right),
        ];
        for (name, value) in fields {
            if value < 0 {
                return Err(format!("Margin {} must be non-negative, got {}", name, value));
            }
        }
        Ok(())
    }
}

/// Validate a pixel ratio (must be finite and strictly positive)
pub fn validate_pixel_ratio(ratio: f64) -> Result<(), String> {
    if !ratio.is_finite() || ratio < config::display::MIN_PIXEL_RATIO {
        return Err(format!(
            "Invalid pixel ratio: {} (minimum {})",
            ratio,
            config::display::MIN_PIXEL_RATIO
        ));
    }
    Ok(())
}

/// Margins plus the pixel ratio they are scaled by.
///
/// Mutated only by the window controller in response to DPI or layout
/// changes; read on every hit-test query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarginModel {
    margins: Margins,
    pixel_ratio: f64,
}

impl Default for MarginModel {
    fn default() -> Self {
        Self {
            margins: Margins::default(),
            pixel_ratio: 1.0,
        }
    }
}

impl MarginModel {
    pub fn new(margins: Margins, pixel_ratio: f64) -> Result<Self, String> {
        margins.validate()?;
        validate_pixel_ratio(pixel_ratio)?;
        Ok(Self {
            margins,
            pixel_ratio,
        })
    }

    /// Logical margins as configured
    pub fn margins(&self) -> Margins {
        self.margins
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    pub fn set_margins(&mut self, margins: Margins) -> Result<(), String> {
        margins.validate()?;
        self.margins = margins;
        Ok(())
    }

    pub fn set_pixel_ratio(&mut self, ratio: f64) -> Result<(), String> {
        validate_pixel_ratio(ratio)?;
        self.pixel_ratio = ratio;
        Ok(())
    }

    /// Convert logical pixels to physical pixels
    pub fn to_physical(&self, logical: i32) -> i32 {
        (logical as f64 * self.pixel_ratio).round() as i32
    }

    /// Margins scaled to physical pixels
    pub fn physical(&self) -> Margins {
        Margins {
            title_bar_height: self.to_physical(self.margins.title_bar_height),
            icon_width: self.to_physical(self.margins.icon_width),
            left: self.to_physical(self.margins.left),
            right: self.to_physical(self.margins.right),
        }
    }
}

/// Pixel ratio for a DPI value reported by the platform
pub fn pixel_ratio_for_dpi(dpi: u32) -> f64 {
    if dpi == 0 {
        1.0
    } else {
        dpi as f64 / config::display::BASE_DPI as f64
    }
}

/// Check a frame size against the accepted window bounds
pub fn validate_window_size(width: i32, height: i32) -> Result<(), String> {
    use config::display::{MAX_WINDOW_HEIGHT, MAX_WINDOW_WIDTH, MIN_WINDOW_SIZE};
    if width < MIN_WINDOW_SIZE || height < MIN_WINDOW_SIZE {
        return Err(format!(
            "Window too small: {}x{} (minimum {}x{})",
            width, height, MIN_WINDOW_SIZE, MIN_WINDOW_SIZE
        ));
    }
    if width > MAX_WINDOW_WIDTH || height > MAX_WINDOW_HEIGHT {
        return Err(format!(
            "Window too large: {}x{} (maximum {}x{})",
            width, height, MAX_WINDOW_WIDTH, MAX_WINDOW_HEIGHT
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges_and_contains() {
        let r = Rect::new(100, 100, 200, 150);
        assert_eq!(r.right(), 300);
        assert_eq!(r.bottom(), 250);
        assert!(r.contains(Point::new(100, 100)));
        assert!(r.contains(Point::new(299, 249)));
        assert!(!r.contains(Point::new(300, 120)));
        assert!(!r.contains(Point::new(120, 250)));
    }

    #[test]
    fn test_inset_and_outset() {
        let r = Rect::new(100, 100, 200, 150);
        assert_eq!(r.inset(4), Rect::new(104, 104, 192, 142));
        assert_eq!(r.outset(10), Rect::new(90, 90, 220, 170));
    }

    #[test]
    fn test_window_size_validation() {
        assert!(validate_window_size(640, 480).is_ok());
        assert!(validate_window_size(49, 480).is_err());
        assert!(validate_window_size(640, 4321).is_err());
    }

    #[test]
    fn test_inset_minimum() {
        // Inset larger than the rect must not produce negative sizes
        let r = Rect::new(0, 0, 10, 10).inset(20);
        assert_eq!(r.width, 0);
        assert_eq!(r.height, 0);
        assert!(r.is_empty());
    }

    #[test]
    fn test_negative_margin_rejected() {
        assert!(Margins::new(29, 29, -1, 108).validate().is_err());
        assert!(MarginModel::new(Margins::new(-5, 0, 0, 0), 1.0).is_err());
    }

    #[test]
    fn test_pixel_ratio_rejected() {
        assert!(MarginModel::new(Margins::default(), 0.0).is_err());
        assert!(MarginModel::new(Margins::default(), -1.0).is_err());
        assert!(MarginModel::new(Margins::default(), f64::NAN).is_err());
        assert!(MarginModel::new(Margins::default(), 1.5).is_ok());
    }

    #[test]
    fn test_physical_scaling_rounds() {
        let model = MarginModel::new(Margins::new(29, 29, 0, 108), 1.25).unwrap();
        let p = model.physical();
        assert_eq!(p.title_bar_height, 36); // 36.25
        assert_eq!(p.right, 135);
    }

    #[test]
    fn test_pixel_ratio_for_dpi() {
        assert_eq!(pixel_ratio_for_dpi(96), 1.0);
        assert_eq!(pixel_ratio_for_dpi(144), 1.5);
        assert_eq!(pixel_ratio_for_dpi(0), 1.0);
    }
}
