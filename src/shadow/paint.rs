//! Shadow painting
//!
//! One radial-gradient tile of `2w x 2w` is rendered per repaint; the frame is
//! composited from its four quadrants (corners) and four one-pixel slices
//! through its center (edges). The owner area stays fully transparent.

use crate::config;
use crate::config::colors::{premultiply, scale_alpha};

/// Premultiplied RGBA pixel buffer covering the whole shadow frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl ShadowFrame {
    fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    pub fn alpha(&self, x: u32, y: u32) -> u8 {
        self.pixel(x, y)[3]
    }

    fn put(&mut self, x: u32, y: u32, px: [u8; 4]) {
        let i = ((y * self.width + x) * 4) as usize;
        self.pixels[i..i + 4].copy_from_slice(&px);
    }
}

/// Corner tile: the gradient around a single window corner placed at (w, w)
#[derive(Debug, Clone)]
pub struct ShadowTile {
    size: u32,
    pixels: Vec<[u8; 4]>,
}

impl ShadowTile {
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels[(y * self.size + x) as usize]
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ShadowPainter {
    shadow_width: u32,
    color: [u8; 3],
}

impl ShadowPainter {
    pub fn new(shadow_width: u32) -> Self {
        Self {
            shadow_width,
            color: config::shadow::COLOR_RGB,
        }
    }

    pub fn shadow_width(&self) -> u32 {
        self.shadow_width
    }

    pub fn set_shadow_width(&mut self, width: u32) {
        self.shadow_width = width;
    }

    fn peak_alpha(active: bool) -> u8 {
        if active {
            config::shadow::ACTIVE_ALPHA
        } else {
            config::shadow::INACTIVE_ALPHA
        }
    }

    /// Render the radial corner tile
    pub fn render_tile(&self, active: bool) -> ShadowTile {
        let w = self.shadow_width;
        let size = w * 2;
        let peak = Self::peak_alpha(active);
        let center = w as f32;
        let radius = w.max(1) as f32;

        let mut pixels = Vec::with_capacity((size * size) as usize);
        for ty in 0..size {
            for tx in 0..size {
                let dx = tx as f32 + 0.5 - center;
                let dy = ty as f32 + 0.5 - center;
                let d = (dx * dx + dy * dy).sqrt();
                let falloff = (1.0 - d / radius).clamp(0.0, 1.0);
                let alpha = scale_alpha(peak, falloff * falloff);
                pixels.push(premultiply(self.color, alpha));
            }
        }
        ShadowTile { size, pixels }
    }

    /// Paint a full shadow frame around an owner of the given size
    pub fn paint(&self, owner_width: u32, owner_height: u32, active: bool) -> ShadowFrame {
        let w = self.shadow_width;
        let frame_w = owner_width + 2 * w;
        let frame_h = owner_height + 2 * w;
        let mut frame = ShadowFrame::transparent(frame_w, frame_h);
        if w == 0 {
            return frame;
        }

        let tile = self.render_tile(active);

        // Corners
        blit(&tile, (0, 0), (w, w), &mut frame, (0, 0));
        blit(&tile, (w, 0), (w, w), &mut frame, (frame_w - w, 0));
        blit(&tile, (0, w), (w, w), &mut frame, (0, frame_h - w));
        blit(&tile, (w, w), (w, w), &mut frame, (frame_w - w, frame_h - w));

        // Edges: stretch the slice through the tile center
        stretch(&tile, (w, 0), (1, w), &mut frame, (w, 0), (owner_width, w));
        stretch(&tile, (w, w), (1, w), &mut frame, (w, frame_h - w), (owner_width, w));
        stretch(&tile, (0, w), (w, 1), &mut frame, (0, w), (w, owner_height));
        stretch(&tile, (w, w), (w, 1), &mut frame, (frame_w - w, w), (w, owner_height));

        frame
    }
}

/// Copy a `size` block from the tile into the frame
fn blit(tile: &ShadowTile, src: (u32, u32), size: (u32, u32), frame: &mut ShadowFrame, dst: (u32, u32)) {
    for y in 0..size.1 {
        for x in 0..size.0 {
            frame.put(dst.0 + x, dst.1 + y, tile.pixel(src.0 + x, src.1 + y));
        }
    }
}

/// Repeat a one-pixel-thick tile slice across `dst_size`
fn stretch(
    tile: &ShadowTile,
    src: (u32, u32),
    src_size: (u32, u32),
    frame: &mut ShadowFrame,
    dst: (u32, u32),
    dst_size: (u32, u32),
) {
    for y in 0..dst_size.1 {
        for x in 0..dst_size.0 {
            let sx = src.0 + if src_size.0 == 1 { 0 } else { x };
            let sy = src.1 + if src_size.1 == 1 { 0 } else { y };
            frame.put(dst.0 + x, dst.1 + y, tile.pixel(sx, sy));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_size_includes_shadow() {
        let frame = ShadowPainter::new(10).paint(640, 480, true);
        assert_eq!(frame.width, 660);
        assert_eq!(frame.height, 500);
        assert_eq!(frame.pixels.len(), 660 * 500 * 4);
    }

    #[test]
    fn test_owner_area_is_transparent() {
        let frame = ShadowPainter::new(10).paint(100, 80, true);
        for y in 10..90 {
            for x in 10..110 {
                assert_eq!(frame.alpha(x, y), 0, "pixel ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_shadow_fades_outward() {
        let frame = ShadowPainter::new(10).paint(100, 80, true);
        let near = frame.alpha(60, 9);
        let far = frame.alpha(60, 1);
        assert!(near > far);
        assert!(near > 0);
        // Outermost corner pixel is fully transparent
        assert_eq!(frame.alpha(0, 0), 0);
    }

    #[test]
    fn test_edges_are_symmetric() {
        let frame = ShadowPainter::new(8).paint(50, 40, false);
        for d in 0..8 {
            assert_eq!(frame.alpha(30, d), frame.alpha(30, 40 + 16 - 1 - d), "row {}", d);
            assert_eq!(frame.alpha(d, 20), frame.alpha(50 + 16 - 1 - d, 20), "col {}", d);
        }
    }

    #[test]
    fn test_inactive_is_lighter() {
        let painter = ShadowPainter::new(10);
        let active = painter.paint(100, 100, true);
        let inactive = painter.paint(100, 100, false);
        assert!(active.alpha(50, 9) > inactive.alpha(50, 9));
    }

    #[test]
    fn test_zero_width_shadow_is_empty() {
        let frame = ShadowPainter::new(0).paint(10, 10, true);
        assert_eq!(frame.width, 10);
        assert!(frame.pixels.iter().all(|b| *b == 0));
    }
}
