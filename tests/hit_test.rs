use framechrome::hit_test::{caption_button_at, edge_inset, resolve};
use framechrome::title_bar::CaptionLayout;
use framechrome::{CaptionButtonKind, HitRegion, MarginModel, Margins, Point, Rect, ResizeEdge};

fn model(ratio: f64) -> MarginModel {
    MarginModel::new(Margins::new(29, 29, 0, 108), ratio).unwrap()
}

#[test]
fn nothing_outside_the_window_is_caption() {
    let window = Rect::new(100, 100, 640, 480);
    let margins = model(1.0);
    for y in (80..600).step_by(7) {
        for x in (60..780).step_by(11) {
            let p = Point::new(x, y);
            if window.contains(p) {
                continue;
            }
            for maximized in [false, true] {
                assert_eq!(resolve(p, window, &margins, maximized), HitRegion::Transparent);
            }
        }
    }
}

#[test]
fn border_flips_with_maximized_state() {
    assert_eq!(edge_inset(false), 1);
    assert_eq!(edge_inset(true), 0);

    let window = Rect::new(0, 0, 640, 480);
    let margins = model(1.0);
    let left = Point::new(0, 240);
    let inside = Point::new(1, 240);

    assert_eq!(
        resolve(left, window, &margins, false),
        HitRegion::ResizeBorder(ResizeEdge::Left)
    );
    assert_eq!(resolve(inside, window, &margins, false), HitRegion::Client);
    assert_eq!(resolve(left, window, &margins, true), HitRegion::Client);
}

#[test]
fn top_edge_beats_caption_and_buttons() {
    let window = Rect::new(0, 0, 640, 480);
    let margins = model(1.0);
    assert_eq!(
        resolve(Point::new(300, 0), window, &margins, false),
        HitRegion::ResizeBorder(ResizeEdge::Top)
    );
    assert_eq!(
        resolve(Point::new(639, 0), window, &margins, false),
        HitRegion::ResizeBorder(ResizeEdge::TopRight)
    );
    // Maximized: the same pixel belongs to the close button
    assert_eq!(
        caption_button_at(
            Point::new(639, 0),
            window,
            &margins,
            true,
            &CaptionLayout::default()
        ),
        Some(CaptionButtonKind::Close)
    );
}

#[test]
fn title_bar_layout_at_unit_ratio() {
    let window = Rect::new(0, 0, 640, 480);
    let margins = model(1.0);
    assert_eq!(resolve(Point::new(10, 10), window, &margins, false), HitRegion::Client);
    assert_eq!(resolve(Point::new(50, 10), window, &margins, false), HitRegion::Caption);
    assert_eq!(
        resolve(Point::new(600, 10), window, &margins, false),
        HitRegion::CaptionButton
    );
    // Right-margin threshold at 640 - 108
    assert_eq!(resolve(Point::new(531, 10), window, &margins, false), HitRegion::Caption);
    assert_eq!(
        resolve(Point::new(532, 10), window, &margins, false),
        HitRegion::CaptionButton
    );
    assert_eq!(resolve(Point::new(50, 29), window, &margins, false), HitRegion::Client);
}

#[test]
fn custom_button_slot_has_no_kind() {
    let window = Rect::new(0, 0, 640, 480);
    let margins = model(1.0);
    let layout = CaptionLayout::default();
    assert_eq!(
        caption_button_at(Point::new(560, 10), window, &margins, false, &layout),
        Some(CaptionButtonKind::Minimize)
    );
    assert_eq!(caption_button_at(Point::new(540, 10), window, &margins, false, &layout), None);
    assert_eq!(caption_button_at(Point::new(50, 10), window, &margins, false, &layout), None);
}

#[test]
fn layout_scales_with_pixel_ratio() {
    let window = Rect::new(0, 0, 1280, 960);
    let margins = model(2.0);
    assert_eq!(resolve(Point::new(50, 20), window, &margins, false), HitRegion::Client);
    assert_eq!(resolve(Point::new(100, 50), window, &margins, false), HitRegion::Caption);
    assert_eq!(resolve(Point::new(100, 60), window, &margins, false), HitRegion::Client);
    assert_eq!(
        resolve(Point::new(1280 - 216, 20), window, &margins, false),
        HitRegion::CaptionButton
    );
    assert_eq!(
        caption_button_at(
            Point::new(1280 - 60, 20),
            window,
            &margins,
            false,
            &CaptionLayout::default()
        ),
        Some(CaptionButtonKind::Maximize)
    );
}

#[test]
fn button_mapping_uses_title_bar_layout() {
    // Three 46px buttons fill a 138px right margin
    let window = Rect::new(0, 0, 800, 600);
    let margins = MarginModel::new(Margins::new(32, 32, 0, 138), 1.0).unwrap();
    let layout = CaptionLayout::new(
        vec![
            CaptionButtonKind::Close,
            CaptionButtonKind::Maximize,
            CaptionButtonKind::Minimize,
        ],
        46,
    );

    let minimize = Point::new(685, 10);
    assert_eq!(resolve(minimize, window, &margins, false), HitRegion::CaptionButton);
    assert_eq!(
        caption_button_at(minimize, window, &margins, false, &layout),
        Some(CaptionButtonKind::Minimize)
    );
    assert_eq!(
        caption_button_at(Point::new(731, 10), window, &margins, true, &layout),
        Some(CaptionButtonKind::Restore)
    );

    // Same point with the 27px default lands in a custom slot
    assert_eq!(
        caption_button_at(minimize, window, &margins, false, &CaptionLayout::default()),
        None
    );
}
