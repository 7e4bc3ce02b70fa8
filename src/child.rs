//! Embedded native child surface
//!
//! Intercepts a fixed set of messages before they reach the native child
//! embedded in the frame: hit-tests pass through to the frame outside the
//! child's own client area, system keys and menus go to the logical parent,
//! and child windows created or destroyed underneath are propagated upward so
//! modal dialogs route to the right owner.

use std::collections::BTreeSet;

use crate::geometry::{MarginModel, Point, Rect};
use crate::hit_test::{self, HitRegion};
use crate::state::ShowState;
use crate::traits::{ChildSurface, PlacementSource};

/// Identifier of a native window created under the embedded child
pub type ChildId = u64;

/// Messages the child surface intercepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildMessage {
    HitTest(Point),
    SysKeyDown(u32),
    SysKeyUp(u32),
    SysChar(u32),
    SysCommand(u32),
    ContextMenu(Point),
    ChildCreated(ChildId),
    ChildDestroyed(ChildId),
    Other(u32),
}

/// What to do with an intercepted message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildDisposition {
    /// Answer the hit-test with this region
    HitTest(HitRegion),
    /// Do not let the child consume it; re-post to the logical parent
    ForwardToParent,
    /// Registry changed; the parent must re-evaluate modal routing
    PropagateToParent,
    /// Default native handling
    Default,
}

pub struct EmbeddedChild {
    surface: Box<dyn ChildSurface>,
    geometry: Rect,
    children: BTreeSet<ChildId>,
}

impl EmbeddedChild {
    pub fn new(surface: Box<dyn ChildSurface>, client: Rect) -> Self {
        let mut child = Self {
            surface,
            geometry: Rect::default(),
            children: BTreeSet::new(),
        };
        child.set_geometry(client);
        child
    }

    pub fn geometry(&self) -> Rect {
        self.geometry
    }

    pub fn set_geometry(&mut self, client: Rect) {
        if client == self.geometry {
            return;
        }
        self.geometry = client;
        self.surface.set_geometry(client);
    }

    /// Windows currently registered under the child
    pub fn children(&self) -> impl Iterator<Item = &ChildId> {
        self.children.iter()
    }

    /// Classify an intercepted message.
    ///
    /// # Arguments
    /// * `message` - Message addressed to the child
    /// * `window` - Owner frame in screen physical pixels
    /// * `margins` - Current margin model
    /// * `placement` - Queried for the maximized state; a failed query counts
    ///   as not maximized so resize borders stay reachable
    pub fn intercept(
        &mut self,
        message: &ChildMessage,
        window: Rect,
        margins: &MarginModel,
        placement: &dyn PlacementSource,
    ) -> ChildDisposition {
        match *message {
            ChildMessage::HitTest(point) => {
                let maximized = match placement.query_actual_window_placement() {
                    Ok(p) => p.show == ShowState::Maximized,
                    Err(e) => {
                        tracing::warn!(error = %e, "Placement query failed in child hit-test");
                        false
                    }
                };
                let region = match hit_test::resolve(point, window, margins, maximized) {
                    HitRegion::Client => HitRegion::Client,
                    _ => HitRegion::Transparent,
                };
                ChildDisposition::HitTest(region)
            }
            ChildMessage::SysKeyDown(_)
            | ChildMessage::SysKeyUp(_)
            | ChildMessage::SysChar(_)
            | ChildMessage::SysCommand(_)
            | ChildMessage::ContextMenu(_) => {
                self.surface.post_to_parent(message);
                ChildDisposition::ForwardToParent
            }
            ChildMessage::ChildCreated(id) => {
                if self.children.insert(id) {
                    tracing::debug!(child = id, "Child window registered");
                }
                ChildDisposition::PropagateToParent
            }
            ChildMessage::ChildDestroyed(id) => {
                if self.children.remove(&id) {
                    tracing::debug!(child = id, "Child window unregistered");
                }
                ChildDisposition::PropagateToParent
            }
            ChildMessage::Other(_) => ChildDisposition::Default,
        }
    }

    pub fn destroy(&mut self) {
        self.children.clear();
        self.surface.destroy();
        tracing::debug!("Embedded child destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Margins;
    use crate::native::headless::{HeadlessChild, HeadlessWindow};

    fn setup() -> (EmbeddedChild, HeadlessChild, HeadlessWindow, MarginModel) {
        let surface = HeadlessChild::new();
        let peek = surface.clone();
        let child = EmbeddedChild::new(Box::new(surface), Rect::new(0, 29, 640, 451));
        let window = HeadlessWindow::new(Rect::new(0, 0, 640, 480));
        let margins = MarginModel::new(Margins::new(29, 29, 0, 108), 1.0).unwrap();
        (child, peek, window, margins)
    }

    #[test]
    fn test_hit_test_passes_through_outside_client() {
        let (mut child, _peek, window, margins) = setup();
        let frame = Rect::new(0, 0, 640, 480);
        assert_eq!(
            child.intercept(&ChildMessage::HitTest(Point::new(50, 10)), frame, &margins, &window),
            ChildDisposition::HitTest(HitRegion::Transparent)
        );
        assert_eq!(
            child.intercept(&ChildMessage::HitTest(Point::new(300, 300)), frame, &margins, &window),
            ChildDisposition::HitTest(HitRegion::Client)
        );
        assert_eq!(
            child.intercept(&ChildMessage::HitTest(Point::new(0, 300)), frame, &margins, &window),
            ChildDisposition::HitTest(HitRegion::Transparent)
        );
    }

    #[test]
    fn test_placement_failure_keeps_resize_border() {
        let (mut child, _peek, window, margins) = setup();
        window.simulate_show_state(ShowState::Maximized);
        window.fail_placement_queries(true);
        let frame = Rect::new(0, 0, 640, 480);
        // Left edge pixel: resize border when not maximized, so it is not the child's
        assert_eq!(
            child.intercept(&ChildMessage::HitTest(Point::new(0, 300)), frame, &margins, &window),
            ChildDisposition::HitTest(HitRegion::Transparent)
        );

        window.fail_placement_queries(false);
        assert_eq!(
            child.intercept(&ChildMessage::HitTest(Point::new(0, 300)), frame, &margins, &window),
            ChildDisposition::HitTest(HitRegion::Client)
        );
    }

    #[test]
    fn test_system_keys_forwarded_to_parent() {
        let (mut child, peek, window, margins) = setup();
        let frame = Rect::new(0, 0, 640, 480);
        let msg = ChildMessage::SysKeyDown(0x73);
        assert_eq!(
            child.intercept(&msg, frame, &margins, &window),
            ChildDisposition::ForwardToParent
        );
        assert_eq!(peek.snapshot().forwarded, vec![msg]);
    }

    #[test]
    fn test_child_registry() {
        let (mut child, _peek, window, margins) = setup();
        let frame = Rect::new(0, 0, 640, 480);
        child.intercept(&ChildMessage::ChildCreated(7), frame, &margins, &window);
        child.intercept(&ChildMessage::ChildCreated(9), frame, &margins, &window);
        assert_eq!(child.children().copied().collect::<Vec<_>>(), vec![7, 9]);
        assert_eq!(
            child.intercept(&ChildMessage::ChildDestroyed(7), frame, &margins, &window),
            ChildDisposition::PropagateToParent
        );
        assert_eq!(child.children().copied().collect::<Vec<_>>(), vec![9]);
        assert_eq!(
            child.intercept(&ChildMessage::Other(0x20), frame, &margins, &window),
            ChildDisposition::Default
        );
    }
}
