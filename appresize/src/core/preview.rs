use super::tiling::{screen_frame_containing, target_frame, tile_zone, TileZone};
use super::{Point, Rect};
use crate::platform::WindowSystem;

/// Owns the translucent overlay that previews where a window will snap.
/// At most one overlay exists; dropping it removes it from the screen.
pub struct TilingPreview<O> {
    overlay: Option<O>,
    zone: TileZone,
}

impl<O> Default for TilingPreview<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> TilingPreview<O> {
    pub fn new() -> Self {
        Self {
            overlay: None,
            zone: TileZone::None,
        }
    }

    pub fn zone(&self) -> TileZone {
        self.zone
    }

    pub fn is_showing(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn show<W>(&mut self, ws: &W, zone: TileZone, screen: Rect)
    where
        W: WindowSystem<Overlay = O>,
    {
        if zone == self.zone && self.is_showing() {
            return;
        }

        self.hide();
        self.zone = zone;

        if zone == TileZone::None {
            return;
        }
        let frame = target_frame(zone, screen);
        if frame.is_empty() {
            return;
        }

        tracing::debug!("Showing tiling preview {:?} at {:?}", zone, frame);
        self.overlay = ws.create_overlay(frame);
        if self.overlay.is_none() {
            tracing::warn!("Failed to create tiling preview for {:?}", zone);
        }
    }

    pub fn hide(&mut self) {
        if self.overlay.take().is_some() {
            tracing::debug!("Hiding tiling preview {:?}", self.zone);
        }
        self.zone = TileZone::None;
    }

    /// Re-evaluates the zone under `point` (display space).
    pub fn update<W>(&mut self, ws: &W, point: Point)
    where
        W: WindowSystem<Overlay = O>,
    {
        match screen_frame_containing(&ws.displays(), point) {
            Some(screen) => self.show(ws, tile_zone(point, screen), screen),
            None => self.hide(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::{create_test_display, MockOverlay, MockWindowSystem};

    fn setup() -> (MockWindowSystem, TilingPreview<MockOverlay>) {
        let ws = MockWindowSystem::new().with_displays(vec![create_test_display(
            0.0, 0.0, 1920.0, 1080.0, true,
        )]);
        (ws, TilingPreview::new())
    }

    #[test]
    fn test_show_creates_overlay_at_target() {
        let (ws, mut preview) = setup();
        let screen = Rect::new(0.0, 0.0, 1920.0, 1080.0);

        preview.show(&ws, TileZone::Left, screen);

        assert!(preview.is_showing());
        assert_eq!(preview.zone(), TileZone::Left);
        let log = ws.overlay_log();
        assert_eq!(log.borrow().shown, vec![Rect::new(0.0, 0.0, 960.0, 1080.0)]);
        assert_eq!(log.borrow().live, 1);
    }

    #[test]
    fn test_same_zone_does_not_redraw() {
        let (ws, mut preview) = setup();
        let screen = Rect::new(0.0, 0.0, 1920.0, 1080.0);

        preview.show(&ws, TileZone::Top, screen);
        preview.show(&ws, TileZone::Top, screen);
        preview.show(&ws, TileZone::Top, screen);

        assert_eq!(ws.overlay_log().borrow().shown.len(), 1);
    }

    #[test]
    fn test_zone_change_replaces_overlay() {
        let (ws, mut preview) = setup();
        let screen = Rect::new(0.0, 0.0, 1920.0, 1080.0);

        preview.show(&ws, TileZone::Left, screen);
        preview.show(&ws, TileZone::TopLeft, screen);
        preview.show(&ws, TileZone::Right, screen);

        let log = ws.overlay_log();
        assert_eq!(log.borrow().shown.len(), 3);
        assert_eq!(log.borrow().live, 1);
        assert_eq!(log.borrow().max_live, 1);
        assert_eq!(preview.zone(), TileZone::Right);
    }

    #[test]
    fn test_none_zone_leaves_nothing_showing() {
        let (ws, mut preview) = setup();
        let screen = Rect::new(0.0, 0.0, 1920.0, 1080.0);

        preview.show(&ws, TileZone::Bottom, screen);
        preview.show(&ws, TileZone::None, screen);

        assert!(!preview.is_showing());
        assert_eq!(preview.zone(), TileZone::None);
        assert_eq!(ws.overlay_log().borrow().live, 0);
    }

    #[test]
    fn test_degenerate_screen_shows_nothing() {
        let (ws, mut preview) = setup();

        preview.show(&ws, TileZone::Left, Rect::ZERO);

        assert!(!preview.is_showing());
        assert!(ws.overlay_log().borrow().shown.is_empty());
    }

    #[test]
    fn test_hide_is_idempotent() {
        let (ws, mut preview) = setup();
        preview.hide();

        preview.show(&ws, TileZone::Right, Rect::new(0.0, 0.0, 1920.0, 1080.0));
        preview.hide();
        preview.hide();

        assert!(!preview.is_showing());
        assert_eq!(preview.zone(), TileZone::None);
        assert_eq!(ws.overlay_log().borrow().live, 0);
    }

    #[test]
    fn test_show_after_hide_redraws_same_zone() {
        let (ws, mut preview) = setup();
        let screen = Rect::new(0.0, 0.0, 1920.0, 1080.0);

        preview.show(&ws, TileZone::Left, screen);
        preview.hide();
        preview.show(&ws, TileZone::Left, screen);

        assert_eq!(ws.overlay_log().borrow().shown.len(), 2);
        assert!(preview.is_showing());
    }

    #[test]
    fn test_update_follows_pointer() {
        let (ws, mut preview) = setup();

        preview.update(&ws, Point::new(15.0, 500.0));
        assert_eq!(preview.zone(), TileZone::Left);

        preview.update(&ws, Point::new(960.0, 540.0));
        assert_eq!(preview.zone(), TileZone::None);
        assert!(!preview.is_showing());

        preview.update(&ws, Point::new(1900.0, 20.0));
        assert_eq!(preview.zone(), TileZone::BottomRight);
        assert_eq!(ws.overlay_log().borrow().max_live, 1);
    }

    #[test]
    fn test_update_without_displays_hides() {
        let (ws, mut preview) = setup();
        preview.update(&ws, Point::new(15.0, 500.0));
        assert!(preview.is_showing());

        let empty = MockWindowSystem::new();
        let mut other: TilingPreview<MockOverlay> = TilingPreview::new();
        other.update(&empty, Point::new(15.0, 500.0));
        assert!(!other.is_showing());

        preview.update(&empty, Point::new(15.0, 500.0));
        assert!(!preview.is_showing());
    }
}
