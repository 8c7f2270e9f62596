use super::{Point, Rect};
use crate::platform::Display;

/// Distance from a screen edge within which a release snaps the window.
pub const EDGE_THRESHOLD: f64 = 50.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TileZone {
    #[default]
    None,
    Left,
    Right,
    Top,
    Bottom,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Classifies `point` against the edges of `screen`, in display space (the
/// top edge is the maximum y). Corners are tested before single edges.
pub fn tile_zone(point: Point, screen: Rect) -> TileZone {
    let near_left = point.x - screen.min_x() <= EDGE_THRESHOLD;
    let near_right = screen.max_x() - point.x <= EDGE_THRESHOLD;
    let near_top = screen.max_y() - point.y <= EDGE_THRESHOLD;
    let near_bottom = point.y - screen.min_y() <= EDGE_THRESHOLD;

    match (near_left, near_right, near_top, near_bottom) {
        (true, _, true, _) => TileZone::TopLeft,
        (_, true, true, _) => TileZone::TopRight,
        (true, _, _, true) => TileZone::BottomLeft,
        (_, true, _, true) => TileZone::BottomRight,
        (true, _, _, _) => TileZone::Left,
        (_, true, _, _) => TileZone::Right,
        (_, _, true, _) => TileZone::Top,
        (_, _, _, true) => TileZone::Bottom,
        _ => TileZone::None,
    }
}

/// The half or quarter of `screen` a window snaps to. `TileZone::None` maps
/// to `Rect::ZERO`, which must not be applied.
pub fn target_frame(zone: TileZone, screen: Rect) -> Rect {
    let x = screen.min_x();
    let y = screen.min_y();
    let half_width = screen.size.width / 2.0;
    let half_height = screen.size.height / 2.0;

    match zone {
        TileZone::Left => Rect::new(x, y, half_width, screen.size.height),
        TileZone::Right => Rect::new(x + half_width, y, half_width, screen.size.height),
        TileZone::Top => Rect::new(x, y + half_height, screen.size.width, half_height),
        TileZone::Bottom => Rect::new(x, y, screen.size.width, half_height),
        TileZone::TopLeft => Rect::new(x, y + half_height, half_width, half_height),
        TileZone::TopRight => Rect::new(x + half_width, y + half_height, half_width, half_height),
        TileZone::BottomLeft => Rect::new(x, y, half_width, half_height),
        TileZone::BottomRight => Rect::new(x + half_width, y, half_width, half_height),
        TileZone::None => Rect::ZERO,
    }
}

/// Usable bounds of the display containing `point`, falling back to the main
/// display (or the first one listed) when no display contains it.
pub fn screen_frame_containing(displays: &[Display], point: Point) -> Option<Rect> {
    displays
        .iter()
        .find(|d| d.frame.contains(point))
        .or_else(|| displays.iter().find(|d| d.is_main))
        .or_else(|| displays.first())
        .map(|d| d.visible_frame)
}
