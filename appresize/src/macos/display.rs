use objc2::MainThreadMarker;
use objc2_app_kit::NSScreen;
use objc2_foundation::NSRect;

use crate::core::Rect;
use crate::platform::Display;

fn to_rect(rect: NSRect) -> Rect {
    Rect::new(rect.origin.x, rect.origin.y, rect.size.width, rect.size.height)
}

/// All screens in AppKit coordinates (origin at the bottom-left of the
/// primary display). Must run on the main thread.
pub fn get_all_displays() -> Vec<Display> {
    let Some(mtm) = MainThreadMarker::new() else {
        tracing::warn!("Display query off the main thread");
        return Vec::new();
    };

    let main_frame = NSScreen::mainScreen(mtm).map(|screen| screen.frame());

    NSScreen::screens(mtm)
        .iter()
        .map(|screen| {
            let frame = screen.frame();
            Display {
                frame: to_rect(frame),
                visible_frame: to_rect(screen.visibleFrame()),
                is_main: main_frame == Some(frame),
            }
        })
        .collect()
}

/// Height of the screen holding the menu bar, which anchors both the Quartz
/// and the AppKit global coordinate systems.
pub fn primary_screen_height() -> Option<f64> {
    let mtm = MainThreadMarker::new()?;
    let screens = NSScreen::screens(mtm);
    let primary = screens.firstObject()?;
    Some(primary.frame().size.height)
}
