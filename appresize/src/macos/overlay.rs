use objc2::rc::Retained;
use objc2::MainThreadMarker;
use objc2_app_kit::{
    NSBackingStoreType, NSBox, NSBoxType, NSColor, NSPopUpMenuWindowLevel, NSTitlePosition,
    NSView, NSWindow, NSWindowCollectionBehavior, NSWindowStyleMask,
};
use objc2_foundation::{NSPoint, NSRect, NSSize};

use crate::core::Rect;

const FILL_ALPHA: f64 = 0.3;
const BORDER_ALPHA: f64 = 0.8;
const BORDER_WIDTH: f64 = 2.0;
const CORNER_RADIUS: f64 = 8.0;

/// Borderless, click-through window tinted with the accent color, shown
/// above normal windows on every space. Removed from screen on drop.
pub struct PreviewWindow {
    window: Retained<NSWindow>,
}

impl PreviewWindow {
    /// `frame` is in AppKit screen coordinates. Returns `None` off the main
    /// thread.
    pub fn new(frame: Rect) -> Option<Self> {
        let Some(mtm) = MainThreadMarker::new() else {
            tracing::warn!("Preview window requested off the main thread");
            return None;
        };

        let content_rect = NSRect::new(
            NSPoint::new(frame.origin.x, frame.origin.y),
            NSSize::new(frame.size.width, frame.size.height),
        );
        let accent = NSColor::controlAccentColor();

        let window = unsafe {
            let window = NSWindow::initWithContentRect_styleMask_backing_defer(
                NSWindow::alloc(mtm),
                content_rect,
                NSWindowStyleMask::Borderless,
                NSBackingStoreType::Buffered,
                false,
            );
            window.setReleasedWhenClosed(false);
            window.setOpaque(false);
            window.setHasShadow(false);
            window.setBackgroundColor(Some(&NSColor::clearColor()));
            window.setLevel(NSPopUpMenuWindowLevel);
            window.setIgnoresMouseEvents(true);
            window.setCollectionBehavior(
                NSWindowCollectionBehavior::CanJoinAllSpaces
                    | NSWindowCollectionBehavior::FullScreenAuxiliary,
            );

            let bounds = NSRect::new(NSPoint::new(0.0, 0.0), content_rect.size);
            let border = NSBox::initWithFrame(NSBox::alloc(mtm), bounds);
            border.setBoxType(NSBoxType::Custom);
            border.setTitlePosition(NSTitlePosition::NoTitle);
            border.setFillColor(&accent.colorWithAlphaComponent(FILL_ALPHA));
            border.setBorderColor(&accent.colorWithAlphaComponent(BORDER_ALPHA));
            border.setBorderWidth(BORDER_WIDTH);
            border.setCornerRadius(CORNER_RADIUS);

            let content: &NSView = &border;
            window.setContentView(Some(content));
            window.orderFrontRegardless();
            window
        };

        Some(Self { window })
    }
}

impl Drop for PreviewWindow {
    fn drop(&mut self) {
        self.window.orderOut(None);
    }
}
