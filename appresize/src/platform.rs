use crate::core::{Point, Rect, Size};

/// Answers whether this process may read and write other applications'
/// windows. Never cache the answer; the user can revoke it at any time.
pub trait PermissionGate {
    fn is_authorized(&self, prompt: bool) -> bool;
}

/// A window owned by another application. Reads return `None` and writes are
/// dropped (and logged) when access is denied; a `None` means "abort the
/// gesture", never zero-sized geometry.
pub trait WindowHandle {
    fn origin(&self) -> Option<Point>;
    fn set_origin(&self, origin: Point);
    fn size(&self) -> Option<Size>;
    fn set_size(&self, size: Size);
}

/// A display as seen by the tiling engine, in display space (y grows upward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Display {
    pub frame: Rect,
    /// Usable area: the frame minus menu bar and dock.
    pub visible_frame: Rect,
    pub is_main: bool,
}

/// Trait for querying windows and displays and for creating the tiling
/// preview overlay. This abstraction allows mocking in tests.
///
/// Pointer locations and window geometry share one coordinate space
/// ("window space"); displays and overlays use display space. The two
/// conversion hooks translate between them.
pub trait WindowSystem {
    type Window: WindowHandle;
    /// Dropping an overlay removes it from the screen.
    type Overlay;

    fn window_at(&self, point: Point) -> Option<Self::Window>;
    fn displays(&self) -> Vec<Display>;
    fn create_overlay(&self, frame: Rect) -> Option<Self::Overlay>;

    fn to_display_space(&self, point: Point) -> Point {
        point
    }

    fn to_window_space(&self, rect: Rect) -> Rect {
        rect
    }
}

#[cfg(target_os = "macos")]
pub use self::macos_impl::{AxPermission, MacOSWindowSystem};

#[cfg(target_os = "macos")]
mod macos_impl {
    use super::*;
    use crate::macos::{self, AXUIElement, PreviewWindow};
    use core_graphics::geometry::{CGPoint, CGSize};

    /// Accessibility trust as the permission oracle.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct AxPermission;

    impl PermissionGate for AxPermission {
        fn is_authorized(&self, prompt: bool) -> bool {
            if prompt {
                macos::is_trusted_with_prompt()
            } else {
                macos::is_trusted()
            }
        }
    }

    /// A top-level window reached through the accessibility API.
    #[derive(Clone)]
    pub struct AxWindow {
        element: AXUIElement,
    }

    impl WindowHandle for AxWindow {
        fn origin(&self) -> Option<Point> {
            if !macos::is_trusted() {
                tracing::debug!("Accessibility not trusted, cannot read window origin");
                return None;
            }
            match self.element.position() {
                Ok(p) => Some(Point::new(p.x, p.y)),
                Err(e) => {
                    tracing::debug!("Failed to read window position: {}", e);
                    None
                }
            }
        }

        fn set_origin(&self, origin: Point) {
            if !macos::is_trusted() {
                tracing::debug!("Accessibility not trusted, dropping window move");
                return;
            }
            if let Err(e) = self.element.set_position(CGPoint::new(origin.x, origin.y)) {
                tracing::debug!(
                    "Failed to move window to ({}, {}): {}",
                    origin.x,
                    origin.y,
                    e
                );
            }
        }

        fn size(&self) -> Option<Size> {
            if !macos::is_trusted() {
                tracing::debug!("Accessibility not trusted, cannot read window size");
                return None;
            }
            match self.element.size() {
                Ok(s) => Some(Size::new(s.width, s.height)),
                Err(e) => {
                    tracing::debug!("Failed to read window size: {}", e);
                    None
                }
            }
        }

        fn set_size(&self, size: Size) {
            if !macos::is_trusted() {
                tracing::debug!("Accessibility not trusted, dropping window resize");
                return;
            }
            if let Err(e) = self.element.set_size(CGSize::new(size.width, size.height)) {
                tracing::debug!(
                    "Failed to resize window to {}x{}: {}",
                    size.width,
                    size.height,
                    e
                );
            }
        }
    }

    /// macOS implementation of WindowSystem. Window space is the Quartz
    /// global space (origin at the top-left of the primary display, y down);
    /// display space is the AppKit screen space (bottom-left, y up).
    #[derive(Debug, Default)]
    pub struct MacOSWindowSystem;

    impl WindowSystem for MacOSWindowSystem {
        type Window = AxWindow;
        type Overlay = PreviewWindow;

        fn window_at(&self, point: Point) -> Option<AxWindow> {
            if !macos::is_trusted() {
                tracing::debug!("Accessibility not trusted, cannot locate window");
                return None;
            }
            macos::window_at(CGPoint::new(point.x, point.y)).map(|element| AxWindow { element })
        }

        fn displays(&self) -> Vec<Display> {
            macos::get_all_displays()
        }

        fn create_overlay(&self, frame: Rect) -> Option<PreviewWindow> {
            PreviewWindow::new(frame)
        }

        fn to_display_space(&self, point: Point) -> Point {
            match macos::primary_screen_height() {
                Some(height) => Point::new(point.x, height - point.y),
                None => point,
            }
        }

        fn to_window_space(&self, rect: Rect) -> Rect {
            match macos::primary_screen_height() {
                Some(height) => Rect::new(
                    rect.origin.x,
                    height - rect.max_y(),
                    rect.size.width,
                    rect.size.height,
                ),
                None => rect,
            }
        }
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::core::TrackerControl;
    use crate::error::Error;
    use appresize_config::Settings;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Debug, Clone, Copy, PartialEq)]
    pub enum WindowWrite {
        Origin(Point),
        Size(Size),
    }

    #[derive(Debug)]
    struct MockWindowState {
        frame: Rect,
        readable: bool,
        writes: Vec<WindowWrite>,
    }

    /// Shared handle; clones observe the same window.
    #[derive(Debug, Clone)]
    pub struct MockWindow(Rc<RefCell<MockWindowState>>);

    impl MockWindow {
        pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
            Self(Rc::new(RefCell::new(MockWindowState {
                frame: Rect::new(x, y, width, height),
                readable: true,
                writes: Vec::new(),
            })))
        }

        pub fn unreadable(self) -> Self {
            self.0.borrow_mut().readable = false;
            self
        }

        pub fn frame(&self) -> Rect {
            self.0.borrow().frame
        }

        pub fn writes(&self) -> Vec<WindowWrite> {
            self.0.borrow().writes.clone()
        }

        pub fn origin_writes(&self) -> usize {
            self.writes()
                .iter()
                .filter(|w| matches!(w, WindowWrite::Origin(_)))
                .count()
        }

        pub fn size_writes(&self) -> usize {
            self.writes()
                .iter()
                .filter(|w| matches!(w, WindowWrite::Size(_)))
                .count()
        }

        pub fn is_same(&self, other: &MockWindow) -> bool {
            Rc::ptr_eq(&self.0, &other.0)
        }
    }

    impl WindowHandle for MockWindow {
        fn origin(&self) -> Option<Point> {
            let state = self.0.borrow();
            state.readable.then_some(state.frame.origin)
        }

        fn set_origin(&self, origin: Point) {
            let mut state = self.0.borrow_mut();
            state.frame.origin = origin;
            state.writes.push(WindowWrite::Origin(origin));
        }

        fn size(&self) -> Option<Size> {
            let state = self.0.borrow();
            state.readable.then_some(state.frame.size)
        }

        fn set_size(&self, size: Size) {
            let mut state = self.0.borrow_mut();
            state.frame.size = size;
            state.writes.push(WindowWrite::Size(size));
        }
    }

    #[derive(Debug, Default)]
    pub struct OverlayLog {
        pub live: usize,
        pub max_live: usize,
        pub shown: Vec<Rect>,
    }

    #[derive(Debug)]
    pub struct MockOverlay {
        pub frame: Rect,
        log: Rc<RefCell<OverlayLog>>,
    }

    impl Drop for MockOverlay {
        fn drop(&mut self) {
            self.log.borrow_mut().live -= 1;
        }
    }

    #[derive(Debug, Clone)]
    pub struct MockPermission(Rc<Cell<bool>>);

    impl MockPermission {
        pub fn granted() -> Self {
            Self(Rc::new(Cell::new(true)))
        }

        pub fn set(&self, granted: bool) {
            self.0.set(granted);
        }
    }

    impl PermissionGate for MockPermission {
        fn is_authorized(&self, _prompt: bool) -> bool {
            self.0.get()
        }
    }

    #[derive(Debug, Default)]
    pub struct MockWindowSystem {
        pub windows: Vec<MockWindow>,
        pub displays: Vec<Display>,
        overlays: Rc<RefCell<OverlayLog>>,
    }

    impl MockWindowSystem {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_windows(mut self, windows: Vec<MockWindow>) -> Self {
            self.windows = windows;
            self
        }

        pub fn with_displays(mut self, displays: Vec<Display>) -> Self {
            self.displays = displays;
            self
        }

        pub fn overlay_log(&self) -> Rc<RefCell<OverlayLog>> {
            Rc::clone(&self.overlays)
        }
    }

    impl WindowSystem for MockWindowSystem {
        type Window = MockWindow;
        type Overlay = MockOverlay;

        fn window_at(&self, point: Point) -> Option<MockWindow> {
            self.windows
                .iter()
                .find(|w| w.frame().contains(point))
                .cloned()
        }

        fn displays(&self) -> Vec<Display> {
            self.displays.clone()
        }

        fn create_overlay(&self, frame: Rect) -> Option<MockOverlay> {
            let mut log = self.overlays.borrow_mut();
            log.live += 1;
            log.max_live = log.max_live.max(log.live);
            log.shown.push(frame);
            Some(MockOverlay {
                frame,
                log: Rc::clone(&self.overlays),
            })
        }
    }

    /// Stand-in for the service that owns the event tap.
    #[derive(Debug, Default, Clone)]
    pub struct MockControl {
        pub active: Rc<Cell<bool>>,
        pub fail: Rc<Cell<bool>>,
        pub enables: Rc<Cell<usize>>,
        pub disables: Rc<Cell<usize>>,
        pub reloads: Rc<RefCell<Vec<Settings>>>,
    }

    impl TrackerControl for MockControl {
        fn enable(&mut self) -> Result<(), Error> {
            self.enables.set(self.enables.get() + 1);
            if self.fail.get() {
                return Err(Error::TapInstallFailed);
            }
            self.active.set(true);
            Ok(())
        }

        fn disable(&mut self) {
            self.disables.set(self.disables.get() + 1);
            self.active.set(false);
        }

        fn is_active(&self) -> bool {
            self.active.get()
        }

        fn reload(&mut self, settings: Settings) {
            self.reloads.borrow_mut().push(settings);
        }
    }

    /// A display whose usable area equals its full frame.
    pub fn create_test_display(x: f64, y: f64, width: f64, height: f64, is_main: bool) -> Display {
        let frame = Rect::new(x, y, width, height);
        Display {
            frame,
            visible_frame: frame,
            is_main,
        }
    }
}
