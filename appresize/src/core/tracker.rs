use std::time::{Duration, Instant};

use appresize_config::{ModifierFlags, Settings};

use super::preview::TilingPreview;
use super::tiling::{screen_frame_containing, target_frame, tile_zone, TileZone};
use super::{Corner, Delta, Point, Size};
use crate::error::Error;
use crate::platform::{PermissionGate, WindowHandle, WindowSystem};

/// Minimum time between two origin writes while moving.
pub const MOVE_FILTER_INTERVAL: Duration = Duration::from_millis(10);
/// Minimum time between two geometry writes while resizing.
pub const RESIZE_FILTER_INTERVAL: Duration = Duration::from_millis(20);
/// Longest a gesture may keep swallowing pointer events before it is
/// forcibly abandoned.
pub const MAX_ABSORPTION: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    MouseMoved,
    MouseDragged,
    MouseDown,
    MouseUp,
    TapDisabledByTimeout,
    TapDisabledByUserInput,
}

impl EventKind {
    pub fn is_tap_disabled(self) -> bool {
        matches!(
            self,
            EventKind::TapDisabledByTimeout | EventKind::TapDisabledByUserInput
        )
    }
}

/// One intercepted pointer event. `location` is in window space.
#[derive(Debug, Clone, Copy)]
pub struct PointerEvent {
    pub kind: EventKind,
    pub location: Point,
    pub delta: Delta,
    pub flags: ModifierFlags,
    pub time: Instant,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrackerState {
    #[default]
    Idle,
    Moving,
    Resizing,
}

/// What the event source should do with the event just handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Forward the event unchanged.
    Pass,
    /// Drop the event.
    Absorb,
    /// The tap was disabled by the system; enable it again and forward.
    Rearm,
    /// Permission is gone; forward and tear the tap down.
    Disable,
}

impl Verdict {
    pub fn absorbs(self) -> bool {
        matches!(self, Verdict::Absorb)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Capture,
    Move,
    Resize,
    FinishMove,
    FinishResize,
    Recapture,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: TrackerState,
    pub action: Action,
    pub absorb: bool,
}

/// The single transition table of the tracker. Every non-idle outcome
/// absorbs, including the event that ends a gesture.
pub fn step(current: TrackerState, desired: TrackerState) -> Transition {
    use TrackerState::*;

    let (action, absorb) = match (current, desired) {
        (Idle, Idle) => (Action::None, false),
        (Idle, Moving) | (Idle, Resizing) => (Action::Capture, true),
        (Moving, Moving) => (Action::Move, true),
        (Moving, Idle) => (Action::FinishMove, true),
        (Resizing, Resizing) => (Action::Resize, true),
        (Resizing, Idle) => (Action::FinishResize, true),
        (Moving, Resizing) | (Resizing, Moving) => (Action::Recapture, true),
    };

    Transition {
        next: desired,
        action,
        absorb,
    }
}

/// Geometry of the window being dragged, accumulated between writes.
#[derive(Debug, Clone)]
pub struct TrackingInfo<H> {
    pub window: H,
    /// Time of the last write (or of the capture).
    pub time: Instant,
    pub origin: Point,
    pub size: Size,
    pub corner: Corner,
}

pub struct Tracker<W: WindowSystem, G: PermissionGate> {
    ws: W,
    gate: G,
    settings: Settings,
    state: TrackerState,
    tracking: Option<TrackingInfo<W::Window>>,
    preview: TilingPreview<W::Overlay>,
    absorbing_since: Option<Instant>,
}

impl<W: WindowSystem, G: PermissionGate> Tracker<W, G> {
    pub fn new(ws: W, gate: G, settings: Settings) -> Self {
        Self {
            ws,
            gate,
            settings,
            state: TrackerState::Idle,
            tracking: None,
            preview: TilingPreview::new(),
            absorbing_since: None,
        }
    }

    /// Replaces the settings. A gesture in progress keeps its captured
    /// window and corner.
    pub fn reload(&mut self, settings: Settings) {
        for warning in settings.validate() {
            tracing::warn!("Settings: {}", warning);
        }
        self.settings = settings;
        if self.gestures_disabled() && self.state != TrackerState::Idle {
            tracing::info!("Both modifier sets cleared, abandoning {:?}", self.state);
            self.reset();
        }
        tracing::info!(
            "Tracker settings reloaded (move: {}, resize: {})",
            self.settings.move_modifiers,
            self.settings.resize_modifiers
        );
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn tracking(&self) -> Option<&TrackingInfo<W::Window>> {
        self.tracking.as_ref()
    }

    pub fn preview(&self) -> &TilingPreview<W::Overlay> {
        &self.preview
    }

    pub fn window_system(&self) -> &W {
        &self.ws
    }

    pub fn handle_event(&mut self, event: &PointerEvent) -> Verdict {
        if !self.gate.is_authorized(false) {
            tracing::error!("Accessibility permission lost during event handling");
            self.reset();
            return Verdict::Disable;
        }

        if event.kind.is_tap_disabled() {
            tracing::debug!("Event tap disabled ({:?}), re-arming", event.kind);
            return Verdict::Rearm;
        }

        if self.gestures_disabled() {
            if self.state != TrackerState::Idle {
                self.reset();
            }
            return Verdict::Pass;
        }

        if self.state != TrackerState::Idle {
            if let Some(since) = self.absorbing_since {
                if event.time.saturating_duration_since(since) > MAX_ABSORPTION {
                    tracing::error!(
                        "Absorbed events for more than {:?}, resetting to idle",
                        MAX_ABSORPTION
                    );
                    self.reset();
                    return Verdict::Pass;
                }
            }
        }

        if !self.is_eligible(event.kind) {
            return Verdict::Pass;
        }

        let desired = self.classify(event.flags);
        let transition = step(self.state, desired);

        match transition.action {
            Action::None => {}
            Action::Capture => match self.capture(event.location, event.time) {
                Ok(info) => {
                    tracing::debug!(
                        "Start {:?} at ({}, {}), corner {:?}",
                        desired,
                        event.location.x,
                        event.location.y,
                        info.corner
                    );
                    self.tracking = Some(info);
                    self.absorbing_since = Some(event.time);
                }
                Err(e) => {
                    tracing::debug!("Capture aborted: {}", e);
                    return Verdict::Pass;
                }
            },
            Action::Move => self.apply_move(event),
            Action::Resize => self.apply_resize(event),
            Action::FinishMove => {
                let tiled = self.commit_tiling(event.location);
                tracing::debug!("Move finished (tiled: {})", tiled);
                self.reset();
            }
            Action::FinishResize => {
                tracing::debug!("Resize finished");
                self.reset();
            }
            Action::Recapture => {
                self.preview.hide();
                match self.capture(event.location, event.time) {
                    Ok(info) => {
                        tracing::debug!("Switch to {:?}, corner {:?}", desired, info.corner);
                        self.tracking = Some(info);
                    }
                    Err(e) => {
                        tracing::debug!("Re-capture aborted: {}", e);
                        self.reset();
                        return Verdict::Pass;
                    }
                }
            }
        }

        self.state = transition.next;
        if transition.absorb {
            Verdict::Absorb
        } else {
            Verdict::Pass
        }
    }

    /// Abandons any gesture: idle, no tracked window, no preview.
    pub fn reset(&mut self) {
        self.preview.hide();
        self.tracking = None;
        self.state = TrackerState::Idle;
        self.absorbing_since = None;
    }

    fn gestures_disabled(&self) -> bool {
        self.settings.move_modifiers.is_empty() && self.settings.resize_modifiers.is_empty()
    }

    /// Move is checked first, so a set shared by both gestures moves.
    fn classify(&self, flags: ModifierFlags) -> TrackerState {
        if self.settings.move_modifiers.exclusively_set(flags) {
            TrackerState::Moving
        } else if self.settings.resize_modifiers.exclusively_set(flags) {
            TrackerState::Resizing
        } else {
            TrackerState::Idle
        }
    }

    fn is_eligible(&self, kind: EventKind) -> bool {
        match self.state {
            TrackerState::Idle if self.settings.require_drag_to_activate => {
                kind == EventKind::MouseDragged
            }
            TrackerState::Idle => matches!(kind, EventKind::MouseMoved | EventKind::MouseDragged),
            TrackerState::Moving | TrackerState::Resizing => matches!(
                kind,
                EventKind::MouseMoved
                    | EventKind::MouseDragged
                    | EventKind::MouseDown
                    | EventKind::MouseUp
            ),
        }
    }

    fn capture(&self, location: Point, time: Instant) -> Result<TrackingInfo<W::Window>, Error> {
        if !self.gate.is_authorized(false) {
            return Err(Error::PermissionDenied);
        }

        let window = self
            .ws
            .window_at(location)
            .ok_or(Error::NoWindowAtPoint(location))?;
        let origin = window.origin().ok_or(Error::GeometryUnreadable)?;
        let size = window.size().ok_or(Error::GeometryUnreadable)?;

        let corner = if self.settings.resize_from_nearest_corner {
            Corner::nearest(location - origin, size)
        } else {
            Corner::BottomRight
        };

        Ok(TrackingInfo {
            window,
            time,
            origin,
            size,
            corner,
        })
    }

    fn apply_move(&mut self, event: &PointerEvent) {
        let Some(info) = self.tracking.as_mut() else {
            tracing::debug!("Move without a tracked window");
            return;
        };

        info.origin += event.delta;

        if self.settings.enable_window_tiling {
            let point = self.ws.to_display_space(event.location);
            self.preview.update(&self.ws, point);
        }

        if event.time.saturating_duration_since(info.time) <= MOVE_FILTER_INTERVAL {
            return;
        }

        info.window.set_origin(info.origin);
        info.time = event.time;
    }

    fn apply_resize(&mut self, event: &PointerEvent) {
        let Some(info) = self.tracking.as_mut() else {
            tracing::debug!("Resize without a tracked window");
            return;
        };

        let d = event.delta;
        match info.corner {
            Corner::TopLeft => {
                info.origin += d;
                info.size -= d;
            }
            Corner::TopRight => {
                info.origin += Delta::new(0.0, d.dy);
                info.size += Delta::new(d.dx, -d.dy);
            }
            Corner::BottomLeft => {
                info.origin += Delta::new(d.dx, 0.0);
                info.size += Delta::new(-d.dx, d.dy);
            }
            Corner::BottomRight => {
                info.size += d;
            }
        }

        if event.time.saturating_duration_since(info.time) <= RESIZE_FILTER_INTERVAL {
            return;
        }

        if info.corner != Corner::BottomRight {
            info.window.set_origin(info.origin);
        }
        info.window.set_size(info.size);
        info.time = event.time;
    }

    /// Hides the preview and, when tiling is enabled and `location` (window
    /// space) lies in a tiling zone, snaps the tracked window into it.
    fn commit_tiling(&mut self, location: Point) -> bool {
        self.preview.hide();

        if !self.settings.enable_window_tiling {
            return false;
        }
        let Some(info) = self.tracking.as_ref() else {
            tracing::debug!("Tiling check without a tracked window");
            return false;
        };
        if !self.gate.is_authorized(false) {
            tracing::debug!("Accessibility not trusted, skipping tiling");
            return false;
        }

        let point = self.ws.to_display_space(location);
        let Some(screen) = screen_frame_containing(&self.ws.displays(), point) else {
            tracing::warn!("No display found for tiling at ({}, {})", point.x, point.y);
            return false;
        };

        let zone = tile_zone(point, screen);
        if zone == TileZone::None {
            return false;
        }
        let frame = target_frame(zone, screen);
        if frame.is_empty() {
            return false;
        }

        let frame = self.ws.to_window_space(frame);
        tracing::info!("Tiling window to {:?} at {:?}", zone, frame);
        info.window.set_origin(frame.origin);
        info.window.set_size(frame.size);
        true
    }
}
