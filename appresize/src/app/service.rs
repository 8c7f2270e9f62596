use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc as std_mpsc;

use appresize_config::Settings;

use crate::core::{Tracker, TrackerControl, Verdict};
use crate::error::Error;
use crate::event::AppEvent;
use crate::macos::{self, PointerTap};
use crate::platform::{AxPermission, MacOSWindowSystem};

type MacTracker = Tracker<MacOSWindowSystem, AxPermission>;

/// Owns the tracker and, while enabled, the event tap feeding it.
pub struct TrackerService {
    tracker: Rc<RefCell<MacTracker>>,
    tap: Option<PointerTap>,
    event_tx: std_mpsc::Sender<AppEvent>,
}

impl TrackerService {
    pub fn new(settings: Settings, event_tx: std_mpsc::Sender<AppEvent>) -> Self {
        Self {
            tracker: Rc::new(RefCell::new(Tracker::new(
                MacOSWindowSystem,
                AxPermission,
                settings,
            ))),
            tap: None,
            event_tx,
        }
    }
}

impl TrackerControl for TrackerService {
    fn enable(&mut self) -> Result<(), Error> {
        if self.tap.is_some() {
            return Ok(());
        }
        if !macos::is_trusted() {
            return Err(Error::PermissionDenied);
        }

        let tracker = Rc::clone(&self.tracker);
        let tx = self.event_tx.clone();
        let tap = PointerTap::install(move |event| {
            let Ok(mut tracker) = tracker.try_borrow_mut() else {
                tracing::warn!("Tracker busy, passing event through");
                return Verdict::Pass;
            };
            let verdict = tracker.handle_event(event);
            if verdict == Verdict::Disable && tx.send(AppEvent::DisableRequested).is_err() {
                tracing::error!("Failed to queue tracker shutdown");
            }
            verdict
        })?;

        self.tap = Some(tap);
        tracing::info!("Tracker enabled");
        Ok(())
    }

    fn disable(&mut self) {
        if self.tap.take().is_none() {
            return;
        }
        match self.tracker.try_borrow_mut() {
            Ok(mut tracker) => tracker.reset(),
            Err(_) => tracing::warn!("Tracker busy during disable, skipping reset"),
        }
        tracing::info!("Tracker disabled");
    }

    fn is_active(&self) -> bool {
        self.tap.is_some()
    }

    fn reload(&mut self, settings: Settings) {
        match self.tracker.try_borrow_mut() {
            Ok(mut tracker) => tracker.reload(settings),
            Err(_) => tracing::warn!("Tracker busy, settings change dropped"),
        }
    }
}
