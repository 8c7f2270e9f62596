use std::fmt;

use appresize_config::Settings;

use crate::error::Error;
use crate::platform::PermissionGate;

/// The switch the activation machine drives. Implemented by the service
/// that owns the event tap.
pub trait TrackerControl {
    fn enable(&mut self) -> Result<(), Error>;
    /// Idempotent.
    fn disable(&mut self);
    fn is_active(&self) -> bool;
    /// Applies new settings without reinstalling anything.
    fn reload(&mut self, settings: Settings);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationState {
    Launching,
    Validating,
    Activating,
    Activated,
    Deactivated,
}

impl fmt::Display for ActivationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActivationState::Launching => "launching",
            ActivationState::Validating => "validating",
            ActivationState::Activating => "activating",
            ActivationState::Activated => "activated",
            ActivationState::Deactivated => "deactivated",
        };
        f.write_str(name)
    }
}

pub fn is_allowed(from: ActivationState, to: ActivationState) -> bool {
    use ActivationState::*;

    matches!(
        (from, to),
        (Launching, Validating)
            | (Validating, Activating)
            | (Validating, Deactivated)
            | (Activating, Activated)
            | (Activating, Deactivated)
            | (Activated, Activating)
            | (Activated, Deactivated)
            | (Deactivated, Activating)
            | (Deactivated, Activated)
            | (Deactivated, Deactivated)
    )
}

/// Lifecycle of the feature as a whole: whether the tracker is installed,
/// and why not.
pub struct Activation<T: TrackerControl, G: PermissionGate> {
    control: T,
    gate: G,
    state: ActivationState,
    prompted: bool,
    user_disabled: bool,
}

impl<T: TrackerControl, G: PermissionGate> Activation<T, G> {
    pub fn new(control: T, gate: G) -> Self {
        Self {
            control,
            gate,
            state: ActivationState::Launching,
            prompted: false,
            user_disabled: false,
        }
    }

    pub fn state(&self) -> ActivationState {
        self.state
    }

    pub fn control_mut(&mut self) -> &mut T {
        &mut self.control
    }

    /// True when the user switched the feature off; permission changes do
    /// not bring it back.
    pub fn is_user_disabled(&self) -> bool {
        self.user_disabled
    }

    pub fn launch(&mut self) -> ActivationState {
        if self.transition(ActivationState::Validating) {
            self.activate();
        }
        self.state
    }

    pub fn activate(&mut self) -> ActivationState {
        if !self.transition(ActivationState::Activating) {
            return self.state;
        }

        let prompt = !self.prompted;
        self.prompted = true;
        if !self.gate.is_authorized(prompt) {
            tracing::warn!("Accessibility permission not granted, staying inactive");
            self.transition(ActivationState::Deactivated);
            return self.state;
        }

        let next = match self.control.enable() {
            Ok(()) if self.control.is_active() => ActivationState::Activated,
            Ok(()) => {
                tracing::warn!("Tracker did not become active after enabling");
                ActivationState::Deactivated
            }
            Err(e) => {
                tracing::error!("Failed to enable tracker: {}", e);
                ActivationState::Deactivated
            }
        };
        self.transition(next);
        self.state
    }

    pub fn deactivate(&mut self) -> ActivationState {
        self.control.disable();
        self.transition(ActivationState::Deactivated);
        self.state
    }

    pub fn toggle_enabled(&mut self) -> ActivationState {
        match self.state {
            ActivationState::Activated => {
                self.user_disabled = true;
                self.deactivate()
            }
            ActivationState::Deactivated => {
                self.user_disabled = false;
                self.activate()
            }
            _ => self.state,
        }
    }

    /// Tears the tracker down. Safe to call repeatedly.
    pub fn permission_revoked(&mut self) -> ActivationState {
        if self.state == ActivationState::Activated || self.control.is_active() {
            tracing::warn!("Accessibility permission revoked, deactivating");
            self.deactivate();
        }
        self.state
    }

    pub fn permission_granted(&mut self) -> ActivationState {
        if self.state == ActivationState::Deactivated && !self.user_disabled {
            tracing::info!("Accessibility permission granted, activating");
            self.activate();
        }
        self.state
    }

    fn transition(&mut self, to: ActivationState) -> bool {
        if !is_allowed(self.state, to) {
            tracing::warn!("Rejected activation transition {} -> {}", self.state, to);
            return false;
        }
        tracing::debug!("Activation: {} -> {}", self.state, to);
        self.state = to;
        true
    }
}
