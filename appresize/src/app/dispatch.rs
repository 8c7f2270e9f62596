use crate::core::{Activation, TrackerControl};
use crate::event::AppEvent;
use crate::platform::PermissionGate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Applies one main-loop message to the activation machine.
pub fn dispatch<T, G>(activation: &mut Activation<T, G>, event: AppEvent) -> Flow
where
    T: TrackerControl,
    G: PermissionGate,
{
    match event {
        AppEvent::DisableRequested | AppEvent::PermissionRevoked => {
            activation.permission_revoked();
        }
        AppEvent::PermissionGranted => {
            activation.permission_granted();
        }
        AppEvent::SettingsChanged(settings) => {
            activation.control_mut().reload(settings);
        }
        AppEvent::ToggleRequested => {
            let state = activation.toggle_enabled();
            tracing::info!("Toggled, now {}", state);
        }
        AppEvent::Quit => {
            tracing::info!("Quit requested");
            activation.deactivate();
            return Flow::Quit;
        }
    }
    Flow::Continue
}
