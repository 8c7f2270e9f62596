use appresize_config::Settings;

/// Messages delivered to the main run loop.
#[derive(Debug)]
pub enum AppEvent {
    /// The event callback saw the permission disappear.
    DisableRequested,
    PermissionRevoked,
    PermissionGranted,
    SettingsChanged(Settings),
    /// SIGUSR1: switch the tracker off, or back on.
    ToggleRequested,
    Quit,
}
