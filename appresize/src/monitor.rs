use std::sync::mpsc as std_mpsc;
use std::time::Duration;

use crate::event::AppEvent;

pub const PERMISSION_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Polls `check` and reports every change of the answer. Returns when the
/// main thread stops listening.
pub async fn monitor_permission<F>(
    check: F,
    initial: bool,
    period: Duration,
    tx: std_mpsc::Sender<AppEvent>,
) where
    F: Fn() -> bool + Send + 'static,
{
    let mut granted = initial;
    let mut ticker = tokio::time::interval(period);
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let now = check();
        if now == granted {
            continue;
        }
        granted = now;

        let event = if now {
            tracing::info!("Accessibility permission granted");
            AppEvent::PermissionGranted
        } else {
            tracing::warn!("Accessibility permission revoked");
            AppEvent::PermissionRevoked
        };
        if tx.send(event).is_err() {
            break;
        }
    }

    tracing::debug!("Permission monitor exiting");
}
