//! Settings file watcher.
//!
//! Watches the directory holding the settings file and forwards every
//! parseable change to the main loop. Editors that save by rename show up as
//! create events, so both create and modify are handled.

use std::ffi::OsString;
use std::fs;
use std::sync::mpsc as std_mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use appresize_config::Settings;
use notify::{Config as NotifyConfig, Event, EventKind, PollWatcher, RecursiveMode, Watcher};

use crate::event::AppEvent;
use crate::settings_store::SettingsStore;

/// Poll period of the fallback backend.
pub const FALLBACK_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Keeps the file system watcher alive. Dropping it stops the watch.
pub struct SettingsWatcher {
    _watcher: Box<dyn Watcher + Send>,
}

impl std::fmt::Debug for SettingsWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsWatcher").finish_non_exhaustive()
    }
}

/// Filters events down to the settings file, reloads it, and sends the
/// result when it differs from what was last sent.
fn make_event_handler(
    store: SettingsStore,
    filename: OsString,
    mut last: Settings,
    tx: std_mpsc::Sender<AppEvent>,
) -> impl FnMut(notify::Result<Event>) + Send + 'static {
    move |result: notify::Result<Event>| {
        let event = match result {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("Settings watch error: {}", e);
                return;
            }
        };

        if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
            return;
        }
        if !event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(filename.as_os_str()))
        {
            return;
        }

        let settings = match store.load() {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Ignoring settings change: {:#}", e);
                return;
            }
        };
        if settings == last {
            tracing::trace!("Settings file touched without changes");
            return;
        }

        tracing::info!("Settings changed on disk");
        last = settings.clone();
        if tx.send(AppEvent::SettingsChanged(settings)).is_err() {
            tracing::debug!("Main loop gone, dropping settings change");
        }
    }
}

impl SettingsWatcher {
    /// Starts watching `store`'s file. Uses the native backend (FSEvents on
    /// macOS) and falls back to polling when it cannot be created.
    pub fn new(store: SettingsStore, tx: std_mpsc::Sender<AppEvent>) -> Result<Self> {
        let path = store.path().to_path_buf();
        let filename = path
            .file_name()
            .context("Settings path has no file name")?
            .to_os_string();
        let parent = path
            .parent()
            .context("Settings path has no parent directory")?
            .to_path_buf();
        fs::create_dir_all(&parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;

        let initial = store.load().unwrap_or_default();
        let handler =
            make_event_handler(store.clone(), filename.clone(), initial.clone(), tx.clone());

        let mut watcher: Box<dyn Watcher + Send> = match notify::recommended_watcher(handler) {
            Ok(w) => {
                tracing::debug!("Settings watcher: using native backend");
                Box::new(w)
            }
            Err(e) => {
                tracing::warn!("Settings watcher: native backend unavailable ({}), polling", e);
                let fallback = make_event_handler(store, filename, initial, tx);
                let poll = PollWatcher::new(
                    fallback,
                    NotifyConfig::default().with_poll_interval(FALLBACK_POLL_INTERVAL),
                )
                .context("Failed to create fallback PollWatcher")?;
                Box::new(poll)
            }
        };

        watcher
            .watch(&parent, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", parent.display()))?;
        tracing::info!("Watching {} for changes", path.display());

        Ok(Self { _watcher: watcher })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SETTLE: Duration = Duration::from_millis(100);
    const WAIT: Duration = Duration::from_secs(3);

    fn setup() -> (TempDir, SettingsStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));
        store.save(&Settings::default()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_settings_change_is_forwarded() {
        let (_dir, store) = setup();
        let (tx, rx) = std_mpsc::channel();
        let _watcher = SettingsWatcher::new(store.clone(), tx).unwrap();
        std::thread::sleep(SETTLE);

        store.update(|s| s.enable_window_tiling = false).unwrap();

        match rx.recv_timeout(WAIT) {
            Ok(AppEvent::SettingsChanged(settings)) => assert!(!settings.enable_window_tiling),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_settings_are_skipped() {
        let (_dir, store) = setup();
        let (tx, rx) = std_mpsc::channel();
        let _watcher = SettingsWatcher::new(store.clone(), tx).unwrap();
        std::thread::sleep(SETTLE);

        fs::write(store.path(), "{ broken").unwrap();
        std::thread::sleep(SETTLE * 3);
        assert!(rx.try_recv().is_err());

        let fixed = Settings {
            resize_from_nearest_corner: true,
            ..Settings::default()
        };
        store.save(&fixed).unwrap();
        match rx.recv_timeout(WAIT) {
            Ok(AppEvent::SettingsChanged(settings)) => assert!(settings.resize_from_nearest_corner),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_identical_rewrite_is_silent() {
        let (_dir, store) = setup();
        let (tx, rx) = std_mpsc::channel();
        let _watcher = SettingsWatcher::new(store.clone(), tx).unwrap();
        std::thread::sleep(SETTLE);

        store.save(&Settings::default()).unwrap();
        std::thread::sleep(SETTLE * 3);

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_other_files_are_ignored() {
        let (dir, store) = setup();
        let (tx, rx) = std_mpsc::channel();
        let _watcher = SettingsWatcher::new(store, tx).unwrap();
        std::thread::sleep(SETTLE);

        fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        std::thread::sleep(SETTLE * 3);

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_missing_directory_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("appresize").join("settings.json"));
        let (tx, _rx) = std_mpsc::channel();

        let watcher = SettingsWatcher::new(store, tx).unwrap();

        assert!(dir.path().join("appresize").is_dir());
        assert!(format!("{:?}", watcher).contains("SettingsWatcher"));
    }
}
