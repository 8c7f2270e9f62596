mod dispatch;
#[cfg(target_os = "macos")]
mod service;

#[cfg(target_os = "macos")]
pub use self::macos_app::App;

#[cfg(target_os = "macos")]
mod macos_app {
    use std::cell::RefCell;
    use std::sync::mpsc as std_mpsc;

    use anyhow::{Context, Result};
    use appresize_config::Settings;
    use core_foundation::runloop::{kCFRunLoopDefaultMode, CFRunLoop};
    use objc2::MainThreadMarker;
    use objc2_app_kit::{NSApplication, NSApplicationActivationPolicy};
    use tokio::signal::unix::{signal, SignalKind};

    use super::dispatch::{dispatch, Flow};
    use super::service::TrackerService;
    use crate::core::Activation;
    use crate::event::AppEvent;
    use crate::macos;
    use crate::monitor::{monitor_permission, PERMISSION_POLL_INTERVAL};
    use crate::platform::AxPermission;
    use crate::settings_store::SettingsStore;
    use crate::settings_watcher::SettingsWatcher;

    struct RunLoopContext {
        event_rx: std_mpsc::Receiver<AppEvent>,
        activation: RefCell<Activation<TrackerService, AxPermission>>,
    }

    pub struct App {}

    impl App {
        pub fn run(store: SettingsStore) -> Result<()> {
            let mtm = MainThreadMarker::new().context("Must be called from the main thread")?;

            // Accessory: no Dock icon, but overlay windows can still be shown
            let ns_app = NSApplication::sharedApplication(mtm);
            ns_app.setActivationPolicy(NSApplicationActivationPolicy::Accessory);

            let settings = match store.stamp_first_launch() {
                Ok(settings) => settings,
                Err(e) => {
                    tracing::warn!("Using default settings: {:#}", e);
                    Settings::default()
                }
            };
            for warning in settings.validate() {
                tracing::warn!("Settings: {}", warning);
            }

            // Channel: tokio tasks and event callback -> main thread
            let (event_tx, event_rx) = std_mpsc::channel::<AppEvent>();

            let service = TrackerService::new(settings, event_tx.clone());
            let mut activation = Activation::new(service, AxPermission);
            let state = activation.launch();
            tracing::info!("Activation state: {}", state);

            let trusted = macos::is_trusted();
            std::thread::spawn(move || {
                let rt = match tokio::runtime::Runtime::new() {
                    Ok(rt) => rt,
                    Err(e) => {
                        tracing::error!("Failed to start tokio runtime: {}", e);
                        return;
                    }
                };
                rt.block_on(Self::run_async(store, trusted, event_tx));
            });

            Self::run_main_loop(RunLoopContext {
                event_rx,
                activation: RefCell::new(activation),
            });
            Ok(())
        }

        async fn run_async(store: SettingsStore, trusted: bool, tx: std_mpsc::Sender<AppEvent>) {
            tracing::info!("Tokio runtime started");

            tokio::spawn(monitor_permission(
                macos::is_trusted,
                trusted,
                PERMISSION_POLL_INTERVAL,
                tx.clone(),
            ));
            // Held until shutdown; dropping it stops the watch
            let _watcher = match SettingsWatcher::new(store, tx.clone()) {
                Ok(watcher) => Some(watcher),
                Err(e) => {
                    tracing::warn!("Settings changes will not be picked up: {:#}", e);
                    None
                }
            };

            let (mut term, mut usr1) = match (
                signal(SignalKind::terminate()),
                signal(SignalKind::user_defined1()),
            ) {
                (Ok(term), Ok(usr1)) => (term, usr1),
                (Err(e), _) | (_, Err(e)) => {
                    tracing::error!("Failed to install signal handlers: {}", e);
                    std::future::pending::<()>().await;
                    return;
                }
            };

            loop {
                let event = tokio::select! {
                    _ = tokio::signal::ctrl_c() => AppEvent::Quit,
                    _ = term.recv() => AppEvent::Quit,
                    _ = usr1.recv() => AppEvent::ToggleRequested,
                };
                let quit = matches!(event, AppEvent::Quit);
                if quit {
                    tracing::info!("Termination signal received");
                }
                if tx.send(event).is_err() || quit {
                    break;
                }
            }
        }

        fn run_main_loop(context: RunLoopContext) {
            tracing::info!("Starting main loop");

            let info = Box::into_raw(Box::new(context));
            let mut timer_context = core_foundation::runloop::CFRunLoopTimerContext {
                version: 0,
                info: info as *mut _,
                retain: None,
                release: None,
                copyDescription: None,
            };

            extern "C" fn timer_callback(
                _timer: core_foundation::runloop::CFRunLoopTimerRef,
                info: *mut std::ffi::c_void,
            ) {
                let ctx = unsafe { &*(info as *const RunLoopContext) };
                let Ok(mut activation) = ctx.activation.try_borrow_mut() else {
                    return;
                };

                while let Ok(event) = ctx.event_rx.try_recv() {
                    tracing::debug!("Main loop event: {:?}", event);
                    if dispatch(&mut *activation, event) == Flow::Quit {
                        CFRunLoop::get_current().stop();
                        break;
                    }
                }
            }

            let timer = unsafe {
                core_foundation::runloop::CFRunLoopTimer::new(
                    core_foundation::date::CFAbsoluteTimeGetCurrent(),
                    0.05, // 50ms interval
                    0,
                    0,
                    timer_callback,
                    &mut timer_context,
                )
            };

            let run_loop = CFRunLoop::get_current();
            run_loop.add_timer(&timer, unsafe { kCFRunLoopDefaultMode });

            tracing::info!("Entering CFRunLoop");
            CFRunLoop::run_current();
            tracing::info!("CFRunLoop exited");

            run_loop.remove_timer(&timer, unsafe { kCFRunLoopDefaultMode });
            // The timer no longer fires, so the context can be reclaimed
            drop(unsafe { Box::from_raw(info) });
        }
    }
}
