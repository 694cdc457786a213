//! Long-running watcher tasks.
//!
//! | Task                   | Runs for                          | Loop                                  |
//! |------------------------|-----------------------------------|---------------------------------------|
//! | [`watch_wired`]        | a watched Wired peripheral        | blocking reads in 500 ms slices       |
//! | [`watch_wireless`]     | a watched Wireless peripheral     | one probe per poll interval           |
//! | [`refresh_connections`]| every looping sync mode, once     | one recovery pass per poll interval   |
//!
//! All of them stop once the shared `running` flag is cleared.  The flag is
//! checked at every blocking-call boundary, so shutdown waits for at most one
//! read slice or one poll interval.
//!
//! Within one watcher, detecting a trigger and forwarding the command happen
//! strictly in sequence; the next read or probe starts only after the forward
//! returned.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use kamels_core::{PeripheralRole, TransportKind, LONG_REPORT_LEN};
use tracing::{debug, info, warn};

use crate::application::dispatch::{Dispatcher, ProbeOutcome};
use crate::application::error::SwitchError;

/// Upper bound of one blocking read on a Wired receiver.
pub const WIRED_READ_SLICE: Duration = Duration::from_millis(500);

/// Granularity at which pauses re-check the running flag.
const PAUSE_STEP: Duration = Duration::from_millis(50);

fn is_running(running: &AtomicBool) -> bool {
    running.load(Ordering::SeqCst)
}

/// Sleeps the current (blocking) thread for `interval` or until shutdown.
fn pause_blocking(interval: Duration, running: &AtomicBool) {
    let deadline = Instant::now() + interval;
    while is_running(running) {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        std::thread::sleep(remaining.min(PAUSE_STEP));
    }
}

/// Async counterpart of [`pause_blocking`].
async fn pause(interval: Duration, running: &AtomicBool) {
    let deadline = Instant::now() + interval;
    while is_running(running) {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        tokio::time::sleep(remaining.min(PAUSE_STEP)).await;
    }
}

/// Starts the watcher matching the transport kind of `role`.
///
/// # Errors
///
/// Returns [`SwitchError::Task`] if a blocking HID task panicked.
pub async fn watch_peripheral(
    dispatcher: Arc<Dispatcher>,
    role: PeripheralRole,
    poll_interval: Duration,
    running: Arc<AtomicBool>,
) -> Result<(), SwitchError> {
    match dispatcher.peripherals().transport(role) {
        TransportKind::Wired => watch_wired(dispatcher, role, poll_interval, running).await,
        TransportKind::Wireless => watch_wireless(dispatcher, role, poll_interval, running).await,
    }
}

/// Watches a Wired receiver for the role's switch-off report.
///
/// The whole loop runs on one blocking thread.  If the receiver goes away
/// (open or read error) the peripheral is marked Disconnected and the device
/// is reopened after `poll_interval`; losing the receiver never forwards.
///
/// # Errors
///
/// Returns [`SwitchError::Task`] if the blocking loop panicked.
pub async fn watch_wired(
    dispatcher: Arc<Dispatcher>,
    role: PeripheralRole,
    poll_interval: Duration,
    running: Arc<AtomicBool>,
) -> Result<(), SwitchError> {
    tokio::task::spawn_blocking(move || wired_loop(&dispatcher, role, poll_interval, &running))
        .await?;
    Ok(())
}

fn wired_loop(
    dispatcher: &Dispatcher,
    role: PeripheralRole,
    poll_interval: Duration,
    running: &AtomicBool,
) {
    let identity = dispatcher.peripherals().get(role).clone();
    let mut buf = [0u8; LONG_REPORT_LEN];

    while is_running(running) {
        let mut handle = match dispatcher.transport().open(&identity) {
            Ok(handle) => handle,
            Err(e) => {
                debug!("{role} receiver unavailable: {e}");
                dispatcher.monitor().mark_disconnected(role);
                pause_blocking(poll_interval, running);
                continue;
            }
        };
        info!("watching {role} receiver at {}", identity.path);

        while is_running(running) {
            match handle.read(&mut buf, Some(WIRED_READ_SLICE)) {
                Ok(0) => {}
                Ok(n) => {
                    if let Some(outcome) = dispatcher.handle_report(role, &buf[..n]) {
                        debug!("{role} trigger handled: {outcome:?}");
                    }
                }
                Err(e) => {
                    warn!("lost {role} receiver: {e}");
                    dispatcher.monitor().mark_disconnected(role);
                    break;
                }
            }
        }

        drop(handle);
        pause_blocking(poll_interval, running);
    }
    debug!("{role} watcher stopped");
}

/// Probes a Wireless peripheral once per `poll_interval`.
///
/// # Errors
///
/// Returns [`SwitchError::Task`] if a probe panicked.
pub async fn watch_wireless(
    dispatcher: Arc<Dispatcher>,
    role: PeripheralRole,
    poll_interval: Duration,
    running: Arc<AtomicBool>,
) -> Result<(), SwitchError> {
    info!("probing {role} every {poll_interval:?}");
    while is_running(&running) {
        let probe = Arc::clone(&dispatcher);
        let outcome = tokio::task::spawn_blocking(move || probe.probe_wireless(role)).await?;
        if let ProbeOutcome::Lost {
            forward: Some(forward),
        } = outcome
        {
            debug!("{role} trigger handled: {forward:?}");
        }
        pause(poll_interval, &running).await;
    }
    debug!("{role} watcher stopped");
    Ok(())
}

/// Runs the recovery pass once per `poll_interval`.
///
/// # Errors
///
/// Returns [`SwitchError::Task`] if a recovery pass panicked.
pub async fn refresh_connections(
    dispatcher: Arc<Dispatcher>,
    poll_interval: Duration,
    running: Arc<AtomicBool>,
) -> Result<(), SwitchError> {
    while is_running(&running) {
        pause(poll_interval, &running).await;
        if dispatcher.monitor().disconnected_roles().is_empty() {
            continue;
        }
        let pass = Arc::clone(&dispatcher);
        tokio::task::spawn_blocking(move || {
            pass.monitor()
                .recover(pass.transport().as_ref(), pass.peripherals())
        })
        .await?;
    }
    debug!("recovery task stopped");
    Ok(())
}
