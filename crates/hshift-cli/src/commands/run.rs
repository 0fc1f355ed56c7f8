//! Interactive controller: scan once, then drive gears from the keyboard
//! until End is pressed or Ctrl-C arrives.

use std::path::Path;

use anyhow::Result;

#[cfg(target_os = "windows")]
use std::sync::Arc;
#[cfg(target_os = "windows")]
use std::time::Duration;

#[cfg(target_os = "windows")]
use crate::shutdown::ShutdownSignal;

/// How long to sleep between attempts to find the game process.
#[cfg(target_os = "windows")]
const PROCESS_POLL: Duration = Duration::from_secs(5);

#[cfg(target_os = "windows")]
pub fn run(process: &str, signatures: Option<&Path>, keys: Option<&Path>) -> Result<()> {
    use anyhow::Context;
    use tracing::info;

    use crate::config::KeyMap;

    let set = super::load_signature_set(signatures)?;
    let keymap = match keys {
        Some(path) => KeyMap::load(path)?,
        None => KeyMap::default(),
    };

    let shutdown = Arc::new(ShutdownSignal::new());
    {
        let shutdown = Arc::clone(&shutdown);
        ctrlc::set_handler(move || shutdown.trigger())
            .context("installing Ctrl-C handler")?;
    }

    // Outer loop: wait for the game, run the controller, then wait for the
    // next launch when the game exits.
    while !shutdown.is_shutdown() {
        let handle = match super::open_game(process) {
            Ok(handle) => handle,
            Err(_) => {
                info!("waiting for {process}...");
                if shutdown.wait(PROCESS_POLL) {
                    break;
                }
                continue;
            }
        };

        if let Err(e) = controller_loop(&handle, &set, &keymap, &shutdown) {
            tracing::error!("controller stopped: {e}");
        }

        if shutdown.is_shutdown() {
            break;
        }
        info!("game disconnected, waiting for relaunch");
        shutdown.wait(PROCESS_POLL);
    }

    Ok(())
}

#[cfg(target_os = "windows")]
fn controller_loop(
    handle: &hshift_core::ProcessHandle,
    set: &hshift_core::SignatureSet,
    keymap: &crate::config::KeyMap,
    shutdown: &Arc<ShutdownSignal>,
) -> Result<()> {
    use std::sync::mpsc::{self, RecvTimeoutError};

    use hshift_core::{GearChannel, GearField, MemoryReader};
    use tracing::{info, warn};

    use crate::display::GearDisplay;
    use crate::hook::{HookEvent, KeyboardHook};

    let reader = MemoryReader::new(handle);
    let window = super::game_window(handle.pid());

    let resolved = super::resolve_addresses(&reader, window.as_ref(), set)?;
    let mut channel = GearChannel::new(&reader, resolved);

    let (events_tx, events_rx) = mpsc::channel();
    let _hook = KeyboardHook::install(keymap.clone(), events_tx)?;
    info!("keyboard hook installed, 0-9 shift, Delete rescans, End quits");

    let mut display = GearDisplay::new();
    display.draw(channel.read(GearField::Current).unwrap_or(None))?;

    while !shutdown.is_shutdown() {
        let event = match events_rx.recv_timeout(Duration::from_millis(200)) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => {
                // Periodic liveness probe so a dead game drops us back to
                // the wait loop instead of failing on the next keypress.
                if channel.read_raw(GearField::Current).is_err() {
                    info!("game process went away");
                    return Ok(());
                }
                continue;
            }
            Err(RecvTimeoutError::Disconnected) => return Ok(()),
        };

        match event {
            HookEvent::Shift(gear) => match channel.shift(gear) {
                Ok(()) => display.draw(Some(gear))?,
                Err(e) => warn!("shift to {gear} failed: {e}"),
            },
            HookEvent::Rescan => {
                info!("rescan requested");
                match super::resolve_addresses(&reader, window.as_ref(), set) {
                    Ok(resolved) => {
                        channel = GearChannel::new(&reader, resolved);
                        display.draw(channel.read(GearField::Current).unwrap_or(None))?;
                    }
                    Err(e) => warn!("rescan failed, keeping old addresses: {e}"),
                }
            }
            HookEvent::ToggleDisplay => {
                display.toggle();
                if display.is_enabled() {
                    display.draw(channel.read(GearField::Current).unwrap_or(None))?;
                }
            }
            HookEvent::Quit => {
                shutdown.trigger();
            }
        }
    }

    Ok(())
}

#[cfg(not(target_os = "windows"))]
pub fn run(_process: &str, _signatures: Option<&Path>, _keys: Option<&Path>) -> Result<()> {
    anyhow::bail!("the interactive controller is only supported on Windows")
}
