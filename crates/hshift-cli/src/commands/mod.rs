//! Subcommand implementations.

pub mod run;
pub mod scan;
pub mod shift;

use std::path::Path;

use anyhow::{Result, anyhow};
use hshift_core::SignatureSet;

/// Parse a hex address, with or without a `0x` prefix.
pub fn parse_hex_address(s: &str) -> Result<u64> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X");
    u64::from_str_radix(digits, 16).map_err(|e| anyhow!("invalid hex address {s:?}: {e}"))
}

/// Load a signature set from `path`, or fall back to the built-in set for
/// the supported game build.
pub fn load_signature_set(path: Option<&Path>) -> Result<SignatureSet> {
    match path {
        Some(path) => {
            let set = hshift_core::load_signatures(path)?;
            tracing::info!("loaded signature set {} from {}", set.version, path.display());
            Ok(set)
        }
        None => Ok(SignatureSet::builtin()),
    }
}

#[cfg(target_os = "windows")]
mod platform {
    use std::time::Duration;

    use anyhow::{Context, Result};
    use hshift_core::{
        MemoryReader, ProcessHandle, ResolvedAddresses, ScanConfig, Scanner, SignatureSet,
        Verifier, WindowHandle, find_process_id, find_window_by_pid,
    };
    use tracing::{info, warn};

    /// Locate the game process by executable name and open it.
    pub fn open_game(process: &str) -> Result<ProcessHandle> {
        let pid = find_process_id(process)?;
        info!("found {process} (pid {pid})");
        ProcessHandle::open(pid).context("opening game process")
    }

    /// Top-level window of the game, if one can be found. Scanning works
    /// without it; the verifier just cannot restore a minimized game.
    pub fn game_window(pid: u32) -> Option<WindowHandle> {
        match find_window_by_pid(pid) {
            Ok(window) => Some(window),
            Err(e) => {
                warn!("no game window found: {e}");
                None
            }
        }
    }

    /// Run a full signature scan and resolve both gear field addresses.
    pub fn resolve_addresses(
        reader: &MemoryReader<'_>,
        window: Option<&WindowHandle>,
        set: &SignatureSet,
    ) -> Result<ResolvedAddresses> {
        let delay = Duration::from_millis(set.sample_delay_ms);
        let mut verifier = Verifier::new(reader, set.sample_iterations, delay);
        if let Some(window) = window {
            verifier = verifier.with_window(window);
        }

        let mut scanner = Scanner::new(reader, ScanConfig::default(), verifier);
        let resolved = scanner.resolve(set)?;
        info!(
            "resolved current gear at {:#x}, last gear at {:#x}",
            resolved.current_gear, resolved.last_gear
        );
        Ok(resolved)
    }
}

#[cfg(target_os = "windows")]
pub use platform::{game_window, open_game, resolve_addresses};
