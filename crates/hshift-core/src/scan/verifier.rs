//! Candidate verification: separates the live gameplay struct from decoys.
//!
//! Many regions can byte-match the artifact pattern (stale allocations,
//! inert template data, copies from earlier loads). Verification runs the
//! cheapest check first so most decoys are rejected before the expensive
//! temporal sampling stages.

use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::gear::Gear;
use crate::memory::ReadMemory;
use crate::scan::pattern::FieldSignature;
use crate::scan::sampler;

/// Hook for keeping the game window un-minimized while sampling. A
/// minimized 3D engine can pause its simulation ticks, which would make
/// live memory sample as static.
pub trait GameWindow {
    fn is_minimized(&self) -> bool;
    fn restore(&self);
}

pub struct Verifier<'a, R: ReadMemory> {
    reader: &'a R,
    window: Option<&'a dyn GameWindow>,
    iterations: u32,
    delay: Duration,
    /// Pause after restoring a minimized window, letting simulation resume
    /// before the first sample.
    restore_grace: Duration,
}

impl<'a, R: ReadMemory> Verifier<'a, R> {
    pub fn new(reader: &'a R, iterations: u32, delay: Duration) -> Self {
        Self {
            reader,
            window: None,
            iterations,
            delay,
            restore_grace: Duration::from_millis(1500),
        }
    }

    pub fn with_window(mut self, window: &'a dyn GameWindow) -> Self {
        self.window = Some(window);
        self
    }

    #[cfg(test)]
    pub(crate) fn with_restore_grace(mut self, grace: Duration) -> Self {
        self.restore_grace = grace;
        self
    }

    /// Accept or reject a raw pattern match at `candidate`.
    pub fn verify(&self, signature: &FieldSignature, candidate: u64) -> bool {
        // Stage 1: the decoded gear value must be a valid, non-reverse
        // gear. Reverse is a transient state; a struct sitting in reverse
        // during verification is far more likely a stale copy than the live
        // target. No sampling happens before this passes.
        let field_addr = candidate.wrapping_add_signed(signature.field_offset);
        let raw = match self.reader.read_i32(field_addr) {
            Ok(value) => value,
            Err(e) => {
                debug!("candidate {candidate:#x}: field read failed: {e}");
                return false;
            }
        };
        let Some(gear) = Gear::from_raw(raw) else {
            debug!("candidate {candidate:#x}: gear value {raw} out of range");
            return false;
        };
        if gear == Gear::Reverse {
            debug!("candidate {candidate:#x}: in reverse, rejecting");
            return false;
        }

        self.ensure_window_active();

        // Stage 2: the live window must fluctuate across samples.
        let live_addr = candidate.wrapping_add_signed(signature.live_probe.offset);
        if !sampler::is_live(
            self.reader,
            live_addr,
            signature.live_probe.size,
            self.iterations,
            self.delay,
        ) {
            debug!("candidate {candidate:#x}: live probe at {live_addr:#x} is static, rejecting");
            return false;
        }

        // Stage 3: the static window must hold still.
        let static_addr = candidate.wrapping_add_signed(signature.static_probe.offset);
        if sampler::is_live(
            self.reader,
            static_addr,
            signature.static_probe.size,
            self.iterations,
            self.delay,
        ) {
            debug!(
                "candidate {candidate:#x}: static probe at {static_addr:#x} fluctuates, rejecting"
            );
            return false;
        }

        true
    }

    fn ensure_window_active(&self) {
        if let Some(window) = self.window
            && window.is_minimized()
        {
            debug!("game window minimized; restoring before sampling");
            window.restore();
            if !self.restore_grace.is_zero() {
                thread::sleep(self.restore_grace);
            }
        }
    }
}
