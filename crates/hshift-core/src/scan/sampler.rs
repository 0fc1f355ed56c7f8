//! Temporal sampling: distinguishes live gameplay memory from static decoys.
//!
//! Genuine gameplay structs are updated by the physics simulation every
//! tick, even when no gear change happens, so they are statistically
//! distinguishable from inert template data containing the same byte
//! pattern. This is the single most expensive check in the pipeline: each
//! call blocks for `(iterations - 1) * delay` wall-clock time.

use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::memory::ReadMemory;

/// Read `size` bytes at `address` `iterations` times with `delay` between
/// reads. Returns true iff at least one pair of samples differs.
///
/// Any read failure returns false: unreadable memory is never accepted as
/// live.
pub fn is_live<R: ReadMemory>(
    reader: &R,
    address: u64,
    size: usize,
    iterations: u32,
    delay: Duration,
) -> bool {
    debug_assert!(iterations >= 2);

    let mut previous: Option<Vec<u8>> = None;
    for round in 0..iterations {
        if round > 0 && !delay.is_zero() {
            thread::sleep(delay);
        }

        let sample = match reader.read_bytes(address, size) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!("sample read failed at {address:#x}: {e}; treating as static");
                return false;
            }
        };

        if let Some(prev) = &previous
            && *prev != sample
        {
            return true;
        }
        previous = Some(sample);
    }

    false
}
