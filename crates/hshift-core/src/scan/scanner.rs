//! Signature scanner: walks the candidate address range region by region,
//! chunk by chunk, and returns the first verified match.

use tracing::{debug, info};

use crate::channel::ResolvedAddresses;
use crate::error::{Error, Result};
use crate::gear::GearField;
use crate::memory::ReadMemory;
use crate::scan::pattern::{self, FieldSignature, SignatureSet};
use crate::scan::verifier::Verifier;

/// Bounds and granularity of one scan session.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub range_start: u64,
    pub range_end: u64,
    /// Per-chunk read size. Chunked reads bound working memory and keep a
    /// single failed page from losing the whole region. A pattern
    /// straddling a chunk boundary may be missed; accepted trade-off in
    /// favor of non-overlapping reads.
    pub chunk_size: usize,
    /// Address granularity of progress log lines.
    pub progress_step: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            range_start: 0,
            // 12 TB covers the game's observed heap placement with room to
            // spare; regions past it are never committed by the target.
            range_end: 0x0C00_0000_0000,
            chunk_size: 256 * 1024,
            progress_step: 64 * 1024 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Scanning,
    Found,
    Exhausted,
}

pub struct Scanner<'a, R: ReadMemory> {
    reader: &'a R,
    config: ScanConfig,
    verifier: Verifier<'a, R>,
    /// Working buffer, allocated once and reused for every chunk.
    buffer: Vec<u8>,
    state: ScanState,
}

impl<'a, R: ReadMemory> Scanner<'a, R> {
    pub fn new(reader: &'a R, config: ScanConfig, verifier: Verifier<'a, R>) -> Self {
        let chunk_size = config.chunk_size;
        Self {
            reader,
            config,
            verifier,
            buffer: Vec::with_capacity(chunk_size),
            state: ScanState::Idle,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Scan the configured range for `signature` and return the address of
    /// the first verified match. Lazy first-match semantics: the walk stops
    /// at the first accepted candidate.
    pub fn scan(&mut self, signature: &FieldSignature) -> Result<u64> {
        let pattern = signature.pattern_bytes()?;
        self.state = ScanState::Scanning;

        let span = self.config.range_end.saturating_sub(self.config.range_start);
        let mut next_checkpoint = self.config.range_start;
        let mut regions_scanned = 0usize;
        let mut bytes_scanned = 0u64;

        let mut cursor = self.config.range_start;
        while let Some(region) = self.reader.next_region(cursor) {
            if region.size == 0 {
                break;
            }
            let Some(next) = region.base.checked_add(region.size) else {
                break;
            };
            cursor = next;

            if region.base >= self.config.range_end {
                break;
            }

            if region.base >= next_checkpoint && span > 0 {
                let covered = region.base - self.config.range_start;
                info!(
                    "scan progress: {:.1}% (at {:#x})",
                    covered as f64 / span as f64 * 100.0,
                    region.base
                );
                next_checkpoint = region.base.saturating_add(self.config.progress_step);
            }

            if !region.is_scannable() {
                continue;
            }
            regions_scanned += 1;

            let start = region.base.max(self.config.range_start);
            let end = region.end().min(self.config.range_end);
            if let Some(address) = self.scan_span(start, end, &pattern, signature)? {
                info!("verified candidate at {address:#x}");
                self.state = ScanState::Found;
                return Ok(address);
            }
            bytes_scanned += end - start;
        }

        self.state = ScanState::Exhausted;
        Err(Error::PatternNotFound {
            regions: regions_scanned,
            bytes: bytes_scanned,
        })
    }

    /// Resolve both tracked fields and check they agree.
    pub fn resolve(&mut self, set: &SignatureSet) -> Result<ResolvedAddresses> {
        info!("resolving addresses with signature set '{}'", set.version);

        let current_base = self.scan(set.field(GearField::Current))?;
        let current_gear = current_base.wrapping_add_signed(set.current_gear.field_offset);
        debug!("current gear field at {current_gear:#x}");

        let last_base = self.scan(set.field(GearField::Last))?;
        let last_gear = last_base.wrapping_add_signed(set.last_gear.field_offset);
        debug!("last gear field at {last_gear:#x}");

        // Both fields mirror the same just-observed gear right after a
        // scan; a mismatch means at least one address is wrong.
        let current = self.reader.read_i32(current_gear)?;
        let last = self.reader.read_i32(last_gear)?;
        if current != last {
            return Err(Error::InconsistentState { current, last });
        }

        Ok(ResolvedAddresses {
            current_gear,
            last_gear,
        })
    }

    fn scan_span(
        &mut self,
        start: u64,
        end: u64,
        pattern: &[u8],
        signature: &FieldSignature,
    ) -> Result<Option<u64>> {
        let mut offset = start;
        while offset < end {
            let chunk_len = ((end - offset) as usize).min(self.config.chunk_size);
            self.buffer.resize(chunk_len, 0);

            match self.reader.read_into(offset, &mut self.buffer[..chunk_len]) {
                Ok(()) => {
                    for hit in pattern::find_all(&self.buffer[..chunk_len], pattern) {
                        let candidate = offset + hit as u64;
                        if self.verifier.verify(signature, candidate) {
                            return Ok(Some(candidate));
                        }
                        debug!("rejected candidate at {candidate:#x}");
                    }
                }
                // Page-level access failures are expected mid-walk and cost
                // one skipped chunk; anything else aborts the scan.
                Err(e) if e.is_skippable_read() => {
                    debug!("skipping unreadable chunk at {offset:#x}: {e}");
                }
                Err(e) => return Err(e),
            }

            offset += chunk_len as u64;
        }
        Ok(None)
    }
}
