//! In-memory process double for scanner, sampler, and channel tests.
//!
//! Volatile ranges emulate the game's simulation: every read advances a
//! tick that mutates the bytes inside them, so consecutive polls of a
//! "live" window observe different values while everything else stays
//! byte-identical.

use std::cell::RefCell;
use std::ops::Range;

use crate::error::{Error, Result};
use crate::memory::reader::{ReadMemory, WriteMemory};
use crate::memory::region::{MemoryRegion, PAGE_GUARD, PAGE_NOACCESS, PAGE_READWRITE, RegionState};

/// How reads against a region behave beyond what its metadata implies.
#[derive(Clone, Copy, PartialEq, Eq)]
enum ReadBehavior {
    Normal,
    /// Fails with `AccessDenied` despite scannable-looking metadata, like a
    /// page decommitted between enumeration and the read.
    Denied,
    /// Fails with a non-skippable error.
    Broken,
}

struct MockRegion {
    meta: MemoryRegion,
    data: RefCell<Vec<u8>>,
    behavior: ReadBehavior,
}

pub struct MockProcess {
    regions: Vec<MockRegion>,
    volatile: Vec<Range<u64>>,
    reads: RefCell<Vec<(u64, usize)>>,
}

impl MockProcess {
    /// Every read issued so far, as (address, length) pairs.
    pub fn read_log(&self) -> Vec<(u64, usize)> {
        self.reads.borrow().clone()
    }

    /// Number of logged reads overlapping [start, end).
    pub fn reads_overlapping(&self, start: u64, end: u64) -> usize {
        self.reads
            .borrow()
            .iter()
            .filter(|(addr, len)| *addr < end && addr + *len as u64 > start)
            .count()
    }

    fn region_containing(&self, address: u64, length: u64) -> Option<&MockRegion> {
        self.regions
            .iter()
            .find(|r| address >= r.meta.base && address + length <= r.meta.end())
    }

    fn tick_volatile(&self) {
        for range in &self.volatile {
            for region in &self.regions {
                let start = range.start.max(region.meta.base);
                let end = range.end.min(region.meta.end());
                if start >= end {
                    continue;
                }
                let mut data = region.data.borrow_mut();
                for offset in start..end {
                    let i = (offset - region.meta.base) as usize;
                    data[i] = data[i].wrapping_add(1);
                }
            }
        }
    }
}

impl ReadMemory for MockProcess {
    fn read_into(&self, address: u64, buffer: &mut [u8]) -> Result<()> {
        self.reads.borrow_mut().push((address, buffer.len()));
        self.tick_volatile();

        let length = buffer.len();
        let region = self
            .region_containing(address, length as u64)
            .ok_or(Error::AccessDenied { address, length })?;

        if region.behavior == ReadBehavior::Broken {
            return Err(Error::Io(std::io::Error::other("simulated read failure")));
        }

        let unreadable = region.behavior == ReadBehavior::Denied
            || region.meta.state != RegionState::Committed
            || region.meta.protect & (PAGE_GUARD | PAGE_NOACCESS) != 0;
        if unreadable {
            return Err(Error::AccessDenied { address, length });
        }

        let start = (address - region.meta.base) as usize;
        buffer.copy_from_slice(&region.data.borrow()[start..start + length]);
        Ok(())
    }

    fn next_region(&self, address: u64) -> Option<MemoryRegion> {
        self.regions
            .iter()
            .find(|r| r.meta.end() > address)
            .map(|r| r.meta)
    }
}

impl WriteMemory for MockProcess {
    fn write_bytes(&self, address: u64, data: &[u8]) -> Result<()> {
        let length = data.len() as u64;
        let region = self.region_containing(address, length).ok_or_else(|| {
            Error::WriteFailed {
                address,
                length: data.len(),
                message: "no region".to_string(),
            }
        })?;

        if region.meta.state != RegionState::Committed
            || region.meta.protect & PAGE_READWRITE == 0
        {
            return Err(Error::WriteFailed {
                address,
                length: data.len(),
                message: "region not writable".to_string(),
            });
        }

        let start = (address - region.meta.base) as usize;
        region.data.borrow_mut()[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }
}

#[derive(Default)]
pub struct MockProcessBuilder {
    regions: Vec<MockRegion>,
    volatile: Vec<Range<u64>>,
}

impl MockProcessBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed read-write region backed by `data`.
    pub fn region(self, base: u64, data: Vec<u8>) -> Self {
        self.region_protected(base, data, PAGE_READWRITE)
    }

    /// Committed region with explicit protection bits.
    pub fn region_protected(mut self, base: u64, data: Vec<u8>, protect: u32) -> Self {
        self.regions.push(MockRegion {
            meta: MemoryRegion {
                base,
                size: data.len() as u64,
                state: RegionState::Committed,
                protect,
            },
            data: RefCell::new(data),
            behavior: ReadBehavior::Normal,
        });
        self
    }

    /// Reserved (uncommitted) region of the given size.
    pub fn reserved(mut self, base: u64, size: u64) -> Self {
        self.regions.push(MockRegion {
            meta: MemoryRegion {
                base,
                size,
                state: RegionState::Reserved,
                protect: 0,
            },
            data: RefCell::new(vec![0u8; size as usize]),
            behavior: ReadBehavior::Normal,
        });
        self
    }

    /// Region that enumerates as committed read-write but fails every read
    /// with `AccessDenied`.
    pub fn faulted(mut self, base: u64, size: u64) -> Self {
        self.regions.push(MockRegion {
            meta: MemoryRegion {
                base,
                size,
                state: RegionState::Committed,
                protect: PAGE_READWRITE,
            },
            data: RefCell::new(vec![0u8; size as usize]),
            behavior: ReadBehavior::Denied,
        });
        self
    }

    /// Region whose reads fail with a non-skippable error.
    pub fn broken(mut self, base: u64, size: u64) -> Self {
        self.regions.push(MockRegion {
            meta: MemoryRegion {
                base,
                size,
                state: RegionState::Committed,
                protect: PAGE_READWRITE,
            },
            data: RefCell::new(vec![0u8; size as usize]),
            behavior: ReadBehavior::Broken,
        });
        self
    }

    /// Mark [start, start + len) as changing on every poll.
    pub fn volatile(mut self, start: u64, len: u64) -> Self {
        self.volatile.push(start..start + len);
        self
    }

    pub fn build(mut self) -> MockProcess {
        self.regions.sort_by_key(|r| r.meta.base);
        MockProcess {
            regions: self.regions,
            volatile: self.volatile,
            reads: RefCell::new(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volatile_range_changes_between_reads() {
        let mock = MockProcessBuilder::new()
            .region(0x1000, vec![0u8; 64])
            .volatile(0x1010, 8)
            .build();

        let first = mock.read_bytes(0x1010, 8).unwrap();
        let second = mock.read_bytes(0x1010, 8).unwrap();
        assert_ne!(first, second);

        let stable_a = mock.read_bytes(0x1020, 8).unwrap();
        let stable_b = mock.read_bytes(0x1020, 8).unwrap();
        assert_eq!(stable_a, stable_b);
    }

    #[test]
    fn test_guard_region_read_fails() {
        let mock = MockProcessBuilder::new()
            .region_protected(0x1000, vec![0u8; 16], PAGE_READWRITE | PAGE_GUARD)
            .build();
        assert!(mock.read_bytes(0x1000, 4).is_err());
    }

    #[test]
    fn test_write_then_read_roundtrip() {
        let mock = MockProcessBuilder::new()
            .region(0x1000, vec![0u8; 16])
            .build();
        mock.write_i32(0x1004, 7).unwrap();
        assert_eq!(mock.read_i32(0x1004).unwrap(), 7);
    }
}
