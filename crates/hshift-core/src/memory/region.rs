//! Memory region descriptors and the scannability filter.
//!
//! Protection and state values mirror the stable Win32 constants so the
//! filter logic stays testable on any host. The Windows reader converts
//! `MEMORY_BASIC_INFORMATION` into this representation at the boundary.

/// No access permitted (PAGE_NOACCESS).
pub const PAGE_NOACCESS: u32 = 0x01;
/// Read-only data (PAGE_READONLY).
pub const PAGE_READONLY: u32 = 0x02;
/// Read-write data (PAGE_READWRITE).
pub const PAGE_READWRITE: u32 = 0x04;
/// Executable, readable code (PAGE_EXECUTE_READ).
pub const PAGE_EXECUTE_READ: u32 = 0x20;
/// Guard page modifier (PAGE_GUARD).
pub const PAGE_GUARD: u32 = 0x100;

/// Allocation state of a region, collapsed from MEM_COMMIT / MEM_RESERVE /
/// MEM_FREE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionState {
    Committed,
    Reserved,
    Free,
}

/// One region descriptor as produced by enumeration. Transient: consumed
/// immediately by the scanner and never cached across scans, since the
/// target's layout is not assumed stable between scan invocations.
#[derive(Debug, Clone, Copy)]
pub struct MemoryRegion {
    pub base: u64,
    pub size: u64,
    pub state: RegionState,
    pub protect: u32,
}

impl MemoryRegion {
    /// First address past the region.
    pub fn end(&self) -> u64 {
        self.base.saturating_add(self.size)
    }

    /// Whether the scanner should read this region at all.
    ///
    /// Only committed, unguarded, read-write memory can hold mutable
    /// gameplay data; skipping everything else is what keeps a multi-TB
    /// address range walk tractable.
    pub fn is_scannable(&self) -> bool {
        self.state == RegionState::Committed
            && self.protect & PAGE_READWRITE != 0
            && self.protect & (PAGE_GUARD | PAGE_NOACCESS) == 0
    }
}
