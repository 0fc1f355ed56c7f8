//! Remote memory access traits and the Windows implementation.
//!
//! `ReadMemory` is the seam every scanner component works through; tests
//! substitute the in-memory `MockProcess`. There is no retry policy at this
//! layer: a failed read surfaces as an error and the caller decides whether
//! to skip or abort.

use crate::error::Result;
use crate::memory::region::MemoryRegion;

pub trait ReadMemory {
    /// Fill `buffer` from the target's address space. A short read is an
    /// error (`PartialRead`); callers treat the chunk as unreadable.
    fn read_into(&self, address: u64, buffer: &mut [u8]) -> Result<()>;

    /// Query the region containing (or following) `address`. `None` signals
    /// the end of the address space and terminates enumeration.
    fn next_region(&self, address: u64) -> Option<MemoryRegion>;

    fn read_bytes(&self, address: u64, length: usize) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; length];
        self.read_into(address, &mut buffer)?;
        Ok(buffer)
    }

    fn read_i32(&self, address: u64) -> Result<i32> {
        let bytes = self.read_bytes(address, 4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Lazy, finite walk over the address space: each region is queried at
    /// the previous region's end until the query fails.
    fn regions(&self) -> Regions<'_, Self>
    where
        Self: Sized,
    {
        Regions {
            reader: self,
            cursor: 0,
            done: false,
        }
    }
}

pub trait WriteMemory {
    fn write_bytes(&self, address: u64, data: &[u8]) -> Result<()>;

    fn write_i32(&self, address: u64, value: i32) -> Result<()> {
        self.write_bytes(address, &value.to_le_bytes())
    }
}

/// Iterator produced by [`ReadMemory::regions`].
pub struct Regions<'a, R: ReadMemory> {
    reader: &'a R,
    cursor: u64,
    done: bool,
}

impl<R: ReadMemory> Iterator for Regions<'_, R> {
    type Item = MemoryRegion;

    fn next(&mut self) -> Option<MemoryRegion> {
        if self.done {
            return None;
        }

        let region = self.reader.next_region(self.cursor)?;
        match region.base.checked_add(region.size) {
            Some(next) if region.size > 0 => self.cursor = next,
            _ => self.done = true,
        }
        Some(region)
    }
}

#[cfg(target_os = "windows")]
pub use platform::MemoryReader;

#[cfg(target_os = "windows")]
mod platform {
    use std::ffi::c_void;

    use windows::Win32::System::Diagnostics::Debug::{ReadProcessMemory, WriteProcessMemory};
    use windows::Win32::System::Memory::{
        MEM_COMMIT, MEM_RESERVE, MEMORY_BASIC_INFORMATION, VirtualQueryEx,
    };

    use super::{ReadMemory, WriteMemory};
    use crate::error::{Error, Result};
    use crate::memory::process::ProcessHandle;
    use crate::memory::region::{MemoryRegion, RegionState};

    /// Reader/writer over a live process handle.
    pub struct MemoryReader<'a> {
        process: &'a ProcessHandle,
    }

    impl<'a> MemoryReader<'a> {
        pub fn new(process: &'a ProcessHandle) -> Self {
            Self { process }
        }
    }

    impl ReadMemory for MemoryReader<'_> {
        fn read_into(&self, address: u64, buffer: &mut [u8]) -> Result<()> {
            let length = buffer.len();
            let mut bytes_read = 0usize;

            // SAFETY: the destination buffer is `length` bytes and
            // ReadProcessMemory writes at most that many.
            let result = unsafe {
                ReadProcessMemory(
                    self.process.raw(),
                    address as *const c_void,
                    buffer.as_mut_ptr().cast(),
                    length,
                    Some(&mut bytes_read),
                )
            };

            if result.is_err() {
                return Err(Error::AccessDenied { address, length });
            }
            if bytes_read != length {
                return Err(Error::PartialRead {
                    address,
                    expected: length,
                    actual: bytes_read,
                });
            }
            Ok(())
        }

        fn next_region(&self, address: u64) -> Option<MemoryRegion> {
            let mut info = MEMORY_BASIC_INFORMATION::default();

            // SAFETY: VirtualQueryEx fills `info` for a valid handle; a zero
            // return means the query address is past the address space.
            let written = unsafe {
                VirtualQueryEx(
                    self.process.raw(),
                    Some(address as *const c_void),
                    &mut info,
                    std::mem::size_of::<MEMORY_BASIC_INFORMATION>(),
                )
            };
            if written == 0 {
                return None;
            }

            let state = if info.State == MEM_COMMIT {
                RegionState::Committed
            } else if info.State == MEM_RESERVE {
                RegionState::Reserved
            } else {
                RegionState::Free
            };

            Some(MemoryRegion {
                base: info.BaseAddress as u64,
                size: info.RegionSize as u64,
                state,
                protect: info.Protect.0,
            })
        }
    }

    impl WriteMemory for MemoryReader<'_> {
        fn write_bytes(&self, address: u64, data: &[u8]) -> Result<()> {
            let mut bytes_written = 0usize;

            // SAFETY: the source buffer outlives the call and
            // WriteProcessMemory reads at most `data.len()` bytes from it.
            let result = unsafe {
                WriteProcessMemory(
                    self.process.raw(),
                    address as *const c_void,
                    data.as_ptr().cast(),
                    data.len(),
                    Some(&mut bytes_written),
                )
            };

            if result.is_err() || bytes_written != data.len() {
                return Err(Error::WriteFailed {
                    address,
                    length: data.len(),
                    message: result
                        .err()
                        .map(|e| e.to_string())
                        .unwrap_or_else(|| format!("short write ({bytes_written} bytes)")),
                });
            }
            Ok(())
        }
    }
}
