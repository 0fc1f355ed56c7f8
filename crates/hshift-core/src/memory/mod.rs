mod process;
mod reader;
mod region;

#[cfg(test)]
pub mod mock;

pub use process::{ProcessHandle, find_process_id};
pub use reader::{ReadMemory, Regions, WriteMemory};
pub use region::{
    MemoryRegion, PAGE_EXECUTE_READ, PAGE_GUARD, PAGE_NOACCESS, PAGE_READONLY, PAGE_READWRITE,
    RegionState,
};

#[cfg(target_os = "windows")]
pub use reader::MemoryReader;

#[cfg(test)]
pub use mock::{MockProcess, MockProcessBuilder};
