//! # hshift-core
//!
//! Core library for the hshift gear forcer.
//!
//! This crate provides:
//! - Remote process memory access (read/write/region enumeration)
//! - Signature scanning over the full candidate address range
//! - Candidate verification via temporal sampling heuristics
//! - A read/write channel to the resolved gear fields
//!
//! The scanner locates two 32-bit transmission fields ("current gear" and
//! "last gear") inside a closed-source game process by searching for a known
//! byte artifact and separating the live gameplay struct from decoy matches:
//! real physics memory fluctuates every simulation tick, decoys do not.
//!
//! Addresses are never persisted: any layout change in the target (level
//! load, restart) invalidates them and requires a rescan.

pub mod channel;
pub mod error;
pub mod gear;
pub mod memory;
pub mod scan;
pub mod window;

pub use channel::{GearChannel, ResolvedAddresses};
pub use error::{Error, Result};
pub use gear::{Gear, GearField};
pub use memory::{MemoryRegion, ProcessHandle, ReadMemory, RegionState, WriteMemory, find_process_id};
pub use scan::{
    FieldSignature, GameWindow, ProbeWindow, ScanConfig, ScanState, Scanner, SignatureSet,
    Verifier, load_signatures, save_signatures,
};
pub use window::{WindowHandle, find_window_by_pid};

#[cfg(target_os = "windows")]
pub use memory::MemoryReader;
