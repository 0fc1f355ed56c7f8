//! One-shot scan: locate the gear fields, print them, and exit.

use std::path::Path;

use anyhow::Result;

#[cfg(target_os = "windows")]
pub fn run(process: &str, signatures: Option<&Path>) -> Result<()> {
    use hshift_core::{GearField, MemoryReader, ReadMemory};

    let set = super::load_signature_set(signatures)?;
    let handle = super::open_game(process)?;
    let reader = MemoryReader::new(&handle);
    let window = super::game_window(handle.pid());

    let resolved = super::resolve_addresses(&reader, window.as_ref(), &set)?;

    println!("Signature set:  {}", set.version);
    println!("Current gear:   {:#x}", resolved.current_gear);
    println!("Last gear:      {:#x}", resolved.last_gear);

    let current = reader.read_i32(resolved.address_of(GearField::Current))?;
    println!("Current value:  {current}");

    Ok(())
}

#[cfg(not(target_os = "windows"))]
pub fn run(_process: &str, _signatures: Option<&Path>) -> Result<()> {
    anyhow::bail!("scanning another process is only supported on Windows")
}
