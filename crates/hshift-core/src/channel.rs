//! Read/write channel to the two resolved gear fields.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::gear::{Gear, GearField};
use crate::memory::{ReadMemory, WriteMemory};

/// Output of a successful scan. Records two addresses that stay valid only
/// while the target's memory layout is unchanged; a rescan replaces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAddresses {
    pub current_gear: u64,
    pub last_gear: u64,
}

impl ResolvedAddresses {
    pub fn address_of(&self, field: GearField) -> u64 {
        match field {
            GearField::Current => self.current_gear,
            GearField::Last => self.last_gear,
        }
    }
}

pub struct GearChannel<'a, M: ReadMemory + WriteMemory> {
    memory: &'a M,
    addresses: ResolvedAddresses,
}

impl<'a, M: ReadMemory + WriteMemory> GearChannel<'a, M> {
    pub fn new(memory: &'a M, addresses: ResolvedAddresses) -> Self {
        Self { memory, addresses }
    }

    /// Raw integer value of one field.
    pub fn read_raw(&self, field: GearField) -> Result<i32> {
        self.memory.read_i32(self.addresses.address_of(field))
    }

    /// Decoded gear of one field; `None` if the value is outside the gear
    /// enumeration (which usually means the addresses went stale).
    pub fn read(&self, field: GearField) -> Result<Option<Gear>> {
        Ok(Gear::from_raw(self.read_raw(field)?))
    }

    /// Force a gear. Both fields are written so they stay mutually
    /// consistent. The writes are independent: if the second fails after
    /// the first succeeds the fields are left inconsistent, and the error
    /// surfaces to the caller instead of being retried here.
    pub fn shift(&self, gear: Gear) -> Result<()> {
        debug!("shifting to {gear} ({})", gear.raw());
        self.memory
            .write_i32(self.addresses.current_gear, gear.raw())?;
        self.memory.write_i32(self.addresses.last_gear, gear.raw())?;
        Ok(())
    }
}
