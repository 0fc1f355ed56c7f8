//! Key-to-gear bindings, loadable from JSON.
//!
//! The default map mirrors the number row: `0` selects reverse, `1` neutral,
//! `2` through `9` the forward gears.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use hshift_core::Gear;
use serde::{Deserialize, Serialize};

/// A single virtual-key to gear binding. `key` is a Windows virtual-key
/// code; the digit row is 0x30..=0x39.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct KeyBinding {
    pub key: u32,
    pub gear: Gear,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyMap {
    pub bindings: Vec<KeyBinding>,
}

impl KeyMap {
    /// Look up the gear bound to a virtual-key code, if any.
    pub fn gear_for(&self, key: u32) -> Option<Gear> {
        self.bindings
            .iter()
            .find(|binding| binding.key == key)
            .map(|binding| binding.gear)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading key map {}", path.display()))?;
        let map: KeyMap = serde_json::from_str(&content)
            .with_context(|| format!("parsing key map {}", path.display()))?;
        map.validate()?;
        Ok(map)
    }

    fn validate(&self) -> Result<()> {
        if self.bindings.is_empty() {
            bail!("key map has no bindings");
        }
        for (i, binding) in self.bindings.iter().enumerate() {
            if self.bindings[..i].iter().any(|b| b.key == binding.key) {
                bail!("key {:#x} is bound more than once", binding.key);
            }
        }
        Ok(())
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        let bindings = (Gear::MIN_RAW..=Gear::MAX_RAW)
            .filter_map(|raw| {
                let gear = Gear::from_raw(raw)?;
                Some(KeyBinding {
                    key: 0x30 + raw as u32,
                    gear,
                })
            })
            .collect();
        Self { bindings }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_map_covers_number_row() {
        let map = KeyMap::default();
        assert_eq!(map.bindings.len(), 10);
        assert_eq!(map.gear_for(0x30), Some(Gear::Reverse));
        assert_eq!(map.gear_for(0x31), Some(Gear::Neutral));
        assert_eq!(map.gear_for(0x32), Some(Gear::First));
        assert_eq!(map.gear_for(0x39), Some(Gear::Eighth));
        assert_eq!(map.gear_for(0x41), None);
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let map = KeyMap {
            bindings: vec![
                KeyBinding {
                    key: 0x31,
                    gear: Gear::Neutral,
                },
                KeyBinding {
                    key: 0x31,
                    gear: Gear::First,
                },
            ],
        };
        assert!(map.validate().is_err());
    }

    #[test]
    fn test_empty_map_rejected() {
        let map = KeyMap { bindings: vec![] };
        assert!(map.validate().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let map = KeyMap::default();
        let json = serde_json::to_string(&map).unwrap();
        let back: KeyMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back.bindings.len(), map.bindings.len());
        assert_eq!(back.gear_for(0x35), Some(Gear::Fourth));
    }
}
