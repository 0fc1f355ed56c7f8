//! One-shot shift: force a gear and exit.
//!
//! With `--current`/`--last` the scan is skipped entirely and the given
//! addresses are trusted, which is what you want when re-running shortly
//! after a `scan`.

use std::path::Path;
use std::str::FromStr;

use anyhow::Result;
use hshift_core::Gear;

/// Parse the gear argument: `r`, `n`, or a forward gear number `1`-`8`.
pub fn parse_gear(s: &str) -> Result<Gear> {
    match s {
        "r" | "R" => Ok(Gear::Reverse),
        "n" | "N" => Ok(Gear::Neutral),
        other => Gear::from_str(other)
            .map_err(|_| anyhow::anyhow!("unknown gear {other:?} (expected r, n, or 1-8)")),
    }
}

#[cfg(target_os = "windows")]
pub fn run(
    process: &str,
    gear: &str,
    signatures: Option<&Path>,
    current: Option<&str>,
    last: Option<&str>,
) -> Result<()> {
    use hshift_core::{GearChannel, GearField, MemoryReader, ResolvedAddresses};

    let gear = parse_gear(gear)?;
    let handle = super::open_game(process)?;
    let reader = MemoryReader::new(&handle);

    let resolved = match (current, last) {
        (Some(current), Some(last)) => ResolvedAddresses {
            current_gear: super::parse_hex_address(current)?,
            last_gear: super::parse_hex_address(last)?,
        },
        (None, None) => {
            let set = super::load_signature_set(signatures)?;
            let window = super::game_window(handle.pid());
            super::resolve_addresses(&reader, window.as_ref(), &set)?
        }
        _ => anyhow::bail!("--current and --last must be given together"),
    };

    let channel = GearChannel::new(&reader, resolved);
    channel.shift(gear)?;

    match channel.read(GearField::Current)? {
        Some(read_back) => println!("Shifted to {read_back}"),
        None => println!("Shifted, but the field reads back out of range"),
    }

    Ok(())
}

#[cfg(not(target_os = "windows"))]
pub fn run(
    _process: &str,
    _gear: &str,
    _signatures: Option<&Path>,
    _current: Option<&str>,
    _last: Option<&str>,
) -> Result<()> {
    anyhow::bail!("gear shifting is only supported on Windows")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gear_accepts_letters_and_numbers() {
        assert_eq!(parse_gear("r").unwrap(), Gear::Reverse);
        assert_eq!(parse_gear("N").unwrap(), Gear::Neutral);
        assert_eq!(parse_gear("1").unwrap(), Gear::First);
        assert_eq!(parse_gear("8").unwrap(), Gear::Eighth);
    }

    #[test]
    fn test_parse_gear_rejects_out_of_range() {
        assert!(parse_gear("9").is_err());
        assert!(parse_gear("x").is_err());
        assert!(parse_gear("").is_err());
    }
}
