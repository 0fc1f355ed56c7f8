//! Console gear readout.
//!
//! Redraws the whole frame on every gear change; the frame is small enough
//! that clearing and reprinting beats cursor bookkeeping.

use std::io::{Stdout, Write, stdout};

use anyhow::Result;
use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};
use hshift_core::Gear;

const HEADER: &str = "\
[ ------- hshift gear control ------- ]\n\
[ 0 - 9  shift gears                  ]\n\
[ DELETE rescan gear addresses        ]\n\
[ END    exit                         ]\n\
[ ----------------------------------- ]\n";

pub struct GearDisplay {
    out: Stdout,
    enabled: bool,
}

impl GearDisplay {
    pub fn new() -> Self {
        Self {
            out: stdout(),
            enabled: true,
        }
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Redraw the frame with the shifter knob showing `gear`. `None` draws
    /// a `?`, shown when the field holds a value outside the gear range.
    pub fn draw(&mut self, gear: Option<Gear>) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let label = knob_label(gear);

        execute!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        self.out.write_all(HEADER.as_bytes())?;
        writeln!(self.out)?;
        writeln!(self.out, "        ___________")?;
        writeln!(self.out, "       /           \\")?;
        writeln!(self.out, "      /             \\")?;
        writeln!(self.out, "     |      ___      |")?;
        writeln!(self.out, "     |     / {label} \\     |")?;
        writeln!(self.out, "     |     \\___/     |")?;
        writeln!(self.out, "      \\             /")?;
        writeln!(self.out, "       \\___________/")?;
        self.out.flush()?;
        Ok(())
    }
}

impl Default for GearDisplay {
    fn default() -> Self {
        Self::new()
    }
}

/// Single character drawn inside the knob.
fn knob_label(gear: Option<Gear>) -> &'static str {
    match gear {
        Some(gear) => gear.short_name(),
        None => "?",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knob_label_uses_short_gear_names() {
        assert_eq!(knob_label(Some(Gear::Reverse)), "R");
        assert_eq!(knob_label(Some(Gear::Neutral)), "N");
        assert_eq!(knob_label(Some(Gear::First)), "1");
        assert_eq!(knob_label(Some(Gear::Eighth)), "8");
    }

    #[test]
    fn test_knob_label_falls_back_for_out_of_range_values() {
        assert_eq!(knob_label(None), "?");
    }

    #[test]
    fn test_toggle_flips_enabled_state() {
        let mut display = GearDisplay::new();
        assert!(display.is_enabled());
        display.toggle();
        assert!(!display.is_enabled());
        display.toggle();
        assert!(display.is_enabled());
    }
}
