//! Gear enumeration as stored in the game's transmission struct.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, FromRepr, IntoStaticStr};

/// Gear values as the game encodes them: reverse and neutral first,
/// then forward gears 1 through 8.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    FromRepr,
    EnumString,
    IntoStaticStr,
    Display,
)]
#[repr(i32)]
pub enum Gear {
    #[strum(serialize = "R")]
    Reverse = 0,
    #[strum(serialize = "N")]
    Neutral = 1,
    #[strum(serialize = "1")]
    First = 2,
    #[strum(serialize = "2")]
    Second = 3,
    #[strum(serialize = "3")]
    Third = 4,
    #[strum(serialize = "4")]
    Fourth = 5,
    #[strum(serialize = "5")]
    Fifth = 6,
    #[strum(serialize = "6")]
    Sixth = 7,
    #[strum(serialize = "7")]
    Seventh = 8,
    #[strum(serialize = "8")]
    Eighth = 9,
}

impl Gear {
    /// Lowest raw value the game uses (reverse).
    pub const MIN_RAW: i32 = 0;
    /// Highest raw value the game uses (8th gear).
    pub const MAX_RAW: i32 = 9;

    pub fn from_raw(value: i32) -> Option<Self> {
        Self::from_repr(value)
    }

    pub fn raw(&self) -> i32 {
        *self as i32
    }

    pub fn short_name(&self) -> &'static str {
        self.into()
    }
}

/// Which of the two tracked transmission fields an address or signature
/// refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum GearField {
    #[strum(serialize = "current gear")]
    Current,
    #[strum(serialize = "last gear")]
    Last,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_roundtrip() {
        assert_eq!(Gear::from_raw(0), Some(Gear::Reverse));
        assert_eq!(Gear::from_raw(1), Some(Gear::Neutral));
        assert_eq!(Gear::from_raw(2), Some(Gear::First));
        assert_eq!(Gear::from_raw(9), Some(Gear::Eighth));
        assert_eq!(Gear::from_raw(10), None);
        assert_eq!(Gear::from_raw(-1), None);
    }

    #[test]
    fn test_short_names() {
        assert_eq!(Gear::Reverse.short_name(), "R");
        assert_eq!(Gear::Neutral.short_name(), "N");
        assert_eq!(Gear::Third.short_name(), "3");
    }
}
