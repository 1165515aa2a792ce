use core::fmt;
use core::str::FromStr;

use crate::error::Error;

/// Moisture on an 11 step scale, 0 is bone dry and 10 is soaked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MoistureClass {
    Level(u8),
    /// Reading outside the calibrated ADC window, sent as `X`.
    OutOfRange,
}

impl MoistureClass {
    pub const WETTEST: u8 = 10;

    pub fn level(&self) -> Option<u8> {
        match self {
            MoistureClass::Level(level) => Some(*level),
            MoistureClass::OutOfRange => None,
        }
    }
}

// 100% dry reads ~4095 (2.7V), 100% wet reads ~0 (1.2V).
pub fn classify(raw: i32) -> MoistureClass {
    let level = match raw {
        0..=1410 => 10,
        1411..=1620 => 9,
        1621..=1830 => 8,
        1831..=2040 => 7,
        2041..=2250 => 6,
        2251..=2460 => 5,
        2461..=2670 => 4,
        2671..=2880 => 3,
        2881..=3090 => 2,
        3091..=3300 => 1,
        3301..=4094 => 0,
        _ => return MoistureClass::OutOfRange,
    };

    MoistureClass::Level(level)
}

impl fmt::Display for MoistureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoistureClass::Level(level) => write!(f, "{}", level),
            MoistureClass::OutOfRange => f.write_str("X"),
        }
    }
}

impl FromStr for MoistureClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "X" {
            return Ok(MoistureClass::OutOfRange);
        }

        // only the exact digits `Display` writes, no sign or leading zero
        let canonical = !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) && (s == "0" || !s.starts_with('0'));
        if !canonical {
            return Err(Error::MalformedPayload);
        }

        match s.parse::<u8>() {
            Ok(level) if level <= Self::WETTEST => Ok(MoistureClass::Level(level)),
            _ => Err(Error::MalformedPayload),
        }
    }
}
