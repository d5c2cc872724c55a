//! Transponder code and mode.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A four-digit octal transponder code, held as its decimal display value.
///
/// `Squawk(7000)` is displayed and sent as `7000`; every digit is 0-7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Squawk(u16);

/// Rejected transponder code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid transponder code '{0}': expected four digits 0-7")]
pub struct InvalidSquawk(pub String);

impl Squawk {
    /// VFR conspicuity code used when nothing else is set.
    pub const VFR: Self = Self(7000);

    /// Build from a display value such as `1200`.
    pub fn new(code: u16) -> Result<Self, InvalidSquawk> {
        if code > 7777 || !digits_are_octal(code) {
            return Err(InvalidSquawk(code.to_string()));
        }
        Ok(Self(code))
    }

    /// The display value.
    pub fn code(&self) -> u16 {
        self.0
    }
}

impl Default for Squawk {
    fn default() -> Self {
        Self::VFR
    }
}

fn digits_are_octal(mut code: u16) -> bool {
    for _ in 0..4 {
        if code % 10 > 7 {
            return false;
        }
        code /= 10;
    }
    true
}

impl fmt::Display for Squawk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

impl FromStr for Squawk {
    type Err = InvalidSquawk;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.len() > 4 {
            return Err(InvalidSquawk(s.to_string()));
        }
        let code: u16 = s.parse().map_err(|_| InvalidSquawk(s.to_string()))?;
        Self::new(code)
    }
}

/// Transponder mode as reported in the position packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransponderMode {
    #[default]
    Standby,
    /// Mode C, altitude reporting.
    ModeC,
    /// Mode C with the ident button held.
    Ident,
}

impl TransponderMode {
    /// Single-letter wire identifier.
    pub fn as_wire(&self) -> char {
        match self {
            Self::Standby => 'S',
            Self::ModeC => 'N',
            Self::Ident => 'Y',
        }
    }

    pub fn from_wire(c: char) -> Option<Self> {
        match c {
            'S' => Some(Self::Standby),
            'N' => Some(Self::ModeC),
            'Y' => Some(Self::Ident),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_squawks() {
        assert_eq!("1200".parse::<Squawk>().unwrap().code(), 1200);
        assert_eq!("0000".parse::<Squawk>().unwrap().code(), 0);
        assert_eq!("7777".parse::<Squawk>().unwrap().code(), 7777);
    }

    #[test]
    fn test_non_octal_digits_rejected() {
        assert!("1280".parse::<Squawk>().is_err());
        assert!("8000".parse::<Squawk>().is_err());
        assert!(Squawk::new(7778).is_err());
        assert!("12000".parse::<Squawk>().is_err());
        assert!("".parse::<Squawk>().is_err());
    }

    #[test]
    fn test_display_is_zero_padded() {
        assert_eq!(Squawk::new(12).unwrap().to_string(), "0012");
    }

    #[test]
    fn test_mode_wire_letters() {
        for mode in [
            TransponderMode::Standby,
            TransponderMode::ModeC,
            TransponderMode::Ident,
        ] {
            assert_eq!(TransponderMode::from_wire(mode.as_wire()), Some(mode));
        }
        assert_eq!(TransponderMode::from_wire('X'), None);
    }
}
