//! Packed pitch/bank/heading word used by position packets.
//!
//! Layout, most significant bit first:
//!
//! ```text
//! | pitch (10) | bank (10) | heading (10) | on_ground (1) | unused (1) |
//! ```
//!
//! Pitch and bank are stored as 10-bit two's complement of
//! `degrees / -360 * 1024`; heading as `degrees / 360 * 1024`.

const FIELD_MASK: u32 = 0x3FF;
const SCALE: f64 = 1024.0 / 360.0;

/// Decoded attitude of an aircraft.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PitchBankHeading {
    pub pitch: f64,
    pub bank: f64,
    pub heading: f64,
    pub on_ground: bool,
}

impl PitchBankHeading {
    pub fn new(pitch: f64, bank: f64, heading: f64, on_ground: bool) -> Self {
        Self {
            pitch,
            bank,
            heading,
            on_ground,
        }
    }

    /// Pack into the wire representation.
    pub fn pack(&self) -> u32 {
        let pitch = ((-self.pitch * SCALE) as i32 as u32) & FIELD_MASK;
        let bank = ((-self.bank * SCALE) as i32 as u32) & FIELD_MASK;
        let heading = ((normalize_degrees(self.heading) * SCALE) as u32) & FIELD_MASK;
        let ground = u32::from(self.on_ground);

        (pitch << 22) | (bank << 12) | (heading << 2) | (ground << 1)
    }

    /// Decode a packed word.
    pub fn unpack(packed: u32) -> Self {
        let pitch = sign_extend((packed >> 22) & FIELD_MASK);
        let bank = sign_extend((packed >> 12) & FIELD_MASK);
        let heading = (packed >> 2) & FIELD_MASK;

        Self {
            pitch: -f64::from(pitch) / SCALE,
            bank: -f64::from(bank) / SCALE,
            heading: f64::from(heading) / SCALE,
            on_ground: (packed >> 1) & 1 == 1,
        }
    }
}

fn sign_extend(field: u32) -> i32 {
    if field & 0x200 != 0 {
        field as i32 - 0x400
    } else {
        field as i32
    }
}

/// Wrap degrees into [0, 360).
fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees % 360.0;
    if wrapped < 0.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESOLUTION: f64 = 360.0 / 1024.0;

    #[test]
    fn test_level_on_ground() {
        let packed = PitchBankHeading::new(0.0, 0.0, 0.0, true).pack();
        assert_eq!(packed, 0b10);
    }

    #[test]
    fn test_attitude_survives_packing_within_resolution() {
        let attitude = PitchBankHeading::new(5.0, -20.0, 270.0, false);
        let decoded = PitchBankHeading::unpack(attitude.pack());

        assert!((decoded.pitch - 5.0).abs() <= RESOLUTION);
        assert!((decoded.bank + 20.0).abs() <= RESOLUTION);
        assert!((decoded.heading - 270.0).abs() <= RESOLUTION);
        assert!(!decoded.on_ground);
    }

    #[test]
    fn test_negative_heading_wraps() {
        let decoded = PitchBankHeading::unpack(PitchBankHeading::new(0.0, 0.0, -90.0, false).pack());
        assert!((decoded.heading - 270.0).abs() <= RESOLUTION);
    }
}
