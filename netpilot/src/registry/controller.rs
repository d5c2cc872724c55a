//! Known ATC stations.

use std::time::Instant;

use crate::frequency::{normalize_wire, wire_to_hz};

/// Wire frequency the network uses for stations that are not on a frequency.
pub const NO_FREQUENCY_WIRE: u32 = 99_998;

/// One ATC station seen on the network.
///
/// Created on the first position report for a callsign and updated in place
/// by every later report.
#[derive(Debug, Clone, PartialEq)]
pub struct Controller {
    /// Network callsign, e.g. `EDDF_TWR`.
    pub callsign: String,
    /// Frequency exactly as reported on the wire.
    pub frequency: u32,
    /// `frequency` converted to Hertz and snapped to the 25 kHz grid.
    pub normalized_frequency: u32,
    pub latitude: f64,
    pub longitude: f64,
    /// Time of the last position report.
    pub last_update: Instant,
    /// Real name from a `RN` query response, if one arrived.
    pub real_name: Option<String>,
}

impl Controller {
    pub(crate) fn new(
        callsign: &str,
        frequency: u32,
        latitude: f64,
        longitude: f64,
        now: Instant,
    ) -> Self {
        Self {
            callsign: callsign.to_string(),
            frequency,
            normalized_frequency: normalize_wire(frequency),
            latitude,
            longitude,
            last_update: now,
            real_name: None,
        }
    }

    /// Raw frequency converted to Hertz without normalization.
    #[inline]
    pub fn frequency_hz(&self) -> u32 {
        wire_to_hz(self.frequency)
    }

    /// True if the station is actually working a frequency.
    pub fn has_frequency(&self) -> bool {
        self.frequency != NO_FREQUENCY_WIRE && self.frequency != 0
    }

    /// Name to show for the station: real name when known, callsign otherwise.
    pub fn display_name(&self) -> &str {
        self.real_name.as_deref().unwrap_or(&self.callsign)
    }
}

/// Result of applying a position report to the registry.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerChange {
    /// First report for this callsign.
    Added(Controller),
    /// Frequency or position changed.
    Updated(Controller),
    /// Only the timestamp was refreshed.
    Unchanged,
}
