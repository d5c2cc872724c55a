//! Position packet builders.
//!
//! The scheduling itself lives in the session core; these turn the current
//! aircraft snapshot into the packet for the active role.

use super::state::Role;
use crate::aircraft::LocalAircraftState;
use crate::protocol::{AtcPosition, FastPilotPosition, Packet, PilotPosition, PitchBankHeading};
use crate::registry::NO_FREQUENCY_WIRE;

/// Facility code of an observer.
const OBSERVER_FACILITY: u8 = 0;

/// Rating observers report regardless of the account rating.
const OBSERVER_RATING: u8 = 1;

/// Visibility range observers ask for, in nautical miles.
const OBSERVER_VISIBILITY_RANGE: u32 = 300;

fn attitude(state: &LocalAircraftState) -> PitchBankHeading {
    PitchBankHeading::new(state.pitch, state.bank, state.heading, state.on_ground)
}

/// `@` slow position for the pilot role.
pub fn pilot_position(callsign: &str, rating: u8, state: &LocalAircraftState) -> PilotPosition {
    PilotPosition {
        mode: state.transponder.mode(),
        callsign: callsign.to_string(),
        squawk: state.transponder.code,
        rating,
        latitude: state.latitude,
        longitude: state.longitude,
        true_altitude: state.altitude_true.round() as i32,
        ground_speed: state.ground_speed.round() as i32,
        attitude: attitude(state),
        pressure_altitude_delta: state.pressure_altitude_delta(),
    }
}

/// `^` fast position, sent on every fresh simulator sample.
pub fn fast_pilot_position(callsign: &str, state: &LocalAircraftState) -> FastPilotPosition {
    FastPilotPosition {
        callsign: callsign.to_string(),
        latitude: state.latitude,
        longitude: state.longitude,
        true_altitude: state.altitude_true,
        altitude_agl: state.altitude_agl,
        attitude: attitude(state),
        velocity: state.velocity,
        rotation: state.rotation,
        nose_gear_angle: state.nose_gear_angle,
    }
}

/// `%` position for observers.
pub fn observer_position(callsign: &str, state: &LocalAircraftState) -> AtcPosition {
    AtcPosition {
        callsign: callsign.to_string(),
        frequency: NO_FREQUENCY_WIRE,
        facility: OBSERVER_FACILITY,
        visibility_range: OBSERVER_VISIBILITY_RANGE,
        rating: OBSERVER_RATING,
        latitude: state.latitude,
        longitude: state.longitude,
        elevation: 0,
    }
}

/// Periodic position packet for a role.
pub fn periodic_position(
    role: Role,
    callsign: &str,
    rating: u8,
    state: &LocalAircraftState,
) -> Packet {
    if role.is_observer() {
        Packet::AtcPosition(observer_position(callsign, state))
    } else {
        Packet::PilotPosition(pilot_position(callsign, rating, state))
    }
}
