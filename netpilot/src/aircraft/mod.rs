//! The pilot's own aircraft.
//!
//! - [`LocalAircraftState`] - full snapshot written by the simulator link
//! - [`AircraftConfiguration`] - what peers see, with structural diff
//! - [`RadioStackState`] - derived receive/transmit predicates

mod config;
mod radio;
mod state;
mod transponder;

pub use config::{
    AircraftConfiguration, ConfigurationMessage, EngineConfiguration, LightsConfiguration,
};
pub use radio::{OperatorIntent, RadioChannel, RadioStackState};
pub use state::{
    AircraftSample, ComRadio, EngineState, Lights, LocalAircraftState, Radio, Transponder,
};
pub use transponder::{InvalidSquawk, Squawk, TransponderMode};
