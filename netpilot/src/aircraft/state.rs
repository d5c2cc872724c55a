//! Local aircraft snapshot as delivered by the simulator.

use std::fmt;

use super::transponder::{Squawk, TransponderMode};

/// One of the two COM radios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Radio {
    #[default]
    Com1,
    Com2,
}

impl Radio {
    /// Both radios, in index order.
    pub const ALL: [Radio; 2] = [Radio::Com1, Radio::Com2];

    /// Zero-based index into per-radio arrays.
    pub fn index(&self) -> usize {
        match self {
            Self::Com1 => 0,
            Self::Com2 => 1,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for Radio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Com1 => write!(f, "COM1"),
            Self::Com2 => write!(f, "COM2"),
        }
    }
}

/// Exterior lights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Lights {
    pub beacon: bool,
    pub landing: bool,
    pub taxi: bool,
    pub nav: bool,
    pub strobe: bool,
    pub logo: bool,
}

/// One engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineState {
    pub running: bool,
    pub reversing: bool,
}

/// One COM radio as set up in the cockpit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComRadio {
    /// Active frequency in Hertz.
    pub active_hz: u32,
    /// Standby frequency in Hertz.
    pub standby_hz: u32,
    /// Radio is switched on.
    pub power: bool,
    /// Audio panel has this radio selected for listening.
    pub receive_enabled: bool,
}

/// Transponder as set in the cockpit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Transponder {
    pub code: Squawk,
    pub mode_c: bool,
    pub ident: bool,
}

impl Transponder {
    /// Mode letter for position packets; ident wins over mode C.
    pub fn mode(&self) -> TransponderMode {
        if self.ident {
            TransponderMode::Ident
        } else if self.mode_c {
            TransponderMode::ModeC
        } else {
            TransponderMode::Standby
        }
    }
}

/// Snapshot of the pilot's own aircraft.
///
/// Replaced wholesale on every simulator tick and never partially mutated.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LocalAircraftState {
    pub latitude: f64,
    pub longitude: f64,
    /// True altitude in feet.
    pub altitude_true: f64,
    /// Pressure altitude in feet.
    pub altitude_pressure: f64,
    /// Height above ground in feet.
    pub altitude_agl: f64,
    /// Degrees, nose up positive.
    pub pitch: f64,
    /// Degrees, right wing down positive.
    pub bank: f64,
    /// True heading in degrees.
    pub heading: f64,
    /// Knots.
    pub ground_speed: f64,
    /// Velocity along longitude, altitude and latitude axes, m/s.
    pub velocity: [f64; 3],
    /// Pitch, heading and bank rates, rad/s.
    pub rotation: [f64; 3],
    pub nose_gear_angle: f64,
    pub transponder: Transponder,
    pub lights: Lights,
    /// 0.0 (up) to 1.0 (full).
    pub flaps_ratio: f64,
    pub gear_down: bool,
    /// 0.0 (retracted) to 1.0 (fully deployed).
    pub speed_brake_ratio: f64,
    pub engines: Vec<EngineState>,
    pub on_ground: bool,
    pub avionics_power: bool,
    pub radios: [ComRadio; 2],
    pub transmit_radio: Radio,
}

impl LocalAircraftState {
    pub fn radio(&self, radio: Radio) -> &ComRadio {
        &self.radios[radio.index()]
    }

    /// Pressure altitude minus true altitude, rounded to feet.
    pub fn pressure_altitude_delta(&self) -> i32 {
        (self.altitude_pressure - self.altitude_true).round() as i32
    }

    /// New snapshot with the kinematic fields taken from `sample`.
    ///
    /// Everything the sample does not carry (lights, radios, engines) is kept.
    pub fn with_sample(&self, sample: &AircraftSample) -> Self {
        let mut next = self.clone();
        next.latitude = sample.latitude;
        next.longitude = sample.longitude;
        next.altitude_true = sample.altitude_msl;
        if let Some(agl) = sample.altitude_agl {
            next.altitude_agl = agl;
        }
        next.altitude_pressure = sample.altitude_msl;
        next.ground_speed = sample.ground_speed;
        if let Some(pitch) = sample.pitch {
            next.pitch = pitch;
        }
        if let Some(bank) = sample.bank {
            next.bank = bank;
        }
        next.heading = sample.heading.unwrap_or(sample.track);
        next.on_ground = next.ground_speed < 40.0 && next.altitude_agl < 5.0;
        next
    }
}

/// Kinematic sample from a position-only data source such as a UDP feed.
///
/// Attitude and height above ground are optional because some feeds deliver
/// them in separate datagrams, or not at all.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AircraftSample {
    pub latitude: f64,
    pub longitude: f64,
    /// Feet above mean sea level.
    pub altitude_msl: f64,
    /// Feet above ground.
    pub altitude_agl: Option<f64>,
    /// Track over ground in degrees true.
    pub track: f64,
    /// Knots.
    pub ground_speed: f64,
    pub heading: Option<f64>,
    pub pitch: Option<f64>,
    pub bank: Option<f64>,
}
