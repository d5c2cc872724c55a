//! Collaborators the session drives but does not own.
//!
//! The voice engine and the simulator data link live outside this crate.
//! The session core describes what it wants from them as [`VoiceCommand`]s
//! and [`SimulatorCommand`]s; the daemon hands those to implementations of
//! [`VoiceClient`] and [`SimulatorLink`].

use std::sync::{Arc, Mutex};

use crate::aircraft::{Radio, Squawk};

/// Audio engine capability.
pub trait VoiceClient: Send {
    fn connect(&mut self, callsign: &str);
    fn disconnect(&mut self);
    fn set_station_frequency(&mut self, radio: Radio, frequency_hz: u32);
    fn set_radio_gain(&mut self, radio: Radio, gain: f32);
    fn set_transmit_radio(&mut self, radio: Option<Radio>);
    fn set_push_to_talk(&mut self, active: bool);
}

/// Simulator data link capability, command direction.
///
/// Aircraft samples travel the other way as pushed
/// [`LocalAircraftState`](crate::aircraft::LocalAircraftState) values.
pub trait SimulatorLink: Send {
    fn apply_transponder_code(&mut self, code: Squawk);
    fn apply_radio_frequency(&mut self, radio: Radio, frequency_hz: u32);
    fn apply_radio_transmit_select(&mut self, radio: Radio);
}

/// Request for the voice engine.
#[derive(Debug, Clone, PartialEq)]
pub enum VoiceCommand {
    Connect { callsign: String },
    Disconnect,
    SetStationFrequency { radio: Radio, frequency_hz: u32 },
    SetRadioGain { radio: Radio, gain: f32 },
    SetTransmitRadio(Option<Radio>),
    SetPushToTalk(bool),
}

impl VoiceCommand {
    pub fn apply(self, client: &mut dyn VoiceClient) {
        match self {
            Self::Connect { callsign } => client.connect(&callsign),
            Self::Disconnect => client.disconnect(),
            Self::SetStationFrequency {
                radio,
                frequency_hz,
            } => client.set_station_frequency(radio, frequency_hz),
            Self::SetRadioGain { radio, gain } => client.set_radio_gain(radio, gain),
            Self::SetTransmitRadio(radio) => client.set_transmit_radio(radio),
            Self::SetPushToTalk(active) => client.set_push_to_talk(active),
        }
    }
}

/// Request for the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatorCommand {
    SetTransponderCode(Squawk),
    TuneRadio { radio: Radio, frequency_hz: u32 },
    SelectTransmitRadio(Radio),
}

impl SimulatorCommand {
    pub fn apply(self, link: &mut dyn SimulatorLink) {
        match self {
            Self::SetTransponderCode(code) => link.apply_transponder_code(code),
            Self::TuneRadio {
                radio,
                frequency_hz,
            } => link.apply_radio_frequency(radio, frequency_hz),
            Self::SelectTransmitRadio(radio) => link.apply_radio_transmit_select(radio),
        }
    }
}

/// Voice client that does nothing. Used when running without audio.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopVoiceClient;

impl VoiceClient for NoopVoiceClient {
    fn connect(&mut self, callsign: &str) {
        tracing::debug!(callsign, "Voice connect (no audio engine)");
    }
    fn disconnect(&mut self) {}
    fn set_station_frequency(&mut self, _radio: Radio, _frequency_hz: u32) {}
    fn set_radio_gain(&mut self, _radio: Radio, _gain: f32) {}
    fn set_transmit_radio(&mut self, _radio: Option<Radio>) {}
    fn set_push_to_talk(&mut self, _active: bool) {}
}

/// Simulator link that logs and drops commands.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSimulatorLink;

impl SimulatorLink for NoopSimulatorLink {
    fn apply_transponder_code(&mut self, code: Squawk) {
        tracing::info!(%code, "Transponder code requested (no simulator link)");
    }
    fn apply_radio_frequency(&mut self, radio: Radio, frequency_hz: u32) {
        tracing::info!(%radio, frequency_hz, "Radio tune requested (no simulator link)");
    }
    fn apply_radio_transmit_select(&mut self, radio: Radio) {
        tracing::info!(%radio, "Transmit select requested (no simulator link)");
    }
}

/// Voice client that records every call. Clones share the record.
#[derive(Debug, Default, Clone)]
pub struct RecordingVoiceClient {
    calls: Arc<Mutex<Vec<VoiceCommand>>>,
}

impl RecordingVoiceClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far.
    pub fn calls(&self) -> Vec<VoiceCommand> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, command: VoiceCommand) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(command);
        }
    }
}

impl VoiceClient for RecordingVoiceClient {
    fn connect(&mut self, callsign: &str) {
        self.record(VoiceCommand::Connect {
            callsign: callsign.to_string(),
        });
    }
    fn disconnect(&mut self) {
        self.record(VoiceCommand::Disconnect);
    }
    fn set_station_frequency(&mut self, radio: Radio, frequency_hz: u32) {
        self.record(VoiceCommand::SetStationFrequency {
            radio,
            frequency_hz,
        });
    }
    fn set_radio_gain(&mut self, radio: Radio, gain: f32) {
        self.record(VoiceCommand::SetRadioGain { radio, gain });
    }
    fn set_transmit_radio(&mut self, radio: Option<Radio>) {
        self.record(VoiceCommand::SetTransmitRadio(radio));
    }
    fn set_push_to_talk(&mut self, active: bool) {
        self.record(VoiceCommand::SetPushToTalk(active));
    }
}

/// Simulator link that records every call. Clones share the record.
#[derive(Debug, Default, Clone)]
pub struct RecordingSimulatorLink {
    calls: Arc<Mutex<Vec<SimulatorCommand>>>,
}

impl RecordingSimulatorLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<SimulatorCommand> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, command: SimulatorCommand) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(command);
        }
    }
}

impl SimulatorLink for RecordingSimulatorLink {
    fn apply_transponder_code(&mut self, code: Squawk) {
        self.record(SimulatorCommand::SetTransponderCode(code));
    }
    fn apply_radio_frequency(&mut self, radio: Radio, frequency_hz: u32) {
        self.record(SimulatorCommand::TuneRadio {
            radio,
            frequency_hz,
        });
    }
    fn apply_radio_transmit_select(&mut self, radio: Radio) {
        self.record(SimulatorCommand::SelectTransmitRadio(radio));
    }
}
