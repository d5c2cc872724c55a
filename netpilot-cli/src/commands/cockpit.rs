//! Stand-in cockpit for runs without a full simulator plugin.
//!
//! Telemetry only carries position and attitude. The radio panel, transponder
//! and lights live here; simulator commands from the session change the panel,
//! and every change is merged with the latest sample and pushed to the session.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;

use netpilot::aircraft::{
    AircraftSample, ComRadio, LocalAircraftState, Radio, Squawk, Transponder,
};
use netpilot::capabilities::SimulatorLink;

const COM1_DEFAULT_HZ: u32 = 122_800_000;
const COM2_DEFAULT_HZ: u32 = 121_500_000;

struct Panel {
    state: LocalAircraftState,
    last_sample: Option<AircraftSample>,
}

/// Shared cockpit state. Clones share the panel.
#[derive(Clone)]
pub struct Cockpit {
    panel: Arc<Mutex<Panel>>,
    aircraft: mpsc::Sender<LocalAircraftState>,
}

impl Cockpit {
    pub fn new(aircraft: mpsc::Sender<LocalAircraftState>) -> Self {
        Self {
            panel: Arc::new(Mutex::new(Panel {
                state: initial_panel(),
                last_sample: None,
            })),
            aircraft,
        }
    }

    /// Merge a telemetry sample into the panel and return the new snapshot.
    pub fn apply_sample(&self, sample: &AircraftSample) -> LocalAircraftState {
        let mut panel = self.lock();
        panel.state = panel.state.with_sample(sample);
        panel.last_sample = Some(*sample);
        panel.state.clone()
    }

    /// Push a panel change, once a position is known.
    fn update(&self, change: impl FnOnce(&mut LocalAircraftState)) {
        let snapshot = {
            let mut panel = self.lock();
            change(&mut panel.state);
            panel.last_sample.is_some().then(|| panel.state.clone())
        };
        if let Some(state) = snapshot {
            if self.aircraft.try_send(state).is_err() {
                tracing::debug!("Aircraft queue full, panel change waits for the next sample");
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Panel> {
        self.panel.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SimulatorLink for Cockpit {
    fn apply_transponder_code(&mut self, code: Squawk) {
        tracing::info!(%code, "Transponder set");
        self.update(|state| state.transponder.code = code);
    }

    fn apply_radio_frequency(&mut self, radio: Radio, frequency_hz: u32) {
        tracing::info!(%radio, frequency_hz, "Radio tuned");
        self.update(|state| state.radios[radio.index()].active_hz = frequency_hz);
    }

    fn apply_radio_transmit_select(&mut self, radio: Radio) {
        tracing::info!(%radio, "Transmit radio selected");
        self.update(|state| {
            state.transmit_radio = radio;
            state.radios[radio.index()].receive_enabled = true;
        });
    }
}

/// Avionics on, COM1 on unicom and selected, COM2 on guard, mode C.
fn initial_panel() -> LocalAircraftState {
    LocalAircraftState {
        avionics_power: true,
        radios: [
            ComRadio {
                active_hz: COM1_DEFAULT_HZ,
                standby_hz: COM1_DEFAULT_HZ,
                power: true,
                receive_enabled: true,
            },
            ComRadio {
                active_hz: COM2_DEFAULT_HZ,
                standby_hz: COM2_DEFAULT_HZ,
                power: true,
                receive_enabled: false,
            },
        ],
        transmit_radio: Radio::Com1,
        transponder: Transponder {
            code: Squawk::VFR,
            mode_c: true,
            ident: false,
        },
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AircraftSample {
        AircraftSample {
            latitude: 47.45,
            longitude: 8.56,
            altitude_msl: 1416.0,
            altitude_agl: Some(0.0),
            track: 280.0,
            ground_speed: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_sample_keeps_panel() {
        let (tx, _rx) = mpsc::channel(4);
        let cockpit = Cockpit::new(tx);

        let state = cockpit.apply_sample(&sample());
        assert_eq!(state.latitude, 47.45);
        assert!(state.on_ground);
        assert_eq!(state.radio(Radio::Com1).active_hz, COM1_DEFAULT_HZ);
        assert_eq!(state.transponder.code, Squawk::VFR);
    }

    #[test]
    fn test_panel_changes_wait_for_position() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut cockpit = Cockpit::new(tx);

        cockpit.apply_radio_frequency(Radio::Com2, 118_275_000);
        assert!(rx.try_recv().is_err());

        cockpit.apply_sample(&sample());
        cockpit.apply_radio_transmit_select(Radio::Com2);

        let pushed = rx.try_recv().unwrap();
        assert_eq!(pushed.radio(Radio::Com2).active_hz, 118_275_000);
        assert_eq!(pushed.transmit_radio, Radio::Com2);
        assert!(pushed.radio(Radio::Com2).receive_enabled);
        assert_eq!(pushed.latitude, 47.45);
    }
}
