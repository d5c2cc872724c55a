//! Radio stack view derived from the aircraft state and operator intent.

use super::state::{LocalAircraftState, Radio};

/// Operator choices that override what the cockpit switches say.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OperatorIntent {
    /// Push-to-talk key held.
    pub push_to_talk: bool,
    /// Listen on every powered radio and never transmit.
    pub receive_only: bool,
}

/// Per-radio slice of the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RadioChannel {
    pub active_hz: u32,
    pub standby_hz: u32,
    pub power: bool,
    pub receive_enabled: bool,
}

/// Derived radio stack, recomputed on every update cycle.
///
/// Compared with the previous value to decide whether anything downstream
/// (audio routing, alias resolution, notifications) needs refreshing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RadioStackState {
    pub avionics_power: bool,
    pub channels: [RadioChannel; 2],
    pub transmit_radio: Radio,
    pub intent: OperatorIntent,
}

impl RadioStackState {
    pub fn derive(state: &LocalAircraftState, intent: OperatorIntent) -> Self {
        let channels = state.radios.map(|radio| RadioChannel {
            active_hz: radio.active_hz,
            standby_hz: radio.standby_hz,
            power: radio.power,
            receive_enabled: radio.receive_enabled,
        });
        Self {
            avionics_power: state.avionics_power,
            channels,
            transmit_radio: state.transmit_radio,
            intent,
        }
    }

    pub fn channel(&self, radio: Radio) -> &RadioChannel {
        &self.channels[radio.index()]
    }

    fn is_powered(&self, radio: Radio) -> bool {
        self.avionics_power && self.channel(radio).power
    }

    /// Audio from this radio reaches the pilot.
    pub fn is_receiving(&self, radio: Radio) -> bool {
        self.is_powered(radio) && (self.channel(radio).receive_enabled || self.intent.receive_only)
    }

    /// This radio is the transmit-selected one and may key the mic.
    pub fn is_transmitting(&self, radio: Radio) -> bool {
        !self.intent.receive_only && self.is_powered(radio) && self.transmit_radio == radio
    }

    pub fn receiving_on_both_frequencies(&self) -> bool {
        Radio::ALL.iter().all(|radio| self.is_receiving(*radio))
    }

    /// The radio that would carry a transmission right now.
    pub fn transmitting_radio(&self) -> Option<Radio> {
        Radio::ALL.into_iter().find(|radio| self.is_transmitting(*radio))
    }

    /// Active frequency of a radio if it is receiving.
    pub fn receiving_frequency(&self, radio: Radio) -> Option<u32> {
        self.is_receiving(radio)
            .then(|| self.channel(radio).active_hz)
            .filter(|hz| *hz > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aircraft::state::ComRadio;

    fn powered_state() -> LocalAircraftState {
        let radio = |hz| ComRadio {
            active_hz: hz,
            standby_hz: 121_500_000,
            power: true,
            receive_enabled: false,
        };
        LocalAircraftState {
            avionics_power: true,
            radios: [radio(122_800_000), radio(118_300_000)],
            transmit_radio: Radio::Com1,
            ..Default::default()
        }
    }

    #[test]
    fn test_receive_requires_selection() {
        let mut state = powered_state();
        state.radios[0].receive_enabled = true;
        let stack = RadioStackState::derive(&state, OperatorIntent::default());

        assert!(stack.is_receiving(Radio::Com1));
        assert!(!stack.is_receiving(Radio::Com2));
        assert!(!stack.receiving_on_both_frequencies());
        assert_eq!(stack.receiving_frequency(Radio::Com1), Some(122_800_000));
        assert_eq!(stack.receiving_frequency(Radio::Com2), None);
    }

    #[test]
    fn test_receive_only_listens_everywhere_and_never_transmits() {
        let intent = OperatorIntent {
            push_to_talk: true,
            receive_only: true,
        };
        let stack = RadioStackState::derive(&powered_state(), intent);

        assert!(stack.receiving_on_both_frequencies());
        assert!(!stack.is_transmitting(Radio::Com1));
        assert_eq!(stack.transmitting_radio(), None);
    }

    #[test]
    fn test_no_avionics_power_silences_everything() {
        let mut state = powered_state();
        state.avionics_power = false;
        state.radios[0].receive_enabled = true;
        let stack = RadioStackState::derive(&state, OperatorIntent::default());

        assert!(!stack.is_receiving(Radio::Com1));
        assert!(!stack.is_transmitting(Radio::Com1));
    }

    #[test]
    fn test_transmit_follows_selection() {
        let mut state = powered_state();
        state.transmit_radio = Radio::Com2;
        let stack = RadioStackState::derive(&state, OperatorIntent::default());

        assert!(!stack.is_transmitting(Radio::Com1));
        assert!(stack.is_transmitting(Radio::Com2));
        assert_eq!(stack.transmitting_radio(), Some(Radio::Com2));
    }

    #[test]
    fn test_equality_detects_changes() {
        let state = powered_state();
        let a = RadioStackState::derive(&state, OperatorIntent::default());
        let b = RadioStackState::derive(&state, OperatorIntent::default());
        assert_eq!(a, b);

        let ptt = OperatorIntent {
            push_to_talk: true,
            ..Default::default()
        };
        assert_ne!(a, RadioStackState::derive(&state, ptt));
    }
}
