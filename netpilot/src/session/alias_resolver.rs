//! Effective voice frequency per radio after alias lookup.
//!
//! Some stations still announce a legacy channel on the text network while
//! their transceivers sit on a different frequency. The voice service lists
//! these as alias stations. A tuned frequency is redirected when a controller
//! on that channel matches an alias entry by callsign and raw frequency.

use crate::aircraft::{Radio, RadioStackState};
use crate::frequency::{callsigns_match, normalize_25khz};
use crate::registry::StationRegistry;

/// Result of resolving one tuned frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AliasResolution {
    /// Frequency to hand to the voice client, in Hertz.
    pub effective_hz: u32,
    /// Alias target in Hertz, 0 when no alias applies.
    pub alias_hz: u32,
}

/// Resolve `tuned_hz` against the registry.
pub fn resolve_frequency(registry: &StationRegistry, tuned_hz: u32) -> AliasResolution {
    let normalized = normalize_25khz(tuned_hz);
    let target = registry.alias_stations().iter().find_map(|station| {
        let (target, alias) = station.alias_pair()?;
        registry
            .controllers_on(normalized)
            .any(|controller| {
                callsigns_match(&controller.callsign, &station.callsign)
                    && controller.frequency_hz() == alias
            })
            .then_some(target)
    });

    match target {
        Some(target) => AliasResolution {
            effective_hz: target,
            alias_hz: target,
        },
        None => AliasResolution {
            effective_hz: normalized,
            alias_hz: 0,
        },
    }
}

/// Changes produced for one radio by a resolver pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadioResolution {
    pub radio: Radio,
    pub resolution: AliasResolution,
    /// The alias value differs from the last one published for this radio.
    pub alias_changed: bool,
    /// The effective frequency differs from the last one given to voice.
    pub frequency_changed: bool,
}

/// Remembers what was last published per radio.
#[derive(Debug, Default)]
pub struct AliasResolver {
    published_alias: [Option<u32>; 2],
    effective: [Option<u32>; 2],
}

impl AliasResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve both radios and report what changed.
    ///
    /// Only radios that receive or carry transmissions are resolved; any other
    /// radio gets an effective frequency of zero.
    pub fn update(
        &mut self,
        registry: &StationRegistry,
        radios: &RadioStackState,
    ) -> Vec<RadioResolution> {
        Radio::ALL
            .iter()
            .map(|radio| {
                let tuned = radios
                    .receiving_frequency(*radio)
                    .or_else(|| {
                        radios
                            .is_transmitting(*radio)
                            .then(|| radios.channel(*radio).active_hz)
                    })
                    .unwrap_or(0);
                let resolution = if tuned == 0 {
                    AliasResolution {
                        effective_hz: 0,
                        alias_hz: 0,
                    }
                } else {
                    resolve_frequency(registry, tuned)
                };

                let index = radio.index();
                let alias_changed = self.published_alias[index] != Some(resolution.alias_hz);
                let frequency_changed = self.effective[index] != Some(resolution.effective_hz);
                self.published_alias[index] = Some(resolution.alias_hz);
                self.effective[index] = Some(resolution.effective_hz);

                RadioResolution {
                    radio: *radio,
                    resolution,
                    alias_changed,
                    frequency_changed,
                }
            })
            .collect()
    }

    /// Effective frequency last handed to voice for a radio.
    pub fn effective_frequency(&self, radio: Radio) -> Option<u32> {
        self.effective[radio.index()]
    }

    /// Forget everything so the next pass publishes afresh.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::aircraft::{ComRadio, LocalAircraftState, OperatorIntent};
    use crate::registry::AliasStation;

    fn registry_with_alias() -> StationRegistry {
        let mut registry = StationRegistry::new();
        // Announces 136.950 on the text network, transceivers on 136.955.
        registry.upsert_controller("EDGG_KTG_CTR*", 36950, 50.0, 8.0, Instant::now());
        registry.replace_alias_stations(vec![AliasStation {
            id: "1".to_string(),
            callsign: "EDGG_KTG_CTR".to_string(),
            frequency: Some(136_955_000),
            frequency_alias: Some(136_950_000),
        }]);
        registry
    }

    fn tuned(com1: u32, com2: u32) -> RadioStackState {
        let radio = |hz| ComRadio {
            active_hz: hz,
            standby_hz: 0,
            power: true,
            receive_enabled: true,
        };
        let state = LocalAircraftState {
            avionics_power: true,
            radios: [radio(com1), radio(com2)],
            ..Default::default()
        };
        RadioStackState::derive(&state, OperatorIntent::default())
    }

    #[test]
    fn test_alias_found() {
        let resolution = resolve_frequency(&registry_with_alias(), 136_950_000);
        assert_eq!(resolution.effective_hz, 136_955_000);
        assert_eq!(resolution.alias_hz, 136_955_000);
    }

    #[test]
    fn test_alias_not_found() {
        let resolution = resolve_frequency(&registry_with_alias(), 122_805_000);
        assert_eq!(resolution.effective_hz, 122_800_000);
        assert_eq!(resolution.alias_hz, 0);
    }

    #[test]
    fn test_alias_requires_controller_online() {
        let mut registry = registry_with_alias();
        registry.remove_controller("EDGG_KTG_CTR*");
        let resolution = resolve_frequency(&registry, 136_950_000);
        assert_eq!(resolution.effective_hz, 136_950_000);
        assert_eq!(resolution.alias_hz, 0);
    }

    #[test]
    fn test_alias_requires_callsign_match() {
        let mut registry = StationRegistry::new();
        registry.upsert_controller("EDGG_BAD_CTR", 36950, 50.0, 8.0, Instant::now());
        registry.replace_alias_stations(registry_with_alias().alias_stations().to_vec());
        assert_eq!(resolve_frequency(&registry, 136_950_000).alias_hz, 0);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let registry = registry_with_alias();
        assert_eq!(
            resolve_frequency(&registry, 136_950_000),
            resolve_frequency(&registry, 136_950_000)
        );
    }

    #[test]
    fn test_first_pass_publishes_everything() {
        let mut resolver = AliasResolver::new();
        let updates = resolver.update(&registry_with_alias(), &tuned(136_950_000, 122_800_000));

        assert_eq!(updates.len(), 2);
        assert!(updates.iter().all(|u| u.alias_changed && u.frequency_changed));
        assert_eq!(updates[0].resolution.alias_hz, 136_955_000);
        assert_eq!(updates[1].resolution.alias_hz, 0);
    }

    #[test]
    fn test_unchanged_pass_publishes_nothing() {
        let registry = registry_with_alias();
        let radios = tuned(136_950_000, 122_800_000);
        let mut resolver = AliasResolver::new();
        resolver.update(&registry, &radios);

        let updates = resolver.update(&registry, &radios);
        assert!(updates.iter().all(|u| !u.alias_changed && !u.frequency_changed));
    }

    #[test]
    fn test_muted_radio_not_resolved() {
        let muted = |hz| ComRadio {
            active_hz: hz,
            standby_hz: 0,
            power: true,
            receive_enabled: false,
        };
        let state = LocalAircraftState {
            avionics_power: true,
            radios: [muted(136_950_000), muted(136_950_000)],
            transmit_radio: Radio::Com1,
            ..Default::default()
        };
        let radios = RadioStackState::derive(&state, OperatorIntent::default());

        let updates = AliasResolver::new().update(&registry_with_alias(), &radios);
        // COM1 still transmits, so it keeps its alias.
        assert_eq!(updates[0].resolution.alias_hz, 136_955_000);
        assert_eq!(updates[1].resolution.effective_hz, 0);
        assert_eq!(updates[1].resolution.alias_hz, 0);
    }

    #[test]
    fn test_alias_disappears_when_controller_leaves() {
        let mut registry = registry_with_alias();
        let radios = tuned(136_950_000, 122_800_000);
        let mut resolver = AliasResolver::new();
        resolver.update(&registry, &radios);

        registry.remove_controller("EDGG_KTG_CTR*");
        let updates = resolver.update(&registry, &radios);
        assert!(updates[0].alias_changed);
        assert_eq!(updates[0].resolution.alias_hz, 0);
        assert_eq!(resolver.effective_frequency(Radio::Com1), Some(136_950_000));
        assert!(!updates[1].alias_changed);
    }
}
