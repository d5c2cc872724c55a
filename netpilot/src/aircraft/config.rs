//! Externally visible aircraft configuration and its incremental diff.
//!
//! Peers render our aircraft from these values, so they are broadcast as
//! JSON inside `ACC` client queries:
//!
//! ```json
//! {"config":{"is_full_data":true,"lights":{"strobe_on":false,"landing_on":true,"taxi_on":false,
//!  "beacon_on":true,"nav_on":true,"logo_on":false},"engines":{"1":{"on":true,"is_reversing":false}},
//!  "gear_down":true,"flaps_pct":0,"spoilers_out":false,"on_ground":true}}
//! ```
//!
//! Every field is optional. A configuration derived from the local state has
//! all of them set; an incremental update carries only what changed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::state::LocalAircraftState;
use crate::protocol::ProtocolError;

/// Exterior light switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LightsConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strobe_on: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landing_on: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxi_on: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beacon_on: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nav_on: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_on: Option<bool>,
}

impl LightsConfiguration {
    fn diff(&self, next: &Self) -> Option<Self> {
        let delta = Self {
            strobe_on: changed(&self.strobe_on, &next.strobe_on),
            landing_on: changed(&self.landing_on, &next.landing_on),
            taxi_on: changed(&self.taxi_on, &next.taxi_on),
            beacon_on: changed(&self.beacon_on, &next.beacon_on),
            nav_on: changed(&self.nav_on, &next.nav_on),
            logo_on: changed(&self.logo_on, &next.logo_on),
        };
        (delta != Self::default()).then_some(delta)
    }

    fn apply(&self, delta: &Self) -> Self {
        Self {
            strobe_on: delta.strobe_on.or(self.strobe_on),
            landing_on: delta.landing_on.or(self.landing_on),
            taxi_on: delta.taxi_on.or(self.taxi_on),
            beacon_on: delta.beacon_on.or(self.beacon_on),
            nav_on: delta.nav_on.or(self.nav_on),
            logo_on: delta.logo_on.or(self.logo_on),
        }
    }
}

/// One engine as seen by peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_reversing: Option<bool>,
}

impl EngineConfiguration {
    fn diff(&self, next: &Self) -> Option<Self> {
        let delta = Self {
            on: changed(&self.on, &next.on),
            is_reversing: changed(&self.is_reversing, &next.is_reversing),
        };
        (delta != Self::default()).then_some(delta)
    }

    fn apply(&self, delta: &Self) -> Self {
        Self {
            on: delta.on.or(self.on),
            is_reversing: delta.is_reversing.or(self.is_reversing),
        }
    }

    /// An engine entry with no fields marks a removed engine in a diff.
    fn is_removal(&self) -> bool {
        *self == Self::default()
    }
}

/// Value snapshot of the externally visible aircraft configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AircraftConfiguration {
    /// `Some(true)` on full responses, absent on incremental updates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_full_data: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lights: Option<LightsConfiguration>,
    /// Engines keyed by 1-based engine number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engines: Option<BTreeMap<u8, EngineConfiguration>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gear_down: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flaps_pct: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spoilers_out: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_ground: Option<bool>,
}

impl AircraftConfiguration {
    /// Derive the complete configuration from a local aircraft snapshot.
    pub fn from_state(state: &LocalAircraftState) -> Self {
        let lights = LightsConfiguration {
            strobe_on: Some(state.lights.strobe),
            landing_on: Some(state.lights.landing),
            taxi_on: Some(state.lights.taxi),
            beacon_on: Some(state.lights.beacon),
            nav_on: Some(state.lights.nav),
            logo_on: Some(state.lights.logo),
        };
        let engines = state
            .engines
            .iter()
            .enumerate()
            .map(|(i, engine)| {
                (
                    (i + 1).min(u8::MAX as usize) as u8,
                    EngineConfiguration {
                        on: Some(engine.running),
                        is_reversing: Some(engine.reversing),
                    },
                )
            })
            .collect();

        Self {
            is_full_data: None,
            lights: Some(lights),
            engines: Some(engines),
            gear_down: Some(state.gear_down),
            flaps_pct: Some((state.flaps_ratio.clamp(0.0, 1.0) * 100.0).round() as u8),
            spoilers_out: Some(state.speed_brake_ratio > 0.0),
            on_ground: Some(state.on_ground),
        }
    }

    /// Mark as a full configuration for an explicit peer request.
    pub fn into_full(mut self) -> Self {
        self.is_full_data = Some(true);
        self
    }

    /// Configuration holding only the fields of `next` that differ from `self`.
    ///
    /// Engines present in `self` but missing from `next` are encoded as empty
    /// entries (`"2":{}`), which [`apply`](Self::apply) removes.
    pub fn diff(&self, next: &Self) -> Self {
        let lights = match (&self.lights, &next.lights) {
            (Some(old), Some(new)) => old.diff(new),
            (None, Some(new)) => Some(*new),
            _ => None,
        };

        let engines = match (&self.engines, &next.engines) {
            (Some(old), Some(new)) => {
                let mut delta: BTreeMap<u8, EngineConfiguration> = new
                    .iter()
                    .filter_map(|(number, engine)| {
                        let delta = match old.get(number) {
                            Some(previous) => previous.diff(engine),
                            None => Some(*engine),
                        };
                        delta.map(|d| (*number, d))
                    })
                    .collect();
                for number in old.keys().filter(|n| !new.contains_key(n)) {
                    delta.insert(*number, EngineConfiguration::default());
                }
                (!delta.is_empty()).then_some(delta)
            }
            (None, Some(new)) => Some(new.clone()),
            _ => None,
        };

        Self {
            is_full_data: None,
            lights,
            engines,
            gear_down: changed(&self.gear_down, &next.gear_down),
            flaps_pct: changed(&self.flaps_pct, &next.flaps_pct),
            spoilers_out: changed(&self.spoilers_out, &next.spoilers_out),
            on_ground: changed(&self.on_ground, &next.on_ground),
        }
    }

    /// Overlay an incremental update onto this configuration.
    ///
    /// `is_full_data` describes a message, not the aircraft, so the result
    /// carries the flag of `delta`.
    pub fn apply(&self, delta: &Self) -> Self {
        let lights = match (&self.lights, &delta.lights) {
            (Some(base), Some(d)) => Some(base.apply(d)),
            (None, Some(d)) => Some(*d),
            (base, None) => *base,
        };

        let engines = match (&self.engines, &delta.engines) {
            (Some(base), Some(d)) => {
                let mut merged = base.clone();
                for (number, engine) in d {
                    if engine.is_removal() {
                        merged.remove(number);
                    } else {
                        let entry = merged.entry(*number).or_default();
                        *entry = entry.apply(engine);
                    }
                }
                Some(merged)
            }
            (None, Some(d)) => Some(
                d.iter()
                    .filter(|(_, engine)| !engine.is_removal())
                    .map(|(number, engine)| (*number, *engine))
                    .collect(),
            ),
            (base, None) => base.clone(),
        };

        Self {
            is_full_data: delta.is_full_data,
            lights,
            engines,
            gear_down: delta.gear_down.or(self.gear_down),
            flaps_pct: delta.flaps_pct.or(self.flaps_pct),
            spoilers_out: delta.spoilers_out.or(self.spoilers_out),
            on_ground: delta.on_ground.or(self.on_ground),
        }
    }

    /// True if no field is set.
    pub fn is_empty(&self) -> bool {
        Self {
            is_full_data: None,
            ..self.clone()
        } == Self::default()
    }
}

fn changed<T: PartialEq + Copy>(old: &Option<T>, new: &Option<T>) -> Option<T> {
    if old != new {
        *new
    } else {
        None
    }
}

/// Payload of an `ACC` client query.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurationMessage {
    /// A peer asks for our full configuration.
    RequestFull,
    /// A full or incremental configuration.
    Update(AircraftConfiguration),
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    request: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    config: Option<AircraftConfiguration>,
}

impl ConfigurationMessage {
    /// Decode the JSON payload of an `ACC` query.
    pub fn decode(json: &str) -> Result<Self, ProtocolError> {
        let invalid = || ProtocolError::InvalidField {
            packet: "ClientQuery",
            field: "aircraft_configuration",
            value: json.to_string(),
        };
        let envelope: Envelope = serde_json::from_str(json).map_err(|_| invalid())?;
        match (envelope.request.as_deref(), envelope.config) {
            (Some("full"), _) => Ok(Self::RequestFull),
            (_, Some(config)) => Ok(Self::Update(config)),
            _ => Err(invalid()),
        }
    }

    /// Encode as the JSON payload of an `ACC` query.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        let envelope = match self {
            Self::RequestFull => Envelope {
                request: Some("full".to_string()),
                config: None,
            },
            Self::Update(config) => Envelope {
                request: None,
                config: Some(config.clone()),
            },
        };
        serde_json::to_string(&envelope)
    }
}
