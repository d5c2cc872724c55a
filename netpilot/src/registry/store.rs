//! The registry tables.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::alias::AliasStation;
use super::controller::{Controller, ControllerChange};

/// Controllers keyed by upper-cased callsign, plus the alias station table.
#[derive(Debug, Default)]
pub struct StationRegistry {
    controllers: HashMap<String, Controller>,
    alias_stations: Vec<AliasStation>,
}

impl StationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a position report for `callsign`.
    ///
    /// Creates the controller on first sight, otherwise updates it in place.
    pub fn upsert_controller(
        &mut self,
        callsign: &str,
        frequency: u32,
        latitude: f64,
        longitude: f64,
        now: Instant,
    ) -> ControllerChange {
        let key = callsign.to_ascii_uppercase();
        match self.controllers.get_mut(&key) {
            Some(existing) => {
                existing.last_update = now;
                let moved = existing.latitude != latitude || existing.longitude != longitude;
                let retuned = existing.frequency != frequency;
                if !moved && !retuned {
                    return ControllerChange::Unchanged;
                }
                if retuned {
                    *existing = Controller {
                        real_name: existing.real_name.take(),
                        ..Controller::new(callsign, frequency, latitude, longitude, now)
                    };
                } else {
                    existing.latitude = latitude;
                    existing.longitude = longitude;
                }
                ControllerChange::Updated(existing.clone())
            }
            None => {
                let controller = Controller::new(callsign, frequency, latitude, longitude, now);
                self.controllers.insert(key, controller.clone());
                ControllerChange::Added(controller)
            }
        }
    }

    /// Record the real name of a controller. Returns the updated entry.
    pub fn set_real_name(&mut self, callsign: &str, real_name: &str) -> Option<Controller> {
        let controller = self.controllers.get_mut(&callsign.to_ascii_uppercase())?;
        let real_name = real_name.trim();
        if real_name.is_empty() || controller.real_name.as_deref() == Some(real_name) {
            return None;
        }
        controller.real_name = Some(real_name.to_string());
        Some(controller.clone())
    }

    pub fn remove_controller(&mut self, callsign: &str) -> Option<Controller> {
        self.controllers.remove(&callsign.to_ascii_uppercase())
    }

    pub fn controller(&self, callsign: &str) -> Option<&Controller> {
        self.controllers.get(&callsign.to_ascii_uppercase())
    }

    pub fn controllers(&self) -> impl Iterator<Item = &Controller> {
        self.controllers.values()
    }

    /// Controllers whose normalized frequency equals `normalized_hz`.
    pub fn controllers_on(&self, normalized_hz: u32) -> impl Iterator<Item = &Controller> {
        self.controllers
            .values()
            .filter(move |c| c.has_frequency() && c.normalized_frequency == normalized_hz)
    }

    pub fn controller_count(&self) -> usize {
        self.controllers.len()
    }

    /// Remove every controller without a report within `timeout`.
    pub fn prune_stale(&mut self, now: Instant, timeout: Duration) -> Vec<Controller> {
        let stale: Vec<String> = self
            .controllers
            .iter()
            .filter(|(_, c)| now.saturating_duration_since(c.last_update) > timeout)
            .map(|(key, _)| key.clone())
            .collect();

        stale
            .into_iter()
            .filter_map(|key| self.controllers.remove(&key))
            .collect()
    }

    /// Replace the alias station table wholesale. Returns true if it changed.
    pub fn replace_alias_stations(&mut self, stations: Vec<AliasStation>) -> bool {
        if self.alias_stations == stations {
            return false;
        }
        self.alias_stations = stations;
        true
    }

    pub fn alias_stations(&self) -> &[AliasStation] {
        &self.alias_stations
    }

    /// Drop every controller, keeping the alias table (it is not session-bound).
    pub fn clear_controllers(&mut self) {
        self.controllers.clear();
    }
}
