//! Session configuration.
//!
//! Built once from the config file and handed to the session constructor.
//! Nothing in here changes while a session runs.

use std::path::PathBuf;
use std::time::Duration;

use super::state::Role;

/// Default interval between pilot position packets.
pub const DEFAULT_PILOT_POSITION_INTERVAL: Duration = Duration::from_secs(5);

/// Default interval between observer position packets.
pub const DEFAULT_OBSERVER_POSITION_INTERVAL: Duration = Duration::from_secs(15);

/// Controllers not heard from for this long are dropped.
pub const DEFAULT_CONTROLLER_TIMEOUT: Duration = Duration::from_secs(60);

/// Interval of the maintenance pass (stale controllers, alias refresh).
pub const MAINTENANCE_INTERVAL: Duration = Duration::from_secs(10);

/// Default TCP connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client id reported in `$ID`.
pub const CLIENT_ID: u16 = 0x8ad3;

/// Client name reported in `$ID`.
pub const CLIENT_NAME: &str = "netpilot";

/// Who connects and as what.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConnectProfile {
    pub callsign: String,
    pub cid: String,
    pub password: String,
    pub real_name: String,
    pub rating: u8,
    pub role: Role,
    /// ICAO aircraft type, e.g. `B738`.
    pub aircraft_type: String,
    /// Configured SELCAL code such as `AB-CD`.
    pub selcal: Option<String>,
}

/// Immutable settings for one session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Profile used when a connect request does not bring its own.
    pub profile: ConnectProfile,
    pub pilot_position_interval: Duration,
    pub observer_position_interval: Duration,
    pub controller_timeout: Duration,
    pub connect_timeout: Duration,
    /// Per-radio receive gain, 0.0 to 1.0.
    pub radio_gains: [f32; 2],
    pub receive_only: bool,
    /// Directory for per-session packet logs. `None` disables them.
    pub packet_log_dir: Option<PathBuf>,
}

impl SessionConfig {
    pub fn new(profile: ConnectProfile) -> Self {
        Self {
            profile,
            ..Default::default()
        }
    }

    /// Position interval for a role.
    pub fn position_interval(&self, role: Role) -> Duration {
        if role.is_observer() {
            self.observer_position_interval
        } else {
            self.pilot_position_interval
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            profile: ConnectProfile::default(),
            pilot_position_interval: DEFAULT_PILOT_POSITION_INTERVAL,
            observer_position_interval: DEFAULT_OBSERVER_POSITION_INTERVAL,
            controller_timeout: DEFAULT_CONTROLLER_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            radio_gains: [1.0, 1.0],
            receive_only: false,
            packet_log_dir: None,
        }
    }
}
