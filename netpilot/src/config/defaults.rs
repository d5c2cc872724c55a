//! Default values for all configuration settings.

use std::path::PathBuf;

use super::file::config_directory;
use super::settings::*;
use crate::services::{DEFAULT_ALIAS_POLL_INTERVAL_SECS, DEFAULT_ALIAS_URL};
use crate::session::Role;
use crate::telemetry::DEFAULT_TELEMETRY_PORT;

/// Local test server.
pub const DEFAULT_SERVER: &str = "127.0.0.1:6809";

pub const DEFAULT_RATING: u8 = 1;

pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_PILOT_POSITION_INTERVAL_SECS: u64 = 5;

pub const DEFAULT_OBSERVER_POSITION_INTERVAL_SECS: u64 = 15;

pub const DEFAULT_CONTROLLER_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_RADIO_GAIN: f32 = 1.0;

/// Log file name inside the config directory.
pub const DEFAULT_LOG_FILE_NAME: &str = "netpilot.log";

/// Packet log directory name inside the config directory.
pub const DEFAULT_PACKET_LOG_DIR_NAME: &str = "packets";

/// Default log file path (`~/.netpilot/netpilot.log`).
pub fn default_log_file() -> PathBuf {
    config_directory().join(DEFAULT_LOG_FILE_NAME)
}

/// Default packet log directory (`~/.netpilot/packets`).
pub fn default_packet_log_dir() -> PathBuf {
    config_directory().join(DEFAULT_PACKET_LOG_DIR_NAME)
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            network: NetworkSettings {
                server: DEFAULT_SERVER.to_string(),
                callsign: String::new(),
                cid: String::new(),
                password: String::new(),
                real_name: String::new(),
                rating: DEFAULT_RATING,
                cached_servers: Vec::new(),
                connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            },
            aircraft: AircraftSettings {
                type_code: String::new(),
                selcal: None,
            },
            session: SessionSettings {
                role: Role::Pilot,
                pilot_position_interval_secs: DEFAULT_PILOT_POSITION_INTERVAL_SECS,
                observer_position_interval_secs: DEFAULT_OBSERVER_POSITION_INTERVAL_SECS,
                controller_timeout_secs: DEFAULT_CONTROLLER_TIMEOUT_SECS,
            },
            voice: VoiceSettings {
                com1_gain: DEFAULT_RADIO_GAIN,
                com2_gain: DEFAULT_RADIO_GAIN,
                receive_only: false,
                alias_url: DEFAULT_ALIAS_URL.to_string(),
                alias_poll_interval_secs: DEFAULT_ALIAS_POLL_INTERVAL_SECS,
            },
            telemetry: TelemetrySettings {
                enabled: true,
                udp_port: DEFAULT_TELEMETRY_PORT,
            },
            logging: LoggingSettings {
                file: default_log_file(),
                packet_log_dir: Some(default_packet_log_dir()),
            },
        }
    }
}
