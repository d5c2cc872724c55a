//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.

use std::path::PathBuf;

use crate::session::Role;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub network: NetworkSettings,
    pub aircraft: AircraftSettings,
    pub session: SessionSettings,
    pub voice: VoiceSettings,
    pub telemetry: TelemetrySettings,
    pub logging: LoggingSettings,
}

/// `[network]` - account and server.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkSettings {
    /// `host:port` connected to by default.
    pub server: String,
    pub callsign: String,
    pub cid: String,
    pub password: String,
    pub real_name: String,
    pub rating: u8,
    /// Last fetched server list.
    pub cached_servers: Vec<CachedServer>,
    pub connect_timeout_secs: u64,
}

/// One `name=host` entry of `cached_servers`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedServer {
    pub name: String,
    pub address: String,
}

/// `[aircraft]`
#[derive(Debug, Clone, PartialEq)]
pub struct AircraftSettings {
    /// ICAO type designator.
    pub type_code: String,
    /// SELCAL code, `AB-CD`.
    pub selcal: Option<String>,
}

/// `[session]`
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub role: Role,
    pub pilot_position_interval_secs: u64,
    pub observer_position_interval_secs: u64,
    pub controller_timeout_secs: u64,
}

/// `[voice]`
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceSettings {
    pub com1_gain: f32,
    pub com2_gain: f32,
    pub receive_only: bool,
    /// Alias-station table endpoint.
    pub alias_url: String,
    pub alias_poll_interval_secs: u64,
}

/// `[telemetry]` - simulator UDP feed.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetrySettings {
    pub enabled: bool,
    pub udp_port: u16,
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub file: PathBuf,
    /// `None` disables packet logs.
    pub packet_log_dir: Option<PathBuf>,
}
