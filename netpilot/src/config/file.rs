//! Configuration file handling for ~/.netpilot/config.ini.
//!
//! Loads and saves user configuration with sensible defaults, and derives
//! the runtime configuration of the session and its collaborators.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use super::settings::{CachedServer, ConfigFile};
use crate::services::AliasAdapterConfig;
use crate::session::{ConnectProfile, SessionConfig};
use crate::telemetry::TelemetryReceiverConfig;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    #[error("Unknown configuration key '{0}', expected section.key")]
    UnknownKey(String),

    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

impl ConfigFile {
    /// Load configuration from the default path (~/.netpilot/config.ini).
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> Result<(), ConfigFileError> {
        self.save_to(&config_file_path())
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        let content = super::writer::to_config_string(self);
        std::fs::write(path, content).map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    /// Create the default config file if it doesn't exist.
    pub fn ensure_exists() -> Result<PathBuf, ConfigFileError> {
        let path = config_file_path();
        if !path.exists() {
            Self::default().save_to(&path)?;
        }
        Ok(path)
    }

    /// Replace the cached server list.
    pub fn set_cached_servers(&mut self, servers: Vec<CachedServer>) {
        self.network.cached_servers = servers;
    }

    /// Look up a cached server by name, case-insensitively.
    pub fn cached_server(&self, name: &str) -> Option<&CachedServer> {
        self.network
            .cached_servers
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Connect profile built from `[network]`, `[aircraft]` and `[session]`.
    pub fn connect_profile(&self) -> ConnectProfile {
        ConnectProfile {
            callsign: self.network.callsign.clone(),
            cid: self.network.cid.clone(),
            password: self.network.password.clone(),
            real_name: self.network.real_name.clone(),
            rating: self.network.rating,
            role: self.session.role,
            aircraft_type: self.aircraft.type_code.clone(),
            selcal: self.aircraft.selcal.clone(),
        }
    }

    pub fn alias_adapter_config(&self) -> AliasAdapterConfig {
        AliasAdapterConfig {
            url: self.voice.alias_url.clone(),
            poll_interval: Duration::from_secs(self.voice.alias_poll_interval_secs),
        }
    }

    /// Read one `section.key` value as it would be written to the file.
    pub fn get_value(&self, key: &str) -> Result<String, ConfigFileError> {
        let (section, name) = split_key(key)?;
        let ini = self.to_ini()?;
        ini.get_from(Some(section), name)
            .map(str::to_string)
            .ok_or_else(|| unknown_key(key))
    }

    /// Set one `section.key` value, validated the same way as a loaded file.
    ///
    /// `self` is left untouched when the value is rejected.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigFileError> {
        let (section, name) = split_key(key)?;
        let mut ini = self.to_ini()?;
        if ini.get_from(Some(section), name).is_none() {
            return Err(unknown_key(key));
        }
        ini.with_section(Some(section)).set(name, value.trim());
        *self = super::parser::parse_ini(&ini)?;
        Ok(())
    }

    fn to_ini(&self) -> Result<Ini, ConfigFileError> {
        Ini::load_from_str(&super::writer::to_config_string(self))
            .map_err(|e| ConfigFileError::ReadError(ini::Error::Parse(e)))
    }

    pub fn telemetry_config(&self) -> TelemetryReceiverConfig {
        TelemetryReceiverConfig {
            port: self.telemetry.udp_port,
            ..Default::default()
        }
    }
}

impl From<&ConfigFile> for SessionConfig {
    fn from(config: &ConfigFile) -> Self {
        Self {
            profile: config.connect_profile(),
            pilot_position_interval: Duration::from_secs(
                config.session.pilot_position_interval_secs,
            ),
            observer_position_interval: Duration::from_secs(
                config.session.observer_position_interval_secs,
            ),
            controller_timeout: Duration::from_secs(config.session.controller_timeout_secs),
            connect_timeout: Duration::from_secs(config.network.connect_timeout_secs),
            radio_gains: [config.voice.com1_gain, config.voice.com2_gain],
            receive_only: config.voice.receive_only,
            packet_log_dir: config.logging.packet_log_dir.clone(),
        }
    }
}

fn split_key(key: &str) -> Result<(&str, &str), ConfigFileError> {
    key.split_once('.')
        .filter(|(section, name)| !section.is_empty() && !name.is_empty())
        .ok_or_else(|| unknown_key(key))
}

fn unknown_key(key: &str) -> ConfigFileError {
    ConfigFileError::UnknownKey(key.to_string())
}

/// Path to the config directory (~/.netpilot).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".netpilot")
}

/// Path to the config file (~/.netpilot/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}
