//! User configuration file (`~/.netpilot/config.ini`).
//!
//! - [`settings`] - one struct per `[section]`
//! - [`defaults`] - `DEFAULT_*` constants and `ConfigFile::default()`
//! - `parser` - INI → [`ConfigFile`] with validation
//! - `writer` - [`ConfigFile`] → commented INI
//!
//! A [`SessionConfig`](crate::session::SessionConfig) is derived from the
//! loaded file once and handed to the session; the only thing written back at
//! runtime is the cached server list.

mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    AircraftSettings, CachedServer, ConfigFile, LoggingSettings, NetworkSettings,
    SessionSettings, TelemetrySettings, VoiceSettings,
};
