//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use netpilot::config::ConfigFileError;
use netpilot::services::ServiceError;
use netpilot::session::SessionError;
use netpilot::telemetry::TelemetryError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Session request rejected or session task gone
    Session(SessionError),
    /// Telemetry receiver could not start
    Telemetry(TelemetryError),
    /// HTTP service failure
    Service(ServiceError),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Telemetry(TelemetryError::SocketBindError { port, .. }) => {
                eprintln!();
                eprintln!("Another program is listening on UDP port {}.", port);
                eprintln!("Change [telemetry] udp_port or run with --no-telemetry.");
            }
            CliError::Session(SessionError::InvalidProfile(_)) => {
                eprintln!();
                eprintln!("Set your account details with:");
                eprintln!("  netpilot config set network.callsign <CALLSIGN>");
                eprintln!("  netpilot config set network.cid <CID>");
                eprintln!("  netpilot config set network.password <PASSWORD>");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Session(e) => write!(f, "Session error: {}", e),
            CliError::Telemetry(e) => write!(f, "Telemetry error: {}", e),
            CliError::Service(e) => write!(f, "Service error: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Session(e) => Some(e),
            CliError::Telemetry(e) => Some(e),
            CliError::Service(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<SessionError> for CliError {
    fn from(e: SessionError) -> Self {
        CliError::Session(e)
    }
}

impl From<TelemetryError> for CliError {
    fn from(e: TelemetryError) -> Self {
        CliError::Telemetry(e)
    }
}

impl From<ServiceError> for CliError {
    fn from(e: ServiceError) -> Self {
        CliError::Service(e)
    }
}
