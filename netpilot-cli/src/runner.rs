//! CLI runner for common setup.
//!
//! Loads the configuration file and initializes logging once for commands
//! that run a session.

use tracing::info;

use netpilot::config::ConfigFile;
use netpilot::logging::{init_logging, split_log_path, LoggingGuard};

use crate::error::CliError;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Create a new CLI runner with optional debug logging.
    ///
    /// When stdout is a TTY, stdout logging is disabled so log lines do not
    /// interleave with the interactive session output.
    pub fn with_debug(debug_mode: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let (log_dir, log_file) = split_log_path(&config.logging.file);
        let stdout_enabled = !atty::is(atty::Stream::Stdout);

        let logging_guard = init_logging(&log_dir, &log_file, stdout_enabled, debug_mode)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("netpilot v{}", netpilot::VERSION);
        info!("netpilot CLI: {} command", command);
        info!(config = %netpilot::config::config_file_path().display(), "Configuration loaded");
    }
}
