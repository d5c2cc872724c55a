//! Configuration management CLI commands.
//!
//! Provides `config get`, `config set`, `config path` and `config init`.

use clap::Subcommand;
use netpilot::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Get a configuration value
    Get {
        /// Configuration key in format section.key (e.g., network.callsign)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key in format section.key (e.g., network.callsign)
        key: String,

        /// Value to set
        value: String,
    },

    /// Show the configuration file path
    Path,

    /// Write a default configuration file if none exists
    Init,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => run_get(&key),
        ConfigCommands::Set { key, value } => run_set(&key, &value),
        ConfigCommands::Path => run_path(),
        ConfigCommands::Init => run_init(),
    }
}

fn run_get(key: &str) -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let value = config.get_value(key)?;

    if value.is_empty() {
        println!("(not set)");
    } else if key.eq_ignore_ascii_case("network.password") {
        println!("(set)");
    } else {
        println!("{}", value);
    }

    Ok(())
}

fn run_set(key: &str, value: &str) -> Result<(), CliError> {
    let mut config = ConfigFile::load()?;
    config.set_value(key, value)?;
    config.save()?;

    println!("Set {}", key);
    Ok(())
}

fn run_path() -> Result<(), CliError> {
    println!("{}", config_file_path().display());
    Ok(())
}

fn run_init() -> Result<(), CliError> {
    let existed = config_file_path().exists();
    let path = ConfigFile::ensure_exists()?;

    if existed {
        println!("Configuration already exists: {}", path.display());
    } else {
        println!("Created {}", path.display());
        println!();
        println!("Next, set your network account:");
        println!("  netpilot config set network.callsign <CALLSIGN>");
        println!("  netpilot config set network.cid <CID>");
        println!("  netpilot config set network.password <PASSWORD>");
        println!("  netpilot config set network.real_name \"<NAME>\"");
    }

    Ok(())
}
