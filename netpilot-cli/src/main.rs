//! netpilot CLI - command-line pilot client
//!
//! This binary runs a flight-network session from the terminal using the
//! netpilot library.

use clap::{Parser, Subcommand};

mod commands;
mod error;
mod runner;

use commands::config::ConfigCommands;
use commands::connect::ConnectArgs;
use commands::servers::ServersArgs;

#[derive(Parser)]
#[command(name = "netpilot")]
#[command(version = netpilot::VERSION)]
#[command(about = "Fly on the network from the terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to the network and run an interactive session
    Connect(ConnectArgs),

    /// View or change configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Fetch the server list and cache it in the configuration
    Servers(ServersArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Connect(args) => commands::connect::run(args).await,
        Commands::Config(command) => commands::config::run(command),
        Commands::Servers(args) => commands::servers::run(args).await,
    };

    if let Err(e) = result {
        e.exit();
    }
}
