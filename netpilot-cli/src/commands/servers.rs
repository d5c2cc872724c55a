//! Server list command.
//!
//! Downloads the network server list, prints it, and caches it in the
//! config file so `connect --server <NAME>` can use it offline.

use clap::Args;
use netpilot::config::{CachedServer, ConfigFile};
use netpilot::services::{ServerListClient, DEFAULT_SERVER_LIST_URL};

use crate::error::CliError;

/// Arguments for the servers command.
#[derive(Debug, Args)]
pub struct ServersArgs {
    /// Server list URL
    #[arg(long, default_value = DEFAULT_SERVER_LIST_URL)]
    pub url: String,

    /// Print the list without caching it
    #[arg(long)]
    pub no_save: bool,
}

/// Fetch, print and cache the server list.
pub async fn run(args: ServersArgs) -> Result<(), CliError> {
    let client = ServerListClient::new(args.url)?;
    let servers = client.fetch_servers().await?;

    if servers.is_empty() {
        println!("No servers accept client connections right now.");
        return Ok(());
    }

    println!("{:<16} {:<28} {}", "NAME", "ADDRESS", "LOCATION");
    for server in &servers {
        println!(
            "{:<16} {:<28} {}",
            server.ident,
            server.address(),
            server.location
        );
    }

    if args.no_save {
        return Ok(());
    }

    let mut config = ConfigFile::load()?;
    config.set_cached_servers(
        servers
            .iter()
            .map(|s| CachedServer {
                name: s.ident.clone(),
                address: s.address(),
            })
            .collect(),
    );
    config.save()?;

    println!();
    println!("Cached {} servers. Connect with: netpilot connect --server <NAME>", servers.len());
    Ok(())
}
