//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`config`] - Configuration management (get, set, path, init)
//! - [`connect`] - Interactive network session
//! - [`servers`] - Fetch and cache the network server list

pub mod config;
pub mod connect;
pub mod servers;

mod cockpit;
mod operator;
