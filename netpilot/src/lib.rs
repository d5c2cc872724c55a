//! netpilot - flight-network session engine.
//!
//! Keeps a simulated aircraft in sync with an FSD-style multiplayer server:
//! connection lifecycle, periodic position reports, rate-limited aircraft
//! configuration deltas, radio message routing and voice frequency aliasing.
//!
//! ```ignore
//! use netpilot::capabilities::{NoopSimulatorLink, NoopVoiceClient};
//! use netpilot::config::ConfigFile;
//! use netpilot::session::{SessionConfig, SessionDaemon};
//!
//! let file = ConfigFile::load()?;
//! let (daemon, handle) = SessionDaemon::new(
//!     SessionConfig::from(&file),
//!     Box::new(NoopVoiceClient),
//!     Box::new(NoopSimulatorLink),
//! );
//! let task = daemon.start(shutdown.clone());
//! handle.connect(&file.network.server).await?;
//! ```

pub mod aircraft;
pub mod capabilities;
pub mod config;
pub mod frequency;
pub mod logging;
pub mod protocol;
pub mod registry;
pub mod services;
pub mod session;
pub mod telemetry;

/// Version of the netpilot library and CLI.
///
/// Synchronized across the workspace and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
