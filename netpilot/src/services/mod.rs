//! REST collaborators of the session.
//!
//! # Components
//!
//! - [`AliasStationClient`] / [`HttpAliasStationClient`] - voice service
//!   alias-station table
//! - [`AliasTableAdapter`] - poll loop that feeds the table to the session
//! - [`ServerListClient`] - network server list for the `servers` command
//!
//! ```text
//! AliasTableAdapter (poll loop)
//!     │
//!     ├── AliasStationClient trait → HttpAliasStationClient (reqwest)
//!     │
//!     └── mpsc::Sender<Vec<AliasStation>> ──► SessionHandle::set_alias_stations
//! ```

mod adapter;
mod alias;
mod config;
mod error;
mod servers;

pub use adapter::AliasTableAdapter;
pub use alias::{AliasStationClient, HttpAliasStationClient};
pub use config::{
    AliasAdapterConfig, DEFAULT_ALIAS_POLL_INTERVAL_SECS, DEFAULT_ALIAS_URL,
    DEFAULT_SERVER_LIST_URL,
};
pub use error::ServiceError;
pub use servers::{NetworkServer, ServerListClient, DEFAULT_FSD_PORT};
