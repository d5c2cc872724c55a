//! Network session.
//!
//! The session is split into a synchronous core and an async driver:
//!
//! - [`Session`] - the state machine and every handler; no I/O
//! - [`SessionDaemon`] / [`SessionHandle`] - tokio task that owns a
//!   `Session`, drives TCP, timers and the voice/simulator capabilities
//!
//! Supporting pieces:
//!
//! - [`ConfigurationSynchronizer`] with its [`TokenBucket`] - rate-limited
//!   aircraft configuration deltas
//! - [`RadioMessageRouter`] - SELCAL and frequency message filtering
//! - [`AliasResolver`] - voice alias frequency resolution per radio
//! - [`PacketLog`] - optional raw line log per session
//!
//! # Connection states
//!
//! ```text
//! Disconnected ──connect──► Connecting ──socket open──► Identifying
//!      ▲                        │                           │ $DI
//!      │ failure                ▼                           ▼
//!      └────────────────────────┴───────────────────── Connected
//!                                                           │ disconnect
//!      ForciblyDisconnected ◄── fatal $ER / kill ──┐        ▼
//!                                                  └── Disconnecting
//! ```

mod alias_resolver;
mod config;
mod core;
mod daemon;
mod error;
mod notification;
mod packet_log;
mod position;
mod router;
mod state;
mod sync;
mod token_bucket;

pub use alias_resolver::{resolve_frequency, AliasResolution, AliasResolver, RadioResolution};
pub use config::{
    ConnectProfile, SessionConfig, CLIENT_ID, CLIENT_NAME, DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_CONTROLLER_TIMEOUT, DEFAULT_OBSERVER_POSITION_INTERVAL,
    DEFAULT_PILOT_POSITION_INTERVAL, MAINTENANCE_INTERVAL,
};
pub use self::core::{Output, Session, SessionInfo, TransportCommand};
pub use daemon::{SessionDaemon, SessionHandle};
pub use error::{SessionError, TransportError};
pub use notification::Notification;
pub use packet_log::{redact, Direction, PacketLog};
pub use position::{fast_pilot_position, observer_position, periodic_position, pilot_position};
pub use router::{receivable_frequencies, RadioMessageRouter, RouteDecision};
pub use state::{ConnectionState, DisconnectReason, Role};
pub use sync::{ConfigurationSynchronizer, SyncOutcome};
pub use token_bucket::{TokenBucket, CONFIG_TOKEN_CAPACITY, CONFIG_TOKEN_REFILL_INTERVAL};
