//! Session and transport errors.

use std::io;

use thiserror::Error;

use super::state::ConnectionState;
use crate::aircraft::InvalidSquawk;

/// A request the session cannot carry out in its current state.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The operation is not allowed in this connection state.
    #[error("Cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: ConnectionState,
    },

    #[error("Not connected")]
    NotConnected,

    /// Nothing has arrived from the simulator yet.
    #[error("No aircraft state received from the simulator")]
    NoAircraftState,

    #[error("No radio is selected for transmit")]
    NoTransmittingRadio,

    #[error("Invalid connect profile: {0}")]
    InvalidProfile(String),

    #[error(transparent)]
    InvalidSquawk(#[from] InvalidSquawk),

    /// The session task has gone away.
    #[error("Session channel closed")]
    ChannelClosed,
}

/// Socket level failures. Never retried by the session itself.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Failed to connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("Timed out connecting to {address}")]
    Timeout { address: String },

    #[error("Transport I/O error: {0}")]
    Io(#[from] io::Error),
}
