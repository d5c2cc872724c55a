//! Error types for the session wire protocol.

use thiserror::Error;

/// A line that could not be decoded into a [`Packet`](super::Packet).
///
/// Decoding fails closed: unknown trailing fields are ignored, but a missing
/// or malformed required field rejects the whole line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The line was empty after trimming.
    #[error("Empty packet")]
    Empty,

    /// The type discriminator is not one this client understands.
    #[error("Unknown packet type: {0}")]
    UnknownPacket(String),

    /// A required field is absent.
    #[error("{packet} packet is missing field '{field}'")]
    MissingField {
        packet: &'static str,
        field: &'static str,
    },

    /// A required field is present but cannot be parsed.
    #[error("{packet} packet has invalid {field} '{value}'")]
    InvalidField {
        packet: &'static str,
        field: &'static str,
        value: String,
    },
}

impl ProtocolError {
    /// True for lines this client simply does not model.
    ///
    /// These are expected on a live network and only worth a trace entry.
    pub fn is_unmodelled(&self) -> bool {
        matches!(self, Self::UnknownPacket(_) | Self::Empty)
    }
}
