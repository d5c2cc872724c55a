//! Session wire protocol.
//!
//! A colon-delimited text protocol over a persistent TCP stream. Every line is
//! one packet that starts with a type discriminator followed by the sender
//! and recipient callsigns:
//!
//! ```text
//! #TMEDDF_TWR:@19900:DLH123 contact ground 121.900
//! ^^^ ^^^^^^^^ ^^^^^^ ^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^
//! type  from    to     body
//! ```
//!
//! Inbound lines are decoded into the tagged union [`Packet`] by
//! [`parse_packet`]; outbound packets are encoded with `Display`.
//!
//! # Components
//!
//! - [`packet`] - packet variants, constants, encoder
//! - [`parser`] - strict decoder that fails closed
//! - [`pbh`] - packed pitch/bank/heading word
//! - [`server_error`] - `$ER` code classification

mod error;
mod packet;
mod parser;
mod pbh;
mod server_error;

pub use error::ProtocolError;
pub use packet::{
    AddAtc, AddPilot, AtcPosition, ClientIdentification, ClientQuery, FastPilotPosition, Packet,
    PilotPosition, QueryType, ServerError, ServerIdentification, TextMessage, ALL_CLIENTS,
    BROADCAST, PROTOCOL_REVISION, SERVER_CALLSIGN,
};
pub use parser::parse_packet;
pub use pbh::PitchBankHeading;
pub use server_error::{ErrorSeverity, ServerErrorCode};
