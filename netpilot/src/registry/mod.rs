//! Station/Controller Registry.
//!
//! In-memory tables of the ATC stations seen on the network ([`Controller`])
//! and of the voice-routing alias entries published by the voice service
//! ([`AliasStation`]). The registry is owned by the session and mutated only
//! from its serialized context, so it carries no locking of its own.

mod alias;
mod controller;
mod store;

pub use alias::AliasStation;
pub use controller::{Controller, ControllerChange, NO_FREQUENCY_WIRE};
pub use store::StationRegistry;
