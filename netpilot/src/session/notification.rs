//! Events published to subscribers of a session.

use super::state::DisconnectReason;
use crate::aircraft::{Radio, RadioStackState};
use crate::registry::Controller;

/// Something a UI or other collaborator may want to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// A connect request was accepted and the transport is opening.
    ConnectionInitiated { server: String },
    /// Registration sent, the session is live.
    Connected { callsign: String },
    /// The session ended before it was established.
    ConnectionFailed { reason: String },
    /// An established session ended.
    Disconnected { reason: DisconnectReason },
    ControllerAdded(Controller),
    ControllerUpdated(Controller),
    ControllerDeleted { callsign: String },
    /// Alias target for a radio in Hertz, 0 when no alias applies.
    FrequencyAliasChanged { radio: Radio, frequency_hz: u32 },
    RadioStackChanged(RadioStackState),
    /// Radio text on frequencies we are listening to (wire encoding).
    RadioMessageReceived {
        from: String,
        frequencies: Vec<u32>,
        text: String,
        is_direct: bool,
    },
    SelcalAlertReceived { from: String, frequencies: Vec<u32> },
    PrivateMessageReceived { from: String, text: String },
    /// Text from the server, including non-fatal server errors.
    ServerMessageReceived { text: String },
}
