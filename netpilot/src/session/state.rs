//! Connection states, roles and disconnect classification.

use std::fmt;
use std::str::FromStr;

/// Connection state machine.
///
/// ```text
/// Disconnected -> Connecting -> Identifying -> Connected -> Disconnecting -> Disconnected
///                                                  |
///                                                  +-> ForciblyDisconnected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    /// Transport connect in progress.
    Connecting,
    /// Socket open, waiting for the server identification.
    Identifying,
    Connected,
    Disconnecting,
    /// The server ended the session. Terminal for the session; a new
    /// connect may start from here.
    ForciblyDisconnected,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// A session exists and owns timers and transport.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Self::Connecting | Self::Identifying | Self::Connected | Self::Disconnecting
        )
    }

    /// A new connect request is accepted.
    pub fn accepts_connect(&self) -> bool {
        matches!(self, Self::Disconnected | Self::ForciblyDisconnected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Identifying => "identifying",
            Self::Connected => "connected",
            Self::Disconnecting => "disconnecting",
            Self::ForciblyDisconnected => "forcibly disconnected",
        };
        f.write_str(name)
    }
}

/// Why an established session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The operator asked for it.
    Intentional,
    /// The server ended the session.
    Forcible { reason: String },
    /// The transport dropped.
    Other,
}

/// How this client appears on the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    Pilot,
    /// Non-piloting presence.
    Observer,
    /// Observer attached to a tower view.
    TowerView,
}

impl Role {
    /// Registers as an observer rather than a pilot.
    pub fn is_observer(&self) -> bool {
        matches!(self, Self::Observer | Self::TowerView)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pilot => "pilot",
            Self::Observer => "observer",
            Self::TowerView => "tower_view",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pilot" => Ok(Self::Pilot),
            "observer" => Ok(Self::Observer),
            "tower_view" | "towerview" => Ok(Self::TowerView),
            other => Err(format!(
                "unknown role '{other}', expected pilot, observer or tower_view"
            )),
        }
    }
}
