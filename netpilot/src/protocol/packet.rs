//! Packet types and their wire encoding.
//!
//! Each variant of [`Packet`] is one line of the session protocol. `Display`
//! produces the line without its `\r\n` terminator.

use std::fmt;

use super::pbh::PitchBankHeading;
use crate::aircraft::{Squawk, TransponderMode};

/// Callsign of the network server.
pub const SERVER_CALLSIGN: &str = "SERVER";

/// Recipient that reaches every connected client.
pub const ALL_CLIENTS: &str = "@94836";

/// Recipient used by server-wide broadcast messages.
pub const BROADCAST: &str = "*";

/// Protocol revision this client speaks.
pub const PROTOCOL_REVISION: u32 = 100;

/// One line of the session protocol.
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    ServerIdentification(ServerIdentification),
    ClientIdentification(ClientIdentification),
    AddPilot(AddPilot),
    AddAtc(AddAtc),
    DeletePilot { callsign: String, cid: String },
    DeleteAtc { callsign: String, cid: String },
    PilotPosition(PilotPosition),
    FastPilotPosition(FastPilotPosition),
    AtcPosition(AtcPosition),
    TextMessage(TextMessage),
    ClientQuery(ClientQuery),
    ClientResponse(ClientQuery),
    KillRequest {
        from: String,
        victim: String,
        reason: String,
    },
    ServerError(ServerError),
    Ping {
        from: String,
        to: String,
        timestamp: String,
    },
    Pong {
        from: String,
        to: String,
        timestamp: String,
    },
}

impl Packet {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ServerIdentification(_) => "ServerIdentification",
            Self::ClientIdentification(_) => "ClientIdentification",
            Self::AddPilot(_) => "AddPilot",
            Self::AddAtc(_) => "AddAtc",
            Self::DeletePilot { .. } => "DeletePilot",
            Self::DeleteAtc { .. } => "DeleteAtc",
            Self::PilotPosition(_) => "PilotPosition",
            Self::FastPilotPosition(_) => "FastPilotPosition",
            Self::AtcPosition(_) => "AtcPosition",
            Self::TextMessage(_) => "TextMessage",
            Self::ClientQuery(_) => "ClientQuery",
            Self::ClientResponse(_) => "ClientResponse",
            Self::KillRequest { .. } => "KillRequest",
            Self::ServerError(_) => "ServerError",
            Self::Ping { .. } => "Ping",
            Self::Pong { .. } => "Pong",
        }
    }

    /// True for the periodic position traffic that floods debug logs.
    pub fn is_position(&self) -> bool {
        matches!(
            self,
            Self::PilotPosition(_) | Self::FastPilotPosition(_) | Self::AtcPosition(_)
        )
    }
}

/// `$DI`: first line the server sends after the socket opens.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerIdentification {
    pub from: String,
    pub to: String,
    pub version: String,
    pub challenge: String,
}

/// `$ID`: the client's answer to the server identification.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientIdentification {
    pub from: String,
    pub to: String,
    pub client_id: u16,
    pub client_name: String,
    pub major_version: u32,
    pub minor_version: u32,
    pub cid: String,
    pub system_uid: String,
}

/// `#AP`: register as a pilot.
#[derive(Debug, Clone, PartialEq)]
pub struct AddPilot {
    pub callsign: String,
    pub to: String,
    pub cid: String,
    pub password: String,
    pub rating: u8,
    pub protocol_revision: u32,
    pub sim_type: u8,
    pub real_name: String,
}

/// `#AA`: register as an ATC-side client (observers and tower view).
#[derive(Debug, Clone, PartialEq)]
pub struct AddAtc {
    pub callsign: String,
    pub to: String,
    pub real_name: String,
    pub cid: String,
    pub password: String,
    pub rating: u8,
    pub protocol_revision: u32,
}

/// `@`: slow pilot position.
#[derive(Debug, Clone, PartialEq)]
pub struct PilotPosition {
    pub mode: TransponderMode,
    pub callsign: String,
    pub squawk: Squawk,
    pub rating: u8,
    pub latitude: f64,
    pub longitude: f64,
    /// True altitude in feet.
    pub true_altitude: i32,
    /// Ground speed in knots.
    pub ground_speed: i32,
    pub attitude: PitchBankHeading,
    /// Pressure altitude minus true altitude, in feet.
    pub pressure_altitude_delta: i32,
}

/// `^`: high-rate pilot position with velocities.
#[derive(Debug, Clone, PartialEq)]
pub struct FastPilotPosition {
    pub callsign: String,
    pub latitude: f64,
    pub longitude: f64,
    /// True altitude in feet.
    pub true_altitude: f64,
    /// Height above ground in feet.
    pub altitude_agl: f64,
    pub attitude: PitchBankHeading,
    /// Velocity along longitude, altitude and latitude axes, m/s.
    pub velocity: [f64; 3],
    /// Pitch, heading and bank rates, rad/s.
    pub rotation: [f64; 3],
    pub nose_gear_angle: f64,
}

/// `%`: ATC position report, also sent by observers.
#[derive(Debug, Clone, PartialEq)]
pub struct AtcPosition {
    pub callsign: String,
    /// Wire-format frequency.
    pub frequency: u32,
    pub facility: u8,
    pub visibility_range: u32,
    pub rating: u8,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: i32,
}

/// `#TM`: text message to a callsign, to radio frequencies, or broadcast.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMessage {
    pub from: String,
    pub to: String,
    pub message: String,
}

impl TextMessage {
    /// Wire frequencies if the message is addressed to radio frequencies.
    ///
    /// Radio recipients look like `@22800` or `@22800&@24050`. Returns
    /// `None` for callsign or broadcast recipients.
    pub fn radio_frequencies(&self) -> Option<Vec<u32>> {
        if !self.to.starts_with('@') || self.to == ALL_CLIENTS {
            return None;
        }
        let frequencies: Vec<u32> = self
            .to
            .split('&')
            .filter_map(|part| part.strip_prefix('@'))
            .filter_map(|digits| digits.parse().ok())
            .collect();
        if frequencies.is_empty() {
            None
        } else {
            Some(frequencies)
        }
    }

    /// Build the recipient field for a set of wire frequencies.
    pub fn frequency_recipient(frequencies: &[u32]) -> String {
        frequencies
            .iter()
            .map(|f| format!("@{f}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Query type carried by `$CQ` / `$CR`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryType {
    /// Public IP address, asked of the server.
    PublicIp,
    /// Aircraft configuration JSON.
    AircraftConfiguration,
    /// Real name of the recipient.
    RealName,
    /// Client capability flags.
    Capabilities,
    Other(String),
}

impl QueryType {
    pub fn as_wire(&self) -> &str {
        match self {
            Self::PublicIp => "IP",
            Self::AircraftConfiguration => "ACC",
            Self::RealName => "RN",
            Self::Capabilities => "CAPS",
            Self::Other(other) => other,
        }
    }

    pub fn from_wire(s: &str) -> Self {
        match s {
            "IP" => Self::PublicIp,
            "ACC" => Self::AircraftConfiguration,
            "RN" => Self::RealName,
            "CAPS" => Self::Capabilities,
            other => Self::Other(other.to_string()),
        }
    }
}

/// `$CQ` client query or `$CR` client response.
///
/// For [`QueryType::AircraftConfiguration`] the payload holds exactly one
/// element, the JSON document, because JSON may itself contain colons.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientQuery {
    pub from: String,
    pub to: String,
    pub query: QueryType,
    pub payload: Vec<String>,
}

impl ClientQuery {
    pub fn new(from: &str, to: &str, query: QueryType, payload: Vec<String>) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            query,
            payload,
        }
    }
}

/// `$ER`: error reported by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerError {
    pub from: String,
    pub to: String,
    pub code: u16,
    pub parameter: String,
    pub message: String,
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ServerIdentification(p) => {
                write!(f, "$DI{}:{}:{}:{}", p.from, p.to, p.version, p.challenge)
            }
            Self::ClientIdentification(p) => write!(
                f,
                "$ID{}:{}:{:04x}:{}:{}:{}:{}:{}",
                p.from,
                p.to,
                p.client_id,
                p.client_name,
                p.major_version,
                p.minor_version,
                p.cid,
                p.system_uid
            ),
            Self::AddPilot(p) => write!(
                f,
                "#AP{}:{}:{}:{}:{}:{}:{}:{}",
                p.callsign,
                p.to,
                p.cid,
                p.password,
                p.rating,
                p.protocol_revision,
                p.sim_type,
                p.real_name
            ),
            Self::AddAtc(p) => write!(
                f,
                "#AA{}:{}:{}:{}:{}:{}:{}",
                p.callsign, p.to, p.real_name, p.cid, p.password, p.rating, p.protocol_revision
            ),
            Self::DeletePilot { callsign, cid } => write!(f, "#DP{callsign}:{cid}"),
            Self::DeleteAtc { callsign, cid } => write!(f, "#DA{callsign}:{cid}"),
            Self::PilotPosition(p) => write!(
                f,
                "@{}:{}:{}:{}:{:.7}:{:.7}:{}:{}:{}:{}",
                p.mode.as_wire(),
                p.callsign,
                p.squawk,
                p.rating,
                p.latitude,
                p.longitude,
                p.true_altitude,
                p.ground_speed,
                p.attitude.pack(),
                p.pressure_altitude_delta
            ),
            Self::FastPilotPosition(p) => write!(
                f,
                "^{}:{:.7}:{:.7}:{:.2}:{:.2}:{}:{:.4}:{:.4}:{:.4}:{:.4}:{:.4}:{:.4}:{:.2}",
                p.callsign,
                p.latitude,
                p.longitude,
                p.true_altitude,
                p.altitude_agl,
                p.attitude.pack(),
                p.velocity[0],
                p.velocity[1],
                p.velocity[2],
                p.rotation[0],
                p.rotation[1],
                p.rotation[2],
                p.nose_gear_angle
            ),
            Self::AtcPosition(p) => write!(
                f,
                "%{}:{}:{}:{}:{}:{:.5}:{:.5}:{}",
                p.callsign,
                p.frequency,
                p.facility,
                p.visibility_range,
                p.rating,
                p.latitude,
                p.longitude,
                p.elevation
            ),
            Self::TextMessage(p) => write!(f, "#TM{}:{}:{}", p.from, p.to, p.message),
            Self::ClientQuery(p) => write_query(f, "$CQ", p),
            Self::ClientResponse(p) => write_query(f, "$CR", p),
            Self::KillRequest {
                from,
                victim,
                reason,
            } => write!(f, "$!!{from}:{victim}:{reason}"),
            Self::ServerError(p) => write!(
                f,
                "$ER{}:{}:{:03}:{}:{}",
                p.from, p.to, p.code, p.parameter, p.message
            ),
            Self::Ping {
                from,
                to,
                timestamp,
            } => write!(f, "$PI{from}:{to}:{timestamp}"),
            Self::Pong {
                from,
                to,
                timestamp,
            } => write!(f, "$PO{from}:{to}:{timestamp}"),
        }
    }
}

fn write_query(f: &mut fmt::Formatter<'_>, prefix: &str, query: &ClientQuery) -> fmt::Result {
    write!(f, "{prefix}{}:{}:{}", query.from, query.to, query.query.as_wire())?;
    for field in &query.payload {
        write!(f, ":{field}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_add_pilot() {
        let packet = Packet::AddPilot(AddPilot {
            callsign: "N12345".to_string(),
            to: SERVER_CALLSIGN.to_string(),
            cid: "1234567".to_string(),
            password: "secret".to_string(),
            rating: 1,
            protocol_revision: PROTOCOL_REVISION,
            sim_type: 1,
            real_name: "Jane Doe KBOS".to_string(),
        });
        assert_eq!(
            packet.to_string(),
            "#APN12345:SERVER:1234567:secret:1:100:1:Jane Doe KBOS"
        );
    }

    #[test]
    fn test_encode_pilot_position() {
        let packet = Packet::PilotPosition(PilotPosition {
            mode: TransponderMode::ModeC,
            callsign: "N12345".to_string(),
            squawk: Squawk::new(1200).unwrap(),
            rating: 1,
            latitude: 42.3656,
            longitude: -71.0096,
            true_altitude: 4000,
            ground_speed: 110,
            attitude: PitchBankHeading::new(0.0, 0.0, 0.0, false),
            pressure_altitude_delta: -20,
        });
        assert_eq!(
            packet.to_string(),
            "@N:N12345:1200:1:42.3656000:-71.0096000:4000:110:0:-20"
        );
    }

    #[test]
    fn test_encode_client_identification_hex_id() {
        let packet = Packet::ClientIdentification(ClientIdentification {
            from: "N12345".to_string(),
            to: SERVER_CALLSIGN.to_string(),
            client_id: 0x0a1f,
            client_name: "netpilot".to_string(),
            major_version: 0,
            minor_version: 1,
            cid: "1234567".to_string(),
            system_uid: "abc".to_string(),
        });
        assert_eq!(
            packet.to_string(),
            "$IDN12345:SERVER:0a1f:netpilot:0:1:1234567:abc"
        );
    }

    #[test]
    fn test_radio_frequencies_single_and_multiple() {
        let single = TextMessage {
            from: "EDDF_TWR".to_string(),
            to: "@19900".to_string(),
            message: "hello".to_string(),
        };
        assert_eq!(single.radio_frequencies(), Some(vec![19900]));

        let multi = TextMessage {
            to: "@19900&@24050".to_string(),
            ..single.clone()
        };
        assert_eq!(multi.radio_frequencies(), Some(vec![19900, 24050]));
    }

    #[test]
    fn test_radio_frequencies_ignores_callsign_and_all_clients() {
        let private = TextMessage {
            from: "EDDF_TWR".to_string(),
            to: "N12345".to_string(),
            message: "hello".to_string(),
        };
        assert_eq!(private.radio_frequencies(), None);

        let everyone = TextMessage {
            to: ALL_CLIENTS.to_string(),
            ..private
        };
        assert_eq!(everyone.radio_frequencies(), None);
    }

    #[test]
    fn test_frequency_recipient() {
        assert_eq!(TextMessage::frequency_recipient(&[22800]), "@22800");
        assert_eq!(
            TextMessage::frequency_recipient(&[22800, 24050]),
            "@22800&@24050"
        );
    }

    #[test]
    fn test_encode_client_query_with_payload() {
        let packet = Packet::ClientResponse(ClientQuery::new(
            "N12345",
            "EDDF_TWR",
            QueryType::Capabilities,
            vec!["ACCONFIG=1".to_string()],
        ));
        assert_eq!(packet.to_string(), "$CRN12345:EDDF_TWR:CAPS:ACCONFIG=1");
    }
}
