//! Line decoder for the session protocol.
//!
//! The decoder is strict about the fields it needs and lenient about the
//! rest: trailing fields it does not model are ignored, while a missing or
//! unparsable required field rejects the line with a [`ProtocolError`].

use std::str::FromStr;

use super::error::ProtocolError;
use super::packet::*;
use super::pbh::PitchBankHeading;
use crate::aircraft::{Squawk, TransponderMode};

/// Decode one line (without terminator) into a [`Packet`].
pub fn parse_packet(line: &str) -> Result<Packet, ProtocolError> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Err(ProtocolError::Empty);
    }

    if let Some(body) = line.strip_prefix("$!!") {
        return parse_kill(body);
    }
    if line.len() >= 3 {
        if let Some(prefix) = line.get(..3) {
            let body = &line[3..];
            match prefix {
                "$DI" => return parse_server_identification(body),
                "$ID" => return parse_client_identification(body),
                "$CQ" => return parse_client_query(body, "ClientQuery").map(Packet::ClientQuery),
                "$CR" => {
                    return parse_client_query(body, "ClientResponse").map(Packet::ClientResponse)
                }
                "$ER" => return parse_server_error(body),
                "$PI" => return parse_ping(body, true),
                "$PO" => return parse_ping(body, false),
                "#AP" => return parse_add_pilot(body),
                "#AA" => return parse_add_atc(body),
                "#DP" => return parse_delete(body, true),
                "#DA" => return parse_delete(body, false),
                "#TM" => return parse_text_message(body),
                _ => {}
            }
        }
    }
    if let Some(body) = line.strip_prefix('@') {
        return parse_pilot_position(body);
    }
    if let Some(body) = line.strip_prefix('^') {
        return parse_fast_position(body);
    }
    if let Some(body) = line.strip_prefix('%') {
        return parse_atc_position(body);
    }

    let discriminator: String = line.chars().take(3).collect();
    Err(ProtocolError::UnknownPacket(discriminator))
}

impl FromStr for Packet {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_packet(s)
    }
}

/// Positional field access with packet-aware errors.
struct Fields<'a> {
    packet: &'static str,
    parts: Vec<&'a str>,
}

impl<'a> Fields<'a> {
    fn split(packet: &'static str, body: &'a str) -> Self {
        Self {
            packet,
            parts: body.split(':').collect(),
        }
    }

    /// Split into at most `n` fields; the last one keeps any colons.
    fn splitn(packet: &'static str, body: &'a str, n: usize) -> Self {
        Self {
            packet,
            parts: body.splitn(n, ':').collect(),
        }
    }

    fn str(&self, index: usize, field: &'static str) -> Result<&'a str, ProtocolError> {
        match self.parts.get(index) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(ProtocolError::MissingField {
                packet: self.packet,
                field,
            }),
        }
    }

    fn string(&self, index: usize, field: &'static str) -> Result<String, ProtocolError> {
        self.str(index, field).map(str::to_string)
    }

    /// Field that may legitimately be empty or absent.
    fn optional(&self, index: usize) -> String {
        self.parts.get(index).copied().unwrap_or_default().to_string()
    }

    fn parse<T: FromStr>(&self, index: usize, field: &'static str) -> Result<T, ProtocolError> {
        let value = self.str(index, field)?;
        value.trim().parse().map_err(|_| ProtocolError::InvalidField {
            packet: self.packet,
            field,
            value: value.to_string(),
        })
    }

    /// Numeric field that falls back to `default` when absent.
    fn parse_or<T: FromStr>(
        &self,
        index: usize,
        field: &'static str,
        default: T,
    ) -> Result<T, ProtocolError> {
        match self.parts.get(index) {
            Some(value) if !value.is_empty() => self.parse(index, field),
            _ => Ok(default),
        }
    }

    /// Some servers send the packed attitude word as a signed integer.
    fn pbh(&self, index: usize) -> Result<PitchBankHeading, ProtocolError> {
        let raw: i64 = self.parse(index, "pbh")?;
        Ok(PitchBankHeading::unpack(raw as u32))
    }
}

fn parse_kill(body: &str) -> Result<Packet, ProtocolError> {
    let fields = Fields::splitn("KillRequest", body, 3);
    Ok(Packet::KillRequest {
        from: fields.string(0, "from")?,
        victim: fields.string(1, "victim")?,
        reason: fields.optional(2),
    })
}

fn parse_server_identification(body: &str) -> Result<Packet, ProtocolError> {
    let fields = Fields::split("ServerIdentification", body);
    Ok(Packet::ServerIdentification(ServerIdentification {
        from: fields.string(0, "from")?,
        to: fields.string(1, "to")?,
        version: fields.string(2, "version")?,
        challenge: fields.optional(3),
    }))
}

fn parse_client_identification(body: &str) -> Result<Packet, ProtocolError> {
    let fields = Fields::split("ClientIdentification", body);
    let client_id = fields.str(2, "client_id")?;
    Ok(Packet::ClientIdentification(ClientIdentification {
        from: fields.string(0, "from")?,
        to: fields.string(1, "to")?,
        client_id: u16::from_str_radix(client_id, 16).map_err(|_| {
            ProtocolError::InvalidField {
                packet: "ClientIdentification",
                field: "client_id",
                value: client_id.to_string(),
            }
        })?,
        client_name: fields.string(3, "client_name")?,
        major_version: fields.parse(4, "major_version")?,
        minor_version: fields.parse(5, "minor_version")?,
        cid: fields.string(6, "cid")?,
        system_uid: fields.optional(7),
    }))
}

fn parse_client_query(body: &str, packet: &'static str) -> Result<ClientQuery, ProtocolError> {
    let fields = Fields::splitn(packet, body, 4);
    let query = QueryType::from_wire(fields.str(2, "query_type")?);
    let rest = fields.parts.get(3).copied();

    let payload = match (&query, rest) {
        (_, None) => Vec::new(),
        (QueryType::AircraftConfiguration, Some(json)) => vec![json.to_string()],
        (_, Some(rest)) => rest.split(':').map(str::to_string).collect(),
    };

    Ok(ClientQuery {
        from: fields.string(0, "from")?,
        to: fields.string(1, "to")?,
        query,
        payload,
    })
}

fn parse_server_error(body: &str) -> Result<Packet, ProtocolError> {
    let fields = Fields::splitn("ServerError", body, 5);
    Ok(Packet::ServerError(ServerError {
        from: fields.string(0, "from")?,
        to: fields.optional(1),
        code: fields.parse(2, "code")?,
        parameter: fields.optional(3),
        message: fields.optional(4),
    }))
}

fn parse_ping(body: &str, is_ping: bool) -> Result<Packet, ProtocolError> {
    let fields = Fields::splitn(if is_ping { "Ping" } else { "Pong" }, body, 3);
    let from = fields.string(0, "from")?;
    let to = fields.string(1, "to")?;
    let timestamp = fields.optional(2);
    Ok(if is_ping {
        Packet::Ping {
            from,
            to,
            timestamp,
        }
    } else {
        Packet::Pong {
            from,
            to,
            timestamp,
        }
    })
}

fn parse_add_pilot(body: &str) -> Result<Packet, ProtocolError> {
    let fields = Fields::splitn("AddPilot", body, 8);
    Ok(Packet::AddPilot(AddPilot {
        callsign: fields.string(0, "callsign")?,
        to: fields.string(1, "to")?,
        cid: fields.string(2, "cid")?,
        password: fields.optional(3),
        rating: fields.parse(4, "rating")?,
        protocol_revision: fields.parse(5, "protocol_revision")?,
        sim_type: fields.parse_or(6, "sim_type", 0)?,
        real_name: fields.optional(7),
    }))
}

fn parse_add_atc(body: &str) -> Result<Packet, ProtocolError> {
    let fields = Fields::split("AddAtc", body);
    Ok(Packet::AddAtc(AddAtc {
        callsign: fields.string(0, "callsign")?,
        to: fields.string(1, "to")?,
        real_name: fields.optional(2),
        cid: fields.string(3, "cid")?,
        password: fields.optional(4),
        rating: fields.parse(5, "rating")?,
        protocol_revision: fields.parse_or(6, "protocol_revision", PROTOCOL_REVISION)?,
    }))
}

fn parse_delete(body: &str, pilot: bool) -> Result<Packet, ProtocolError> {
    let fields = Fields::split(if pilot { "DeletePilot" } else { "DeleteAtc" }, body);
    let callsign = fields.string(0, "callsign")?;
    let cid = fields.optional(1);
    Ok(if pilot {
        Packet::DeletePilot { callsign, cid }
    } else {
        Packet::DeleteAtc { callsign, cid }
    })
}

fn parse_text_message(body: &str) -> Result<Packet, ProtocolError> {
    let fields = Fields::splitn("TextMessage", body, 3);
    Ok(Packet::TextMessage(TextMessage {
        from: fields.string(0, "from")?,
        to: fields.string(1, "to")?,
        message: fields.optional(2),
    }))
}

fn parse_pilot_position(body: &str) -> Result<Packet, ProtocolError> {
    let fields = Fields::split("PilotPosition", body);
    let mode_field = fields.str(0, "mode")?;
    let mode = mode_field
        .chars()
        .next()
        .and_then(TransponderMode::from_wire)
        .ok_or_else(|| ProtocolError::InvalidField {
            packet: "PilotPosition",
            field: "mode",
            value: mode_field.to_string(),
        })?;
    let squawk_field = fields.str(2, "squawk")?;
    let squawk: Squawk = squawk_field
        .parse()
        .map_err(|_| ProtocolError::InvalidField {
            packet: "PilotPosition",
            field: "squawk",
            value: squawk_field.to_string(),
        })?;

    Ok(Packet::PilotPosition(PilotPosition {
        mode,
        callsign: fields.string(1, "callsign")?,
        squawk,
        rating: fields.parse(3, "rating")?,
        latitude: fields.parse(4, "latitude")?,
        longitude: fields.parse(5, "longitude")?,
        true_altitude: fields.parse(6, "true_altitude")?,
        ground_speed: fields.parse(7, "ground_speed")?,
        attitude: fields.pbh(8)?,
        pressure_altitude_delta: fields.parse_or(9, "pressure_altitude_delta", 0)?,
    }))
}

fn parse_fast_position(body: &str) -> Result<Packet, ProtocolError> {
    let fields = Fields::split("FastPilotPosition", body);
    Ok(Packet::FastPilotPosition(FastPilotPosition {
        callsign: fields.string(0, "callsign")?,
        latitude: fields.parse(1, "latitude")?,
        longitude: fields.parse(2, "longitude")?,
        true_altitude: fields.parse(3, "true_altitude")?,
        altitude_agl: fields.parse(4, "altitude_agl")?,
        attitude: fields.pbh(5)?,
        velocity: [
            fields.parse(6, "velocity_x")?,
            fields.parse(7, "velocity_y")?,
            fields.parse(8, "velocity_z")?,
        ],
        rotation: [
            fields.parse(9, "pitch_rate")?,
            fields.parse(10, "heading_rate")?,
            fields.parse(11, "bank_rate")?,
        ],
        nose_gear_angle: fields.parse_or(12, "nose_gear_angle", 0.0)?,
    }))
}

fn parse_atc_position(body: &str) -> Result<Packet, ProtocolError> {
    let fields = Fields::split("AtcPosition", body);
    Ok(Packet::AtcPosition(AtcPosition {
        callsign: fields.string(0, "callsign")?,
        frequency: fields.parse(1, "frequency")?,
        facility: fields.parse(2, "facility")?,
        visibility_range: fields.parse(3, "visibility_range")?,
        rating: fields.parse(4, "rating")?,
        latitude: fields.parse(5, "latitude")?,
        longitude: fields.parse(6, "longitude")?,
        elevation: fields.parse_or(7, "elevation", 0)?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_server_identification() {
        let packet = parse_packet("$DISERVER:CLIENT:VATSIM FSD V3.43:d2a1c8f0e3\r\n").unwrap();
        match packet {
            Packet::ServerIdentification(p) => {
                assert_eq!(p.from, "SERVER");
                assert_eq!(p.version, "VATSIM FSD V3.43");
                assert_eq!(p.challenge, "d2a1c8f0e3");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_atc_position() {
        let packet = parse_packet("%EDDF_TWR:19900:4:50:5:50.03330:8.57050:0").unwrap();
        match packet {
            Packet::AtcPosition(p) => {
                assert_eq!(p.callsign, "EDDF_TWR");
                assert_eq!(p.frequency, 19900);
                assert_eq!(p.facility, 4);
                assert!((p.latitude - 50.0333).abs() < 1e-6);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_atc_position_rejects_bad_frequency() {
        let err = parse_packet("%EDDF_TWR:1x900:4:50:5:50.03330:8.57050:0").unwrap_err();
        assert_eq!(
            err,
            ProtocolError::InvalidField {
                packet: "AtcPosition",
                field: "frequency",
                value: "1x900".to_string()
            }
        );
    }

    #[test]
    fn test_parse_pilot_position_with_signed_pbh() {
        let packet = parse_packet("@N:DLH123:2000:1:50.0:8.5:3000:150:-8388608:25").unwrap();
        match packet {
            Packet::PilotPosition(p) => {
                assert_eq!(p.mode, TransponderMode::ModeC);
                assert_eq!(p.squawk.code(), 2000);
                assert_eq!(p.true_altitude, 3000);
                assert_eq!(p.pressure_altitude_delta, 25);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_pilot_position_missing_field() {
        let err = parse_packet("@N:DLH123:2000:1:50.0").unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::MissingField {
                field: "longitude",
                ..
            }
        ));
    }

    #[test]
    fn test_text_message_keeps_colons() {
        let packet = parse_packet("#TMEDDF_TWR:@19900:DLH123 time is 12:30:05").unwrap();
        match packet {
            Packet::TextMessage(p) => {
                assert_eq!(p.to, "@19900");
                assert_eq!(p.message, "DLH123 time is 12:30:05");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_acc_query_keeps_json_intact() {
        let packet =
            parse_packet(r#"$CQDLH123:N12345:ACC:{"request":"full"}"#).unwrap();
        match packet {
            Packet::ClientQuery(q) => {
                assert_eq!(q.query, QueryType::AircraftConfiguration);
                assert_eq!(q.payload, vec![r#"{"request":"full"}"#.to_string()]);
            }
            other => panic!("unexpected {other:?}"),
        }

        let packet = parse_packet(
            r#"$CQDLH123:@94836:ACC:{"config":{"lights":{"strobe_on":true}}}"#,
        )
        .unwrap();
        match packet {
            Packet::ClientQuery(q) => assert_eq!(q.payload.len(), 1),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_real_name_response_payload_split() {
        let packet = parse_packet("$CREDDF_TWR:N12345:RN:Jane Doe::5").unwrap();
        match packet {
            Packet::ClientResponse(q) => {
                assert_eq!(q.query, QueryType::RealName);
                assert_eq!(q.payload[0], "Jane Doe");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_kill_with_reason() {
        let packet = parse_packet("$!!SERVER:N12345:Disruptive behaviour: see forum").unwrap();
        assert_eq!(
            packet,
            Packet::KillRequest {
                from: "SERVER".to_string(),
                victim: "N12345".to_string(),
                reason: "Disruptive behaviour: see forum".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_server_error() {
        let packet = parse_packet("$ERserver:N12345:008:N12345:No flightplan").unwrap();
        match packet {
            Packet::ServerError(e) => {
                assert_eq!(e.code, 8);
                assert_eq!(e.message, "No flightplan");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_unknown_packet() {
        let err = parse_packet("$AXN12345:SERVER:METAR:KBOS").unwrap_err();
        assert_eq!(err, ProtocolError::UnknownPacket("$AX".to_string()));
        assert!(err.is_unmodelled());
        assert_eq!(parse_packet("   "), Err(ProtocolError::Empty));
    }

    #[test]
    fn test_encoded_packets_decode_to_same_value() {
        let lines = [
            "#AAN12345:SERVER:Jane Doe:1234567:secret:1:100",
            "#DPN12345:1234567",
            "$PISERVER:N12345:1700000000",
            "$CQN12345:SERVER:IP",
            "#TMN12345:@22800:hello there",
        ];
        for line in lines {
            let packet = parse_packet(line).unwrap();
            assert_eq!(packet.to_string(), line);
        }
    }
}
