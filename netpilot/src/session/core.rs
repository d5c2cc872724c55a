//! Sans-IO session core.
//!
//! [`Session`] owns every piece of session state: the connection state
//! machine, the station registry, the configuration synchronizer, the alias
//! resolver and the radio message router. It performs no I/O. Callers feed it
//! inbound lines, aircraft snapshots, timer ticks and operator requests, then
//! drain the resulting [`Output`]s and carry them out (write packets, publish
//! notifications, drive voice and simulator).
//!
//! Because all mutation goes through `&mut self`, a single owner (the
//! [`SessionDaemon`](super::SessionDaemon) task) gives the single-writer
//! discipline the timers and packet handlers rely on.

use std::collections::hash_map::DefaultHasher;
use std::collections::VecDeque;
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};

use super::alias_resolver::AliasResolver;
use super::config::{ConnectProfile, SessionConfig, CLIENT_ID, CLIENT_NAME};
use super::error::SessionError;
use super::notification::Notification;
use super::position::{fast_pilot_position, periodic_position};
use super::router::{RadioMessageRouter, RouteDecision};
use super::state::{ConnectionState, DisconnectReason, Role};
use super::sync::{ConfigurationSynchronizer, SyncOutcome};
use crate::aircraft::{
    AircraftConfiguration, ConfigurationMessage, LocalAircraftState, OperatorIntent, Radio,
    RadioStackState, Squawk,
};
use crate::capabilities::{SimulatorCommand, VoiceCommand};
use crate::frequency::{hz_to_wire, normalize_25khz};
use crate::protocol::{
    parse_packet, AddAtc, AddPilot, AtcPosition, ClientIdentification, ClientQuery,
    ErrorSeverity, Packet, QueryType, ServerError, ServerErrorCode, ServerIdentification,
    TextMessage, ALL_CLIENTS, BROADCAST, PROTOCOL_REVISION, SERVER_CALLSIGN,
};
use crate::registry::{AliasStation, ControllerChange, StationRegistry};

/// Rating observers register with.
const OBSERVER_RATING: u8 = 1;

/// Simulator type reported in `#AP`.
const SIM_TYPE: u8 = 0;

/// Capability flags answered to `CAPS` queries.
const CAPABILITIES: &str = "ACCONFIG=1";

/// Transport action for the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCommand {
    Open { address: String, timeout: Duration },
    Close,
}

/// Work produced by the core for the driver to carry out, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Send(Packet),
    Notify(Notification),
    Voice(VoiceCommand),
    Simulator(SimulatorCommand),
    Transport(TransportCommand),
    /// Start the periodic position timer at this interval, or stop it.
    PositionTimer(Option<Duration>),
}

/// Facts about the current session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionInfo {
    pub callsign: String,
    pub role: Role,
    pub server: String,
    pub protocol_revision: u32,
    /// Public address as reported by the server.
    pub public_ip: Option<String>,
    pub started_at: Instant,
    /// Time of the last inbound line.
    pub last_activity: Instant,
}

/// The session engine.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    state: ConnectionState,
    profile: ConnectProfile,
    info: Option<SessionInfo>,
    registry: StationRegistry,
    sync: ConfigurationSynchronizer,
    resolver: AliasResolver,
    router: RadioMessageRouter,
    aircraft: Option<LocalAircraftState>,
    intent: OperatorIntent,
    radio_stack: Option<RadioStackState>,
    voice_connected: bool,
    outputs: VecDeque<Output>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let profile = config.profile.clone();
        let intent = OperatorIntent {
            push_to_talk: false,
            receive_only: config.receive_only,
        };
        Self {
            router: RadioMessageRouter::new(&profile.callsign, profile.selcal.as_deref()),
            config,
            state: ConnectionState::Disconnected,
            profile,
            info: None,
            registry: StationRegistry::new(),
            sync: ConfigurationSynchronizer::default(),
            resolver: AliasResolver::new(),
            aircraft: None,
            intent,
            radio_stack: None,
            voice_connected: false,
            outputs: VecDeque::new(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    /// Connected as an observer rather than a pilot.
    pub fn is_observer(&self) -> bool {
        self.state.is_connected() && self.profile.role.is_observer()
    }

    pub fn info(&self) -> Option<&SessionInfo> {
        self.info.as_ref()
    }

    pub fn registry(&self) -> &StationRegistry {
        &self.registry
    }

    pub fn radio_stack(&self) -> Option<&RadioStackState> {
        self.radio_stack.as_ref()
    }

    pub fn aircraft(&self) -> Option<&LocalAircraftState> {
        self.aircraft.as_ref()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Configuration tokens left.
    pub fn configuration_tokens(&self) -> u32 {
        self.sync.tokens()
    }

    /// Next pending output.
    pub fn poll_output(&mut self) -> Option<Output> {
        self.outputs.pop_front()
    }

    /// All pending outputs, oldest first.
    pub fn drain_outputs(&mut self) -> Vec<Output> {
        self.outputs.drain(..).collect()
    }

    // =========================================================================
    // Connection lifecycle
    // =========================================================================

    /// Start a session against `server` (`host:port`).
    ///
    /// Uses the configured profile unless one is given.
    pub fn connect(
        &mut self,
        profile: Option<ConnectProfile>,
        server: &str,
        now: Instant,
    ) -> Result<(), SessionError> {
        if !self.state.accepts_connect() {
            return Err(SessionError::InvalidState {
                operation: "connect",
                state: self.state,
            });
        }
        let profile = profile.unwrap_or_else(|| self.config.profile.clone());
        validate_profile(&profile)?;

        self.router = RadioMessageRouter::new(&profile.callsign, profile.selcal.as_deref());
        self.info = Some(SessionInfo {
            callsign: profile.callsign.clone(),
            role: profile.role,
            server: server.to_string(),
            protocol_revision: PROTOCOL_REVISION,
            public_ip: None,
            started_at: now,
            last_activity: now,
        });
        self.profile = profile;
        self.registry.clear_controllers();
        self.sync.reset();
        self.resolver.reset();

        self.transition(ConnectionState::Connecting);
        self.push(Output::Transport(TransportCommand::Open {
            address: server.to_string(),
            timeout: self.config.connect_timeout,
        }));
        self.notify(Notification::ConnectionInitiated {
            server: server.to_string(),
        });
        Ok(())
    }

    /// The socket is open; wait for the server to identify itself.
    pub fn on_transport_opened(&mut self) {
        if self.state == ConnectionState::Connecting {
            self.transition(ConnectionState::Identifying);
        } else {
            tracing::debug!(state = %self.state, "Transport opened in unexpected state");
        }
    }

    /// The transport is gone, with the error if it failed.
    pub fn on_transport_closed(&mut self, error: Option<String>) {
        match self.state {
            ConnectionState::Connecting | ConnectionState::Identifying => {
                let reason = error.unwrap_or_else(|| "Connection closed by server".to_string());
                self.fail(reason);
            }
            ConnectionState::Connected => {
                tracing::warn!(error = ?error, "Connection lost");
                self.finish(DisconnectReason::Other);
            }
            ConnectionState::Disconnecting => self.finish(DisconnectReason::Intentional),
            ConnectionState::Disconnected | ConnectionState::ForciblyDisconnected => {
                tracing::trace!("Transport close after session end ignored");
            }
        }
    }

    /// Leave the network gracefully.
    pub fn disconnect(&mut self) -> Result<(), SessionError> {
        if !self.state.is_connected() {
            return Err(SessionError::InvalidState {
                operation: "disconnect",
                state: self.state,
            });
        }

        let callsign = self.profile.callsign.clone();
        let cid = self.profile.cid.clone();
        let goodbye = if self.profile.role.is_observer() {
            Packet::DeleteAtc { callsign, cid }
        } else {
            Packet::DeletePilot { callsign, cid }
        };
        self.send(goodbye);
        self.push(Output::PositionTimer(None));
        self.transition(ConnectionState::Disconnecting);
        self.push(Output::Transport(TransportCommand::Close));
        Ok(())
    }

    fn transition(&mut self, next: ConnectionState) {
        let previous = std::mem::replace(&mut self.state, next);
        if previous != next {
            tracing::info!(from = %previous, to = %next, "Connection state changed");
        }
    }

    /// End a session that never got established.
    fn fail(&mut self, reason: String) {
        tracing::warn!(reason = %reason, "Connection failed");
        self.teardown();
        self.transition(ConnectionState::Disconnected);
        self.notify(Notification::ConnectionFailed { reason });
    }

    /// End an established session.
    fn finish(&mut self, reason: DisconnectReason) {
        self.teardown();
        let next = match reason {
            DisconnectReason::Forcible { .. } => ConnectionState::ForciblyDisconnected,
            _ => ConnectionState::Disconnected,
        };
        self.transition(next);
        self.notify(Notification::Disconnected { reason });
    }

    /// Server-initiated end of the session.
    fn end_forcibly(&mut self, reason: String) {
        if !self.state.is_active() {
            return;
        }
        tracing::warn!(reason = %reason, "Forcibly disconnected by server");
        self.push(Output::Transport(TransportCommand::Close));
        self.finish(DisconnectReason::Forcible { reason });
    }

    fn teardown(&mut self) {
        self.push(Output::PositionTimer(None));
        if self.voice_connected {
            self.voice_connected = false;
            self.push(Output::Voice(VoiceCommand::Disconnect));
        }
        self.registry.clear_controllers();
        self.resolver.reset();
        self.info = None;
    }

    // =========================================================================
    // Inbound packets
    // =========================================================================

    /// Process one line received from the server.
    pub fn handle_line(&mut self, line: &str, now: Instant) {
        if !self.state.is_active() {
            return;
        }
        if let Some(info) = self.info.as_mut() {
            info.last_activity = now;
        }

        match parse_packet(line) {
            Ok(packet) => self.handle_packet(packet, now),
            Err(e) if e.is_unmodelled() => {
                tracing::trace!(error = %e, "Unhandled packet type");
            }
            Err(e) => {
                tracing::warn!(error = %e, line, "Malformed packet ignored");
            }
        }
    }

    /// Process one decoded packet.
    pub fn handle_packet(&mut self, packet: Packet, now: Instant) {
        match packet {
            Packet::ServerIdentification(identification) => {
                self.on_server_identification(identification)
            }
            Packet::KillRequest { victim, reason, .. } => {
                if self.is_me(&victim) {
                    self.end_forcibly(reason);
                }
            }
            Packet::ServerError(error) => self.on_server_error(error),
            other if !self.state.is_connected() => {
                tracing::trace!(kind = other.kind(), state = %self.state, "Packet before registration ignored");
            }
            Packet::AtcPosition(position) => self.on_atc_position(position, now),
            Packet::DeleteAtc { callsign, .. } => self.on_controller_deleted(&callsign),
            Packet::TextMessage(message) => self.on_text_message(message),
            Packet::ClientQuery(query) => self.on_client_query(query),
            Packet::ClientResponse(response) => self.on_client_response(response),
            Packet::Ping {
                from,
                to,
                timestamp,
            } => {
                if self.is_me(&to) || to == BROADCAST {
                    self.send(Packet::Pong {
                        from: self.profile.callsign.clone(),
                        to: from,
                        timestamp,
                    });
                }
            }
            other => {
                tracing::trace!(kind = other.kind(), "Packet ignored");
            }
        }
    }

    fn on_server_identification(&mut self, identification: ServerIdentification) {
        if self.state != ConnectionState::Identifying {
            tracing::debug!(state = %self.state, "Unexpected server identification");
            return;
        }
        tracing::info!(server_version = %identification.version, "Server identified");

        let profile = self.profile.clone();
        self.send(Packet::ClientIdentification(ClientIdentification {
            from: profile.callsign.clone(),
            to: SERVER_CALLSIGN.to_string(),
            client_id: CLIENT_ID,
            client_name: CLIENT_NAME.to_string(),
            major_version: env!("CARGO_PKG_VERSION_MAJOR").parse().unwrap_or(0),
            minor_version: env!("CARGO_PKG_VERSION_MINOR").parse().unwrap_or(0),
            cid: profile.cid.clone(),
            system_uid: system_uid(&profile.cid),
        }));

        let registration = if profile.role.is_observer() {
            Packet::AddAtc(AddAtc {
                callsign: profile.callsign.clone(),
                to: SERVER_CALLSIGN.to_string(),
                real_name: profile.real_name.clone(),
                cid: profile.cid.clone(),
                password: profile.password.clone(),
                rating: OBSERVER_RATING,
                protocol_revision: PROTOCOL_REVISION,
            })
        } else {
            Packet::AddPilot(AddPilot {
                callsign: profile.callsign.clone(),
                to: SERVER_CALLSIGN.to_string(),
                cid: profile.cid.clone(),
                password: profile.password.clone(),
                rating: profile.rating,
                protocol_revision: PROTOCOL_REVISION,
                sim_type: SIM_TYPE,
                real_name: profile.real_name.clone(),
            })
        };
        self.send(registration);
        self.send(Packet::ClientQuery(ClientQuery::new(
            &profile.callsign,
            SERVER_CALLSIGN,
            QueryType::PublicIp,
            Vec::new(),
        )));

        self.transition(ConnectionState::Connected);
        self.send_periodic_position();
        self.push(Output::PositionTimer(Some(
            self.config.position_interval(profile.role),
        )));
        self.notify(Notification::Connected {
            callsign: profile.callsign.clone(),
        });

        self.voice_connected = true;
        self.push(Output::Voice(VoiceCommand::Connect {
            callsign: profile.callsign,
        }));
        self.refresh_radios(true);
    }

    fn on_server_error(&mut self, error: ServerError) {
        let code = ServerErrorCode::from_code(error.code);
        match code.severity() {
            ErrorSeverity::Suppressed => {
                tracing::trace!(code = error.code, message = %error.message, "Server error suppressed");
            }
            ErrorSeverity::Warning => {
                tracing::warn!(
                    code = error.code,
                    parameter = %error.parameter,
                    message = %error.message,
                    "Server error"
                );
                self.notify(Notification::ServerMessageReceived {
                    text: format!("Server error: {}", error.message),
                });
            }
            ErrorSeverity::Fatal => {
                tracing::error!(code = error.code, message = %error.message, "Fatal server error");
                self.end_forcibly(error.message);
            }
        }
    }

    fn on_atc_position(&mut self, position: AtcPosition, now: Instant) {
        if self.is_me(&position.callsign) {
            return;
        }
        let change = self.registry.upsert_controller(
            &position.callsign,
            position.frequency,
            position.latitude,
            position.longitude,
            now,
        );
        match change {
            ControllerChange::Added(controller) => {
                tracing::debug!(
                    callsign = %controller.callsign,
                    frequency = controller.frequency,
                    "Controller added"
                );
                self.send(Packet::ClientQuery(ClientQuery::new(
                    &self.profile.callsign,
                    &controller.callsign,
                    QueryType::RealName,
                    Vec::new(),
                )));
                self.notify(Notification::ControllerAdded(controller));
                self.refresh_aliases();
            }
            ControllerChange::Updated(controller) => {
                self.notify(Notification::ControllerUpdated(controller));
                self.refresh_aliases();
            }
            ControllerChange::Unchanged => {}
        }
    }

    fn on_controller_deleted(&mut self, callsign: &str) {
        if let Some(controller) = self.registry.remove_controller(callsign) {
            tracing::debug!(callsign = %controller.callsign, "Controller deleted");
            self.notify(Notification::ControllerDeleted {
                callsign: controller.callsign,
            });
            self.refresh_aliases();
        }
    }

    fn on_text_message(&mut self, message: TextMessage) {
        if let Some(frequencies) = message.radio_frequencies() {
            let Some(stack) = self.radio_stack else {
                tracing::trace!(from = %message.from, "Radio message before any aircraft state");
                return;
            };
            match self
                .router
                .route(&message.from, &frequencies, &message.message, &stack)
            {
                RouteDecision::Dropped => {}
                RouteDecision::Selcal { from, frequencies } => {
                    tracing::info!(from = %from, "SELCAL alert");
                    self.notify(Notification::SelcalAlertReceived { from, frequencies });
                }
                RouteDecision::Message {
                    from,
                    frequencies,
                    text,
                    is_direct,
                } => {
                    tracing::debug!(from = %from, is_direct, "Radio message received");
                    self.notify(Notification::RadioMessageReceived {
                        from,
                        frequencies,
                        text,
                        is_direct,
                    });
                }
            }
            return;
        }

        if message.from.eq_ignore_ascii_case(SERVER_CALLSIGN) {
            self.notify(Notification::ServerMessageReceived {
                text: message.message,
            });
        } else if self.is_me(&message.to) {
            self.notify(Notification::PrivateMessageReceived {
                from: message.from,
                text: message.message,
            });
        } else {
            tracing::trace!(to = %message.to, "Text message not for us");
        }
    }

    fn on_client_query(&mut self, query: ClientQuery) {
        if !self.is_me(&query.to) {
            return;
        }
        match query.query {
            QueryType::AircraftConfiguration => {
                let Some(payload) = query.payload.first() else {
                    tracing::debug!(from = %query.from, "Empty aircraft configuration query");
                    return;
                };
                match ConfigurationMessage::decode(payload) {
                    Ok(ConfigurationMessage::RequestFull) => {
                        if let Some(full) = self.sync.full_configuration() {
                            tracing::debug!(to = %query.from, "Sending full aircraft configuration");
                            self.send_configuration(&query.from, full);
                        }
                    }
                    Ok(ConfigurationMessage::Update(_)) => {
                        tracing::trace!(from = %query.from, "Peer configuration ignored");
                    }
                    Err(e) => {
                        tracing::warn!(from = %query.from, error = %e, "Bad configuration query");
                    }
                }
            }
            QueryType::RealName => {
                let payload = vec![
                    self.profile.real_name.clone(),
                    String::new(),
                    self.profile.rating.to_string(),
                ];
                self.respond(&query.from, QueryType::RealName, payload);
            }
            QueryType::Capabilities => {
                self.respond(
                    &query.from,
                    QueryType::Capabilities,
                    vec![CAPABILITIES.to_string()],
                );
            }
            other => {
                tracing::trace!(query = other.as_wire(), from = %query.from, "Query ignored");
            }
        }
    }

    fn on_client_response(&mut self, response: ClientQuery) {
        if !self.is_me(&response.to) {
            return;
        }
        match response.query {
            QueryType::PublicIp if response.from.eq_ignore_ascii_case(SERVER_CALLSIGN) => {
                let address = response.payload.first().cloned();
                tracing::debug!(public_ip = ?address, "Public IP received");
                if let Some(info) = self.info.as_mut() {
                    info.public_ip = address;
                }
            }
            QueryType::RealName => {
                let Some(name) = response.payload.first().filter(|n| !n.trim().is_empty())
                else {
                    return;
                };
                if let Some(controller) = self.registry.set_real_name(&response.from, name) {
                    self.notify(Notification::ControllerUpdated(controller));
                }
            }
            other => {
                tracing::trace!(query = other.as_wire(), from = %response.from, "Response ignored");
            }
        }
    }

    // =========================================================================
    // Aircraft state and timers
    // =========================================================================

    /// Take a fresh snapshot from the simulator.
    pub fn update_aircraft(&mut self, state: LocalAircraftState) {
        let connected = self.state.is_connected();
        if connected && !self.profile.role.is_observer() {
            let fast = fast_pilot_position(&self.profile.callsign, &state);
            self.send(Packet::FastPilotPosition(fast));
        }

        let config = AircraftConfiguration::from_state(&state);
        self.aircraft = Some(state);
        match self.sync.observe(config, connected) {
            SyncOutcome::Send(delta) => self.send_configuration(ALL_CLIENTS, delta),
            SyncOutcome::Throttled => {
                tracing::debug!("Configuration broadcast deferred until the next token");
            }
            SyncOutcome::Baseline | SyncOutcome::Unchanged => {}
        }

        self.refresh_radios(false);
    }

    /// Periodic position timer fired.
    pub fn on_position_tick(&mut self) {
        self.send_periodic_position();
    }

    /// Token refill timer fired.
    pub fn on_refill_tick(&mut self) {
        if !self.state.is_active() {
            return;
        }
        if let Some(delta) = self.sync.on_refill(self.state.is_connected()) {
            self.send_configuration(ALL_CLIENTS, delta);
        }
    }

    /// Maintenance timer fired: drop silent controllers and re-resolve aliases.
    pub fn on_maintenance_tick(&mut self, now: Instant) {
        if !self.state.is_connected() {
            return;
        }
        let stale = self
            .registry
            .prune_stale(now, self.config.controller_timeout);
        for controller in stale {
            tracing::debug!(callsign = %controller.callsign, "Controller timed out");
            self.notify(Notification::ControllerDeleted {
                callsign: controller.callsign,
            });
        }
        self.refresh_aliases();
    }

    /// Replace the alias station table.
    pub fn set_alias_stations(&mut self, stations: Vec<AliasStation>) {
        let count = stations.len();
        if self.registry.replace_alias_stations(stations) {
            tracing::debug!(count, "Alias station table replaced");
            self.refresh_aliases();
        }
    }

    fn send_periodic_position(&mut self) {
        if !self.state.is_connected() {
            return;
        }
        let Some(aircraft) = self.aircraft.as_ref() else {
            tracing::trace!("No aircraft state yet, position skipped");
            return;
        };
        let packet = periodic_position(
            self.profile.role,
            &self.profile.callsign,
            self.profile.rating,
            aircraft,
        );
        self.send(packet);
    }

    fn send_configuration(&mut self, to: &str, config: AircraftConfiguration) {
        match ConfigurationMessage::Update(config).encode() {
            Ok(json) => self.send(Packet::ClientQuery(ClientQuery::new(
                &self.profile.callsign,
                to,
                QueryType::AircraftConfiguration,
                vec![json],
            ))),
            Err(e) => tracing::warn!(error = %e, "Failed to encode aircraft configuration"),
        }
    }

    fn respond(&mut self, to: &str, query: QueryType, payload: Vec<String>) {
        let packet = Packet::ClientResponse(ClientQuery::new(
            &self.profile.callsign,
            to,
            query,
            payload,
        ));
        self.send(packet);
    }

    // =========================================================================
    // Radios and voice
    // =========================================================================

    pub fn set_push_to_talk(&mut self, active: bool) {
        self.intent.push_to_talk = active;
        self.refresh_radios(false);
    }

    pub fn set_receive_only(&mut self, receive_only: bool) {
        self.intent.receive_only = receive_only;
        self.refresh_radios(false);
    }

    fn refresh_radios(&mut self, force: bool) {
        let Some(aircraft) = self.aircraft.as_ref() else {
            return;
        };
        let stack = RadioStackState::derive(aircraft, self.intent);
        let changed = self.radio_stack != Some(stack);
        if changed {
            self.radio_stack = Some(stack);
            self.notify(Notification::RadioStackChanged(stack));
        }
        if !self.voice_connected {
            return;
        }

        if changed || force {
            for radio in Radio::ALL {
                let gain = if stack.is_receiving(radio) {
                    self.config.radio_gains[radio.index()]
                } else {
                    0.0
                };
                self.push(Output::Voice(VoiceCommand::SetRadioGain { radio, gain }));
            }
            let transmitting = stack.transmitting_radio();
            self.push(Output::Voice(VoiceCommand::SetTransmitRadio(transmitting)));
            self.push(Output::Voice(VoiceCommand::SetPushToTalk(
                stack.intent.push_to_talk && transmitting.is_some(),
            )));
        }
        self.refresh_aliases();
    }

    fn refresh_aliases(&mut self) {
        if !self.voice_connected {
            return;
        }
        let Some(stack) = self.radio_stack else {
            return;
        };
        let updates = self.resolver.update(&self.registry, &stack);
        for update in updates {
            if update.frequency_changed {
                self.push(Output::Voice(VoiceCommand::SetStationFrequency {
                    radio: update.radio,
                    frequency_hz: update.resolution.effective_hz,
                }));
            }
            if update.alias_changed {
                tracing::debug!(
                    radio = %update.radio,
                    alias_hz = update.resolution.alias_hz,
                    "Frequency alias changed"
                );
                self.notify(Notification::FrequencyAliasChanged {
                    radio: update.radio,
                    frequency_hz: update.resolution.alias_hz,
                });
            }
        }
    }

    // =========================================================================
    // Operator requests
    // =========================================================================

    /// Transmit text on the frequency of the transmitting radio.
    pub fn send_radio_message(&mut self, text: &str) -> Result<(), SessionError> {
        self.require_connected()?;
        let stack = self.radio_stack.ok_or(SessionError::NoAircraftState)?;
        let radio = stack
            .transmitting_radio()
            .ok_or(SessionError::NoTransmittingRadio)?;
        let wire = hz_to_wire(normalize_25khz(stack.channel(radio).active_hz));
        self.send(Packet::TextMessage(TextMessage {
            from: self.profile.callsign.clone(),
            to: TextMessage::frequency_recipient(&[wire]),
            message: single_line(text),
        }));
        Ok(())
    }

    /// Send a private message to another callsign.
    pub fn send_private_message(&mut self, to: &str, text: &str) -> Result<(), SessionError> {
        self.require_connected()?;
        self.send(Packet::TextMessage(TextMessage {
            from: self.profile.callsign.clone(),
            to: to.trim().to_ascii_uppercase(),
            message: single_line(text),
        }));
        Ok(())
    }

    /// Ask the simulator to set the transponder code.
    pub fn set_transponder_code(&mut self, code: &str) -> Result<Squawk, SessionError> {
        let squawk: Squawk = code.parse()?;
        self.push(Output::Simulator(SimulatorCommand::SetTransponderCode(
            squawk,
        )));
        Ok(squawk)
    }

    /// Ask the simulator to tune a radio.
    pub fn tune_radio(&mut self, radio: Radio, frequency_hz: u32) {
        self.push(Output::Simulator(SimulatorCommand::TuneRadio {
            radio,
            frequency_hz,
        }));
    }

    /// Ask the simulator to select the transmit radio.
    pub fn select_transmit_radio(&mut self, radio: Radio) {
        self.push(Output::Simulator(SimulatorCommand::SelectTransmitRadio(
            radio,
        )));
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn require_connected(&self) -> Result<(), SessionError> {
        if self.state.is_connected() {
            Ok(())
        } else {
            Err(SessionError::NotConnected)
        }
    }

    fn is_me(&self, callsign: &str) -> bool {
        callsign.eq_ignore_ascii_case(&self.profile.callsign)
    }

    fn send(&mut self, packet: Packet) {
        self.outputs.push_back(Output::Send(packet));
    }

    fn notify(&mut self, notification: Notification) {
        self.outputs.push_back(Output::Notify(notification));
    }

    fn push(&mut self, output: Output) {
        self.outputs.push_back(output);
    }
}

fn validate_profile(profile: &ConnectProfile) -> Result<(), SessionError> {
    let callsign = profile.callsign.trim();
    if callsign.is_empty() {
        return Err(SessionError::InvalidProfile("callsign is empty".to_string()));
    }
    let valid_chars = callsign
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if callsign.len() > 10 || !valid_chars {
        return Err(SessionError::InvalidProfile(format!(
            "callsign '{callsign}' must be up to 10 letters, digits, '_' or '-'"
        )));
    }
    if profile.cid.contains(':') || profile.password.contains(':') {
        return Err(SessionError::InvalidProfile(
            "CID and password may not contain ':'".to_string(),
        ));
    }
    Ok(())
}

/// Text fields cannot carry line breaks.
fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

/// Stable per-account identifier for `$ID`.
fn system_uid(cid: &str) -> String {
    let mut hasher = DefaultHasher::new();
    CLIENT_NAME.hash(&mut hasher);
    cid.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}
