//! Async driver for the session core.
//!
//! [`SessionDaemon`] owns a [`Session`] and runs it on one task: inbound
//! lines, aircraft snapshots, operator commands and the three timers
//! (position, token refill, maintenance) all arrive through one
//! `tokio::select!` loop, so the core never sees concurrent callers. TCP I/O
//! runs on separate reader and writer tasks that only exchange lines with
//! the loop.
//!
//! ```text
//!  SessionHandle ──commands──►┐
//!  telemetry ─────aircraft───►│ SessionDaemon ──lines──► writer task ──► TCP
//!  reader task ───events─────►│   (Session)   ──notifications──► broadcast
//!  timers ────────ticks──────►┘               ──voice / sim──► capabilities
//! ```

use std::time::{Duration, Instant};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::config::{ConnectProfile, SessionConfig, MAINTENANCE_INTERVAL};
use super::core::{Output, Session, TransportCommand};
use super::error::{SessionError, TransportError};
use super::notification::Notification;
use super::packet_log::PacketLog;
use super::state::ConnectionState;
use super::token_bucket::CONFIG_TOKEN_REFILL_INTERVAL;
use crate::aircraft::{LocalAircraftState, Radio, Squawk};
use crate::capabilities::{SimulatorLink, VoiceClient};
use crate::registry::AliasStation;

/// Notification channel capacity.
const NOTIFICATION_CAPACITY: usize = 256;

/// Operator command channel capacity.
const COMMAND_CAPACITY: usize = 32;

/// Aircraft snapshot channel capacity.
const AIRCRAFT_CAPACITY: usize = 64;

/// How long shutdown waits for the delete packet to be flushed.
const SHUTDOWN_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

type Reply<T> = oneshot::Sender<Result<T, SessionError>>;

/// Operator requests carried to the daemon task.
#[derive(Debug)]
enum SessionCommand {
    Connect {
        profile: Option<ConnectProfile>,
        server: String,
        reply: Reply<()>,
    },
    Disconnect {
        reply: Reply<()>,
    },
    SendRadioMessage {
        text: String,
        reply: Reply<()>,
    },
    SendPrivateMessage {
        to: String,
        text: String,
        reply: Reply<()>,
    },
    SetTransponderCode {
        code: String,
        reply: Reply<Squawk>,
    },
    TuneRadio {
        radio: Radio,
        frequency_hz: u32,
    },
    SelectTransmitRadio(Radio),
    SetPushToTalk(bool),
    SetReceiveOnly(bool),
    SetAliasStations(Vec<AliasStation>),
}

/// What the I/O tasks report back.
#[derive(Debug)]
enum TransportEventKind {
    Opened(mpsc::UnboundedSender<String>),
    Line(String),
    /// Reader side ended, with the error if it failed.
    Closed(Option<String>),
    /// Writer drained its queue after a requested close.
    WriterFinished,
}

#[derive(Debug)]
struct TransportEvent {
    generation: u64,
    kind: TransportEventKind,
}

/// The live transport of the current session.
struct Connection {
    generation: u64,
    writer: Option<mpsc::UnboundedSender<String>>,
    task: JoinHandle<()>,
}

/// Cloneable handle to a running [`SessionDaemon`].
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    aircraft: mpsc::Sender<LocalAircraftState>,
    notifications: broadcast::Sender<Notification>,
    state: watch::Receiver<ConnectionState>,
}

impl SessionHandle {
    /// Subscribe to session notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Receiver that observes every state change.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Sender for simulator snapshots, for feeding from another task.
    pub fn aircraft_sender(&self) -> mpsc::Sender<LocalAircraftState> {
        self.aircraft.clone()
    }

    /// Connect with the configured profile.
    pub async fn connect(&self, server: &str) -> Result<(), SessionError> {
        self.connect_with(None, server).await
    }

    /// Connect with an explicit profile.
    pub async fn connect_with(
        &self,
        profile: Option<ConnectProfile>,
        server: &str,
    ) -> Result<(), SessionError> {
        let server = server.to_string();
        self.request(|reply| SessionCommand::Connect {
            profile,
            server,
            reply,
        })
        .await
    }

    pub async fn disconnect(&self) -> Result<(), SessionError> {
        self.request(|reply| SessionCommand::Disconnect { reply })
            .await
    }

    pub async fn send_radio_message(&self, text: &str) -> Result<(), SessionError> {
        let text = text.to_string();
        self.request(|reply| SessionCommand::SendRadioMessage { text, reply })
            .await
    }

    pub async fn send_private_message(&self, to: &str, text: &str) -> Result<(), SessionError> {
        let (to, text) = (to.to_string(), text.to_string());
        self.request(|reply| SessionCommand::SendPrivateMessage { to, text, reply })
            .await
    }

    pub async fn set_transponder_code(&self, code: &str) -> Result<Squawk, SessionError> {
        let code = code.to_string();
        self.request(|reply| SessionCommand::SetTransponderCode { code, reply })
            .await
    }

    pub async fn tune_radio(&self, radio: Radio, frequency_hz: u32) -> Result<(), SessionError> {
        self.post(SessionCommand::TuneRadio {
            radio,
            frequency_hz,
        })
        .await
    }

    pub async fn select_transmit_radio(&self, radio: Radio) -> Result<(), SessionError> {
        self.post(SessionCommand::SelectTransmitRadio(radio)).await
    }

    pub async fn set_push_to_talk(&self, active: bool) -> Result<(), SessionError> {
        self.post(SessionCommand::SetPushToTalk(active)).await
    }

    pub async fn set_receive_only(&self, receive_only: bool) -> Result<(), SessionError> {
        self.post(SessionCommand::SetReceiveOnly(receive_only))
            .await
    }

    pub async fn set_alias_stations(&self, stations: Vec<AliasStation>) -> Result<(), SessionError> {
        self.post(SessionCommand::SetAliasStations(stations)).await
    }

    /// Push a simulator snapshot.
    pub async fn update_aircraft(&self, state: LocalAircraftState) -> Result<(), SessionError> {
        self.aircraft
            .send(state)
            .await
            .map_err(|_| SessionError::ChannelClosed)
    }

    async fn post(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| SessionError::ChannelClosed)
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> SessionCommand,
    ) -> Result<T, SessionError> {
        let (reply, response) = oneshot::channel();
        self.post(build(reply)).await?;
        response.await.map_err(|_| SessionError::ChannelClosed)?
    }
}

/// Runs a [`Session`] against TCP and the capability implementations.
pub struct SessionDaemon {
    session: Session,
    voice: Box<dyn VoiceClient>,
    simulator: Box<dyn SimulatorLink>,
    commands: mpsc::Receiver<SessionCommand>,
    aircraft: mpsc::Receiver<LocalAircraftState>,
    notifications: broadcast::Sender<Notification>,
    state: watch::Sender<ConnectionState>,
    transport_tx: mpsc::UnboundedSender<TransportEvent>,
    transport_rx: mpsc::UnboundedReceiver<TransportEvent>,
    connection: Option<Connection>,
    packet_log: Option<PacketLog>,
    position_timer: Option<Interval>,
    next_generation: u64,
}

impl SessionDaemon {
    /// Create the daemon and its handle. Nothing runs until [`start`](Self::start).
    pub fn new(
        config: SessionConfig,
        voice: Box<dyn VoiceClient>,
        simulator: Box<dyn SimulatorLink>,
    ) -> (Self, SessionHandle) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (aircraft_tx, aircraft_rx) = mpsc::channel(AIRCRAFT_CAPACITY);
        let (notifications, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        let (transport_tx, transport_rx) = mpsc::unbounded_channel();

        let handle = SessionHandle {
            commands: command_tx,
            aircraft: aircraft_tx,
            notifications: notifications.clone(),
            state: state_rx,
        };
        let daemon = Self {
            session: Session::new(config),
            voice,
            simulator,
            commands: command_rx,
            aircraft: aircraft_rx,
            notifications,
            state: state_tx,
            transport_tx,
            transport_rx,
            connection: None,
            packet_log: None,
            position_timer: None,
            next_generation: 0,
        };
        (daemon, handle)
    }

    /// Start the daemon as an async task.
    pub fn start(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run(shutdown).await;
        })
    }

    async fn run(mut self, shutdown: CancellationToken) {
        tracing::info!("Session daemon started");

        let mut refill = delayed_interval(CONFIG_TOKEN_REFILL_INTERVAL);
        let mut maintenance = delayed_interval(MAINTENANCE_INTERVAL);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    self.shut_down().await;
                    break;
                }
                command = self.commands.recv() => {
                    match command {
                        Some(command) => self.on_command(command),
                        None => {
                            tracing::debug!("All session handles dropped, stopping");
                            self.shut_down().await;
                            break;
                        }
                    }
                }
                Some(event) = self.transport_rx.recv() => {
                    self.on_transport_event(event);
                }
                Some(state) = self.aircraft.recv() => {
                    self.session.update_aircraft(state);
                }
                _ = tick(&mut self.position_timer) => {
                    self.session.on_position_tick();
                }
                _ = refill.tick() => {
                    self.session.on_refill_tick();
                }
                _ = maintenance.tick() => {
                    self.session.on_maintenance_tick(Instant::now());
                }
            }
            self.process_outputs();
        }

        tracing::info!("Session daemon stopped");
    }

    /// Leave gracefully if connected, then drop the transport.
    async fn shut_down(&mut self) {
        if self.session.is_connected() {
            if let Err(e) = self.session.disconnect() {
                tracing::debug!(error = %e, "Disconnect on shutdown failed");
            }
            self.process_outputs();
            self.await_transport_close().await;
        }
        if let Some(connection) = self.connection.take() {
            drop(connection.writer);
            connection.task.abort();
        }
        self.packet_log = None;
    }

    /// Keep handling transport events until the connection is gone or the
    /// flush timeout passes.
    async fn await_transport_close(&mut self) {
        let deadline = tokio::time::sleep(SHUTDOWN_FLUSH_TIMEOUT);
        tokio::pin!(deadline);

        while self.connection.is_some() {
            tokio::select! {
                _ = &mut deadline => {
                    tracing::debug!("Transport did not close in time");
                    break;
                }
                Some(event) = self.transport_rx.recv() => {
                    self.on_transport_event(event);
                    self.process_outputs();
                }
            }
        }
    }

    fn on_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Connect {
                profile,
                server,
                reply,
            } => {
                let result = self.session.connect(profile, &server, Instant::now());
                self.reply(reply, result);
            }
            SessionCommand::Disconnect { reply } => {
                let result = self.session.disconnect();
                self.reply(reply, result);
            }
            SessionCommand::SendRadioMessage { text, reply } => {
                let result = self.session.send_radio_message(&text);
                self.reply(reply, result);
            }
            SessionCommand::SendPrivateMessage { to, text, reply } => {
                let result = self.session.send_private_message(&to, &text);
                self.reply(reply, result);
            }
            SessionCommand::SetTransponderCode { code, reply } => {
                let result = self.session.set_transponder_code(&code);
                self.reply(reply, result);
            }
            SessionCommand::TuneRadio {
                radio,
                frequency_hz,
            } => self.session.tune_radio(radio, frequency_hz),
            SessionCommand::SelectTransmitRadio(radio) => {
                self.session.select_transmit_radio(radio)
            }
            SessionCommand::SetPushToTalk(active) => self.session.set_push_to_talk(active),
            SessionCommand::SetReceiveOnly(receive_only) => {
                self.session.set_receive_only(receive_only)
            }
            SessionCommand::SetAliasStations(stations) => {
                self.session.set_alias_stations(stations)
            }
        }
    }

    /// Answer a request once its effects have been carried out.
    fn reply<T>(&mut self, reply: Reply<T>, result: Result<T, SessionError>) {
        self.process_outputs();
        let _ = reply.send(result);
    }

    fn on_transport_event(&mut self, event: TransportEvent) {
        let current = self.connection.as_ref().map(|c| c.generation);
        if current != Some(event.generation) {
            tracing::trace!(generation = event.generation, "Stale transport event dropped");
            return;
        }

        match event.kind {
            TransportEventKind::Opened(writer) => {
                if let Some(connection) = self.connection.as_mut() {
                    connection.writer = Some(writer);
                }
                self.session.on_transport_opened();
            }
            TransportEventKind::Line(line) => {
                if let Some(log) = self.packet_log.as_mut() {
                    log.received(&line);
                }
                self.session.handle_line(&line, Instant::now());
            }
            TransportEventKind::Closed(error) => {
                self.drop_connection();
                self.session.on_transport_closed(error);
            }
            TransportEventKind::WriterFinished => {
                self.drop_connection();
                self.session.on_transport_closed(None);
            }
        }
    }

    fn drop_connection(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.task.abort();
        }
        self.packet_log = None;
    }

    /// Carry out everything the core produced, in order.
    fn process_outputs(&mut self) {
        self.publish_state();
        while let Some(output) = self.session.poll_output() {
            match output {
                Output::Send(packet) => {
                    let line = packet.to_string();
                    if packet.is_position() {
                        tracing::trace!(kind = packet.kind(), "Sending packet");
                    } else {
                        tracing::debug!(kind = packet.kind(), "Sending packet");
                    }
                    self.write_line(line);
                }
                Output::Notify(notification) => {
                    // Subscribers see the state the notification describes.
                    self.publish_state();
                    // No subscribers is fine.
                    let _ = self.notifications.send(notification);
                }
                Output::Voice(command) => command.apply(self.voice.as_mut()),
                Output::Simulator(command) => command.apply(self.simulator.as_mut()),
                Output::Transport(TransportCommand::Open { address, timeout }) => {
                    self.open_transport(address, timeout);
                }
                Output::Transport(TransportCommand::Close) => self.close_transport(),
                Output::PositionTimer(period) => {
                    self.position_timer = period.map(delayed_interval);
                }
            }
        }
        self.publish_state();
    }

    fn publish_state(&self) {
        let next = self.session.state();
        self.state.send_if_modified(|state| {
            let changed = *state != next;
            *state = next;
            changed
        });
    }

    fn write_line(&mut self, line: String) {
        let Some(writer) = self.connection.as_ref().and_then(|c| c.writer.as_ref()) else {
            tracing::debug!("No open transport, packet dropped");
            return;
        };
        if let Some(log) = self.packet_log.as_mut() {
            log.sent(&line);
        }
        if writer.send(line).is_err() {
            tracing::debug!("Writer task gone, packet dropped");
        }
    }

    fn open_transport(&mut self, address: String, timeout: Duration) {
        self.drop_connection();
        self.next_generation += 1;
        let generation = self.next_generation;

        if let (Some(dir), Some(info)) = (
            self.session.config().packet_log_dir.as_ref(),
            self.session.info(),
        ) {
            match PacketLog::create(dir, &info.callsign, chrono::Utc::now()) {
                Ok(log) => {
                    tracing::debug!(path = %log.path().display(), "Packet log opened");
                    self.packet_log = Some(log);
                }
                Err(e) => tracing::warn!(error = %e, "Failed to open packet log"),
            }
        }

        tracing::info!(address = %address, "Connecting");
        let events = self.transport_tx.clone();
        let task = tokio::spawn(run_connection(address, timeout, generation, events));
        self.connection = Some(Connection {
            generation,
            writer: None,
            task,
        });
    }

    fn close_transport(&mut self) {
        match self.connection.as_mut() {
            Some(connection) if connection.writer.is_some() => {
                // The writer flushes what is queued, then reports back.
                connection.writer = None;
            }
            Some(_) => {
                // Still connecting: nothing to flush.
                self.drop_connection();
                self.session.on_transport_closed(None);
            }
            None => {}
        }
    }
}

/// Interval whose first tick is one period from now.
fn delayed_interval(period: Duration) -> Interval {
    let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// Tick an optional interval; pending forever when there is none.
async fn tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Connect, then read lines until the stream ends.
async fn run_connection(
    address: String,
    timeout: Duration,
    generation: u64,
    events: mpsc::UnboundedSender<TransportEvent>,
) {
    let send = |kind| {
        let _ = events.send(TransportEvent { generation, kind });
    };

    let stream = match tokio::time::timeout(timeout, TcpStream::connect(&address)).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(source)) => {
            let error = TransportError::Connect { address, source };
            send(TransportEventKind::Closed(Some(error.to_string())));
            return;
        }
        Err(_) => {
            let error = TransportError::Timeout { address };
            send(TransportEventKind::Closed(Some(error.to_string())));
            return;
        }
    };
    if let Err(e) = stream.set_nodelay(true) {
        tracing::debug!(error = %e, "Failed to set TCP_NODELAY");
    }

    let (reader, writer) = stream.into_split();
    let (line_tx, line_rx) = mpsc::unbounded_channel();
    tokio::spawn(run_writer(writer, line_rx, generation, events.clone()));
    send(TransportEventKind::Opened(line_tx));

    let error = read_lines(reader, &events, generation).await.err();
    send(TransportEventKind::Closed(error.map(|e| e.to_string())));
}

async fn read_lines(
    reader: OwnedReadHalf,
    events: &mpsc::UnboundedSender<TransportEvent>,
    generation: u64,
) -> Result<(), TransportError> {
    let mut lines = BufReader::new(reader).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        let event = TransportEvent {
            generation,
            kind: TransportEventKind::Line(line.to_string()),
        };
        if events.send(event).is_err() {
            break;
        }
    }
    Ok(())
}

/// Write queued lines until the queue closes, then shut the socket down.
async fn run_writer(
    mut writer: OwnedWriteHalf,
    mut lines: mpsc::UnboundedReceiver<String>,
    generation: u64,
    events: mpsc::UnboundedSender<TransportEvent>,
) {
    while let Some(line) = lines.recv().await {
        let result = async {
            writer.write_all(line.as_bytes()).await?;
            writer.write_all(b"\r\n").await?;
            writer.flush().await
        }
        .await;
        if let Err(e) = result {
            tracing::debug!(error = %e, "Transport write failed");
            return;
        }
    }
    if let Err(e) = writer.shutdown().await {
        tracing::debug!(error = %e, "Transport shutdown failed");
    }
    let _ = events.send(TransportEvent {
        generation,
        kind: TransportEventKind::WriterFinished,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{NoopSimulatorLink, NoopVoiceClient};
    use crate::session::ConnectProfile;

    fn config() -> SessionConfig {
        SessionConfig {
            connect_timeout: Duration::from_secs(2),
            ..SessionConfig::new(ConnectProfile {
                callsign: "N12345".to_string(),
                cid: "1234567".to_string(),
                ..Default::default()
            })
        }
    }

    async fn next_notification(rx: &mut broadcast::Receiver<Notification>) -> Notification {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("notification in time")
            .expect("channel open")
    }

    #[tokio::test]
    async fn test_connection_refused_reports_failure() {
        // Bind and drop to get a port nobody listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        drop(listener);

        let (daemon, handle) =
            SessionDaemon::new(config(), Box::new(NoopVoiceClient), Box::new(NoopSimulatorLink));
        let shutdown = CancellationToken::new();
        let task = daemon.start(shutdown.clone());
        let mut rx = handle.subscribe();

        handle.connect(&address).await.unwrap();
        assert!(matches!(
            next_notification(&mut rx).await,
            Notification::ConnectionInitiated { .. }
        ));
        assert!(matches!(
            next_notification(&mut rx).await,
            Notification::ConnectionFailed { .. }
        ));
        assert_eq!(handle.state(), ConnectionState::Disconnected);

        shutdown.cancel();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_disconnect_without_session_is_rejected() {
        let (daemon, handle) =
            SessionDaemon::new(config(), Box::new(NoopVoiceClient), Box::new(NoopSimulatorLink));
        let shutdown = CancellationToken::new();
        let task = daemon.start(shutdown.clone());

        assert!(matches!(
            handle.disconnect().await,
            Err(SessionError::InvalidState { .. })
        ));

        shutdown.cancel();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_handle_reports_closed_daemon() {
        let (daemon, handle) =
            SessionDaemon::new(config(), Box::new(NoopVoiceClient), Box::new(NoopSimulatorLink));
        drop(daemon);
        assert!(matches!(
            handle.set_push_to_talk(true).await,
            Err(SessionError::ChannelClosed)
        ));
    }

    #[tokio::test]
    async fn test_tick_without_interval_is_pending() {
        let mut none: Option<Interval> = None;
        let result = tokio::time::timeout(Duration::from_millis(20), tick(&mut none)).await;
        assert!(result.is_err());
    }
}
