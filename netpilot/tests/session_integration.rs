//! End-to-end tests of the session daemon against an in-process FSD server.

use std::time::Duration;

use netpilot::aircraft::{ComRadio, LocalAircraftState, Radio};
use netpilot::capabilities::{
    RecordingSimulatorLink, RecordingVoiceClient, SimulatorCommand, VoiceCommand,
};
use netpilot::registry::AliasStation;
use netpilot::session::{
    ConnectProfile, ConnectionState, DisconnectReason, Notification, SessionConfig,
    SessionDaemon, SessionHandle,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const TIMEOUT: Duration = Duration::from_secs(5);
const CALLSIGN: &str = "N12345";

// =============================================================================
// Fake server
// =============================================================================

struct FakeServer {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl FakeServer {
    async fn accept(listener: &TcpListener) -> Self {
        let (stream, _) = tokio::time::timeout(TIMEOUT, listener.accept())
            .await
            .expect("client connects in time")
            .unwrap();
        let (reader, writer) = stream.into_split();
        Self {
            lines: BufReader::new(reader).lines(),
            writer,
        }
    }

    async fn send(&mut self, line: &str) {
        self.writer
            .write_all(format!("{line}\r\n").as_bytes())
            .await
            .unwrap();
    }

    /// Next line starting with `prefix`, skipping everything else.
    async fn expect(&mut self, prefix: &str) -> String {
        loop {
            let line = tokio::time::timeout(TIMEOUT, self.lines.next_line())
                .await
                .unwrap_or_else(|_| panic!("no line starting with {prefix}"))
                .unwrap()
                .unwrap_or_else(|| panic!("stream closed waiting for {prefix}"));
            if line.starts_with(prefix) {
                return line;
            }
        }
    }

    /// Wait until the client closes its side.
    async fn expect_eof(&mut self) {
        loop {
            let line = tokio::time::timeout(TIMEOUT, self.lines.next_line())
                .await
                .expect("client closes in time");
            match line {
                Ok(Some(_)) => continue,
                _ => return,
            }
        }
    }
}

// =============================================================================
// Harness
// =============================================================================

struct Harness {
    handle: SessionHandle,
    notifications: broadcast::Receiver<Notification>,
    voice: RecordingVoiceClient,
    simulator: RecordingSimulatorLink,
    shutdown: CancellationToken,
    task: JoinHandle<()>,
}

impl Harness {
    fn start() -> Self {
        let profile = ConnectProfile {
            callsign: CALLSIGN.to_string(),
            cid: "1234567".to_string(),
            password: "secret".to_string(),
            real_name: "Jane Doe".to_string(),
            rating: 1,
            aircraft_type: "C172".to_string(),
            selcal: Some("AB-CD".to_string()),
            ..Default::default()
        };
        let config = SessionConfig {
            connect_timeout: Duration::from_secs(2),
            ..SessionConfig::new(profile)
        };

        let voice = RecordingVoiceClient::new();
        let simulator = RecordingSimulatorLink::new();
        let (daemon, handle) =
            SessionDaemon::new(config, Box::new(voice.clone()), Box::new(simulator.clone()));
        let shutdown = CancellationToken::new();
        let task = daemon.start(shutdown.clone());
        let notifications = handle.subscribe();

        Self {
            handle,
            notifications,
            voice,
            simulator,
            shutdown,
            task,
        }
    }

    /// Connect and complete the handshake.
    async fn connect(&mut self) -> (TcpListener, FakeServer) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();

        self.handle.connect(&address).await.unwrap();
        let mut server = FakeServer::accept(&listener).await;
        server.send("$DISERVER:CLIENT:TEST FSD:0123456789abcdef").await;

        let id = server.expect("$ID").await;
        assert!(id.starts_with(&format!("$ID{CALLSIGN}:SERVER:8ad3:netpilot:")));
        let add = server.expect("#AP").await;
        assert_eq!(add, format!("#AP{CALLSIGN}:SERVER:1234567:secret:1:100:0:Jane Doe"));
        let ip = server.expect("$CQ").await;
        assert_eq!(ip, format!("$CQ{CALLSIGN}:SERVER:IP"));

        self.wait_for(|n| matches!(n, Notification::Connected { .. }))
            .await;
        assert_eq!(self.handle.state(), ConnectionState::Connected);
        (listener, server)
    }

    async fn wait_for(&mut self, predicate: impl Fn(&Notification) -> bool) -> Notification {
        loop {
            let notification = tokio::time::timeout(TIMEOUT, self.notifications.recv())
                .await
                .expect("notification in time")
                .expect("notification channel open");
            if predicate(&notification) {
                return notification;
            }
        }
    }

    async fn stop(self) {
        self.shutdown.cancel();
        tokio::time::timeout(TIMEOUT, self.task)
            .await
            .expect("daemon stops in time")
            .unwrap();
    }
}

fn aircraft(com1_hz: u32) -> LocalAircraftState {
    LocalAircraftState {
        latitude: 50.0333,
        longitude: 8.5706,
        altitude_true: 364.0,
        altitude_pressure: 364.0,
        heading: 250.0,
        avionics_power: true,
        on_ground: true,
        radios: [
            ComRadio {
                active_hz: com1_hz,
                standby_hz: 121_800_000,
                power: true,
                receive_enabled: true,
            },
            ComRadio::default(),
        ],
        transmit_radio: Radio::Com1,
        ..Default::default()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_handshake_and_graceful_disconnect() {
    let mut harness = Harness::start();
    let (_listener, mut server) = harness.connect().await;

    harness.handle.disconnect().await.unwrap();
    let goodbye = server.expect("#DP").await;
    assert_eq!(goodbye, format!("#DP{CALLSIGN}:1234567"));
    server.expect_eof().await;
    drop(server);

    let notification = harness
        .wait_for(|n| matches!(n, Notification::Disconnected { .. }))
        .await;
    assert_eq!(
        notification,
        Notification::Disconnected {
            reason: DisconnectReason::Intentional
        }
    );
    assert_eq!(harness.handle.state(), ConnectionState::Disconnected);
    let voice = harness.voice.calls();
    assert!(voice.contains(&VoiceCommand::Connect {
        callsign: CALLSIGN.to_string()
    }));
    assert!(voice.contains(&VoiceCommand::Disconnect));

    harness.stop().await;
}

#[tokio::test]
async fn test_position_reports_after_aircraft_update() {
    let mut harness = Harness::start();
    let (_listener, mut server) = harness.connect().await;

    harness
        .handle
        .update_aircraft(aircraft(122_800_000))
        .await
        .unwrap();

    let fast = server.expect("^").await;
    assert!(fast.starts_with(&format!("^{CALLSIGN}:50.0333000:8.5706000:")));

    // The radio stack is published once the first snapshot arrives.
    harness
        .wait_for(|n| matches!(n, Notification::RadioStackChanged(_)))
        .await;

    harness.stop().await;
}

#[tokio::test]
async fn test_radio_message_and_selcal_routing() {
    let mut harness = Harness::start();
    let (_listener, mut server) = harness.connect().await;
    harness
        .handle
        .update_aircraft(aircraft(122_800_000))
        .await
        .unwrap();
    harness
        .wait_for(|n| matches!(n, Notification::RadioStackChanged(_)))
        .await;

    server.send("#TMEDDF_TWR:@22800:N12345 wind calm").await;
    let message = harness
        .wait_for(|n| matches!(n, Notification::RadioMessageReceived { .. }))
        .await;
    assert_eq!(
        message,
        Notification::RadioMessageReceived {
            from: "EDDF_TWR".to_string(),
            frequencies: vec![22800],
            text: "N12345 wind calm".to_string(),
            is_direct: true,
        }
    );

    // Not on a tuned frequency: dropped. The SELCAL that follows proves ordering.
    server.send("#TMEDDF_APP:@20550:N12345 hello").await;
    server.send("#TMEDDF_TWR:@22800:SELCAL AB-CD").await;
    let next = harness
        .wait_for(|n| {
            matches!(
                n,
                Notification::RadioMessageReceived { .. } | Notification::SelcalAlertReceived { .. }
            )
        })
        .await;
    assert!(matches!(next, Notification::SelcalAlertReceived { ref from, .. } if from == "EDDF_TWR"));

    harness.stop().await;
}

#[tokio::test]
async fn test_full_configuration_request_answered() {
    let mut harness = Harness::start();
    let (_listener, mut server) = harness.connect().await;
    harness
        .handle
        .update_aircraft(aircraft(122_800_000))
        .await
        .unwrap();
    server.expect("^").await;

    server
        .send(r#"$CQDLH123:N12345:ACC:{"request":"full"}"#)
        .await;
    let response = server.expect(&format!("$CQ{CALLSIGN}:DLH123:ACC:")).await;
    assert!(response.contains(r#""is_full_data":true"#));
    assert!(response.contains(r#""on_ground":true"#));

    harness.stop().await;
}

#[tokio::test]
async fn test_alias_station_redirects_voice_frequency() {
    let mut harness = Harness::start();
    let (_listener, mut server) = harness.connect().await;

    harness
        .handle
        .set_alias_stations(vec![AliasStation {
            id: "a1".to_string(),
            callsign: "EDGG_KTG_CTR".to_string(),
            frequency: Some(136_955_000),
            frequency_alias: Some(136_950_000),
        }])
        .await
        .unwrap();
    harness
        .handle
        .update_aircraft(aircraft(136_950_000))
        .await
        .unwrap();

    server.send("%EDGG_KTG_CTR:36950:5:150:5:50.00000:8.50000:0").await;
    harness
        .wait_for(|n| matches!(n, Notification::ControllerAdded(_)))
        .await;
    // New controllers are asked for their real name.
    server.expect(&format!("$CQ{CALLSIGN}:EDGG_KTG_CTR:RN")).await;

    let alias = harness
        .wait_for(|n| {
            matches!(
                n,
                Notification::FrequencyAliasChanged { frequency_hz, .. } if *frequency_hz != 0
            )
        })
        .await;
    assert_eq!(
        alias,
        Notification::FrequencyAliasChanged {
            radio: Radio::Com1,
            frequency_hz: 136_955_000
        }
    );
    assert!(harness
        .voice
        .calls()
        .contains(&VoiceCommand::SetStationFrequency {
            radio: Radio::Com1,
            frequency_hz: 136_955_000
        }));

    harness.stop().await;
}

#[tokio::test]
async fn test_kill_request_forcibly_disconnects() {
    let mut harness = Harness::start();
    let (_listener, mut server) = harness.connect().await;

    server.send("$!!SERVER:N12345:Behave yourself").await;
    let notification = harness
        .wait_for(|n| matches!(n, Notification::Disconnected { .. }))
        .await;
    assert_eq!(
        notification,
        Notification::Disconnected {
            reason: DisconnectReason::Forcible {
                reason: "Behave yourself".to_string()
            }
        }
    );
    assert_eq!(harness.handle.state(), ConnectionState::ForciblyDisconnected);

    harness.stop().await;
}

#[tokio::test]
async fn test_fatal_server_error_ends_session() {
    let mut harness = Harness::start();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();

    harness.handle.connect(&address).await.unwrap();
    let mut server = FakeServer::accept(&listener).await;
    server.send("$DISERVER:CLIENT:TEST FSD:abc").await;
    server.expect("#AP").await;
    server
        .send("$ERserver:N12345:001:N12345:Callsign in use")
        .await;

    let notification = harness
        .wait_for(|n| matches!(n, Notification::Disconnected { .. }))
        .await;
    assert!(matches!(
        notification,
        Notification::Disconnected {
            reason: DisconnectReason::Forcible { ref reason }
        } if reason == "Callsign in use"
    ));

    // A new connect is accepted after a forcible disconnect.
    let (_listener, _server) = harness.connect().await;

    harness.stop().await;
}

#[tokio::test]
async fn test_server_closing_connection_reports_loss() {
    let mut harness = Harness::start();
    let (_listener, server) = harness.connect().await;

    drop(server);
    let notification = harness
        .wait_for(|n| matches!(n, Notification::Disconnected { .. }))
        .await;
    assert_eq!(
        notification,
        Notification::Disconnected {
            reason: DisconnectReason::Other
        }
    );

    harness.stop().await;
}

#[tokio::test]
async fn test_operator_commands_reach_simulator() {
    let harness = Harness::start();

    let squawk = harness.handle.set_transponder_code("2301").await.unwrap();
    assert_eq!(squawk.to_string(), "2301");
    assert!(harness.handle.set_transponder_code("7890").await.is_err());
    harness
        .handle
        .tune_radio(Radio::Com2, 121_500_000)
        .await
        .unwrap();
    // Round trip through the daemon so the fire-and-forget command is processed.
    harness.handle.set_transponder_code("1200").await.unwrap();

    let calls = harness.simulator.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(
        calls[1],
        SimulatorCommand::TuneRadio {
            radio: Radio::Com2,
            frequency_hz: 121_500_000
        }
    );

    harness.stop().await;
}

#[tokio::test]
async fn test_radio_message_requires_connection() {
    let harness = Harness::start();
    assert!(harness.handle.send_radio_message("hello").await.is_err());
    harness.stop().await;
}

#[tokio::test]
async fn test_shutdown_leaves_network() {
    let mut harness = Harness::start();
    let (_listener, mut server) = harness.connect().await;
    let mut notifications = harness.handle.subscribe();

    harness.shutdown.cancel();
    let goodbye = server.expect("#DP").await;
    assert_eq!(goodbye, format!("#DP{CALLSIGN}:1234567"));
    server.expect_eof().await;

    let notification = tokio::time::timeout(TIMEOUT, async {
        loop {
            match notifications.recv().await {
                Ok(n @ Notification::Disconnected { .. }) => return n,
                Ok(_) => continue,
                Err(e) => panic!("notification channel: {e}"),
            }
        }
    })
    .await
    .expect("disconnect notification in time");
    assert_eq!(
        notification,
        Notification::Disconnected {
            reason: DisconnectReason::Intentional
        }
    );

    tokio::time::timeout(TIMEOUT, harness.task)
        .await
        .expect("daemon stops in time")
        .unwrap();
}
