//! Connect command - run an interactive network session.
//!
//! Starts the session daemon, the telemetry receiver and the alias-table
//! adapter, then reads operator commands from stdin and prints session
//! notifications until the session ends or Ctrl+C is pressed.

use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use netpilot::aircraft::{LocalAircraftState, Radio, RadioStackState};
use netpilot::capabilities::NoopVoiceClient;
use netpilot::config::ConfigFile;
use netpilot::frequency::{format_mhz, wire_to_hz};
use netpilot::services::{AliasTableAdapter, HttpAliasStationClient, DEFAULT_FSD_PORT};
use netpilot::session::{
    DisconnectReason, Notification, SessionConfig, SessionDaemon, SessionHandle,
};
use netpilot::telemetry::TelemetryReceiver;

use super::cockpit::Cockpit;
use super::operator::{self, OperatorCommand};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the connect command.
#[derive(Debug, Args)]
pub struct ConnectArgs {
    /// Cached server name (see `netpilot servers`) or host[:port]
    #[arg(long)]
    pub server: Option<String>,

    /// Override the configured callsign
    #[arg(long)]
    pub callsign: Option<String>,

    /// Do not listen for simulator telemetry
    #[arg(long)]
    pub no_telemetry: bool,

    /// Do not fetch the voice alias-station table
    #[arg(long)]
    pub no_alias: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

/// Run the connect command.
pub async fn run(args: ConnectArgs) -> Result<(), CliError> {
    let runner = CliRunner::with_debug(args.debug)?;
    runner.log_startup("connect");

    let mut config = runner.config().clone();
    if let Some(callsign) = &args.callsign {
        config.network.callsign = callsign.trim().to_ascii_uppercase();
    }
    let server = resolve_server(&config, args.server.as_deref());

    let shutdown = CancellationToken::new();
    let (panel_tx, panel_rx) = mpsc::channel(16);
    let cockpit = Cockpit::new(panel_tx.clone());

    let (daemon, handle) = SessionDaemon::new(
        SessionConfig::from(&config),
        Box::new(NoopVoiceClient),
        Box::new(cockpit.clone()),
    );
    let daemon_task = daemon.start(shutdown.clone());

    let mut tasks = vec![forward_aircraft(panel_rx, handle.clone())];
    if config.telemetry.enabled && !args.no_telemetry {
        tasks.extend(start_telemetry(&config, cockpit, panel_tx).await?);
    } else {
        info!("Telemetry disabled, positions are not reported until a simulator feed is available");
    }
    if !args.no_alias {
        tasks.extend(start_alias_adapter(&config, handle.clone())?);
    }

    println!(
        "Connecting to {} as {} (type .help for commands)",
        server, config.network.callsign
    );
    let result = session_loop(&handle, &server).await;

    shutdown.cancel();
    if let Err(e) = daemon_task.await {
        warn!(error = %e, "Session daemon task failed");
    }
    for task in tasks {
        task.abort();
    }
    info!("netpilot stopped");

    result
}

/// Pick the server address: explicit argument, cached name, or configured default.
fn resolve_server(config: &ConfigFile, requested: Option<&str>) -> String {
    let requested = requested.unwrap_or(&config.network.server).trim();
    let address = config
        .cached_server(requested)
        .map(|s| s.address.as_str())
        .unwrap_or(requested);

    if address.contains(':') {
        address.to_string()
    } else {
        format!("{}:{}", address, DEFAULT_FSD_PORT)
    }
}

/// Drive the session from stdin and print notifications until it ends.
async fn session_loop(handle: &SessionHandle, server: &str) -> Result<(), CliError> {
    let mut notifications = handle.subscribe();
    handle.connect(server).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!();
                println!("Shutting down...");
                break;
            }

            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => run_operator_command(handle, &line).await,
                Ok(None) => stdin_open = false,
                Err(e) => {
                    warn!(error = %e, "Failed to read stdin");
                    stdin_open = false;
                }
            },

            event = notifications.recv() => match event {
                Ok(notification) => {
                    print_notification(&notification);
                    if ends_session(&notification) {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Notification display lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    Ok(())
}

async fn run_operator_command(handle: &SessionHandle, line: &str) {
    let command = match operator::parse(line) {
        Ok(Some(command)) => command,
        Ok(None) => return,
        Err(message) => {
            eprintln!("{}", message);
            return;
        }
    };

    let result = match command {
        OperatorCommand::RadioMessage(text) => handle.send_radio_message(&text).await,
        OperatorCommand::PrivateMessage { to, text } => {
            handle.send_private_message(&to, &text).await
        }
        OperatorCommand::Squawk(code) => handle.set_transponder_code(&code).await.map(|code| {
            println!("Squawking {}", code);
        }),
        OperatorCommand::Tune {
            radio,
            frequency_hz,
        } => handle.tune_radio(radio, frequency_hz).await,
        OperatorCommand::Transmit(radio) => handle.select_transmit_radio(radio).await,
        OperatorCommand::PushToTalk(active) => handle.set_push_to_talk(active).await,
        OperatorCommand::ReceiveOnly(enabled) => handle.set_receive_only(enabled).await,
        OperatorCommand::Quit => handle.disconnect().await,
        OperatorCommand::Help => {
            println!("{}", operator::HELP);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}", e);
    }
}

fn ends_session(notification: &Notification) -> bool {
    matches!(
        notification,
        Notification::ConnectionFailed { .. } | Notification::Disconnected { .. }
    )
}

fn print_notification(notification: &Notification) {
    match notification {
        Notification::ConnectionInitiated { server } => println!("Opening {}", server),
        Notification::Connected { callsign } => println!("Connected as {}", callsign),
        Notification::ConnectionFailed { reason } => println!("Connection failed: {}", reason),
        Notification::Disconnected { reason } => match reason {
            DisconnectReason::Intentional => println!("Disconnected"),
            DisconnectReason::Forcible { reason } => {
                println!("Disconnected by the server: {}", reason)
            }
            DisconnectReason::Other => println!("Connection lost"),
        },
        Notification::ControllerAdded(controller) => println!(
            "{} online on {}",
            controller.callsign,
            format_mhz(controller.normalized_frequency)
        ),
        Notification::ControllerUpdated(controller) => {
            tracing::debug!(callsign = %controller.callsign, "Controller updated");
        }
        Notification::ControllerDeleted { callsign } => println!("{} offline", callsign),
        Notification::FrequencyAliasChanged {
            radio,
            frequency_hz,
        } => {
            if *frequency_hz == 0 {
                println!("{}: voice alias cleared", radio);
            } else {
                println!("{}: voice on {}", radio, format_mhz(*frequency_hz));
            }
        }
        Notification::RadioStackChanged(stack) => println!("{}", describe_stack(stack)),
        Notification::RadioMessageReceived {
            from,
            frequencies,
            text,
            is_direct,
        } => {
            let on = frequencies
                .iter()
                .map(|wire| format_mhz(wire_to_hz(*wire)))
                .collect::<Vec<_>>()
                .join("/");
            let marker = if *is_direct { " (to you)" } else { "" };
            println!("[{}] {}{}: {}", on, from, marker, text);
        }
        Notification::SelcalAlertReceived { from, .. } => println!("*** SELCAL from {} ***", from),
        Notification::PrivateMessageReceived { from, text } => println!("<{}> {}", from, text),
        Notification::ServerMessageReceived { text } => println!("[SERVER] {}", text),
    }
}

fn describe_stack(stack: &RadioStackState) -> String {
    if !stack.avionics_power {
        return "Avionics off".to_string();
    }
    let radios = Radio::ALL
        .iter()
        .filter(|radio| stack.channel(**radio).power)
        .map(|radio| format!("{} {}", radio, format_mhz(stack.channel(*radio).active_hz)))
        .collect::<Vec<_>>()
        .join(", ");
    match stack.transmitting_radio() {
        Some(radio) => format!("{} (transmit {})", radios, radio),
        None => format!("{} (receive only)", radios),
    }
}

/// Forward cockpit snapshots to the session.
fn forward_aircraft(
    mut panel_rx: mpsc::Receiver<LocalAircraftState>,
    handle: SessionHandle,
) -> JoinHandle<()> {
    let aircraft = handle.aircraft_sender();
    tokio::spawn(async move {
        while let Some(state) = panel_rx.recv().await {
            if aircraft.send(state).await.is_err() {
                break;
            }
        }
    })
}

async fn start_telemetry(
    config: &ConfigFile,
    cockpit: Cockpit,
    panel_tx: mpsc::Sender<LocalAircraftState>,
) -> Result<Vec<JoinHandle<()>>, CliError> {
    let (sample_tx, mut sample_rx) = mpsc::channel(16);
    let receiver = TelemetryReceiver::bind(config.telemetry_config(), sample_tx).await?;
    println!("Listening for simulator telemetry on UDP {}", config.telemetry.udp_port);

    let bridge = tokio::spawn(async move {
        while let Some(sample) = sample_rx.recv().await {
            let state = cockpit.apply_sample(&sample);
            if panel_tx.send(state).await.is_err() {
                break;
            }
        }
    });

    Ok(vec![receiver.start(), bridge])
}

fn start_alias_adapter(
    config: &ConfigFile,
    handle: SessionHandle,
) -> Result<Vec<JoinHandle<()>>, CliError> {
    let adapter_config = config.alias_adapter_config();
    let client = HttpAliasStationClient::new(adapter_config.url.clone())?;
    let (table_tx, mut table_rx) = mpsc::channel(2);
    let adapter = AliasTableAdapter::new(client, table_tx, adapter_config);

    let bridge = tokio::spawn(async move {
        while let Some(stations) = table_rx.recv().await {
            info!(count = stations.len(), "Alias-station table updated");
            if handle.set_alias_stations(stations).await.is_err() {
                break;
            }
        }
    });

    Ok(vec![adapter.start(), bridge])
}

#[cfg(test)]
mod tests {
    use super::*;
    use netpilot::config::CachedServer;

    #[test]
    fn test_resolve_server() {
        let mut config = ConfigFile::default();
        config.network.server = "fsd.example.net".to_string();
        config.set_cached_servers(vec![CachedServer {
            name: "USA-EAST".to_string(),
            address: "198.51.100.10:6809".to_string(),
        }]);

        assert_eq!(resolve_server(&config, None), "fsd.example.net:6809");
        assert_eq!(resolve_server(&config, Some("usa-east")), "198.51.100.10:6809");
        assert_eq!(resolve_server(&config, Some("10.0.0.1:7000")), "10.0.0.1:7000");
    }

    #[test]
    fn test_session_end_notifications() {
        assert!(ends_session(&Notification::Disconnected {
            reason: DisconnectReason::Other
        }));
        assert!(ends_session(&Notification::ConnectionFailed {
            reason: "refused".into()
        }));
        assert!(!ends_session(&Notification::Connected {
            callsign: "N1".into()
        }));
    }
}
