//! Telemetry receiver - UDP listener for simulator position broadcasts.
//!
//! Listens for ForeFlight `XGPS`/`XATT` datagrams and forwards
//! [`AircraftSample`]s on a channel. The CLI merges them into the
//! [`LocalAircraftState`](crate::aircraft::LocalAircraftState) it pushes to
//! the session.
//!
//! # Setup
//!
//! In X-Plane: Settings → Network → "Send position to ForeFlight"
//!
//! # Example
//!
//! ```ignore
//! let (tx, mut rx) = mpsc::channel(16);
//! let receiver = TelemetryReceiver::bind(TelemetryReceiverConfig::default(), tx).await?;
//! let handle = receiver.start();
//!
//! while let Some(sample) = rx.recv().await {
//!     println!("Position: {}, {}", sample.latitude, sample.longitude);
//! }
//! ```

mod protocol;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};

use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::aircraft::AircraftSample;
pub use protocol::{parse_datagram, Datagram, SampleAccumulator};

/// ForeFlight broadcast port.
pub const DEFAULT_TELEMETRY_PORT: u16 = 49002;

/// Maximum datagram size we expect.
const MAX_PACKET_SIZE: usize = 1024;

/// Telemetry receiver configuration.
#[derive(Debug, Clone)]
pub struct TelemetryReceiverConfig {
    pub bind_address: IpAddr,
    pub port: u16,

    /// Minimum interval between forwarded samples.
    pub min_update_interval: Duration,

    /// Timeout for socket receive operations.
    pub recv_timeout: Duration,
}

impl Default for TelemetryReceiverConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_TELEMETRY_PORT,
            min_update_interval: Duration::from_millis(200),
            recv_timeout: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to bind the UDP socket.
    #[error("Failed to bind UDP socket on port {port}: {source}")]
    SocketBindError {
        port: u16,
        #[source]
        source: std::io::Error,
    },
}

/// Receives simulator broadcasts and forwards samples.
pub struct TelemetryReceiver {
    config: TelemetryReceiverConfig,
    socket: UdpSocket,
    sample_tx: mpsc::Sender<AircraftSample>,
}

impl TelemetryReceiver {
    /// Bind the socket. Nothing is received until [`start`](Self::start).
    pub async fn bind(
        config: TelemetryReceiverConfig,
        sample_tx: mpsc::Sender<AircraftSample>,
    ) -> Result<Self, TelemetryError> {
        let socket = UdpSocket::bind(SocketAddr::new(config.bind_address, config.port))
            .await
            .map_err(|source| TelemetryError::SocketBindError {
                port: config.port,
                source,
            })?;

        Ok(Self {
            config,
            socket,
            sample_tx,
        })
    }

    /// Address actually bound, useful when the port was 0.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.local_addr().ok()
    }

    /// Spawn the receive loop. It ends when the sample channel closes.
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        info!(
            port = self.config.port,
            local_addr = ?self.local_addr(),
            "Telemetry receiver started"
        );

        let mut buffer = [0u8; MAX_PACKET_SIZE];
        let mut accumulator = SampleAccumulator::default();
        let mut last_send: Option<Instant> = None;
        let mut packets_received: u64 = 0;
        let mut samples_sent: u64 = 0;

        loop {
            if self.sample_tx.is_closed() {
                debug!("Telemetry channel closed, stopping receiver");
                break;
            }

            let recv = tokio::time::timeout(self.config.recv_timeout, self.socket.recv(&mut buffer))
                .await;

            match recv {
                Ok(Ok(len)) => {
                    packets_received += 1;
                    let data = &buffer[..len];

                    let Some(datagram) = parse_datagram(data) else {
                        if packets_received <= 5 {
                            let preview = String::from_utf8_lossy(&data[..len.min(50)]);
                            debug!(packet_num = packets_received, preview = %preview, "Unrecognized datagram");
                        }
                        continue;
                    };
                    let Some(sample) = accumulator.apply(datagram) else {
                        continue;
                    };

                    let due = last_send
                        .map(|t| t.elapsed() >= self.config.min_update_interval)
                        .unwrap_or(true);
                    if due {
                        samples_sent += 1;
                        self.send_sample(sample, samples_sent);
                        last_send = Some(Instant::now());
                    }
                }
                Ok(Err(e)) => {
                    warn!(error = %e, "UDP receive error");
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
                Err(_) => trace!("No telemetry data received (timeout)"),
            }
        }

        info!(packets_received, samples_sent, "Telemetry receiver stopped");
    }

    fn send_sample(&self, sample: AircraftSample, samples_sent: u64) {
        if samples_sent == 1 {
            info!(
                lat = format!("{:.4}", sample.latitude),
                lon = format!("{:.4}", sample.longitude),
                alt = format!("{:.0}", sample.altitude_msl),
                gs = format!("{:.0}", sample.ground_speed),
                "First aircraft sample"
            );
        }
        if let Err(e) = self.sample_tx.try_send(sample) {
            if samples_sent <= 3 {
                warn!("Failed to forward sample: {}", e);
            }
        }
    }
}
