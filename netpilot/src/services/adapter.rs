//! Alias table adapter - poll loop daemon for the voice alias table.
//!
//! Follows the usual daemon shape:
//! - `new()` + `start()` spawns the async task
//! - `run()` loop on a `tokio::time::interval`
//! - stops when the receiving side goes away
//! - exponential backoff on errors (2^n seconds, capped at 5 minutes)
//!
//! The table is only forwarded when it differs from the last one sent, so
//! the session re-resolves aliases only when something actually changed.

use std::time::Duration;

use tokio::sync::mpsc;

use super::alias::AliasStationClient;
use super::config::AliasAdapterConfig;
use super::error::ServiceError;
use crate::registry::AliasStation;

/// Maximum backoff duration (5 minutes).
const MAX_BACKOFF: Duration = Duration::from_secs(300);

/// Polls the alias-station table and forwards changes.
pub struct AliasTableAdapter<C: AliasStationClient> {
    client: C,
    tx: mpsc::Sender<Vec<AliasStation>>,
    config: AliasAdapterConfig,
    last_sent: Option<Vec<AliasStation>>,
}

impl<C: AliasStationClient + 'static> AliasTableAdapter<C> {
    pub fn new(
        client: C,
        tx: mpsc::Sender<Vec<AliasStation>>,
        config: AliasAdapterConfig,
    ) -> Self {
        Self {
            client,
            tx,
            config,
            last_sent: None,
        }
    }

    /// Start the adapter as an async task.
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(mut self) {
        tracing::info!(
            url = %self.config.url,
            poll_interval_secs = self.config.poll_interval.as_secs(),
            "Alias table adapter started"
        );

        let mut interval = tokio::time::interval(self.config.poll_interval);
        let mut consecutive_errors: u32 = 0;

        loop {
            tokio::select! {
                biased;
                _ = self.tx.closed() => break,
                _ = interval.tick() => {}
            }

            if consecutive_errors > 0 {
                let backoff = calculate_backoff(consecutive_errors);
                tracing::debug!(
                    backoff_secs = backoff.as_secs(),
                    consecutive_errors,
                    "Backing off after errors"
                );
                tokio::time::sleep(backoff).await;
            }

            match self.poll_once().await {
                Ok(_) => consecutive_errors = 0,
                Err(ServiceError::ChannelClosed) => break,
                Err(e) => {
                    consecutive_errors += 1;
                    tracing::warn!(
                        error = %e,
                        consecutive_errors,
                        "Failed to fetch alias station table"
                    );
                }
            }
        }

        tracing::info!("Alias table adapter stopped");
    }

    /// Fetch once and forward the table if it changed. Returns whether it was sent.
    async fn poll_once(&mut self) -> Result<bool, ServiceError> {
        let stations = self.client.fetch_alias_stations().await?;
        if self.last_sent.as_ref() == Some(&stations) {
            tracing::trace!("Alias station table unchanged");
            return Ok(false);
        }

        self.tx
            .send(stations.clone())
            .await
            .map_err(|_| ServiceError::ChannelClosed)?;
        tracing::info!(stations = stations.len(), "Alias station table updated");
        self.last_sent = Some(stations);
        Ok(true)
    }
}

/// Calculate exponential backoff: 2^n seconds, capped at MAX_BACKOFF.
fn calculate_backoff(consecutive_errors: u32) -> Duration {
    let secs = 2u64.saturating_pow(consecutive_errors.min(20));
    Duration::from_secs(secs).min(MAX_BACKOFF)
}
