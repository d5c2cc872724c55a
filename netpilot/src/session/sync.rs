//! Rate-limited aircraft configuration broadcast.
//!
//! Each new aircraft snapshot is reduced to an [`AircraftConfiguration`] and
//! compared with the last configuration peers actually received. Only the
//! changed fields go out, and only while the token bucket allows it. When the
//! bucket is empty the baseline stays put, so the next accepted diff carries
//! the latest state rather than a replay of every intermediate change.

use super::token_bucket::TokenBucket;
use crate::aircraft::AircraftConfiguration;

/// What happened to one configuration snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// Adopted as the baseline without sending. Happens for the first
    /// snapshot of a session and for every snapshot while not connected.
    Baseline,
    /// Same as the last broadcast.
    Unchanged,
    /// Send this incremental update.
    Send(AircraftConfiguration),
    /// Changed, but no token; the change stays pending.
    Throttled,
}

/// Tracks the last broadcast configuration and the broadcast budget.
#[derive(Debug, Default)]
pub struct ConfigurationSynchronizer {
    last_broadcast: Option<AircraftConfiguration>,
    current: Option<AircraftConfiguration>,
    bucket: TokenBucket,
}

impl ConfigurationSynchronizer {
    pub fn new(bucket: TokenBucket) -> Self {
        Self {
            last_broadcast: None,
            current: None,
            bucket,
        }
    }

    /// Feed the configuration derived from the latest aircraft snapshot.
    pub fn observe(&mut self, config: AircraftConfiguration, connected: bool) -> SyncOutcome {
        self.current = Some(config);
        self.flush(connected)
    }

    /// Add one token, then send any pending change it pays for.
    pub fn on_refill(&mut self, connected: bool) -> Option<AircraftConfiguration> {
        self.bucket.refill();
        match self.flush(connected) {
            SyncOutcome::Send(delta) => Some(delta),
            _ => None,
        }
    }

    fn flush(&mut self, connected: bool) -> SyncOutcome {
        let Some(current) = self.current.as_ref() else {
            return SyncOutcome::Unchanged;
        };

        let last = match self.last_broadcast.as_ref() {
            Some(last) if connected => last,
            _ => {
                self.last_broadcast = Some(current.clone());
                return SyncOutcome::Baseline;
            }
        };

        if last == current {
            return SyncOutcome::Unchanged;
        }
        if !self.bucket.try_consume() {
            tracing::trace!("Configuration change throttled, no tokens left");
            return SyncOutcome::Throttled;
        }

        let delta = last.diff(current);
        self.last_broadcast = Some(current.clone());
        SyncOutcome::Send(delta)
    }

    /// Complete current configuration for a peer request.
    ///
    /// Costs no token and leaves the incremental baseline alone.
    pub fn full_configuration(&self) -> Option<AircraftConfiguration> {
        self.current.clone().map(AircraftConfiguration::into_full)
    }

    /// Forget the baseline and refill for a new session.
    pub fn reset(&mut self) {
        self.last_broadcast = None;
        self.bucket.reset();
    }

    /// A change is waiting for a token.
    pub fn has_pending(&self) -> bool {
        matches!(
            (&self.last_broadcast, &self.current),
            (Some(last), Some(current)) if last != current
        )
    }

    pub fn tokens(&self) -> u32 {
        self.bucket.tokens()
    }
}
