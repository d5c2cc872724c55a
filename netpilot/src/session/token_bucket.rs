//! Token bucket bounding the configuration broadcast rate.

use std::time::Duration;

/// Tokens available at the start of a session.
pub const CONFIG_TOKEN_CAPACITY: u32 = 10;

/// One token is added per interval.
pub const CONFIG_TOKEN_REFILL_INTERVAL: Duration = Duration::from_secs(5);

/// Counter in `[0, capacity]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBucket {
    tokens: u32,
    capacity: u32,
}

impl TokenBucket {
    /// A full bucket.
    pub fn new(capacity: u32) -> Self {
        Self {
            tokens: capacity,
            capacity,
        }
    }

    pub fn tokens(&self) -> u32 {
        self.tokens
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Take one token if available.
    pub fn try_consume(&mut self) -> bool {
        if self.tokens == 0 {
            return false;
        }
        self.tokens -= 1;
        true
    }

    /// Add one token. Returns false if the bucket was already full.
    pub fn refill(&mut self) -> bool {
        if self.tokens >= self.capacity {
            return false;
        }
        self.tokens += 1;
        true
    }

    /// Fill up for a new session.
    pub fn reset(&mut self) {
        self.tokens = self.capacity;
    }
}

impl Default for TokenBucket {
    fn default() -> Self {
        Self::new(CONFIG_TOKEN_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_full() {
        let bucket = TokenBucket::default();
        assert_eq!(bucket.tokens(), CONFIG_TOKEN_CAPACITY);
    }

    #[test]
    fn test_consume_until_empty() {
        let mut bucket = TokenBucket::new(3);
        assert!(bucket.try_consume());
        assert!(bucket.try_consume());
        assert!(bucket.try_consume());
        assert!(!bucket.try_consume());
        assert_eq!(bucket.tokens(), 0);
    }

    #[test]
    fn test_refill_capped() {
        let mut bucket = TokenBucket::new(2);
        assert!(!bucket.refill());
        bucket.try_consume();
        assert!(bucket.refill());
        assert!(!bucket.refill());
        assert_eq!(bucket.tokens(), 2);
    }

    #[test]
    fn test_bounds_hold_for_mixed_sequences() {
        let mut bucket = TokenBucket::default();
        // Deterministic pseudo-random walk over consume/refill.
        let mut seed: u32 = 0x2545_f491;
        for _ in 0..10_000 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            if seed % 3 == 0 {
                bucket.refill();
            } else {
                bucket.try_consume();
            }
            assert!(bucket.tokens() <= CONFIG_TOKEN_CAPACITY);
        }
    }

    #[test]
    fn test_reset_fills() {
        let mut bucket = TokenBucket::default();
        while bucket.try_consume() {}
        bucket.reset();
        assert_eq!(bucket.tokens(), CONFIG_TOKEN_CAPACITY);
    }
}
