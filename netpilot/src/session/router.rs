//! Inbound radio message routing.
//!
//! Decides whether a radio text message reaches the pilot at all, and if so
//! whether it is a SELCAL call, a message addressed to us, or general
//! frequency chatter.

use std::sync::OnceLock;

use regex::Regex;

use crate::aircraft::{Radio, RadioStackState};
use crate::frequency::{normalize_25khz, normalize_wire};

/// Matches `SELCAL AB-CD`.
fn selcal_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)^SELCAL\s+([A-Z]{2})-([A-Z]{2})\s*$").unwrap())
}

/// Outcome of routing one radio message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// No receiving radio is tuned to any of the message frequencies.
    Dropped,
    /// Our SELCAL code was called.
    Selcal {
        from: String,
        frequencies: Vec<u32>,
    },
    /// A normal radio message.
    Message {
        from: String,
        frequencies: Vec<u32>,
        text: String,
        is_direct: bool,
    },
}

/// Routes inbound radio messages for one callsign and SELCAL code.
#[derive(Debug, Clone)]
pub struct RadioMessageRouter {
    callsign: String,
    /// Code letters without the hyphen, upper-cased.
    selcal: Option<String>,
}

impl RadioMessageRouter {
    pub fn new(callsign: &str, selcal: Option<&str>) -> Self {
        Self {
            callsign: callsign.to_string(),
            selcal: selcal.map(compact_selcal).filter(|code| !code.is_empty()),
        }
    }

    /// Route a message addressed to `frequencies` (wire encoding).
    pub fn route(
        &self,
        from: &str,
        frequencies: &[u32],
        text: &str,
        radios: &RadioStackState,
    ) -> RouteDecision {
        let receivable = receivable_frequencies(frequencies, radios);
        if receivable.is_empty() {
            tracing::trace!(from, ?frequencies, "Radio message not on a receiving frequency");
            return RouteDecision::Dropped;
        }

        if self.is_our_selcal(text) {
            return RouteDecision::Selcal {
                from: from.to_string(),
                frequencies: receivable,
            };
        }

        RouteDecision::Message {
            from: from.to_string(),
            frequencies: receivable,
            text: text.to_string(),
            is_direct: self.is_direct(text),
        }
    }

    fn is_our_selcal(&self, text: &str) -> bool {
        let Some(code) = self.selcal.as_deref() else {
            return false;
        };
        selcal_pattern()
            .captures(text.trim())
            .map(|caps| {
                let called = format!("{}{}", &caps[1], &caps[2]).to_ascii_uppercase();
                called == code
            })
            .unwrap_or(false)
    }

    fn is_direct(&self, text: &str) -> bool {
        let text = text.trim_start();
        text.len() >= self.callsign.len()
            && text.is_char_boundary(self.callsign.len())
            && text[..self.callsign.len()].eq_ignore_ascii_case(&self.callsign)
    }
}

fn compact_selcal(code: &str) -> String {
    code.chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase()
}

/// Wire frequencies of the message that land on a receiving radio.
pub fn receivable_frequencies(frequencies: &[u32], radios: &RadioStackState) -> Vec<u32> {
    frequencies
        .iter()
        .copied()
        .filter(|wire| {
            let channel = normalize_wire(*wire);
            Radio::ALL.iter().any(|radio| {
                radios
                    .receiving_frequency(*radio)
                    .is_some_and(|hz| normalize_25khz(hz) == channel)
            })
        })
        .collect()
}
