//! Radio frequency helpers.
//!
//! The network carries frequencies in a legacy five-digit encoding: kilohertz
//! minus 100 000, so `22800` on the wire is 122.800 MHz. Everything inside the
//! session works in Hertz, snapped to the 25 kHz channel grid before any
//! equality comparison.
//!
//! # Example
//!
//! ```
//! use netpilot::frequency::{normalize_25khz, wire_to_hz};
//!
//! assert_eq!(wire_to_hz(22800), 122_800_000);
//! assert_eq!(normalize_25khz(122_820_000), 122_825_000);
//! ```

/// Channel spacing of the VHF airband grid used for comparisons.
pub const CHANNEL_SPACING_HZ: u32 = 25_000;

/// Offset between the wire encoding and real kilohertz.
const WIRE_OFFSET_KHZ: u32 = 100_000;

/// Largest Hertz value that still sits on the channel grid.
const MAX_CHANNEL_HZ: u32 = u32::MAX / CHANNEL_SPACING_HZ * CHANNEL_SPACING_HZ;

/// Marker the network appends to callsigns of multi-position stations.
const MULTI_POSITION_MARKER: char = '*';

/// Convert a wire-format frequency to Hertz.
#[inline]
pub fn wire_to_hz(wire: u32) -> u32 {
    wire.saturating_add(WIRE_OFFSET_KHZ).saturating_mul(1000)
}

/// Convert Hertz to the wire format, truncating below 1 kHz.
#[inline]
pub fn hz_to_wire(hz: u32) -> u32 {
    (hz / 1000).saturating_sub(WIRE_OFFSET_KHZ)
}

/// Snap a frequency to the nearest 25 kHz channel.
///
/// Ties round up, so the 8.33 kHz display truncations `x.x20` / `x.x70`
/// resolve to the `x.x25` / `x.x75` channels they stand for. Normalizing an
/// already-normalized value returns it unchanged.
pub fn normalize_25khz(hz: u32) -> u32 {
    let half = u64::from(CHANNEL_SPACING_HZ / 2);
    let spacing = u64::from(CHANNEL_SPACING_HZ);
    let rounded = (u64::from(hz) + half) / spacing * spacing;
    u32::try_from(rounded).unwrap_or(MAX_CHANNEL_HZ)
}

/// Convert a wire frequency straight to its normalized channel in Hertz.
#[inline]
pub fn normalize_wire(wire: u32) -> u32 {
    normalize_25khz(wire_to_hz(wire))
}

/// True if both frequencies land on the same 25 kHz channel.
#[inline]
pub fn is_same_channel(a_hz: u32, b_hz: u32) -> bool {
    normalize_25khz(a_hz) == normalize_25khz(b_hz)
}

/// Format Hertz as a MHz string with three decimals, e.g. `"122.800"`.
pub fn format_mhz(hz: u32) -> String {
    format!("{}.{:03}", hz / 1_000_000, (hz % 1_000_000) / 1000)
}

/// Parse a MHz string such as `"122.8"` or `"118.275"` into Hertz.
///
/// Returns `None` for anything outside the 118.000 - 136.975 MHz airband.
pub fn parse_mhz(text: &str) -> Option<u32> {
    let mhz: f64 = text.trim().parse().ok()?;
    if !(118.0..137.0).contains(&mhz) {
        return None;
    }
    Some((mhz * 1_000_000.0).round() as u32)
}

/// Compare two station callsigns, tolerating the multi-position marker.
///
/// The comparison is ASCII case-insensitive and ignores a trailing `*`
/// on either side.
pub fn callsigns_match(a: &str, b: &str) -> bool {
    strip_marker(a).eq_ignore_ascii_case(strip_marker(b))
}

fn strip_marker(callsign: &str) -> &str {
    callsign.trim().trim_end_matches(MULTI_POSITION_MARKER)
}
