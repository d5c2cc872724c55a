//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! The single place where INI key names are mapped to struct fields.

use std::path::PathBuf;
use std::str::FromStr;

use ini::{Ini, Properties};

use super::file::ConfigFileError;
use super::settings::{CachedServer, ConfigFile};
use crate::session::Role;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [network] section
    if let Some(section) = ini.section(Some("network")) {
        if let Some(v) = section.get("server") {
            let v = v.trim();
            if !v.contains(':') {
                return Err(invalid("network", "server", v, "expected host:port"));
            }
            config.network.server = v.to_string();
        }
        if let Some(v) = section.get("callsign") {
            config.network.callsign = v.trim().to_ascii_uppercase();
        }
        if let Some(v) = section.get("cid") {
            config.network.cid = v.trim().to_string();
        }
        if let Some(v) = section.get("password") {
            config.network.password = v.to_string();
        }
        if let Some(v) = section.get("real_name") {
            config.network.real_name = v.trim().to_string();
        }
        if let Some(v) = parse_value(section, "network", "rating", "must be 0-255")? {
            config.network.rating = v;
        }
        if let Some(v) = section.get("cached_servers") {
            config.network.cached_servers = parse_cached_servers(v)?;
        }
        if let Some(v) = parse_positive(section, "network", "connect_timeout_secs")? {
            config.network.connect_timeout_secs = v;
        }
    }

    // [aircraft] section
    if let Some(section) = ini.section(Some("aircraft")) {
        if let Some(v) = section.get("type_code") {
            config.aircraft.type_code = v.trim().to_ascii_uppercase();
        }
        if let Some(v) = section.get("selcal") {
            let v = v.trim().to_ascii_uppercase();
            config.aircraft.selcal = if v.is_empty() {
                None
            } else if is_valid_selcal(&v) {
                Some(v)
            } else {
                return Err(invalid("aircraft", "selcal", &v, "expected a code like AB-CD"));
            };
        }
    }

    // [session] section
    if let Some(section) = ini.section(Some("session")) {
        if let Some(v) = section.get("role") {
            config.session.role = Role::from_str(v)
                .map_err(|reason| invalid("session", "role", v, &reason))?;
        }
        if let Some(v) = parse_positive(section, "session", "pilot_position_interval_secs")? {
            config.session.pilot_position_interval_secs = v;
        }
        if let Some(v) = parse_positive(section, "session", "observer_position_interval_secs")? {
            config.session.observer_position_interval_secs = v;
        }
        if let Some(v) = parse_positive(section, "session", "controller_timeout_secs")? {
            config.session.controller_timeout_secs = v;
        }
    }

    // [voice] section
    if let Some(section) = ini.section(Some("voice")) {
        if let Some(v) = parse_gain(section, "com1_gain")? {
            config.voice.com1_gain = v;
        }
        if let Some(v) = parse_gain(section, "com2_gain")? {
            config.voice.com2_gain = v;
        }
        if let Some(v) = parse_bool(section, "voice", "receive_only")? {
            config.voice.receive_only = v;
        }
        if let Some(v) = section.get("alias_url") {
            let v = v.trim();
            if !(v.starts_with("http://") || v.starts_with("https://")) {
                return Err(invalid("voice", "alias_url", v, "must be an http(s) URL"));
            }
            config.voice.alias_url = v.to_string();
        }
        if let Some(v) = parse_positive(section, "voice", "alias_poll_interval_secs")? {
            config.voice.alias_poll_interval_secs = v;
        }
    }

    // [telemetry] section
    if let Some(section) = ini.section(Some("telemetry")) {
        if let Some(v) = parse_bool(section, "telemetry", "enabled")? {
            config.telemetry.enabled = v;
        }
        if let Some(v) = parse_value(section, "telemetry", "udp_port", "must be 1-65535")? {
            if v == 0 {
                return Err(invalid("telemetry", "udp_port", "0", "must be 1-65535"));
            }
            config.telemetry.udp_port = v;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("packet_log_dir") {
            let v = v.trim();
            config.logging.packet_log_dir = (!v.is_empty()).then(|| expand_tilde(v));
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_value<T: FromStr>(
    section: &Properties,
    name: &str,
    key: &str,
    reason: &str,
) -> Result<Option<T>, ConfigFileError> {
    section
        .get(key)
        .map(|v| v.trim().parse().map_err(|_| invalid(name, key, v, reason)))
        .transpose()
}

fn parse_positive(
    section: &Properties,
    name: &str,
    key: &str,
) -> Result<Option<u64>, ConfigFileError> {
    const REASON: &str = "must be a positive integer (seconds)";
    match parse_value::<u64>(section, name, key, REASON)? {
        Some(0) => Err(invalid(name, key, "0", REASON)),
        other => Ok(other),
    }
}

fn parse_bool(
    section: &Properties,
    name: &str,
    key: &str,
) -> Result<Option<bool>, ConfigFileError> {
    section
        .get(key)
        .map(|v| match v.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" | "on" => Ok(true),
            "false" | "no" | "0" | "off" => Ok(false),
            _ => Err(invalid(name, key, v, "must be true or false")),
        })
        .transpose()
}

fn parse_gain(section: &Properties, key: &str) -> Result<Option<f32>, ConfigFileError> {
    const REASON: &str = "must be between 0.0 and 1.0";
    let gain = parse_value::<f32>(section, "voice", key, REASON)?;
    match gain {
        Some(g) if !(0.0..=1.0).contains(&g) => Err(invalid("voice", key, &g.to_string(), REASON)),
        other => Ok(other),
    }
}

/// `NAME=host, NAME2=host2`
fn parse_cached_servers(value: &str) -> Result<Vec<CachedServer>, ConfigFileError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((name, address)) if !name.trim().is_empty() && !address.trim().is_empty() => {
                Ok(CachedServer {
                    name: name.trim().to_string(),
                    address: address.trim().to_string(),
                })
            }
            _ => Err(invalid(
                "network",
                "cached_servers",
                entry,
                "expected comma separated name=host entries",
            )),
        })
        .collect()
}

/// Two letter pairs from A-S excluding I, N and O, optionally hyphenated.
fn is_valid_selcal(code: &str) -> bool {
    let letters: Vec<char> = code.chars().filter(|c| *c != '-').collect();
    letters.len() == 4
        && code.len() <= 5
        && letters
            .iter()
            .all(|c| ('A'..='S').contains(c) && !matches!(c, 'I' | 'N' | 'O'))
}

pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
