//! INI serialization logic for converting `ConfigFile` → INI string.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let cached_servers = config
        .network
        .cached_servers
        .iter()
        .map(|s| format!("{}={}", s.name, s.address))
        .collect::<Vec<_>>()
        .join(", ");
    let selcal = config.aircraft.selcal.as_deref().unwrap_or("");
    let packet_log_dir = config
        .logging
        .packet_log_dir
        .as_deref()
        .map(path_to_string)
        .unwrap_or_default();

    format!(
        r#"[network]
; FSD server to connect to by default (host:port)
server = {server}
; Network account
callsign = {callsign}
cid = {cid}
password = {password}
real_name = {real_name}
; Pilot rating reported at login (default: 1)
rating = {rating}
; Servers from the last `netpilot servers` run (name=host, comma separated)
cached_servers = {cached_servers}
; TCP connect timeout in seconds (default: 10)
connect_timeout_secs = {connect_timeout_secs}

[aircraft]
; ICAO aircraft type designator, e.g. B738
type_code = {type_code}
; SELCAL code, e.g. AB-CD (leave empty if not equipped)
selcal = {selcal}

[session]
; How to appear on the network:
;   pilot      - normal pilot connection
;   observer   - observer, no aircraft shown
;   tower_view - observer attached to a tower view
role = {role}
; Seconds between position reports (defaults: 5 pilot, 15 observer)
pilot_position_interval_secs = {pilot_interval}
observer_position_interval_secs = {observer_interval}
; Drop controllers not heard from for this many seconds (default: 60)
controller_timeout_secs = {controller_timeout}

[voice]
; Receive gain per radio, 0.0 to 1.0
com1_gain = {com1_gain}
com2_gain = {com2_gain}
; Never transmit (default: false)
receive_only = {receive_only}
; Voice service alias-station table
alias_url = {alias_url}
; Seconds between alias table refreshes (default: 300)
alias_poll_interval_secs = {alias_poll}

[telemetry]
; Listen for ForeFlight XGPS/XATT broadcasts from the simulator
enabled = {telemetry_enabled}
; UDP port (X-Plane "Send position to ForeFlight" uses 49002)
udp_port = {udp_port}

[logging]
; Application log file (cleared at startup)
file = {log_file}
; Directory for raw per-session packet logs (leave empty to disable)
packet_log_dir = {packet_log_dir}
"#,
        server = config.network.server,
        callsign = config.network.callsign,
        cid = config.network.cid,
        password = config.network.password,
        real_name = config.network.real_name,
        rating = config.network.rating,
        cached_servers = cached_servers,
        connect_timeout_secs = config.network.connect_timeout_secs,
        type_code = config.aircraft.type_code,
        selcal = selcal,
        role = config.session.role,
        pilot_interval = config.session.pilot_position_interval_secs,
        observer_interval = config.session.observer_position_interval_secs,
        controller_timeout = config.session.controller_timeout_secs,
        com1_gain = config.voice.com1_gain,
        com2_gain = config.voice.com2_gain,
        receive_only = config.voice.receive_only,
        alias_url = config.voice.alias_url,
        alias_poll = config.voice.alias_poll_interval_secs,
        telemetry_enabled = config.telemetry.enabled,
        udp_port = config.telemetry.udp_port,
        log_file = path_to_string(&config.logging.file),
        packet_log_dir = packet_log_dir,
    )
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_string_has_all_sections() {
        let content = to_config_string(&ConfigFile::default());
        for section in [
            "[network]",
            "[aircraft]",
            "[session]",
            "[voice]",
            "[telemetry]",
            "[logging]",
        ] {
            assert!(content.contains(section), "missing {section}");
        }
        assert!(content.contains("role = pilot"));
        assert!(content.contains("udp_port = 49002"));
    }

    #[test]
    fn test_empty_optionals_written_blank() {
        let mut config = ConfigFile::default();
        config.logging.packet_log_dir = None;
        let content = to_config_string(&config);
        assert!(content.contains("selcal = \n"));
        assert!(content.contains("packet_log_dir = \n"));
    }
}
