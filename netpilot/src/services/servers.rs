//! Network server list.
//!
//! Fetched on demand by the CLI and cached in the config file, so a later
//! connect can pick a server without another round trip.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use super::error::ServiceError;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Default FSD port.
pub const DEFAULT_FSD_PORT: u16 = 6809;

/// One entry of the server list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkServer {
    pub ident: String,
    pub hostname_or_ip: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub name: String,
    /// Published as `1`/`0` by some lists and as a boolean by others.
    #[serde(default = "default_true", deserialize_with = "flag")]
    pub clients_connection_allowed: bool,
}

impl NetworkServer {
    /// `host:port` for connecting.
    pub fn address(&self) -> String {
        if self.hostname_or_ip.contains(':') {
            self.hostname_or_ip.clone()
        } else {
            format!("{}:{}", self.hostname_or_ip, DEFAULT_FSD_PORT)
        }
    }
}

fn default_true() -> bool {
    true
}

fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Number(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Number(n) => n != 0,
    })
}

/// Fetches the server list over HTTP.
pub struct ServerListClient {
    http: reqwest::Client,
    url: String,
}

impl ServerListClient {
    pub fn new(url: impl Into<String>) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| ServiceError::Http(e.to_string()))?;

        Ok(Self {
            http,
            url: url.into(),
        })
    }

    /// Fetch the servers that currently accept client connections.
    pub async fn fetch_servers(&self) -> Result<Vec<NetworkServer>, ServiceError> {
        let bytes = self
            .http
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ServiceError::Http(e.to_string()))?
            .bytes()
            .await
            .map_err(|e| ServiceError::Http(e.to_string()))?;

        let servers = parse_servers(&bytes)?;
        tracing::debug!(servers = servers.len(), url = %self.url, "Server list fetched");
        Ok(servers)
    }
}

fn parse_servers(bytes: &[u8]) -> Result<Vec<NetworkServer>, ServiceError> {
    let servers: Vec<NetworkServer> =
        serde_json::from_slice(bytes).map_err(|e| ServiceError::Json(e.to_string()))?;
    Ok(servers
        .into_iter()
        .filter(|s| s.clients_connection_allowed)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_server_list() {
        let json = br#"[
            {"ident":"USA-EAST","hostname_or_ip":"198.51.100.10","location":"New York","name":"USA-EAST","clients_connection_allowed":1,"client_connections_allowed":true,"is_sweatbox":false},
            {"ident":"SWEATBOX","hostname_or_ip":"sweatbox.example.net","location":"Nowhere","name":"SWEATBOX","clients_connection_allowed":0}
        ]"#;

        let servers = parse_servers(json).unwrap();
        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].ident, "USA-EAST");
        assert_eq!(servers[0].location, "New York");
    }

    #[test]
    fn test_boolean_flag_accepted() {
        let json = br#"[{"ident":"A","hostname_or_ip":"a.example.net","clients_connection_allowed":true}]"#;
        let servers = parse_servers(json).unwrap();
        assert!(servers[0].clients_connection_allowed);
        assert_eq!(servers[0].name, "");
    }

    #[test]
    fn test_address_adds_default_port() {
        let server = NetworkServer {
            ident: "A".to_string(),
            hostname_or_ip: "fsd.example.net".to_string(),
            location: String::new(),
            name: String::new(),
            clients_connection_allowed: true,
        };
        assert_eq!(server.address(), "fsd.example.net:6809");

        let with_port = NetworkServer {
            hostname_or_ip: "127.0.0.1:7000".to_string(),
            ..server
        };
        assert_eq!(with_port.address(), "127.0.0.1:7000");
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(parse_servers(b"nope"), Err(ServiceError::Json(_))));
    }
}
