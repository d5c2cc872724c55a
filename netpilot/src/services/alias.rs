//! Voice service alias-station client.
//!
//! The voice service publishes the stations whose audio is routed from a
//! legacy channel to a different transceiver frequency. The
//! [`AliasStationClient`] trait lets the adapter run against any source of
//! that table; [`HttpAliasStationClient`] fetches it over HTTP.

use std::future::Future;
use std::time::Duration;

use super::error::ServiceError;
use crate::registry::AliasStation;

/// HTTP timeout for fetching the alias table.
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of the alias-station table.
pub trait AliasStationClient: Send + Sync {
    /// Fetch the complete current table.
    fn fetch_alias_stations(
        &self,
    ) -> impl Future<Output = Result<Vec<AliasStation>, ServiceError>> + Send;
}

/// Alias-station client using direct HTTP requests.
pub struct HttpAliasStationClient {
    http: reqwest::Client,
    url: String,
}

impl HttpAliasStationClient {
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

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl AliasStationClient for HttpAliasStationClient {
    async fn fetch_alias_stations(&self) -> Result<Vec<AliasStation>, ServiceError> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ServiceError::Http(e.to_string()))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ServiceError::Http(e.to_string()))?;

        let stations = parse_alias_stations(&bytes)?;
        tracing::debug!(stations = stations.len(), "Alias station table fetched");
        Ok(stations)
    }
}

fn parse_alias_stations(bytes: &[u8]) -> Result<Vec<AliasStation>, ServiceError> {
    serde_json::from_slice(bytes).map_err(|e| ServiceError::Json(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::DEFAULT_ALIAS_URL;

    #[test]
    fn test_client_creation() {
        let client = HttpAliasStationClient::new(DEFAULT_ALIAS_URL).unwrap();
        assert_eq!(client.url(), DEFAULT_ALIAS_URL);
    }

    #[test]
    fn test_parse_table() {
        let json = br#"[
            {"id":"a1","name":"EDGG_KTG_CTR","frequency":136955000,"frequencyAlias":136950000},
            {"id":"b2","name":"LON_S_CTR","frequency":129425000,"frequencyAlias":129420000,"extra":1}
        ]"#;

        let stations = parse_alias_stations(json).unwrap();
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[1].callsign, "LON_S_CTR");
        assert_eq!(stations[1].alias_pair(), Some((129_425_000, 129_420_000)));
    }

    #[test]
    fn test_parse_rejects_non_array() {
        let result = parse_alias_stations(br#"{"stations":[]}"#);
        assert!(matches!(result, Err(ServiceError::Json(_))));
    }
}
