//! Voice-routing alias stations.

use serde::{Deserialize, Serialize};

/// A voice-routing alias entry from the voice service.
///
/// An alias redirects audio tuned on a legacy channel (`frequency_alias`) to
/// the transceiver frequency the station actually uses (`frequency`). The
/// field names follow the voice service JSON:
///
/// ```json
/// {"id": "b1c7...", "name": "EDGG_KTG_CTR", "frequency": 136955000, "frequencyAlias": 136950000}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasStation {
    pub id: String,
    #[serde(rename = "name")]
    pub callsign: String,
    /// Target frequency in Hertz.
    #[serde(default)]
    pub frequency: Option<u32>,
    /// Legacy frequency in Hertz that is redirected to `frequency`.
    #[serde(rename = "frequencyAlias", default)]
    pub frequency_alias: Option<u32>,
}

impl AliasStation {
    /// Both ends of the alias, if the entry is usable for routing.
    pub fn alias_pair(&self) -> Option<(u32, u32)> {
        match (self.frequency, self.frequency_alias) {
            (Some(target), Some(alias)) if target > 0 && alias > 0 => Some((target, alias)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_voice_service_entry() {
        let json = r#"{"id":"abc","name":"EDGG_KTG_CTR","frequency":136955000,"frequencyAlias":136950000}"#;
        let station: AliasStation = serde_json::from_str(json).unwrap();
        assert_eq!(station.callsign, "EDGG_KTG_CTR");
        assert_eq!(station.alias_pair(), Some((136_955_000, 136_950_000)));
    }

    #[test]
    fn test_missing_alias_is_not_routable() {
        let json = r#"{"id":"abc","name":"EDDF_TWR","frequency":119900000,"frequencyAlias":null}"#;
        let station: AliasStation = serde_json::from_str(json).unwrap();
        assert_eq!(station.frequency_alias, None);
        assert_eq!(station.alias_pair(), None);
    }

    #[test]
    fn test_missing_fields_default_to_none() {
        let json = r#"{"id":"abc","name":"EDDF_TWR"}"#;
        let station: AliasStation = serde_json::from_str(json).unwrap();
        assert!(station.frequency.is_none());
        assert!(station.alias_pair().is_none());
    }
}
