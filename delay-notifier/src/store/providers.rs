//! Provider listing client.

use async_trait::async_trait;
use chrono::Duration;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::{MAX_DISPLAY_MINUTES, Provider, ProviderId, ProviderKind, StationCode};

use super::ProviderSource;
use super::client::{ApiClient, expect_status};
use super::error::StoreError;

/// One entry of the provider listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderDto {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "type", default)]
    pub kind: Option<String>,

    /// Route settings for the `NJTransit` kind.
    #[serde(default)]
    pub njtransit: Option<TransitRouteDto>,

    /// Display duration override, in minutes.
    #[serde(default)]
    pub duration: Option<i64>,
}

/// Route settings of a transit-delay provider.
#[derive(Debug, Clone, Deserialize)]
pub struct TransitRouteDto {
    pub orig_station_code: String,
    pub dest_station_code: String,
}

/// Why a listing entry was not turned into a [`Provider`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    #[error("unsupported provider type {0:?}")]
    UnsupportedKind(Option<String>),

    #[error("missing route settings")]
    MissingRoute,

    #[error("{0}")]
    Invalid(String),
}

impl ProviderDto {
    /// Convert to a domain provider.
    pub fn into_provider(self) -> Result<Provider, SkipReason> {
        let kind = self
            .kind
            .as_deref()
            .and_then(ProviderKind::from_tag)
            .ok_or_else(|| SkipReason::UnsupportedKind(self.kind.clone()))?;

        let id = ProviderId::new(self.id).map_err(|e| SkipReason::Invalid(e.to_string()))?;

        let provider = match kind {
            ProviderKind::TransitDelay => {
                let route = self.njtransit.ok_or(SkipReason::MissingRoute)?;
                let origin = StationCode::parse(&route.orig_station_code)
                    .map_err(|e| SkipReason::Invalid(e.to_string()))?;
                let destination = StationCode::parse(&route.dest_station_code)
                    .map_err(|e| SkipReason::Invalid(e.to_string()))?;
                Provider::transit_delay(id, origin, destination)
            }
        };

        let Some(minutes) = self.duration else {
            return Ok(provider);
        };
        match Duration::try_minutes(minutes) {
            Some(duration) if (1..=MAX_DISPLAY_MINUTES).contains(&minutes) => {
                Ok(provider.with_display_duration(duration))
            }
            _ => Err(SkipReason::Invalid(format!(
                "duration must be between 1 and {MAX_DISPLAY_MINUTES} minutes, got {minutes}"
            ))),
        }
    }
}

/// Parse a provider listing, skipping entries that can't be served.
///
/// Entries of an unknown kind or with broken settings are logged and
/// dropped; they never fail the listing as a whole.
pub fn parse_providers(payload: Vec<Value>) -> Vec<Provider> {
    payload
        .into_iter()
        .filter_map(|item| {
            debug!(%item, "parsing provider");
            let dto: ProviderDto = match serde_json::from_value(item) {
                Ok(dto) => dto,
                Err(e) => {
                    warn!(error = %e, "skipping malformed provider entry");
                    return None;
                }
            };

            let id = dto.id.clone();
            match dto.into_provider() {
                Ok(provider) => Some(provider),
                Err(reason) => {
                    warn!(provider = %id, %reason, "skipping provider");
                    None
                }
            }
        })
        .collect()
}

/// Provider listing over HTTP.
#[derive(Debug, Clone)]
pub struct HttpProviderSource {
    api: ApiClient,
}

impl HttpProviderSource {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ProviderSource for HttpProviderSource {
    async fn list_providers(&self) -> Result<Vec<Provider>, StoreError> {
        let response = self.api.get("providers", self.api.timeout).send().await?;
        let response = expect_status(response, &[StatusCode::OK]).await?;

        let body = response.text().await?;
        let payload: Vec<Value> = serde_json::from_str(&body).map_err(|e| StoreError::Json {
            message: e.to_string(),
        })?;

        Ok(parse_providers(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_transit_provider() {
        let providers = parse_providers(vec![json!({
            "_id": "0b6c",
            "type": "NJTransit",
            "njtransit": {"orig_station_code": "ST", "dest_station_code": "NY"}
        })]);

        assert_eq!(providers.len(), 1);
        let p = &providers[0];
        assert_eq!(p.id.as_str(), "0b6c");
        assert_eq!(p.kind, ProviderKind::TransitDelay);
        assert_eq!(p.route.origin.as_str(), "ST");
        assert_eq!(p.route.destination.as_str(), "NY");
        assert_eq!(p.display_duration, Duration::minutes(15));
    }

    #[test]
    fn duration_override() {
        let providers = parse_providers(vec![json!({
            "_id": "a",
            "type": "NJTransit",
            "duration": 45,
            "njtransit": {"orig_station_code": "ST", "dest_station_code": "NY"}
        })]);
        assert_eq!(providers[0].display_duration, Duration::minutes(45));
    }

    #[test]
    fn out_of_range_durations_are_skipped() {
        let entry = |duration: i64| {
            json!({"_id": "p", "type": "NJTransit", "duration": duration,
                   "njtransit": {"orig_station_code": "ST", "dest_station_code": "NY"}})
        };

        assert!(parse_providers(vec![entry(i64::MAX)]).is_empty());
        assert!(parse_providers(vec![entry(1_000_000_000_000)]).is_empty());
        assert!(parse_providers(vec![entry(-5)]).is_empty());
        assert!(parse_providers(vec![entry(MAX_DISPLAY_MINUTES + 1)]).is_empty());

        let week = parse_providers(vec![entry(MAX_DISPLAY_MINUTES)]);
        assert_eq!(week[0].display_duration, Duration::days(7));
    }

    #[test]
    fn skips_unknown_and_broken_entries() {
        let providers = parse_providers(vec![
            json!({"_id": "w", "type": "Weather", "weather": {}}),
            json!({"_id": "x"}),
            json!({"_id": "y", "type": "NJTransit"}),
            json!({"_id": "z", "type": "NJTransit",
                   "njtransit": {"orig_station_code": "NOT A CODE", "dest_station_code": "NY"}}),
            json!({"_id": "d", "type": "NJTransit", "duration": 0,
                   "njtransit": {"orig_station_code": "ST", "dest_station_code": "NY"}}),
            json!("garbage"),
            json!({"_id": "ok", "type": "NJTransit",
                   "njtransit": {"orig_station_code": "HB", "dest_station_code": "ND"}}),
        ]);

        assert_eq!(providers.len(), 1);
        assert_eq!(providers[0].id.as_str(), "ok");
    }

    #[test]
    fn skip_reasons() {
        let dto = ProviderDto {
            id: "w".into(),
            kind: Some("Weather".into()),
            njtransit: None,
            duration: None,
        };
        assert_eq!(
            dto.into_provider(),
            Err(SkipReason::UnsupportedKind(Some("Weather".into())))
        );

        let dto = ProviderDto {
            id: "y".into(),
            kind: Some("NJTransit".into()),
            njtransit: None,
            duration: None,
        };
        assert_eq!(dto.into_provider(), Err(SkipReason::MissingRoute));
    }
}
