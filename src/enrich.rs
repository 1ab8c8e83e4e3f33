use std::time::{Duration, Instant};

use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;

use crate::address::Address;
use crate::conf::millis;
use crate::error::QueryError;

/// HTTP documents a node serves next to its UDP endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Document {
    /// `/info.json` -- resource manifest and server version.
    Resources,
    /// `/players.json` -- connected players.
    Players,
}

impl Document {
    pub fn path(&self) -> &'static str {
        match self {
            Document::Resources => "/info.json",
            Document::Players => "/players.json",
        }
    }
}

/// Outcome of fetching one [Document].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentResult {
    pub success: bool,
    pub response_time_ms: u64,
    /// The JSON body, passed through unmodified. `None` on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Enrichment state of a node inside an aggregate report.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum Enrichment {
    /// Skipped, because status failed or the profile does not ask for it.
    #[default]
    NotAttempted,
    #[serde(rename_all = "camelCase")]
    Failed { response_time_ms: u64, error: String },
    #[serde(rename_all = "camelCase")]
    Succeeded { response_time_ms: u64, payload: Value },
}

impl Enrichment {
    pub fn is_attempted(&self) -> bool {
        !matches!(self, Enrichment::NotAttempted)
    }
}

impl From<EnrichmentResult> for Enrichment {
    fn from(result: EnrichmentResult) -> Self {
        match (result.success, result.payload) {
            (true, Some(payload)) => Enrichment::Succeeded {
                response_time_ms: result.response_time_ms,
                payload,
            },
            _ => Enrichment::Failed {
                response_time_ms: result.response_time_ms,
                error: result.error.unwrap_or_default(),
            },
        }
    }
}

/// `GET http://{address}/info.json`.
pub async fn fetch_resources(address: &Address, timeout_dur: Duration) -> EnrichmentResult {
    fetch(address, Document::Resources, timeout_dur).await
}

/// `GET http://{address}/players.json`.
pub async fn fetch_players(address: &Address, timeout_dur: Duration) -> EnrichmentResult {
    fetch(address, Document::Players, timeout_dur).await
}

/// One attempt, no retries. `timeout_dur` is the HTTP client's own deadline,
/// so a timeout shows up as a transport error.
pub async fn fetch(address: &Address, document: Document, timeout_dur: Duration) -> EnrichmentResult {
    let started = Instant::now();
    let result = get_json(address, document, timeout_dur).await;
    let response_time_ms = millis(started.elapsed());

    match result {
        Ok(payload) => {
            debug!("{address}{} fetched in {response_time_ms} ms", document.path());
            EnrichmentResult {
                success: true,
                response_time_ms,
                payload: Some(payload),
                error: None,
            }
        }
        Err(e) => {
            warn!("{address}{} failed: {e}", document.path());
            EnrichmentResult {
                success: false,
                response_time_ms,
                payload: None,
                error: Some(e.to_string()),
            }
        }
    }
}

async fn get_json(address: &Address, document: Document, timeout_dur: Duration) -> Result<Value, QueryError> {
    let url = format!("http://{}:{}{}", address.host, address.port, document.path());
    // nodes are always contacted directly
    let client = reqwest::Client::builder()
        .timeout(timeout_dur)
        .no_proxy()
        .build()?;

    let response = client.get(&url).send().await?;
    if response.status() != reqwest::StatusCode::OK {
        return Err(QueryError::UnexpectedStatus(response.status()));
    }

    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_becomes_succeeded() {
        let result = EnrichmentResult {
            success: true,
            response_time_ms: 12,
            payload: Some(json!({"server": "1.0.0.0"})),
            error: None,
        };
        assert_eq!(
            Enrichment::from(result),
            Enrichment::Succeeded {
                response_time_ms: 12,
                payload: json!({"server": "1.0.0.0"})
            }
        );
    }

    #[test]
    fn failure_becomes_failed() {
        let result = EnrichmentResult {
            success: false,
            response_time_ms: 500,
            payload: None,
            error: Some("unexpected HTTP status 404 Not Found".into()),
        };
        let enrichment = Enrichment::from(result);
        assert!(enrichment.is_attempted());
        assert!(matches!(enrichment, Enrichment::Failed { response_time_ms: 500, .. }));
    }

    #[test]
    fn states_serialize_with_tag() {
        let json = serde_json::to_value(Enrichment::NotAttempted).unwrap();
        assert_eq!(json, json!({"state": "notAttempted"}));

        let json = serde_json::to_value(Enrichment::Failed {
            response_time_ms: 3,
            error: "boom".into(),
        })
        .unwrap();
        assert_eq!(json, json!({"state": "failed", "responseTimeMs": 3, "error": "boom"}));
    }
}
