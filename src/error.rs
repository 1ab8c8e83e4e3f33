use thiserror::Error;

/// Every way a query stage can fail.
///
/// Per-node stages never return these to the caller directly; they are
/// folded into the `error` field of [crate::info::NodeStatus] or
/// [crate::enrich::EnrichmentResult] using their [Display](std::fmt::Display) text.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("failed to bind local UDP socket: {0}")]
    FailedPortBind(#[source] std::io::Error),
    #[error("host is unreachable: {0}")]
    UnreachableHost(#[source] std::io::Error),
    #[error("failed to send datagram: {0}")]
    SendError(#[source] std::io::Error),
    #[error("failed to receive datagram: {0}")]
    ReceiveError(#[source] std::io::Error),
    #[error("timeout exceeded")]
    Timeout(#[from] tokio::time::error::Elapsed),
    #[error("invalid address format: {0:?} (expected host:port)")]
    InvalidAddressFormat(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("unexpected HTTP status {0}")]
    UnexpectedStatus(reqwest::StatusCode),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed JSON body: {0}")]
    Json(#[from] serde_json::Error),
}
