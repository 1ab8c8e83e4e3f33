use std::io::ErrorKind;
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use log::{debug, warn};
use serde::Serialize;
use tokio::net::UdpSocket;
use tokio::time::timeout;

use crate::address::Address;
use crate::conf::millis;
use crate::error::QueryError;
use crate::packet::{InfoPacket, RequestPacket, MAX_DATAGRAM};

/// Node status as obtained by [query_status].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStatus {
    pub success: bool,
    /// Round trip in milliseconds, or the timeout if none arrived.
    pub response_time_ms: u64,
    /// Attributes in the order the node sent them, e.g.:
    /// - `hostname`
    /// - `mapname`, `gametype`
    /// - `clients`, `sv_maxclients`
    pub fields: IndexMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NodeStatus {
    fn failed(response_time_ms: u64, error: &QueryError) -> Self {
        NodeStatus {
            success: false,
            response_time_ms,
            fields: IndexMap::new(),
            error: Some(error.to_string()),
        }
    }
}

/// Query `address` with a `getinfo` request.
///
/// `timeout_dur` bounds the whole exchange (connect, send, receive).
/// Never fails: a timeout, transport error or malformed reply is reported as
/// `success == false` with `error` set. On timeout `response_time_ms` is
/// exactly `timeout_dur`.
pub async fn query_status(address: &Address, timeout_dur: Duration) -> NodeStatus {
    let started = Instant::now();

    match timeout(timeout_dur, exchange(address)).await {
        Ok(Ok(fields)) => {
            let response_time_ms = millis(started.elapsed());
            debug!("{address} answered in {response_time_ms} ms with {} field(s)", fields.len());
            NodeStatus {
                success: true,
                response_time_ms,
                fields,
                error: None,
            }
        }
        Ok(Err(e)) => {
            warn!("{address} status failed: {e}");
            NodeStatus::failed(millis(started.elapsed()), &e)
        }
        Err(elapsed) => {
            warn!("{address} status timed out after {} ms", timeout_dur.as_millis());
            NodeStatus::failed(millis(timeout_dur), &QueryError::from(elapsed))
        }
    }
}

/// One request, one reply. The socket lives only as long as this future,
/// so it is released whether the exchange completes or is cancelled by a timeout.
async fn exchange(address: &Address) -> Result<IndexMap<String, String>, QueryError> {
    let sock: UdpSocket = UdpSocket::bind("0.0.0.0:0")
        .await
        .map_err(QueryError::FailedPortBind)?;

    // connecting, so only the node's replies reach us
    sock.connect((address.host.as_str(), address.port))
        .await
        .map_err(QueryError::UnreachableHost)?;

    sock.send(&RequestPacket::get_info().pack())
        .await
        .map_err(QueryError::SendError)?;

    let mut resp_buf = vec![0u8; MAX_DATAGRAM];
    let len = loop {
        match sock.recv(&mut resp_buf).await {
            Ok(len) => break len,
            // ICMP port unreachable; only the timeout ends the wait
            Err(e) if e.kind() == ErrorKind::ConnectionRefused => {
                debug!("{address} refused getinfo, still waiting");
            }
            Err(e) => return Err(QueryError::ReceiveError(e)),
        }
    };

    Ok(InfoPacket::unpack(&resp_buf[..len])?.into_fields())
}
