use std::time::Duration;

use log::{debug, info, warn};
use tokio::net::UdpSocket;
use tokio::time::{timeout_at, Instant};

use crate::address::Address;
use crate::error::QueryError;
use crate::packet::{RequestPacket, ServerListPacket, MAX_DATAGRAM};

/// Ask the directory at `host:port` for every node it knows about.
///
/// Datagrams are collected until `window` elapses, even after an
/// end-of-transmission record: the directory may spread its list over several
/// datagrams and gives no reliable signal that the last one has arrived.
/// Hearing nothing is not an error, the result is just empty.
///
/// Only binding the socket or sending the request can fail.
///
/// Example usage:
/// ```no_run
/// # async fn run() -> Result<(), rfivemquery::error::QueryError> {
/// use std::time::Duration;
/// let servers = rfivemquery::master::discover("updater.fivereborn.com", 30110, Duration::from_secs(1)).await?;
/// # Ok(())
/// # }
/// ```
pub async fn discover(host: &str, port: u16, window: Duration) -> Result<Vec<Address>, QueryError> {
    let deadline = Instant::now() + window;

    // just arbitrarily bind any port, doesn't matter really
    let sock: UdpSocket = UdpSocket::bind("0.0.0.0:0")
        .await
        .map_err(QueryError::FailedPortBind)?;

    let req_packet = RequestPacket::get_servers();
    sock.send_to(&req_packet.pack(), (host, port))
        .await
        .map_err(QueryError::SendError)?;
    debug!("sent getservers to {host}:{port}");

    let mut servers: Vec<Address> = Vec::new();
    let mut resp_buf = vec![0u8; MAX_DATAGRAM];
    loop {
        let (len, from) = match timeout_at(deadline, sock.recv_from(&mut resp_buf)).await {
            // collection window closed
            Err(_) => break,
            Ok(Ok(received)) => received,
            Ok(Err(e)) => {
                warn!("directory {host}:{port} receive failed, keeping {} server(s): {e}", servers.len());
                break;
            }
        };

        match ServerListPacket::unpack(&resp_buf[..len]) {
            Ok(packet) => {
                debug!(
                    "{} server(s) from {from}{}",
                    packet.servers().len(),
                    if packet.end_of_transmission() { ", EOT seen" } else { "" }
                );
                servers.extend(packet.into_servers());
            }
            Err(e) => warn!("skipping datagram from {from}: {e}"),
        }
    }

    info!("directory {host}:{port} listed {} server(s)", servers.len());
    Ok(servers)
}
