//! Connectionless transport to the log server

use crate::core::{AnalyticsError, Result};
use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

/// Sends one datagram per log line
pub trait Transport: Send {
    fn send_datagram(&self, host: &str, port: u16, payload: &[u8]) -> Result<()>;
}

/// UDP transport opening a fresh socket for every send
pub struct UdpTransport {
    send_timeout: Duration,
}

impl UdpTransport {
    pub fn new(send_timeout: Duration) -> Self {
        Self { send_timeout }
    }

    fn resolve(host: &str, port: u16) -> io::Result<SocketAddr> {
        (host, port).to_socket_addrs()?.next().ok_or_else(|| {
            io::Error::new(io::ErrorKind::AddrNotAvailable, "host resolved to no addresses")
        })
    }
}

impl Transport for UdpTransport {
    fn send_datagram(&self, host: &str, port: u16, payload: &[u8]) -> Result<()> {
        let send = || -> io::Result<()> {
            let addr = Self::resolve(host, port)?;
            let bind = if addr.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };

            let socket = UdpSocket::bind(bind)?;
            socket.set_write_timeout(Some(self.send_timeout))?;

            let sent = socket.send_to(payload, addr)?;
            if sent < payload.len() {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    format!("datagram truncated: {} of {} bytes sent", sent, payload.len()),
                ));
            }
            Ok(())
        };

        send().map_err(|e| AnalyticsError::transmission(host, port, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sends_datagram_to_local_receiver() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
        let port = receiver.local_addr().unwrap().port();

        let transport = UdpTransport::new(Duration::from_secs(1));
        transport.send_datagram("127.0.0.1", port, b"checkout").unwrap();

        let mut buf = [0u8; 64];
        let (len, _) = receiver.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..len], b"checkout");
    }

    #[test]
    fn test_unresolvable_host_is_transmission_error() {
        let transport = UdpTransport::new(Duration::from_secs(1));
        let err = transport
            .send_datagram("host.invalid", 5958, b"x")
            .unwrap_err();

        assert!(matches!(err, AnalyticsError::Transmission { port: 5958, .. }));
    }
}
