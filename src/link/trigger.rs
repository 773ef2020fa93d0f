//! Trigger sender.
//!
//! A trigger is one ASCII byte sent to the Pi: `"1"` starts detection on the
//! device, `"0"` stops it. Every send uses a fresh ephemeral socket that is
//! dropped before returning, whatever the outcome.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};

use crate::error::TriggerError;

/// Trigger message understood by the Pi
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Start,
    Stop,
}

impl Trigger {
    /// ASCII character carried on the wire
    pub fn as_char(self) -> char {
        match self {
            Trigger::Start => '1',
            Trigger::Stop => '0',
        }
    }

    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            Trigger::Start => b"1",
            Trigger::Stop => b"0",
        }
    }

    /// Interpret a received payload the way the Pi does: surrounding
    /// whitespace is ignored, anything other than "1"/"0" is unknown.
    pub fn parse(payload: &[u8]) -> Option<Self> {
        match payload.trim_ascii() {
            b"1" => Some(Trigger::Start),
            b"0" => Some(Trigger::Stop),
            _ => None,
        }
    }
}

/// Sends triggers to a fixed peer
#[derive(Debug, Clone)]
pub struct TriggerSender {
    peer: SocketAddr,
}

impl TriggerSender {
    pub fn new(peer: SocketAddr) -> Self {
        Self { peer }
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Send one trigger datagram. At most once; no acknowledgement is awaited.
    pub fn send(&self, trigger: Trigger) -> Result<(), TriggerError> {
        let local: SocketAddr = if self.peer.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(local).map_err(TriggerError::SocketCreate)?;

        socket
            .send_to(trigger.as_bytes(), self.peer)
            .map_err(|source| TriggerError::Send {
                trigger: trigger.as_char(),
                peer: self.peer,
                source,
            })?;

        tracing::debug!("Sent UDP trigger '{}' to {}", trigger.as_char(), self.peer);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_trigger_wire_bytes() {
        assert_eq!(Trigger::Start.as_bytes(), b"1");
        assert_eq!(Trigger::Stop.as_bytes(), b"0");
        assert_eq!(Trigger::Start.as_char(), '1');
        assert_eq!(Trigger::Stop.as_char(), '0');
    }

    #[test]
    fn test_trigger_parse() {
        assert_eq!(Trigger::parse(b"1"), Some(Trigger::Start));
        assert_eq!(Trigger::parse(b"0\n"), Some(Trigger::Stop));
        assert_eq!(Trigger::parse(b" 1 "), Some(Trigger::Start));
        assert_eq!(Trigger::parse(b"2"), None);
        assert_eq!(Trigger::parse(b""), None);
    }

    #[test]
    fn test_send_reaches_loopback_peer() {
        let peer = UdpSocket::bind("127.0.0.1:0").unwrap();
        peer.set_read_timeout(Some(Duration::from_secs(2))).unwrap();

        let sender = TriggerSender::new(peer.local_addr().unwrap());
        sender.send(Trigger::Start).unwrap();
        sender.send(Trigger::Stop).unwrap();

        let mut buf = [0u8; 16];
        let (n, _) = peer.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"1");
        let (n, _) = peer.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"0");
    }

    #[test]
    fn test_send_failure_is_reported() {
        // Port 0 is not a valid destination
        let sender = TriggerSender::new("127.0.0.1:0".parse().unwrap());
        match sender.send(Trigger::Start) {
            Err(TriggerError::Send { trigger, .. }) => assert_eq!(trigger, '1'),
            other => panic!("Expected send failure, got {:?}", other),
        }
    }
}
