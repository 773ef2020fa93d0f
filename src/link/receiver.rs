//! Receive loop for detection notifications.
//!
//! Runs on the listener thread. Each iteration checks the shutdown token,
//! waits up to the socket read timeout for one datagram, reports it, then
//! pauses for the poll delay. The pause waits on the shutdown channel, so a
//! stop request cuts it short.

use std::io;
use std::net::UdpSocket;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};

use crate::messaging::ComponentPort;

/// Number of detection datagrams received. Shared read-only outside the loop.
#[derive(Debug, Clone, Default)]
pub struct DetectionCounter(Arc<AtomicU64>);

impl DetectionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub(crate) fn increment(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Sending half of a one-shot shutdown request
#[derive(Debug)]
pub struct ShutdownSignal(Sender<()>);

/// Receiving half, polled by the receive loop
#[derive(Debug)]
pub struct ShutdownToken(Receiver<()>);

/// Create a fresh signal/token pair for one listener thread
pub fn shutdown_channel() -> (ShutdownSignal, ShutdownToken) {
    let (tx, rx) = bounded(1);
    (ShutdownSignal(tx), ShutdownToken(rx))
}

impl ShutdownSignal {
    /// Request shutdown. Dropping the signal has the same effect.
    pub fn trigger(self) {
        let _ = self.0.try_send(());
    }
}

impl ShutdownToken {
    /// True once shutdown was requested or the signal was dropped
    pub fn is_set(&self) -> bool {
        !matches!(self.0.try_recv(), Err(TryRecvError::Empty))
    }

    /// Sleep for `delay`, returning early (true) on shutdown
    pub fn wait(&self, delay: Duration) -> bool {
        !matches!(self.0.recv_timeout(delay), Err(RecvTimeoutError::Timeout))
    }
}

/// Everything the listener thread owns
pub struct ReceiveLoop {
    pub socket: UdpSocket,
    pub port: Arc<dyn ComponentPort>,
    pub counter: DetectionCounter,
    pub shutdown: ShutdownToken,
    pub poll_delay: Duration,
    pub buffer_size: usize,
}

impl ReceiveLoop {
    /// Run until shutdown is observed. The socket is closed on return.
    pub fn run(self) {
        tracing::info!(
            "Detection listener started on {}",
            self.socket
                .local_addr()
                .map(|a| a.to_string())
                .unwrap_or_else(|_| "unknown".to_string())
        );

        let mut buffer = vec![0u8; self.buffer_size.max(2)];
        let readable = buffer.len() - 1;

        while !self.shutdown.is_set() {
            buffer.fill(0);

            match self.socket.recv_from(&mut buffer[..readable]) {
                Ok((0, _)) => {}
                Ok((len, sender)) => {
                    let message = decode_message(&buffer[..len]);
                    tracing::debug!("Detection datagram from {}: {}", sender, message);
                    self.port.log_object_detected(&message);
                    let total = self.counter.increment();
                    tracing::trace!(total, "Detection counter incremented");
                }
                Err(e) if is_timeout(&e) => {}
                Err(e) => {
                    tracing::warn!("UDP recv error: {}", e);
                }
            }

            if self.shutdown.wait(self.poll_delay) {
                break;
            }
        }

        tracing::info!("Detection listener stopped");
    }
}

fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}

/// Text up to the first NUL, invalid UTF-8 replaced
fn decode_message(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
