//! Listener lifecycle.
//!
//! `UdpListener` owns at most one receive thread. `start` binds the listen
//! socket and spawns the thread, `stop` signals it and joins, and `Drop`
//! always stops. The slot lock is held across the join so a concurrent
//! `start` cannot overlap a thread that is still shutting down.

use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use socket2::{Domain, Protocol, Socket, Type};

use super::receiver::{shutdown_channel, DetectionCounter, ReceiveLoop, ShutdownSignal};
use crate::config::Config;
use crate::error::ListenerError;
use crate::messaging::ComponentPort;
use crate::state::ListenerState;

const LISTENER_THREAD_NAME: &str = "udp-detection-listener";

/// A zero read timeout means "block forever", which would make stop() hang
const MIN_RECV_TIMEOUT: Duration = Duration::from_millis(1);

/// Socket and loop parameters for the listener
#[derive(Debug, Clone)]
pub struct ListenerSettings {
    pub listen_addr: SocketAddr,
    pub recv_timeout: Duration,
    pub poll_delay: Duration,
    pub buffer_size: usize,
}

impl From<&Config> for ListenerSettings {
    fn from(config: &Config) -> Self {
        Self {
            listen_addr: config.listen_addr,
            recv_timeout: config.recv_timeout(),
            poll_delay: config.poll_delay(),
            buffer_size: config.buffer_size,
        }
    }
}

struct RunningListener {
    shutdown: ShutdownSignal,
    handle: thread::JoinHandle<()>,
    local_addr: SocketAddr,
    since: Instant,
}

pub struct UdpListener {
    settings: ListenerSettings,
    port: Arc<dyn ComponentPort>,
    slot: Mutex<Option<RunningListener>>,
}

impl UdpListener {
    pub fn new(settings: ListenerSettings, port: Arc<dyn ComponentPort>) -> Self {
        Self {
            settings,
            port,
            slot: Mutex::new(None),
        }
    }

    /// Bind and spawn the receive loop. A no-op while already running.
    pub fn start(&self, counter: &DetectionCounter) -> Result<(), ListenerError> {
        let mut slot = self.slot.lock();
        if slot.is_some() {
            tracing::info!("Detection listener already running");
            return Ok(());
        }

        let socket = self.open_socket()?;
        let local_addr = socket.local_addr().unwrap_or(self.settings.listen_addr);
        let (shutdown, token) = shutdown_channel();

        let receive_loop = ReceiveLoop {
            socket,
            port: Arc::clone(&self.port),
            counter: counter.clone(),
            shutdown: token,
            poll_delay: self.settings.poll_delay,
            buffer_size: self.settings.buffer_size,
        };

        let handle = thread::Builder::new()
            .name(LISTENER_THREAD_NAME.to_owned())
            .spawn(move || receive_loop.run())
            .map_err(ListenerError::ThreadSpawn)?;

        *slot = Some(RunningListener {
            shutdown,
            handle,
            local_addr,
            since: Instant::now(),
        });
        Ok(())
    }

    /// Signal the receive loop and wait for it to exit. Safe to repeat.
    pub fn stop(&self) {
        let mut slot = self.slot.lock();
        let Some(running) = slot.take() else {
            return;
        };

        running.shutdown.trigger();
        if running.handle.join().is_err() {
            tracing::error!("Detection listener thread panicked");
        }
        tracing::info!(
            "Detection listener on {} joined after {:?}",
            running.local_addr,
            running.since.elapsed()
        );
    }

    pub fn state(&self) -> ListenerState {
        match self.slot.lock().as_ref() {
            Some(running) => ListenerState::Running {
                since: running.since,
            },
            None => ListenerState::Stopped,
        }
    }

    pub fn is_running(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Address actually bound by the running listener
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.slot.lock().as_ref().map(|running| running.local_addr)
    }

    fn open_socket(&self) -> Result<UdpSocket, ListenerError> {
        let addr = self.settings.listen_addr;
        let socket = Socket::new(Domain::for_address(addr), Type::DGRAM, Some(Protocol::UDP))
            .map_err(ListenerError::SocketCreate)?;

        if let Err(source) = socket.set_reuse_address(true) {
            self.option_failed("SO_REUSEADDR", source);
        }
        if let Err(source) = set_reuse_port(&socket) {
            self.option_failed("SO_REUSEPORT", source);
        }

        socket
            .bind(&addr.into())
            .map_err(|source| ListenerError::Bind { addr, source })?;

        let recv_timeout = self.settings.recv_timeout.max(MIN_RECV_TIMEOUT);
        if let Err(source) = socket.set_read_timeout(Some(recv_timeout)) {
            self.option_failed("SO_RCVTIMEO", source);
        }

        Ok(socket.into())
    }

    fn option_failed(&self, option: &'static str, source: io::Error) {
        let err = ListenerError::OptionSet { option, source };
        let message = format!("{:#}", anyhow::Error::from(err));
        tracing::warn!("{}", message);
        self.port.log_object_detected(&message);
    }
}

impl Drop for UdpListener {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(all(unix, not(any(target_os = "solaris", target_os = "illumos"))))]
fn set_reuse_port(socket: &Socket) -> io::Result<()> {
    socket.set_reuse_port(true)
}

#[cfg(not(all(unix, not(any(target_os = "solaris", target_os = "illumos")))))]
fn set_reuse_port(_socket: &Socket) -> io::Result<()> {
    Ok(())
}
