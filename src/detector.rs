/// Object detector component
///
/// Turns StartDetection/StopDetection commands into UDP triggers for the Pi
/// and manages the local detection listener. Commands are fire-and-forget:
/// send and bind failures go to the event log and every command is still
/// acknowledged `Ok`.
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::Config;
use crate::link::{DetectionCounter, ListenerSettings, Trigger, TriggerSender, UdpListener};
use crate::messaging::{Command, CommandId, CommandResponse, ComponentPort, Telemetry};
use crate::state::ListenerState;

pub struct ObjectDetector {
    port: Arc<dyn ComponentPort>,
    sender: TriggerSender,
    listener: UdpListener,
    counter: DetectionCounter,
}

impl ObjectDetector {
    pub fn new(config: &Config, port: Arc<dyn ComponentPort>) -> Self {
        if let Err(err) = config.validate() {
            warn!("{err}; the listener clamps out-of-range values");
        }

        Self {
            sender: TriggerSender::new(config.peer_addr),
            listener: UdpListener::new(ListenerSettings::from(config), Arc::clone(&port)),
            counter: DetectionCounter::new(),
            port,
        }
    }

    /// Dispatch one command to its handler
    pub fn handle(&self, command: &Command) {
        match *command {
            Command::StartDetection { id, trigger } => self.start_detection(id, trigger),
            Command::StopDetection { id, trigger } => self.stop_detection(id, trigger),
            Command::Quit => {}
        }
    }

    /// Ensure the listener runs and send "1" to the Pi. `trigger` is not inspected.
    pub fn start_detection(&self, id: CommandId, trigger: u32) {
        info!(trigger, "StartDetection command received");
        self.narrate(&format!(
            "StartDetection command: sending trigger '1' to Pi {}",
            self.sender.peer()
        ));

        if let Err(err) = self.listener.start(&self.counter) {
            self.report_failure(err);
        }

        match self.sender.send(Trigger::Start) {
            Ok(()) => info!("Sent UDP trigger '1' to {}", self.sender.peer()),
            Err(err) => self.report_failure(err),
        }

        self.port.command_response(id, CommandResponse::Ok);
    }

    /// With `trigger == 0`, send "0" to the Pi and join the listener.
    /// Any other value is logged and ignored.
    pub fn stop_detection(&self, id: CommandId, trigger: u32) {
        if trigger == 0 {
            self.narrate(
                "StopDetection command: trigger 0 received, sending trigger '0' to Pi and stopping UDP reception",
            );

            match self.sender.send(Trigger::Stop) {
                Ok(()) => info!("Sent UDP trigger '0' to {}", self.sender.peer()),
                Err(err) => self.report_failure(err),
            }

            self.listener.stop();
        } else {
            self.narrate("StopDetection command: non-zero trigger received, ignoring");
        }

        self.port.command_response(id, CommandResponse::Ok);
    }

    /// Publish the current telemetry snapshot
    pub fn report_telemetry(&self) {
        self.port.telemetry(Telemetry {
            detection_count: self.detection_count(),
            listener_running: self.listener.is_running(),
        });
    }

    pub fn detection_count(&self) -> u64 {
        self.counter.get()
    }

    pub fn listener_state(&self) -> ListenerState {
        self.listener.state()
    }

    /// Bound listener address while running
    pub fn listen_addr(&self) -> Option<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.sender.peer()
    }

    fn narrate(&self, message: &str) {
        self.port.log_object_detected(message);
    }

    fn report_failure(&self, err: impl Into<anyhow::Error>) {
        let message = format!("{:#}", err.into());
        error!("{}", message);
        self.port.log_object_detected(&message);
    }
}
