/// Command executor
///
/// Serializes commands onto one processing thread and drives the
/// detector's periodic telemetry.

use crossbeam_channel::{never, select, tick, unbounded, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::bus::EventBus;
use super::commands::Command;
use super::events::Event;
use crate::detector::ObjectDetector;

/// Command executor that processes commands one at a time
pub struct CommandExecutor {
    command_tx: Sender<Command>,
    command_rx: Receiver<Command>,
    detector: Arc<ObjectDetector>,
    event_bus: EventBus,
}

impl CommandExecutor {
    /// Create a new command executor for a detector
    pub fn new(detector: Arc<ObjectDetector>, event_bus: EventBus) -> Self {
        let (tx, rx) = unbounded();

        Self {
            command_tx: tx,
            command_rx: rx,
            detector,
            event_bus,
        }
    }

    /// Get a sender for submitting commands
    pub fn sender(&self) -> Sender<Command> {
        self.command_tx.clone()
    }

    /// Execute a command immediately (blocking)
    pub fn execute_sync(&self, command: Command) {
        dispatch(&self.detector, &self.event_bus, command);
    }

    /// Queue a command for the processing thread
    pub fn execute(&self, command: Command) {
        let _ = self.command_tx.send(command);
    }

    /// Start the command processing loop in a background thread.
    ///
    /// With a telemetry interval the detector reports telemetry on every tick.
    /// The loop ends on `Quit` or once every sender is gone.
    pub fn start_processing(
        &self,
        telemetry_interval: Option<Duration>,
    ) -> std::io::Result<thread::JoinHandle<()>> {
        let rx = self.command_rx.clone();
        let detector = Arc::clone(&self.detector);
        let event_bus = self.event_bus.clone();

        thread::Builder::new()
            .name("command-executor".to_owned())
            .spawn(move || {
                tracing::info!("Command executor thread started");
                let ticker = telemetry_interval.map(tick).unwrap_or_else(never);

                loop {
                    select! {
                        recv(rx) -> command => match command {
                            Ok(Command::Quit) => {
                                tracing::info!("Quit command received, stopping executor");
                                dispatch(&detector, &event_bus, Command::Quit);
                                break;
                            }
                            Ok(command) => dispatch(&detector, &event_bus, command),
                            Err(_) => break,
                        },
                        recv(ticker) -> _ => detector.report_telemetry(),
                    }
                }

                tracing::info!("Command executor thread stopped");
            })
    }
}

fn dispatch(detector: &ObjectDetector, event_bus: &EventBus, command: Command) {
    tracing::info!("Executing command: {}", command.description());

    match command {
        Command::Quit => event_bus.publish(Event::Shutdown),
        command => detector.handle(&command),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::messaging::{CommandId, CommandResponse};
    use std::net::UdpSocket;

    fn executor_with_bus() -> (CommandExecutor, EventBus, UdpSocket) {
        let peer = UdpSocket::bind("127.0.0.1:0").unwrap();
        peer.set_read_timeout(Some(Duration::from_millis(500)))
            .unwrap();

        let config = Config {
            peer_addr: peer.local_addr().unwrap(),
            listen_addr: "127.0.0.1:0".parse().unwrap(),
            recv_timeout_ms: 200,
            poll_delay_ms: 20,
            ..Config::default()
        };
        let bus = EventBus::new();
        let detector = Arc::new(ObjectDetector::new(&config, Arc::new(bus.clone())));
        (CommandExecutor::new(detector, bus.clone()), bus, peer)
    }

    #[test]
    fn test_command_executor_sender() {
        let (executor, _bus, _peer) = executor_with_bus();
        let sender = executor.sender();
        assert!(sender.send(Command::Quit).is_ok());
    }

    #[test]
    fn test_execute_sync_acknowledges() {
        let (executor, bus, _peer) = executor_with_bus();
        let (rx, _id) = bus.subscribe();

        let id = CommandId::new(Command::STOP_DETECTION_OPCODE, 9);
        executor.execute_sync(Command::StopDetection { id, trigger: 0 });

        let completed = rx
            .try_iter()
            .filter_map(|event| match event {
                Event::CommandCompleted { id, response } => Some((id, response)),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(completed, vec![(id, CommandResponse::Ok)]);
    }

    #[test]
    fn test_quit_command_emits_shutdown_event() {
        let (executor, bus, _peer) = executor_with_bus();
        let (rx, _id) = bus.subscribe();

        executor.execute_sync(Command::Quit);

        match rx.try_recv().unwrap() {
            Event::Shutdown => {}
            other => panic!("Expected Shutdown event, got {:?}", other),
        }
    }

    #[test]
    fn test_processing_thread_runs_queued_commands_in_order() {
        let (executor, bus, peer) = executor_with_bus();
        let (rx, _id) = bus.subscribe();
        let handle = executor.start_processing(None).unwrap();

        let start = CommandId::new(Command::START_DETECTION_OPCODE, 1);
        let stop = CommandId::new(Command::STOP_DETECTION_OPCODE, 2);
        executor.execute(Command::StartDetection { id: start, trigger: 1 });
        executor.execute(Command::StopDetection { id: stop, trigger: 0 });
        executor.execute(Command::Quit);
        handle.join().unwrap();

        let mut buf = [0u8; 4];
        let (n, _) = peer.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"1");
        let (n, _) = peer.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"0");

        let completed = rx
            .try_iter()
            .filter_map(|event| match event {
                Event::CommandCompleted { id, .. } => Some(id),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(completed, vec![start, stop]);
    }

    #[test]
    fn test_processing_thread_reports_telemetry() {
        let (executor, bus, _peer) = executor_with_bus();
        let (rx, _id) = bus.subscribe();
        let handle = executor
            .start_processing(Some(Duration::from_millis(20)))
            .unwrap();

        let telemetry = rx
            .recv_timeout(Duration::from_secs(2))
            .expect("telemetry should arrive");
        executor.execute(Command::Quit);
        handle.join().unwrap();

        match telemetry {
            Event::Telemetry(tlm) => {
                assert_eq!(tlm.detection_count, 0);
                assert!(!tlm.listener_running);
            }
            other => panic!("Expected telemetry, got {:?}", other),
        }
    }
}
