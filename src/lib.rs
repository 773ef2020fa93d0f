//! UDP control link between a controller and a remote detection device.
//!
//! `ObjectDetector` sends single-byte start/stop triggers to the Pi and runs
//! a background listener that reports every detection datagram it receives.

pub mod config;
pub mod detector;
pub mod error;
pub mod link;
pub mod messaging;
pub mod state;

pub use config::Config;
pub use detector::ObjectDetector;
pub use error::{AppResult, ConfigError, ListenerError, TriggerError};
pub use link::{DetectionCounter, Trigger, TriggerSender, UdpListener};
pub use messaging::{Command, CommandExecutor, CommandId, CommandResponse, ComponentPort, Event, EventBus};
pub use state::ListenerState;
