/// Event types for the detector
///
/// Events represent things that have happened (past tense).
/// They are broadcast to all subscribers.
use std::time::Instant;

use super::commands::{CommandId, CommandResponse};

/// Periodic telemetry snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Telemetry {
    pub detection_count: u64,
    pub listener_running: bool,
}

/// Detector events
#[derive(Debug, Clone)]
pub enum Event {
    /// Log record: received detection text, errors and status narration
    ObjectDetected { message: String, timestamp: Instant },

    /// A command finished
    CommandCompleted {
        id: CommandId,
        response: CommandResponse,
    },

    /// Telemetry channel update
    Telemetry(Telemetry),

    /// Executor is shutting down
    Shutdown,
}

impl Event {
    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            Event::ObjectDetected { message, .. } => format!("ObjectDetected: {}", message),
            Event::CommandCompleted { id, response } => {
                format!(
                    "Command {:#04x} (seq {}) completed: {:?}",
                    id.opcode, id.seq, response
                )
            }
            Event::Telemetry(tlm) => format!(
                "Telemetry: detections={} listener={}",
                tlm.detection_count,
                if tlm.listener_running { "running" } else { "stopped" }
            ),
            Event::Shutdown => "Shutting down".to_string(),
        }
    }
}
