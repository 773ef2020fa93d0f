/// Command types for the detector
///
/// Commands represent requests to perform actions (imperative).
/// They are executed by the command executor, one at a time.

/// Identifies one command invocation for its completion acknowledgement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandId {
    pub opcode: u32,
    pub seq: u32,
}

impl CommandId {
    pub const fn new(opcode: u32, seq: u32) -> Self {
        Self { opcode, seq }
    }
}

/// Detector commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Tell the Pi to start detecting and make sure the listener runs.
    /// The trigger value is not inspected.
    StartDetection { id: CommandId, trigger: u32 },

    /// Tell the Pi to stop and join the listener, only when `trigger == 0`
    StopDetection { id: CommandId, trigger: u32 },

    /// Stop the executor loop
    Quit,
}

/// Completion status reported for every command.
///
/// Send and bind failures surface only on the event stream, so `Ok` is
/// the only status the detector produces today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum CommandResponse {
    Ok,
}

impl Command {
    pub const START_DETECTION_OPCODE: u32 = 0x00;
    pub const STOP_DETECTION_OPCODE: u32 = 0x01;

    /// Get the invocation id (if the command is acknowledged)
    pub fn id(&self) -> Option<CommandId> {
        match self {
            Command::StartDetection { id, .. } | Command::StopDetection { id, .. } => Some(*id),
            Command::Quit => None,
        }
    }

    /// Get a human-readable description of the command
    pub fn description(&self) -> String {
        match self {
            Command::StartDetection { trigger, .. } => {
                format!("Start detection (trigger {})", trigger)
            }
            Command::StopDetection { trigger, .. } => {
                format!("Stop detection (trigger {})", trigger)
            }
            Command::Quit => "Quit".to_string(),
        }
    }
}
