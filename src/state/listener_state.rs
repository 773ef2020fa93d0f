/// Detection listener state
///
/// Represents the lifecycle of the background UDP listener.

use std::time::{Duration, Instant};

/// State of the detection listener
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ListenerState {
    /// No receive thread exists
    #[default]
    Stopped,

    /// A receive thread is live
    Running { since: Instant },
}

impl ListenerState {
    /// Check if the listener is stopped
    pub fn is_stopped(&self) -> bool {
        matches!(self, ListenerState::Stopped)
    }

    /// Check if the listener is running
    pub fn is_running(&self) -> bool {
        matches!(self, ListenerState::Running { .. })
    }

    /// Get the time since the listener started (if running)
    pub fn running_duration(&self) -> Option<Duration> {
        match self {
            ListenerState::Running { since } => Some(since.elapsed()),
            ListenerState::Stopped => None,
        }
    }

    /// Get a human-readable description of the state
    pub fn description(&self) -> &'static str {
        match self {
            ListenerState::Stopped => "Stopped",
            ListenerState::Running { .. } => "Running",
        }
    }
}
