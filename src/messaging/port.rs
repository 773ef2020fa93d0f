/// Component port
///
/// Everything the detector needs from the surrounding framework: an event
/// log, command acknowledgements and a telemetry channel. `EventBus` is the
/// production implementation; tests substitute recorders.

use super::commands::{CommandId, CommandResponse};
use super::events::Telemetry;

pub trait ComponentPort: Send + Sync {
    /// Emit the detector's single log event kind
    fn log_object_detected(&self, message: &str);

    /// Acknowledge a command; called exactly once per command
    fn command_response(&self, id: CommandId, response: CommandResponse);

    /// Publish a telemetry snapshot
    fn telemetry(&self, _tlm: Telemetry) {}
}
