/// Messaging module for the command/event architecture
///
/// - **Commands**: requests from the dispatcher (imperative, acknowledged once)
/// - **Events**: log records, acknowledgements and telemetry (broadcast)
///
/// ## Architecture
///
/// ```text
/// ┌────────────┐   Command   ┌──────────┐   handle   ┌────────────────┐
/// │ Dispatcher │ ──────────> │ Executor │ ─────────> │ ObjectDetector │
/// └────────────┘             └──────────┘            └────────────────┘
///                                                            │ ComponentPort
///                                                            ▼
///                                                     ┌─────────────┐
///                                                     │  Event Bus  │ ──> subscribers
///                                                     └─────────────┘
/// ```

pub mod bus;
pub mod commands;
pub mod events;
pub mod executor;
pub mod port;

// Re-export commonly used types
pub use bus::{EventBus, SubscriberId};
pub use commands::{Command, CommandId, CommandResponse};
pub use events::{Event, Telemetry};
pub use executor::CommandExecutor;
pub use port::ComponentPort;
