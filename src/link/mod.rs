//! UDP link to the Pi.
//!
//! ```text
//!  ObjectDetector ── "1"/"0" ──> TriggerSender ──> Pi :6000
//!        │
//!        └── start/stop ──> UdpListener ──spawns──> ReceiveLoop <── detections
//! ```

pub mod listener;
pub mod receiver;
pub mod trigger;

pub use listener::{ListenerSettings, UdpListener};
pub use receiver::{shutdown_channel, DetectionCounter, ShutdownSignal, ShutdownToken};
pub use trigger::{Trigger, TriggerSender};
