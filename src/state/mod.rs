/// State management module
///
/// Lifecycle state of the detection listener.

pub mod listener_state;

// Re-export commonly used types
pub use listener_state::ListenerState;
