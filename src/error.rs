use std::net::SocketAddr;

use thiserror::Error;

/// Link-level errors using thiserror for structured error handling.
///
/// None of these are fatal to a command: the detector logs them on the
/// event stream and still acknowledges the command.

#[derive(Error, Debug)]
pub enum TriggerError {
    #[error("Failed to create UDP socket for trigger")]
    SocketCreate(#[source] std::io::Error),

    #[error("Failed to send UDP trigger '{trigger}' to {peer}")]
    Send {
        trigger: char,
        peer: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ListenerError {
    #[error("Failed to create listener socket")]
    SocketCreate(#[source] std::io::Error),

    #[error("Failed to set socket option {option}")]
    OptionSet {
        option: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to bind to {addr}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start listener thread")]
    ThreadSpawn(#[source] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}")]
    LoadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to save configuration to {path}")]
    SaveFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Type alias for application Results using anyhow for context chaining
pub type AppResult<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io;

    #[test]
    fn test_error_display() {
        let peer: SocketAddr = "192.168.1.99:6000".parse().unwrap();
        let err = TriggerError::Send {
            trigger: '1',
            peer,
            source: io::Error::new(io::ErrorKind::Other, "network unreachable"),
        };
        assert_eq!(
            err.to_string(),
            "Failed to send UDP trigger '1' to 192.168.1.99:6000"
        );

        let err = ConfigError::Invalid("buffer_size must be at least 2".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: buffer_size must be at least 2"
        );
    }

    #[test]
    fn test_error_source_chain() {
        let addr: SocketAddr = "0.0.0.0:6000".parse().unwrap();
        let err = ListenerError::Bind {
            addr,
            source: io::Error::new(io::ErrorKind::AddrInUse, "address in use"),
        };

        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "Failed to bind to 0.0.0.0:6000");
    }
}
