use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

/// Well-known port used by both the Pi and the local listener.
pub const DETECTION_PORT: u16 = 6000;

fn default_peer_addr() -> SocketAddr {
    SocketAddr::V4(SocketAddrV4::new(
        Ipv4Addr::new(192, 168, 1, 99),
        DETECTION_PORT,
    ))
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, DETECTION_PORT))
}

/// Fields missing from the file fall back to `Config::default()`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pi endpoint that receives the "1"/"0" triggers
    pub peer_addr: SocketAddr,

    /// Local endpoint the detection listener binds
    pub listen_addr: SocketAddr,

    /// Receive timeout of the listener socket; bounds shutdown latency
    pub recv_timeout_ms: u64,

    /// Delay after every listener iteration
    pub poll_delay_ms: u64,

    /// Receive buffer size (one byte is reserved for the terminator)
    pub buffer_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            peer_addr: default_peer_addr(),
            listen_addr: default_listen_addr(),
            recv_timeout_ms: 1000,
            poll_delay_ms: 100,
            buffer_size: 1024,
        }
    }
}

impl Config {
    /// Load configuration from the directory next to the executable.
    /// Creates default config if file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, writing defaults when missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Config::default();
            config.save_to(path)?;
            tracing::info!("Created default config at: {}", path.display());
            return Ok(config);
        }

        let load_failed = |source: Box<dyn std::error::Error + Send + Sync>| {
            ConfigError::LoadFailed {
                path: path.display().to_string(),
                source,
            }
        };

        let content = fs::read_to_string(path).map_err(|e| load_failed(Box::new(e)))?;
        let config: Config =
            serde_json::from_str(&content).map_err(|e| load_failed(Box::new(e)))?;
        config.validate()?;

        tracing::info!("Loaded config from: {}", path.display());
        Ok(config)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |source: Box<dyn std::error::Error + Send + Sync>| {
            ConfigError::SaveFailed {
                path: path.display().to_string(),
                source,
            }
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| save_failed(Box::new(e)))?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| save_failed(Box::new(e)))?;
        fs::write(path, json).map_err(|e| save_failed(Box::new(e)))?;

        Ok(())
    }

    /// Reject values the listener cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_size < 2 {
            return Err(ConfigError::Invalid(format!(
                "buffer_size must be at least 2, got {}",
                self.buffer_size
            )));
        }
        // A zero read timeout means "block forever" and would make stop() hang.
        if self.recv_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "recv_timeout_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn recv_timeout(&self) -> Duration {
        Duration::from_millis(self.recv_timeout_ms)
    }

    pub fn poll_delay(&self) -> Duration {
        Duration::from_millis(self.poll_delay_ms)
    }

    /// Get the config file path (in app's base directory)
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let exe_path = env::current_exe().map_err(|e| ConfigError::LoadFailed {
            path: "<current executable>".to_string(),
            source: Box::new(e),
        })?;
        let exe_dir = exe_path.parent().ok_or_else(|| {
            ConfigError::Invalid("Could not determine executable directory".to_string())
        })?;

        Ok(exe_dir.join("config").join("config.json"))
    }
}
