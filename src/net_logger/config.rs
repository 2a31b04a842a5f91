//! Configuration consumed by the net logger at construction time.

use std::time::Duration;

use crate::drop_counter::DEFAULT_WARN_INTERVAL;

use super::transport::Endpoint;

/// Default bounded queue capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;
/// Default timeout for the initial connection attempt.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default timeout applied to socket writes in the drain path.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(1);

/// Describes how to construct a [`NetLogger`](super::NetLogger).
///
/// Endpoint values are sourced externally (controller configuration); the
/// defaults here favour local development against a loopback controller.
#[derive(Clone, Debug)]
pub struct NetLoggerConfig {
    pub endpoint: Endpoint,
    pub capacity: usize,
    pub connect_timeout: Duration,
    pub write_timeout: Duration,
    pub warn_interval: Duration,
}

impl Default for NetLoggerConfig {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::new("localhost", 8887),
            capacity: DEFAULT_CHANNEL_CAPACITY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            warn_interval: DEFAULT_WARN_INTERVAL,
        }
    }
}

impl NetLoggerConfig {
    /// Configuration targeting `host:port` with default tuning.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            endpoint: Endpoint::new(host, port),
            ..Self::default()
        }
    }

    /// Override the queue capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Override the initial connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Override the write timeout used by the drain thread.
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }
}
