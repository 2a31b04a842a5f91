//! TCP transport sink.
//!
//! This module defines [`NetLogger`], a [`Logger`](crate::Logger) that
//! forwards `<tag>: <message>` lines to a remote controller socket as
//! newline-terminated UTF-8 frames. A dedicated worker thread drains a
//! bounded FIFO queue, so `emit` enqueues and returns without ever touching
//! the network on the caller's thread. The connection is attempted once, at
//! construction; a failed connect or a mid-session write error puts the sink
//! into a degraded state where further messages are dropped and counted.

mod config;
mod logger;
mod transport;
mod worker;


pub use config::{
    DEFAULT_CHANNEL_CAPACITY, DEFAULT_CONNECT_TIMEOUT, DEFAULT_WRITE_TIMEOUT, NetLoggerConfig,
};
pub use logger::NetLogger;
pub use transport::Endpoint;
