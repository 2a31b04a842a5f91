//! Public sink type exported by the module.

use std::{fmt, thread, time::Duration};

use crossbeam_channel::{Sender, TrySendError, bounded};
use log::warn;
use parking_lot::Mutex;

use crate::{
    drop_counter::DropCounter,
    formatter::{Formatter, LineFormatter},
    logger::Logger,
};

use super::{
    config::NetLoggerConfig,
    transport,
    worker::{Command, spawn_worker},
};

/// Sink forwarding newline-framed lines to a remote TCP endpoint.
///
/// Construction never fails: if the controller cannot be reached within the
/// connect timeout the sink starts degraded and every emit becomes a counted
/// no-op. Diagnostics must never destabilise the host they are injected
/// into.
pub struct NetLogger {
    name: String,
    formatter: Box<dyn Formatter>,
    tx: Option<Sender<Command>>,
    handle: Mutex<Option<thread::JoinHandle<()>>>,
    connected: bool,
    drops: DropCounter,
    flush_timeout: Duration,
}

impl NetLogger {
    /// Connect to `host:port` with default tuning.
    pub fn connect(name: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self::with_config(name, NetLoggerConfig::new(host, port))
    }

    /// Construct the sink from a configuration object.
    ///
    /// The connection attempt happens synchronously here, bounded by
    /// `config.connect_timeout`; the outcome is visible through
    /// [`NetLogger::is_connected`].
    pub fn with_config(name: impl Into<String>, config: NetLoggerConfig) -> Self {
        let name = name.into();
        let connection = match transport::connect(&config.endpoint, config.connect_timeout) {
            Ok(stream) => Some(stream),
            Err(err) => {
                warn!(
                    "{name}: cannot reach controller at {} ({err}); starting degraded",
                    config.endpoint
                );
                None
            }
        };
        let connected = connection.is_some();
        let (tx, handle) = spawn_worker(
            name.clone(),
            connection,
            config.capacity,
            config.write_timeout,
            config.warn_interval,
        );
        Self {
            name,
            formatter: Box::new(LineFormatter),
            tx: Some(tx),
            handle: Mutex::new(Some(handle)),
            connected,
            drops: DropCounter::new(config.warn_interval),
            flush_timeout: config.write_timeout,
        }
    }

    /// Replace the default `<tag>: <message>` formatter.
    pub fn with_formatter(mut self, formatter: impl Formatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    /// Whether the initial connection attempt succeeded.
    ///
    /// A later write failure degrades the sink without updating this flag;
    /// callers only use it to report the handshake outcome.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Flush pending lines, waiting up to the write timeout for the ack.
    pub fn flush(&self) -> bool {
        let Some(tx) = self.tx.as_ref() else {
            return false;
        };
        let (ack_tx, ack_rx) = bounded(1);
        if tx
            .send_timeout(Command::Flush(ack_tx), self.flush_timeout)
            .is_err()
        {
            return false;
        }
        ack_rx.recv_timeout(self.flush_timeout).is_ok()
    }

    /// Drain the queue and stop the worker.
    pub fn close(&mut self) {
        self.request_shutdown();
        self.join_worker();
    }

    fn request_shutdown(&mut self) {
        let Some(tx) = self.tx.take() else {
            return;
        };
        let (ack_tx, ack_rx) = bounded(1);
        if tx.send(Command::Shutdown(ack_tx)).is_err() {
            return;
        }
        let _ = ack_rx.recv_timeout(self.flush_timeout);
    }

    fn join_worker(&mut self) {
        let Some(handle) = self.handle.lock().take() else {
            return;
        };
        if handle.join().is_err() {
            warn!("{}: drain thread panicked", self.name);
        }
    }
}

impl Logger for NetLogger {
    fn name(&self) -> &str {
        &self.name
    }

    fn emit(&self, message: &str) {
        let Some(tx) = self.tx.as_ref() else {
            self.drops.note();
            self.drops.warn_if_due(&self.name, "sink closed");
            return;
        };
        let line = self.formatter.format(&self.name, message);
        match tx.try_send(Command::Line(line)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.drops.note();
                self.drops.warn_if_due(&self.name, "queue full");
            }
            Err(TrySendError::Disconnected(_)) => {
                self.drops.note();
                self.drops.warn_if_due(&self.name, "drain thread gone");
            }
        }
    }
}

impl Drop for NetLogger {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for NetLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetLogger")
            .field("name", &self.name)
            .field("connected", &self.connected)
            .finish()
    }
}
