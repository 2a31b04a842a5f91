//! Local console sink.
//!
//! The non-network variant of the base capability, used where no controller
//! endpoint is configured or reachable. Lines carry the same `<tag>:
//! <message>` framing as the transport sink so output stays grep-compatible
//! across variants.

use std::io::{self, Write};

use parking_lot::Mutex;

use crate::{
    formatter::{Formatter, LineFormatter},
    logger::Logger,
};

/// Sink writing formatted lines to a local stream, stderr by default.
///
/// Writes are serialised by a mutex so concurrent emitters cannot interleave
/// lines. Write errors are swallowed; a console that has gone away is not a
/// reason to disturb the host.
pub struct ConsoleLogger {
    name: String,
    formatter: Box<dyn Formatter>,
    sink: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleLogger {
    /// Sink writing to stderr.
    pub fn stderr(name: impl Into<String>) -> Self {
        Self::new(name, io::stderr())
    }

    /// Sink writing to an arbitrary stream.
    pub fn new(name: impl Into<String>, sink: impl Write + Send + 'static) -> Self {
        Self {
            name: name.into(),
            formatter: Box::new(LineFormatter),
            sink: Mutex::new(Box::new(sink)),
        }
    }
}

impl Logger for ConsoleLogger {
    fn name(&self) -> &str {
        &self.name
    }

    fn emit(&self, message: &str) {
        let line = self.formatter.format(&self.name, message);
        let mut sink = self.sink.lock();
        let _ = writeln!(sink, "{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn writes_framed_lines() {
        let buffer = SharedBuffer::default();
        let logger = ConsoleLogger::new("patch", buffer.clone());
        logger.emit("first");
        logger.emit("second");
        let written = String::from_utf8(buffer.0.lock().clone()).expect("utf-8 output");
        assert_eq!(written, "patch: first\npatch: second\n");
    }
}
