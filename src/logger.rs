//! The base logging capability and the handle that crosses module boundaries.

use std::sync::Arc;

/// Trait implemented by all diagnostic sinks.
///
/// `Logger` is `Send + Sync` so one sink can be invoked from any thread in
/// the host or in an injected module. `emit` is side-effect only: a sink that
/// cannot deliver a message must drop it (and account for the drop through
/// its own side channel) rather than propagate failure into the caller's
/// control flow, since emit sites may be arbitrarily time-sensitive.
pub trait Logger: Send + Sync {
    /// Display name tagged onto every message for provenance.
    fn name(&self) -> &str;

    /// Submit a message for delivery. Must not block on I/O and must not
    /// panic.
    fn emit(&self, message: &str);
}

/// Shared-ownership handle to a sink.
///
/// The host creates the sink before any injection and passes clones of this
/// handle across the module boundary, so every module observes the same live
/// socket and queue rather than a disconnected duplicate.
pub type SharedLogger = Arc<dyn Logger>;

/// FFI-crossing wrapper around a [`SharedLogger`].
///
/// The loader places one of these on its stack and passes a raw pointer to
/// the module's entry symbol; the callee clones the inner `Arc` out before
/// the call returns. The wrapper is opaque to the callee apart from
/// [`LoggerHandle::clone_raw`].
pub struct LoggerHandle {
    inner: SharedLogger,
}

impl LoggerHandle {
    /// Wrap a shared sink for the trip across the module boundary.
    pub fn new(inner: SharedLogger) -> Self {
        Self { inner }
    }

    /// Clone the shared sink out of a raw handle.
    ///
    /// Returns `None` for a null pointer so modules loaded without a live
    /// bridge can still take this path.
    ///
    /// # Safety
    ///
    /// `raw` must be null or point to a `LoggerHandle` that stays alive for
    /// the duration of the call.
    pub unsafe fn clone_raw(raw: *const LoggerHandle) -> Option<SharedLogger> {
        if raw.is_null() {
            return None;
        }
        Some(unsafe { (*raw).inner.clone() })
    }
}
