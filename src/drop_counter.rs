//! Rate-limited accounting for messages a sink had to drop.
//!
//! Sinks in this crate never surface delivery failure to their callers, so
//! dropped messages are counted here and reported through the `log` facade at
//! most once per interval. A dead endpoint therefore cannot flood the host's
//! own logging output.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::warn;

/// Default interval between dropped-message warnings.
pub const DEFAULT_WARN_INTERVAL: Duration = Duration::from_secs(5);

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|dur| dur.as_secs())
        .unwrap_or_default()
}

/// Counts drops and emits a rate-limited warning naming the sink.
pub struct DropCounter {
    interval_secs: u64,
    last_warn: AtomicU64,
    dropped: AtomicU64,
}

impl DropCounter {
    /// Create a counter. The first warning may be emitted immediately.
    pub fn new(interval: Duration) -> Self {
        let interval_secs = interval.as_secs();
        Self {
            interval_secs,
            last_warn: AtomicU64::new(now_secs().saturating_sub(interval_secs)),
            dropped: AtomicU64::new(0),
        }
    }

    /// Record one dropped message.
    pub fn note(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Warn about accumulated drops if the interval has elapsed.
    pub fn warn_if_due(&self, sink: &str, context: &str) {
        let now = now_secs();
        let prev = self.last_warn.load(Ordering::Relaxed);
        if now.saturating_sub(prev) >= self.interval_secs {
            let count = self.dropped.swap(0, Ordering::Relaxed);
            if count > 0 {
                warn!("{sink}: dropped {count} messages ({context})");
            }
            self.last_warn.store(now, Ordering::Relaxed);
        }
    }

    /// Immediately report any drops still unaccounted for. Used on shutdown.
    pub fn drain(&self, sink: &str) {
        let count = self.dropped.swap(0, Ordering::Relaxed);
        if count > 0 {
            warn!("{sink}: dropped {count} messages before shutdown");
            self.last_warn.store(now_secs(), Ordering::Relaxed);
        }
    }

    #[cfg(test)]
    pub fn pending(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
