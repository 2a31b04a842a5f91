//! Runtime code-injection bridge.
//!
//! `hookline` loads patch modules (shared libraries) into the running host
//! process and hands each one a live diagnostic channel back to an external
//! controller. The crate has three layers:
//!
//! * [`logger`] — the minimal sink capability ([`Logger`]) plus the
//!   shared-ownership handle that crosses the module boundary.
//! * [`net_logger`] — the TCP transport sink. Messages are framed as
//!   newline-terminated UTF-8 lines and drained by a dedicated worker thread
//!   so `emit` never blocks the caller.
//! * [`loader`] / [`module`] — the injection side. [`inject`] opens a library
//!   with immediate binding and global symbol visibility, resolves the
//!   well-known entry symbol and invokes it with the logger handle.
//!   Injectable modules wire themselves up through [`module::ModuleInit`] and
//!   [`declare_module!`].
//!
//! Diagnostics are best-effort by design: nothing in this crate is allowed to
//! unwind into, block, or terminate the host application it is loaded into.

pub mod console;
mod drop_counter;
pub mod formatter;
pub mod loader;
pub mod logger;
pub mod module;
pub mod net_logger;

pub use console::ConsoleLogger;
pub use loader::{ENTRY_SYMBOL, InjectError, inject};
pub use logger::{Logger, LoggerHandle, SharedLogger};
pub use net_logger::{Endpoint, NetLogger, NetLoggerConfig};
