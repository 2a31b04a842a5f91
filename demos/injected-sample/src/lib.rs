//! Minimal injectable module.
//!
//! Demonstrates the initialisation template: one [`ModuleInit`] static, the
//! [`declare_module!`] application, and a logger-dependent attach routine.
//! The integration tests load this library to exercise the full
//! load/resolve/invoke handshake, so it also exports a counter revealing how
//! often the init routine ran.

use std::sync::atomic::{AtomicU32, Ordering};

use hookline::declare_module;
use hookline::module::ModuleInit;

static MODULE: ModuleInit = ModuleInit::new("sample", init).with_attach(attach);

static INIT_CALLS: AtomicU32 = AtomicU32::new(0);

fn init(module: &ModuleInit) {
    INIT_CALLS.fetch_add(1, Ordering::SeqCst);
    // Runs under the load hook, before any logger can exist; emit is a
    // silent no-op here.
    module.emit("init ran");
}

fn attach(module: &ModuleInit) {
    module.emit("sample patch armed");
}

declare_module!(MODULE);

/// How many times the init routine has run in this process.
#[unsafe(no_mangle)]
pub extern "C" fn injected_sample_init_count() -> u32 {
    INIT_CALLS.load(Ordering::SeqCst)
}
