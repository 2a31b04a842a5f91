//! Initialisation plumbing for injectable modules.
//!
//! Every injectable module declares one [`ModuleInit`] static describing its
//! name and init routine, then applies [`declare_module!`] to export the
//! loader entry symbol and register the automatic load-time hook. A module
//! can be loaded two ways:
//!
//! * **actively**, through [`inject`](crate::inject) — the platform runs the
//!   load hook during `dlopen`, then the loader invokes the entry symbol with
//!   a logger handle;
//! * **passively**, preloaded by the platform at process start — only the
//!   load hook fires and no logger ever arrives.
//!
//! Both paths converge on the same idempotent init routine; logger
//! availability is the only observable difference. Logger-dependent setup
//! goes in the optional attach routine, which runs once the handle has been
//! captured.

use log::debug;
use parking_lot::{Once, RwLock};

use crate::logger::{LoggerHandle, SharedLogger};

/// Per-module initialisation state.
///
/// Const-constructible so a module can hold it in a `static`; all methods
/// take `&self`. The logger slot replaces the ambient global the original
/// macro scheme smuggled across modules: each module is handed the handle
/// explicitly and keeps it in its own state.
pub struct ModuleInit {
    name: &'static str,
    init: fn(&ModuleInit),
    attach: Option<fn(&ModuleInit)>,
    once: Once,
    logger: RwLock<Option<SharedLogger>>,
}

impl ModuleInit {
    /// Describe a module with an init routine that must run exactly once per
    /// load, regardless of which trigger fires first.
    pub const fn new(name: &'static str, init: fn(&ModuleInit)) -> Self {
        Self {
            name,
            init,
            attach: None,
            once: Once::new(),
            logger: RwLock::new(None),
        }
    }

    /// Add a routine that runs after a logger handle has been captured.
    pub const fn with_attach(mut self, attach: fn(&ModuleInit)) -> Self {
        self.attach = Some(attach);
        self
    }

    pub fn name(&self) -> &str {
        self.name
    }

    /// Entry-symbol path: capture the logger, make sure init ran, announce
    /// the attachment, then run the attach routine with logging available.
    ///
    /// # Safety
    ///
    /// `handle` must be null or point to a [`LoggerHandle`] that stays alive
    /// for the duration of the call.
    pub unsafe fn entry(&self, handle: *const LoggerHandle) {
        if let Some(logger) = unsafe { LoggerHandle::clone_raw(handle) } {
            *self.logger.write() = Some(logger);
        }
        self.run_init();
        self.emit(&format!("module `{}` attached", self.name));
        if let Some(attach) = self.attach {
            attach(self);
        }
    }

    /// Load-hook path: fires when the platform maps the module. No logger is
    /// available, so init runs degraded and must not expect to emit.
    pub fn load_hook(&self) {
        self.run_init();
    }

    fn run_init(&self) {
        self.once.call_once(|| {
            debug!("module `{}` initialising", self.name);
            (self.init)(self);
        });
    }

    /// Log through the captured handle; silent no-op while degraded.
    pub fn emit(&self, message: &str) {
        if let Some(logger) = self.logger.read().as_ref() {
            logger.emit(message);
        }
    }

    /// Clone of the captured logger, for module code that logs on its own.
    pub fn logger(&self) -> Option<SharedLogger> {
        self.logger.read().clone()
    }
}

/// Export the loader entry symbol and register the automatic load hook for a
/// [`ModuleInit`] static.
///
/// Expands to exactly the two declarations the platform forces to be items —
/// the `hookline_entry` export and the init-array constructor — and nothing
/// else; all behaviour lives in [`ModuleInit`].
///
/// ```ignore
/// static MODULE: ModuleInit = ModuleInit::new("sample", init).with_attach(attach);
/// hookline::declare_module!(MODULE);
/// ```
#[macro_export]
macro_rules! declare_module {
    ($module:expr) => {
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn hookline_entry(handle: *const $crate::logger::LoggerHandle) {
            unsafe { $module.entry(handle) }
        }

        #[used]
        #[cfg_attr(
            all(unix, not(target_os = "macos")),
            unsafe(link_section = ".init_array")
        )]
        #[cfg_attr(target_os = "macos", unsafe(link_section = "__DATA,__mod_init_func"))]
        static __HOOKLINE_LOAD_HOOK: extern "C" fn() = {
            extern "C" fn load_hook() {
                $module.load_hook();
            }
            load_hook
        };
    };
}
