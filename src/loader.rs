//! Shared-library injection.
//!
//! [`inject`] performs the load-and-handshake sequence: open the library with
//! immediate binding and global symbol visibility, resolve the well-known
//! entry symbol inside the fresh handle, and invoke it synchronously with a
//! shared logger handle. Every failure is terminal-but-local: it aborts this
//! one injection attempt and leaves the host untouched.

use std::path::{Path, PathBuf};

use libloading::Library;
use log::debug;
use thiserror::Error;

use crate::logger::{LoggerHandle, SharedLogger};

/// Exported name every injectable module must provide.
///
/// See [`declare_module!`](crate::declare_module) for the canonical way to
/// export it.
pub const ENTRY_SYMBOL: &str = "hookline_entry";

/// Signature of the entry symbol.
pub type EntryFn = unsafe extern "C" fn(*const LoggerHandle);

/// Failure of a single injection attempt. Never fatal to the host process.
#[derive(Debug, Error)]
pub enum InjectError {
    /// The platform loader could not open the library.
    #[error("failed to load `{}`: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },
    /// The library loaded but does not export the entry symbol.
    #[error("`{}` does not export `{ENTRY_SYMBOL}`: {source}", path.display())]
    MissingEntry {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },
}

/// Load the library at `path` and hand it the shared logger.
///
/// The entry symbol is resolved only after the open succeeded and invoked
/// only after resolution succeeded; a null function pointer is never called.
/// On success the module handle is deliberately leaked so the library stays
/// mapped for the process lifetime. The logger crosses the boundary by
/// shared ownership: the callee clones the `Arc`, so it observes the same
/// live socket and queue as the host.
pub fn inject(path: impl AsRef<Path>, logger: &SharedLogger) -> Result<(), InjectError> {
    let path = path.as_ref();
    let library = open_library(path).map_err(|source| InjectError::Load {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("loaded module `{}`", path.display());

    let entry: EntryFn = unsafe {
        *library
            .get::<EntryFn>(ENTRY_SYMBOL.as_bytes())
            .map_err(|source| InjectError::MissingEntry {
                path: path.to_path_buf(),
                source,
            })?
    };
    debug!("resolved `{ENTRY_SYMBOL}` in `{}`", path.display());

    let handle = LoggerHandle::new(logger.clone());
    unsafe { entry(&handle) };

    // The module stays mapped for the process lifetime; the transient handle
    // is not retained.
    std::mem::forget(library);
    Ok(())
}

/// Open with `RTLD_NOW | RTLD_GLOBAL`: immediate binding surfaces unresolved
/// symbols here rather than mid-execution, and global visibility lets
/// subsequently injected modules resolve this one's exports (chained
/// injection).
#[cfg(unix)]
fn open_library(path: &Path) -> Result<Library, libloading::Error> {
    use libloading::os::unix::{Library as UnixLibrary, RTLD_GLOBAL, RTLD_NOW};

    unsafe { UnixLibrary::open(Some(path), RTLD_NOW | RTLD_GLOBAL) }.map(Library::from)
}

#[cfg(not(unix))]
fn open_library(path: &Path) -> Result<Library, libloading::Error> {
    unsafe { Library::new(path) }
}
