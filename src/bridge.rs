//! The bridge handle: one loaded interpreter plus its `__main__` namespace.

use crate::error::{BridgeError, BridgeResult};
use crate::library::{ForeignInterpreter, Python0Library};
use once_cell::unsync::OnceCell;
use std::env;
use std::ffi::{c_void, CStr, OsString};
use std::path::{Path, PathBuf};
use std::ptr::NonNull;
use tracing::debug;

/// Environment variable naming the interpreter library.
pub const LIBRARY_ENV: &str = "PYTHON0_LIB";

const MAIN_MODULE: &CStr = c"__main__";

/// Opaque handle to the interpreter's top-level variable table.
///
/// Owned by the library's `__main__` module; the bridge never releases it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Namespace(NonNull<c_void>);

impl Namespace {
    pub fn as_ptr(self) -> *mut c_void {
        self.0.as_ptr()
    }
}

/// Pick the interpreter library path.
///
/// An explicit path wins over `PYTHON0_LIB`, which wins over `configured`.
pub fn resolve_library_path(
    explicit: Option<&Path>,
    configured: Option<&Path>,
) -> BridgeResult<PathBuf> {
    select_library_path(explicit, env::var_os(LIBRARY_ENV), configured)
}

fn select_library_path(
    explicit: Option<&Path>,
    from_env: Option<OsString>,
    configured: Option<&Path>,
) -> BridgeResult<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = from_env.filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    configured
        .map(Path::to_path_buf)
        .ok_or(BridgeError::MissingLibrary)
}

/// One interpreter session.
///
/// A bridge is single threaded: the interpreter behind it is not reentrant,
/// and two bridges must not share one loaded library from different threads.
#[derive(Debug)]
pub struct Bridge<I = Python0Library> {
    interpreter: I,
    namespace: OnceCell<Namespace>,
}

impl Bridge<Python0Library> {
    /// Load the library at `path`, or at `PYTHON0_LIB` when `path` is `None`.
    ///
    /// Fails with [`BridgeError::MissingLibrary`] before touching the loader
    /// when neither is set. Symbols are bound on first use.
    ///
    /// # Safety
    /// See [`Python0Library::open`].
    pub unsafe fn open(path: Option<&Path>) -> BridgeResult<Self> {
        let path = resolve_library_path(path, None)?;
        Ok(Self::new(Python0Library::open(path)?))
    }
}

impl<I: ForeignInterpreter> Bridge<I> {
    /// Wrap an interpreter.
    pub fn new(interpreter: I) -> Self {
        Self {
            interpreter,
            namespace: OnceCell::new(),
        }
    }

    /// The bound interpreter entry points.
    pub fn interpreter(&self) -> &I {
        &self.interpreter
    }

    /// Run the library's one-time initialization.
    ///
    /// Required once before the first evaluation in the multi-line console.
    /// The basic console must not call it: the library initializes itself
    /// lazily on that path.
    pub fn init_all(&self) -> BridgeResult<()> {
        self.interpreter.init_all()
    }

    /// The `__main__` namespace, looked up on first use and cached.
    pub fn namespace(&self) -> BridgeResult<Namespace> {
        self.namespace
            .get_or_try_init(|| {
                let module = self.interpreter.add_module(MAIN_MODULE)?;
                if module.is_null() {
                    return Err(BridgeError::NamespaceUnavailable { module: "__main__" });
                }
                // SAFETY: `module` was just returned by `add_module`.
                let dict = unsafe { self.interpreter.get_module_dict(module)? };
                let dict = NonNull::new(dict)
                    .ok_or(BridgeError::NamespaceUnavailable { module: "__main__" })?;
                debug!(namespace = ?dict, "resolved __main__ namespace");
                Ok(Namespace(dict))
            })
            .copied()
    }
}
