//! Console integration entry point used by the interactive front-ends.

use crate::bridge::{resolve_library_path, Bridge};
use crate::error::BridgeResult;
use crate::library::{ForeignInterpreter, Python0Library};
use crate::protocol::{normalize_source, run_code_string};
use std::path::Path;

/// Filename reported for interactively typed code.
pub const STDIN_FILENAME: &str = "<stdin>";

/// How the front-end compiled the input. Accepted for compatibility with
/// the console contract; the interpreter library only has one mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SymbolKind {
    #[default]
    Single,
    Exec,
    Eval,
}

/// A console session bound to one interpreter.
#[derive(Debug)]
pub struct Console<I = Python0Library> {
    bridge: Bridge<I>,
}

impl Console<Python0Library> {
    /// Load the interpreter library for a new console.
    ///
    /// `lib_path` wins over `PYTHON0_LIB`, which wins over `configured`.
    ///
    /// # Safety
    /// See [`Python0Library::open`].
    pub unsafe fn open(lib_path: Option<&Path>, configured: Option<&Path>) -> BridgeResult<Self> {
        let path = resolve_library_path(lib_path, configured)?;
        Ok(Self::new(Bridge::new(Python0Library::open(path)?)))
    }
}

impl<I: ForeignInterpreter> Console<I> {
    pub fn new(bridge: Bridge<I>) -> Self {
        Self { bridge }
    }

    pub fn bridge(&self) -> &Bridge<I> {
        &self.bridge
    }

    /// Run one complete input buffer.
    pub fn run_source(&self, source: &str, filename: &str, _symbol: SymbolKind) -> BridgeResult<()> {
        run_code_string(&self.bridge, &normalize_source(source), filename)
    }
}
