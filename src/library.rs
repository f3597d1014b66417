//! The interpreter library seam and its dynamically loaded implementation.

use crate::abi::{Grammar, ObjectHeader};
use crate::error::{BridgeError, BridgeResult};
use crate::refcount;
use crate::symbols::{Bound, SymbolTable};
use libloading::Library;
use std::ffi::{c_int, c_void, CStr};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

/// Entry points the bridge drives, one method per foreign operation.
///
/// Every call is synchronous and must come from a single thread of control;
/// the interpreter library is not reentrant. Errors are only ever
/// [`BridgeError::SymbolNotFound`]-style binding failures: the foreign calls
/// themselves report through their return values.
pub trait ForeignInterpreter {
    /// One-time global setup required by the multi-line console.
    fn init_all(&self) -> BridgeResult<()>;

    /// Parse NUL-terminated `source`, storing the tree in `node`.
    fn parse_string(
        &self,
        source: &CStr,
        max_nodes: c_int,
        node: &mut *mut c_void,
    ) -> BridgeResult<c_int>;

    /// Find or create the module called `name`. May return null.
    fn add_module(&self, name: &CStr) -> BridgeResult<*mut c_void>;

    /// Attribute dictionary of `module`. May return null.
    ///
    /// # Safety
    /// `module` must be a module object returned by [`Self::add_module`].
    unsafe fn get_module_dict(&self, module: *mut c_void) -> BridgeResult<*mut c_void>;

    /// Evaluate a parse tree against the given namespaces.
    ///
    /// # Safety
    /// `node` must come from a successful [`Self::parse_string`] and the
    /// namespaces from [`Self::get_module_dict`].
    unsafe fn eval_node(
        &self,
        node: *mut c_void,
        filename: &CStr,
        globals: *mut c_void,
        locals: *mut c_void,
    ) -> BridgeResult<*mut ObjectHeader>;

    /// Print the pending error to standard error in the library's format.
    fn print_error(&self) -> BridgeResult<()>;

    /// Drop one reference to an object the library returned.
    ///
    /// # Safety
    /// See [`refcount::release`].
    unsafe fn release(&self, object: *mut ObjectHeader) {
        refcount::release(object)
    }
}

/// A loaded interpreter library together with its lazily bound symbols.
pub struct Python0Library {
    path: PathBuf,
    symbols: SymbolTable,
    library: Library,
}

impl Python0Library {
    /// Load the shared library at `path`. No symbol is resolved yet.
    ///
    /// # Safety
    /// Loading runs the library's initialization routines, and every later
    /// call trusts that the library exports the expected C signatures and
    /// structure layouts.
    pub unsafe fn open(path: impl AsRef<Path>) -> BridgeResult<Self> {
        let path = path.as_ref().to_path_buf();
        let library = Library::new(&path).map_err(|source| BridgeError::Load {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "loaded interpreter library");
        Ok(Self {
            path,
            symbols: SymbolTable::new(),
            library,
        })
    }

    /// Path the library was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Symbol cache, for inspecting which entry points are bound.
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// The library's parser table.
    pub fn grammar(&self) -> BridgeResult<&Grammar> {
        let gram = self.bind(&self.symbols.gram)?;
        // SAFETY: `gram` is the address of the exported table, which lives
        // as long as the library and is never written after load.
        Ok(unsafe { &*gram })
    }

    fn bind<F: Copy>(&self, bound: &Bound<F>) -> BridgeResult<F> {
        // SAFETY: the symbol table declares each symbol with its C type and
        // the library outlives every value handed out here.
        unsafe { bound.resolve(&self.library) }.copied()
    }
}

impl ForeignInterpreter for Python0Library {
    fn init_all(&self) -> BridgeResult<()> {
        let initall = self.bind(&self.symbols.initall)?;
        unsafe { initall() };
        Ok(())
    }

    fn parse_string(
        &self,
        source: &CStr,
        max_nodes: c_int,
        node: &mut *mut c_void,
    ) -> BridgeResult<c_int> {
        let parse_string = self.bind(&self.symbols.parse_string)?;
        Ok(unsafe { parse_string(source.as_ptr(), max_nodes, node) })
    }

    fn add_module(&self, name: &CStr) -> BridgeResult<*mut c_void> {
        let add_module = self.bind(&self.symbols.add_module)?;
        Ok(unsafe { add_module(name.as_ptr()) })
    }

    unsafe fn get_module_dict(&self, module: *mut c_void) -> BridgeResult<*mut c_void> {
        let getmoduledict = self.bind(&self.symbols.getmoduledict)?;
        Ok(getmoduledict(module))
    }

    unsafe fn eval_node(
        &self,
        node: *mut c_void,
        filename: &CStr,
        globals: *mut c_void,
        locals: *mut c_void,
    ) -> BridgeResult<*mut ObjectHeader> {
        let eval_node = self.bind(&self.symbols.eval_node)?;
        Ok(eval_node(node, filename.as_ptr(), globals, locals))
    }

    fn print_error(&self) -> BridgeResult<()> {
        let print_error = self.bind(&self.symbols.print_error)?;
        unsafe { print_error() };
        Ok(())
    }
}

impl fmt::Debug for Python0Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Python0Library")
            .field("path", &self.path)
            .field("symbols", &self.symbols)
            .finish()
    }
}
