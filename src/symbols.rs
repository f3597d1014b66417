//! Lazily bound entry points of the interpreter library.

use crate::abi::{Grammar, ObjectHeader};
use crate::error::{BridgeError, BridgeResult};
use libloading::Library;
use once_cell::unsync::OnceCell;
use std::ffi::{c_char, c_int, c_void};
use std::fmt;
use tracing::debug;

pub type InitAllFn = unsafe extern "C" fn();
pub type ParseStringFn = unsafe extern "C" fn(*const c_char, c_int, *mut *mut c_void) -> c_int;
pub type AddModuleFn = unsafe extern "C" fn(*const c_char) -> *mut c_void;
pub type GetModuleDictFn = unsafe extern "C" fn(*mut c_void) -> *mut c_void;
pub type EvalNodeFn =
    unsafe extern "C" fn(*mut c_void, *const c_char, *mut c_void, *mut c_void) -> *mut ObjectHeader;
pub type PrintErrorFn = unsafe extern "C" fn();

/// A named symbol resolved on first use and cached afterwards.
///
/// `F` is the declared type of the symbol: a function pointer type for entry
/// points, or a raw pointer for exported data.
pub struct Bound<F> {
    name: &'static str,
    slot: OnceCell<F>,
}

impl<F: Copy> Bound<F> {
    /// Create an unresolved binding.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            slot: OnceCell::new(),
        }
    }

    /// Symbol name as exported by the library.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns `true` once the symbol has been resolved.
    pub fn is_resolved(&self) -> bool {
        self.slot.get().is_some()
    }

    /// Resolve the symbol in `library`, or return the cached value.
    ///
    /// A failed lookup is not cached, but it is fatal for the caller.
    ///
    /// # Safety
    /// `F` must match the symbol's real type in `library`, and the returned
    /// value must not be used after `library` is unloaded.
    pub unsafe fn resolve(&self, library: &Library) -> BridgeResult<&F> {
        self.slot.get_or_try_init(|| {
            let symbol = library
                .get::<F>(self.name.as_bytes())
                .map_err(|source| BridgeError::SymbolNotFound {
                    name: self.name,
                    source,
                })?;
            debug!(symbol = self.name, "bound interpreter symbol");
            Ok(*symbol)
        })
    }
}

impl<F> fmt::Debug for Bound<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bound")
            .field("name", &self.name)
            .field("resolved", &self.slot.get().is_some())
            .finish()
    }
}

/// Every symbol the bridge uses, each bound independently.
#[derive(Debug)]
pub struct SymbolTable {
    pub initall: Bound<InitAllFn>,
    pub parse_string: Bound<ParseStringFn>,
    pub add_module: Bound<AddModuleFn>,
    pub getmoduledict: Bound<GetModuleDictFn>,
    pub eval_node: Bound<EvalNodeFn>,
    pub print_error: Bound<PrintErrorFn>,
    pub gram: Bound<*mut Grammar>,
}

impl SymbolTable {
    pub const fn new() -> Self {
        Self {
            initall: Bound::new("initall"),
            parse_string: Bound::new("parse_string"),
            add_module: Bound::new("add_module"),
            getmoduledict: Bound::new("getmoduledict"),
            eval_node: Bound::new("eval_node"),
            print_error: Bound::new("print_error"),
            gram: Bound::new("gram"),
        }
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;

    type AbsFn = unsafe extern "C" fn(c_int) -> c_int;

    fn libc() -> Library {
        unsafe { Library::new("libc.so.6") }.expect("system C library")
    }

    #[test]
    fn resolves_once_and_caches() {
        let library = libc();
        let abs: Bound<AbsFn> = Bound::new("abs");
        assert!(!abs.is_resolved());

        let first = unsafe { abs.resolve(&library) }.expect("abs is exported");
        assert!(abs.is_resolved());
        let second = unsafe { abs.resolve(&library) }.expect("cached");

        assert!(std::ptr::eq(first, second));
        assert_eq!(*first as usize, *second as usize);
        assert_eq!(unsafe { (*first)(-7) }, 7);
    }

    #[test]
    fn missing_symbol_is_reported_by_name() {
        let library = libc();
        let table = SymbolTable::new();
        let err = unsafe { table.eval_node.resolve(&library) }.unwrap_err();
        assert_eq!(err.missing_symbol(), Some("eval_node"));
        assert!(!table.eval_node.is_resolved());
    }
}
