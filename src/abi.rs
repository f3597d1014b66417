//! Memory layout mirrors of the interpreter library's C structures.
//!
//! These records are only ever read through pointers handed out by the
//! library. Their layout must match the library's compiled layout exactly;
//! a mismatch corrupts memory silently and is not checked at runtime.

use std::ffi::{c_int, c_void};

/// Object finalizer stored in a type object.
pub type Destructor = unsafe extern "C" fn(*mut c_void);

/// Common prologue of every interpreter object.
#[repr(C)]
#[derive(Debug)]
pub struct ObjectHeader {
    pub ob_refcnt: c_int,
    pub ob_type: *mut TypeObject,
}

/// The part of a type object needed to finalize its instances.
#[repr(C)]
#[derive(Debug)]
pub struct TypeObject {
    pub tp_dealloc: Option<Destructor>,
}

/// The library's global parser table, exported as the `gram` data symbol.
///
/// Owned by the library and never written by the bridge.
#[repr(C)]
#[derive(Debug)]
pub struct Grammar {
    pub g_ndfas: c_int,
    pub g_dfa: *mut *mut c_void,
    pub g_labels: *mut c_void,
    pub g_start: c_int,
}

impl Grammar {
    /// Number of DFAs in the table.
    pub fn dfa_count(&self) -> c_int {
        self.g_ndfas
    }

    /// Symbol number the parser starts from.
    pub fn start_symbol(&self) -> c_int {
        self.g_start
    }
}

const _: () = {
    use std::mem::{offset_of, size_of};
    const PTR: usize = size_of::<*mut c_void>();

    assert!(offset_of!(ObjectHeader, ob_refcnt) == 0);
    assert!(offset_of!(ObjectHeader, ob_type) == PTR);
    assert!(size_of::<TypeObject>() == PTR);
    assert!(offset_of!(Grammar, g_dfa) == PTR);
    assert!(offset_of!(Grammar, g_labels) == 2 * PTR);
    assert!(offset_of!(Grammar, g_start) == 3 * PTR);
};
