//! Manual reference release for objects returned by the interpreter library.

use crate::abi::ObjectHeader;
use tracing::trace;

/// Drop one reference to `op`, finalizing it when the count reaches zero.
///
/// This is a single-level decrement: the object's own destructor is called
/// directly and is responsible for anything the object references. A null
/// pointer is ignored.
///
/// # Safety
/// `op` must be null or point to a live object allocated by the interpreter
/// library, laid out as [`ObjectHeader`].
pub unsafe fn release(op: *mut ObjectHeader) {
    let Some(object) = op.as_mut() else {
        return;
    };
    object.ob_refcnt -= 1;
    trace!(refcnt = object.ob_refcnt, "released interpreter object");
    if object.ob_refcnt > 0 {
        return;
    }
    let Some(ty) = object.ob_type.as_ref() else {
        return;
    };
    if let Some(dealloc) = ty.tp_dealloc {
        dealloc(op.cast());
    }
}
