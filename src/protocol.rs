//! Parse, evaluate and report one piece of source text.

use crate::bridge::Bridge;
use crate::error::BridgeResult;
use crate::library::ForeignInterpreter;
use std::borrow::Cow;
use std::ffi::{c_int, CString};
use std::ptr;
use tracing::debug;

/// Parser status meaning the whole input was consumed.
pub const E_DONE: c_int = 16;

/// Node buffer limit passed to the parser.
pub const MAX_NODES: c_int = 256;

/// Filename reported for code that does not come from a file.
pub const DEFAULT_FILENAME: &str = "<string>";

/// Append the newline the parser needs to see a complete statement.
pub fn normalize_source(source: &str) -> Cow<'_, str> {
    if source.ends_with('\n') {
        Cow::Borrowed(source)
    } else {
        Cow::Owned(format!("{source}\n"))
    }
}

/// Encode text for the library. C code stops reading at the first NUL, so
/// the text is cut there.
pub(crate) fn to_c_string(text: &str) -> CString {
    let bytes = text.as_bytes();
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    CString::new(&bytes[..end]).unwrap_or_default()
}

/// Run `source` in the bridge's `__main__` namespace.
///
/// Parse and evaluation failures are printed to standard error by the
/// interpreter library and return `Ok(())`; the bridge stays usable. Only
/// fatal binding failures are returned as errors.
pub fn run_code_string<I: ForeignInterpreter>(
    bridge: &Bridge<I>,
    source: &str,
    filename: &str,
) -> BridgeResult<()> {
    let interpreter = bridge.interpreter();
    let source = to_c_string(&normalize_source(source));
    let filename = to_c_string(filename);

    let mut node = ptr::null_mut();
    let status = interpreter.parse_string(&source, MAX_NODES, &mut node)?;
    if status != E_DONE {
        debug!(status, "parse failed");
        return interpreter.print_error();
    }

    let namespace = bridge.namespace()?.as_ptr();
    // SAFETY: `node` comes from a completed parse and `namespace` from the
    // library's own `__main__` module.
    let result = unsafe { interpreter.eval_node(node, &filename, namespace, namespace)? };
    if result.is_null() {
        debug!("evaluation failed");
        interpreter.print_error()?;
        // SAFETY: `result` is whatever the evaluator handed back.
        unsafe { interpreter.release(result) };
    }
    Ok(())
}
