//! Console bridge to a prebuilt Python 0.9.1 interpreter library.
//!
//! The interpreter is loaded as a shared library and driven through its C
//! entry points. [`run_code_string`] parses and evaluates one piece of text
//! in a persistent `__main__` namespace; errors are printed by the
//! interpreter itself.

pub mod abi;
pub mod bridge;
pub mod config;
pub mod console;
pub mod error;
pub mod frontend;
pub mod library;
pub mod logging;
pub mod protocol;
pub mod refcount;
pub mod symbols;

pub use bridge::{Bridge, Namespace, LIBRARY_ENV};
pub use console::{Console, SymbolKind};
pub use error::{BridgeError, BridgeResult};
pub use library::{ForeignInterpreter, Python0Library};
pub use protocol::run_code_string;
