//! Error taxonomy for the interpreter bridge.

use std::path::PathBuf;
use thiserror::Error;

/// Result type used across the bridge.
pub type BridgeResult<T> = std::result::Result<T, BridgeError>;

/// Fatal bridge failures.
///
/// Parse and evaluation failures are not represented here: they are reported
/// by the interpreter library itself and the bridge stays usable afterwards.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("no interpreter library configured: pass a library path or set the PYTHON0_LIB environment variable")]
    MissingLibrary,
    #[error("failed to load interpreter library {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },
    #[error("symbol `{name}` not found in interpreter library")]
    SymbolNotFound {
        name: &'static str,
        #[source]
        source: libloading::Error,
    },
    #[error("interpreter library returned no namespace for module `{module}`")]
    NamespaceUnavailable { module: &'static str },
}

impl BridgeError {
    /// Name of the missing symbol when this is a resolution failure.
    pub fn missing_symbol(&self) -> Option<&'static str> {
        match self {
            BridgeError::SymbolNotFound { name, .. } => Some(name),
            _ => None,
        }
    }
}
