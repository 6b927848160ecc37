use crate::version::Gate;
use thiserror::Error;

/// Failures surfaced by the compatibility layer.
#[derive(Debug, Error)]
pub enum CompatError {
    /// A version-gated operation was invoked on a server version that does
    /// not support it. This is a programming error in the calling plugin
    /// logic, not a recoverable condition.
    #[error("{operation} is only available on {gate} servers: {reason}")]
    ContractViolation {
        operation: &'static str,
        gate: Gate,
        reason: &'static str,
    },

    /// A member whose gate held could not be looked up. The member is
    /// genuinely missing despite the version check passing, which points at
    /// a version-detection or packaging bug.
    #[error("could not resolve {class}#{method}")]
    Resolution {
        class: String,
        method: String,
        #[source]
        source: jni::errors::Error,
    },

    /// A resolved member failed reflectively at call time.
    #[error("error invoking {class}#{method}")]
    Invocation {
        class: String,
        method: String,
        #[source]
        source: jni::errors::Error,
    },

    #[error("failed to attach the current thread to the server JVM")]
    Attach(#[source] jni::errors::Error),

    #[error("unrecognized server version string '{0}'")]
    Version(String),

    #[error("could not parse the embedded compat registry")]
    RegistryParse(#[from] serde_json::Error),

    #[error("invalid JNI signature for registry member '{key}': {reason}")]
    RegistrySignature { key: String, reason: &'static str },
}
