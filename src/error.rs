use thiserror::Error;

/// Errors that can occur while producing a fingerprint
///
/// Individual probe failures never show up here; the runner turns them into
/// sentinel results. Everything below aborts the run it occurs in.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FingerprintError {
    // ============================================================================
    // I/O and System Errors
    // ============================================================================
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Serde JSON error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },

    // ============================================================================
    // Network Errors
    // ============================================================================
    #[error("HTTP client error: {source}")]
    Reqwest {
        #[from]
        source: reqwest::Error,
    },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Request failed with HTTP {status}: {message}")]
    HttpFailed { status: u16, message: String },

    // ============================================================================
    // Environment Errors
    // ============================================================================
    #[error("{capability} is not available in this environment")]
    Unsupported { capability: String },

    // ============================================================================
    // Registry Errors
    // ============================================================================
    #[error("Duplicate probe key: {key}")]
    DuplicateProbeKey { key: String },

    #[error("Invalid probe {key}: {message}")]
    InvalidProbe { key: String, message: String },

    // ============================================================================
    // Pipeline Errors
    // ============================================================================
    #[error("Serialization invariant violated: {message}")]
    SerializationInvariantViolation { message: String },

    #[error("Unknown algorithm version: {version}")]
    UnknownAlgorithmVersion { version: u32 },

    #[error("Invalid state transition: {message}")]
    InvalidState { message: String },

    #[error("Fingerprint request cancelled")]
    Cancelled,

    // ============================================================================
    // Serial Number Errors
    // ============================================================================
    #[error("Unsupported platform: {platform}")]
    UnsupportedPlatform { platform: String },

    #[error("Command failed: {message}")]
    CommandFailed { message: String },
}

impl FingerprintError {
    /// Create a network error with a message
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network {
            message: msg.into(),
        }
    }

    /// Create an unsupported-capability error
    pub fn unsupported(capability: impl Into<String>) -> Self {
        Self::Unsupported {
            capability: capability.into(),
        }
    }

    /// Create an invalid probe error
    pub fn invalid_probe(key: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::InvalidProbe {
            key: key.into(),
            message: msg.into(),
        }
    }

    /// Create a serialization invariant error with a message
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::SerializationInvariantViolation {
            message: msg.into(),
        }
    }

    /// Create an invalid state error with a message
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState {
            message: msg.into(),
        }
    }

    /// Create a command failed error
    pub fn command_failed(msg: impl Into<String>) -> Self {
        Self::CommandFailed {
            message: msg.into(),
        }
    }

    /// Create an HTTP failed error
    pub fn http_failed(status: u16, message: impl Into<String>) -> Self {
        Self::HttpFailed {
            status,
            message: message.into(),
        }
    }

    /// Whether the error came from caller cancellation rather than a failure
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, FingerprintError>;
