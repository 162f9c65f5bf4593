//! Prelude module for convenient imports
//!
//! Use `use devprint::prelude::*;` to import commonly used types

// Pipeline
pub use crate::core::{
    FingerprintRequest, FingerprintResponse, FingerprintService, PipelineState, ProbeRegistry,
    run_probes, run_probes_with_cancel, serialize, verify,
};
pub use crate::config::FingerprintConfig;

// Probes and environments
pub use crate::env::{Capability, Environment, HostEnvironment, Signal, SnapshotEnvironment};
pub use crate::probe::{Probe, ProbeMode, builtin};

// Model types
pub use crate::model::{
    Algorithm, DisplayState, Fingerprint, ProbeResult, ProbeStatus, SerialNumber, SlotLayout,
    StabilityTier,
};

// Crypto
pub use crate::crypto::{digest, rolling32, sha256_from_bytes};

#[cfg(feature = "https")]
pub use crate::crypto::{TlsCertificate, generate_tls_certificate};

// Client & Server
pub use crate::client::SerialClient;
pub use crate::server::FingerprintServer;

// Error handling
pub use crate::error::{FingerprintError, Result};
