pub mod client;
pub mod config;
pub mod core;
pub mod crypto;
pub mod device;
pub mod env;
pub mod error;
pub mod model;
pub mod probe;
pub mod server;
pub mod prelude;

pub use client::SerialClient;
pub use config::FingerprintConfig;
pub use core::{
    FingerprintRequest, FingerprintResponse, FingerprintService, PipelineState, ProbeRegistry,
    run_probes, run_probes_with_cancel, serialize, verify,
};
#[cfg(feature = "https")]
pub use crypto::{TlsCertificate, generate_tls_certificate};
pub use crypto::{digest, rolling32, sha256_from_bytes};
pub use device::{SerialSource, SystemSerialSource, read_serial_number};
pub use env::{Capability, Environment, HostEnvironment, Signal, SnapshotEnvironment};
pub use error::{FingerprintError, Result};
pub use model::{
    Algorithm, DisplayState, Fingerprint, ProbeResult, ProbeStatus, SerialNumber, SlotLayout,
    StabilityTier,
};
pub use probe::{Probe, ProbeMode};
pub use server::FingerprintServer;

#[cfg(feature = "cli")]
pub mod cli;
