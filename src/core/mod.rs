pub mod registry;
pub mod runner;
pub mod serializer;
pub mod service;
pub mod state;

pub use registry::ProbeRegistry;
pub use runner::{run_probes, run_probes_with_cancel};
pub use serializer::{escape_value, serialize, verify};
pub use service::{FingerprintRequest, FingerprintResponse, FingerprintService};
pub use state::PipelineState;
