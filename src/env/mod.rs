pub mod host;
pub mod snapshot;
pub mod traits;

pub use host::HostEnvironment;
pub use snapshot::{Operation, SnapshotEnvironment};
pub use traits::{Capability, Environment, Signal};
