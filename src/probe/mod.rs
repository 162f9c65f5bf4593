pub mod builtin;
pub mod types;

pub(crate) use types::Collector;
pub use types::{AsyncCollect, Probe, ProbeMode, SyncCollect};
