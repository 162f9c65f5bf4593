pub mod server;

pub use server::{FingerprintServer, ServerState, router};
