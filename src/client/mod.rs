pub mod client;

pub use client::SerialClient;
