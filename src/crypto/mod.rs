pub mod hash;
pub mod tls;

pub use hash::{digest, legacy_rolling, rolling32, sha256_from_bytes};

#[cfg(feature = "https")]
pub use tls::{generate_tls_certificate, TlsCertificate};
