#[cfg(feature = "https")]
use crate::error::Result;

/// Self-signed certificate for serving the fingerprint API over TLS
#[cfg(feature = "https")]
pub struct TlsCertificate {
    pub cert_pem: String,
    pub key_pem: String,
    /// SHA-256 of the DER certificate, for pinning by clients
    pub fingerprint: String,
}

#[cfg(feature = "https")]
pub fn generate_tls_certificate(hosts: &[&str]) -> Result<TlsCertificate> {
    use rcgen::generate_simple_self_signed;

    let names = hosts.iter().map(|host| host.to_string()).collect::<Vec<_>>();
    let cert = generate_simple_self_signed(names).map_err(|e| {
        crate::error::FingerprintError::network(format!(
            "Failed to generate TLS certificate: {}",
            e
        ))
    })?;

    let cert_der = cert.cert.der();
    let fingerprint = super::hash::sha256_from_bytes(cert_der);

    Ok(TlsCertificate {
        cert_pem: cert.cert.pem(),
        key_pem: cert.signing_key.serialize_pem(),
        fingerprint,
    })
}
