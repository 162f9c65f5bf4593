use crate::error::{FingerprintError, Result};
use crate::model::{DEFAULT_ASYNC_TIMEOUT_MS, validate_probe_key};
use crate::probe::{Probe, ProbeMode, builtin};
use std::collections::HashSet;
use std::time::Duration;

/// Ordered, duplicate-free set of probes
///
/// Registration order is part of the fingerprint scheme: the same probes in a
/// different order produce different canonical strings.
#[derive(Clone, Debug, Default)]
pub struct ProbeRegistry {
    probes: Vec<Probe>,
    keys: HashSet<String>,
}

impl ProbeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a probe, rejecting bad keys, duplicates and zero timeouts
    pub fn register(&mut self, probe: Probe) -> Result<()> {
        validate_probe_key(probe.key())?;

        if let ProbeMode::Async { timeout } = probe.mode() {
            if timeout.is_zero() {
                return Err(FingerprintError::invalid_probe(
                    probe.key(),
                    "async probes need a non-zero timeout",
                ));
            }
        }

        if !self.keys.insert(probe.key().to_string()) {
            return Err(FingerprintError::DuplicateProbeKey {
                key: probe.key().to_string(),
            });
        }

        tracing::trace!("Registered probe {} ({})", probe.key(), probe.mode());
        self.probes.push(probe);
        Ok(())
    }

    /// Chaining form of [`register`](Self::register)
    pub fn with(mut self, probe: Probe) -> Result<Self> {
        self.register(probe)?;
        Ok(self)
    }

    pub fn from_probes(probes: impl IntoIterator<Item = Probe>) -> Result<Self> {
        let mut registry = Self::new();
        for probe in probes {
            registry.register(probe)?;
        }
        Ok(registry)
    }

    /// Built-in browser-style probe set with the default async timeout
    pub fn standard() -> Result<Self> {
        Self::standard_with_timeout(Duration::from_millis(DEFAULT_ASYNC_TIMEOUT_MS))
    }

    /// Built-in probe set with `timeout` on every async probe
    pub fn standard_with_timeout(timeout: Duration) -> Result<Self> {
        Self::from_probes(Self::standard_probes(timeout))
    }

    /// Standard probes followed by the OS serial number
    pub fn host(timeout: Duration) -> Result<Self> {
        Self::standard_with_timeout(timeout)?.with(builtin::serial_number(timeout))
    }

    fn standard_probes(timeout: Duration) -> Vec<Probe> {
        vec![
            builtin::user_agent(),
            builtin::language(),
            builtin::timezone_offset(),
            builtin::hardware_concurrency(),
            builtin::device_memory(),
            builtin::color_depth(),
            builtin::screen_resolution(),
            builtin::platform(),
            builtin::webgl_vendor(),
            builtin::webgl_renderer(),
            builtin::fonts(),
            builtin::canvas(timeout),
            builtin::local_addresses(timeout),
        ]
    }

    pub fn probes(&self) -> &[Probe] {
        &self.probes
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.probes.iter().map(Probe::key)
    }

    pub fn get(&self, key: &str) -> Option<&Probe> {
        self.probes.iter().find(|probe| probe.key() == key)
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StabilityTier;

    fn constant(key: &str, value: &'static str) -> Probe {
        Probe::sync(key, StabilityTier::Structural, move |_| Ok(value.to_string()))
    }

    #[test]
    fn test_registration_order_is_kept() {
        let registry = ProbeRegistry::new()
            .with(constant("p1", "4"))
            .and_then(|r| r.with(constant("p2", "8")))
            .and_then(|r| r.with(constant("p3", "dark")))
            .unwrap();

        assert_eq!(registry.keys().collect::<Vec<_>>(), vec!["p1", "p2", "p3"]);
        assert_eq!(registry.len(), 3);
        assert!(registry.get("p2").is_some());
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let mut registry = ProbeRegistry::new();
        registry.register(constant("cores", "8")).unwrap();

        let err = registry.register(constant("cores", "16")).unwrap_err();
        assert!(matches!(err, FingerprintError::DuplicateProbeKey { ref key } if key == "cores"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_invalid_probes_rejected() {
        assert!(ProbeRegistry::from_probes([constant("bad|key", "x")]).is_err());

        let zero = Probe::asynchronous(
            "slow",
            StabilityTier::HighEntropy,
            Duration::ZERO,
            |_| async { Ok(String::new()) },
        );
        let err = ProbeRegistry::from_probes([zero]).unwrap_err();
        assert!(matches!(err, FingerprintError::InvalidProbe { .. }));
    }

    #[test]
    fn test_standard_registry() {
        let registry = ProbeRegistry::standard().unwrap();
        let keys: Vec<&str> = registry.keys().collect();

        assert_eq!(keys.len(), 13);
        assert_eq!(keys.first(), Some(&"user_agent"));
        assert_eq!(keys.last(), Some(&"local_addresses"));

        let host = ProbeRegistry::host(Duration::from_secs(2)).unwrap();
        assert_eq!(host.keys().last(), Some("serial_number"));
    }
}
