//! Per-request pipeline configuration
//!
//! Loaded from a JSON file when one is given, then overridden field by field
//! from the command line.

use crate::error::Result;
use crate::model::{Algorithm, DEFAULT_ASYNC_TIMEOUT_MS, SlotLayout};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FingerprintConfig {
    /// Integer tag of the digest algorithm (1 = rolling32, 2 = sha256)
    pub algorithm_version: u32,
    pub layout: SlotLayout,
    /// Reuse the first completed fingerprint for the rest of the session
    pub session_cache: bool,
    /// Timeout for the built-in asynchronous probes
    pub default_timeout_ms: u64,
    /// Base URL of a remote `/api/uuid` service to probe
    pub remote_serial_url: Option<String>,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            algorithm_version: Algorithm::default().version(),
            layout: SlotLayout::default(),
            session_cache: true,
            default_timeout_ms: DEFAULT_ASYNC_TIMEOUT_MS,
            remote_serial_url: None,
        }
    }
}

impl FingerprintConfig {
    pub async fn load(path: &Path) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path).await?;
        let config: Self = serde_json::from_str(&contents)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Resolve the configured version; fails for versions this build doesn't know
    pub fn algorithm(&self) -> Result<Algorithm> {
        Algorithm::from_version(self.algorithm_version)
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm_version = algorithm.version();
        self
    }

    pub fn with_layout(mut self, layout: SlotLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_session_cache(mut self, enabled: bool) -> Self {
        self.session_cache = enabled;
        self
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout_ms = timeout.as_millis() as u64;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = FingerprintConfig::default();
        assert_eq!(config.algorithm().unwrap(), Algorithm::Sha256);
        assert_eq!(config.layout, SlotLayout::FixedPosition);
        assert!(config.session_cache);
        assert_eq!(config.default_timeout(), Duration::from_millis(1000));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: FingerprintConfig =
            serde_json::from_str(r#"{ "algorithmVersion": 1, "layout": "legacy-compact" }"#)
                .unwrap();

        assert_eq!(config.algorithm().unwrap(), Algorithm::Rolling32);
        assert_eq!(config.layout, SlotLayout::LegacyCompact);
        assert!(config.session_cache);
    }

    #[test]
    fn test_unknown_version_is_kept_until_used() {
        let config: FingerprintConfig =
            serde_json::from_str(r#"{ "algorithmVersion": 9 }"#).unwrap();
        assert!(config.algorithm().is_err());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "sessionCache": false, "defaultTimeoutMs": 250, "remoteSerialUrl": "http://10.0.0.2:3000" }}"#
        )
        .unwrap();

        let config = FingerprintConfig::load(file.path()).await.unwrap();
        assert!(!config.session_cache);
        assert_eq!(config.default_timeout(), Duration::from_millis(250));
        assert_eq!(
            config.remote_serial_url.as_deref(),
            Some("http://10.0.0.2:3000")
        );
    }

    #[test]
    fn test_builders() {
        let config = FingerprintConfig::default()
            .with_algorithm(Algorithm::Rolling32)
            .with_layout(SlotLayout::LegacyCompact)
            .with_session_cache(false)
            .with_default_timeout(Duration::from_millis(75));

        assert_eq!(config.algorithm_version, 1);
        assert_eq!(config.default_timeout_ms, 75);
        assert!(!config.session_cache);
    }
}
