use crate::error::{FingerprintError, Result};
use crate::model::constants::{SENTINEL_ERROR, SENTINEL_TIMEOUT, SENTINEL_UNSUPPORTED};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How likely a probe's value is to change across sessions on the same device
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StabilityTier {
    Structural,
    Environmental,
    HighEntropy,
}

impl fmt::Display for StabilityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Structural => "structural",
            Self::Environmental => "environmental",
            Self::HighEntropy => "high-entropy",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    Ok,
    Unsupported,
    Error,
    Timeout,
}

impl ProbeStatus {
    /// Literal written to the canonical string in place of a missing value
    pub fn sentinel(&self) -> Option<&'static str> {
        match self {
            Self::Ok => None,
            Self::Unsupported => Some(SENTINEL_UNSUPPORTED),
            Self::Error => Some(SENTINEL_ERROR),
            Self::Timeout => Some(SENTINEL_TIMEOUT),
        }
    }
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sentinel().unwrap_or("ok"))
    }
}

/// Outcome of one probe in one collection run
///
/// Fields are private so a result cannot change once the runner has produced it.
/// `value` is present exactly when `status` is [`ProbeStatus::Ok`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    key: String,
    status: ProbeStatus,
    value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    detail: Option<String>,
}

impl ProbeResult {
    pub fn ok(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            status: ProbeStatus::Ok,
            value: Some(value.into()),
            detail: None,
        }
    }

    pub fn unsupported(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            status: ProbeStatus::Unsupported,
            value: None,
            detail: None,
        }
    }

    pub fn timeout(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            status: ProbeStatus::Timeout,
            value: None,
            detail: None,
        }
    }

    /// Error result; `detail` is kept for diagnostics and never serialized
    /// into the canonical string
    pub fn error(key: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            status: ProbeStatus::Error,
            value: None,
            detail: Some(detail.into()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn status(&self) -> ProbeStatus {
        self.status
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    pub fn is_ok(&self) -> bool {
        self.status == ProbeStatus::Ok
    }
}

/// Digest algorithm, identified on the wire by its integer version
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    /// Rolling hash rendered as the unpadded hex of its absolute value, the
    /// encoding used before digests were versioned
    LegacyRolling,
    /// Fast 32-bit rolling hash, fine for display and debugging
    Rolling32,
    /// SHA-256, for anything used in access or trust decisions
    #[default]
    Sha256,
}

impl Algorithm {
    pub fn version(self) -> u32 {
        match self {
            Self::LegacyRolling => 0,
            Self::Rolling32 => 1,
            Self::Sha256 => 2,
        }
    }

    pub fn from_version(version: u32) -> Result<Self> {
        match version {
            0 => Ok(Self::LegacyRolling),
            1 => Ok(Self::Rolling32),
            2 => Ok(Self::Sha256),
            _ => Err(FingerprintError::UnknownAlgorithmVersion { version }),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LegacyRolling => f.write_str("legacy-rolling"),
            Self::Rolling32 => f.write_str("rolling32"),
            Self::Sha256 => f.write_str("sha256"),
        }
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy-rolling" | "legacy" | "0" => Ok(Self::LegacyRolling),
            "rolling32" | "rolling" | "1" => Ok(Self::Rolling32),
            "sha256" | "sha-256" | "2" => Ok(Self::Sha256),
            other => Err(format!("unknown algorithm '{}'", other)),
        }
    }
}

/// Policy for placing missing probe values in the canonical string
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlotLayout {
    /// Every probe keeps its slot; missing values become sentinels
    #[default]
    FixedPosition,
    /// Values only, missing ones dropped, `###`-joined. Together with
    /// [`Algorithm::LegacyRolling`] it regenerates digests issued before
    /// layouts were versioned.
    LegacyCompact,
}

impl fmt::Display for SlotLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FixedPosition => f.write_str("fixed-position"),
            Self::LegacyCompact => f.write_str("legacy-compact"),
        }
    }
}

impl FromStr for SlotLayout {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed-position" | "fixed" => Ok(Self::FixedPosition),
            "legacy-compact" | "legacy" | "compact" => Ok(Self::LegacyCompact),
            other => Err(format!("unknown layout '{}'", other)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    pub canonical: String,
    pub digest: String,
    #[serde(rename = "algorithmVersion")]
    pub algorithm_version: u32,
    pub layout: SlotLayout,
    pub results: Vec<ProbeResult>,
}

impl Fingerprint {
    /// Digest prefixed with its algorithm version, e.g. `v2:9f86...`
    pub fn tagged(&self) -> String {
        format!("v{}:{}", self.algorithm_version, self.digest)
    }

    /// Identifiers from different algorithms or layouts never compare equal,
    /// even when the hex happens to match.
    pub fn same_identity(&self, other: &Fingerprint) -> bool {
        self.algorithm_version == other.algorithm_version
            && self.layout == other.layout
            && self.digest == other.digest
    }
}

/// What a UI should render for the current pipeline state
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum DisplayState {
    Loading,
    Ready { digest: String },
    Error { message: String },
}

/// Body of a successful `GET /api/uuid`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialNumber {
    #[serde(rename = "serialNumber")]
    pub serial_number: String,
    pub platform: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_result_constructors() {
        let ok = ProbeResult::ok("cores", "8");
        assert!(ok.is_ok());
        assert_eq!(ok.value(), Some("8"));

        let err = ProbeResult::error("cores", "boom");
        assert_eq!(err.status(), ProbeStatus::Error);
        assert_eq!(err.value(), None);
        assert_eq!(err.detail(), Some("boom"));

        assert_eq!(ProbeResult::timeout("x").status().sentinel(), Some("timeout"));
        assert_eq!(
            ProbeResult::unsupported("x").status().sentinel(),
            Some("unsupported")
        );
    }

    #[test]
    fn test_algorithm_versions() {
        assert_eq!(Algorithm::LegacyRolling.version(), 0);
        assert_eq!(Algorithm::from_version(0).unwrap(), Algorithm::LegacyRolling);
        assert_eq!(Algorithm::Rolling32.version(), 1);
        assert_eq!(Algorithm::Sha256.version(), 2);
        assert_eq!(Algorithm::from_version(2).unwrap(), Algorithm::Sha256);
        assert!(matches!(
            Algorithm::from_version(7),
            Err(FingerprintError::UnknownAlgorithmVersion { version: 7 })
        ));
    }

    #[test]
    fn test_parse_config_enums() {
        assert_eq!("SHA256".parse::<Algorithm>().unwrap(), Algorithm::Sha256);
        assert_eq!("1".parse::<Algorithm>().unwrap(), Algorithm::Rolling32);
        assert_eq!(
            "legacy".parse::<Algorithm>().unwrap(),
            Algorithm::LegacyRolling
        );
        assert_eq!(Algorithm::default(), Algorithm::Sha256);
        assert_eq!(SlotLayout::default(), SlotLayout::FixedPosition);
        assert_eq!(
            serde_json::to_string(&Algorithm::LegacyRolling).unwrap(),
            "\"legacy-rolling\""
        );
        assert!("md5".parse::<Algorithm>().is_err());
        assert_eq!(
            "legacy".parse::<SlotLayout>().unwrap(),
            SlotLayout::LegacyCompact
        );
    }

    #[test]
    fn test_same_identity_requires_matching_version() {
        let a = Fingerprint {
            canonical: "a:1".to_string(),
            digest: "abcd".to_string(),
            algorithm_version: 1,
            layout: SlotLayout::FixedPosition,
            results: vec![],
        };
        let mut b = a.clone();
        assert!(a.same_identity(&b));

        b.algorithm_version = 2;
        assert!(!a.same_identity(&b));
        assert_eq!(a.tagged(), "v1:abcd");
    }

    #[test]
    fn test_serial_number_wire_format() {
        let body = SerialNumber {
            serial_number: "C02XYZ".to_string(),
            platform: "darwin".to_string(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["serialNumber"], "C02XYZ");
        assert_eq!(json["platform"], "darwin");
    }

    #[test]
    fn test_display_state_tagging() {
        let json = serde_json::to_value(DisplayState::Ready {
            digest: "ff".to_string(),
        })
        .unwrap();
        assert_eq!(json["state"], "ready");
        assert_eq!(json["digest"], "ff");
    }
}
