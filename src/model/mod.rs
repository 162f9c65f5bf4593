pub mod constants;
pub mod types;
pub mod validation;

pub use constants::{
    DEFAULT_ASYNC_TIMEOUT_MS, DEFAULT_HTTP_PORT, ENTRY_SEPARATOR, ESCAPE_CHAR, KEY_VALUE_DELIMITER,
    LEGACY_SEPARATOR, SENTINEL_ERROR, SENTINEL_TIMEOUT, SENTINEL_UNSUPPORTED,
};
pub use types::{
    Algorithm, DisplayState, ErrorBody, Fingerprint, ProbeResult, ProbeStatus, SerialNumber,
    SlotLayout, StabilityTier,
};
pub use validation::{validate_probe_key, validate_result_order};
