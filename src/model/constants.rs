/// Separator between `key:value` entries of the canonical string
pub const ENTRY_SEPARATOR: char = '|';
pub const KEY_VALUE_DELIMITER: char = ':';
/// Escapes embedded separators inside values
pub const ESCAPE_CHAR: char = '\\';

/// Joiner used by the legacy compact layout
pub const LEGACY_SEPARATOR: &str = "###";

pub const SENTINEL_UNSUPPORTED: &str = "unsupported";
pub const SENTINEL_TIMEOUT: &str = "timeout";
pub const SENTINEL_ERROR: &str = "error";

pub const DEFAULT_ASYNC_TIMEOUT_MS: u64 = 1000;
pub const DEFAULT_HTTP_PORT: u16 = 3000;
