use crate::core::ProbeRegistry;
use crate::error::Result;
use crate::model::{
    ENTRY_SEPARATOR, ESCAPE_CHAR, KEY_VALUE_DELIMITER, LEGACY_SEPARATOR, ProbeResult,
    SENTINEL_ERROR, SENTINEL_TIMEOUT, SENTINEL_UNSUPPORTED, SlotLayout, validate_result_order,
};
use std::borrow::Cow;

/// Check that `results` came from `registry`: same length, same key order
pub fn verify(registry: &ProbeRegistry, results: &[ProbeResult]) -> Result<()> {
    validate_result_order(registry.keys(), results)
}

/// Build the canonical string for `results`
///
/// Pure: identical result sequences always produce identical strings.
pub fn serialize(results: &[ProbeResult], layout: SlotLayout) -> String {
    match layout {
        SlotLayout::FixedPosition => serialize_fixed(results),
        SlotLayout::LegacyCompact => serialize_legacy(results),
    }
}

/// `key:value|key:value|...`, one entry per probe, sentinels for missing values
fn serialize_fixed(results: &[ProbeResult]) -> String {
    let mut canonical = String::new();

    for (index, result) in results.iter().enumerate() {
        if index > 0 {
            canonical.push(ENTRY_SEPARATOR);
        }
        canonical.push_str(result.key());
        canonical.push(KEY_VALUE_DELIMITER);

        match (result.value(), result.status().sentinel()) {
            (Some(value), None) => canonical.push_str(&escape_value(value)),
            (_, Some(sentinel)) => canonical.push_str(sentinel),
            (None, None) => {}
        }
    }

    canonical
}

fn serialize_legacy(results: &[ProbeResult]) -> String {
    results
        .iter()
        .filter_map(ProbeResult::value)
        .collect::<Vec<_>>()
        .join(LEGACY_SEPARATOR)
}

/// Escape the escape character and the entry separator
///
/// A value spelled exactly like a sentinel gets a leading escape so it never
/// reads as a failed probe.
pub fn escape_value(value: &str) -> Cow<'_, str> {
    if matches!(
        value,
        SENTINEL_UNSUPPORTED | SENTINEL_TIMEOUT | SENTINEL_ERROR
    ) {
        return Cow::Owned(format!("{}{}", ESCAPE_CHAR, value));
    }

    if !value.contains([ESCAPE_CHAR, ENTRY_SEPARATOR]) {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 4);
    for c in value.chars() {
        if c == ESCAPE_CHAR || c == ENTRY_SEPARATOR {
            escaped.push(ESCAPE_CHAR);
        }
        escaped.push(c);
    }
    Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FingerprintError;
    use crate::model::StabilityTier;
    use crate::probe::Probe;

    #[test]
    fn test_all_ok() {
        let results = vec![
            ProbeResult::ok("p1", "4"),
            ProbeResult::ok("p2", "8"),
            ProbeResult::ok("p3", "dark"),
        ];

        assert_eq!(
            serialize(&results, SlotLayout::FixedPosition),
            "p1:4|p2:8|p3:dark"
        );
    }

    #[test]
    fn test_sentinels_hold_position() {
        let results = vec![
            ProbeResult::ok("p1", "4"),
            ProbeResult::unsupported("p2"),
            ProbeResult::error("p3", "this detail stays out"),
            ProbeResult::timeout("p4"),
            ProbeResult::ok("p5", "dark"),
        ];

        let canonical = serialize(&results, SlotLayout::FixedPosition);
        assert_eq!(
            canonical,
            "p1:4|p2:unsupported|p3:error|p4:timeout|p5:dark"
        );

        let entries: Vec<&str> = canonical.split('|').collect();
        assert_eq!(entries.len(), results.len());
        assert_eq!(entries[1], "p2:unsupported");
    }

    #[test]
    fn test_embedded_separator_is_escaped() {
        let results = vec![
            ProbeResult::ok("ua", "a|b"),
            ProbeResult::ok("path", "C:\\fonts"),
            ProbeResult::ok("empty", ""),
        ];

        assert_eq!(
            serialize(&results, SlotLayout::FixedPosition),
            "ua:a\\|b|path:C:\\\\fonts|empty:"
        );
    }

    #[test]
    fn test_value_spelled_like_sentinel_stays_distinct() {
        let collected = vec![ProbeResult::ok("p", "error")];
        let failed = vec![ProbeResult::error("p", "boom")];

        let collected = serialize(&collected, SlotLayout::FixedPosition);
        let failed = serialize(&failed, SlotLayout::FixedPosition);
        assert_eq!(collected, "p:\\error");
        assert_eq!(failed, "p:error");
        assert_ne!(collected, failed);

        assert_eq!(escape_value("timeout"), "\\timeout");
        assert_eq!(escape_value("unsupported"), "\\unsupported");
        // Only exact matches are escaped
        assert!(matches!(escape_value("errors"), Cow::Borrowed("errors")));
        // An escaped backslash cannot be confused with the sentinel escape
        assert_eq!(escape_value("\\error"), "\\\\error");
    }

    #[test]
    fn test_escape_is_borrowed_when_clean() {
        assert!(matches!(escape_value("plain"), Cow::Borrowed("plain")));
        assert_eq!(escape_value("x|y"), "x\\|y");
    }

    #[test]
    fn test_legacy_layout_omits_missing() {
        let results = vec![
            ProbeResult::ok("width", "1920"),
            ProbeResult::unsupported("memory"),
            ProbeResult::ok("cores", "8"),
        ];

        assert_eq!(
            serialize(&results, SlotLayout::LegacyCompact),
            "1920###8"
        );
    }

    #[test]
    fn test_serialize_is_deterministic() {
        let results = vec![ProbeResult::ok("a", "1"), ProbeResult::timeout("b")];
        assert_eq!(
            serialize(&results, SlotLayout::FixedPosition),
            serialize(&results.clone(), SlotLayout::FixedPosition)
        );
    }

    #[test]
    fn test_verify_against_registry() {
        let registry = ProbeRegistry::from_probes([
            Probe::sync("p1", StabilityTier::Structural, |_| Ok("4".to_string())),
            Probe::sync("p2", StabilityTier::Structural, |_| Ok("8".to_string())),
        ])
        .unwrap();

        let good = vec![ProbeResult::ok("p1", "4"), ProbeResult::ok("p2", "8")];
        assert!(verify(&registry, &good).is_ok());

        let short = vec![ProbeResult::ok("p1", "4")];
        assert!(matches!(
            verify(&registry, &short),
            Err(FingerprintError::SerializationInvariantViolation { .. })
        ));
    }
}
