use crate::error::{FingerprintError, Result};
use crate::model::constants::{ENTRY_SEPARATOR, KEY_VALUE_DELIMITER};
use crate::model::ProbeResult;

/// Validates a probe key
///
/// Keys appear verbatim in the canonical string, so they may not contain the
/// entry separator or the key/value delimiter.
pub fn validate_probe_key(key: &str) -> Result<()> {
    if key.trim().is_empty() {
        return Err(FingerprintError::invalid_probe(key, "key cannot be empty"));
    }

    if key.contains(ENTRY_SEPARATOR) || key.contains(KEY_VALUE_DELIMITER) {
        return Err(FingerprintError::invalid_probe(
            key,
            format!(
                "key cannot contain '{}' or '{}'",
                ENTRY_SEPARATOR, KEY_VALUE_DELIMITER
            ),
        ));
    }

    if key.chars().any(char::is_whitespace) {
        return Err(FingerprintError::invalid_probe(
            key,
            "key cannot contain whitespace",
        ));
    }

    Ok(())
}

/// Validates that results line up one-to-one with the expected key order
pub fn validate_result_order<'a, I>(expected: I, results: &[ProbeResult]) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let expected: Vec<&str> = expected.into_iter().collect();

    if expected.len() != results.len() {
        return Err(FingerprintError::invariant(format!(
            "expected {} results, got {}",
            expected.len(),
            results.len()
        )));
    }

    for (index, (key, result)) in expected.iter().zip(results).enumerate() {
        if *key != result.key() {
            return Err(FingerprintError::invariant(format!(
                "slot {} holds '{}', expected '{}'",
                index,
                result.key(),
                key
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_probe_key() {
        assert!(validate_probe_key("screen_resolution").is_ok());
        assert!(validate_probe_key("webgl.vendor").is_ok());

        assert!(validate_probe_key("").is_err());
        assert!(validate_probe_key("   ").is_err());
        assert!(validate_probe_key("a|b").is_err());
        assert!(validate_probe_key("a:b").is_err());
        assert!(validate_probe_key("a b").is_err());
    }

    #[test]
    fn test_validate_result_order() {
        let results = vec![ProbeResult::ok("p1", "4"), ProbeResult::timeout("p2")];

        assert!(validate_result_order(["p1", "p2"], &results).is_ok());

        // Wrong length
        let err = validate_result_order(["p1"], &results).unwrap_err();
        assert!(matches!(
            err,
            FingerprintError::SerializationInvariantViolation { .. }
        ));

        // Swapped order
        assert!(validate_result_order(["p2", "p1"], &results).is_err());
    }
}
