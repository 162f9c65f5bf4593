use crate::error::Result;
use crate::model::Algorithm;
use sha2::Digest;

/// Compute SHA-256 hash of bytes
pub fn sha256_from_bytes(data: &[u8]) -> String {
    let hash = sha2::Sha256::digest(data);
    format!("{:x}", hash)
}

fn rolling_state(input: &str) -> i32 {
    input.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    })
}

/// 32-bit rolling hash (`h = h * 31 + unit`) over UTF-16 code units
///
/// Wrapping i32 arithmetic keeps it bit-compatible with digests produced by
/// browser-side implementations. Rendered as 8 hex digits.
pub fn rolling32(input: &str) -> String {
    format!("{:08x}", rolling_state(input) as u32)
}

/// Same hash as [`rolling32`], rendered the pre-versioning way: hex of the
/// absolute value, no padding
pub fn legacy_rolling(input: &str) -> String {
    format!("{:x}", rolling_state(input).unsigned_abs())
}

/// Digest `canonical` with the algorithm identified by `algorithm_version`
pub fn digest(canonical: &str, algorithm_version: u32) -> Result<String> {
    let digest = match Algorithm::from_version(algorithm_version)? {
        Algorithm::LegacyRolling => legacy_rolling(canonical),
        Algorithm::Rolling32 => rolling32(canonical),
        Algorithm::Sha256 => sha256_from_bytes(canonical.as_bytes()),
    };
    Ok(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FingerprintError;

    #[test]
    fn test_sha256_known_vectors() {
        assert_eq!(
            sha256_from_bytes(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            sha256_from_bytes(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_rolling32_known_vectors() {
        assert_eq!(rolling32(""), "00000000");
        assert_eq!(rolling32("a"), "00000061");
        assert_eq!(rolling32("ab"), "00000c21");
        // Same value as Java's "hello".hashCode()
        assert_eq!(rolling32("hello"), "05e918d2");
    }

    #[test]
    fn test_legacy_rolling_matches_issued_digests() {
        assert_eq!(legacy_rolling("en-US###-60"), "580ed23a");
        assert_eq!(legacy_rolling("hello"), "5e918d2");
        assert_eq!(legacy_rolling(""), "0");
        assert_eq!(digest("4###8###dark", 0).unwrap(), "36aea570");
    }

    #[test]
    fn test_legacy_rolling_takes_absolute_value() {
        // Negative state: the fixed-width form shows the two's complement
        let input = "x".repeat(7);
        let state = rolling_state(&input);
        assert!(state < 0);
        assert_eq!(legacy_rolling(&input), format!("{:x}", -(state as i64)));
        assert_ne!(legacy_rolling(&input), rolling32(&input));
    }

    #[test]
    fn test_rolling32_wraps() {
        let long = "x".repeat(10_000);
        let digest = rolling32(&long);
        assert_eq!(digest.len(), 8);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_digest_dispatches_on_version() {
        assert_eq!(digest("hello", 1).unwrap(), "05e918d2");
        assert_eq!(digest("abc", 2).unwrap(), sha256_from_bytes(b"abc"));

        let err = digest("abc", 99).unwrap_err();
        assert!(matches!(
            err,
            FingerprintError::UnknownAlgorithmVersion { version: 99 }
        ));
    }

    #[test]
    fn test_single_character_change() {
        let a = digest("p1:4|p2:8|p3:dark", 2).unwrap();
        let b = digest("p1:4|p2:8|p3:darl", 2).unwrap();
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
    }
}
