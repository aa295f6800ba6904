//! Short code generation and validation utilities.
//!
//! Random codes draw from the URL-safe base64 alphabet (`A-Z a-z 0-9 - _`),
//! which is exactly the alphabet custom codes may use.

use base64::Engine as _;
use regex::Regex;
use std::sync::LazyLock;

/// Default length of a generated code.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Shortest accepted code.
pub const MIN_CODE_LENGTH: usize = 3;

/// Longest accepted code.
pub const MAX_CODE_LENGTH: usize = 20;

/// Codes shadowed by static routes. They pass [`is_valid_code`] but can never
/// redirect, so the allocator treats them as occupied.
pub const RESERVED_CODES: &[&str] = &["health", "admin", "api"];

static CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{3,20}$").unwrap());

/// Generates a random candidate code of `length` characters.
///
/// Uses `getrandom` for entropy and encodes it as URL-safe base64 without
/// padding. Every base64 character carries 6 random bits, so truncating the
/// encoding keeps the distribution uniform. The result is not checked for
/// uniqueness; see [`crate::application::services::CodeAllocator`].
///
/// # Panics
///
/// Panics if the system random number generator fails (extremely rare).
///
/// # Examples
///
/// ```ignore
/// let code = generate_candidate(6);
/// assert_eq!(code.len(), 6);
/// assert!(is_valid_code(&code));
/// ```
pub fn generate_candidate(length: usize) -> String {
    let byte_len = (length * 6).div_ceil(8);
    let mut buffer = vec![0u8; byte_len];

    getrandom::fill(&mut buffer).expect("Failed to generate random bytes");

    let mut code = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&buffer);
    code.truncate(length);
    code
}

/// Returns true when `code` matches `^[A-Za-z0-9_-]{3,20}$` exactly.
///
/// Case-sensitive and strict: surrounding whitespace makes the code invalid,
/// so callers trim user input first.
pub fn is_valid_code(code: &str) -> bool {
    CODE_REGEX.is_match(code)
}

/// Returns true for codes reserved by the router.
pub fn is_reserved_code(code: &str) -> bool {
    RESERVED_CODES.contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_candidate_default_length() {
        let code = generate_candidate(DEFAULT_CODE_LENGTH);
        assert_eq!(code.len(), 6);
    }

    #[test]
    fn test_generate_candidate_respects_length() {
        for length in MIN_CODE_LENGTH..=MAX_CODE_LENGTH {
            assert_eq!(generate_candidate(length).len(), length);
        }
    }

    #[test]
    fn test_generate_candidate_url_safe_characters() {
        for _ in 0..100 {
            let code = generate_candidate(DEFAULT_CODE_LENGTH);
            assert!(
                code.chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            );
            assert!(is_valid_code(&code));
        }
    }

    #[test]
    fn test_generate_candidate_mostly_unique() {
        let codes: HashSet<String> = (0..1000)
            .map(|_| generate_candidate(DEFAULT_CODE_LENGTH))
            .collect();

        // 64^6 possibilities; a handful of collisions in 1000 draws would
        // already point at a broken RNG.
        assert!(codes.len() >= 998);
    }

    #[test]
    fn test_generate_candidate_no_padding() {
        assert!(!generate_candidate(7).contains('='));
    }

    #[test]
    fn test_valid_code_boundaries() {
        assert!(!is_valid_code("ab"));
        assert!(is_valid_code("abc"));
        assert!(is_valid_code(&"a".repeat(20)));
        assert!(!is_valid_code(&"a".repeat(21)));
    }

    #[test]
    fn test_valid_code_alphabet() {
        assert!(is_valid_code("My_Link-2024"));
        assert!(is_valid_code("___"));
        assert!(is_valid_code("---"));
        assert!(!is_valid_code("my code"));
        assert!(!is_valid_code("my.code"));
        assert!(!is_valid_code("code@1"));
        assert!(!is_valid_code("código"));
    }

    #[test]
    fn test_valid_code_does_not_trim() {
        assert!(!is_valid_code(" abc"));
        assert!(!is_valid_code("abc "));
        assert!(!is_valid_code("abc\n"));
    }

    #[test]
    fn test_valid_code_is_case_sensitive_but_accepts_both_cases() {
        assert!(is_valid_code("ABC"));
        assert!(is_valid_code("abc"));
    }

    #[test]
    fn test_valid_code_empty() {
        assert!(!is_valid_code(""));
    }

    #[test]
    fn test_reserved_codes_are_valid_but_reserved() {
        for &reserved in RESERVED_CODES {
            assert!(is_valid_code(reserved));
            assert!(is_reserved_code(reserved), "'{}' should be reserved", reserved);
        }
        assert!(!is_reserved_code("Health"));
        assert!(!is_reserved_code("promo"));
    }
}
