//! Element-number parsing for raw matrix tokens.
//!
//! A token reads `<code>-<digits><sep>...` where `<code>` is lowercase ASCII
//! and `<sep>` is `/` or `-`, e.g. `as-7/su-(12 Ta 40)`. Only the first digit
//! run is meaningful here. Sparse matrices contain empty or malformed cells,
//! so a non-matching token is not an error.

/// Extract the element number from a token, or `None` if it does not match.
pub fn parse_element_number(token: &str) -> Option<u32> {
    let bytes = token.as_bytes();
    let letters = bytes.iter().take_while(|b| b.is_ascii_lowercase()).count();
    if letters == 0 || bytes.get(letters) != Some(&b'-') {
        return None;
    }

    let rest = &token[letters + 1..];
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    match rest.as_bytes().get(digits) {
        Some(b'/') | Some(b'-') => rest[..digits].parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::parse_element_number;

    #[test]
    fn test_parses_slash_and_hyphen_separators() {
        assert_eq!(parse_element_number("as-7/su-(12 Ta 40)"), Some(7));
        assert_eq!(parse_element_number("mo-12-ke-(1 Ar 2)-(3 Ta 4)"), Some(12));
        assert_eq!(parse_element_number("x-007/"), Some(7));
    }

    #[test]
    fn test_malformed_tokens_yield_none() {
        for token in [
            "",
            "as-7",
            "as-/su",
            "As-7/su",
            "-7/su",
            "as7/su",
            "as-7 su",
            "12-7/su",
            "ās-7/su",
        ] {
            assert_eq!(parse_element_number(token), None, "token {:?}", token);
        }
    }

    #[test]
    fn test_overflowing_digit_run_is_malformed() {
        assert_eq!(parse_element_number("as-99999999999/su"), None);
    }
}
