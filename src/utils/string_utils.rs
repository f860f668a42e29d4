//! String utility functions
//!
//! Utilities for working with header text.

/// Trims trailing null characters from a byte buffer
pub fn trim_trailing_nulls(buffer: &mut Vec<u8>) {
    while !buffer.is_empty() && buffer[buffer.len() - 1] == 0 {
        buffer.pop();
    }
}

/// Splits on whitespace, dropping empty tokens
pub fn whitespace_tokens(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Parses a decimal number and truncates it toward zero
///
/// Header values such as `"520.5"` are stored as integers in some fields.
pub fn parse_truncated(text: &str) -> Option<i64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| v.trunc() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_trailing_nulls() {
        let mut buffer = b"abc\0\0".to_vec();
        trim_trailing_nulls(&mut buffer);
        assert_eq!(buffer, b"abc");
    }

    #[test]
    fn test_parse_truncated() {
        assert_eq!(parse_truncated("520.9"), Some(520));
        assert_eq!(parse_truncated(" 7 "), Some(7));
        assert_eq!(parse_truncated("n/a"), None);
    }
}
