// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Line tokenizer and numeric (de)serialization for the wire format.

use crate::error::{RigctlError, RigctlResult};

/// Legacy single-byte verb: get DCD status (read-only).
///
/// These verbs have no printable form, so they are kept as named
/// constants rather than embedded in string literals.
pub const VERB_GET_DCD: u8 = 0x8B;
/// Legacy single-byte verb: set CTCSS squelch.
pub const VERB_SET_CTCSS_SQL: u8 = 0x90;
/// Legacy single-byte verb: get CTCSS squelch.
pub const VERB_GET_CTCSS_SQL: u8 = 0x91;

/// Split a line into tokens on runs of spaces.
///
/// Leading, trailing and duplicate spaces are ignored; an empty line yields
/// an empty vector. The caller is expected to have stripped the line
/// terminator already.
pub fn tokenize(line: &str) -> Vec<&str> {
    line.split(' ').filter(|part| !part.is_empty()).collect()
}

/// Parse a signed decimal integer token.
pub fn parse_int(token: &str) -> RigctlResult<i32> {
    token
        .parse::<i32>()
        .map_err(|_| RigctlError::Protocol(format!("not an integer: '{}'", token)))
}

/// Parse a decimal float token, `.` as the separator regardless of locale.
pub fn parse_float(token: &str) -> RigctlResult<f64> {
    token
        .parse::<f64>()
        .map_err(|_| RigctlError::Protocol(format!("not a number: '{}'", token)))
}

/// Format a float for the wire with six decimal places, the precision
/// rigctl peers print.
pub fn format_float(value: f64) -> String {
    format!("{:.6}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_simple() {
        assert_eq!(tokenize("M USB 2400"), vec!["M", "USB", "2400"]);
    }

    #[test]
    fn test_tokenize_collapses_space_runs() {
        assert_eq!(tokenize("  F   145000000  "), vec!["F", "145000000"]);
    }

    #[test]
    fn test_tokenize_empty_line() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn test_parse_int_signed() {
        assert_eq!(parse_int("0").unwrap(), 0);
        assert_eq!(parse_int("-11").unwrap(), -11);
        assert_eq!(parse_int("885").unwrap(), 885);
    }

    #[test]
    fn test_parse_int_rejects_garbage() {
        assert!(matches!(parse_int("abc"), Err(RigctlError::Protocol(_))));
        assert!(matches!(parse_int(""), Err(RigctlError::Protocol(_))));
        assert!(matches!(parse_int("1.5"), Err(RigctlError::Protocol(_))));
    }

    #[test]
    fn test_parse_float() {
        assert_eq!(parse_float("145000000.000000").unwrap(), 145000000.0);
        assert_eq!(parse_float("-1200.5").unwrap(), -1200.5);
        assert!(matches!(parse_float("12,5"), Err(RigctlError::Protocol(_))));
    }

    #[test]
    fn test_format_float_six_decimals() {
        assert_eq!(format_float(145000000.0), "145000000.000000");
        assert_eq!(format_float(-1.5), "-1.500000");
    }
}
