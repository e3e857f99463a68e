//! Wire format detection
//!
//! Stored secrets come in three shapes, told apart only by how many
//! `:`-delimited fields they have:
//! - V2: `{iv_hex}:{auth_tag_hex}:{ciphertext_hex}`
//! - V1: `{iv_hex}:{ciphertext_hex}`
//! - Fallback: anything else, read as base64 of the plaintext
//!
//! Parsing only splits; hex and base64 decoding happen in the decode stages.

use serde::Serialize;

/// Field separator shared by all delimited formats
pub const SEPARATOR: char = ':';

/// Which wire format a value was detected as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatKind {
    V2,
    V1,
    Fallback,
}

impl std::fmt::Display for FormatKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::V2 => "v2",
            Self::V1 => "v1",
            Self::Fallback => "fallback",
        })
    }
}

/// A stored value split into its fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat<'a> {
    V2 {
        iv: &'a str,
        auth_tag: &'a str,
        ciphertext: &'a str,
    },
    V1 {
        iv: &'a str,
        ciphertext: &'a str,
    },
    Fallback(&'a str),
}

impl<'a> WireFormat<'a> {
    pub fn parse(encoded: &'a str) -> Self {
        let mut fields = encoded.split(SEPARATOR);
        match (fields.next(), fields.next(), fields.next(), fields.next()) {
            (Some(iv), Some(auth_tag), Some(ciphertext), None) => Self::V2 {
                iv,
                auth_tag,
                ciphertext,
            },
            (Some(iv), Some(ciphertext), None, _) => Self::V1 { iv, ciphertext },
            _ => Self::Fallback(encoded),
        }
    }

    pub fn kind(&self) -> FormatKind {
        match self {
            Self::V2 { .. } => FormatKind::V2,
            Self::V1 { .. } => FormatKind::V1,
            Self::Fallback(_) => FormatKind::Fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_fields_is_v2() {
        assert_eq!(
            WireFormat::parse("aa:bb:cc"),
            WireFormat::V2 {
                iv: "aa",
                auth_tag: "bb",
                ciphertext: "cc"
            }
        );
    }

    #[test]
    fn test_two_fields_is_v1() {
        assert_eq!(
            WireFormat::parse("aa:cc"),
            WireFormat::V1 {
                iv: "aa",
                ciphertext: "cc"
            }
        );
    }

    #[test]
    fn test_other_counts_are_fallback() {
        assert_eq!(WireFormat::parse("aGVsbG8=").kind(), FormatKind::Fallback);
        assert_eq!(WireFormat::parse("a:b:c:d").kind(), FormatKind::Fallback);
        assert_eq!(WireFormat::parse("").kind(), FormatKind::Fallback);
    }

    #[test]
    fn test_empty_fields_still_count() {
        assert_eq!(WireFormat::parse("::").kind(), FormatKind::V2);
        assert_eq!(WireFormat::parse(":").kind(), FormatKind::V1);
    }
}
