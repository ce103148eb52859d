//! Error taxonomy untuk codec
//!
//! Setiap kegagalan encode/decode dilaporkan sebagai value, tidak pernah panic.

use thiserror::Error;

/// Failure of a single encode or decode call.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// Code point outside `[0, 0x10FFFF]`.
    #[error("code point {code_point:#X} is outside the Unicode range 0..=0x10FFFF")]
    OutOfRange { code_point: i64 },

    /// Lead byte is a continuation pattern or above the lead-byte space.
    #[error("invalid lead byte {byte:#04X}")]
    InvalidLeadByte { byte: u8 },

    /// Fewer bytes remain than the lead byte requires.
    #[error("truncated sequence: expected {expected} bytes, {available} available")]
    TruncatedSequence { expected: usize, available: usize },

    /// Byte at `index` (within the sequence) does not match `10xxxxxx`.
    #[error("invalid continuation byte {byte:#04X} at sequence index {index}")]
    InvalidContinuationByte { byte: u8, index: usize },

    /// Sequence is longer than the minimum needed for its value.
    #[error("overlong {len}-byte encoding of U+{code_point:04X}")]
    Overlong { code_point: u32, len: usize },

    /// UTF-16 surrogate half, not a scalar value.
    #[error("surrogate code point U+{code_point:04X} is not a scalar value")]
    Surrogate { code_point: u32 },
}

impl CodecError {
    /// Stable tag used in JSON error payloads and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::OutOfRange { .. } => "out_of_range",
            Self::InvalidLeadByte { .. } => "invalid_lead_byte",
            Self::TruncatedSequence { .. } => "truncated_sequence",
            Self::InvalidContinuationByte { .. } => "invalid_continuation_byte",
            Self::Overlong { .. } => "overlong",
            Self::Surrogate { .. } => "surrogate",
        }
    }
}

/// Decode failure while walking a buffer, with the offset of the bad sequence.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("invalid UTF-8 sequence at position {position}: {source}")]
pub struct PositionedError {
    pub position: usize,
    #[source]
    pub source: CodecError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        assert_eq!(
            CodecError::InvalidLeadByte { byte: 0x80 }.kind(),
            "invalid_lead_byte"
        );
        assert_eq!(
            CodecError::TruncatedSequence {
                expected: 3,
                available: 1
            }
            .kind(),
            "truncated_sequence"
        );
    }

    #[test]
    fn test_display_messages() {
        let err = CodecError::OutOfRange {
            code_point: 0x110000,
        };
        assert_eq!(
            err.to_string(),
            "code point 0x110000 is outside the Unicode range 0..=0x10FFFF"
        );

        let err = CodecError::InvalidContinuationByte {
            byte: 0x41,
            index: 1,
        };
        assert_eq!(
            err.to_string(),
            "invalid continuation byte 0x41 at sequence index 1"
        );

        let positioned = PositionedError {
            position: 4,
            source: CodecError::InvalidLeadByte { byte: 0xFF },
        };
        assert_eq!(
            positioned.to_string(),
            "invalid UTF-8 sequence at position 4: invalid lead byte 0xFF"
        );
    }
}
