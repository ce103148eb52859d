//! Zero-Allocation UTF-8 Encoder
//!
//! Code point -> 1..=4 bytes, langsung ke buffer di stack.
//!
//! ```text
//! 0x000000..=0x00007F  0xxxxxxx
//! 0x000080..=0x0007FF  110xxxxx 10xxxxxx
//! 0x000800..=0x00FFFF  1110xxxx 10xxxxxx 10xxxxxx
//! 0x010000..=0x10FFFF  11110xxx 10xxxxxx 10xxxxxx 10xxxxxx
//! ```

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use super::error::CodecError;
use super::{is_surrogate, MAX_CODE_POINT};

/// What the encoder does with input that has no UTF-8 form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodeMode {
    /// Reject out-of-range values and surrogates with an error.
    #[default]
    Strict,
    /// Emit U+FFFD (`EF BF BD`) for out-of-range values and encode
    /// surrogates with the plain 3-byte rule.
    Lenient,
}

/// Encoded form of one code point, stored inline.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Utf8Bytes {
    buf: [u8; 4],
    len: u8,
}

impl Utf8Bytes {
    /// U+FFFD REPLACEMENT CHARACTER
    pub const REPLACEMENT: Self = Self {
        buf: [0xEF, 0xBF, 0xBD, 0],
        len: 3,
    };

    #[inline(always)]
    const fn new(buf: [u8; 4], len: u8) -> Self {
        Self { buf, len }
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len as usize]
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Deref for Utf8Bytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl AsRef<[u8]> for Utf8Bytes {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl fmt::Debug for Utf8Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Utf8Bytes(")?;
        for (i, b) in self.as_slice().iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{b:02X}")?;
        }
        write!(f, ")")
    }
}

/// Stateless encoder. Hanya membawa policy untuk input invalid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Encoder {
    mode: EncodeMode,
}

impl Encoder {
    pub const fn new(mode: EncodeMode) -> Self {
        Self { mode }
    }

    pub const fn strict() -> Self {
        Self::new(EncodeMode::Strict)
    }

    pub const fn lenient() -> Self {
        Self::new(EncodeMode::Lenient)
    }

    pub fn mode(&self) -> EncodeMode {
        self.mode
    }

    /// Encode one code point.
    ///
    /// In strict mode values outside `[0, 0x10FFFF]` fail with
    /// [`CodecError::OutOfRange`] and surrogates with [`CodecError::Surrogate`].
    /// In lenient mode neither fails.
    #[inline]
    pub fn encode(&self, code_point: i64) -> Result<Utf8Bytes, CodecError> {
        let value = match u32::try_from(code_point) {
            Ok(v) if v <= MAX_CODE_POINT => v,
            _ => {
                return match self.mode {
                    EncodeMode::Strict => Err(CodecError::OutOfRange { code_point }),
                    EncodeMode::Lenient => Ok(Utf8Bytes::REPLACEMENT),
                }
            }
        };

        if self.mode == EncodeMode::Strict && is_surrogate(value) {
            return Err(CodecError::Surrogate { code_point: value });
        }

        Ok(encode_unchecked(value))
    }

    /// Append the encoding of `code_point` to `out`.
    ///
    /// Returns jumlah bytes yang ditulis. `out` is untouched on error.
    pub fn encode_into(&self, code_point: i64, out: &mut Vec<u8>) -> Result<usize, CodecError> {
        let bytes = self.encode(code_point)?;
        out.extend_from_slice(&bytes);
        Ok(bytes.len())
    }
}

/// Encode a `char`. Infallible: every `char` is a scalar value.
#[inline(always)]
pub fn encode_char(c: char) -> Utf8Bytes {
    encode_unchecked(c as u32)
}

/// Length class of `code_point`, or `None` if it is out of range.
pub fn encoded_len(code_point: i64) -> Option<usize> {
    match code_point {
        0..=0x7F => Some(1),
        0x80..=0x7FF => Some(2),
        0x800..=0xFFFF => Some(3),
        0x10000..=0x10FFFF => Some(4),
        _ => None,
    }
}

// Caller guarantees `v <= MAX_CODE_POINT`.
#[inline(always)]
fn encode_unchecked(v: u32) -> Utf8Bytes {
    if v <= 0x7F {
        Utf8Bytes::new([v as u8, 0, 0, 0], 1)
    } else if v <= 0x7FF {
        Utf8Bytes::new(
            [0xC0 | (v >> 6) as u8, 0x80 | (v & 0x3F) as u8, 0, 0],
            2,
        )
    } else if v <= 0xFFFF {
        Utf8Bytes::new(
            [
                0xE0 | (v >> 12) as u8,
                0x80 | ((v >> 6) & 0x3F) as u8,
                0x80 | (v & 0x3F) as u8,
                0,
            ],
            3,
        )
    } else {
        Utf8Bytes::new(
            [
                0xF0 | (v >> 18) as u8,
                0x80 | ((v >> 12) & 0x3F) as u8,
                0x80 | ((v >> 6) & 0x3F) as u8,
                0x80 | (v & 0x3F) as u8,
            ],
            4,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_values() {
        let enc = Encoder::strict();
        let cases: [(i64, &[u8]); 7] = [
            (0x7F, &[0x7F]),
            (0x80, &[0xC2, 0x80]),
            (0x7FF, &[0xDF, 0xBF]),
            (0x800, &[0xE0, 0xA0, 0x80]),
            (0xFFFF, &[0xEF, 0xBF, 0xBF]),
            (0x10000, &[0xF0, 0x90, 0x80, 0x80]),
            (0x10FFFF, &[0xF4, 0x8F, 0xBF, 0xBF]),
        ];
        for (cp, expected) in cases {
            assert_eq!(enc.encode(cp).unwrap().as_slice(), expected, "U+{cp:X}");
        }
    }

    #[test]
    fn test_matches_std_for_chars() {
        for c in ['A', 'é', '€', '😀', '\u{0}', '\u{10FFFF}'] {
            let mut std_buf = [0u8; 4];
            assert_eq!(encode_char(c).as_slice(), c.encode_utf8(&mut std_buf).as_bytes());
        }
    }

    #[test]
    fn test_strict_out_of_range() {
        let enc = Encoder::strict();
        assert_eq!(
            enc.encode(0x110000),
            Err(CodecError::OutOfRange {
                code_point: 0x110000
            })
        );
        assert_eq!(enc.encode(-1), Err(CodecError::OutOfRange { code_point: -1 }));
        assert!(enc.encode(i64::MAX).is_err());
    }

    #[test]
    fn test_strict_rejects_surrogates() {
        let enc = Encoder::strict();
        assert_eq!(
            enc.encode(0xD800),
            Err(CodecError::Surrogate { code_point: 0xD800 })
        );
        assert!(enc.encode(0xDFFF).is_err());
        assert!(enc.encode(0xD7FF).is_ok());
        assert!(enc.encode(0xE000).is_ok());
    }

    #[test]
    fn test_lenient_replacement() {
        let enc = Encoder::lenient();
        assert_eq!(enc.encode(0x110000).unwrap(), Utf8Bytes::REPLACEMENT);
        assert_eq!(enc.encode(-1).unwrap().as_slice(), &[0xEF, 0xBF, 0xBD]);
        // Surrogate dapat di-encode, seperti perilaku lama
        assert_eq!(enc.encode(0xD800).unwrap().as_slice(), &[0xED, 0xA0, 0x80]);
    }

    #[test]
    fn test_encode_into_appends() {
        let enc = Encoder::default();
        let mut out = vec![0x41];
        assert_eq!(enc.encode_into(0x20AC, &mut out), Ok(3));
        assert_eq!(out, vec![0x41, 0xE2, 0x82, 0xAC]);

        assert!(enc.encode_into(-5, &mut out).is_err());
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn test_encoded_len() {
        assert_eq!(encoded_len(0), Some(1));
        assert_eq!(encoded_len(0x80), Some(2));
        assert_eq!(encoded_len(0xFFFF), Some(3));
        assert_eq!(encoded_len(0x10FFFF), Some(4));
        assert_eq!(encoded_len(0x110000), None);
        assert_eq!(encoded_len(-1), None);
    }

    #[test]
    fn test_debug_format() {
        assert_eq!(format!("{:?}", encode_char('€')), "Utf8Bytes(E2 82 AC)");
    }

    #[test]
    fn test_len_and_is_empty() {
        let bytes = encode_char('😀');
        assert_eq!(bytes.len(), 4);
        assert!(!bytes.is_empty());
        assert_eq!(Utf8Bytes::REPLACEMENT.len(), 3);
    }
}
